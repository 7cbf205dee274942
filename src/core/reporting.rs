use crate::domain::model::{ActivityItem, SmsHistoryItem, SmsStats};
use crate::domain::ports::{ActionLogStore, Clock, SystemClock};
use crate::utils::error::Result;
use chrono::{DateTime, NaiveTime, Utc};
use std::io::Write;

pub const ACTIVITY_LIMIT: usize = 20;

const SMS_MARKER: &str = "📱";
const ACTION_MARKER: &str = "📋";

/// Read side of the action log. Query failures are logged and degrade to
/// empty results instead of being returned to the caller.
pub struct Reporter<S, K = SystemClock> {
    store: S,
    clock: K,
}

impl<S: ActionLogStore> Reporter<S, SystemClock> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: ActionLogStore, K: Clock> Reporter<S, K> {
    pub fn with_clock(store: S, clock: K) -> Self {
        Self { store, clock }
    }

    pub async fn vehicle_sms_history(&self, vehicle_id: &str) -> Vec<SmsHistoryItem> {
        match self.store.sms_history(vehicle_id).await {
            Ok(items) => items,
            Err(e) => {
                tracing::error!("Error fetching SMS history: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn today_sms_stats(&self) -> SmsStats {
        let since = start_of_day(self.clock.now());
        match self.store.sent_message_types_since(since).await {
            Ok(types) => aggregate_stats(types),
            Err(e) => {
                tracing::error!("Error fetching SMS stats: {}", e);
                SmsStats::default()
            }
        }
    }

    /// Value of the "SMS Sent Today" tile.
    pub async fn sms_kpi(&self) -> usize {
        self.today_sms_stats().await.total
    }

    pub async fn recent_activity(&self) -> Vec<ActivityItem> {
        match self.store.recent_activity(ACTIVITY_LIMIT).await {
            Ok(items) => items,
            Err(e) => {
                tracing::error!("Error fetching activity: {}", e);
                Vec::new()
            }
        }
    }
}

/// Midnight UTC of the day containing `now`.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

pub fn aggregate_stats(types: Vec<Option<String>>) -> SmsStats {
    let mut stats = SmsStats {
        total: types.len(),
        ..Default::default()
    };
    // 沒有種類的紀錄只計入總數
    for kind in types.into_iter().flatten() {
        *stats.by_type.entry(kind).or_insert(0) += 1;
    }
    stats
}

fn action_text(item: &ActivityItem) -> String {
    if item.is_sms() {
        format!(
            "{} (SMS sent to {})",
            item.action,
            item.recipient_phone.as_deref().unwrap_or("N/A")
        )
    } else {
        item.action.clone()
    }
}

pub fn render_activity_line(item: &ActivityItem) -> String {
    let marker = if item.is_sms() { SMS_MARKER } else { ACTION_MARKER };
    format!(
        "{} {} {} | {} by {} at {}",
        marker,
        item.registration(),
        item.po_ref(),
        action_text(item),
        item.operator_name(),
        item.timestamp.format("%H:%M")
    )
}

pub fn render_activity_feed(items: &[ActivityItem]) -> String {
    let mut feed = String::from("Recent Activity\n");
    for item in items {
        feed.push_str(&render_activity_line(item));
        feed.push('\n');
    }
    feed
}

pub fn write_activity_csv<W: Write>(items: &[ActivityItem], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["time", "registration", "po_ref", "action", "operator", "sms_phone"])?;
    for item in items {
        let time = item.timestamp.to_rfc3339();
        let phone = if item.is_sms() {
            item.recipient_phone.as_deref().unwrap_or("N/A")
        } else {
            ""
        };
        csv.write_record([
            time.as_str(),
            item.registration(),
            item.po_ref(),
            item.action.as_str(),
            item.operator_name(),
            phone,
        ])?;
    }
    csv.flush()?;
    Ok(())
}

pub fn render_sms_history(items: &[SmsHistoryItem]) -> String {
    items
        .iter()
        .map(|item| {
            format!(
                "{} {} -> {} [{}] by {}\n    {}",
                item.timestamp.format("%Y-%m-%d %H:%M"),
                item.message_type,
                item.recipient_phone.as_deref().unwrap_or("N/A"),
                if item.message_sent == Some(true) {
                    "sent"
                } else {
                    "not sent"
                },
                item.operator
                    .as_ref()
                    .and_then(|o| o.name.as_deref())
                    .unwrap_or("Unknown"),
                item.message_content.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
