use crate::domain::ports::PrebookingStore;
use crate::utils::error::{Result, YardError};
use chrono::{DateTime, NaiveTime, Timelike, Utc};
use serde::Serialize;

pub const SUCCESS_MESSAGE: &str = "Prebooking cleanup completed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SweepReport {
    pub expired_by_date: usize,
    pub expired_today: usize,
}

/// Marks prebookings whose expected arrival has passed as consumed.
pub struct ExpirySweep<S> {
    store: S,
}

impl<S: PrebookingStore> ExpirySweep<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Runs both updates even when the first one fails; the first error wins.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let today = now.date_naive();
        let cutoff = minute_cutoff(now);
        tracing::info!(
            "🧹 Running prebooking cleanup for {} before {}",
            today,
            cutoff.format("%H:%M")
        );

        let by_date = self.store.consume_before_date(today).await;
        let by_time = self.store.consume_today_before_time(today, cutoff).await;

        match (by_date, by_time) {
            (Ok(expired_by_date), Ok(expired_today)) => {
                let report = SweepReport {
                    expired_by_date,
                    expired_today,
                };
                tracing::info!(
                    "✅ Prebooking cleanup completed: {} past days, {} earlier today",
                    report.expired_by_date,
                    report.expired_today
                );
                Ok(report)
            }
            (Err(e), _) | (Ok(_), Err(e)) => {
                tracing::error!("❌ Prebooking cleanup failed: {}", e);
                Err(YardError::SweepError {
                    message: backend_text(&e),
                })
            }
        }
    }
}

/// Current time of day truncated to whole minutes (HH:MM).
pub fn minute_cutoff(now: DateTime<Utc>) -> NaiveTime {
    NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(NaiveTime::MIN)
}

/// Response text as the backend sent it.
fn backend_text(error: &YardError) -> String {
    match error {
        YardError::BackendError { body, .. } if !body.is_empty() => body.clone(),
        YardError::BackendError { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepBody {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// HTTP-shaped outcome of a sweep run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepResponse {
    pub status_code: u16,
    pub body: SweepBody,
}

impl SweepResponse {
    pub fn from_result(result: &Result<SweepReport>) -> Self {
        match result {
            Ok(_) => Self {
                status_code: 200,
                body: SweepBody {
                    ok: true,
                    message: Some(SUCCESS_MESSAGE.to_string()),
                    error: None,
                },
            },
            Err(e) => Self {
                status_code: 500,
                body: SweepBody {
                    ok: false,
                    message: None,
                    error: Some(match e {
                        YardError::SweepError { message } => message.clone(),
                        other => other.to_string(),
                    }),
                },
            },
        }
    }

    pub fn body_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.body)?)
    }
}
