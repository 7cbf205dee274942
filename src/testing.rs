//! In-memory doubles shared by the unit tests.

use crate::domain::model::{
    ActionLogEntry, ActivityItem, NewActionLogEntry, NewVehicle, OperatorRef, Prebooking,
    PresentationEvent, SmsHistoryItem, Vehicle, VehicleRef, VehiclePatch, VehicleStatus,
};
use crate::domain::ports::{ActionLogStore, Clock, PrebookingStore, PresentationSink, VehicleStore};
use crate::utils::error::{Result, YardError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
struct State {
    vehicles: Vec<Vehicle>,
    log: Vec<ActionLogEntry>,
    prebookings: Vec<Prebooking>,
    operators: HashMap<String, String>,
    failing: HashSet<&'static str>,
    next_id: u64,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn check(&self, op: &'static str) -> Result<()> {
        if self.failing.contains(op) {
            return Err(YardError::BackendError {
                status: 500,
                message: format!("{} failed", op),
                body: format!("{} failed", op),
            });
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockStore {
    state: Arc<Mutex<State>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the named store operation return a backend error.
    pub async fn fail(&self, op: &'static str) {
        self.state.lock().await.failing.insert(op);
    }

    pub async fn add_operator(&self, id: &str, name: &str) {
        self.state
            .lock()
            .await
            .operators
            .insert(id.to_string(), name.to_string());
    }

    pub async fn seed_log(&self, entry: ActionLogEntry) {
        self.state.lock().await.log.push(entry);
    }

    pub async fn seed_prebooking(&self, prebooking: Prebooking) {
        self.state.lock().await.prebookings.push(prebooking);
    }

    pub async fn log(&self) -> Vec<ActionLogEntry> {
        self.state.lock().await.log.clone()
    }

    pub async fn vehicles(&self) -> Vec<Vehicle> {
        self.state.lock().await.vehicles.clone()
    }

    pub async fn prebookings(&self) -> Vec<Prebooking> {
        self.state.lock().await.prebookings.clone()
    }
}

#[async_trait]
impl VehicleStore for MockStore {
    async fn insert_vehicle(&self, vehicle: &NewVehicle) -> Result<Vehicle> {
        let mut state = self.state.lock().await;
        state.check("insert_vehicle")?;
        let row = Vehicle {
            id: state.next_id("veh"),
            registration: vehicle.registration.clone(),
            po_ref: Some(vehicle.po_ref.clone()),
            pager_number: Some(vehicle.pager_number.clone()),
            mobile_number: None,
            notes: Some(vehicle.notes.clone()),
            quoted_minutes: Some(vehicle.quoted_minutes),
            status: vehicle.status,
            check_in_time: vehicle.check_in_time,
            due_time: Some(vehicle.due_time),
            notify_time: None,
            release_time: None,
            operator_id: vehicle.operator_id.clone(),
            classification: Some(vehicle.classification),
        };
        state.vehicles.push(row.clone());
        Ok(row)
    }

    async fn get_vehicle(&self, id: &str) -> Result<Option<Vehicle>> {
        let state = self.state.lock().await;
        state.check("get_vehicle")?;
        Ok(state.vehicles.iter().find(|v| v.id == id).cloned())
    }

    async fn update_vehicle(&self, id: &str, patch: &VehiclePatch) -> Result<Option<Vehicle>> {
        let mut state = self.state.lock().await;
        state.check("update_vehicle")?;
        let Some(row) = state.vehicles.iter_mut().find(|v| v.id == id) else {
            return Ok(None);
        };
        row.status = patch.status;
        if patch.notify_time.is_some() {
            row.notify_time = patch.notify_time;
        }
        if patch.release_time.is_some() {
            row.release_time = patch.release_time;
        }
        Ok(Some(row.clone()))
    }

    async fn list_open_vehicles(&self) -> Result<Vec<Vehicle>> {
        let state = self.state.lock().await;
        state.check("list_open_vehicles")?;
        let mut open: Vec<Vehicle> = state
            .vehicles
            .iter()
            .filter(|v| v.status != VehicleStatus::Released)
            .cloned()
            .collect();
        open.sort_by_key(|v| v.check_in_time);
        Ok(open)
    }
}

#[async_trait]
impl ActionLogStore for MockStore {
    async fn append(&self, entry: &NewActionLogEntry) -> Result<ActionLogEntry> {
        let mut state = self.state.lock().await;
        let op = if entry.message_type.is_some() {
            "append_sms"
        } else {
            "append"
        };
        state.check(op)?;
        let row = ActionLogEntry {
            id: state.next_id("log"),
            vehicle_id: entry.vehicle_id.clone(),
            operator_id: entry.operator_id.clone(),
            action: entry.action.as_str().to_string(),
            timestamp: entry.timestamp,
            recipient_phone: entry.recipient_phone.clone(),
            message_type: entry.message_type.map(|k| k.as_str().to_string()),
            message_sent: entry.message_sent,
            message_content: entry.message_content.clone(),
            details: entry
                .details
                .as_ref()
                .map(|d| serde_json::to_value(d))
                .transpose()?,
        };
        state.log.push(row.clone());
        Ok(row)
    }

    async fn sms_history(&self, vehicle_id: &str) -> Result<Vec<SmsHistoryItem>> {
        let state = self.state.lock().await;
        state.check("sms_history")?;
        let mut items: Vec<SmsHistoryItem> = state
            .log
            .iter()
            .filter(|e| e.vehicle_id == vehicle_id)
            .filter_map(|e| {
                Some(SmsHistoryItem {
                    message_type: e.message_type.clone()?,
                    recipient_phone: e.recipient_phone.clone(),
                    message_content: e.message_content.clone(),
                    timestamp: e.timestamp,
                    message_sent: e.message_sent,
                    operator: operator_ref(&state.operators, &e.operator_id),
                })
            })
            .collect();
        items.sort_by_key(|item| item.timestamp);
        Ok(items)
    }

    async fn sent_message_types_since(&self, since: DateTime<Utc>) -> Result<Vec<Option<String>>> {
        let state = self.state.lock().await;
        state.check("sent_message_types_since")?;
        Ok(state
            .log
            .iter()
            .filter(|e| e.message_sent == Some(true) && e.timestamp >= since)
            .map(|e| e.message_type.clone())
            .collect())
    }

    async fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityItem>> {
        let state = self.state.lock().await;
        state.check("recent_activity")?;
        let mut entries: Vec<&ActionLogEntry> = state.log.iter().collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries
            .into_iter()
            .take(limit)
            .map(|e| ActivityItem {
                timestamp: e.timestamp,
                action: e.action.clone(),
                message_type: e.message_type.clone(),
                recipient_phone: e.recipient_phone.clone(),
                operator: operator_ref(&state.operators, &e.operator_id),
                vehicle: state
                    .vehicles
                    .iter()
                    .find(|v| v.id == e.vehicle_id)
                    .map(|v| VehicleRef {
                        registration: Some(v.registration.clone()),
                        po_ref: v.po_ref.clone(),
                    }),
            })
            .collect())
    }
}

fn operator_ref(operators: &HashMap<String, String>, id: &Option<String>) -> Option<OperatorRef> {
    id.as_ref()
        .and_then(|id| operators.get(id))
        .map(|name| OperatorRef {
            name: Some(name.clone()),
        })
}

#[async_trait]
impl PrebookingStore for MockStore {
    async fn consume_before_date(&self, today: NaiveDate) -> Result<usize> {
        let mut state = self.state.lock().await;
        state.check("consume_before_date")?;
        let mut updated = 0;
        for row in state
            .prebookings
            .iter_mut()
            .filter(|p| !p.consumed && p.expected_date < today)
        {
            row.consumed = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn consume_today_before_time(
        &self,
        today: NaiveDate,
        cutoff: NaiveTime,
    ) -> Result<usize> {
        let mut state = self.state.lock().await;
        state.check("consume_today_before_time")?;
        let mut updated = 0;
        for row in state
            .prebookings
            .iter_mut()
            .filter(|p| !p.consumed && p.expected_date == today && p.expected_time < cutoff)
        {
            row.consumed = true;
            updated += 1;
        }
        Ok(updated)
    }
}

#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<std::sync::Mutex<Vec<PresentationEvent>>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<PresentationEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl PresentationSink for RecordingSink {
    fn emit(&self, event: PresentationEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Clock that only moves when told to, plus one millisecond per reading.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<std::sync::Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(std::sync::Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let mut now = self.now.lock().unwrap();
        let current = *now;
        *now += Duration::milliseconds(1);
        current
    }
}
