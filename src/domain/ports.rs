use crate::domain::model::{
    ActionLogEntry, ActivityItem, NewActionLogEntry, NewVehicle, PresentationEvent, SmsHistoryItem,
    Vehicle, VehiclePatch,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::time::Duration;

pub trait ConfigProvider: Send + Sync {
    fn endpoint_url(&self) -> &str;
    fn api_key(&self) -> &str;
    fn request_timeout(&self) -> Option<Duration>;
}

#[async_trait]
pub trait VehicleStore: Send + Sync {
    async fn insert_vehicle(&self, vehicle: &NewVehicle) -> Result<Vehicle>;
    async fn get_vehicle(&self, id: &str) -> Result<Option<Vehicle>>;
    /// Returns the updated row, `None` when no vehicle has this id.
    async fn update_vehicle(&self, id: &str, patch: &VehiclePatch) -> Result<Option<Vehicle>>;
    /// Vehicles not yet released, oldest check-in first.
    async fn list_open_vehicles(&self) -> Result<Vec<Vehicle>>;
}

#[async_trait]
pub trait ActionLogStore: Send + Sync {
    async fn append(&self, entry: &NewActionLogEntry) -> Result<ActionLogEntry>;
    async fn sms_history(&self, vehicle_id: &str) -> Result<Vec<SmsHistoryItem>>;
    /// `message_type` of every entry with `message_sent = true` at or after `since`.
    async fn sent_message_types_since(&self, since: DateTime<Utc>) -> Result<Vec<Option<String>>>;
    async fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityItem>>;
}

#[async_trait]
pub trait PrebookingStore: Send + Sync {
    /// Marks unconsumed rows with `expected_date < today` consumed.
    async fn consume_before_date(&self, today: NaiveDate) -> Result<usize>;
    /// Marks unconsumed rows for `today` with `expected_time < cutoff` consumed.
    async fn consume_today_before_time(&self, today: NaiveDate, cutoff: NaiveTime) -> Result<usize>;
}

pub trait PresentationSink: Send + Sync {
    fn emit(&self, event: PresentationEvent);
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
