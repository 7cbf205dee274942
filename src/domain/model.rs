use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const PLACEHOLDER: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Parked,
    Notified,
    Released,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Parked => "parked",
            VehicleStatus::Notified => "notified",
            VehicleStatus::Released => "released",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Normal,
    Export,
}

/// 工作流程中的動作，同時也是簡訊範本的種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CheckIn,
    Notified,
    Released,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::CheckIn => "check_in",
            ActionKind::Notified => "notified",
            ActionKind::Released => "released",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub registration: String,
    pub po_ref: Option<String>,
    pub pager_number: Option<String>,
    pub mobile_number: Option<String>,
    pub notes: Option<String>,
    pub quoted_minutes: Option<i64>,
    pub status: VehicleStatus,
    pub check_in_time: DateTime<Utc>,
    pub due_time: Option<DateTime<Utc>>,
    pub notify_time: Option<DateTime<Utc>>,
    pub release_time: Option<DateTime<Utc>>,
    pub operator_id: Option<String>,
    pub classification: Option<Classification>,
}

impl Vehicle {
    /// 手機優先，其次呼叫器
    pub fn contact_phone(&self) -> String {
        present(&self.mobile_number)
            .or_else(|| present(&self.pager_number))
            .unwrap_or(PLACEHOLDER)
            .to_string()
    }

    pub fn po_or_placeholder(&self) -> String {
        present(&self.po_ref).unwrap_or(PLACEHOLDER).to_string()
    }
}

/// Treats empty strings as absent.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[derive(Debug, Clone)]
pub struct CheckInRequest {
    pub registration: String,
    pub po_ref: String,
    pub pager_number: String,
    pub notes: String,
    pub quoted_minutes: i64,
    pub is_export: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewVehicle {
    pub registration: String,
    pub po_ref: String,
    pub pager_number: String,
    pub notes: String,
    pub quoted_minutes: i64,
    pub check_in_time: DateTime<Utc>,
    pub due_time: DateTime<Utc>,
    pub status: VehicleStatus,
    pub operator_id: Option<String>,
    pub classification: Classification,
}

#[derive(Debug, Clone, Serialize)]
pub struct VehiclePatch {
    pub status: VehicleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_time: Option<DateTime<Utc>>,
}

impl VehiclePatch {
    pub fn notified(at: DateTime<Utc>) -> Self {
        Self {
            status: VehicleStatus::Notified,
            notify_time: Some(at),
            release_time: None,
        }
    }

    pub fn released(at: DateTime<Utc>) -> Self {
        Self {
            status: VehicleStatus::Released,
            notify_time: None,
            release_time: Some(at),
        }
    }
}

/// Operator performing an action, supplied by the caller on every call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorContext {
    pub operator_id: Option<String>,
}

impl OperatorContext {
    pub fn new(operator_id: Option<String>) -> Self {
        Self {
            operator_id: operator_id.filter(|id| !id.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsDetails {
    pub sms_simulated: bool,
    pub sent_via: String,
}

impl SmsDetails {
    pub fn simulated() -> Self {
        Self {
            sms_simulated: true,
            sent_via: "simulator".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewActionLogEntry {
    pub vehicle_id: String,
    pub operator_id: Option<String>,
    pub action: ActionKind,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<ActionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_sent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<SmsDetails>,
}

impl NewActionLogEntry {
    pub fn action(
        vehicle_id: &str,
        ctx: &OperatorContext,
        action: ActionKind,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            vehicle_id: vehicle_id.to_string(),
            operator_id: ctx.operator_id.clone(),
            action,
            timestamp,
            recipient_phone: None,
            message_type: None,
            message_sent: None,
            message_content: None,
            details: None,
        }
    }

    pub fn simulated_sms(
        vehicle_id: &str,
        ctx: &OperatorContext,
        kind: ActionKind,
        timestamp: DateTime<Utc>,
        phone: &str,
        content: &str,
    ) -> Self {
        Self {
            recipient_phone: Some(phone.to_string()),
            message_type: Some(kind),
            message_sent: Some(true),
            message_content: Some(content.to_string()),
            details: Some(SmsDetails::simulated()),
            ..Self::action(vehicle_id, ctx, kind, timestamp)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub id: String,
    pub vehicle_id: String,
    pub operator_id: Option<String>,
    pub action: String,
    pub timestamp: DateTime<Utc>,
    pub recipient_phone: Option<String>,
    pub message_type: Option<String>,
    pub message_sent: Option<bool>,
    pub message_content: Option<String>,
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorRef {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRef {
    pub registration: Option<String>,
    pub po_ref: Option<String>,
}

/// One row of a vehicle's SMS timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsHistoryItem {
    pub message_type: String,
    pub recipient_phone: Option<String>,
    pub message_content: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub message_sent: Option<bool>,
    #[serde(rename = "operators")]
    pub operator: Option<OperatorRef>,
}

/// One row of the recent activity feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityItem {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub message_type: Option<String>,
    pub recipient_phone: Option<String>,
    #[serde(rename = "operators")]
    pub operator: Option<OperatorRef>,
    #[serde(rename = "vehicles")]
    pub vehicle: Option<VehicleRef>,
}

impl ActivityItem {
    pub fn is_sms(&self) -> bool {
        self.message_type.is_some()
    }

    pub fn operator_name(&self) -> &str {
        self.operator
            .as_ref()
            .and_then(|o| present(&o.name))
            .unwrap_or("Unknown")
    }

    pub fn registration(&self) -> &str {
        self.vehicle
            .as_ref()
            .and_then(|v| present(&v.registration))
            .unwrap_or("Unknown")
    }

    pub fn po_ref(&self) -> &str {
        self.vehicle
            .as_ref()
            .and_then(|v| present(&v.po_ref))
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SmsStats {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prebooking {
    pub id: String,
    pub expected_date: NaiveDate,
    pub expected_time: NaiveTime,
    pub consumed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTarget {
    Vehicles,
    Logs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationDetail {
    QuotedMinutes(i64),
    Duration(String),
    None,
}

/// Payload for the SMS simulator view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsSimulation {
    pub vehicle_id: String,
    pub kind: ActionKind,
    pub phone: String,
    pub po_ref: String,
    pub detail: SimulationDetail,
    pub message: String,
}

impl SmsSimulation {
    pub fn simulator_link(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("type", self.kind.as_str())
            .append_pair("phone", &self.phone)
            .append_pair("po", &self.po_ref);
        match &self.detail {
            SimulationDetail::QuotedMinutes(minutes) => {
                query.append_pair("quoted", &minutes.to_string());
            }
            SimulationDetail::Duration(duration) => {
                query.append_pair("duration", duration);
            }
            SimulationDetail::None => {}
        }
        format!("sms_simulator.html?{}", query.finish())
    }
}

/// Intents raised by the workflow for whatever surface is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentationEvent {
    QrDisplay { vehicle_id: String },
    SmsSimulator(SmsSimulation),
    Refresh(RefreshTarget),
}

impl PresentationEvent {
    pub fn qr_link(vehicle_id: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("uid", vehicle_id)
            .finish();
        format!("qr-screen.html?{}", query)
    }
}
