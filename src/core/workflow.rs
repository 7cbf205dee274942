use crate::core::templates::{generate_message, MessageData};
use crate::domain::model::{
    ActionKind, CheckInRequest, Classification, NewActionLogEntry, NewVehicle,
    OperatorContext, PresentationEvent, RefreshTarget, SimulationDetail, SmsSimulation, Vehicle,
    VehiclePatch, VehicleStatus, PLACEHOLDER,
};
use crate::domain::ports::{ActionLogStore, Clock, PresentationSink, SystemClock, VehicleStore};
use crate::utils::error::{Result, YardError};
use crate::utils::validation::{validate_non_empty_string, validate_range, Validate};
use chrono::{DateTime, Duration, Utc};

const MAX_QUOTED_MINUTES: i64 = 24 * 60;

/// Result of a successful check-in, notify or release.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub vehicle: Vehicle,
    pub phone: String,
    pub message: String,
    pub duration_minutes: Option<i64>,
}

/// Drives vehicles through `parked -> notified -> released`.
///
/// Each operation writes the vehicle row first; the audit entry, the
/// simulated SMS entry and the presentation events only follow once that
/// write has succeeded.
pub struct YardWorkflow<S, P, K = SystemClock> {
    store: S,
    sink: P,
    clock: K,
}

impl<S, P> YardWorkflow<S, P, SystemClock>
where
    S: VehicleStore + ActionLogStore,
    P: PresentationSink,
{
    pub fn new(store: S, sink: P) -> Self {
        Self::with_clock(store, sink, SystemClock)
    }
}

impl<S, P, K> YardWorkflow<S, P, K>
where
    S: VehicleStore + ActionLogStore,
    P: PresentationSink,
    K: Clock,
{
    pub fn with_clock(store: S, sink: P, clock: K) -> Self {
        Self { store, sink, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn submit_vehicle(
        &self,
        request: &CheckInRequest,
        ctx: &OperatorContext,
    ) -> Result<TransitionOutcome> {
        request.validate()?;

        let now = self.clock.now();
        let new_vehicle = NewVehicle {
            registration: request.registration.trim().to_string(),
            po_ref: request.po_ref.clone(),
            pager_number: request.pager_number.clone(),
            notes: request.notes.clone(),
            quoted_minutes: request.quoted_minutes,
            check_in_time: now,
            due_time: now + Duration::minutes(request.quoted_minutes),
            status: VehicleStatus::Parked,
            operator_id: ctx.operator_id.clone(),
            classification: if request.is_export {
                Classification::Export
            } else {
                Classification::Normal
            },
        };

        let vehicle = self.store.insert_vehicle(&new_vehicle).await.map_err(|e| {
            tracing::error!("❌ Check-in of {} failed: {}", new_vehicle.registration, e);
            e
        })?;
        tracing::info!("🚚 {} checked in as {}", vehicle.registration, vehicle.id);

        self.store
            .append(&NewActionLogEntry::action(
                &vehicle.id,
                ctx,
                ActionKind::CheckIn,
                now,
            ))
            .await?;

        let phone = if request.pager_number.is_empty() {
            PLACEHOLDER.to_string()
        } else {
            request.pager_number.clone()
        };
        let message = generate_message(
            ActionKind::CheckIn.as_str(),
            &MessageData {
                phone: phone.clone(),
                po_ref: request.po_ref.clone(),
                quoted_minutes: Some(request.quoted_minutes),
                ..Default::default()
            },
        );
        self.log_sms(&vehicle.id, ctx, ActionKind::CheckIn, &phone, &message)
            .await;

        self.sink.emit(PresentationEvent::QrDisplay {
            vehicle_id: vehicle.id.clone(),
        });
        self.sink.emit(PresentationEvent::SmsSimulator(SmsSimulation {
            vehicle_id: vehicle.id.clone(),
            kind: ActionKind::CheckIn,
            phone: phone.clone(),
            po_ref: request.po_ref.clone(),
            detail: SimulationDetail::QuotedMinutes(request.quoted_minutes),
            message: message.clone(),
        }));

        Ok(TransitionOutcome {
            vehicle,
            phone,
            message,
            duration_minutes: None,
        })
    }

    pub async fn notify(
        &self,
        vehicle_id: &str,
        ctx: &OperatorContext,
    ) -> Result<TransitionOutcome> {
        self.current(vehicle_id, "notify", &[VehicleStatus::Parked]).await?;

        let now = self.clock.now();

        let vehicle = self
            .store
            .update_vehicle(vehicle_id, &VehiclePatch::notified(now))
            .await
            .map_err(|e| {
                tracing::error!("❌ Notify of {} failed: {}", vehicle_id, e);
                e
            })?
            .ok_or_else(|| YardError::not_found("vehicle", vehicle_id))?;
        tracing::info!("📣 {} notified", vehicle.registration);

        let phone = vehicle.contact_phone();
        let po_ref = vehicle.po_or_placeholder();

        self.store
            .append(&NewActionLogEntry::action(
                vehicle_id,
                ctx,
                ActionKind::Notified,
                now,
            ))
            .await?;

        let message = generate_message(
            ActionKind::Notified.as_str(),
            &MessageData {
                po_ref: po_ref.clone(),
                ..Default::default()
            },
        );
        self.log_sms(vehicle_id, ctx, ActionKind::Notified, &phone, &message)
            .await;

        self.sink.emit(PresentationEvent::SmsSimulator(SmsSimulation {
            vehicle_id: vehicle_id.to_string(),
            kind: ActionKind::Notified,
            phone: phone.clone(),
            po_ref,
            detail: SimulationDetail::None,
            message: message.clone(),
        }));
        self.refresh();

        Ok(TransitionOutcome {
            vehicle,
            phone,
            message,
            duration_minutes: None,
        })
    }

    pub async fn release(
        &self,
        vehicle_id: &str,
        ctx: &OperatorContext,
    ) -> Result<TransitionOutcome> {
        // 先讀取入場時間以計算停留時間
        let checked_in = self
            .current(
                vehicle_id,
                "release",
                &[VehicleStatus::Parked, VehicleStatus::Notified],
            )
            .await?;

        let now = self.clock.now();
        let vehicle = self
            .store
            .update_vehicle(vehicle_id, &VehiclePatch::released(now))
            .await
            .map_err(|e| {
                tracing::error!("❌ Release of {} failed: {}", vehicle_id, e);
                e
            })?
            .ok_or_else(|| YardError::not_found("vehicle", vehicle_id))?;

        let minutes = elapsed_minutes(checked_in.check_in_time, now);
        let duration = format_duration(minutes);
        tracing::info!("🏁 {} released after {}", vehicle.registration, duration);

        let phone = checked_in.contact_phone();
        let po_ref = checked_in.po_or_placeholder();

        self.store
            .append(&NewActionLogEntry::action(
                vehicle_id,
                ctx,
                ActionKind::Released,
                now,
            ))
            .await?;

        let message = generate_message(
            ActionKind::Released.as_str(),
            &MessageData {
                po_ref: po_ref.clone(),
                duration: duration.clone(),
                ..Default::default()
            },
        );
        self.log_sms(vehicle_id, ctx, ActionKind::Released, &phone, &message)
            .await;

        self.sink.emit(PresentationEvent::SmsSimulator(SmsSimulation {
            vehicle_id: vehicle_id.to_string(),
            kind: ActionKind::Released,
            phone: phone.clone(),
            po_ref,
            detail: SimulationDetail::Duration(duration),
            message: message.clone(),
        }));
        self.refresh();

        Ok(TransitionOutcome {
            vehicle,
            phone,
            message,
            duration_minutes: Some(minutes),
        })
    }

    /// 讀取車輛並確認目前狀態允許此動作
    async fn current(
        &self,
        vehicle_id: &str,
        action: &str,
        allowed: &[VehicleStatus],
    ) -> Result<Vehicle> {
        let vehicle = self
            .store
            .get_vehicle(vehicle_id)
            .await?
            .ok_or_else(|| YardError::not_found("vehicle", vehicle_id))?;

        if !allowed.contains(&vehicle.status) {
            tracing::warn!(
                "⚠️ {} is {}, refusing to {}",
                vehicle.registration,
                vehicle.status.as_str(),
                action
            );
            return Err(YardError::InvalidTransition {
                id: vehicle_id.to_string(),
                status: vehicle.status.as_str().to_string(),
                action: action.to_string(),
            });
        }
        Ok(vehicle)
    }

    /// 簡訊紀錄失敗只記錄錯誤，不中斷流程
    async fn log_sms(
        &self,
        vehicle_id: &str,
        ctx: &OperatorContext,
        kind: ActionKind,
        phone: &str,
        content: &str,
    ) {
        let now = self.clock.now();
        let entry = NewActionLogEntry::simulated_sms(vehicle_id, ctx, kind, now, phone, content);

        match self.store.append(&entry).await {
            Ok(_) => tracing::debug!("📱 Simulated {} SMS to {}", kind, phone),
            Err(e) => tracing::error!("Failed to log SMS for {}: {}", vehicle_id, e),
        }
    }

    fn refresh(&self) {
        self.sink
            .emit(PresentationEvent::Refresh(RefreshTarget::Vehicles));
        self.sink.emit(PresentationEvent::Refresh(RefreshTarget::Logs));
    }
}

impl Validate for CheckInRequest {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("registration", &self.registration).map_err(|_| {
            YardError::ValidationError {
                message: "registration is required".to_string(),
            }
        })?;
        validate_range("quoted_minutes", self.quoted_minutes, 0, MAX_QUOTED_MINUTES).map_err(
            |e| YardError::ValidationError {
                message: e.to_string(),
            },
        )?;
        Ok(())
    }
}

/// Whole minutes between two instants, rounded down.
pub fn elapsed_minutes(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_milliseconds().div_euclid(60_000)
}

pub fn format_duration(minutes: i64) -> String {
    format!("{} mins", minutes)
}
