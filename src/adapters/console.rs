use crate::domain::model::{PresentationEvent, RefreshTarget, SmsSimulation};
use crate::domain::ports::PresentationSink;

/// Shows presentation events in the terminal in place of the browser popups.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn render(event: &PresentationEvent) -> Option<String> {
        match event {
            PresentationEvent::QrDisplay { vehicle_id } => Some(format!(
                "🔳 QR screen: {}",
                PresentationEvent::qr_link(vehicle_id)
            )),
            PresentationEvent::SmsSimulator(sim) => Some(Self::render_sms(sim)),
            PresentationEvent::Refresh(_) => None,
        }
    }

    fn render_sms(sim: &SmsSimulation) -> String {
        format!(
            "📱 SMS to {} ({})\n    {}\n    simulator: {}",
            sim.phone,
            sim.kind,
            sim.message,
            sim.simulator_link()
        )
    }
}

impl PresentationSink for ConsoleSink {
    fn emit(&self, event: PresentationEvent) {
        if let PresentationEvent::Refresh(target) = &event {
            let what = match target {
                RefreshTarget::Vehicles => "vehicles",
                RefreshTarget::Logs => "logs",
            };
            tracing::debug!("Refresh requested for {}", what);
        }

        if let Some(text) = Self::render(&event) {
            println!("{}", text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ActionKind, SimulationDetail};

    #[test]
    fn test_render_events() {
        let qr = ConsoleSink::render(&PresentationEvent::QrDisplay {
            vehicle_id: "v-1".to_string(),
        });
        assert_eq!(qr.as_deref(), Some("🔳 QR screen: qr-screen.html?uid=v-1"));

        let sms = ConsoleSink::render(&PresentationEvent::SmsSimulator(SmsSimulation {
            vehicle_id: "v-1".to_string(),
            kind: ActionKind::CheckIn,
            phone: "07000000000".to_string(),
            po_ref: "PO-100".to_string(),
            detail: SimulationDetail::QuotedMinutes(30),
            message: "Welcome".to_string(),
        }))
        .unwrap();
        assert!(sms.starts_with("📱 SMS to 07000000000 (check_in)"));
        let link = "sms_simulator.html?type=check_in&phone=07000000000&po=PO-100&quoted=30";
        assert!(sms.ends_with(link));

        assert!(ConsoleSink::render(&PresentationEvent::Refresh(RefreshTarget::Logs)).is_none());
    }
}
