//! Simulated SMS bodies. Values are interpolated as-is, without escaping.

pub const FALLBACK_MESSAGE: &str = "System notification";

/// Values a template may reference. Absent values render as empty text.
#[derive(Debug, Clone, Default)]
pub struct MessageData {
    pub phone: String,
    pub po_ref: String,
    pub quoted_minutes: Option<i64>,
    pub duration: String,
}

pub fn generate_message(kind: &str, data: &MessageData) -> String {
    let quoted = data
        .quoted_minutes
        .map(|minutes| minutes.to_string())
        .unwrap_or_default();

    match kind {
        "check_in" => format!(
            "Welcome to DCS! You have been successfully checked in at the Gatehouse. \
             Your mobile number: {}. Please keep your phone nearby — we will contact you when \
             it's time to proceed. Reference: {}. Estimated wait: {} minutes. \
             Thank you for your patience.",
            data.phone, data.po_ref, quoted
        ),
        "notified" => format!(
            "ACTION REQUIRED - Please proceed immediately to the loading area. \
             Bay Assignment: TBC on arrival. Ensure your paperwork is ready and follow \
             instructions from Goods-Out staff. Reference: {}. Thank you.",
            data.po_ref
        ),
        "released" => format!(
            "Loading Complete - You may now proceed to the gatehouse exit. \
             Please ensure you have all documentation before leaving. Reference: {}. \
             Total time on site: {}. Safe travels!",
            data.po_ref, data.duration
        ),
        _ => FALLBACK_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> MessageData {
        MessageData {
            phone: "07000000000".to_string(),
            po_ref: "PO-100".to_string(),
            quoted_minutes: Some(30),
            duration: "45 mins".to_string(),
        }
    }

    fn assert_no_placeholder_syntax(message: &str) {
        assert!(!message.contains("${"), "{}", message);
        assert!(!message.contains('{'), "{}", message);
    }

    #[test]
    fn test_check_in_template() {
        let message = generate_message("check_in", &data());
        assert!(message.contains("Your mobile number: 07000000000."));
        assert!(message.contains("Reference: PO-100."));
        assert!(message.contains("Estimated wait: 30 minutes."));
        assert!(message.starts_with("Welcome to DCS!"));
        assert_no_placeholder_syntax(&message);
    }

    #[test]
    fn test_notified_template() {
        let message = generate_message("notified", &data());
        assert!(message.starts_with("ACTION REQUIRED"));
        assert!(message.contains("Reference: PO-100."));
        assert!(!message.contains("07000000000"));
        assert_no_placeholder_syntax(&message);
    }

    #[test]
    fn test_released_template() {
        let message = generate_message("released", &data());
        assert!(message.contains("Reference: PO-100."));
        assert!(message.contains("Total time on site: 45 mins."));
        assert_no_placeholder_syntax(&message);
    }

    #[test]
    fn test_unknown_kind_falls_back() {
        assert_eq!(generate_message("cancelled", &data()), "System notification");
        assert_eq!(generate_message("", &MessageData::default()), FALLBACK_MESSAGE);
    }

    #[test]
    fn test_values_are_not_escaped() {
        let mut data = data();
        data.po_ref = "<b>PO&1</b>".to_string();
        assert!(generate_message("notified", &data).contains("Reference: <b>PO&1</b>."));
    }
}
