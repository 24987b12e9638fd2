use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const TOPIC_BOOKING_CONFIRMED: &str = "booking.confirmed";
pub const TOPIC_BOOKING_FAILED: &str = "booking.failed";

/// Emitted exactly once after the booking transaction commits.
/// Snapshots are full JSON renditions of the committed rows so consumers
/// never have to read the relational store to react.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmedEvent {
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub booking: serde_json::Value,
    pub items: serde_json::Value,
    pub billing: serde_json::Value,
    pub emitted_by: String,
    pub emitted_at: DateTime<Utc>,
}

/// Emitted at most once per failed booking attempt. The transaction has
/// already rolled back, so `booking` is the pre-abort snapshot when one
/// exists and null otherwise.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookingFailedEvent {
    pub booking_id: Option<Uuid>,
    pub user_id: Uuid,
    pub booking: Option<serde_json::Value>,
    pub error_code: String,
    pub emitted_by: String,
    pub emitted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmed_event_round_trips_camel_case() {
        let evt = BookingConfirmedEvent {
            booking_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            booking: serde_json::json!({"status": "CONFIRMED"}),
            items: serde_json::json!([]),
            billing: serde_json::json!({"status": "SUCCESS"}),
            emitted_by: "wayfare-api".to_string(),
            emitted_at: Utc::now(),
        };

        let raw = serde_json::to_string(&evt).unwrap();
        assert!(raw.contains("\"bookingId\""));
        assert!(raw.contains("\"emittedBy\""));

        let back: BookingConfirmedEvent = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.booking_id, evt.booking_id);
    }

    #[test]
    fn failed_event_allows_null_booking() {
        let evt = BookingFailedEvent {
            booking_id: None,
            user_id: Uuid::new_v4(),
            booking: None,
            error_code: "no_inventory".to_string(),
            emitted_by: "wayfare-api".to_string(),
            emitted_at: Utc::now(),
        };

        let raw = serde_json::to_value(&evt).unwrap();
        assert!(raw["booking"].is_null());
        assert_eq!(raw["errorCode"], "no_inventory");
    }
}
