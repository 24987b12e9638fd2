//! Document-store entities. Ids are stored as plain strings and timestamps
//! as BSON dates so the collections stay queryable from shell tooling and
//! the out-of-scope workers that share them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use wayfare_core::error::DomainError;

pub const COLLECTION_REVIEWS: &str = "reviews";
pub const COLLECTION_CLICKSTREAM: &str = "clickstream_events";
pub const COLLECTION_DEAL_SNAPSHOTS: &str = "deal_snapshots";
pub const COLLECTION_ADMIN_AUDIT_LOGS: &str = "admin_audit_logs";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub user_id: String,
    pub listing_type: String,
    pub listing_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    pub rating: i32,
    pub title: String,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stay_date: Option<NaiveDate>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClickEventType {
    PageView,
    Click,
    Search,
    BookingStarted,
    BookingCompleted,
    BookingFailed,
    Scroll,
    Custom,
}

impl std::fmt::Display for ClickEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ClickEventType::PageView => "PAGE_VIEW",
            ClickEventType::Click => "CLICK",
            ClickEventType::Search => "SEARCH",
            ClickEventType::BookingStarted => "BOOKING_STARTED",
            ClickEventType::BookingCompleted => "BOOKING_COMPLETED",
            ClickEventType::BookingFailed => "BOOKING_FAILED",
            ClickEventType::Scroll => "SCROLL",
            ClickEventType::Custom => "CUSTOM",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ClickEventType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PAGE_VIEW" => Ok(ClickEventType::PageView),
            "CLICK" => Ok(ClickEventType::Click),
            "SEARCH" => Ok(ClickEventType::Search),
            "BOOKING_STARTED" => Ok(ClickEventType::BookingStarted),
            "BOOKING_COMPLETED" => Ok(ClickEventType::BookingCompleted),
            "BOOKING_FAILED" => Ok(ClickEventType::BookingFailed),
            "SCROLL" => Ok(ClickEventType::Scroll),
            "CUSTOM" => Ok(ClickEventType::Custom),
            other => Err(DomainError::InvalidEventType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickstreamEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub session_id: String,
    pub event_type: ClickEventType,
    pub page: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_covers_the_enum() {
        for raw in [
            "PAGE_VIEW",
            "CLICK",
            "SEARCH",
            "BOOKING_STARTED",
            "BOOKING_COMPLETED",
            "BOOKING_FAILED",
            "SCROLL",
            "CUSTOM",
        ] {
            let parsed: ClickEventType = raw.parse().unwrap();
            assert_eq!(parsed.to_string(), raw);
        }
    }

    #[test]
    fn unknown_event_type_reports_its_name() {
        let err = "HOVER".parse::<ClickEventType>().unwrap_err();
        assert_eq!(err.code(), "invalid_event_type");
        assert!(err.to_string().contains("HOVER"));
    }

    #[test]
    fn review_serializes_camel_case() {
        let review = Review {
            user_id: "u-1".into(),
            listing_type: "HOTEL".into(),
            listing_id: "h-1".into(),
            booking_id: None,
            rating: 5,
            title: "Great stay".into(),
            comment: "Would return".into(),
            stay_date: None,
            metadata: serde_json::json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let doc = bson::to_document(&review).unwrap();
        assert!(doc.contains_key("listingType"));
        assert!(doc.contains_key("createdAt"));
        assert!(!doc.contains_key("bookingId"));
    }
}
