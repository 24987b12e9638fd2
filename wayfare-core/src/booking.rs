use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Failed,
    Canceled,
}

impl BookingStatus {
    /// Bookings move forward only: PENDING is the sole non-terminal state.
    pub fn can_transition(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Failed)
                | (BookingStatus::Pending, BookingStatus::Canceled)
        )
    }

    pub fn is_terminal(self) -> bool {
        self != BookingStatus::Pending
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Failed => "FAILED",
            BookingStatus::Canceled => "CANCELED",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "FAILED" => Ok(BookingStatus::Failed),
            "CANCELED" => Ok(BookingStatus::Canceled),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    Flight,
    Hotel,
    Car,
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ItemType::Flight => "FLIGHT",
            ItemType::Hotel => "HOTEL",
            ItemType::Car => "CAR",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ItemType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FLIGHT" => Ok(ItemType::Flight),
            "HOTEL" => Ok(ItemType::Hotel),
            "CAR" => Ok(ItemType::Car),
            other => Err(DomainError::InvalidListingType(other.to_string())),
        }
    }
}

/// Header row grouping the items of one customer purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: BookingStatus,
    pub total_amount: i64,
    pub currency: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single reserved unit tied to exactly one inventory row; the foreign key
/// matching `item_type` is the only one set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingItem {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub item_type: ItemType,
    pub flight_id: Option<Uuid>,
    pub hotel_id: Option<Uuid>,
    pub car_id: Option<Uuid>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub quantity: i32,
    pub unit_price: i64,
    pub total_price: i64,
    pub currency: String,
    pub metadata: serde_json::Value,
}

impl BookingItem {
    pub fn listing_id(&self) -> Option<Uuid> {
        match self.item_type {
            ItemType::Flight => self.flight_id,
            ItemType::Hotel => self.hotel_id,
            ItemType::Car => self.car_id,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingStatus {
    Success,
    Failed,
}

impl std::fmt::Display for BillingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BillingStatus::Success => write!(f, "SUCCESS"),
            BillingStatus::Failed => write!(f, "FAILED"),
        }
    }
}

impl std::str::FromStr for BillingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUCCESS" => Ok(BillingStatus::Success),
            "FAILED" => Ok(BillingStatus::Failed),
            other => Err(format!("unknown billing status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingTransaction {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub payment_method: String,
    pub payment_token: String,
    pub provider_reference: Option<String>,
    pub status: BillingStatus,
    pub error_code: Option<String>,
    pub raw_response: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_reaches_each_terminal_state_once() {
        assert!(BookingStatus::Pending.can_transition(BookingStatus::Confirmed));
        assert!(BookingStatus::Pending.can_transition(BookingStatus::Failed));
        assert!(BookingStatus::Pending.can_transition(BookingStatus::Canceled));
    }

    #[test]
    fn terminal_states_never_move() {
        for terminal in [BookingStatus::Confirmed, BookingStatus::Failed, BookingStatus::Canceled] {
            assert!(terminal.is_terminal());
            for next in [
                BookingStatus::Pending,
                BookingStatus::Confirmed,
                BookingStatus::Failed,
                BookingStatus::Canceled,
            ] {
                assert!(!terminal.can_transition(next));
            }
        }
    }

    #[test]
    fn item_listing_id_follows_item_type() {
        let flight_id = Uuid::new_v4();
        let item = BookingItem {
            id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            item_type: ItemType::Flight,
            flight_id: Some(flight_id),
            hotel_id: None,
            car_id: None,
            start_date: Utc::now(),
            end_date: Utc::now(),
            quantity: 2,
            unit_price: 15_000,
            total_price: 30_000,
            currency: "USD".into(),
            metadata: serde_json::json!({}),
        };
        assert_eq!(item.listing_id(), Some(flight_id));
    }

    #[test]
    fn status_strings_round_trip() {
        for s in ["PENDING", "CONFIRMED", "FAILED", "CANCELED"] {
            let parsed: BookingStatus = s.parse().unwrap();
            assert_eq!(parsed.to_string(), s);
        }
        assert!("REFUNDED".parse::<BookingStatus>().is_err());
    }
}
