//! Booking request payloads. Pre-validation is cheap and does no I/O; the
//! engine runs it before a transaction is ever opened.

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use wayfare_core::error::DomainError;

/// Common surface the engine needs from every booking payload.
pub trait BookingPayload {
    fn pre_validate(&self) -> Result<(), DomainError>;
    fn payment_token(&self) -> Option<&str>;
    fn expected_total(&self) -> Option<i64>;
    fn notes(&self) -> Option<&str>;
}

fn default_one() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookFlightRequest {
    pub flight_id: Uuid,
    pub seats: i32,
    pub payment_method_token: Option<String>,
    pub expected_total_price: Option<i64>,
    pub notes: Option<String>,
}

impl BookingPayload for BookFlightRequest {
    fn pre_validate(&self) -> Result<(), DomainError> {
        if self.seats < 1 {
            return Err(DomainError::InvalidSeatCount);
        }
        Ok(())
    }

    fn payment_token(&self) -> Option<&str> {
        self.payment_method_token.as_deref()
    }

    fn expected_total(&self) -> Option<i64> {
        self.expected_total_price
    }

    fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookHotelRequest {
    pub hotel_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    #[serde(default = "default_one")]
    pub rooms: i32,
    #[serde(default = "default_one")]
    pub guests: i32,
    pub payment_method_token: Option<String>,
    pub expected_total_price: Option<i64>,
    pub notes: Option<String>,
}

impl BookingPayload for BookHotelRequest {
    fn pre_validate(&self) -> Result<(), DomainError> {
        if self.rooms < 1 {
            return Err(DomainError::InvalidSeatCount);
        }
        if self.check_out_date < self.check_in_date {
            return Err(DomainError::InvalidDateRange);
        }
        Ok(())
    }

    fn payment_token(&self) -> Option<&str> {
        self.payment_method_token.as_deref()
    }

    fn expected_total(&self) -> Option<i64> {
        self.expected_total_price
    }

    fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookCarRequest {
    pub car_id: Uuid,
    pub pickup_date: NaiveDate,
    pub dropoff_date: NaiveDate,
    pub payment_method_token: Option<String>,
    pub expected_total_price: Option<i64>,
    pub notes: Option<String>,
}

impl BookingPayload for BookCarRequest {
    fn pre_validate(&self) -> Result<(), DomainError> {
        if self.dropoff_date < self.pickup_date {
            return Err(DomainError::InvalidDateRange);
        }
        Ok(())
    }

    fn payment_token(&self) -> Option<&str> {
        self.payment_method_token.as_deref()
    }

    fn expected_total(&self) -> Option<i64> {
        self.expected_total_price
    }

    fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn flight_rejects_non_positive_seats() {
        let req = BookFlightRequest {
            flight_id: Uuid::new_v4(),
            seats: 0,
            payment_method_token: Some("tok_ok".into()),
            expected_total_price: None,
            notes: None,
        };
        assert!(matches!(req.pre_validate(), Err(DomainError::InvalidSeatCount)));
    }

    #[test]
    fn hotel_rooms_default_to_one() {
        let req: BookHotelRequest = serde_json::from_value(serde_json::json!({
            "hotelId": Uuid::new_v4(),
            "checkInDate": "2025-07-01",
            "checkOutDate": "2025-07-03",
            "paymentMethodToken": "tok_ok",
        }))
        .unwrap();
        assert_eq!(req.rooms, 1);
        assert_eq!(req.guests, 1);
        assert!(req.pre_validate().is_ok());
    }

    #[test]
    fn car_rejects_reversed_dates() {
        let req = BookCarRequest {
            car_id: Uuid::new_v4(),
            pickup_date: d("2025-07-05"),
            dropoff_date: d("2025-07-01"),
            payment_method_token: Some("tok_ok".into()),
            expected_total_price: None,
            notes: None,
        };
        assert!(matches!(req.pre_validate(), Err(DomainError::InvalidDateRange)));
    }

    #[test]
    fn seat_count_must_be_an_integer_on_the_wire() {
        let raw = serde_json::json!({
            "flightId": Uuid::new_v4(),
            "seats": 1.5,
            "paymentMethodToken": "tok_ok",
        });
        assert!(serde_json::from_value::<BookFlightRequest>(raw).is_err());
    }
}
