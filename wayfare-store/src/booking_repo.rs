//! Booking-path repository. Every mutating function takes the caller's
//! transaction handle; locking and the conditional seat decrement are the
//! primitives the engine's atomicity contract rests on.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use wayfare_core::booking::{
    BillingStatus, BillingTransaction, Booking, BookingItem, BookingStatus, ItemType,
};
use wayfare_core::catalog::{Car, Flight, Hotel};
use wayfare_core::error::DomainError;

use crate::error::map_sqlx;
use crate::rows::{BillingRow, BookingItemRow, BookingRow, CarRow, FlightRow, HotelRow};
use crate::PgTx;

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: Uuid,
    pub total_amount: i64,
    pub currency: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewBookingItem {
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

#[derive(Debug, Clone)]
pub struct NewBillingTransaction {
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
}

/// `past|current|future|all` partitions of a user's bookings, split on
/// `end_date` against now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookingScope {
    Past,
    Current,
    Future,
    #[default]
    All,
}

impl std::str::FromStr for BookingScope {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "past" => Ok(BookingScope::Past),
            "current" => Ok(BookingScope::Current),
            "future" => Ok(BookingScope::Future),
            "all" => Ok(BookingScope::All),
            _ => Err(DomainError::MissingField("scope")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingWithItems {
    #[serde(flatten)]
    pub booking: Booking,
    pub items: Vec<BookingItem>,
}

pub struct BookingRepository;

impl BookingRepository {
    // ------------------------------------------------------------------
    // Locking loads
    // ------------------------------------------------------------------

    /// Acquires a row-level exclusive lock; concurrent bookings of the same
    /// flight serialize here.
    pub async fn find_flight_for_update(
        tx: &mut PgTx<'_>,
        id: Uuid,
    ) -> Result<Option<Flight>, DomainError> {
        let row = sqlx::query_as::<_, FlightRow>("SELECT * FROM flights WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(map_sqlx)?;

        Ok(row.map(Flight::from))
    }

    pub async fn find_hotel_for_update(
        tx: &mut PgTx<'_>,
        id: Uuid,
    ) -> Result<Option<Hotel>, DomainError> {
        let row = sqlx::query_as::<_, HotelRow>("SELECT * FROM hotels WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(map_sqlx)?;

        Ok(row.map(Hotel::from))
    }

    pub async fn find_car_for_update(
        tx: &mut PgTx<'_>,
        id: Uuid,
    ) -> Result<Option<Car>, DomainError> {
        let row = sqlx::query_as::<_, CarRow>("SELECT * FROM cars WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(map_sqlx)?;

        Ok(row.map(Car::from))
    }

    /// Bounds the FOR UPDATE wait for the rest of this transaction.
    pub async fn set_lock_timeout(tx: &mut PgTx<'_>, timeout_ms: u64) -> Result<(), DomainError> {
        sqlx::query(&format!("SET LOCAL lock_timeout = '{timeout_ms}ms'"))
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Inventory
    // ------------------------------------------------------------------

    /// Conditional decrement; zero affected rows means the seats are gone.
    pub async fn decrement_seats(
        tx: &mut PgTx<'_>,
        flight_id: Uuid,
        seats: i32,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE flights SET seats_available = seats_available - $2 \
             WHERE id = $1 AND seats_available >= $2",
        )
        .bind(flight_id)
        .bind(seats)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NoInventory);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Booking / item / billing writes
    // ------------------------------------------------------------------

    pub async fn create_booking(
        tx: &mut PgTx<'_>,
        new: NewBooking,
    ) -> Result<Booking, DomainError> {
        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            status: BookingStatus::Pending,
            total_amount: new.total_amount,
            currency: new.currency,
            start_date: new.start_date,
            end_date: new.end_date,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO bookings (id, user_id, status, total_amount, currency, start_date, end_date, notes, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(booking.id)
        .bind(booking.user_id)
        .bind(booking.status.to_string())
        .bind(booking.total_amount)
        .bind(&booking.currency)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(&booking.notes)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx)?;

        Ok(booking)
    }

    pub async fn create_booking_item(
        tx: &mut PgTx<'_>,
        new: NewBookingItem,
    ) -> Result<BookingItem, DomainError> {
        let item = BookingItem {
            id: Uuid::new_v4(),
            booking_id: new.booking_id,
            item_type: new.item_type,
            flight_id: new.flight_id,
            hotel_id: new.hotel_id,
            car_id: new.car_id,
            start_date: new.start_date,
            end_date: new.end_date,
            quantity: new.quantity,
            unit_price: new.unit_price,
            total_price: new.total_price,
            currency: new.currency,
            metadata: new.metadata,
        };

        sqlx::query(
            "INSERT INTO booking_items (id, booking_id, item_type, flight_id, hotel_id, car_id, \
             start_date, end_date, quantity, unit_price, total_price, currency, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(item.id)
        .bind(item.booking_id)
        .bind(item.item_type.to_string())
        .bind(item.flight_id)
        .bind(item.hotel_id)
        .bind(item.car_id)
        .bind(item.start_date)
        .bind(item.end_date)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.total_price)
        .bind(&item.currency)
        .bind(&item.metadata)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx)?;

        Ok(item)
    }

    /// PENDING is the only movable state; the guard makes a second terminal
    /// transition impossible at the store level.
    pub async fn update_booking_status(
        tx: &mut PgTx<'_>,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE bookings SET status = $2, updated_at = NOW() \
             WHERE id = $1 AND status = 'PENDING'",
        )
        .bind(booking_id)
        .bind(status.to_string())
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::internal(format!(
                "booking {booking_id} is not PENDING"
            )));
        }
        Ok(())
    }

    pub async fn create_billing_transaction(
        tx: &mut PgTx<'_>,
        new: NewBillingTransaction,
    ) -> Result<BillingTransaction, DomainError> {
        let billing = BillingTransaction {
            id: Uuid::new_v4(),
            booking_id: new.booking_id,
            user_id: new.user_id,
            amount: new.amount,
            currency: new.currency,
            payment_method: new.payment_method,
            payment_token: new.payment_token,
            provider_reference: new.provider_reference,
            status: new.status,
            error_code: new.error_code,
            raw_response: new.raw_response,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO billing_transactions (id, booking_id, user_id, amount, currency, \
             payment_method, payment_token, provider_reference, status, error_code, raw_response, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(billing.id)
        .bind(billing.booking_id)
        .bind(billing.user_id)
        .bind(billing.amount)
        .bind(&billing.currency)
        .bind(&billing.payment_method)
        .bind(&billing.payment_token)
        .bind(&billing.provider_reference)
        .bind(billing.status.to_string())
        .bind(&billing.error_code)
        .bind(&billing.raw_response)
        .bind(billing.created_at)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx)?;

        Ok(billing)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
        scope: BookingScope,
    ) -> Result<Vec<BookingWithItems>, DomainError> {
        let scope_sql = match scope {
            BookingScope::Past => " AND end_date < NOW()",
            BookingScope::Current => " AND start_date <= NOW() AND end_date >= NOW()",
            BookingScope::Future => " AND start_date > NOW()",
            BookingScope::All => "",
        };

        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT * FROM bookings WHERE user_id = $1{scope_sql} ORDER BY created_at DESC, id ASC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(map_sqlx)?;

        let mut bookings = Vec::with_capacity(rows.len());
        for row in rows {
            let booking = Booking::from(row);
            let items = Self::items_for_booking(pool, booking.id).await?;
            bookings.push(BookingWithItems { booking, items });
        }

        Ok(bookings)
    }

    pub async fn items_for_booking(
        pool: &PgPool,
        booking_id: Uuid,
    ) -> Result<Vec<BookingItem>, DomainError> {
        let rows = sqlx::query_as::<_, BookingItemRow>(
            "SELECT * FROM booking_items WHERE booking_id = $1 ORDER BY id ASC",
        )
        .bind(booking_id)
        .fetch_all(pool)
        .await
        .map_err(map_sqlx)?;

        Ok(rows.into_iter().map(BookingItem::from).collect())
    }

    pub async fn billing_for_booking(
        pool: &PgPool,
        booking_id: Uuid,
    ) -> Result<Option<BillingTransaction>, DomainError> {
        let row = sqlx::query_as::<_, BillingRow>(
            "SELECT * FROM billing_transactions WHERE booking_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(booking_id)
        .fetch_optional(pool)
        .await
        .map_err(map_sqlx)?;

        Ok(row.map(BillingTransaction::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_parses_the_four_partitions() {
        assert_eq!("past".parse::<BookingScope>().unwrap(), BookingScope::Past);
        assert_eq!("current".parse::<BookingScope>().unwrap(), BookingScope::Current);
        assert_eq!("future".parse::<BookingScope>().unwrap(), BookingScope::Future);
        assert_eq!("all".parse::<BookingScope>().unwrap(), BookingScope::All);
        assert!("upcoming".parse::<BookingScope>().is_err());
    }
}
