//! One capability set per inventory kind. The engine is a single orchestrator
//! generic over these; everything kind-specific (locking query, pricing,
//! decrement, item shape) lives here.

use async_trait::async_trait;
use chrono::NaiveTime;
use uuid::Uuid;

use wayfare_catalog::pricing::{rental_days, stay_nights, Quote};
use wayfare_core::booking::ItemType;
use wayfare_core::catalog::{Car, Flight, Hotel};
use wayfare_core::error::DomainError;
use wayfare_store::booking_repo::NewBookingItem;
use wayfare_store::{BookingRepository, PgTx};

use crate::payload::{BookCarRequest, BookFlightRequest, BookHotelRequest, BookingPayload};

#[async_trait]
pub trait InventoryKind: Send + Sync {
    type Payload: BookingPayload + Send + Sync;
    type Row: Send + Sync;

    const ITEM_TYPE: ItemType;

    fn not_found() -> DomainError;

    /// Row-level exclusive lock on the inventory row; concurrent attempts on
    /// the same row serialize here.
    async fn lock_and_load(
        tx: &mut PgTx<'_>,
        payload: &Self::Payload,
    ) -> Result<Option<Self::Row>, DomainError>;

    /// Checks the locked row is sellable and recomputes the price from it.
    fn verify_and_quote(row: &Self::Row, payload: &Self::Payload) -> Result<Quote, DomainError>;

    /// Atomic inventory decrement inside the caller's transaction.
    async fn decrement(
        tx: &mut PgTx<'_>,
        row: &Self::Row,
        payload: &Self::Payload,
    ) -> Result<(), DomainError>;

    fn build_item(
        row: &Self::Row,
        payload: &Self::Payload,
        quote: &Quote,
        booking_id: Uuid,
    ) -> NewBookingItem;
}

// ----------------------------------------------------------------------
// Flight
// ----------------------------------------------------------------------

pub struct FlightKind;

#[async_trait]
impl InventoryKind for FlightKind {
    type Payload = BookFlightRequest;
    type Row = Flight;

    const ITEM_TYPE: ItemType = ItemType::Flight;

    fn not_found() -> DomainError {
        DomainError::FlightNotFound
    }

    async fn lock_and_load(
        tx: &mut PgTx<'_>,
        payload: &Self::Payload,
    ) -> Result<Option<Self::Row>, DomainError> {
        BookingRepository::find_flight_for_update(tx, payload.flight_id).await
    }

    fn verify_and_quote(row: &Self::Row, payload: &Self::Payload) -> Result<Quote, DomainError> {
        if !row.is_active {
            return Err(DomainError::FlightNotFound);
        }
        if row.seats_available < payload.seats {
            return Err(DomainError::NoInventory);
        }
        if row.base_price <= 0 {
            return Err(DomainError::InvalidPrice);
        }
        Ok(Quote::new(
            row.base_price,
            payload.seats,
            &row.currency,
            row.departure_time,
            row.arrival_time,
        ))
    }

    async fn decrement(
        tx: &mut PgTx<'_>,
        row: &Self::Row,
        payload: &Self::Payload,
    ) -> Result<(), DomainError> {
        BookingRepository::decrement_seats(tx, row.id, payload.seats).await
    }

    fn build_item(
        row: &Self::Row,
        _payload: &Self::Payload,
        quote: &Quote,
        booking_id: Uuid,
    ) -> NewBookingItem {
        NewBookingItem {
            booking_id,
            item_type: Self::ITEM_TYPE,
            flight_id: Some(row.id),
            hotel_id: None,
            car_id: None,
            start_date: quote.start,
            end_date: quote.end,
            quantity: quote.quantity,
            unit_price: quote.unit_price,
            total_price: quote.total,
            currency: quote.currency.clone(),
            metadata: serde_json::json!({
                "airline": row.airline,
                "flightNumber": row.flight_number,
                "cabinClass": row.cabin_class,
                "originAirportId": row.origin_airport_id,
                "destinationAirportId": row.destination_airport_id,
            }),
        }
    }
}

// ----------------------------------------------------------------------
// Hotel
// ----------------------------------------------------------------------

pub struct HotelKind;

#[async_trait]
impl InventoryKind for HotelKind {
    type Payload = BookHotelRequest;
    type Row = Hotel;

    const ITEM_TYPE: ItemType = ItemType::Hotel;

    fn not_found() -> DomainError {
        DomainError::HotelNotFound
    }

    async fn lock_and_load(
        tx: &mut PgTx<'_>,
        payload: &Self::Payload,
    ) -> Result<Option<Self::Row>, DomainError> {
        BookingRepository::find_hotel_for_update(tx, payload.hotel_id).await
    }

    /// Unit price is the nightly rate times rooms; quantity is nights.
    fn verify_and_quote(row: &Self::Row, payload: &Self::Payload) -> Result<Quote, DomainError> {
        if !row.is_active {
            return Err(DomainError::HotelNotFound);
        }
        if row.base_price_per_night <= 0 {
            return Err(DomainError::InvalidPrice);
        }
        let nights = stay_nights(payload.check_in_date, payload.check_out_date)?;
        Ok(Quote::new(
            row.base_price_per_night * payload.rooms as i64,
            nights as i32,
            &row.currency,
            payload.check_in_date.and_time(NaiveTime::MIN).and_utc(),
            payload.check_out_date.and_time(NaiveTime::MIN).and_utc(),
        ))
    }

    /// Hotels carry no per-room inventory counter; the exclusive lock plus
    /// the active check is the whole reservation step.
    async fn decrement(
        _tx: &mut PgTx<'_>,
        _row: &Self::Row,
        _payload: &Self::Payload,
    ) -> Result<(), DomainError> {
        Ok(())
    }

    fn build_item(
        row: &Self::Row,
        payload: &Self::Payload,
        quote: &Quote,
        booking_id: Uuid,
    ) -> NewBookingItem {
        NewBookingItem {
            booking_id,
            item_type: Self::ITEM_TYPE,
            flight_id: None,
            hotel_id: Some(row.id),
            car_id: None,
            start_date: quote.start,
            end_date: quote.end,
            quantity: quote.quantity,
            unit_price: quote.unit_price,
            total_price: quote.total,
            currency: quote.currency.clone(),
            metadata: serde_json::json!({
                "hotelName": row.name,
                "city": row.city,
                "rooms": payload.rooms,
                "guests": payload.guests,
            }),
        }
    }
}

// ----------------------------------------------------------------------
// Car
// ----------------------------------------------------------------------

pub struct CarKind;

#[async_trait]
impl InventoryKind for CarKind {
    type Payload = BookCarRequest;
    type Row = Car;

    const ITEM_TYPE: ItemType = ItemType::Car;

    fn not_found() -> DomainError {
        DomainError::CarNotFound
    }

    async fn lock_and_load(
        tx: &mut PgTx<'_>,
        payload: &Self::Payload,
    ) -> Result<Option<Self::Row>, DomainError> {
        BookingRepository::find_car_for_update(tx, payload.car_id).await
    }

    fn verify_and_quote(row: &Self::Row, payload: &Self::Payload) -> Result<Quote, DomainError> {
        if !row.is_active {
            return Err(DomainError::CarNotFound);
        }
        if row.daily_price <= 0 {
            return Err(DomainError::InvalidPrice);
        }
        let days = rental_days(payload.pickup_date, payload.dropoff_date)?;
        Ok(Quote::new(
            row.daily_price,
            days as i32,
            &row.currency,
            payload.pickup_date.and_time(NaiveTime::MIN).and_utc(),
            payload.dropoff_date.and_time(NaiveTime::MIN).and_utc(),
        ))
    }

    /// Car rows carry no fleet counter; availability is the active flag.
    async fn decrement(
        _tx: &mut PgTx<'_>,
        _row: &Self::Row,
        _payload: &Self::Payload,
    ) -> Result<(), DomainError> {
        Ok(())
    }

    fn build_item(
        row: &Self::Row,
        _payload: &Self::Payload,
        quote: &Quote,
        booking_id: Uuid,
    ) -> NewBookingItem {
        NewBookingItem {
            booking_id,
            item_type: Self::ITEM_TYPE,
            flight_id: None,
            hotel_id: None,
            car_id: Some(row.id),
            start_date: quote.start,
            end_date: quote.end,
            quantity: quote.quantity,
            unit_price: quote.unit_price,
            total_price: quote.total,
            currency: quote.currency.clone(),
            metadata: serde_json::json!({
                "providerName": row.provider_name,
                "make": row.make,
                "model": row.model,
                "carType": row.car_type,
                "pickupCity": row.pickup_city,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, Utc};
    use wayfare_core::catalog::CarType;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn flight(seats: i32, active: bool) -> Flight {
        Flight {
            id: Uuid::new_v4(),
            airline: "Meridian Air".into(),
            flight_number: "MA118".into(),
            origin_airport_id: Uuid::new_v4(),
            destination_airport_id: Uuid::new_v4(),
            departure_time: Utc::now(),
            arrival_time: Utc::now() + Duration::hours(5),
            cabin_class: "ECONOMY".into(),
            base_price: 18_500,
            currency: "USD".into(),
            seats_available: seats,
            stops: 0,
            total_duration_minutes: 300,
            is_active: active,
        }
    }

    fn flight_payload(seats: i32) -> BookFlightRequest {
        BookFlightRequest {
            flight_id: Uuid::new_v4(),
            seats,
            payment_method_token: Some("tok_ok".into()),
            expected_total_price: None,
            notes: None,
        }
    }

    #[test]
    fn flight_quote_multiplies_seats() {
        let quote = FlightKind::verify_and_quote(&flight(5, true), &flight_payload(2)).unwrap();
        assert_eq!(quote.unit_price, 18_500);
        assert_eq!(quote.quantity, 2);
        assert_eq!(quote.total, 37_000);
    }

    #[test]
    fn inactive_flight_reads_as_missing() {
        let err = FlightKind::verify_and_quote(&flight(5, false), &flight_payload(1)).unwrap_err();
        assert!(matches!(err, DomainError::FlightNotFound));
    }

    #[test]
    fn oversubscribed_flight_is_no_inventory() {
        let err = FlightKind::verify_and_quote(&flight(1, true), &flight_payload(2)).unwrap_err();
        assert!(matches!(err, DomainError::NoInventory));
    }

    #[test]
    fn flight_item_references_only_the_flight() {
        let row = flight(5, true);
        let payload = flight_payload(2);
        let quote = FlightKind::verify_and_quote(&row, &payload).unwrap();
        let item = FlightKind::build_item(&row, &payload, &quote, Uuid::new_v4());
        assert_eq!(item.item_type, ItemType::Flight);
        assert_eq!(item.flight_id, Some(row.id));
        assert!(item.hotel_id.is_none() && item.car_id.is_none());
        assert_eq!(item.total_price, item.unit_price * item.quantity as i64);
    }

    fn hotel() -> Hotel {
        Hotel {
            id: Uuid::new_v4(),
            name: "Harborview Suites".into(),
            city: "Seattle".into(),
            state: Some("WA".into()),
            star_rating: 4,
            base_price_per_night: 22_000,
            currency: "USD".into(),
            is_active: true,
        }
    }

    #[test]
    fn hotel_quote_prices_nights_times_rooms() {
        let payload = BookHotelRequest {
            hotel_id: Uuid::new_v4(),
            check_in_date: d("2025-07-01"),
            check_out_date: d("2025-07-04"),
            rooms: 2,
            guests: 4,
            payment_method_token: Some("tok_ok".into()),
            expected_total_price: None,
            notes: None,
        };
        let quote = HotelKind::verify_and_quote(&hotel(), &payload).unwrap();
        // 3 nights at 2 rooms x 22000
        assert_eq!(quote.quantity, 3);
        assert_eq!(quote.unit_price, 44_000);
        assert_eq!(quote.total, 132_000);
    }

    #[test]
    fn same_day_stay_bills_one_night() {
        let payload = BookHotelRequest {
            hotel_id: Uuid::new_v4(),
            check_in_date: d("2025-07-01"),
            check_out_date: d("2025-07-01"),
            rooms: 1,
            guests: 1,
            payment_method_token: Some("tok_ok".into()),
            expected_total_price: None,
            notes: None,
        };
        let quote = HotelKind::verify_and_quote(&hotel(), &payload).unwrap();
        assert_eq!(quote.quantity, 1);
        assert_eq!(quote.total, 22_000);
    }

    #[test]
    fn car_quote_bills_rental_days() {
        let row = Car {
            id: Uuid::new_v4(),
            provider_name: "Rove".into(),
            make: "Toyota".into(),
            model: "RAV4".into(),
            car_type: CarType::Suv,
            seats: 5,
            transmission: "AUTOMATIC".into(),
            pickup_city: "Austin".into(),
            daily_price: 7_500,
            currency: "USD".into(),
            is_active: true,
        };
        let payload = BookCarRequest {
            car_id: row.id,
            pickup_date: d("2025-07-01"),
            dropoff_date: d("2025-07-05"),
            payment_method_token: Some("tok_ok".into()),
            expected_total_price: None,
            notes: None,
        };
        let quote = CarKind::verify_and_quote(&row, &payload).unwrap();
        assert_eq!(quote.quantity, 4);
        assert_eq!(quote.total, 30_000);
    }
}
