//! Row structs mapped by `query_as`. Column names match the relational
//! schema; conversions into the domain types live next to each row.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use wayfare_core::booking::{
    BillingStatus, BillingTransaction, Booking, BookingItem, BookingStatus, ItemType,
};
use wayfare_core::catalog::{Airport, Car, CarType, Flight, Hotel};
use wayfare_core::user::{Role, User};

#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub identity_id: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub profile_image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            identity_id: row.identity_id,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse().unwrap_or(Role::User),
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            street_address: row.street_address,
            city: row.city,
            state: row.state,
            zip: row.zip,
            profile_image_url: row.profile_image_url,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct FlightRow {
    pub id: Uuid,
    pub airline: String,
    pub flight_number: String,
    pub origin_airport_id: Uuid,
    pub destination_airport_id: Uuid,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub cabin_class: String,
    pub base_price: i64,
    pub currency: String,
    pub seats_available: i32,
    pub stops: i32,
    pub total_duration_minutes: i32,
    pub is_active: bool,
}

impl From<FlightRow> for Flight {
    fn from(row: FlightRow) -> Self {
        Flight {
            id: row.id,
            airline: row.airline,
            flight_number: row.flight_number,
            origin_airport_id: row.origin_airport_id,
            destination_airport_id: row.destination_airport_id,
            departure_time: row.departure_time,
            arrival_time: row.arrival_time,
            cabin_class: row.cabin_class,
            base_price: row.base_price,
            currency: row.currency,
            seats_available: row.seats_available,
            stops: row.stops,
            total_duration_minutes: row.total_duration_minutes,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct HotelRow {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub state: Option<String>,
    pub star_rating: i32,
    pub base_price_per_night: i64,
    pub currency: String,
    pub is_active: bool,
}

impl From<HotelRow> for Hotel {
    fn from(row: HotelRow) -> Self {
        Hotel {
            id: row.id,
            name: row.name,
            city: row.city,
            state: row.state,
            star_rating: row.star_rating,
            base_price_per_night: row.base_price_per_night,
            currency: row.currency,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct CarRow {
    pub id: Uuid,
    pub provider_name: String,
    pub make: String,
    pub model: String,
    pub car_type: String,
    pub seats: i32,
    pub transmission: String,
    pub pickup_city: String,
    pub daily_price: i64,
    pub currency: String,
    pub is_active: bool,
}

impl From<CarRow> for Car {
    fn from(row: CarRow) -> Self {
        Car {
            id: row.id,
            provider_name: row.provider_name,
            make: row.make,
            model: row.model,
            car_type: row.car_type.parse().unwrap_or(CarType::Economy),
            seats: row.seats,
            transmission: row.transmission,
            pickup_city: row.pickup_city,
            daily_price: row.daily_price,
            currency: row.currency,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct AirportRow {
    pub id: Uuid,
    pub iata_code: String,
    pub city: String,
}

impl From<AirportRow> for Airport {
    fn from(row: AirportRow) -> Self {
        Airport {
            id: row.id,
            iata_code: row.iata_code,
            city: row.city,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct BookingRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub total_amount: i64,
    pub currency: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            user_id: row.user_id,
            status: row.status.parse().unwrap_or(BookingStatus::Pending),
            total_amount: row.total_amount,
            currency: row.currency,
            start_date: row.start_date,
            end_date: row.end_date,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct BookingItemRow {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub item_type: String,
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

impl From<BookingItemRow> for BookingItem {
    fn from(row: BookingItemRow) -> Self {
        BookingItem {
            id: row.id,
            booking_id: row.booking_id,
            item_type: row.item_type.parse().unwrap_or(ItemType::Flight),
            flight_id: row.flight_id,
            hotel_id: row.hotel_id,
            car_id: row.car_id,
            start_date: row.start_date,
            end_date: row.end_date,
            quantity: row.quantity,
            unit_price: row.unit_price,
            total_price: row.total_price,
            currency: row.currency,
            metadata: row.metadata,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct BillingRow {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub payment_method: String,
    pub payment_token: String,
    pub provider_reference: Option<String>,
    pub status: String,
    pub error_code: Option<String>,
    pub raw_response: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<BillingRow> for BillingTransaction {
    fn from(row: BillingRow) -> Self {
        BillingTransaction {
            id: row.id,
            booking_id: row.booking_id,
            user_id: row.user_id,
            amount: row.amount,
            currency: row.currency,
            payment_method: row.payment_method,
            payment_token: row.payment_token,
            provider_reference: row.provider_reference,
            status: row.status.parse().unwrap_or(BillingStatus::Failed),
            error_code: row.error_code,
            raw_response: row.raw_response,
            created_at: row.created_at,
        }
    }
}
