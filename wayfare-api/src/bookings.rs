use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;

use wayfare_booking::{BookCarRequest, BookFlightRequest, BookHotelRequest};
use wayfare_core::principal::Principal;
use wayfare_store::booking_repo::BookingScope;
use wayfare_store::BookingRepository;

use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/bookings/flight
pub async fn book_flight(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<BookFlightRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let outcome = state.engine.book_flight(&principal, payload).await?;
    Ok(Json(json!({
        "success": true,
        "booking": outcome.booking,
        "items": outcome.items,
        "billing": outcome.billing,
    })))
}

/// POST /api/bookings/hotel
pub async fn book_hotel(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<BookHotelRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let outcome = state.engine.book_hotel(&principal, payload).await?;
    Ok(Json(json!({
        "success": true,
        "booking": outcome.booking,
        "items": outcome.items,
        "billing": outcome.billing,
    })))
}

/// POST /api/bookings/car
pub async fn book_car(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<BookCarRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let outcome = state.engine.book_car(&principal, payload).await?;
    Ok(Json(json!({
        "success": true,
        "booking": outcome.booking,
        "items": outcome.items,
        "billing": outcome.billing,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    pub scope: Option<String>,
}

/// GET /api/bookings and /api/bookings/my; `scope` partitions by end date.
pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let scope = match query.scope.as_deref() {
        Some(raw) => raw.parse::<BookingScope>()?,
        None => BookingScope::All,
    };

    let bookings =
        BookingRepository::list_for_user(&state.db.pool, principal.user_id, scope).await?;

    Ok(Json(json!({ "success": true, "bookings": bookings })))
}
