//! Public listing detail reads backing the search result pages.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use wayfare_core::error::DomainError;
use wayfare_store::CatalogRepository;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/flights/{id}
pub async fn get_flight(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let flight = CatalogRepository::find_flight(&state.db.pool, id)
        .await?
        .ok_or(DomainError::FlightNotFound)?;
    Ok(Json(json!({ "success": true, "flight": flight })))
}

/// GET /api/hotels/{id}
pub async fn get_hotel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let hotel = CatalogRepository::find_hotel(&state.db.pool, id)
        .await?
        .ok_or(DomainError::HotelNotFound)?;
    Ok(Json(json!({ "success": true, "hotel": hotel })))
}

/// GET /api/cars/{id}
pub async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let car = CatalogRepository::find_car(&state.db.pool, id)
        .await?
        .ok_or(DomainError::CarNotFound)?;
    Ok(Json(json!({ "success": true, "car": car })))
}
