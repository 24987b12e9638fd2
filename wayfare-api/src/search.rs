use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use wayfare_catalog::search::{
    CarSearch, CarSearchInput, FlightSearch, FlightSearchInput, HotelSearch, HotelSearchInput,
};
use wayfare_store::CatalogRepository;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchQuery {
    pub origin_iata: Option<String>,
    pub destination_iata: Option<String>,
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub passengers: Option<i32>,
    pub price_max: Option<i64>,
    pub stops: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// GET /api/search/flights
pub async fn search_flights(
    State(state): State<AppState>,
    Query(query): Query<FlightSearchQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let search = FlightSearch::validate(FlightSearchInput {
        origin_iata: query.origin_iata,
        destination_iata: query.destination_iata,
        departure_date: query.departure_date,
        return_date: query.return_date,
        passengers: query.passengers,
        price_max: query.price_max,
        stops: query.stops,
        sort_by: query.sort_by,
        sort_order: query.sort_order,
        page: query.page,
        page_size: query.page_size,
    })?;

    let (items, total) = CatalogRepository::search_flights(&state.db.pool, &search).await?;
    Ok(Json(json!({ "success": true, "items": items, "total": total })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelSearchQuery {
    pub city: Option<String>,
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    pub guests: Option<i32>,
    pub price_max: Option<i64>,
    pub min_stars: Option<i32>,
    pub sort_order: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// GET /api/search/hotels
pub async fn search_hotels(
    State(state): State<AppState>,
    Query(query): Query<HotelSearchQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let search = HotelSearch::validate(HotelSearchInput {
        city: query.city,
        check_in: query.check_in_date,
        check_out: query.check_out_date,
        guests: query.guests,
        price_max: query.price_max,
        min_stars: query.min_stars,
        sort_order: query.sort_order,
        page: query.page,
        page_size: query.page_size,
    })?;

    let (items, total) = CatalogRepository::search_hotels(&state.db.pool, &search).await?;
    Ok(Json(json!({ "success": true, "items": items, "total": total })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarSearchQuery {
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub pickup_date: Option<NaiveDate>,
    pub dropoff_date: Option<NaiveDate>,
    pub price_max: Option<i64>,
    pub car_type: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// GET /api/search/cars
pub async fn search_cars(
    State(state): State<AppState>,
    Query(query): Query<CarSearchQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let search = CarSearch::validate(CarSearchInput {
        pickup_location: query.pickup_location,
        dropoff_location: query.dropoff_location,
        pickup_date: query.pickup_date,
        dropoff_date: query.dropoff_date,
        price_max: query.price_max,
        car_type: query.car_type,
        sort_order: query.sort_order,
        page: query.page,
        page_size: query.page_size,
    })?;

    let (items, total) = CatalogRepository::search_cars(&state.db.pool, &search).await?;
    Ok(Json(json!({ "success": true, "items": items, "total": total })))
}
