//! Admin surface: user management and the cross-store analytics read-side.
//! Every route here sits behind the required-auth and admin-guard layers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use wayfare_core::error::DomainError;
use wayfare_docstore::ClickstreamRepository;
use wayfare_store::{AnalyticsRepository, UserRepository};

use crate::error::ApiError;
use crate::state::AppState;
use crate::trace::{sessions_from_events, top_sequences};

const REVENUE_LIMIT_DEFAULT: i64 = 10;
const REVENUE_LIMIT_MAX: i64 = 100;
const CLICK_LIMIT_DEFAULT: i64 = 100;
const CLICK_LIMIT_MAX: i64 = 500;
const SINCE_DAYS_DEFAULT: i64 = 30;
const TRACE_EVENT_LIMIT_DEFAULT: i64 = 500;
const TRACE_EVENT_LIMIT_MAX: i64 = 1000;
const COHORT_USERS_DEFAULT: i64 = 50;
const COHORT_USERS_MAX: i64 = 100;
const COHORT_TOP_SEQUENCES: usize = 20;

fn validate_year(year: Option<i32>) -> Result<i32, DomainError> {
    let year = year.ok_or(DomainError::MissingField("year"))?;
    if !(1970..=2100).contains(&year) {
        return Err(DomainError::InvalidYear);
    }
    Ok(year)
}

fn validate_month(month: Option<u32>) -> Result<u32, DomainError> {
    let month = month.ok_or(DomainError::MissingField("month"))?;
    if !(1..=12).contains(&month) {
        return Err(DomainError::InvalidMonth);
    }
    Ok(month)
}

// ----------------------------------------------------------------------
// User management
// ----------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub is_active: Option<bool>,
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(20).clamp(1, 100);

    let (users, total) = UserRepository::list(
        &state.db.pool,
        query.is_active,
        page_size,
        (page - 1) * page_size,
    )
    .await?;

    Ok(Json(json!({ "success": true, "users": users, "total": total })))
}

/// GET /api/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = UserRepository::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(DomainError::UserNotFound)?;
    Ok(Json(json!({ "success": true, "user": user })))
}

/// PATCH /api/admin/users/{id}/deactivate: soft; bookings survive.
pub async fn deactivate_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = UserRepository::deactivate(&state.db.pool, id)
        .await?
        .ok_or(DomainError::UserNotFound)?;
    tracing::info!("Deactivated user {id}");
    Ok(Json(json!({ "success": true, "user": user })))
}

// ----------------------------------------------------------------------
// Revenue analytics (relational store)
// ----------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RevenueQuery {
    pub year: Option<i32>,
    pub limit: Option<i64>,
}

/// GET /api/admin/analytics/revenue/properties
pub async fn top_properties(
    State(state): State<AppState>,
    Query(query): Query<RevenueQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let year = validate_year(query.year)?;
    let limit = query
        .limit
        .unwrap_or(REVENUE_LIMIT_DEFAULT)
        .clamp(1, REVENUE_LIMIT_MAX);

    let properties =
        AnalyticsRepository::top_properties_by_revenue(&state.db.pool, year, limit).await?;

    Ok(Json(json!({ "success": true, "year": year, "properties": properties })))
}

#[derive(Debug, Deserialize)]
pub struct CityRevenueQuery {
    pub year: Option<i32>,
}

/// GET /api/admin/analytics/revenue/city
pub async fn city_revenue(
    State(state): State<AppState>,
    Query(query): Query<CityRevenueQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let year = validate_year(query.year)?;
    let cities = AnalyticsRepository::city_revenue_for_year(&state.db.pool, year).await?;
    Ok(Json(json!({ "success": true, "year": year, "cities": cities })))
}

#[derive(Debug, Deserialize)]
pub struct ProvidersQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub limit: Option<i64>,
}

/// GET /api/admin/analytics/providers/top
pub async fn top_providers(
    State(state): State<AppState>,
    Query(query): Query<ProvidersQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let year = validate_year(query.year)?;
    let month = validate_month(query.month)?;
    let limit = query
        .limit
        .unwrap_or(REVENUE_LIMIT_DEFAULT)
        .clamp(1, REVENUE_LIMIT_MAX);

    let providers =
        AnalyticsRepository::top_providers_for_month(&state.db.pool, year, month, limit).await?;

    Ok(Json(json!({
        "success": true,
        "year": year,
        "month": month,
        "providers": providers,
    })))
}

// ----------------------------------------------------------------------
// Click analytics (document store)
// ----------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickStatsQuery {
    pub since_days: Option<i64>,
    pub limit: Option<i64>,
}

impl ClickStatsQuery {
    fn clamped(&self) -> (i64, i64) {
        (
            self.since_days.unwrap_or(SINCE_DAYS_DEFAULT).max(0),
            self.limit.unwrap_or(CLICK_LIMIT_DEFAULT).clamp(1, CLICK_LIMIT_MAX),
        )
    }
}

/// GET /api/admin/analytics/clicks/pages
pub async fn page_clicks(
    State(state): State<AppState>,
    Query(query): Query<ClickStatsQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (since_days, limit) = query.clamped();
    let stats = ClickstreamRepository::page_click_stats(&state.docs, since_days, limit).await?;
    Ok(Json(json!({ "success": true, "sinceDays": since_days, "stats": stats })))
}

/// GET /api/admin/analytics/clicks/listings
pub async fn listing_clicks(
    State(state): State<AppState>,
    Query(query): Query<ClickStatsQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (since_days, limit) = query.clamped();
    let stats = ClickstreamRepository::listing_click_stats(&state.docs, since_days, limit).await?;
    Ok(Json(json!({ "success": true, "sinceDays": since_days, "stats": stats })))
}

// ----------------------------------------------------------------------
// Traces (cross-store composition in application code)
// ----------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTraceQuery {
    pub limit_events: Option<i64>,
}

/// GET /api/admin/analytics/trace/user/{user_id}
pub async fn user_trace(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<UserTraceQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let limit = query
        .limit_events
        .unwrap_or(TRACE_EVENT_LIMIT_DEFAULT)
        .clamp(1, TRACE_EVENT_LIMIT_MAX);

    let events =
        ClickstreamRepository::events_for_user(&state.docs, &user_id.to_string(), limit).await?;
    let sessions = sessions_from_events(&events);

    Ok(Json(json!({
        "success": true,
        "userId": user_id,
        "sessions": sessions,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortTraceQuery {
    pub city: Option<String>,
    pub limit_users: Option<i64>,
    pub limit_events: Option<i64>,
}

/// GET /api/admin/analytics/trace/cohort: users come from the relational
/// store, their events from the document store; the join happens here.
pub async fn cohort_trace(
    State(state): State<AppState>,
    Query(query): Query<CohortTraceQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let city = query
        .city
        .filter(|c| !c.is_empty())
        .ok_or(DomainError::MissingField("city"))?;
    let limit_users = query
        .limit_users
        .unwrap_or(COHORT_USERS_DEFAULT)
        .clamp(1, COHORT_USERS_MAX);
    let limit_events = query
        .limit_events
        .unwrap_or(TRACE_EVENT_LIMIT_DEFAULT)
        .clamp(1, TRACE_EVENT_LIMIT_MAX);

    let user_ids = UserRepository::user_ids_by_city(&state.db.pool, &city, limit_users).await?;

    let mut traces = Vec::new();
    for user_id in &user_ids {
        let events =
            ClickstreamRepository::events_for_user(&state.docs, &user_id.to_string(), limit_events)
                .await?;
        traces.extend(sessions_from_events(&events));
    }

    let sequences = top_sequences(&traces, COHORT_TOP_SEQUENCES);

    Ok(Json(json!({
        "success": true,
        "city": city,
        "usersSampled": user_ids.len(),
        "sequences": sequences,
    })))
}
