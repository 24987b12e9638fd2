use axum::{
    http::Method,
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod analytics;
pub mod bookings;
pub mod error;
pub mod listings;
pub mod middleware;
pub mod passwords;
pub mod reviews;
pub mod search;
pub mod state;
pub mod token;
pub mod trace;
pub mod users;

pub use state::AppState;

use crate::middleware::auth;

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds the full route table. Middleware order per request: request-id
/// injection, body parse, optional/required auth, role guard, handler, and
/// the uniform error shaper on the way out.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    let public = Router::new()
        .route("/health", get(health))
        .route("/api/users", post(users::register))
        .route("/api/auth/login", post(users::login))
        .route("/api/search/flights", get(search::search_flights))
        .route("/api/search/hotels", get(search::search_hotels))
        .route("/api/search/cars", get(search::search_cars))
        .route("/api/flights/{id}", get(listings::get_flight))
        .route("/api/hotels/{id}", get(listings::get_hotel))
        .route("/api/cars/{id}", get(listings::get_car));

    let optional = Router::new()
        .route("/api/reviews", get(reviews::list_reviews))
        .route("/api/reviews/distribution", get(reviews::distribution))
        .route("/api/analytics/track", post(analytics::track_event))
        .route("/api/analytics/track/batch", post(analytics::track_batch))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::optional_auth,
        ));

    let authed = Router::new()
        .route("/api/auth/me", get(users::me))
        .route("/api/users/{id}", get(users::get_user).patch(users::update_user))
        .route("/api/bookings/flight", post(bookings::book_flight))
        .route("/api/bookings/hotel", post(bookings::book_hotel))
        .route("/api/bookings/car", post(bookings::book_car))
        .route("/api/bookings", get(bookings::list_bookings))
        .route("/api/bookings/my", get(bookings::list_bookings))
        .route("/api/reviews", post(reviews::create_review))
        .route(
            "/api/analytics/sessions/{session_id}",
            get(analytics::session_events),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    let admin_routes = Router::new()
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/users/{id}", get(admin::get_user))
        .route("/api/admin/users/{id}/deactivate", patch(admin::deactivate_user))
        .route("/api/admin/analytics/revenue/properties", get(admin::top_properties))
        .route("/api/admin/analytics/revenue/city", get(admin::city_revenue))
        .route("/api/admin/analytics/providers/top", get(admin::top_providers))
        .route("/api/admin/analytics/clicks/pages", get(admin::page_clicks))
        .route("/api/admin/analytics/clicks/listings", get(admin::listing_clicks))
        .route("/api/admin/analytics/trace/user/{user_id}", get(admin::user_trace))
        .route("/api/admin/analytics/trace/cohort", get(admin::cohort_trace))
        .route_layer(axum::middleware::from_fn(auth::admin_guard))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(optional)
        .merge(authed)
        .merge(admin_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
