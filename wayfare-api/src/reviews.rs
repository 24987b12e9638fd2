use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use wayfare_core::booking::ItemType;
use wayfare_core::error::DomainError;
use wayfare_core::principal::{Auth, Principal};
use wayfare_docstore::models::Review;
use wayfare_docstore::review_repo::ReviewFilter;
use wayfare_docstore::ReviewRepository;

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_REVIEW_LIMIT: i64 = 20;
const MAX_REVIEW_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub listing_type: Option<String>,
    pub listing_id: Option<String>,
    pub booking_id: Option<String>,
    pub rating: Option<i32>,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub stay_date: Option<NaiveDate>,
    pub metadata: Option<serde_json::Value>,
}

fn parse_listing_type(raw: &str) -> Result<ItemType, DomainError> {
    raw.parse::<ItemType>()
}

fn parse_listing_id(raw: &str) -> Result<String, DomainError> {
    Uuid::parse_str(raw)
        .map(|id| id.to_string())
        .map_err(|_| DomainError::InvalidListingId)
}

/// POST /api/reviews: one review per (user, listingType, listingId).
pub async fn create_review(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let listing_type = req
        .listing_type
        .as_deref()
        .ok_or(DomainError::MissingField("listingType"))?;
    let listing_type = parse_listing_type(listing_type)?;

    let listing_id = req
        .listing_id
        .as_deref()
        .ok_or(DomainError::MissingField("listingId"))?;
    let listing_id = parse_listing_id(listing_id)?;

    let rating = req.rating.ok_or(DomainError::InvalidRating)?;
    if !(1..=5).contains(&rating) {
        return Err(DomainError::InvalidRating.into());
    }

    let now = Utc::now();
    let review = Review {
        user_id: principal.user_id.to_string(),
        listing_type: listing_type.to_string(),
        listing_id,
        // Stored as given; reviews outlive bookings, so it is not checked
        // against the booking store.
        booking_id: req.booking_id,
        rating,
        title: req.title.unwrap_or_default(),
        comment: req.comment.unwrap_or_default(),
        stay_date: req.stay_date,
        metadata: req.metadata.unwrap_or_else(|| json!({})),
        created_at: now,
        updated_at: now,
    };

    ReviewRepository::insert(&state.docs, &review).await?;

    Ok((StatusCode::CREATED, Json(json!({ "success": true, "review": review }))))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReviewsQuery {
    pub listing_type: Option<String>,
    pub listing_id: Option<String>,
    pub my: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<u64>,
}

/// GET /api/reviews: public; `my=true` requires a principal.
pub async fn list_reviews(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Query(query): Query<ListReviewsQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = if query.my.unwrap_or(false) {
        let principal = auth.principal().ok_or(DomainError::TokenMissing)?;
        Some(principal.user_id.to_string())
    } else {
        None
    };

    let listing_type = query
        .listing_type
        .as_deref()
        .map(parse_listing_type)
        .transpose()?
        .map(|t| t.to_string());

    let filter = ReviewFilter {
        listing_type,
        listing_id: query.listing_id,
        user_id,
        limit: query.limit.unwrap_or(DEFAULT_REVIEW_LIMIT).clamp(1, MAX_REVIEW_LIMIT),
        offset: query.offset.unwrap_or(0),
    };

    let reviews = ReviewRepository::find(&state.docs, &filter).await?;
    Ok(Json(json!({ "success": true, "reviews": reviews })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionQuery {
    pub listing_type: Option<String>,
    pub listing_id: Option<String>,
}

/// GET /api/reviews/distribution: rating histogram for one listing.
pub async fn distribution(
    State(state): State<AppState>,
    Query(query): Query<DistributionQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let listing_type = query
        .listing_type
        .as_deref()
        .ok_or(DomainError::MissingField("listingType"))?;
    let listing_type = parse_listing_type(listing_type)?;

    let listing_id = query
        .listing_id
        .as_deref()
        .ok_or(DomainError::MissingField("listingId"))?;
    let listing_id = parse_listing_id(listing_id)?;

    let dist =
        ReviewRepository::distribution(&state.docs, &listing_type.to_string(), &listing_id).await?;

    Ok(Json(json!({ "success": true, "distribution": dist })))
}
