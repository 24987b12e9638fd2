//! Clickstream ingest: accept fast, store out of band. Both track endpoints
//! answer 202 before any document-store write happens.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use wayfare_core::error::DomainError;
use wayfare_core::principal::{Auth, Principal};
use wayfare_docstore::clickstream_repo::SessionStats;
use wayfare_docstore::models::{ClickEventType, ClickstreamEvent};
use wayfare_docstore::ClickstreamRepository;

use crate::error::ApiError;
use crate::state::AppState;

const MAX_BATCH_SIZE: usize = 100;
const SESSION_EVENT_LIMIT: i64 = 500;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEventRequest {
    pub session_id: Option<String>,
    pub event_type: Option<String>,
    pub page: Option<String>,
    pub referrer: Option<String>,
    pub element_id: Option<String>,
    pub element_label: Option<String>,
    pub listing_type: Option<String>,
    pub listing_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

fn build_event(
    req: TrackEventRequest,
    auth: &Auth,
    headers: &HeaderMap,
) -> Result<ClickstreamEvent, DomainError> {
    let event_type = req
        .event_type
        .as_deref()
        .ok_or(DomainError::MissingField("eventType"))?
        .parse::<ClickEventType>()?;

    let page = req.page.filter(|p| !p.is_empty()).ok_or(DomainError::MissingField("page"))?;

    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string());
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    Ok(ClickstreamEvent {
        user_id: auth.principal().map(|p| p.user_id.to_string()),
        session_id: req
            .session_id
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        event_type,
        page,
        referrer: req.referrer,
        element_id: req.element_id,
        element_label: req.element_label,
        listing_type: req.listing_type,
        listing_id: req.listing_id,
        ip,
        user_agent,
        metadata: req.metadata.unwrap_or_else(|| json!({})),
        created_at: Utc::now(),
    })
}

/// POST /api/analytics/track: validates, answers 202, stores asynchronously.
pub async fn track_event(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    headers: HeaderMap,
    Json(req): Json<TrackEventRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let event = build_event(req, &auth, &headers)?;

    let docs = state.docs.clone();
    tokio::spawn(async move {
        if let Err(e) = ClickstreamRepository::insert_one(&docs, &event).await {
            tracing::warn!("clickstream insert failed: {e}");
        }
    });

    Ok((StatusCode::ACCEPTED, Json(json!({ "success": true }))))
}

#[derive(Debug, Deserialize)]
pub struct TrackBatchRequest {
    pub events: Vec<TrackEventRequest>,
}

/// POST /api/analytics/track/batch: at most 100 events; storage is
/// per-document, partial success allowed, failures only logged.
pub async fn track_batch(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    headers: HeaderMap,
    Json(req): Json<TrackBatchRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    if req.events.len() > MAX_BATCH_SIZE {
        return Err(DomainError::BatchTooLarge.into());
    }

    let mut events = Vec::with_capacity(req.events.len());
    for raw in req.events {
        match build_event(raw, &auth, &headers) {
            Ok(event) => events.push(event),
            Err(e) => tracing::warn!("batch event dropped: {}", e.code()),
        }
    }

    let accepted = events.len();
    let docs = state.docs.clone();
    tokio::spawn(async move {
        let stored = ClickstreamRepository::insert_batch(&docs, &events).await;
        tracing::debug!("stored {stored} of {} batch events", events.len());
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "success": true, "accepted": accepted })),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEventsQuery {
    pub limit: Option<i64>,
}

/// GET /api/analytics/sessions/{session_id}: the principal's own events in
/// that session, ordered, with an aggregate block.
pub async fn session_events(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(session_id): Path<String>,
    Query(query): Query<SessionEventsQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let limit = query.limit.unwrap_or(SESSION_EVENT_LIMIT).clamp(1, SESSION_EVENT_LIMIT);

    let events = ClickstreamRepository::session_events(
        &state.docs,
        &session_id,
        &principal.user_id.to_string(),
        limit,
    )
    .await?;

    let stats = SessionStats::from_events(&events);

    Ok(Json(json!({
        "success": true,
        "sessionId": session_id,
        "events": events,
        "stats": stats,
    })))
}
