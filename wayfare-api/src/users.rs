use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use wayfare_core::error::DomainError;
use wayfare_core::identity::{normalize_email, validate_identity_id, validate_state, validate_zip};
use wayfare_core::principal::Principal;
use wayfare_core::user::{Role, User};
use wayfare_store::user_repo::ProfileChanges;
use wayfare_store::UserRepository;

use crate::error::ApiError;
use crate::passwords::{hash_password, verify_password};
use crate::state::AppState;
use crate::token;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub identity_id: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub profile_image_url: Option<String>,
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, DomainError> {
    value.ok_or(DomainError::MissingField(field))
}

/// POST /api/users
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let identity_id = required(req.identity_id, "identityId")?;
    validate_identity_id(&identity_id)?;

    let email = normalize_email(&required(req.email, "email")?)?;

    let password = required(req.password, "password")?;
    if password.is_empty() {
        return Err(DomainError::MissingField("password").into());
    }

    let us_state = required(req.state, "state")?;
    validate_state(&us_state)?;
    let zip = required(req.zip, "zip")?;
    validate_zip(&zip)?;

    let first_name = required(req.first_name, "firstName")?;
    let last_name = required(req.last_name, "lastName")?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        identity_id,
        email,
        password_hash: hash_password(&password)?,
        role: Role::User,
        first_name,
        last_name,
        phone: req.phone,
        street_address: req.street_address,
        city: req.city,
        state: Some(us_state),
        zip: Some(zip),
        profile_image_url: req.profile_image_url,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    UserRepository::create(&state.db.pool, &user).await?;
    tracing::info!("Registered user {}", user.id);

    Ok((StatusCode::CREATED, Json(json!({ "success": true, "user": user }))))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let email = req.email.trim().to_lowercase();

    let user = UserRepository::find_by_email(&state.db.pool, &email)
        .await?
        .ok_or(DomainError::InvalidCredentials)?;

    if !verify_password(&req.password, &user.password_hash) || !user.is_active {
        return Err(DomainError::InvalidCredentials.into());
    }

    let access_token = token::issue(&user, &state.jwt_secret, state.jwt_ttl_seconds)?;

    Ok(Json(json!({
        "success": true,
        "accessToken": access_token,
        "user": user,
    })))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = UserRepository::find_by_id(&state.db.pool, principal.user_id)
        .await?
        .ok_or(DomainError::UserNotFound)?;

    Ok(Json(json!({ "success": true, "user": user })))
}

/// GET /api/users/{id}: self or admin.
pub async fn get_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !principal.may_access_user(id) {
        return Err(DomainError::Forbidden.into());
    }

    let user = UserRepository::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(DomainError::UserNotFound)?;

    Ok(Json(json!({ "success": true, "user": user })))
}

/// PATCH /api/users/{id}: self or admin; state/zip revalidated.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !principal.may_access_user(id) {
        return Err(DomainError::Forbidden.into());
    }

    if let Some(us_state) = &req.state {
        validate_state(us_state)?;
    }
    if let Some(zip) = &req.zip {
        validate_zip(zip)?;
    }

    let changes = ProfileChanges {
        first_name: req.first_name,
        last_name: req.last_name,
        phone: req.phone,
        street_address: req.street_address,
        city: req.city,
        state: req.state,
        zip: req.zip,
        profile_image_url: req.profile_image_url,
    };

    let user = UserRepository::update_profile(&state.db.pool, id, &changes)
        .await?
        .ok_or(DomainError::UserNotFound)?;

    Ok(Json(json!({ "success": true, "user": user })))
}
