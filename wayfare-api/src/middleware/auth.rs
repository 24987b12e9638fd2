use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use wayfare_core::error::DomainError;
use wayfare_core::principal::{Auth, Principal};

use crate::error::ApiError;
use crate::state::AppState;
use crate::token;

fn bearer_token(req: &Request) -> Result<&str, DomainError> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(DomainError::TokenMissing)?;

    header.strip_prefix("Bearer ").ok_or(DomainError::TokenMissing)
}

fn authenticate(state: &AppState, req: &Request) -> Result<Principal, DomainError> {
    let raw = bearer_token(req)?;
    token::verify(raw, &state.jwt_secret)
}

/// Rejects with the precise verification code; on success the principal is
/// attached to the request for handlers and downstream guards.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = authenticate(&state, &req)?;
    req.extensions_mut().insert(Auth::Authenticated(principal.clone()));
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// Attaches a principal when the token verifies and Anonymous otherwise;
/// always continues.
pub async fn optional_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let auth = match authenticate(&state, &req) {
        Ok(principal) => Auth::Authenticated(principal),
        Err(_) => Auth::Anonymous,
    };
    req.extensions_mut().insert(auth);
    next.run(req).await
}

/// Runs inside `require_auth`; anything but an ADMIN principal is refused.
pub async fn admin_guard(req: Request, next: Next) -> Result<Response, ApiError> {
    let is_admin = req
        .extensions()
        .get::<Principal>()
        .map(Principal::is_admin)
        .unwrap_or(false);

    if !is_admin {
        return Err(DomainError::Forbidden.into());
    }
    Ok(next.run(req).await)
}
