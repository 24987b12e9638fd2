use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use wayfare_core::error::DomainError;

/// Response-side wrapper around the domain taxonomy. Every handler error is
/// shaped into `{success:false, errorCode, message}` with the taxonomy's
/// HTTP status; internal detail stays in the logs.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if let DomainError::Internal(detail) = &self.0 {
            tracing::error!("internal error: {detail}");
        }

        let body = Json(json!({
            "success": false,
            "errorCode": self.0.code(),
            "message": self.0.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_detail_never_reaches_the_body() {
        let err = ApiError(DomainError::internal("password for db is hunter2"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // The Display form of Internal carries no detail by construction.
        assert_eq!(DomainError::internal("secret").to_string(), "internal error");
    }

    #[test]
    fn conflict_maps_to_409() {
        let response = ApiError(DomainError::NoInventory).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
