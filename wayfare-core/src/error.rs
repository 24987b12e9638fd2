//! Error taxonomy shared by every layer. Each variant carries a stable,
//! machine-readable code and an HTTP status; handlers shape the variant into
//! the `{success:false, errorCode, message}` envelope.

#[derive(Debug, Clone, thiserror::Error)]
pub enum DomainError {
    // Input validation (400)
    #[error("user id must match NNN-NN-NNNN")]
    InvalidUserId,
    #[error("state must be a two-letter US state code")]
    MalformedState,
    #[error("zip must be NNNNN or NNNNN-NNNN")]
    MalformedZip,
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("rating must be an integer between 1 and 5")]
    InvalidRating,
    #[error("unknown clickstream event type: {0}")]
    InvalidEventType(String),
    #[error("end date must not precede start date")]
    InvalidDateRange,
    #[error("seat count must be a positive integer")]
    InvalidSeatCount,
    #[error("batch exceeds the 100 event limit")]
    BatchTooLarge,
    #[error("year is out of range")]
    InvalidYear,
    #[error("month must be between 1 and 12")]
    InvalidMonth,
    #[error("unknown listing type: {0}")]
    InvalidListingType(String),
    #[error("listing id is not a valid id")]
    InvalidListingId,
    #[error("price must be a positive amount")]
    InvalidPrice,
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    // Authentication / authorization (401, 403)
    #[error("authorization token is missing")]
    TokenMissing,
    #[error("authorization token is invalid")]
    TokenInvalid,
    #[error("authorization token has expired")]
    TokenExpired,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("you are not allowed to perform this action")]
    Forbidden,

    // Uniqueness conflicts (409)
    #[error("email is already registered")]
    DuplicateEmail,
    #[error("user id is already registered")]
    DuplicateUserId,
    #[error("you have already reviewed this listing")]
    DuplicateReview,

    // Domain (402, 404, 409)
    #[error("flight not found")]
    FlightNotFound,
    #[error("hotel not found")]
    HotelNotFound,
    #[error("car not found")]
    CarNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("not enough inventory remaining")]
    NoInventory,
    #[error("the price changed since this offer was shown")]
    PriceMismatch,
    #[error("payment was declined: {0}")]
    PaymentFailed(String),
    #[error("a payment method token is required")]
    MissingPaymentMethod,
    #[error("charge amount must be positive")]
    InvalidAmount,

    // Infrastructure (5xx)
    #[error("internal error")]
    Internal(String),
    #[error("upstream network error")]
    NetworkError,

    /// Store-level deadlock. Retryable by the booking engine, never
    /// surfaced to clients under this name.
    #[error("transaction deadlock detected")]
    Deadlock,
}

impl DomainError {
    /// Stable machine-readable code for the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::InvalidUserId => "invalid_user_id",
            DomainError::MalformedState => "malformed_state",
            DomainError::MalformedZip => "malformed_zip",
            DomainError::InvalidEmail => "invalid_email",
            DomainError::InvalidRating => "invalid_rating",
            DomainError::InvalidEventType(_) => "invalid_event_type",
            DomainError::InvalidDateRange => "invalid_date_range",
            DomainError::InvalidSeatCount => "invalid_seat_count",
            DomainError::BatchTooLarge => "batch_too_large",
            DomainError::InvalidYear => "invalid_year",
            DomainError::InvalidMonth => "invalid_month",
            DomainError::InvalidListingType(_) => "invalid_listing_type",
            DomainError::InvalidListingId => "invalid_listing_id",
            DomainError::InvalidPrice => "invalid_price",
            DomainError::MissingField(field) => field,
            DomainError::TokenMissing => "token_missing",
            DomainError::TokenInvalid => "token_invalid",
            DomainError::TokenExpired => "token_expired",
            DomainError::InvalidCredentials => "invalid_credentials",
            DomainError::Forbidden => "forbidden",
            DomainError::DuplicateEmail => "duplicate_email",
            DomainError::DuplicateUserId => "duplicate_user_id",
            DomainError::DuplicateReview => "duplicate_review",
            DomainError::FlightNotFound => "flight_not_found",
            DomainError::HotelNotFound => "hotel_not_found",
            DomainError::CarNotFound => "car_not_found",
            DomainError::UserNotFound => "user_not_found",
            DomainError::NoInventory => "no_inventory",
            DomainError::PriceMismatch => "price_mismatch",
            DomainError::PaymentFailed(_) => "payment_failed",
            DomainError::MissingPaymentMethod => "missing_payment_method",
            DomainError::InvalidAmount => "invalid_amount",
            DomainError::Internal(_) => "internal_error",
            DomainError::NetworkError => "network_error",
            DomainError::Deadlock => "internal_error",
        }
    }

    /// HTTP status the router's error shaper responds with.
    pub fn http_status(&self) -> u16 {
        match self {
            DomainError::InvalidUserId
            | DomainError::MalformedState
            | DomainError::MalformedZip
            | DomainError::InvalidEmail
            | DomainError::InvalidRating
            | DomainError::InvalidEventType(_)
            | DomainError::InvalidDateRange
            | DomainError::InvalidSeatCount
            | DomainError::BatchTooLarge
            | DomainError::InvalidYear
            | DomainError::InvalidMonth
            | DomainError::InvalidListingType(_)
            | DomainError::InvalidListingId
            | DomainError::InvalidPrice
            | DomainError::MissingField(_) => 400,
            DomainError::TokenMissing
            | DomainError::TokenInvalid
            | DomainError::TokenExpired
            | DomainError::InvalidCredentials => 401,
            DomainError::PaymentFailed(_)
            | DomainError::MissingPaymentMethod
            | DomainError::InvalidAmount => 402,
            DomainError::Forbidden => 403,
            DomainError::FlightNotFound
            | DomainError::HotelNotFound
            | DomainError::CarNotFound
            | DomainError::UserNotFound => 404,
            DomainError::DuplicateEmail
            | DomainError::DuplicateUserId
            | DomainError::DuplicateReview
            | DomainError::NoInventory
            | DomainError::PriceMismatch => 409,
            DomainError::Internal(_) | DomainError::Deadlock => 500,
            DomainError::NetworkError => 502,
        }
    }

    /// Deadlocks are worth one more attempt; everything else is final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Deadlock)
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        DomainError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(DomainError::NoInventory.code(), "no_inventory");
        assert_eq!(DomainError::PaymentFailed("declined".into()).code(), "payment_failed");
        assert_eq!(DomainError::MissingField("originIata").code(), "originIata");
    }

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(DomainError::NoInventory.http_status(), 409);
        assert_eq!(DomainError::PaymentFailed("x".into()).http_status(), 402);
        assert_eq!(DomainError::TokenExpired.http_status(), 401);
        assert_eq!(DomainError::Forbidden.http_status(), 403);
        assert_eq!(DomainError::NetworkError.http_status(), 502);
    }

    #[test]
    fn only_deadlocks_retry() {
        assert!(DomainError::Deadlock.is_retryable());
        assert!(!DomainError::NoInventory.is_retryable());
        assert!(!DomainError::Internal("boom".into()).is_retryable());
    }

    #[test]
    fn internal_errors_hide_details_from_the_code() {
        let err = DomainError::internal("connection reset by peer");
        assert_eq!(err.code(), "internal_error");
        assert_eq!(err.http_status(), 500);
    }
}
