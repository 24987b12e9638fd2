use wayfare_core::error::DomainError;

const SQLSTATE_UNIQUE_VIOLATION: &str = "23505";
const SQLSTATE_DEADLOCK_DETECTED: &str = "40P01";
const SQLSTATE_LOCK_NOT_AVAILABLE: &str = "55P03";

/// Maps driver errors into the domain taxonomy. Deadlocks and lock-wait
/// timeouts surface as retryable; unique violations map by constraint name;
/// everything else is an internal error that must not leak details.
pub fn map_sqlx(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(ref db) = err {
        match db.code().as_deref() {
            Some(SQLSTATE_DEADLOCK_DETECTED) | Some(SQLSTATE_LOCK_NOT_AVAILABLE) => {
                return DomainError::Deadlock;
            }
            Some(SQLSTATE_UNIQUE_VIOLATION) => {
                let constraint = db.constraint().unwrap_or_default();
                if constraint.contains("email") {
                    return DomainError::DuplicateEmail;
                }
                if constraint.contains("identity") {
                    return DomainError::DuplicateUserId;
                }
            }
            _ => {}
        }
    }

    tracing::error!("relational store error: {err}");
    DomainError::internal(err)
}
