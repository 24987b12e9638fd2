//! Quote computation for the booking engine. The engine recomputes every
//! price from the locked inventory row; the client's expected total is only a
//! hint checked against a 1% tolerance.

use chrono::{DateTime, NaiveDate, Utc};

use wayfare_core::error::DomainError;

/// Basis points of drift allowed between the client's expected total and the
/// recomputed one.
pub const PRICE_TOLERANCE_PERCENT: i64 = 1;

/// Priced outcome of verifying one inventory row against a payload.
#[derive(Debug, Clone)]
pub struct Quote {
    pub unit_price: i64,
    pub quantity: i32,
    pub total: i64,
    pub currency: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Quote {
    pub fn new(
        unit_price: i64,
        quantity: i32,
        currency: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Quote {
            unit_price,
            quantity,
            total: unit_price * quantity as i64,
            currency: currency.to_string(),
            start,
            end,
        }
    }
}

/// Nights charged for a hotel stay. Same-day check-out still bills one night.
pub fn stay_nights(check_in: NaiveDate, check_out: NaiveDate) -> Result<i64, DomainError> {
    if check_out < check_in {
        return Err(DomainError::InvalidDateRange);
    }
    Ok((check_out - check_in).num_days().max(1))
}

/// Days charged for a car rental, same floor-of-one rule as hotel nights.
pub fn rental_days(pickup: NaiveDate, dropoff: NaiveDate) -> Result<i64, DomainError> {
    if dropoff < pickup {
        return Err(DomainError::InvalidDateRange);
    }
    Ok((dropoff - pickup).num_days().max(1))
}

/// Integer 1% tolerance check: |expected - actual| * 100 <= actual.
pub fn check_expected_total(expected: Option<i64>, actual: i64) -> Result<(), DomainError> {
    let Some(expected) = expected else {
        return Ok(());
    };
    if (expected - actual).abs() * 100 > actual {
        return Err(DomainError::PriceMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn nights_floor_at_one() {
        assert_eq!(stay_nights(d("2025-06-01"), d("2025-06-01")).unwrap(), 1);
        assert_eq!(stay_nights(d("2025-06-01"), d("2025-06-02")).unwrap(), 1);
        assert_eq!(stay_nights(d("2025-06-01"), d("2025-06-05")).unwrap(), 4);
    }

    #[test]
    fn reversed_stay_is_rejected() {
        assert!(matches!(
            stay_nights(d("2025-06-05"), d("2025-06-01")),
            Err(DomainError::InvalidDateRange)
        ));
        assert!(rental_days(d("2025-06-05"), d("2025-06-01")).is_err());
    }

    #[test]
    fn quote_total_is_exact_multiplication() {
        let now = Utc::now();
        let quote = Quote::new(15_000, 3, "USD", now, now);
        assert_eq!(quote.total, 45_000);
    }

    #[test]
    fn tolerance_accepts_one_percent_drift() {
        // 1% of 100_00 is 100; exactly at the edge passes
        assert!(check_expected_total(Some(10_100), 10_000).is_ok());
        assert!(check_expected_total(Some(9_900), 10_000).is_ok());
        assert!(check_expected_total(Some(10_101), 10_000).is_err());
        assert!(check_expected_total(Some(9_899), 10_000).is_err());
    }

    #[test]
    fn missing_hint_always_passes() {
        assert!(check_expected_total(None, 10_000).is_ok());
    }
}
