//! Revenue aggregations on the relational side of the analytics read-side.
//! Clickstream aggregations live in the document store gateway; cross-store
//! results are composed in application code, never in a distributed query.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use wayfare_core::error::DomainError;

use crate::error::map_sqlx;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRevenue {
    pub listing_type: String,
    pub listing_id: Uuid,
    pub listing_name: String,
    pub total_revenue: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityRevenue {
    pub city: String,
    pub total_revenue: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRevenue {
    pub provider: String,
    pub item_type: String,
    pub total_revenue: i64,
    pub items_sold: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct CityRevenueRow {
    city: Option<String>,
    total_revenue: i64,
}

fn year_window(year: i32) -> Result<(DateTime<Utc>, DateTime<Utc>), DomainError> {
    let from = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(DomainError::InvalidYear)?;
    let to = NaiveDate::from_ymd_opt(year + 1, 1, 1).ok_or(DomainError::InvalidYear)?;
    Ok((
        from.and_time(NaiveTime::MIN).and_utc(),
        to.and_time(NaiveTime::MIN).and_utc(),
    ))
}

fn month_window(year: i32, month: u32) -> Result<(DateTime<Utc>, DateTime<Utc>), DomainError> {
    let from = NaiveDate::from_ymd_opt(year, month, 1).ok_or(DomainError::InvalidMonth)?;
    let to = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1).ok_or(DomainError::InvalidYear)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1).ok_or(DomainError::InvalidMonth)?
    };
    Ok((
        from.and_time(NaiveTime::MIN).and_utc(),
        to.and_time(NaiveTime::MIN).and_utc(),
    ))
}

pub struct AnalyticsRepository;

impl AnalyticsRepository {
    /// Revenue per confirmed listing in a calendar year, largest first.
    /// Listing names are derived: hotels by name, flights by
    /// "airline flightNumber", cars by "provider make model".
    pub async fn top_properties_by_revenue(
        pool: &PgPool,
        year: i32,
        limit: i64,
    ) -> Result<Vec<PropertyRevenue>, DomainError> {
        let (from, to) = year_window(year)?;

        let rows = sqlx::query_as::<_, PropertyRevenue>(
            "SELECT * FROM ( \
                 SELECT 'HOTEL' AS listing_type, h.id AS listing_id, h.name AS listing_name, \
                        SUM(bi.total_price)::BIGINT AS total_revenue, MAX(bi.currency) AS currency \
                 FROM booking_items bi \
                 JOIN bookings b ON b.id = bi.booking_id \
                 JOIN hotels h ON h.id = bi.hotel_id \
                 WHERE b.status = 'CONFIRMED' AND bi.item_type = 'HOTEL' \
                   AND b.created_at >= $1 AND b.created_at < $2 \
                 GROUP BY h.id, h.name \
             UNION ALL \
                 SELECT 'FLIGHT', f.id, f.airline || ' ' || f.flight_number, \
                        SUM(bi.total_price)::BIGINT, MAX(bi.currency) \
                 FROM booking_items bi \
                 JOIN bookings b ON b.id = bi.booking_id \
                 JOIN flights f ON f.id = bi.flight_id \
                 WHERE b.status = 'CONFIRMED' AND bi.item_type = 'FLIGHT' \
                   AND b.created_at >= $1 AND b.created_at < $2 \
                 GROUP BY f.id, f.airline, f.flight_number \
             UNION ALL \
                 SELECT 'CAR', c.id, c.provider_name || ' ' || c.make || ' ' || c.model, \
                        SUM(bi.total_price)::BIGINT, MAX(bi.currency) \
                 FROM booking_items bi \
                 JOIN bookings b ON b.id = bi.booking_id \
                 JOIN cars c ON c.id = bi.car_id \
                 WHERE b.status = 'CONFIRMED' AND bi.item_type = 'CAR' \
                   AND b.created_at >= $1 AND b.created_at < $2 \
                 GROUP BY c.id, c.provider_name, c.make, c.model \
             ) ranked \
             ORDER BY total_revenue DESC, listing_id ASC \
             LIMIT $3",
        )
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(map_sqlx)?;

        Ok(rows)
    }

    /// Confirmed revenue attributed to cities: hotel city, car pickup city
    /// and the flight origin airport's city, merged and sorted descending.
    pub async fn city_revenue_for_year(
        pool: &PgPool,
        year: i32,
    ) -> Result<Vec<CityRevenue>, DomainError> {
        let (from, to) = year_window(year)?;

        let hotels = sqlx::query_as::<_, CityRevenueRow>(
            "SELECT h.city AS city, SUM(bi.total_price)::BIGINT AS total_revenue \
             FROM booking_items bi \
             JOIN bookings b ON b.id = bi.booking_id \
             JOIN hotels h ON h.id = bi.hotel_id \
             WHERE b.status = 'CONFIRMED' AND bi.item_type = 'HOTEL' \
               AND b.created_at >= $1 AND b.created_at < $2 \
             GROUP BY h.city",
        )
        .bind(from)
        .bind(to)
        .fetch_all(pool);

        let cars = sqlx::query_as::<_, CityRevenueRow>(
            "SELECT c.pickup_city AS city, SUM(bi.total_price)::BIGINT AS total_revenue \
             FROM booking_items bi \
             JOIN bookings b ON b.id = bi.booking_id \
             JOIN cars c ON c.id = bi.car_id \
             WHERE b.status = 'CONFIRMED' AND bi.item_type = 'CAR' \
               AND b.created_at >= $1 AND b.created_at < $2 \
             GROUP BY c.pickup_city",
        )
        .bind(from)
        .bind(to)
        .fetch_all(pool);

        let flights = sqlx::query_as::<_, CityRevenueRow>(
            "SELECT a.city AS city, SUM(bi.total_price)::BIGINT AS total_revenue \
             FROM booking_items bi \
             JOIN bookings b ON b.id = bi.booking_id \
             JOIN flights f ON f.id = bi.flight_id \
             LEFT JOIN airports a ON a.id = f.origin_airport_id \
             WHERE b.status = 'CONFIRMED' AND bi.item_type = 'FLIGHT' \
               AND b.created_at >= $1 AND b.created_at < $2 \
             GROUP BY a.city",
        )
        .bind(from)
        .bind(to)
        .fetch_all(pool);

        let (hotels, cars, flights) = tokio::try_join!(hotels, cars, flights).map_err(map_sqlx)?;

        let mut merged = std::collections::HashMap::<String, i64>::new();
        for row in hotels.into_iter().chain(cars).chain(flights) {
            let city = row.city.unwrap_or_else(|| "Unknown".to_string());
            *merged.entry(city).or_default() += row.total_revenue;
        }

        let mut cities: Vec<CityRevenue> = merged
            .into_iter()
            .map(|(city, total_revenue)| CityRevenue { city, total_revenue })
            .collect();
        cities.sort_by(|a, b| b.total_revenue.cmp(&a.total_revenue).then(a.city.cmp(&b.city)));

        Ok(cities)
    }

    /// Confirmed items in a calendar month grouped by (provider, itemType).
    pub async fn top_providers_for_month(
        pool: &PgPool,
        year: i32,
        month: u32,
        limit: i64,
    ) -> Result<Vec<ProviderRevenue>, DomainError> {
        let (from, to) = month_window(year, month)?;

        let rows = sqlx::query_as::<_, ProviderRevenue>(
            "SELECT * FROM ( \
                 SELECT f.airline AS provider, 'FLIGHT' AS item_type, \
                        SUM(bi.total_price)::BIGINT AS total_revenue, COUNT(*)::BIGINT AS items_sold \
                 FROM booking_items bi \
                 JOIN bookings b ON b.id = bi.booking_id \
                 JOIN flights f ON f.id = bi.flight_id \
                 WHERE b.status = 'CONFIRMED' AND bi.item_type = 'FLIGHT' \
                   AND b.created_at >= $1 AND b.created_at < $2 \
                 GROUP BY f.airline \
             UNION ALL \
                 SELECT h.name, 'HOTEL', SUM(bi.total_price)::BIGINT, COUNT(*)::BIGINT \
                 FROM booking_items bi \
                 JOIN bookings b ON b.id = bi.booking_id \
                 JOIN hotels h ON h.id = bi.hotel_id \
                 WHERE b.status = 'CONFIRMED' AND bi.item_type = 'HOTEL' \
                   AND b.created_at >= $1 AND b.created_at < $2 \
                 GROUP BY h.name \
             UNION ALL \
                 SELECT c.provider_name, 'CAR', SUM(bi.total_price)::BIGINT, COUNT(*)::BIGINT \
                 FROM booking_items bi \
                 JOIN bookings b ON b.id = bi.booking_id \
                 JOIN cars c ON c.id = bi.car_id \
                 WHERE b.status = 'CONFIRMED' AND bi.item_type = 'CAR' \
                   AND b.created_at >= $1 AND b.created_at < $2 \
                 GROUP BY c.provider_name \
             ) ranked \
             ORDER BY total_revenue DESC, provider ASC \
             LIMIT $3",
        )
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(map_sqlx)?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_window_covers_the_calendar_year() {
        let (from, to) = year_window(2025).unwrap();
        assert_eq!(from.to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2026-01-01T00:00:00+00:00");
    }

    #[test]
    fn december_window_rolls_into_the_next_year() {
        let (from, to) = month_window(2025, 12).unwrap();
        assert_eq!(from.to_rfc3339(), "2025-12-01T00:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2026-01-01T00:00:00+00:00");
    }

    #[test]
    fn month_thirteen_is_invalid() {
        assert!(matches!(month_window(2025, 13), Err(DomainError::InvalidMonth)));
    }
}
