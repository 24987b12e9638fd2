use chrono::{Duration, NaiveTime};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use wayfare_catalog::search::{CarSearch, FlightSearch, FlightSortBy, HotelSearch, StopsFilter};
use wayfare_core::catalog::{Car, Flight, Hotel};
use wayfare_core::error::DomainError;

use crate::error::map_sqlx;
use crate::rows::{CarRow, FlightRow, HotelRow};

pub struct CatalogRepository;

impl CatalogRepository {
    // ------------------------------------------------------------------
    // Flights
    // ------------------------------------------------------------------

    pub async fn search_flights(
        pool: &PgPool,
        search: &FlightSearch,
    ) -> Result<(Vec<Flight>, i64), DomainError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT f.* FROM flights f ");
        push_flight_filters(&mut qb, search);
        let (by, order) = match search.sort_by {
            FlightSortBy::Price => ("f.base_price", search.sort_order.sql()),
            FlightSortBy::Duration => ("f.total_duration_minutes", search.sort_order.sql()),
        };
        qb.push(format!(" ORDER BY {by} {order}, f.id ASC LIMIT "));
        qb.push_bind(search.page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(search.page.offset());

        let rows: Vec<FlightRow> = qb
            .build_query_as()
            .fetch_all(pool)
            .await
            .map_err(map_sqlx)?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM flights f ");
        push_flight_filters(&mut count, search);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(pool)
            .await
            .map_err(map_sqlx)?;

        Ok((rows.into_iter().map(Flight::from).collect(), total))
    }

    pub async fn find_flight(pool: &PgPool, id: Uuid) -> Result<Option<Flight>, DomainError> {
        let row = sqlx::query_as::<_, FlightRow>("SELECT * FROM flights WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(map_sqlx)?;

        Ok(row.map(Flight::from))
    }

    // ------------------------------------------------------------------
    // Hotels
    // ------------------------------------------------------------------

    pub async fn search_hotels(
        pool: &PgPool,
        search: &HotelSearch,
    ) -> Result<(Vec<Hotel>, i64), DomainError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT h.* FROM hotels h ");
        push_hotel_filters(&mut qb, search);
        qb.push(format!(
            " ORDER BY h.base_price_per_night {}, h.id ASC LIMIT ",
            search.sort_order.sql()
        ));
        qb.push_bind(search.page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(search.page.offset());

        let rows: Vec<HotelRow> = qb
            .build_query_as()
            .fetch_all(pool)
            .await
            .map_err(map_sqlx)?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM hotels h ");
        push_hotel_filters(&mut count, search);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(pool)
            .await
            .map_err(map_sqlx)?;

        Ok((rows.into_iter().map(Hotel::from).collect(), total))
    }

    pub async fn find_hotel(pool: &PgPool, id: Uuid) -> Result<Option<Hotel>, DomainError> {
        let row = sqlx::query_as::<_, HotelRow>("SELECT * FROM hotels WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(map_sqlx)?;

        Ok(row.map(Hotel::from))
    }

    // ------------------------------------------------------------------
    // Cars
    // ------------------------------------------------------------------

    pub async fn search_cars(
        pool: &PgPool,
        search: &CarSearch,
    ) -> Result<(Vec<Car>, i64), DomainError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT c.* FROM cars c ");
        push_car_filters(&mut qb, search);
        qb.push(format!(
            " ORDER BY c.daily_price {}, c.id ASC LIMIT ",
            search.sort_order.sql()
        ));
        qb.push_bind(search.page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(search.page.offset());

        let rows: Vec<CarRow> = qb
            .build_query_as()
            .fetch_all(pool)
            .await
            .map_err(map_sqlx)?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM cars c ");
        push_car_filters(&mut count, search);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(pool)
            .await
            .map_err(map_sqlx)?;

        Ok((rows.into_iter().map(Car::from).collect(), total))
    }

    pub async fn find_car(pool: &PgPool, id: Uuid) -> Result<Option<Car>, DomainError> {
        let row = sqlx::query_as::<_, CarRow>("SELECT * FROM cars WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(map_sqlx)?;

        Ok(row.map(Car::from))
    }
}

fn push_flight_filters(qb: &mut QueryBuilder<'_, Postgres>, search: &FlightSearch) {
    let day_start = search.departure_date.and_time(NaiveTime::MIN).and_utc();
    let day_end = day_start + Duration::days(1);

    qb.push(
        "JOIN airports o ON o.id = f.origin_airport_id \
         JOIN airports d ON d.id = f.destination_airport_id \
         WHERE f.is_active = TRUE",
    );
    qb.push(" AND o.iata_code = ").push_bind(search.origin_iata.clone());
    qb.push(" AND d.iata_code = ").push_bind(search.destination_iata.clone());
    qb.push(" AND f.departure_time >= ").push_bind(day_start);
    qb.push(" AND f.departure_time < ").push_bind(day_end);
    qb.push(" AND f.seats_available >= ").push_bind(search.passengers);
    if let Some(price_max) = search.price_max {
        qb.push(" AND f.base_price <= ").push_bind(price_max);
    }
    match search.stops {
        Some(StopsFilter::Exactly(n)) => {
            qb.push(" AND f.stops = ").push_bind(n);
        }
        Some(StopsFilter::TwoOrMore) => {
            qb.push(" AND f.stops >= 2");
        }
        None => {}
    }
}

fn push_hotel_filters(qb: &mut QueryBuilder<'_, Postgres>, search: &HotelSearch) {
    qb.push("WHERE h.is_active = TRUE");
    qb.push(" AND LOWER(h.city) = LOWER(").push_bind(search.city.clone());
    qb.push(")");
    if let Some(price_max) = search.price_max {
        qb.push(" AND h.base_price_per_night <= ").push_bind(price_max);
    }
    if let Some(min_stars) = search.min_stars {
        qb.push(" AND h.star_rating >= ").push_bind(min_stars);
    }
}

fn push_car_filters(qb: &mut QueryBuilder<'_, Postgres>, search: &CarSearch) {
    qb.push("WHERE c.is_active = TRUE");
    qb.push(" AND LOWER(c.pickup_city) = LOWER(").push_bind(search.pickup_city.clone());
    qb.push(")");
    if let Some(price_max) = search.price_max {
        qb.push(" AND c.daily_price <= ").push_bind(price_max);
    }
    if let Some(car_type) = search.car_type {
        qb.push(" AND c.car_type = ").push_bind(car_type.to_string());
    }
}
