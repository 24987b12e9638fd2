//! Normalized, validated search parameters. HTTP query structs deserialize
//! loosely (everything optional) and are tightened here so the store layer
//! only ever sees well-formed filters.

use chrono::NaiveDate;

use wayfare_core::catalog::CarType;
use wayfare_core::error::DomainError;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub number: i64,
    pub size: i64,
}

impl Page {
    pub fn clamped(number: Option<i64>, size: Option<i64>) -> Self {
        Page {
            number: number.unwrap_or(1).max(1),
            size: size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.size
    }

    pub fn limit(&self) -> i64 {
        self.size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: Option<&str>) -> Result<Self, DomainError> {
        match raw {
            None | Some("asc") => Ok(SortOrder::Asc),
            Some("desc") => Ok(SortOrder::Desc),
            Some(_) => Err(DomainError::MissingField("sortOrder")),
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightSortBy {
    Price,
    Duration,
}

impl FlightSortBy {
    pub fn parse(raw: Option<&str>) -> Result<Self, DomainError> {
        match raw {
            None | Some("price") => Ok(FlightSortBy::Price),
            Some("duration") => Ok(FlightSortBy::Duration),
            Some(_) => Err(DomainError::MissingField("sortBy")),
        }
    }
}

/// `"0"` and `"1"` filter exactly; `"2"` means two or more stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopsFilter {
    Exactly(i32),
    TwoOrMore,
}

impl StopsFilter {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        match raw {
            "0" => Ok(StopsFilter::Exactly(0)),
            "1" => Ok(StopsFilter::Exactly(1)),
            "2" => Ok(StopsFilter::TwoOrMore),
            _ => Err(DomainError::MissingField("stops")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FlightSearch {
    pub origin_iata: String,
    pub destination_iata: String,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub passengers: i32,
    pub price_max: Option<i64>,
    pub stops: Option<StopsFilter>,
    pub sort_by: FlightSortBy,
    pub sort_order: SortOrder,
    pub page: Page,
}

pub struct FlightSearchInput {
    pub origin_iata: Option<String>,
    pub destination_iata: Option<String>,
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub passengers: Option<i32>,
    pub price_max: Option<i64>,
    pub stops: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl FlightSearch {
    pub fn validate(input: FlightSearchInput) -> Result<Self, DomainError> {
        let origin_iata = input
            .origin_iata
            .filter(|s| !s.is_empty())
            .ok_or(DomainError::MissingField("originIata"))?;
        let destination_iata = input
            .destination_iata
            .filter(|s| !s.is_empty())
            .ok_or(DomainError::MissingField("destinationIata"))?;
        let departure_date = input
            .departure_date
            .ok_or(DomainError::MissingField("departureDate"))?;
        if let Some(ret) = input.return_date {
            if ret < departure_date {
                return Err(DomainError::InvalidDateRange);
            }
        }
        let passengers = input.passengers.unwrap_or(1);
        if passengers < 1 {
            return Err(DomainError::InvalidSeatCount);
        }
        let stops = input.stops.as_deref().map(StopsFilter::parse).transpose()?;

        Ok(FlightSearch {
            origin_iata: origin_iata.to_uppercase(),
            destination_iata: destination_iata.to_uppercase(),
            departure_date,
            return_date: input.return_date,
            passengers,
            price_max: input.price_max,
            stops,
            sort_by: FlightSortBy::parse(input.sort_by.as_deref())?,
            sort_order: SortOrder::parse(input.sort_order.as_deref())?,
            page: Page::clamped(input.page, input.page_size),
        })
    }
}

#[derive(Debug, Clone)]
pub struct HotelSearch {
    pub city: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub price_max: Option<i64>,
    pub min_stars: Option<i32>,
    pub sort_order: SortOrder,
    pub page: Page,
}

pub struct HotelSearchInput {
    pub city: Option<String>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests: Option<i32>,
    pub price_max: Option<i64>,
    pub min_stars: Option<i32>,
    pub sort_order: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl HotelSearch {
    pub fn validate(input: HotelSearchInput) -> Result<Self, DomainError> {
        let city = input
            .city
            .filter(|s| !s.is_empty())
            .ok_or(DomainError::MissingField("city"))?;
        let check_in = input.check_in.ok_or(DomainError::MissingField("checkInDate"))?;
        let check_out = input.check_out.ok_or(DomainError::MissingField("checkOutDate"))?;
        if check_out <= check_in {
            return Err(DomainError::InvalidDateRange);
        }

        Ok(HotelSearch {
            city,
            check_in,
            check_out,
            guests: input.guests.unwrap_or(1).max(1),
            price_max: input.price_max,
            min_stars: input.min_stars,
            sort_order: SortOrder::parse(input.sort_order.as_deref())?,
            page: Page::clamped(input.page, input.page_size),
        })
    }
}

#[derive(Debug, Clone)]
pub struct CarSearch {
    pub pickup_city: String,
    pub dropoff_city: Option<String>,
    pub pickup_date: NaiveDate,
    pub dropoff_date: NaiveDate,
    pub price_max: Option<i64>,
    pub car_type: Option<CarType>,
    pub sort_order: SortOrder,
    pub page: Page,
}

pub struct CarSearchInput {
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub pickup_date: Option<NaiveDate>,
    pub dropoff_date: Option<NaiveDate>,
    pub price_max: Option<i64>,
    pub car_type: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl CarSearch {
    pub fn validate(input: CarSearchInput) -> Result<Self, DomainError> {
        let pickup_city = input
            .pickup_location
            .filter(|s| !s.is_empty())
            .ok_or(DomainError::MissingField("pickupLocation"))?;
        let pickup_date = input.pickup_date.ok_or(DomainError::MissingField("pickupDate"))?;
        let dropoff_date = input.dropoff_date.ok_or(DomainError::MissingField("dropoffDate"))?;
        if dropoff_date <= pickup_date {
            return Err(DomainError::InvalidDateRange);
        }
        let car_type = input
            .car_type
            .as_deref()
            .map(|raw| {
                raw.parse::<CarType>()
                    .map_err(|_| DomainError::MissingField("carType"))
            })
            .transpose()?;

        Ok(CarSearch {
            pickup_city,
            dropoff_city: input.dropoff_location,
            pickup_date,
            dropoff_date,
            price_max: input.price_max,
            car_type,
            sort_order: SortOrder::parse(input.sort_order.as_deref())?,
            page: Page::clamped(input.page, input.page_size),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn flight_input() -> FlightSearchInput {
        FlightSearchInput {
            origin_iata: Some("sfo".into()),
            destination_iata: Some("JFK".into()),
            departure_date: Some(d("2025-07-01")),
            return_date: None,
            passengers: None,
            price_max: None,
            stops: None,
            sort_by: None,
            sort_order: None,
            page: None,
            page_size: None,
        }
    }

    #[test]
    fn flight_defaults_and_uppercasing() {
        let search = FlightSearch::validate(flight_input()).unwrap();
        assert_eq!(search.origin_iata, "SFO");
        assert_eq!(search.passengers, 1);
        assert_eq!(search.sort_by, FlightSortBy::Price);
        assert_eq!(search.sort_order, SortOrder::Asc);
        assert_eq!(search.page.limit(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn missing_origin_reports_the_field_name() {
        let mut input = flight_input();
        input.origin_iata = None;
        let err = FlightSearch::validate(input).unwrap_err();
        assert_eq!(err.code(), "originIata");
    }

    #[test]
    fn return_before_departure_is_invalid() {
        let mut input = flight_input();
        input.return_date = Some(d("2025-06-01"));
        assert!(matches!(
            FlightSearch::validate(input),
            Err(DomainError::InvalidDateRange)
        ));
    }

    #[test]
    fn stops_two_means_two_or_more() {
        assert_eq!(StopsFilter::parse("0").unwrap(), StopsFilter::Exactly(0));
        assert_eq!(StopsFilter::parse("2").unwrap(), StopsFilter::TwoOrMore);
        assert!(StopsFilter::parse("3").is_err());
    }

    #[test]
    fn page_clamps() {
        let page = Page::clamped(Some(0), Some(5_000));
        assert_eq!(page.number, 1);
        assert_eq!(page.size, MAX_PAGE_SIZE);
        assert_eq!(page.offset(), 0);

        let page = Page::clamped(Some(3), Some(25));
        assert_eq!(page.offset(), 50);
    }

    #[test]
    fn hotel_rejects_non_positive_stay() {
        let input = HotelSearchInput {
            city: Some("Denver".into()),
            check_in: Some(d("2025-07-04")),
            check_out: Some(d("2025-07-04")),
            guests: None,
            price_max: None,
            min_stars: None,
            sort_order: None,
            page: None,
            page_size: None,
        };
        assert!(matches!(
            HotelSearch::validate(input),
            Err(DomainError::InvalidDateRange)
        ));
    }

    #[test]
    fn car_type_filter_parses() {
        let input = CarSearchInput {
            pickup_location: Some("Austin".into()),
            dropoff_location: None,
            pickup_date: Some(d("2025-07-01")),
            dropoff_date: Some(d("2025-07-03")),
            price_max: None,
            car_type: Some("SUV".into()),
            sort_order: None,
            page: None,
            page_size: None,
        };
        let search = CarSearch::validate(input).unwrap();
        assert_eq!(search.car_type, Some(CarType::Suv));
    }
}
