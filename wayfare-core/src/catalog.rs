//! Inventory catalog entities. Prices are integer minor units (cents).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airport {
    pub id: Uuid,
    pub iata_code: String,
    pub city: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: Uuid,
    pub airline: String,
    pub flight_number: String,
    pub origin_airport_id: Uuid,
    pub destination_airport_id: Uuid,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub cabin_class: String,
    pub base_price: i64,
    pub currency: String,
    pub seats_available: i32,
    pub stops: i32,
    pub total_duration_minutes: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub state: Option<String>,
    pub star_rating: i32,
    pub base_price_per_night: i64,
    pub currency: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarType {
    Economy,
    Compact,
    Suv,
    Luxury,
}

impl std::fmt::Display for CarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CarType::Economy => "ECONOMY",
            CarType::Compact => "COMPACT",
            CarType::Suv => "SUV",
            CarType::Luxury => "LUXURY",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for CarType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ECONOMY" => Ok(CarType::Economy),
            "COMPACT" => Ok(CarType::Compact),
            "SUV" => Ok(CarType::Suv),
            "LUXURY" => Ok(CarType::Luxury),
            other => Err(format!("unknown car type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: Uuid,
    pub provider_name: String,
    pub make: String,
    pub model: String,
    pub car_type: CarType,
    pub seats: i32,
    pub transmission: String,
    pub pickup_city: String,
    pub daily_price: i64,
    pub currency: String,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn car_type_wire_form_is_screaming() {
        let raw = serde_json::to_string(&CarType::Suv).unwrap();
        assert_eq!(raw, "\"SUV\"");
        assert_eq!("LUXURY".parse::<CarType>().unwrap(), CarType::Luxury);
        assert!("TRUCK".parse::<CarType>().is_err());
    }
}
