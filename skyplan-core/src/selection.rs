use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Trip type as the booking backend spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum TripType {
    #[default]
    OneWay,
    RoundTrip,
}

impl TripType {
    /// Only the literal `round-trip` marker selects a round trip.
    pub fn normalize(raw: &str) -> Self {
        if raw.trim() == "round-trip" {
            TripType::RoundTrip
        } else {
            TripType::OneWay
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TripType::OneWay => "one-way",
            TripType::RoundTrip => "round-trip",
        }
    }
}

impl From<String> for TripType {
    fn from(raw: String) -> Self {
        Self::normalize(&raw)
    }
}

impl From<TripType> for &'static str {
    fn from(value: TripType) -> Self {
        value.as_str()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum FareClass {
    #[default]
    Economy,
    PremiumEconomy,
    Business,
}

impl FareClass {
    /// Substring match, case-insensitive. `business` wins over `premium`.
    pub fn normalize(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        if lowered.contains("business") {
            FareClass::Business
        } else if lowered.contains("premium") {
            FareClass::PremiumEconomy
        } else {
            FareClass::Economy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FareClass::Economy => "economy",
            FareClass::PremiumEconomy => "premium-economy",
            FareClass::Business => "business",
        }
    }

    pub fn all() -> [FareClass; 3] {
        [FareClass::Economy, FareClass::PremiumEconomy, FareClass::Business]
    }
}

impl From<String> for FareClass {
    fn from(raw: String) -> Self {
        Self::normalize(&raw)
    }
}

impl From<FareClass> for &'static str {
    fn from(value: FareClass) -> Self {
        value.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSelection {
    #[serde(alias = "fromCode")]
    pub origin: String,
    #[serde(alias = "toCode")]
    pub destination: String,
    #[serde(default, alias = "tripType")]
    pub trip_type: TripType,
    #[serde(alias = "departDateISO")]
    pub outbound_date: NaiveDate,
    #[serde(default, alias = "returnDateISO")]
    pub return_date: Option<NaiveDate>,
    #[serde(default, alias = "outboundFlightId")]
    pub outbound_flight_id: Option<u64>,
    #[serde(default, alias = "inboundFlightId")]
    pub inbound_flight_id: Option<u64>,
    #[serde(default, alias = "outboundPrice")]
    pub outbound_price: u64,
    #[serde(default, alias = "inboundPrice")]
    pub inbound_price: Option<u64>,
}

impl TripSelection {
    pub fn one_way(
        origin: impl Into<String>,
        destination: impl Into<String>,
        outbound_date: NaiveDate,
        outbound_flight_id: u64,
        outbound_price: u64,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            trip_type: TripType::OneWay,
            outbound_date,
            return_date: None,
            outbound_flight_id: Some(outbound_flight_id),
            inbound_flight_id: None,
            outbound_price,
            inbound_price: None,
        }
    }

    /// Adds a return leg and switches the trip to round-trip.
    pub fn with_return(mut self, return_date: NaiveDate, inbound_flight_id: u64, inbound_price: u64) -> Self {
        self.trip_type = TripType::RoundTrip;
        self.return_date = Some(return_date);
        self.inbound_flight_id = Some(inbound_flight_id);
        self.inbound_price = Some(inbound_price);
        self
    }

    pub fn is_round_trip(&self) -> bool {
        self.trip_type == TripType::RoundTrip
    }

    /// Outbound price plus the inbound price for round trips.
    pub fn leg_price_total(&self) -> u64 {
        let inbound = if self.is_round_trip() {
            self.inbound_price.unwrap_or(0)
        } else {
            0
        };
        self.outbound_price.saturating_add(inbound)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.origin.trim().is_empty() || self.destination.trim().is_empty() {
            return Err(CoreError::ValidationError("origin and destination are required".into()));
        }
        match (self.trip_type, self.return_date) {
            (TripType::OneWay, Some(_)) => {
                return Err(CoreError::ValidationError("one-way trip cannot carry a return date".into()));
            }
            (_, Some(ret)) if ret < self.outbound_date => {
                return Err(CoreError::ValidationError(format!(
                    "return date {} is before outbound date {}",
                    ret, self.outbound_date
                )));
            }
            _ => {}
        }
        match (self.trip_type, self.inbound_flight_id) {
            (TripType::RoundTrip, None) => Err(CoreError::ValidationError(
                "round-trip requires an inbound flight".into(),
            )),
            (TripType::OneWay, Some(_)) => Err(CoreError::ValidationError(
                "one-way trip cannot carry an inbound flight".into(),
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareSelection {
    #[serde(alias = "fareClass", alias = "class")]
    pub fare_class: FareClass,
    #[serde(default)]
    pub price: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatAssignment {
    #[serde(alias = "code", alias = "seat")]
    pub label: String,
    #[serde(default)]
    pub price: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeatSelection {
    #[serde(default)]
    pub seats: Vec<SeatAssignment>,
    #[serde(default, alias = "fareClass")]
    pub fare_class: Option<FareClass>,
}

impl SeatSelection {
    pub fn seat_total(&self) -> u64 {
        self.seats.iter().fold(0u64, |acc, s| acc.saturating_add(s.price))
    }

    /// True when at least one seat was individually priced.
    pub fn is_priced(&self) -> bool {
        self.seats.iter().any(|s| s.price > 0)
    }

    pub fn labels(&self) -> Vec<String> {
        self.seats.iter().map(|s| s.label.clone()).collect()
    }
}
