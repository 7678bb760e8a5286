use serde::Serialize;
use skyplan_core::{FareClass, FareSelection, TripSelection};

use crate::pricing::PricingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FareQuote {
    pub fare_class: FareClass,
    pub price: u64,
}

/// Prices for each fare class on the current trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FareQuotes {
    pub base: u64,
    pub quotes: Vec<FareQuote>,
}

impl FareQuotes {
    pub fn for_trip(trip: Option<&TripSelection>, config: &PricingConfig) -> Self {
        let base = trip
            .map(|t| t.leg_price_total())
            .filter(|p| *p > 0)
            .unwrap_or(config.default_base_fare);

        let quotes = FareClass::all()
            .into_iter()
            .map(|fare_class| {
                let multiplier = match fare_class {
                    FareClass::Economy => 1.0,
                    FareClass::PremiumEconomy => config.premium_multiplier,
                    FareClass::Business => config.business_multiplier,
                };
                FareQuote {
                    fare_class,
                    price: (base as f64 * multiplier).round() as u64,
                }
            })
            .collect();

        Self { base, quotes }
    }

    pub fn price_of(&self, fare_class: FareClass) -> u64 {
        self.quotes
            .iter()
            .find(|q| q.fare_class == fare_class)
            .map(|q| q.price)
            .unwrap_or(self.base)
    }

    pub fn select(&self, fare_class: FareClass) -> FareSelection {
        FareSelection {
            fare_class,
            price: self.price_of(fare_class),
        }
    }
}
