use serde::Serialize;
use skyplan_core::{BookingTotals, ExtrasSelection, FareSelection, SeatSelection, TripSelection};
use skyplan_store::app_config::PricingSettings;
use tracing::warn;

use crate::fallback::{FallbackChain, Resolved};
use crate::session::SessionSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseFareSource {
    SeatPrices,
    FareSelection,
    TripLegPrices,
    CachedBaseFare,
    Default,
}

impl BaseFareSource {
    /// Derived from what the visitor selected, as opposed to a cache or 0.
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            BaseFareSource::SeatPrices | BaseFareSource::FareSelection | BaseFareSource::TripLegPrices
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrandTotalSource {
    Computed,
    PersistedFallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct PricingConfig {
    /// Surcharge applied to the base fare only
    pub tax_rate: f64,

    /// Economy quote when the trip carries no leg prices
    pub default_base_fare: u64,

    /// Premium-economy quote relative to economy
    pub premium_multiplier: f64,

    /// Business quote relative to economy
    pub business_multiplier: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self::from(&PricingSettings::default())
    }
}

impl From<&PricingSettings> for PricingConfig {
    fn from(s: &PricingSettings) -> Self {
        Self {
            tax_rate: s.tax_rate,
            default_base_fare: s.default_base_fare,
            premium_multiplier: s.premium_multiplier,
            business_multiplier: s.business_multiplier,
        }
    }
}

/// Session fields the resolver reads. Any of them may be missing.
#[derive(Debug, Clone, Default)]
pub struct PricingInputs {
    pub trip: Option<TripSelection>,
    pub fare: Option<FareSelection>,
    pub seats: Option<SeatSelection>,
    pub extras: Option<ExtrasSelection>,
    pub cached_base_fare: Option<u64>,
    pub persisted_grand_total: Option<u64>,
}

impl From<&SessionSnapshot> for PricingInputs {
    fn from(s: &SessionSnapshot) -> Self {
        Self {
            trip: s.trip.clone(),
            fare: s.fare.clone(),
            seats: s.seats.clone(),
            extras: s.extras.clone(),
            cached_base_fare: s.cached_base_fare,
            persisted_grand_total: s.cached_grand_total,
        }
    }
}

/// The grand total computed to 0 while an earlier non-zero total was stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PricingInconsistency {
    pub computed: u64,
    pub persisted: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingOutcome {
    pub totals: BookingTotals,
    pub base_fare_source: BaseFareSource,
    pub grand_total_source: GrandTotalSource,
    pub inconsistency: Option<PricingInconsistency>,
}

pub struct PricingResolver {
    config: PricingConfig,
}

impl PricingResolver {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    pub fn base_fare(&self, inputs: &PricingInputs) -> Resolved<u64, BaseFareSource> {
        let seats = inputs
            .seats
            .as_ref()
            .filter(|s| s.is_priced())
            .map(|s| s.seat_total());
        let fare = inputs.fare.as_ref().map(|f| f.price).filter(|p| *p > 0);
        let legs = inputs
            .trip
            .as_ref()
            .map(|t| t.leg_price_total())
            .filter(|p| *p > 0);
        let cached = inputs.cached_base_fare.filter(|p| *p > 0);

        FallbackChain::new()
            .then(BaseFareSource::SeatPrices, seats)
            .then(BaseFareSource::FareSelection, fare)
            .then(BaseFareSource::TripLegPrices, legs)
            .then(BaseFareSource::CachedBaseFare, cached)
            .resolve_or(BaseFareSource::Default, 0)
    }

    /// Always recomputed from line items; the stored cache is ignored.
    pub fn extras_subtotal(&self, inputs: &PricingInputs) -> u64 {
        inputs.extras.as_ref().map(|e| e.recomputed_total()).unwrap_or(0)
    }

    pub fn tax(&self, base_fare: u64) -> u64 {
        if base_fare == 0 {
            return 0;
        }
        (base_fare as f64 * self.config.tax_rate).round() as u64
    }

    pub fn resolve(&self, inputs: &PricingInputs) -> PricingOutcome {
        let base = self.base_fare(inputs);
        let extras_subtotal = self.extras_subtotal(inputs);
        let tax = self.tax(base.value);
        let computed = base.value.saturating_add(extras_subtotal).saturating_add(tax);

        let mut totals = BookingTotals {
            base_fare: base.value,
            extras_subtotal,
            tax,
            grand_total: computed,
        };

        let persisted = inputs.persisted_grand_total.unwrap_or(0);
        if computed == 0 && persisted > 0 {
            warn!(
                "grand total computed to 0, keeping persisted total {}",
                persisted
            );
            totals.grand_total = persisted;
            return PricingOutcome {
                totals,
                base_fare_source: base.source,
                grand_total_source: GrandTotalSource::PersistedFallback,
                inconsistency: Some(PricingInconsistency { computed, persisted }),
            };
        }

        PricingOutcome {
            totals,
            base_fare_source: base.source,
            grand_total_source: GrandTotalSource::Computed,
            inconsistency: None,
        }
    }
}

impl Default for PricingResolver {
    fn default() -> Self {
        Self::new(PricingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use skyplan_core::{BaggageTier, FareClass, MealChoice, SeatAssignment, ServiceChoice};

    fn trip(price: u64) -> TripSelection {
        TripSelection::one_way("HAN", "SGN", NaiveDate::from_ymd_opt(2025, 12, 20).unwrap(), 1, price)
    }

    fn seats(prices: &[u64]) -> SeatSelection {
        SeatSelection {
            seats: prices
                .iter()
                .enumerate()
                .map(|(i, p)| SeatAssignment { label: format!("{}A", i + 1), price: *p })
                .collect(),
            fare_class: Some(FareClass::Economy),
        }
    }

    #[test]
    fn test_base_fare_sums_seat_prices() {
        let resolver = PricingResolver::default();
        let inputs = PricingInputs {
            seats: Some(seats(&[300_000, 450_000, 0])),
            fare: Some(FareSelection { fare_class: FareClass::Economy, price: 999 }),
            ..Default::default()
        };
        let base = resolver.base_fare(&inputs);
        assert_eq!(base.value, 750_000);
        assert_eq!(base.source, BaseFareSource::SeatPrices);
    }

    #[test]
    fn test_base_fare_fallback_order() {
        let resolver = PricingResolver::default();
        let mut inputs = PricingInputs {
            seats: Some(seats(&[0, 0])),
            fare: Some(FareSelection { fare_class: FareClass::Business, price: 3_000_000 }),
            trip: Some(trip(1_200_000)),
            cached_base_fare: Some(800_000),
            ..Default::default()
        };
        assert_eq!(resolver.base_fare(&inputs).source, BaseFareSource::FareSelection);
        assert_eq!(resolver.base_fare(&inputs).value, 3_000_000);

        inputs.fare = None;
        assert_eq!(resolver.base_fare(&inputs).source, BaseFareSource::TripLegPrices);

        inputs.trip = None;
        assert_eq!(resolver.base_fare(&inputs).source, BaseFareSource::CachedBaseFare);
        assert_eq!(resolver.base_fare(&inputs).value, 800_000);

        inputs.cached_base_fare = None;
        let base = resolver.base_fare(&inputs);
        assert_eq!((base.value, base.source), (0, BaseFareSource::Default));
    }

    #[test]
    fn test_extras_subtotal_ignores_stale_cache() {
        let resolver = PricingResolver::default();
        let inputs = PricingInputs {
            extras: Some(ExtrasSelection {
                meals: vec![MealChoice { id: "m".into(), unit_price: 40_000, quantity: 2 }],
                baggage: Some(BaggageTier { weight_kg: 15, price: 150_000 }),
                services: vec![
                    ServiceChoice { id: "wifi".into(), price: 20_000 },
                    ServiceChoice { id: "lounge".into(), price: 30_000 },
                ],
                cached_total: 5,
            }),
            ..Default::default()
        };
        assert_eq!(resolver.extras_subtotal(&inputs), 80_000 + 150_000 + 50_000);
    }

    #[test]
    fn test_tax_rounding() {
        let resolver = PricingResolver::default();
        assert_eq!(resolver.tax(0), 0);
        assert_eq!(resolver.tax(1_200_000), 120_000);
        assert_eq!(resolver.tax(15), 2);
        assert_eq!(resolver.tax(14), 1);
        for base in [1u64, 99, 12_345, 987_654_321] {
            assert_eq!(resolver.tax(base), (base as f64 * 0.10).round() as u64);
        }
    }

    #[test]
    fn test_scenario_one_way_with_extras() {
        let resolver = PricingResolver::default();
        let inputs = PricingInputs {
            trip: Some(trip(1_200_000)),
            extras: Some(ExtrasSelection {
                baggage: Some(BaggageTier { weight_kg: 20, price: 150_000 }),
                ..Default::default()
            }),
            ..Default::default()
        };
        let outcome = resolver.resolve(&inputs);
        assert_eq!(
            outcome.totals,
            BookingTotals {
                base_fare: 1_200_000,
                extras_subtotal: 150_000,
                tax: 120_000,
                grand_total: 1_470_000,
            }
        );
        assert_eq!(outcome.grand_total_source, GrandTotalSource::Computed);
        assert!(outcome.inconsistency.is_none());
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let resolver = PricingResolver::default();
        let inputs = PricingInputs {
            seats: Some(seats(&[250_000])),
            persisted_grand_total: Some(1),
            ..Default::default()
        };
        assert_eq!(resolver.resolve(&inputs), resolver.resolve(&inputs));
    }

    #[test]
    fn test_anti_regression_fallback() {
        let resolver = PricingResolver::default();
        let inputs = PricingInputs {
            persisted_grand_total: Some(500_000),
            ..Default::default()
        };
        let outcome = resolver.resolve(&inputs);
        assert_eq!(outcome.totals.grand_total, 500_000);
        assert_eq!(outcome.grand_total_source, GrandTotalSource::PersistedFallback);
        assert_eq!(
            outcome.inconsistency,
            Some(PricingInconsistency { computed: 0, persisted: 500_000 })
        );
    }
}
