use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealChoice {
    pub id: String,
    #[serde(default, alias = "price")]
    pub unit_price: u64,
    #[serde(default = "one", alias = "qty")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaggageTier {
    #[serde(alias = "kg", alias = "weight")]
    pub weight_kg: u32,
    #[serde(default)]
    pub price: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceChoice {
    pub id: String,
    #[serde(default)]
    pub price: u64,
}

/// Add-ons picked on the extras page. `cached_total` is a display cache only;
/// pricing always goes through [`ExtrasSelection::recomputed_total`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtrasSelection {
    #[serde(default)]
    pub meals: Vec<MealChoice>,
    #[serde(default)]
    pub baggage: Option<BaggageTier>,
    #[serde(default)]
    pub services: Vec<ServiceChoice>,
    #[serde(default, rename = "total", alias = "totalCost")]
    pub cached_total: u64,
}

impl ExtrasSelection {
    pub fn recomputed_total(&self) -> u64 {
        let meals = self.meals.iter().fold(0u64, |acc, m| {
            acc.saturating_add(m.unit_price.saturating_mul(u64::from(m.quantity)))
        });
        let baggage = self.baggage.as_ref().map(|b| b.price).unwrap_or(0);
        let services = self.services.iter().fold(0u64, |acc, s| acc.saturating_add(s.price));
        meals.saturating_add(baggage).saturating_add(services)
    }

    pub fn refresh_cached_total(&mut self) {
        self.cached_total = self.recomputed_total();
    }
}
