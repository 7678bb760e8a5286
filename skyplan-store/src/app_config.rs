use serde::Deserialize;
use skyplan_core::DobFormat;
use std::env;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub storage: StorageConfig,
    pub pricing: PricingSettings,
    pub checkout: CheckoutSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BackendConfig {
    /// Absent means no backend: every call takes the offline fallback.
    pub base_url: Option<String>,
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// Absent means in-memory stores.
    pub redis_url: Option<String>,
    pub session_ttl_seconds: u64,
    pub key_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            session_ttl_seconds: 1800,
            key_prefix: "skyplan".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PricingSettings {
    pub tax_rate: f64,
    pub default_base_fare: u64,
    pub premium_multiplier: f64,
    pub business_multiplier: f64,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            tax_rate: 0.10,
            default_base_fare: 1_200_000,
            premium_multiplier: 1.4,
            business_multiplier: 2.5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CheckoutSettings {
    pub booking_code_prefix: String,
    pub dob_format: DobFormat,
    pub payment_page: String,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            booking_code_prefix: "SP".into(),
            dob_format: DobFormat::Iso,
            payment_page: "payment.html".into(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `SKYPLAN_BACKEND__BASE_URL=http://localhost:5000`
            .add_source(config::Environment::with_prefix("SKYPLAN").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
