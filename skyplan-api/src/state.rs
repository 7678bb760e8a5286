use skyplan_checkout::{CheckoutConfig, CheckoutService, CheckoutSession};
use skyplan_core::{BookingBackend, OfflineBackend};
use skyplan_store::{Config, MemoryStores, RedisStores, SessionStores};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::backend_client::HttpBookingBackend;

#[derive(Clone)]
pub struct AppState {
    pub stores: Arc<dyn SessionStores>,
    pub checkout: CheckoutService,
}

impl AppState {
    pub fn new(stores: Arc<dyn SessionStores>, backend: Arc<dyn BookingBackend>, config: CheckoutConfig) -> Self {
        Self {
            stores,
            checkout: CheckoutService::new(backend, config),
        }
    }

    /// Redis-backed sessions and the HTTP backend when configured, in-memory
    /// and offline otherwise.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let stores: Arc<dyn SessionStores> = match &config.storage.redis_url {
            Some(url) => {
                tracing::info!("Using Redis session storage");
                Arc::new(RedisStores::new(
                    url,
                    config.storage.key_prefix.clone(),
                    config.storage.session_ttl_seconds,
                )?)
            }
            None => {
                tracing::info!("Using in-memory session storage");
                Arc::new(MemoryStores::new(Duration::from_secs(
                    config.storage.session_ttl_seconds,
                )))
            }
        };

        let backend: Arc<dyn BookingBackend> = match &config.backend.base_url {
            Some(url) => {
                tracing::info!("Booking backend at {}", url);
                Arc::new(HttpBookingBackend::new(
                    url,
                    Duration::from_millis(config.backend.timeout_ms),
                )?)
            }
            None => {
                tracing::warn!("No booking backend configured; running offline");
                Arc::new(OfflineBackend)
            }
        };

        Ok(Self::new(stores, backend, CheckoutConfig::from(config)))
    }

    pub async fn session(&self, session_id: Uuid) -> CheckoutSession {
        CheckoutSession::new(session_id, self.stores.open(session_id).await)
    }
}
