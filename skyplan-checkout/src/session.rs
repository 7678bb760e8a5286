use serde::de::DeserializeOwned;
use serde::Serialize;
use skyplan_core::{
    BookingIdentifier, CoreError, CoreResult, ExtrasSelection, FareSelection, PassengerRecord, PendingBooking,
    SeatSelection, TripSelection,
};
use skyplan_store::{KeyValueStore, PersistedStore, StoreScope};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::keys::SessionSlot;

/// Everything the later pages read, taken in one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub trip: Option<TripSelection>,
    pub fare: Option<FareSelection>,
    pub passenger: Option<PassengerRecord>,
    pub passenger_id: Option<u64>,
    pub seats: Option<SeatSelection>,
    pub extras: Option<ExtrasSelection>,
    pub cached_base_fare: Option<u64>,
    pub cached_grand_total: Option<u64>,
    pub signed_in: bool,
}

/// Typed accessors over one checkout session's store.
///
/// Reads tolerate anything (absent, stale, malformed all come back as
/// `None`). Writes of page-owned entities check their invariants first.
#[derive(Clone)]
pub struct CheckoutSession {
    id: Uuid,
    store: PersistedStore,
}

impl CheckoutSession {
    pub fn new(id: Uuid, inner: Arc<dyn KeyValueStore>) -> Self {
        Self {
            id,
            store: PersistedStore::new(inner),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    async fn read<T: DeserializeOwned>(&self, slot: SessionSlot) -> Option<T> {
        self.store.get(slot.scope(), &slot.key()).await
    }

    async fn write<T: Serialize + ?Sized>(&self, slot: SessionSlot, value: &T) {
        self.store.set(slot.scope(), &slot.key(), value).await;
    }

    async fn clear(&self, slot: SessionSlot) {
        self.store.remove(slot.scope(), &slot.key()).await;
    }

    pub async fn trip(&self) -> Option<TripSelection> {
        self.read(SessionSlot::TripSelection).await
    }

    pub async fn set_trip(&self, trip: &TripSelection) -> CoreResult<()> {
        trip.validate()?;
        self.write(SessionSlot::TripSelection, trip).await;
        Ok(())
    }

    pub async fn fare(&self) -> Option<FareSelection> {
        self.read(SessionSlot::FareSelection).await
    }

    pub async fn set_fare(&self, fare: &FareSelection) -> CoreResult<()> {
        self.write(SessionSlot::FareSelection, fare).await;
        Ok(())
    }

    pub async fn passenger(&self) -> Option<PassengerRecord> {
        self.read(SessionSlot::PassengerRecord).await
    }

    pub async fn set_passenger(&self, passenger: &PassengerRecord) -> CoreResult<()> {
        debug!("storing passenger record for {:?}", passenger.email);
        self.write(SessionSlot::PassengerRecord, passenger).await;
        Ok(())
    }

    pub async fn passenger_id(&self) -> Option<u64> {
        self.read(SessionSlot::PassengerId).await
    }

    pub async fn set_passenger_id(&self, id: u64) -> CoreResult<()> {
        if id == 0 {
            return Err(CoreError::ValidationError("passenger id must be positive".into()));
        }
        self.write(SessionSlot::PassengerId, &id).await;
        Ok(())
    }

    pub async fn seats(&self) -> Option<SeatSelection> {
        self.read(SessionSlot::SeatSelection).await
    }

    pub async fn set_seats(&self, seats: &SeatSelection) -> CoreResult<()> {
        if seats.seats.iter().any(|s| s.label.trim().is_empty()) {
            return Err(CoreError::ValidationError("seat label cannot be empty".into()));
        }
        self.write(SessionSlot::SeatSelection, seats).await;
        Ok(())
    }

    pub async fn extras(&self) -> Option<ExtrasSelection> {
        self.read(SessionSlot::ExtrasSelection).await
    }

    /// Stores the selection with its cached total recomputed from the line
    /// items, and returns what was stored.
    pub async fn set_extras(&self, mut extras: ExtrasSelection) -> CoreResult<ExtrasSelection> {
        extras.refresh_cached_total();
        self.write(SessionSlot::ExtrasSelection, &extras).await;
        Ok(extras)
    }

    pub async fn pending_booking(&self) -> Option<PendingBooking> {
        self.read(SessionSlot::PendingBooking).await
    }

    pub async fn set_pending_booking(&self, pending: &PendingBooking) {
        self.write(SessionSlot::PendingBooking, pending).await;
    }

    pub async fn booking_identifier(&self) -> Option<BookingIdentifier> {
        self.read::<BookingIdentifier>(SessionSlot::BookingIdentifier)
            .await
            .filter(|id| !id.code.trim().is_empty())
    }

    pub async fn set_booking_identifier(&self, identifier: &BookingIdentifier) {
        self.write(SessionSlot::BookingIdentifier, identifier).await;
    }

    /// Forgets the current booking attempt (identifier and pending payload).
    pub async fn clear_booking(&self) {
        self.clear(SessionSlot::BookingIdentifier).await;
        self.clear(SessionSlot::PendingBooking).await;
    }

    pub async fn cached_base_fare(&self) -> Option<u64> {
        self.read(SessionSlot::CachedBaseFare).await
    }

    pub async fn set_cached_base_fare(&self, value: u64) {
        self.write(SessionSlot::CachedBaseFare, &value).await;
    }

    pub async fn cached_grand_total(&self) -> Option<u64> {
        self.read(SessionSlot::CachedGrandTotal).await
    }

    pub async fn set_cached_grand_total(&self, value: u64) {
        self.write(SessionSlot::CachedGrandTotal, &value).await;
    }

    /// Durable scope first, then session.
    pub async fn auth_token(&self) -> Option<String> {
        let key = SessionSlot::AuthToken.key();
        for scope in [StoreScope::Durable, StoreScope::Session] {
            if let Some(token) = self.store.get::<String>(scope, &key).await {
                if !token.trim().is_empty() {
                    return Some(token);
                }
            }
        }
        None
    }

    /// `remember` keeps the token across restarts; the other scope is cleared
    /// so only one copy exists.
    pub async fn set_auth_token(&self, token: &str, remember: bool) {
        let key = SessionSlot::AuthToken.key();
        let (keep, other) = if remember {
            (StoreScope::Durable, StoreScope::Session)
        } else {
            (StoreScope::Session, StoreScope::Durable)
        };
        self.store.set(keep, &key, token).await;
        self.store.remove(other, &key).await;
    }

    pub async fn clear_auth_token(&self) {
        let key = SessionSlot::AuthToken.key();
        self.store.remove(StoreScope::Durable, &key).await;
        self.store.remove(StoreScope::Session, &key).await;
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            trip: self.trip().await,
            fare: self.fare().await,
            passenger: self.passenger().await,
            passenger_id: self.passenger_id().await,
            seats: self.seats().await,
            extras: self.extras().await,
            cached_base_fare: self.cached_base_fare().await,
            cached_grand_total: self.cached_grand_total().await,
            signed_in: self.auth_token().await.is_some(),
        }
    }

    /// Removes every checkout slot. The auth token survives.
    pub async fn abandon(&self) {
        for slot in SessionSlot::CHECKOUT {
            self.clear(slot).await;
        }
        info!("checkout session abandoned");
    }
}
