use chrono::Utc;
use serde::Serialize;
use skyplan_core::{
    BackendError, BookingBackend, BookingIdentifier, BookingStatus, BookingTotals, CoreError, CoreResult,
    CreateBookingRequest, ExtrasSelection, FareClass, FareSelection, PassengerEntry, PassengerRecord, PaymentRedirect,
    PaymentRedirectRequest, PendingBooking, SeatSelection, TripSelection,
};
use skyplan_store::app_config::Config;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::fares::FareQuotes;
use crate::gate::{CheckoutMode, PaymentAction, PaymentReadinessGate, ReadinessDecision};
use crate::identifier::IdentifierResolver;
use crate::inflight::ConfirmationLocks;
use crate::payload::{PayloadBuilder, PayloadConfig, PayloadError, Prerequisite};
use crate::pricing::{
    BaseFareSource, GrandTotalSource, PricingConfig, PricingInconsistency, PricingInputs, PricingOutcome,
    PricingResolver,
};
use crate::session::CheckoutSession;

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error("No booking in progress")]
    NoActiveBooking,
    #[error("Booking {code} cannot be cancelled while {status}")]
    NotCancellable { code: String, status: BookingStatus },
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Core(#[from] CoreError),
}

#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub pricing: PricingConfig,
    pub payload: PayloadConfig,
    pub booking_code_prefix: String,
    pub payment_page: String,
    pub backend_timeout: Duration,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for CheckoutConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            pricing: PricingConfig::from(&cfg.pricing),
            payload: PayloadConfig {
                dob_format: cfg.checkout.dob_format,
                ..Default::default()
            },
            booking_code_prefix: cfg.checkout.booking_code_prefix.clone(),
            payment_page: cfg.checkout.payment_page.clone(),
            backend_timeout: Duration::from_millis(cfg.backend.timeout_ms),
        }
    }
}

/// Merged view for the overview and payment pages.
#[derive(Debug, Clone, Serialize)]
pub struct BookingData {
    pub trip: Option<TripSelection>,
    pub fare: Option<FareSelection>,
    pub passenger: Option<PassengerRecord>,
    pub seats: Option<SeatSelection>,
    pub extras: Option<ExtrasSelection>,
    pub totals: BookingTotals,
    pub base_fare_source: BaseFareSource,
    pub grand_total_source: GrandTotalSource,
    pub inconsistency: Option<PricingInconsistency>,
    pub booking_identifier: Option<BookingIdentifier>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingPayload {
    pub request: CreateBookingRequest,
    pub identifier: BookingIdentifier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProceedOutcome {
    /// Already paid: show the trip instead of charging again.
    AlreadyPaid { booking_code: String },
    ReadyToPay {
        identifier: BookingIdentifier,
        redirect: String,
        reused: bool,
    },
}

/// Checkout operations over a [`CheckoutSession`]. Cheap to clone into
/// request handlers and background tasks; clones share the confirmation
/// locks.
#[derive(Clone)]
pub struct CheckoutService {
    backend: Arc<dyn BookingBackend>,
    pricing: Arc<PricingResolver>,
    payload: Arc<PayloadBuilder>,
    identifiers: Arc<IdentifierResolver>,
    gate: Arc<PaymentReadinessGate>,
    config: Arc<CheckoutConfig>,
    confirmations: Arc<ConfirmationLocks>,
}

impl CheckoutService {
    pub fn new(backend: Arc<dyn BookingBackend>, config: CheckoutConfig) -> Self {
        Self {
            pricing: Arc::new(PricingResolver::new(config.pricing.clone())),
            payload: Arc::new(PayloadBuilder::new(config.payload.clone())),
            identifiers: Arc::new(IdentifierResolver::new(config.booking_code_prefix.clone())),
            gate: Arc::new(PaymentReadinessGate::new(backend.clone())),
            backend,
            config: Arc::new(config),
            confirmations: Arc::new(ConfirmationLocks::default()),
        }
    }

    /// Resolves totals and caches the live ones back into the store.
    pub async fn price(&self, session: &CheckoutSession) -> PricingOutcome {
        let snapshot = session.snapshot().await;
        self.price_snapshot(session, &PricingInputs::from(&snapshot)).await
    }

    async fn price_snapshot(&self, session: &CheckoutSession, inputs: &PricingInputs) -> PricingOutcome {
        let outcome = self.pricing.resolve(inputs);
        if outcome.base_fare_source.is_live() && outcome.totals.base_fare > 0 {
            session.set_cached_base_fare(outcome.totals.base_fare).await;
        }
        if outcome.grand_total_source == GrandTotalSource::Computed && outcome.totals.grand_total > 0 {
            session.set_cached_grand_total(outcome.totals.grand_total).await;
        }
        outcome
    }

    pub async fn booking_data(&self, session: &CheckoutSession) -> BookingData {
        let snapshot = session.snapshot().await;
        let outcome = self.price_snapshot(session, &PricingInputs::from(&snapshot)).await;
        BookingData {
            trip: snapshot.trip,
            fare: snapshot.fare,
            passenger: snapshot.passenger,
            seats: snapshot.seats,
            extras: snapshot.extras,
            totals: outcome.totals,
            base_fare_source: outcome.base_fare_source,
            grand_total_source: outcome.grand_total_source,
            inconsistency: outcome.inconsistency,
            booking_identifier: session.booking_identifier().await,
        }
    }

    /// Builds the create-booking payload, attaches the current (or a freshly
    /// synthesized) identifier and stores both as the pending booking.
    pub async fn build_pending_payload(&self, session: &CheckoutSession) -> Result<PendingPayload, CheckoutError> {
        let snapshot = session.snapshot().await;
        let outcome = self.price_snapshot(session, &PricingInputs::from(&snapshot)).await;
        let request = self.payload.build(&snapshot, outcome.totals.grand_total)?;

        let identifier = match session.booking_identifier().await {
            Some(existing) => existing,
            None => {
                let fresh = self.identifiers.synthesize(Utc::now());
                session.set_booking_identifier(&fresh).await;
                fresh
            }
        };

        session
            .set_pending_booking(&PendingBooking {
                request: request.clone(),
                identifier: identifier.clone(),
                built_at: Utc::now(),
            })
            .await;

        Ok(PendingPayload { request, identifier })
    }

    /// Never fails. Reuses a stored identifier; otherwise builds the pending
    /// payload when possible and falls back to a synthesized code.
    pub async fn resolve_booking_identifier(&self, session: &CheckoutSession) -> BookingIdentifier {
        if let Some(existing) = session.booking_identifier().await {
            return existing;
        }
        match self.build_pending_payload(session).await {
            Ok(pending) => pending.identifier,
            Err(e) => {
                warn!("no pending payload ({}); synthesizing identifier only", e);
                let fresh = self.identifiers.synthesize(Utc::now());
                session.set_booking_identifier(&fresh).await;
                fresh
            }
        }
    }

    /// Submits the pending booking and upgrades the identifier to
    /// server-issued on success. Returns the authoritative identifier, or
    /// `None` when the backend could not confirm.
    ///
    /// Calls for the same session run one at a time; a queued call returns
    /// the code the earlier one stored.
    pub async fn confirm_with_backend(&self, session: &CheckoutSession) -> Option<BookingIdentifier> {
        let _turn = self.confirmations.acquire(session.id()).await;

        let current = session.booking_identifier().await;
        if let Some(id) = current.as_ref().filter(|id| id.is_authoritative()) {
            return Some(id.clone());
        }
        let pending = session.pending_booking().await?;

        // The bearer token selects the backend's registered path; guests go without.
        let auth = match pending.request.passenger {
            PassengerEntry::Registered { .. } => match session.auth_token().await {
                Some(token) => Some(token),
                None => {
                    warn!("signed out since the booking payload was built; not submitting");
                    return None;
                }
            },
            PassengerEntry::Guest { .. } => None,
        };

        let call = self.backend.create_booking(&pending.request, auth.as_deref());
        let envelope = match tokio::time::timeout(self.config.backend_timeout, call).await {
            Ok(Ok(envelope)) => envelope,
            Ok(Err(e)) => {
                warn!("booking creation failed, keeping provisional code: {}", e);
                return None;
            }
            Err(_) => {
                warn!(
                    "booking creation timed out after {:?}, keeping provisional code",
                    self.config.backend_timeout
                );
                return None;
            }
        };

        let code = match envelope.code() {
            Some(code) if envelope.success => code.to_string(),
            _ => {
                warn!(
                    "backend did not confirm booking: {}",
                    envelope.message.as_deref().unwrap_or("no booking code")
                );
                return None;
            }
        };

        // Re-read: another request may have stored an authoritative code meanwhile.
        let latest = session.booking_identifier().await;
        let confirmed = match self.identifiers.reconcile(latest.as_ref(), &code, Utc::now()) {
            Some(confirmed) => confirmed,
            None => return latest.filter(|id| id.is_authoritative()),
        };
        session.set_booking_identifier(&confirmed).await;
        session
            .set_pending_booking(&PendingBooking {
                identifier: confirmed.clone(),
                ..pending
            })
            .await;
        Some(confirmed)
    }

    pub async fn payment_action(&self, session: &CheckoutSession, mode: CheckoutMode) -> ReadinessDecision {
        let code = session.booking_identifier().await.map(|id| id.code);
        let auth = session.auth_token().await;
        self.gate.evaluate(mode, code.as_deref(), auth.as_deref()).await
    }

    pub async fn is_payment_ready(&self, session: &CheckoutSession, mode: CheckoutMode) -> bool {
        self.payment_action(session, mode).await.ready()
    }

    fn payment_target(&self, code: &str) -> String {
        format!("{}?booking_code={}", self.config.payment_page, code)
    }

    pub async fn proceed_to_payment(&self, session: &CheckoutSession) -> Result<ProceedOutcome, CheckoutError> {
        if let Some(existing) = session.booking_identifier().await {
            let decision = self.payment_action(session, CheckoutMode::ReturningTrip).await;
            match (decision.action, decision.status) {
                (PaymentAction::ViewTrip, _) => {
                    info!("booking {} already paid", existing.code);
                    return Ok(ProceedOutcome::AlreadyPaid {
                        booking_code: existing.code,
                    });
                }
                (_, Some(BookingStatus::Pending)) => {
                    info!("reusing pending booking {}", existing.code);
                    let redirect = self.payment_target(&existing.code);
                    return Ok(ProceedOutcome::ReadyToPay {
                        identifier: existing,
                        redirect,
                        reused: true,
                    });
                }
                (_, Some(BookingStatus::Cancelled | BookingStatus::Expired)) => {
                    info!("booking {} is closed, starting a new one", existing.code);
                    session.clear_booking().await;
                }
                _ => {}
            }
        }

        let pending = self.build_pending_payload(session).await?;
        let identifier = match self.confirm_with_backend(session).await {
            Some(confirmed) => confirmed,
            None => pending.identifier,
        };
        let redirect = self.payment_target(&identifier.code);
        Ok(ProceedOutcome::ReadyToPay {
            identifier,
            redirect,
            reused: false,
        })
    }

    /// Cancels the current booking on the backend and forgets it locally.
    pub async fn cancel_booking(&self, session: &CheckoutSession) -> Result<BookingStatus, CheckoutError> {
        let identifier = session
            .booking_identifier()
            .await
            .ok_or(CheckoutError::NoActiveBooking)?;
        let auth = session.auth_token().await;

        if let Ok(status) = self.backend.booking_status(&identifier.code, auth.as_deref()).await {
            if !status.is_cancellable() {
                return Err(CheckoutError::NotCancellable {
                    code: identifier.code,
                    status,
                });
            }
        }

        let envelope = self.backend.cancel_booking(&identifier.code, auth.as_deref()).await?;
        if !envelope.success {
            return Err(CheckoutError::Backend(BackendError::Rejected {
                status: 200,
                message: envelope.message.unwrap_or_else(|| "cancellation refused".into()),
            }));
        }
        session.clear_booking().await;
        info!("booking {} cancelled", identifier.code);
        Ok(envelope
            .booking
            .map(|b| b.status)
            .unwrap_or(BookingStatus::Cancelled))
    }

    /// Asks the backend for the payment-provider URL for the current booking.
    pub async fn payment_redirect(&self, session: &CheckoutSession) -> Result<PaymentRedirect, CheckoutError> {
        let identifier = session
            .booking_identifier()
            .await
            .ok_or(CheckoutError::NoActiveBooking)?;
        let trip = session
            .trip()
            .await
            .ok_or(PayloadError::MissingPrerequisite(Prerequisite::OutboundFlight))?;
        let outcome = self.price(session).await;

        let request = PaymentRedirectRequest::for_booking(
            &identifier.code,
            outcome.totals.grand_total,
            &trip.origin,
            &trip.destination,
            Utc::now().timestamp_millis(),
        );
        Ok(self.backend.create_payment_url(&request).await?)
    }

    pub async fn fare_quotes(&self, session: &CheckoutSession) -> FareQuotes {
        let trip = session.trip().await;
        FareQuotes::for_trip(trip.as_ref(), self.pricing.config())
    }

    /// Stores the chosen fare class; the price comes from the quote unless
    /// the caller supplies one.
    pub async fn select_fare(
        &self,
        session: &CheckoutSession,
        fare_class: FareClass,
        price: Option<u64>,
    ) -> CoreResult<FareSelection> {
        let selection = match price {
            Some(price) => FareSelection { fare_class, price },
            None => self.fare_quotes(session).await.select(fare_class),
        };
        session.set_fare(&selection).await?;
        Ok(selection)
    }

    pub async fn abandon(&self, session: &CheckoutSession) {
        session.abandon().await;
    }
}
