use async_trait::async_trait;

use crate::booking::{BookingEnvelope, BookingStatus, CreateBookingRequest};
use crate::payment::{PaymentRedirect, PaymentRedirectRequest};

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Backend unreachable: {0}")]
    Unreachable(String),
    #[error("Backend rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Booking not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Malformed backend response: {0}")]
    Decode(String),
}

/// The booking backend's request/response contract. `auth` is a bearer
/// token when the visitor is signed in.
#[async_trait]
pub trait BookingBackend: Send + Sync {
    async fn create_booking(
        &self,
        request: &CreateBookingRequest,
        auth: Option<&str>,
    ) -> Result<BookingEnvelope, BackendError>;

    async fn booking_status(&self, code: &str, auth: Option<&str>) -> Result<BookingStatus, BackendError>;

    async fn cancel_booking(&self, code: &str, auth: Option<&str>) -> Result<BookingEnvelope, BackendError>;

    async fn create_payment_url(&self, request: &PaymentRedirectRequest) -> Result<PaymentRedirect, BackendError>;
}

/// Used when no backend is configured. Every call reports the backend as
/// unreachable so callers take their fallback paths.
#[derive(Debug, Clone, Default)]
pub struct OfflineBackend;

const OFFLINE: &str = "no booking backend configured";

#[async_trait]
impl BookingBackend for OfflineBackend {
    async fn create_booking(
        &self,
        _request: &CreateBookingRequest,
        _auth: Option<&str>,
    ) -> Result<BookingEnvelope, BackendError> {
        tracing::debug!("offline backend: create_booking");
        Err(BackendError::Unreachable(OFFLINE.into()))
    }

    async fn booking_status(&self, code: &str, _auth: Option<&str>) -> Result<BookingStatus, BackendError> {
        tracing::debug!("offline backend: booking_status {}", code);
        Err(BackendError::Unreachable(OFFLINE.into()))
    }

    async fn cancel_booking(&self, code: &str, _auth: Option<&str>) -> Result<BookingEnvelope, BackendError> {
        tracing::debug!("offline backend: cancel_booking {}", code);
        Err(BackendError::Unreachable(OFFLINE.into()))
    }

    async fn create_payment_url(&self, _request: &PaymentRedirectRequest) -> Result<PaymentRedirect, BackendError> {
        Err(BackendError::Unreachable(OFFLINE.into()))
    }
}
