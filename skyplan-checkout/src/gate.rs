use serde::{Deserialize, Serialize};
use skyplan_core::{BackendError, BookingBackend, BookingStatus};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CheckoutMode {
    #[default]
    #[serde(rename = "new")]
    NewCheckout,
    #[serde(rename = "returning")]
    ReturningTrip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentAction {
    Show,
    ViewTrip,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadinessDecision {
    pub action: PaymentAction,
    pub status: Option<BookingStatus>,
    /// Soft diagnostic when the lookup could not be completed.
    pub diagnostic: Option<String>,
}

impl ReadinessDecision {
    fn show(status: Option<BookingStatus>, diagnostic: Option<String>) -> Self {
        Self {
            action: PaymentAction::Show,
            status,
            diagnostic,
        }
    }

    pub fn ready(&self) -> bool {
        self.action == PaymentAction::Show
    }
}

/// Decides whether the payment action is offered. Fails open: anything short
/// of a confirmed lookup on a returning trip shows it.
pub struct PaymentReadinessGate {
    backend: Arc<dyn BookingBackend>,
}

impl PaymentReadinessGate {
    pub fn new(backend: Arc<dyn BookingBackend>) -> Self {
        Self { backend }
    }

    pub async fn evaluate(&self, mode: CheckoutMode, code: Option<&str>, auth: Option<&str>) -> ReadinessDecision {
        let code = match (mode, code) {
            (CheckoutMode::NewCheckout, _) => return ReadinessDecision::show(None, None),
            (CheckoutMode::ReturningTrip, None) => {
                return ReadinessDecision::show(None, Some("no booking code to look up".into()))
            }
            (CheckoutMode::ReturningTrip, Some(code)) => code,
        };

        match self.backend.booking_status(code, auth).await {
            Ok(status) if status.is_settled() => {
                debug!("booking {} already {}, offering view trip", code, status);
                ReadinessDecision {
                    action: PaymentAction::ViewTrip,
                    status: Some(status),
                    diagnostic: None,
                }
            }
            Ok(status) => ReadinessDecision::show(Some(status), None),
            Err(e) => {
                let diagnostic = match &e {
                    BackendError::NotFound(_) => format!("booking {} not found", code),
                    BackendError::Unauthorized => "status lookup not authorized".to_string(),
                    other => format!("status lookup failed: {}", other),
                };
                warn!("{}; showing payment action", diagnostic);
                ReadinessDecision::show(None, Some(diagnostic))
            }
        }
    }
}
