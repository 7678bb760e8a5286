pub mod keys;
pub mod session;
pub mod fallback;
pub mod pricing;
pub mod fares;
pub mod payload;
pub mod identifier;
pub mod gate;
pub mod checkout;
mod inflight;

pub use checkout::{BookingData, CheckoutConfig, CheckoutError, CheckoutService, PendingPayload, ProceedOutcome};
pub use gate::{CheckoutMode, PaymentAction, ReadinessDecision};
pub use payload::{PayloadError, Prerequisite};
pub use session::{CheckoutSession, SessionSnapshot};
