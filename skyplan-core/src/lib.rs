pub mod selection;
pub mod passenger;
pub mod extras;
pub mod booking;
pub mod dates;
pub mod backend;
pub mod payment;

pub use selection::{FareClass, FareSelection, SeatAssignment, SeatSelection, TripSelection, TripType};
pub use passenger::PassengerRecord;
pub use extras::{BaggageTier, ExtrasSelection, MealChoice, ServiceChoice};
pub use booking::{
    BookingEnvelope, BookingIdentifier, BookingStatus, BookingSummary, BookingTotals, CreateBookingRequest,
    GuestPassenger, PassengerEntry, PendingBooking, Provenance,
};
pub use dates::{parse_date_of_birth, reformat_date_of_birth, DobFormat};
pub use payment::{PaymentRedirect, PaymentRedirectRequest};
pub use backend::{BackendError, BookingBackend, OfflineBackend};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
