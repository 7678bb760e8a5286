use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skyplan_shared::Masked;
use std::fmt;

use crate::selection::{FareClass, TripType};

/// Booking lifecycle status as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    PaymentFailed,
    Cancelled,
    Expired,
    Completed,
    #[serde(other)]
    Unknown,
}

impl BookingStatus {
    /// Paid bookings: the payment action is replaced by "view trip".
    pub fn is_settled(&self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::Completed)
    }

    pub fn is_cancellable(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::PaymentFailed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::PaymentFailed => "PAYMENT_FAILED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Expired => "EXPIRED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Unknown => "UNKNOWN",
        };
        write!(f, "{}", s)
    }
}

/// Derived totals. Cached for display, never the source of truth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingTotals {
    pub base_fare: u64,
    pub extras_subtotal: u64,
    pub tax: u64,
    pub grand_total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    ServerIssued,
    ClientSynthesized,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingIdentifier {
    pub code: String,
    pub provenance: Provenance,
    pub issued_at: DateTime<Utc>,
}

impl BookingIdentifier {
    pub fn server_issued(code: impl Into<String>, issued_at: DateTime<Utc>) -> Self {
        Self {
            code: code.into(),
            provenance: Provenance::ServerIssued,
            issued_at,
        }
    }

    pub fn client_synthesized(code: impl Into<String>, issued_at: DateTime<Utc>) -> Self {
        Self {
            code: code.into(),
            provenance: Provenance::ClientSynthesized,
            issued_at,
        }
    }

    pub fn is_authoritative(&self) -> bool {
        self.provenance == Provenance::ServerIssued
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestPassenger {
    pub firstname: String,
    pub lastname: String,
    pub cccd: Masked<String>,
    pub dob: String,
    pub gender: String,
    pub phone_number: Masked<String>,
    pub email: Masked<String>,
    pub address: String,
    pub city: String,
    pub nationality: String,
    pub notes: String,
}

/// Either a passenger already on file, or a full inline record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PassengerEntry {
    Registered { passengers: Vec<u64> },
    Guest { guest_passenger: GuestPassenger },
}

/// Body of the backend create-booking call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub outbound_flight_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbound_flight_id: Option<u64>,
    pub trip_type: TripType,
    pub fare_class: FareClass,
    #[serde(flatten)]
    pub passenger: PassengerEntry,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seat_numbers: Vec<String>,
    pub total_amount: u64,
}

/// Last payload built for this checkout, kept so the payment page can
/// resubmit without recomputing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingBooking {
    pub request: CreateBookingRequest,
    pub identifier: BookingIdentifier,
    pub built_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSummary {
    #[serde(default)]
    pub id: Option<u64>,
    pub booking_code: String,
    pub status: BookingStatus,
    #[serde(default)]
    pub total_amount: Option<serde_json::Value>,
}

/// `{ success, booking_code?, message?, booking? }` as returned by every
/// booking endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub booking_code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub booking: Option<BookingSummary>,
}

impl BookingEnvelope {
    /// Top-level code first, then the nested booking record.
    pub fn code(&self) -> Option<&str> {
        let non_blank = |c: &&str| !c.trim().is_empty();
        self.booking_code
            .as_deref()
            .filter(non_blank)
            .or_else(|| {
                self.booking
                    .as_ref()
                    .map(|b| b.booking_code.as_str())
                    .filter(non_blank)
            })
    }
}
