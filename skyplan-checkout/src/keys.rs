use skyplan_store::StoreScope;

/// Bumped when a slot's stored shape changes incompatibly.
pub const SCHEMA_VERSION: &str = "v1";

/// Every persisted checkout slot. Keys are `{version}.{slot}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionSlot {
    TripSelection,
    FareSelection,
    PassengerRecord,
    PassengerId,
    SeatSelection,
    ExtrasSelection,
    PendingBooking,
    BookingIdentifier,
    CachedBaseFare,
    CachedGrandTotal,
    AuthToken,
}

impl SessionSlot {
    /// Slots cleared when a checkout is abandoned.
    pub const CHECKOUT: [SessionSlot; 10] = [
        SessionSlot::TripSelection,
        SessionSlot::FareSelection,
        SessionSlot::PassengerRecord,
        SessionSlot::PassengerId,
        SessionSlot::SeatSelection,
        SessionSlot::ExtrasSelection,
        SessionSlot::PendingBooking,
        SessionSlot::BookingIdentifier,
        SessionSlot::CachedBaseFare,
        SessionSlot::CachedGrandTotal,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SessionSlot::TripSelection => "trip_selection",
            SessionSlot::FareSelection => "fare_selection",
            SessionSlot::PassengerRecord => "passenger_record",
            SessionSlot::PassengerId => "passenger_id",
            SessionSlot::SeatSelection => "seat_selection",
            SessionSlot::ExtrasSelection => "extras_selection",
            SessionSlot::PendingBooking => "pending_booking",
            SessionSlot::BookingIdentifier => "booking_identifier",
            SessionSlot::CachedBaseFare => "cached_base_fare",
            SessionSlot::CachedGrandTotal => "cached_grand_total",
            SessionSlot::AuthToken => "auth_token",
        }
    }

    pub fn key(&self) -> String {
        format!("{}.{}", SCHEMA_VERSION, self.name())
    }

    /// The auth token may also live in the session scope; see
    /// `CheckoutSession::auth_token`.
    pub fn scope(&self) -> StoreScope {
        StoreScope::Durable
    }
}
