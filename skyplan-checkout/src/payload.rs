use chrono::NaiveDate;
use serde::Serialize;
use skyplan_core::{
    parse_date_of_birth, CreateBookingRequest, DobFormat, FareClass, GuestPassenger, PassengerEntry, PassengerRecord,
    TripType,
};
use skyplan_shared::Masked;
use std::fmt;
use tracing::warn;

use crate::session::SessionSnapshot;

/// The session slot a caller must fill before a payload can be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Prerequisite {
    OutboundFlight,
    InboundFlight,
    Passenger,
}

impl Prerequisite {
    pub fn as_str(&self) -> &'static str {
        match self {
            Prerequisite::OutboundFlight => "outbound_flight",
            Prerequisite::InboundFlight => "inbound_flight",
            Prerequisite::Passenger => "passenger",
        }
    }
}

impl fmt::Display for Prerequisite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("Missing prerequisite: {0}")]
    MissingPrerequisite(Prerequisite),
}

/// Filled into the guest record wherever the form left a field blank.
#[derive(Debug, Clone)]
pub struct GuestDefaults {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phone_number: String,
    pub national_id: String,
    pub gender: String,
    pub nationality: String,
    pub address: String,
    pub city: String,
    pub date_of_birth: NaiveDate,
}

impl Default for GuestDefaults {
    fn default() -> Self {
        Self {
            firstname: "Guest".into(),
            lastname: "Passenger".into(),
            email: "guest@skyplan.com".into(),
            phone_number: "0000000000".into(),
            national_id: "000000000000".into(),
            gender: "Khác".into(),
            nationality: "Việt Nam".into(),
            address: "N/A".into(),
            city: "N/A".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PayloadConfig {
    pub dob_format: DobFormat,
    pub guest: GuestDefaults,
}

pub struct PayloadBuilder {
    config: PayloadConfig,
}

fn or_default(value: &str, default: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

impl PayloadBuilder {
    pub fn new(config: PayloadConfig) -> Self {
        Self { config }
    }

    /// Builds the create-booking body from the session. Flight ids are never
    /// invented; a missing one is reported to the caller. The stored passenger
    /// id is only used while signed in.
    pub fn build(&self, snapshot: &SessionSnapshot, total_amount: u64) -> Result<CreateBookingRequest, PayloadError> {
        let trip = snapshot
            .trip
            .as_ref()
            .ok_or(PayloadError::MissingPrerequisite(Prerequisite::OutboundFlight))?;
        let outbound_flight_id = trip
            .outbound_flight_id
            .ok_or(PayloadError::MissingPrerequisite(Prerequisite::OutboundFlight))?;

        let inbound_flight_id = match trip.trip_type {
            TripType::RoundTrip => Some(
                trip.inbound_flight_id
                    .ok_or(PayloadError::MissingPrerequisite(Prerequisite::InboundFlight))?,
            ),
            TripType::OneWay => None,
        };

        let passenger = match (snapshot.passenger_id, snapshot.passenger.as_ref()) {
            (Some(id), _) if snapshot.signed_in => PassengerEntry::Registered { passengers: vec![id] },
            (_, Some(record)) if !record.is_empty() => PassengerEntry::Guest {
                guest_passenger: self.guest_from(record),
            },
            _ => return Err(PayloadError::MissingPrerequisite(Prerequisite::Passenger)),
        };

        let fare_class = snapshot
            .fare
            .as_ref()
            .map(|f| f.fare_class)
            .or_else(|| snapshot.seats.as_ref().and_then(|s| s.fare_class))
            .unwrap_or(FareClass::Economy);

        let seat_numbers = snapshot.seats.as_ref().map(|s| s.labels()).unwrap_or_default();

        Ok(CreateBookingRequest {
            outbound_flight_id,
            inbound_flight_id,
            trip_type: trip.trip_type,
            fare_class,
            passenger,
            seat_numbers,
            total_amount,
        })
    }

    pub fn guest_from(&self, record: &PassengerRecord) -> GuestPassenger {
        let d = &self.config.guest;
        let format = self.config.dob_format;
        let dob = match parse_date_of_birth(&record.dob) {
            Some(date) => format.render(date),
            None => {
                if !record.dob.trim().is_empty() {
                    warn!("unparseable date of birth, using default");
                }
                format.render(d.date_of_birth)
            }
        };

        GuestPassenger {
            firstname: or_default(&record.firstname, &d.firstname),
            lastname: or_default(&record.lastname, &d.lastname),
            cccd: Masked::new(or_default(record.national_id.expose(), &d.national_id)),
            dob,
            gender: or_default(&record.gender, &d.gender),
            phone_number: Masked::new(or_default(record.phone_number.expose(), &d.phone_number)),
            email: Masked::new(or_default(record.email.expose(), &d.email)),
            address: or_default(&record.address, &d.address),
            city: or_default(&record.city, &d.city),
            nationality: or_default(&record.nationality, &d.nationality),
            notes: record.notes.clone().unwrap_or_default(),
        }
    }
}

impl Default for PayloadBuilder {
    fn default() -> Self {
        Self::new(PayloadConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyplan_core::{FareSelection, SeatAssignment, SeatSelection, TripSelection};

    fn trip() -> TripSelection {
        TripSelection::one_way("HAN", "SGN", NaiveDate::from_ymd_opt(2025, 12, 20).unwrap(), 3803, 1_200_000)
    }

    fn passenger() -> PassengerRecord {
        PassengerRecord {
            firstname: "An".into(),
            lastname: "Nguyen".into(),
            dob: "25/12/1995".into(),
            email: "an@example.com".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_guest_payload_fills_defaults() {
        let snapshot = SessionSnapshot {
            trip: Some(trip()),
            passenger: Some(passenger()),
            seats: Some(SeatSelection {
                seats: vec![SeatAssignment { label: "12C".into(), price: 0 }],
                fare_class: Some(FareClass::PremiumEconomy),
            }),
            ..Default::default()
        };
        let req = PayloadBuilder::default().build(&snapshot, 1_470_000).unwrap();
        assert_eq!(req.outbound_flight_id, 3803);
        assert_eq!(req.inbound_flight_id, None);
        assert_eq!(req.fare_class, FareClass::PremiumEconomy);
        assert_eq!(req.seat_numbers, vec!["12C".to_string()]);

        let PassengerEntry::Guest { guest_passenger: g } = req.passenger else {
            panic!("expected guest passenger");
        };
        assert_eq!(g.firstname, "An");
        assert_eq!(g.dob, "1995-12-25");
        assert_eq!(g.phone_number.expose(), "0000000000");
        assert_eq!(g.cccd.expose(), "000000000000");
        assert_eq!(g.gender, "Khác");
        assert_eq!(g.nationality, "Việt Nam");
        assert_eq!(g.city, "N/A");
        assert_eq!(g.notes, "");
    }

    #[test]
    fn test_registered_passenger_omits_inline_record() {
        let snapshot = SessionSnapshot {
            trip: Some(trip()),
            passenger: Some(passenger()),
            passenger_id: Some(42),
            fare: Some(FareSelection { fare_class: FareClass::Business, price: 3_000_000 }),
            signed_in: true,
            ..Default::default()
        };
        let req = PayloadBuilder::default().build(&snapshot, 1).unwrap();
        assert_eq!(req.passenger, PassengerEntry::Registered { passengers: vec![42] });
        assert_eq!(req.fare_class, FareClass::Business);

        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("guest_passenger").is_none());
    }

    #[test]
    fn test_passenger_id_ignored_when_signed_out() {
        let snapshot = SessionSnapshot {
            trip: Some(trip()),
            passenger: Some(passenger()),
            passenger_id: Some(42),
            ..Default::default()
        };
        let req = PayloadBuilder::default().build(&snapshot, 1).unwrap();
        assert!(matches!(req.passenger, PassengerEntry::Guest { .. }));

        let id_only = SessionSnapshot {
            trip: Some(trip()),
            passenger_id: Some(42),
            ..Default::default()
        };
        assert!(matches!(
            PayloadBuilder::default().build(&id_only, 1),
            Err(PayloadError::MissingPrerequisite(Prerequisite::Passenger))
        ));
    }

    #[test]
    fn test_signed_in_without_passenger_id_sends_guest() {
        let snapshot = SessionSnapshot {
            trip: Some(trip()),
            passenger: Some(passenger()),
            signed_in: true,
            ..Default::default()
        };
        let req = PayloadBuilder::default().build(&snapshot, 1).unwrap();
        assert!(matches!(req.passenger, PassengerEntry::Guest { .. }));
    }

    #[test]
    fn test_month_day_year_dob() {
        let builder = PayloadBuilder::new(PayloadConfig {
            dob_format: DobFormat::MonthDayYear,
            ..Default::default()
        });
        let g = builder.guest_from(&passenger());
        assert_eq!(g.dob, "12/25/1995");

        let mut bad = passenger();
        bad.dob = "sometime".into();
        assert_eq!(builder.guest_from(&bad).dob, "01/01/1990");
    }

    #[test]
    fn test_missing_prerequisites() {
        let builder = PayloadBuilder::default();

        let no_trip = SessionSnapshot {
            passenger: Some(passenger()),
            ..Default::default()
        };
        assert!(matches!(
            builder.build(&no_trip, 0),
            Err(PayloadError::MissingPrerequisite(Prerequisite::OutboundFlight))
        ));

        let mut flightless = trip();
        flightless.outbound_flight_id = None;
        let no_flight = SessionSnapshot {
            trip: Some(flightless),
            passenger: Some(passenger()),
            ..Default::default()
        };
        assert!(matches!(
            builder.build(&no_flight, 0),
            Err(PayloadError::MissingPrerequisite(Prerequisite::OutboundFlight))
        ));

        let no_passenger = SessionSnapshot {
            trip: Some(trip()),
            passenger: Some(PassengerRecord::default()),
            ..Default::default()
        };
        assert!(matches!(
            builder.build(&no_passenger, 0),
            Err(PayloadError::MissingPrerequisite(Prerequisite::Passenger))
        ));
    }

    #[test]
    fn test_round_trip_requires_inbound() {
        let mut rt = trip().with_return(NaiveDate::from_ymd_opt(2025, 12, 27).unwrap(), 3804, 900_000);
        let snapshot = SessionSnapshot {
            trip: Some(rt.clone()),
            passenger_id: Some(1),
            signed_in: true,
            ..Default::default()
        };
        let req = PayloadBuilder::default().build(&snapshot, 0).unwrap();
        assert_eq!(req.trip_type, TripType::RoundTrip);
        assert_eq!(req.inbound_flight_id, Some(3804));

        rt.inbound_flight_id = None;
        let snapshot = SessionSnapshot {
            trip: Some(rt),
            passenger_id: Some(1),
            signed_in: true,
            ..Default::default()
        };
        assert!(matches!(
            PayloadBuilder::default().build(&snapshot, 0),
            Err(PayloadError::MissingPrerequisite(Prerequisite::InboundFlight))
        ));
    }
}
