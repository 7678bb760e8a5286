use serde::{Deserialize, Serialize};
use skyplan_shared::Masked;

/// Passenger details as captured by the passenger form. Every field is
/// optional on read; the form layer owns required-field validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassengerRecord {
    #[serde(alias = "firstName")]
    pub firstname: String,
    #[serde(alias = "lastName")]
    pub lastname: String,
    #[serde(rename = "cccd", alias = "national_id", alias = "passport")]
    pub national_id: Masked<String>,
    #[serde(alias = "dateOfBirth", alias = "date_of_birth")]
    pub dob: String,
    pub gender: String,
    #[serde(alias = "phoneNumber", alias = "phone")]
    pub phone_number: Masked<String>,
    pub email: Masked<String>,
    pub address: String,
    pub city: String,
    pub nationality: String,
    pub notes: Option<String>,
}

impl PassengerRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname.trim(), self.lastname.trim())
            .trim()
            .to_string()
    }

    /// A record with no name and no contact detail carries nothing usable.
    pub fn is_empty(&self) -> bool {
        self.firstname.trim().is_empty()
            && self.lastname.trim().is_empty()
            && self.email.is_blank()
            && self.phone_number.is_blank()
            && self.national_id.is_blank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_form_field_names() {
        let json = r#"{
            "firstName": "An",
            "lastName": "Nguyen",
            "cccd": "079201001234",
            "dob": "25/12/1995",
            "phoneNumber": "0901234567",
            "email": "an@example.com"
        }"#;
        let p: PassengerRecord = serde_json::from_str(json).unwrap();
        assert_eq!(p.full_name(), "An Nguyen");
        assert_eq!(p.national_id.expose(), "079201001234");
        assert_eq!(p.phone_number.expose(), "0901234567");
        assert!(p.notes.is_none());
        assert!(!p.is_empty());
    }

    #[test]
    fn test_debug_masks_pii() {
        let p = PassengerRecord {
            email: "an@example.com".into(),
            ..Default::default()
        };
        assert!(!format!("{:?}", p).contains("an@example.com"));
    }

    #[test]
    fn test_empty_record() {
        assert!(PassengerRecord::default().is_empty());
    }
}
