//! Patient reference record

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::PatientId;

/// Administrative gender, as carried on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
    Unknown,
}

impl Gender {
    /// Returns the wire-format code
    pub fn code(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
            Gender::Unknown => "unknown",
        }
    }

    /// Parses a persisted code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            "unknown" => Some(Gender::Unknown),
            _ => None,
        }
    }
}

/// A patient known to the system
///
/// The national id is the identifier the clearinghouse keys members on;
/// a claim for a patient without one cannot be submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    /// Unique identifier
    pub id: PatientId,
    /// National id or iqama number
    pub national_id: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Date of birth
    pub date_of_birth: NaiveDate,
    /// Administrative gender
    pub gender: Gender,
    /// Contact phone
    pub phone: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Whether the record is active
    pub is_active: bool,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Creates a new active patient record
    pub fn new(
        national_id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        date_of_birth: NaiveDate,
        gender: Gender,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PatientId::new_v7(),
            national_id: national_id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth,
            gender,
            phone: None,
            email: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Full display name
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_patient_is_active() {
        let patient = Patient::new(
            "1012345678",
            "Aisha",
            "Al-Harbi",
            NaiveDate::from_ymd_opt(1990, 3, 14).unwrap(),
            Gender::Female,
        );
        assert!(patient.is_active);
        assert_eq!(patient.full_name(), "Aisha Al-Harbi");
    }
}
