//! Provider reference record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::ProviderId;

/// Kind of care facility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Hospital,
    Clinic,
    DentalClinic,
    OpticalCenter,
    Pharmacy,
    Laboratory,
}

impl ProviderKind {
    /// Wire-format code
    pub fn code(&self) -> &'static str {
        match self {
            ProviderKind::Hospital => "hospital",
            ProviderKind::Clinic => "clinic",
            ProviderKind::DentalClinic => "dental_clinic",
            ProviderKind::OpticalCenter => "optical_center",
            ProviderKind::Pharmacy => "pharmacy",
            ProviderKind::Laboratory => "laboratory",
        }
    }

    /// Parses a persisted code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "hospital" => Some(ProviderKind::Hospital),
            "clinic" => Some(ProviderKind::Clinic),
            "dental_clinic" => Some(ProviderKind::DentalClinic),
            "optical_center" => Some(ProviderKind::OpticalCenter),
            "pharmacy" => Some(ProviderKind::Pharmacy),
            "laboratory" => Some(ProviderKind::Laboratory),
            _ => None,
        }
    }
}

/// A care provider registered with the clearinghouse
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    /// Unique identifier
    pub id: ProviderId,
    /// Facility name
    pub name: String,
    /// Clearinghouse-issued provider license
    pub license_number: String,
    /// Kind of facility
    pub kind: ProviderKind,
    /// Clinical specialty, if any
    pub specialty: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Whether the record is active
    pub is_active: bool,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Provider {
    /// Creates a new active provider record
    pub fn new(
        name: impl Into<String>,
        license_number: impl Into<String>,
        kind: ProviderKind,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ProviderId::new_v7(),
            name: name.into(),
            license_number: license_number.into(),
            kind,
            specialty: None,
            phone: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
