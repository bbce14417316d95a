//! Insurer reference record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::InsurerId;

/// An insurer (payer) registered with the clearinghouse
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insurer {
    /// Unique identifier
    pub id: InsurerId,
    /// Payer name
    pub name: String,
    /// Clearinghouse-issued payer license
    pub payer_license: String,
    /// Contact email
    pub email: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Whether the record is active
    pub is_active: bool,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Insurer {
    /// Creates a new active insurer record
    pub fn new(name: impl Into<String>, payer_license: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: InsurerId::new_v7(),
            name: name.into(),
            payer_license: payer_license.into(),
            email: None,
            phone: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
