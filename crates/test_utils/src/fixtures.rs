//! Test Fixtures
//!
//! Pre-built test data for common entities. Fixture values are realistic
//! enough to pass the builders' required-field checks.

use chrono::NaiveDate;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money};
use domain_directory::{Gender, Insurer, Patient, Provider, ProviderKind};

/// Common monetary amounts
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A routine consultation fee
    pub fn consultation_fee() -> Money {
        Money::new(dec!(250), Currency::SAR)
    }

    /// A dental crown line amount
    pub fn crown_fee() -> Money {
        Money::new(dec!(1100), Currency::SAR)
    }

    /// A high-cost procedure needing pre-approval
    pub fn preauth_amount() -> Money {
        Money::new(dec!(15000), Currency::SAR)
    }
}

/// Common string values
pub struct StringFixtures;

impl StringFixtures {
    /// A well-formed national id
    pub fn national_id() -> &'static str {
        "1012345678"
    }

    /// A clearinghouse provider license
    pub fn provider_license() -> &'static str {
        "PR-FHIR-001"
    }

    /// A clearinghouse payer license
    pub fn payer_license() -> &'static str {
        "INS-FHIR-102"
    }

    /// An ICD-10 code (type 2 diabetes)
    pub fn icd_code() -> &'static str {
        "E11.9"
    }

    /// An office-visit service code
    pub fn service_code() -> &'static str {
        "99213"
    }

    /// A dental crown service code
    pub fn dental_service_code() -> &'static str {
        "D2740"
    }
}

/// Common date values
pub struct DateFixtures;

impl DateFixtures {
    /// A service date in the recent past
    pub fn service_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 10).unwrap()
    }

    /// A date of birth for an adult patient
    pub fn date_of_birth() -> NaiveDate {
        NaiveDate::from_ymd_opt(1990, 3, 14).unwrap()
    }
}

/// Pre-built directory parties
pub struct PartyFixtures;

impl PartyFixtures {
    /// A patient with a valid national id and generated name
    pub fn patient() -> Patient {
        Patient::new(
            StringFixtures::national_id(),
            FirstName().fake::<String>(),
            LastName().fake::<String>(),
            DateFixtures::date_of_birth(),
            Gender::Female,
        )
    }

    /// A hospital provider with a valid license
    pub fn provider() -> Provider {
        Provider::new(
            "Dar Alshifa Hospital",
            StringFixtures::provider_license(),
            ProviderKind::Hospital,
        )
    }

    /// A dental clinic provider
    pub fn dental_clinic() -> Provider {
        Provider::new(
            "White Pearl Dental",
            "PR-FHIR-044",
            ProviderKind::DentalClinic,
        )
    }

    /// An insurer with a valid payer license
    pub fn insurer() -> Insurer {
        Insurer::new("Bupa Arabia", StringFixtures::payer_license())
    }
}
