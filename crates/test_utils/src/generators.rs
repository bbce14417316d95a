//! Property-Based Test Generators
//!
//! Proptest strategies for generating random domain data that maintains
//! the invariants the builders enforce.

use chrono::NaiveDate;
use proptest::prelude::*;

use core_kernel::{Currency, Money};
use domain_claims::{ClaimStatus, ClaimType, Diagnosis, DiagnosisKind};

/// Strategy for generating valid Currency values
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::SAR),
        Just(Currency::AED),
        Just(Currency::QAR),
        Just(Currency::BHD),
        Just(Currency::KWD),
        Just(Currency::OMR),
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
    ]
}

/// Strategy for generating positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for generating positive Money values
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    (positive_amount_minor_strategy(), currency_strategy())
        .prop_map(|(amount, currency)| Money::from_minor(amount, currency))
}

/// Strategy for generating positive SAR amounts
pub fn sar_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|amount| Money::from_minor(amount, Currency::SAR))
}

/// Strategy for generating claim types
pub fn claim_type_strategy() -> impl Strategy<Value = ClaimType> {
    prop_oneof![
        Just(ClaimType::Institutional),
        Just(ClaimType::Professional),
        Just(ClaimType::Oral),
        Just(ClaimType::Vision),
        Just(ClaimType::Pharmacy),
    ]
}

/// Strategy for generating claim statuses
pub fn claim_status_strategy() -> impl Strategy<Value = ClaimStatus> {
    prop_oneof![
        Just(ClaimStatus::Draft),
        Just(ClaimStatus::Queued),
        Just(ClaimStatus::Approved),
        Just(ClaimStatus::Denied),
        Just(ClaimStatus::Error),
        Just(ClaimStatus::Cancelled),
    ]
}

/// Strategy for generating plausible ICD-10 codes
pub fn icd_code_strategy() -> impl Strategy<Value = String> {
    ("[A-T]", 0u32..99u32, 0u32..9u32)
        .prop_map(|(letter, category, sub)| format!("{}{:02}.{}", letter, category, sub))
}

/// Strategy for generating diagnoses
pub fn diagnosis_strategy() -> impl Strategy<Value = Diagnosis> {
    (
        icd_code_strategy(),
        prop_oneof![
            Just(DiagnosisKind::Principal),
            Just(DiagnosisKind::Secondary),
            Just(DiagnosisKind::Admitting),
            Just(DiagnosisKind::Discharge),
        ],
    )
        .prop_map(|(code, kind)| Diagnosis { code, kind })
}

/// Strategy for generating service dates within a year
pub fn service_date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u32..365u32).prop_map(|days| {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + chrono::Duration::days(days as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        /// Every generated status code parses back to itself.
        #[test]
        fn prop_status_code_roundtrip(status in claim_status_strategy()) {
            let parsed = ClaimStatus::from_code(status.code());
            prop_assert_eq!(parsed, Some(status));
        }

        /// Every generated claim type code parses back to itself.
        #[test]
        fn prop_claim_type_code_roundtrip(claim_type in claim_type_strategy()) {
            let parsed = ClaimType::from_code(claim_type.code());
            prop_assert_eq!(parsed, Some(claim_type));
        }

        /// Generated money is always strictly positive.
        #[test]
        fn prop_positive_money_is_positive(money in positive_money_strategy()) {
            prop_assert!(money.is_positive());
        }

        /// Generated ICD codes look like codes.
        #[test]
        fn prop_icd_codes_have_expected_shape(code in icd_code_strategy()) {
            prop_assert_eq!(code.len(), 5);
            prop_assert!(code.contains('.'));
        }
    }
}
