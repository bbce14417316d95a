//! Money type tests

use core_kernel::{Currency, Money, MoneyError};
use proptest::prelude::*;
use rust_decimal_macros::dec;

#[test]
fn test_money_creation_rounds_to_four_places() {
    let money = Money::new(dec!(10.123456), Currency::SAR);
    assert_eq!(money.amount(), dec!(10.1235));
}

#[test]
fn test_from_minor_units() {
    let sar = Money::from_minor(12345, Currency::SAR);
    assert_eq!(sar.amount(), dec!(123.45));

    // Three-decimal currency
    let kwd = Money::from_minor(12345, Currency::KWD);
    assert_eq!(kwd.amount(), dec!(12.345));
}

#[test]
fn test_checked_add_same_currency() {
    let a = Money::new(dec!(100), Currency::SAR);
    let b = Money::new(dec!(50.25), Currency::SAR);
    let sum = a.checked_add(&b).unwrap();
    assert_eq!(sum.amount(), dec!(150.25));
}

#[test]
fn test_currency_mismatch_rejected() {
    let sar = Money::new(dec!(100), Currency::SAR);
    let usd = Money::new(dec!(100), Currency::USD);

    let result = sar.checked_add(&usd);
    assert!(matches!(result, Err(MoneyError::CurrencyMismatch(_, _))));
}

#[test]
fn test_zero_and_sign_predicates() {
    let zero = Money::zero(Currency::SAR);
    assert!(zero.is_zero());
    assert!(!zero.is_positive());
    assert!(!zero.is_negative());

    let negative = Money::new(dec!(-5), Currency::SAR);
    assert!(negative.is_negative());
}

#[test]
fn test_currency_code_roundtrip() {
    for code in ["SAR", "AED", "QAR", "BHD", "KWD", "OMR", "USD", "EUR", "GBP"] {
        let currency = Currency::from_code(code).unwrap();
        assert_eq!(currency.code(), code);
    }
    assert!(Currency::from_code("XXX").is_err());
}

#[test]
fn test_display_rounds_to_minor_unit() {
    let money = Money::new(dec!(10.1235), Currency::SAR);
    assert_eq!(money.to_string(), "10.12 SAR");
}

fn currency_strategy() -> impl Strategy<Value = Currency> {
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

proptest! {
    /// Addition then subtraction of the same value is an identity.
    #[test]
    fn prop_add_sub_roundtrip(
        base in -1_000_000_000i64..1_000_000_000i64,
        delta in -1_000_000_000i64..1_000_000_000i64,
        currency in currency_strategy(),
    ) {
        let a = Money::from_minor(base, currency);
        let b = Money::from_minor(delta, currency);

        let roundtrip = a.checked_add(&b).unwrap().checked_sub(&b).unwrap();
        prop_assert_eq!(roundtrip, a);
    }

    /// Zero is the additive identity for every currency.
    #[test]
    fn prop_zero_identity(
        amount in -1_000_000_000i64..1_000_000_000i64,
        currency in currency_strategy(),
    ) {
        let money = Money::from_minor(amount, currency);
        let zero = Money::zero(currency);
        prop_assert_eq!(money.checked_add(&zero).unwrap(), money);
    }
}
