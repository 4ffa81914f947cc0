//! Input validation tests
//!
//! Property-based and unit coverage for the shared validators the services
//! apply before touching the database.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::validation::{
    validate_discount, validate_email, validate_money, validate_quantity, validate_sku,
};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Generate valid email addresses
fn email_strategy() -> impl Strategy<Value = String> {
    "[a-z]{5,10}@[a-z]{3,8}\\.(com|org|net|no)"
}

/// Generate valid SKUs (uppercase alphanumeric with dashes)
fn sku_strategy() -> impl Strategy<Value = String> {
    "[A-Z0-9]{2,6}(-[A-Z0-9]{1,5}){0,2}"
}

// ============================================================================
// Email
// ============================================================================

#[test]
fn plain_addresses_pass() {
    assert!(validate_email("kari@example.no").is_ok());
    assert!(validate_email("post@zenvit.no").is_ok());
}

#[test]
fn malformed_addresses_fail() {
    assert!(validate_email("").is_err());
    assert!(validate_email("no-at-sign.no").is_err());
    assert!(validate_email("missing-domain@").is_err());
    assert!(validate_email("a@b").is_err());
}

// ============================================================================
// SKU
// ============================================================================

#[test]
fn catalog_skus_pass() {
    assert!(validate_sku("ZV-OM3-001").is_ok());
    assert!(validate_sku("ZV-MULTI-001").is_ok());
}

#[test]
fn empty_and_whitespace_skus_fail() {
    assert!(validate_sku("").is_err());
    assert!(validate_sku("   ").is_err());
    assert!(validate_sku("ZV 001").is_err());
}

// ============================================================================
// Money and quantities
// ============================================================================

#[test]
fn negative_money_fails() {
    assert!(validate_money(dec("-0.01")).is_err());
    assert!(validate_money(Decimal::ZERO).is_ok());
    assert!(validate_money(dec("299.00")).is_ok());
}

#[test]
fn zero_and_negative_quantities_fail() {
    assert!(validate_quantity(0).is_err());
    assert!(validate_quantity(-3).is_err());
    assert!(validate_quantity(1).is_ok());
}

#[test]
fn discount_cannot_exceed_line_value() {
    // 2 * 299 = 598 gross
    assert!(validate_discount(dec("299.00"), 2, dec("598.00")).is_ok());
    assert!(validate_discount(dec("299.00"), 2, dec("598.01")).is_err());
    assert!(validate_discount(dec("299.00"), 2, Decimal::ZERO).is_ok());
}

#[test]
fn negative_discount_fails() {
    assert!(validate_discount(dec("299.00"), 1, dec("-1.00")).is_err());
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    #[test]
    fn generated_emails_pass(email in email_strategy()) {
        prop_assert!(validate_email(&email).is_ok());
    }

    #[test]
    fn generated_skus_pass(sku in sku_strategy()) {
        prop_assert!(validate_sku(&sku).is_ok());
    }

    #[test]
    fn positive_quantities_pass(quantity in 1i32..100_000) {
        prop_assert!(validate_quantity(quantity).is_ok());
    }

    /// A discount up to the gross line value passes, anything above fails.
    #[test]
    fn discount_bound_is_the_gross_line_value(
        price in 1u32..10_000,
        quantity in 1i32..100,
        discount in 0u32..2_000_000,
    ) {
        let price = Decimal::from(price);
        let discount = Decimal::from(discount);
        let gross = price * Decimal::from(quantity);
        let result = validate_discount(price, quantity, discount);
        if discount <= gross {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(result.is_err());
        }
    }
}
