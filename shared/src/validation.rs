//! Validation utilities for the ZenVit CRM platform

use rust_decimal::Decimal;

// ============================================================================
// Catalog / stock validations
// ============================================================================

/// Validate a SKU: non-empty, at most 40 chars, alphanumeric plus dashes
pub fn validate_sku(sku: &str) -> Result<(), &'static str> {
    if sku.is_empty() || sku.len() > 40 {
        return Err("SKU must be between 1 and 40 characters");
    }
    if !sku.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err("SKU may only contain letters, digits and dashes");
    }
    Ok(())
}

/// Validate that a line item quantity is positive
pub fn validate_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate that a monetary amount is not negative
pub fn validate_money(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Amount cannot be negative");
    }
    Ok(())
}

/// Validate that a discount does not exceed the undiscounted line total
pub fn validate_discount(
    sale_price: Decimal,
    quantity: i32,
    discount: Decimal,
) -> Result<(), &'static str> {
    if discount < Decimal::ZERO {
        return Err("Discount cannot be negative");
    }
    if discount > sale_price * Decimal::from(quantity) {
        return Err("Discount cannot exceed the line total");
    }
    Ok(())
}

// ============================================================================
// General validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn sku_rules() {
        assert!(validate_sku("ZV-D3K2-001").is_ok());
        assert!(validate_sku("").is_err());
        assert!(validate_sku("has space").is_err());
    }

    #[test]
    fn quantity_must_be_positive() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-5).is_err());
    }

    #[test]
    fn discount_bounds() {
        assert!(validate_discount(dec("100"), 2, dec("200")).is_ok());
        assert!(validate_discount(dec("100"), 2, dec("201")).is_err());
        assert!(validate_discount(dec("100"), 2, dec("-1")).is_err());
    }

    #[test]
    fn email_format() {
        assert!(validate_email("post@zenvit.no").is_ok());
        assert!(validate_email("not-an-email").is_err());
    }
}
