//! Validation utilities for the Crab Farm Management Platform
//!
//! Input checks shared between the API handlers and the WASM bindings so the
//! browser can reject bad input before it ever reaches the server.

use rust_decimal::Decimal;

// ============================================================================
// Cage Validations
// ============================================================================

/// Validate cage identifier format (1-10 uppercase alphanumeric, e.g. "A01")
pub fn validate_cage_id(id: &str) -> Result<(), &'static str> {
    if id.is_empty() {
        return Err("Cage ID cannot be empty");
    }
    if id.len() > 10 {
        return Err("Cage ID must be at most 10 characters");
    }
    if !id.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return Err("Cage ID must be uppercase alphanumeric only");
    }
    Ok(())
}

/// Validate the seeding weight of a new cage
pub fn validate_initial_weight(weight_g: i32) -> Result<(), &'static str> {
    if weight_g <= 0 {
        return Err("Initial weight must be greater than zero");
    }
    Ok(())
}

/// Validate the seed cost of a new cage
pub fn validate_seed_cost(cost: Decimal) -> Result<(), &'static str> {
    if cost < Decimal::ZERO {
        return Err("Seed cost cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Account Validations
// ============================================================================

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if validator::validate_email(email) {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 6 {
        return Err("Password must be at least 6 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Cage Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_cage_id_valid() {
        assert!(validate_cage_id("A01").is_ok());
        assert!(validate_cage_id("B12").is_ok());
        assert!(validate_cage_id("CAGE10").is_ok());
        assert!(validate_cage_id("7").is_ok());
    }

    #[test]
    fn test_validate_cage_id_invalid() {
        assert!(validate_cage_id("").is_err()); // Empty
        assert!(validate_cage_id("ABCDEFGHIJK").is_err()); // Too long
        assert!(validate_cage_id("a01").is_err()); // Lowercase
        assert!(validate_cage_id("A-01").is_err()); // Special char
        assert!(validate_cage_id("A 1").is_err()); // Whitespace
    }

    #[test]
    fn test_validate_initial_weight() {
        assert!(validate_initial_weight(120).is_ok());
        assert!(validate_initial_weight(1).is_ok());
        assert!(validate_initial_weight(0).is_err());
        assert!(validate_initial_weight(-50).is_err());
    }

    #[test]
    fn test_validate_seed_cost() {
        assert!(validate_seed_cost(Decimal::ZERO).is_ok());
        assert!(validate_seed_cost(Decimal::from(500_000)).is_ok());
        assert!(validate_seed_cost(Decimal::from(-1)).is_err());
    }

    // ========================================================================
    // Account Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("user.name@domain.com.vn").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@.").is_err());
        assert!(validate_email("user@").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("123456").is_ok());
        assert!(validate_password("12345").is_err());
    }
}
