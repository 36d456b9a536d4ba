//! Validation utilities for the EV Dealer Management Platform

// ============================================================================
// Vehicle Validations
// ============================================================================

/// Letters that never appear in a VIN (easily confused with 1/0)
const VIN_EXCLUDED: &[char] = &['I', 'O', 'Q'];

/// Validate a Vehicle Identification Number (17 uppercase alphanumeric,
/// excluding I, O and Q)
pub fn validate_vin(vin: &str) -> Result<(), &'static str> {
    if vin.len() != 17 {
        return Err("VIN must be exactly 17 characters");
    }
    if !vin
        .chars()
        .all(|c| (c.is_ascii_uppercase() || c.is_ascii_digit()) && !VIN_EXCLUDED.contains(&c))
    {
        return Err("VIN must be uppercase alphanumeric without I, O or Q");
    }
    Ok(())
}

/// Validate a vehicle color name
pub fn validate_color(color: &str) -> Result<(), &'static str> {
    let trimmed = color.trim();
    if trimmed.is_empty() {
        return Err("Color cannot be empty");
    }
    if trimmed.len() > 30 {
        return Err("Color must be at most 30 characters");
    }
    Ok(())
}

/// Validate a request line quantity (positive, capped per line)
pub fn validate_line_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be positive");
    }
    if quantity > 500 {
        return Err("Quantity must be at most 500 per line");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if validator::validate_email(email) {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate dealer code format (3-10 uppercase alphanumeric)
pub fn validate_dealer_code(code: &str) -> Result<(), &'static str> {
    if code.len() < 3 {
        return Err("Dealer code must be at least 3 characters");
    }
    if code.len() > 10 {
        return Err("Dealer code must be at most 10 characters");
    }
    if !code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return Err("Dealer code must be uppercase alphanumeric only");
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Vehicle Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_vin_valid() {
        assert!(validate_vin("5YJ3E1EA7KF000316").is_ok());
        assert!(validate_vin("WVWZZZ1JZXW000001").is_ok());
    }

    #[test]
    fn test_validate_vin_invalid() {
        assert!(validate_vin("SHORT").is_err());
        assert!(validate_vin("5YJ3E1EA7KF0003167").is_err()); // 18 chars
        assert!(validate_vin("5yj3e1ea7kf000316").is_err()); // lowercase
        assert!(validate_vin("5YJ3E1EA7KF00031O").is_err()); // contains O
        assert!(validate_vin("5YJ3E1EA7KF00031I").is_err()); // contains I
        assert!(validate_vin("5YJ3E1EA7KF00031Q").is_err()); // contains Q
    }

    #[test]
    fn test_validate_color() {
        assert!(validate_color("Pearl White").is_ok());
        assert!(validate_color("red").is_ok());
        assert!(validate_color("").is_err());
        assert!(validate_color("   ").is_err());
        assert!(validate_color(&"x".repeat(31)).is_err());
    }

    #[test]
    fn test_validate_line_quantity() {
        assert!(validate_line_quantity(1).is_ok());
        assert!(validate_line_quantity(500).is_ok());
        assert!(validate_line_quantity(0).is_err());
        assert!(validate_line_quantity(-3).is_err());
        assert!(validate_line_quantity(501).is_err());
    }

    // ========================================================================
    // General Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("staff@evm.example.com").is_ok());
        assert!(validate_email("dealer.manager@hanoi-ev.vn").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@.").is_err());
    }

    #[test]
    fn test_validate_dealer_code_valid() {
        assert!(validate_dealer_code("HAN").is_ok());
        assert!(validate_dealer_code("HAN01").is_ok());
        assert!(validate_dealer_code("ABCDEFGHIJ").is_ok());
    }

    #[test]
    fn test_validate_dealer_code_invalid() {
        assert!(validate_dealer_code("HA").is_err()); // Too short
        assert!(validate_dealer_code("ABCDEFGHIJK").is_err()); // Too long
        assert!(validate_dealer_code("han").is_err()); // Lowercase
        assert!(validate_dealer_code("HA-N").is_err()); // Special char
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("short").is_err());
    }
}
