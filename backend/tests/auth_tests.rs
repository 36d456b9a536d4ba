//! Authentication and authorization tests
//!
//! Property-based and unit tests for credential validation and the
//! enumerated role checks enforced by the HTTP layer.

use proptest::prelude::*;
use shared::models::UserRole;
use shared::validation::{validate_dealer_code, validate_email, validate_password};

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Generate valid dealer codes (3-10 uppercase alphanumeric)
fn dealer_code_strategy() -> impl Strategy<Value = String> {
    "[A-Z0-9]{3,10}"
}

/// Generate valid email addresses
fn email_strategy() -> impl Strategy<Value = String> {
    "[a-z]{5,10}@[a-z]{3,8}\\.(com|org|net|vn)"
}

/// Generate valid passwords (8+ chars)
fn password_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9!@#$%]{8,20}"
}

fn role_strategy() -> impl Strategy<Value = UserRole> {
    prop_oneof![
        Just(UserRole::Admin),
        Just(UserRole::EvmStaff),
        Just(UserRole::DealerManager),
        Just(UserRole::DealerStaff),
    ]
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_stock_moves_restricted_to_manufacturer_roles() {
        assert!(UserRole::Admin.can_move_stock());
        assert!(UserRole::EvmStaff.can_move_stock());
        assert!(!UserRole::DealerManager.can_move_stock());
        assert!(!UserRole::DealerStaff.can_move_stock());
    }

    #[test]
    fn test_directory_management_roles() {
        assert!(UserRole::Admin.can_manage_directory());
        assert!(UserRole::EvmStaff.can_manage_directory());
        assert!(!UserRole::DealerManager.can_manage_directory());
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        assert_eq!(UserRole::from_str("superuser"), None);
        assert_eq!(UserRole::from_str(""), None);
        assert_eq!(UserRole::from_str("ADMIN"), None); // case sensitive
    }

    #[test]
    fn test_credential_validation() {
        assert!(validate_email("staff@evm.example.com").is_ok());
        assert!(validate_email("nope").is_err());
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        /// Every generated dealer code passes validation
        #[test]
        fn prop_dealer_codes_validate(code in dealer_code_strategy()) {
            prop_assert!(validate_dealer_code(&code).is_ok());
        }

        /// Every generated email passes validation
        #[test]
        fn prop_emails_validate(email in email_strategy()) {
            prop_assert!(validate_email(&email).is_ok());
        }

        /// Every generated password passes validation
        #[test]
        fn prop_passwords_validate(password in password_strategy()) {
            prop_assert!(validate_password(&password).is_ok());
        }

        /// Role serialization round-trips through its string form
        #[test]
        fn prop_role_round_trip(role in role_strategy()) {
            prop_assert_eq!(UserRole::from_str(role.as_str()), Some(role));
        }

        /// Stock movement is exactly the manufacturer-side capability
        #[test]
        fn prop_stock_movement_matches_role_side(role in role_strategy()) {
            let manufacturer_side = matches!(role, UserRole::Admin | UserRole::EvmStaff);
            prop_assert_eq!(role.can_move_stock(), manufacturer_side);
        }
    }
}
