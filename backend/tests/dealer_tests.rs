//! Dealer directory tests
//!
//! Dealer lifecycle transitions and VIN/code validation used by stock
//! intake.

use proptest::prelude::*;
use shared::models::DealerStatus;
use shared::validation::{validate_color, validate_line_quantity, validate_vin};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_dealer_suspension_round_trip() {
        assert!(DealerStatus::Active.can_transition_to(DealerStatus::Suspended));
        assert!(DealerStatus::Suspended.can_transition_to(DealerStatus::Active));
    }

    #[test]
    fn test_closed_is_terminal() {
        assert!(DealerStatus::Active.can_transition_to(DealerStatus::Closed));
        assert!(DealerStatus::Suspended.can_transition_to(DealerStatus::Closed));
        assert!(!DealerStatus::Closed.can_transition_to(DealerStatus::Active));
        assert!(!DealerStatus::Closed.can_transition_to(DealerStatus::Suspended));
    }

    #[test]
    fn test_only_active_dealers_receive_allocations() {
        assert!(DealerStatus::Active.is_active());
        assert!(!DealerStatus::Suspended.is_active());
        assert!(!DealerStatus::Closed.is_active());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            DealerStatus::Active,
            DealerStatus::Suspended,
            DealerStatus::Closed,
        ] {
            assert_eq!(DealerStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(DealerStatus::from_str("dormant"), None);
    }

    #[test]
    fn test_intake_validations() {
        assert!(validate_vin("5YJ3E1EA7KF000316").is_ok());
        assert!(validate_vin("5YJ3E1EA7KF00031O").is_err());
        assert!(validate_color("Deep Blue").is_ok());
        assert!(validate_color("").is_err());
        assert!(validate_line_quantity(10).is_ok());
        assert!(validate_line_quantity(0).is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Generate well-formed VINs
    fn vin_strategy() -> impl Strategy<Value = String> {
        "[A-HJ-NPR-Z0-9]{17}"
    }

    fn status_strategy() -> impl Strategy<Value = DealerStatus> {
        prop_oneof![
            Just(DealerStatus::Active),
            Just(DealerStatus::Suspended),
            Just(DealerStatus::Closed),
        ]
    }

    proptest! {
        /// Every generated VIN passes validation
        #[test]
        fn prop_vins_validate(vin in vin_strategy()) {
            prop_assert!(validate_vin(&vin).is_ok());
        }

        /// Nothing leaves the closed state
        #[test]
        fn prop_closed_is_final(to in status_strategy()) {
            prop_assert!(!DealerStatus::Closed.can_transition_to(to));
        }

        /// A self-transition is never valid
        #[test]
        fn prop_no_self_transitions(status in status_strategy()) {
            prop_assert!(!status.can_transition_to(status));
        }
    }
}
