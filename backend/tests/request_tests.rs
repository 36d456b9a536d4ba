//! Dealer stock request lifecycle tests
//!
//! Covers the request state machine and the line fulfillment
//! bookkeeping updated by allocation calls.

use proptest::prelude::*;
use shared::models::RequestStatus;

const ALL_STATUSES: [RequestStatus; 5] = [
    RequestStatus::Pending,
    RequestStatus::Approved,
    RequestStatus::Rejected,
    RequestStatus::Delivered,
    RequestStatus::Cancelled,
];

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_happy_path_lifecycle() {
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Approved));
        assert!(RequestStatus::Approved.can_transition_to(RequestStatus::Delivered));
    }

    #[test]
    fn test_no_backwards_transitions() {
        assert!(!RequestStatus::Approved.can_transition_to(RequestStatus::Pending));
        assert!(!RequestStatus::Delivered.can_transition_to(RequestStatus::Approved));
        assert!(!RequestStatus::Cancelled.can_transition_to(RequestStatus::Pending));
    }

    #[test]
    fn test_allocation_window() {
        // Only an approved, undelivered request may receive stock
        assert!(RequestStatus::Approved.allows_allocation());
        for status in ALL_STATUSES {
            if status != RequestStatus::Approved {
                assert!(!status.allows_allocation(), "{:?}", status);
            }
        }
    }

    #[test]
    fn test_status_round_trip() {
        for status in ALL_STATUSES {
            assert_eq!(RequestStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(RequestStatus::from_str("draft"), None);
    }

    /// Fulfillment bookkeeping: a line is fulfilled only once the full
    /// requested quantity is covered
    #[test]
    fn test_line_fulfillment_marking() {
        let quantity = 5;
        let mut allocated = 0;

        allocated += 3;
        assert!(allocated < quantity); // line stays open

        allocated += 2;
        assert!(allocated >= quantity); // now fulfilled
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn status_strategy() -> impl Strategy<Value = RequestStatus> {
        prop_oneof![
            Just(RequestStatus::Pending),
            Just(RequestStatus::Approved),
            Just(RequestStatus::Rejected),
            Just(RequestStatus::Delivered),
            Just(RequestStatus::Cancelled),
        ]
    }

    proptest! {
        /// No transition ever leaves a terminal state
        #[test]
        fn prop_terminal_states_are_final(
            from in status_strategy(),
            to in status_strategy()
        ) {
            let terminal = matches!(
                from,
                RequestStatus::Rejected | RequestStatus::Delivered | RequestStatus::Cancelled
            );
            if terminal {
                prop_assert!(!from.can_transition_to(to));
            }
        }

        /// A self-transition is never valid
        #[test]
        fn prop_no_self_transitions(status in status_strategy()) {
            prop_assert!(!status.can_transition_to(status));
        }

        /// Fulfillment is monotonic: once a line's allocated quantity
        /// covers the requested quantity it never drops back below it,
        /// because allocations only add
        #[test]
        fn prop_fulfillment_is_monotonic(
            quantity in 1i32..100,
            moves in prop::collection::vec(1i32..20, 0..15)
        ) {
            let mut allocated = 0i32;
            let mut was_fulfilled = false;

            for step in moves {
                allocated += step;
                let fulfilled = allocated >= quantity;
                if was_fulfilled {
                    prop_assert!(fulfilled);
                }
                was_fulfilled = fulfilled;
            }
        }
    }
}
