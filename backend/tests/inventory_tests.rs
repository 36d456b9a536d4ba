//! Inventory allocation and recall tests
//!
//! Exercises the stock movement rules against an in-memory ledger that
//! mirrors the engine's policy: derived counts, deterministic picking,
//! per-line atomicity with best-effort across lines, and sold units
//! pinned in place.

use proptest::prelude::*;
use shared::models::{can_allocate, can_recall, UnitLocation, UnitStatus};
use std::collections::BTreeMap;

// ============================================================================
// In-memory ledger mirroring the engine's move rules
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Loc {
    Manufacturer,
    Dealer(u32),
}

#[derive(Debug, Clone)]
struct Unit {
    id: u32,
    variant: u32,
    color: &'static str,
    loc: Loc,
    status: UnitStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ItemOutcome {
    Fulfilled(Vec<u32>),
    Failed { requested: usize, available: usize },
}

#[derive(Debug, Default, Clone)]
struct Ledger {
    units: Vec<Unit>,
    next_id: u32,
}

impl Ledger {
    fn seed(&mut self, variant: u32, color: &'static str, quantity: usize, loc: Loc) -> Vec<u32> {
        let mut ids = Vec::with_capacity(quantity);
        for _ in 0..quantity {
            self.next_id += 1;
            ids.push(self.next_id);
            self.units.push(Unit {
                id: self.next_id,
                variant,
                color,
                loc,
                status: UnitStatus::Available,
            });
        }
        ids
    }

    fn mark_sold(&mut self, unit_id: u32) {
        let unit = self.units.iter_mut().find(|u| u.id == unit_id).unwrap();
        assert!(matches!(unit.loc, Loc::Dealer(_)), "only dealer stock sells");
        unit.status = UnitStatus::Sold;
    }

    /// Derived count; never cached
    fn count_available(&self, loc: Loc, variant: u32, color: &str) -> usize {
        self.units
            .iter()
            .filter(|u| {
                u.loc == loc
                    && u.variant == variant
                    && u.color == color
                    && u.status == UnitStatus::Available
            })
            .count()
    }

    /// Deterministic pick: ascending unit id
    fn pick(&self, loc: Loc, variant: u32, color: &str, quantity: usize) -> ItemOutcome {
        let mut ids: Vec<u32> = self
            .units
            .iter()
            .filter(|u| {
                u.loc == loc
                    && u.variant == variant
                    && u.color == color
                    && u.status == UnitStatus::Available
            })
            .map(|u| u.id)
            .collect();
        ids.sort_unstable();

        if ids.len() < quantity {
            ItemOutcome::Failed {
                requested: quantity,
                available: ids.len(),
            }
        } else {
            ids.truncate(quantity);
            ItemOutcome::Fulfilled(ids)
        }
    }

    /// Atomic per item, best-effort across items: a failed line moves
    /// nothing, sibling lines proceed.
    fn allocate(&mut self, dealer: u32, items: &[(u32, &'static str, usize)]) -> Vec<ItemOutcome> {
        let mut outcomes = Vec::with_capacity(items.len());
        for &(variant, color, quantity) in items {
            let outcome = self.pick(Loc::Manufacturer, variant, color, quantity);
            if let ItemOutcome::Fulfilled(ref ids) = outcome {
                for unit in self.units.iter_mut().filter(|u| ids.contains(&u.id)) {
                    unit.loc = Loc::Dealer(dealer);
                }
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Moves every available unit at the dealer back; sold units stay
    fn recall(&mut self, dealer: u32) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .units
            .iter()
            .filter(|u| u.loc == Loc::Dealer(dealer) && u.status == UnitStatus::Available)
            .map(|u| u.id)
            .collect();
        ids.sort_unstable();

        for unit in self.units.iter_mut().filter(|u| ids.contains(&u.id)) {
            unit.loc = Loc::Manufacturer;
        }
        ids
    }

    /// Units of (variant, color) summed over every location, sold
    /// included
    fn total(&self, variant: u32, color: &str) -> usize {
        self.units
            .iter()
            .filter(|u| u.variant == variant && u.color == color)
            .count()
    }

    /// Totals per (variant, color) for conservation checks
    fn totals(&self) -> BTreeMap<(u32, &'static str), usize> {
        let mut map = BTreeMap::new();
        for unit in &self.units {
            *map.entry((unit.variant, unit.color)).or_insert(0) += 1;
        }
        map
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Allocate part of the available stock; counts shift accordingly
    #[test]
    fn test_allocate_moves_requested_quantity() {
        let mut ledger = Ledger::default();
        ledger.seed(10, "red", 5, Loc::Manufacturer);

        let outcomes = ledger.allocate(7, &[(10, "red", 3)]);

        match &outcomes[0] {
            ItemOutcome::Fulfilled(ids) => assert_eq!(ids.len(), 3),
            other => panic!("expected fulfilled line, got {:?}", other),
        }
        assert_eq!(ledger.count_available(Loc::Manufacturer, 10, "red"), 2);
        assert_eq!(ledger.count_available(Loc::Dealer(7), 10, "red"), 3);
    }

    /// Requesting more than available fails the line and moves nothing
    #[test]
    fn test_insufficient_stock_moves_nothing() {
        let mut ledger = Ledger::default();
        ledger.seed(10, "red", 2, Loc::Manufacturer);

        let outcomes = ledger.allocate(7, &[(10, "red", 3)]);

        assert_eq!(
            outcomes[0],
            ItemOutcome::Failed {
                requested: 3,
                available: 2
            }
        );
        assert_eq!(ledger.count_available(Loc::Manufacturer, 10, "red"), 2);
        assert_eq!(ledger.count_available(Loc::Dealer(7), 10, "red"), 0);
    }

    /// A failed line leaves sibling lines untouched
    #[test]
    fn test_partial_success_across_lines() {
        let mut ledger = Ledger::default();
        ledger.seed(20, "blue", 1, Loc::Manufacturer);

        let outcomes = ledger.allocate(7, &[(10, "red", 2), (20, "blue", 1)]);

        assert!(matches!(outcomes[0], ItemOutcome::Failed { .. }));
        match &outcomes[1] {
            ItemOutcome::Fulfilled(ids) => assert_eq!(ids.len(), 1),
            other => panic!("expected fulfilled line, got {:?}", other),
        }
        assert_eq!(ledger.count_available(Loc::Dealer(7), 20, "blue"), 1);
    }

    /// Recall skips sold units
    #[test]
    fn test_recall_excludes_sold_units() {
        let mut ledger = Ledger::default();
        let ids = ledger.seed(10, "red", 3, Loc::Dealer(7));
        ledger.mark_sold(ids[0]);

        let recalled = ledger.recall(7);

        assert_eq!(recalled.len(), 2);
        assert!(!recalled.contains(&ids[0]));
        assert_eq!(ledger.count_available(Loc::Manufacturer, 10, "red"), 2);
        // The sold unit stays with the dealer
        assert_eq!(ledger.total(10, "red"), 3);
    }

    /// Recall on an empty dealer is a zero-effect success
    #[test]
    fn test_recall_with_no_units() {
        let mut ledger = Ledger::default();
        ledger.seed(10, "red", 4, Loc::Manufacturer);

        let recalled = ledger.recall(7);

        assert!(recalled.is_empty());
        assert_eq!(ledger.count_available(Loc::Manufacturer, 10, "red"), 4);
    }

    /// Counting twice with no intervening moves is stable
    #[test]
    fn test_count_is_idempotent() {
        let mut ledger = Ledger::default();
        ledger.seed(10, "red", 5, Loc::Manufacturer);

        let first = ledger.count_available(Loc::Manufacturer, 10, "red");
        let second = ledger.count_available(Loc::Manufacturer, 10, "red");

        assert_eq!(first, second);
    }

    /// Picks come back in ascending id order, so repeated runs are
    /// reproducible
    #[test]
    fn test_pick_is_deterministic() {
        let mut ledger = Ledger::default();
        let ids = ledger.seed(10, "red", 5, Loc::Manufacturer);

        let picked = match ledger.pick(Loc::Manufacturer, 10, "red", 3) {
            ItemOutcome::Fulfilled(ids) => ids,
            other => panic!("expected fulfilled pick, got {:?}", other),
        };

        assert_eq!(picked, ids[..3].to_vec());
    }

    /// Allocation and recall only touch matching (variant, color) stock
    #[test]
    fn test_moves_do_not_cross_variants() {
        let mut ledger = Ledger::default();
        ledger.seed(10, "red", 3, Loc::Manufacturer);
        ledger.seed(10, "blue", 3, Loc::Manufacturer);

        ledger.allocate(7, &[(10, "red", 2)]);

        assert_eq!(ledger.count_available(Loc::Manufacturer, 10, "blue"), 3);
        assert_eq!(ledger.count_available(Loc::Dealer(7), 10, "blue"), 0);
    }

    /// State machine guards as used by the engine
    #[test]
    fn test_state_machine_guards() {
        assert!(can_allocate(UnitStatus::Available, UnitLocation::Manufacturer));
        assert!(!can_allocate(UnitStatus::Sold, UnitLocation::Manufacturer));
        assert!(can_recall(UnitStatus::Available, UnitLocation::Dealer));
        assert!(!can_recall(UnitStatus::Sold, UnitLocation::Dealer));
        assert!(!can_recall(UnitStatus::Reserved, UnitLocation::Dealer));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for a seeded manufacturer quantity
    fn seed_strategy() -> impl Strategy<Value = usize> {
        0usize..30
    }

    /// Strategy for a requested quantity
    fn request_strategy() -> impl Strategy<Value = usize> {
        1usize..40
    }

    /// Strategy for a small mixed operation sequence
    #[derive(Debug, Clone)]
    enum Op {
        Allocate { dealer: u32, quantity: usize },
        Recall { dealer: u32 },
        Sell { dealer: u32 },
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u32..3, 1usize..6).prop_map(|(dealer, quantity)| Op::Allocate { dealer, quantity }),
            (0u32..3).prop_map(|dealer| Op::Recall { dealer }),
            (0u32..3).prop_map(|dealer| Op::Sell { dealer }),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Conservation: allocate/recall/sell sequences never create or
        /// destroy units of any (variant, color)
        #[test]
        fn prop_conservation_over_random_ops(
            seed_red in seed_strategy(),
            seed_blue in seed_strategy(),
            ops in prop::collection::vec(op_strategy(), 0..40)
        ) {
            let mut ledger = Ledger::default();
            ledger.seed(10, "red", seed_red, Loc::Manufacturer);
            ledger.seed(20, "blue", seed_blue, Loc::Manufacturer);
            let totals_before = ledger.totals();

            for op in ops {
                match op {
                    Op::Allocate { dealer, quantity } => {
                        ledger.allocate(dealer, &[(10, "red", quantity)]);
                    }
                    Op::Recall { dealer } => {
                        ledger.recall(dealer);
                    }
                    Op::Sell { dealer } => {
                        // Sell one available unit at the dealer, if any
                        let candidate = ledger
                            .units
                            .iter()
                            .find(|u| u.loc == Loc::Dealer(dealer) && u.status == UnitStatus::Available)
                            .map(|u| u.id);
                        if let Some(id) = candidate {
                            ledger.mark_sold(id);
                        }
                    }
                }
            }

            prop_assert_eq!(ledger.totals(), totals_before);
        }

        /// No over-allocation: a line requesting more than available
        /// fails and moves zero units
        #[test]
        fn prop_no_over_allocation(
            seeded in seed_strategy(),
            requested in request_strategy()
        ) {
            let mut ledger = Ledger::default();
            ledger.seed(10, "red", seeded, Loc::Manufacturer);

            let outcomes = ledger.allocate(7, &[(10, "red", requested)]);

            if requested > seeded {
                prop_assert_eq!(
                    &outcomes[0],
                    &ItemOutcome::Failed { requested, available: seeded }
                );
                prop_assert_eq!(ledger.count_available(Loc::Manufacturer, 10, "red"), seeded);
                prop_assert_eq!(ledger.count_available(Loc::Dealer(7), 10, "red"), 0);
            } else {
                match &outcomes[0] {
                    ItemOutcome::Fulfilled(ids) => prop_assert_eq!(ids.len(), requested),
                    other => prop_assert!(false, "expected fulfilled line, got {:?}", other),
                }
                prop_assert_eq!(
                    ledger.count_available(Loc::Manufacturer, 10, "red"),
                    seeded - requested
                );
            }
        }

        /// Atomicity per line: every line either moves its full quantity
        /// or nothing
        #[test]
        fn prop_line_atomicity(
            seeded in seed_strategy(),
            quantities in prop::collection::vec(1usize..8, 1..6)
        ) {
            let mut ledger = Ledger::default();
            ledger.seed(10, "red", seeded, Loc::Manufacturer);

            let items: Vec<(u32, &'static str, usize)> =
                quantities.iter().map(|&q| (10, "red", q)).collect();
            let outcomes = ledger.allocate(7, &items);

            let mut moved = 0usize;
            for (outcome, &(_, _, requested)) in outcomes.iter().zip(items.iter()) {
                match outcome {
                    ItemOutcome::Fulfilled(ids) => {
                        prop_assert_eq!(ids.len(), requested);
                        moved += ids.len();
                    }
                    ItemOutcome::Failed { .. } => {}
                }
            }

            prop_assert_eq!(ledger.count_available(Loc::Dealer(7), 10, "red"), moved);
            prop_assert_eq!(
                ledger.count_available(Loc::Manufacturer, 10, "red"),
                seeded - moved
            );
        }

        /// Recall returns exactly the available dealer units, never sold
        /// ones
        #[test]
        fn prop_recall_never_returns_sold(
            seeded in 1usize..20,
            sold_count in 0usize..20
        ) {
            let mut ledger = Ledger::default();
            let ids = ledger.seed(10, "red", seeded, Loc::Dealer(7));

            let sold_count = sold_count.min(seeded);
            for id in &ids[..sold_count] {
                ledger.mark_sold(*id);
            }

            let recalled = ledger.recall(7);

            prop_assert_eq!(recalled.len(), seeded - sold_count);
            for id in &ids[..sold_count] {
                prop_assert!(!recalled.contains(id));
            }
            // Sold units remain with the dealer
            prop_assert_eq!(
                ledger.units.iter().filter(|u| u.loc == Loc::Dealer(7)).count(),
                sold_count
            );
        }

        /// Allocate-then-recall round trip restores manufacturer counts
        /// when nothing sells in between
        #[test]
        fn prop_allocate_recall_round_trip(
            seeded in seed_strategy(),
            requested in 1usize..10
        ) {
            let mut ledger = Ledger::default();
            ledger.seed(10, "red", seeded, Loc::Manufacturer);

            ledger.allocate(7, &[(10, "red", requested)]);
            ledger.recall(7);

            prop_assert_eq!(ledger.count_available(Loc::Manufacturer, 10, "red"), seeded);
            prop_assert_eq!(ledger.count_available(Loc::Dealer(7), 10, "red"), 0);
        }
    }
}
