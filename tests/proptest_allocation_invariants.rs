//! Property-based invariant tests for apportionment and drag editing.
//!
//! 1. Largest-remainder shares always sum to exactly the requested units.
//! 2. Every share stays within one unit of its exact proportional value.
//! 3. A drag move only touches the two segments sharing the dragged boundary, and their combined
//!    percentage moves by at most one point of rounding, on balanced and over-allocated stores.
//! 4. Auto-fill always balances the store, and a second auto-fill is a no-op.
//! 5. Every captured listener is released exactly once, however the drag ends.
//! 6. Pointer angles are always in [0, 360).

use std::cell::Cell;
use std::rc::Rc;

use pie_allocator::geometry::{Point, mouse_angle, polar_to_cartesian};
use pie_allocator::normalize::largest_remainder;
use pie_allocator::{
    AllocationStore, DirectHost, DragController, ListenerGuard, MoveOutcome, PointerHost, Resolution,
    Segment, WeightEntry, normalize,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

const CENTER: Point = Point::new(200.0, 200.0);
const RADIUS: f64 = 150.0;

fn weight() -> impl Strategy<Value = f64> {
    prop_oneof![
        4 => 0.0f64..1_000_000.0,
        1 => 1e300f64..f64::MAX,
        1 => Just(0.0),
    ]
}

fn weights(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(weight(), 1..=max_len)
}

fn percentages(max_len: usize) -> impl Strategy<Value = Vec<u32>> {
    proptest::collection::vec(0u32..=100, 1..=max_len)
}

fn store_from(percentages: &[u32]) -> AllocationStore {
    AllocationStore::new(
        percentages
            .iter()
            .enumerate()
            .map(|(index, percentage)| Segment::new(format!("segment-{index}"), *percentage))
            .collect(),
    )
    .unwrap()
}

/// A balanced store apportioned from arbitrary weights.
fn balanced_store(weights: &[f64]) -> AllocationStore {
    let entries: Vec<WeightEntry> = weights
        .iter()
        .enumerate()
        .map(|(index, weight)| WeightEntry::new(format!("segment-{index}"), *weight + 1.0))
        .collect();
    AllocationStore::from_weights(&entries)
}

struct CountingHost {
    released: Rc<Cell<u32>>,
}

impl PointerHost for CountingHost {
    fn capture_pointer(&mut self) -> ListenerGuard {
        let released = Rc::clone(&self.released);
        ListenerGuard::new(move || released.set(released.get() + 1))
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Shares sum to exactly the requested units
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn shares_sum_exactly(values in weights(40)) {
        prop_assume!(values.iter().any(|weight| *weight > 0.0));
        for resolution in [Resolution::WholePercent, Resolution::Hundredths] {
            let units = largest_remainder(&values, resolution.total_units());
            prop_assert_eq!(units.len(), values.len());
            prop_assert_eq!(units.iter().sum::<u64>(), resolution.total_units());
        }
    }

    #[test]
    fn normalized_entries_sum_exactly(values in weights(20)) {
        let entries: Vec<WeightEntry> = values
            .iter()
            .enumerate()
            .map(|(index, weight)| WeightEntry::new(format!("n{}", index % 5), *weight))
            .collect();
        let shares = normalize(&entries, Resolution::Hundredths);
        let total: u64 = shares.iter().map(|share| share.units).sum();
        if values.iter().any(|weight| *weight > 0.0) {
            prop_assert_eq!(total, 10_000);
        } else {
            prop_assert_eq!(total, 0);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Shares stay within one unit of the exact value
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn shares_track_exact_proportions(values in weights(40)) {
        let largest = values.iter().copied().fold(0.0, f64::max);
        prop_assume!(largest > 0.0);
        // Compare in units of the largest weight so the reference sum cannot overflow.
        let scaled: Vec<f64> = values.iter().map(|weight| weight / largest).collect();
        let total_weight: f64 = scaled.iter().sum();
        let units = largest_remainder(&values, 10_000);
        for (weight, units) in scaled.iter().zip(&units) {
            let exact = weight / total_weight * 10_000.0;
            prop_assert!(
                (*units as f64 - exact).abs() < 1.0 + 1e-6,
                "share {} too far from exact {}", units, exact
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Drag moves are local and conserve the pair total
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn drag_only_touches_the_shared_boundary(
        values in weights(12),
        pick in 0usize..12,
        angle in 0.0f64..360.0,
    ) {
        let mut store = balanced_store(&values);
        let before: Vec<u32> = store.percentages().collect();
        let index = pick % store.len();

        let mut controller = DragController::new(CENTER, RADIUS);
        let mut host = CountingHost { released: Rc::new(Cell::new(0)) };
        prop_assert!(controller.pointer_down(index, &store, &mut host));
        let outcome = controller.pointer_move(polar_to_cartesian(angle, 80.0, CENTER), &mut store);
        let after: Vec<u32> = store.percentages().collect();

        match outcome {
            MoveOutcome::Transferred(transfer) => {
                prop_assert_eq!(transfer.second, transfer.first + 1);
                prop_assert!(transfer.first == index || transfer.second == index);
                let pair_before = i64::from(before[transfer.first] + before[transfer.second]);
                let pair_after = i64::from(after[transfer.first] + after[transfer.second]);
                prop_assert!((pair_after - pair_before).abs() <= 1);
                for (position, (old, new)) in before.iter().zip(&after).enumerate() {
                    if position != transfer.first && position != transfer.second {
                        prop_assert_eq!(old, new, "segment {} changed", position);
                    }
                }
            }
            _ => prop_assert_eq!(before, after),
        }
    }
}

proptest! {
    #[test]
    fn drag_conserves_pairs_on_any_store(
        values in percentages(12),
        pick in 0usize..12,
        angle in 0.0f64..360.0,
    ) {
        let mut store = store_from(&values);
        let index = pick % store.len();

        let mut controller = DragController::new(CENTER, RADIUS);
        controller.pointer_down(index, &store, &mut DirectHost);
        let outcome = controller.pointer_move(polar_to_cartesian(angle, 80.0, CENTER), &mut store);
        let after: Vec<u32> = store.percentages().collect();
        prop_assert!(after.iter().all(|percentage| *percentage <= 100));

        match outcome {
            MoveOutcome::Transferred(transfer) => {
                prop_assert_eq!(after[transfer.first], transfer.first_percentage);
                prop_assert_eq!(after[transfer.second], transfer.second_percentage);
                let pair_before = i64::from(values[transfer.first] + values[transfer.second]);
                let pair_after = i64::from(after[transfer.first] + after[transfer.second]);
                prop_assert!(
                    (pair_after - pair_before).abs() <= 1,
                    "pair {} -> {} in {:?}", pair_before, pair_after, values
                );
                for (position, (old, new)) in values.iter().zip(&after).enumerate() {
                    if position != transfer.first && position != transfer.second {
                        prop_assert_eq!(old, new, "segment {} changed", position);
                    }
                }
            }
            _ => prop_assert_eq!(values, after),
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Auto-fill balances and is idempotent
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn auto_fill_balances_once(values in percentages(10)) {
        let mut store = store_from(&values);
        let changed = store.auto_fill();
        prop_assert_eq!(changed, values.iter().sum::<u32>() != 100);
        prop_assert!(store.is_balanced());

        let snapshot = store.clone();
        prop_assert!(!store.auto_fill());
        prop_assert_eq!(store, snapshot);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Listeners are released exactly once per drag
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn listeners_released_once_per_drag(presses in proptest::collection::vec(0usize..7, 1..10)) {
        let store = AllocationStore::default_goals();
        let released = Rc::new(Cell::new(0));
        let mut host = CountingHost { released: Rc::clone(&released) };
        {
            let mut controller = DragController::new(CENTER, RADIUS);
            for (count, index) in presses.iter().enumerate() {
                prop_assert!(controller.pointer_down(*index, &store, &mut host));
                // Pressing again without a release ends the previous drag.
                prop_assert_eq!(released.get() as usize, count);
            }
            prop_assert!(controller.pointer_up());
            prop_assert!(!controller.pointer_up());
        }
        prop_assert_eq!(released.get() as usize, presses.len());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Pointer angles are normalized
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn mouse_angle_is_in_range(x in -1000.0f64..1000.0, y in -1000.0f64..1000.0) {
        let angle = mouse_angle(Point::new(x, y), CENTER);
        prop_assert!((0.0..360.0).contains(&angle), "angle {} out of range", angle);
    }
}
