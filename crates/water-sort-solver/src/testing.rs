//! Shared helpers for unit tests.

use proptest::prelude::*;

use crate::moves::Move;
use crate::puzzle::{ColorId, Configuration};

/// Build a configuration from literal columns.
#[track_caller]
pub(crate) fn config(capacity: usize, columns: &[&[ColorId]]) -> Configuration {
    Configuration::new(capacity, columns.iter().map(|column| column.to_vec()).collect())
        .expect("test configuration should be valid")
}

/// Shorthand for a move
pub(crate) fn mv(from: usize, to: usize, count: usize) -> Move {
    Move { from, to, count }
}

/// Apply every move in order, panicking on the first illegal one.
#[track_caller]
pub(crate) fn play(root: &Configuration, moves: &[Move]) -> Configuration {
    moves.iter().fold(root.clone(), |state, &step| {
        state
            .apply_move(step)
            .unwrap_or_else(|e| panic!("illegal move {step:?} on\n{state}: {e}"))
    })
}

/// Small configurations with the given capacity: 2-4 columns, colours 1-3,
/// column lengths up to capacity.
pub(crate) fn arb_configuration_with_capacity(
    capacity: usize,
) -> impl Strategy<Value = Configuration> {
    prop::collection::vec(prop::collection::vec(1..=3 as ColorId, 0..=capacity), 2..=4).prop_map(
        move |columns| {
            Configuration::new(capacity, columns).expect("generated configuration should be valid")
        },
    )
}

/// Small configurations with capacity 1-4
pub(crate) fn arb_configuration() -> impl Strategy<Value = Configuration> {
    (1usize..=4).prop_flat_map(arb_configuration_with_capacity)
}
