//! Search space pruning and move ordering rules.
//!
//! The reversal rule removes moves that would immediately undo the previous
//! transfer between the same two columns, so the depth-first engine does
//! not need its visited set to catch those cycles. The scoring rule orders
//! moves so that the ones making visible local progress are tried first.

use std::cmp::Reverse;

use crate::moves::Move;
use crate::puzzle::{is_single_color, is_uniform_full, Configuration};

/// Destination becomes a complete single-colour column
pub const COMPLETES_DESTINATION: u8 = 3;
/// Source column is left empty
pub const EMPTIES_SOURCE: u8 = 2;
/// Destination is non-empty and holds a single colour
pub const SINGLE_COLOR_DESTINATION: u8 = 1;

/// Check if moving `from -> to` would undo the previous move.
///
/// Applies when the previous move went `to -> from`, `to` still holds
/// tokens, and `from` is either empty or shows the same top colour as `to`.
pub(crate) fn is_immediate_reversal(
    state: &Configuration,
    from: usize,
    to: usize,
    last_move: Option<Move>,
) -> bool {
    let Some(last) = last_move else {
        return false;
    };
    if last.from != to || last.to != from {
        return false;
    }

    let Some(dest_top) = state.column(to).last() else {
        return false;
    };
    state
        .column(from)
        .last()
        .map_or(true, |source_top| source_top == dest_top)
}

/// Heuristic value of a move, judged on the configuration it produces
pub fn move_score(child: &Configuration, step: Move) -> u8 {
    let capacity = child.capacity();
    let source = child.column(step.from);
    let dest = child.column(step.to);

    let mut score = 0;
    if is_uniform_full(dest, capacity) {
        score += COMPLETES_DESTINATION;
    }
    if source.is_empty() {
        score += EMPTIES_SOURCE;
    }
    if is_single_color(dest) {
        score += SINGLE_COLOR_DESTINATION;
    }
    score
}

/// A candidate move together with the configuration it leads to
#[derive(Debug, Clone)]
pub struct ScoredMove {
    pub step: Move,
    pub child: Configuration,
    pub score: u8,
}

/// Apply each move and order the results by descending score.
///
/// The sort is stable, so moves with equal scores keep generation order and
/// the resulting order is deterministic.
pub fn order_moves(
    state: &Configuration,
    moves: impl IntoIterator<Item = Move>,
) -> Vec<ScoredMove> {
    let mut scored: Vec<ScoredMove> = moves
        .into_iter()
        .map(|step| {
            let child = state.apply_legal(step);
            let score = move_score(&child, step);
            ScoredMove { step, child, score }
        })
        .collect();
    scored.sort_by_key(|candidate| Reverse(candidate.score));
    scored
}
