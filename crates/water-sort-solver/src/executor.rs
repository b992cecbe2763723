//! Move sequence replay with metrics tracking.
//!
//! Replays a solution against a starting configuration using the validated
//! `apply_move`, so a sequence from an untrusted source (a file, another
//! solver) either replays exactly or stops at the first illegal move.

use serde::{Deserialize, Serialize};

use crate::moves::{Move, MoveError};
use crate::puzzle::{is_uniform_full, Configuration};

/// Metrics collected during replay
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayMetrics {
    pub moves: usize,
    pub tokens_moved: usize,
    /// Moves whose destination ended uniform-full
    pub columns_completed: usize,
    /// Moves that left their source empty
    pub columns_emptied: usize,
}

/// Result of replaying a move sequence
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub final_state: Configuration,
    pub solved: bool,
    pub metrics: ReplayMetrics,
}

/// A move in the sequence could not be applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("move at index {step} is illegal: {source}")]
pub struct ReplayError {
    /// Zero-based position of the failing move
    pub step: usize,
    pub source: MoveError,
}

/// Apply `moves` in order starting from `root`
pub fn replay(root: &Configuration, moves: &[Move]) -> Result<ReplayResult, ReplayError> {
    let mut state = root.clone();
    let mut metrics = ReplayMetrics::default();

    for (step, &next) in moves.iter().enumerate() {
        state = state
            .apply_move(next)
            .map_err(|source| ReplayError { step, source })?;

        metrics.moves += 1;
        metrics.tokens_moved += next.count;
        if is_uniform_full(state.column(next.to), state.capacity()) {
            metrics.columns_completed += 1;
        }
        if state.column(next.from).is_empty() {
            metrics.columns_emptied += 1;
        }
    }

    Ok(ReplayResult {
        solved: state.is_solved(),
        final_state: state,
        metrics,
    })
}

/// Verify that `moves` are all legal and leave `root` solved
pub fn verify_solution(root: &Configuration, moves: &[Move]) -> bool {
    replay(root, moves).is_ok_and(|result| result.solved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{solve_bfs, solve_iterative_deepening};
    use crate::testing::{config, mv};

    #[test]
    fn test_replay_tracks_metrics() {
        let root = config(3, &[&[1, 2, 2], &[2], &[1, 1]]);
        let moves = [mv(1, 0, 1), mv(0, 1, 3)];

        // First move is illegal: column 0 is full
        let err = replay(&root, &moves).unwrap_err();
        assert_eq!(err.step, 0);
        assert_eq!(err.source, MoveError::DestinationFull { column: 0 });

        let moves = [mv(0, 1, 2), mv(0, 2, 1)];
        let result = replay(&root, &moves).unwrap();
        assert!(result.solved);
        assert_eq!(
            result.metrics,
            ReplayMetrics {
                moves: 2,
                tokens_moved: 3,
                columns_completed: 2,
                columns_emptied: 1,
            }
        );
        assert_eq!(result.final_state.column(1), &[2, 2, 2]);
        assert_eq!(result.final_state.column(2), &[1, 1, 1]);
    }

    #[test]
    fn test_replay_stops_at_first_illegal_move() {
        let root = config(2, &[&[1, 2], &[2], &[1]]);
        let moves = [mv(0, 1, 1), mv(0, 0, 1), mv(0, 2, 1)];

        let err = replay(&root, &moves).unwrap_err();
        assert_eq!(err.step, 1);
        assert_eq!(err.source, MoveError::SameColumn { column: 0 });
        assert!(!verify_solution(&root, &moves));
    }

    #[test]
    fn test_empty_sequence() {
        let solved = config(2, &[&[1, 1], &[]]);
        assert!(verify_solution(&solved, &[]));

        let unsolved = config(2, &[&[1, 2], &[2, 1], &[]]);
        let result = replay(&unsolved, &[]).unwrap();
        assert!(!result.solved);
        assert_eq!(result.metrics, ReplayMetrics::default());
    }

    #[test]
    fn test_verify_solver_output() {
        let root = config(
            4,
            &[&[1, 2, 1, 2], &[3, 1, 3, 2], &[2, 3, 1, 3], &[], &[], &[]],
        );
        let iddfs = solve_iterative_deepening(&root, 120).unwrap();
        let bfs = solve_bfs(&root, 1_000_000).unwrap();

        assert!(verify_solution(&root, &iddfs));
        assert!(verify_solution(&root, &bfs));
        // A proper prefix does not finish the puzzle
        assert!(!verify_solution(&root, &bfs[..bfs.len() - 1]));
    }
}
