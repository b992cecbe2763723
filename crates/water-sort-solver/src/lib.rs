//! Solver library for water-sort colour stacking puzzles.
//!
//! Tokens of several colours sit in fixed-capacity columns. A move pours the
//! run of same-coloured tokens on top of one column onto another column that
//! is empty or shows the same colour on top. This crate finds move sequences
//! that leave every column empty or full of a single colour, using either a
//! bounded iterative deepening search or a bounded breadth-first search.

pub mod executor;
pub mod moves;
pub mod pruning;
pub mod puzzle;
pub mod solver;

#[cfg(test)]
mod testing;

// Re-export main types
pub use executor::{replay, verify_solution, ReplayError, ReplayMetrics, ReplayResult};
pub use moves::{Move, MoveError, MoveGeneration, MoveList};
pub use puzzle::{
    is_uniform_full, CanonicalKey, ColorId, Column, Configuration, PuzzleError, PuzzleFile,
};
pub use solver::{
    solve, solve_bfs, solve_iterative_deepening, SearchStatus, SolverConfig, SolverResult,
    Strategy,
};
