//! Bounded search engines.
//!
//! Two interchangeable strategies share the state model:
//!
//! - Iterative deepening DFS with heuristic move ordering. Each depth limit
//!   runs a fresh depth-first search with its own visited set, so a state
//!   rejected under a shallow limit can be explored again under a deeper
//!   one.
//! - Breadth-first search with one visited set for the whole call, capped by
//!   a number of frontier expansions. Returns a shortest path in the
//!   explored move graph.
//!
//! Neither engine can prove a puzzle unsolvable in general. Running out of
//! budget is a normal outcome reported through [`SearchStatus`].

use std::collections::{HashSet, VecDeque};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::moves::{Move, MoveGeneration};
use crate::pruning::order_moves;
use crate::puzzle::{CanonicalKey, Configuration};

/// Search engine selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Iterative deepening depth-first search
    #[default]
    Iddfs,
    /// Breadth-first search
    Bfs,
}

/// Configuration for the solver
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Which engine to run
    pub strategy: Strategy,
    /// Deepest limit tried by iterative deepening
    pub max_depth: usize,
    /// Maximum frontier expansions for breadth-first search
    pub max_iterations: usize,
    /// Moves emitted per (source, destination) pair
    pub move_generation: MoveGeneration,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Iddfs,
            max_depth: 120,
            max_iterations: 1_000_000,
            move_generation: MoveGeneration::MaximalBlock,
        }
    }
}

/// How a search ended
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "camelCase")]
pub enum SearchStatus {
    /// A solution was found
    #[display("solved")]
    Solved,
    /// The depth or iteration budget ran out first
    #[display("budget exhausted")]
    BudgetExhausted,
    /// Breadth-first search visited every reachable state without success.
    /// Only holds for the configured move generation mode.
    #[display("frontier exhausted")]
    FrontierExhausted,
}

/// Result of the solver search
#[derive(Debug, Clone)]
pub struct SolverResult {
    pub status: SearchStatus,
    /// Moves to apply in order; empty if the root was already solved
    pub solution: Option<Vec<Move>>,
    /// Number of states taken off the stack or queue and examined
    pub nodes_expanded: usize,
    /// IDDFS: last depth limit tried. BFS: longest path expanded.
    pub depth_reached: usize,
    /// Time elapsed in milliseconds
    pub time_elapsed_ms: u64,
}

impl SolverResult {
    fn finish(
        status: SearchStatus,
        solution: Option<Vec<Move>>,
        nodes_expanded: usize,
        depth_reached: usize,
        start_time: Instant,
    ) -> Self {
        Self {
            status,
            solution,
            nodes_expanded,
            depth_reached,
            time_elapsed_ms: start_time.elapsed().as_millis() as u64,
        }
    }
}

/// Run the engine selected by `config.strategy`
pub fn solve(root: &Configuration, config: &SolverConfig) -> SolverResult {
    match config.strategy {
        Strategy::Iddfs => iterative_deepening(root, config.max_depth, config.move_generation),
        Strategy::Bfs => breadth_first(root, config.max_iterations, config.move_generation),
    }
}

/// Iterative deepening search up to `max_depth` moves.
///
/// Returns `None` when no solution was found within the depth budget. This
/// does not prove the puzzle unsolvable.
pub fn solve_iterative_deepening(root: &Configuration, max_depth: usize) -> Option<Vec<Move>> {
    iterative_deepening(root, max_depth, MoveGeneration::default()).solution
}

/// Breadth-first search expanding at most `max_iterations` states.
///
/// Any solution returned is of minimal length among the states explored.
pub fn solve_bfs(root: &Configuration, max_iterations: usize) -> Option<Vec<Move>> {
    breadth_first(root, max_iterations, MoveGeneration::default()).solution
}

/// One depth-bounded pass of iterative deepening
struct DepthFirstSearch {
    generation: MoveGeneration,
    visited: HashSet<CanonicalKey>,
    path: Vec<Move>,
    nodes_expanded: usize,
}

impl DepthFirstSearch {
    fn new(generation: MoveGeneration) -> Self {
        Self {
            generation,
            visited: HashSet::new(),
            path: Vec::new(),
            nodes_expanded: 0,
        }
    }

    /// Forget the states seen under the previous depth limit
    fn reset(&mut self) {
        self.visited.clear();
        self.path.clear();
    }

    /// Returns true with `self.path` holding the solution if one was found
    fn search(&mut self, state: &Configuration, depth: usize, last_move: Option<Move>) -> bool {
        if !self.visited.insert(state.canonical_key()) {
            return false;
        }
        self.nodes_expanded += 1;

        if state.is_solved() {
            return true;
        }
        if depth == 0 {
            return false;
        }

        let moves = state.legal_moves(last_move, self.generation);
        for candidate in order_moves(state, moves) {
            self.path.push(candidate.step);
            if self.search(&candidate.child, depth - 1, Some(candidate.step)) {
                return true;
            }
            self.path.pop();
        }
        false
    }
}

fn iterative_deepening(
    root: &Configuration,
    max_depth: usize,
    generation: MoveGeneration,
) -> SolverResult {
    let start_time = Instant::now();
    let mut search = DepthFirstSearch::new(generation);

    for limit in 0..=max_depth {
        search.reset();
        if search.search(root, limit, None) {
            log::debug!(
                "iddfs: solved at depth limit {limit} with {} moves ({} nodes)",
                search.path.len(),
                search.nodes_expanded
            );
            return SolverResult::finish(
                SearchStatus::Solved,
                Some(search.path),
                search.nodes_expanded,
                limit,
                start_time,
            );
        }
        log::trace!(
            "iddfs: depth limit {limit} exhausted ({} states this pass)",
            search.visited.len()
        );
    }

    log::debug!(
        "iddfs: no solution within depth {max_depth} ({} nodes)",
        search.nodes_expanded
    );
    SolverResult::finish(
        SearchStatus::BudgetExhausted,
        None,
        search.nodes_expanded,
        max_depth,
        start_time,
    )
}

fn breadth_first(
    root: &Configuration,
    max_iterations: usize,
    generation: MoveGeneration,
) -> SolverResult {
    let start_time = Instant::now();

    if root.is_solved() {
        return SolverResult::finish(SearchStatus::Solved, Some(Vec::new()), 0, 0, start_time);
    }

    let mut visited: HashSet<CanonicalKey> = HashSet::new();
    visited.insert(root.canonical_key());

    let mut frontier: VecDeque<(Configuration, Vec<Move>)> = VecDeque::new();
    frontier.push_back((root.clone(), Vec::new()));

    let mut iterations = 0;
    let mut depth_reached = 0;

    while iterations < max_iterations {
        let Some((state, path)) = frontier.pop_front() else {
            break;
        };
        iterations += 1;
        depth_reached = depth_reached.max(path.len());

        // No reversal pruning here: the global visited set already covers it
        for step in state.legal_moves(None, generation) {
            let child = state.apply_legal(step);
            if !visited.insert(child.canonical_key()) {
                continue;
            }

            let mut child_path = path.clone();
            child_path.push(step);

            if child.is_solved() {
                log::debug!(
                    "bfs: solved with {} moves after {iterations} expansions",
                    child_path.len()
                );
                return SolverResult::finish(
                    SearchStatus::Solved,
                    Some(child_path),
                    iterations,
                    depth_reached,
                    start_time,
                );
            }
            frontier.push_back((child, child_path));
        }
    }

    let status = if frontier.is_empty() {
        SearchStatus::FrontierExhausted
    } else {
        SearchStatus::BudgetExhausted
    };
    log::debug!(
        "bfs: {status} after {iterations} expansions ({} states seen)",
        visited.len()
    );
    SolverResult::finish(status, None, iterations, depth_reached, start_time)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::{prop_assert, proptest, ProptestConfig, Strategy as _};

    use super::*;
    use crate::testing::{arb_configuration_with_capacity, config, play};

    fn sample() -> Configuration {
        config(
            4,
            &[&[1, 2, 1, 2], &[3, 1, 3, 2], &[2, 3, 1, 3], &[], &[], &[]],
        )
    }

    #[test]
    fn test_iddfs_solves_sample() {
        let root = sample();
        let solution = solve_iterative_deepening(&root, 120).unwrap();

        assert!(!solution.is_empty());
        assert!(play(&root, &solution).is_solved());
    }

    #[test]
    fn test_bfs_solves_sample_with_shortest_path() {
        let root = sample();
        let solution = solve_bfs(&root, 1_000_000).unwrap();

        assert_eq!(solution.len(), 10);
        assert!(play(&root, &solution).is_solved());

        let iddfs = solve_iterative_deepening(&root, 120).unwrap();
        assert!(solution.len() <= iddfs.len());
    }

    #[test]
    fn test_iddfs_is_deterministic() {
        let root = sample();
        let first = solve_iterative_deepening(&root, 120);
        let second = solve_iterative_deepening(&root, 120);
        assert_eq!(first, second);
    }

    #[test]
    fn test_already_solved_returns_empty_path() {
        let root = config(4, &[&[1, 1, 1, 1], &[], &[], &[]]);
        assert!(root.is_solved());

        assert_eq!(solve_iterative_deepening(&root, 10), Some(vec![]));
        assert_eq!(solve_bfs(&root, 10), Some(vec![]));
        assert_eq!(solve_iterative_deepening(&root, 0), Some(vec![]));
        assert_eq!(solve_bfs(&root, 0), Some(vec![]));
    }

    #[test]
    fn test_no_legal_moves_reports_no_solution() {
        let root = config(2, &[&[1, 2], &[2, 1]]);

        assert_eq!(solve_iterative_deepening(&root, 20), None);
        assert_eq!(solve_bfs(&root, 1000), None);

        let result = solve(
            &root,
            &SolverConfig {
                strategy: Strategy::Bfs,
                ..Default::default()
            },
        );
        assert!(result.status.is_frontier_exhausted());
        assert_eq!(result.nodes_expanded, 1);
    }

    #[test]
    fn test_iddfs_budget_exhausted() {
        let result = solve(
            &sample(),
            &SolverConfig {
                max_depth: 5,
                ..Default::default()
            },
        );
        assert!(result.status.is_budget_exhausted());
        assert!(result.solution.is_none());
        assert_eq!(result.depth_reached, 5);
    }

    #[test]
    fn test_bfs_budget_exhausted() {
        let result = solve(
            &sample(),
            &SolverConfig {
                strategy: Strategy::Bfs,
                max_iterations: 3,
                ..Default::default()
            },
        );
        assert!(result.status.is_budget_exhausted());
        assert!(result.solution.is_none());
        assert_eq!(result.nodes_expanded, 3);
    }

    #[test]
    fn test_single_move_puzzle() {
        let root = config(3, &[&[1, 1], &[1], &[]]);
        // Both 0->1 and 1->0 complete a column; generation order breaks the tie
        let expected = vec![Move {
            from: 0,
            to: 1,
            count: 2,
        }];

        assert_eq!(solve_iterative_deepening(&root, 5), Some(expected.clone()));
        assert_eq!(solve_bfs(&root, 100), Some(expected));
    }

    #[test]
    fn test_every_count_generation_solves_sample() {
        let root = sample();
        for strategy in [Strategy::Iddfs, Strategy::Bfs] {
            let result = solve(
                &root,
                &SolverConfig {
                    strategy,
                    max_depth: 30,
                    move_generation: MoveGeneration::EveryCount,
                    ..Default::default()
                },
            );
            assert!(result.status.is_solved(), "{strategy:?} failed");
            let solution = result.solution.unwrap();
            assert!(play(&root, &solution).is_solved());
        }
    }

    #[test]
    fn test_unsolvable_board_exhausts_bfs_frontier() {
        // Three tokens of colour 1 can never fill a column of four
        let root = config(4, &[&[1, 2, 2, 2], &[2, 1, 1], &[]]);
        let result = solve(
            &root,
            &SolverConfig {
                strategy: Strategy::Bfs,
                ..Default::default()
            },
        );
        assert!(result.status.is_frontier_exhausted());
        assert!(solve_iterative_deepening(&root, 12).is_none());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_solutions_replay_and_bfs_is_no_longer(
            root in (2usize..=3).prop_flat_map(arb_configuration_with_capacity),
        ) {
            let iddfs = solve_iterative_deepening(&root, 10);
            let bfs = solve_bfs(&root, 100_000);

            if let Some(moves) = &iddfs {
                prop_assert!(play(&root, moves).is_solved());
            }
            if let Some(moves) = &bfs {
                prop_assert!(play(&root, moves).is_solved());
            }
            if let (Some(iddfs), Some(bfs)) = (&iddfs, &bfs) {
                prop_assert!(bfs.len() <= iddfs.len());
            }
            // BFS over the full move graph finds whatever IDDFS finds
            if iddfs.is_some() {
                prop_assert!(bfs.is_some());
            }
        }
    }
}
