//! Moves, the legality predicate, and move application.
//!
//! `legal_moves` and `apply_move` share one predicate,
//! [`Configuration::transfer_limit`], so a move is accepted by `apply_move`
//! exactly when the generator could have produced it.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::pruning::is_immediate_reversal;
use crate::puzzle::{is_uniform_full, top_run, Column, Configuration};

/// Transfer of `count` tokens from the top of `from` onto `to`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: usize,
    pub to: usize,
    pub count: usize,
}

/// Moves generated for one configuration
pub type MoveList = SmallVec<[Move; 16]>;

/// How many moves are emitted per ordered (source, destination) pair.
///
/// Both engines use the same mode for a given solve; mixing them would
/// change the state space each explores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveGeneration {
    /// Only the maximal transferable block
    #[default]
    MaximalBlock,
    /// Every count from 1 up to the maximal block
    EveryCount,
}

/// Reasons a move cannot be applied to a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MoveError {
    #[display("column {index} does not exist (there are {columns} columns)")]
    ColumnOutOfRange { index: usize, columns: usize },
    #[display("cannot move column {column} onto itself")]
    SameColumn { column: usize },
    #[display("source column {column} is empty")]
    EmptySource { column: usize },
    #[display("source column {column} is already complete")]
    SettledSource { column: usize },
    #[display("destination column {column} is full")]
    DestinationFull { column: usize },
    #[display("top of column {from} does not match top of column {to}")]
    ColorMismatch { from: usize, to: usize },
    #[display("cannot move {count} tokens from column {from} to column {to} (limit {limit})")]
    InvalidCount {
        from: usize,
        to: usize,
        count: usize,
        limit: usize,
    },
}

impl Configuration {
    /// Largest number of tokens that may move from `from` to `to`.
    ///
    /// This is the legality predicate: the source must be non-empty and not
    /// uniform-full, the destination must have room and a matching top (or
    /// be empty). The limit is the top run of the source, capped by the
    /// destination's free space, and is always at least 1 on success.
    pub fn transfer_limit(&self, from: usize, to: usize) -> Result<usize, MoveError> {
        let columns = self.num_columns();
        for index in [from, to] {
            if index >= columns {
                return Err(MoveError::ColumnOutOfRange { index, columns });
            }
        }
        if from == to {
            return Err(MoveError::SameColumn { column: from });
        }

        let capacity = self.capacity();
        let source = self.column(from);
        let Some((top, run)) = top_run(source) else {
            return Err(MoveError::EmptySource { column: from });
        };
        if is_uniform_full(source, capacity) {
            return Err(MoveError::SettledSource { column: from });
        }

        let dest = self.column(to);
        if dest.len() >= capacity {
            return Err(MoveError::DestinationFull { column: to });
        }
        if dest.last().is_some_and(|&color| color != top) {
            return Err(MoveError::ColorMismatch { from, to });
        }

        Ok(run.min(capacity - dest.len()))
    }

    /// Enumerate legal moves, source-major then destination order.
    ///
    /// `last_move` enables anti-oscillation pruning: a move that would
    /// immediately undo the previous transfer between the same pair of
    /// columns is skipped.
    pub fn legal_moves(&self, last_move: Option<Move>, generation: MoveGeneration) -> MoveList {
        let mut moves = MoveList::new();
        let columns = self.num_columns();

        for from in 0..columns {
            for to in 0..columns {
                let Ok(limit) = self.transfer_limit(from, to) else {
                    continue;
                };
                if is_immediate_reversal(self, from, to, last_move) {
                    continue;
                }
                match generation {
                    MoveGeneration::MaximalBlock => moves.push(Move {
                        from,
                        to,
                        count: limit,
                    }),
                    MoveGeneration::EveryCount => {
                        moves.extend((1..=limit).map(|count| Move { from, to, count }));
                    }
                }
            }
        }

        moves
    }

    /// Apply a move, producing a new configuration.
    ///
    /// The move is checked against the same predicate `legal_moves` uses.
    /// An illegal move is rejected as a whole; nothing is partially moved.
    pub fn apply_move(&self, step: Move) -> Result<Configuration, MoveError> {
        let limit = self.transfer_limit(step.from, step.to)?;
        if step.count == 0 || step.count > limit {
            return Err(MoveError::InvalidCount {
                from: step.from,
                to: step.to,
                count: step.count,
                limit,
            });
        }
        Ok(self.apply_legal(step))
    }

    /// Apply a move produced by `legal_moves` on this configuration
    pub(crate) fn apply_legal(&self, step: Move) -> Configuration {
        debug_assert!(self
            .transfer_limit(step.from, step.to)
            .is_ok_and(|limit| (1..=limit).contains(&step.count)));

        let mut columns = self.columns().to_vec();
        let split = columns[step.from].len() - step.count;
        let block: Column = columns[step.from].drain(split..).collect();
        columns[step.to].extend(block);
        Configuration::from_columns(self.capacity(), columns)
    }
}
