//! Puzzle state representation.
//!
//! A [`Configuration`] is an ordered list of columns of colour ids, read
//! bottom to top, together with the capacity shared by every column. Values
//! are never mutated once built: applying a move produces a new
//! configuration, so search branches can share them and visited sets can
//! rely on structural equality.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Colour identifier. Opaque to the solver; `0` is reserved.
pub type ColorId = u8;

/// The reserved "not a colour" id. Never stored in a column.
pub const RESERVED_COLOR: ColorId = 0;

/// A single column, bottom to top
pub type Column = SmallVec<[ColorId; 8]>;

/// Errors raised while building a configuration from caller input
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PuzzleError {
    #[display("column capacity must be at least 1")]
    ZeroCapacity,
    #[display("column {column} holds {len} tokens but capacity is {capacity}")]
    ColumnOverCapacity {
        column: usize,
        len: usize,
        capacity: usize,
    },
    #[display("column {column} contains reserved colour 0 at position {position}")]
    ReservedColor { column: usize, position: usize },
}

/// True iff the column is exactly at capacity and holds a single colour.
///
/// An empty column is never uniform-full.
pub fn is_uniform_full(column: &[ColorId], capacity: usize) -> bool {
    column.len() == capacity && is_single_color(column)
}

/// True iff the column is non-empty and every token has the same colour
pub fn is_single_color(column: &[ColorId]) -> bool {
    column
        .first()
        .is_some_and(|&first| column.iter().all(|&color| color == first))
}

/// Top colour of the column and the length of the run of that colour
/// sitting contiguously on top.
pub fn top_run(column: &[ColorId]) -> Option<(ColorId, usize)> {
    let &top = column.last()?;
    let run = column.iter().rev().take_while(|&&color| color == top).count();
    Some((top, run))
}

/// Exact, order-sensitive encoding of a configuration.
///
/// The capacity comes first as a fixed-width prefix, then each column
/// contributes its tokens followed by [`RESERVED_COLOR`] as a separator.
/// Since the separator never occurs inside a column the encoding is
/// injective, so equality of keys is equality of configurations. Hashing
/// only speeds up set lookups; membership is decided by comparing the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalKey(Box<[u8]>);

/// A puzzle configuration: columns plus their common capacity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Configuration {
    columns: Vec<Column>,
    capacity: usize,
}

impl Configuration {
    /// Build a configuration, rejecting malformed input.
    ///
    /// Fails if the capacity is zero, if any column is longer than the
    /// capacity, or if any token is the reserved colour `0`.
    pub fn new(capacity: usize, columns: Vec<Vec<ColorId>>) -> Result<Self, PuzzleError> {
        if capacity == 0 {
            return Err(PuzzleError::ZeroCapacity);
        }

        for (index, column) in columns.iter().enumerate() {
            if column.len() > capacity {
                return Err(PuzzleError::ColumnOverCapacity {
                    column: index,
                    len: column.len(),
                    capacity,
                });
            }
            if let Some(position) = column.iter().position(|&color| color == RESERVED_COLOR) {
                return Err(PuzzleError::ReservedColor {
                    column: index,
                    position,
                });
            }
        }

        Ok(Self {
            columns: columns.into_iter().map(Column::from_vec).collect(),
            capacity,
        })
    }

    /// Build from columns that are already known to be valid
    pub(crate) fn from_columns(capacity: usize, columns: Vec<Column>) -> Self {
        Self { columns, capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get a column by index. Panics if out of range.
    pub fn column(&self, index: usize) -> &[ColorId] {
        &self.columns[index]
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Total number of tokens across all columns
    pub fn token_count(&self) -> usize {
        self.columns.iter().map(|column| column.len()).sum()
    }

    /// Number of tokens of each colour present
    pub fn color_counts(&self) -> BTreeMap<ColorId, usize> {
        let mut counts = BTreeMap::new();
        for &color in self.columns.iter().flatten() {
            *counts.entry(color).or_insert(0) += 1;
        }
        counts
    }

    /// True iff every column is empty or uniform-full
    pub fn is_solved(&self) -> bool {
        self.columns
            .iter()
            .all(|column| column.is_empty() || is_uniform_full(column, self.capacity))
    }

    pub fn canonical_key(&self) -> CanonicalKey {
        let prefix = self.capacity.to_le_bytes();
        let mut bytes =
            Vec::with_capacity(prefix.len() + self.token_count() + self.columns.len());
        bytes.extend_from_slice(&prefix);
        for column in &self.columns {
            bytes.extend_from_slice(column);
            bytes.push(RESERVED_COLOR);
        }
        CanonicalKey(bytes.into_boxed_slice())
    }

    /// Plain nested vectors, for serialization
    pub fn to_vecs(&self) -> Vec<Vec<ColorId>> {
        self.columns.iter().map(|column| column.to_vec()).collect()
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.columns.len().to_string().len();
        for (index, column) in self.columns.iter().enumerate() {
            write!(f, "{:>width$} |", index + 1)?;
            for slot in 0..self.capacity {
                match column.get(slot) {
                    Some(color) => write!(f, " {color}")?,
                    None => write!(f, " .")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// On-disk puzzle description
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub capacity: usize,
    pub columns: Vec<Vec<ColorId>>,
}

impl PuzzleFile {
    /// Validate and convert into a [`Configuration`]
    pub fn into_configuration(self) -> Result<Configuration, PuzzleError> {
        Configuration::new(self.capacity, self.columns)
    }

    /// Describe an existing configuration, without id or title
    pub fn from_configuration(configuration: &Configuration) -> Self {
        Self {
            id: None,
            title: None,
            capacity: configuration.capacity(),
            columns: configuration.to_vecs(),
        }
    }

    /// Three mixed columns of three colours and three empty columns
    pub fn sample() -> Self {
        Self {
            id: Some("sample".to_string()),
            title: Some("Sample board".to_string()),
            capacity: 4,
            columns: vec![
                vec![1, 2, 1, 2],
                vec![3, 1, 3, 2],
                vec![2, 3, 1, 3],
                vec![],
                vec![],
                vec![],
            ],
        }
    }
}
