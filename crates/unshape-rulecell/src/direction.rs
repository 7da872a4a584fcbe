//! Relative directions and neighborhoods.
//!
//! Offsets are `(d_row, d_col)`, with rows growing downward: north is
//! `(-1, 0)`. Neighbor lookups never wrap; positions that fall outside the
//! grid are skipped.

use std::collections::HashMap;

use crate::error::{Result, RuleCellError};

/// A signed row/column offset relative to a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "(i32, i32)", into = "(i32, i32)")
)]
pub struct Offset {
    /// Row delta.
    pub d_row: i32,
    /// Column delta.
    pub d_col: i32,
}

impl Offset {
    /// Creates an offset.
    pub const fn new(d_row: i32, d_col: i32) -> Self {
        Self { d_row, d_col }
    }

    /// Applies the offset to `(row, col)`, returning `None` outside `rows x cols`.
    pub fn apply(self, row: usize, col: usize, rows: usize, cols: usize) -> Option<(usize, usize)> {
        let r = row as i64 + self.d_row as i64;
        let c = col as i64 + self.d_col as i64;
        if r < 0 || c < 0 || r >= rows as i64 || c >= cols as i64 {
            return None;
        }
        Some((r as usize, c as usize))
    }
}

impl From<(i32, i32)> for Offset {
    fn from((d_row, d_col): (i32, i32)) -> Self {
        Self::new(d_row, d_col)
    }
}

impl From<Offset> for (i32, i32) {
    fn from(o: Offset) -> Self {
        (o.d_row, o.d_col)
    }
}

// Compass offsets.
pub const NORTH: Offset = Offset::new(-1, 0);
pub const NORTH_EAST: Offset = Offset::new(-1, 1);
pub const EAST: Offset = Offset::new(0, 1);
pub const SOUTH_EAST: Offset = Offset::new(1, 1);
pub const SOUTH: Offset = Offset::new(1, 0);
pub const SOUTH_WEST: Offset = Offset::new(1, -1);
pub const WEST: Offset = Offset::new(0, -1);
pub const NORTH_WEST: Offset = Offset::new(-1, -1);

/// A set of neighbor offsets.
pub trait Neighborhood {
    /// Offsets relative to the center cell. The center itself is not included.
    fn offsets(&self) -> &[Offset];
}

/// Moore neighborhood - 8 neighbors (orthogonal + diagonal).
///
/// ```text
/// ┌───┬───┬───┐
/// │ X │ X │ X │
/// ├───┼───┼───┤
/// │ X │ · │ X │
/// ├───┼───┼───┤
/// │ X │ X │ X │
/// └───┴───┴───┘
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Moore;

impl Neighborhood for Moore {
    fn offsets(&self) -> &[Offset] {
        &[
            NORTH_WEST, NORTH, NORTH_EAST, WEST, EAST, SOUTH_WEST, SOUTH, SOUTH_EAST,
        ]
    }
}

/// Von Neumann neighborhood - 4 neighbors (orthogonal only).
#[derive(Debug, Clone, Copy, Default)]
pub struct VonNeumann;

impl Neighborhood for VonNeumann {
    fn offsets(&self) -> &[Offset] {
        &[NORTH, WEST, EAST, SOUTH]
    }
}

impl Neighborhood for [Offset] {
    fn offsets(&self) -> &[Offset] {
        self
    }
}

impl Neighborhood for Vec<Offset> {
    fn offsets(&self) -> &[Offset] {
        self
    }
}

/// Maps direction tokens to offsets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectionTable {
    offsets: HashMap<String, Offset>,
}

impl DirectionTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The eight compass tokens: `N NE E SE S SW W NW`.
    pub fn compass() -> Self {
        [
            ("N", NORTH),
            ("NE", NORTH_EAST),
            ("E", EAST),
            ("SE", SOUTH_EAST),
            ("S", SOUTH),
            ("SW", SOUTH_WEST),
            ("W", WEST),
            ("NW", NORTH_WEST),
        ]
        .into_iter()
        .collect()
    }

    /// Adds or replaces a token.
    pub fn insert(&mut self, token: impl Into<String>, offset: Offset) {
        self.offsets.insert(token.into(), offset);
    }

    /// Looks up a single token.
    pub fn get(&self, token: &str) -> Result<Offset> {
        self.offsets
            .get(token)
            .copied()
            .ok_or_else(|| RuleCellError::UnknownDirection(token.to_string()))
    }

    /// Resolves a list of tokens, in order.
    pub fn resolve<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Vec<Offset>> {
        tokens.iter().map(|t| self.get(t.as_ref())).collect()
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Returns true if no tokens are defined.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Offset)> for DirectionTable {
    fn from_iter<I: IntoIterator<Item = (S, Offset)>>(iter: I) -> Self {
        Self {
            offsets: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
