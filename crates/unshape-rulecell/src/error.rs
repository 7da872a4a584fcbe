//! Error types for rule-driven automata.

use crate::value::ValueType;
use thiserror::Error;

/// Error when a property value has the wrong type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("type error: expected {expected}, got {got}")]
pub struct TypeError {
    /// The type that was expected.
    pub expected: ValueType,
    /// The type that was actually provided.
    pub got: ValueType,
}

impl TypeError {
    /// Create a new type error.
    pub fn expected(expected: ValueType, got: ValueType) -> Self {
        Self { expected, got }
    }
}

/// Errors raised while building or driving a simulation.
#[derive(Debug, Error)]
pub enum RuleCellError {
    /// `update` was called with an alias that is not in the alias table.
    #[error("unknown alias: {0}")]
    UnknownAlias(String),

    /// A selector name did not resolve in the registry.
    #[error("unknown selector: {0}")]
    UnknownSelector(String),

    /// Selectors that reach themselves through `ref` never terminate.
    #[error("selector '{0}' refers to itself")]
    SelectorCycle(String),

    /// A direction token did not resolve in the direction table.
    #[error("unknown direction: {0}")]
    UnknownDirection(String),

    /// A property name is not part of the cell schema.
    #[error("unknown property: {0}")]
    UnknownProperty(String),

    /// A property was assigned a value of the wrong type.
    #[error("property '{property}': {source}")]
    PropertyType {
        /// Property name.
        property: String,
        /// Underlying type mismatch.
        #[source]
        source: TypeError,
    },

    /// The schema declares the same property twice.
    #[error("duplicate property: {0}")]
    DuplicateProperty(String),

    /// `row` and `col` are coordinates, not schema properties.
    #[error("reserved property name: {0}")]
    ReservedProperty(String),

    /// Coordinates outside the grid.
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Grid rows.
        rows: usize,
        /// Grid columns.
        cols: usize,
    },

    /// Grids need at least one row and one column.
    #[error("grid dimensions must be non-zero, got {rows}x{cols}")]
    EmptyGrid {
        /// Requested rows.
        rows: usize,
        /// Requested columns.
        cols: usize,
    },

    /// `rows x cols` cells do not fit in memory.
    #[error("grid of {rows}x{cols} cells is too large")]
    GridTooLarge {
        /// Requested rows.
        rows: usize,
        /// Requested columns.
        cols: usize,
    },

    /// `remove` was called while the simulation is running.
    #[error("cells can only be removed while editing")]
    NotEditable,

    /// Malformed JSON definition document.
    #[cfg(feature = "serde")]
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RuleCellError>;
