//! Aliases: stamped property sets and display labels.
//!
//! Two different things share the name:
//!
//! - [`AliasTable`] maps a name to a [`Patch`]. `Simulation::update` stamps a
//!   cell with the default state plus that patch.
//! - [`DisplayAliases`] is an ordered list of `(label, selector)` used to
//!   derive a label from a cell's current state. Nothing is stored.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, RuleCellError};
use crate::schema::{Cell, CellSchema, Patch};
use crate::selector::{EvalContext, Selector};

/// Named property overrides used to stamp cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    aliases: HashMap<String, Patch>,
}

impl AliasTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an alias.
    pub fn insert(&mut self, name: impl Into<String>, overrides: Patch) {
        self.aliases.insert(name.into(), overrides);
    }

    /// Overrides for `name`, or [`RuleCellError::UnknownAlias`].
    pub fn get(&self, name: &str) -> Result<&Patch> {
        self.aliases
            .get(name)
            .ok_or_else(|| RuleCellError::UnknownAlias(name.to_string()))
    }

    /// Checks if an alias exists.
    pub fn contains(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    /// Number of aliases.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Checks every alias against `schema`.
    pub fn validate(&self, schema: &CellSchema) -> Result<()> {
        self.aliases.values().try_for_each(|patch| schema.check(patch))
    }
}

/// One display label and the predicate that selects it.
#[derive(Debug, Clone)]
pub struct DisplayAlias {
    /// Label shown for matching cells.
    pub name: Arc<str>,
    /// Predicate over the cell's current state.
    pub selector: Selector,
}

/// Ordered display labels. Earlier entries win.
#[derive(Debug, Clone, Default)]
pub struct DisplayAliases {
    entries: Vec<DisplayAlias>,
}

impl DisplayAliases {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a label at the lowest priority.
    pub fn push(&mut self, name: impl Into<Arc<str>>, selector: Selector) {
        self.entries.push(DisplayAlias {
            name: name.into(),
            selector,
        });
    }

    /// Entries in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &DisplayAlias> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Label of the first entry whose selector matches `cell`, if any.
    pub fn resolve(&self, ctx: &EvalContext<'_>, cell: &Cell) -> Result<Option<Arc<str>>> {
        for entry in &self.entries {
            if entry.selector.eval(ctx, cell)? {
                return Ok(Some(entry.name.clone()));
            }
        }
        Ok(None)
    }
}
