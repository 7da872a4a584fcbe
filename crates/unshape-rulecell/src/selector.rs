//! Named cell predicates and the context they are evaluated in.
//!
//! A [`Selector`] is a predicate over a cell. It is always evaluated with an
//! [`EvalContext`], which gives access to the current grid, the selector
//! registry (so selectors can call each other by name) and the direction
//! table. Nothing is looked up globally.
//!
//! ```
//! use std::sync::Arc;
//! use unshape_rulecell::{Cell, CellSchema, DirectionTable, EvalContext, Grid, Moore, Neighborhood};
//! use unshape_rulecell::{Selector, SelectorRegistry};
//!
//! let schema = Arc::new(CellSchema::new().with("alive", false).unwrap());
//! let grid = Grid::build(3, 3, &Cell::default_for(schema));
//!
//! let mut registry = SelectorRegistry::new();
//! registry.insert("alive", Selector::property_eq("alive", true));
//! registry.insert(
//!     "lonely",
//!     Selector::from_fn(|ctx, cell| Ok(ctx.count(Moore.offsets(), "alive", cell)? < 2)),
//! );
//!
//! let directions = DirectionTable::compass();
//! let ctx = EvalContext::new(&grid, &registry, &directions);
//! assert!(ctx.select("lonely", grid.get(1, 1)).unwrap());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::direction::{DirectionTable, Offset};
use crate::error::{Result, RuleCellError};
use crate::grid::Grid;
use crate::schema::Cell;
use crate::value::Value;

type SelectorFn = dyn Fn(&EvalContext<'_>, &Cell) -> Result<bool> + Send + Sync;

/// A cell predicate.
///
/// Selectors must be pure: the engine may evaluate the same selector on the
/// same cell several times within one step.
#[derive(Clone)]
pub struct Selector {
    func: Arc<SelectorFn>,
}

impl Selector {
    /// Wraps an arbitrary predicate.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&EvalContext<'_>, &Cell) -> Result<bool> + Send + Sync + 'static,
    {
        Self { func: Arc::new(f) }
    }

    /// Matches every cell.
    pub fn always() -> Self {
        Self::from_fn(|_, _| Ok(true))
    }

    /// Matches cells whose property `name` equals `value`.
    pub fn property_eq(name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        Self::from_fn(move |_, cell| {
            let current = cell
                .get(&name)
                .ok_or_else(|| RuleCellError::UnknownProperty(name.clone()))?;
            Ok(*current == value)
        })
    }

    /// Defers to the registry entry called `name`.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::from_fn(move |ctx, cell| ctx.select(&name, cell))
    }

    /// Negation.
    pub fn not(inner: Selector) -> Self {
        Self::from_fn(move |ctx, cell| Ok(!inner.eval(ctx, cell)?))
    }

    /// Matches when every selector matches. Short-circuits left to right.
    pub fn all(selectors: Vec<Selector>) -> Self {
        Self::from_fn(move |ctx, cell| {
            for s in &selectors {
                if !s.eval(ctx, cell)? {
                    return Ok(false);
                }
            }
            Ok(true)
        })
    }

    /// Matches when any selector matches. Short-circuits left to right.
    pub fn any(selectors: Vec<Selector>) -> Self {
        Self::from_fn(move |ctx, cell| {
            for s in &selectors {
                if s.eval(ctx, cell)? {
                    return Ok(true);
                }
            }
            Ok(false)
        })
    }

    /// Matches when the number of `offsets` neighbors satisfying `of` is in `counts`.
    pub fn count_in(offsets: Vec<Offset>, of: Selector, counts: Vec<usize>) -> Self {
        Self::from_fn(move |ctx, cell| {
            let n = ctx.matchcount(&offsets, &of, cell)?;
            Ok(counts.contains(&n))
        })
    }

    /// Evaluates the predicate.
    pub fn eval(&self, ctx: &EvalContext<'_>, cell: &Cell) -> Result<bool> {
        (self.func)(ctx, cell)
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector").finish_non_exhaustive()
    }
}

/// Selectors by name.
#[derive(Debug, Clone, Default)]
pub struct SelectorRegistry {
    selectors: HashMap<String, Selector>,
}

impl SelectorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a selector, replacing any previous one with the same name.
    pub fn insert(&mut self, name: impl Into<String>, selector: Selector) {
        self.selectors.insert(name.into(), selector);
    }

    /// Looks up a selector.
    pub fn get(&self, name: &str) -> Result<&Selector> {
        self.selectors
            .get(name)
            .ok_or_else(|| RuleCellError::UnknownSelector(name.to_string()))
    }

    /// Checks if a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.selectors.contains_key(name)
    }

    /// Registered names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.selectors.keys().map(String::as_str)
    }

    /// Number of registered selectors.
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

/// Everything a selector can see: the grid being read, the registry and the
/// direction table.
///
/// During a step the grid is always the previous generation.
#[derive(Clone, Copy)]
pub struct EvalContext<'a> {
    grid: &'a Grid,
    selectors: &'a SelectorRegistry,
    directions: &'a DirectionTable,
}

impl<'a> EvalContext<'a> {
    /// Creates a context over `grid`.
    pub fn new(
        grid: &'a Grid,
        selectors: &'a SelectorRegistry,
        directions: &'a DirectionTable,
    ) -> Self {
        Self {
            grid,
            selectors,
            directions,
        }
    }

    /// The grid being read.
    pub fn grid(&self) -> &'a Grid {
        self.grid
    }

    /// The selector registry.
    pub fn selectors(&self) -> &'a SelectorRegistry {
        self.selectors
    }

    /// The direction table.
    pub fn directions(&self) -> &'a DirectionTable {
        self.directions
    }

    /// Resolves `name` in the registry and evaluates it on `cell`.
    pub fn select(&self, name: &str, cell: &Cell) -> Result<bool> {
        self.selectors.get(name)?.eval(self, cell)
    }

    /// Counts neighbors of `cell` at `offsets` that satisfy `selector`.
    ///
    /// Offsets landing outside the grid are skipped; they never count and are
    /// never an error.
    pub fn matchcount(&self, offsets: &[Offset], selector: &Selector, cell: &Cell) -> Result<usize> {
        let mut count = 0;
        for &offset in offsets {
            if let Some(neighbor) = self.grid.neighbor(cell, offset) {
                if selector.eval(self, neighbor)? {
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    /// [`matchcount`](Self::matchcount) with the selector looked up by name.
    pub fn count(&self, offsets: &[Offset], selector: &str, cell: &Cell) -> Result<usize> {
        let selector = self.selectors.get(selector)?;
        self.matchcount(offsets, selector, cell)
    }

    /// [`matchcount`](Self::matchcount) with direction tokens and a selector name.
    pub fn count_dirs<S: AsRef<str>>(&self, tokens: &[S], selector: &str, cell: &Cell) -> Result<usize> {
        let offsets = self.directions.resolve(tokens)?;
        self.count(&offsets, selector, cell)
    }
}
