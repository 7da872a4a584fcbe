//! Ordered selector/transform rules.
//!
//! For each cell the rules are tried in list order and the first one whose
//! selector matches decides the cell's next state. Order is priority.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::schema::{Cell, Patch};
use crate::selector::EvalContext;

type TransformFn = dyn Fn(&Cell) -> Patch + Send + Sync;

/// Produces the next partial state of a matched cell.
#[derive(Clone)]
pub enum Transform {
    /// Always assigns the same properties.
    Set(Patch),
    /// Computes the assignment from the current cell.
    Map(Arc<TransformFn>),
}

impl Transform {
    /// Wraps a function.
    pub fn map<F>(f: F) -> Self
    where
        F: Fn(&Cell) -> Patch + Send + Sync + 'static,
    {
        Transform::Map(Arc::new(f))
    }

    /// The assignment for `cell`.
    pub fn apply(&self, cell: &Cell) -> Patch {
        match self {
            Transform::Set(patch) => patch.clone(),
            Transform::Map(f) => f(cell),
        }
    }
}

impl From<Patch> for Transform {
    fn from(patch: Patch) -> Self {
        Transform::Set(patch)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Set(patch) => f.debug_tuple("Set").field(patch).finish(),
            Transform::Map(_) => f.write_str("Map(..)"),
        }
    }
}

/// A selector name paired with a transform.
#[derive(Debug, Clone)]
pub struct Rule {
    selector: String,
    transform: Transform,
}

impl Rule {
    /// Creates a rule.
    pub fn new(selector: impl Into<String>, transform: impl Into<Transform>) -> Self {
        Self {
            selector: selector.into(),
            transform: transform.into(),
        }
    }

    /// Name of the selector that triggers this rule.
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// The transform applied on a match.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }
}

/// Ordered rule list.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule at the lowest priority.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Rules in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The first rule whose selector matches `cell`.
    pub fn first_match(&self, ctx: &EvalContext<'_>, cell: &Cell) -> Result<Option<&Rule>> {
        for rule in &self.rules {
            if ctx.select(&rule.selector, cell)? {
                return Ok(Some(rule));
            }
        }
        Ok(None)
    }

    /// Next state of `cell`, and whether a rule matched.
    ///
    /// Unmatched cells are returned unchanged.
    pub fn next_state(&self, ctx: &EvalContext<'_>, cell: &Cell) -> Result<(Cell, bool)> {
        match self.first_match(ctx, cell)? {
            Some(rule) => Ok((cell.with_patch(&rule.transform.apply(cell))?, true)),
            None => Ok((cell.clone(), false)),
        }
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}
