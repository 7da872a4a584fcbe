//! Immutable simulation configuration.
//!
//! A [`SimulationConfig`] bundles everything a simulation needs from its
//! definition source: dimensions, cell schema, selectors, stamp aliases,
//! display aliases, rules and directions. It is validated once, when built.

use std::sync::Arc;

use crate::alias::{AliasTable, DisplayAliases};
use crate::direction::DirectionTable;
use crate::error::{Result, RuleCellError};
use crate::rule::{Rule, RuleSet, Transform};
use crate::schema::{Cell, CellSchema, Patch};
use crate::selector::{Selector, SelectorRegistry};

/// Rows used when a definition does not specify any.
pub const DEFAULT_ROWS: usize = 20;
/// Columns used when a definition does not specify any.
pub const DEFAULT_COLS: usize = 80;

/// Grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "PascalCase"))]
pub struct Meta {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
        }
    }
}

/// Everything a [`Simulation`](crate::Simulation) is built from.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    meta: Meta,
    schema: Arc<CellSchema>,
    selectors: SelectorRegistry,
    aliases: AliasTable,
    display: DisplayAliases,
    rules: RuleSet,
    directions: DirectionTable,
}

impl SimulationConfig {
    /// Starts a configuration for cells shaped by `schema`.
    pub fn builder(schema: CellSchema) -> SimulationConfigBuilder {
        SimulationConfigBuilder {
            meta: Meta::default(),
            schema,
            selectors: SelectorRegistry::new(),
            aliases: AliasTable::new(),
            display: Vec::new(),
            rules: Vec::new(),
            directions: DirectionTable::compass(),
        }
    }

    /// Grid dimensions.
    pub fn meta(&self) -> Meta {
        self.meta
    }

    /// Cell schema.
    pub fn schema(&self) -> &Arc<CellSchema> {
        &self.schema
    }

    /// Selector registry.
    pub fn selectors(&self) -> &SelectorRegistry {
        &self.selectors
    }

    /// Stamp aliases.
    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Display aliases.
    pub fn display(&self) -> &DisplayAliases {
        &self.display
    }

    /// Rules in priority order.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Direction table.
    pub fn directions(&self) -> &DirectionTable {
        &self.directions
    }
}

/// Builder for [`SimulationConfig`].
///
/// ```
/// use unshape_rulecell::{CellSchema, Patch, Selector, SimulationConfig};
///
/// let schema = CellSchema::new().with("alive", false).unwrap();
/// let config = SimulationConfig::builder(schema)
///     .with_dimensions(10, 10)
///     .selector("alive", Selector::property_eq("alive", true))
///     .alias("alive", Patch::new().set("alive", true))
///     .display_alias("#", "alive")
///     .rule("alive", Patch::new().set("alive", false))
///     .build()
///     .unwrap();
/// assert_eq!(config.meta().rows, 10);
/// ```
#[derive(Debug)]
pub struct SimulationConfigBuilder {
    meta: Meta,
    schema: CellSchema,
    selectors: SelectorRegistry,
    aliases: AliasTable,
    display: Vec<(String, String)>,
    rules: Vec<Rule>,
    directions: DirectionTable,
}

impl SimulationConfigBuilder {
    /// Sets the grid dimensions. Defaults to [`DEFAULT_ROWS`] x [`DEFAULT_COLS`].
    pub fn with_dimensions(mut self, rows: usize, cols: usize) -> Self {
        self.meta = Meta { rows, cols };
        self
    }

    /// Replaces the direction table. Defaults to [`DirectionTable::compass`].
    pub fn with_directions(mut self, directions: DirectionTable) -> Self {
        self.directions = directions;
        self
    }

    /// Registers a named selector.
    pub fn selector(mut self, name: impl Into<String>, selector: Selector) -> Self {
        self.selectors.insert(name, selector);
        self
    }

    /// Registers a stamp alias.
    pub fn alias(mut self, name: impl Into<String>, overrides: Patch) -> Self {
        self.aliases.insert(name, overrides);
        self
    }

    /// Appends a display alias that shows `label` for cells matching the
    /// registered selector `selector`.
    pub fn display_alias(mut self, label: impl Into<String>, selector: impl Into<String>) -> Self {
        self.display.push((label.into(), selector.into()));
        self
    }

    /// Appends a rule at the lowest priority.
    pub fn rule(mut self, selector: impl Into<String>, transform: impl Into<Transform>) -> Self {
        self.rules.push(Rule::new(selector, transform));
        self
    }

    /// Validates and freezes the configuration.
    ///
    /// Fails if a dimension is zero, the cell count overflows the address
    /// space, a rule or display alias names a selector that is not
    /// registered, or a stamp alias does not fit the schema.
    pub fn build(self) -> Result<SimulationConfig> {
        let Meta { rows, cols } = self.meta;
        if rows == 0 || cols == 0 {
            return Err(RuleCellError::EmptyGrid { rows, cols });
        }
        let fits = rows
            .checked_mul(cols)
            .and_then(|n| n.checked_mul(std::mem::size_of::<Cell>()))
            .is_some_and(|bytes| bytes <= isize::MAX as usize);
        if !fits {
            return Err(RuleCellError::GridTooLarge { rows, cols });
        }

        for rule in &self.rules {
            self.selectors.get(rule.selector())?;
        }
        self.aliases.validate(&self.schema)?;

        let mut display = DisplayAliases::new();
        for (label, selector) in self.display {
            self.selectors.get(&selector)?;
            display.push(label, Selector::named(selector));
        }

        tracing::debug!(
            rows,
            cols,
            properties = self.schema.len(),
            selectors = self.selectors.len(),
            rules = self.rules.len(),
            aliases = self.aliases.len(),
            "built simulation config"
        );

        Ok(SimulationConfig {
            meta: self.meta,
            schema: Arc::new(self.schema),
            selectors: self.selectors,
            aliases: self.aliases,
            display,
            rules: self.rules.into_iter().collect(),
            directions: self.directions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> CellSchema {
        CellSchema::new().with("alive", false).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::builder(schema()).build().unwrap();
        assert_eq!(config.meta(), Meta { rows: 20, cols: 80 });
        assert_eq!(config.directions().len(), 8);
        assert!(config.rules().is_empty());
    }

    #[test]
    fn test_empty_grid_rejected() {
        let err = SimulationConfig::builder(schema())
            .with_dimensions(0, 5)
            .build()
            .unwrap_err();
        assert!(matches!(err, RuleCellError::EmptyGrid { rows: 0, cols: 5 }));
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let err = SimulationConfig::builder(schema())
            .with_dimensions(usize::MAX, 2)
            .build()
            .unwrap_err();
        assert!(matches!(err, RuleCellError::GridTooLarge { cols: 2, .. }));

        let err = SimulationConfig::builder(schema())
            .with_dimensions(usize::MAX / 64, 2)
            .build()
            .unwrap_err();
        assert!(matches!(err, RuleCellError::GridTooLarge { .. }));
    }

    #[test]
    fn test_rule_with_unknown_selector_rejected() {
        let err = SimulationConfig::builder(schema())
            .rule("ghost", Patch::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, RuleCellError::UnknownSelector(n) if n == "ghost"));
    }

    #[test]
    fn test_display_with_unknown_selector_rejected() {
        let err = SimulationConfig::builder(schema())
            .display_alias("#", "ghost")
            .build()
            .unwrap_err();
        assert!(matches!(err, RuleCellError::UnknownSelector(_)));
    }

    #[test]
    fn test_alias_checked_against_schema() {
        let err = SimulationConfig::builder(schema())
            .alias("zombie", Patch::new().set("undead", true))
            .build()
            .unwrap_err();
        assert!(matches!(err, RuleCellError::UnknownProperty(n) if n == "undead"));
    }

    #[test]
    fn test_rule_order_kept() {
        let config = SimulationConfig::builder(schema())
            .selector("a", Selector::always())
            .selector("b", Selector::always())
            .rule("b", Patch::new())
            .rule("a", Patch::new())
            .build()
            .unwrap();
        let order: Vec<_> = config.rules().iter().map(Rule::selector).collect();
        assert_eq!(order, vec!["b", "a"]);
    }
}
