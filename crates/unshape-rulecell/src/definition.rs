//! JSON simulation definitions.
//!
//! A definition document describes a whole [`SimulationConfig`] as data:
//!
//! ```json
//! {
//!   "meta": {"Rows": 3, "Cols": 3},
//!   "cell": {"alive": false},
//!   "selectors": {
//!     "alive": {"is": {"alive": true}},
//!     "born": {"all": [
//!       {"not": {"ref": "alive"}},
//!       {"count": {"dirs": ["N", "NE", "E", "SE", "S", "SW", "W", "NW"], "of": {"ref": "alive"}, "in": [3]}}
//!     ]}
//!   },
//!   "aliases": {"alive": {"alive": true}},
//!   "display": [{"name": "#", "selector": "alive"}],
//!   "rules": [{"selector": "born", "set": {"alive": true}}]
//! }
//! ```
//!
//! Selector expressions are one of `"always"`, `{"is": patch}`,
//! `{"ref": name}`, `{"not": expr}`, `{"all": [expr]}`, `{"any": [expr]}` or
//! `{"count": {"dirs": [token], "of": expr, "in": [n]}}`.
//!
//! Everything a definition names is checked while loading: properties and
//! their types, selector references, direction tokens. `directions` adds to
//! (or overrides entries of) the compass table.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::config::{Meta, SimulationConfig};
use crate::direction::{DirectionTable, Offset};
use crate::error::{Result, RuleCellError};
use crate::schema::{CellSchema, Patch};
use crate::selector::Selector;
use crate::value::Value;

/// Serialized form of a [`SimulationConfig`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationDef {
    /// Grid dimensions.
    pub meta: Meta,
    /// Property defaults.
    pub cell: BTreeMap<String, Value>,
    /// Extra or replacement direction tokens.
    pub directions: BTreeMap<String, Offset>,
    /// Named selectors.
    pub selectors: BTreeMap<String, SelectorDef>,
    /// Stamp aliases.
    pub aliases: BTreeMap<String, Patch>,
    /// Display aliases in priority order.
    pub display: Vec<DisplayDef>,
    /// Rules in priority order.
    pub rules: Vec<RuleDef>,
}

/// A selector expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorDef {
    /// Matches every cell.
    Always,
    /// Every listed property equals the given value.
    Is(Patch),
    /// Another named selector.
    Ref(String),
    /// Negation.
    Not(Box<SelectorDef>),
    /// Conjunction.
    All(Vec<SelectorDef>),
    /// Disjunction.
    Any(Vec<SelectorDef>),
    /// Neighbor count membership.
    Count(CountDef),
}

/// Body of a `count` selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountDef {
    /// Direction tokens to look at.
    pub dirs: Vec<String>,
    /// Predicate applied to each in-bounds neighbor.
    pub of: Box<SelectorDef>,
    /// Accepted neighbor counts.
    #[serde(rename = "in")]
    pub counts: Vec<usize>,
}

/// A display alias entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayDef {
    /// Label shown for matching cells.
    pub name: String,
    /// Name of a registered selector.
    pub selector: String,
}

/// A rule entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDef {
    /// Name of a registered selector.
    pub selector: String,
    /// Properties assigned on a match.
    pub set: Patch,
}

impl SimulationDef {
    /// Parses a definition document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the definition.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validates the definition and builds a configuration from it.
    pub fn into_config(self) -> Result<SimulationConfig> {
        let schema = CellSchema::from_properties(self.cell)?;

        let mut directions = DirectionTable::compass();
        for (token, offset) in self.directions {
            directions.insert(token, offset);
        }

        check_cycles(&self.selectors)?;

        let compiler = Compiler {
            schema: &schema,
            directions: &directions,
            names: &self.selectors,
        };
        let mut compiled = Vec::with_capacity(self.selectors.len());
        for (name, def) in &self.selectors {
            compiled.push((name.clone(), compiler.compile(def)?));
        }

        let mut builder = SimulationConfig::builder(schema)
            .with_dimensions(self.meta.rows, self.meta.cols)
            .with_directions(directions);
        for (name, selector) in compiled {
            builder = builder.selector(name, selector);
        }
        for (name, overrides) in self.aliases {
            builder = builder.alias(name, overrides);
        }
        for entry in self.display {
            builder = builder.display_alias(entry.name, entry.selector);
        }
        for rule in self.rules {
            builder = builder.rule(rule.selector, rule.set);
        }
        builder.build()
    }
}

impl SimulationConfig {
    /// Loads a configuration from a JSON definition. See [`crate::definition`].
    pub fn from_json(json: &str) -> Result<Self> {
        let def = SimulationDef::from_json(json)?;
        tracing::debug!(
            selectors = def.selectors.len(),
            rules = def.rules.len(),
            "loaded simulation definition"
        );
        def.into_config()
    }
}

struct Compiler<'a> {
    schema: &'a CellSchema,
    directions: &'a DirectionTable,
    names: &'a BTreeMap<String, SelectorDef>,
}

impl Compiler<'_> {
    fn compile(&self, def: &SelectorDef) -> Result<Selector> {
        Ok(match def {
            SelectorDef::Always => Selector::always(),
            SelectorDef::Is(patch) => {
                self.schema.check(patch)?;
                Selector::all(
                    patch
                        .iter()
                        .map(|(name, value)| Selector::property_eq(name, value.clone()))
                        .collect(),
                )
            }
            SelectorDef::Ref(name) => {
                if !self.names.contains_key(name) {
                    return Err(RuleCellError::UnknownSelector(name.clone()));
                }
                Selector::named(name.clone())
            }
            SelectorDef::Not(inner) => Selector::not(self.compile(inner)?),
            SelectorDef::All(items) => Selector::all(self.compile_all(items)?),
            SelectorDef::Any(items) => Selector::any(self.compile_all(items)?),
            SelectorDef::Count(count) => Selector::count_in(
                self.directions.resolve(&count.dirs)?,
                self.compile(&count.of)?,
                count.counts.clone(),
            ),
        })
    }

    fn compile_all(&self, items: &[SelectorDef]) -> Result<Vec<Selector>> {
        items.iter().map(|def| self.compile(def)).collect()
    }
}

/// Rejects selectors that reach themselves through `ref`. References under
/// `count` are followed too: neighbors of neighbors include the cell itself.
fn check_cycles(selectors: &BTreeMap<String, SelectorDef>) -> Result<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }

    fn refs<'a>(def: &'a SelectorDef, out: &mut Vec<&'a str>) {
        match def {
            SelectorDef::Always | SelectorDef::Is(_) => {}
            SelectorDef::Ref(name) => out.push(name),
            SelectorDef::Not(inner) => refs(inner, out),
            SelectorDef::All(items) | SelectorDef::Any(items) => {
                items.iter().for_each(|item| refs(item, out))
            }
            SelectorDef::Count(count) => refs(&count.of, out),
        }
    }

    fn visit<'a>(
        name: &'a str,
        graph: &HashMap<&'a str, Vec<&'a str>>,
        marks: &mut HashMap<&'a str, Mark>,
    ) -> Result<()> {
        match marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => return Err(RuleCellError::SelectorCycle(name.to_string())),
            None => {}
        }
        marks.insert(name, Mark::Visiting);
        for &next in graph.get(name).into_iter().flatten() {
            visit(next, graph, marks)?;
        }
        marks.insert(name, Mark::Done);
        Ok(())
    }

    let graph: HashMap<&str, Vec<&str>> = selectors
        .iter()
        .map(|(name, def)| {
            let mut out = Vec::new();
            refs(def, &mut out);
            (name.as_str(), out)
        })
        .collect();

    let mut marks = HashMap::new();
    for name in selectors.keys() {
        visit(name, &graph, &mut marks)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::Simulation;

    const BLINKER: &str = r##"{
        "meta": {"Rows": 3, "Cols": 3},
        "cell": {"alive": false},
        "selectors": {
            "alive": {"is": {"alive": true}},
            "moore": {"count": {
                "dirs": ["N", "NE", "E", "SE", "S", "SW", "W", "NW"],
                "of": {"ref": "alive"},
                "in": [2, 3]
            }},
            "born": {"all": [
                {"not": {"ref": "alive"}},
                {"count": {
                    "dirs": ["N", "NE", "E", "SE", "S", "SW", "W", "NW"],
                    "of": {"ref": "alive"},
                    "in": [3]
                }}
            ]},
            "dies": {"all": [{"ref": "alive"}, {"not": {"ref": "moore"}}]}
        },
        "aliases": {"alive": {"alive": true}},
        "display": [{"name": "#", "selector": "alive"}],
        "rules": [
            {"selector": "born", "set": {"alive": true}},
            {"selector": "dies", "set": {"alive": false}}
        ]
    }"##;

    #[test]
    fn test_json_blinker() {
        let mut sim = Simulation::new(SimulationConfig::from_json(BLINKER).unwrap());
        for r in 0..3 {
            sim.update(r, 1, "alive").unwrap();
        }
        assert_eq!(sim.frame().unwrap().to_string(), "  #  \n  #  \n  #  \n");
        sim.step().unwrap();
        assert_eq!(sim.frame().unwrap().to_string(), "     \n# # #\n     \n");
        sim.step().unwrap();
        assert_eq!(sim.frame().unwrap().to_string(), "  #  \n  #  \n  #  \n");
    }

    #[test]
    fn test_defaults_when_omitted() {
        let config = SimulationConfig::from_json(r#"{"cell": {"alive": false}}"#).unwrap();
        assert_eq!(config.meta(), Meta::default());
        assert_eq!(config.directions().len(), 8);
    }

    #[test]
    fn test_partial_meta_falls_back_per_key() {
        let config =
            SimulationConfig::from_json(r#"{"meta": {"Rows": 5}, "cell": {"alive": false}}"#)
                .unwrap();
        assert_eq!(config.meta(), Meta { rows: 5, cols: 80 });

        let config =
            SimulationConfig::from_json(r#"{"meta": {"Cols": 7}, "cell": {"alive": false}}"#)
                .unwrap();
        assert_eq!(config.meta(), Meta { rows: 20, cols: 7 });

        let config =
            SimulationConfig::from_json(r#"{"meta": {}, "cell": {"alive": false}}"#).unwrap();
        assert_eq!(config.meta(), Meta::default());
    }

    #[test]
    fn test_huge_meta_rejected() {
        let json = r#"{
            "meta": {"Rows": 18446744073709551615, "Cols": 18446744073709551615},
            "cell": {"alive": false}
        }"#;
        assert!(matches!(
            Simulation::from_json(json),
            Err(RuleCellError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn test_custom_directions() {
        let json = r#"{
            "meta": {"Rows": 1, "Cols": 5},
            "cell": {"on": false},
            "directions": {"EE": [0, 2]},
            "selectors": {
                "on": {"is": {"on": true}},
                "far": {"count": {"dirs": ["EE"], "of": {"ref": "on"}, "in": [1]}}
            },
            "aliases": {"on": {"on": true}},
            "rules": [{"selector": "far", "set": {"on": true}}]
        }"#;
        let mut sim = Simulation::from_json(json).unwrap();
        sim.update(0, 4, "on").unwrap();
        sim.step().unwrap();
        let on: Vec<bool> = sim.grid().iter().map(|c| c.bool("on").unwrap()).collect();
        assert_eq!(on, vec![false, false, true, false, true]);
        assert_eq!(sim.config().directions().len(), 9);
    }

    #[test]
    fn test_unknown_ref_rejected() {
        let json = r#"{"cell": {"a": 0}, "selectors": {"x": {"ref": "y"}}}"#;
        assert!(matches!(
            SimulationConfig::from_json(json),
            Err(RuleCellError::UnknownSelector(n)) if n == "y"
        ));
    }

    #[test]
    fn test_unknown_direction_rejected() {
        let json = r#"{
            "cell": {"a": 0},
            "selectors": {"x": {"count": {"dirs": ["UP"], "of": "always", "in": [1]}}}
        }"#;
        assert!(matches!(
            SimulationConfig::from_json(json),
            Err(RuleCellError::UnknownDirection(t)) if t == "UP"
        ));
    }

    #[test]
    fn test_is_checks_schema() {
        let json = r#"{"cell": {"a": 0}, "selectors": {"x": {"is": {"a": "zero"}}}}"#;
        assert!(matches!(
            SimulationConfig::from_json(json),
            Err(RuleCellError::PropertyType { .. })
        ));
    }

    #[test]
    fn test_ref_cycle_rejected() {
        let json = r#"{
            "cell": {"a": 0},
            "selectors": {
                "x": {"not": {"ref": "y"}},
                "y": {"any": ["always", {"ref": "x"}]}
            }
        }"#;
        assert!(matches!(
            SimulationConfig::from_json(json),
            Err(RuleCellError::SelectorCycle(_))
        ));
    }

    #[test]
    fn test_shared_refs_are_not_cycles() {
        let json = r#"{
            "cell": {"a": 0},
            "selectors": {
                "base": "always",
                "x": {"ref": "base"},
                "y": {"all": [{"ref": "base"}, {"ref": "x"}]}
            }
        }"#;
        assert!(SimulationConfig::from_json(json).is_ok());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SimulationConfig::from_json("{\"cell\": "),
            Err(RuleCellError::Json(_))
        ));
        assert!(matches!(
            SimulationConfig::from_json(r#"{"selectors": {"x": {"maybe": 1}}}"#),
            Err(RuleCellError::Json(_))
        ));
    }

    #[test]
    fn test_definition_roundtrip_text() {
        let def = SimulationDef::from_json(BLINKER).unwrap();
        let text = def.to_json_pretty().unwrap();
        assert_eq!(SimulationDef::from_json(&text).unwrap(), def);
    }
}
