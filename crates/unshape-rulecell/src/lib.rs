//! Rule-driven cellular automata over schema-defined cells.
//!
//! Cells carry named, typed properties declared by a [`CellSchema`]. Named
//! [`Selector`]s decide which cells a [`Rule`] applies to; the first matching
//! rule assigns new property values and unmatched cells carry their state
//! forward. Every step reads only the previous generation.
//!
//! # Example
//!
//! ```
//! use unshape_rulecell::{CellSchema, Moore, Neighborhood, Patch, Selector, Simulation, SimulationConfig};
//!
//! // B3/S23 on a bounded 3x3 grid.
//! let schema = CellSchema::new().with("alive", false).unwrap();
//! let config = SimulationConfig::builder(schema)
//!     .with_dimensions(3, 3)
//!     .selector("alive", Selector::property_eq("alive", true))
//!     .selector(
//!         "born",
//!         Selector::from_fn(|ctx, cell| {
//!             Ok(!cell.bool("alive")? && ctx.count(Moore.offsets(), "alive", cell)? == 3)
//!         }),
//!     )
//!     .selector(
//!         "dies",
//!         Selector::from_fn(|ctx, cell| {
//!             let n = ctx.count(Moore.offsets(), "alive", cell)?;
//!             Ok(cell.bool("alive")? && !(2..=3).contains(&n))
//!         }),
//!     )
//!     .alias("alive", Patch::new().set("alive", true))
//!     .display_alias("#", "alive")
//!     .rule("born", Patch::new().set("alive", true))
//!     .rule("dies", Patch::new().set("alive", false))
//!     .build()
//!     .unwrap();
//!
//! let mut sim = Simulation::new(config);
//! for row in 0..3 {
//!     sim.update(row, 1, "alive").unwrap();
//! }
//! sim.step().unwrap();
//! assert_eq!(sim.frame().unwrap().to_string(), "     \n# # #\n     \n");
//! ```
//!
//! With the `serde` feature (on by default) the same configuration can be
//! loaded from a JSON document, see [`definition`].

mod alias;
mod config;
#[cfg(feature = "serde")]
pub mod definition;
mod direction;
mod error;
mod frame;
mod grid;
mod rule;
mod schema;
mod selector;
mod simulation;
mod value;

pub use alias::{AliasTable, DisplayAlias, DisplayAliases};
pub use config::{DEFAULT_COLS, DEFAULT_ROWS, Meta, SimulationConfig, SimulationConfigBuilder};
#[cfg(feature = "serde")]
pub use definition::SimulationDef;
pub use direction::{
    DirectionTable, EAST, Moore, NORTH, NORTH_EAST, NORTH_WEST, Neighborhood, Offset, SOUTH,
    SOUTH_EAST, SOUTH_WEST, VonNeumann, WEST,
};
pub use error::{Result, RuleCellError, TypeError};
pub use frame::Frame;
pub use grid::Grid;
pub use rule::{Rule, RuleSet, Transform};
pub use schema::{Cell, CellSchema, Patch};
pub use selector::{EvalContext, Selector, SelectorRegistry};
pub use simulation::{Mode, Simulation, StepReport};
pub use value::{Value, ValueType};
