//! The simulation: grid, step scheduler and direct mutation API.

use crate::config::{Meta, SimulationConfig};
use crate::error::{Result, RuleCellError};
use crate::frame::Frame;
use crate::grid::Grid;
use crate::schema::Cell;
use crate::selector::EvalContext;

/// Whether the grid may be edited freely.
///
/// A simulation starts in [`Mode::Editing`] and switches to [`Mode::Running`]
/// on its first successful step. [`Simulation::remove`] is only allowed while
/// editing; [`Simulation::update`] is allowed in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Initial layout is being set up.
    #[default]
    Editing,
    /// At least one generation has been computed.
    Running,
}

/// Outcome of a single [`Simulation::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    /// Generation number now installed.
    pub generation: u64,
    /// Cells whose next state came from a rule.
    pub matched: usize,
    /// Cells that matched no rule and were carried forward.
    pub carried: usize,
}

/// A running rule-driven automaton.
///
/// ```
/// use unshape_rulecell::{CellSchema, Patch, Selector, Simulation, SimulationConfig};
///
/// let schema = CellSchema::new().with("lit", false).unwrap();
/// let config = SimulationConfig::builder(schema)
///     .with_dimensions(1, 3)
///     .selector("lit", Selector::property_eq("lit", true))
///     .selector("dark", Selector::property_eq("lit", false))
///     .alias("on", Patch::new().set("lit", true))
///     .display_alias("*", "lit")
///     .rule("lit", Patch::new().set("lit", false))
///     .rule("dark", Patch::new().set("lit", true))
///     .build()
///     .unwrap();
///
/// let mut sim = Simulation::new(config);
/// sim.update(0, 1, "on").unwrap();
/// assert_eq!(sim.frame().unwrap().to_string(), "  *  \n");
/// sim.step().unwrap();
/// assert_eq!(sim.frame().unwrap().to_string(), "*   *\n");
/// ```
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    default_cell: Cell,
    grid: Grid,
    generation: u64,
    mode: Mode,
}

impl Simulation {
    /// Creates a simulation with every cell at the schema default.
    pub fn new(config: SimulationConfig) -> Self {
        let default_cell = Cell::default_for(config.schema().clone());
        let Meta { rows, cols } = config.meta();
        let grid = Grid::build(rows, cols, &default_cell);
        Self {
            config,
            default_cell,
            grid,
            generation: 0,
            mode: Mode::Editing,
        }
    }

    /// Loads a simulation from a JSON definition. See [`crate::definition`].
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(SimulationConfig::from_json(json)?))
    }

    /// Grid dimensions.
    pub fn meta(&self) -> Meta {
        self.config.meta()
    }

    /// The configuration this simulation was built from.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The current generation's grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Number of completed steps since creation or the last [`clear`](Self::clear).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current edit mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switches edit mode explicitly, e.g. back to editing between runs.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Cell at `(row, col)`.
    pub fn cell(&self, row: usize, col: usize) -> Result<&Cell> {
        self.check_bounds(row, col)?;
        Ok(self.grid.get(row, col))
    }

    /// An evaluation context over the current grid.
    pub fn context(&self) -> EvalContext<'_> {
        EvalContext::new(
            &self.grid,
            self.config.selectors(),
            self.config.directions(),
        )
    }

    /// Display labels for every position.
    pub fn frame(&self) -> Result<Frame> {
        let ctx = self.context();
        let display = self.config.display();
        let labels = self
            .grid
            .rows_iter()
            .map(|row| {
                row.iter()
                    .map(|cell| display.resolve(&ctx, cell))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Frame::new(labels))
    }

    /// Stamps `(row, col)` with the default cell plus the overrides of `alias`.
    ///
    /// Unknown aliases and out-of-range positions leave the grid untouched.
    pub fn update(&mut self, row: usize, col: usize, alias: &str) -> Result<()> {
        self.check_bounds(row, col)?;
        let overrides = self.config.aliases().get(alias)?;
        let cell = self.default_cell.with_patch(overrides)?;
        tracing::trace!(row, col, alias, "update cell");
        self.grid.set(row, col, cell);
        Ok(())
    }

    /// Resets `(row, col)` to the schema default. Only allowed while editing.
    pub fn remove(&mut self, row: usize, col: usize) -> Result<()> {
        if self.mode != Mode::Editing {
            return Err(RuleCellError::NotEditable);
        }
        self.check_bounds(row, col)?;
        tracing::trace!(row, col, "remove cell");
        self.grid.set(row, col, self.default_cell.clone());
        Ok(())
    }

    /// Resets every cell to the default, the generation to 0 and the mode to editing.
    pub fn clear(&mut self) {
        let Meta { rows, cols } = self.meta();
        self.grid = Grid::build(rows, cols, &self.default_cell);
        self.generation = 0;
        self.mode = Mode::Editing;
    }

    /// Advances one generation.
    ///
    /// Every cell's next state is computed from the current grid only, into a
    /// separate buffer that replaces the grid once complete. If any evaluation
    /// fails the buffer is dropped and the simulation is unchanged.
    pub fn step(&mut self) -> Result<StepReport> {
        let Meta { rows, cols } = self.meta();
        let mut matched = 0;

        let next = {
            let ctx = self.context();
            let rules = self.config.rules();
            let grid = &self.grid;
            Grid::try_from_fn(rows, cols, |r, c| {
                let (cell, hit) = rules.next_state(&ctx, grid.get(r, c))?;
                matched += usize::from(hit);
                Ok::<_, RuleCellError>(cell)
            })
        };

        let next = match next {
            Ok(next) => next,
            Err(err) => {
                tracing::warn!(generation = self.generation, error = %err, "step discarded");
                return Err(err);
            }
        };

        self.grid = next;
        self.generation += 1;
        self.mode = Mode::Running;

        let report = StepReport {
            generation: self.generation,
            matched,
            carried: rows * cols - matched,
        };
        tracing::debug!(
            generation = report.generation,
            matched = report.matched,
            carried = report.carried,
            "step complete"
        );
        Ok(report)
    }

    /// Runs `n` steps, stopping at the first error.
    pub fn steps(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.step()?;
        }
        Ok(())
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<()> {
        if self.grid.contains(row, col) {
            return Ok(());
        }
        Err(RuleCellError::OutOfBounds {
            row,
            col,
            rows: self.grid.rows(),
            cols: self.grid.cols(),
        })
    }
}


// ============================================================================
// Invariant tests - properties that must hold for any rule set
// ============================================================================

/// Invariant tests for the step scheduler.
///
/// These check shape, carry-forward and determinism over random soups. Run with:
///
/// ```sh
/// cargo test -p unshape-rulecell --features invariant-tests
/// ```
#[cfg(all(test, feature = "invariant-tests"))]
mod invariant_tests {
    use super::*;
    use crate::direction::{Moore, Neighborhood};
    use crate::schema::{CellSchema, Patch};
    use crate::selector::Selector;

    /// A deterministic pseudo-random soup, B3/S23 plus an age counter.
    fn soup(rows: usize, cols: usize, seed: u64) -> Simulation {
        let schema = CellSchema::new()
            .with("alive", false)
            .unwrap()
            .with("age", 0i64)
            .unwrap();
        let config = SimulationConfig::builder(schema)
            .with_dimensions(rows, cols)
            .selector("alive", Selector::property_eq("alive", true))
            .selector(
                "born",
                Selector::from_fn(|ctx, cell| {
                    Ok(!cell.bool("alive")? && ctx.count(Moore.offsets(), "alive", cell)? == 3)
                }),
            )
            .selector(
                "survives",
                Selector::from_fn(|ctx, cell| {
                    let n = ctx.count(Moore.offsets(), "alive", cell)?;
                    Ok(cell.bool("alive")? && (n == 2 || n == 3))
                }),
            )
            .selector("living", Selector::named("alive"))
            .alias("alive", Patch::new().set("alive", true))
            .rule("born", Patch::new().set("alive", true).set("age", 0i64))
            .rule(
                "survives",
                crate::rule::Transform::map(|cell| {
                    Patch::new().set("age", cell.int("age").unwrap_or(0) + 1)
                }),
            )
            .rule("living", Patch::new().set("alive", false))
            .build()
            .unwrap();

        let mut sim = Simulation::new(config);
        let mut state = seed.wrapping_add(1);
        for r in 0..rows {
            for c in 0..cols {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                if state >> 62 == 0 {
                    sim.update(r, c, "alive").unwrap();
                }
            }
        }
        sim
    }

    #[test]
    fn test_step_preserves_shape_and_positions() {
        for seed in 0..5 {
            let mut sim = soup(7, 11, seed);
            for _ in 0..6 {
                sim.step().unwrap();
                assert_eq!(sim.grid().rows(), 7);
                assert_eq!(sim.grid().cols(), 11);
                for (r, row) in sim.grid().rows_iter().enumerate() {
                    assert_eq!(row.len(), 11);
                    for (c, cell) in row.iter().enumerate() {
                        assert_eq!((cell.row(), cell.col()), (r, c));
                    }
                }
            }
        }
    }

    #[test]
    fn test_unmatched_cells_keep_state() {
        for seed in 0..5 {
            let mut sim = soup(6, 6, seed);
            for _ in 0..4 {
                let before = sim.grid().clone();
                let ctx_grid = before.clone();
                let ctx = EvalContext::new(
                    &ctx_grid,
                    sim.config().selectors(),
                    sim.config().directions(),
                );
                let unmatched: Vec<(usize, usize)> = before
                    .iter()
                    .filter(|cell| {
                        sim.config()
                            .rules()
                            .first_match(&ctx, cell)
                            .unwrap()
                            .is_none()
                    })
                    .map(|cell| (cell.row(), cell.col()))
                    .collect();
                sim.step().unwrap();
                for (r, c) in unmatched {
                    assert!(sim.grid().get(r, c).same_state(before.get(r, c)));
                }
            }
        }
    }

    #[test]
    fn test_step_is_deterministic() {
        let mut a = soup(8, 8, 42);
        let mut b = soup(8, 8, 42);
        a.steps(10).unwrap();
        b.steps(10).unwrap();
        assert_eq!(a.grid(), b.grid());
    }
}
