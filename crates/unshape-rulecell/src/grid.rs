//! Dense rectangular cell storage.

use crate::direction::Offset;
use crate::schema::Cell;

/// A `rows x cols` array of cells, each tagged with its own position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Vec<Cell>>,
    rows: usize,
    cols: usize,
}

impl Grid {
    /// Fills every position with a copy of `default` placed at that position.
    pub fn build(rows: usize, cols: usize, default: &Cell) -> Self {
        let cells = (0..rows)
            .map(|r| (0..cols).map(|c| default.at(r, c)).collect())
            .collect();
        Self { cells, rows, cols }
    }

    /// Assembles a grid from row-major cells produced by `f(row, col)`.
    pub(crate) fn try_from_fn<E>(
        rows: usize,
        cols: usize,
        mut f: impl FnMut(usize, usize) -> Result<Cell, E>,
    ) -> Result<Self, E> {
        let mut cells = Vec::with_capacity(rows);
        for r in 0..rows {
            let mut row = Vec::with_capacity(cols);
            for c in 0..cols {
                row.push(f(r, c)?.at(r, c));
            }
            cells.push(row);
        }
        Ok(Self { cells, rows, cols })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns true if `(row, col)` is a valid position.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Cell at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is outside the grid.
    pub fn get(&self, row: usize, col: usize) -> &Cell {
        &self.cells[row][col]
    }

    /// Replaces the cell at `(row, col)`. The stored cell is re-tagged with that position.
    ///
    /// # Panics
    ///
    /// Panics if the position is outside the grid.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row][col] = cell.at(row, col);
    }

    /// The neighbor of `cell` at `offset`, or `None` if it falls outside the grid.
    pub fn neighbor(&self, cell: &Cell, offset: Offset) -> Option<&Cell> {
        offset
            .apply(cell.row(), cell.col(), self.rows, self.cols)
            .map(|(r, c)| &self.cells[r][c])
    }

    /// Rows of cells, top to bottom.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.iter().map(Vec::as_slice)
    }

    /// All cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().flat_map(|row| row.iter())
    }
}
