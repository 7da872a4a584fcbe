//! Display-ready snapshot of a grid.

use std::fmt;
use std::sync::Arc;

/// One optional display label per grid position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    labels: Vec<Vec<Option<Arc<str>>>>,
}

impl Frame {
    pub(crate) fn new(labels: Vec<Vec<Option<Arc<str>>>>) -> Self {
        Self { labels }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.labels.len()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.labels.first().map_or(0, Vec::len)
    }

    /// Label at `(row, col)`, or `None` if absent or out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.labels.get(row)?.get(col)?.as_deref()
    }

    /// Rows of labels, top to bottom.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[Option<Arc<str>>]> {
        self.labels.iter().map(Vec::as_slice)
    }

    /// Number of positions showing `label`.
    pub fn count(&self, label: &str) -> usize {
        self.labels
            .iter()
            .flatten()
            .filter(|l| l.as_deref() == Some(label))
            .count()
    }
}

/// One line per row, labels separated by single spaces, a blank for absent labels.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.labels {
            for (i, label) in row.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                f.write_str(label.as_deref().unwrap_or(" "))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
