use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Grid needs at least one row and one column, got {rows}x{columns}")]
    Empty { rows: usize, columns: usize },

    #[error("Invalid layout {0:?}, expected ROWSxCOLUMNS such as 3x3")]
    Malformed(String),
}

/// Rows and columns of the tile grid. Both are at least one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Layout {
    rows: NonZeroUsize,
    columns: NonZeroUsize,
}

impl Layout {
    /// Layouts offered by the host next to free-form `RxC` input.
    pub const PRESETS: [(usize, usize); 2] = [(2, 2), (3, 3)];

    pub fn new(rows: usize, columns: usize) -> Result<Self, LayoutError> {
        match (NonZeroUsize::new(rows), NonZeroUsize::new(columns)) {
            (Some(rows), Some(columns)) => Ok(Self { rows, columns }),
            _ => Err(LayoutError::Empty { rows, columns }),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows.get()
    }

    pub fn columns(&self) -> usize {
        self.columns.get()
    }

    pub fn tile_count(&self) -> usize {
        self.rows() * self.columns()
    }

    /// Row and column of the tile at `index`, row-major.
    pub fn position(&self, index: usize) -> Option<(usize, usize)> {
        (index < self.tile_count()).then(|| (index / self.columns(), index % self.columns()))
    }

    /// The preset after this layout, wrapping around. Layouts that are not
    /// presets move to the first one.
    pub fn next_preset(&self) -> Layout {
        let presets: Vec<Layout> = Self::PRESETS
            .iter()
            .filter_map(|&(rows, columns)| Layout::new(rows, columns).ok())
            .collect();
        let next = presets
            .iter()
            .position(|preset| preset == self)
            .map_or(0, |i| (i + 1) % presets.len());
        presets.get(next).copied().unwrap_or_default()
    }

    /// Row-major index of the tile at (`row`, `column`).
    pub fn index(&self, row: usize, column: usize) -> Option<usize> {
        (row < self.rows() && column < self.columns()).then(|| row * self.columns() + column)
    }
}

impl Default for Layout {
    fn default() -> Self {
        let two = NonZeroUsize::MIN.saturating_add(1);
        Self {
            rows: two,
            columns: two,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.columns)
    }
}

impl FromStr for Layout {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || LayoutError::Malformed(s.to_string());
        let (rows, columns) = s.trim().split_once(['x', 'X']).ok_or_else(malformed)?;
        let rows = rows.trim().parse().map_err(|_| malformed())?;
        let columns = columns.trim().parse().map_err(|_| malformed())?;
        Layout::new(rows, columns)
    }
}
