//! Subplot grid
//!
//! Series are laid out row-major on a `vertical` x `horizontal` grid, one
//! cell per series in schema order.

use serde::Serialize;

use crate::config::{SubplotConfig, MAX_GRID_DIMENSION};

/// Rows (`vertical`) by columns (`horizontal`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubplotGrid {
    pub vertical: usize,
    pub horizontal: usize,
}

/// Position of one series inside a [`SubplotGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
}

/// An explicit grid that cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    /// Fewer cells than series.
    TooSmall { capacity: usize, series: usize },
    /// More than [`MAX_GRID_DIMENSION`] rows or columns.
    TooLarge { vertical: usize, horizontal: usize },
}

impl SubplotGrid {
    /// Near-square grid for `count` series: `ceil(sqrt(n))` rows and as many
    /// columns as needed to fit the rest.
    pub fn auto(count: usize) -> Self {
        let count = count.max(1);
        let vertical = (count as f64).sqrt().ceil() as usize;
        let horizontal = count.div_ceil(vertical);
        Self {
            vertical,
            horizontal,
        }
    }

    pub fn capacity(&self) -> usize {
        self.vertical.saturating_mul(self.horizontal)
    }

    /// Grid to draw `series_count` series with, or `None` when subplots are
    /// off. A grid is computed unless both dimensions were given.
    pub fn resolve(
        config: &SubplotConfig,
        series_count: usize,
    ) -> Result<Option<Self>, GridError> {
        if !config.show {
            return Ok(None);
        }

        let grid = match (config.vertical, config.horizontal) {
            (Some(vertical), Some(horizontal)) => Self {
                vertical,
                horizontal,
            },
            _ => return Ok(Some(Self::auto(series_count))),
        };

        if grid.vertical > MAX_GRID_DIMENSION || grid.horizontal > MAX_GRID_DIMENSION {
            return Err(GridError::TooLarge {
                vertical: grid.vertical,
                horizontal: grid.horizontal,
            });
        }
        if grid.capacity() < series_count {
            return Err(GridError::TooSmall {
                capacity: grid.capacity(),
                series: series_count,
            });
        }
        Ok(Some(grid))
    }

    /// Cell of the `index`-th series.
    pub fn cell(&self, index: usize) -> GridCell {
        GridCell {
            row: index / self.horizontal,
            col: index % self.horizontal,
        }
    }
}
