//! Error type for grid construction and writes.

use crate::geom::Point;

/// Errors raised by [`Grid`](crate::Grid) construction and mutation.
///
/// Reads never fail; they return `None` outside the grid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// A write addressed a cell outside the grid.
    #[error("point {point} out of range for {rows}x{cols} grid")]
    OutOfRange { point: Point, rows: usize, cols: usize },
    /// A row passed to [`Grid::from_rows`](crate::Grid::from_rows) has the wrong length.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// Stored cells do not fill the declared dimensions.
    #[error("{rows}x{cols} grid cannot hold {found} cells")]
    CellCount {
        rows: usize,
        cols: usize,
        found: usize,
    },
    /// A grid must have at least one cell.
    #[error("grid must have at least one cell")]
    Empty,
}
