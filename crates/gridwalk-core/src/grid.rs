//! The [`Grid`] type: a rectangular 2D array of homogeneous cell values.
//!
//! Unlike a shared-buffer view, a `Grid` owns its storage: cloning it yields
//! an independent deep copy. Probing code relies on this to mutate a
//! candidate grid without disturbing the baseline.

use std::collections::HashSet;
use std::fmt;

use crate::error::GridError;
use crate::geom::{Direction, Point};

/// A rectangular grid of `T`, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawGrid<T>")
)]
pub struct Grid<T> {
    cells: Vec<T>,
    rows: usize,
    cols: usize,
}

/// Unchecked serialized form, validated into a [`Grid`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawGrid<T> {
    cells: Vec<T>,
    rows: usize,
    cols: usize,
}

#[cfg(feature = "serde")]
impl<T> TryFrom<RawGrid<T>> for Grid<T> {
    type Error = GridError;

    fn try_from(raw: RawGrid<T>) -> Result<Self, GridError> {
        if raw.rows == 0 || raw.cols == 0 {
            return Err(GridError::Empty);
        }
        if raw.rows.checked_mul(raw.cols) != Some(raw.cells.len()) {
            return Err(GridError::CellCount {
                rows: raw.rows,
                cols: raw.cols,
                found: raw.cells.len(),
            });
        }
        Ok(Self {
            cells: raw.cells,
            rows: raw.rows,
            cols: raw.cols,
        })
    }
}

impl<T: Clone> Grid<T> {
    /// Create a `rows` x `cols` grid with every cell set to `fill`.
    pub fn new(rows: usize, cols: usize, fill: T) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::Empty);
        }
        Ok(Self {
            cells: vec![fill; rows * cols],
            rows,
            cols,
        })
    }

    /// Deep copy. Equivalent to [`Clone::clone`].
    #[inline]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Copy the grid and write `value` at `p` in the copy.
    pub fn with_cell(&self, p: Point, value: T) -> Result<Self, GridError> {
        let mut next = self.clone();
        next.set(p, value)?;
        Ok(next)
    }
}

impl<T> Grid<T> {
    /// Build a grid from parsed rows. Every row must have the same, non-zero
    /// length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, GridError> {
        let expected = rows.first().map(Vec::len).unwrap_or(0);
        if expected == 0 {
            return Err(GridError::Empty);
        }
        let height = rows.len();
        let mut cells = Vec::with_capacity(height * expected);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != expected {
                return Err(GridError::RaggedRow {
                    row,
                    expected,
                    found: values.len(),
                });
            }
            cells.extend(values);
        }
        Ok(Self {
            cells,
            rows: height,
            cols: expected,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`: construction rejects empty grids.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `p` addresses a cell of this grid.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.row >= 0 && p.col >= 0 && (p.row as usize) < self.rows && (p.col as usize) < self.cols
    }

    #[inline]
    fn index(&self, p: Point) -> Option<usize> {
        if self.contains(p) {
            Some(p.row as usize * self.cols + p.col as usize)
        } else {
            None
        }
    }

    #[inline]
    fn point(&self, idx: usize) -> Point {
        Point::new((idx / self.cols) as i32, (idx % self.cols) as i32)
    }

    fn out_of_range(&self, point: Point) -> GridError {
        GridError::OutOfRange {
            point,
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Read the cell at `p`. Returns `None` outside the grid.
    #[inline]
    pub fn get(&self, p: Point) -> Option<&T> {
        self.index(p).map(|i| &self.cells[i])
    }

    /// Like [`get`](Self::get), but reports an out-of-range `p` as an error.
    pub fn try_get(&self, p: Point) -> Result<&T, GridError> {
        self.get(p).ok_or_else(|| self.out_of_range(p))
    }

    /// Mutable access to the cell at `p`, or `None` outside the grid.
    #[inline]
    pub fn get_mut(&mut self, p: Point) -> Option<&mut T> {
        self.index(p).map(|i| &mut self.cells[i])
    }

    /// Write `value` at `p`. Writing outside the grid is an error.
    pub fn set(&mut self, p: Point, value: T) -> Result<(), GridError> {
        let i = self.index(p).ok_or_else(|| self.out_of_range(p))?;
        self.cells[i] = value;
        Ok(())
    }

    /// Exchange the values stored at `a` and `b`.
    pub fn swap(&mut self, a: Point, b: Point) -> Result<(), GridError> {
        let ia = self.index(a).ok_or_else(|| self.out_of_range(a))?;
        let ib = self.index(b).ok_or_else(|| self.out_of_range(b))?;
        self.cells.swap(ia, ib);
        Ok(())
    }

    /// The in-bounds orthogonal neighbours of `p`, in [`Direction::ALL`]
    /// order (up, down, left, right).
    pub fn surrounding(&self, p: Point) -> impl Iterator<Item = Point> + '_ {
        p.neighbors_4().into_iter().filter(move |&n| self.contains(n))
    }

    /// The neighbour of `p` in `dir` together with its value, which is
    /// `None` when the neighbour lies outside the grid.
    #[inline]
    pub fn adjacent(&self, p: Point, dir: Direction) -> (Point, Option<&T>) {
        let next = p.step(dir);
        (next, self.get(next))
    }

    /// Flood-fill from `seed` over 4-connected neighbours whose value
    /// satisfies `pred`.
    ///
    /// The seed is always part of the region when it lies inside the grid,
    /// whether or not it satisfies `pred` itself. An out-of-bounds seed yields
    /// an empty region.
    pub fn connected_region(&self, seed: Point, pred: impl Fn(&T) -> bool) -> HashSet<Point> {
        let mut region = HashSet::new();
        let Some(si) = self.index(seed) else {
            return region;
        };

        let mut seen = vec![false; self.cells.len()];
        let mut stack = vec![si];
        seen[si] = true;
        region.insert(seed);

        // Iterative DFS; each cell is pushed at most once.
        while let Some(ci) = stack.pop() {
            let cp = self.point(ci);
            for np in cp.neighbors_4() {
                let Some(ni) = self.index(np) else {
                    continue;
                };
                if seen[ni] || !pred(&self.cells[ni]) {
                    continue;
                }
                seen[ni] = true;
                stack.push(ni);
                region.insert(np);
            }
        }

        region
    }

    /// Row-major iterator over `(Point, &T)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Point, &T)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, v)| (self.point(i), v))
    }

    /// Row-major iterator over every point of the grid.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.cells.len()).map(move |i| self.point(i))
    }

    /// Build a grid of the same shape by applying `f` to every cell.
    pub fn map<U>(&self, mut f: impl FnMut(Point, &T) -> U) -> Grid<U> {
        Grid {
            cells: self.iter().map(|(p, v)| f(p, v)).collect(),
            rows: self.rows,
            cols: self.cols,
        }
    }
}

impl<T: PartialEq> Grid<T> {
    /// Every point holding `value`, in row-major order.
    pub fn find_all<'a>(&'a self, value: &'a T) -> impl Iterator<Item = Point> + 'a {
        self.iter().filter(move |(_, v)| *v == value).map(|(p, _)| p)
    }

    /// The point holding `value` if exactly one cell does.
    pub fn find_single(&self, value: &T) -> Option<Point> {
        let mut found = self.find_all(value);
        let first = found.next()?;
        match found.next() {
            Some(_) => None,
            None => Some(first),
        }
    }

    /// Number of cells equal to `value`.
    pub fn count(&self, value: &T) -> usize {
        self.cells.iter().filter(|v| *v == value).count()
    }
}

impl<T: PartialEq + Clone> Grid<T> {
    /// Distinct cell values in first-seen row-major order.
    pub fn unique_values(&self) -> Vec<T> {
        let mut out: Vec<T> = Vec::new();
        for v in &self.cells {
            if !out.contains(v) {
                out.push(v.clone());
            }
        }
        out
    }
}

impl<T: fmt::Display> fmt::Display for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            for v in row {
                write!(f, "{v}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn grid_round_trip() {
        let g = Grid::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        let json = serde_json::to_string(&g).unwrap();
        let back: Grid<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(g, back);
    }

    #[test]
    fn malformed_grid_rejected() {
        let short = serde_json::from_str::<Grid<i32>>(r#"{"cells":[],"rows":2,"cols":2}"#);
        assert!(short.is_err());
        let flat = serde_json::from_str::<Grid<i32>>(r#"{"cells":[],"rows":3,"cols":0}"#);
        assert!(flat.is_err());
        let long = serde_json::from_str::<Grid<i32>>(r#"{"cells":[1,2,3],"rows":1,"cols":2}"#);
        assert!(long.is_err());
    }

    #[test]
    fn dimensions_must_match_cells() {
        let raw = RawGrid {
            cells: vec![0u8; 3],
            rows: 2,
            cols: 2,
        };
        assert_eq!(
            Grid::try_from(raw).unwrap_err(),
            GridError::CellCount {
                rows: 2,
                cols: 2,
                found: 3
            }
        );
    }
}
