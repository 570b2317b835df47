//! **gridwalk-core**: core types for grid puzzle solvers.
//!
//! This crate provides the foundational types shared by the *gridwalk*
//! crates: `(row, col)` geometry, the four orthogonal directions, directional
//! poses, and an owned, bounds-checked 2D [`Grid`].

pub mod error;
pub mod geom;
pub mod grid;

pub use error::GridError;
pub use geom::{Direction, Point, Pose};
pub use grid::Grid;
