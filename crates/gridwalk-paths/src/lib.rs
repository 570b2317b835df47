//! Search algorithms for grid puzzles.
//!
//! This crate builds on [`gridwalk_core`] to provide:
//!
//! - **Weighted multi-path search** over `(position, facing)` poses with
//!   separate step and turn costs ([`Search::run`]). Every predecessor that
//!   achieves a pose's best cost is kept, so *all* optimal paths can be
//!   recovered ([`Search::paths`], [`Search::tiles`]).
//! - **Obstacle-sensitivity probing**: re-solving modified copies of a grid
//!   in parallel to measure what removing a barrier saves ([`Probe`]), and
//!   enumerating shortcuts along a known path ([`shortcuts`]).
//! - **Region labelling** of 4-connected components ([`RegionMap`]).
//!
//! # Trait hierarchy
//!
//! | Item | Role |
//! |---|---|
//! | [`Maze`] | which cells are open, which end the search |
//! | [`GridMaze`] : [`Maze`] | a `Grid` plus a passability predicate and a [`Goal`] |

mod backtrack;
mod cc;
mod config;
mod error;
mod probe;
mod search;
mod traits;

pub use backtrack::replay_cost;
pub use cc::RegionMap;
pub use config::{Cost, SearchConfig, Weights};
pub use error::SearchError;
pub use probe::{Probe, ProbeReport, bridging_cells, shortcuts};
pub use search::{CostRecord, Search};
pub use traits::{Goal, GridMaze, Maze};
