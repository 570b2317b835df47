use std::collections::BTreeSet;

use gridwalk_core::{Grid, Point};

/// Minimal search interface: which cells may be entered, and which end the
/// search.
pub trait Maze {
    /// Whether a move may enter `p`. Out-of-bounds cells must report `false`.
    fn is_open(&self, p: Point) -> bool;

    /// Whether entering `p` satisfies the goal condition. A goal cell does
    /// not have to be open.
    fn is_goal(&self, p: Point) -> bool;
}

/// Goal condition for a [`GridMaze`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Goal {
    /// A single designated cell.
    At(Point),
    /// Any cell of the set.
    AnyOf(BTreeSet<Point>),
}

impl Goal {
    /// Whether `p` satisfies this goal.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        match self {
            Goal::At(g) => *g == p,
            Goal::AnyOf(set) => set.contains(&p),
        }
    }
}

impl From<Point> for Goal {
    fn from(p: Point) -> Self {
        Goal::At(p)
    }
}

impl FromIterator<Point> for Goal {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Goal::AnyOf(iter.into_iter().collect())
    }
}

/// A [`Maze`] over a borrowed [`Grid`], with passability decided by a
/// predicate on cell values.
pub struct GridMaze<'g, T, F> {
    grid: &'g Grid<T>,
    passable: F,
    goal: Goal,
}

impl<'g, T, F> GridMaze<'g, T, F>
where
    F: Fn(&T) -> bool,
{
    pub fn new(grid: &'g Grid<T>, passable: F, goal: impl Into<Goal>) -> Self {
        Self {
            grid,
            passable,
            goal: goal.into(),
        }
    }

    #[inline]
    pub fn grid(&self) -> &'g Grid<T> {
        self.grid
    }

    #[inline]
    pub fn goal(&self) -> &Goal {
        &self.goal
    }
}

impl<T, F> Maze for GridMaze<'_, T, F>
where
    F: Fn(&T) -> bool,
{
    #[inline]
    fn is_open(&self, p: Point) -> bool {
        self.grid.get(p).is_some_and(|v| (self.passable)(v))
    }

    #[inline]
    fn is_goal(&self, p: Point) -> bool {
        self.grid.contains(p) && self.goal.contains(p)
    }
}
