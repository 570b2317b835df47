//! Obstacle-sensitivity probing: re-run the search on single-cell
//! modifications of a grid and measure how much each one saves.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use gridwalk_core::{Grid, Point, Pose};
use log::{trace, warn};
use rayon::prelude::*;

use crate::Search;
use crate::config::{Cost, SearchConfig};
use crate::error::SearchError;
use crate::traits::{Goal, GridMaze};

/// Aggregated probe results. Merging is associative and commutative, so
/// candidates can be evaluated in any order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProbeReport {
    /// Candidates evaluated.
    pub evaluated: usize,
    /// Candidates that met the requested saving.
    pub improved: usize,
    /// Number of improving candidates per saving.
    pub savings: BTreeMap<Cost, usize>,
    /// Largest saving and the candidate achieving it. Ties go to the
    /// smaller point.
    pub best: Option<(Point, Cost)>,
}

impl ProbeReport {
    /// Report for a single candidate.
    pub fn single(point: Point, saving: Option<Cost>) -> Self {
        let mut report = Self {
            evaluated: 1,
            ..Self::default()
        };
        if let Some(s) = saving {
            report.improved = 1;
            report.savings.insert(s, 1);
            report.best = Some((point, s));
        }
        report
    }

    pub fn merge(mut self, other: Self) -> Self {
        self.evaluated += other.evaluated;
        self.improved += other.improved;
        for (saving, n) in other.savings {
            *self.savings.entry(saving).or_default() += n;
        }
        self.best = match (self.best, other.best) {
            (Some(a), Some(b)) => Some(
                [a, b]
                    .into_iter()
                    .max_by_key(|&(p, s)| (s, Reverse(p)))
                    .unwrap_or(a),
            ),
            (a, b) => a.or(b),
        };
        self
    }

    /// Number of improving candidates saving at least `min`.
    pub fn count_at_least(&self, min: Cost) -> usize {
        self.savings.range(min..).map(|(_, n)| n).sum()
    }
}

/// Re-evaluates a baseline search on modified copies of a grid.
///
/// The baseline grid is only ever read; every candidate gets its own copy.
pub struct Probe<'g, T, F> {
    grid: &'g Grid<T>,
    passable: F,
    start: Pose,
    goal: Goal,
    config: SearchConfig,
}

impl<'g, T, F> Probe<'g, T, F>
where
    T: Clone + Send + Sync,
    F: Fn(&T) -> bool + Sync,
{
    pub fn new(grid: &'g Grid<T>, passable: F, start: Pose, goal: impl Into<Goal>) -> Self {
        Self {
            grid,
            passable,
            start,
            goal: goal.into(),
            config: SearchConfig::default(),
        }
    }

    /// Use `config` for the baseline and every candidate. Candidate searches
    /// override its limit.
    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Optimal cost on the unmodified grid.
    pub fn baseline(&self) -> Result<Option<Cost>, SearchError> {
        let maze = GridMaze::new(self.grid, &self.passable, self.goal.clone());
        Search::new(self.config).run(&maze, self.start)
    }

    /// Write `replacement` at `point` in a copy of the grid and search it.
    ///
    /// Returns the saving against `baseline` when the modified grid reaches
    /// the goal at cost `baseline - min_saving` or less. The search gives up
    /// as soon as that is no longer possible. Cells that are already
    /// passable are skipped.
    pub fn evaluate(
        &self,
        point: Point,
        replacement: T,
        baseline: Cost,
        min_saving: Cost,
    ) -> Result<Option<Cost>, SearchError> {
        if (self.passable)(self.grid.try_get(point)?) {
            warn!("probe candidate {point} is already passable, skipped");
            return Ok(None);
        }
        let Some(target) = baseline.checked_sub(min_saving) else {
            return Ok(None);
        };
        let config = match target.checked_add(1) {
            Some(limit) => self.config.with_limit(limit),
            None => SearchConfig {
                limit: None,
                ..self.config
            },
        };

        let candidate = self.grid.with_cell(point, replacement)?;
        let maze = GridMaze::new(&candidate, &self.passable, self.goal.clone());
        let mut search = Search::new(config);
        let cost = search.run(&maze, self.start)?;
        let saving = cost.map(|c| baseline - c);
        trace!("probe {point}: cost {cost:?}, saving {saving:?}");
        Ok(saving)
    }

    /// Evaluate every candidate in parallel and merge the results.
    pub fn run(
        &self,
        candidates: &[Point],
        replacement: &T,
        baseline: Cost,
        min_saving: Cost,
    ) -> Result<ProbeReport, SearchError> {
        candidates
            .par_iter()
            .map(|&p| -> Result<ProbeReport, SearchError> {
                let saving = self.evaluate(p, replacement.clone(), baseline, min_saving)?;
                Ok(ProbeReport::single(p, saving))
            })
            .try_reduce(ProbeReport::default, |a, b| Ok(a.merge(b)))
    }
}

/// Barrier cells with more than one non-barrier neighbour. Removing any
/// other barrier cannot open a new passage.
pub fn bridging_cells<T>(grid: &Grid<T>, is_barrier: impl Fn(&T) -> bool) -> Vec<Point> {
    grid.iter()
        .filter(|(_, v)| is_barrier(*v))
        .filter(|&(p, _)| {
            grid.surrounding(p)
                .filter(|&n| grid.get(n).is_some_and(|v| !is_barrier(v)))
                .count()
                > 1
        })
        .map(|(p, _)| p)
        .collect()
}

fn manhattan(a: Point, b: Point) -> i32 {
    (a.row - b.row).abs() + (a.col - b.col).abs()
}

/// Shortcuts along a unit-step path: pairs of cells at most `max_jump`
/// apart (Manhattan) whose jump saves at least `min_saving` steps over
/// following the path.
///
/// `path` must list consecutive cells one step apart, such as
/// [`Search::path_cells`] with unit weights. Pairs are returned as
/// `(smaller, larger)` points.
pub fn shortcuts(path: &[Point], max_jump: i32, min_saving: i32) -> BTreeSet<(Point, Point)> {
    (0..path.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            let from = path[i];
            path.iter().enumerate().skip(i + 1).filter_map(move |(j, &to)| {
                if from == to {
                    return None;
                }
                let jump = manhattan(from, to);
                let along = (j - i) as i32;
                (jump <= max_jump && along - jump >= min_saving)
                    .then(|| (from.min(to), from.max(to)))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Weights;
    use gridwalk_core::Direction;

    fn maze(lines: &[&str]) -> Grid<char> {
        Grid::from_rows(lines.iter().map(|l| l.chars().collect()).collect()).unwrap()
    }

    fn open(c: &char) -> bool {
        *c != '#'
    }

    fn down(row: i32, col: i32) -> Pose {
        Pose::new(Point::new(row, col), Direction::Down)
    }

    #[test]
    fn report_merge_is_order_independent() {
        let a = ProbeReport::single(Point::new(0, 1), Some(4));
        let b = ProbeReport::single(Point::new(0, 0), Some(4));
        let c = ProbeReport::single(Point::new(2, 2), None);
        let left = a.clone().merge(b.clone()).merge(c.clone());
        let right = c.merge(b.merge(a));
        assert_eq!(left, right);
        assert_eq!(left.evaluated, 3);
        assert_eq!(left.improved, 2);
        assert_eq!(left.best, Some((Point::new(0, 0), 4)));
        assert_eq!(left.count_at_least(4), 2);
        assert_eq!(left.count_at_least(5), 0);
    }

    #[test]
    fn bridging_cells_need_two_open_sides() {
        let g = maze(&["#####", "#.#.#", "#####"]);
        assert_eq!(bridging_cells(&g, |c| *c == '#'), vec![Point::new(1, 2)]);
    }

    #[test]
    fn wall_removal_saves_detour() {
        // Going round the wall takes 6 steps; opening (0,1) takes 2.
        let g = maze(&[
            "S#E", //
            ".#.", //
            "...",
        ]);
        let start = down(0, 0);
        let probe = Probe::new(&g, open, start, Point::new(0, 2))
            .with_config(SearchConfig::default().with_weights(Weights::unit()));
        let baseline = probe.baseline().unwrap().unwrap();
        assert_eq!(baseline, 6);

        let walls = bridging_cells(&g, |c| *c == '#');
        let report = probe.run(&walls, &'.', baseline, 1).unwrap();
        assert_eq!(report.evaluated, walls.len());
        assert_eq!(report.best, Some((Point::new(0, 1), 4)));
        assert_eq!(probe.evaluate(Point::new(1, 1), '.', baseline, 1).unwrap(), Some(2));
    }

    #[test]
    fn probe_out_of_range_is_error() {
        let g = maze(&["..."]);
        let probe = Probe::new(&g, open, down(0, 0), Point::new(0, 2));
        let err = probe.evaluate(Point::new(4, 4), '.', 10, 1).unwrap_err();
        assert!(matches!(err, SearchError::Grid(_)));
    }

    #[test]
    fn out_of_range_reported_before_budget_check() {
        let g = maze(&["..."]);
        let probe = Probe::new(&g, open, down(0, 0), Point::new(0, 2));
        let err = probe.evaluate(Point::new(0, 9), '.', 1, 5).unwrap_err();
        assert!(matches!(err, SearchError::Grid(_)));
    }

    #[test]
    fn unbounded_target_does_not_overflow() {
        let g = maze(&[".#."]);
        let start = Pose::new(Point::new(0, 0), Direction::Right);
        let probe = Probe::new(&g, open, start, Point::new(0, 2));
        assert_eq!(
            probe.evaluate(Point::new(0, 1), '.', Cost::MAX, 0).unwrap(),
            Some(Cost::MAX - 2)
        );
    }

    #[test]
    fn passable_candidate_skipped() {
        let g = maze(&["..."]);
        let probe = Probe::new(&g, open, down(0, 0), Point::new(0, 2));
        assert_eq!(probe.evaluate(Point::new(0, 1), '.', 10, 1).unwrap(), None);
    }

    #[test]
    fn shortcuts_on_u_turn() {
        // A U-shaped corridor: (0,0) down to (2,0), across, up to (0,2).
        let path = [
            Point::new(0, 0),
            Point::new(1, 0),
            Point::new(2, 0),
            Point::new(2, 1),
            Point::new(2, 2),
            Point::new(1, 2),
            Point::new(0, 2),
        ];
        let cuts = shortcuts(&path, 2, 2);
        assert!(cuts.contains(&(Point::new(0, 0), Point::new(0, 2))));
        assert!(cuts.contains(&(Point::new(1, 0), Point::new(1, 2))));
        assert!(!cuts.contains(&(Point::new(2, 0), Point::new(2, 2))));
        assert_eq!(cuts.len(), 2);
        assert!(shortcuts(&path, 1, 1).is_empty());
    }
}
