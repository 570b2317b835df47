//! Path reconstruction from the predecessor records of a [`Search`].

use std::collections::{BTreeSet, HashSet};

use gridwalk_core::{Point, Pose};

use crate::Search;
use crate::config::{Cost, Weights};
use crate::error::SearchError;

/// Marks a trail node with no successor (a goal pose).
const ROOT: usize = usize::MAX;

impl Search {
    /// Every optimal path of the last run, each running from the start pose
    /// to a goal pose.
    ///
    /// Uses an explicit work stack over an arena of trail nodes, so deep
    /// mazes cannot exhaust the call stack. A predecessor already on the
    /// current trail is skipped, which breaks the cycles free turns can
    /// leave in the records. The number of paths can grow exponentially
    /// with the number of tied branches. Enumeration order is unspecified.
    pub fn paths(&self) -> Result<Vec<Vec<Pose>>, SearchError> {
        let mut out = Vec::new();
        let Some(start) = self.start() else {
            return Ok(out);
        };

        // Each trail node links towards the goal it was reached from.
        let mut trail: Vec<(Pose, usize)> = Vec::new();
        let mut stack: Vec<usize> = Vec::new();
        for &goal in self.goals().iter().rev() {
            trail.push((goal, ROOT));
            stack.push(trail.len() - 1);
        }

        while let Some(ti) = stack.pop() {
            let pose = trail[ti].0;
            let rec = self
                .record(pose)
                .ok_or(SearchError::MalformedState { pose })?;

            if rec.preds.is_empty() {
                if pose != start {
                    return Err(SearchError::MalformedState { pose });
                }
                let mut path = Vec::new();
                let mut i = ti;
                while i != ROOT {
                    path.push(trail[i].0);
                    i = trail[i].1;
                }
                out.push(path);
                continue;
            }

            for &pred in rec.preds.iter().rev() {
                if on_trail(&trail, ti, pred) {
                    continue;
                }
                trail.push((pred, ti));
                stack.push(trail.len() - 1);
            }
        }

        Ok(out)
    }

    /// One optimal path, following the first-discovered predecessor at each
    /// pose. Empty if the last run found no goal.
    pub fn path(&self) -> Result<Vec<Pose>, SearchError> {
        let (Some(start), Some(&goal)) = (self.start(), self.goals().first()) else {
            return Ok(Vec::new());
        };

        let mut path = vec![goal];
        let mut pose = goal;
        while pose != start {
            let rec = self
                .record(pose)
                .ok_or(SearchError::MalformedState { pose })?;
            pose = *rec
                .preds
                .first()
                .ok_or(SearchError::MalformedState { pose })?;
            path.push(pose);
            if path.len() > self.record_count() {
                return Err(SearchError::MalformedState { pose });
            }
        }
        path.reverse();
        Ok(path)
    }

    /// Cells visited by [`path`](Self::path), with turns in place collapsed.
    pub fn path_cells(&self) -> Result<Vec<Point>, SearchError> {
        let mut cells: Vec<Point> = self.path()?.into_iter().map(|p| p.pos).collect();
        cells.dedup();
        Ok(cells)
    }

    /// Every cell lying on at least one optimal path.
    ///
    /// Walks the predecessor graph once, so it stays linear even when the
    /// number of distinct optimal paths explodes. The graph may hold cycles
    /// of free turns; `seen` keeps the walk finite.
    pub fn tiles(&self) -> Result<BTreeSet<Point>, SearchError> {
        let mut tiles = BTreeSet::new();
        let mut seen: HashSet<Pose> = HashSet::new();
        let mut stack: Vec<Pose> = self.goals().to_vec();
        seen.extend(stack.iter().copied());

        while let Some(pose) = stack.pop() {
            tiles.insert(pose.pos);
            let rec = self
                .record(pose)
                .ok_or(SearchError::MalformedState { pose })?;
            if rec.preds.is_empty() && Some(pose) != self.start() {
                return Err(SearchError::MalformedState { pose });
            }
            for &pred in &rec.preds {
                if seen.insert(pred) {
                    stack.push(pred);
                }
            }
        }

        Ok(tiles)
    }
}

fn on_trail(trail: &[(Pose, usize)], mut i: usize, pose: Pose) -> bool {
    while i != ROOT {
        if trail[i].0 == pose {
            return true;
        }
        i = trail[i].1;
    }
    false
}

/// Recompute the cost of `path` from its transitions.
///
/// Returns `None` if two consecutive poses are neither a one-cell move in
/// the current facing nor a 90° turn in place.
pub fn replay_cost(path: &[Pose], weights: Weights) -> Option<Cost> {
    let mut steps = 0;
    let mut turns = 0;
    for pair in path.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if b == a.advance() {
            steps += 1;
        } else if a.pos == b.pos && a.dir.is_turn_to(b.dir) {
            turns += 1;
        } else {
            return None;
        }
    }
    Some(weights.cost(steps, turns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::traits::GridMaze;
    use gridwalk_core::{Direction, Grid};

    fn maze(lines: &[&str]) -> Grid<char> {
        Grid::from_rows(lines.iter().map(|l| l.chars().collect()).collect()).unwrap()
    }

    fn open(c: &char) -> bool {
        *c != '#'
    }

    #[test]
    fn single_corner_path() {
        let g = maze(&["...", "...", "..."]);
        let m = GridMaze::new(&g, open, Point::new(2, 2));
        let start = Pose::new(Point::new(0, 0), Direction::Right);
        let mut s = Search::default();
        s.run(&m, start).unwrap();

        let paths = s.paths().unwrap();
        assert_eq!(paths.len(), 1);
        let cells: Vec<Point> = s.path_cells().unwrap();
        assert_eq!(
            cells,
            vec![
                Point::new(0, 0),
                Point::new(0, 1),
                Point::new(0, 2),
                Point::new(1, 2),
                Point::new(2, 2)
            ]
        );
        assert_eq!(paths[0], s.path().unwrap());
        assert_eq!(replay_cost(&paths[0], Weights::default()), Some(1004));
        assert_eq!(s.tiles().unwrap().len(), 5);
    }

    #[test]
    fn symmetric_routes_are_both_enumerated() {
        let g = maze(&["...", ".#.", "..."]);
        let m = GridMaze::new(&g, open, Point::new(2, 1));
        let start = Pose::new(Point::new(0, 1), Direction::Down);
        let mut s = Search::default();
        s.run(&m, start).unwrap();

        let paths = s.paths().unwrap();
        assert_eq!(paths.len(), 2);
        for p in &paths {
            assert_eq!(p.first(), Some(&start));
            assert_eq!(p.last().map(|l| l.pos), Some(Point::new(2, 1)));
            assert_eq!(replay_cost(p, Weights::default()), Some(3004));
        }
        let tiles = s.tiles().unwrap();
        assert_eq!(tiles.len(), 8);
        assert!(!tiles.contains(&Point::new(1, 1)));
    }

    #[test]
    fn unreachable_yields_nothing() {
        let g = maze(&[".#E"]);
        let m = GridMaze::new(&g, open, Point::new(0, 2));
        let mut s = Search::default();
        s.run(&m, Pose::new(Point::new(0, 0), Direction::Right))
            .unwrap();
        assert!(s.paths().unwrap().is_empty());
        assert!(s.path().unwrap().is_empty());
        assert!(s.tiles().unwrap().is_empty());
    }

    #[test]
    fn free_turns_do_not_loop() {
        let g = maze(&["....", "....", "...."]);
        let m = GridMaze::new(&g, open, Point::new(2, 3));
        let start = Pose::new(Point::new(0, 0), Direction::Right);
        let mut s = Search::new(SearchConfig::default().with_weights(Weights::unit()));
        assert_eq!(s.run(&m, start).unwrap(), Some(5));

        let paths = s.paths().unwrap();
        assert!(!paths.is_empty());
        for p in &paths {
            assert_eq!(replay_cost(p, Weights::unit()), Some(5));
        }
        // Every cell lies on some monotone route.
        assert_eq!(s.tiles().unwrap().len(), 12);
    }

    #[test]
    fn free_turn_detour_keeps_its_cells() {
        // (2,1) lies on a tied route that turns left, then down, at (1,2).
        let g = maze(&["#.##", "...#", "#..#", "####"]);
        let m = GridMaze::new(&g, open, Point::new(3, 2));
        let start = Pose::new(Point::new(2, 0), Direction::Left);
        let mut s = Search::new(SearchConfig::default().with_weights(Weights::unit()));
        assert_eq!(s.run(&m, start).unwrap(), Some(5));

        let tiles = s.tiles().unwrap();
        let expected: BTreeSet<Point> = [(1, 0), (1, 1), (1, 2), (2, 0), (2, 1), (2, 2), (3, 2)]
            .into_iter()
            .map(|(r, c)| Point::new(r, c))
            .collect();
        assert_eq!(tiles, expected);

        let paths = s.paths().unwrap();
        let covered: BTreeSet<Point> = paths.iter().flatten().map(|p| p.pos).collect();
        assert_eq!(covered, tiles);
        for p in &paths {
            assert_eq!(p.first(), Some(&start));
            assert_eq!(replay_cost(p, Weights::unit()), Some(5));
        }
    }

    #[test]
    fn replay_rejects_jumps() {
        let a = Pose::new(Point::new(0, 0), Direction::Right);
        let b = Pose::new(Point::new(0, 2), Direction::Right);
        assert_eq!(replay_cost(&[a, b], Weights::default()), None);
        let reverse = a.turned(Direction::Left);
        assert_eq!(replay_cost(&[a, reverse], Weights::default()), None);
        assert_eq!(replay_cost(&[a], Weights::default()), Some(0));
    }
}
