use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};

use gridwalk_core::Pose;
use log::debug;

use crate::config::{Cost, SearchConfig};
use crate::error::SearchError;
use crate::traits::Maze;

/// Best known cost of a pose and every predecessor achieving it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostRecord {
    pub cost: Cost,
    pub steps: Cost,
    pub turns: Cost,
    /// Empty only for the start pose.
    pub preds: Vec<Pose>,
}

impl CostRecord {
    fn new(cost: Cost, steps: Cost, turns: Cost, pred: Option<Pose>) -> Self {
        Self {
            cost,
            steps,
            turns,
            preds: pred.into_iter().collect(),
        }
    }
}

/// Queue entry, ordered so that `BinaryHeap` pops the cheapest first and
/// equal costs in discovery order.
#[derive(Clone, Copy, Eq, PartialEq)]
struct QueueEntry {
    cost: Cost,
    seq: u64,
    pose: Pose,
    steps: Cost,
    turns: Cost,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse so BinaryHeap (max-heap) pops smallest cost first.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Weighted multi-path search over [`Pose`]s.
///
/// `Search` owns its priority queue and record maps, so running it
/// repeatedly reuses their allocations. After [`run`](Self::run) the
/// result is queried through [`best`](Self::best), [`goals`](Self::goals),
/// [`record`](Self::record) and the reconstruction methods.
pub struct Search {
    config: SearchConfig,
    start: Option<Pose>,
    records: HashMap<Pose, CostRecord>,
    open: BinaryHeap<QueueEntry>,
    goals: Vec<Pose>,
    best: Option<Cost>,
    expanded: usize,
    seq: u64,
}

impl Default for Search {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl Search {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            start: None,
            records: HashMap::new(),
            open: BinaryHeap::new(),
            goals: Vec::new(),
            best: None,
            expanded: 0,
            seq: 0,
        }
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Replace the configuration used by later runs.
    pub fn set_config(&mut self, config: SearchConfig) {
        self.config = config;
    }

    /// Find the cheapest cost from `start` to a goal of `maze`, recording
    /// every predecessor that achieves each pose's best cost.
    ///
    /// Returns `Ok(None)` when no goal is reachable below the configured
    /// limit.
    pub fn run<M: Maze>(&mut self, maze: &M, start: Pose) -> Result<Option<Cost>, SearchError> {
        let weights = self.config.weights;
        if weights.step == 0 {
            return Err(SearchError::InvalidWeights { step: weights.step });
        }

        self.reset(start);
        debug!("search from {start} with {weights:?}, limit {:?}", self.config.limit);

        if maze.is_goal(start.pos) {
            if self.config.within_limit(0) {
                self.best = Some(0);
                self.goals.push(start);
            }
            return Ok(self.best);
        }

        self.push(start, 0, 0, 0);

        while let Some(current) = self.open.pop() {
            // Lazy deletion: a cheaper route to this pose was found after
            // this entry was queued.
            let known = self.records.get(&current.pose).map(|r| r.cost);
            if known.is_some_and(|k| k < current.cost) {
                continue;
            }
            if !self.config.within_limit(current.cost) {
                debug!("limit reached at cost {}", current.cost);
                break;
            }
            self.expanded += 1;

            let ahead = current.pose.advance();
            if maze.is_goal(ahead.pos) {
                self.finish(&current, ahead);
                continue;
            }

            if self.best.is_some_and(|b| current.cost >= b) {
                continue;
            }

            if maze.is_open(ahead.pos) {
                self.relax(&current, ahead, current.steps + 1, current.turns);
            }
            for dir in current.pose.dir.turns() {
                if maze.is_open(current.pose.pos.step(dir)) {
                    let turned = current.pose.turned(dir);
                    self.relax(&current, turned, current.steps, current.turns + 1);
                }
            }
        }
        self.open.clear();

        debug!(
            "search from {start} done: best {:?}, {} goal states, {} expanded",
            self.best,
            self.goals.len(),
            self.expanded
        );
        Ok(self.best)
    }

    fn reset(&mut self, start: Pose) {
        self.start = Some(start);
        self.records.clear();
        self.open.clear();
        self.goals.clear();
        self.best = None;
        self.expanded = 0;
        self.seq = 0;
        self.records.insert(start, CostRecord::new(0, 0, 0, None));
    }

    fn push(&mut self, pose: Pose, cost: Cost, steps: Cost, turns: Cost) {
        self.open.push(QueueEntry {
            cost,
            seq: self.seq,
            pose,
            steps,
            turns,
        });
        self.seq += 1;
    }

    /// Record a move from `current` into the goal pose `goal`. Goal poses are
    /// terminal and never queued.
    fn finish(&mut self, current: &QueueEntry, goal: Pose) {
        let steps = current.steps + 1;
        let cost = self.config.weights.cost(steps, current.turns);
        if !self.config.within_limit(cost) {
            return;
        }
        // Costs pop in nondecreasing order, so the first finish is optimal.
        if cost > *self.best.get_or_insert(cost) {
            return;
        }

        match self.records.entry(goal) {
            Entry::Vacant(e) => {
                e.insert(CostRecord::new(cost, steps, current.turns, Some(current.pose)));
                self.goals.push(goal);
            }
            Entry::Occupied(mut e) => {
                let rec = e.get_mut();
                if !rec.preds.contains(&current.pose) {
                    rec.preds.push(current.pose);
                }
            }
        }
    }

    /// Relaxation: install, improve or extend the record of `next` reached
    /// from `current`.
    fn relax(&mut self, current: &QueueEntry, next: Pose, steps: Cost, turns: Cost) {
        let cost = self.config.weights.cost(steps, turns);
        let known = self.records.get(&next).map(|r| r.cost);
        match known {
            Some(k) if cost > k => {}
            Some(k) if cost == k => {
                // Zero-cost turns may link poses in both directions; the
                // cycles are kept and broken during reconstruction.
                if Some(next) == self.start {
                    return;
                }
                if let Some(rec) = self.records.get_mut(&next) {
                    if !rec.preds.contains(&current.pose) {
                        rec.preds.push(current.pose);
                    }
                }
            }
            _ => {
                self.records
                    .insert(next, CostRecord::new(cost, steps, turns, Some(current.pose)));
                self.push(next, cost, steps, turns);
            }
        }
    }

    /// Best finishing cost of the last run, or `None` if unreachable.
    #[inline]
    pub fn best(&self) -> Option<Cost> {
        self.best
    }

    /// Like [`best`](Self::best), but treats an unreachable goal as an error.
    pub fn require_best(&self) -> Result<Cost, SearchError> {
        self.best.ok_or(SearchError::Unreachable)
    }

    /// Goal poses reached at the best cost, in discovery order.
    #[inline]
    pub fn goals(&self) -> &[Pose] {
        &self.goals
    }

    /// Start pose of the last run.
    #[inline]
    pub fn start(&self) -> Option<Pose> {
        self.start
    }

    /// Cost record of `pose` from the last run.
    #[inline]
    pub fn record(&self, pose: Pose) -> Option<&CostRecord> {
        self.records.get(&pose)
    }

    #[inline]
    pub(crate) fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Number of poses expanded by the last run.
    #[inline]
    pub fn expanded(&self) -> usize {
        self.expanded
    }
}
