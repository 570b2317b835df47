//! Connected-component labelling.

use gridwalk_core::{Grid, Point};

/// Label of cells not yet assigned to a region.
const UNLABELLED: usize = usize::MAX;

/// A partition of every grid cell into 4-connected regions.
#[derive(Debug, Clone)]
pub struct RegionMap {
    labels: Grid<usize>,
    sizes: Vec<usize>,
}

impl RegionMap {
    /// Label every cell of `grid`. Two orthogonal neighbours share a region
    /// when `same` holds for their values.
    ///
    /// Labels are assigned in row-major order of each region's first cell.
    pub fn label<T>(grid: &Grid<T>, same: impl Fn(&T, &T) -> bool) -> Self {
        let mut labels = grid.map(|_, _| UNLABELLED);
        let mut sizes = Vec::new();
        let mut stack = Vec::new();

        for (start, value) in grid.iter() {
            if labels.get(start).is_some_and(|&l| l != UNLABELLED) {
                continue;
            }

            // Iterative DFS from `start`.
            let label = sizes.len();
            let mut size = 0;
            if let Some(l) = labels.get_mut(start) {
                *l = label;
            }
            stack.clear();
            stack.push((start, value));

            while let Some((cp, cv)) = stack.pop() {
                size += 1;
                for np in grid.surrounding(cp) {
                    let Some(nv) = grid.get(np) else {
                        continue;
                    };
                    let Some(nl) = labels.get_mut(np) else {
                        continue;
                    };
                    if *nl == UNLABELLED && same(cv, nv) {
                        *nl = label;
                        stack.push((np, nv));
                    }
                }
            }

            sizes.push(size);
        }

        Self { labels, sizes }
    }

    /// Region label of `p`, or `None` outside the grid.
    #[inline]
    pub fn region_of(&self, p: Point) -> Option<usize> {
        self.labels.get(p).copied()
    }

    /// Number of regions.
    #[inline]
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Cell count of each region, indexed by label.
    #[inline]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// The largest region as `(label, size)`; ties go to the lower label.
    pub fn largest(&self) -> Option<(usize, usize)> {
        self.sizes
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
    }

    /// Cells of region `label`, in row-major order.
    pub fn members(&self, label: usize) -> Vec<Point> {
        self.labels.find_all(&label).collect()
    }

    /// Number of cell edges of region `label` that face another region or
    /// the grid boundary.
    pub fn perimeter(&self, label: usize) -> usize {
        self.labels
            .find_all(&label)
            .map(|p| {
                p.neighbors_4()
                    .into_iter()
                    .filter(|&n| self.region_of(n) != Some(label))
                    .count()
            })
            .sum()
    }
}
