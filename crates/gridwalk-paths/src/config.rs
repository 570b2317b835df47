/// Accumulated search cost.
pub type Cost = u32;

/// Cost of each transition kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Weights {
    /// Cost of advancing one cell. Must be > 0.
    pub step: Cost,
    /// Cost of a 90° turn in place.
    pub turn: Cost,
}

impl Default for Weights {
    /// Cheap steps, expensive turns (1 / 1000).
    fn default() -> Self {
        Self {
            step: 1,
            turn: 1000,
        }
    }
}

impl Weights {
    #[inline]
    pub const fn new(step: Cost, turn: Cost) -> Self {
        Self { step, turn }
    }

    /// Unit steps and free turns: plain shortest-path length.
    #[inline]
    pub const fn unit() -> Self {
        Self { step: 1, turn: 0 }
    }

    /// Total cost of `steps` moves and `turns` turns.
    #[inline]
    pub const fn cost(self, steps: Cost, turns: Cost) -> Cost {
        steps * self.step + turns * self.turn
    }
}

/// Configuration for a [`Search`](crate::Search).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    pub weights: Weights,
    /// Exclusive upper bound on reported costs. States popped at or above it
    /// end the search, and finishes at or above it are discarded.
    pub limit: Option<Cost>,
}

impl SearchConfig {
    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_limit(mut self, limit: Cost) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `cost` is below the configured limit.
    #[inline]
    pub fn within_limit(&self, cost: Cost) -> bool {
        self.limit.is_none_or(|l| cost < l)
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn config_round_trip() {
        let cfg = SearchConfig::default()
            .with_weights(Weights::new(2, 7))
            .with_limit(99);
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SearchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
