//! Engine tuning knobs.

/// Default number of nodes one synchronous search may materialize.
pub const DEFAULT_MATERIALIZE_BUDGET: usize = 100;

/// Default number of queued nodes one idle-time warming job processes.
pub const DEFAULT_WARM_BATCH: usize = 10;

/// Configuration for a [`Pathfinder`](crate::Pathfinder).
///
/// The materialization budget only bounds latency: a search that runs out
/// of budget reports "no path" and succeeds later once the background
/// warmer has filled the cache.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PathConfig {
    /// Maximum number of edge lists one search may compute itself.
    pub materialize_budget: usize,
    /// Maximum number of queued nodes one warming job processes.
    pub warm_batch: usize,
    /// Whether the token's elevation layer is part of node identity.
    pub vertical_layers: bool,
    /// Whether new caches schedule idle-time warming.
    pub background_warming: bool,
    /// Whether an identical repeated request reuses the previous result.
    pub memoize: bool,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            materialize_budget: DEFAULT_MATERIALIZE_BUDGET,
            warm_batch: DEFAULT_WARM_BATCH,
            vertical_layers: false,
            background_warming: true,
            memoize: true,
        }
    }
}

impl PathConfig {
    /// A configuration whose searches may materialize any number of nodes.
    pub fn unbounded() -> Self {
        Self {
            materialize_budget: usize::MAX,
            ..Self::default()
        }
    }
}
