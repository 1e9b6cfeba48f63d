//! The clustering engine: owner of the node tree and per-level tables.
//!
//! This module defines the main [`ClusterEngine`] type; the insertion
//! algorithm, proximity search, materialization and pick resolution live in
//! the submodules.

use crate::config::Config;
use crate::error::Result;
use crate::levels::LevelTable;
use crate::mercator::NUM_LEVELS;
use crate::node::{ClusteringNode, NodeArena, NodeId};
use crate::render::RenderBatch;
use serde::{Deserialize, Serialize};

mod insert;
mod materialize;
mod pick;
mod search;

pub use pick::PickSelection;

/// Incremental multi-resolution clustering engine for map markers.
///
/// The engine maintains 20 detail levels (0 coarsest, 19 finest), each with
/// its own active set of clustering nodes. Markers are appended one at a
/// time; each insertion updates every level incrementally instead of
/// re-clustering from scratch.
///
/// # Thread Safety
///
/// The engine is single-threaded by design: every mutating operation takes
/// `&mut self` and runs to completion without blocking, and no internal
/// locking is provided. Wrap it yourself if you need to share it.
///
/// # Examples
///
/// ```rust
/// use geocluster::ClusterEngine;
///
/// let mut engine = ClusterEngine::new();
///
/// // Two nearby markers and one far away
/// engine.add_marker(0.0, 0.0);
/// engine.add_marker(0.0001, 0.0001);
/// engine.add_marker(45.0, -122.0);
///
/// // At the coarsest level the nearby pair collapses into one cluster
/// let batch = engine.update(0);
/// assert_eq!(batch.len(), 2);
/// ```
#[derive(Debug)]
pub struct ClusterEngine {
    pub(crate) arena: NodeArena,
    pub(crate) levels: LevelTable,
    pub(crate) config: Config,
    /// Number of markers added; the next marker id.
    pub(crate) marker_count: usize,
    /// Set on every insertion, cleared by materialization.
    pub(crate) markers_changed: bool,
    /// Level of the most recent materialization.
    pub(crate) materialized_level: Option<usize>,
    pub(crate) batch: RenderBatch,
    /// Node ids aligned with the batch arrays, for pick resolution.
    pub(crate) current_nodes: Vec<NodeId>,
}

/// Snapshot of engine counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Markers added since creation or the last reset.
    pub markers: usize,
    /// Node ids issued (including tombstoned nodes).
    pub nodes_created: usize,
    /// Nodes currently live across all levels.
    pub nodes_live: usize,
}

impl ClusterEngine {
    /// Create an engine with the default configuration.
    pub fn new() -> Self {
        Self::from_config(Config::default())
    }

    /// Create an engine with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::InvalidConfig`] if the configuration fails
    /// validation.
    ///
    /// [`ClusterError::InvalidConfig`]: crate::ClusterError::InvalidConfig
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: Config) -> Self {
        Self {
            arena: NodeArena::new(),
            levels: LevelTable::new(),
            config,
            marker_count: 0,
            markers_changed: false,
            materialized_level: None,
            batch: RenderBatch::default(),
            current_nodes: Vec::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of markers added so far.
    pub fn marker_count(&self) -> usize {
        self.marker_count
    }

    /// Number of active nodes at a detail level. Levels outside [0, 19]
    /// report 0.
    pub fn level_population(&self, level: usize) -> usize {
        if level < NUM_LEVELS {
            self.levels.population(level)
        } else {
            0
        }
    }

    /// Look up a node by id. Returns `None` for tombstoned or unknown ids.
    pub fn node(&self, id: NodeId) -> Option<&ClusteringNode> {
        self.arena.get(id)
    }

    /// Active nodes at a detail level, in ascending id order. Levels
    /// outside [0, 19] yield an empty list.
    pub fn nodes_at_level(&self, level: usize) -> Vec<&ClusteringNode> {
        if level >= NUM_LEVELS {
            return Vec::new();
        }
        let mut ids: Vec<NodeId> = self.levels.ids(level).collect();
        ids.sort_unstable();
        ids.into_iter().filter_map(|id| self.arena.get(id)).collect()
    }

    /// Engine counters.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            markers: self.marker_count,
            nodes_created: self.arena.created(),
            nodes_live: self.arena.live(),
        }
    }

    /// Delete every node across all levels and restore the marker and node
    /// counters to zero. The next materialization rebuilds from scratch.
    pub fn reset(&mut self) {
        self.arena.clear();
        self.levels.clear();
        self.marker_count = 0;
        self.markers_changed = true;
        self.materialized_level = None;
        self.batch.clear();
        self.current_nodes.clear();
        log::debug!("engine reset");
    }

    /// Verify the count/centroid invariants of the whole tree.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        for level in 0..NUM_LEVELS {
            for id in self.levels.ids(level) {
                let node = self.arena.get(id).expect("active node must be live");
                assert_eq!(node.level(), level, "node {} in wrong level set", id.value());
                assert!(node.marker_count() >= 1);
                assert_eq!(
                    node.marker_id().is_some(),
                    node.marker_count() == 1,
                    "marker id must be present exactly for single-marker nodes"
                );

                let children: Vec<_> = node
                    .children()
                    .map(|c| self.arena.get(c).expect("child must be live"))
                    .collect();
                if children.is_empty() {
                    continue;
                }

                let total: u32 = children.iter().map(|c| c.marker_count()).sum();
                assert_eq!(
                    node.marker_count(),
                    total,
                    "node {} count disagrees with its children",
                    id.value()
                );

                let mut cx = 0.0;
                let mut cy = 0.0;
                for child in &children {
                    let w = f64::from(child.marker_count());
                    cx += w * child.position().x();
                    cy += w * child.position().y();
                    assert_eq!(child.parent(), Some(id));
                }
                let w = f64::from(total);
                assert!((node.position().x() - cx / w).abs() < 1e-9);
                assert!((node.position().y() - cy / w).abs() < 1e-9);
            }
        }
    }
}

impl Default for ClusterEngine {
    fn default() -> Self {
        Self::new()
    }
}
