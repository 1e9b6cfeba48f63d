//! Per-level active-node tables.
//!
//! The engine keeps one independent set of active node ids per detail
//! level. Membership changes only through insertion and merges; iteration
//! order carries no semantic meaning.

use crate::mercator::NUM_LEVELS;
use crate::node::NodeId;
use rustc_hash::FxHashSet;

/// Fixed array of 20 active-node sets, index 0 coarsest to 19 finest.
#[derive(Debug)]
pub(crate) struct LevelTable {
    levels: Vec<FxHashSet<NodeId>>,
}

impl LevelTable {
    pub(crate) fn new() -> Self {
        Self {
            levels: (0..NUM_LEVELS).map(|_| FxHashSet::default()).collect(),
        }
    }

    pub(crate) fn insert(&mut self, level: usize, id: NodeId) {
        self.levels[level].insert(id);
    }

    /// Remove a node from its level's set. Returns false if it was absent.
    pub(crate) fn remove(&mut self, level: usize, id: NodeId) -> bool {
        self.levels[level].remove(&id)
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, level: usize, id: NodeId) -> bool {
        self.levels[level].contains(&id)
    }

    pub(crate) fn population(&self, level: usize) -> usize {
        self.levels[level].len()
    }

    pub(crate) fn ids(&self, level: usize) -> impl Iterator<Item = NodeId> + '_ {
        self.levels[level].iter().copied()
    }

    pub(crate) fn clear(&mut self) {
        for level in &mut self.levels {
            level.clear();
        }
    }
}
