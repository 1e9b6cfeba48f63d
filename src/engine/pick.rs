//! Pick resolution: map rendered-geometry selections back to marker and
//! cluster ids.

use super::ClusterEngine;
use crate::node::{MarkerId, NodeId};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Result of a pick query: the original markers and cluster nodes behind
/// the selected geometry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickSelection {
    /// Ids of selected single markers.
    pub markers: Vec<MarkerId>,
    /// Ids of selected cluster nodes.
    pub clusters: Vec<NodeId>,
}

impl PickSelection {
    /// Total number of resolved selections.
    pub fn len(&self) -> usize {
        self.markers.len() + self.clusters.len()
    }

    /// True if nothing was resolved.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty() && self.clusters.is_empty()
    }
}

impl ClusterEngine {
    /// Resolve selected geometry cells to marker and cluster ids.
    ///
    /// `cell_points` is supplied by the rendering boundary and maps each
    /// rendered geometry cell id to the index of the materialized point it
    /// was generated from. Every distinct point contributes at most one
    /// result, even when selected through several cells. Results are only
    /// meaningful against the most recent [`update`](Self::update); cells
    /// without a mapping and stale indices are skipped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::collections::HashMap;
    /// use geocluster::ClusterEngine;
    ///
    /// let mut engine = ClusterEngine::new();
    /// let id = engine.add_marker(37.77, -122.42);
    /// engine.update(3);
    ///
    /// // One glyph cell, generated from materialized point 0
    /// let cell_points = HashMap::from([(7u64, 0usize)]);
    /// let selection = engine.resolve_picks(&[7], &cell_points);
    /// assert_eq!(selection.markers, vec![id]);
    /// ```
    pub fn resolve_picks(
        &self,
        cells: &[u64],
        cell_points: &HashMap<u64, usize>,
    ) -> PickSelection {
        let mut selection = PickSelection::default();
        let mut seen_points: FxHashSet<usize> = FxHashSet::default();

        for &cell in cells {
            let Some(&point_index) = cell_points.get(&cell) else {
                log::warn!("no materialized point mapped for cell {cell}");
                continue;
            };
            if !seen_points.insert(point_index) {
                continue;
            }
            let Some(&node_id) = self.current_nodes.get(point_index) else {
                log::warn!("pick index {point_index} outside the current materialization");
                continue;
            };
            let Some(node) = self.arena.get(node_id) else {
                log::warn!("picked node {} is no longer live", node_id.value());
                continue;
            };

            if node.marker_count() == 1 {
                match node.marker_id() {
                    Some(marker) => selection.markers.push(marker),
                    None => log::error!(
                        "single-marker node {} is missing its marker id",
                        node_id.value()
                    ),
                }
            } else {
                selection.clusters.push(node_id);
            }
        }

        selection
    }
}
