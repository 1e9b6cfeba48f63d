//! Materialization: project one level's active set into render arrays.

use super::ClusterEngine;
use crate::mercator::NUM_LEVELS;
use crate::node::NodeId;
use crate::render::{RenderBatch, cluster_scale};

impl ClusterEngine {
    /// Materialize the active node set for a zoom level and return the
    /// render-ready arrays.
    ///
    /// The zoom level is clamped to [0, 19]. The rebuild is skipped when
    /// nothing changed since the previous call: no markers were added and,
    /// with clustering enabled, the level is the same. With clustering
    /// disabled the engine always resolves to level 0, where every marker
    /// is kept individually.
    ///
    /// Entries are emitted in ascending node-id order, so repeated rebuilds
    /// of the same state produce identical output.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use geocluster::{ClusterEngine, MarkerType};
    ///
    /// let mut engine = ClusterEngine::new();
    /// engine.add_marker(48.8566, 2.3522);
    ///
    /// let batch = engine.update(10);
    /// assert_eq!(batch.len(), 1);
    /// assert_eq!(batch.types[0], MarkerType::Point);
    /// ```
    pub fn update(&mut self, zoom: i32) -> &RenderBatch {
        let zoom = zoom.clamp(0, (NUM_LEVELS - 1) as i32) as usize;

        // Nothing to do if markers are unchanged (and, when clustering,
        // the level is unchanged too).
        if !self.markers_changed {
            if !self.config.clustering || self.materialized_level == Some(zoom) {
                return &self.batch;
            }
        }

        // Without clustering every marker lives at level 0.
        let level = if self.config.clustering { zoom } else { 0 };

        self.batch.clear();
        self.current_nodes.clear();

        let mut ids: Vec<NodeId> = self.levels.ids(level).collect();
        ids.sort_unstable();

        let k = self.config.max_cluster_scale_factor;
        for id in ids {
            let Some(node) = self.arena.get(id) else {
                log::error!("active node {} at level {} missing from arena", id.value(), level);
                continue;
            };
            if node.marker_count() == 1 {
                self.batch.push_point(node.position());
            } else {
                self.batch
                    .push_cluster(node.position(), cluster_scale(node.marker_count(), k));
            }
            self.current_nodes.push(id);
        }

        self.markers_changed = false;
        self.materialized_level = Some(level);
        log::debug!("materialized {} nodes at level {}", self.batch.len(), level);
        &self.batch
    }
}

#[cfg(test)]
mod tests {
    use crate::mercator::lat2y;
    use crate::render::{CLUSTER_COLOR, MARKER_COLOR, MarkerType};
    use crate::{ClusterEngine, Config};

    #[test]
    fn test_empty_engine_materializes_empty() {
        let mut engine = ClusterEngine::new();
        assert!(engine.update(0).is_empty());
        assert!(engine.update(19).is_empty());
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut engine = ClusterEngine::new();
        engine.add_marker(0.0, 0.0);

        assert_eq!(engine.update(99).len(), 1);
        engine.add_marker(45.0, -122.0);
        assert_eq!(engine.update(-3).len(), 2);
    }

    #[test]
    fn test_point_and_cluster_attributes() {
        let mut engine = ClusterEngine::new();
        engine.add_marker(0.0, 0.0);
        engine.add_marker(0.0001, 0.0001);
        engine.add_marker(45.0, -122.0);

        let batch = engine.update(0).clone();
        assert_eq!(batch.len(), 2);

        let cluster = batch
            .types
            .iter()
            .position(|t| *t == MarkerType::Cluster)
            .unwrap();
        let point = batch
            .types
            .iter()
            .position(|t| *t == MarkerType::Point)
            .unwrap();

        assert_eq!(batch.colors[cluster], CLUSTER_COLOR);
        assert_eq!(batch.colors[point], MARKER_COLOR);
        // 2-marker cluster pins the scale curve at 1.0
        assert_eq!(batch.scales[cluster], 1.0);
        assert_eq!(batch.scales[point], 1.0);
        assert_eq!(batch.positions[point].x(), -122.0);
        assert!((batch.positions[point].y() - lat2y(45.0)).abs() < 1e-12);
    }

    #[test]
    fn test_materialization_is_idempotent() {
        let mut engine = ClusterEngine::new();
        engine.add_marker(10.0, 20.0);
        engine.add_marker(10.5, 20.5);
        engine.add_marker(-33.0, 151.0);

        let first = engine.update(4).clone();
        let second = engine.update(4).clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rebuild_on_level_change() {
        let mut engine = ClusterEngine::new();
        engine.add_marker(0.0, 0.0);
        engine.add_marker(0.5, 0.5);

        let coarse = engine.update(0).len();
        let fine = engine.update(19).len();
        // Half a degree apart: one cluster when zoomed out, two points at
        // the finest level.
        assert_eq!(coarse, 1);
        assert_eq!(fine, 2);
    }

    #[test]
    fn test_rebuild_on_new_marker_same_level() {
        let mut engine = ClusterEngine::new();
        engine.add_marker(0.0, 0.0);
        assert_eq!(engine.update(19).len(), 1);

        engine.add_marker(45.0, -122.0);
        assert_eq!(engine.update(19).len(), 2);
    }

    #[test]
    fn test_clustering_disabled_resolves_to_level_zero() {
        let mut engine =
            ClusterEngine::with_config(Config::default().with_clustering(false)).unwrap();
        let n = 5;
        for i in 0..n {
            engine.add_marker(f64::from(i), f64::from(i) * 2.0);
        }

        // Any requested zoom shows all markers individually.
        let batch = engine.update(17).clone();
        assert_eq!(batch.len(), n as usize);
        assert!(batch.types.iter().all(|t| *t == MarkerType::Point));
        for i in 0..n as usize {
            assert_eq!(batch.positions[i].x(), f64::from(i as u32) * 2.0);
            assert!((batch.positions[i].y() - lat2y(f64::from(i as u32))).abs() < 1e-12);
        }
    }

    #[test]
    fn test_scenario_near_pair_then_portland() {
        let mut engine = ClusterEngine::new();
        engine.add_marker(0.0, 0.0);
        engine.add_marker(0.0001, 0.0001);

        let batch = engine.update(0).clone();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.types[0], MarkerType::Cluster);

        engine.add_marker(45.0, -122.0);
        let batch = engine.update(0).clone();
        assert_eq!(batch.len(), 2);
        let clusters = batch
            .types
            .iter()
            .filter(|t| **t == MarkerType::Cluster)
            .count();
        assert_eq!(clusters, 1);
    }
}
