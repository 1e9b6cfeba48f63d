//! Nearest-neighbor proximity search within one detail level.

use super::ClusterEngine;
use crate::mercator::pixel_scale;
use crate::node::NodeId;

impl ClusterEngine {
    /// Find the active node at `level` closest to `probe`, if any lies
    /// strictly within `threshold_px` screen pixels of it.
    ///
    /// The pixel threshold is converted into projected degrees using the
    /// level's scale factor, so the same pixel radius covers more
    /// geography at coarser levels. The scan is linear in the level's
    /// population; on an exact distance tie the first node encountered
    /// wins.
    pub(crate) fn find_closest_node(
        &self,
        probe: NodeId,
        level: usize,
        threshold_px: f64,
    ) -> Option<NodeId> {
        let probe_node = self.arena.get(probe)?;
        let position = probe_node.position();

        let gcs_threshold = pixel_scale(level) * threshold_px;
        let mut closest_distance2 = gcs_threshold * gcs_threshold;
        let mut closest = None;

        for other_id in self.levels.ids(level) {
            if other_id == probe {
                continue;
            }
            let Some(other) = self.arena.get(other_id) else {
                log::error!(
                    "active node {} at level {} missing from arena",
                    other_id.value(),
                    level
                );
                continue;
            };

            let dx = other.position().x() - position.x();
            let dy = other.position().y() - position.y();
            let d2 = dx * dx + dy * dy;
            if d2 < closest_distance2 {
                closest = Some(other_id);
                closest_distance2 = d2;
            }
        }

        closest
    }
}
