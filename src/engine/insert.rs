//! Incremental marker insertion: climb, merge, and refinement cascade.
//!
//! Each new marker starts as a leaf at the finest level and climbs toward
//! level 0, either merging into the first in-range cluster it meets or
//! leaving a copy of itself at every level on the way up. A merge stops the
//! climb; the refinement phase then walks the remaining coarser levels and
//! propagates the merge's consequences (absorbed sibling chains, centroid
//! and count updates, follow-on merges) so every level is consistent again
//! before `add_marker` returns.

use super::ClusterEngine;
use crate::mercator::{self, FINEST_LEVEL};
use crate::node::{MarkerId, NodeId};
use geo::Point;
use smallvec::SmallVec;

/// Merge queues stay tiny in practice; one insertion rarely cascades more
/// than a couple of parents per level.
type MergeQueue = SmallVec<[NodeId; 4]>;

impl ClusterEngine {
    /// Add a marker and return its id.
    ///
    /// Marker ids are issued in strict call order starting at 0. Latitude
    /// is clamped to the Web-Mercator range before projection. Insertion
    /// always succeeds; it never rebalances or re-scans the whole tree.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use geocluster::ClusterEngine;
    ///
    /// let mut engine = ClusterEngine::new();
    /// assert_eq!(engine.add_marker(40.7128, -74.0060).value(), 0);
    /// assert_eq!(engine.add_marker(51.5074, -0.1278).value(), 1);
    /// ```
    pub fn add_marker(&mut self, latitude: f64, longitude: f64) -> MarkerId {
        let marker_id = MarkerId(self.marker_count);
        self.marker_count += 1;

        let position = Point::new(longitude, mercator::lat2y(latitude));
        log::debug!(
            "adding marker {} at ({}, {})",
            marker_id.value(),
            longitude,
            latitude
        );

        if self.config.clustering {
            self.insert_clustered(position, marker_id);
        } else {
            // Without clustering every marker lives individually in level
            // 0's active set, which is the level materialization resolves
            // to in this mode.
            let id = self.arena.alloc(0, position, 1, Some(marker_id));
            self.levels.insert(0, id);
        }

        self.markers_changed = true;
        marker_id
    }

    /// Climb phase: create the leaf at the finest level and populate
    /// coarser levels until a clustering partner is found.
    fn insert_clustered(&mut self, position: Point<f64>, marker_id: MarkerId) {
        let threshold = self.config.cluster_distance;

        let leaf = self.arena.alloc(FINEST_LEVEL, position, 1, Some(marker_id));
        self.levels.insert(FINEST_LEVEL, leaf);

        let mut node = leaf;
        for level in (0..FINEST_LEVEL).rev() {
            if let Some(closest) = self.find_closest_node(node, level, threshold) {
                log::debug!(
                    "marker {} joins node {} at level {}",
                    marker_id.value(),
                    closest.value(),
                    level
                );
                self.absorb_chain(closest, node);

                // The climb ends with the first merge; refinement takes
                // over one level coarser, along the partner's ancestors.
                if level > 0 {
                    match self.arena.get(closest).and_then(|n| n.parent()) {
                        Some(parent) => self.refine_upward(parent, level - 1),
                        None => log::error!(
                            "node {} at level {} has no parent to refine",
                            closest.value(),
                            level
                        ),
                    }
                }
                return;
            }

            // No partner: copy the chain head into this level and keep
            // climbing.
            let (pos, count, mid) = match self.arena.get(node) {
                Some(n) => (n.position(), n.marker_count(), n.marker_id()),
                None => {
                    log::error!("climbing node {} vanished", node.value());
                    return;
                }
            };
            let copy = self.arena.alloc(level, pos, count, mid);
            if let Some(n) = self.arena.get_mut(copy) {
                n.children.insert(node);
            }
            if let Some(n) = self.arena.get_mut(node) {
                n.parent = Some(copy);
            }
            self.levels.insert(level, copy);
            node = copy;
        }
    }

    /// Fold a freshly climbed chain head into an existing node one level
    /// coarser. Lighter than a same-level merge: the chain head has no
    /// parent yet and keeps its own subtree.
    fn absorb_chain(&mut self, target: NodeId, chain_head: NodeId) {
        let (head_pos, head_count) = match self.arena.get(chain_head) {
            Some(n) => (n.position(), n.marker_count()),
            None => {
                log::error!("chain head {} vanished before merge", chain_head.value());
                return;
            }
        };
        let Some(node) = self.arena.get_mut(target) else {
            log::error!("merge target {} vanished", target.value());
            return;
        };

        let total = node.marker_count + head_count;
        node.position = weighted_centroid(
            node.position,
            node.marker_count,
            head_pos,
            head_count,
            total,
        );
        node.marker_count = total;
        node.marker_id = None;
        node.children.insert(chain_head);

        if let Some(head) = self.arena.get_mut(chain_head) {
            head.parent = Some(target);
        }
    }

    /// Refinement phase: walk the ancestor chain from `start` (at
    /// `start_level`) down to level 0, absorbing queued sibling chains,
    /// recomputing each node from its children, and merging any neighbor
    /// the updated centroid moved into range of.
    fn refine_upward(&mut self, start: NodeId, start_level: usize) {
        let threshold = self.config.cluster_distance;
        let mut current = start;
        let mut level = start_level;
        let mut to_merge = MergeQueue::new();

        loop {
            let mut parents_to_merge = MergeQueue::new();

            // Absorb the former parents of nodes merged one level finer.
            for merging in std::mem::take(&mut to_merge) {
                if merging == current {
                    log::warn!(
                        "refinement target and merging node are the same ({})",
                        current.value()
                    );
                    continue;
                }
                self.merge_nodes(current, merging, &mut parents_to_merge, level);
            }

            // Independent correctness pass: rebuild count and centroid
            // from the direct children, replacing the incremental fix-ups
            // applied during merges.
            self.recompute_from_children(current);

            // The centroid moved; it may now be within range of a
            // neighbor that previously was not.
            if let Some(closest) = self.find_closest_node(current, level, threshold) {
                self.merge_nodes(current, closest, &mut parents_to_merge, level);
            }

            to_merge = parents_to_merge;

            if level == 0 {
                break;
            }
            match self.arena.get(current).and_then(|n| n.parent()) {
                Some(parent) => current = parent,
                None => {
                    if !to_merge.is_empty() {
                        log::error!(
                            "refinement stopped at level {} with {} nodes still queued",
                            level,
                            to_merge.len()
                        );
                    }
                    break;
                }
            }
            level -= 1;
        }
    }

    /// Merge `merging` into `node` at `level`, transferring children,
    /// applying the incremental ancestor count fix-up, and tombstoning the
    /// merged node. Former parents that differ from `node`'s parent are
    /// queued for refinement one level coarser.
    pub(super) fn merge_nodes(
        &mut self,
        node: NodeId,
        merging: NodeId,
        parents_to_merge: &mut MergeQueue,
        level: usize,
    ) {
        let Some(merging_node) = self.arena.get(merging) else {
            log::warn!("node {} already merged away", merging.value());
            return;
        };
        let merging_level = merging_node.level();
        let merging_pos = merging_node.position();
        let merging_count = merging_node.marker_count();
        let merging_parent = merging_node.parent();
        let merging_children: Vec<NodeId> = merging_node.children().collect();

        let Some(target) = self.arena.get_mut(node) else {
            log::error!("merge target {} vanished", node.value());
            return;
        };
        if target.level() != merging_level {
            log::error!(
                "node {} and node {} not at the same level",
                node.value(),
                merging.value()
            );
        }

        let total = target.marker_count + merging_count;
        target.position = weighted_centroid(
            target.position,
            target.marker_count,
            merging_pos,
            merging_count,
            total,
        );
        target.marker_count = total;
        target.marker_id = None;
        let node_parent = target.parent;
        for child in &merging_children {
            target.children.insert(*child);
        }
        for child in merging_children {
            if let Some(c) = self.arena.get_mut(child) {
                c.parent = Some(node);
            }
        }

        // Incremental ancestor fix-up. Transient: refinement recomputes
        // these counts from children at the next coarser level.
        if let Some(parent) = node_parent
            && let Some(p) = self.arena.get_mut(parent)
        {
            p.marker_count += merging_count;
        }
        if let Some(parent) = merging_parent {
            if let Some(p) = self.arena.get_mut(parent) {
                p.marker_count = p.marker_count.saturating_sub(merging_count);
                p.children.remove(&merging);
            }
            if Some(parent) != node_parent && !parents_to_merge.contains(&parent) {
                parents_to_merge.push(parent);
            }
        }

        if !self.levels.remove(level, merging) {
            log::error!("node {} not found at level {}", merging.value(), level);
        }
        self.arena.tombstone(merging);
        log::debug!("merged node {} into {}", merging.value(), node.value());
    }

    /// Recompute a node's marker count and position from its direct
    /// children (count-weighted centroid).
    fn recompute_from_children(&mut self, node: NodeId) {
        let Some(target) = self.arena.get(node) else {
            log::error!("cannot recompute vanished node {}", node.value());
            return;
        };
        let children: Vec<NodeId> = target.children().collect();
        if children.is_empty() {
            return;
        }

        let mut total: u32 = 0;
        let mut cx = 0.0;
        let mut cy = 0.0;
        for child_id in children {
            let Some(child) = self.arena.get(child_id) else {
                log::error!(
                    "child {} of node {} missing from arena",
                    child_id.value(),
                    node.value()
                );
                continue;
            };
            let w = f64::from(child.marker_count());
            total += child.marker_count();
            cx += w * child.position().x();
            cy += w * child.position().y();
        }
        if total == 0 {
            log::warn!("node {} has children but no markers", node.value());
            return;
        }

        if let Some(target) = self.arena.get_mut(node) {
            target.marker_count = total;
            if total > 1 {
                target.marker_id = None;
            }
            let w = f64::from(total);
            target.position = Point::new(cx / w, cy / w);
        }
    }
}

/// Count-weighted average of two positions.
fn weighted_centroid(a: Point<f64>, a_count: u32, b: Point<f64>, b_count: u32, total: u32) -> Point<f64> {
    let wa = f64::from(a_count);
    let wb = f64::from(b_count);
    let w = f64::from(total);
    Point::new(
        (a.x() * wa + b.x() * wb) / w,
        (a.y() * wa + b.y() * wb) / w,
    )
}
