//! Clustering-node data model and the arena that owns every node.
//!
//! Nodes reference each other through stable [`NodeId`] indices rather than
//! pointers. The arena never reuses an id: deleting a node tombstones its
//! slot, so level tables and materialized snapshots can keep holding the id
//! without any risk of it resolving to a different node later.

use geo::Point;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Stable identifier of a clustering node, unique for the lifetime of an
/// engine instance (ids survive deletion and are never reassigned).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Numeric value of the id.
    pub fn value(self) -> usize {
        self.0
    }
}

/// Identifier of an original marker, issued in insertion order starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarkerId(pub(crate) usize);

impl MarkerId {
    /// Numeric value of the id.
    pub fn value(self) -> usize {
        self.0
    }
}

/// One node of the clustering tree: either a single marker or an aggregate
/// of the nodes one level finer that it subsumes.
#[derive(Debug, Clone)]
pub struct ClusteringNode {
    id: NodeId,
    level: usize,
    pub(crate) position: Point<f64>,
    pub(crate) marker_count: u32,
    pub(crate) marker_id: Option<MarkerId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: FxHashSet<NodeId>,
}

impl ClusteringNode {
    /// Node id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Detail level this node lives at (0 coarsest, 19 finest).
    pub fn level(&self) -> usize {
        self.level
    }

    /// Projected position: x = longitude, y = Mercator latitude.
    pub fn position(&self) -> Point<f64> {
        self.position
    }

    /// Number of original markers aggregated under this node (>= 1).
    pub fn marker_count(&self) -> u32 {
        self.marker_count
    }

    /// The original marker id when this node represents exactly one marker.
    pub fn marker_id(&self) -> Option<MarkerId> {
        self.marker_id
    }

    /// The node one level coarser that currently subsumes this node.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Ids of the nodes one level finer that this node subsumes.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().copied()
    }

    /// True if this node aggregates more than one marker.
    pub fn is_cluster(&self) -> bool {
        self.marker_count > 1
    }
}

/// Arena owning every [`ClusteringNode`].
///
/// Slots are addressed by [`NodeId`]; a tombstoned slot stays allocated so
/// later ids keep their positions and stale ids resolve to `None`.
#[derive(Debug, Default)]
pub(crate) struct NodeArena {
    slots: Vec<Option<ClusteringNode>>,
    live: usize,
}

impl NodeArena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Create a node with a fresh id and return the id.
    pub(crate) fn alloc(
        &mut self,
        level: usize,
        position: Point<f64>,
        marker_count: u32,
        marker_id: Option<MarkerId>,
    ) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Some(ClusteringNode {
            id,
            level,
            position,
            marker_count,
            marker_id,
            parent: None,
            children: FxHashSet::default(),
        }));
        self.live += 1;
        id
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&ClusteringNode> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut ClusteringNode> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    /// Logically delete a node. The id is never reissued.
    pub(crate) fn tombstone(&mut self, id: NodeId) {
        if let Some(slot) = self.slots.get_mut(id.0)
            && slot.take().is_some()
        {
            self.live -= 1;
        }
    }

    /// Total number of ids ever issued.
    pub(crate) fn created(&self) -> usize {
        self.slots.len()
    }

    /// Number of nodes not yet tombstoned.
    pub(crate) fn live(&self) -> usize {
        self.live
    }

    /// Drop every node and restart the id sequence. Only valid as part of a
    /// full engine reset.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.live = 0;
    }
}
