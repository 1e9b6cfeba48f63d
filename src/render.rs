//! Render-ready output of a materialization pass.
//!
//! A [`RenderBatch`] is a set of index-aligned arrays describing the active
//! node set of one detail level: projected positions, glyph type per entry,
//! a fixed RGB color per type, and a per-entry scale factor. A rendering
//! layer consumes these arrays directly; the engine keeps the matching
//! node-id list internally for pick resolution.

use geo::Point;
use serde::{Deserialize, Serialize};

/// Glyph type tag of a materialized entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerType {
    /// A single original marker.
    Point,
    /// An aggregate of two or more markers.
    Cluster,
}

/// RGB color triple.
pub type Rgb = [u8; 3];

/// Color of single-marker glyphs.
pub const MARKER_COLOR: Rgb = [0, 83, 155];

/// Color of cluster glyphs.
pub const CLUSTER_COLOR: Rgb = [0, 169, 179];

/// Glyph scale for a cluster of `marker_count` markers.
///
/// Second-order saturating curve `k*x^2 / (x^2 + b)` with `b = 4k - 4`,
/// pinned so a 2-marker cluster renders at exactly 1.0 and very large
/// clusters approach the asymptote `k`.
pub fn cluster_scale(marker_count: u32, max_scale_factor: f64) -> f64 {
    let k = max_scale_factor;
    let b = 4.0 * k - 4.0;
    let x = f64::from(marker_count);
    k * x * x / (x * x + b)
}

/// Index-aligned arrays produced by [`ClusterEngine::update`].
///
/// All four vectors have the same length; entry `i` of each describes the
/// same node.
///
/// [`ClusterEngine::update`]: crate::ClusterEngine::update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderBatch {
    /// Projected position (x = longitude, y = Mercator latitude).
    pub positions: Vec<Point<f64>>,
    /// Glyph type per entry.
    pub types: Vec<MarkerType>,
    /// Fixed RGB color per entry.
    pub colors: Vec<Rgb>,
    /// Render scale per entry: 1.0 for points, the saturating curve for
    /// clusters.
    pub scales: Vec<f64>,
}

impl RenderBatch {
    /// Number of materialized entries.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True if nothing is materialized.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.positions.clear();
        self.types.clear();
        self.colors.clear();
        self.scales.clear();
    }

    pub(crate) fn push_point(&mut self, position: Point<f64>) {
        self.positions.push(position);
        self.types.push(MarkerType::Point);
        self.colors.push(MARKER_COLOR);
        self.scales.push(1.0);
    }

    pub(crate) fn push_cluster(&mut self, position: Point<f64>, scale: f64) {
        self.positions.push(position);
        self.types.push(MarkerType::Cluster);
        self.colors.push(CLUSTER_COLOR);
        self.scales.push(scale);
    }
}
