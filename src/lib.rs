//! Incremental multi-resolution clustering engine for map markers.
//!
//! Maintains a hierarchical clustering of geospatial point markers across 20
//! detail levels, updated incrementally on every insertion, so a renderer
//! can show individual markers when zoomed in and merged clusters when
//! zoomed out without ever re-clustering from scratch.
//!
//! ```rust
//! use geocluster::ClusterEngine;
//!
//! let mut engine = ClusterEngine::new();
//! engine.add_marker(40.7128, -74.0060); // New York
//! engine.add_marker(40.7306, -73.9866); // also New York
//! engine.add_marker(45.5152, -122.6784); // Portland
//!
//! // Zoomed out: the two NYC markers merge into one cluster
//! let batch = engine.update(4);
//! assert_eq!(batch.len(), 2);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub(crate) mod levels;
pub mod mercator;
pub mod node;
pub mod render;

pub use config::Config;
pub use engine::{ClusterEngine, EngineStats, PickSelection};
pub use error::{ClusterError, Result};
pub use node::{ClusteringNode, MarkerId, NodeId};
pub use render::{CLUSTER_COLOR, MARKER_COLOR, MarkerType, Rgb, RenderBatch, cluster_scale};

pub use geo::Point;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{ClusterEngine, ClusterError, Config, Result};

    pub use crate::{MarkerId, NodeId};

    pub use crate::{MarkerType, PickSelection, RenderBatch};

    pub use crate::mercator::{FINEST_LEVEL, NUM_LEVELS};

    pub use geo::Point;
}
