//! Engine configuration.
//!
//! Configuration is fixed for the lifetime of an engine instance and is
//! designed to be easily serializable and loadable from JSON or TOML while
//! keeping complexity minimal.

use crate::error::{ClusterError, Result};
use serde::{Deserialize, Serialize};

/// Clustering engine configuration.
///
/// # Example
///
/// ```rust
/// use geocluster::Config;
///
/// // Default config: clustering on, 80 px merge radius
/// let config = Config::default();
///
/// // Load from JSON
/// let json = r#"{
///     "clustering": true,
///     "cluster_distance": 60.0,
///     "max_cluster_scale_factor": 3.0
/// }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.cluster_distance, 60.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Whether markers are clustered across detail levels. When disabled,
    /// every marker is kept individually at level 0.
    #[serde(default = "Config::default_clustering")]
    pub clustering: bool,

    /// Screen-space radius in pixels within which two nodes at the same
    /// detail level merge into one cluster.
    #[serde(default = "Config::default_cluster_distance")]
    pub cluster_distance: f64,

    /// Horizontal asymptote of the cluster glyph scale curve. A 2-marker
    /// cluster always renders at scale 1.0; very large clusters approach
    /// this factor.
    #[serde(default = "Config::default_max_cluster_scale_factor")]
    pub max_cluster_scale_factor: f64,
}

impl Config {
    const fn default_clustering() -> bool {
        true
    }

    const fn default_cluster_distance() -> f64 {
        80.0
    }

    const fn default_max_cluster_scale_factor() -> f64 {
        2.0
    }

    /// Enable or disable clustering.
    pub fn with_clustering(mut self, enabled: bool) -> Self {
        self.clustering = enabled;
        self
    }

    /// Set the merge radius in screen pixels.
    pub fn with_cluster_distance(mut self, pixels: f64) -> Self {
        self.cluster_distance = pixels;
        self
    }

    /// Set the maximum cluster glyph scale factor.
    pub fn with_max_cluster_scale_factor(mut self, factor: f64) -> Self {
        self.max_cluster_scale_factor = factor;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if !self.cluster_distance.is_finite() || self.cluster_distance <= 0.0 {
            return Err(ClusterError::InvalidConfig(
                "cluster_distance must be positive and finite".to_string(),
            ));
        }

        // The scale curve uses b = 4k - 4; k below 1 would make a 2-marker
        // cluster larger than the asymptote.
        if !self.max_cluster_scale_factor.is_finite() || self.max_cluster_scale_factor < 1.0 {
            return Err(ClusterError::InvalidConfig(
                "max_cluster_scale_factor must be finite and >= 1.0".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load configuration from a TOML string (requires the `toml` feature).
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as a TOML string (requires the `toml` feature).
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ClusterError::ConfigParse(e.to_string()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clustering: Self::default_clustering(),
            cluster_distance: Self::default_cluster_distance(),
            max_cluster_scale_factor: Self::default_max_cluster_scale_factor(),
        }
    }
}
