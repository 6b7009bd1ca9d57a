//! Error type for color conversion and clustering

use std::fmt;

/// Errors returned by the conversion, clustering and rendering functions.
///
/// All of these are configuration or input errors; none are transient.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterError {
    /// Pixel buffer length does not match the declared dimensions
    InvalidShape {
        /// Number of values implied by width × height (× channels)
        expected: usize,
        /// Number of values actually present
        actual: usize,
    },
    /// No pixels to cluster
    EmptyPixelPool,
    /// Cluster centers requested before a successful fit
    NotFitted,
    /// K is zero or larger than the number of pixels
    InvalidClusterCount {
        k: usize,
        pixels: usize,
    },
    /// K range for automatic selection is empty or cannot be fit
    InvalidRange {
        k_min: usize,
        k_max: usize,
        /// Points available per subsample
        subsample_size: usize,
    },
    /// A numeric parameter is out of its valid domain
    InvalidParameter {
        name: &'static str,
        reason: String,
    },
}

impl fmt::Display for ClusterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterError::InvalidShape { expected, actual } => {
                write!(
                    f,
                    "invalid shape: expected {} values, got {}",
                    expected, actual
                )
            }
            ClusterError::EmptyPixelPool => write!(f, "pixel pool is empty"),
            ClusterError::NotFitted => {
                write!(f, "cluster centers requested before fit")
            }
            ClusterError::InvalidClusterCount { k, pixels } => {
                write!(
                    f,
                    "invalid cluster count {} for {} pixels (need 1 <= k <= pixels)",
                    k, pixels
                )
            }
            ClusterError::InvalidRange {
                k_min,
                k_max,
                subsample_size,
            } => {
                write!(
                    f,
                    "invalid k range {}..={} (need 2 <= min <= max <= {})",
                    k_min, k_max, subsample_size
                )
            }
            ClusterError::InvalidParameter { name, reason } => {
                write!(f, "invalid parameter {}: {}", name, reason)
            }
        }
    }
}

impl std::error::Error for ClusterError {}
