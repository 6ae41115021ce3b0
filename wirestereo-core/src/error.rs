//! Error types for wirestereo-core.

use crate::hit::View;
use thiserror::Error;

/// Result type alias for wirestereo operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for reconstruction.
///
/// The first three variants describe local geometric failures: the pipeline
/// logs them and moves on to the next cluster, pair or hit. The remaining
/// variants indicate broken input and abort processing of the event.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The cluster's hits cannot define a line.
    #[error("degenerate fit for cluster {cluster}: {reason}")]
    DegenerateFit { cluster: usize, reason: String },

    /// Both 3D endpoints of a matched pair coincide.
    #[error("zero-length direction for pair (induction {induction}, collection {collection})")]
    ZeroLengthDirection { induction: usize, collection: usize },

    /// No hit in the other view passed the time and wire gates.
    #[error("no correspondence candidate for hit {hit}")]
    NoHitCandidate { hit: usize },

    /// Cluster refers to a hit index outside the event.
    #[error("cluster {cluster} references hit {hit}, but the event holds {len} hits")]
    HitOutOfRange {
        cluster: usize,
        hit: usize,
        len: usize,
    },

    /// Hit channel has no wire in the detector geometry.
    #[error("channel {channel} of hit {hit} does not map to a wire")]
    UnmappedChannel { hit: usize, channel: u32 },

    /// Hit lies on a different plane than the cluster holding it.
    #[error("hit {hit} is on plane {hit_plane}, but cluster {cluster} is on plane {cluster_plane}")]
    PlaneMismatch {
        cluster: usize,
        hit: usize,
        hit_plane: u32,
        cluster_plane: u32,
    },

    /// Other malformed upstream data.
    #[error("unphysical input: {0}")]
    UnphysicalInput(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Returns true for failures that only skip a cluster, pair or hit.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DegenerateFit { .. } | Self::ZeroLengthDirection { .. } | Self::NoHitCandidate { .. }
        )
    }

    pub(crate) fn config(view: Option<View>, message: &str) -> Self {
        match view {
            Some(view) => Self::InvalidConfig(format!("{view}: {message}")),
            None => Self::InvalidConfig(message.to_string()),
        }
    }
}
