//! wirestereo-algorithms: Stereo matching and 3D reconstruction.
//!
//! This crate provides the reconstruction stages:
//! - **Fitter** - least-squares line per 2D cluster, with vertex filtering
//! - **Matcher** - cross-view pairing on fitted endpoint times
//! - **Reconstruct** - 3D endpoints and direction of a matched pair
//! - **Correspondence** - hit-by-hit pairing into 3D space points
//!
#![warn(missing_docs)]

mod correspondence;
mod fitter;
mod matcher;
mod processing;
mod reconstruct;

pub use correspondence::{space_point, Correspondence, HitCorrespondence};
pub use fitter::{fit_line, project_hits, LineFit, ProjectionFitter};
pub use matcher::CrossViewMatcher;
pub use processing::{
    reconstruct_event, reconstruct_events, EventReconstruction, ReconstructionStatistics,
};
pub use reconstruct::{resolve_geometry, StereoIntersector, TrackGeometry};

// Re-export core types used at the API surface
pub use wirestereo_core::{Event, ReconstructionConfig, Track3D};
