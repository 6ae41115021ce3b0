//! wirestereo-core: Core types for stereo wire-chamber reconstruction.
//!
//! This crate provides the event data model, detector geometry queries,
//! reconstruction configuration, and the raw-to-length coordinate converter.
//!

pub mod cluster;
pub mod config;
pub mod coordinates;
pub mod error;
pub mod geometry;
pub mod hit;
pub mod track;

pub use cluster::{Cluster2D, Event, Vertex2D};
pub use config::ReconstructionConfig;
pub use coordinates::CoordinateConverter;
pub use error::{Error, Result};
pub use geometry::{ChamberGeometry, DetectorGeometry, DriftProperties};
pub use hit::{Hit, Point2D, View, WireId};
pub use track::{MatchOrientation, MatchedPair, ProjectedHit, Projection, SpacePoint3D, Track3D, Vec3};
