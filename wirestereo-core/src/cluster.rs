//! Upstream event content: hits, 2D clusters and vertex hints.

use crate::hit::{Hit, View};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A group of hits on one plane produced by upstream pattern recognition.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Cluster2D {
    /// Plane the cluster was found on.
    pub plane: u32,
    /// Indices into the event's hit collection.
    pub hits: Vec<usize>,
    /// Recorded start wire (wire number).
    pub start_wire: f64,
    /// Recorded start time (ticks).
    pub start_time: f64,
    /// Recorded slope (ticks per wire).
    pub dt_dw: f64,
}

impl Cluster2D {
    /// Creates a cluster over the given hits with no recorded start or slope.
    #[must_use]
    pub fn new(plane: u32, hits: Vec<usize>) -> Self {
        Self {
            plane,
            hits,
            ..Default::default()
        }
    }

    /// Sets the recorded start position and slope.
    #[must_use]
    pub fn with_start(mut self, wire: f64, time: f64, dt_dw: f64) -> Self {
        self.start_wire = wire;
        self.start_time = time;
        self.dt_dw = dt_dw;
        self
    }

    /// Stereo view of the cluster, if its plane takes part in matching.
    #[inline]
    #[must_use]
    pub fn view(&self) -> Option<View> {
        View::from_plane(self.plane)
    }

    /// Returns the number of hits in the cluster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Returns true if the cluster holds no hits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Time (ticks) of the recorded cluster line at `wire`.
    #[inline]
    #[must_use]
    pub fn time_at_wire(&self, wire: f64) -> f64 {
        self.start_time + self.dt_dw * (wire - self.start_wire)
    }
}

/// A 2D interaction vertex hint on one plane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex2D {
    /// Plane of the vertex.
    pub plane: u32,
    /// Wire number.
    pub wire: f64,
    /// Drift time (ticks).
    pub drift_time: f64,
}

impl Vertex2D {
    /// Creates a new vertex hint.
    #[must_use]
    pub fn new(plane: u32, wire: f64, drift_time: f64) -> Self {
        Self {
            plane,
            wire,
            drift_time,
        }
    }
}

/// Everything the reconstruction consumes for one event.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Event {
    /// Event number assigned upstream.
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: u64,
    /// Hit collection referenced by the clusters.
    pub hits: Vec<Hit>,
    /// 2D clusters.
    pub clusters: Vec<Cluster2D>,
    /// Optional vertex hints.
    #[cfg_attr(feature = "serde", serde(default))]
    pub vertices: Vec<Vertex2D>,
}

impl Event {
    /// Creates an empty event.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// First vertex hint recorded on `plane`.
    #[must_use]
    pub fn vertex_on_plane(&self, plane: u32) -> Option<&Vertex2D> {
        self.vertices.iter().find(|vertex| vertex.plane == plane)
    }
}
