//! Projections, matched pairs and reconstructed 3D tracks.

use crate::hit::{Point2D, View};
use std::ops::Sub;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A hit placed in its view's length-unit plane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProjectedHit {
    /// Index into the event's hit collection.
    pub hit: usize,
    /// Converted position.
    pub point: Point2D,
}

/// Straight-line fit of one 2D cluster.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Projection {
    /// View of the source cluster.
    pub view: View,
    /// Index of the source cluster in the event.
    pub cluster: usize,
    /// Fitted time at wire position zero (cm).
    pub intercept: f64,
    /// Fitted dTime/dWire.
    pub slope: f64,
    /// Position of the first hit in wire order.
    pub start: Point2D,
    /// Position of the last hit in wire order.
    pub end: Point2D,
    /// Fitted time at `start.wire`.
    pub start_line: f64,
    /// Fitted time at `end.wire`.
    pub end_line: f64,
    /// Hits in ascending wire order.
    pub hits: Vec<ProjectedHit>,
}

impl Projection {
    /// Start point on the fitted line.
    #[inline]
    #[must_use]
    pub fn start_on_line(&self) -> Point2D {
        Point2D::new(self.start.wire, self.start_line)
    }

    /// End point on the fitted line.
    #[inline]
    #[must_use]
    pub fn end_on_line(&self) -> Point2D {
        Point2D::new(self.end.wire, self.end_line)
    }

    /// Length of the fitted segment in its plane.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.start_on_line().distance(&self.end_on_line())
    }

    /// Returns the number of hits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Returns true if the projection has no hits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// How the endpoints of two matched projections line up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MatchOrientation {
    /// Start matches start, end matches end.
    Direct,
    /// Start of one matches end of the other.
    Reversed,
}

/// An induction projection paired with a collection projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatchedPair {
    /// Index into the induction projections.
    pub induction: usize,
    /// Index into the collection projections.
    pub collection: usize,
    /// Orientation the match was accepted under.
    pub orientation: MatchOrientation,
}

/// A point or vector in detector coordinates (cm).
///
/// `x` runs along the drift axis, `y` is vertical and `z` follows the beam.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Creates a new vector.
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm.
    #[inline]
    #[must_use]
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction, or `None` for a zero or non-finite vector.
    #[must_use]
    pub fn normalized(&self) -> Option<Self> {
        let norm = self.norm();
        if norm > 0.0 && norm.is_finite() {
            Some(Self::new(self.x / norm, self.y / norm, self.z / norm))
        } else {
            None
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Self) -> Self::Output {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// A 3D position built from one hit in each view.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpacePoint3D {
    /// Reconstructed position.
    pub position: Vec3,
    /// Contributing induction hit.
    pub induction_hit: usize,
    /// Contributing collection hit.
    pub collection_hit: usize,
}

/// A reconstructed straight track.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Track3D {
    /// Space points in the order their source hits were visited.
    pub points: Vec<SpacePoint3D>,
    /// Source induction cluster.
    pub induction_cluster: usize,
    /// Source collection cluster.
    pub collection_cluster: usize,
    /// Endpoint with the smaller `z`.
    pub start: Vec3,
    /// Endpoint with the larger `z`.
    pub end: Vec3,
    /// Unit vector from `start` to `end`.
    pub direction: Vec3,
}

impl Track3D {
    /// Distance between the track endpoints.
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Source clusters as `[induction, collection]`.
    #[must_use]
    pub fn clusters(&self) -> [usize; 2] {
        [self.induction_cluster, self.collection_cluster]
    }

    /// Returns the number of space points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if no space point was reconstructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let v = Vec3::new(3.0, 0.0, 4.0).normalized().unwrap();
        assert!((v.x - 0.6).abs() < 1e-12);
        assert!((v.z - 0.8).abs() < 1e-12);
        assert!((v.norm() - 1.0).abs() < 1e-12);
        assert!(Vec3::default().normalized().is_none());
        assert!(Vec3::new(f64::NAN, 1.0, 0.0).normalized().is_none());
    }

    #[test]
    fn test_projection_line() {
        let projection = Projection {
            view: View::Induction,
            cluster: 0,
            intercept: 1.0,
            slope: 0.5,
            start: Point2D::new(0.0, 1.0),
            end: Point2D::new(4.0, 3.0),
            start_line: 1.0,
            end_line: 3.0,
            hits: Vec::new(),
        };
        assert!((projection.length() - 20f64.sqrt()).abs() < 1e-12);
        assert!(projection.is_empty());
    }
}
