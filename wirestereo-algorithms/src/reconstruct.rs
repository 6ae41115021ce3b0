//! 3D geometry of matched projection pairs.
#![allow(clippy::missing_errors_doc)]

use wirestereo_core::error::{Error, Result};
use wirestereo_core::geometry::DetectorGeometry;
use wirestereo_core::hit::Point2D;
use wirestereo_core::track::{MatchOrientation, MatchedPair, Projection, Vec3};

/// Intersects one induction wire with one collection wire.
///
/// For stereo angle θ and chamber height H:
///
/// - `x` = drift coordinate
/// - `y` = (w_c - w_i) / (2 sin θ)
/// - `z` = (w_c + w_i) / (2 cos θ) - (H / 2) tan θ
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StereoIntersector {
    half_inv_sin: f64,
    half_inv_cos: f64,
    z_offset: f64,
}

impl StereoIntersector {
    /// Builds the intersector for a stereo angle (radians) and chamber height (cm).
    #[must_use]
    pub fn new(stereo_angle: f64, chamber_height: f64) -> Self {
        Self {
            half_inv_sin: 0.5 / stereo_angle.sin(),
            half_inv_cos: 0.5 / stereo_angle.cos(),
            z_offset: 0.5 * chamber_height * stereo_angle.tan(),
        }
    }

    /// Builds the intersector from detector geometry.
    #[must_use]
    pub fn from_geometry<G: DetectorGeometry + ?Sized>(geometry: &G) -> Self {
        Self::new(geometry.stereo_angle(), geometry.chamber_height())
    }

    /// 3D position where the two wires cross at drift coordinate `time`.
    #[inline]
    #[must_use]
    pub fn intersect(&self, time: f64, induction_wire: f64, collection_wire: f64) -> Vec3 {
        Vec3::new(
            time,
            (collection_wire - induction_wire) * self.half_inv_sin,
            (collection_wire + induction_wire) * self.half_inv_cos - self.z_offset,
        )
    }
}

/// Endpoints, direction and per-view origins of a matched pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackGeometry {
    /// Endpoint with the smaller `z`.
    pub start: Vec3,
    /// Endpoint with the larger `z`.
    pub end: Vec3,
    /// Unit vector from `start` to `end`.
    pub direction: Vec3,
    /// Induction endpoint (on the fitted line) that built `start`.
    pub induction_origin: Point2D,
    /// Collection endpoint (on the fitted line) that built `start`.
    pub collection_origin: Point2D,
}

/// Resolves the 3D endpoints of a matched pair.
///
/// The drift coordinate of both endpoints comes from the collection fit.
///
/// # Errors
/// Returns [`Error::ZeroLengthDirection`] when both endpoints coincide.
pub fn resolve_geometry(
    pair: &MatchedPair,
    induction: &Projection,
    collection: &Projection,
    intersector: &StereoIntersector,
) -> Result<TrackGeometry> {
    let (ind_first, ind_second) = match pair.orientation {
        MatchOrientation::Direct => (induction.start_on_line(), induction.end_on_line()),
        MatchOrientation::Reversed => (induction.end_on_line(), induction.start_on_line()),
    };
    let coll_first = collection.start_on_line();
    let coll_second = collection.end_on_line();

    let first = intersector.intersect(coll_first.time, ind_first.wire, coll_first.wire);
    let second = intersector.intersect(coll_second.time, ind_second.wire, coll_second.wire);

    let (start, end, induction_origin, collection_origin) = if first.z <= second.z {
        (first, second, ind_first, coll_first)
    } else {
        (second, first, ind_second, coll_second)
    };

    let direction = (end - start)
        .normalized()
        .ok_or(Error::ZeroLengthDirection {
            induction: pair.induction,
            collection: pair.collection,
        })?;

    Ok(TrackGeometry {
        start,
        end,
        direction,
        induction_origin,
        collection_origin,
    })
}
