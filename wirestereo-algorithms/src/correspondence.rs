//! Hit-level correspondence between two matched projections.
//!
//! Matching starts from the view with fewer hits. Each of its hits is paired
//! with the unused hit of the other view that lies at a comparable distance
//! from the track origin, after rescaling by the ratio of the two projected
//! lengths. Candidates must also pass a time gate and a wire gate.

use wirestereo_core::error::Error;
use wirestereo_core::hit::{Point2D, View};
use wirestereo_core::track::{ProjectedHit, Projection, SpacePoint3D};

use crate::reconstruct::{StereoIntersector, TrackGeometry};

/// Space points of one matched pair plus the hits left without a partner.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Correspondence {
    /// Space points in the order of the smaller view's hits.
    pub points: Vec<SpacePoint3D>,
    /// Hits of the smaller view that found no candidate.
    pub unmatched: Vec<usize>,
}

impl Correspondence {
    /// Returns one [`Error::NoHitCandidate`] per unmatched hit.
    pub fn misses(&self) -> impl Iterator<Item = Error> + '_ {
        self.unmatched
            .iter()
            .map(|&hit| Error::NoHitCandidate { hit })
    }
}

/// Greedy hit correspondence engine.
#[derive(Clone, Debug)]
pub struct HitCorrespondence {
    time_tolerance: f64,
    wire_gate: f64,
}

impl HitCorrespondence {
    /// Creates the engine with a time tolerance and a wire gate, both in cm.
    #[must_use]
    pub fn new(time_tolerance: f64, wire_gate: f64) -> Self {
        Self {
            time_tolerance,
            wire_gate,
        }
    }

    /// Pairs the hits of two matched projections.
    ///
    /// Every hit of the larger view is consumed by at most one space point.
    /// A hit of the smaller view with no candidate yields no point.
    #[must_use]
    pub fn correspond(
        &self,
        induction: &Projection,
        collection: &Projection,
        geometry: &TrackGeometry,
        intersector: &StereoIntersector,
    ) -> Correspondence {
        let (min_proj, max_proj) = if collection.len() <= induction.len() {
            (collection, induction)
        } else {
            (induction, collection)
        };
        let origin = |view: View| match view {
            View::Induction => geometry.induction_origin,
            View::Collection => geometry.collection_origin,
        };
        let min_origin = origin(min_proj.view);
        let max_origin = origin(max_proj.view);
        let ratio = length_ratio(induction.length(), collection.length());

        let mut consumed = vec![false; max_proj.hits.len()];
        let mut result = Correspondence {
            points: Vec::with_capacity(min_proj.hits.len()),
            unmatched: Vec::new(),
        };

        for min_hit in &min_proj.hits {
            let min_distance = ratio * min_hit.point.distance(&min_origin);

            let mut best: Option<(usize, f64)> = None;
            for (j, max_hit) in max_proj.hits.iter().enumerate() {
                if consumed[j] || !self.within_gates(&min_hit.point, &max_hit.point) {
                    continue;
                }
                let difference = (max_hit.point.distance(&max_origin) - min_distance).abs();
                if best.map_or(true, |(_, smallest)| difference < smallest) {
                    best = Some((j, difference));
                }
            }

            let Some((j, _)) = best else {
                result.unmatched.push(min_hit.hit);
                continue;
            };
            consumed[j] = true;

            let max_hit = &max_proj.hits[j];
            let (ind, coll) = match min_proj.view {
                View::Induction => (min_hit, max_hit),
                View::Collection => (max_hit, min_hit),
            };
            result.points.push(space_point(ind, coll, intersector));
        }

        result
    }

    #[inline]
    fn within_gates(&self, a: &Point2D, b: &Point2D) -> bool {
        (a.time - b.time).abs() < self.time_tolerance && (a.wire - b.wire).abs() < self.wire_gate
    }
}

/// Builds a space point from an induction hit and a collection hit.
///
/// The drift coordinate comes from the collection hit.
#[must_use]
pub fn space_point(
    induction: &ProjectedHit,
    collection: &ProjectedHit,
    intersector: &StereoIntersector,
) -> SpacePoint3D {
    SpacePoint3D {
        position: intersector.intersect(
            collection.point.time,
            induction.point.wire,
            collection.point.wire,
        ),
        induction_hit: induction.hit,
        collection_hit: collection.hit,
    }
}

/// Ratio of the longer projected length to the shorter one.
///
/// Falls back to 1 when either length is zero or not finite.
fn length_ratio(a: f64, b: f64) -> f64 {
    let ratio = a.max(b) / a.min(b);
    if ratio.is_finite() {
        ratio
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use wirestereo_core::track::Vec3;

    fn projection(view: View, first_hit: usize, points: &[(f64, f64)]) -> Projection {
        let hits: Vec<ProjectedHit> = points
            .iter()
            .enumerate()
            .map(|(k, &(wire, time))| ProjectedHit {
                hit: first_hit + k,
                point: Point2D::new(wire, time),
            })
            .collect();
        let start = hits[0].point;
        let end = hits[hits.len() - 1].point;
        Projection {
            view,
            cluster: 0,
            intercept: 0.0,
            slope: 0.0,
            start,
            end,
            start_line: start.time,
            end_line: end.time,
            hits,
        }
    }

    fn track_geometry(ind: &Projection, coll: &Projection) -> TrackGeometry {
        TrackGeometry {
            start: Vec3::default(),
            end: Vec3::new(1.0, 0.0, 0.0),
            direction: Vec3::new(1.0, 0.0, 0.0),
            induction_origin: ind.start_on_line(),
            collection_origin: coll.start_on_line(),
        }
    }

    fn intersector() -> StereoIntersector {
        StereoIntersector::new(30f64.to_radians(), 200.0)
    }

    #[test]
    fn test_one_to_one() {
        let ind = projection(View::Induction, 0, &[(1.0, 1.0), (1.4, 2.0), (1.8, 3.0)]);
        let coll = projection(View::Collection, 10, &[(4.0, 1.0), (4.4, 2.0), (4.8, 3.0)]);
        let engine = HitCorrespondence::new(0.5, 20.0);

        let result = engine.correspond(&ind, &coll, &track_geometry(&ind, &coll), &intersector());
        assert!(result.unmatched.is_empty());
        let pairs: Vec<(usize, usize)> = result
            .points
            .iter()
            .map(|p| (p.induction_hit, p.collection_hit))
            .collect();
        assert_eq!(pairs, vec![(0, 10), (1, 11), (2, 12)]);
    }

    #[test]
    fn test_smaller_view_drives_and_hits_consumed_once() {
        // two collection hits, five induction hits at the same times
        let ind = projection(
            View::Induction,
            0,
            &[(1.0, 1.0), (1.2, 1.5), (1.4, 2.0), (1.6, 2.5), (1.8, 3.0)],
        );
        let coll = projection(View::Collection, 10, &[(4.0, 1.0), (4.8, 3.0)]);
        let engine = HitCorrespondence::new(5.0, 20.0);

        let result = engine.correspond(&ind, &coll, &track_geometry(&ind, &coll), &intersector());
        assert_eq!(result.points.len(), 2);
        let used: HashSet<usize> = result.points.iter().map(|p| p.induction_hit).collect();
        assert_eq!(used.len(), 2);
        assert_eq!(result.points[0].collection_hit, 10);
        assert_eq!(result.points[1].collection_hit, 11);
    }

    #[test]
    fn test_no_candidate_emits_nothing() {
        let ind = projection(View::Induction, 0, &[(1.0, 1.0), (1.4, 2.0), (1.8, 3.0)]);
        // the last collection hit is far outside the time gate
        let coll = projection(View::Collection, 10, &[(4.0, 1.0), (4.4, 2.0), (4.8, 30.0)]);
        let engine = HitCorrespondence::new(0.5, 20.0);

        let result = engine.correspond(&ind, &coll, &track_geometry(&ind, &coll), &intersector());
        assert_eq!(result.points.len(), 2);
        assert_eq!(result.unmatched, vec![12]);
        assert!(result.points.iter().all(|p| p.collection_hit != 12));

        let misses: Vec<Error> = result.misses().collect();
        assert_eq!(misses, vec![Error::NoHitCandidate { hit: 12 }]);
        assert!(misses[0].is_recoverable());
    }

    #[test]
    fn test_wire_gate() {
        let ind = projection(View::Induction, 0, &[(1.0, 1.0), (1.4, 2.0)]);
        let coll = projection(View::Collection, 10, &[(40.0, 1.0), (40.4, 2.0)]);
        let engine = HitCorrespondence::new(0.5, 20.0);

        let result = engine.correspond(&ind, &coll, &track_geometry(&ind, &coll), &intersector());
        assert!(result.points.is_empty());
        assert_eq!(result.unmatched.len(), 2);
    }

    #[test]
    fn test_space_point_uses_collection_time() {
        let ind = ProjectedHit {
            hit: 1,
            point: Point2D::new(2.0, 5.0),
        };
        let coll = ProjectedHit {
            hit: 2,
            point: Point2D::new(3.0, 6.0),
        };
        let point = space_point(&ind, &coll, &intersector());
        assert!((point.position.x - 6.0).abs() < f64::EPSILON);
        assert_eq!((point.induction_hit, point.collection_hit), (1, 2));
    }

    #[test]
    fn test_length_ratio() {
        assert!((length_ratio(2.0, 4.0) - 2.0).abs() < f64::EPSILON);
        assert!((length_ratio(4.0, 2.0) - 2.0).abs() < f64::EPSILON);
        assert!((length_ratio(0.0, 4.0) - 1.0).abs() < f64::EPSILON);
    }
}
