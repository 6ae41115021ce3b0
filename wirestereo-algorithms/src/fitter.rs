//! Projection fitting: one straight line per 2D cluster.
#![allow(
    clippy::cast_precision_loss,
    clippy::float_cmp,
    clippy::missing_errors_doc
)]

use log::debug;
use wirestereo_core::cluster::{Cluster2D, Event, Vertex2D};
use wirestereo_core::coordinates::CoordinateConverter;
use wirestereo_core::error::{Error, Result};
use wirestereo_core::geometry::DetectorGeometry;
use wirestereo_core::hit::{Point2D, View};
use wirestereo_core::track::{ProjectedHit, Projection};

/// Ordinary least-squares line `time = intercept + slope * wire`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineFit {
    /// Time at wire position zero.
    pub intercept: f64,
    /// dTime/dWire.
    pub slope: f64,
}

impl LineFit {
    /// Evaluates the line at `wire`.
    #[inline]
    #[must_use]
    pub fn eval(&self, wire: f64) -> f64 {
        self.intercept + self.slope * wire
    }
}

/// Fits `time` against `wire` over all points.
///
/// Returns `None` when fewer than two distinct wire positions are present or
/// the result is not finite.
#[must_use]
pub fn fit_line(points: &[Point2D]) -> Option<LineFit> {
    let first = points.first()?;
    if points.iter().all(|p| p.wire == first.wire) {
        return None;
    }

    let n = points.len() as f64;
    let mean_wire = points.iter().map(|p| p.wire).sum::<f64>() / n;
    let mean_time = points.iter().map(|p| p.time).sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for p in points {
        let dw = p.wire - mean_wire;
        sxx += dw * dw;
        sxy += dw * (p.time - mean_time);
    }

    if sxx <= 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    let intercept = mean_time - slope * mean_wire;

    (slope.is_finite() && intercept.is_finite()).then_some(LineFit { intercept, slope })
}

/// Looks up, validates and converts the hits of one cluster.
///
/// Hits come back in ascending wire order; hits on the same wire keep the
/// cluster's order.
///
/// # Errors
/// Fails on empty clusters, out-of-range hit indices, unmapped channels,
/// non-finite hit times, and hits lying on a different plane than the cluster.
pub fn project_hits<G: DetectorGeometry + ?Sized>(
    event: &Event,
    cluster_index: usize,
    view: View,
    geometry: &G,
    converter: &CoordinateConverter,
) -> Result<Vec<ProjectedHit>> {
    let cluster = &event.clusters[cluster_index];
    if cluster.is_empty() {
        return Err(Error::UnphysicalInput(format!(
            "cluster {cluster_index} holds no hits"
        )));
    }

    let mut wired = Vec::with_capacity(cluster.len());
    for &hit_index in &cluster.hits {
        let hit = event.hits.get(hit_index).ok_or(Error::HitOutOfRange {
            cluster: cluster_index,
            hit: hit_index,
            len: event.hits.len(),
        })?;
        let wire = geometry
            .channel_to_wire(hit.channel)
            .ok_or(Error::UnmappedChannel {
                hit: hit_index,
                channel: hit.channel,
            })?;
        if wire.plane != cluster.plane {
            return Err(Error::PlaneMismatch {
                cluster: cluster_index,
                hit: hit_index,
                hit_plane: wire.plane,
                cluster_plane: cluster.plane,
            });
        }
        if !hit.peak_time.is_finite() {
            return Err(Error::UnphysicalInput(format!(
                "hit {hit_index} has peak time {}",
                hit.peak_time
            )));
        }
        wired.push((wire.wire, hit_index, hit.peak_time));
    }

    wired.sort_by_key(|&(wire, _, _)| wire);

    Ok(wired
        .into_iter()
        .map(|(wire, hit, time)| ProjectedHit {
            hit,
            point: converter.to_length_units(view, f64::from(wire), time),
        })
        .collect())
}

/// Builds projections from clusters.
#[derive(Clone, Debug)]
pub struct ProjectionFitter {
    vertex_window_ticks: f64,
}

impl ProjectionFitter {
    /// Creates a fitter with the given vertex consistency window (ticks).
    #[must_use]
    pub fn new(vertex_window_ticks: f64) -> Self {
        Self {
            vertex_window_ticks,
        }
    }

    /// Returns false if the cluster's recorded line misses the vertex hint.
    ///
    /// Clusters without a hint on their plane always pass.
    #[must_use]
    pub fn passes_vertex(&self, cluster: &Cluster2D, vertex: Option<&Vertex2D>) -> bool {
        let Some(vertex) = vertex else {
            return true;
        };
        let distance = (vertex.drift_time - cluster.time_at_wire(vertex.wire)).abs();
        if distance > self.vertex_window_ticks {
            debug!(
                "cluster on plane {} misses vertex by {distance:.1} ticks",
                cluster.plane
            );
            return false;
        }
        true
    }

    /// Fits a projection through hits already in wire order.
    ///
    /// # Errors
    /// Returns [`Error::DegenerateFit`] if the hits do not define a line.
    pub fn fit(&self, cluster: usize, view: View, hits: Vec<ProjectedHit>) -> Result<Projection> {
        let points: Vec<Point2D> = hits.iter().map(|h| h.point).collect();

        if points.iter().any(|p| !p.is_finite()) {
            return Err(Error::DegenerateFit {
                cluster,
                reason: "non-finite hit coordinate".to_string(),
            });
        }
        let fit = fit_line(&points).ok_or_else(|| Error::DegenerateFit {
            cluster,
            reason: format!("{} hit(s) on fewer than two distinct wires", points.len()),
        })?;

        let (Some(first), Some(last)) = (hits.first(), hits.last()) else {
            return Err(Error::DegenerateFit {
                cluster,
                reason: "no hits".to_string(),
            });
        };
        let start = first.point;
        let end = last.point;

        Ok(Projection {
            view,
            cluster,
            intercept: fit.intercept,
            slope: fit.slope,
            start,
            end,
            start_line: fit.eval(start.wire),
            end_line: fit.eval(end.wire),
            hits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use wirestereo_core::{ChamberGeometry, Hit, ReconstructionConfig};

    fn hits_at(points: &[(f64, f64)]) -> Vec<ProjectedHit> {
        points
            .iter()
            .enumerate()
            .map(|(hit, &(wire, time))| ProjectedHit {
                hit,
                point: Point2D::new(wire, time),
            })
            .collect()
    }

    #[test]
    fn test_exact_line() {
        let points = [
            Point2D::new(0.0, 1.0),
            Point2D::new(1.0, 3.0),
            Point2D::new(2.0, 5.0),
        ];
        let fit = fit_line(&points).unwrap();
        assert_relative_eq!(fit.slope, 2.0, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_noisy_line() {
        // residuals alternate around y = x; the line still passes the centroid
        let points = [
            Point2D::new(0.0, 0.1),
            Point2D::new(1.0, 0.9),
            Point2D::new(2.0, 2.1),
            Point2D::new(3.0, 2.9),
        ];
        let fit = fit_line(&points).unwrap();
        assert_relative_eq!(fit.slope, 0.96, epsilon = 1e-9);
        assert_relative_eq!(fit.eval(1.5), 1.5, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_fits() {
        assert!(fit_line(&[]).is_none());
        assert!(fit_line(&[Point2D::new(1.0, 1.0)]).is_none());
        assert!(fit_line(&[Point2D::new(1.0, 1.0), Point2D::new(1.0, 2.0)]).is_none());
    }

    #[test]
    fn test_projection_endpoints() {
        let fitter = ProjectionFitter::new(100.0);
        let hits = hits_at(&[(1.0, 10.0), (2.0, 12.5), (3.0, 14.0)]);
        let projection = fitter.fit(4, View::Collection, hits).unwrap();

        assert_eq!(projection.cluster, 4);
        assert_eq!(projection.view, View::Collection);
        assert_eq!(projection.start, Point2D::new(1.0, 10.0));
        assert_eq!(projection.end, Point2D::new(3.0, 14.0));
        let on_line = |wire: f64| projection.intercept + projection.slope * wire;
        assert_relative_eq!(projection.start_line, on_line(1.0));
        assert_relative_eq!(projection.end_line, on_line(3.0));
    }

    #[test]
    fn test_single_hit_is_degenerate() {
        let fitter = ProjectionFitter::new(100.0);
        let err = fitter
            .fit(0, View::Induction, hits_at(&[(1.0, 10.0)]))
            .unwrap_err();
        assert!(matches!(err, Error::DegenerateFit { cluster: 0, .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_vertex_window() {
        let fitter = ProjectionFitter::new(10.0);
        let cluster = Cluster2D::new(0, vec![0]).with_start(10.0, 100.0, 1.0);

        assert!(fitter.passes_vertex(&cluster, None));
        assert!(fitter.passes_vertex(&cluster, Some(&Vertex2D::new(0, 20.0, 115.0))));
        assert!(!fitter.passes_vertex(&cluster, Some(&Vertex2D::new(0, 20.0, 125.0))));
    }

    #[test]
    fn test_project_hits_sorts_by_wire() {
        let geometry = ChamberGeometry::default();
        let converter = CoordinateConverter::new(&geometry, &ReconstructionConfig::default());
        let mut event = Event::new(0);
        event.hits = vec![Hit::new(12, 104.0), Hit::new(10, 100.0), Hit::new(11, 102.0)];
        event.clusters.push(Cluster2D::new(0, vec![0, 1, 2]));

        let hits = project_hits(&event, 0, View::Induction, &geometry, &converter).unwrap();
        let order: Vec<usize> = hits.iter().map(|h| h.hit).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_project_hits_rejects_bad_input() {
        let geometry = ChamberGeometry::default();
        let converter = CoordinateConverter::new(&geometry, &ReconstructionConfig::default());
        let mut event = Event::new(0);
        event.hits = vec![Hit::new(10, 100.0), Hit::new(250, 100.0), Hit::new(9999, 1.0)];
        event.clusters.push(Cluster2D::new(0, vec![0, 5]));
        event.clusters.push(Cluster2D::new(0, vec![0, 1]));
        event.clusters.push(Cluster2D::new(0, vec![2]));
        event.clusters.push(Cluster2D::new(0, vec![]));

        let err = project_hits(&event, 0, View::Induction, &geometry, &converter).unwrap_err();
        assert!(matches!(err, Error::HitOutOfRange { hit: 5, .. }));
        let err = project_hits(&event, 1, View::Induction, &geometry, &converter).unwrap_err();
        assert!(matches!(err, Error::PlaneMismatch { hit_plane: 1, .. }));
        let err = project_hits(&event, 2, View::Induction, &geometry, &converter).unwrap_err();
        assert!(matches!(err, Error::UnmappedChannel { channel: 9999, .. }));
        let err = project_hits(&event, 3, View::Induction, &geometry, &converter).unwrap_err();
        assert!(!err.is_recoverable());
    }
}
