//! Event-level pipeline: clusters in, 3D tracks out.
#![allow(clippy::missing_errors_doc)]

use log::{debug, info, warn};
use rayon::prelude::*;
use wirestereo_core::cluster::Event;
use wirestereo_core::config::ReconstructionConfig;
use wirestereo_core::coordinates::CoordinateConverter;
use wirestereo_core::error::{Error, Result};
use wirestereo_core::geometry::DetectorGeometry;
use wirestereo_core::hit::View;
use wirestereo_core::track::{Projection, Track3D};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::correspondence::HitCorrespondence;
use crate::fitter::{project_hits, ProjectionFitter};
use crate::matcher::CrossViewMatcher;
use crate::reconstruct::{resolve_geometry, StereoIntersector};

/// Counters collected while reconstructing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReconstructionStatistics {
    /// Events processed.
    pub events: usize,
    /// Clusters read.
    pub clusters_seen: usize,
    /// Clusters on planes outside the stereo pair.
    pub clusters_ignored: usize,
    /// Clusters rejected by the vertex window.
    pub clusters_vertex_rejected: usize,
    /// Clusters whose fit failed.
    pub clusters_degenerate: usize,
    /// Induction projections built.
    pub induction_projections: usize,
    /// Collection projections built.
    pub collection_projections: usize,
    /// Matched pairs found.
    pub matched_pairs: usize,
    /// Pairs discarded for a zero-length direction.
    pub pairs_discarded: usize,
    /// Hits of the smaller view left without a partner.
    pub unmatched_hits: usize,
    /// Space points reconstructed.
    pub space_points: usize,
    /// Tracks emitted.
    pub tracks: usize,
}

impl ReconstructionStatistics {
    /// Adds the counters of another run.
    pub fn merge(&mut self, other: &Self) {
        self.events += other.events;
        self.clusters_seen += other.clusters_seen;
        self.clusters_ignored += other.clusters_ignored;
        self.clusters_vertex_rejected += other.clusters_vertex_rejected;
        self.clusters_degenerate += other.clusters_degenerate;
        self.induction_projections += other.induction_projections;
        self.collection_projections += other.collection_projections;
        self.matched_pairs += other.matched_pairs;
        self.pairs_discarded += other.pairs_discarded;
        self.unmatched_hits += other.unmatched_hits;
        self.space_points += other.space_points;
        self.tracks += other.tracks;
    }
}

/// Tracks and counters of one event.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventReconstruction {
    /// Event number.
    pub event: u64,
    /// Tracks in pair order.
    pub tracks: Vec<Track3D>,
    /// Counters for this event.
    pub statistics: ReconstructionStatistics,
}

/// Reconstructs the 3D tracks of one event.
///
/// Degenerate clusters, zero-length pairs and hits without a partner are
/// logged and skipped. An invalid configuration or geometry, and malformed
/// input, fail the whole event.
pub fn reconstruct_event<G: DetectorGeometry + ?Sized>(
    event: &Event,
    geometry: &G,
    config: &ReconstructionConfig,
) -> Result<EventReconstruction> {
    config.validate()?;
    geometry.validate_geometry()?;

    let converter = CoordinateConverter::new(geometry, config);
    let mut stats = ReconstructionStatistics {
        events: 1,
        ..Default::default()
    };

    let [induction, collection] = build_projections(event, geometry, &converter, config, &mut stats)?;
    stats.induction_projections = induction.len();
    stats.collection_projections = collection.len();

    let tolerance = config.match_tolerance_samples * converter.time_per_sample();
    let matcher = CrossViewMatcher::new(tolerance).with_exclusive(config.exclusive_matching);
    let pairs = matcher.match_projections(&induction, &collection);
    stats.matched_pairs = pairs.len();

    let intersector = StereoIntersector::from_geometry(geometry);
    let wire_gate = config.wire_gate_pitches * converter.wire_pitch(View::Collection);
    let engine = HitCorrespondence::new(tolerance, wire_gate);

    let mut tracks = Vec::with_capacity(pairs.len());
    for pair in &pairs {
        let ind = &induction[pair.induction];
        let coll = &collection[pair.collection];

        let track_geometry = match resolve_geometry(pair, ind, coll, &intersector) {
            Ok(track_geometry) => track_geometry,
            Err(err) if err.is_recoverable() => {
                warn!("event {}: {err}", event.id);
                stats.pairs_discarded += 1;
                continue;
            }
            Err(err) => return Err(err),
        };

        let correspondence = engine.correspond(ind, coll, &track_geometry, &intersector);
        for miss in correspondence.misses() {
            debug!("event {}: {miss}", event.id);
        }
        stats.unmatched_hits += correspondence.unmatched.len();
        stats.space_points += correspondence.points.len();

        tracks.push(Track3D {
            points: correspondence.points,
            induction_cluster: ind.cluster,
            collection_cluster: coll.cluster,
            start: track_geometry.start,
            end: track_geometry.end,
            direction: track_geometry.direction,
        });
    }
    stats.tracks = tracks.len();

    info!(
        "event {}: {} induction / {} collection projections, {} pairs, {} tracks",
        event.id, stats.induction_projections, stats.collection_projections, stats.matched_pairs,
        stats.tracks
    );

    Ok(EventReconstruction {
        event: event.id,
        tracks,
        statistics: stats,
    })
}

/// Reconstructs independent events in parallel.
///
/// Results keep the input order; a malformed event only fails its own slot.
pub fn reconstruct_events<G: DetectorGeometry + ?Sized>(
    events: &[Event],
    geometry: &G,
    config: &ReconstructionConfig,
) -> Vec<Result<EventReconstruction>> {
    events
        .par_iter()
        .map(|event| reconstruct_event(event, geometry, config))
        .collect()
}

/// Fits a projection for every usable cluster, split by view.
fn build_projections<G: DetectorGeometry + ?Sized>(
    event: &Event,
    geometry: &G,
    converter: &CoordinateConverter,
    config: &ReconstructionConfig,
    stats: &mut ReconstructionStatistics,
) -> Result<[Vec<Projection>; 2]> {
    let fitter = ProjectionFitter::new(config.vertex_window_ticks);
    let mut projections: [Vec<Projection>; 2] = [Vec::new(), Vec::new()];

    for (index, cluster) in event.clusters.iter().enumerate() {
        stats.clusters_seen += 1;

        let Some(view) = cluster.view() else {
            stats.clusters_ignored += 1;
            continue;
        };

        let hits = project_hits(event, index, view, geometry, converter)?;

        if !fitter.passes_vertex(cluster, event.vertex_on_plane(cluster.plane)) {
            stats.clusters_vertex_rejected += 1;
            continue;
        }

        match fitter.fit(index, view, hits) {
            Ok(projection) => projections[view.index()].push(projection),
            Err(err @ Error::DegenerateFit { .. }) => {
                warn!("event {}: {err}", event.id);
                stats.clusters_degenerate += 1;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(projections)
}
