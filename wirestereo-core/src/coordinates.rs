//! Conversion of raw (wire, tick) pairs into centimetres.
//!
//! Drift time is corrected in two steps:
//!
//! 1. **Offsets**: the presampling offset is removed from every hit, and hits
//!    on the collection view also lose the transit time across the
//!    induction-collection gap.
//! 2. **Two-regime velocity**: the first `t_si` ticks of what remains were
//!    spent crossing the shield-induction gap and are converted at that gap's
//!    velocity; any excess is converted at the drift-volume velocity.
//!
//! Converting everything at the drift-volume velocity biases positions by an
//! amount proportional to the time spent in the first region.

use crate::config::ReconstructionConfig;
use crate::geometry::DetectorGeometry;
use crate::hit::{Point2D, View};

/// Converts raw hit coordinates into length units.
///
/// Built once per event from the geometry and configuration; holds only
/// derived constants.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateConverter {
    wire_pitch: [f64; 2],
    view_offset: [f64; 2],
    presampling_offset: f64,
    gap_transit_ticks: f64,
    first_region_ticks: f64,
    first_region_cm_per_tick: f64,
    cm_per_tick: f64,
}

impl CoordinateConverter {
    /// Derives conversion constants from geometry and configuration.
    #[must_use]
    pub fn new<G: DetectorGeometry + ?Sized>(geometry: &G, config: &ReconstructionConfig) -> Self {
        let drift = geometry.drift();
        let plane_pitch = geometry.plane_pitch();
        let tick = drift.sample_period_us;

        Self {
            wire_pitch: View::ALL.map(|view| geometry.wire_pitch(view)),
            view_offset: View::ALL.map(|view| geometry.view_offset(view)),
            presampling_offset: config.presampling_offset,
            gap_transit_ticks: plane_pitch / drift.induction_collection_velocity / tick,
            first_region_ticks: plane_pitch / drift.shield_induction_velocity / tick,
            first_region_cm_per_tick: drift.shield_induction_velocity * tick,
            cm_per_tick: drift.time_per_sample(),
        }
    }

    /// Converts a raw wire number and peak time on `view` into centimetres.
    #[inline]
    #[must_use]
    pub fn to_length_units(&self, view: View, raw_wire: f64, raw_time: f64) -> Point2D {
        let i = view.index();
        let wire = (raw_wire + self.view_offset[i]) * self.wire_pitch[i];

        let mut ticks = raw_time - self.presampling_offset;
        if view == View::Collection {
            ticks -= self.gap_transit_ticks;
        }

        let time = if ticks > self.first_region_ticks {
            (ticks - self.first_region_ticks) * self.cm_per_tick + self.first_region_length()
        } else {
            ticks * self.first_region_cm_per_tick
        };

        Point2D::new(wire, time)
    }

    /// Inverse of [`Self::to_length_units`]: returns `(raw_wire, raw_time)`.
    #[must_use]
    pub fn from_length_units(&self, view: View, point: Point2D) -> (f64, f64) {
        let i = view.index();
        let raw_wire = point.wire / self.wire_pitch[i] - self.view_offset[i];

        let boundary = self.first_region_length();
        let mut ticks = if point.time > boundary {
            self.first_region_ticks + (point.time - boundary) / self.cm_per_tick
        } else {
            point.time / self.first_region_cm_per_tick
        };
        if view == View::Collection {
            ticks += self.gap_transit_ticks;
        }

        (raw_wire, ticks + self.presampling_offset)
    }

    /// Drift distance of one sample in the drift volume (cm).
    #[inline]
    #[must_use]
    pub fn time_per_sample(&self) -> f64 {
        self.cm_per_tick
    }

    /// Ticks needed to cross the shield-induction gap.
    #[must_use]
    pub fn first_region_ticks(&self) -> f64 {
        self.first_region_ticks
    }

    /// Ticks needed to cross the induction-collection gap.
    #[must_use]
    pub fn gap_transit_ticks(&self) -> f64 {
        self.gap_transit_ticks
    }

    /// Wire pitch of `view` (cm).
    #[inline]
    #[must_use]
    pub fn wire_pitch(&self, view: View) -> f64 {
        self.wire_pitch[view.index()]
    }

    #[inline]
    fn first_region_length(&self) -> f64 {
        self.first_region_ticks * self.first_region_cm_per_tick
    }
}
