//! Detector geometry and drift properties.
//!
//! Reconstruction only queries geometry through [`DetectorGeometry`], so a
//! host framework can plug in its own wire database. [`ChamberGeometry`] is a
//! self-contained two-view chamber with sequential channel numbering.

use crate::error::{Error, Result};
use crate::hit::{View, WireId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Electron drift properties of the chamber.
///
/// Velocities are in cm/us, the sample period in us.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DriftProperties {
    /// Digitizer sampling period.
    pub sample_period_us: f64,
    /// Drift velocity in the main drift volume.
    pub drift_velocity: f64,
    /// Drift velocity between the shield and induction planes.
    pub shield_induction_velocity: f64,
    /// Drift velocity between the induction and collection planes.
    pub induction_collection_velocity: f64,
}

impl Default for DriftProperties {
    fn default() -> Self {
        // 0.5, 0.7 and 0.9 kV/cm at 90 K
        Self {
            sample_period_us: 0.198,
            drift_velocity: 0.1575,
            shield_induction_velocity: 0.1830,
            induction_collection_velocity: 0.2016,
        }
    }
}

impl DriftProperties {
    /// Drift distance covered in one sample (cm).
    #[inline]
    #[must_use]
    pub fn time_per_sample(&self) -> f64 {
        self.drift_velocity * self.sample_period_us
    }

    /// Checks that every velocity and the sample period are positive.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] naming the first offending value.
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("sample period", self.sample_period_us),
            ("drift velocity", self.drift_velocity),
            ("shield-induction velocity", self.shield_induction_velocity),
            ("induction-collection velocity", self.induction_collection_velocity),
        ];
        for (name, value) in values {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Geometry queries needed by the reconstruction.
pub trait DetectorGeometry: Send + Sync {
    /// Perpendicular spacing of adjacent wires in `view` (cm).
    fn wire_pitch(&self, view: View) -> f64;

    /// Alignment offset of `view`, in units of its wire pitch.
    fn view_offset(&self, view: View) -> f64;

    /// Spacing between consecutive wire planes (cm).
    fn plane_pitch(&self) -> f64;

    /// Angle between the wires of the two views and the vertical (radians).
    fn stereo_angle(&self) -> f64;

    /// Full transverse height of the chamber (cm).
    fn chamber_height(&self) -> f64;

    /// Drift properties of the field regions.
    fn drift(&self) -> DriftProperties;

    /// Plane and wire read out by `channel`.
    fn channel_to_wire(&self, channel: u32) -> Option<WireId>;

    /// Checks the queried quantities the stereo formulas divide by.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] for a non-positive pitch or height,
    /// a stereo angle with zero sine or cosine, or bad drift properties.
    fn validate_geometry(&self) -> Result<()> {
        for view in View::ALL {
            let pitch = self.wire_pitch(view);
            if !(pitch.is_finite() && pitch > 0.0) {
                return Err(Error::config(Some(view), "wire pitch must be positive"));
            }
            if !self.view_offset(view).is_finite() {
                return Err(Error::config(Some(view), "view offset must be finite"));
            }
        }
        let plane_pitch = self.plane_pitch();
        if !(plane_pitch.is_finite() && plane_pitch > 0.0) {
            return Err(Error::config(None, "plane pitch must be positive"));
        }
        let height = self.chamber_height();
        if !(height.is_finite() && height > 0.0) {
            return Err(Error::config(None, "chamber height must be positive"));
        }
        let angle = self.stereo_angle();
        if !angle.is_finite() || angle.sin().abs() < 1e-9 || angle.cos().abs() < 1e-9 {
            return Err(Error::InvalidConfig(format!(
                "stereo angle {} deg does not triangulate",
                angle.to_degrees()
            )));
        }
        self.drift().validate()
    }
}

/// A two-view wire chamber with channels numbered plane by plane.
///
/// Channel `c` reads wire `c % wires_per_plane` of plane `c / wires_per_plane`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChamberGeometry {
    /// Wires per plane.
    pub wires_per_plane: u32,
    /// Number of instrumented planes.
    pub planes: u32,
    /// Wire pitch per stereo view (cm).
    pub wire_pitch: [f64; 2],
    /// Alignment offset per stereo view (wire pitches).
    pub view_offset: [f64; 2],
    /// Plane pitch (cm).
    pub plane_pitch: f64,
    /// Stereo angle (degrees).
    pub stereo_angle_deg: f64,
    /// Chamber height (cm).
    pub chamber_height: f64,
    /// Drift properties.
    pub drift: DriftProperties,
}

impl Default for ChamberGeometry {
    fn default() -> Self {
        Self {
            wires_per_plane: 240,
            planes: 2,
            wire_pitch: [0.4, 0.4],
            view_offset: [3.95, 1.84],
            plane_pitch: 0.4,
            stereo_angle_deg: 30.0,
            chamber_height: 40.0,
            drift: DriftProperties::default(),
        }
    }
}

impl ChamberGeometry {
    /// Creates the default two-view chamber.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the wire pitch of both views.
    #[must_use]
    pub fn with_wire_pitch(mut self, pitch: f64) -> Self {
        self.wire_pitch = [pitch, pitch];
        self
    }

    /// Sets the per-view alignment offsets.
    #[must_use]
    pub fn with_view_offsets(mut self, induction: f64, collection: f64) -> Self {
        self.view_offset = [induction, collection];
        self
    }

    /// Sets the plane pitch.
    #[must_use]
    pub fn with_plane_pitch(mut self, pitch: f64) -> Self {
        self.plane_pitch = pitch;
        self
    }

    /// Sets the stereo angle in degrees.
    #[must_use]
    pub fn with_stereo_angle_deg(mut self, degrees: f64) -> Self {
        self.stereo_angle_deg = degrees;
        self
    }

    /// Sets the chamber height.
    #[must_use]
    pub fn with_chamber_height(mut self, height: f64) -> Self {
        self.chamber_height = height;
        self
    }

    /// Sets the number of wires per plane.
    #[must_use]
    pub fn with_wires_per_plane(mut self, wires: u32) -> Self {
        self.wires_per_plane = wires;
        self
    }

    /// Sets the drift properties.
    #[must_use]
    pub fn with_drift(mut self, drift: DriftProperties) -> Self {
        self.drift = drift;
        self
    }

    /// Channel reading `wire` on `plane`.
    ///
    /// Returns `None` when the channel number does not fit in a `u32`.
    #[must_use]
    pub fn channel(&self, plane: u32, wire: u32) -> Option<u32> {
        plane
            .checked_mul(self.wires_per_plane)
            .and_then(|first| first.checked_add(wire))
    }

    /// Checks the geometry for values that would make the stereo formulas blow up.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.wires_per_plane == 0 || self.planes == 0 {
            return Err(Error::config(None, "chamber needs at least one plane and wire"));
        }
        self.validate_geometry()
    }
}

impl DetectorGeometry for ChamberGeometry {
    #[inline]
    fn wire_pitch(&self, view: View) -> f64 {
        self.wire_pitch[view.index()]
    }

    #[inline]
    fn view_offset(&self, view: View) -> f64 {
        self.view_offset[view.index()]
    }

    fn plane_pitch(&self) -> f64 {
        self.plane_pitch
    }

    fn stereo_angle(&self) -> f64 {
        self.stereo_angle_deg.to_radians()
    }

    fn chamber_height(&self) -> f64 {
        self.chamber_height
    }

    fn drift(&self) -> DriftProperties {
        self.drift
    }

    fn channel_to_wire(&self, channel: u32) -> Option<WireId> {
        if self.wires_per_plane == 0 {
            return None;
        }
        let plane = channel / self.wires_per_plane;
        (plane < self.planes).then(|| WireId::new(plane, channel % self.wires_per_plane))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_mapping() {
        let geometry = ChamberGeometry::default();
        assert_eq!(geometry.channel_to_wire(5), Some(WireId::new(0, 5)));
        assert_eq!(geometry.channel_to_wire(245), Some(WireId::new(1, 5)));
        assert_eq!(geometry.channel_to_wire(480), None);
        assert_eq!(geometry.channel(1, 5), Some(245));
    }

    #[test]
    fn test_channel_overflow() {
        let geometry = ChamberGeometry::default().with_wires_per_plane(u32::MAX);
        assert_eq!(geometry.channel(0, 7), Some(7));
        assert_eq!(geometry.channel(2, 0), None);
        assert_eq!(geometry.channel(1, 1), None);
    }

    #[test]
    fn test_default_geometry_is_valid() {
        assert!(ChamberGeometry::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_degenerate_angle() {
        let geometry = ChamberGeometry::default().with_stereo_angle_deg(0.0);
        assert!(matches!(geometry.validate(), Err(Error::InvalidConfig(_))));

        let geometry = ChamberGeometry::default().with_stereo_angle_deg(90.0);
        assert!(geometry.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_drift() {
        let drift = DriftProperties {
            drift_velocity: 0.0,
            ..Default::default()
        };
        let geometry = ChamberGeometry::default().with_drift(drift);
        assert!(geometry.validate().is_err());
    }

    #[test]
    fn test_trait_validation_rejects_zero_pitch() {
        let geometry = ChamberGeometry::default().with_wire_pitch(0.0);
        assert!(matches!(
            geometry.validate_geometry(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(ChamberGeometry::default().validate_geometry().is_ok());
    }
}
