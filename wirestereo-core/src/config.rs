//! Reconstruction configuration.

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tunable parameters of the stereo reconstruction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReconstructionConfig {
    /// Ticks recorded before the trigger, removed from every hit time.
    pub presampling_offset: f64,
    /// Cross-view time tolerance, in samples.
    pub match_tolerance_samples: f64,
    /// Maximum distance (ticks) between a cluster line and its plane's vertex hint.
    pub vertex_window_ticks: f64,
    /// Maximum cross-view wire separation for hit correspondence, in wire pitches.
    pub wire_gate_pitches: f64,
    /// Allow each projection in at most one matched pair.
    pub exclusive_matching: bool,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            presampling_offset: 60.0,
            match_tolerance_samples: 20.0,
            vertex_window_ticks: 100.0,
            wire_gate_pitches: 50.0,
            exclusive_matching: false,
        }
    }
}

impl ReconstructionConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the presampling offset.
    #[must_use]
    pub fn with_presampling_offset(mut self, ticks: f64) -> Self {
        self.presampling_offset = ticks;
        self
    }

    /// Sets the cross-view time tolerance.
    #[must_use]
    pub fn with_match_tolerance_samples(mut self, samples: f64) -> Self {
        self.match_tolerance_samples = samples;
        self
    }

    /// Sets the vertex consistency window.
    #[must_use]
    pub fn with_vertex_window_ticks(mut self, ticks: f64) -> Self {
        self.vertex_window_ticks = ticks;
        self
    }

    /// Sets the wire gate for hit correspondence.
    #[must_use]
    pub fn with_wire_gate_pitches(mut self, pitches: f64) -> Self {
        self.wire_gate_pitches = pitches;
        self
    }

    /// Enables or disables exclusive matching.
    #[must_use]
    pub fn with_exclusive_matching(mut self, exclusive: bool) -> Self {
        self.exclusive_matching = exclusive;
        self
    }

    /// Checks that gates are positive and the offset is finite.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] for the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if !self.presampling_offset.is_finite() {
            return Err(Error::InvalidConfig(
                "presampling offset must be finite".to_string(),
            ));
        }
        let gates = [
            ("match tolerance", self.match_tolerance_samples),
            ("vertex window", self.vertex_window_ticks),
            ("wire gate", self.wire_gate_pitches),
        ];
        for (name, value) in gates {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ReconstructionConfig::new()
            .with_presampling_offset(0.0)
            .with_match_tolerance_samples(5.0)
            .with_vertex_window_ticks(40.0)
            .with_wire_gate_pitches(10.0)
            .with_exclusive_matching(true);

        assert!(config.presampling_offset.abs() < f64::EPSILON);
        assert!((config.match_tolerance_samples - 5.0).abs() < f64::EPSILON);
        assert!((config.vertex_window_ticks - 40.0).abs() < f64::EPSILON);
        assert!((config.wire_gate_pitches - 10.0).abs() < f64::EPSILON);
        assert!(config.exclusive_matching);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_tolerance() {
        let config = ReconstructionConfig::new().with_match_tolerance_samples(0.0);
        assert!(config.validate().is_err());
        let config = ReconstructionConfig::new().with_presampling_offset(f64::NAN);
        assert!(config.validate().is_err());
    }
}
