//! Hit types and 2D coordinates for wire-plane data.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Wire-plane orientation taking part in stereo matching.
///
/// The induction view sits in front of the intermediate field boundary, the
/// collection view behind it. Drift times recorded on the collection view
/// include the transit across the induction-collection gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum View {
    /// First stereo view (plane 0).
    Induction,
    /// Second stereo view (plane 1).
    Collection,
}

impl View {
    /// Both stereo views in plane order.
    pub const ALL: [View; 2] = [View::Induction, View::Collection];

    /// Maps a plane number onto a stereo view.
    ///
    /// Planes beyond the first two do not take part in matching.
    #[inline]
    #[must_use]
    pub fn from_plane(plane: u32) -> Option<Self> {
        match plane {
            0 => Some(Self::Induction),
            1 => Some(Self::Collection),
            _ => None,
        }
    }

    /// Plane number of this view.
    #[inline]
    #[must_use]
    pub fn plane(self) -> u32 {
        match self {
            Self::Induction => 0,
            Self::Collection => 1,
        }
    }

    /// Array index for per-view tables.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.plane() as usize
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Induction => f.write_str("induction"),
            Self::Collection => f.write_str("collection"),
        }
    }
}

/// Plane and wire number a channel reads out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WireId {
    /// Plane number.
    pub plane: u32,
    /// Wire number within the plane.
    pub wire: u32,
}

impl WireId {
    /// Creates a new wire identifier.
    #[inline]
    #[must_use]
    pub fn new(plane: u32, wire: u32) -> Self {
        Self { plane, wire }
    }
}

/// A reconstructed ionization pulse on one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Hit {
    /// Readout channel.
    pub channel: u32,
    /// Time of the pulse maximum (ticks).
    pub peak_time: f64,
}

impl Hit {
    /// Creates a new hit.
    #[inline]
    #[must_use]
    pub fn new(channel: u32, peak_time: f64) -> Self {
        Self { channel, peak_time }
    }
}

/// Position in a wire plane, both axes in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point2D {
    /// Position across the wires.
    pub wire: f64,
    /// Position along the drift axis.
    pub time: f64,
}

impl Point2D {
    /// Creates a new plane position.
    #[inline]
    #[must_use]
    pub fn new(wire: f64, time: f64) -> Self {
        Self { wire, time }
    }

    /// Euclidean distance to another position.
    #[inline]
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.wire - other.wire).hypot(self.time - other.time)
    }

    /// Returns true if both coordinates are finite.
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.wire.is_finite() && self.time.is_finite()
    }
}
