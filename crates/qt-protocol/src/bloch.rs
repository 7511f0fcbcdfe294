//! Bloch-sphere state of a qubit
//!
//! Spherical coordinates in radians; `radius` in [0, 1] depicts
//! decoherence visually and is omitted from the wire when it is 1.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Radius drawn for a collapsed (measured) qubit.
const COLLAPSED_RADIUS: f64 = 0.68;

/// Orientation of a qubit on the Bloch sphere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlochState {
    pub theta: f64,
    pub phi: f64,
    #[serde(default = "unit_radius", skip_serializing_if = "is_unit_radius")]
    pub radius: f64,
}

fn unit_radius() -> f64 {
    1.0
}

fn is_unit_radius(radius: &f64) -> bool {
    (*radius - 1.0).abs() < f64::EPSILON
}

impl BlochState {
    /// A full-length vector at the given angles.
    pub fn new(theta: f64, phi: f64) -> Self {
        Self {
            theta,
            phi,
            radius: 1.0,
        }
    }

    /// The pure north-pole state |0>.
    pub fn pole() -> Self {
        Self::new(0.0, 0.0)
    }

    /// A full-length vector on the equator at azimuth `phi`,
    /// normalized into [0, 2π).
    pub fn equator(phi: f64) -> Self {
        let mut normalized = phi % (2.0 * PI);
        if normalized < 0.0 {
            normalized += 2.0 * PI;
        }
        Self::new(PI / 2.0, normalized)
    }

    /// Collapse to one of the two poles based on the sign of the
    /// pre-measurement projection onto the vertical axis. The shortened
    /// radius marks the state as measured.
    pub fn collapse(initial: &BlochState) -> Self {
        let theta = if initial.theta.cos() >= 0.0 { 0.0 } else { PI };
        Self {
            theta,
            phi: 0.0,
            radius: COLLAPSED_RADIUS,
        }
    }
}

impl Default for BlochState {
    fn default() -> Self {
        Self::pole()
    }
}
