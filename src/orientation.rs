//! Rotor flux angle and magnitude, and the hand-off to a flux-oriented
//! (d/q) frame.
//!
//! The angle is always `atan2(beta, alpha)`: zero on the positive alpha
//! axis, increasing towards the positive beta axis, in the range (-pi, pi].
//! The magnitude is `hypot(alpha, beta)`. Every angle and magnitude exposed
//! by this crate goes through [`FluxPosition::from_flux`].
//!
//! A non-finite angle (bad motor constants upstream) has no fixed-point
//! orientation, so [`FieldOrientation::from_angle`] returns `None` for it.

use core::f32::consts::TAU;

use fixed::types::I16F16;

use crate::park_clarke::{park, AlphaBeta, DirectQuadrature};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FluxPosition {
    /// Radians
    pub angle: f32,
    /// Webers
    pub magnitude: f32,
}

impl FluxPosition {
    pub fn from_flux(flux: AlphaBeta) -> Self {
        Self {
            angle: libm::atan2f(flux.beta, flux.alpha),
            magnitude: libm::hypotf(flux.alpha, flux.beta),
        }
    }
}

/// Sine and cosine of the rotor flux angle, ready for a fixed-point FOC loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldOrientation {
    pub sin: I16F16,
    pub cos: I16F16,
}

impl FieldOrientation {
    /// Angle in radians
    ///
    /// `None` if the angle is not finite or does not fit in `I16F16`.
    pub fn from_angle(angle: f32) -> Option<Self> {
        let angle = if angle < 0. { angle + TAU } else { angle };
        let (sin, cos) = cordic::sin_cos(I16F16::checked_from_num(angle)?);
        Some(Self { sin, cos })
    }

    pub fn from_position(position: FluxPosition) -> Option<Self> {
        Self::from_angle(position.angle)
    }

    /// Rotate a stationary-frame quantity into the flux-oriented frame, so
    /// that d is aligned with the rotor flux.
    pub fn to_rotating(&self, value: AlphaBeta) -> DirectQuadrature {
        park(self.cos.to_num(), self.sin.to_num(), value)
    }
}
