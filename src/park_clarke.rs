//! Park and Clarke transformations (along with their inverses).
//!
//! The algorithms implemented here are based on [Microsemi's suggested implementation](https://www.microsemi.com/document-portal/doc_view/132799-park-inverse-park-and-clarke-inverse-clarke-transformations-mss-software-implementation-user-guide)
//!
//! [`AlphaBeta`] is also the sample type every observer in this crate consumes
//! and produces.

use core::ops::{Add, Mul, Neg, Sub};

use crate::{FRAC_1_SQRT_3, SQRT_3};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DirectQuadrature {
    pub d: f32,
    pub q: f32,
}

/// Two-phase stationary orthogonal reference frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlphaBeta {
    pub alpha: f32,
    pub beta: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThreePhase {
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

/// Three-phase quantity where a + b + c equals zero, so c is implied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThreePhaseBalanced {
    pub a: f32,
    pub b: f32,
}

impl AlphaBeta {
    pub const ZERO: Self = Self::new(0., 0.);

    pub const fn new(alpha: f32, beta: f32) -> Self {
        Self { alpha, beta }
    }

    /// Planar cross product, `self.alpha * other.beta - self.beta * other.alpha`.
    pub fn cross(self, other: Self) -> f32 {
        self.alpha * other.beta - self.beta * other.alpha
    }

    /// The same vector with its axes exchanged.
    pub const fn swapped(self) -> Self {
        Self::new(self.beta, self.alpha)
    }
}

impl Add for AlphaBeta {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.alpha + rhs.alpha, self.beta + rhs.beta)
    }
}

impl Sub for AlphaBeta {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.alpha - rhs.alpha, self.beta - rhs.beta)
    }
}

impl Mul<f32> for AlphaBeta {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.alpha * rhs, self.beta * rhs)
    }
}

impl Neg for AlphaBeta {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.alpha, -self.beta)
    }
}

/// Clarke transform
///
/// Implements equations 1-4 from the Microsemi guide.
pub fn clarke(inputs: ThreePhaseBalanced) -> AlphaBeta {
    AlphaBeta {
        // Eq3
        alpha: inputs.a,
        // Eq4
        beta: FRAC_1_SQRT_3 * (inputs.a + 2. * inputs.b),
    }
}

/// Inverse Clarke transform
///
/// Implements equations 5-7 from the Microsemi guide.
pub fn inverse_clarke(inputs: AlphaBeta) -> ThreePhase {
    ThreePhase {
        // Eq5
        a: inputs.alpha,
        // Eq6
        b: (-inputs.alpha + SQRT_3 * inputs.beta) / 2.,
        // Eq7
        c: (-inputs.alpha - SQRT_3 * inputs.beta) / 2.,
    }
}

/// Park transform
///
/// Implements equations 8 and 9 from the Microsemi guide.
pub fn park(cos_angle: f32, sin_angle: f32, inputs: AlphaBeta) -> DirectQuadrature {
    DirectQuadrature {
        // Eq8
        d: cos_angle * inputs.alpha + sin_angle * inputs.beta,
        // Eq9
        q: cos_angle * inputs.beta - sin_angle * inputs.alpha,
    }
}

/// Inverse Park transform
///
/// Implements equations 10 and 11 from the Microsemi guide.
pub fn inverse_park(cos_angle: f32, sin_angle: f32, inputs: DirectQuadrature) -> AlphaBeta {
    AlphaBeta {
        // Eq10
        alpha: cos_angle * inputs.d - sin_angle * inputs.q,
        // Eq11
        beta: sin_angle * inputs.d + cos_angle * inputs.q,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn clarke_of_balanced_set() {
        // a = 1, b = c = -0.5 lies entirely on the alpha axis.
        let two_phase = clarke(ThreePhaseBalanced { a: 1., b: -0.5 });
        assert_abs_diff_eq!(two_phase.alpha, 1., epsilon = 1e-6);
        assert_abs_diff_eq!(two_phase.beta, 0., epsilon = 1e-6);

        let result = inverse_clarke(two_phase);
        assert_abs_diff_eq!(result.a, 1., epsilon = 1e-6);
        assert_abs_diff_eq!(result.b, -0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(result.c, -0.5, epsilon = 1e-6);
    }

    #[test]
    fn clarke_round_trip() {
        let input = ThreePhaseBalanced { a: -0.1, b: -0.2 };
        let result = inverse_clarke(clarke(input));

        assert_abs_diff_eq!(result.a, input.a, epsilon = 1e-5);
        assert_abs_diff_eq!(result.b, input.b, epsilon = 1e-5);
        assert_abs_diff_eq!(result.a + result.b + result.c, 0., epsilon = 1e-5);
    }

    #[test]
    fn park_round_trip() {
        let angle = 0.82f32;
        let (sin_angle, cos_angle) = (libm::sinf(angle), libm::cosf(angle));

        let input = AlphaBeta::new(2., 3.);
        let moving_reference = park(cos_angle, sin_angle, input);
        let result = inverse_park(cos_angle, sin_angle, moving_reference);

        assert_abs_diff_eq!(result.alpha, input.alpha, epsilon = 1e-5);
        assert_abs_diff_eq!(result.beta, input.beta, epsilon = 1e-5);
    }

    #[test]
    fn cross_product_sign() {
        let alpha = AlphaBeta::new(1., 0.);
        let beta = AlphaBeta::new(0., 1.);

        assert_eq!(alpha.cross(beta), 1.);
        assert_eq!(beta.cross(alpha), -1.);
        assert_eq!(alpha.cross(alpha), 0.);
    }

    #[test]
    fn vector_arithmetic() {
        let a = AlphaBeta::new(1., 2.);
        let b = AlphaBeta::new(0.5, -1.);

        assert_eq!(a + b, AlphaBeta::new(1.5, 1.));
        assert_eq!(a - b, AlphaBeta::new(0.5, 3.));
        assert_eq!(a * 2., AlphaBeta::new(2., 4.));
        assert_eq!(-a, AlphaBeta::new(-1., -2.));
        assert_eq!(a.swapped(), AlphaBeta::new(2., 1.));
    }
}
