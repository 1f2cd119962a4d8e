//! Current-model rotor flux and back-EMF observer.
//!
//! Integrates the rotor flux equation of the induction motor in the
//! stationary frame,
//!
//! ```text
//! dFr/dt = (Lm * Is - Fr) / Tr + J * we * Fr
//! ```
//!
//! where `J` rotates a vector by +90 degrees. The derivative is the rotor
//! back-EMF; it is integrated with the trapezoidal rule. Alpha is advanced
//! first and beta uses the freshly integrated alpha flux in its cross term.

use crate::{orientation::FluxPosition, park_clarke::AlphaBeta, ParameterSet};

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RotorObserver {
    flux: AlphaBeta,
    back_emf: AlphaBeta,
}

impl RotorObserver {
    pub const fn new() -> Self {
        Self {
            flux: AlphaBeta::ZERO,
            back_emf: AlphaBeta::ZERO,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Current in amps
    /// Speed is the rotor electrical speed in rad/s, measured or estimated
    /// Returns the rotor flux in webers
    pub fn update(&mut self, params: &ParameterSet, current: AlphaBeta, speed: f32) -> AlphaBeta {
        let lm = params.constants().magnetizing_inductance;
        let inv_tr = params.inv_tr();
        let half_dt = 0.5 * params.sample_period();

        // The stored outputs double as the previous-sample state.
        let last_emf = self.back_emf;

        let emf_alpha = (current.alpha * lm - self.flux.alpha) * inv_tr - speed * self.flux.beta;
        let flux_alpha = self.flux.alpha + half_dt * (emf_alpha + last_emf.alpha);

        let emf_beta = (current.beta * lm - self.flux.beta) * inv_tr + speed * flux_alpha;
        let flux_beta = self.flux.beta + half_dt * (emf_beta + last_emf.beta);

        self.back_emf = AlphaBeta::new(emf_alpha, emf_beta);
        self.flux = AlphaBeta::new(flux_alpha, flux_beta);

        self.flux
    }

    /// Rotor flux in webers
    pub fn flux(&self) -> AlphaBeta {
        self.flux
    }

    /// Rotor back-EMF in volts
    pub fn back_emf(&self) -> AlphaBeta {
        self.back_emf
    }

    pub fn flux_position(&self) -> FluxPosition {
        FluxPosition::from_flux(self.flux)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MotorConstants;
    use approx::assert_abs_diff_eq;

    fn params() -> ParameterSet {
        ParameterSet::from_constants(MotorConstants {
            stator_resistance: 0.5,
            rotor_resistance: 0.8,
            stator_inductance: 0.0435,
            rotor_inductance: 0.0435,
            magnetizing_inductance: 0.041,
            pole_pairs: 2.,
            sample_period: 1e-4,
        })
    }

    #[test]
    fn first_sample_from_rest() {
        let params = params();
        let mut observer = RotorObserver::new();
        let lm = params.constants().magnetizing_inductance;

        observer.update(&params, AlphaBeta::new(2., 0.), 100.);

        let emf_alpha = 2. * lm * params.inv_tr();
        assert_eq!(observer.back_emf().alpha, emf_alpha);
        assert_eq!(observer.flux().alpha, 0.5 * params.sample_period() * emf_alpha);
        // Beta sees the new alpha flux through the speed cross term.
        assert_eq!(observer.back_emf().beta, 100. * observer.flux().alpha);
    }

    #[test]
    fn step_response_matches_first_order_lag() {
        let params = params();
        let mut observer = RotorObserver::new();
        let current = 4.;
        let steady_state = params.constants().magnetizing_inductance * current;
        let tau = params.rotor_time_constant();
        let dt = params.sample_period();

        for tick in 1..=5000 {
            let flux = observer.update(&params, AlphaBeta::new(current, 0.), 0.);
            let t = tick as f32 * dt;
            let expected = steady_state * (1. - libm::expf(-t / tau));

            assert_abs_diff_eq!(flux.alpha, expected, epsilon = 2e-3 * steady_state);
            assert_eq!(flux.beta, 0.);
        }

        // Five time constants in, the flux has settled at Lm * Is.
        let ticks = (5. * tau / dt) as usize;
        for _ in 0..ticks {
            observer.update(&params, AlphaBeta::new(current, 0.), 0.);
        }
        assert_abs_diff_eq!(observer.flux().alpha, steady_state, epsilon = 1e-2 * steady_state);
    }

    #[test]
    fn swapping_axes_mirrors_with_negated_speed() {
        let params = params();
        let mut observer = RotorObserver::new();
        let mut mirrored = RotorObserver::new();
        let currents = [
            AlphaBeta::new(1., 0.),
            AlphaBeta::new(0.8, 0.5),
            AlphaBeta::new(0.2, 1.),
            AlphaBeta::new(-0.6, 0.7),
        ];

        // Alpha is integrated before beta, so with speed the mirror only holds
        // to within one sample of rotation.
        let speed = 150.;
        let dt = params.sample_period();
        for current in currents.iter().cycle().take(200) {
            let flux = observer.update(&params, *current, speed);
            let mirrored_flux = mirrored.update(&params, current.swapped(), -speed);

            let tolerance = 1e-7 + 2. * speed * dt * libm::hypotf(flux.alpha, flux.beta);
            assert_abs_diff_eq!(mirrored_flux.alpha, flux.beta, epsilon = tolerance);
            assert_abs_diff_eq!(mirrored_flux.beta, flux.alpha, epsilon = tolerance);
        }
    }

    #[test]
    fn swapping_axes_at_standstill_is_exact() {
        let params = params();
        let mut observer = RotorObserver::new();
        let mut mirrored = RotorObserver::new();

        for tick in 0..100 {
            let current = AlphaBeta::new(1., tick as f32 * 0.01);
            let flux = observer.update(&params, current, 0.);
            let mirrored_flux = mirrored.update(&params, current.swapped(), -0.);

            assert_eq!(mirrored_flux, flux.swapped());
            assert_eq!(mirrored.back_emf(), observer.back_emf().swapped());
        }
    }

    #[test]
    fn speed_cross_terms_have_opposite_signs() {
        let params = params();
        let mut observer = RotorObserver::new();

        // Magnetise along alpha, then look at the cross term in isolation.
        for _ in 0..100 {
            observer.update(&params, AlphaBeta::new(1., 0.), 0.);
        }
        let flux = observer.flux();
        let settled = observer.clone();

        let mut with_speed = settled.clone();
        let mut without_speed = settled;
        with_speed.update(&params, AlphaBeta::new(1., 0.), 50.);
        without_speed.update(&params, AlphaBeta::new(1., 0.), 0.);

        // Positive speed rotates the flux from alpha towards beta.
        let delta = with_speed.back_emf() - without_speed.back_emf();
        assert!(delta.beta > 0.);
        assert_abs_diff_eq!(delta.alpha, -50. * flux.beta, epsilon = 1e-9);
    }

    #[test]
    fn reset_clears_state() {
        let params = params();
        let mut observer = RotorObserver::new();
        observer.update(&params, AlphaBeta::new(1., 1.), 10.);
        observer.reset();

        assert_eq!(observer, RotorObserver::new());
        assert_eq!(observer.flux_position().magnitude, 0.);
    }
}
