//! Sensorless rotor speed and flux observer.
//!
//! A model reference adaptive system: the voltage-model back-EMF from
//! [`StatorObserver`] does not depend on speed, the current-model back-EMF
//! from [`RotorObserver`] does. Their misalignment relative to the stator
//! current,
//!
//! ```text
//! e = Is x (Es - Er) = Is_alpha * (Es_beta - Er_beta) - Is_beta * (Es_alpha - Er_alpha)
//! ```
//!
//! is driven to zero by a [`Regulator`] whose output is the speed estimate.
//!
//! The rotor observer always runs with the estimate from the previous update,
//! which breaks the speed -> flux -> error -> speed cycle into a loop with a
//! one sample delay.

use crate::{
    orientation::FluxPosition,
    park_clarke::AlphaBeta,
    pid::{OutputLimits, PIController, Regulator},
    rotor::RotorObserver,
    stator::StatorObserver,
    ParameterSet,
};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdaptiveSpeedObserver<R = PIController> {
    stator: StatorObserver,
    rotor: RotorObserver,
    regulator: R,
    residual: f32,
    speed: f32,
    flux_position: FluxPosition,
}

impl AdaptiveSpeedObserver<PIController> {
    /// Observer adapting through a PI regulator that integrates over
    /// `params.sample_period()`.
    ///
    /// `limits` bound the speed estimate in rad/s electrical. The regulator
    /// keeps this period; rebuild the observer if the sample period is later
    /// changed through [`ParameterSet::constants_mut`].
    pub fn with_pi(params: &ParameterSet, k_p: f32, k_i: f32, limits: OutputLimits) -> Self {
        Self::new(PIController::new(k_p, k_i, params.sample_period(), limits))
    }
}

impl<R: Regulator> AdaptiveSpeedObserver<R> {
    /// Takes ownership of the regulator and resets it.
    pub fn new(regulator: R) -> Self {
        let mut observer = Self {
            stator: StatorObserver::new(),
            rotor: RotorObserver::new(),
            regulator,
            residual: 0.,
            speed: 0.,
            flux_position: FluxPosition::default(),
        };
        observer.reset();
        observer
    }

    pub fn reset(&mut self) {
        self.stator.reset();
        self.rotor.reset();
        self.regulator.reset();
        self.residual = 0.;
        self.speed = 0.;
        self.flux_position = FluxPosition::default();

        trace!("speed observer reset");
    }

    /// Current in amps
    /// Voltage in volts
    /// Returns the new rotor electrical speed estimate in rad/s
    pub fn update(&mut self, params: &ParameterSet, current: AlphaBeta, voltage: AlphaBeta) -> f32 {
        let stator_emf = self.stator.update(params, current, voltage);
        let flux = self.rotor.update(params, current, self.speed);
        let rotor_emf = self.rotor.back_emf();

        self.residual = current.cross(stator_emf - rotor_emf);
        self.speed = self.regulator.update(self.residual);

        self.flux_position = FluxPosition::from_flux(flux);

        self.speed
    }

    /// Rotor electrical speed estimate in rad/s
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Rotor flux in webers
    pub fn flux(&self) -> AlphaBeta {
        self.rotor.flux()
    }

    pub fn flux_position(&self) -> FluxPosition {
        self.flux_position
    }

    /// Rotor flux angle in radians
    pub fn flux_angle(&self) -> f32 {
        self.flux_position.angle
    }

    /// Rotor flux magnitude in webers
    pub fn flux_magnitude(&self) -> f32 {
        self.flux_position.magnitude
    }

    pub fn stator_back_emf(&self) -> AlphaBeta {
        self.stator.back_emf()
    }

    pub fn rotor_back_emf(&self) -> AlphaBeta {
        self.rotor.back_emf()
    }

    /// The adaptation error fed to the regulator by the last update.
    pub fn residual(&self) -> f32 {
        self.residual
    }

    pub fn stator(&self) -> &StatorObserver {
        &self.stator
    }

    pub fn rotor(&self) -> &RotorObserver {
        &self.rotor
    }

    pub fn regulator(&self) -> &R {
        &self.regulator
    }
}
