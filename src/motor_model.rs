//! Reference induction motor for exercising the observers off-target.
//!
//! The motor is current fed with a balanced sinusoidal stator current of
//! constant amplitude, turns at a constant rotor electrical speed and starts
//! with zero rotor flux. Rotor flux is taken from the closed-form solution of
//!
//! ```text
//! dFr/dt = (Lm * Is - Fr) / Tr + J * wr * Fr
//! ```
//!
//! and the stator voltage follows from
//!
//! ```text
//! Us = Rs * Is + sigma * Ls * dIs/dt + (Lm / Lr) * dFr/dt
//! ```
//!
//! Internally everything is evaluated in `f64` and sampled to `f32`.

use core::ops::{Add, Div, Mul, Sub};

use crate::{park_clarke::AlphaBeta, MotorConstants};

/// One sample of the motor's terminal and internal quantities.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorSample {
    /// Amps
    pub current: AlphaBeta,
    /// Volts
    pub voltage: AlphaBeta,
    /// Rotor flux, webers
    pub flux: AlphaBeta,
    /// Rotor flux derivative, volts
    pub back_emf: AlphaBeta,
}

#[derive(Debug, Clone)]
pub struct InductionMotorModel {
    stator_resistance: f64,
    leakage_inductance: f64,
    coupling: f64,
    magnetizing_inductance: f64,
    inv_tr: f64,
    sample_period: f64,
    rotor_speed: f64,
    stator_frequency: f64,
    amplitude: f64,
    steady_flux: Complex,
}

impl InductionMotorModel {
    /// Speed and slip in rad/s electrical, amplitude in amps.
    ///
    /// The stator current rotates at `speed + slip`.
    pub fn new(constants: MotorConstants, speed: f32, slip: f32, amplitude: f32) -> Self {
        let rs = f64::from(constants.stator_resistance);
        let rr = f64::from(constants.rotor_resistance);
        let ls = f64::from(constants.stator_inductance);
        let lr = f64::from(constants.rotor_inductance);
        let lm = f64::from(constants.magnetizing_inductance);
        let tr = lr / rr;
        let slip = f64::from(slip);
        let amplitude = f64::from(amplitude);

        // Lm * I / (1 + j * slip * Tr), the flux phasor at t = 0 in steady state.
        let steady_flux = Complex::new(lm * amplitude, 0.) / Complex::new(1., slip * tr);

        Self {
            stator_resistance: rs,
            leakage_inductance: (1. - lm * lm / (ls * lr)) * ls,
            coupling: lm / lr,
            magnetizing_inductance: lm,
            inv_tr: 1. / tr,
            sample_period: f64::from(constants.sample_period),
            rotor_speed: f64::from(speed),
            stator_frequency: f64::from(speed) + slip,
            amplitude,
            steady_flux,
        }
    }

    /// Stator current frequency in rad/s.
    pub fn stator_frequency(&self) -> f32 {
        self.stator_frequency as f32
    }

    /// State at `tick * sample_period` seconds.
    pub fn sample(&self, tick: u32) -> MotorSample {
        let t = f64::from(tick) * self.sample_period;

        let current = Complex::from_polar(self.amplitude, self.stator_frequency * t);
        let decay = Complex::from_polar(libm::exp(-self.inv_tr * t), self.rotor_speed * t);
        let flux = self.steady_flux * Complex::from_polar(1., self.stator_frequency * t)
            - self.steady_flux * decay;

        let back_emf = (current * self.magnetizing_inductance - flux) * self.inv_tr
            + Complex::new(0., self.rotor_speed) * flux;
        let d_current = Complex::new(0., self.stator_frequency) * current;
        let voltage = current * self.stator_resistance
            + d_current * self.leakage_inductance
            + back_emf * self.coupling;

        MotorSample {
            current: current.into(),
            voltage: voltage.into(),
            flux: flux.into(),
            back_emf: back_emf.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Complex {
    re: f64,
    im: f64,
}

impl Complex {
    const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    fn from_polar(magnitude: f64, angle: f64) -> Self {
        Self::new(magnitude * libm::cos(angle), magnitude * libm::sin(angle))
    }
}

impl Add for Complex {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Complex {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for Complex {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl Mul<f64> for Complex {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.re * rhs, self.im * rhs)
    }
}

impl Div for Complex {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        let norm = rhs.re * rhs.re + rhs.im * rhs.im;
        Self::new(
            (self.re * rhs.re + self.im * rhs.im) / norm,
            (self.im * rhs.re - self.re * rhs.im) / norm,
        )
    }
}

impl From<Complex> for AlphaBeta {
    fn from(value: Complex) -> Self {
        AlphaBeta::new(value.re as f32, value.im as f32)
    }
}
