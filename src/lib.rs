//! Induction motor rotor flux, back-EMF and speed observers for field
//! oriented control.
//!
//! All observers run once per sample period on stationary-frame
//! ([`AlphaBeta`]) stator currents and voltages, do no allocation and no
//! I/O, and are not reentrant: each update must finish before the next one
//! starts, and the [`ParameterSet`] must not change while an update runs.
//!
//! The sequence is construct, configure, derive, run:
//!
//! ```
//! use im_observer::{
//!     AdaptiveSpeedObserver, InductionMotorModel, MotorConstants, OutputLimits, ParameterSet,
//! };
//!
//! let constants = MotorConstants {
//!     stator_resistance: 0.5,
//!     rotor_resistance: 0.8,
//!     stator_inductance: 0.0435,
//!     rotor_inductance: 0.0435,
//!     magnetizing_inductance: 0.041,
//!     pole_pairs: 2.,
//!     sample_period: 1e-4,
//! };
//! let params = ParameterSet::validated(constants)?;
//! let mut observer =
//!     AdaptiveSpeedObserver::with_pi(&params, 0.2, 200., OutputLimits::symmetric(400.));
//!
//! let motor = InductionMotorModel::new(constants, 150., 20., 8.);
//! for tick in 0..3000 {
//!     let sample = motor.sample(tick);
//!     observer.update(&params, sample.current, sample.voltage);
//! }
//!
//! assert!((observer.speed() - 150.).abs() < 1.5);
//! # Ok::<(), im_observer::ParameterError>(())
//! ```
//!
//! Bad motor constants are not caught on the update path; they surface as
//! non-finite outputs. Use [`ParameterSet::validate`] at start-up to reject
//! them early.

#![no_std]
#![forbid(unsafe_code)]

#[macro_use]
mod fmt;

mod error;
pub mod motor_model;
pub mod orientation;
pub mod params;
pub mod park_clarke;
pub mod pid;
pub mod rotor;
pub mod speed;
pub mod stator;

pub use error::ParameterError;
pub use motor_model::{InductionMotorModel, MotorSample};
pub use orientation::{FieldOrientation, FluxPosition};
pub use params::{MotorConstants, ParameterSet};
pub use park_clarke::{AlphaBeta, DirectQuadrature};
pub use pid::{OutputLimits, PIController, Regulator};
pub use rotor::RotorObserver;
pub use speed::AdaptiveSpeedObserver;
pub use stator::StatorObserver;

const FRAC_1_SQRT_3: f32 = 0.57735027;
const SQRT_3: f32 = 1.7320508;
