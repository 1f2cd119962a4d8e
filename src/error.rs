use thiserror::Error;

/// A motor constant that cannot describe a physical induction motor.
///
/// Only reported by [`crate::ParameterSet::validate`]. The observers
/// themselves never fail; bad constants show up as non-finite outputs.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParameterError {
    #[error("stator resistance must be positive and finite")]
    StatorResistance,

    #[error("rotor resistance must be positive and finite")]
    RotorResistance,

    #[error("stator inductance must be positive and finite")]
    StatorInductance,

    #[error("rotor inductance must be positive and finite")]
    RotorInductance,

    #[error("magnetizing inductance must be positive and finite")]
    MagnetizingInductance,

    #[error("pole pair count must be positive and finite")]
    PolePairs,

    #[error("sample period must be positive and finite")]
    SamplePeriod,

    /// Lm^2 >= Ls * Lr, leaving a zero or negative stator leakage inductance.
    #[error("magnetizing inductance too large for the stator and rotor inductances")]
    LeakageInductance,
}
