//! Induction motor electrical constants and the coefficients derived from them.

use core::f32::consts::PI;

use crate::error::ParameterError;

/// Base electrical constants of the motor, as entered by the user.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorConstants {
    /// Ohm
    pub stator_resistance: f32,
    /// Ohm
    pub rotor_resistance: f32,
    /// Henry
    pub stator_inductance: f32,
    /// Henry
    pub rotor_inductance: f32,
    /// Henry
    pub magnetizing_inductance: f32,
    pub pole_pairs: f32,
    /// Seconds between two observer updates.
    pub sample_period: f32,
}

impl Default for MotorConstants {
    fn default() -> Self {
        Self {
            stator_resistance: 0.,
            rotor_resistance: 0.,
            stator_inductance: 0.,
            rotor_inductance: 0.,
            magnetizing_inductance: 0.,
            pole_pairs: 0.,
            sample_period: 1.,
        }
    }
}

/// Motor constants plus the cached coefficients the observers run on.
///
/// The coefficients are only valid after [`ParameterSet::derive`] has run.
/// Nothing tracks changes made through [`ParameterSet::constants_mut`], so
/// `derive` must be called again after every change and before the next
/// observer update.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParameterSet {
    constants: MotorConstants,
    inv_tr: f32,
    inv_kr: f32,
    sigma_ls: f32,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterSet {
    /// Default constants with all derived coefficients at zero.
    pub fn new() -> Self {
        Self {
            constants: MotorConstants::default(),
            inv_tr: 0.,
            inv_kr: 0.,
            sigma_ls: 0.,
        }
    }

    /// Store the constants and derive the coefficients, without validation.
    pub fn from_constants(constants: MotorConstants) -> Self {
        let mut params = Self {
            constants,
            ..Self::new()
        };
        params.derive();
        params
    }

    /// Like [`ParameterSet::from_constants`], but rejects constants for which
    /// the observers would produce non-finite or meaningless output.
    pub fn validated(constants: MotorConstants) -> Result<Self, ParameterError> {
        let params = Self::from_constants(constants);
        params.validate()?;
        Ok(params)
    }

    pub fn constants(&self) -> &MotorConstants {
        &self.constants
    }

    /// Mutable access to the base constants. Call [`ParameterSet::derive`]
    /// afterwards.
    pub fn constants_mut(&mut self) -> &mut MotorConstants {
        &mut self.constants
    }

    /// Recompute the cached coefficients from the base constants.
    ///
    /// Performs no checks: a zero rotor or magnetizing inductance yields
    /// non-finite coefficients which then propagate through every update.
    pub fn derive(&mut self) {
        let c = &self.constants;
        self.inv_tr = c.rotor_resistance / c.rotor_inductance;
        self.inv_kr = c.rotor_inductance / c.magnetizing_inductance;
        self.sigma_ls = (1.
            - c.magnetizing_inductance * c.magnetizing_inductance
                / (c.stator_inductance * c.rotor_inductance))
            * c.stator_inductance;

        debug!(
            "derived motor coefficients: 1/Tr = {}, Kr^-1 = {}, sigma*Ls = {}",
            self.inv_tr,
            self.inv_kr,
            self.sigma_ls
        );
    }

    /// Initialisation-time sanity check of the base constants.
    pub fn validate(&self) -> Result<(), ParameterError> {
        let c = &self.constants;

        positive(c.stator_resistance, ParameterError::StatorResistance)?;
        positive(c.rotor_resistance, ParameterError::RotorResistance)?;
        positive(c.stator_inductance, ParameterError::StatorInductance)?;
        positive(c.rotor_inductance, ParameterError::RotorInductance)?;
        positive(
            c.magnetizing_inductance,
            ParameterError::MagnetizingInductance,
        )?;
        positive(c.pole_pairs, ParameterError::PolePairs)?;
        positive(c.sample_period, ParameterError::SamplePeriod)?;

        let coupling = c.magnetizing_inductance * c.magnetizing_inductance;
        if coupling >= c.stator_inductance * c.rotor_inductance {
            warn!("magnetizing inductance leaves no leakage inductance");
            return Err(ParameterError::LeakageInductance);
        }

        Ok(())
    }

    /// Rr / Lr, 1/s
    pub fn inv_tr(&self) -> f32 {
        self.inv_tr
    }

    /// Lr / Lm
    pub fn inv_kr(&self) -> f32 {
        self.inv_kr
    }

    /// Stator leakage inductance, (1 - Lm^2 / (Ls * Lr)) * Ls, Henry
    pub fn sigma_ls(&self) -> f32 {
        self.sigma_ls
    }

    pub fn sample_period(&self) -> f32 {
        self.constants.sample_period
    }

    /// Lr / Rr, seconds
    pub fn rotor_time_constant(&self) -> f32 {
        self.constants.rotor_inductance / self.constants.rotor_resistance
    }

    /// Shaft speed in rad/s for an electrical speed in rad/s.
    pub fn mechanical_speed(&self, electrical_speed: f32) -> f32 {
        electrical_speed / self.constants.pole_pairs
    }

    /// Shaft speed in revolutions per minute for an electrical speed in rad/s.
    pub fn mechanical_rpm(&self, electrical_speed: f32) -> f32 {
        self.mechanical_speed(electrical_speed) * 60. / (2. * PI)
    }
}

fn positive(value: f32, error: ParameterError) -> Result<(), ParameterError> {
    if value.is_finite() && value > 0. {
        Ok(())
    } else {
        warn!("rejected motor constant {}", value);
        Err(error)
    }
}
