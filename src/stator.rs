//! Voltage-model back-EMF observer.

use crate::{park_clarke::AlphaBeta, ParameterSet};

/// Estimates the stator back-EMF from measured stator voltage and current.
///
/// The current derivative is a plain backward difference, so measurement
/// noise is amplified by `1 / sample_period`. No filtering is applied.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatorObserver {
    last_current: AlphaBeta,
    back_emf: AlphaBeta,
}

impl StatorObserver {
    pub const fn new() -> Self {
        Self {
            last_current: AlphaBeta::ZERO,
            back_emf: AlphaBeta::ZERO,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Current in amps
    /// Voltage in volts
    /// Returns the back-EMF in volts
    pub fn update(
        &mut self,
        params: &ParameterSet,
        current: AlphaBeta,
        voltage: AlphaBeta,
    ) -> AlphaBeta {
        let dt = params.sample_period();

        let d_current = AlphaBeta {
            alpha: (current.alpha - self.last_current.alpha) / dt,
            beta: (current.beta - self.last_current.beta) / dt,
        };
        self.last_current = current;

        self.back_emf = AlphaBeta {
            alpha: (voltage.alpha
                - params.constants().stator_resistance * current.alpha
                - params.sigma_ls() * d_current.alpha)
                * params.inv_kr(),
            beta: (voltage.beta
                - params.constants().stator_resistance * current.beta
                - params.sigma_ls() * d_current.beta)
                * params.inv_kr(),
        };

        self.back_emf
    }

    pub fn back_emf(&self) -> AlphaBeta {
        self.back_emf
    }
}
