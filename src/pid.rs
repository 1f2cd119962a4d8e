//! Saturating P, PI, PD and PID regulators.
//!
//! Each regulator acts on an error input, runs at a fixed sample period and
//! clamps its output to [`OutputLimits`]. The integral is trapezoidal, and
//! its state is clamped to the same limits so that it cannot wind up while
//! the output is saturated.

/// A fixed-rate feedback regulator driven by an error signal.
pub trait Regulator {
    /// Feed one error sample and return the new, limited output.
    fn update(&mut self, input: f32) -> f32;

    /// Zero every internal accumulator and the output.
    fn reset(&mut self);

    /// The output produced by the last update.
    fn output(&self) -> f32;
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputLimits {
    pub lower: f32,
    pub upper: f32,
}

impl OutputLimits {
    pub const fn new(lower: f32, upper: f32) -> Self {
        Self { lower, upper }
    }

    /// Limits of `-limit..=limit`.
    pub const fn symmetric(limit: f32) -> Self {
        Self::new(-limit, limit)
    }

    /// Upper limit is applied first, so an inverted pair resolves to `lower`.
    pub fn clamp(&self, value: f32) -> f32 {
        let value = if value > self.upper { self.upper } else { value };
        if value < self.lower {
            self.lower
        } else {
            value
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PController {
    k_p: f32,
    limits: OutputLimits,
    output: f32,
}

impl PController {
    pub fn new(k_p: f32, limits: OutputLimits) -> Self {
        Self {
            k_p,
            limits,
            output: 0.,
        }
    }
}

impl Regulator for PController {
    fn update(&mut self, input: f32) -> f32 {
        self.output = self.limits.clamp(self.k_p * input);
        self.output
    }

    fn reset(&mut self) {
        self.output = 0.;
    }

    fn output(&self) -> f32 {
        self.output
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PIController {
    k_p: f32,
    integral: IntegralComponent,
    limits: OutputLimits,
    output: f32,
}

impl PIController {
    pub fn new(k_p: f32, k_i: f32, sample_period: f32, limits: OutputLimits) -> Self {
        Self {
            k_p,
            integral: IntegralComponent::new(k_i, sample_period),
            limits,
            output: 0.,
        }
    }

    pub fn integral(&self) -> f32 {
        self.integral.value
    }
}

impl Regulator for PIController {
    fn update(&mut self, input: f32) -> f32 {
        let integral = self.integral.update(input, &self.limits);
        self.output = self.limits.clamp(self.k_p * input + integral);
        self.output
    }

    fn reset(&mut self) {
        self.integral.reset();
        self.output = 0.;
    }

    fn output(&self) -> f32 {
        self.output
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PDController {
    k_p: f32,
    derivative: DerivativeComponent,
    limits: OutputLimits,
    output: f32,
}

impl PDController {
    pub fn new(k_p: f32, k_d: f32, sample_period: f32, limits: OutputLimits) -> Self {
        Self {
            k_p,
            derivative: DerivativeComponent::new(k_d, sample_period),
            limits,
            output: 0.,
        }
    }
}

impl Regulator for PDController {
    fn update(&mut self, input: f32) -> f32 {
        let derivative = self.derivative.update(input);
        self.output = self.limits.clamp(self.k_p * input + derivative);
        self.output
    }

    fn reset(&mut self) {
        self.derivative.reset();
        self.output = 0.;
    }

    fn output(&self) -> f32 {
        self.output
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PIDController {
    k_p: f32,
    integral: IntegralComponent,
    derivative: DerivativeComponent,
    limits: OutputLimits,
    output: f32,
}

impl PIDController {
    pub fn new(k_p: f32, k_i: f32, k_d: f32, sample_period: f32, limits: OutputLimits) -> Self {
        Self {
            k_p,
            integral: IntegralComponent::new(k_i, sample_period),
            derivative: DerivativeComponent::new(k_d, sample_period),
            limits,
            output: 0.,
        }
    }
}

impl Regulator for PIDController {
    fn update(&mut self, input: f32) -> f32 {
        let integral = self.integral.update(input, &self.limits);
        let derivative = self.derivative.update(input);
        self.output = self.limits.clamp(self.k_p * input + integral + derivative);
        self.output
    }

    fn reset(&mut self) {
        self.integral.reset();
        self.derivative.reset();
        self.output = 0.;
    }

    fn output(&self) -> f32 {
        self.output
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct IntegralComponent {
    k_i: f32,
    half_dt: f32,
    last_input: f32,
    value: f32,
}

impl IntegralComponent {
    fn new(k_i: f32, sample_period: f32) -> Self {
        Self {
            k_i,
            half_dt: 0.5 * sample_period,
            last_input: 0.,
            value: 0.,
        }
    }

    fn update(&mut self, error: f32, limits: &OutputLimits) -> f32 {
        let input = self.k_i * error;
        self.value = limits.clamp(self.value + self.half_dt * (input + self.last_input));
        self.last_input = input;
        self.value
    }

    fn reset(&mut self) {
        self.last_input = 0.;
        self.value = 0.;
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct DerivativeComponent {
    k_d: f32,
    sample_period: f32,
    last_error: Option<f32>,
}

impl DerivativeComponent {
    fn new(k_d: f32, sample_period: f32) -> Self {
        Self {
            k_d,
            sample_period,
            last_error: None,
        }
    }

    fn update(&mut self, error: f32) -> f32 {
        let derivative = self
            .last_error
            .map(|last| (error - last) / self.sample_period)
            .unwrap_or(0.);

        self.last_error = Some(error);

        self.k_d * derivative
    }

    fn reset(&mut self) {
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn proportional_output_is_limited() {
        let mut p = PController::new(2., OutputLimits::new(-10., 10.));

        assert_eq!(p.update(3.), 6.);
        assert_eq!(p.update(20.), 10.);
        assert_eq!(p.update(-20.), -10.);
        assert_eq!(p.output(), -10.);

        p.reset();
        assert_eq!(p.output(), 0.);
    }

    #[test]
    fn integral_is_trapezoidal() {
        let mut pi = PIController::new(0., 2., 0.1, OutputLimits::symmetric(100.));

        // First sample averages with the zero input before it.
        assert_relative_eq!(pi.update(10.), 0.05 * 20.);
        assert_relative_eq!(pi.update(10.), 0.05 * 20. + 0.05 * 40.);
        assert_relative_eq!(pi.update(0.), 3. + 0.05 * 20.);
        assert_relative_eq!(pi.update(0.), 4.);
    }

    #[test]
    fn integral_does_not_wind_up() {
        let mut pi = PIController::new(0., 1., 1., OutputLimits::new(-5., 5.));

        for _ in 0..100 {
            pi.update(10.);
        }
        assert_eq!(pi.output(), 5.);
        assert_eq!(pi.integral(), 5.);

        // The trapezoid averages the reversal to zero, then the output swings
        // straight across instead of unwinding a large accumulator.
        assert_eq!(pi.update(-10.), 5.);
        assert_eq!(pi.update(-10.), -5.);
    }

    #[test]
    fn proportional_and_integral_add() {
        let mut pi = PIController::new(0.5, 4., 0.01, OutputLimits::symmetric(100.));

        let output = pi.update(2.);
        assert_relative_eq!(output, 0.5 * 2. + 0.005 * 8.);
        assert_relative_eq!(pi.integral(), 0.005 * 8.);
    }

    #[test]
    fn reset_zeroes_accumulators() {
        let mut pid = PIDController::new(1., 1., 1., 0.1, OutputLimits::symmetric(100.));
        let first = pid.update(3.);
        pid.update(7.);
        pid.reset();

        assert_eq!(pid.output(), 0.);
        assert_eq!(pid.update(3.), first);
    }

    #[test]
    fn derivative_skips_first_sample() {
        let mut pd = PDController::new(0., 0.5, 0.1, OutputLimits::symmetric(100.));

        assert_eq!(pd.update(4.), 0.);
        assert_relative_eq!(pd.update(5.), 0.5 * 10.);
        assert_eq!(pd.update(5.), 0.);

        pd.reset();
        assert_eq!(pd.update(-4.), 0.);
    }

    #[test]
    fn pid_combines_all_terms() {
        let mut pid = PIDController::new(1., 10., 0.1, 0.01, OutputLimits::symmetric(100.));

        pid.update(1.);
        let output = pid.update(2.);
        let integral = 0.005 * 10. + 0.005 * (20. + 10.);
        let derivative = 0.1 * (2. - 1.) / 0.01;
        assert_relative_eq!(output, 2. + integral + derivative, max_relative = 1e-5);
    }

    #[test]
    fn clamp_prefers_lower_when_inverted() {
        let limits = OutputLimits::new(1., -1.);
        assert_eq!(limits.clamp(0.), 1.);
    }
}
