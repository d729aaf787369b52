//! The trainer: configuration surface and the line-search entry point.

use log::info;
use ndarray::Array1;

use descent_math::linesearch::{brent_minimize, LineSearchConfig, LineSearchResult};

use crate::error::{TrainError, TrainResult};
use crate::gradient::{
    self, AnalyticGradient, FiniteDifference, GradientCheckReport, GradientProvider,
};
use crate::mask::OptimizationMask;
use crate::model::Optimizable;
use crate::objective::ObjectiveFn;
use crate::session::{TrainingSession, TrainingSummary};

/// Name reported in training summaries.
const ALGORITHM: &str = "Brent line minimizer";

/// Configuration for a trainer.
///
/// Set before a run and left untouched during it.
#[derive(Debug, Clone, Copy)]
pub struct TrainerConfig {
    /// Error tolerance for the (out-of-scope) multivariate stopping rules.
    pub error_tolerance: f64,
    /// Parameter tolerance for the multivariate stopping rules.
    pub parameter_tolerance: f64,
    /// Maximum refinement iterations per line search.
    pub line_search_iterations: u32,
    /// Parameter tolerance of the line search itself.
    pub line_search_tolerance: f64,
    /// Perturbation step for finite-difference gradients.
    pub epsilon: f64,
    /// Whether to report progress and summaries through the log facade.
    pub display: bool,
    /// Whether callers should run a gradient check before training.
    pub gradient_check: bool,
    /// Analytic gradients from the model, or central finite differences.
    pub analytic_gradients: bool,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            error_tolerance: 1.0e-6,
            parameter_tolerance: 1.0e-4,
            line_search_iterations: 10,
            line_search_tolerance: 1.0e-4,
            epsilon: 1.0e-6,
            display: true,
            gradient_check: true,
            analytic_gradients: true,
        }
    }
}

impl TrainerConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the error tolerance.
    #[must_use]
    pub fn with_error_tolerance(mut self, error_tolerance: f64) -> Self {
        self.error_tolerance = error_tolerance;
        self
    }

    /// Sets the parameter tolerance.
    #[must_use]
    pub fn with_parameter_tolerance(mut self, parameter_tolerance: f64) -> Self {
        self.parameter_tolerance = parameter_tolerance;
        self
    }

    /// Sets the line-search iteration cap.
    #[must_use]
    pub fn with_line_search_iterations(mut self, line_search_iterations: u32) -> Self {
        self.line_search_iterations = line_search_iterations;
        self
    }

    /// Sets the line-search parameter tolerance.
    #[must_use]
    pub fn with_line_search_tolerance(mut self, line_search_tolerance: f64) -> Self {
        self.line_search_tolerance = line_search_tolerance;
        self
    }

    /// Sets the finite-difference perturbation step.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Enables or disables progress reporting.
    #[must_use]
    pub fn with_display(mut self, display: bool) -> Self {
        self.display = display;
        self
    }

    /// Enables or disables the pre-run gradient check.
    #[must_use]
    pub fn with_gradient_check(mut self, gradient_check: bool) -> Self {
        self.gradient_check = gradient_check;
        self
    }

    /// Selects analytic or finite-difference gradients.
    #[must_use]
    pub fn with_analytic_gradients(mut self, analytic_gradients: bool) -> Self {
        self.analytic_gradients = analytic_gradients;
        self
    }
}

/// Line-search trainer over a borrowed model.
///
/// The trainer owns the objective adapter and the gradient provider selected
/// from the configuration, and exposes the externally callable
/// [`line_minimize`](Self::line_minimize) entry point. Evaluation counters
/// live in the [`TrainingSession`] the caller threads through each call,
/// never in the trainer itself.
pub struct Trainer<'m, M: Optimizable> {
    objective: ObjectiveFn<'m, M>,
    gradient: Box<dyn GradientProvider<M>>,
    config: TrainerConfig,
}

impl<'m, M: Optimizable> Trainer<'m, M> {
    /// Creates a trainer with the default configuration.
    pub fn new(model: &'m mut M) -> Self {
        Self::with_config(model, TrainerConfig::default())
    }

    /// Creates a trainer with the given configuration.
    ///
    /// The gradient provider is chosen here, once: analytic when
    /// `config.analytic_gradients` is set, otherwise central finite
    /// differences with `config.epsilon`.
    pub fn with_config(model: &'m mut M, config: TrainerConfig) -> Self {
        let gradient: Box<dyn GradientProvider<M>> = if config.analytic_gradients {
            Box::new(AnalyticGradient)
        } else {
            Box::new(FiniteDifference {
                epsilon: config.epsilon,
            })
        };
        Self {
            objective: ObjectiveFn::new(model),
            gradient,
            config,
        }
    }

    /// The trainer's configuration.
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Installs an optimization mask for this training session.
    pub fn set_mask(&mut self, mask: OptimizationMask) -> TrainResult<()> {
        self.objective.set_mask(mask)
    }

    /// Current (reduced) parameter vector of the model.
    pub fn parameters(&self) -> Array1<f64> {
        self.objective.parameters()
    }

    /// Installs a (reduced) parameter vector into the model.
    pub fn set_parameters(&mut self, params: &Array1<f64>) -> TrainResult<()> {
        self.objective.set_parameters(params)
    }

    /// Evaluates the objective at a (reduced) parameter vector.
    pub fn evaluate(
        &mut self,
        session: &mut TrainingSession,
        params: &Array1<f64>,
    ) -> TrainResult<f64> {
        self.objective.evaluate(session, params)
    }

    /// Gradient at a (reduced) parameter vector, from the configured
    /// provider.
    pub fn gradient(
        &mut self,
        session: &mut TrainingSession,
        params: &Array1<f64>,
    ) -> TrainResult<Array1<f64>> {
        self.gradient.gradient(&mut self.objective, session, params)
    }

    /// Compares analytic and finite-difference gradients at the current
    /// parameters.
    ///
    /// Diagnostic only: the report never aborts a run, however large the
    /// discrepancies. With `display` set, the report is also logged.
    pub fn check_gradient(
        &mut self,
        session: &mut TrainingSession,
    ) -> TrainResult<GradientCheckReport> {
        let report = gradient::check_gradient(&mut self.objective, session, self.config.epsilon)?;
        if self.config.display {
            info!("{report}");
        }
        Ok(report)
    }

    /// Minimizes the objective along `direction` from `params`.
    ///
    /// Brackets a minimum of `f(t) = objective(params + t * direction)`
    /// starting from the unit trial step, then refines it with the hybrid
    /// golden-section / parabolic line minimizer. The model is left at the
    /// base parameters: speculative trial points are rolled back, and it is
    /// the caller's choice whether to apply the returned step.
    ///
    /// Exhausting the iteration budget is not an error; the result carries
    /// `converged = false` and the best point found.
    pub fn line_minimize(
        &mut self,
        session: &mut TrainingSession,
        params: &Array1<f64>,
        direction: &Array1<f64>,
    ) -> TrainResult<LineSearchResult> {
        if direction.len() != params.len() {
            return Err(TrainError::dimension(format!(
                "direction has {} elements but the parameter vector has {}",
                direction.len(),
                params.len()
            )));
        }

        let fa = self.objective.evaluate(session, params)?;

        let line_config = LineSearchConfig::default()
            .with_parameter_tolerance(self.config.line_search_tolerance)
            .with_max_iterations(self.config.line_search_iterations);

        let objective = &mut self.objective;
        let result = brent_minimize(
            |step| objective.line_value(session, params, step, direction),
            fa,
            &line_config,
        )?;

        session.set_function_value(result.value);
        if self.config.display {
            info!(
                "line search: step {:.6e}, value {:.6e}, converged {}",
                result.step, result.value, result.converged
            );
        }
        Ok(result)
    }

    /// Snapshot of the run for reporting.
    pub fn summary(&self, session: &TrainingSession) -> TrainingSummary {
        TrainingSummary {
            algorithm: ALGORITHM,
            error_tolerance: self.config.error_tolerance,
            parameter_tolerance: self.config.parameter_tolerance,
            function_evaluations: session.function_evaluations(),
            gradient_evaluations: session.gradient_evaluations(),
            function_value: session.function_value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    /// Quadratic bowl with minimum at `center`, gradient `2 (p - center)`.
    struct Bowl {
        params: Array1<f64>,
        center: Array1<f64>,
    }

    impl Bowl {
        fn new(center: Array1<f64>) -> Self {
            Self {
                params: Array1::zeros(center.len()),
                center,
            }
        }
    }

    impl Optimizable for Bowl {
        fn parameters(&self) -> Array1<f64> {
            self.params.clone()
        }

        fn set_parameters(&mut self, params: &Array1<f64>) {
            self.params = params.clone();
        }

        fn objective(&self) -> f64 {
            (&self.params - &self.center).mapv(|d| d * d).sum()
        }

        fn gradient(&self) -> Array1<f64> {
            2.0 * (&self.params - &self.center)
        }
    }

    fn quiet() -> TrainerConfig {
        TrainerConfig::default().with_display(false)
    }

    #[test]
    fn test_line_minimize_along_direction_to_center() {
        // f(t * (2, 3)) = 13 (t - 1)^2: minimum at t = 1 with value 0.
        let mut model = Bowl::new(array![2.0, 3.0]);
        let mut trainer =
            Trainer::with_config(&mut model, quiet().with_line_search_iterations(50));
        let mut session = TrainingSession::new();

        let result = trainer
            .line_minimize(&mut session, &array![0.0, 0.0], &array![2.0, 3.0])
            .unwrap();

        assert!(result.converged);
        assert_relative_eq!(result.step, 1.0, epsilon = 1e-3);
        assert!(result.value < 1e-5);
        assert_relative_eq!(session.function_value(), result.value);
        // The model is left at the base point, not the best trial point.
        assert_eq!(trainer.parameters(), array![0.0, 0.0]);
    }

    #[test]
    fn test_masked_line_minimize() {
        // Parameter 1 is frozen at 9.0, contributing (9 - 3)^2 = 36.
        let mut model = Bowl::new(array![2.0, 3.0, 4.0]);
        model.set_parameters(&array![0.0, 9.0, 0.0]);

        let mut trainer = Trainer::with_config(&mut model, quiet());
        trainer
            .set_mask(OptimizationMask::new(vec![true, false, true]))
            .unwrap();
        let mut session = TrainingSession::new();

        // f(t * (2, 4)) = 20 (t - 1)^2 + 36: minimum at t = 1, value 36.
        let result = trainer
            .line_minimize(&mut session, &array![0.0, 0.0], &array![2.0, 4.0])
            .unwrap();

        assert_relative_eq!(result.step, 1.0, epsilon = 1e-3);
        assert_relative_eq!(result.value, 36.0, epsilon = 1e-4);
    }

    #[test]
    fn test_direction_dimension_is_validated() {
        let mut model = Bowl::new(array![2.0, 3.0]);
        let mut trainer = Trainer::with_config(&mut model, quiet());
        let mut session = TrainingSession::new();

        let result = trainer.line_minimize(&mut session, &array![0.0, 0.0], &array![1.0]);

        assert!(matches!(result, Err(TrainError::Dimension { .. })));
    }

    #[test]
    fn test_gradient_provider_selection() {
        let mut model = Bowl::new(array![2.0, 3.0]);
        let mut trainer =
            Trainer::with_config(&mut model, quiet().with_analytic_gradients(false));
        let mut session = TrainingSession::new();

        let g = trainer.gradient(&mut session, &array![0.0, 0.0]).unwrap();

        // Finite differences: no gradient evaluations, 2n objective calls.
        assert_relative_eq!(g[0], -4.0, epsilon = 1e-6);
        assert_relative_eq!(g[1], -6.0, epsilon = 1e-6);
        assert_eq!(session.gradient_evaluations(), 0);
        assert_eq!(session.function_evaluations(), 4);

        let mut model = Bowl::new(array![2.0, 3.0]);
        let mut trainer = Trainer::with_config(&mut model, quiet());
        let mut session = TrainingSession::new();

        let g = trainer.gradient(&mut session, &array![0.0, 0.0]).unwrap();

        assert_relative_eq!(g[0], -4.0);
        assert_eq!(session.gradient_evaluations(), 1);
        assert_eq!(session.function_evaluations(), 0);
    }

    #[test]
    fn test_summary_reflects_session() {
        let mut model = Bowl::new(array![2.0, 3.0]);
        let mut trainer = Trainer::with_config(&mut model, quiet());
        let mut session = TrainingSession::new();

        trainer
            .line_minimize(&mut session, &array![0.0, 0.0], &array![2.0, 3.0])
            .unwrap();
        let summary = trainer.summary(&session);

        assert_eq!(summary.algorithm, "Brent line minimizer");
        assert_eq!(summary.function_evaluations, session.function_evaluations());
        assert!(summary.function_evaluations > 0);
        assert_relative_eq!(summary.function_value, session.function_value());
    }

    #[test]
    fn test_config_builders() {
        let config = TrainerConfig::new()
            .with_error_tolerance(1e-8)
            .with_parameter_tolerance(1e-5)
            .with_line_search_iterations(25)
            .with_line_search_tolerance(1e-6)
            .with_epsilon(1e-7)
            .with_display(false)
            .with_gradient_check(false)
            .with_analytic_gradients(false);

        assert_eq!(config.error_tolerance, 1e-8);
        assert_eq!(config.parameter_tolerance, 1e-5);
        assert_eq!(config.line_search_iterations, 25);
        assert_eq!(config.line_search_tolerance, 1e-6);
        assert_eq!(config.epsilon, 1e-7);
        assert!(!config.display);
        assert!(!config.gradient_check);
        assert!(!config.analytic_gradients);
    }
}
