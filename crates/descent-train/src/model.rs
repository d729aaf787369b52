//! The capability contract a trainable model must provide.

use ndarray::Array1;

/// A model whose parameters can be fitted by minimizing an objective.
///
/// The trainer treats the model as exclusively owned for the duration of a
/// line-search call: it installs trial parameter vectors, reads the objective
/// and gradient, and rolls speculative changes back before returning. The
/// model is assumed to recompute whatever it needs when parameters are
/// installed; no other side effects are expected.
///
/// # Example
///
/// ```rust
/// use descent_train::Optimizable;
/// use ndarray::{array, Array1};
///
/// /// Quadratic bowl centred at (2, 3).
/// struct Bowl {
///     params: Array1<f64>,
/// }
///
/// impl Optimizable for Bowl {
///     fn parameters(&self) -> Array1<f64> {
///         self.params.clone()
///     }
///
///     fn set_parameters(&mut self, params: &Array1<f64>) {
///         self.params = params.clone();
///     }
///
///     fn objective(&self) -> f64 {
///         (self.params[0] - 2.0).powi(2) + (self.params[1] - 3.0).powi(2)
///     }
///
///     fn gradient(&self) -> Array1<f64> {
///         array![
///             2.0 * (self.params[0] - 2.0),
///             2.0 * (self.params[1] - 3.0),
///         ]
///     }
/// }
/// ```
pub trait Optimizable {
    /// Returns the model's current full parameter vector.
    fn parameters(&self) -> Array1<f64>;

    /// Installs a full parameter vector into the model.
    fn set_parameters(&mut self, params: &Array1<f64>);

    /// Objective value at the currently installed parameters.
    fn objective(&self) -> f64;

    /// Analytic gradient at the currently installed parameters.
    ///
    /// Must have the same length as the full parameter vector.
    fn gradient(&self) -> Array1<f64>;
}
