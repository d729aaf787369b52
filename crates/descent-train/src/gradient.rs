//! Gradient providers and the diagnostic gradient checker.

use std::fmt;

use ndarray::Array1;

use crate::error::TrainResult;
use crate::model::Optimizable;
use crate::objective::ObjectiveFn;
use crate::session::TrainingSession;

/// Source of gradient vectors for the optimizer.
///
/// The provider is selected once at configuration time (analytic or
/// finite-difference), so the hot loops never branch on the gradient mode.
///
/// Implementations return the gradient in the *reduced* parameter space: the
/// same space the search directions live in, with masked-out entries absent.
pub trait GradientProvider<M: Optimizable> {
    /// Gradient at a (reduced) parameter vector.
    fn gradient(
        &self,
        objective: &mut ObjectiveFn<'_, M>,
        session: &mut TrainingSession,
        reduced: &Array1<f64>,
    ) -> TrainResult<Array1<f64>>;

    /// Returns the name of the provider.
    fn name(&self) -> &'static str;
}

/// Analytic gradients straight from the model.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticGradient;

impl<M: Optimizable> GradientProvider<M> for AnalyticGradient {
    fn gradient(
        &self,
        objective: &mut ObjectiveFn<'_, M>,
        session: &mut TrainingSession,
        reduced: &Array1<f64>,
    ) -> TrainResult<Array1<f64>> {
        objective.analytic_gradient(session, reduced)
    }

    fn name(&self) -> &'static str {
        "analytic"
    }
}

/// Central finite-difference gradient estimation.
///
/// `g_i = (f(p + ε·e_i) - f(p - ε·e_i)) / (2ε)` per component: two counted
/// objective evaluations each, O(2n) for a full gradient of n free
/// parameters.
#[derive(Debug, Clone, Copy)]
pub struct FiniteDifference {
    /// Perturbation step ε.
    pub epsilon: f64,
}

impl Default for FiniteDifference {
    fn default() -> Self {
        Self { epsilon: 1.0e-6 }
    }
}

impl<M: Optimizable> GradientProvider<M> for FiniteDifference {
    fn gradient(
        &self,
        objective: &mut ObjectiveFn<'_, M>,
        session: &mut TrainingSession,
        reduced: &Array1<f64>,
    ) -> TrainResult<Array1<f64>> {
        objective.finite_difference_gradient(session, reduced, self.epsilon)
    }

    fn name(&self) -> &'static str {
        "finite-difference"
    }
}

/// One row of a gradient-check report.
#[derive(Debug, Clone, Copy)]
pub struct GradientCheckEntry {
    /// Index into the full parameter vector.
    pub index: usize,
    /// Analytic gradient component (zero for skipped entries).
    pub analytic: f64,
    /// Finite-difference estimate (zero for skipped entries).
    pub estimate: f64,
    /// Absolute difference between the two.
    pub discrepancy: f64,
    /// Whether the parameter was masked out and therefore not checked.
    pub skipped: bool,
}

/// Diagnostic comparison of analytic and finite-difference gradients.
///
/// Produced by [`Trainer::check_gradient`](crate::trainer::Trainer::check_gradient).
/// Purely informational: large discrepancies never abort a run.
#[derive(Debug, Clone)]
pub struct GradientCheckReport {
    /// Per-parameter entries, one per full parameter index.
    pub entries: Vec<GradientCheckEntry>,
}

impl GradientCheckReport {
    /// Largest discrepancy across the checked (non-skipped) parameters.
    #[must_use]
    pub fn max_discrepancy(&self) -> f64 {
        self.entries
            .iter()
            .filter(|e| !e.skipped)
            .map(|e| e.discrepancy)
            .fold(0.0, f64::max)
    }
}

impl fmt::Display for GradientCheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "==========================")?;
        writeln!(f, "GRADCHECK")?;
        writeln!(f, "     Delta, Analytic, Diff")?;
        writeln!(f, "--------------------------")?;
        for entry in &self.entries {
            let marker = if entry.skipped { "x" } else { " " };
            writeln!(
                f,
                "#{} {} {:.6e}, {:.6e}, {:.6e}",
                entry.index, marker, entry.estimate, entry.analytic, entry.discrepancy
            )?;
        }
        write!(f, "==========================")
    }
}

/// Compares analytic gradient components against finite-difference
/// estimates, parameter by parameter.
///
/// Masked-out parameters report a zero discrepancy and are marked skipped.
/// The only effect on training statistics is the objective evaluations the
/// finite-difference estimation naturally accrues; the analytic gradient is
/// read directly from the model, uncounted.
pub(crate) fn check_gradient<M: Optimizable>(
    objective: &mut ObjectiveFn<'_, M>,
    session: &mut TrainingSession,
    epsilon: f64,
) -> TrainResult<GradientCheckReport> {
    let reduced = objective.parameters();
    let analytic = objective.raw_gradient();

    let mut entries = Vec::with_capacity(analytic.len());
    let mut pos = 0;
    for i in 0..analytic.len() {
        let free = objective.mask().map_or(true, |mask| mask.is_free(i));
        if free {
            let estimate = objective.fd_component_unchecked(session, &reduced, pos, epsilon);
            pos += 1;
            entries.push(GradientCheckEntry {
                index: i,
                analytic: analytic[i],
                estimate,
                discrepancy: (estimate - analytic[i]).abs(),
                skipped: false,
            });
        } else {
            entries.push(GradientCheckEntry {
                index: i,
                analytic: 0.0,
                estimate: 0.0,
                discrepancy: 0.0,
                skipped: true,
            });
        }
    }

    // Leave the model at the parameters it held on entry.
    objective.install(&reduced);

    Ok(GradientCheckReport { entries })
}
