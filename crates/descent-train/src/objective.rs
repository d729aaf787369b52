//! Adapter turning a model into counted scalar evaluations.

use ndarray::Array1;

use crate::error::{TrainError, TrainResult};
use crate::mask::OptimizationMask;
use crate::model::Optimizable;
use crate::session::TrainingSession;

/// Objective/gradient adapter over a borrowed model.
///
/// All parameter traffic between the optimizer and the model flows through
/// this adapter: it applies the optional [`OptimizationMask`], installs the
/// resulting full vector into the model, and counts every objective and
/// gradient evaluation in the [`TrainingSession`] passed to each call.
///
/// The adapter borrows the model exclusively, so nothing else can evaluate
/// or mutate it for the lifetime of the adapter.
pub struct ObjectiveFn<'m, M: Optimizable> {
    model: &'m mut M,
    mask: Option<OptimizationMask>,
}

impl<'m, M: Optimizable> ObjectiveFn<'m, M> {
    /// Wraps a model with no mask installed.
    pub fn new(model: &'m mut M) -> Self {
        Self { model, mask: None }
    }

    /// Installs an optimization mask.
    ///
    /// Errors if the mask length does not match the model's full parameter
    /// count. Subsequent parameter get/set calls transparently honor the
    /// mask.
    pub fn set_mask(&mut self, mask: OptimizationMask) -> TrainResult<()> {
        let params_len = self.model.parameters().len();
        if mask.len() != params_len {
            return Err(TrainError::MaskLength {
                mask_len: mask.len(),
                params_len,
            });
        }
        self.mask = Some(mask);
        Ok(())
    }

    /// The installed mask, if any.
    pub fn mask(&self) -> Option<&OptimizationMask> {
        self.mask.as_ref()
    }

    /// Length of the (reduced) parameter vector the optimizer works in.
    pub fn dimension(&self) -> usize {
        match &self.mask {
            Some(mask) => mask.free_count(),
            None => self.model.parameters().len(),
        }
    }

    /// Current (reduced) parameter vector of the model.
    pub fn parameters(&self) -> Array1<f64> {
        let full = self.model.parameters();
        match &self.mask {
            Some(mask) => mask.subset(&full),
            None => full,
        }
    }

    /// Installs a (reduced) parameter vector into the model.
    pub fn set_parameters(&mut self, reduced: &Array1<f64>) -> TrainResult<()> {
        self.validate(reduced)?;
        self.install(reduced);
        Ok(())
    }

    /// Reinstalls a previously retrieved parameter vector.
    ///
    /// Used to undo speculative evaluations performed during line search, so
    /// the model's persistent state reflects only the parameters the caller
    /// chose. Round-trip: after `restore(p)`, [`parameters`](Self::parameters)
    /// returns `p`.
    pub fn restore(&mut self, previous: &Array1<f64>) -> TrainResult<()> {
        self.set_parameters(previous)
    }

    /// Evaluates the objective at a (reduced) parameter vector.
    ///
    /// Counts exactly one function evaluation in the session.
    pub fn evaluate(
        &mut self,
        session: &mut TrainingSession,
        reduced: &Array1<f64>,
    ) -> TrainResult<f64> {
        self.validate(reduced)?;
        Ok(self.evaluate_unchecked(session, reduced))
    }

    /// Analytic gradient at a (reduced) parameter vector.
    ///
    /// Installs the parameters, counts one gradient evaluation, and returns
    /// the model's gradient reduced to the free parameters.
    pub fn analytic_gradient(
        &mut self,
        session: &mut TrainingSession,
        reduced: &Array1<f64>,
    ) -> TrainResult<Array1<f64>> {
        self.validate(reduced)?;
        self.install(reduced);
        session.record_gradient_evaluation();
        let full = self.model.gradient();
        Ok(match &self.mask {
            Some(mask) => mask.subset(&full),
            None => full,
        })
    }

    /// Central finite-difference gradient at a (reduced) parameter vector.
    ///
    /// Costs two counted objective evaluations per free parameter. The base
    /// parameters are reinstalled after the sweep, so the model is left where
    /// it started.
    pub fn finite_difference_gradient(
        &mut self,
        session: &mut TrainingSession,
        reduced: &Array1<f64>,
        epsilon: f64,
    ) -> TrainResult<Array1<f64>> {
        self.validate(reduced)?;
        let mut gradient = Array1::zeros(reduced.len());
        for i in 0..reduced.len() {
            gradient[i] = self.fd_component_unchecked(session, reduced, i, epsilon);
        }
        self.install(reduced);
        Ok(gradient)
    }

    /// Objective value at `base + step * direction`, rolling the model back
    /// to its pre-call parameters afterwards.
    ///
    /// Lengths must have been validated by the caller.
    pub(crate) fn line_value(
        &mut self,
        session: &mut TrainingSession,
        base: &Array1<f64>,
        step: f64,
        direction: &Array1<f64>,
    ) -> f64 {
        let previous = self.parameters();
        let mut trial = base.clone();
        trial.scaled_add(step, direction);
        let value = self.evaluate_unchecked(session, &trial);
        self.install(&previous);
        value
    }

    /// Single central-difference component; two counted evaluations.
    ///
    /// Lengths must have been validated by the caller.
    pub(crate) fn fd_component_unchecked(
        &mut self,
        session: &mut TrainingSession,
        reduced: &Array1<f64>,
        index: usize,
        epsilon: f64,
    ) -> f64 {
        let mut trial = reduced.clone();
        trial[index] += epsilon;
        let fplus = self.evaluate_unchecked(session, &trial);

        let mut trial = reduced.clone();
        trial[index] -= epsilon;
        let fminus = self.evaluate_unchecked(session, &trial);

        0.5 * ((fplus - fminus) / epsilon)
    }

    /// Counted evaluation for callers that validated lengths up front.
    pub(crate) fn evaluate_unchecked(
        &mut self,
        session: &mut TrainingSession,
        reduced: &Array1<f64>,
    ) -> f64 {
        session.record_function_evaluation();
        self.install(reduced);
        self.model.objective()
    }

    /// Full-length analytic gradient straight from the model, uncounted.
    ///
    /// Diagnostic use only (the gradient checker).
    pub(crate) fn raw_gradient(&self) -> Array1<f64> {
        self.model.gradient()
    }

    /// Mask-apply and install without validation.
    pub(crate) fn install(&mut self, reduced: &Array1<f64>) {
        match &self.mask {
            Some(mask) => {
                let mut full = self.model.parameters();
                mask.overwrite(&mut full, reduced);
                self.model.set_parameters(&full);
            }
            None => self.model.set_parameters(reduced),
        }
    }

    fn validate(&self, reduced: &Array1<f64>) -> TrainResult<()> {
        let required = self.dimension();
        if reduced.len() != required {
            return Err(TrainError::ReducedLength {
                required,
                actual: reduced.len(),
            });
        }
        Ok(())
    }
}
