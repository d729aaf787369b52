//! # Descent Train
//!
//! Model-facing training layer for the Descent line-search core.
//!
//! This crate adapts a generic multivariate objective/gradient model into the
//! scalar evaluations the line search in `descent-math` needs:
//!
//! - **Model contract**: The [`Optimizable`] capability trait (objective,
//!   analytic gradient, and a gettable/settable parameter vector)
//! - **Masking**: An [`OptimizationMask`] freezing a subset of parameters at
//!   their current values
//! - **Adapter**: [`ObjectiveFn`], which applies the mask, installs
//!   parameters, and counts every evaluation
//! - **Gradients**: Analytic or central finite-difference providers, selected
//!   once at configuration time, plus a diagnostic gradient checker
//! - **Training session**: Explicit, passed-around evaluation counters and
//!   the last function value, never ambient state
//! - **Trainer**: The [`Trainer`] entry point exposing `line_minimize`
//!
//! ## Design Philosophy
//!
//! - **Single-threaded, synchronous**: Every evaluation is a direct blocking
//!   call into the model, which the trainer borrows exclusively
//! - **Speculative evaluations are rolled back**: Line-search trial points
//!   never leak into the model's persistent parameter state
//! - **Contract violations are errors, degeneracy is not**: Length mismatches
//!   fail fast; numerical edge cases are clamped inside the line search

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::similar_names)]
#![allow(clippy::float_cmp)]

pub mod error;
pub mod gradient;
pub mod mask;
pub mod model;
pub mod objective;
pub mod session;
pub mod trainer;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{TrainError, TrainResult};
    pub use crate::gradient::{
        AnalyticGradient, FiniteDifference, GradientCheckReport, GradientProvider,
    };
    pub use crate::mask::OptimizationMask;
    pub use crate::model::Optimizable;
    pub use crate::objective::ObjectiveFn;
    pub use crate::session::{TrainingSession, TrainingSummary};
    pub use crate::trainer::{Trainer, TrainerConfig};
    pub use descent_math::linesearch::{LineSearchConfig, LineSearchResult};
}

pub use error::{TrainError, TrainResult};
pub use mask::OptimizationMask;
pub use model::Optimizable;
pub use session::TrainingSession;
pub use trainer::{Trainer, TrainerConfig};
