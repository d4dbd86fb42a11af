//! barrier_descent::types — numeric aliases shared by the descent stack.
//!
//! Keeps the solver, adapter, and outcome code agnostic to the concrete
//! `ndarray` containers. All vectors are `f64` column vectors whose length is
//! the number of optimization variables; `Hessian` is square of that size.
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Optimization variables (for the selection event, the magnitudes `β_E`).
pub type Theta = Array1<f64>;

/// Gradient of the objective with respect to [`Theta`].
pub type Grad = Array1<f64>;

/// Dense `n × n` second-derivative matrix.
pub type Hessian = Array2<f64>;

/// Scalar objective value being minimized.
pub type Cost = f64;

/// Function-evaluation counters keyed by argmin counter name
/// (`"cost_count"`, `"gradient_count"`, `"feasibility_count"`).
pub type FnEvalMap = HashMap<String, u64>;
