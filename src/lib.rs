//! rust_selectinf — selection-adjusted inference for randomized LASSO.
//!
//! Purpose
//! -------
//! After a randomized procedure selects variables, naive intervals and
//! p-values ignore the selection. This crate conditions on the selection
//! event instead, approximating its probability by barrier-smoothed convex
//! programs evaluated on a grid of target values. The `python-bindings`
//! feature builds the `_rust_selectinf` extension on top of the same API.
//!
//! Key behaviors
//! -------------
//! - [`selection`]: randomized LASSO and the randomized Simes screen, each
//!   producing a [`SelectionOutcome`](selection::outcome::SelectionOutcome).
//! - [`optimization`]: the barrier descent minimizer, the per-coordinate
//!   conjugate solver, and numerically stable Gaussian interval terms.
//! - [`inference`]: selection maps, density grids, interval inversion, the
//!   selective MLE, BH discovery, and the parallel engine.
//! - [`statistical_tests`]: the Kolmogorov–Smirnov check used to validate
//!   pivot calibration.
//! - With the `python-bindings` feature, `#[pyclass]` wrappers and the
//!   `#[pymodule]` initializer for `_rust_selectinf`.
//!
//! Invariants & assumptions
//! ------------------------
//! - A Python call draws its randomization from `StdRng` seeded with the
//!   caller's `seed`, so repeating the call repeats the selection.
//! - One coordinate failing never aborts the others; Python getters report
//!   it as `None` and `errors` carries the reason.
//! - Typed selection and inference errors surface in Python as `ValueError`.
//!
//! Downstream usage
//! ----------------
//! ```no_run
//! use ndarray::Array2;
//! use rand::{SeedableRng, rngs::StdRng};
//! use rust_selectinf::{inference::prelude::*, selection::prelude::*};
//!
//! # fn run(x: Array2<f64>, y: ndarray::Array1<f64>) -> Result<(), Box<dyn std::error::Error>> {
//! let lasso = RandomizedLasso::new(
//!     PenaltyWeights::uniform(x.ncols(), 2.0)?,
//!     LassoOptions::default(),
//! );
//! let fit = lasso.fit(&x.view(), &y.view(), &mut StdRng::seed_from_u64(7))?;
//! let results = SelectiveInference::default().run(&fit.outcome, &ExactSelection, None)?;
//! let found = SelectiveInference::default().discoveries(&results)?;
//! # let _ = found;
//! # Ok(())
//! # }
//! ```

pub mod inference;
pub mod optimization;
pub mod selection;
pub mod statistical_tests;
pub mod utils;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use rand::{SeedableRng, rngs::StdRng};

#[cfg(feature = "python-bindings")]
use crate::{
    inference::{
        InferenceOptions, InferenceResult, IntervalOptions, SelectiveInference, TargetInference,
        discovery, selection_map::ExactSelection,
    },
    selection::{
        lasso::{LassoOptions, RandomizedLasso},
        penalty::PenaltyWeights,
    },
    statistical_tests::KSOutcome,
    utils::{extract_f64_array, extract_f64_matrix},
};

/// KolmogorovSmirnov — uniformity check for a batch of selective pivots.
///
/// `KolmogorovSmirnov(pivots)` tests the values against U(0, 1); a small
/// `pvalue` means the pivots are miscalibrated.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_selectinf.statistical_tests")]
pub struct KolmogorovSmirnov {
    inner: KSOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl KolmogorovSmirnov {
    #[new]
    #[pyo3(text_signature = "(data, /)", signature = (raw_data))]
    pub fn new<'py>(py: Python<'py>, raw_data: &Bound<'py, PyAny>) -> PyResult<Self> {
        let arr = extract_f64_array(py, raw_data)?;
        let inner = KSOutcome::uniform(arr.as_slice()?)?;
        Ok(KolmogorovSmirnov { inner })
    }

    #[getter]
    pub fn statistic(&self) -> f64 {
        self.inner.statistic()
    }

    #[getter]
    pub fn pvalue(&self) -> f64 {
        self.inner.p_value()
    }

    #[getter]
    pub fn n(&self) -> usize {
        self.inner.n()
    }
}

/// SelectiveLasso — randomized LASSO fit followed by selective inference.
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `SelectiveLasso(x, y, lam, randomization_scale=1.0, ridge_term=None,
/// dispersion=None, level=0.9, bh_level=0.1, seed=0)`:
/// - `x`: 2-D array-like design, `y`: 1-D response.
/// - `lam`: uniform penalty weight.
/// - `dispersion`: noise variance; `None` estimates it from the fit.
/// - `level`: confidence level of the selective intervals.
/// - `bh_level`: default level of `discoveries`.
/// - `seed`: seed of the randomization draw.
///
/// Per-coordinate getters return `None` where a coordinate failed.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_selectinf.inference")]
pub struct SelectiveLasso {
    active: Vec<usize>,
    signs: Vec<f64>,
    results: Vec<InferenceResult<TargetInference>>,
    bh_level: f64,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl SelectiveLasso {
    #[new]
    #[pyo3(
        signature = (
            x,
            y,
            lam,
            randomization_scale = 1.0,
            ridge_term = None,
            dispersion = None,
            level = 0.9,
            bh_level = 0.1,
            seed = 0,
        ),
        text_signature = "(x, y, lam, /, randomization_scale=1.0, ridge_term=None, \
                          dispersion=None, level=0.9, bh_level=0.1, seed=0)"
    )]
    pub fn new<'py>(
        py: Python<'py>, x: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>, lam: f64,
        randomization_scale: f64, ridge_term: Option<f64>, dispersion: Option<f64>, level: f64,
        bh_level: f64, seed: u64,
    ) -> PyResult<Self> {
        let x = extract_f64_matrix(py, x)?.as_array().to_owned();
        let y = extract_f64_array(py, y)?.as_array().to_owned();
        let defaults = LassoOptions::default();
        let lasso = RandomizedLasso::new(
            PenaltyWeights::uniform(x.ncols(), lam)?,
            LassoOptions::new(randomization_scale, ridge_term, defaults.max_iter, defaults.tol)?,
        );
        let base = InferenceOptions::default();
        let defaults = base.intervals;
        let options = InferenceOptions::new(
            base.grid,
            base.descent,
            base.mle,
            IntervalOptions::new(
                level,
                defaults.param_grid_length,
                defaults.param_half_width,
                defaults.null_value,
            )?,
            base.cube_term,
            bh_level,
        )?;

        let (fit, results) = py.allow_threads(|| -> PyResult<_> {
            let fit = lasso.fit(&x.view(), &y.view(), &mut StdRng::seed_from_u64(seed))?;
            let results =
                SelectiveInference::new(options).run(&fit.outcome, &ExactSelection, dispersion)?;
            Ok((fit, results))
        })?;
        Ok(SelectiveLasso {
            active: fit.outcome.active().to_vec(),
            signs: fit.outcome.signs().to_vec(),
            results,
            bh_level,
        })
    }

    #[getter]
    pub fn active(&self) -> Vec<usize> {
        self.active.clone()
    }

    #[getter]
    pub fn signs(&self) -> Vec<f64> {
        self.signs.clone()
    }

    #[getter]
    pub fn estimates(&self) -> Vec<Option<f64>> {
        self.per_coordinate(|t| t.estimate)
    }

    #[getter]
    pub fn std_errors(&self) -> Vec<Option<f64>> {
        self.per_coordinate(|t| t.std_error)
    }

    /// Selective intervals; `None` also when no interval was found.
    #[getter]
    pub fn intervals(&self) -> Vec<Option<(f64, f64)>> {
        self.results
            .iter()
            .map(|r| r.as_ref().ok().and_then(|t| t.interval.require(t.coordinate).ok()))
            .collect()
    }

    /// Whether each selective MLE lies inside its selective interval.
    #[getter]
    pub fn estimates_in_interval(&self) -> Vec<Option<bool>> {
        self.per_coordinate(|t| t.estimate_in_interval)
    }

    #[getter]
    pub fn pvalues(&self) -> Vec<Option<f64>> {
        self.per_coordinate(|t| t.p_value)
    }

    #[getter]
    pub fn naive_intervals(&self) -> Vec<Option<(f64, f64)>> {
        self.per_coordinate(|t| (t.naive_interval.lower, t.naive_interval.upper))
    }

    #[getter]
    pub fn naive_pvalues(&self) -> Vec<Option<f64>> {
        self.per_coordinate(|t| t.naive_p_value)
    }

    /// Failure message per coordinate, `None` where inference succeeded.
    #[getter]
    pub fn errors(&self) -> Vec<Option<String>> {
        self.results.iter().map(|r| r.as_ref().err().map(|e| e.to_string())).collect()
    }

    /// Original variable indices rejected by BH at `level`, or at the
    /// constructor's `bh_level` when omitted.
    #[pyo3(signature = (level = None))]
    pub fn discoveries(&self, level: Option<f64>) -> PyResult<Vec<usize>> {
        let level = level.unwrap_or(self.bh_level);
        let coordinates = crate::inference::discoveries(&self.results, level)?;
        Ok(coordinates.into_iter().map(|j| self.active[j]).collect())
    }
}

#[cfg(feature = "python-bindings")]
impl SelectiveLasso {
    fn per_coordinate<T>(&self, f: impl Fn(&TargetInference) -> T) -> Vec<Option<T>> {
        self.results.iter().map(|r| r.as_ref().ok().map(&f)).collect()
    }
}

/// Indices rejected by the Benjamini–Hochberg step-up at `level`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (p_values, level = 0.1))]
fn benjamini_hochberg<'py>(
    py: Python<'py>, p_values: &Bound<'py, PyAny>, level: f64,
) -> PyResult<Vec<usize>> {
    let arr = extract_f64_array(py, p_values)?;
    Ok(discovery::benjamini_hochberg(arr.as_slice()?, level)?)
}

/// _rust_selectinf — extension entry point.
///
/// `SelectiveLasso` and `benjamini_hochberg` live under `inference`, the
/// pivot calibration check under `statistical_tests`.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_selectinf<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let statistical_tests_mod = PyModule::new(_py, "statistical_tests")?;
    let inference_mod = PyModule::new(_py, "inference")?;
    statistical_tests(_py, m, &statistical_tests_mod)?;
    inference(_py, m, &inference_mod)?;

    // `import rust_selectinf.inference` needs the sys.modules entries.
    let modules = _py.import("sys")?.getattr("modules")?;
    modules.set_item("rust_selectinf.statistical_tests", statistical_tests_mod)?;
    modules.set_item("rust_selectinf.inference", inference_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn statistical_tests<'py>(
    _py: Python, rust_selectinf: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<KolmogorovSmirnov>()?;
    rust_selectinf.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn inference<'py>(
    _py: Python, rust_selectinf: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<SelectiveLasso>()?;
    m.add_function(wrap_pyfunction!(benjamini_hochberg, m)?)?;
    rust_selectinf.add_submodule(m)?;
    Ok(())
}
