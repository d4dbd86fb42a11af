//! Execution helper that runs [`FeasibleDescent`] on an objective and returns
//! a crate-friendly [`DescentOutcome`].
use crate::optimization::{
    barrier_descent::{
        adapter::ArgMinAdapter,
        solver::FeasibleDescent,
        traits::{DescentOptions, DescentOutcome, SmoothObjective},
        types::Theta,
    },
    errors::OptResult,
};
#[cfg(feature = "obs_slog")]
use argmin::core::{CostFunction, Gradient};
use argmin::core::{Executor, State};
#[cfg(feature = "obs_slog")]
use argmin_math::ArgminL2Norm;

/// Run feasible descent from `x0`.
///
/// Wires the objective through [`ArgMinAdapter`], sets the initial point and
/// iteration cap on the executor state, optionally attaches a terminal
/// observer, runs, and converts the final state.
///
/// # Feature flags
/// With `obs_slog` enabled and `opts.verbose == true`, a slog terminal
/// observer logs every iteration, preceded by one line with `c(x₀)` and
/// `‖∇c(x₀)‖`.
///
/// # Errors
/// - Any error raised inside the solver, recovered into its `OptError`
///   form (`InfeasiblePoint` in particular).
/// - Outcome validation errors.
pub fn run_descent<F: SmoothObjective>(
    x0: Theta, opts: &DescentOptions, problem: ArgMinAdapter<'_, F>,
) -> OptResult<DescentOutcome> {
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        log_initial_state(&x0, &problem)?;
    }
    let solver = FeasibleDescent::new(opts);
    let mut executor = Executor::new(problem, solver);
    executor = executor.configure(|state| state.param(x0).max_iters(opts.max_iter as u64));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        executor = executor.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }

    let mut result = executor.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    log::trace!("feasible descent stopped after {iterations} iterations: {termination:?}");
    DescentOutcome::new(
        result.take_best_param(),
        result.get_best_cost(),
        termination,
        iterations,
        function_counts,
    )
}

// ---- Helper Methods ----

#[cfg(feature = "obs_slog")]
fn log_initial_state<F: SmoothObjective>(x0: &Theta, problem: &ArgMinAdapter<'_, F>) -> OptResult<()> {
    let c0 = problem.cost(x0)?;
    let g0n = problem.gradient(x0).ok().map(|g| g.l2_norm());
    eprintln!(
        "init: c(x0) = {:.6}{}",
        c0,
        g0n.map(|n| format!(", ||grad|| = {:.6}", n)).unwrap_or_default()
    );
    Ok(())
}
