//! FeasibleDescent — gradient descent with feasibility and descent halvings.
//!
//! Each iteration moves from the current point `x` along `−∇c(x)`:
//!
//! 1. **Feasibility**: halve the step until the proposal lies in the open
//!    domain of the objective. Running out of halvings fails the solve with
//!    [`OptError::InfeasiblePoint`].
//! 2. **Descent**: keep halving until the proposed cost does not exceed the
//!    current one. Running out of halvings ends the solve at `x`, which is
//!    then a point no short step can improve.
//! 3. **Acceptance**: the proposal becomes the new iterate; a relative cost
//!    change below `tol` ends the solve as converged. Otherwise the step
//!    doubles every `step_growth_period` iterations.
//!
//! The step length persists across iterations, so a run that needed tiny
//! steps near the boundary starts the next iteration from that scale.
use crate::optimization::{
    barrier_descent::{
        adapter::ArgMinAdapter,
        traits::{DescentOptions, SmoothObjective},
        types::{Cost, Grad, Theta},
    },
    errors::OptError,
};
use argmin::core::{
    ArgminError, Error, IterState, KV, Problem, Solver, State, TerminationReason,
};

/// Solver state carried between iterations.
#[derive(Debug, Clone, PartialEq)]
pub struct FeasibleDescent {
    step: f64,
    tol: f64,
    feasibility_budget: usize,
    descent_budget: usize,
    step_growth_period: usize,
}

impl FeasibleDescent {
    pub fn new(opts: &DescentOptions) -> Self {
        Self {
            step: opts.initial_step,
            tol: opts.tol,
            feasibility_budget: opts.feasibility_budget,
            descent_budget: opts.descent_budget,
            step_growth_period: opts.step_growth_period,
        }
    }

    /// Current step length.
    pub fn step(&self) -> f64 {
        self.step
    }
}

type DescentState = IterState<Theta, Grad, (), (), (), f64>;

impl<'a, F: SmoothObjective> Solver<ArgMinAdapter<'a, F>, DescentState> for FeasibleDescent {
    const NAME: &'static str = "FeasibleDescent";

    fn init(
        &mut self, problem: &mut Problem<ArgMinAdapter<'a, F>>, mut state: DescentState,
    ) -> Result<(DescentState, Option<KV>), Error> {
        let x = state.take_param().ok_or_else(|| ArgminError::NotInitialized {
            text: "FeasibleDescent requires an initial point".to_string(),
        })?;
        let cost = problem.cost(&x)?;
        Ok((state.param(x).cost(cost), None))
    }

    fn next_iter(
        &mut self, problem: &mut Problem<ArgMinAdapter<'a, F>>, mut state: DescentState,
    ) -> Result<(DescentState, Option<KV>), Error> {
        let x = state.take_param().ok_or_else(|| ArgminError::NotInitialized {
            text: "FeasibleDescent lost its current point".to_string(),
        })?;
        let current = state.get_cost();
        let direction = problem.gradient(&x)?;

        let mut proposal = &x - &(&direction * self.step);
        let mut halvings = 0;
        while !problem.problem("feasibility_count", |p| Ok(p.is_feasible(&proposal)))? {
            if halvings == self.feasibility_budget {
                return Err(OptError::InfeasiblePoint { attempts: halvings }.into());
            }
            self.step *= 0.5;
            halvings += 1;
            proposal = &x - &(&direction * self.step);
        }

        let mut proposed = cost_or_infinity(problem, &proposal)?;
        let mut halvings = 0;
        while !(proposed <= current) {
            if halvings == self.descent_budget {
                let state = state.param(x).cost(current).terminate_with(
                    TerminationReason::SolverExit("descent budget exhausted".to_string()),
                );
                return Ok((state, None));
            }
            self.step *= 0.5;
            halvings += 1;
            proposal = &x - &(&direction * self.step);
            proposed = cost_or_infinity(problem, &proposal)?;
        }

        let converged = (current - proposed).abs() < self.tol * current.abs();
        let grow = state.get_iter() % self.step_growth_period as u64 == 0;
        let mut state = state.param(proposal).cost(proposed);
        if converged {
            state = state.terminate_with(TerminationReason::SolverConverged);
        } else if grow {
            self.step *= 2.0;
        }
        Ok((state, None))
    }
}

// ---- Helper Methods ----

/// Cost at a feasible proposal, with `NonFiniteCost` read as `+∞` so the
/// descent loop keeps halving instead of aborting.
fn cost_or_infinity<F: SmoothObjective>(
    problem: &mut Problem<ArgMinAdapter<'_, F>>, x: &Theta,
) -> Result<Cost, Error> {
    match problem.cost(x) {
        Ok(value) => Ok(value),
        Err(err) => match OptError::from(err) {
            OptError::NonFiniteCost { .. } => Ok(f64::INFINITY),
            other => Err(other.into()),
        },
    }
}
