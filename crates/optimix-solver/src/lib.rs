//! A mixed integer linear programming solver for small-to-medium dense
//! problems: a two-phase simplex method over a dense tableau, wrapped in a
//! best-first branch-and-cut search for integer and binary variables.
//!
//! Build a [`Model`], then call [`solve`] (or configure a [`Solver`]) and
//! branch on the returned [`Solution`]'s status. Unsolvable models are
//! reported through [`SolutionStatus`], never as errors.

mod branch;
mod model;
mod options;
mod simplex;
mod solution;
mod tableau;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use model::{Constraint, Direction, Group, Model, ModelError};
pub use options::Options;
pub use solution::{Solution, SolutionStatus};

use branch::branch_and_cut;
use simplex::{SimplexOutcome, simplex};
use tableau::compile;

/// Solves a model with the default [`Options`].
pub fn solve(model: &Model) -> Solution {
    Solver::new().solve(model)
}

/// A reusable solver handle carrying the options applied to each solve.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    options: Options,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.options.tolerance = tolerance;
        self
    }

    pub fn with_timeout(mut self, timeout: f64) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Compiles the model, solves its relaxation, and — when integer
    /// variables are declared and the relaxation is optimal — runs the
    /// integer search before extracting the solution.
    pub fn solve(&self, model: &Model) -> Solution {
        let mut compiled = compile(model);
        match simplex(&mut compiled.tableau, &self.options) {
            SimplexOutcome::Optimal(result) => {
                if compiled.integers.is_empty() {
                    return Solution::evaluated(
                        &compiled,
                        SolutionStatus::Optimal,
                        result,
                        &self.options,
                    );
                }
                let (status, best) = branch_and_cut(&mut compiled, result, &self.options);
                if best.is_nan() {
                    // no integer-feasible branch was reached
                    Solution::failed(status)
                } else {
                    Solution::evaluated(&compiled, status, best, &self.options)
                }
            }
            // an unbounded or infeasible relaxation dooms every branch,
            // and a cycled one never yields a starting point
            SimplexOutcome::Unbounded(column) => Solution::unbounded(&compiled, column),
            SimplexOutcome::Infeasible => Solution::failed(SolutionStatus::Infeasible),
            SimplexOutcome::Cycled => Solution::failed(SolutionStatus::Cycled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_continuous_model() {
        let mut model = Model::new(Direction::Maximize, "value");
        model.add_variable("x", [("value", 3.0), ("sum", 1.0), ("x_cap", 1.0)]);
        model.add_variable("y", [("value", 2.0), ("sum", 1.0), ("y_cap", 1.0)]);
        model.add_constraint("sum", Constraint::less_eq(4.0));
        model.add_constraint("x_cap", Constraint::less_eq(3.0));
        model.add_constraint("y_cap", Constraint::less_eq(3.0));

        let solution = solve(&model);
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.result - 11.0).abs() < 1e-6);
        assert_eq!(
            solution.variables,
            vec![("x".to_string(), 3.0), ("y".to_string(), 1.0)]
        );
    }

    #[test]
    fn test_solver_applies_custom_options() {
        let mut model = Model::new(Direction::Maximize, "value");
        model.add_variable("x", [("value", 1.0), ("cap", 1.0)]);
        model.add_constraint("cap", Constraint::less_eq(2.0));

        let solver = Solver::with_options(Options {
            include_zero_variables: true,
            ..Options::default()
        });
        let solution = solver.solve(&model);
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.variables.len(), 1);
    }
}
