use crate::options::Options;
use crate::simplex::round_to_precision;
use crate::tableau::CompiledModel;

/// How a solve ended.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// The best feasible objective was found (and proven, up to the
    /// configured tolerance, for integer problems).
    Optimal,
    /// No assignment satisfies every constraint.
    Infeasible,
    /// The objective can improve without limit.
    Unbounded,
    /// Pivoting entered a cycle or ran out of budget.
    Cycled,
    /// The integer search ran out of time or iterations. The result is
    /// still usable when finite, just not proven optimal.
    TimedOut,
}

/// The outcome of a solve: a status, the objective value, and the variable
/// assignments that carry a nonzero value.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub status: SolutionStatus,
    /// The objective in the model's own sense: `NaN` when there is no
    /// solution to report, `±Infinity` when unbounded.
    pub result: f64,
    /// `(name, value)` pairs in variable declaration order.
    pub variables: Vec<(String, f64)>,
}

impl Solution {
    /// A solve that produced nothing to report.
    pub(crate) fn failed(status: SolutionStatus) -> Self {
        Self {
            status,
            result: f64::NAN,
            variables: Vec::new(),
        }
    }

    /// An unbounded solve. The offending column is reported with an
    /// infinite value when it belongs to a model variable (it can also be
    /// a slack, in which case no variable is named).
    pub(crate) fn unbounded(compiled: &CompiledModel, column: usize) -> Self {
        let variable = compiled.tableau.variable_at_position[column];
        let variables = if (1..=compiled.variables.len()).contains(&variable) {
            vec![(compiled.variables[variable - 1].clone(), f64::INFINITY)]
        } else {
            Vec::new()
        };
        Self {
            status: SolutionStatus::Unbounded,
            result: compiled.direction.denormalize(f64::INFINITY),
            variables,
        }
    }

    /// Reads the final basis back into named values. `result` is the
    /// engine-internal objective; the reported objective undoes the
    /// direction fold and the objective row's negated bookkeeping.
    pub(crate) fn evaluated(
        compiled: &CompiledModel,
        status: SolutionStatus,
        result: f64,
        options: &Options,
    ) -> Self {
        let tableau = &compiled.tableau;
        let mut variables = Vec::new();
        for (i, name) in compiled.variables.iter().enumerate() {
            let value = match tableau.basis_row(i + 1) {
                Some(row) => tableau.at(row, 0),
                None => 0.0,
            };
            if value > options.precision {
                variables.push((name.clone(), round_to_precision(value, options.precision)));
            } else if options.include_zero_variables {
                variables.push((name.clone(), 0.0));
            }
        }
        Self {
            status,
            result: -compiled.direction.denormalize(result),
            variables,
        }
    }
}
