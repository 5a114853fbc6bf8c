use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;

use log::debug;

use crate::options::Options;
use crate::simplex::{SimplexOutcome, simplex};
use crate::solution::SolutionStatus;
use crate::tableau::{CompiledModel, Tableau};

/// A bound restriction on one column, in the tableau's uniform row form:
/// `sign * x <= sign * bound`. A positive sign caps the variable from
/// above, a negative sign from below.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cut {
    sign: f64,
    variable: usize,
    bound: f64,
}

impl Cut {
    fn at_most(variable: usize, bound: f64) -> Self {
        Self {
            sign: 1.0,
            variable,
            bound,
        }
    }

    fn at_least(variable: usize, bound: f64) -> Self {
        Self {
            sign: -1.0,
            variable,
            bound,
        }
    }
}

/// A pending subproblem: the relaxed bound its parent established and the
/// cuts that define it.
#[derive(Debug)]
struct Branch {
    bound: f64,
    cuts: Vec<Cut>,
}

impl PartialEq for Branch {
    fn eq(&self, other: &Self) -> bool {
        self.bound.total_cmp(&other.bound) == Ordering::Equal
    }
}

impl Eq for Branch {}

impl PartialOrd for Branch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Branch {
    // BinaryHeap is a max-heap; comparing in descending bound order makes
    // it pop the lowest relaxed bound first.
    fn cmp(&self, other: &Self) -> Ordering {
        other.bound.total_cmp(&self.bound)
    }
}

/// Rebuilds `target` as the base tableau extended with one row per cut.
///
/// A cut on a non-basic variable becomes a fresh bound row on its column; a
/// cut on a basic variable is rewritten through the variable's current
/// basis row so the new row stays consistent with the solved basis.
fn apply_cuts(base: &Tableau, target: &mut Tableau, cuts: &[Cut]) {
    let width = base.width;
    target.width = width;
    target.height = base.height + cuts.len();

    target.matrix.clear();
    target.matrix.extend_from_slice(&base.matrix);
    target.matrix.resize(target.height * width, 0.0);

    for (i, cut) in cuts.iter().enumerate() {
        let r = base.height + i;
        let position = base.position_of_variable[cut.variable];
        if position < width {
            target.set(r, 0, cut.sign * cut.bound);
            for c in 1..width {
                target.set(r, c, 0.0);
            }
            target.set(r, position, cut.sign);
        } else {
            let row = position - width;
            target.set(r, 0, cut.sign * (cut.bound - base.at(row, 0)));
            for c in 1..width {
                target.set(r, c, -cut.sign * base.at(row, c));
            }
        }
    }

    target.position_of_variable.clear();
    target
        .position_of_variable
        .extend_from_slice(&base.position_of_variable);
    target.variable_at_position.clear();
    target
        .variable_at_position
        .extend_from_slice(&base.variable_at_position);
    let positions = width + target.height;
    for i in base.position_of_variable.len()..positions {
        target.position_of_variable.push(i);
        target.variable_at_position.push(i);
    }
}

/// Finds the integer column whose value strays furthest from an integer.
/// Returns `(column, value, fractionality)`; a zero fractionality means the
/// tableau is already integral on every integer column.
fn most_fractional(tableau: &Tableau, integers: &[usize]) -> (usize, f64, f64) {
    let mut highest_frac = 0.0;
    let mut variable = 0;
    let mut value = 0.0;
    for &column in integers {
        let Some(row) = tableau.basis_row(column) else {
            continue; // non-basic columns sit at zero
        };
        let val = tableau.at(row, 0);
        let frac = (val - val.round()).abs();
        if frac > highest_frac {
            highest_frac = frac;
            variable = column;
            value = val;
        }
    }
    (variable, value, highest_frac)
}

fn past_deadline(start: Instant, timeout_ms: f64) -> bool {
    start.elapsed().as_secs_f64() * 1000.0 >= timeout_ms
}

/// Best-first search for the best integer-feasible objective, given a
/// solved fractional relaxation and its internal result.
///
/// On return the compiled model's tableau is the incumbent's whenever one
/// was found, so extraction reads the integer solution rather than the
/// relaxation.
pub(crate) fn branch_and_cut(
    compiled: &mut CompiledModel,
    initial_result: f64,
    options: &Options,
) -> (SolutionStatus, f64) {
    let (variable, value, frac) = most_fractional(&compiled.tableau, &compiled.integers);
    if frac <= options.precision {
        // the relaxation is already integral
        return (SolutionStatus::Optimal, initial_result);
    }
    debug!("relaxation fractional on column {variable}, branching");

    let mut branches = BinaryHeap::new();
    branches.push(Branch {
        bound: initial_result,
        cuts: vec![Cut::at_least(variable, value.ceil())],
    });
    branches.push(Branch {
        bound: initial_result,
        cuts: vec![Cut::at_most(variable, value.floor())],
    });

    // Scratch tableaus sized once for the deepest possible cut list (one
    // cut per direction per integer column). The candidate is solved in
    // place and swapped with the incumbent when it wins, so the incumbent's
    // rows are never overwritten mid-search.
    let extra_rows = compiled.integers.len() * 2;
    let width = compiled.tableau.width;
    let mut candidate = Tableau::with_row_capacity(width, compiled.tableau.height + extra_rows);
    let mut incumbent = Tableau::with_row_capacity(width, compiled.tableau.height + extra_rows);

    let sign = compiled.direction.sign();
    let optimal_threshold = initial_result * (1.0 - sign * options.tolerance);
    let start = Instant::now();
    let mut timed_out = past_deadline(start, options.timeout); // a zero budget expires at once
    let mut solution_found = false;
    let mut best_eval = f64::INFINITY;
    let mut iterations = 0;

    while iterations < options.max_iterations && best_eval >= optimal_threshold && !timed_out {
        let Some(Branch { bound, cuts }) = branches.pop() else {
            break;
        };
        if bound > best_eval {
            // the queue is bound-ordered, so every remaining branch is
            // worse than the incumbent
            break;
        }

        apply_cuts(&compiled.tableau, &mut candidate, &cuts);
        // cuts only shrink the feasible region, so the candidate can be
        // infeasible or cycled but never unbounded
        match simplex(&mut candidate, options) {
            SimplexOutcome::Optimal(result) if result < best_eval => {
                let (variable, value, frac) = most_fractional(&candidate, &compiled.integers);
                if frac <= options.precision {
                    solution_found = true;
                    best_eval = result;
                    std::mem::swap(&mut candidate, &mut incumbent);
                    debug!("new incumbent {best_eval} after {iterations} iterations");
                } else {
                    // Branch again on the fractional column. An ancestor
                    // cut on the same column and side is superseded by the
                    // tighter new cut rather than carried along.
                    let mut floor_branch = Vec::with_capacity(cuts.len() + 1);
                    let mut ceil_branch = Vec::with_capacity(cuts.len() + 1);
                    for &cut in &cuts {
                        if cut.variable == variable {
                            if cut.sign < 0.0 {
                                floor_branch.push(cut);
                            } else {
                                ceil_branch.push(cut);
                            }
                        } else {
                            floor_branch.push(cut);
                            ceil_branch.push(cut);
                        }
                    }
                    floor_branch.push(Cut::at_most(variable, value.floor()));
                    ceil_branch.push(Cut::at_least(variable, value.ceil()));
                    branches.push(Branch {
                        bound: result,
                        cuts: ceil_branch,
                    });
                    branches.push(Branch {
                        bound: result,
                        cuts: floor_branch,
                    });
                }
            }
            // infeasible, cycled, or no better than the incumbent: the
            // branch is pruned, which is a normal part of the search
            _ => {}
        }

        timed_out = past_deadline(start, options.timeout);
        iterations += 1;
    }

    let unfinished = (timed_out || iterations >= options.max_iterations)
        && !branches.is_empty()
        && best_eval >= optimal_threshold;
    let status = if unfinished {
        SolutionStatus::TimedOut
    } else if !solution_found {
        SolutionStatus::Infeasible
    } else {
        SolutionStatus::Optimal
    };
    debug!("integer search finished with {status:?} after {iterations} iterations");

    if solution_found {
        compiled.tableau = incumbent;
    }
    (status, if solution_found { best_eval } else { f64::NAN })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Constraint, Direction, Model};
    use crate::tableau::compile;

    fn search(model: &Model, options: &Options) -> (SolutionStatus, f64) {
        let mut compiled = compile(model);
        match simplex(&mut compiled.tableau, options) {
            SimplexOutcome::Optimal(result) => branch_and_cut(&mut compiled, result, options),
            other => panic!("Relaxation did not solve: {other:?}"),
        }
    }

    fn fractional_model() -> Model {
        // Relaxation picks x=1, y=0.5 for 4; the integer optimum is x=1.
        let mut model = Model::new(Direction::Maximize, "value");
        model.add_variable("x", [("value", 3.0), ("weight", 1.0)]);
        model.add_variable("y", [("value", 2.0), ("weight", 1.0)]);
        model.add_constraint("weight", Constraint::less_eq(1.5));
        model.binaries = crate::model::Group::All;
        model
    }

    #[test]
    fn test_integral_relaxation_short_circuits() {
        let mut model = Model::new(Direction::Maximize, "coverage");
        model.add_variable("a", [("coverage", 3.0), ("slots", 1.0)]);
        model.add_variable("b", [("coverage", 2.0), ("slots", 1.0)]);
        model.add_variable("c", [("coverage", 1.0), ("slots", 1.0)]);
        model.add_constraint("slots", Constraint::less_eq(2.0));
        model.binaries = crate::model::Group::All;

        let (status, result) = search(&model, &Options::default());
        assert_eq!(status, SolutionStatus::Optimal);
        assert!((-result - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_branching_rounds_down_to_integer_optimum() {
        let (status, result) = search(&fractional_model(), &Options::default());
        assert_eq!(status, SolutionStatus::Optimal);
        assert!((-result - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_timeout_reports_timedout() {
        let options = Options {
            timeout: 0.0,
            ..Options::default()
        };
        let (status, result) = search(&fractional_model(), &options);
        assert_eq!(status, SolutionStatus::TimedOut);
        assert!(result.is_nan());
    }

    #[test]
    fn test_branches_pop_in_ascending_bound_order() {
        let mut heap = BinaryHeap::new();
        for bound in [4.0, -2.0, 7.5, 0.0] {
            heap.push(Branch {
                bound,
                cuts: Vec::new(),
            });
        }
        let popped: Vec<f64> = std::iter::from_fn(|| heap.pop().map(|b| b.bound)).collect();
        assert_eq!(popped, vec![-2.0, 0.0, 4.0, 7.5]);
    }

    #[test]
    fn test_apply_cuts_extends_positions() {
        let compiled = compile(&fractional_model());
        let mut target = Tableau::with_row_capacity(compiled.tableau.width, 16);
        let cuts = [Cut::at_most(2, 0.0), Cut::at_least(1, 1.0)];
        apply_cuts(&compiled.tableau, &mut target, &cuts);

        assert_eq!(target.height, compiled.tableau.height + 2);
        // x2 <= 0 lands as a fresh row on the untouched column
        assert_eq!(target.at(target.height - 2, 0), 0.0);
        assert_eq!(target.at(target.height - 2, 2), 1.0);
        // -x1 <= -1
        assert_eq!(target.at(target.height - 1, 0), -1.0);
        assert_eq!(target.at(target.height - 1, 1), -1.0);
        for (variable, &position) in target.position_of_variable.iter().enumerate() {
            assert_eq!(target.variable_at_position[position], variable);
        }
    }
}
