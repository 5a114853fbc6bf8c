use crate::options::Options;
use crate::tableau::Tableau;

/// Entries smaller than this are dropped to exact zero while pivoting.
/// Skipping them keeps row combination cheap on sparse rows; correctness
/// does not depend on it.
const ELIMINATION_EPSILON: f64 = 1e-16;

/// Verdict of a simplex run over one tableau.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum SimplexOutcome {
    /// The internal objective value (row 0 RHS, rounded to precision).
    Optimal(f64),
    /// The objective grows without bound along this column.
    Unbounded(usize),
    /// No basic feasible solution exists.
    Infeasible,
    /// A pivot cycle was detected, or the pivot budget ran out.
    Cycled,
}

/// Rounds to the nearest multiple of `precision`.
pub(crate) fn round_to_precision(value: f64, precision: f64) -> f64 {
    let rounding = (1.0 / precision).round();
    ((value + f64::EPSILON) * rounding).round() / rounding
}

/// Exchanges the basic variable of `row` for the variable of `col`:
/// scales the pivot row, eliminates the pivot column from every other row,
/// and swaps the pair in both basis permutation arrays.
pub(crate) fn pivot(tableau: &mut Tableau, row: usize, col: usize) {
    let quotient = tableau.at(row, col);
    let leaving = tableau.variable_at_position[tableau.width + row];
    let entering = tableau.variable_at_position[col];
    tableau.variable_at_position[tableau.width + row] = entering;
    tableau.variable_at_position[col] = leaving;
    tableau.position_of_variable[leaving] = col;
    tableau.position_of_variable[entering] = tableau.width + row;

    let mut nonzero_columns = Vec::with_capacity(tableau.width);
    for c in 0..tableau.width {
        let value = tableau.at(row, c);
        if value.abs() > ELIMINATION_EPSILON {
            tableau.set(row, c, value / quotient);
            nonzero_columns.push(c);
        } else {
            tableau.set(row, c, 0.0);
        }
    }
    tableau.set(row, col, 1.0 / quotient);

    for r in 0..tableau.height {
        if r == row {
            continue;
        }
        let coef = tableau.at(r, col);
        if coef.abs() > ELIMINATION_EPSILON {
            for &c in &nonzero_columns {
                tableau.set(r, c, tableau.at(r, c) - coef * tableau.at(row, c));
            }
            tableau.set(r, col, -coef / quotient);
        }
    }
}

/// Scans the pivot history for a repeating contiguous sequence ending at
/// the latest pivot. A heuristic net for degenerate bases, not a proof.
fn has_cycle(
    history: &mut Vec<(usize, usize)>,
    tableau: &Tableau,
    row: usize,
    col: usize,
) -> bool {
    history.push((
        tableau.variable_at_position[tableau.width + row],
        tableau.variable_at_position[col],
    ));
    // the minimum length of a cycle is 6
    for length in 6..=history.len() / 2 {
        let mut cycle = true;
        for i in 0..length {
            let item = history.len() - 1 - i;
            if history[item] != history[item - length] {
                cycle = false;
                break;
            }
        }
        if cycle {
            return true;
        }
    }
    false
}

// Finds the optimal solution given some basic feasible solution.
fn phase2(tableau: &mut Tableau, options: &Options) -> SimplexOutcome {
    let mut pivot_history = Vec::new();
    for _ in 0..options.max_pivots {
        // entering column: most positive reduced cost
        let mut col = 0;
        let mut value = options.precision;
        for c in 1..tableau.width {
            let reduced_cost = tableau.at(0, c);
            if reduced_cost > value {
                value = reduced_cost;
                col = c;
            }
        }
        if col == 0 {
            return SimplexOutcome::Optimal(round_to_precision(
                tableau.at(0, 0),
                options.precision,
            ));
        }

        // leaving row: minimum ratio over positive pivot entries
        let mut row = 0;
        let mut min_ratio = f64::INFINITY;
        for r in 1..tableau.height {
            let coefficient = tableau.at(r, col);
            if coefficient <= options.precision {
                continue;
            }
            let ratio = tableau.at(r, 0) / coefficient;
            if ratio < min_ratio {
                row = r;
                min_ratio = ratio;
                if ratio <= options.precision {
                    break; // the ratio cannot drop below zero
                }
            }
        }
        if row == 0 {
            return SimplexOutcome::Unbounded(col);
        }

        if options.check_cycles && has_cycle(&mut pivot_history, tableau, row, col) {
            return SimplexOutcome::Cycled;
        }
        pivot(tableau, row, col);
    }
    SimplexOutcome::Cycled
}

/// Runs both phases: pivots negative right-hand sides out of the basis,
/// then optimizes from the resulting basic feasible solution.
pub(crate) fn simplex(tableau: &mut Tableau, options: &Options) -> SimplexOutcome {
    let mut pivot_history = Vec::new();
    for _ in 0..options.max_pivots {
        // leaving row: most negative right-hand side
        let mut row = 0;
        let mut rhs = -options.precision;
        for r in 1..tableau.height {
            let value = tableau.at(r, 0);
            if value < rhs {
                rhs = value;
                row = r;
            }
        }
        if row == 0 {
            return phase2(tableau, options);
        }

        // entering column: steepest improvement among negative coefficients
        let mut col = 0;
        let mut max_ratio = f64::NEG_INFINITY;
        for c in 1..tableau.width {
            let coefficient = tableau.at(row, c);
            if coefficient < -options.precision {
                let ratio = -tableau.at(0, c) / coefficient;
                if ratio > max_ratio {
                    max_ratio = ratio;
                    col = c;
                }
            }
        }
        if col == 0 {
            return SimplexOutcome::Infeasible;
        }

        if options.check_cycles && has_cycle(&mut pivot_history, tableau, row, col) {
            return SimplexOutcome::Cycled;
        }
        pivot(tableau, row, col);
    }
    SimplexOutcome::Cycled
}
