use indexmap::IndexMap;
use log::debug;

use crate::model::{Direction, Model};

/// Dense row-major tableau in augmented form.
///
/// Column 0 holds right-hand sides and row 0 the objective; every other row
/// is a `<=` constraint. Lower bounds and binary caps are folded into the
/// same shape (coefficients negated for lower bounds), so the engine never
/// special-cases a row.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Tableau {
    pub(crate) matrix: Vec<f64>,
    pub(crate) width: usize,
    pub(crate) height: usize,
    /// Position of each variable: `0..width` means non-basic (a column),
    /// `width..` means basic in row `position - width`.
    pub(crate) position_of_variable: Vec<usize>,
    /// Inverse of `position_of_variable`; the two stay consistent
    /// permutations through every pivot.
    pub(crate) variable_at_position: Vec<usize>,
}

impl Tableau {
    #[inline]
    pub(crate) fn at(&self, row: usize, col: usize) -> f64 {
        self.matrix[row * self.width + col]
    }

    #[inline]
    pub(crate) fn set(&mut self, row: usize, col: usize, value: f64) {
        self.matrix[row * self.width + col] = value;
    }

    /// The basis row currently expressing `variable`, if any. A variable
    /// without a basis row is non-basic and sits at value zero.
    pub(crate) fn basis_row(&self, variable: usize) -> Option<usize> {
        let position = self.position_of_variable[variable];
        (position >= self.width).then(|| position - self.width)
    }

    /// An empty tableau whose buffers can grow to `rows` rows without
    /// reallocating.
    pub(crate) fn with_row_capacity(width: usize, rows: usize) -> Self {
        Self {
            matrix: Vec::with_capacity(width * rows),
            width,
            height: 0,
            position_of_variable: Vec::with_capacity(width + rows),
            variable_at_position: Vec::with_capacity(width + rows),
        }
    }
}

/// A model lowered onto a tableau, ready for the simplex engine.
pub(crate) struct CompiledModel {
    pub(crate) tableau: Tableau,
    pub(crate) direction: Direction,
    /// Variable names in column order (column = index + 1).
    pub(crate) variables: Vec<String>,
    /// Columns restricted to integer values; binary columns are always
    /// members, declared separately or not.
    pub(crate) integers: Vec<usize>,
}

struct RowBounds {
    row: usize,
    lower: f64,
    upper: f64,
}

/// Lowers a model into tableau form.
///
/// Each constraint key claims one row per finite bound: the upper-bound row
/// carries the coefficients as given, the lower-bound row (directly below)
/// carries them negated so that `-total <= -lower` expresses `total >=
/// lower`. Binary variables claim one trailing `x <= 1` row each. A key
/// whose merged lower bound exceeds its upper is lowered as-is; phase 1
/// discovers the contradiction and reports the solve infeasible.
pub(crate) fn compile(model: &Model) -> CompiledModel {
    let variables: Vec<String> = model.variables.keys().cloned().collect();

    let mut binary_columns = Vec::new();
    let mut integers = Vec::new();
    for (i, name) in model.variables.keys().enumerate() {
        let column = i + 1;
        if model.binaries.contains(name) {
            binary_columns.push(column);
            integers.push(column);
        } else if model.integers.contains(name) {
            integers.push(column);
        }
    }

    let mut bounds: IndexMap<&str, RowBounds> = IndexMap::with_capacity(model.constraints.len());
    let mut structural_rows = 1; // row 0 is the objective
    for (key, constraint) in &model.constraints {
        let (lower, upper) = (constraint.lower(), constraint.upper());
        let row = structural_rows;
        structural_rows += usize::from(upper.is_finite()) + usize::from(lower.is_finite());
        bounds.insert(key.as_str(), RowBounds { row, lower, upper });
    }

    let width = variables.len() + 1;
    let height = structural_rows + binary_columns.len();
    let positions = width + height;
    let mut tableau = Tableau {
        matrix: vec![0.0; width * height],
        width,
        height,
        position_of_variable: (0..positions).collect(),
        variable_at_position: (0..positions).collect(),
    };

    for (i, coefficients) in model.variables.values().enumerate() {
        let column = i + 1;
        for (key, &coef) in coefficients {
            if *key == model.objective {
                tableau.set(0, column, model.direction.normalize(coef));
            }
            if let Some(b) = bounds.get(key.as_str()) {
                if b.upper.is_finite() {
                    tableau.set(b.row, column, coef);
                    if b.lower.is_finite() {
                        tableau.set(b.row + 1, column, -coef);
                    }
                } else if b.lower.is_finite() {
                    tableau.set(b.row, column, -coef);
                }
            }
        }
    }

    for b in bounds.values() {
        if b.upper.is_finite() {
            tableau.set(b.row, 0, b.upper);
            if b.lower.is_finite() {
                tableau.set(b.row + 1, 0, -b.lower);
            }
        } else if b.lower.is_finite() {
            tableau.set(b.row, 0, -b.lower);
        }
    }

    for (i, &column) in binary_columns.iter().enumerate() {
        let row = structural_rows + i;
        tableau.set(row, 0, 1.0);
        tableau.set(row, column, 1.0);
    }

    debug!(
        "compiled {} variables into a {}x{} tableau, {} integer columns",
        variables.len(),
        height,
        width,
        integers.len()
    );

    CompiledModel {
        tableau,
        direction: model.direction,
        variables,
        integers,
    }
}
