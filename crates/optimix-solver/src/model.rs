use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

/// Whether the objective should be driven down or up.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Minimize,
    #[default]
    Maximize,
}

impl Direction {
    /// Sign multiplier folded into the tableau's objective row so the
    /// engine always works in a single internal sense.
    pub(crate) fn sign(self) -> f64 {
        match self {
            Direction::Minimize => -1.0,
            Direction::Maximize => 1.0,
        }
    }

    /// Scales a model-sense objective value into the engine's internal sense.
    pub(crate) fn normalize(self, value: f64) -> f64 {
        self.sign() * value
    }

    /// Undoes `normalize`. Since the sign is its own inverse,
    /// `denormalize(normalize(v)) == v` for both directions.
    pub(crate) fn denormalize(self, value: f64) -> f64 {
        self.sign() * value
    }
}

/// Bounds on one constraint key. `equal` pins both sides to the same value
/// and takes precedence over `min`/`max`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Constraint {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub equal: Option<f64>,
}

impl Constraint {
    /// Constrains the total to be at most `value`.
    pub fn less_eq(value: f64) -> Self {
        Self {
            max: Some(value),
            ..Self::default()
        }
    }

    /// Constrains the total to be at least `value`.
    pub fn greater_eq(value: f64) -> Self {
        Self {
            min: Some(value),
            ..Self::default()
        }
    }

    /// Constrains the total to be exactly `value`.
    pub fn equal_to(value: f64) -> Self {
        Self {
            equal: Some(value),
            ..Self::default()
        }
    }

    /// Constrains the total to lie between `lower` and `upper`, inclusive.
    pub fn in_range(lower: f64, upper: f64) -> Self {
        Self {
            min: Some(lower),
            max: Some(upper),
            equal: None,
        }
    }

    pub(crate) fn lower(&self) -> f64 {
        self.equal.or(self.min).unwrap_or(f64::NEG_INFINITY)
    }

    pub(crate) fn upper(&self) -> f64 {
        self.equal.or(self.max).unwrap_or(f64::INFINITY)
    }

    /// Tightens these bounds with another set: max of lowers, min of uppers.
    pub(crate) fn merge(self, other: Constraint) -> Constraint {
        let lower = self.lower().max(other.lower());
        let upper = self.upper().min(other.upper());
        Constraint {
            min: lower.is_finite().then_some(lower),
            max: upper.is_finite().then_some(upper),
            equal: None,
        }
    }
}

/// Selects which variables carry an integrality restriction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Group {
    /// Every variable in the model.
    All,
    /// The named variables only.
    Named(IndexSet<String>),
}

impl Group {
    pub fn contains(&self, name: &str) -> bool {
        match self {
            Group::All => true,
            Group::Named(names) => names.contains(name),
        }
    }
}

impl Default for Group {
    fn default() -> Self {
        Group::Named(IndexSet::new())
    }
}

impl FromIterator<String> for Group {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Group::Named(iter.into_iter().collect())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Group {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Group::All => serializer.serialize_bool(true),
            Group::Named(names) => names.serialize(serializer),
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Group {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(bool),
            Named(IndexSet<String>),
        }
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Flag(true) => Group::All,
            Repr::Flag(false) => Group::default(),
            Repr::Named(names) => Group::Named(names),
        })
    }
}

/// A complete optimization model.
///
/// Each variable maps constraint keys (including the objective key) to its
/// coefficient under that key; each constraint names a key and bounds the
/// weighted total over all variables. Insertion order of the maps is
/// significant: it fixes the column and row layout of the tableau, so two
/// models built in the same order solve identically.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Model {
    pub direction: Direction,
    /// The key whose coefficients form the objective.
    pub objective: String,
    pub variables: IndexMap<String, IndexMap<String, f64>>,
    pub constraints: IndexMap<String, Constraint>,
    /// Variables restricted to integer values.
    pub integers: Group,
    /// Variables restricted to 0 or 1. Implies membership in `integers`.
    pub binaries: Group,
}

/// A structural mistake in a model, reported by [`Model::validate`].
///
/// Validation is opt-in: `solve` accepts any model and lets an over-tight
/// constraint surface as an infeasible solve instead.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Unknown variable in integers: {0}")]
    UnknownInteger(String),
    #[error("Unknown variable in binaries: {0}")]
    UnknownBinary(String),
    #[error("Constraint {name} admits no value: lower bound {lower} exceeds upper bound {upper}")]
    EmptyBounds {
        name: String,
        lower: f64,
        upper: f64,
    },
}

impl Model {
    pub fn new(direction: Direction, objective: impl Into<String>) -> Self {
        Self {
            direction,
            objective: objective.into(),
            ..Self::default()
        }
    }

    /// Adds a variable with its coefficient under each constraint key.
    /// Re-adding a name replaces its coefficients.
    pub fn add_variable<I, K>(&mut self, name: impl Into<String>, coefficients: I)
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let coefficients = coefficients
            .into_iter()
            .map(|(key, coef)| (key.into(), coef))
            .collect();
        self.variables.insert(name.into(), coefficients);
    }

    /// Adds bounds for a constraint key. Bounds added under an existing key
    /// are merged by tightening: the greatest lower and least upper survive.
    pub fn add_constraint(&mut self, name: impl Into<String>, constraint: Constraint) {
        let name = name.into();
        match self.constraints.get_mut(&name) {
            Some(existing) => *existing = existing.merge(constraint),
            None => {
                self.constraints.insert(name, constraint);
            }
        }
    }

    /// Restricts a variable to integer values.
    pub fn mark_integer(&mut self, name: impl Into<String>) {
        if let Group::Named(names) = &mut self.integers {
            names.insert(name.into());
        }
    }

    /// Restricts a variable to 0 or 1.
    pub fn mark_binary(&mut self, name: impl Into<String>) {
        if let Group::Named(names) = &mut self.binaries {
            names.insert(name.into());
        }
    }

    /// Checks for mistakes that `solve` itself tolerates: integrality marks
    /// on unknown variables and constraints whose merged bounds admit no
    /// value at all.
    pub fn validate(&self) -> Result<(), ModelError> {
        if let Group::Named(names) = &self.integers {
            for name in names {
                if !self.variables.contains_key(name) {
                    return Err(ModelError::UnknownInteger(name.clone()));
                }
            }
        }
        if let Group::Named(names) = &self.binaries {
            for name in names {
                if !self.variables.contains_key(name) {
                    return Err(ModelError::UnknownBinary(name.clone()));
                }
            }
        }
        for (name, constraint) in &self.constraints {
            if constraint.lower() > constraint.upper() {
                return Err(ModelError::EmptyBounds {
                    name: name.clone(),
                    lower: constraint.lower(),
                    upper: constraint.upper(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_helpers() {
        assert_eq!(Constraint::less_eq(4.0).upper(), 4.0);
        assert_eq!(Constraint::less_eq(4.0).lower(), f64::NEG_INFINITY);
        assert_eq!(Constraint::greater_eq(2.0).lower(), 2.0);
        assert_eq!(Constraint::equal_to(3.0).lower(), 3.0);
        assert_eq!(Constraint::equal_to(3.0).upper(), 3.0);
        assert_eq!(Constraint::in_range(1.0, 5.0).lower(), 1.0);
        assert_eq!(Constraint::in_range(1.0, 5.0).upper(), 5.0);
    }

    #[test]
    fn test_equal_wins_over_min_max() {
        let c = Constraint {
            min: Some(1.0),
            max: Some(5.0),
            equal: Some(3.0),
        };
        assert_eq!(c.lower(), 3.0);
        assert_eq!(c.upper(), 3.0);
    }

    #[test]
    fn test_constraint_merge_tightens() {
        let merged = Constraint::greater_eq(1.0).merge(Constraint::less_eq(4.0));
        assert_eq!(merged.lower(), 1.0);
        assert_eq!(merged.upper(), 4.0);

        let tighter = merged.merge(Constraint::greater_eq(2.0));
        assert_eq!(tighter.lower(), 2.0);
        assert_eq!(tighter.upper(), 4.0);
    }

    #[test]
    fn test_add_constraint_merges_same_key() {
        let mut model = Model::new(Direction::Maximize, "profit");
        model.add_constraint("amount", Constraint::less_eq(10.0));
        model.add_constraint("amount", Constraint::greater_eq(2.0));
        model.add_constraint("amount", Constraint::less_eq(8.0));
        let bounds = model.constraints["amount"];
        assert_eq!(bounds.lower(), 2.0);
        assert_eq!(bounds.upper(), 8.0);
        assert_eq!(model.constraints.len(), 1);
    }

    #[test]
    fn test_normalize_round_trips() {
        for direction in [Direction::Minimize, Direction::Maximize] {
            for value in [0.0, 1.5, -3.25, 1e9] {
                assert_eq!(direction.denormalize(direction.normalize(value)), value);
            }
        }
    }

    #[test]
    fn test_group_membership() {
        assert!(Group::All.contains("anything"));
        let named: Group = ["x".to_string(), "y".to_string()].into_iter().collect();
        assert!(named.contains("x"));
        assert!(!named.contains("z"));
        assert!(!Group::default().contains("x"));
    }

    #[test]
    fn test_validate_reports_empty_bounds() {
        let mut model = Model::new(Direction::Maximize, "value");
        model.add_variable("x", [("value", 1.0), ("amount", 1.0)]);
        model.add_constraint("amount", Constraint::in_range(5.0, 1.0));
        match model.validate() {
            Err(ModelError::EmptyBounds { name, lower, upper }) => {
                assert_eq!(name, "amount");
                assert_eq!(lower, 5.0);
                assert_eq!(upper, 1.0);
            }
            other => panic!("Expected EmptyBounds, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_validate_reports_unknown_integrality_marks() {
        let mut model = Model::new(Direction::Maximize, "value");
        model.add_variable("x", [("value", 1.0)]);
        model.mark_integer("y");
        assert!(matches!(
            model.validate(),
            Err(ModelError::UnknownInteger(name)) if name == "y"
        ));

        let mut model = Model::new(Direction::Maximize, "value");
        model.add_variable("x", [("value", 1.0)]);
        model.mark_binary("z");
        assert!(matches!(
            model.validate(),
            Err(ModelError::UnknownBinary(name)) if name == "z"
        ));
    }
}
