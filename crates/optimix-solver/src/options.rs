/// Knobs controlling the simplex engine and the integer search.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Options {
    /// Threshold below which a value is treated as zero in pivot selection
    /// and integrality checks.
    pub precision: f64,
    /// Track pivot history and abort when a repeating sequence is detected.
    /// Costs time on every pivot; off by default.
    pub check_cycles: bool,
    /// Pivot budget for each simplex phase.
    pub max_pivots: usize,
    /// Relative gap at which the integer search accepts its incumbent early.
    /// Zero demands a proven optimum. Distinct from `precision`.
    pub tolerance: f64,
    /// Wall-clock budget in milliseconds for the integer search, checked
    /// between iterations.
    pub timeout: f64,
    /// Iteration budget for the integer search.
    pub max_iterations: usize,
    /// Also report variables whose value is zero.
    pub include_zero_variables: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            precision: 1e-8,
            check_cycles: false,
            max_pivots: 8192,
            tolerance: 0.0,
            timeout: f64::INFINITY,
            max_iterations: 32768,
            include_zero_variables: false,
        }
    }
}
