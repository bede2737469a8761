//! Fixed-state classification.

/// The set of state names counted as resolved.
///
/// Parsed from a comma-separated value with no trimming: matching is exact,
/// case- and whitespace-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedStates {
    states: Vec<String>,
}

impl FixedStates {
    /// Parses a comma-separated state list. An empty value yields an empty set.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.is_empty() {
            return Self::default();
        }
        Self { states: value.split(',').map(str::to_string).collect() }
    }

    /// Returns `true` if `state` is one of the configured names.
    #[must_use]
    pub fn contains(&self, state: &str) -> bool {
        self.states.iter().any(|s| s == state)
    }
}

/// Returns `true` if the issue's current state is a fixed state.
///
/// Used for report annotations only; it never gates a tracker call.
#[must_use]
pub fn is_fixed(issue: &crate::model::Issue, fixed_states: &FixedStates) -> bool {
    fixed_states.contains(&issue.state)
}
