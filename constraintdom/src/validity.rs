use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;

/// Native constraint-validation flags of an input.
///
/// Mirrors the DOM `ValidityState`: one flag per constraint, `valid()` is true
/// when none is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityState {
    pub value_missing: bool,
    pub type_mismatch: bool,
    pub pattern_mismatch: bool,
    pub too_long: bool,
    pub too_short: bool,
    pub range_underflow: bool,
    pub range_overflow: bool,
    pub step_mismatch: bool,
    pub bad_input: bool,
    pub custom_error: bool,
}

impl ValidityState {
    /// A state with no violation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state with the given constraints violated.
    pub fn with(constraints: impl IntoIterator<Item = Constraint>) -> Self {
        let mut state = Self::default();
        for constraint in constraints {
            state.set(constraint, true);
        }
        state
    }

    pub fn get(&self, constraint: Constraint) -> bool {
        match constraint {
            Constraint::ValueMissing => self.value_missing,
            Constraint::TypeMismatch => self.type_mismatch,
            Constraint::PatternMismatch => self.pattern_mismatch,
            Constraint::TooLong => self.too_long,
            Constraint::TooShort => self.too_short,
            Constraint::RangeUnderflow => self.range_underflow,
            Constraint::RangeOverflow => self.range_overflow,
            Constraint::StepMismatch => self.step_mismatch,
            Constraint::BadInput => self.bad_input,
            Constraint::CustomError => self.custom_error,
        }
    }

    pub fn set(&mut self, constraint: Constraint, value: bool) {
        let flag = match constraint {
            Constraint::ValueMissing => &mut self.value_missing,
            Constraint::TypeMismatch => &mut self.type_mismatch,
            Constraint::PatternMismatch => &mut self.pattern_mismatch,
            Constraint::TooLong => &mut self.too_long,
            Constraint::TooShort => &mut self.too_short,
            Constraint::RangeUnderflow => &mut self.range_underflow,
            Constraint::RangeOverflow => &mut self.range_overflow,
            Constraint::StepMismatch => &mut self.step_mismatch,
            Constraint::BadInput => &mut self.bad_input,
            Constraint::CustomError => &mut self.custom_error,
        };
        *flag = value;
    }

    /// True when no constraint is violated.
    pub fn valid(&self) -> bool {
        self.violations().next().is_none()
    }

    /// Violated constraints, in reporting order.
    pub fn violations(&self) -> impl Iterator<Item = Constraint> + '_ {
        Constraint::ALL.into_iter().filter(|c| self.get(*c))
    }
}
