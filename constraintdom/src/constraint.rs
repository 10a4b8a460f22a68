use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomError;

/// A native constraint an input can violate.
///
/// The string forms are the `ValidityState` property names (`"tooShort"`,
/// `"valueMissing"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Constraint {
    ValueMissing,
    TypeMismatch,
    PatternMismatch,
    TooLong,
    TooShort,
    RangeUnderflow,
    RangeOverflow,
    StepMismatch,
    BadInput,
    CustomError,
}

impl Constraint {
    /// All constraints, in the order browsers report them.
    pub const ALL: [Constraint; 10] = [
        Constraint::ValueMissing,
        Constraint::TypeMismatch,
        Constraint::PatternMismatch,
        Constraint::TooLong,
        Constraint::TooShort,
        Constraint::RangeUnderflow,
        Constraint::RangeOverflow,
        Constraint::StepMismatch,
        Constraint::BadInput,
        Constraint::CustomError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValueMissing => "valueMissing",
            Self::TypeMismatch => "typeMismatch",
            Self::PatternMismatch => "patternMismatch",
            Self::TooLong => "tooLong",
            Self::TooShort => "tooShort",
            Self::RangeUnderflow => "rangeUnderflow",
            Self::RangeOverflow => "rangeOverflow",
            Self::StepMismatch => "stepMismatch",
            Self::BadInput => "badInput",
            Self::CustomError => "customError",
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Constraint {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Constraint::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| DomError::UnknownConstraint(s.to_string()))
    }
}
