use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;
use crate::error::DomError;
use crate::validity::ValidityState;

/// The `type` attribute of an input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    Text,
    Password,
    Search,
    Tel,
    Email,
    Url,
    Number,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Password => "password",
            Self::Search => "search",
            Self::Tel => "tel",
            Self::Email => "email",
            Self::Url => "url",
            Self::Number => "number",
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, Self::Number)
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputType {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "text" => Self::Text,
            "password" => Self::Password,
            "search" => Self::Search,
            "tel" => Self::Tel,
            "email" => Self::Email,
            "url" => Self::Url,
            "number" => Self::Number,
            // Browsers fall back to a text input for unknown types.
            _ => Self::Text,
        })
    }
}

/// `step` attribute of a numeric input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Value(f64),
    Any,
}

/// Constraint attributes and current state of one input.
#[derive(Debug, Clone, Default)]
pub struct InputData {
    pub kind: InputType,
    pub value: String,
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<Step>,
    /// Message set through `set_custom_validity`; empty means none.
    pub custom_validity: String,
}

impl InputData {
    /// Length in UTF-16 code units, as `minlength`/`maxlength` count it.
    fn length(&self) -> usize {
        self.value.encode_utf16().count()
    }

    fn number(&self) -> Option<f64> {
        if !self.kind.is_numeric() || self.value.is_empty() {
            return None;
        }
        self.value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
    }

    fn step_mismatch(&self, number: f64) -> bool {
        let step = match self.step {
            Some(Step::Any) => return false,
            Some(Step::Value(step)) if step > 0.0 => step,
            _ => 1.0,
        };
        let base = self.min.unwrap_or(0.0);
        let quotient = (number - base) / step;
        (quotient - quotient.round()).abs() > 1e-9
    }

    fn validity(&self) -> ValidityState {
        let mut state = ValidityState::new();
        let empty = self.value.is_empty();

        state.value_missing = self.required && empty;
        state.custom_error = !self.custom_validity.is_empty();

        if empty {
            return state;
        }

        let length = self.length();
        state.too_short = self.min_length.is_some_and(|min| length < min);
        state.too_long = self.max_length.is_some_and(|max| length > max);
        state.pattern_mismatch = self
            .pattern
            .as_ref()
            .is_some_and(|re| !re.is_match(&self.value));

        match self.kind {
            InputType::Email => {
                state.type_mismatch = !email_address::EmailAddress::is_valid(&self.value);
            }
            InputType::Url => {
                state.type_mismatch = url::Url::parse(&self.value).is_err();
            }
            InputType::Number => match self.number() {
                Some(number) => {
                    state.range_underflow = self.min.is_some_and(|min| number < min);
                    state.range_overflow = self.max.is_some_and(|max| number > max);
                    state.step_mismatch = self.step_mismatch(number);
                }
                None => state.bad_input = true,
            },
            _ => {}
        }

        state
    }

    fn message_for(&self, constraint: Constraint) -> String {
        match constraint {
            Constraint::ValueMissing => "Please fill out this field.".to_string(),
            Constraint::TypeMismatch => match self.kind {
                InputType::Url => "Please enter a URL.".to_string(),
                _ => "Please enter an email address.".to_string(),
            },
            Constraint::PatternMismatch => "Please match the requested format.".to_string(),
            Constraint::TooLong => format!(
                "Please shorten this text to {} characters or less (you are currently using {} characters).",
                self.max_length.unwrap_or_default(),
                self.length()
            ),
            Constraint::TooShort => format!(
                "Please lengthen this text to {} characters or more (you are currently using {} characters).",
                self.min_length.unwrap_or_default(),
                self.length()
            ),
            Constraint::RangeUnderflow => format!(
                "Value must be greater than or equal to {}.",
                self.min.unwrap_or_default()
            ),
            Constraint::RangeOverflow => format!(
                "Value must be less than or equal to {}.",
                self.max.unwrap_or_default()
            ),
            Constraint::StepMismatch => "Please enter a valid value.".to_string(),
            Constraint::BadInput => "Please enter a number.".to_string(),
            Constraint::CustomError => self.custom_validity.clone(),
        }
    }

    fn validation_message(&self) -> String {
        let validity = self.validity();
        if validity.custom_error {
            return self.custom_validity.clone();
        }
        validity
            .violations()
            .next()
            .map(|c| self.message_for(c))
            .unwrap_or_default()
    }
}

/// A native input element with constraint validation.
///
/// Cheap to clone: clones share the same underlying data, so the UI can keep
/// one handle to type into while the form holds another.
///
/// # Example
///
/// ```ignore
/// let password = InputElement::new("password")
///     .kind(InputType::Password)
///     .required(true)
///     .pattern(".{5,}")?;
///
/// password.set_value("123");
/// assert!(password.validity().pattern_mismatch);
/// ```
#[derive(Debug, Clone)]
pub struct InputElement {
    name: Arc<str>,
    inner: Arc<RwLock<InputData>>,
}

impl InputElement {
    pub fn new(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self {
            name: Arc::from(name),
            inner: Arc::new(RwLock::new(InputData::default())),
        }
    }

    pub fn kind(self, kind: InputType) -> Self {
        self.update(|d| d.kind = kind);
        self
    }

    pub fn value(self, value: impl Into<String>) -> Self {
        self.set_value(value);
        self
    }

    pub fn required(self, required: bool) -> Self {
        self.update(|d| d.required = required);
        self
    }

    pub fn min_length(self, min: usize) -> Self {
        self.update(|d| d.min_length = Some(min));
        self
    }

    pub fn max_length(self, max: usize) -> Self {
        self.update(|d| d.max_length = Some(max));
        self
    }

    /// Set the `pattern` attribute. The whole value must match.
    pub fn pattern(self, pattern: &str) -> Result<Self, DomError> {
        let re = compile_pattern(pattern)?;
        self.update(|d| d.pattern = Some(re));
        Ok(self)
    }

    pub fn min(self, min: f64) -> Self {
        self.update(|d| d.min = Some(min));
        self
    }

    pub fn max(self, max: f64) -> Self {
        self.update(|d| d.max = Some(max));
        self
    }

    pub fn step(self, step: Step) -> Self {
        self.update(|d| d.step = Some(step));
        self
    }

    /// Set a constraint attribute from its markup form, like `setAttribute`.
    ///
    /// Unknown attributes are ignored.
    pub fn attribute(self, name: &str, value: &str) -> Result<Self, DomError> {
        match name {
            "type" => {
                let kind = value.parse()?;
                Ok(self.kind(kind))
            }
            "required" => Ok(self.required(true)),
            "minlength" => Ok(self.min_length(parse_length("minlength", value)?)),
            "maxlength" => Ok(self.max_length(parse_length("maxlength", value)?)),
            "pattern" => self.pattern(value),
            "min" => Ok(self.min(parse_number("min", value)?)),
            "max" => Ok(self.max(parse_number("max", value)?)),
            "step" if value.eq_ignore_ascii_case("any") => Ok(self.step(Step::Any)),
            "step" => Ok(self.step(Step::Value(parse_number("step", value)?))),
            other => {
                log::debug!("InputElement '{}': ignoring attribute '{}'", self.name, other);
                Ok(self)
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a clone of the current value.
    pub fn get_value(&self) -> String {
        self.read(|d| d.value.clone())
    }

    pub fn set_value(&self, value: impl Into<String>) {
        let value = value.into();
        self.update(|d| d.value = value);
    }

    /// Mark the input invalid with a custom message; an empty message clears it.
    pub fn set_custom_validity(&self, message: impl Into<String>) {
        let message = message.into();
        self.update(|d| d.custom_validity = message);
    }

    pub fn validity(&self) -> ValidityState {
        self.read(|d| d.validity())
    }

    /// The message a browser would show for the first failing constraint.
    pub fn validation_message(&self) -> String {
        self.read(|d| d.validation_message())
    }

    pub fn check_validity(&self) -> bool {
        self.validity().valid()
    }

    /// Snapshot of the attributes and state.
    pub fn data(&self) -> InputData {
        self.read(|d| d.clone())
    }

    fn read<R>(&self, f: impl FnOnce(&InputData) -> R) -> R {
        match self.inner.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    fn update(&self, f: impl FnOnce(&mut InputData)) {
        let mut guard = self.inner.write().unwrap_or_else(|p| p.into_inner());
        f(&mut guard);
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, DomError> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|source| DomError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn parse_length(attribute: &'static str, value: &str) -> Result<usize, DomError> {
    value.trim().parse().map_err(|_| DomError::InvalidNumber {
        attribute,
        value: value.to_string(),
    })
}

fn parse_number(attribute: &'static str, value: &str) -> Result<f64, DomError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| DomError::InvalidNumber {
            attribute,
            value: value.to_string(),
        })
}
