//! Declarative feedback trees.
//!
//! A [`FieldFeedbacks`] describes, for one field, which feedbacks to show and
//! when. It is a plain value until it is mounted on a form, which assigns
//! every node a [`FeedbackKey`](crate::field::FeedbackKey).
//!
//! # Example
//!
//! ```ignore
//! let password = FieldFeedbacks::new("password")
//!     .feedback(Feedback::when("valueMissing")?)
//!     .feedback(Feedback::when("patternMismatch")?.message("Should be at least 5 characters long"))
//!     .feedback(Feedback::predicate(|v| !v.chars().any(|c| c.is_ascii_digit()))
//!         .warning()
//!         .message("Should contain numbers"))
//!     .feedback(Feedback::valid().message("Looks good!"));
//! ```

mod mount;

pub use mount::{KeyAllocator, MountedFeedback, MountedFeedbacks, MountedGroup, MountedNode};

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use constraintdom::Constraint;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::FormError;
use crate::field::Severity;

/// Synchronous check of the current value.
pub type SyncPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Asynchronous check of the current value.
pub type AsyncPredicate = Arc<dyn Fn(String) -> BoxFuture<'static, bool> + Send + Sync>;

/// Condition under which a feedback is shown.
#[derive(Clone)]
pub enum When {
    /// A native constraint flag is set.
    Native(Constraint),
    /// Any native constraint is violated (`"*"`).
    Wildcard,
    /// Nothing else in the same group is shown (`"valid"`).
    Valid,
    Predicate(SyncPredicate),
    AsyncPredicate(AsyncPredicate),
}

impl When {
    pub fn is_async(&self) -> bool {
        matches!(self, Self::AsyncPredicate(_))
    }
}

impl fmt::Debug for When {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(c) => write!(f, "Native({c})"),
            Self::Wildcard => f.write_str("Wildcard"),
            Self::Valid => f.write_str("Valid"),
            Self::Predicate(_) => f.write_str("Predicate"),
            Self::AsyncPredicate(_) => f.write_str("AsyncPredicate"),
        }
    }
}

impl FromStr for When {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "*" => Ok(Self::Wildcard),
            "valid" => Ok(Self::Valid),
            _ => s
                .parse::<Constraint>()
                .map(Self::Native)
                .map_err(|_| FormError::UnknownWhen(s.to_string())),
        }
    }
}

/// When evaluation of a group stops.
///
/// A later sibling is skipped once the group shows a feedback of the
/// severity the policy names (`First`: any of error, warning, info).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stop {
    First,
    #[default]
    FirstError,
    FirstWarning,
    FirstInfo,
    /// Never stop; every matching feedback is shown.
    #[serde(alias = "all")]
    No,
}

impl FromStr for Stop {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(Self::First),
            "first-error" => Ok(Self::FirstError),
            "first-warning" => Ok(Self::FirstWarning),
            "first-info" => Ok(Self::FirstInfo),
            "no" | "all" => Ok(Self::No),
            other => Err(FormError::UnknownStop(other.to_string())),
        }
    }
}

/// One rule: a condition, a severity and what to display.
#[derive(Debug, Clone)]
pub struct Feedback {
    pub(crate) when: When,
    pub(crate) severity: Severity,
    pub(crate) message: Option<String>,
}

impl Feedback {
    pub fn new(when: When) -> Self {
        let severity = match when {
            When::Valid => Severity::WhenValid,
            _ => Severity::Error,
        };
        Self {
            when,
            severity,
            message: None,
        }
    }

    /// Parse a `when` string: a constraint name, `"*"` or `"valid"`.
    pub fn when(when: &str) -> Result<Self, FormError> {
        when.parse().map(Self::new)
    }

    pub fn native(constraint: Constraint) -> Self {
        Self::new(When::Native(constraint))
    }

    /// Shown when any native constraint fails.
    pub fn any() -> Self {
        Self::new(When::Wildcard)
    }

    /// Shown when nothing else in the group is.
    pub fn valid() -> Self {
        Self::new(When::Valid)
    }

    /// Shown when `f` returns true for the current value.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::new(When::Predicate(Arc::new(f)))
    }

    /// Shown when the future returned by `f` resolves to true.
    pub fn async_predicate<F, Fut>(f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Self::new(When::AsyncPredicate(Arc::new(move |value| f(value).boxed())))
    }

    pub fn error(self) -> Self {
        self.with_severity(Severity::Error)
    }

    pub fn warning(self) -> Self {
        self.with_severity(Severity::Warning)
    }

    pub fn info(self) -> Self {
        self.with_severity(Severity::Info)
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    // `valid` feedbacks always keep their own severity.
    fn with_severity(mut self, severity: Severity) -> Self {
        if !matches!(self.when, When::Valid) {
            self.severity = severity;
        }
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) enum FeedbackChild {
    Feedback(Feedback),
    Group(FieldFeedbacks),
}

/// An ordered group of feedbacks for one field.
///
/// Groups nest; a nested group is its own stop scope and inherits the
/// field name of its parent.
#[derive(Debug, Clone, Default)]
pub struct FieldFeedbacks {
    pub(crate) field: Option<String>,
    pub(crate) stop: Option<Stop>,
    pub(crate) children: Vec<FeedbackChild>,
}

impl FieldFeedbacks {
    /// Feedbacks for the input named `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            ..Default::default()
        }
    }

    /// A group meant to be nested, taking its field from the parent.
    pub fn nested() -> Self {
        Self::default()
    }

    pub fn stop(mut self, stop: Stop) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn feedback(mut self, feedback: Feedback) -> Self {
        self.children.push(FeedbackChild::Feedback(feedback));
        self
    }

    pub fn group(mut self, group: FieldFeedbacks) -> Self {
        self.children.push(FeedbackChild::Group(group));
        self
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}
