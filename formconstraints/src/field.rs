use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a mounted feedback node.
///
/// Keys are handed out in depth-first declaration order from a counter that
/// only grows, so ordering by key is declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeedbackKey(pub u64);

impl fmt::Display for FeedbackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a shown feedback is classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Info,
    WhenValid,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::WhenValid => "whenValid",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation state of one named input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    /// Validated at least once since creation or last reset.
    pub dirty: bool,
    pub errors: BTreeSet<FeedbackKey>,
    pub warnings: BTreeSet<FeedbackKey>,
    pub infos: BTreeSet<FeedbackKey>,
    /// Shown `when = valid` feedbacks.
    pub valids: BTreeSet<FeedbackKey>,
    /// Native validation message at the last evaluation.
    pub validation_message: String,
    /// An async check of the latest run has not settled yet.
    pub pending: bool,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn has_infos(&self) -> bool {
        !self.infos.is_empty()
    }

    /// Any error, warning or info is shown.
    pub fn has_feedbacks(&self) -> bool {
        self.has_errors() || self.has_warnings() || self.has_infos()
    }

    /// No error is shown. Holds for a field that was never validated.
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn keys(&self, severity: Severity) -> &BTreeSet<FeedbackKey> {
        match severity {
            Severity::Error => &self.errors,
            Severity::Warning => &self.warnings,
            Severity::Info => &self.infos,
            Severity::WhenValid => &self.valids,
        }
    }

    /// Back to the state of a freshly added field.
    pub fn clear(&mut self) {
        *self = Self::new(std::mem::take(&mut self.name));
    }

    pub(crate) fn apply(&mut self, patch: FieldPatch) {
        if let Some(dirty) = patch.dirty {
            self.dirty = dirty;
        }
        if let Some(errors) = patch.errors {
            self.errors = errors;
        }
        if let Some(warnings) = patch.warnings {
            self.warnings = warnings;
        }
        if let Some(infos) = patch.infos {
            self.infos = infos;
        }
        if let Some(valids) = patch.valids {
            self.valids = valids;
        }
        if let Some(message) = patch.validation_message {
            self.validation_message = message;
        }
        if let Some(pending) = patch.pending {
            self.pending = pending;
        }
    }
}

/// Partial update of a [`Field`]; `None` leaves the value untouched.
#[derive(Debug, Clone, Default)]
pub struct FieldPatch {
    pub dirty: Option<bool>,
    pub errors: Option<BTreeSet<FeedbackKey>>,
    pub warnings: Option<BTreeSet<FeedbackKey>>,
    pub infos: Option<BTreeSet<FeedbackKey>>,
    pub valids: Option<BTreeSet<FeedbackKey>>,
    pub validation_message: Option<String>,
    pub pending: Option<bool>,
}

/// Snapshot of every tracked field, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Fields(pub BTreeMap<String, Field>);

impl Fields {
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.0.values()
    }
}

fn write_keys(f: &mut fmt::Formatter<'_>, label: &str, keys: &BTreeSet<FeedbackKey>) -> fmt::Result {
    let keys: Vec<String> = keys.iter().map(ToString::to_string).collect();
    write!(f, " {}=[{}]", label, keys.join(","))
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: dirty={}", self.name, self.dirty)?;
        write_keys(f, "errors", &self.errors)?;
        write_keys(f, "warnings", &self.warnings)?;
        write_keys(f, "infos", &self.infos)?;
        write_keys(f, "valids", &self.valids)?;
        if self.pending {
            write!(f, " pending")?;
        }
        if !self.validation_message.is_empty() {
            write!(f, " message={:?}", self.validation_message)?;
        }
        Ok(())
    }
}

/// One line per field, for diagnostic output.
impl fmt::Display for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in self.iter() {
            writeln!(f, "{field}")?;
        }
        Ok(())
    }
}
