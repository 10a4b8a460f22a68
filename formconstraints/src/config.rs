use serde::{Deserialize, Serialize};

use crate::feedback::Stop;

/// Form-wide settings.
///
/// Every field is optional when deserializing; missing ones take their
/// default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormConfig {
    /// Name used in log messages.
    pub name: Option<String>,
    /// Stop policy of feedback groups that do not set one.
    pub default_stop: Stop,
}

impl FormConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn default_stop(mut self, stop: Stop) -> Self {
        self.default_stop = stop;
        self
    }
}
