//! Error types

/// Errors raised while configuring native inputs.
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    /// A `pattern` attribute that is not a valid regular expression.
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Not one of the `ValidityState` property names.
    #[error("Unknown constraint: {0}")]
    UnknownConstraint(String),

    /// A numeric attribute (`min`, `max`, `step`) that is not a finite number.
    #[error("Invalid {attribute} attribute: {value}")]
    InvalidNumber { attribute: &'static str, value: String },
}
