//! Form error types

use constraintdom::DomError;

use super::EmitterError;

/// Errors raised by the form controller and the feedback tree.
///
/// These are configuration errors: the declarative tree or the mounted inputs
/// do not fit together. A superseded validation run is not an error.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// A `when` string that is not a constraint name, `"*"` or `"valid"`.
    #[error("Unknown when value '{0}'")]
    UnknownWhen(String),

    /// A stop policy string that is not recognized.
    #[error("Unknown stop value '{0}'")]
    UnknownStop(String),

    /// The field has feedbacks but no input is mounted for it.
    #[error("Could not find input named '{0}'")]
    NoInput(String),

    /// Two inputs were mounted under the same name.
    #[error("Multiple inputs named '{0}'")]
    DuplicateInput(String),

    /// No feedbacks are mounted for the field.
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    /// A nested group declares a different field than its parent.
    #[error("Nested feedbacks for '{nested}' inside feedbacks for '{parent}'")]
    FieldMismatch { parent: String, nested: String },

    /// The feedback tree was built without a field name.
    #[error("Feedbacks are missing a field name")]
    MissingField,

    /// The handle does not refer to a mounted feedback tree.
    #[error("Feedbacks {0} are not mounted")]
    NotMounted(u64),

    #[error(transparent)]
    Emitter(#[from] EmitterError),

    #[error(transparent)]
    Dom(#[from] DomError),
}
