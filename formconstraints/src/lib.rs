//! Form validation driven by declarative feedback trees.
//!
//! Inputs report native constraint state ([`ConstraintInput`]); feedback
//! trees ([`FieldFeedbacks`]) say which messages to show for which state;
//! [`FormWithConstraints`] evaluates the trees, tracks each field's results
//! in a [`FieldsStore`](store::FieldsStore) and emits events so a UI can
//! re-render.

pub mod config;
pub mod emitter;
pub mod error;
pub mod events;
pub mod feedback;
pub mod field;
pub mod form;
pub mod input;
pub mod resolver;
pub mod store;

pub use config::FormConfig;
pub use error::{EmitterError, FormError};
pub use events::{FormEvent, FormEventKind, FormListener};
pub use feedback::{Feedback, FieldFeedbacks, Stop, When};
pub use field::{FeedbackKey, Field, Fields, Severity};
pub use form::{FeedbacksHandle, FormWithConstraints, ShownFeedback};
pub use input::ConstraintInput;

pub mod prelude {
    pub use crate::config::FormConfig;
    pub use crate::emitter::listener;
    pub use crate::error::FormError;
    pub use crate::events::{FormEvent, FormEventKind};
    pub use crate::feedback::{Feedback, FieldFeedbacks, Stop};
    pub use crate::field::{FeedbackKey, Field, Severity};
    pub use crate::form::{FormWithConstraints, ShownFeedback};
    pub use crate::input::ConstraintInput;

    pub use constraintdom::{Constraint, InputElement, InputType};
}
