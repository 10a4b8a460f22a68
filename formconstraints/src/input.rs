//! The seam between the engine and native inputs.

use constraintdom::{InputElement, ValidityState};

/// An input the form can read native constraint state from.
///
/// UI bindings implement this for their own controls;
/// [`InputElement`] implements it out of the box.
pub trait ConstraintInput: Send + Sync {
    /// Name the feedback trees refer to.
    fn name(&self) -> &str;

    /// Current value.
    fn value(&self) -> String;

    /// Native constraint flags.
    fn validity(&self) -> ValidityState;

    /// Human-readable message for the first failing constraint, or empty.
    fn validation_message(&self) -> String;
}

impl ConstraintInput for InputElement {
    fn name(&self) -> &str {
        InputElement::name(self)
    }

    fn value(&self) -> String {
        self.get_value()
    }

    fn validity(&self) -> ValidityState {
        InputElement::validity(self)
    }

    fn validation_message(&self) -> String {
        InputElement::validation_message(self)
    }
}
