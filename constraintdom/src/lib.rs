//! Native input model with HTML constraint validation.
//!
//! An [`InputElement`] carries the constraint attributes a form control
//! declares (`required`, `minlength`, `pattern`, `min`, ...) and computes the
//! resulting [`ValidityState`] and browser-style validation message.

mod constraint;
mod error;
mod input;
mod validity;

pub use constraint::Constraint;
pub use error::DomError;
pub use input::{InputData, InputElement, InputType, Step};
pub use validity::ValidityState;
