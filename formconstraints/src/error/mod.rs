//! Error types

mod emitter;
mod form;

pub use emitter::*;
pub use form::*;
