use std::fmt;

use crate::emitter::{EventEmitter, Listener};
use crate::error::EmitterError;
use crate::field::Field;

/// Names of the events a form emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormEventKind {
    FieldAdded,
    FieldRemoved,
    FieldWillValidate,
    FieldDidValidate,
    Reset,
}

impl fmt::Display for FormEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FieldAdded => "fieldAdded",
            Self::FieldRemoved => "fieldRemoved",
            Self::FieldWillValidate => "fieldWillValidate",
            Self::FieldDidValidate => "fieldDidValidate",
            Self::Reset => "reset",
        })
    }
}

/// Payload delivered to form listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// First feedbacks for the field were mounted.
    FieldAdded(String),
    /// Last feedbacks for the field were unmounted.
    FieldRemoved(String),
    /// A validation run for the field is starting.
    FieldWillValidate(String),
    /// A validation run completed and is the latest one for the field.
    FieldDidValidate(Field),
    /// Every field was reset.
    Reset,
}

impl FormEvent {
    pub fn kind(&self) -> FormEventKind {
        match self {
            Self::FieldAdded(_) => FormEventKind::FieldAdded,
            Self::FieldRemoved(_) => FormEventKind::FieldRemoved,
            Self::FieldWillValidate(_) => FormEventKind::FieldWillValidate,
            Self::FieldDidValidate(_) => FormEventKind::FieldDidValidate,
            Self::Reset => FormEventKind::Reset,
        }
    }
}

pub type FormListener = Listener<FormEvent>;

/// Emitter shared by a form and its fields store.
pub type FormEmitter = EventEmitter<FormEventKind, FormEvent>;

pub(crate) fn emit(emitter: &FormEmitter, event: FormEvent) -> Result<(), EmitterError> {
    log::trace!("emit {}", event.kind());
    emitter.emit(&event.kind(), &event)
}
