//! Event emitter error types

/// Misuse of an [`EventEmitter`](crate::emitter::EventEmitter).
///
/// Every variant is an integration bug: listeners are wired up wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmitterError {
    /// The listener is already registered for this event.
    #[error("Listener already added for event '{event}'")]
    DuplicateListener { event: String },

    /// The event never had a listener.
    #[error("Unknown event '{event}'")]
    UnknownEvent { event: String },

    /// The listener is not registered for this event.
    #[error("Listener not found for event '{event}'")]
    ListenerNotFound { event: String },

    /// The event had listeners but all of them were removed.
    #[error("No listener for event '{event}'")]
    NoListener { event: String },
}
