//! Error types for session operations.

use thiserror::Error;

/// Errors surfaced to the host by session operations.
///
/// Soft failures (re-deleting an absent endpoint, stopping an idle sink,
/// resetting the media context while active, and similar) are logged and
/// return `Ok` instead of one of these.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Named endpoint or layer does not exist.
    #[error("no endpoint or layer named `{0}`")]
    NotFound(String),

    /// Operation disallowed while the sink is active; stop first.
    #[error("operation not allowed while the output is active")]
    Busy,

    /// Missing prerequisite, such as an output directory.
    #[error("missing prerequisite: {0}")]
    NotConfigured(&'static str),

    /// Ring-buffer convert requested without an active buffer.
    #[error("replay buffer is not active")]
    NotActive,

    /// The engine reported failure.
    #[error("media engine error: {0}")]
    Engine(String),

    /// The engine refused to construct a resource.
    #[error("failed to create resource: {0}")]
    CreationFailed(String),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
