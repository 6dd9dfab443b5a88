//! Recording session orchestrator.
//!
//! This crate owns the lifecycle of endpoints, the composition, the active
//! sink and its encoders, the preview surface, and the asynchronous event
//! bridge, on top of the abstract media engine from `recorder-media`. It
//! enforces the invariants the engine does not: mutual exclusion between
//! sink modes, encoder-to-context binding, preview letterboxing, and
//! ordered signal delivery.

mod composition;
mod error;
mod events;
mod logging;
mod output;
mod preview;
mod registry;
mod session;

#[cfg(test)]
mod testing;

pub use composition::Composition;
pub use error::{SessionError, SessionResult};
pub use events::{drain_events, EventBridge};
pub use logging::init_logging;
pub use output::OutputManager;
pub use preview::PreviewController;
pub use registry::SourceRegistry;
pub use session::{RecordingSession, SessionConfig};
