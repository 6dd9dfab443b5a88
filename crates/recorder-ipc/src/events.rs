//! Events sent from the session to the host.

use serde::{Deserialize, Serialize};

/// Category of an asynchronous notification.
///
/// Events sharing the same `(kind, id)` pair are delivered in FIFO order;
/// no ordering is guaranteed across different kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Sink lifecycle signal; `id` is the signal name.
    Output,

    /// Level-meter sample; `id` is the endpoint name, `value` the magnitude.
    Level,

    /// An endpoint's natural size changed; `id` is the endpoint name.
    Source,
}

/// Lifecycle signals emitted by the active sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputSignal {
    Starting,
    Start,
    Stopping,
    Stop,
    Saved,
}

impl OutputSignal {
    /// Wire name of the signal, as connected on the engine side.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Start => "start",
            Self::Stopping => "stopping",
            Self::Stop => "stop",
            Self::Saved => "saved",
        }
    }

    /// All sink lifecycle signals, in connection order.
    pub fn all() -> [OutputSignal; 5] {
        [
            Self::Starting,
            Self::Start,
            Self::Stopping,
            Self::Stop,
            Self::Saved,
        ]
    }
}

/// An asynchronous notification delivered to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    /// Event category.
    pub kind: EventKind,

    /// Signal name for output events, endpoint name otherwise.
    pub id: String,

    /// Engine-provided status code (0 on success paths).
    pub code: i64,

    /// Optional scalar payload (level-meter magnitude).
    pub value: Option<f64>,
}

impl SessionEvent {
    /// A sink lifecycle event.
    pub fn output(signal: OutputSignal, code: i64) -> Self {
        Self {
            kind: EventKind::Output,
            id: signal.as_str().to_string(),
            code,
            value: None,
        }
    }

    /// A level-meter sample for the named endpoint.
    pub fn level(endpoint: &str, magnitude: f32) -> Self {
        Self {
            kind: EventKind::Level,
            id: endpoint.to_string(),
            code: 0,
            value: Some(f64::from(magnitude)),
        }
    }

    /// A size-change notification for the named endpoint.
    ///
    /// Carries no dimensions; the host queries the transform for the new
    /// native size.
    pub fn source_resized(endpoint: &str) -> Self {
        Self {
            kind: EventKind::Source,
            id: endpoint.to_string(),
            code: 0,
            value: None,
        }
    }
}
