//! Abstract capability surface of the external media engine.
//!
//! The session core consumes capture, encoding, and GPU compositing through
//! the [`MediaEngine`] trait and native child windows through
//! [`WindowSystem`]. Implementations live out of tree; the orchestrator
//! never links against a concrete engine.

mod engine;
mod render;
mod window;

pub use engine::{
    ContextResetError, DrawCallback, EncoderId, EndpointId, FilterId, LayerId, MediaEngine,
    MeterCallback, MeterId, SceneId, SignalCallback, SignalConnection, SignalData, SinkId,
    SurfaceId,
};
pub use render::{RenderPass, Rgba};
pub use window::{WindowHandle, WindowId, WindowSystem};

/// Opaque settings document passed through to the engine unmodified.
pub type SettingsDoc = serde_json::Value;
