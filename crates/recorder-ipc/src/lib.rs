//! Typed host<->session messages for the recorder.
//!
//! This crate defines the event stream delivered to the host and the plain
//! data types shared between the host surface and the session core.

mod events;
mod types;

pub use events::{EventKind, OutputSignal, SessionEvent};
pub use types::{
    BufferLimits, CropBox, EndpointKind, LayerTransform, MediaContext, PixelSize, PreviewInfo,
    Vec2,
};

use crossbeam_channel::{Receiver, Sender};

/// Channel capacity for events (session -> host).
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Creates a bounded event channel.
pub fn event_channel() -> (Sender<SessionEvent>, Receiver<SessionEvent>) {
    crossbeam_channel::bounded(EVENT_CHANNEL_CAPACITY)
}
