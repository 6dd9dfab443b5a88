//! Common types used across the host surface.

use serde::{Deserialize, Serialize};

/// What a registered endpoint captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndpointKind {
    /// Screen, window, or game capture.
    VideoCapture,

    /// Microphone or other input device.
    AudioInput,

    /// Desktop audio (output loopback).
    AudioOutput,

    /// Audio captured from a single process.
    AudioProcessCapture,

    /// Anything the engine supports beyond the kinds above.
    Other,
}

impl EndpointKind {
    /// Audio kinds get a level meter attached at creation.
    pub fn is_audio(self) -> bool {
        matches!(
            self,
            Self::AudioInput | Self::AudioOutput | Self::AudioProcessCapture
        )
    }
}

/// A 2D vector (position or per-axis scale).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Identity scale.
    pub fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }
}

/// Pixels cropped from each edge of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CropBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

/// A layer's placement within the composition.
///
/// `size` is the endpoint's native (pre-scale) pixel size so callers can
/// compute scale themselves; it is never set through the transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerTransform {
    pub position: Vec2,
    pub size: PixelSize,
    pub scale: Vec2,
    pub crop: CropBox,
}

/// The global resolution/fps configuration shared by all encoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaContext {
    pub fps: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for MediaContext {
    fn default() -> Self {
        Self {
            fps: 60,
            width: 1920,
            height: 1080,
        }
    }
}

impl MediaContext {
    /// Substitutes defaults for out-of-range values instead of failing.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        Self {
            fps: if self.fps > 10 { self.fps } else { defaults.fps },
            width: if self.width > 32 {
                self.width
            } else {
                defaults.width
            },
            height: if self.height > 32 {
                self.height
            } else {
                defaults.height
            },
        }
    }
}

/// Bounds for the in-memory replay buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferLimits {
    /// Maximum seconds of footage retained.
    pub max_seconds: u32,

    /// Maximum memory footprint in megabytes.
    pub max_size_mb: u32,
}

impl Default for BufferLimits {
    fn default() -> Self {
        Self {
            max_seconds: 30,
            max_size_mb: 512,
        }
    }
}

/// Canvas and back-buffer dimensions reported for the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewInfo {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub surface_width: u32,
    pub surface_height: u32,
}
