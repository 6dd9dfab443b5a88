//! The media-engine capability trait and its handle types.

use recorder_ipc::{CropBox, EndpointKind, MediaContext, Vec2};

use crate::{RenderPass, SettingsDoc, WindowHandle};

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub u64);
    };
}

handle!(
    /// A capture or audio resource owned by the engine.
    EndpointId
);
handle!(
    /// A level meter attached to an audio endpoint.
    MeterId
);
handle!(
    /// A noise-suppression filter attached to an audio-input endpoint.
    FilterId
);
handle!(
    /// The scene graph root.
    SceneId
);
handle!(
    /// One endpoint's membership in a scene.
    LayerId
);
handle!(
    /// A video or audio encoder.
    EncoderId
);
handle!(
    /// A ring-buffer or direct-file sink.
    SinkId
);
handle!(
    /// A window-bound GPU preview surface.
    SurfaceId
);
handle!(
    /// One connected lifecycle signal, disconnectable.
    SignalConnection
);

/// Payload delivered with a sink lifecycle signal.
#[derive(Debug, Clone, Copy)]
pub struct SignalData {
    /// Engine status code; 0 on success paths.
    pub code: i64,
}

/// Invoked on an engine worker thread when a connected signal fires.
pub type SignalCallback = Box<dyn Fn(SignalData) + Send + Sync>;

/// Invoked on an engine worker thread with a level magnitude in [0, 1].
pub type MeterCallback = Box<dyn Fn(f32) + Send + Sync>;

/// Invoked on the render thread once per composited frame with the
/// surface's current back-buffer size.
pub type DrawCallback = Box<dyn FnMut(&mut dyn RenderPass, u32, u32) + Send>;

/// Outcome of a refused media-context reset.
///
/// `CurrentlyActive` is distinguishable so the caller can treat it as a
/// soft failure; any other refusal carries the engine's diagnostic text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextResetError {
    CurrentlyActive,
    Failed(String),
}

/// Capability set of the external media engine.
///
/// All methods are synchronous; asynchronous results (start/stop
/// completion, convert output) surface later through connected signal
/// callbacks. Errors are best-effort diagnostic strings, matching what the
/// engine actually reports.
pub trait MediaEngine: Send + Sync {
    // Endpoints. `create_endpoint` may rename on collision; the returned
    // name is the only valid handle thereafter.
    fn create_endpoint(
        &self,
        name: &str,
        kind: EndpointKind,
        settings: Option<SettingsDoc>,
    ) -> Result<(EndpointId, String), String>;
    fn destroy_endpoint(&self, endpoint: EndpointId);
    fn endpoint_settings(&self, endpoint: EndpointId) -> SettingsDoc;
    fn update_endpoint_settings(&self, endpoint: EndpointId, settings: SettingsDoc);
    fn endpoint_properties(&self, endpoint: EndpointId) -> SettingsDoc;
    fn endpoint_size(&self, endpoint: EndpointId) -> (u32, u32);
    fn set_endpoint_volume(&self, endpoint: EndpointId, volume: f32);
    fn set_endpoint_muted(&self, endpoint: EndpointId, muted: bool);
    fn set_endpoint_mono(&self, endpoint: EndpointId, mono: bool);

    // Level meters and filters. Callbacks stop firing once detached.
    fn attach_level_meter(&self, endpoint: EndpointId, cb: MeterCallback)
        -> Result<MeterId, String>;
    fn detach_level_meter(&self, meter: MeterId);
    fn attach_noise_filter(&self, endpoint: EndpointId) -> Result<FilterId, String>;
    fn detach_noise_filter(&self, endpoint: EndpointId, filter: FilterId);

    // Scene graph. The created scene becomes the engine's composition root.
    fn create_scene(&self, name: &str) -> Result<SceneId, String>;
    fn destroy_scene(&self, scene: SceneId);
    fn add_layer(&self, scene: SceneId, endpoint: EndpointId) -> Result<LayerId, String>;
    fn remove_layer(&self, layer: LayerId);
    fn set_layer_transform(&self, layer: LayerId, position: Vec2, scale: Vec2, crop: CropBox);

    // Encoders, bound to the global media context.
    fn available_video_encoders(&self) -> Vec<String>;
    fn create_video_encoder(
        &self,
        type_id: &str,
        name: &str,
        settings: SettingsDoc,
    ) -> Result<EncoderId, String>;
    fn create_audio_encoder(
        &self,
        type_id: &str,
        name: &str,
        settings: SettingsDoc,
    ) -> Result<EncoderId, String>;
    fn destroy_encoder(&self, encoder: EncoderId);
    fn bind_video_encoder(&self, encoder: EncoderId);
    fn bind_audio_encoder(&self, encoder: EncoderId);

    // Sinks.
    fn create_ring_sink(&self, settings: SettingsDoc) -> Result<SinkId, String>;
    fn create_file_sink(&self, settings: SettingsDoc) -> Result<SinkId, String>;
    fn destroy_sink(&self, sink: SinkId);
    fn update_sink_settings(&self, sink: SinkId, settings: SettingsDoc);
    fn set_sink_video_encoder(&self, sink: SinkId, encoder: EncoderId);
    fn set_sink_audio_encoder(&self, sink: SinkId, encoder: EncoderId);
    fn start_sink(&self, sink: SinkId) -> bool;
    fn stop_sink(&self, sink: SinkId);
    fn force_stop_sink(&self, sink: SinkId);
    fn sink_active(&self, sink: SinkId) -> bool;

    /// Ask a ring sink to extract a clip starting `offset_seconds` back
    /// from now. The result surfaces later as a `saved` signal.
    fn sink_convert(&self, sink: SinkId, offset_seconds: u32) -> bool;
    fn last_artifact_path(&self, sink: SinkId) -> Option<String>;

    fn connect_signal(&self, sink: SinkId, signal: &str, cb: SignalCallback) -> SignalConnection;
    fn disconnect_signal(&self, connection: SignalConnection);

    /// Most recent engine diagnostic, if any.
    fn last_error(&self) -> Option<String>;

    // Global contexts.
    fn reset_media_context(&self, context: MediaContext) -> Result<(), ContextResetError>;
    fn reset_audio_context(&self, sample_rate: u32, stereo: bool) -> Result<(), String>;

    // Preview surfaces.
    fn create_surface(
        &self,
        window: WindowHandle,
        width: u32,
        height: u32,
    ) -> Result<SurfaceId, String>;
    fn destroy_surface(&self, surface: SurfaceId);
    fn resize_surface(&self, surface: SurfaceId, width: u32, height: u32);
    fn surface_size(&self, surface: SurfaceId) -> (u32, u32);
    fn set_surface_enabled(&self, surface: SurfaceId, enabled: bool);
    fn set_draw_callback(&self, surface: SurfaceId, cb: DrawCallback);
    fn clear_draw_callback(&self, surface: SurfaceId);

    /// Engine version string for startup diagnostics.
    fn version(&self) -> String;
}
