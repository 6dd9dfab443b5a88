//! The host-facing recording session facade.

use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::RwLock;
use tracing::{info, instrument};

use recorder_ipc::{
    BufferLimits, CropBox, EndpointKind, LayerTransform, MediaContext, PreviewInfo, SessionEvent,
    Vec2,
};
use recorder_media::{ContextResetError, MediaEngine, SettingsDoc, WindowHandle, WindowSystem};

use crate::composition::Composition;
use crate::error::{SessionError, SessionResult};
use crate::events::EventBridge;
use crate::output::OutputManager;
use crate::preview::PreviewController;
use crate::registry::SourceRegistry;

/// Session-level configuration supplied at construction.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Where recordings are written; settable later.
    pub recording_dir: Option<PathBuf>,

    /// Replay-buffer bounds.
    pub buffer_limits: BufferLimits,
}

/// One persistent recording session.
///
/// Public methods are called from a single host control thread; results of
/// asynchronous work (convert, start/stop completion, meter samples, size
/// changes) arrive through the event channel handed to [`Self::new`].
pub struct RecordingSession {
    registry: Arc<SourceRegistry>,
    composition: Arc<Composition>,
    output: OutputManager,
    preview: PreviewController,
    events: EventBridge,
}

impl RecordingSession {
    /// Bring the session up: reset the media and audio contexts, create
    /// the scene, the initial sink and encoder pair, and connect its
    /// lifecycle signals.
    #[instrument(name = "session_new", skip_all)]
    pub fn new(
        engine: Arc<dyn MediaEngine>,
        windows: Arc<dyn WindowSystem>,
        config: SessionConfig,
        event_tx: Sender<SessionEvent>,
    ) -> SessionResult<Self> {
        info!(version = %engine.version(), "initializing recording session");

        let context = Arc::new(RwLock::new(MediaContext::default()));
        engine
            .reset_media_context(*context.read())
            .map_err(|e| match e {
                ContextResetError::CurrentlyActive => SessionError::Busy,
                ContextResetError::Failed(msg) => SessionError::Engine(msg),
            })?;
        engine
            .reset_audio_context(48_000, true)
            .map_err(SessionError::Engine)?;

        let events = EventBridge::new(event_tx);
        let registry = Arc::new(SourceRegistry::new(Arc::clone(&engine), events.clone()));
        let composition = Arc::new(Composition::new(Arc::clone(&engine), Arc::clone(&registry))?);
        let output = OutputManager::new(
            Arc::clone(&engine),
            events.clone(),
            Arc::clone(&context),
            config.recording_dir,
            config.buffer_limits,
        )?;
        let preview = PreviewController::new(
            engine,
            windows,
            context,
            Arc::clone(&registry),
            Arc::clone(&composition),
        );

        info!("recording session ready");
        Ok(Self {
            registry,
            composition,
            output,
            preview,
            events,
        })
    }

    // Endpoints.

    /// Create an endpoint; returns the name the engine actually assigned.
    pub fn create_endpoint(
        &self,
        name: &str,
        kind: EndpointKind,
        settings: Option<SettingsDoc>,
    ) -> SessionResult<String> {
        self.registry.create(name, kind, settings)
    }

    pub fn delete_endpoint(&self, name: &str) {
        self.registry.delete(name);
    }

    pub fn endpoint_settings(&self, name: &str) -> SessionResult<SettingsDoc> {
        self.registry.settings(name)
    }

    pub fn set_endpoint_settings(&self, name: &str, settings: SettingsDoc) -> SessionResult<()> {
        self.registry.set_settings(name, settings)
    }

    pub fn endpoint_properties(&self, name: &str) -> SessionResult<SettingsDoc> {
        self.registry.properties_schema(name)
    }

    pub fn set_mute_all_inputs(&self, mute: bool) {
        self.registry.set_mute_all_inputs(mute);
    }

    pub fn set_force_mono(&self, enabled: bool) {
        self.registry.set_force_mono(enabled);
    }

    pub fn set_audio_suppression(&self, enabled: bool) {
        self.registry.set_audio_suppression(enabled);
    }

    pub fn set_volume(&self, name: &str, volume: f32) {
        self.registry.set_volume(name, volume);
    }

    // Composition.

    pub fn add_to_composition(&self, name: &str) -> SessionResult<()> {
        self.composition.add(name)
    }

    pub fn remove_from_composition(&self, name: &str) {
        self.composition.remove(name);
    }

    pub fn transform(&self, name: &str) -> SessionResult<LayerTransform> {
        self.composition.transform(name)
    }

    pub fn set_transform(&self, name: &str, position: Vec2, scale: Vec2, crop: CropBox) {
        self.composition.set_transform(name, position, scale, crop);
    }

    // Sink and encoders.

    pub fn set_mode(&self, buffering: bool) -> SessionResult<()> {
        self.output.set_mode(buffering)
    }

    pub fn set_output_directory(&self, path: impl Into<PathBuf>) -> SessionResult<()> {
        self.output.set_output_directory(path)
    }

    pub fn set_buffer_limits(&self, limits: BufferLimits) -> SessionResult<()> {
        self.output.set_buffer_limits(limits)
    }

    pub fn set_video_encoder(&self, type_id: &str, settings: SettingsDoc) -> SessionResult<()> {
        self.output.set_video_encoder(type_id, settings)
    }

    pub fn set_media_context(&self, fps: u32, width: u32, height: u32) -> SessionResult<()> {
        self.output.set_media_context(fps, width, height)
    }

    pub fn available_video_encoders(&self) -> Vec<String> {
        self.output.available_video_encoders()
    }

    pub fn start_buffer(&self) -> SessionResult<()> {
        self.output.start_buffer()
    }

    pub fn start_recording(&self, offset_seconds: u32) -> SessionResult<()> {
        self.output.start_recording(offset_seconds)
    }

    pub fn stop_recording(&self) {
        self.output.stop_recording();
    }

    pub fn force_stop_recording(&self) {
        self.output.force_stop_recording();
    }

    pub fn last_recording_path(&self) -> String {
        self.output.last_recording_path()
    }

    // Preview.

    pub fn init_preview(&self, parent: WindowHandle) -> SessionResult<()> {
        self.preview.init(parent)
    }

    pub fn configure_preview(&self, x: i32, y: i32, width: u32, height: u32) {
        self.preview.configure(x, y, width, height);
    }

    pub fn show_preview(&self) {
        self.preview.show();
    }

    pub fn hide_preview(&self) {
        self.preview.hide();
    }

    pub fn disable_preview(&self) {
        self.preview.disable();
    }

    pub fn preview_info(&self) -> PreviewInfo {
        self.preview.info()
    }

    pub fn set_draw_outline(&self, enabled: bool) {
        self.preview.set_draw_outline(enabled);
    }

    // Events.

    pub fn set_meters_enabled(&self, enabled: bool) {
        self.events.set_meters_enabled(enabled);
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        info!("shutting down recording session");
        // The preview hook goes first so the render thread stops touching
        // the registry and composition before they are torn down.
        self.preview.shutdown();
        self.output.shutdown();
        self.registry.shutdown();
    }
}
