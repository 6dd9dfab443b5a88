//! Scripted collaborator doubles for the test-suites.
//!
//! `FakeEngine` records every capability call, can be primed to refuse
//! specific operations, and delivers lifecycle signals synchronously so
//! tests can assert on event order deterministically.

use std::collections::HashMap;
use std::sync::Arc;

use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use serde_json::json;

use recorder_ipc::{event_channel, CropBox, EndpointKind, MediaContext, SessionEvent, Vec2};
use recorder_media::{
    ContextResetError, DrawCallback, EncoderId, EndpointId, FilterId, LayerId, MediaEngine,
    MeterCallback, MeterId, RenderPass, Rgba, SceneId, SettingsDoc, SignalCallback,
    SignalConnection, SignalData, SinkId, SurfaceId, WindowHandle, WindowId, WindowSystem,
};

use crate::events::EventBridge;

/// An event bridge wired to a fresh channel, plus the receiving end.
pub fn bridge_pair() -> (EventBridge, Receiver<SessionEvent>) {
    let (tx, rx) = event_channel();
    (EventBridge::new(tx), rx)
}

struct FakeEndpoint {
    id: u64,
    name: String,
    kind: EndpointKind,
    settings: SettingsDoc,
    size: (u32, u32),
    muted: bool,
    mono: bool,
    volume: Option<f32>,
    filter: Option<u64>,
}

struct FakeMeter {
    endpoint: u64,
    cb: Arc<dyn Fn(f32) + Send + Sync>,
}

struct FakeLayer {
    position: Vec2,
    scale: Vec2,
    crop: CropBox,
}

struct FakeEncoder {
    type_id: String,
}

struct FakeSink {
    ring: bool,
    settings: SettingsDoc,
    active: bool,
    video_encoder: Option<EncoderId>,
    audio_encoder: Option<EncoderId>,
}

struct FakeSignal {
    sink: u64,
    name: String,
    cb: Arc<dyn Fn(SignalData) + Send + Sync>,
}

struct FakeSurface {
    size: (u32, u32),
    enabled: bool,
}

#[derive(Default)]
struct EngineState {
    next_id: u64,
    endpoints: Vec<FakeEndpoint>,
    meters: HashMap<u64, FakeMeter>,
    detached_meters: usize,
    scenes: Vec<u64>,
    layers: HashMap<u64, FakeLayer>,
    encoders: HashMap<u64, FakeEncoder>,
    sinks: HashMap<u64, FakeSink>,
    sink_order: Vec<u64>,
    signals: HashMap<u64, FakeSignal>,
    surfaces: HashMap<u64, FakeSurface>,
    context: Option<MediaContext>,
    audio_context: Option<(u32, bool)>,
    last_error: Option<String>,
    last_artifact: Option<String>,

    fail_next_create_endpoint: bool,
    fail_next_convert: bool,
    fail_next_create_surface: bool,
    fail_start_message: Option<String>,

    created_sinks: u32,
    destroyed_sinks: u32,
    start_calls: u32,
    stop_calls: u32,
    force_stop_calls: u32,
    convert_offsets: Vec<u32>,
}

impl EngineState {
    fn alloc(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn endpoint(&self, id: u64) -> Option<&FakeEndpoint> {
        self.endpoints.iter().find(|e| e.id == id)
    }

    fn endpoint_mut(&mut self, id: u64) -> Option<&mut FakeEndpoint> {
        self.endpoints.iter_mut().find(|e| e.id == id)
    }

    fn endpoint_by_name(&self, name: &str) -> Option<&FakeEndpoint> {
        self.endpoints.iter().find(|e| e.name == name)
    }

    fn endpoint_by_name_mut(&mut self, name: &str) -> Option<&mut FakeEndpoint> {
        self.endpoints.iter_mut().find(|e| e.name == name)
    }

    /// Newest sink that is still alive.
    fn live_sink(&self) -> Option<u64> {
        self.sink_order
            .iter()
            .rev()
            .find(|id| self.sinks.contains_key(id))
            .copied()
    }

    fn live_surface(&self) -> Option<u64> {
        self.surfaces.keys().next().copied()
    }

    fn signals_for(&self, sink: u64, names: &[&str]) -> Vec<Arc<dyn Fn(SignalData) + Send + Sync>> {
        let mut cbs = Vec::new();
        for name in names {
            for signal in self.signals.values() {
                if signal.sink == sink && signal.name == *name {
                    cbs.push(Arc::clone(&signal.cb));
                }
            }
        }
        cbs
    }
}

#[derive(Default)]
pub struct FakeEngine {
    state: Mutex<EngineState>,
    draw_callbacks: Mutex<HashMap<u64, DrawCallback>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    // Scripting knobs.

    pub fn fail_next_create_endpoint(&self) {
        self.state.lock().fail_next_create_endpoint = true;
    }

    pub fn fail_next_start_sink(&self, message: &str) {
        self.state.lock().fail_start_message = Some(message.to_string());
    }

    pub fn fail_next_convert(&self) {
        self.state.lock().fail_next_convert = true;
    }

    pub fn fail_next_create_surface(&self) {
        self.state.lock().fail_next_create_surface = true;
    }

    pub fn set_endpoint_size(&self, name: &str, width: u32, height: u32) {
        if let Some(endpoint) = self.state.lock().endpoint_by_name_mut(name) {
            endpoint.size = (width, height);
        }
    }

    /// Push one level sample through the named endpoint's meter, if any.
    pub fn emit_meter_sample(&self, name: &str, magnitude: f32) {
        let cbs: Vec<_> = {
            let state = self.state.lock();
            let Some(id) = state.endpoint_by_name(name).map(|e| e.id) else {
                return;
            };
            state
                .meters
                .values()
                .filter(|m| m.endpoint == id)
                .map(|m| Arc::clone(&m.cb))
                .collect()
        };
        for cb in cbs {
            cb(magnitude);
        }
    }

    /// Tick the render thread once: invoke the registered draw callback
    /// with the surface's current back-buffer size.
    pub fn run_frame(&self, pass: &mut dyn RenderPass) {
        let entry = {
            let mut cbs = self.draw_callbacks.lock();
            let key = cbs.keys().next().copied();
            key.and_then(|k| cbs.remove(&k).map(|cb| (k, cb)))
        };
        let Some((surface, mut cb)) = entry else {
            return;
        };
        let (width, height) = self
            .state
            .lock()
            .surfaces
            .get(&surface)
            .map(|s| s.size)
            .unwrap_or((0, 0));

        cb(pass, width, height);

        let mut cbs = self.draw_callbacks.lock();
        if self.state.lock().surfaces.contains_key(&surface) {
            cbs.insert(surface, cb);
        }
    }

    // Inspection.

    pub fn endpoint_count(&self) -> usize {
        self.state.lock().endpoints.len()
    }

    pub fn meter_count(&self) -> usize {
        self.state.lock().meters.len()
    }

    pub fn detached_meter_count(&self) -> usize {
        self.state.lock().detached_meters
    }

    pub fn filter_count(&self) -> usize {
        self.state
            .lock()
            .endpoints
            .iter()
            .filter(|e| e.filter.is_some())
            .count()
    }

    pub fn endpoint_has_filter(&self, name: &str) -> bool {
        self.state
            .lock()
            .endpoint_by_name(name)
            .is_some_and(|e| e.filter.is_some())
    }

    pub fn endpoint_muted(&self, name: &str) -> bool {
        self.state
            .lock()
            .endpoint_by_name(name)
            .is_some_and(|e| e.muted)
    }

    pub fn endpoint_mono(&self, name: &str) -> bool {
        self.state
            .lock()
            .endpoint_by_name(name)
            .is_some_and(|e| e.mono)
    }

    pub fn endpoint_volume(&self, name: &str) -> Option<f32> {
        self.state
            .lock()
            .endpoint_by_name(name)
            .and_then(|e| e.volume)
    }

    pub fn layer_count(&self) -> usize {
        self.state.lock().layers.len()
    }

    pub fn created_sink_count(&self) -> u32 {
        self.state.lock().created_sinks
    }

    pub fn destroyed_sink_count(&self) -> u32 {
        self.state.lock().destroyed_sinks
    }

    pub fn sink_is_ring(&self) -> bool {
        let state = self.state.lock();
        state
            .live_sink()
            .and_then(|id| state.sinks.get(&id))
            .is_some_and(|s| s.ring)
    }

    pub fn sink_settings(&self) -> SettingsDoc {
        let state = self.state.lock();
        state
            .live_sink()
            .and_then(|id| state.sinks.get(&id))
            .map(|s| s.settings.clone())
            .unwrap_or_else(|| json!({}))
    }

    pub fn sink_start_count(&self) -> u32 {
        self.state.lock().start_calls
    }

    pub fn sink_stop_count(&self) -> u32 {
        self.state.lock().stop_calls
    }

    pub fn sink_force_stop_count(&self) -> u32 {
        self.state.lock().force_stop_calls
    }

    pub fn convert_offsets(&self) -> Vec<u32> {
        self.state.lock().convert_offsets.clone()
    }

    pub fn sink_video_encoder(&self) -> Option<EncoderId> {
        let state = self.state.lock();
        state
            .live_sink()
            .and_then(|id| state.sinks.get(&id))
            .and_then(|s| s.video_encoder)
    }

    pub fn sink_audio_encoder(&self) -> Option<EncoderId> {
        let state = self.state.lock();
        state
            .live_sink()
            .and_then(|id| state.sinks.get(&id))
            .and_then(|s| s.audio_encoder)
    }

    pub fn video_encoder_type(&self) -> String {
        let state = self.state.lock();
        state
            .live_sink()
            .and_then(|id| state.sinks.get(&id))
            .and_then(|s| s.video_encoder)
            .and_then(|id| state.encoders.get(&id.0))
            .map(|e| e.type_id.clone())
            .unwrap_or_default()
    }

    pub fn live_encoder_count(&self) -> usize {
        self.state.lock().encoders.len()
    }

    pub fn connected_signal_count(&self) -> usize {
        self.state.lock().signals.len()
    }

    pub fn current_context(&self) -> MediaContext {
        self.state.lock().context.unwrap_or_default()
    }

    pub fn scene_count(&self) -> usize {
        self.state.lock().scenes.len()
    }

    pub fn audio_context(&self) -> Option<(u32, bool)> {
        self.state.lock().audio_context
    }

    /// Transform of the single live layer, as the engine last saw it.
    pub fn layer_transform(&self) -> Option<(Vec2, Vec2, CropBox)> {
        let state = self.state.lock();
        state
            .layers
            .values()
            .next()
            .map(|l| (l.position, l.scale, l.crop))
    }

    pub fn surface_count(&self) -> usize {
        self.state.lock().surfaces.len()
    }

    pub fn surface_enabled(&self) -> bool {
        let state = self.state.lock();
        state
            .live_surface()
            .and_then(|id| state.surfaces.get(&id))
            .is_some_and(|s| s.enabled)
    }

    pub fn surface_dims(&self) -> (u32, u32) {
        let state = self.state.lock();
        state
            .live_surface()
            .and_then(|id| state.surfaces.get(&id))
            .map(|s| s.size)
            .unwrap_or((0, 0))
    }

    fn fire(&self, sink: u64, names: &[&str], code: i64) {
        let cbs = self.state.lock().signals_for(sink, names);
        for cb in cbs {
            cb(SignalData { code });
        }
    }
}

fn merged(base: &SettingsDoc, patch: SettingsDoc) -> SettingsDoc {
    match (base.as_object(), patch.as_object()) {
        (Some(base_obj), Some(patch_obj)) => {
            let mut merged = base_obj.clone();
            for (key, value) in patch_obj {
                merged.insert(key.clone(), value.clone());
            }
            SettingsDoc::Object(merged)
        }
        _ => patch,
    }
}

impl MediaEngine for FakeEngine {
    fn create_endpoint(
        &self,
        name: &str,
        kind: EndpointKind,
        settings: Option<SettingsDoc>,
    ) -> Result<(EndpointId, String), String> {
        let mut state = self.state.lock();
        if std::mem::take(&mut state.fail_next_create_endpoint) {
            return Err("endpoint creation refused".to_string());
        }
        let mut actual = name.to_string();
        let mut suffix = 2;
        while state.endpoint_by_name(&actual).is_some() {
            actual = format!("{name} {suffix}");
            suffix += 1;
        }
        let id = state.alloc();
        state.endpoints.push(FakeEndpoint {
            id,
            name: actual.clone(),
            kind,
            settings: settings.unwrap_or_else(|| json!({})),
            size: (0, 0),
            muted: false,
            mono: false,
            volume: None,
            filter: None,
        });
        Ok((EndpointId(id), actual))
    }

    fn destroy_endpoint(&self, endpoint: EndpointId) {
        self.state.lock().endpoints.retain(|e| e.id != endpoint.0);
    }

    fn endpoint_settings(&self, endpoint: EndpointId) -> SettingsDoc {
        self.state
            .lock()
            .endpoint(endpoint.0)
            .map(|e| e.settings.clone())
            .unwrap_or_else(|| json!({}))
    }

    fn update_endpoint_settings(&self, endpoint: EndpointId, settings: SettingsDoc) {
        if let Some(e) = self.state.lock().endpoint_mut(endpoint.0) {
            e.settings = settings;
        }
    }

    fn endpoint_properties(&self, endpoint: EndpointId) -> SettingsDoc {
        let state = self.state.lock();
        let kind = state.endpoint(endpoint.0).map(|e| e.kind);
        json!({ "kind": format!("{kind:?}"), "properties": [] })
    }

    fn endpoint_size(&self, endpoint: EndpointId) -> (u32, u32) {
        self.state
            .lock()
            .endpoint(endpoint.0)
            .map(|e| e.size)
            .unwrap_or((0, 0))
    }

    fn set_endpoint_volume(&self, endpoint: EndpointId, volume: f32) {
        if let Some(e) = self.state.lock().endpoint_mut(endpoint.0) {
            e.volume = Some(volume);
        }
    }

    fn set_endpoint_muted(&self, endpoint: EndpointId, muted: bool) {
        if let Some(e) = self.state.lock().endpoint_mut(endpoint.0) {
            e.muted = muted;
        }
    }

    fn set_endpoint_mono(&self, endpoint: EndpointId, mono: bool) {
        if let Some(e) = self.state.lock().endpoint_mut(endpoint.0) {
            e.mono = mono;
        }
    }

    fn attach_level_meter(
        &self,
        endpoint: EndpointId,
        cb: MeterCallback,
    ) -> Result<MeterId, String> {
        let mut state = self.state.lock();
        if state.endpoint(endpoint.0).is_none() {
            return Err("no such endpoint".to_string());
        }
        let id = state.alloc();
        state.meters.insert(
            id,
            FakeMeter {
                endpoint: endpoint.0,
                cb: Arc::from(cb),
            },
        );
        Ok(MeterId(id))
    }

    fn detach_level_meter(&self, meter: MeterId) {
        let mut state = self.state.lock();
        if state.meters.remove(&meter.0).is_some() {
            state.detached_meters += 1;
        }
    }

    fn attach_noise_filter(&self, endpoint: EndpointId) -> Result<FilterId, String> {
        let mut state = self.state.lock();
        let id = state.alloc();
        match state.endpoint_mut(endpoint.0) {
            Some(e) => {
                e.filter = Some(id);
                Ok(FilterId(id))
            }
            None => Err("no such endpoint".to_string()),
        }
    }

    fn detach_noise_filter(&self, endpoint: EndpointId, filter: FilterId) {
        if let Some(e) = self.state.lock().endpoint_mut(endpoint.0) {
            if e.filter == Some(filter.0) {
                e.filter = None;
            }
        }
    }

    fn create_scene(&self, _name: &str) -> Result<SceneId, String> {
        let mut state = self.state.lock();
        let id = state.alloc();
        state.scenes.push(id);
        Ok(SceneId(id))
    }

    fn destroy_scene(&self, scene: SceneId) {
        self.state.lock().scenes.retain(|id| *id != scene.0);
    }

    fn add_layer(&self, _scene: SceneId, _endpoint: EndpointId) -> Result<LayerId, String> {
        let mut state = self.state.lock();
        let id = state.alloc();
        state.layers.insert(
            id,
            FakeLayer {
                position: Vec2::default(),
                scale: Vec2::splat(1.0),
                crop: CropBox::default(),
            },
        );
        Ok(LayerId(id))
    }

    fn remove_layer(&self, layer: LayerId) {
        self.state.lock().layers.remove(&layer.0);
    }

    fn set_layer_transform(&self, layer: LayerId, position: Vec2, scale: Vec2, crop: CropBox) {
        if let Some(l) = self.state.lock().layers.get_mut(&layer.0) {
            l.position = position;
            l.scale = scale;
            l.crop = crop;
        }
    }

    fn available_video_encoders(&self) -> Vec<String> {
        vec![
            "obs_x264".to_string(),
            "h264_texture_amf".to_string(),
            "jim_nvenc".to_string(),
        ]
    }

    fn create_video_encoder(
        &self,
        type_id: &str,
        _name: &str,
        _settings: SettingsDoc,
    ) -> Result<EncoderId, String> {
        let mut state = self.state.lock();
        let id = state.alloc();
        state.encoders.insert(
            id,
            FakeEncoder {
                type_id: type_id.to_string(),
            },
        );
        Ok(EncoderId(id))
    }

    fn create_audio_encoder(
        &self,
        type_id: &str,
        _name: &str,
        _settings: SettingsDoc,
    ) -> Result<EncoderId, String> {
        let mut state = self.state.lock();
        let id = state.alloc();
        state.encoders.insert(
            id,
            FakeEncoder {
                type_id: type_id.to_string(),
            },
        );
        Ok(EncoderId(id))
    }

    fn destroy_encoder(&self, encoder: EncoderId) {
        self.state.lock().encoders.remove(&encoder.0);
    }

    fn bind_video_encoder(&self, _encoder: EncoderId) {}

    fn bind_audio_encoder(&self, _encoder: EncoderId) {}

    fn create_ring_sink(&self, settings: SettingsDoc) -> Result<SinkId, String> {
        let mut state = self.state.lock();
        let id = state.alloc();
        state.created_sinks += 1;
        state.sink_order.push(id);
        state.sinks.insert(
            id,
            FakeSink {
                ring: true,
                settings,
                active: false,
                video_encoder: None,
                audio_encoder: None,
            },
        );
        Ok(SinkId(id))
    }

    fn create_file_sink(&self, settings: SettingsDoc) -> Result<SinkId, String> {
        let mut state = self.state.lock();
        let id = state.alloc();
        state.created_sinks += 1;
        state.sink_order.push(id);
        state.sinks.insert(
            id,
            FakeSink {
                ring: false,
                settings,
                active: false,
                video_encoder: None,
                audio_encoder: None,
            },
        );
        Ok(SinkId(id))
    }

    fn destroy_sink(&self, sink: SinkId) {
        let mut state = self.state.lock();
        if state.sinks.remove(&sink.0).is_some() {
            state.destroyed_sinks += 1;
        }
    }

    fn update_sink_settings(&self, sink: SinkId, settings: SettingsDoc) {
        if let Some(s) = self.state.lock().sinks.get_mut(&sink.0) {
            s.settings = merged(&s.settings, settings);
        }
    }

    fn set_sink_video_encoder(&self, sink: SinkId, encoder: EncoderId) {
        if let Some(s) = self.state.lock().sinks.get_mut(&sink.0) {
            s.video_encoder = Some(encoder);
        }
    }

    fn set_sink_audio_encoder(&self, sink: SinkId, encoder: EncoderId) {
        if let Some(s) = self.state.lock().sinks.get_mut(&sink.0) {
            s.audio_encoder = Some(encoder);
        }
    }

    fn start_sink(&self, sink: SinkId) -> bool {
        {
            let mut state = self.state.lock();
            state.start_calls += 1;
            if let Some(message) = state.fail_start_message.take() {
                state.last_error = Some(message);
                return false;
            }
            match state.sinks.get_mut(&sink.0) {
                Some(s) => s.active = true,
                None => return false,
            }
        }
        self.fire(sink.0, &["starting", "start"], 0);
        true
    }

    fn stop_sink(&self, sink: SinkId) {
        {
            let mut state = self.state.lock();
            state.stop_calls += 1;
            if let Some(s) = state.sinks.get_mut(&sink.0) {
                s.active = false;
            }
        }
        self.fire(sink.0, &["stopping", "stop"], 0);
    }

    fn force_stop_sink(&self, sink: SinkId) {
        {
            let mut state = self.state.lock();
            state.force_stop_calls += 1;
            if let Some(s) = state.sinks.get_mut(&sink.0) {
                s.active = false;
            }
        }
        self.fire(sink.0, &["stop"], 0);
    }

    fn sink_active(&self, sink: SinkId) -> bool {
        self.state
            .lock()
            .sinks
            .get(&sink.0)
            .is_some_and(|s| s.active)
    }

    fn sink_convert(&self, sink: SinkId, offset_seconds: u32) -> bool {
        {
            let mut state = self.state.lock();
            state.convert_offsets.push(offset_seconds);
            if std::mem::take(&mut state.fail_next_convert) {
                state.last_error = Some("convert refused".to_string());
                return false;
            }
            let directory = state
                .sinks
                .get(&sink.0)
                .and_then(|s| s.settings.get("directory"))
                .and_then(|d| d.as_str())
                .unwrap_or("")
                .to_string();
            state.last_artifact = Some(format!("{directory}/replay-{offset_seconds}s.mp4"));
        }
        self.fire(sink.0, &["saved"], 0);
        true
    }

    fn last_artifact_path(&self, _sink: SinkId) -> Option<String> {
        self.state.lock().last_artifact.clone()
    }

    fn connect_signal(&self, sink: SinkId, signal: &str, cb: SignalCallback) -> SignalConnection {
        let mut state = self.state.lock();
        let id = state.alloc();
        state.signals.insert(
            id,
            FakeSignal {
                sink: sink.0,
                name: signal.to_string(),
                cb: Arc::from(cb),
            },
        );
        SignalConnection(id)
    }

    fn disconnect_signal(&self, connection: SignalConnection) {
        self.state.lock().signals.remove(&connection.0);
    }

    fn last_error(&self) -> Option<String> {
        self.state.lock().last_error.clone()
    }

    fn reset_media_context(&self, context: MediaContext) -> Result<(), ContextResetError> {
        let mut state = self.state.lock();
        if state.sinks.values().any(|s| s.active) {
            return Err(ContextResetError::CurrentlyActive);
        }
        state.context = Some(context);
        Ok(())
    }

    fn reset_audio_context(&self, sample_rate: u32, stereo: bool) -> Result<(), String> {
        self.state.lock().audio_context = Some((sample_rate, stereo));
        Ok(())
    }

    fn create_surface(
        &self,
        _window: WindowHandle,
        width: u32,
        height: u32,
    ) -> Result<SurfaceId, String> {
        let mut state = self.state.lock();
        if std::mem::take(&mut state.fail_next_create_surface) {
            return Err("surface creation refused".to_string());
        }
        let id = state.alloc();
        state.surfaces.insert(
            id,
            FakeSurface {
                size: (width, height),
                enabled: false,
            },
        );
        Ok(SurfaceId(id))
    }

    fn destroy_surface(&self, surface: SurfaceId) {
        self.state.lock().surfaces.remove(&surface.0);
        self.draw_callbacks.lock().remove(&surface.0);
    }

    fn resize_surface(&self, surface: SurfaceId, width: u32, height: u32) {
        if let Some(s) = self.state.lock().surfaces.get_mut(&surface.0) {
            s.size = (width, height);
        }
    }

    fn surface_size(&self, surface: SurfaceId) -> (u32, u32) {
        self.state
            .lock()
            .surfaces
            .get(&surface.0)
            .map(|s| s.size)
            .unwrap_or((0, 0))
    }

    fn set_surface_enabled(&self, surface: SurfaceId, enabled: bool) {
        if let Some(s) = self.state.lock().surfaces.get_mut(&surface.0) {
            s.enabled = enabled;
        }
    }

    fn set_draw_callback(&self, surface: SurfaceId, cb: DrawCallback) {
        self.draw_callbacks.lock().insert(surface.0, cb);
    }

    fn clear_draw_callback(&self, surface: SurfaceId) {
        self.draw_callbacks.lock().remove(&surface.0);
    }

    fn version(&self) -> String {
        "fake-engine 31.0".to_string()
    }
}

struct FakeWindow {
    bounds: (i32, i32, u32, u32),
    visible: bool,
}

#[derive(Default)]
struct WindowsState {
    next_id: u64,
    windows: HashMap<u64, FakeWindow>,
}

/// Scripted host window system.
#[derive(Default)]
pub struct FakeWindows {
    state: Mutex<WindowsState>,
}

impl FakeWindows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn window_count(&self) -> usize {
        self.state.lock().windows.len()
    }

    pub fn is_visible(&self) -> bool {
        let state = self.state.lock();
        state.windows.values().next().is_some_and(|w| w.visible)
    }

    pub fn bounds(&self) -> (i32, i32, u32, u32) {
        let state = self.state.lock();
        state
            .windows
            .values()
            .next()
            .map(|w| w.bounds)
            .unwrap_or((0, 0, 0, 0))
    }
}

impl WindowSystem for FakeWindows {
    fn create_child_window(&self, _parent: WindowHandle) -> Result<WindowId, String> {
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = state.next_id;
        state.windows.insert(
            id,
            FakeWindow {
                bounds: (0, 0, 0, 0),
                visible: false,
            },
        );
        Ok(WindowId(id))
    }

    fn set_bounds(&self, window: WindowId, x: i32, y: i32, width: u32, height: u32) {
        if let Some(w) = self.state.lock().windows.get_mut(&window.0) {
            w.bounds = (x, y, width, height);
        }
    }

    fn show(&self, window: WindowId) {
        if let Some(w) = self.state.lock().windows.get_mut(&window.0) {
            w.visible = true;
        }
    }

    fn hide(&self, window: WindowId) {
        if let Some(w) = self.state.lock().windows.get_mut(&window.0) {
            w.visible = false;
        }
    }

    fn destroy(&self, window: WindowId) {
        self.state.lock().windows.remove(&window.0);
    }

    fn native_handle(&self, window: WindowId) -> WindowHandle {
        WindowHandle(window.0 as usize)
    }
}

/// A `RenderPass` that records the draw operations of one frame.
#[derive(Default)]
pub struct RecordedPass {
    pub ortho: Option<(f32, f32, f32, f32)>,
    pub viewport: Option<(i32, i32, i32, i32)>,
    pub scene_drawn: bool,
    pub rects: Vec<(f32, f32, f32, f32, Rgba)>,
}

impl RenderPass for RecordedPass {
    fn set_ortho(&mut self, left: f32, right: f32, top: f32, bottom: f32) {
        self.ortho = Some((left, right, top, bottom));
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.viewport = Some((x, y, width, height));
    }

    fn draw_scene(&mut self) {
        self.scene_drawn = true;
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba) {
        self.rects.push((x, y, width, height, color));
    }
}
