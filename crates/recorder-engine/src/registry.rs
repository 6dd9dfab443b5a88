//! Named capture and audio endpoints, their meters and filters.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use recorder_ipc::EndpointKind;
use recorder_media::{EndpointId, FilterId, MediaEngine, MeterId, SettingsDoc};

use crate::error::{SessionError, SessionResult};
use crate::events::EventBridge;

struct EndpointEntry {
    id: EndpointId,
    kind: EndpointKind,
    meter: Option<MeterId>,
    filter: Option<FilterId>,
    last_size: (u32, u32),
}

/// Session-wide defaults applied to audio-input endpoints, existing and
/// future.
#[derive(Default, Clone, Copy)]
struct AudioFlags {
    mute_inputs: bool,
    force_mono: bool,
    suppression: bool,
}

struct RegistryInner {
    endpoints: HashMap<String, EndpointEntry>,
    flags: AudioFlags,
}

/// Owned arena of engine endpoints, keyed by the engine-assigned name.
///
/// Meter callbacks capture only the endpoint name and the event bridge, so
/// deleting an endpoint invalidates them without dangling references.
pub struct SourceRegistry {
    engine: Arc<dyn MediaEngine>,
    events: EventBridge,
    inner: Mutex<RegistryInner>,
}

impl SourceRegistry {
    pub fn new(engine: Arc<dyn MediaEngine>, events: EventBridge) -> Self {
        Self {
            engine,
            events,
            inner: Mutex::new(RegistryInner {
                endpoints: HashMap::new(),
                flags: AudioFlags::default(),
            }),
        }
    }

    /// Create an endpoint and register it under the name the engine
    /// actually assigned, which is returned.
    ///
    /// Audio kinds get a level meter attached; audio inputs additionally
    /// pick up the session-wide mute/mono/suppression defaults.
    #[instrument(name = "create_endpoint", skip(self, settings))]
    pub fn create(
        &self,
        requested: &str,
        kind: EndpointKind,
        settings: Option<SettingsDoc>,
    ) -> SessionResult<String> {
        let (id, actual) = self
            .engine
            .create_endpoint(requested, kind, settings)
            .map_err(SessionError::CreationFailed)?;

        if actual != requested {
            debug!(requested, actual, "engine renamed endpoint on collision");
        }

        let mut entry = EndpointEntry {
            id,
            kind,
            meter: None,
            filter: None,
            last_size: self.engine.endpoint_size(id),
        };

        let mut inner = self.inner.lock();

        if kind.is_audio() {
            match self.attach_meter(&actual, id) {
                Ok(meter) => entry.meter = Some(meter),
                Err(e) => {
                    self.engine.destroy_endpoint(id);
                    return Err(SessionError::CreationFailed(e));
                }
            }
        }

        if kind == EndpointKind::AudioInput {
            if inner.flags.suppression {
                match self.engine.attach_noise_filter(id) {
                    Ok(filter) => entry.filter = Some(filter),
                    Err(e) => warn!(name = %actual, "failed to attach noise filter: {}", e),
                }
            }
            if inner.flags.force_mono {
                self.engine.set_endpoint_mono(id, true);
            }
            if inner.flags.mute_inputs {
                self.engine.set_endpoint_muted(id, true);
            }
        }

        inner.endpoints.insert(actual.clone(), entry);
        info!(name = %actual, ?kind, "endpoint registered");
        Ok(actual)
    }

    /// Delete an endpoint. No-op with a warning if the name is unknown.
    #[instrument(name = "delete_endpoint", skip(self))]
    pub fn delete(&self, name: &str) {
        let entry = match self.inner.lock().endpoints.remove(name) {
            Some(entry) => entry,
            None => {
                warn!(name, "delete requested for unknown endpoint");
                return;
            }
        };

        // Detach callbacks before releasing the endpoint so an in-flight
        // engine callback cannot observe a dead resource.
        if let Some(meter) = entry.meter {
            self.engine.detach_level_meter(meter);
        }
        if let Some(filter) = entry.filter {
            self.engine.detach_noise_filter(entry.id, filter);
        }
        self.engine.destroy_endpoint(entry.id);
        info!(name, "endpoint released");
    }

    pub fn settings(&self, name: &str) -> SessionResult<SettingsDoc> {
        let inner = self.inner.lock();
        let entry = lookup(&inner, name)?;
        Ok(self.engine.endpoint_settings(entry.id))
    }

    /// Apply new settings and re-attach the level meter, so a device change
    /// cannot leave the meter bound to stale hardware. Emits a zero-valued
    /// level sample so a UI meter does not appear to hang.
    pub fn set_settings(&self, name: &str, settings: SettingsDoc) -> SessionResult<()> {
        let mut inner = self.inner.lock();
        let entry = lookup_mut(&mut inner, name)?;
        let id = entry.id;

        self.engine.update_endpoint_settings(id, settings);

        if let Some(meter) = entry.meter.take() {
            self.engine.detach_level_meter(meter);
            drop(inner);
            let meter = self
                .attach_meter(name, id)
                .map_err(SessionError::CreationFailed)?;
            if let Some(entry) = self.inner.lock().endpoints.get_mut(name) {
                entry.meter = Some(meter);
            }
            self.events.emit_level(name, 0.0);
        }

        Ok(())
    }

    pub fn properties_schema(&self, name: &str) -> SessionResult<SettingsDoc> {
        let inner = self.inner.lock();
        let entry = lookup(&inner, name)?;
        Ok(self.engine.endpoint_properties(entry.id))
    }

    /// Mute or unmute every audio-input endpoint, and endpoints created
    /// from now on.
    pub fn set_mute_all_inputs(&self, mute: bool) {
        let mut inner = self.inner.lock();
        inner.flags.mute_inputs = mute;
        for entry in audio_inputs(&inner) {
            self.engine.set_endpoint_muted(entry, mute);
        }
        info!(mute, "audio inputs mute updated");
    }

    /// Downmix every audio-input endpoint to mono, and endpoints created
    /// from now on.
    pub fn set_force_mono(&self, enabled: bool) {
        let mut inner = self.inner.lock();
        inner.flags.force_mono = enabled;
        for entry in audio_inputs(&inner) {
            self.engine.set_endpoint_mono(entry, enabled);
        }
        info!(enabled, "force mono updated");
    }

    /// Toggle noise suppression on every audio-input endpoint, and
    /// endpoints created from now on. Disabling releases the filters.
    pub fn set_audio_suppression(&self, enabled: bool) {
        let mut inner = self.inner.lock();
        inner.flags.suppression = enabled;

        for entry in inner.endpoints.values_mut() {
            if entry.kind != EndpointKind::AudioInput {
                continue;
            }
            if enabled {
                if entry.filter.is_none() {
                    match self.engine.attach_noise_filter(entry.id) {
                        Ok(filter) => entry.filter = Some(filter),
                        Err(e) => warn!("failed to attach noise filter: {}", e),
                    }
                }
            } else if let Some(filter) = entry.filter.take() {
                self.engine.detach_noise_filter(entry.id, filter);
            }
        }
        info!(enabled, "audio suppression updated");
    }

    /// Set an audio endpoint's volume, clamped to [0, 1]. Logged no-op for
    /// non-audio or unknown names.
    pub fn set_volume(&self, name: &str, volume: f32) {
        let inner = self.inner.lock();
        let entry = match inner.endpoints.get(name) {
            Some(entry) => entry,
            None => {
                warn!(name, "volume requested for unknown endpoint");
                return;
            }
        };
        if !entry.kind.is_audio() {
            warn!(name, "volume requested for non-audio endpoint");
            return;
        }
        self.engine.set_endpoint_volume(entry.id, volume.clamp(0.0, 1.0));
    }

    /// Engine handle and kind for a registered name.
    pub(crate) fn handle(&self, name: &str) -> Option<EndpointId> {
        self.inner.lock().endpoints.get(name).map(|entry| entry.id)
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.inner.lock().endpoints.contains_key(name)
    }

    /// Current native pixel size of a registered endpoint.
    pub(crate) fn native_size(&self, name: &str) -> Option<(u32, u32)> {
        let id = self.handle(name)?;
        Some(self.engine.endpoint_size(id))
    }

    /// Compare every endpoint's natural size to the last observation and
    /// emit a `Source` event per change. Invoked from the render hook; the
    /// engine sends no notification of its own for capture-size changes.
    pub(crate) fn detect_size_changes(&self) {
        let mut inner = self.inner.lock();
        for (name, entry) in inner.endpoints.iter_mut() {
            let current = self.engine.endpoint_size(entry.id);
            if current != entry.last_size {
                debug!(name = %name, ?current, "endpoint size changed");
                entry.last_size = current;
                self.events.emit_source_resized(name);
            }
        }
    }

    /// Release every registered endpoint.
    pub(crate) fn shutdown(&self) {
        let names: Vec<String> = self.inner.lock().endpoints.keys().cloned().collect();
        for name in names {
            self.delete(&name);
        }
    }

    fn attach_meter(&self, name: &str, id: EndpointId) -> Result<MeterId, String> {
        let events = self.events.clone();
        let name = name.to_string();
        self.engine.attach_level_meter(
            id,
            Box::new(move |magnitude| events.emit_level(&name, magnitude)),
        )
    }
}

fn lookup<'a>(inner: &'a RegistryInner, name: &str) -> SessionResult<&'a EndpointEntry> {
    inner
        .endpoints
        .get(name)
        .ok_or_else(|| SessionError::NotFound(name.to_string()))
}

fn lookup_mut<'a>(inner: &'a mut RegistryInner, name: &str) -> SessionResult<&'a mut EndpointEntry> {
    inner
        .endpoints
        .get_mut(name)
        .ok_or_else(|| SessionError::NotFound(name.to_string()))
}

fn audio_inputs(inner: &RegistryInner) -> Vec<EndpointId> {
    inner
        .endpoints
        .values()
        .filter(|entry| entry.kind == EndpointKind::AudioInput)
        .map(|entry| entry.id)
        .collect()
}
