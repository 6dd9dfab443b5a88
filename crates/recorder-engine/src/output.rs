//! Sink and encoder lifecycle management.
//!
//! Owns the single active sink (ring buffer or direct file), the encoder
//! pair bound to it, and the global media-context parameters. The engine
//! does not stop a caller from reconfiguring a live output; the guards
//! here do.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use parking_lot::{Mutex, RwLock};
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use recorder_ipc::{BufferLimits, MediaContext, OutputSignal};
use recorder_media::{
    ContextResetError, EncoderId, MediaEngine, SettingsDoc, SignalConnection, SinkId,
};

use crate::error::{SessionError, SessionResult};
use crate::events::EventBridge;

const DEFAULT_VIDEO_ENCODER: &str = "obs_x264";
const AUDIO_ENCODER_TYPE: &str = "ffmpeg_aac";
const AUDIO_BITRATE_KBPS: u32 = 128;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H-%M-%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputState {
    Idle,
    Active,
}

struct OutputInner {
    state: OutputState,
    buffering: bool,
    limits: BufferLimits,
    recording_dir: Option<PathBuf>,
    video_encoder_type: String,
    video_encoder_settings: SettingsDoc,
    sink: SinkId,
    video_encoder: EncoderId,
    audio_encoder: EncoderId,
    signals: Vec<SignalConnection>,
    last_recording: Option<PathBuf>,
}

/// The sink & encoder state machine.
pub struct OutputManager {
    engine: Arc<dyn MediaEngine>,
    events: EventBridge,
    context: Arc<RwLock<MediaContext>>,
    inner: Mutex<OutputInner>,
}

impl OutputManager {
    /// Create the initial direct-file sink and its encoder pair.
    pub fn new(
        engine: Arc<dyn MediaEngine>,
        events: EventBridge,
        context: Arc<RwLock<MediaContext>>,
        recording_dir: Option<PathBuf>,
        limits: BufferLimits,
    ) -> SessionResult<Self> {
        let buffering = false;
        let (sink, signals) = create_sink(
            engine.as_ref(),
            &events,
            buffering,
            limits,
            recording_dir.as_deref(),
        )?;
        let (video_encoder, audio_encoder) =
            match create_encoders(engine.as_ref(), sink, DEFAULT_VIDEO_ENCODER, json!({})) {
                Ok(pair) => pair,
                Err(e) => {
                    release_sink(engine.as_ref(), sink, &signals);
                    return Err(e);
                }
            };

        Ok(Self {
            engine,
            events,
            context,
            inner: Mutex::new(OutputInner {
                state: OutputState::Idle,
                buffering,
                limits,
                recording_dir,
                video_encoder_type: DEFAULT_VIDEO_ENCODER.to_string(),
                video_encoder_settings: json!({}),
                sink,
                video_encoder,
                audio_encoder,
                signals,
                last_recording: None,
            }),
        })
    }

    /// Switch between ring-buffer and direct-file mode. Destroys and
    /// recreates the sink and both encoders. Fails with `Busy` while the
    /// sink is active.
    #[instrument(name = "set_mode", skip(self))]
    pub fn set_mode(&self, buffering: bool) -> SessionResult<()> {
        let mut inner = self.inner.lock();
        if inner.state == OutputState::Active {
            return Err(SessionError::Busy);
        }
        inner.buffering = buffering;
        self.rebuild(&mut inner)?;
        info!(buffering, "sink mode set");
        Ok(())
    }

    /// Change where recordings land. Recreates the sink and encoders.
    /// Fails with `Busy` while the sink is active.
    pub fn set_output_directory(&self, path: impl Into<PathBuf>) -> SessionResult<()> {
        let path = path.into();
        let mut inner = self.inner.lock();
        if inner.state == OutputState::Active {
            return Err(SessionError::Busy);
        }
        inner.recording_dir = if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        };
        self.rebuild(&mut inner)?;
        info!(dir = ?inner.recording_dir, "output directory set");
        Ok(())
    }

    /// Change the replay-buffer bounds. Recreates the sink and encoders.
    /// Fails with `Busy` while the sink is active.
    pub fn set_buffer_limits(&self, limits: BufferLimits) -> SessionResult<()> {
        let mut inner = self.inner.lock();
        if inner.state == OutputState::Active {
            return Err(SessionError::Busy);
        }
        inner.limits = limits;
        self.rebuild(&mut inner)?;
        info!(?limits, "buffer limits set");
        Ok(())
    }

    /// Select a different video encoder. Recreates only the video encoder.
    /// Fails with `Busy` while the sink is active.
    #[instrument(name = "set_video_encoder", skip(self, settings))]
    pub fn set_video_encoder(&self, type_id: &str, settings: SettingsDoc) -> SessionResult<()> {
        let mut inner = self.inner.lock();
        if inner.state == OutputState::Active {
            return Err(SessionError::Busy);
        }
        inner.video_encoder_type = type_id.to_string();
        inner.video_encoder_settings = settings;
        self.recreate_video_encoder(&mut inner)?;
        info!(type_id, "video encoder set");
        Ok(())
    }

    /// Reset the global media context, substituting defaults for
    /// out-of-range values, and rebind the video encoder to it.
    ///
    /// An engine refusal because the output is currently active is a soft
    /// failure: logged, nothing changes, and `Ok` is returned. Other
    /// refusals are hard errors.
    #[instrument(name = "set_media_context", skip(self))]
    pub fn set_media_context(&self, fps: u32, width: u32, height: u32) -> SessionResult<()> {
        let mut inner = self.inner.lock();
        let requested = MediaContext { fps, width, height }.sanitized();

        match self.engine.reset_media_context(requested) {
            Ok(()) => {
                *self.context.write() = requested;
                self.recreate_video_encoder(&mut inner)?;
                info!(?requested, "media context reset");
                Ok(())
            }
            Err(ContextResetError::CurrentlyActive) => {
                warn!("media context reset refused: output currently active");
                Ok(())
            }
            Err(ContextResetError::Failed(msg)) => Err(SessionError::Engine(msg)),
        }
    }

    /// Start filling the in-memory replay buffer.
    #[instrument(name = "start_buffer", skip(self))]
    pub fn start_buffer(&self) -> SessionResult<()> {
        let mut inner = self.inner.lock();
        if !inner.buffering {
            return Err(SessionError::NotConfigured("buffering mode is not enabled"));
        }
        if inner.state == OutputState::Active {
            warn!("replay buffer is already active");
            return Ok(());
        }
        if !self.engine.start_sink(inner.sink) {
            return Err(self.engine_error("failed to start the replay buffer"));
        }
        inner.state = OutputState::Active;
        info!("replay buffer started");
        Ok(())
    }

    /// Start a recording.
    ///
    /// Ring-buffer mode issues an asynchronous convert request reaching
    /// `offset_seconds` back from now; the result surfaces later as a
    /// `saved` event. Direct-file mode assigns a fresh timestamped path
    /// and starts the sink.
    #[instrument(name = "start_recording", skip(self))]
    pub fn start_recording(&self, offset_seconds: u32) -> SessionResult<()> {
        let mut inner = self.inner.lock();
        let dir = inner
            .recording_dir
            .clone()
            .ok_or(SessionError::NotConfigured("recording directory is not set"))?;

        if inner.buffering {
            if inner.state != OutputState::Active {
                return Err(SessionError::NotActive);
            }
            if !self.engine.sink_convert(inner.sink, offset_seconds) {
                return Err(self.engine_error("convert request was refused"));
            }
            debug!(offset_seconds, "convert requested");
            return Ok(());
        }

        if inner.state == OutputState::Active {
            warn!("recording is already active");
            return Ok(());
        }

        let path = dir.join(format!("{}.mp4", Local::now().format(TIMESTAMP_FORMAT)));
        self.engine.update_sink_settings(
            inner.sink,
            json!({ "path": path.to_string_lossy() }),
        );
        if !self.engine.start_sink(inner.sink) {
            return Err(self.engine_error("failed to start the recording"));
        }
        inner.last_recording = Some(path);
        inner.state = OutputState::Active;
        info!(path = ?inner.last_recording, "recording started");
        Ok(())
    }

    /// Request a graceful stop. Completion surfaces via the `stop` event.
    /// No-op with a warning if already idle.
    #[instrument(name = "stop_recording", skip(self))]
    pub fn stop_recording(&self) {
        let mut inner = self.inner.lock();
        if inner.state == OutputState::Idle {
            warn!("output is already idle");
            return;
        }
        self.engine.stop_sink(inner.sink);
        inner.state = OutputState::Idle;
        info!("stop requested");
    }

    /// Terminate immediately. The current artifact may be unflushed.
    #[instrument(name = "force_stop_recording", skip(self))]
    pub fn force_stop_recording(&self) {
        let mut inner = self.inner.lock();
        if inner.state == OutputState::Idle {
            warn!("output is already idle");
            return;
        }
        self.engine.force_stop_sink(inner.sink);
        inner.state = OutputState::Idle;
        info!("force stop requested");
    }

    /// Path of the most recent recording, or an empty string when none is
    /// known (logged).
    pub fn last_recording_path(&self) -> String {
        let inner = self.inner.lock();
        if inner.buffering {
            match self.engine.last_artifact_path(inner.sink) {
                Some(path) => path,
                None => {
                    warn!("engine reported no replay artifact");
                    String::new()
                }
            }
        } else {
            inner
                .last_recording
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default()
        }
    }

    /// Video encoder type ids the engine offers.
    pub fn available_video_encoders(&self) -> Vec<String> {
        self.engine.available_video_encoders()
    }

    pub(crate) fn is_active(&self) -> bool {
        self.inner.lock().state == OutputState::Active
    }

    /// Stop anything live and release the sink, encoders, and signal
    /// connections.
    pub(crate) fn shutdown(&self) {
        let mut inner = self.inner.lock();
        if inner.state == OutputState::Active {
            info!("force stopping active output");
            self.engine.force_stop_sink(inner.sink);
            inner.state = OutputState::Idle;
        }
        for connection in inner.signals.drain(..) {
            self.engine.disconnect_signal(connection);
        }
        self.engine.destroy_encoder(inner.video_encoder);
        self.engine.destroy_encoder(inner.audio_encoder);
        self.engine.destroy_sink(inner.sink);
    }

    /// Replace the sink and both encoders, building the replacements
    /// before the old set is released so a refusal leaves state intact.
    fn rebuild(&self, inner: &mut OutputInner) -> SessionResult<()> {
        let (sink, signals) = create_sink(
            self.engine.as_ref(),
            &self.events,
            inner.buffering,
            inner.limits,
            inner.recording_dir.as_deref(),
        )?;
        let (video_encoder, audio_encoder) = match create_encoders(
            self.engine.as_ref(),
            sink,
            &inner.video_encoder_type,
            inner.video_encoder_settings.clone(),
        ) {
            Ok(pair) => pair,
            Err(e) => {
                release_sink(self.engine.as_ref(), sink, &signals);
                return Err(e);
            }
        };

        for connection in inner.signals.drain(..) {
            self.engine.disconnect_signal(connection);
        }
        self.engine.destroy_encoder(inner.video_encoder);
        self.engine.destroy_encoder(inner.audio_encoder);
        self.engine.destroy_sink(inner.sink);

        inner.sink = sink;
        inner.signals = signals;
        inner.video_encoder = video_encoder;
        inner.audio_encoder = audio_encoder;
        Ok(())
    }

    /// Swap in a fresh video encoder bound to the current context and
    /// sink. The audio encoder is unaffected.
    fn recreate_video_encoder(&self, inner: &mut OutputInner) -> SessionResult<()> {
        let video = self
            .engine
            .create_video_encoder(
                &inner.video_encoder_type,
                "recording h264",
                inner.video_encoder_settings.clone(),
            )
            .map_err(SessionError::CreationFailed)?;
        self.engine.destroy_encoder(inner.video_encoder);
        self.engine.bind_video_encoder(video);
        self.engine.set_sink_video_encoder(inner.sink, video);
        inner.video_encoder = video;
        Ok(())
    }

    fn engine_error(&self, fallback: &str) -> SessionError {
        SessionError::Engine(
            self.engine
                .last_error()
                .unwrap_or_else(|| fallback.to_string()),
        )
    }
}

fn create_sink(
    engine: &dyn MediaEngine,
    events: &EventBridge,
    buffering: bool,
    limits: BufferLimits,
    dir: Option<&Path>,
) -> SessionResult<(SinkId, Vec<SignalConnection>)> {
    let sink = if buffering {
        let directory = dir
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        engine.create_ring_sink(json!({
            "max_time_sec": limits.max_seconds,
            "max_size_mb": limits.max_size_mb,
            "directory": directory,
            "format": TIMESTAMP_FORMAT,
            "extension": "mp4",
        }))
    } else {
        engine.create_file_sink(json!({}))
    }
    .map_err(SessionError::CreationFailed)?;

    // One owned context per (sink, signal) pair; it captures the signal
    // name and the bridge, never an engine handle.
    let signals = OutputSignal::all()
        .into_iter()
        .map(|signal| {
            let events = events.clone();
            engine.connect_signal(
                sink,
                signal.as_str(),
                Box::new(move |data| events.emit_output(signal, data.code)),
            )
        })
        .collect();

    Ok((sink, signals))
}

fn create_encoders(
    engine: &dyn MediaEngine,
    sink: SinkId,
    video_type: &str,
    video_settings: SettingsDoc,
) -> SessionResult<(EncoderId, EncoderId)> {
    let video = engine
        .create_video_encoder(video_type, "recording h264", video_settings)
        .map_err(SessionError::CreationFailed)?;
    let audio = match engine.create_audio_encoder(
        AUDIO_ENCODER_TYPE,
        "recording aac",
        json!({ "bitrate": AUDIO_BITRATE_KBPS }),
    ) {
        Ok(audio) => audio,
        Err(e) => {
            engine.destroy_encoder(video);
            return Err(SessionError::CreationFailed(e));
        }
    };

    engine.bind_video_encoder(video);
    engine.bind_audio_encoder(audio);
    engine.set_sink_video_encoder(sink, video);
    engine.set_sink_audio_encoder(sink, audio);
    Ok((video, audio))
}

fn release_sink(engine: &dyn MediaEngine, sink: SinkId, signals: &[SignalConnection]) {
    for connection in signals {
        engine.disconnect_signal(*connection);
    }
    engine.destroy_sink(sink);
}
