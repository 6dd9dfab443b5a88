//! GPU preview surface and the per-frame composition hook.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use recorder_ipc::{MediaContext, PreviewInfo};
use recorder_media::{
    DrawCallback, MediaEngine, Rgba, SurfaceId, WindowHandle, WindowId, WindowSystem,
};

use crate::composition::Composition;
use crate::error::{SessionError, SessionResult};
use crate::registry::SourceRegistry;

const OUTLINE_THICKNESS: f32 = 4.0;
const OUTLINE_COLOR: Rgba = Rgba::new(255, 120, 0, 255);

/// Reported when the surface does not exist yet.
const FALLBACK_INFO: PreviewInfo = PreviewInfo {
    canvas_width: 1920,
    canvas_height: 1080,
    surface_width: 1920,
    surface_height: 1080,
};

struct PreviewInner {
    window: Option<WindowId>,
    surface: Option<SurfaceId>,
}

/// Owns the preview child window, its GPU surface, and the render hook.
///
/// Window visibility and the render-enabled flag are independent: `show`/
/// `hide` touch only the OS window, `configure` enables rendering, and
/// `disable` clears both to release GPU work under memory pressure.
pub struct PreviewController {
    engine: Arc<dyn MediaEngine>,
    windows: Arc<dyn WindowSystem>,
    context: Arc<RwLock<MediaContext>>,
    registry: Arc<SourceRegistry>,
    composition: Arc<Composition>,
    draw_outline: Arc<AtomicBool>,
    inner: Mutex<PreviewInner>,
}

impl PreviewController {
    pub fn new(
        engine: Arc<dyn MediaEngine>,
        windows: Arc<dyn WindowSystem>,
        context: Arc<RwLock<MediaContext>>,
        registry: Arc<SourceRegistry>,
        composition: Arc<Composition>,
    ) -> Self {
        Self {
            engine,
            windows,
            context,
            registry,
            composition,
            draw_outline: Arc::new(AtomicBool::new(false)),
            inner: Mutex::new(PreviewInner {
                window: None,
                surface: None,
            }),
        }
    }

    /// Create the child window and GPU surface if they do not exist yet.
    /// Idempotent: existing resources are reused.
    pub fn init(&self, parent: WindowHandle) -> SessionResult<()> {
        let mut inner = self.inner.lock();

        let window = match inner.window {
            Some(window) => window,
            None => {
                let window = self
                    .windows
                    .create_child_window(parent)
                    .map_err(SessionError::CreationFailed)?;
                inner.window = Some(window);
                window
            }
        };

        if inner.surface.is_none() {
            let handle = self.windows.native_handle(window);
            match self.engine.create_surface(handle, 0, 0) {
                Ok(surface) => {
                    self.engine.set_surface_enabled(surface, false);
                    self.engine.set_draw_callback(surface, self.render_hook());
                    inner.surface = Some(surface);
                    info!("preview surface created");
                }
                Err(e) => {
                    self.windows.destroy(window);
                    inner.window = None;
                    return Err(SessionError::CreationFailed(e));
                }
            }
        }

        Ok(())
    }

    /// Reposition and resize the preview, and enable rendering. Visibility
    /// is controlled separately by `show`/`hide`.
    pub fn configure(&self, x: i32, y: i32, width: u32, height: u32) {
        let inner = self.inner.lock();
        let (Some(window), Some(surface)) = (inner.window, inner.surface) else {
            warn!("preview configure requested before init");
            return;
        };
        self.windows.set_bounds(window, x, y, width, height);
        self.engine.resize_surface(surface, width, height);
        self.engine.set_surface_enabled(surface, true);
    }

    pub fn show(&self) {
        match self.inner.lock().window {
            Some(window) => self.windows.show(window),
            None => warn!("no preview window to show"),
        }
    }

    pub fn hide(&self) {
        match self.inner.lock().window {
            Some(window) => self.windows.hide(window),
            None => warn!("no preview window to hide"),
        }
    }

    /// Hide the window and stop rendering entirely.
    pub fn disable(&self) {
        let inner = self.inner.lock();
        if let Some(window) = inner.window {
            self.windows.hide(window);
        }
        if let Some(surface) = inner.surface {
            self.engine.set_surface_enabled(surface, false);
        }
        info!("preview disabled");
    }

    /// Canvas and back-buffer dimensions. Never fails: reports a fixed
    /// default with a warning while the surface does not exist.
    pub fn info(&self) -> PreviewInfo {
        let inner = self.inner.lock();
        match inner.surface {
            Some(surface) => {
                let context = *self.context.read();
                let (surface_width, surface_height) = self.engine.surface_size(surface);
                PreviewInfo {
                    canvas_width: context.width,
                    canvas_height: context.height,
                    surface_width,
                    surface_height,
                }
            }
            None => {
                warn!("preview surface does not exist yet");
                FALLBACK_INFO
            }
        }
    }

    /// Toggle the layer outline overlay.
    pub fn set_draw_outline(&self, enabled: bool) {
        self.draw_outline.store(enabled, Ordering::Relaxed);
    }

    /// Release the surface and child window.
    pub(crate) fn shutdown(&self) {
        let mut inner = self.inner.lock();
        if let Some(surface) = inner.surface.take() {
            self.engine.clear_draw_callback(surface);
            self.engine.set_surface_enabled(surface, false);
            self.engine.destroy_surface(surface);
        }
        if let Some(window) = inner.window.take() {
            self.windows.destroy(window);
        }
    }

    /// Per-frame hook, invoked by the engine on the render thread.
    ///
    /// Captures shared handles by name-keyed `Arc`, never engine handles,
    /// so endpoint deletion cannot leave it dangling. Its only writes are
    /// the size-change bookkeeping inside the registry.
    fn render_hook(&self) -> DrawCallback {
        let registry = Arc::clone(&self.registry);
        let composition = Arc::clone(&self.composition);
        let context = Arc::clone(&self.context);
        let draw_outline = Arc::clone(&self.draw_outline);

        Box::new(move |pass, surface_width, surface_height| {
            let context = *context.read();
            let base_width = context.width as f32;
            let base_height = context.height as f32;

            let scale = f32::min(
                surface_width as f32 / base_width,
                surface_height as f32 / base_height,
            );
            let off_x = (surface_width as f32 - scale * base_width) / 2.0;
            let off_y = (surface_height as f32 - scale * base_height) / 2.0;

            pass.set_ortho(0.0, base_width, 0.0, base_height);
            pass.set_viewport(
                off_x.round() as i32,
                off_y.round() as i32,
                (scale * base_width).round() as i32,
                (scale * base_height).round() as i32,
            );
            pass.draw_scene();

            if draw_outline.load(Ordering::Relaxed) {
                // Canvas coordinates; the viewport above already applies
                // the letterbox transform.
                for b in composition.outline_boxes() {
                    pass.fill_rect(b.x, b.y, b.width, OUTLINE_THICKNESS, OUTLINE_COLOR);
                    pass.fill_rect(
                        b.x,
                        b.y + b.height - OUTLINE_THICKNESS,
                        b.width,
                        OUTLINE_THICKNESS,
                        OUTLINE_COLOR,
                    );
                    pass.fill_rect(b.x, b.y, OUTLINE_THICKNESS, b.height, OUTLINE_COLOR);
                    pass.fill_rect(
                        b.x + b.width - OUTLINE_THICKNESS,
                        b.y,
                        OUTLINE_THICKNESS,
                        b.height,
                        OUTLINE_COLOR,
                    );
                }
            }

            registry.detect_size_changes();
        })
    }
}
