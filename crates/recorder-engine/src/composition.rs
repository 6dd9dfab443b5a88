//! The single scene and its layers.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

use recorder_ipc::{CropBox, LayerTransform, PixelSize, Vec2};
use recorder_media::{LayerId, MediaEngine, SceneId};

use crate::error::{SessionError, SessionResult};
use crate::registry::SourceRegistry;

struct LayerState {
    id: LayerId,
    position: Vec2,
    scale: Vec2,
    crop: CropBox,
}

/// A layer's effective on-canvas box, for the outline overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct OutlineBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// The one scene the session composes, with at most one layer per
/// endpoint. Transforms are mirrored here so get/set round-trips exactly;
/// native sizes always come from the engine at query time.
pub struct Composition {
    engine: Arc<dyn MediaEngine>,
    registry: Arc<SourceRegistry>,
    scene: SceneId,
    layers: Mutex<HashMap<String, LayerState>>,
}

impl Composition {
    pub fn new(engine: Arc<dyn MediaEngine>, registry: Arc<SourceRegistry>) -> SessionResult<Self> {
        let scene = engine
            .create_scene("recording scene")
            .map_err(SessionError::CreationFailed)?;
        Ok(Self {
            engine,
            registry,
            scene,
            layers: Mutex::new(HashMap::new()),
        })
    }

    /// Add the named endpoint to the scene with an identity transform.
    /// No-op with a warning if it already has a layer.
    pub fn add(&self, name: &str) -> SessionResult<()> {
        let endpoint = self
            .registry
            .handle(name)
            .ok_or_else(|| SessionError::NotFound(name.to_string()))?;

        let mut layers = self.layers.lock();
        if layers.contains_key(name) {
            warn!(name, "endpoint is already in the composition");
            return Ok(());
        }

        let id = self
            .engine
            .add_layer(self.scene, endpoint)
            .map_err(SessionError::CreationFailed)?;
        layers.insert(
            name.to_string(),
            LayerState {
                id,
                position: Vec2::default(),
                scale: Vec2::splat(1.0),
                crop: CropBox::default(),
            },
        );
        info!(name, "endpoint added to composition");
        Ok(())
    }

    /// Remove the named endpoint's layer. Does not destroy the endpoint.
    pub fn remove(&self, name: &str) {
        match self.layers.lock().remove(name) {
            Some(layer) => {
                self.engine.remove_layer(layer.id);
                info!(name, "endpoint removed from composition");
            }
            None => warn!(name, "endpoint is not in the composition"),
        }
    }

    /// Current transform of the named layer. `size` is the endpoint's
    /// native pixel size so the caller can compute scale itself.
    pub fn transform(&self, name: &str) -> SessionResult<LayerTransform> {
        let layers = self.layers.lock();
        let layer = layers
            .get(name)
            .ok_or_else(|| SessionError::NotFound(name.to_string()))?;
        let (width, height) = self
            .registry
            .native_size(name)
            .ok_or_else(|| SessionError::NotFound(name.to_string()))?;

        Ok(LayerTransform {
            position: layer.position,
            size: PixelSize { width, height },
            scale: layer.scale,
            crop: layer.crop,
        })
    }

    /// Update position, scale, and crop of the named layer. Size is
    /// intrinsic to the endpoint and never set here. No-op with a warning
    /// if the layer is missing.
    pub fn set_transform(&self, name: &str, position: Vec2, scale: Vec2, crop: CropBox) {
        let mut layers = self.layers.lock();
        let layer = match layers.get_mut(name) {
            Some(layer) => layer,
            None => {
                warn!(name, "transform requested for endpoint with no layer");
                return;
            }
        };
        layer.position = position;
        layer.scale = scale;
        layer.crop = crop;
        self.engine.set_layer_transform(layer.id, position, scale, crop);
    }

    /// Effective boxes of all layers, in canvas coordinates, for the
    /// outline overlay. Degenerate boxes are skipped.
    pub(crate) fn outline_boxes(&self) -> Vec<OutlineBox> {
        let layers = self.layers.lock();
        let mut boxes = Vec::with_capacity(layers.len());
        for (name, layer) in layers.iter() {
            let Some((width, height)) = self.registry.native_size(name) else {
                continue;
            };
            let cropped_w = width as f32 - (layer.crop.left + layer.crop.right) as f32;
            let cropped_h = height as f32 - (layer.crop.top + layer.crop.bottom) as f32;
            let box_w = cropped_w * layer.scale.x;
            let box_h = cropped_h * layer.scale.y;
            if box_w <= 0.0 || box_h <= 0.0 {
                continue;
            }
            boxes.push(OutlineBox {
                x: layer.position.x,
                y: layer.position.y,
                width: box_w,
                height: box_h,
            });
        }
        boxes
    }
}

impl Drop for Composition {
    fn drop(&mut self) {
        let layers = std::mem::take(&mut *self.layers.lock());
        for layer in layers.into_values() {
            self.engine.remove_layer(layer.id);
        }
        self.engine.destroy_scene(self.scene);
    }
}
