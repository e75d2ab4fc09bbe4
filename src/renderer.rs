// src/renderer.rs
use eframe::egui::{self, Color32, Stroke};

use crate::background::Background;
use crate::raster::Rasterizer;
use crate::state::{EditorSession, Preview};
use crate::texture_manager::{TextureGenerationError, TextureManager};

const TEXTURE_CACHE_SIZE: usize = 256;
const PREVIEW_DASH: f32 = 6.0;
const PREVIEW_GAP: f32 = 4.0;

/// Composites the background, the shape layers and the preview onto the canvas
#[derive(Debug)]
pub struct Renderer {
    textures: TextureManager,
    ctx: egui::Context,
}

impl Renderer {
    /// Creates a new renderer bound to the app's egui context
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        Self::with_context(cc.egui_ctx.clone())
    }

    pub fn with_context(ctx: egui::Context) -> Self {
        Self {
            textures: TextureManager::new(TEXTURE_CACHE_SIZE),
            ctx,
        }
    }

    pub fn texture_count(&self) -> usize {
        self.textures.cache_size()
    }

    /// Renders one frame of the canvas occupying `rect`
    pub fn render<R: Rasterizer>(
        &mut self,
        painter: &egui::Painter,
        rect: egui::Rect,
        session: &EditorSession<R>,
        background: &Background,
    ) {
        self.textures.begin_frame();

        painter.rect_filled(rect, 0.0, Color32::WHITE);
        background.paint(painter, rect);

        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
        let mut live = Vec::new();
        for (key, layer) in session.layers() {
            live.push(key);
            let texture = self.textures.get_or_create_texture(
                key,
                layer.version,
                || {
                    if layer.is_empty() {
                        Err(TextureGenerationError::EmptyLayer)
                    } else {
                        Ok(layer.to_color_image())
                    }
                },
                &self.ctx,
            );
            match texture {
                Ok(id) => {
                    let target = layer.rect().translate(rect.min.to_vec2());
                    painter.image(id, target, uv, Color32::WHITE);
                }
                Err(err) => log::debug!("Skipping layer of {}: {}", key, err),
            }
        }
        self.textures.retain_shapes(&live);

        if let Some(preview) = session.preview() {
            paint_preview(painter, rect, &preview);
        }
    }
}

/// Draws dashed ghost geometry, translated from canvas to screen space
pub fn paint_preview(painter: &egui::Painter, rect: egui::Rect, preview: &Preview) {
    let stroke = Stroke::new(2.0, preview.color);
    let offset = rect.min.to_vec2();
    for path in &preview.paths {
        let points: Vec<egui::Pos2> = path.iter().map(|p| *p + offset).collect();
        painter.extend(egui::Shape::dashed_line(&points, stroke, PREVIEW_DASH, PREVIEW_GAP));
    }
}
