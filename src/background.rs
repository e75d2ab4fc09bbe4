use std::path::{Path, PathBuf};

use eframe::egui;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackgroundError {
    #[error("Failed to read background file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode background image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Dropped file has no accessible data: {0}")]
    NoData(String),
}

/// Decodes PNG/JPEG (or any format the image crate knows) into an egui image
pub fn decode_image(bytes: &[u8]) -> Result<egui::ColorImage, BackgroundError> {
    let img = image::load_from_memory(bytes)?;
    log::debug!("Decoded background image: {}x{}", img.width(), img.height());

    let rgba_image = img.to_rgba8();
    let size = [rgba_image.width() as usize, rgba_image.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba_image.as_raw()))
}

pub fn load_image_file(path: &Path) -> Result<egui::ColorImage, BackgroundError> {
    let bytes = std::fs::read(path)?;
    decode_image(&bytes)
}

/// Check if a file is an image based on MIME type or extension
fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        file.mime.starts_with("image/")
    } else if let Some(ext) = file.path.as_ref().and_then(|path| path.extension()) {
        let ext = ext.to_string_lossy().to_lowercase();
        matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp")
    } else {
        false
    }
}

/// The image drawn beneath every shape layer
#[derive(Default)]
pub struct Background {
    texture: Option<egui::TextureHandle>,
    source: Option<PathBuf>,
}

impl Background {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pixel size of the loaded image, used as the preferred canvas size
    pub fn size(&self) -> Option<egui::Vec2> {
        self.texture.as_ref().map(|t| t.size_vec2())
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Loads `path` as the background. On failure the current image is kept.
    pub fn load(&mut self, ctx: &egui::Context, path: &Path) -> Result<(), BackgroundError> {
        let image = load_image_file(path)?;
        self.set_image(ctx, &path.display().to_string(), image);
        self.source = Some(path.to_path_buf());
        log::info!("Loaded background {}", path.display());
        Ok(())
    }

    fn set_image(&mut self, ctx: &egui::Context, name: &str, image: egui::ColorImage) {
        self.texture = Some(ctx.load_texture(name, image, egui::TextureOptions::LINEAR));
        ctx.request_repaint();
    }

    /// Takes the first dropped image file as the new background.
    /// Returns true if the background changed.
    pub fn handle_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped.iter().find(|f| is_image_file(f)) else {
            for file in &dropped {
                log::warn!("Dropped file is not a supported type: {}", file.name);
            }
            return false;
        };

        let result = if let Some(bytes) = &file.bytes {
            log::info!("Processing image from memory: {} ({} bytes)", file.name, bytes.len());
            decode_image(bytes).map(|image| self.set_image(ctx, &file.name, image))
        } else if let Some(path) = &file.path {
            self.load(ctx, path)
        } else {
            Err(BackgroundError::NoData(file.name.clone()))
        };

        match result {
            Ok(()) => true,
            Err(err) => {
                log::warn!("{}", err);
                false
            }
        }
    }

    /// Draws the image stretched over `rect`
    pub fn paint(&self, painter: &egui::Painter, rect: egui::Rect) {
        if let Some(texture) = &self.texture {
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(texture.id(), rect, uv, egui::Color32::WHITE);
        }
    }
}

impl std::fmt::Debug for Background {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Background")
            .field("loaded", &self.texture.is_some())
            .field("source", &self.source)
            .finish()
    }
}

/// Preview files being dragged over the application
pub fn preview_files_being_dropped(ctx: &egui::Context) {
    use egui::{Align2, Color32, Id, LayerId, Order, TextStyle};

    if ctx.input(|i| i.raw.hovered_files.is_empty()) {
        return;
    }

    let text = ctx.input(|i| {
        let mut text = "Drop to set background:\n".to_owned();
        for file in &i.raw.hovered_files {
            if let Some(path) = &file.path {
                text += &format!("\n{}", path.display());
            } else {
                text += "\n(Path not available)";
            }
        }
        text
    });

    let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
    let screen_rect = ctx.screen_rect();
    painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
    painter.text(
        screen_rect.center(),
        Align2::CENTER_CENTER,
        text,
        TextStyle::Heading.resolve(&ctx.style()),
        Color32::WHITE,
    );
}
