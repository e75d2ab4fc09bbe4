use std::collections::HashMap;
use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use thiserror::Error;

use crate::shape::ShapeKey;

#[derive(Error, Debug)]
pub enum TextureGenerationError {
    #[error("Layer has no pixels")]
    EmptyLayer,
}

struct CachedTexture {
    version: u64,
    handle: TextureHandle,
    last_used_frame: u64,
}

/// GPU textures of rendered shape layers, one per shape.
///
/// A shape's texture is re-uploaded only when its layer version changes.
/// Beyond `capacity` entries the least recently drawn shapes are evicted.
pub struct TextureManager {
    entries: HashMap<ShapeKey, CachedTexture>,
    frame: u64,
    capacity: usize,
}

impl TextureManager {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            frame: 0,
            capacity,
        }
    }

    /// Call once per frame before drawing layers
    pub fn begin_frame(&mut self) {
        self.frame += 1;
    }

    /// Texture for `key` at `version`, uploading the image from `generate` on a miss
    pub fn get_or_create_texture<F>(
        &mut self,
        key: ShapeKey,
        version: u64,
        generate: F,
        ctx: &Context,
    ) -> Result<TextureId, TextureGenerationError>
    where
        F: FnOnce() -> Result<ColorImage, TextureGenerationError>,
    {
        if let Some(entry) = self.entries.get_mut(&key) {
            if entry.version == version {
                entry.last_used_frame = self.frame;
                return Ok(entry.handle.id());
            }
        }
        self.entries.remove(&key);

        let handle = ctx.load_texture(format!("{}_v{}", key, version), generate()?, TextureOptions::LINEAR);
        let id = handle.id();
        self.entries.insert(
            key,
            CachedTexture {
                version,
                handle,
                last_used_frame: self.frame,
            },
        );
        self.evict_least_recent();
        Ok(id)
    }

    /// Drops textures of shapes that no longer exist
    pub fn retain_shapes(&mut self, live: &[ShapeKey]) {
        self.entries.retain(|key, _| live.contains(key));
    }

    fn evict_least_recent(&mut self) {
        while self.entries.len() > self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used_frame)
                .map(|(key, _)| *key);
            match oldest {
                Some(key) => {
                    log::debug!("Evicting texture of {}", key);
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }

    pub fn cache_size(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    fn cached_version(&self, key: ShapeKey) -> Option<u64> {
        self.entries.get(&key).map(|entry| entry.version)
    }
}

impl std::fmt::Debug for TextureManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureManager")
            .field("cached", &self.entries.len())
            .field("frame", &self.frame)
            .field("capacity", &self.capacity)
            .finish()
    }
}
