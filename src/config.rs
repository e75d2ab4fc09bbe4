use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::geometry::HIT_MARGIN;
use crate::shape::{DEFAULT_STROKE_WIDTH, ShapeKind};

/// Editor settings, persisted between runs by eframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct EditorConfig {
    /// Pick tolerance around shapes, in device pixels
    pub hit_margin: f32,
    /// Stroke width given to new shapes
    pub stroke_width: u32,
    /// Shape kind selected at startup
    pub initial_shape: ShapeKind,
    /// Where "Export" writes the drawing summary
    pub export_path: PathBuf,
    /// Image shown beneath the drawing
    pub background_path: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            hit_margin: HIT_MARGIN,
            stroke_width: DEFAULT_STROKE_WIDTH,
            initial_shape: ShapeKind::Line,
            export_path: PathBuf::from("drawing.txt"),
            background_path: None,
        }
    }
}
