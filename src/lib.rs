#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod background;
pub mod config;
pub mod coords;
pub mod error;
pub mod geometry;
pub mod input;
pub mod panels;
pub mod raster;
pub mod registry;
pub mod renderer;
pub mod selection;
pub mod shape;
pub mod state;
pub mod texture_manager;

pub use app::DrawApp;
pub use config::EditorConfig;
pub use coords::{RelativePos, ViewportSize, to_absolute, to_device_pixel, to_relative};
pub use error::{EditorError, EditorResult};
pub use input::{InputEvent, InputHandler};
pub use raster::{Rasterizer, RenderedLayer, SoftwareRasterizer};
pub use registry::ShapeRegistry;
pub use renderer::Renderer;
pub use selection::Selection;
pub use shape::{Geometry, Shape, ShapeId, ShapeKey, ShapeKind};
pub use state::{EditorSession, Gesture, InteractionPhase, Preview, ShapeTypeChange};
