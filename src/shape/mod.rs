use egui::Color32;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

mod geometry;

pub use geometry::Geometry;

use crate::coords::RelativePos;
use crate::error::EditorError;
use crate::raster::RenderedLayer;

pub const DEFAULT_STROKE_WIDTH: u32 = 2;

/// Identifier of a shape, unique within its kind's registry
pub type ShapeId = usize;

/// The kinds of drawable primitives, in layering order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum ShapeKind {
    #[default]
    Line,
    Rectangle,
    Polyline,
}

impl ShapeKind {
    /// All kinds in compositing order: later kinds draw on top
    pub const ALL: [ShapeKind; 3] = [ShapeKind::Line, ShapeKind::Rectangle, ShapeKind::Polyline];

    pub fn label(self) -> &'static str {
        match self {
            ShapeKind::Line => "Line",
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Polyline => "PolyLine",
        }
    }

    /// The stroke colour a shape of this kind gets when no custom colour was given
    pub fn default_color(self) -> Color32 {
        match self {
            ShapeKind::Line => Color32::from_rgba_unmultiplied(227, 23, 138, 127),
            ShapeKind::Rectangle => Color32::from_rgba_unmultiplied(227, 149, 23, 127),
            ShapeKind::Polyline => Color32::from_rgba_unmultiplied(181, 107, 201, 127),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ShapeKind {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Line" => Ok(ShapeKind::Line),
            "Rectangle" => Ok(ShapeKind::Rectangle),
            "PolyLine" | "Polyline" => Ok(ShapeKind::Polyline),
            other => Err(EditorError::InvalidShapeType(other.to_owned())),
        }
    }
}

/// Colour of the shape being reshaped and of preview geometry (half-transparent red)
pub fn modifying_color() -> Color32 {
    Color32::from_rgba_unmultiplied(255, 0, 0, 127)
}

/// Colour of shapes in the selection
pub fn selection_color() -> Color32 {
    Color32::from_rgba_unmultiplied(23, 120, 227, 160)
}

/// Identifies a shape across all registries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeKey {
    pub kind: ShapeKind,
    pub id: ShapeId,
}

impl ShapeKey {
    pub fn new(kind: ShapeKind, id: ShapeId) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for ShapeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind.label(), self.id)
    }
}

/// Whether a shape is the active reshape target, and which handle is picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModifyingState {
    #[default]
    None,
    Modifying(Option<usize>),
}

/// One drawable primitive with its geometry, style and cached layer
#[derive(Clone, Serialize)]
pub struct Shape {
    id: ShapeId,
    geometry: Geometry,
    stroke_width: u32,
    custom_color: Option<Color32>,
    color: Color32,

    #[serde(skip)]
    modifying: ModifyingState,
    #[serde(skip)]
    layer: Option<RenderedLayer>,
    #[serde(skip)]
    layer_stale: bool,
}

// RenderedLayer holds a pixel buffer, keep it out of debug output
impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("key", &self.key())
            .field("geometry", &self.geometry)
            .field("color", &self.color)
            .field("stroke_width", &self.stroke_width)
            .field("modifying", &self.modifying)
            .field("layer_stale", &self.needs_rasterize())
            .finish()
    }
}

impl Shape {
    /// Create a new shape of `kind` whose first vertex is `first`
    pub fn new(id: ShapeId, kind: ShapeKind, first: RelativePos) -> Self {
        Self::from_geometry(id, Geometry::new(kind, first))
    }

    pub fn from_geometry(id: ShapeId, geometry: Geometry) -> Self {
        Self {
            id,
            color: geometry.kind().default_color(),
            geometry,
            stroke_width: DEFAULT_STROKE_WIDTH,
            custom_color: None,
            modifying: ModifyingState::None,
            layer: None,
            layer_stale: true,
        }
    }

    /// Use a custom colour; it survives every later colour reset
    pub fn with_color(mut self, color: Color32) -> Self {
        self.custom_color = Some(color);
        self.color = color;
        self.invalidate_layer();
        self
    }

    pub fn with_stroke_width(mut self, stroke_width: u32) -> Self {
        self.stroke_width = stroke_width.max(1);
        self.invalidate_layer();
        self
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    pub fn key(&self) -> ShapeKey {
        ShapeKey::new(self.kind(), self.id)
    }

    /// Display name such as `Line_0` or `PolyLine_3`
    pub fn name(&self) -> String {
        self.key().to_string()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn vertices(&self) -> Vec<RelativePos> {
        self.geometry.vertices()
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn stroke_width(&self) -> u32 {
        self.stroke_width
    }

    pub fn push_vertex(&mut self, point: RelativePos) -> bool {
        let pushed = self.geometry.push(point);
        if pushed {
            self.invalidate_layer();
        }
        pushed
    }

    /// Takes back the last polyline vertex
    pub fn pop_vertex(&mut self) -> Option<RelativePos> {
        let popped = self.geometry.pop_vertex();
        if popped.is_some() {
            self.invalidate_layer();
        }
        popped
    }

    pub fn move_handle(&mut self, index: usize, point: RelativePos) -> bool {
        let moved = self.geometry.move_handle(index, point);
        if moved {
            self.invalidate_layer();
        }
        moved
    }

    pub(crate) fn geometry_mut(&mut self) -> &mut Geometry {
        self.invalidate_layer();
        &mut self.geometry
    }

    pub fn modifying_state(&self) -> ModifyingState {
        self.modifying
    }

    pub fn is_modifying(&self) -> bool {
        matches!(self.modifying, ModifyingState::Modifying(_))
    }

    /// The handle picked for dragging, if the shape is being modified
    pub fn picked_handle(&self) -> Option<usize> {
        match self.modifying {
            ModifyingState::Modifying(index) => index,
            ModifyingState::None => None,
        }
    }

    pub fn start_modifying(&mut self) {
        self.modifying = ModifyingState::Modifying(None);
        self.highlight(modifying_color());
    }

    pub fn stop_modifying(&mut self) {
        self.modifying = ModifyingState::None;
        self.restore_color();
    }

    /// Records the picked handle. Indices past the movable handles are refused.
    pub fn pick_handle(&mut self, index: Option<usize>) -> bool {
        if !self.is_modifying() {
            return false;
        }
        if let Some(index) = index {
            if index >= self.geometry.movable_handle_count() {
                return false;
            }
        }
        self.modifying = ModifyingState::Modifying(index);
        true
    }

    /// Temporarily draw the shape in another colour
    pub fn highlight(&mut self, color: Color32) {
        if self.color != color {
            self.color = color;
            self.invalidate_layer();
        }
    }

    /// Back to the custom colour, or the kind's default
    pub fn restore_color(&mut self) {
        let color = self.custom_color.unwrap_or_else(|| self.kind().default_color());
        self.highlight(color);
    }

    pub fn layer(&self) -> Option<&RenderedLayer> {
        self.layer.as_ref()
    }

    pub fn set_layer(&mut self, layer: RenderedLayer) {
        self.layer = Some(layer);
        self.layer_stale = false;
    }

    pub fn needs_rasterize(&self) -> bool {
        self.layer_stale || self.layer.is_none()
    }

    /// Mark the rendered layer as out of date (geometry, style or viewport changed)
    pub fn invalidate_layer(&mut self) {
        self.layer_stale = true;
    }
}
