use egui::{Key, Modifiers, PointerButton, Pos2, Rect};
use log::{debug, info, warn};
use serde::Serialize;
use std::path::Path;

use super::editor_state::{Gesture, InteractionPhase, Preview, ShapeTypeChange, rect_outline};
use crate::config::EditorConfig;
use crate::coords::{RelativePos, ViewportSize, to_absolute, to_relative};
use crate::error::{EditorError, EditorResult};
use crate::geometry::{contained_in, hit_test, nearest_vertex, to_device_path};
use crate::input::InputEvent;
use crate::raster::{Rasterizer, RenderedLayer, SoftwareRasterizer};
use crate::registry::ShapeRegistry;
use crate::selection::Selection;
use crate::shape::{Geometry, Shape, ShapeKey, ShapeKind, modifying_color, selection_color};

/// One editor instance: committed shapes, the gesture in progress and the
/// selection, driven serially by the host's event handlers.
#[derive(Debug)]
pub struct EditorSession<R: Rasterizer = SoftwareRasterizer> {
    registry: ShapeRegistry,
    gesture: Gesture,
    selection: Selection,
    /// Last pointer position seen during a gesture, for preview geometry
    pending_cursor: Option<RelativePos>,
    tracking: bool,
    marquee_armed: bool,
    active_kind: ShapeKind,
    deferred_kind: Option<ShapeKind>,
    viewport: ViewportSize,
    config: EditorConfig,
    rasterizer: R,
    redraw_requested: bool,
    /// The latest press appended a polyline vertex; a double-click takes it back
    press_appended_vertex: bool,
}

/// Re-rasterizes a shape if its layer is stale. Skipped for an empty viewport.
fn refresh_layer<R: Rasterizer>(rasterizer: &mut R, shape: &mut Shape, viewport: ViewportSize) {
    if viewport.is_empty() || !shape.needs_rasterize() {
        return;
    }
    let path = to_device_path(shape.geometry(), viewport);
    let layer = rasterizer.rasterize(&path, shape.color(), shape.stroke_width(), viewport);
    shape.set_layer(layer);
}

impl EditorSession<SoftwareRasterizer> {
    pub fn new(viewport: ViewportSize, config: EditorConfig) -> Self {
        Self::with_rasterizer(viewport, config, SoftwareRasterizer::new())
    }
}

impl<R: Rasterizer> EditorSession<R> {
    pub fn with_rasterizer(viewport: ViewportSize, config: EditorConfig, rasterizer: R) -> Self {
        Self {
            registry: ShapeRegistry::new(),
            gesture: Gesture::Idle,
            selection: Selection::new(),
            pending_cursor: None,
            tracking: false,
            marquee_armed: false,
            active_kind: config.initial_shape,
            deferred_kind: None,
            viewport,
            config,
            rasterizer,
            redraw_requested: false,
            press_appended_vertex: false,
        }
    }

    // Accessors

    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// The shape under construction, not yet in the registry
    pub fn editing_shape(&self) -> Option<&Shape> {
        self.gesture.editing_shape()
    }

    /// The committed shape being reshaped
    pub fn modifying_shape(&self) -> Option<&Shape> {
        self.gesture.modifying_key().and_then(|key| self.registry.get(key))
    }

    pub fn active_shape_type(&self) -> ShapeKind {
        self.active_kind
    }

    pub fn marquee_mode(&self) -> bool {
        self.marquee_armed
    }

    /// Whether the host should follow pointer moves for preview rendering
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn phase(&self) -> InteractionPhase {
        match &self.gesture {
            Gesture::Idle => InteractionPhase::Idle,
            Gesture::Constructing(shape) => InteractionPhase::Constructing {
                kind: shape.kind(),
                point_count: shape.geometry().vertex_count(),
            },
            Gesture::Modifying(key) => match self.registry.get(*key).and_then(Shape::picked_handle) {
                Some(handle) => InteractionPhase::ModifyingDrag { key: *key, handle },
                None => InteractionPhase::ModifyingPick(*key),
            },
            Gesture::Marquee { .. } if self.pending_cursor.is_some() => InteractionPhase::MarqueeSelecting,
            Gesture::Marquee { .. } => InteractionPhase::MarqueeAnchored,
        }
    }

    /// Returns true once after any change that needs a repaint
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    /// Rendered layers in compositing order: committed shapes by kind, then
    /// the shape under construction on top.
    pub fn layers(&self) -> impl Iterator<Item = (ShapeKey, &RenderedLayer)> {
        self.registry
            .iter()
            .chain(self.gesture.editing_shape())
            .filter_map(|shape| shape.layer().map(|layer| (shape.key(), layer)))
    }

    // Event entry points

    pub fn handle_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerDown { position, button, modifiers } => {
                self.on_pointer_down(*position, *button, *modifiers)
            }
            InputEvent::PointerUp { position, button } => self.on_pointer_up(*position, *button),
            InputEvent::PointerMove { position } => self.on_pointer_move(*position),
            InputEvent::DoubleClick { position, button } => self.on_double_click(*position, *button),
            InputEvent::KeyDown { key } => self.on_key_down(*key),
            InputEvent::Resized { size } => self.on_viewport_resized(*size),
        }
    }

    pub fn on_pointer_down(&mut self, position: Pos2, button: PointerButton, modifiers: Modifiers) {
        match button {
            PointerButton::Primary if modifiers.command || modifiers.ctrl => {
                self.select_at(position);
            }
            PointerButton::Primary => self.on_primary_press(position),
            PointerButton::Secondary => self.on_secondary_press(position),
            _ => {}
        }
    }

    /// Releases carry no meaning: every gesture step is confirmed by a press
    pub fn on_pointer_up(&mut self, _position: Pos2, _button: PointerButton) {}

    /// Records the pointer for preview rendering. Never touches the registry.
    pub fn on_pointer_move(&mut self, position: Pos2) {
        if self.gesture.is_idle() {
            return;
        }
        if let Some(point) = to_relative(position, self.viewport) {
            self.pending_cursor = Some(point);
            self.request_redraw();
        }
    }

    /// Finishes a polyline under construction; ignored otherwise
    pub fn on_double_click(&mut self, _position: Pos2, button: PointerButton) {
        if button != PointerButton::Primary {
            return;
        }
        let appended = std::mem::take(&mut self.press_appended_vertex);
        match &mut self.gesture {
            Gesture::Constructing(shape) if shape.kind() == ShapeKind::Polyline => {
                // the second press of the double-click already added a vertex
                if appended {
                    if let Some(vertex) = shape.pop_vertex() {
                        debug!("Dropped double-click vertex {} from {}", vertex, shape.name());
                    }
                }
                self.finish_construction();
            }
            _ => debug!("Ignoring double-click in phase {}", self.phase().name()),
        }
    }

    pub fn on_key_down(&mut self, key: Key) {
        match key {
            Key::Delete | Key::Backspace => {
                self.delete_selection();
            }
            Key::Escape => self.cancel_gesture(),
            _ => {}
        }
    }

    /// Stores the new size and re-projects every shape onto it
    pub fn on_viewport_resized(&mut self, size: ViewportSize) {
        if size == self.viewport {
            return;
        }
        self.viewport = size;
        if size.is_empty() {
            debug!("Viewport is empty, skipping re-rasterization");
            return;
        }

        for shape in self.registry.iter_mut() {
            shape.invalidate_layer();
            refresh_layer(&mut self.rasterizer, shape, size);
        }
        if let Gesture::Constructing(shape) = &mut self.gesture {
            shape.invalidate_layer();
            refresh_layer(&mut self.rasterizer, shape, size);
        }
        debug!("Re-rasterized {} shapes for {}x{}", self.registry.len(), size.width, size.height);
        self.request_redraw();
    }

    // Host controls

    /// Changes the kind of shape new clicks create. While a shape is under
    /// construction the change is deferred until that construction ends.
    pub fn set_active_shape_type(&mut self, kind: ShapeKind) -> ShapeTypeChange {
        if let Gesture::Constructing(shape) = &self.gesture {
            if shape.kind() != kind {
                debug!("Deferring switch to {} until {} is finished", kind, shape.name());
                self.deferred_kind = Some(kind);
                return ShapeTypeChange::Deferred;
            }
        }
        self.active_kind = kind;
        self.deferred_kind = None;
        ShapeTypeChange::Applied
    }

    /// Arms or disarms marquee selection. Disarming drops a pending anchor.
    pub fn set_marquee_mode(&mut self, armed: bool) {
        self.marquee_armed = armed;
        if !armed && matches!(self.gesture, Gesture::Marquee { .. }) {
            self.cancel_gesture();
        }
    }

    /// Drops the shape under construction or a marquee anchor, or ends the
    /// current modification.
    pub fn cancel_gesture(&mut self) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => return,
            Gesture::Constructing(shape) => {
                debug!("Discarded {} under construction", shape.name());
                self.apply_deferred_kind();
            }
            Gesture::Modifying(key) => {
                self.gesture = Gesture::Modifying(key);
                self.end_modifying();
            }
            Gesture::Marquee { .. } => debug!("Marquee cancelled"),
        }
        self.tracking = false;
        self.pending_cursor = None;
        self.request_redraw();
    }

    /// Makes a committed shape the reshape target.
    ///
    /// Rejected while another shape is being modified, or while a
    /// construction or marquee is in progress; the active state is left as is.
    pub fn begin_modifying(&mut self, key: ShapeKey) -> EditorResult<()> {
        match &self.gesture {
            Gesture::Idle => {}
            Gesture::Modifying(active) => {
                return Err(EditorError::AlreadyModifying {
                    active: *active,
                    requested: key,
                });
            }
            _ => {
                return Err(EditorError::GestureInProgress {
                    gesture: self.phase().name(),
                    requested: key,
                });
            }
        }
        if !self.registry.contains(key) {
            return Err(EditorError::UnknownShape(key));
        }

        self.clear_selection();
        let viewport = self.viewport;
        if let Some(shape) = self.registry.get_mut(key) {
            shape.start_modifying();
            refresh_layer(&mut self.rasterizer, shape, viewport);
        }
        self.gesture = Gesture::Modifying(key);
        info!("Start modifying {}", key);
        self.request_redraw();
        Ok(())
    }

    /// Ends the current modification, restoring the shape's colour
    pub fn end_modifying(&mut self) -> Option<ShapeKey> {
        let key = self.gesture.modifying_key()?;
        self.gesture = Gesture::Idle;
        self.tracking = false;
        self.pending_cursor = None;

        let viewport = self.viewport;
        if let Some(shape) = self.registry.get_mut(key) {
            shape.stop_modifying();
            refresh_layer(&mut self.rasterizer, shape, viewport);
        }
        info!("Stop modifying {}", key);
        self.request_redraw();
        Some(key)
    }

    /// First committed shape within the hit margin of `position`, scanning
    /// lines, then rectangles, then polylines.
    pub fn shape_at(&self, position: Pos2) -> Option<ShapeKey> {
        self.registry
            .iter()
            .find(|shape| hit_test(shape, position, self.config.hit_margin, self.viewport))
            .map(Shape::key)
    }

    /// Adds the shape under `position` to the selection (modifier-click).
    /// Only honoured while no gesture is in progress.
    pub fn select_at(&mut self, position: Pos2) -> Option<ShapeKey> {
        if !self.gesture.is_idle() {
            debug!("Ignoring selection click in phase {}", self.phase().name());
            return None;
        }
        let key = self.shape_at(position)?;
        self.select(key);
        Some(key)
    }

    fn select(&mut self, key: ShapeKey) {
        if !self.selection.add(key) {
            return;
        }
        let viewport = self.viewport;
        if let Some(shape) = self.registry.get_mut(key) {
            shape.highlight(selection_color());
            refresh_layer(&mut self.rasterizer, shape, viewport);
        }
        self.request_redraw();
    }

    /// Deselects everything, restoring default colours
    pub fn clear_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        let viewport = self.viewport;
        for key in self.selection.take() {
            if let Some(shape) = self.registry.get_mut(key) {
                shape.restore_color();
                refresh_layer(&mut self.rasterizer, shape, viewport);
            }
        }
        self.request_redraw();
    }

    /// Removes every selected shape from the registry
    pub fn delete_selection(&mut self) -> usize {
        let mut removed = 0;
        for key in self.selection.take() {
            if self.registry.remove(key).is_some() {
                removed += 1;
            }
        }
        if removed > 0 {
            info!("Deleted {} selected shapes", removed);
            self.request_redraw();
        }
        removed
    }

    // Primary and secondary presses

    fn on_primary_press(&mut self, position: Pos2) {
        self.press_appended_vertex = false;
        let Some(point) = to_relative(position, self.viewport) else {
            debug!("Ignoring click on an empty viewport");
            return;
        };

        if let Some(anchor) = self.gesture.marquee_anchor() {
            self.complete_marquee(anchor, point);
            return;
        }
        if self.marquee_armed && self.gesture.is_idle() {
            self.gesture = Gesture::Marquee { anchor: point };
            self.tracking = true;
            debug!("Marquee anchored at {}", point);
            return;
        }
        if !self.selection.is_empty() {
            self.clear_selection();
            return;
        }

        match self.gesture.modifying_key() {
            Some(key) => self.modify_press(key, position, point),
            None => self.construct_press(point),
        }
    }

    fn on_secondary_press(&mut self, position: Pos2) {
        if self.end_modifying().is_some() {
            return;
        }
        if !self.gesture.is_idle() {
            debug!("Ignoring right-click in phase {}", self.phase().name());
            return;
        }
        if let Some(key) = self.shape_at(position) {
            if let Err(err) = self.begin_modifying(key) {
                warn!("{}", err);
            }
        }
    }

    /// First press picks the nearest handle, the next one drops it at the pointer
    fn modify_press(&mut self, key: ShapeKey, position: Pos2, point: RelativePos) {
        let viewport = self.viewport;
        let Some(shape) = self.registry.get_mut(key) else {
            warn!("Shape {} under modification is gone", key);
            self.gesture = Gesture::Idle;
            return;
        };

        match shape.picked_handle() {
            None => {
                if let Some((_, index)) = nearest_vertex(shape, position, viewport) {
                    if shape.pick_handle(Some(index)) {
                        self.tracking = true;
                        debug!("Picked handle {} of {}", index, key);
                    }
                }
            }
            Some(index) => {
                shape.move_handle(index, point);
                shape.pick_handle(None);
                self.tracking = false;
                self.pending_cursor = None;
                info!("Moved handle {} of {} to {}", index, key, point);
            }
        }
        refresh_layer(&mut self.rasterizer, shape, viewport);
        self.request_redraw();
    }

    fn construct_press(&mut self, point: RelativePos) {
        let viewport = self.viewport;
        match &mut self.gesture {
            Gesture::Constructing(shape) => {
                let pushed = shape.push_vertex(point);
                if shape.kind() == ShapeKind::Polyline {
                    self.press_appended_vertex = pushed;
                    refresh_layer(&mut self.rasterizer, shape, viewport);
                } else {
                    self.finish_construction();
                }
            }
            _ => {
                let kind = self.active_kind;
                let id = self.registry.allocate_id(kind);
                let shape = Shape::new(id, kind, point).with_stroke_width(self.config.stroke_width);
                debug!("Started {} at {}", shape.name(), point);
                self.gesture = Gesture::Constructing(shape);
                self.tracking = true;
            }
        }
        self.request_redraw();
    }

    /// Promotes the shape under construction into the registry
    fn finish_construction(&mut self) {
        let Gesture::Constructing(mut shape) = std::mem::take(&mut self.gesture) else {
            return;
        };
        self.tracking = false;
        self.pending_cursor = None;

        if !shape.geometry().is_complete() {
            debug!("Dropping incomplete {}", shape.name());
        } else {
            refresh_layer(&mut self.rasterizer, &mut shape, self.viewport);
            info!("Committed {} with {} vertices", shape.name(), shape.geometry().vertex_count());
            self.registry.insert(shape);
        }
        self.apply_deferred_kind();
        self.request_redraw();
    }

    fn apply_deferred_kind(&mut self) {
        if let Some(kind) = self.deferred_kind.take() {
            debug!("Applying deferred switch to {}", kind);
            self.active_kind = kind;
        }
    }

    fn complete_marquee(&mut self, anchor: RelativePos, point: RelativePos) {
        self.gesture = Gesture::Idle;
        self.tracking = false;
        self.pending_cursor = None;
        self.clear_selection();

        let rect = Rect::from_two_pos(to_absolute(anchor, self.viewport), to_absolute(point, self.viewport));
        let hits: Vec<ShapeKey> = self
            .registry
            .iter()
            .filter(|shape| contained_in(shape, rect, self.viewport))
            .map(Shape::key)
            .collect();
        for key in &hits {
            self.select(*key);
        }
        info!("Marquee selected {} shapes", hits.len());
        self.request_redraw();
    }

    // Preview and export

    /// Dashed ghost geometry from the fixed part of the gesture to the pointer
    pub fn preview(&self) -> Option<Preview> {
        let cursor = to_absolute(self.pending_cursor?, self.viewport);
        let abs = |p: RelativePos| to_absolute(p, self.viewport);

        let (paths, color) = match &self.gesture {
            Gesture::Idle => return None,
            Gesture::Constructing(shape) => {
                let path = match shape.geometry() {
                    Geometry::Line { start, end: None } => vec![abs(*start), cursor],
                    Geometry::Rectangle { anchor, corner: None } => rect_outline(abs(*anchor), cursor),
                    Geometry::Polyline { vertices } => vec![abs(*vertices.last()?), cursor],
                    _ => return None,
                };
                (vec![path], modifying_color())
            }
            Gesture::Modifying(key) => {
                let shape = self.registry.get(*key)?;
                let index = shape.picked_handle()?;
                let paths = match shape.geometry() {
                    Geometry::Line { start, end: Some(end) } => {
                        let fixed = if index == 0 { *end } else { *start };
                        vec![vec![abs(fixed), cursor]]
                    }
                    Geometry::Rectangle { anchor, .. } => vec![rect_outline(abs(*anchor), cursor)],
                    Geometry::Polyline { vertices } => {
                        let mut paths = Vec::new();
                        if index > 0 {
                            paths.push(vec![abs(vertices[index - 1]), cursor]);
                        }
                        if let Some(next) = vertices.get(index + 1) {
                            paths.push(vec![abs(*next), cursor]);
                        }
                        paths
                    }
                    _ => return None,
                };
                (paths, modifying_color())
            }
            Gesture::Marquee { anchor } => (vec![rect_outline(abs(*anchor), cursor)], selection_color()),
        };

        if paths.is_empty() {
            return None;
        }
        Some(Preview { paths, color })
    }

    /// Plain-text dump of all registries, one shape per line in layering order
    pub fn export_summary(&self) -> String {
        let mut out = String::new();
        for kind in ShapeKind::ALL {
            out.push_str(&format!("[{}]\n", kind.label()));
            for shape in self.registry.shapes_of(kind) {
                let vertices: Vec<String> = shape.vertices().iter().map(ToString::to_string).collect();
                let [r, g, b, a] = shape.color().to_srgba_unmultiplied();
                out.push_str(&format!(
                    "{}: vertices=[{}] color=#{:02x}{:02x}{:02x}{:02x} width={}\n",
                    shape.name(),
                    vertices.join(", "),
                    r,
                    g,
                    b,
                    a,
                    shape.stroke_width()
                ));
            }
        }
        out
    }

    /// The registries as JSON, for tooling
    pub fn export_json(&self) -> EditorResult<String> {
        #[derive(Serialize)]
        struct Drawing<'a> {
            viewport: ViewportSize,
            lines: Vec<&'a Shape>,
            rectangles: Vec<&'a Shape>,
            polylines: Vec<&'a Shape>,
        }

        let drawing = Drawing {
            viewport: self.viewport,
            lines: self.registry.shapes_of(ShapeKind::Line).collect(),
            rectangles: self.registry.shapes_of(ShapeKind::Rectangle).collect(),
            polylines: self.registry.shapes_of(ShapeKind::Polyline).collect(),
        };
        Ok(serde_json::to_string_pretty(&drawing)?)
    }

    /// Writes [`EditorSession::export_summary`] to `path`
    pub fn export_to_file(&self, path: &Path) -> EditorResult<()> {
        std::fs::write(path, self.export_summary())?;
        info!("Exported {} shapes to {}", self.registry.len(), path.display());
        Ok(())
    }
}
