use std::collections::BTreeMap;

use crate::shape::{Shape, ShapeId, ShapeKey, ShapeKind};

/// Committed shapes, one ordered map per kind.
///
/// IDs are handed out per kind, start at 0 and are never reused, even after
/// the shape that held them has been removed.
#[derive(Debug, Clone, Default)]
pub struct ShapeRegistry {
    lines: BTreeMap<ShapeId, Shape>,
    rectangles: BTreeMap<ShapeId, Shape>,
    polylines: BTreeMap<ShapeId, Shape>,
    next_ids: [ShapeId; 3],
}

fn slot(kind: ShapeKind) -> usize {
    match kind {
        ShapeKind::Line => 0,
        ShapeKind::Rectangle => 1,
        ShapeKind::Polyline => 2,
    }
}

impl ShapeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the next ID for `kind`
    pub fn allocate_id(&mut self, kind: ShapeKind) -> ShapeId {
        let next = &mut self.next_ids[slot(kind)];
        let id = *next;
        *next += 1;
        id
    }

    /// The ID the next shape of `kind` will get
    pub fn peek_next_id(&self, kind: ShapeKind) -> ShapeId {
        self.next_ids[slot(kind)]
    }

    fn map(&self, kind: ShapeKind) -> &BTreeMap<ShapeId, Shape> {
        match kind {
            ShapeKind::Line => &self.lines,
            ShapeKind::Rectangle => &self.rectangles,
            ShapeKind::Polyline => &self.polylines,
        }
    }

    fn map_mut(&mut self, kind: ShapeKind) -> &mut BTreeMap<ShapeId, Shape> {
        match kind {
            ShapeKind::Line => &mut self.lines,
            ShapeKind::Rectangle => &mut self.rectangles,
            ShapeKind::Polyline => &mut self.polylines,
        }
    }

    /// Inserts or replaces a shape under its own key, returning the previous one
    pub fn insert(&mut self, shape: Shape) -> Option<Shape> {
        let key = shape.key();
        // keep the counter ahead of IDs that did not come from allocate_id
        let next = &mut self.next_ids[slot(key.kind)];
        *next = (*next).max(key.id + 1);
        self.map_mut(key.kind).insert(key.id, shape)
    }

    pub fn remove(&mut self, key: ShapeKey) -> Option<Shape> {
        self.map_mut(key.kind).remove(&key.id)
    }

    pub fn get(&self, key: ShapeKey) -> Option<&Shape> {
        self.map(key.kind).get(&key.id)
    }

    pub fn get_mut(&mut self, key: ShapeKey) -> Option<&mut Shape> {
        self.map_mut(key.kind).get_mut(&key.id)
    }

    pub fn contains(&self, key: ShapeKey) -> bool {
        self.map(key.kind).contains_key(&key.id)
    }

    /// Shapes of one kind, by ascending ID
    pub fn shapes_of(&self, kind: ShapeKind) -> impl Iterator<Item = &Shape> {
        self.map(kind).values()
    }

    /// All shapes in layering order: lines, then rectangles, then polylines
    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.lines.values().chain(self.rectangles.values()).chain(self.polylines.values())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Shape> {
        self.lines
            .values_mut()
            .chain(self.rectangles.values_mut())
            .chain(self.polylines.values_mut())
    }

    pub fn len(&self) -> usize {
        self.lines.len() + self.rectangles.len() + self.polylines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::RelativePos;

    fn polyline(registry: &mut ShapeRegistry) -> ShapeKey {
        let id = registry.allocate_id(ShapeKind::Polyline);
        let shape = Shape::new(id, ShapeKind::Polyline, RelativePos::new(0.5, 0.5));
        let key = shape.key();
        registry.insert(shape);
        key
    }

    #[test]
    fn ids_are_per_kind() {
        let mut registry = ShapeRegistry::new();
        assert_eq!(registry.allocate_id(ShapeKind::Line), 0);
        assert_eq!(registry.allocate_id(ShapeKind::Line), 1);
        assert_eq!(registry.allocate_id(ShapeKind::Rectangle), 0);
        assert_eq!(registry.peek_next_id(ShapeKind::Polyline), 0);
    }

    #[test]
    fn iteration_follows_layering_order() {
        let mut registry = ShapeRegistry::new();
        polyline(&mut registry);
        let id = registry.allocate_id(ShapeKind::Line);
        let mut line = Shape::new(id, ShapeKind::Line, RelativePos::new(0.1, 0.1));
        line.push_vertex(RelativePos::new(0.2, 0.2));
        registry.insert(line);

        let kinds: Vec<_> = registry.iter().map(Shape::kind).collect();
        assert_eq!(kinds, vec![ShapeKind::Line, ShapeKind::Polyline]);
    }

    #[test]
    fn removed_ids_are_not_reused() {
        let mut registry = ShapeRegistry::new();
        let first = polyline(&mut registry);
        assert!(registry.remove(first).is_some());
        let second = polyline(&mut registry);
        assert_eq!(second.id, 1);
        assert!(!registry.contains(first));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut registry = ShapeRegistry::new();
        let key = polyline(&mut registry);
        let replacement = Shape::new(key.id, ShapeKind::Polyline, RelativePos::new(0.9, 0.9));
        assert!(registry.insert(replacement).is_some());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(key).unwrap().vertices()[0], RelativePos::new(0.9, 0.9));
    }
}
