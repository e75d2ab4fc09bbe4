use std::collections::BTreeSet;

use crate::shape::ShapeKey;

/// Keys of the committed shapes currently selected
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    keys: BTreeSet<ShapeKey>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the key was already selected
    pub fn add(&mut self, key: ShapeKey) -> bool {
        self.keys.insert(key)
    }

    pub fn contains(&self, key: ShapeKey) -> bool {
        self.keys.contains(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = ShapeKey> + '_ {
        self.keys.iter().copied()
    }

    /// Empties the selection, handing back what was selected
    pub fn take(&mut self) -> Vec<ShapeKey> {
        std::mem::take(&mut self.keys).into_iter().collect()
    }
}
