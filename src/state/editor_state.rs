//! Gesture state of the shape editor.
//!
//! Exactly one gesture is active at a time, which makes the shape under
//! construction, the shape under modification and the marquee anchor
//! mutually exclusive by construction.
//!
//! ```text
//!            first click                    second click (Line, Rectangle)
//!   ┌──────┐ ────────────► ┌──────────────┐ ──────────────────────────────┐
//!   │      │               │ Constructing │  double-click (Polyline)      │
//!   │      │ ◄──────────── └──────────────┘ ◄─ every click (Polyline)     │
//!   │      │ ◄──────────────────────────────────────────────────────────┘
//!   │ Idle │  right-click on shape   ┌───────────┐  click: pick handle
//!   │      │ ──────────────────────► │ Modifying │  click: drop handle
//!   │      │ ◄────────────────────── └───────────┘
//!   │      │  right-click
//!   │      │  click (marquee armed)  ┌─────────┐
//!   │      │ ──────────────────────► │ Marquee │
//!   │      │ ◄────────────────────── └─────────┘
//!   └──────┘  second click: select contained shapes
//! ```
use egui::{Color32, Pos2, Rect};

use crate::coords::RelativePos;
use crate::shape::{Shape, ShapeKey, ShapeKind};

/// The gesture currently in progress
#[derive(Debug, Clone, Default)]
pub enum Gesture {
    /// No active operation
    #[default]
    Idle,
    /// A new shape that is not in the registry yet
    Constructing(Shape),
    /// A committed shape being reshaped; the picked handle lives on the shape
    Modifying(ShapeKey),
    /// First corner of a rectangular multi-select
    Marquee { anchor: RelativePos },
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    pub fn editing_shape(&self) -> Option<&Shape> {
        match self {
            Gesture::Constructing(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn modifying_key(&self) -> Option<ShapeKey> {
        match self {
            Gesture::Modifying(key) => Some(*key),
            _ => None,
        }
    }

    pub fn marquee_anchor(&self) -> Option<RelativePos> {
        match self {
            Gesture::Marquee { anchor } => Some(*anchor),
            _ => None,
        }
    }
}

/// Observable phase of the interaction, for hosts and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionPhase {
    Idle,
    Constructing { kind: ShapeKind, point_count: usize },
    ModifyingPick(ShapeKey),
    ModifyingDrag { key: ShapeKey, handle: usize },
    MarqueeAnchored,
    MarqueeSelecting,
}

impl InteractionPhase {
    pub fn name(&self) -> &'static str {
        match self {
            InteractionPhase::Idle => "Idle",
            InteractionPhase::Constructing { .. } => "Constructing",
            InteractionPhase::ModifyingPick(_) => "ModifyingPick",
            InteractionPhase::ModifyingDrag { .. } => "ModifyingDrag",
            InteractionPhase::MarqueeAnchored => "MarqueeAnchored",
            InteractionPhase::MarqueeSelecting => "MarqueeSelecting",
        }
    }
}

/// Outcome of a shape-type change request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeTypeChange {
    Applied,
    /// A construction is in progress; the new type applies once it completes
    Deferred,
}

/// Ghost geometry following the pointer, in absolute coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub paths: Vec<Vec<Pos2>>,
    pub color: Color32,
}

/// Closed outline of the axis-aligned rectangle spanned by `a` and `b`
pub(crate) fn rect_outline(a: Pos2, b: Pos2) -> Vec<Pos2> {
    let rect = Rect::from_two_pos(a, b);
    vec![
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
        rect.left_top(),
    ]
}
