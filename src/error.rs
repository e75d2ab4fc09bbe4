use thiserror::Error;

use crate::shape::ShapeKey;

/// Errors produced by the shape interaction engine
#[derive(Error, Debug)]
pub enum EditorError {
    /// A shape kind name that is not one of Line, Rectangle or PolyLine
    #[error("Invalid shape type '{0}'. Allowed types are: Line, Rectangle, PolyLine")]
    InvalidShapeType(String),

    /// A second shape was asked to enter modification while another one is active
    #[error("Cannot modify {requested}: {active} is already being modified")]
    AlreadyModifying {
        active: ShapeKey,
        requested: ShapeKey,
    },

    /// Modification can only start from the idle state
    #[error("Cannot modify {requested} while {gesture} is in progress")]
    GestureInProgress {
        gesture: &'static str,
        requested: ShapeKey,
    },

    #[error("No committed shape {0}")]
    UnknownShape(ShapeKey),

    #[error("Failed to write export: {0}")]
    Export(#[from] std::io::Error),

    #[error("Failed to serialize drawing: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for engine operations
pub type EditorResult<T> = Result<T, EditorError>;
