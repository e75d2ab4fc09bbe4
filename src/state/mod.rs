mod editor_state;
mod session;

pub use editor_state::{Gesture, InteractionPhase, Preview, ShapeTypeChange};
pub use session::EditorSession;
