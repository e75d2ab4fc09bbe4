use egui::{Context, Key, Modifiers, PointerButton, Pos2, Rect};

use crate::coords::ViewportSize;

/// Input the editor engine reacts to, with positions in canvas pixels
/// (relative to the canvas' top-left corner).
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Mouse button was pressed
    PointerDown {
        position: Pos2,
        button: PointerButton,
        modifiers: Modifiers,
    },
    /// Mouse button was released
    PointerUp {
        position: Pos2,
        button: PointerButton,
    },
    /// Mouse moved, with or without buttons held
    PointerMove { position: Pos2 },
    DoubleClick {
        position: Pos2,
        button: PointerButton,
    },
    KeyDown { key: Key },
    /// The canvas changed size
    Resized { size: ViewportSize },
}

impl InputEvent {
    /// Plain primary-button press without modifiers, handy for scripted input
    pub fn click(position: Pos2) -> Self {
        Self::PointerDown {
            position,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn right_click(position: Pos2) -> Self {
        Self::PointerDown {
            position,
            button: PointerButton::Secondary,
            modifiers: Modifiers::NONE,
        }
    }

    /// Primary press with the platform's command modifier (ctrl, or cmd on macOS)
    pub fn command_click(position: Pos2) -> Self {
        Self::PointerDown {
            position,
            button: PointerButton::Primary,
            modifiers: Modifiers::COMMAND,
        }
    }
}

const KEYS: [Key; 3] = [Key::Delete, Key::Backspace, Key::Escape];
const BUTTONS: [PointerButton; 2] = [PointerButton::Primary, PointerButton::Secondary];

/// Converts raw egui input over the canvas into [`InputEvent`]s
#[derive(Debug, Default)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    last_size: Option<ViewportSize>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process this frame's input for a canvas occupying `canvas_rect`
    pub fn process_input(&mut self, ctx: &Context, canvas_rect: Rect) -> Vec<InputEvent> {
        let mut events = Vec::new();

        let size = ViewportSize::from_vec2(canvas_rect.size());
        if self.last_size != Some(size) {
            events.push(InputEvent::Resized { size });
            self.last_size = Some(size);
        }

        // Keys typed into a focused text field belong to that field
        let keyboard_taken = ctx.wants_keyboard_input();
        let to_canvas = |pos: Pos2| Pos2::new(pos.x - canvas_rect.min.x, pos.y - canvas_rect.min.y);

        ctx.input(|input| {
            if let Some(pos) = input.pointer.hover_pos() {
                if Some(pos) != self.last_pointer_pos {
                    events.push(InputEvent::PointerMove { position: to_canvas(pos) });
                }
                self.last_pointer_pos = Some(pos);
            } else {
                self.last_pointer_pos = None;
            }

            if let Some(pos) = input.pointer.interact_pos() {
                // Presses only count on the canvas; moves are tracked anywhere
                let on_canvas = canvas_rect.contains(pos);
                for button in BUTTONS {
                    if on_canvas && input.pointer.button_pressed(button) {
                        events.push(InputEvent::PointerDown {
                            position: to_canvas(pos),
                            button,
                            modifiers: input.modifiers,
                        });
                    }
                    if input.pointer.button_released(button) {
                        events.push(InputEvent::PointerUp { position: to_canvas(pos), button });
                    }
                    if on_canvas && input.pointer.button_double_clicked(button) {
                        events.push(InputEvent::DoubleClick { position: to_canvas(pos), button });
                    }
                }
            }

            for key in KEYS {
                if !keyboard_taken && input.key_pressed(key) {
                    events.push(InputEvent::KeyDown { key });
                }
            }
        });

        events
    }
}
