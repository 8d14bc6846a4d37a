//! Input state management for pointer and keyboard events.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Vec2, button: MouseButton },
    Up { position: Vec2, button: MouseButton },
    Move { position: Vec2 },
}

/// Keyboard event type. Keys are identified by name ("W", "Shift", ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}

/// Any input event the host can feed in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InputEvent {
    Pointer(PointerEvent),
    Key(KeyEvent),
}

/// Tracks the current input state across frames.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Current pointer position in screen coordinates.
    pub pointer_position: Vec2,
    /// Pointer position at the start of the frame, for delta calculations.
    pub previous_pointer_position: Vec2,
    pressed_buttons: HashSet<MouseButton>,
    just_pressed_buttons: HashSet<MouseButton>,
    just_released_buttons: HashSet<MouseButton>,
    pressed_keys: HashSet<String>,
}

impl InputState {
    /// Create a new input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the start of each frame to reset per-frame state.
    pub fn begin_frame(&mut self) {
        self.just_pressed_buttons.clear();
        self.just_released_buttons.clear();
        self.previous_pointer_position = self.pointer_position;
    }

    /// Process any input event.
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Pointer(event) => self.handle_pointer_event(event),
            InputEvent::Key(event) => self.handle_key_event(event),
        }
    }

    /// Process a pointer event.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { position, button } => {
                self.pointer_position = position;
                if self.pressed_buttons.insert(button) {
                    self.just_pressed_buttons.insert(button);
                }
            }
            PointerEvent::Up { position, button } => {
                self.pointer_position = position;
                if self.pressed_buttons.remove(&button) {
                    self.just_released_buttons.insert(button);
                }
            }
            PointerEvent::Move { position } => {
                self.pointer_position = position;
            }
        }
    }

    /// Process a key event.
    pub fn handle_key_event(&mut self, event: KeyEvent) {
        match event {
            KeyEvent::Pressed(key) => {
                self.pressed_keys.insert(key);
            }
            KeyEvent::Released(key) => {
                self.pressed_keys.remove(&key);
            }
        }
    }

    /// Check if a button is currently pressed.
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.pressed_buttons.contains(&button)
    }

    /// Check if a button was just pressed this frame.
    pub fn is_button_just_pressed(&self, button: MouseButton) -> bool {
        self.just_pressed_buttons.contains(&button)
    }

    /// Check if a button was just released this frame.
    pub fn is_button_just_released(&self, button: MouseButton) -> bool {
        self.just_released_buttons.contains(&button)
    }

    /// Check if a key is currently pressed.
    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    /// Get the pointer movement delta since the start of the frame.
    pub fn pointer_delta(&self) -> Vec2 {
        self.pointer_position - self.previous_pointer_position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_press() {
        let mut input = InputState::new();

        input.handle_pointer_event(PointerEvent::Down {
            position: Vec2::new(100.0, 100.0),
            button: MouseButton::Left,
        });

        assert!(input.is_button_pressed(MouseButton::Left));
        assert!(input.is_button_just_pressed(MouseButton::Left));
        assert!(!input.is_button_pressed(MouseButton::Right));
    }

    #[test]
    fn test_button_release() {
        let mut input = InputState::new();

        input.handle_pointer_event(PointerEvent::Down {
            position: Vec2::new(100.0, 100.0),
            button: MouseButton::Left,
        });
        input.handle_pointer_event(PointerEvent::Up {
            position: Vec2::new(100.0, 100.0),
            button: MouseButton::Left,
        });

        assert!(!input.is_button_pressed(MouseButton::Left));
        assert!(input.is_button_just_released(MouseButton::Left));
    }

    #[test]
    fn test_release_without_press_is_not_an_edge() {
        let mut input = InputState::new();
        input.handle_pointer_event(PointerEvent::Up {
            position: Vec2::ZERO,
            button: MouseButton::Left,
        });
        assert!(!input.is_button_just_released(MouseButton::Left));
    }

    #[test]
    fn test_begin_frame_clears_just_pressed() {
        let mut input = InputState::new();

        input.handle_pointer_event(PointerEvent::Down {
            position: Vec2::new(100.0, 100.0),
            button: MouseButton::Left,
        });

        assert!(input.is_button_just_pressed(MouseButton::Left));

        input.begin_frame();

        assert!(!input.is_button_just_pressed(MouseButton::Left));
        assert!(input.is_button_pressed(MouseButton::Left)); // Still pressed
    }

    #[test]
    fn test_pointer_delta() {
        let mut input = InputState::new();
        input.handle_pointer_event(PointerEvent::Move {
            position: Vec2::new(10.0, 10.0),
        });
        input.begin_frame();
        input.handle_pointer_event(PointerEvent::Move {
            position: Vec2::new(15.0, 8.0),
        });

        assert_eq!(input.pointer_delta(), Vec2::new(5.0, -2.0));

        input.begin_frame();
        assert_eq!(input.pointer_delta(), Vec2::ZERO);
    }

    #[test]
    fn test_key_press() {
        let mut input = InputState::new();

        input.handle_event(InputEvent::Key(KeyEvent::Pressed("W".to_string())));

        assert!(input.is_key_pressed("W"));

        // Held keys survive frame boundaries.
        input.begin_frame();
        assert!(input.is_key_pressed("W"));

        input.handle_event(InputEvent::Key(KeyEvent::Released("W".to_string())));
        assert!(!input.is_key_pressed("W"));
    }
}
