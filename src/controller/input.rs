/// Platform-agnostic input handling system
use std::collections::HashSet;

use glam::Vec2;
use serde::Deserialize;

/// Platform-independent input events
#[derive(Debug, Clone)]
pub enum InputEvent {
    // Keyboard events
    KeyDown(String),
    KeyUp(String),

    // Mouse events
    MouseMove { dx: f32, dy: f32 },
    MouseClick { button: MouseButton, is_down: bool },

    // Window events
    FocusLost,
    PointerLockChanged { locked: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Input gathered since the last tick.
///
/// Keys are stored by name ("w", " ", "ArrowLeft", ...). `just_pressed` holds keys whose
/// down edge arrived since the last [`InputState::end_frame`]. `left_clicked` is the same
/// kind of edge for the left mouse button.
#[derive(Debug, Default)]
pub struct InputState {
    pub pressed_keys: HashSet<String>,
    pub just_pressed: HashSet<String>,
    pub look_delta: (f32, f32),
    pub pointer_locked: bool,
    pub left_clicked: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                let key = normalize_key(key);
                // OS key repeat sends repeated downs while held
                if self.pressed_keys.insert(key.clone()) {
                    self.just_pressed.insert(key);
                }
            }
            InputEvent::KeyUp(key) => {
                self.pressed_keys.remove(normalize_key(key).as_str());
            }
            InputEvent::MouseMove { dx, dy } => {
                if self.pointer_locked {
                    self.look_delta.0 += dx;
                    self.look_delta.1 += dy;
                }
            }
            InputEvent::MouseClick { button, is_down } => {
                if *button == MouseButton::Left && *is_down {
                    self.left_clicked = true;
                }
            }
            InputEvent::FocusLost => {
                self.clear_keys();
            }
            InputEvent::PointerLockChanged { locked } => {
                self.pointer_locked = *locked;
                if !locked {
                    self.look_delta = (0.0, 0.0);
                }
            }
        }
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    pub fn was_just_pressed(&self, key: &str) -> bool {
        self.just_pressed.contains(key)
    }

    pub fn clear_keys(&mut self) {
        self.pressed_keys.clear();
        self.just_pressed.clear();
    }

    pub fn consume_look(&mut self) -> (f32, f32) {
        let result = self.look_delta;
        self.look_delta = (0.0, 0.0);
        result
    }

    /// Drop per-frame edges once the tick has consumed them.
    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.left_clicked = false;
        self.look_delta = (0.0, 0.0);
    }
}

/// Single printable characters compare case-insensitively.
fn normalize_key(key: &str) -> String {
    if key.chars().count() == 1 {
        key.to_lowercase()
    } else {
        key.to_string()
    }
}

/// Key mapping configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    pub toggle_camera_mode: String,
    pub toggle_gallery: String,
    pub toggle_selfie: String,
    pub snap: String,
    pub zoom_in: String,
    pub zoom_out: String,
    pub gallery_next: String,
    pub gallery_previous: String,
    pub escape: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "w".to_string(),
            backward: "s".to_string(),
            left: "a".to_string(),
            right: "d".to_string(),
            toggle_camera_mode: "f".to_string(),
            toggle_gallery: "g".to_string(),
            toggle_selfie: "v".to_string(),
            snap: " ".to_string(),
            zoom_in: "w".to_string(),
            zoom_out: "s".to_string(),
            gallery_next: "ArrowRight".to_string(),
            gallery_previous: "ArrowLeft".to_string(),
            escape: "Escape".to_string(),
        }
    }
}

/// High-level input processor
#[derive(Debug, Clone)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings: KeyBindings {
                forward: normalize_key(&bindings.forward),
                backward: normalize_key(&bindings.backward),
                left: normalize_key(&bindings.left),
                right: normalize_key(&bindings.right),
                toggle_camera_mode: normalize_key(&bindings.toggle_camera_mode),
                toggle_gallery: normalize_key(&bindings.toggle_gallery),
                toggle_selfie: normalize_key(&bindings.toggle_selfie),
                snap: normalize_key(&bindings.snap),
                zoom_in: normalize_key(&bindings.zoom_in),
                zoom_out: normalize_key(&bindings.zoom_out),
                gallery_next: normalize_key(&bindings.gallery_next),
                gallery_previous: normalize_key(&bindings.gallery_previous),
                escape: normalize_key(&bindings.escape),
            },
        }
    }

    /// Movement axes in [-1, 1]: x = strafe (right positive), y = forward.
    ///
    /// Opposing keys cancel. The arrow keys are not movement keys because they page the
    /// gallery.
    pub fn movement_axes(&self, input: &InputState) -> Vec2 {
        let axis = |positive: &str, negative: &str| {
            let mut value = 0.0;
            if input.is_key_pressed(positive) {
                value += 1.0;
            }
            if input.is_key_pressed(negative) {
                value -= 1.0;
            }
            value
        };
        Vec2::new(
            axis(&self.bindings.right, &self.bindings.left),
            axis(&self.bindings.forward, &self.bindings.backward),
        )
    }

    pub fn wants_to_toggle_camera_mode(&self, input: &InputState) -> bool {
        input.was_just_pressed(&self.bindings.toggle_camera_mode)
    }

    pub fn wants_to_toggle_gallery(&self, input: &InputState) -> bool {
        input.was_just_pressed(&self.bindings.toggle_gallery)
    }

    pub fn wants_to_toggle_selfie(&self, input: &InputState) -> bool {
        input.was_just_pressed(&self.bindings.toggle_selfie)
    }

    pub fn wants_to_snap(&self, input: &InputState) -> bool {
        input.was_just_pressed(&self.bindings.snap)
    }

    pub fn is_zooming_in(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.bindings.zoom_in)
    }

    pub fn is_zooming_out(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.bindings.zoom_out)
    }

    pub fn wants_next_photo(&self, input: &InputState) -> bool {
        input.was_just_pressed(&self.bindings.gallery_next)
    }

    pub fn wants_previous_photo(&self, input: &InputState) -> bool {
        input.was_just_pressed(&self.bindings.gallery_previous)
    }

    pub fn is_escape(&self, input: &InputState) -> bool {
        input.was_just_pressed(&self.bindings.escape)
    }

    /// A left click into the window asks for the pointer back.
    pub fn wants_to_recapture_cursor(&self, input: &InputState) -> bool {
        input.left_clicked
    }
}

impl Default for InputProcessor {
    fn default() -> Self {
        Self::new(KeyBindings::default())
    }
}
