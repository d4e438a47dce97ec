//! Keyboard state and key bindings
//!
//! Keys fall into two handler categories:
//! - continuous actions fire on every frame the key is held
//! - toggle actions fire once per press, through an [`EdgeTrigger`]

use crate::scene::CameraInput;
use std::collections::HashSet;
use winit::keyboard::KeyCode;

/// Actions repeated on every frame their key is held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuousAction {
    IncreaseOffset,
    DecreaseOffset,
    ZoomIn,
    ZoomOut,
}

pub const CONTINUOUS_BINDINGS: [(KeyCode, ContinuousAction); 4] = [
    (KeyCode::KeyE, ContinuousAction::IncreaseOffset),
    (KeyCode::KeyQ, ContinuousAction::DecreaseOffset),
    (KeyCode::Space, ContinuousAction::ZoomIn),
    (KeyCode::ControlLeft, ContinuousAction::ZoomOut),
];

/// Actions fired once per key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    Background,
}

pub const TOGGLE_BINDINGS: [(KeyCode, ToggleAction); 1] =
    [(KeyCode::KeyR, ToggleAction::Background)];

/// Set of physical keys currently down
#[derive(Debug, Clone, Default)]
pub struct HeldKeys {
    keys: HashSet<KeyCode>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.keys.insert(key);
        } else {
            self.keys.remove(&key);
        }
    }

    pub fn is_held(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    /// Release everything, e.g. when the window loses focus
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Continuous actions active this frame, in binding order
    pub fn continuous_actions(&self) -> impl Iterator<Item = ContinuousAction> + '_ {
        CONTINUOUS_BINDINGS
            .iter()
            .filter(|(key, _)| self.is_held(*key))
            .map(|(_, action)| *action)
    }

    pub fn camera_input(&self) -> CameraInput {
        CameraInput {
            forward: self.is_held(KeyCode::KeyW),
            backward: self.is_held(KeyCode::KeyS),
            left: self.is_held(KeyCode::KeyA),
            right: self.is_held(KeyCode::KeyD),
            turn_left: self.is_held(KeyCode::ArrowLeft),
            turn_right: self.is_held(KeyCode::ArrowRight),
            look_up: self.is_held(KeyCode::ArrowUp),
            look_down: self.is_held(KeyCode::ArrowDown),
        }
    }
}

/// Rising-edge detector over a polled level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeTrigger {
    held: bool,
}

impl EdgeTrigger {
    /// Feed the current level; true only on the low to high transition
    pub fn update(&mut self, level: bool) -> bool {
        let fired = level && !self.held;
        self.held = level;
        fired
    }
}

/// One [`EdgeTrigger`] per entry of [`TOGGLE_BINDINGS`]
#[derive(Debug, Clone, Default)]
pub struct ToggleTriggers {
    triggers: [EdgeTrigger; TOGGLE_BINDINGS.len()],
}

impl ToggleTriggers {
    /// Toggle actions whose key went down since the previous poll
    pub fn poll(&mut self, keys: &HeldKeys) -> Vec<ToggleAction> {
        TOGGLE_BINDINGS
            .iter()
            .zip(self.triggers.iter_mut())
            .filter_map(|((key, action), trigger)| {
                trigger.update(keys.is_held(*key)).then_some(*action)
            })
            .collect()
    }
}
