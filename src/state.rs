//! Application state and the input handlers that mutate it
//!
//! Everything the render loop reads lives in [`ApplicationState`]. Window
//! events are forwarded to the `on_*` handlers as they arrive, and
//! [`ApplicationState::update`] runs the polled keyboard handlers once per
//! frame.

use crate::input::{ContinuousAction, HeldKeys, ToggleAction, ToggleTriggers};
use crate::scene::ArcBallCamera;
use crate::DioramaConfig;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

/// Distance added or removed by one offset tick
pub const OFFSET_STEP: f32 = 0.02;
/// Ticks per scroll line
pub const SCROLL_MULTIPLIER: f32 = 2.0;

/// Layer separation, stored as a whole number of [`OFFSET_STEP`] ticks
///
/// Never negative: decrements saturate at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct OffsetStep {
    ticks: u32,
}

impl OffsetStep {
    pub const ZERO: Self = Self { ticks: 0 };

    pub fn from_ticks(ticks: u32) -> Self {
        Self { ticks }
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Separation distance in world units
    pub fn value(&self) -> f32 {
        self.ticks as f32 * OFFSET_STEP
    }

    pub fn increase(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub fn decrease(&mut self) {
        self.ticks = self.ticks.saturating_sub(1);
    }

    /// Move by a signed number of ticks, clamping at zero
    pub fn shift(&mut self, delta: i64) {
        let ticks = (self.ticks as i64).saturating_add(delta);
        self.ticks = ticks.clamp(0, u32::MAX as i64) as u32;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Background {
    #[default]
    Black,
    White,
}

impl Background {
    pub fn toggled(self) -> Self {
        match self {
            Background::Black => Background::White,
            Background::White => Background::Black,
        }
    }

    pub fn clear_color(self) -> [f32; 4] {
        match self {
            Background::Black => [0.0, 0.0, 0.0, 1.0],
            Background::White => [1.0, 1.0, 1.0, 1.0],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApplicationState {
    pub offset: OffsetStep,
    pub camera: ArcBallCamera,
    pub background: Background,
    held: HeldKeys,
    toggles: ToggleTriggers,
    /// Unapplied fraction of a scroll tick
    scroll_remainder: f32,
    dragging: bool,
    cursor: (f64, f64),
}

impl ApplicationState {
    pub fn new(config: &DioramaConfig) -> Self {
        let mut camera = ArcBallCamera::new(
            config.camera_position,
            config.camera_up,
            config.camera_yaw,
            config.camera_pitch,
        );
        camera.set_viewport(config.width, config.height);

        Self {
            offset: OffsetStep::ZERO,
            camera,
            background: Background::default(),
            held: HeldKeys::new(),
            toggles: ToggleTriggers::default(),
            scroll_remainder: 0.0,
            dragging: false,
            cursor: (0.0, 0.0),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn held_keys(&self) -> &HeldKeys {
        &self.held
    }

    pub fn on_key(&mut self, key: KeyCode, pressed: bool) {
        self.held.set(key, pressed);
    }

    /// Scroll up shrinks the separation, scroll down grows it
    ///
    /// Non-finite deltas are ignored so they cannot poison the remainder.
    pub fn on_scroll(&mut self, scroll_y: f32) {
        if !scroll_y.is_finite() {
            return;
        }
        self.scroll_remainder += -scroll_y * SCROLL_MULTIPLIER;
        let whole = self.scroll_remainder.trunc();
        self.scroll_remainder -= whole;
        self.offset.shift(whole as i64);
    }

    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        self.cursor = (x, y);
        if self.dragging {
            self.camera.process_arc_ball(x, y);
        }
    }

    pub fn on_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if button != MouseButton::Left {
            return;
        }
        if pressed {
            self.dragging = true;
            let (x, y) = self.cursor;
            self.camera.set_radius(x, y);
        } else {
            self.dragging = false;
        }
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
    }

    /// Release held keys and end any drag
    pub fn focus_lost(&mut self) {
        self.held.clear();
        self.dragging = false;
    }

    /// Per-frame keyboard poll
    pub fn update(&mut self, dt: f32) {
        self.camera.process_keyboard(&self.held.camera_input(), dt, true);

        let actions: Vec<ContinuousAction> = self.held.continuous_actions().collect();
        for action in actions {
            self.apply_continuous(action);
        }

        for action in self.toggles.poll(&self.held) {
            self.apply_toggle(action);
        }
    }

    fn apply_continuous(&mut self, action: ContinuousAction) {
        match action {
            ContinuousAction::IncreaseOffset => self.offset.increase(),
            ContinuousAction::DecreaseOffset => self.offset.decrease(),
            ContinuousAction::ZoomIn => self.camera.process_mouse_scroll(1.0),
            ContinuousAction::ZoomOut => self.camera.process_mouse_scroll(-1.0),
        }
    }

    fn apply_toggle(&mut self, action: ToggleAction) {
        match action {
            ToggleAction::Background => {
                self.background = self.background.toggled();
                log::debug!("Background set to {:?}", self.background);
            }
        }
    }
}
