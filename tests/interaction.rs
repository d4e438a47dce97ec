//! Input sequences driven through `ApplicationState`, the way the event loop feeds it

use glam::Vec3;
use layered_diorama::state::{Background, OffsetStep, OFFSET_STEP};
use layered_diorama::{ApplicationState, DioramaConfig};
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

const DT: f32 = 1.0 / 60.0;

fn state() -> ApplicationState {
    ApplicationState::new(&DioramaConfig::default())
}

/// Press, hold for `frames` polls, release
fn hold(state: &mut ApplicationState, key: KeyCode, frames: usize) {
    state.on_key(key, true);
    for _ in 0..frames {
        state.update(DT);
    }
    state.on_key(key, false);
    state.update(DT);
}

// ---------------------------------------------------------------------------
// Layer separation
// ---------------------------------------------------------------------------

#[test]
fn offset_never_goes_negative_under_any_mix_of_keys() {
    let mut s = state();
    let pattern = [
        (KeyCode::KeyQ, 3),
        (KeyCode::KeyE, 2),
        (KeyCode::KeyQ, 10),
        (KeyCode::KeyE, 1),
        (KeyCode::KeyQ, 1),
        (KeyCode::KeyQ, 4),
    ];
    for (key, frames) in pattern {
        hold(&mut s, key, frames);
        assert!(s.offset.value() >= 0.0);
    }
    assert_eq!(s.offset, OffsetStep::ZERO);
}

#[test]
fn scroll_up_clamps_exactly_at_zero() {
    let mut s = state();
    hold(&mut s, KeyCode::KeyE, 7);
    assert_eq!(s.offset.ticks(), 7);

    for _ in 0..20 {
        s.on_scroll(1.0);
        assert!(s.offset.value() >= 0.0);
    }
    assert_eq!(s.offset.value(), 0.0);
}

#[test]
fn scroll_down_separates_two_steps_per_line() {
    let mut s = state();
    s.on_scroll(-1.0);
    s.on_scroll(-2.0);
    assert_eq!(s.offset.ticks(), 6);
    assert_eq!(s.offset.value(), 6.0 * OFFSET_STEP);
}

#[test]
fn fractional_scroll_accumulates() {
    let mut s = state();
    for _ in 0..4 {
        s.on_scroll(-0.25);
    }
    assert_eq!(s.offset.ticks(), 2);
}

#[test]
fn non_finite_scroll_is_ignored() {
    let mut s = state();
    s.on_scroll(f32::NAN);
    s.on_scroll(f32::INFINITY);
    assert_eq!(s.offset.ticks(), 0);

    s.on_scroll(-0.25);
    s.on_scroll(-0.25);
    assert_eq!(s.offset.ticks(), 1);
}

#[test]
fn equal_increments_and_decrements_do_not_drift() {
    let mut s = state();
    hold(&mut s, KeyCode::KeyE, 250);
    let peak = s.offset.value();
    hold(&mut s, KeyCode::KeyQ, 125);
    hold(&mut s, KeyCode::KeyE, 125);
    assert_eq!(s.offset.value(), peak);
    hold(&mut s, KeyCode::KeyQ, 250);
    assert_eq!(s.offset.value(), 0.0);
}

// ---------------------------------------------------------------------------
// Background toggle
// ---------------------------------------------------------------------------

#[test]
fn holding_r_toggles_once() {
    let mut s = state();
    assert_eq!(s.background, Background::Black);

    hold(&mut s, KeyCode::KeyR, 30);
    assert_eq!(s.background, Background::White);

    hold(&mut s, KeyCode::KeyR, 1);
    assert_eq!(s.background, Background::Black);
}

#[test]
fn focus_loss_rearms_the_toggle() {
    let mut s = state();
    s.on_key(KeyCode::KeyR, true);
    s.update(DT);
    s.focus_lost();
    assert!(!s.held_keys().is_held(KeyCode::KeyR));
    s.update(DT);
    assert_eq!(s.background, Background::White);

    s.on_key(KeyCode::KeyR, true);
    s.update(DT);
    assert_eq!(s.background, Background::Black);
}

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

#[test]
fn zoom_keys_move_eye_along_view_direction() {
    let mut s = state();
    let start = s.camera.position();

    hold(&mut s, KeyCode::Space, 3);
    let zoomed = s.camera.position();
    assert!(zoomed.abs_diff_eq(start + s.camera.front() * 3.0, 1e-4));

    hold(&mut s, KeyCode::ControlLeft, 3);
    assert!(s.camera.position().abs_diff_eq(start, 1e-4));
}

#[test]
fn drag_rotates_only_while_left_button_is_down() {
    let mut s = state();
    let config = DioramaConfig::default();
    let (cx, cy) = (config.width as f64 / 2.0, config.height as f64 / 2.0);

    s.on_cursor_moved(cx, cy);
    s.on_cursor_moved(cx + 200.0, cy);
    assert_eq!(s.camera.arc_matrix(), glam::Mat4::IDENTITY);

    s.on_mouse_button(MouseButton::Left, true);
    s.on_cursor_moved(cx + 200.0, cy);
    s.on_cursor_moved(cx + 350.0, cy + 40.0);
    let rotated = s.camera.arc_matrix();
    assert_ne!(rotated, glam::Mat4::IDENTITY);

    s.on_mouse_button(MouseButton::Left, false);
    s.on_cursor_moved(cx, cy);
    assert_eq!(s.camera.arc_matrix(), rotated);
}

#[test]
fn right_button_does_not_start_a_drag() {
    let mut s = state();
    s.on_mouse_button(MouseButton::Right, true);
    assert!(!s.is_dragging());
}

#[test]
fn drag_keeps_orientation_a_pure_rotation() {
    let mut s = state();
    s.on_cursor_moved(640.0, 360.0);
    s.on_mouse_button(MouseButton::Left, true);
    for i in 0..50 {
        s.on_cursor_moved(640.0 + i as f64 * 7.0, 360.0 - i as f64 * 3.0);
    }
    let m = s.camera.arc_matrix();
    let x = m.transform_vector3(Vec3::X);
    assert!((x.length() - 1.0).abs() < 1e-4);
    assert!(m.w_axis.abs_diff_eq(glam::Vec4::W, 1e-6));
}
