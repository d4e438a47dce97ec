//! Arc-ball camera
//!
//! The eye flies with yaw/pitch like a free camera, while mouse drags
//! accumulate a separate orientation that is applied to the model instead of
//! the eye. [`ArcBallCamera::arc_matrix`] exposes that orientation.

use glam::{Mat4, Quat, Vec2, Vec3};

/// Perspective projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y: std::f32::consts::FRAC_PI_4, // 45 degrees
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Projection {
    pub fn perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            near,
            far,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }
}

/// Keyboard movement flags consumed by [`ArcBallCamera::process_keyboard`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    /// Arrow keys turn the eye
    pub turn_left: bool,
    pub turn_right: bool,
    pub look_up: bool,
    pub look_down: bool,
}

/// Units per second for WASD movement
pub const MOVE_SPEED: f32 = 2.5;
/// Degrees per second for arrow-key turning
pub const TURN_SPEED: f32 = 45.0;
/// Distance moved by one zoom step
pub const ZOOM_STEP: f32 = 1.0;
pub const MIN_DISTANCE: f32 = 1.0;
pub const MAX_DISTANCE: f32 = 50.0;
const PITCH_LIMIT: f32 = 89.0;

#[derive(Debug, Clone)]
pub struct ArcBallCamera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    /// Degrees
    yaw: f32,
    /// Degrees
    pitch: f32,

    orientation: Quat,
    anchor: Vec3,
    viewport: Vec2,
}

impl ArcBallCamera {
    pub fn new(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: world_up,
            right: Vec3::X,
            world_up,
            yaw,
            pitch,
            orientation: Quat::IDENTITY,
            anchor: Vec3::Z,
            viewport: Vec2::ONE,
        };
        camera.update_vectors();
        camera
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Keep the cursor-to-sphere mapping in sync with the framebuffer
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Vec2::new(width.max(1) as f32, height.max(1) as f32);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Rotation-only matrix of everything dragged so far
    pub fn arc_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.orientation)
    }

    pub fn process_keyboard(&mut self, input: &CameraInput, dt: f32, constrain_pitch: bool) {
        let velocity = MOVE_SPEED * dt;
        if input.forward {
            self.position += self.front * velocity;
        }
        if input.backward {
            self.position -= self.front * velocity;
        }
        if input.left {
            self.position -= self.right * velocity;
        }
        if input.right {
            self.position += self.right * velocity;
        }

        let turn = TURN_SPEED * dt;
        let mut turned = false;
        if input.turn_left {
            self.yaw -= turn;
            turned = true;
        }
        if input.turn_right {
            self.yaw += turn;
            turned = true;
        }
        if input.look_up {
            self.pitch += turn;
            turned = true;
        }
        if input.look_down {
            self.pitch -= turn;
            turned = true;
        }

        if turned {
            if constrain_pitch {
                self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
            }
            self.update_vectors();
        }
    }

    /// Step the eye along the view direction: `+1` zooms in, `-1` zooms out
    ///
    /// Steps that would leave the eye closer than [`MIN_DISTANCE`] or farther
    /// than [`MAX_DISTANCE`] from the origin are ignored, as is a zero
    /// direction.
    pub fn process_mouse_scroll(&mut self, direction: f32) {
        if direction == 0.0 || direction.is_nan() {
            return;
        }
        let candidate = self.position + self.front * (direction.signum() * ZOOM_STEP);
        let distance = candidate.length();
        if (MIN_DISTANCE..=MAX_DISTANCE).contains(&distance) {
            self.position = candidate;
        }
    }

    /// Start a drag at cursor position `(x, y)` in window pixels
    pub fn set_radius(&mut self, x: f64, y: f64) {
        self.anchor = self.project_to_sphere(x, y);
    }

    /// Rotate by the shortest arc from the previous drag sample to `(x, y)`
    pub fn process_arc_ball(&mut self, x: f64, y: f64) {
        let current = self.project_to_sphere(x, y);
        let axis = self.anchor.cross(current);
        if axis.length_squared() > 1e-12 {
            let angle = self.anchor.dot(current).clamp(-1.0, 1.0).acos();
            let delta = Quat::from_axis_angle(axis.normalize(), angle);
            self.orientation = (delta * self.orientation).normalize();
        }
        self.anchor = current;
    }

    /// Map a cursor position onto the unit sphere, y up
    fn project_to_sphere(&self, x: f64, y: f64) -> Vec3 {
        let ndc = Vec2::new(
            2.0 * x as f32 / self.viewport.x - 1.0,
            1.0 - 2.0 * y as f32 / self.viewport.y,
        );
        let d2 = ndc.length_squared();
        if d2 <= 1.0 {
            ndc.extend((1.0 - d2).sqrt())
        } else {
            ndc.normalize().extend(0.0)
        }
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front =
            Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_camera() -> ArcBallCamera {
        let mut camera = ArcBallCamera::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Y, -90.0, 0.0);
        camera.set_viewport(800, 600);
        camera
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        let camera = default_camera();
        assert!(camera.front().abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!(camera.arc_matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));

        let origin = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(Vec3::new(0.0, 0.0, -10.0), 1e-5));
    }

    #[test]
    fn zoom_moves_one_unit_and_respects_limits() {
        let mut camera = default_camera();
        camera.process_mouse_scroll(1.0);
        assert!(camera.position().abs_diff_eq(Vec3::new(0.0, 0.0, 9.0), 1e-5));
        camera.process_mouse_scroll(-1.0);
        assert!(camera.position().abs_diff_eq(Vec3::new(0.0, 0.0, 10.0), 1e-5));

        for _ in 0..100 {
            camera.process_mouse_scroll(1.0);
        }
        assert!(camera.position().length() >= MIN_DISTANCE - 1e-5);

        for _ in 0..100 {
            camera.process_mouse_scroll(-1.0);
        }
        assert!(camera.position().length() <= MAX_DISTANCE + 1e-5);
    }

    #[test]
    fn drag_right_turns_model_about_vertical_axis() {
        let mut camera = default_camera();
        camera.set_radius(400.0, 300.0);
        camera.process_arc_ball(500.0, 300.0);

        let (axis, angle) = camera.orientation().to_axis_angle();
        assert!(angle > 0.0);
        assert!(axis.abs_diff_eq(Vec3::Y, 1e-5));

        // +Z face swings toward +X
        let turned = camera.arc_matrix().transform_vector3(Vec3::Z);
        assert!(turned.x > 0.0);
    }

    #[test]
    fn drag_back_to_start_restores_orientation() {
        let mut camera = default_camera();
        camera.set_radius(400.0, 300.0);
        camera.process_arc_ball(450.0, 250.0);
        camera.process_arc_ball(400.0, 300.0);
        assert!(camera.arc_matrix().abs_diff_eq(Mat4::IDENTITY, 1e-4));
    }

    #[test]
    fn drag_without_motion_is_a_no_op() {
        let mut camera = default_camera();
        camera.set_radius(123.0, 45.0);
        camera.process_arc_ball(123.0, 45.0);
        assert_eq!(camera.orientation(), Quat::IDENTITY);
    }

    #[test]
    fn arc_matrix_has_no_translation() {
        let mut camera = default_camera();
        camera.set_radius(100.0, 100.0);
        camera.process_arc_ball(700.0, 500.0);
        assert_eq!(camera.arc_matrix().w_axis, glam::Vec4::W);
    }

    #[test]
    fn pitch_is_constrained_when_requested() {
        let mut camera = default_camera();
        let input = CameraInput {
            look_up: true,
            ..Default::default()
        };
        camera.process_keyboard(&input, 10.0, true);
        assert_eq!(camera.pitch(), 89.0);

        let mut free = default_camera();
        free.process_keyboard(&input, 10.0, false);
        assert!(free.pitch() > 89.0);
    }

    #[test]
    fn zero_scroll_direction_leaves_the_eye_in_place() {
        let mut camera = default_camera();
        camera.process_mouse_scroll(0.0);
        assert_eq!(camera.position(), Vec3::new(0.0, 0.0, 10.0));

        camera.process_mouse_scroll(-0.5);
        assert!(camera.position().abs_diff_eq(Vec3::new(0.0, 0.0, 11.0), 1e-5));
    }

    #[test]
    fn turning_right_increases_yaw() {
        let mut camera = default_camera();
        let input = CameraInput {
            turn_right: true,
            ..Default::default()
        };
        camera.process_keyboard(&input, 1.0, true);
        assert_eq!(camera.yaw(), -90.0 + TURN_SPEED);
        assert!(camera.front().x > 0.0);
    }

    #[test]
    fn forward_key_moves_along_view_direction() {
        let mut camera = default_camera();
        let input = CameraInput {
            forward: true,
            ..Default::default()
        };
        camera.process_keyboard(&input, 1.0, true);
        assert!(camera.position().abs_diff_eq(Vec3::new(0.0, 0.0, 10.0 - MOVE_SPEED), 1e-5));
    }

    #[test]
    fn projection_matches_perspective_rh() {
        let projection = Projection::perspective(45.0, 1280.0 / 720.0, 0.1, 100.0);
        let expected = Mat4::perspective_rh(45f32.to_radians(), 1280.0 / 720.0, 0.1, 100.0);
        assert_eq!(projection.matrix(), expected);
    }
}
