//! Layered diorama - a parallax "shadow box" viewer
//!
//! Six textured image planes (front, back, top, bottom, right, left) sit around
//! the origin and are viewed through an arc-ball camera. The layers can be
//! pushed apart along their facing axes, and the background switches between
//! black and white.
//!
//! The crate is split into a pure part and a GPU part:
//! - [`state`], [`input`], [`scene`] and [`frame`] hold everything the input
//!   handlers and the render loop compute, with no graphics context needed
//! - [`renderer`] turns a [`frame::FramePlan`] into backend calls through the
//!   [`backend::GraphicsBackend`] trait
//! - [`app`] wires winit events to the state and drives the render loop

pub mod app;
pub mod backend;
pub mod error;
pub mod frame;
pub mod input;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod state;
pub mod window;

pub use backend::wgpu_backend::WgpuBackend;
pub use error::{DioramaError, DioramaResult};
pub use frame::FramePlan;
pub use renderer::Renderer;
pub use state::ApplicationState;
pub use window::Window;

use glam::Vec3;
use std::path::PathBuf;

/// Configuration for the diorama viewer
#[derive(Debug, Clone)]
pub struct DioramaConfig {
    /// Window title
    pub title: String,
    /// Initial window width, also used for the projection aspect ratio
    pub width: u32,
    /// Initial window height, also used for the projection aspect ratio
    pub height: u32,
    /// Enable vsync
    pub vsync: bool,
    /// Directory holding `front.png` .. `left.png`
    pub image_dir: PathBuf,
    /// Directory holding the two WGSL sources
    pub shader_dir: PathBuf,
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Initial eye position
    pub camera_position: Vec3,
    pub camera_up: Vec3,
    /// Initial yaw in degrees; -90 looks down -Z
    pub camera_yaw: f32,
    pub camera_pitch: f32,
}

impl DioramaConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

impl Default for DioramaConfig {
    fn default() -> Self {
        Self {
            title: "Box".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
            image_dir: PathBuf::from("images"),
            shader_dir: PathBuf::from("shaders"),
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            camera_position: Vec3::new(0.0, 0.0, 10.0),
            camera_up: Vec3::Y,
            camera_yaw: -90.0,
            camera_pitch: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_viewer_setup() {
        let config = DioramaConfig::default();
        assert_eq!(config.title, "Box");
        assert_eq!((config.width, config.height), (1280, 720));
        assert_eq!(config.near, 0.1);
        assert_eq!(config.far, 100.0);
        assert_eq!(config.camera_position, Vec3::new(0.0, 0.0, 10.0));
        assert!((config.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
    }
}
