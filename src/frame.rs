//! Per-frame render plan
//!
//! [`FramePlan::build`] reads the application state once and produces every
//! value the renderer uploads for the frame. It touches no GPU state.

use crate::backend::types::{CameraUniform, LightUniform, ObjectUniform};
use crate::resources::QuadShape;
use crate::scene::{LayerId, Projection};
use crate::state::ApplicationState;
use glam::{Mat4, Vec3, Vec4};

pub const LIGHT_AMBIENT: Vec3 = Vec3::ONE;
pub const LIGHT_DIFFUSE: Vec3 = Vec3::ZERO;
pub const LIGHT_SPECULAR: Vec3 = Vec3::ZERO;
pub const SHININESS: f32 = 32.0;

/// One layer's draw for this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerDraw {
    pub layer: LayerId,
    pub shape: QuadShape,
    pub model: Mat4,
}

impl LayerDraw {
    pub fn object_uniform(&self) -> ObjectUniform {
        ObjectUniform::from_model(self.model)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub clear_color: [f32; 4],
    pub camera: CameraUniform,
    pub light: LightUniform,
    /// Always in [`LayerId::DRAW_ORDER`]
    pub draws: [LayerDraw; 6],
}

impl FramePlan {
    /// `elapsed` is seconds since startup and drives the orbiting light
    pub fn build(state: &ApplicationState, projection: &Projection, elapsed: f32) -> Self {
        let rotation = state.camera.arc_matrix();
        let offset = state.offset.value();

        let draws = LayerId::DRAW_ORDER.map(|layer| LayerDraw {
            layer,
            shape: layer.shape(),
            model: layer.placement().model_matrix(rotation, offset),
        });

        Self {
            clear_color: state.background.clear_color(),
            camera: CameraUniform {
                view: state.camera.view_matrix(),
                projection: projection.matrix(),
                position: state.camera.position().extend(1.0),
            },
            light: light_at(elapsed),
            draws,
        }
    }
}

/// Light block with the position orbiting the Y axis at radius 1
pub fn light_at(elapsed: f32) -> LightUniform {
    LightUniform {
        position: Vec4::new(elapsed.sin(), 0.0, elapsed.cos(), 1.0),
        ambient: LIGHT_AMBIENT.extend(0.0),
        diffuse: LIGHT_DIFFUSE.extend(0.0),
        specular: LIGHT_SPECULAR.extend(0.0),
        shininess: SHININESS,
        _padding: [0.0; 3],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Background, OffsetStep};
    use crate::DioramaConfig;

    fn plan(state: &ApplicationState) -> FramePlan {
        FramePlan::build(state, &Projection::default(), 0.0)
    }

    #[test]
    fn draws_follow_fixed_order() {
        let state = ApplicationState::new(&DioramaConfig::default());
        let order: Vec<LayerId> = plan(&state).draws.iter().map(|d| d.layer).collect();
        assert_eq!(order, LayerId::DRAW_ORDER.to_vec());
    }

    #[test]
    fn clear_color_follows_background() {
        let mut state = ApplicationState::new(&DioramaConfig::default());
        assert_eq!(plan(&state).clear_color, [0.0, 0.0, 0.0, 1.0]);
        state.background = Background::White;
        assert_eq!(plan(&state).clear_color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn offset_moves_every_layer() {
        let mut state = ApplicationState::new(&DioramaConfig::default());
        let before = plan(&state);
        state.offset = OffsetStep::from_ticks(10);
        let after = plan(&state);
        for (a, b) in before.draws.iter().zip(after.draws.iter()) {
            let moved = b.model.w_axis.truncate().length() - a.model.w_axis.truncate().length();
            assert!((moved - 0.2).abs() < 1e-5, "{:?}", a.layer);
        }
    }

    #[test]
    fn light_orbits_in_xz_plane() {
        let light = light_at(std::f32::consts::FRAC_PI_2);
        assert!(light.position.truncate().abs_diff_eq(Vec3::X, 1e-6));
        assert_eq!(light.shininess, 32.0);
        assert_eq!(light.ambient.truncate(), Vec3::ONE);
    }
}
