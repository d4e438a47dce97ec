//! The six diorama layers and where each one sits

use crate::resources::QuadShape;
use glam::{Mat4, Vec3};

/// Identity of one of the six layers
///
/// Discriminants are the fixed draw indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerId {
    Front = 0,
    Back = 1,
    Top = 2,
    Bottom = 3,
    Right = 4,
    Left = 5,
}

impl LayerId {
    /// Layers are always drawn in this order, whatever the camera does
    pub const DRAW_ORDER: [LayerId; 6] = [
        LayerId::Front,
        LayerId::Back,
        LayerId::Top,
        LayerId::Bottom,
        LayerId::Right,
        LayerId::Left,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Image file name without extension
    pub fn file_stem(self) -> &'static str {
        match self {
            LayerId::Front => "front",
            LayerId::Back => "back",
            LayerId::Top => "top",
            LayerId::Bottom => "bottom",
            LayerId::Right => "right",
            LayerId::Left => "left",
        }
    }

    /// Geometry shared with the opposite layer
    pub fn shape(self) -> QuadShape {
        match self {
            LayerId::Front | LayerId::Back => QuadShape::FrontBack,
            LayerId::Top | LayerId::Bottom => QuadShape::TopBottom,
            LayerId::Right | LayerId::Left => QuadShape::Side,
        }
    }

    pub fn placement(self) -> &'static LayerPlacement {
        &PLACEMENTS[self.index()]
    }
}

/// Fixed half-turn applied after translating, so the texture faces outward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flip {
    None,
    /// 180° about the vertical (Y) axis
    AboutY,
    /// 180° about the horizontal (X) axis
    AboutX,
}

impl Flip {
    pub fn matrix(self) -> Mat4 {
        match self {
            Flip::None => Mat4::IDENTITY,
            Flip::AboutY => Mat4::from_rotation_y(std::f32::consts::PI),
            Flip::AboutX => Mat4::from_rotation_x(std::f32::consts::PI),
        }
    }
}

/// Axis, direction, resting distance and flip of one layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerPlacement {
    pub axis: Vec3,
    /// `1.0` or `-1.0`
    pub sign: f32,
    /// Distance from the origin at zero offset
    pub base_distance: f32,
    pub flip: Flip,
}

const PLACEMENTS: [LayerPlacement; 6] = [
    // front
    LayerPlacement {
        axis: Vec3::Z,
        sign: 1.0,
        base_distance: 0.4,
        flip: Flip::None,
    },
    // back
    LayerPlacement {
        axis: Vec3::Z,
        sign: -1.0,
        base_distance: 0.4,
        flip: Flip::AboutY,
    },
    // top
    LayerPlacement {
        axis: Vec3::Y,
        sign: 1.0,
        base_distance: 2.2,
        flip: Flip::AboutX,
    },
    // bottom
    LayerPlacement {
        axis: Vec3::Y,
        sign: -1.0,
        base_distance: 2.2,
        flip: Flip::None,
    },
    // right
    LayerPlacement {
        axis: Vec3::X,
        sign: 1.0,
        base_distance: 1.55,
        flip: Flip::None,
    },
    // left
    LayerPlacement {
        axis: Vec3::X,
        sign: -1.0,
        base_distance: 1.55,
        flip: Flip::AboutY,
    },
];

impl LayerPlacement {
    /// Translation at the given layer separation
    pub fn translation(&self, offset: f32) -> Vec3 {
        self.axis * (self.sign * (self.base_distance + offset))
    }

    /// `rotation × translate(offset) × flip`
    pub fn model_matrix(&self, rotation: Mat4, offset: f32) -> Mat4 {
        rotation * Mat4::from_translation(self.translation(offset)) * self.flip.matrix()
    }
}
