//! Quad geometry tables
//!
//! Every quad is six vertices (two triangles, no index buffer) of interleaved
//! position, normal and texture coordinate.

use crate::backend::types::Vertex;

/// The four authored quad shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuadShape {
    /// ±0.9 × ±1.2 in the XY plane. Uploaded but never drawn.
    Generic,
    /// ±1.55 × ±2.2 in the XY plane, shared by front and back
    FrontBack,
    /// ±1.55 (X) × ±0.4 (Z) at Y = 0, shared by top and bottom
    TopBottom,
    /// ±2.2 (Y) × ±0.4 (Z) at X = 0, shared by right and left
    Side,
}

impl QuadShape {
    pub const ALL: [QuadShape; 4] = [
        QuadShape::Generic,
        QuadShape::FrontBack,
        QuadShape::TopBottom,
        QuadShape::Side,
    ];

    /// Position in [`QuadShape::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            QuadShape::Generic => "generic_quad",
            QuadShape::FrontBack => "front_back_quad",
            QuadShape::TopBottom => "top_bottom_quad",
            QuadShape::Side => "side_quad",
        }
    }

    pub fn vertices(&self) -> &'static [Vertex; QUAD_VERTEX_COUNT] {
        match self {
            QuadShape::Generic => &GENERIC_QUAD,
            QuadShape::FrontBack => &FRONT_BACK_QUAD,
            QuadShape::TopBottom => &TOP_BOTTOM_QUAD,
            QuadShape::Side => &SIDE_QUAD,
        }
    }
}

pub const QUAD_VERTEX_COUNT: usize = 6;

const fn v(row: [f32; 8]) -> Vertex {
    Vertex::from_row(row)
}

#[rustfmt::skip]
const GENERIC_QUAD: [Vertex; QUAD_VERTEX_COUNT] = [
    v([-0.9, -1.2, 0.0,  0.0, 0.0, -1.0,  0.0, 1.0]),
    v([ 0.9, -1.2, 0.0,  0.0, 0.0, -1.0,  1.0, 1.0]),
    v([ 0.9,  1.2, 0.0,  0.0, 0.0, -1.0,  1.0, 0.0]),
    v([ 0.9,  1.2, 0.0,  0.0, 0.0, -1.0,  1.0, 0.0]),
    v([-0.9,  1.2, 0.0,  0.0, 0.0, -1.0,  0.0, 0.0]),
    v([-0.9, -1.2, 0.0,  0.0, 0.0, -1.0,  0.0, 1.0]),
];

#[rustfmt::skip]
const FRONT_BACK_QUAD: [Vertex; QUAD_VERTEX_COUNT] = [
    v([-1.55, -2.2, 0.0,  0.0, 0.0, -1.0,  0.0, 1.0]),
    v([ 1.55, -2.2, 0.0,  0.0, 0.0, -1.0,  1.0, 1.0]),
    v([ 1.55,  2.2, 0.0,  0.0, 0.0, -1.0,  1.0, 0.0]),
    v([ 1.55,  2.2, 0.0,  0.0, 0.0, -1.0,  1.0, 0.0]),
    v([-1.55,  2.2, 0.0,  0.0, 0.0, -1.0,  0.0, 0.0]),
    v([-1.55, -2.2, 0.0,  0.0, 0.0, -1.0,  0.0, 1.0]),
];

#[rustfmt::skip]
const TOP_BOTTOM_QUAD: [Vertex; QUAD_VERTEX_COUNT] = [
    v([-1.55, 0.0, -0.4,  0.0, 1.0, 0.0,  0.0, 1.0]),
    v([ 1.55, 0.0, -0.4,  0.0, 1.0, 0.0,  1.0, 1.0]),
    v([ 1.55, 0.0,  0.4,  0.0, 1.0, 0.0,  1.0, 0.0]),
    v([ 1.55, 0.0,  0.4,  0.0, 1.0, 0.0,  1.0, 0.0]),
    v([-1.55, 0.0,  0.4,  0.0, 1.0, 0.0,  0.0, 0.0]),
    v([-1.55, 0.0, -0.4,  0.0, 1.0, 0.0,  0.0, 1.0]),
];

// Texture coordinates are rotated a quarter turn relative to the other quads
#[rustfmt::skip]
const SIDE_QUAD: [Vertex; QUAD_VERTEX_COUNT] = [
    v([0.0, -2.2, -0.4,  1.0, 0.0, 0.0,  0.0, 0.0]),
    v([0.0,  2.2, -0.4,  1.0, 0.0, 0.0,  0.0, 1.0]),
    v([0.0,  2.2,  0.4,  1.0, 0.0, 0.0,  1.0, 1.0]),
    v([0.0,  2.2,  0.4,  1.0, 0.0, 0.0,  1.0, 1.0]),
    v([0.0, -2.2,  0.4,  1.0, 0.0, 0.0,  1.0, 0.0]),
    v([0.0, -2.2, -0.4,  1.0, 0.0, 0.0,  0.0, 0.0]),
];

/// A named vertex list ready for upload
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub name: String,
}

impl Mesh {
    pub fn quad(shape: QuadShape) -> Self {
        Self {
            vertices: shape.vertices().to_vec(),
            name: shape.name().to_string(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}
