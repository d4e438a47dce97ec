//! Resource management
//!
//! Quad geometry, layer textures and shader sources.

mod mesh;
mod shader;
mod texture;

pub use mesh::*;
pub use shader::*;
pub use texture::*;
