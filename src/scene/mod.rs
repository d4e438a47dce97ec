//! Scene description: the camera and the six layers

mod camera;
mod layer;

pub use camera::*;
pub use layer::*;
