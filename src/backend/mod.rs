//! Backend abstraction layer
//!
//! [`GraphicsBackend`] is implemented by [`wgpu_backend::WgpuBackend`] for
//! on-screen rendering and by [`recording::RecordingBackend`], which keeps a
//! log of every call and is what the renderer tests drive.

pub mod recording;
pub mod traits;
pub mod types;
pub mod wgpu_backend;

pub use traits::*;
pub use types::*;
