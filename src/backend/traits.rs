//! The GPU seam
//!
//! The renderer owns opaque handles and describes each frame as a
//! [`LayerPass`]; a backend turns that into real GPU work.

use crate::backend::types::*;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to initialize backend: {0}")]
    InitializationFailed(String),
    #[error("Failed to create surface: {0}")]
    SurfaceCreationFailed(String),
    #[error("Failed to create device: {0}")]
    DeviceCreationFailed(String),
    #[error("Failed to acquire next image: {0}")]
    AcquireImageFailed(String),
    #[error("Failed to create texture: {0}")]
    TextureCreationFailed(String),
    #[error("Failed to create pipeline: {0}")]
    PipelineCreationFailed(String),
    #[error("Unknown {kind} handle {id}")]
    InvalidHandle { kind: &'static str, id: u64 },
    #[error("Surface lost")]
    SurfaceLost,
    #[error("Timed out waiting for the next image")]
    Timeout,
    #[error("Out of memory")]
    OutOfMemory,
}

impl BackendError {
    /// The frame can be dropped and the next one attempted as usual
    pub fn is_transient(&self) -> bool {
        matches!(self, BackendError::Timeout)
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Opaque id naming a backend-owned resource
pub trait Handle: Copy + Eq + std::hash::Hash {
    /// Resource kind for error messages
    const KIND: &'static str;

    fn id(self) -> u64;

    fn invalid(self) -> BackendError {
        BackendError::InvalidHandle {
            kind: Self::KIND,
            id: self.id(),
        }
    }
}

/// Look up the resource behind `handle`
pub(crate) fn resolve<H: Handle, V>(map: &HashMap<H, V>, handle: H) -> BackendResult<&V> {
    map.get(&handle).ok_or_else(|| handle.invalid())
}

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u64);

        impl Handle for $name {
            const KIND: &'static str = $kind;

            fn id(self) -> u64 {
                self.0
            }
        }
    };
}

handle!(
    /// Vertex or uniform buffer
    BufferHandle,
    "buffer"
);
handle!(
    /// Sampled texture or depth target
    TextureHandle,
    "texture"
);
handle!(SamplerHandle, "sampler");
handle!(BindGroupHandle, "bind group");
handle!(PipelineHandle, "pipeline");

/// Everything the layer renderer asks of a GPU
///
/// Handles returned by one backend are meaningless to another.
pub trait GraphicsBackend {
    /// Reconfigure the swapchain; zero sizes are ignored
    fn resize(&mut self, width: u32, height: u32);

    /// Current swapchain size, which may be clamped below the requested one
    fn surface_size(&self) -> (u32, u32);

    fn create_vertex_buffer(
        &mut self,
        label: &str,
        vertices: &[Vertex],
    ) -> BackendResult<BufferHandle>;

    /// Zero-initialised uniform buffer of `size` bytes
    fn create_uniform_buffer(&mut self, label: &str, size: u64) -> BackendResult<BufferHandle>;

    /// Queue a write at offset 0; lands before the next submitted pass
    fn write_buffer(&mut self, buffer: BufferHandle, data: &[u8]);

    /// Create a texture, uploading `pixels` (tightly packed rows) if given
    ///
    /// Sizes beyond [`max_texture_dimension`](Self::max_texture_dimension)
    /// fail with [`BackendError::TextureCreationFailed`].
    fn create_texture(
        &mut self,
        desc: &TextureDescriptor,
        pixels: Option<&[u8]>,
    ) -> BackendResult<TextureHandle>;

    fn destroy_texture(&mut self, texture: TextureHandle);

    /// Largest width or height a 2D texture may have
    fn max_texture_dimension(&self) -> u32;

    /// Linear filtering, clamped to the edge on both axes
    fn create_sampler(&mut self, label: &str) -> BackendResult<SamplerHandle>;

    fn create_bind_group(&mut self, bindings: &Bindings) -> BackendResult<BindGroupHandle>;

    /// Compile both stages; shader errors are returned, not raised later
    fn create_pipeline(&mut self, desc: &PipelineDescriptor) -> BackendResult<PipelineHandle>;

    /// Acquire the next swapchain image
    fn begin_frame(&mut self) -> BackendResult<FrameContext>;

    /// Record `pass` against the acquired image
    fn submit_pass(&mut self, pass: &LayerPass) -> BackendResult<()>;

    /// Submit recorded work and present
    fn end_frame(&mut self) -> BackendResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_timeouts_are_transient() {
        assert!(BackendError::Timeout.is_transient());
        assert!(!BackendError::SurfaceLost.is_transient());
        assert!(!BackendError::OutOfMemory.is_transient());
        assert!(!BackendError::AcquireImageFailed("lost device".into()).is_transient());
    }

    #[test]
    fn invalid_handle_names_its_kind() {
        let err = TextureHandle(7).invalid();
        assert_eq!(err.to_string(), "Unknown texture handle 7");
    }
}
