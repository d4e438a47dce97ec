//! Headless backend that records calls instead of touching a GPU
//!
//! Handles are checked the same way the wgpu backend checks them, so a pass
//! naming a destroyed texture fails here too.

use crate::backend::traits::*;
use crate::backend::types::*;
use std::collections::HashMap;

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Resize { width: u32, height: u32 },
    CreateBuffer { handle: BufferHandle, label: String, size: u64 },
    WriteBuffer { buffer: BufferHandle, data: Vec<u8> },
    CreateTexture { handle: TextureHandle, desc: TextureDescriptor, uploaded: Option<usize> },
    DestroyTexture(TextureHandle),
    CreateBindGroup { handle: BindGroupHandle, bindings: Bindings },
    CreatePipeline { handle: PipelineHandle, desc: PipelineDescriptor },
    BeginFrame,
    SubmitPass(LayerPass),
    EndFrame,
}

/// Backend that hands out handles and logs every call in order
#[derive(Debug)]
pub struct RecordingBackend {
    width: u32,
    height: u32,
    next_id: u64,
    calls: Vec<RecordedCall>,
    buffers: HashMap<BufferHandle, u64>,
    textures: HashMap<TextureHandle, TextureDescriptor>,
    samplers: HashMap<SamplerHandle, String>,
    bind_groups: HashMap<BindGroupHandle, Bindings>,
    pipelines: HashMap<PipelineHandle, PipelineDescriptor>,
    in_frame: bool,
    max_texture_dimension: u32,
    next_acquire_error: Option<BackendError>,
}

/// 2D texture limit of `wgpu::Limits::default()`
const DEFAULT_MAX_TEXTURE_DIMENSION: u32 = 8192;

impl RecordingBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            next_id: 1,
            calls: Vec::new(),
            buffers: HashMap::new(),
            textures: HashMap::new(),
            samplers: HashMap::new(),
            bind_groups: HashMap::new(),
            pipelines: HashMap::new(),
            in_frame: false,
            max_texture_dimension: DEFAULT_MAX_TEXTURE_DIMENSION,
            next_acquire_error: None,
        }
    }

    /// Report a smaller texture limit, as a constrained device would
    pub fn with_max_texture_dimension(mut self, max: u32) -> Self {
        self.max_texture_dimension = max;
        self
    }

    /// Make the next `begin_frame` fail with `error`
    pub fn fail_next_acquire(&mut self, error: BackendError) {
        self.next_acquire_error = Some(error);
    }

    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    /// Forget everything recorded so far; live resources are kept
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Passes submitted since the last [`clear_calls`](Self::clear_calls)
    pub fn passes(&self) -> impl Iterator<Item = &LayerPass> {
        self.calls.iter().filter_map(|call| match call {
            RecordedCall::SubmitPass(pass) => Some(pass),
            _ => None,
        })
    }

    pub fn bindings(&self, handle: BindGroupHandle) -> Option<&Bindings> {
        self.bind_groups.get(&handle)
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&TextureDescriptor> {
        self.textures.get(&handle)
    }

    pub fn pipeline(&self, handle: PipelineHandle) -> Option<&PipelineDescriptor> {
        self.pipelines.get(&handle)
    }

    /// Latest bytes written to `buffer`, if any
    pub fn last_write(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.calls.iter().rev().find_map(|call| match call {
            RecordedCall::WriteBuffer { buffer: b, data } if *b == buffer => Some(data.as_slice()),
            _ => None,
        })
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn create_buffer(&mut self, label: &str, size: u64) -> BufferHandle {
        let handle = BufferHandle(self.allocate_id());
        self.buffers.insert(handle, size);
        self.calls.push(RecordedCall::CreateBuffer {
            handle,
            label: label.to_string(),
            size,
        });
        handle
    }
}

impl GraphicsBackend for RecordingBackend {
    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.width = width;
            self.height = height;
            self.calls.push(RecordedCall::Resize { width, height });
        }
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn create_vertex_buffer(
        &mut self,
        label: &str,
        vertices: &[Vertex],
    ) -> BackendResult<BufferHandle> {
        Ok(self.create_buffer(label, vertices.len() as u64 * Vertex::STRIDE))
    }

    fn create_uniform_buffer(&mut self, label: &str, size: u64) -> BackendResult<BufferHandle> {
        Ok(self.create_buffer(label, size))
    }

    fn write_buffer(&mut self, buffer: BufferHandle, data: &[u8]) {
        self.calls.push(RecordedCall::WriteBuffer {
            buffer,
            data: data.to_vec(),
        });
    }

    fn create_texture(
        &mut self,
        desc: &TextureDescriptor,
        pixels: Option<&[u8]>,
    ) -> BackendResult<TextureHandle> {
        desc.validate(self.max_texture_dimension, pixels)?;

        let handle = TextureHandle(self.allocate_id());
        self.textures.insert(handle, desc.clone());
        self.calls.push(RecordedCall::CreateTexture {
            handle,
            desc: desc.clone(),
            uploaded: pixels.map(<[u8]>::len),
        });
        Ok(handle)
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture);
        self.calls.push(RecordedCall::DestroyTexture(texture));
    }

    fn max_texture_dimension(&self) -> u32 {
        self.max_texture_dimension
    }

    fn create_sampler(&mut self, label: &str) -> BackendResult<SamplerHandle> {
        let handle = SamplerHandle(self.allocate_id());
        self.samplers.insert(handle, label.to_string());
        Ok(handle)
    }

    fn create_bind_group(&mut self, bindings: &Bindings) -> BackendResult<BindGroupHandle> {
        match *bindings {
            Bindings::Frame { camera, light } => {
                resolve(&self.buffers, camera)?;
                resolve(&self.buffers, light)?;
            }
            Bindings::Object { uniform } => {
                resolve(&self.buffers, uniform)?;
            }
            Bindings::Material { texture, sampler } => {
                resolve(&self.textures, texture)?;
                resolve(&self.samplers, sampler)?;
            }
        }

        let handle = BindGroupHandle(self.allocate_id());
        self.bind_groups.insert(handle, *bindings);
        self.calls.push(RecordedCall::CreateBindGroup {
            handle,
            bindings: *bindings,
        });
        Ok(handle)
    }

    fn create_pipeline(&mut self, desc: &PipelineDescriptor) -> BackendResult<PipelineHandle> {
        let handle = PipelineHandle(self.allocate_id());
        self.pipelines.insert(handle, desc.clone());
        self.calls.push(RecordedCall::CreatePipeline {
            handle,
            desc: desc.clone(),
        });
        Ok(handle)
    }

    fn begin_frame(&mut self) -> BackendResult<FrameContext> {
        if let Some(error) = self.next_acquire_error.take() {
            return Err(error);
        }
        self.in_frame = true;
        self.calls.push(RecordedCall::BeginFrame);
        Ok(FrameContext {
            width: self.width,
            height: self.height,
        })
    }

    fn submit_pass(&mut self, pass: &LayerPass) -> BackendResult<()> {
        if !self.in_frame {
            return Err(BackendError::AcquireImageFailed("no frame in flight".into()));
        }
        resolve(&self.textures, pass.depth_target)?;
        resolve(&self.pipelines, pass.pipeline)?;
        resolve(&self.bind_groups, pass.frame_bindings)?;
        for draw in &pass.draws {
            resolve(&self.bind_groups, draw.object)?;
            resolve(&self.bind_groups, draw.material)?;
            resolve(&self.buffers, draw.vertex_buffer)?;
        }

        self.calls.push(RecordedCall::SubmitPass(pass.clone()));
        Ok(())
    }

    fn end_frame(&mut self) -> BackendResult<()> {
        self.in_frame = false;
        self.calls.push(RecordedCall::EndFrame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique_across_kinds() {
        let mut backend = RecordingBackend::new(4, 4);
        let buffer = backend.create_uniform_buffer("a", 16).unwrap();
        let texture = backend
            .create_texture(&TextureDescriptor::depth_target(4, 4), None)
            .unwrap();
        assert_ne!(buffer.id(), texture.id());
    }

    #[test]
    fn unknown_handles_are_rejected() {
        let mut backend = RecordingBackend::new(4, 4);
        let err = backend
            .create_bind_group(&Bindings::Object {
                uniform: BufferHandle(99),
            })
            .unwrap_err();
        assert!(matches!(err, BackendError::InvalidHandle { kind: "buffer", id: 99 }));
    }

    #[test]
    fn pixel_size_mismatch_is_rejected() {
        let mut backend = RecordingBackend::new(4, 4);
        let desc = TextureDescriptor::sampled("t", 2, 2, TextureFormat::Rgba8UnormSrgb);
        assert!(backend.create_texture(&desc, Some(&[0; 15])).is_err());
        assert!(backend.create_texture(&desc, Some(&[0; 16])).is_ok());
    }

    #[test]
    fn texture_limit_is_enforced() {
        let mut backend = RecordingBackend::new(4, 4).with_max_texture_dimension(16);
        let desc = TextureDescriptor::sampled("t", 17, 1, TextureFormat::Rgba8UnormSrgb);
        assert!(matches!(
            backend.create_texture(&desc, Some(&[0; 17 * 4])),
            Err(BackendError::TextureCreationFailed(_))
        ));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn injected_acquire_error_fails_one_frame() {
        let mut backend = RecordingBackend::new(4, 4);
        backend.fail_next_acquire(BackendError::Timeout);
        assert!(matches!(backend.begin_frame(), Err(BackendError::Timeout)));
        assert!(backend.begin_frame().is_ok());
    }

    #[test]
    fn pass_outside_frame_fails() {
        let mut backend = RecordingBackend::new(4, 4);
        let depth = backend
            .create_texture(&TextureDescriptor::depth_target(4, 4), None)
            .unwrap();
        let pass = LayerPass {
            clear_color: [0.0; 4],
            depth_target: depth,
            pipeline: PipelineHandle(0),
            frame_bindings: BindGroupHandle(0),
            viewport: (4.0, 4.0),
            draws: Vec::new(),
        };
        assert!(backend.submit_pass(&pass).is_err());
    }
}
