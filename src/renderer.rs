//! Layer renderer
//!
//! Uploads the quad geometry and the six layer textures once, then turns each
//! [`FramePlan`] into one [`LayerPass`] with six draws.

use crate::backend::traits::*;
use crate::backend::types::*;
use crate::error::{DioramaError, DioramaResult};
use crate::frame::FramePlan;
use crate::resources::{GpuTexture, Mesh, QuadShape, ShaderSources, TextureData};
use crate::scene::LayerId;

#[derive(Debug, Clone, Copy)]
struct GpuMesh {
    vertex_buffer: BufferHandle,
    vertex_count: u32,
}

/// Per-layer GPU resources
///
/// Every layer owns its model buffer: all uniform writes land before the
/// pass is submitted, so a shared buffer would only hold the last layer.
#[derive(Debug, Clone)]
struct GpuLayer {
    texture: GpuTexture,
    material: BindGroupHandle,
    object_buffer: BufferHandle,
    object: BindGroupHandle,
}

pub struct Renderer<B: GraphicsBackend> {
    backend: B,
    pipeline: PipelineHandle,

    camera_buffer: BufferHandle,
    light_buffer: BufferHandle,
    frame_bindings: BindGroupHandle,

    /// Indexed by [`QuadShape::index`]
    meshes: Vec<GpuMesh>,
    /// Indexed by [`LayerId::index`]
    layers: Vec<GpuLayer>,

    depth_target: TextureHandle,
    width: u32,
    height: u32,
}

impl<B: GraphicsBackend> Renderer<B> {
    /// Build the pipeline and upload all static resources
    ///
    /// `textures` must hold one image for every layer.
    pub fn new(
        mut backend: B,
        shaders: &ShaderSources,
        textures: &[(LayerId, TextureData)],
    ) -> DioramaResult<Self> {
        let pipeline = backend.create_pipeline(&PipelineDescriptor {
            label: "Layer Pipeline".into(),
            vertex_shader: shaders.vertex.clone(),
            fragment_shader: shaders.fragment.clone(),
        })?;

        let camera_buffer =
            backend.create_uniform_buffer("Camera Buffer", uniform_size::<CameraUniform>())?;
        let light_buffer =
            backend.create_uniform_buffer("Light Buffer", uniform_size::<LightUniform>())?;
        let frame_bindings = backend.create_bind_group(&Bindings::Frame {
            camera: camera_buffer,
            light: light_buffer,
        })?;

        // All four quads are resident, even the one no layer uses
        let mut meshes = Vec::with_capacity(QuadShape::ALL.len());
        for shape in QuadShape::ALL {
            let mesh = Mesh::quad(shape);
            let vertex_buffer = backend.create_vertex_buffer(&mesh.name, &mesh.vertices)?;
            meshes.push(GpuMesh {
                vertex_buffer,
                vertex_count: mesh.vertex_count() as u32,
            });
        }

        let sampler = backend.create_sampler("Layer Sampler")?;

        let mut layers = Vec::with_capacity(LayerId::DRAW_ORDER.len());
        for layer in LayerId::DRAW_ORDER {
            let data = textures
                .iter()
                .find_map(|(id, data)| (*id == layer).then_some(data))
                .ok_or(DioramaError::MissingTexture(layer))?;

            let texture = GpuTexture::create(&mut backend, data)?;
            let material = backend.create_bind_group(&Bindings::Material {
                texture: texture.handle,
                sampler,
            })?;

            let label = format!("{} Object Buffer", layer.file_stem());
            let object_buffer =
                backend.create_uniform_buffer(&label, uniform_size::<ObjectUniform>())?;
            let object = backend.create_bind_group(&Bindings::Object { uniform: object_buffer })?;

            layers.push(GpuLayer {
                texture,
                material,
                object_buffer,
                object,
            });
        }

        let (width, height) = backend.surface_size();
        let depth_target =
            backend.create_texture(&TextureDescriptor::depth_target(width, height), None)?;

        Ok(Self {
            backend,
            pipeline,
            camera_buffer,
            light_buffer,
            frame_bindings,
            meshes,
            layers,
            depth_target,
            width,
            height,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn depth_target(&self) -> TextureHandle {
        self.depth_target
    }

    /// Texture bound to `layer`
    pub fn layer_texture(&self, layer: LayerId) -> &GpuTexture {
        &self.layers[layer.index()].texture
    }

    /// Reconfigure the surface and follow it with the depth target
    ///
    /// Also used to recover a lost surface, so the surface is reconfigured
    /// even when the size is unchanged.
    pub fn resize(&mut self, width: u32, height: u32) -> BackendResult<()> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.backend.resize(width, height);
        let (width, height) = self.backend.surface_size();
        self.match_depth_target(width, height)
    }

    fn match_depth_target(&mut self, width: u32, height: u32) -> BackendResult<()> {
        if (width, height) == (self.width, self.height) {
            return Ok(());
        }

        let depth_target = self
            .backend
            .create_texture(&TextureDescriptor::depth_target(width, height), None)?;
        self.backend.destroy_texture(self.depth_target);
        self.depth_target = depth_target;
        self.width = width;
        self.height = height;
        log::debug!("Depth target resized to {}x{}", width, height);
        Ok(())
    }

    /// Draw one frame and present it
    pub fn render(&mut self, plan: &FramePlan) -> BackendResult<()> {
        let frame = self.backend.begin_frame()?;
        self.match_depth_target(frame.width, frame.height)?;

        self.backend.write_buffer(self.camera_buffer, bytemuck::bytes_of(&plan.camera));
        self.backend.write_buffer(self.light_buffer, bytemuck::bytes_of(&plan.light));

        let mut draws = Vec::with_capacity(plan.draws.len());
        for draw in &plan.draws {
            let layer = &self.layers[draw.layer.index()];
            let mesh = self.meshes[draw.shape.index()];
            self.backend
                .write_buffer(layer.object_buffer, bytemuck::bytes_of(&draw.object_uniform()));

            draws.push(DrawCommand {
                object: layer.object,
                material: layer.material,
                vertex_buffer: mesh.vertex_buffer,
                vertex_count: mesh.vertex_count,
            });
        }

        self.backend.submit_pass(&LayerPass {
            clear_color: plan.clear_color,
            depth_target: self.depth_target,
            pipeline: self.pipeline,
            frame_bindings: self.frame_bindings,
            viewport: (frame.width as f32, frame.height as f32),
            draws,
        })?;
        self.backend.end_frame()
    }
}

fn uniform_size<T>() -> u64 {
    std::mem::size_of::<T>() as u64
}
