//! wgpu implementation of [`GraphicsBackend`]

use crate::backend::traits::*;
use crate::backend::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use wgpu::util::DeviceExt;

/// A texture and the full view the pipeline binds or renders into
struct TextureEntry {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// Swapchain image and encoder between `begin_frame` and `end_frame`
struct FrameInFlight {
    surface_texture: wgpu::SurfaceTexture,
    encoder: wgpu::CommandEncoder,
}

/// Bind group layouts for groups 0, 1 and 2 of the layer pipeline
struct LayerLayouts {
    frame: wgpu::BindGroupLayout,
    object: wgpu::BindGroupLayout,
    material: wgpu::BindGroupLayout,
}

impl LayerLayouts {
    fn new(device: &wgpu::Device) -> Self {
        let uniform = |binding, visibility| wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let frame = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Layout"),
            entries: &[
                uniform(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                uniform(1, wgpu::ShaderStages::FRAGMENT),
            ],
        });
        let object = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Layout"),
            entries: &[uniform(0, wgpu::ShaderStages::VERTEX)],
        });
        let material = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        Self { frame, object, material }
    }
}

/// On-screen backend for one window
pub struct WgpuBackend {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    layouts: LayerLayouts,
    frame: Option<FrameInFlight>,

    buffers: HashMap<BufferHandle, wgpu::Buffer>,
    textures: HashMap<TextureHandle, TextureEntry>,
    samplers: HashMap<SamplerHandle, wgpu::Sampler>,
    bind_groups: HashMap<BindGroupHandle, wgpu::BindGroup>,
    pipelines: HashMap<PipelineHandle, wgpu::RenderPipeline>,

    next_id: u64,
}

impl WgpuBackend {
    /// Create the backend for `window`, blocking on adapter and device requests
    pub fn new(window: Arc<winit::window::Window>, vsync: bool) -> BackendResult<Self> {
        pollster::block_on(Self::new_async(window, vsync))
    }

    pub async fn new_async(window: Arc<winit::window::Window>, vsync: bool) -> BackendResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let size = window.inner_size();
        let surface = instance
            .create_surface(window)
            .map_err(|e| BackendError::SurfaceCreationFailed(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| BackendError::InitializationFailed("No suitable adapter found".into()))?;

        let info = adapter.get_info();
        log::info!("Selected GPU: {} ({:?} backend)", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Diorama Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                },
                None,
            )
            .await
            .map_err(|e| BackendError::DeviceCreationFailed(e.to_string()))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| {
                BackendError::SurfaceCreationFailed("Surface reports no formats".into())
            })?;

        let max_size = device.limits().max_texture_dimension_2d;
        let (width, height) = clamp_to_limit(size.width, size.height, max_size);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: if vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);
        log::debug!("Surface configured at {}x{} ({:?})", width, height, format);

        let layouts = LayerLayouts::new(&device);

        Ok(Self {
            surface,
            device,
            queue,
            surface_config,
            layouts,
            frame: None,
            buffers: HashMap::new(),
            textures: HashMap::new(),
            samplers: HashMap::new(),
            bind_groups: HashMap::new(),
            pipelines: HashMap::new(),
            next_id: 1,
        })
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn texture_format(format: TextureFormat) -> wgpu::TextureFormat {
    match format {
        TextureFormat::Rgba8UnormSrgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        TextureFormat::Depth32Float => wgpu::TextureFormat::Depth32Float,
    }
}

fn texture_usage(kind: TextureKind) -> wgpu::TextureUsages {
    match kind {
        TextureKind::Sampled => {
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST
        }
        TextureKind::DepthTarget => wgpu::TextureUsages::RENDER_ATTACHMENT,
    }
}

fn clear_color([r, g, b, a]: [f32; 4]) -> wgpu::Color {
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: a as f64,
    }
}

/// Fit `width` x `height` inside `max_size`, keeping the aspect ratio
fn clamp_to_limit(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    if width > max_size || height > max_size {
        let scale = (max_size as f32 / width as f32).min(max_size as f32 / height as f32);
        (
            ((width as f32 * scale) as u32).max(1),
            ((height as f32 * scale) as u32).max(1),
        )
    } else {
        (width.max(1), height.max(1))
    }
}

impl GraphicsBackend for WgpuBackend {
    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let (width, height) = clamp_to_limit(width, height, self.max_texture_dimension());
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    fn create_vertex_buffer(
        &mut self,
        label: &str,
        vertices: &[Vertex],
    ) -> BackendResult<BufferHandle> {
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let handle = BufferHandle(self.allocate_id());
        self.buffers.insert(handle, buffer);
        Ok(handle)
    }

    fn create_uniform_buffer(&mut self, label: &str, size: u64) -> BackendResult<BufferHandle> {
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let handle = BufferHandle(self.allocate_id());
        self.buffers.insert(handle, buffer);
        Ok(handle)
    }

    fn write_buffer(&mut self, buffer: BufferHandle, data: &[u8]) {
        match self.buffers.get(&buffer) {
            Some(buf) => self.queue.write_buffer(buf, 0, data),
            None => log::warn!("Dropped write to unknown buffer {}", buffer.id()),
        }
    }

    fn create_texture(
        &mut self,
        desc: &TextureDescriptor,
        pixels: Option<&[u8]>,
    ) -> BackendResult<TextureHandle> {
        desc.validate(self.max_texture_dimension(), pixels)?;
        let size = wgpu::Extent3d {
            width: desc.width,
            height: desc.height,
            depth_or_array_layers: 1,
        };

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(desc.label.as_str()),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: texture_format(desc.format),
            usage: texture_usage(desc.kind),
            view_formats: &[],
        });

        if let Some(pixels) = pixels {
            self.queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                pixels,
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(desc.width * 4),
                    rows_per_image: Some(desc.height),
                },
                size,
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let handle = TextureHandle(self.allocate_id());
        self.textures.insert(handle, TextureEntry { texture, view });
        Ok(handle)
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        if let Some(entry) = self.textures.remove(&texture) {
            entry.texture.destroy();
        }
    }

    fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    fn create_sampler(&mut self, label: &str) -> BackendResult<SamplerHandle> {
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let handle = SamplerHandle(self.allocate_id());
        self.samplers.insert(handle, sampler);
        Ok(handle)
    }

    fn create_bind_group(&mut self, bindings: &Bindings) -> BackendResult<BindGroupHandle> {
        let (label, layout, entries) = match *bindings {
            Bindings::Frame { camera, light } => (
                "Frame Bindings",
                &self.layouts.frame,
                vec![
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: resolve(&self.buffers, camera)?.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: resolve(&self.buffers, light)?.as_entire_binding(),
                    },
                ],
            ),
            Bindings::Object { uniform } => (
                "Object Bindings",
                &self.layouts.object,
                vec![wgpu::BindGroupEntry {
                    binding: 0,
                    resource: resolve(&self.buffers, uniform)?.as_entire_binding(),
                }],
            ),
            Bindings::Material { texture, sampler } => (
                "Material Bindings",
                &self.layouts.material,
                vec![
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(
                            &resolve(&self.textures, texture)?.view,
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(resolve(&self.samplers, sampler)?),
                    },
                ],
            ),
        };

        let group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &entries,
        });
        let handle = BindGroupHandle(self.allocate_id());
        self.bind_groups.insert(handle, group);
        Ok(handle)
    }

    fn create_pipeline(&mut self, desc: &PipelineDescriptor) -> BackendResult<PipelineHandle> {
        // Shader and pipeline validation errors surface here instead of panicking
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Layer Vertex Shader"),
            source: wgpu::ShaderSource::Wgsl(desc.vertex_shader.as_str().into()),
        });
        let fragment = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Layer Fragment Shader"),
            source: wgpu::ShaderSource::Wgsl(desc.fragment_shader.as_str().into()),
        });

        let layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Layer Pipeline Layout"),
            bind_group_layouts: &[
                &self.layouts.frame,
                &self.layouts.object,
                &self.layouts.material,
            ],
            push_constant_ranges: &[],
        });

        let attributes = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];
        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(desc.label.as_str()),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &vertex,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: Vertex::STRIDE,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.surface_config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(BackendError::PipelineCreationFailed(error.to_string()));
        }

        let handle = PipelineHandle(self.allocate_id());
        self.pipelines.insert(handle, pipeline);
        Ok(handle)
    }

    fn begin_frame(&mut self) -> BackendResult<FrameContext> {
        let surface_texture = self.surface.get_current_texture().map_err(|e| match e {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => BackendError::SurfaceLost,
            wgpu::SurfaceError::Timeout => BackendError::Timeout,
            wgpu::SurfaceError::OutOfMemory => BackendError::OutOfMemory,
            _ => BackendError::AcquireImageFailed(e.to_string()),
        })?;
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        self.frame = Some(FrameInFlight {
            surface_texture,
            encoder,
        });

        Ok(FrameContext {
            width: self.surface_config.width,
            height: self.surface_config.height,
        })
    }

    fn submit_pass(&mut self, pass: &LayerPass) -> BackendResult<()> {
        let frame = self
            .frame
            .as_mut()
            .ok_or_else(|| BackendError::AcquireImageFailed("no frame in flight".into()))?;

        let target = frame
            .surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let depth = &resolve(&self.textures, pass.depth_target)?.view;
        let pipeline = resolve(&self.pipelines, pass.pipeline)?;
        let frame_bindings = resolve(&self.bind_groups, pass.frame_bindings)?;

        // Resolve every draw up front so a bad handle aborts before recording
        let draws = pass
            .draws
            .iter()
            .map(|draw| {
                Ok((
                    resolve(&self.bind_groups, draw.object)?,
                    resolve(&self.bind_groups, draw.material)?,
                    resolve(&self.buffers, draw.vertex_buffer)?,
                    draw.vertex_count,
                ))
            })
            .collect::<BackendResult<Vec<_>>>()?;

        let width = pass.viewport.0.min(self.surface_config.width as f32);
        let height = pass.viewport.1.min(self.surface_config.height as f32);

        let mut render_pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Layer Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color(pass.clear_color)),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_viewport(0.0, 0.0, width, height, 0.0, 1.0);
        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, frame_bindings, &[]);
        for (object, material, vertices, count) in draws {
            render_pass.set_bind_group(1, object, &[]);
            render_pass.set_bind_group(2, material, &[]);
            render_pass.set_vertex_buffer(0, vertices.slice(..));
            render_pass.draw(0..count, 0..1);
        }

        Ok(())
    }

    fn end_frame(&mut self) -> BackendResult<()> {
        if let Some(frame) = self.frame.take() {
            self.queue.submit(std::iter::once(frame.encoder.finish()));
            frame.surface_texture.present();
        }
        Ok(())
    }
}
