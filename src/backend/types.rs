//! Plain data passed across the backend boundary

use super::traits::{
    BackendError, BackendResult, BindGroupHandle, BufferHandle, PipelineHandle, SamplerHandle,
    TextureHandle,
};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// Layer images
    Rgba8UnormSrgb,
    Depth32Float,
}

/// What a texture is created for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    /// Uploaded once and sampled by the fragment stage
    Sampled,
    /// Depth attachment of the layer pass
    DepthTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureDescriptor {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub kind: TextureKind,
}

impl TextureDescriptor {
    pub fn sampled(
        label: impl Into<String>,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> Self {
        Self {
            label: label.into(),
            width,
            height,
            format,
            kind: TextureKind::Sampled,
        }
    }

    /// Check the size against `max_size` and, for uploads, the RGBA8 byte count
    pub fn validate(&self, max_size: u32, pixels: Option<&[u8]>) -> BackendResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(BackendError::TextureCreationFailed(format!(
                "{} has zero size",
                self.label
            )));
        }
        if self.width > max_size || self.height > max_size {
            return Err(BackendError::TextureCreationFailed(format!(
                "{} is {}x{}, larger than the device limit of {} pixels per side",
                self.label, self.width, self.height, max_size
            )));
        }
        if let Some(pixels) = pixels {
            let expected = self.width as usize * self.height as usize * 4;
            if pixels.len() != expected {
                return Err(BackendError::TextureCreationFailed(format!(
                    "{}: expected {} bytes of pixel data, got {}",
                    self.label,
                    expected,
                    pixels.len()
                )));
            }
        }
        Ok(())
    }

    /// Depth target, never smaller than 1x1
    pub fn depth_target(width: u32, height: u32) -> Self {
        Self {
            label: "Depth Buffer".into(),
            width: width.max(1),
            height: height.max(1),
            format: TextureFormat::Depth32Float,
            kind: TextureKind::DepthTarget,
        }
    }
}

/// Interleaved quad vertex: position, normal, texture coordinate
///
/// Shader locations are 0, 1 and 2 in field order.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl Vertex {
    pub const STRIDE: u64 = std::mem::size_of::<Self>() as u64;

    /// Build a vertex from one row of an authored `[f32; 8]` table
    pub const fn from_row(row: [f32; 8]) -> Self {
        Self {
            position: Vec3::new(row[0], row[1], row[2]),
            normal: Vec3::new(row[3], row[4], row[5]),
            uv: Vec2::new(row[6], row[7]),
        }
    }
}

/// Camera uniform data
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view: Mat4,
    pub projection: Mat4,
    pub position: Vec4, // w unused
}

/// Light block consumed by the fragment stage
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightUniform {
    pub position: Vec4,
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
    pub shininess: f32,
    pub _padding: [f32; 3],
}

/// Per-layer uniform data
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectUniform {
    pub model: Mat4,
    pub normal_matrix: Mat4,
}

impl ObjectUniform {
    pub fn from_model(model: Mat4) -> Self {
        Self {
            model,
            normal_matrix: model.inverse().transpose(),
        }
    }
}

/// Resources behind one bind group slot
///
/// The layer pipeline has exactly three groups, so the slot is implied by
/// the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bindings {
    /// Group 0: camera block (vertex + fragment) and light block (fragment)
    Frame { camera: BufferHandle, light: BufferHandle },
    /// Group 1: model and normal matrices
    Object { uniform: BufferHandle },
    /// Group 2: layer texture and its sampler
    Material { texture: TextureHandle, sampler: SamplerHandle },
}

impl Bindings {
    pub fn group(&self) -> u32 {
        match self {
            Bindings::Frame { .. } => 0,
            Bindings::Object { .. } => 1,
            Bindings::Material { .. } => 2,
        }
    }
}

/// The layer pipeline's WGSL stages
///
/// Vertex layout and bind group layouts are fixed by [`Vertex`] and
/// [`Bindings`]. Entry points are `vs_main` and `fs_main`. The rest of the
/// state is fixed too: triangle lists drawn two-sided (flipped layers are
/// seen from behind their authored winding), depth test `Less` with writes,
/// and `SRC_ALPHA, ONE_MINUS_SRC_ALPHA` blending.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineDescriptor {
    pub label: String,
    pub vertex_shader: String,
    pub fragment_shader: String,
}

/// One textured quad draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCommand {
    pub object: BindGroupHandle,
    pub material: BindGroupHandle,
    pub vertex_buffer: BufferHandle,
    pub vertex_count: u32,
}

/// Everything one frame's render pass needs, in submission order
#[derive(Debug, Clone, PartialEq)]
pub struct LayerPass {
    pub clear_color: [f32; 4],
    pub depth_target: TextureHandle,
    pub pipeline: PipelineHandle,
    pub frame_bindings: BindGroupHandle,
    /// Viewport size in pixels, origin at the top-left corner
    pub viewport: (f32, f32),
    pub draws: Vec<DrawCommand>,
}

/// Returned by `begin_frame`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameContext {
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_interleaved() {
        assert_eq!(Vertex::STRIDE, 32);
        assert_eq!(std::mem::offset_of!(Vertex, normal), 12);
        assert_eq!(std::mem::offset_of!(Vertex, uv), 24);
    }

    #[test]
    fn uniform_sizes_follow_wgsl_alignment() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 144);
        assert_eq!(std::mem::size_of::<LightUniform>(), 80);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 128);
    }

    #[test]
    fn from_row_splits_interleaved_attributes() {
        let v = Vertex::from_row([1.0, 2.0, 3.0, 0.0, 0.0, -1.0, 0.5, 0.25]);
        assert_eq!(v.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(v.normal, Vec3::NEG_Z);
        assert_eq!(v.uv, Vec2::new(0.5, 0.25));
    }

    #[test]
    fn bindings_map_to_fixed_groups() {
        let buffer = BufferHandle(1);
        assert_eq!(Bindings::Frame { camera: buffer, light: buffer }.group(), 0);
        assert_eq!(Bindings::Object { uniform: buffer }.group(), 1);
        let material = Bindings::Material {
            texture: TextureHandle(2),
            sampler: SamplerHandle(3),
        };
        assert_eq!(material.group(), 2);
    }

    #[test]
    fn oversized_textures_are_rejected() {
        let desc = TextureDescriptor::sampled("front", 8193, 16, TextureFormat::Rgba8UnormSrgb);
        assert!(matches!(
            desc.validate(8192, None),
            Err(BackendError::TextureCreationFailed(msg)) if msg.contains("8193x16")
        ));

        let tall = TextureDescriptor::sampled("left", 16, 8193, TextureFormat::Rgba8UnormSrgb);
        assert!(tall.validate(8192, None).is_err());

        let fits = TextureDescriptor::sampled("front", 8192, 1, TextureFormat::Rgba8UnormSrgb);
        let pixels = vec![0u8; 8192 * 4];
        assert!(fits.validate(8192, Some(pixels.as_slice())).is_ok());
    }

    #[test]
    fn upload_size_must_match_the_extent() {
        let desc = TextureDescriptor::sampled("t", 2, 2, TextureFormat::Rgba8UnormSrgb);
        assert!(desc.validate(64, Some(&[0; 15])).is_err());
        assert!(desc.validate(64, Some(&[0; 16])).is_ok());
        assert!(TextureDescriptor::sampled("t", 0, 2, TextureFormat::Rgba8UnormSrgb)
            .validate(64, None)
            .is_err());
    }

    #[test]
    fn depth_target_is_never_empty() {
        let desc = TextureDescriptor::depth_target(0, 0);
        assert_eq!((desc.width, desc.height), (1, 1));
        assert_eq!(desc.kind, TextureKind::DepthTarget);
    }
}
