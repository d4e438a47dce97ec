//! Texture loading and upload

use crate::backend::traits::*;
use crate::backend::types::*;
use crate::error::{DioramaError, DioramaResult};
use crate::scene::LayerId;
use image::{DynamicImage, GenericImageView};
use std::path::Path;

/// Decoded RGBA8 image
#[derive(Debug, Clone)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub data: Vec<u8>,
    pub name: String,
}

impl TextureData {
    /// Load texture from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> DioramaResult<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let img = image::open(path).map_err(|source| DioramaError::TextureLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_image(img, &name))
    }

    fn from_image(img: DynamicImage, name: &str) -> Self {
        let (width, height) = img.dimensions();
        let data = img.to_rgba8().into_raw();

        Self {
            width,
            height,
            format: TextureFormat::Rgba8UnormSrgb,
            data,
            name: name.to_string(),
        }
    }

    /// Create a solid color texture
    pub fn solid_color(color: [u8; 4], name: &str) -> Self {
        Self {
            width: 1,
            height: 1,
            format: TextureFormat::Rgba8UnormSrgb,
            data: color.to_vec(),
            name: name.to_string(),
        }
    }
}

/// Load the six layer images from `dir`, in draw order
///
/// Any missing or undecodable file aborts the whole load.
pub fn load_layer_textures(dir: &Path) -> DioramaResult<Vec<(LayerId, TextureData)>> {
    LayerId::DRAW_ORDER
        .iter()
        .map(|&layer| {
            let path = dir.join(format!("{}.png", layer.file_stem()));
            log::info!("Loading {}", path.display());
            TextureData::from_file(&path).map(|data| (layer, data))
        })
        .collect()
}

/// Uploaded layer texture
#[derive(Debug, Clone)]
pub struct GpuTexture {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
    pub name: String,
}

impl GpuTexture {
    pub fn create<B: GraphicsBackend>(backend: &mut B, data: &TextureData) -> BackendResult<Self> {
        let desc =
            TextureDescriptor::sampled(data.name.as_str(), data.width, data.height, data.format);
        let handle = backend.create_texture(&desc, Some(&data.data))?;

        Ok(Self {
            handle,
            width: data.width,
            height: data.height,
            name: data.name.clone(),
        })
    }
}
