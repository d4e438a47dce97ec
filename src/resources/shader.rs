//! Shader source loading

use crate::error::{DioramaError, DioramaResult};
use std::path::{Path, PathBuf};

pub const VERTEX_SHADER_FILE: &str = "layer.vert.wgsl";
pub const FRAGMENT_SHADER_FILE: &str = "layer.frag.wgsl";

/// WGSL text for the layer pipeline's two stages
#[derive(Debug, Clone)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    /// Read both stage sources from `dir`
    pub fn load(dir: &Path) -> DioramaResult<Self> {
        Ok(Self {
            vertex: read_source(dir.join(VERTEX_SHADER_FILE))?,
            fragment: read_source(dir.join(FRAGMENT_SHADER_FILE))?,
        })
    }
}

fn read_source(path: PathBuf) -> DioramaResult<String> {
    log::info!("Reading shader {}", path.display());
    std::fs::read_to_string(&path).map_err(|source| DioramaError::ShaderLoad { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_shaders_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("shaders");
        let sources = ShaderSources::load(&dir).unwrap();
        assert!(sources.vertex.contains("fn vs_main"));
        assert!(sources.fragment.contains("fn fs_main"));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let err = ShaderSources::load(Path::new("no/such/dir")).unwrap_err();
        assert!(matches!(err, DioramaError::ShaderLoad { .. }));
        assert!(err.to_string().contains(VERTEX_SHADER_FILE));
    }
}
