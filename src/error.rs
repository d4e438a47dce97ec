//! Application error type

use crate::backend::BackendError;
use crate::scene::LayerId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DioramaError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Failed to load texture {}: {source}", path.display())]
    TextureLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to read shader source {}: {source}", path.display())]
    ShaderLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No texture supplied for the {0:?} layer")]
    MissingTexture(LayerId),

    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

pub type DioramaResult<T> = Result<T, DioramaError>;
