use lumen_core::SceneError;
use thiserror::Error;

/// Reasons a render can fail before producing any pixels.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid scene: {0}")]
    Scene(#[from] SceneError),

    #[error("cannot render a {width}x{height} image")]
    EmptyImage { width: u32, height: u32 },

    #[error("failed to start render workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
