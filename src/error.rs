use std::path::PathBuf;

use thiserror::Error;

/// Reading the framebuffer back into a photo failed.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("surface format {0} cannot be read back as RGBA8")]
    UnsupportedFormat(String),
    #[error("surface was not created with COPY_SRC usage")]
    NotCopyable,
    #[error("failed to map read-back buffer: {0}")]
    Map(String),
    #[error("read-back produced {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("no frame was rendered before capture")]
    NoFrame,
}

/// Loading the settings file failed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}
