use std::path::PathBuf;

use thiserror::Error;

/// Failure to obtain a frame at all. Recognition misses are `None`
/// readings, not errors.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("cannot load {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
