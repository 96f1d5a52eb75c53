use quiver_common::error::QuiverCommonError;
use quiver_scales::error::QuiverScaleError;
use quiver_scales::ScaleRole;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuiverMarkError {
    #[error("No `{0}` scale on the mark and no figure default")]
    MissingScale(ScaleRole),

    #[error("Index {index} out of bounds for mark data of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Message encoding error: {0}")]
    MessageEncoding(#[from] serde_json::Error),

    #[error(transparent)]
    Scale(#[from] QuiverScaleError),

    #[error(transparent)]
    Common(#[from] QuiverCommonError),
}
