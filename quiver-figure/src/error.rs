use quiver_common::error::QuiverCommonError;
use quiver_marks::error::QuiverMarkError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuiverFigureError {
    #[error("Unknown mark type: `{0}`")]
    UnknownMarkType(String),

    #[error("Render error: `{0}`")]
    Render(String),

    #[error(transparent)]
    Mark(#[from] QuiverMarkError),

    #[error(transparent)]
    Common(#[from] QuiverCommonError),
}
