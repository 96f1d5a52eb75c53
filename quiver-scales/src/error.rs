#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuiverScaleError {
    #[error("Empty domain")]
    EmptyDomain,

    #[error("Unknown scale role: {0}")]
    UnknownRole(String),

    #[error("Invalid color range entry: {0}")]
    InvalidColor(String),

    #[error("Scale {0} is not a color scale")]
    NotAColorScale(String),
}

impl From<quiver_common::error::QuiverCommonError> for QuiverScaleError {
    fn from(err: quiver_common::error::QuiverCommonError) -> Self {
        QuiverScaleError::InvalidColor(err.to_string())
    }
}
