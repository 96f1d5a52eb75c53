use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuiverCommonError {
    #[error("Invalid css color: `{0}`")]
    InvalidColor(String),

    #[error("Message encoding error: {0}")]
    MessageEncoding(String),
}
