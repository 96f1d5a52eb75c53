pub mod binding;
pub mod canvas;
pub mod channel;
pub mod color;
pub mod error;
pub mod signal;
pub mod style;
pub mod value;
