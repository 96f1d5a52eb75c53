pub mod datum;
pub mod drag;
pub mod element;
pub mod error;
pub mod interaction;
pub mod lines;
pub mod message;
pub mod model;
pub mod parent;
pub mod scale_binding;
pub mod scatter;
pub mod selection;
pub mod style;
pub mod tooltip;
pub mod view;

pub use model::{MarkAttributes, MarkChange, MarkModel};
pub use view::MarkView;
