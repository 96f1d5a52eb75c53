pub mod color;
pub mod error;
pub mod linear;
pub mod model;
pub mod role;

pub use model::{DomainOwner, ScaleConfig, ScaleEvent, ScaleKind, ScaleModel, ScaleRef};
pub use role::{ScaleRefresh, ScaleRole};
