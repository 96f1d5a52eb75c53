pub mod context;
pub mod error;
pub mod factory;
pub mod figure;
pub mod lifecycle;
pub mod model;
pub mod renderer;
pub mod scene;

pub use figure::Figure;
pub use lifecycle::ViewLifecycleManager;
pub use model::{FigureAttributes, FigureModel};
