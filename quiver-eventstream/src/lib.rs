pub mod manager;
pub mod scene;
pub mod semantic;
pub mod window;

pub use manager::{EventStreamManager, MarkPicker};
pub use scene::{MarkInstance, MarkItem, ModifiersState, SceneGraphEvent, SceneGraphEventType};
pub use semantic::{DispatchOutcome, EventMetadata, SemanticEvent};
pub use window::{
    ElementState, Key, MouseButton, NamedKey, WindowCursorMoved, WindowEvent, WindowKeyboardInput,
    WindowMouseInput, WindowResizeEvent,
};
