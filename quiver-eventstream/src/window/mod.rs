#[cfg(feature = "winit_support")]
mod winit;

/// Native window events, in logical coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    WindowResize(WindowResizeEvent),
    MouseInput(WindowMouseInput),
    CursorMoved(WindowCursorMoved),
    CursorEntered,
    CursorLeft,
    KeyboardInput(WindowKeyboardInput),
}

impl WindowEvent {
    pub fn position(&self) -> Option<[f32; 2]> {
        match self {
            Self::CursorMoved(event) => Some(event.position),
            _ => None,
        }
    }

    pub fn cursor_moved(x: f32, y: f32) -> Self {
        Self::CursorMoved(WindowCursorMoved { position: [x, y] })
    }

    pub fn mouse_input(state: ElementState, button: MouseButton) -> Self {
        Self::MouseInput(WindowMouseInput { state, button })
    }

    pub fn key(key: NamedKey, state: ElementState) -> Self {
        Self::KeyboardInput(WindowKeyboardInput {
            key: Key::Named(key),
            state,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowResizeEvent {
    pub size: [f32; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowMouseInput {
    pub state: ElementState,
    pub button: MouseButton,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowCursorMoved {
    pub position: [f32; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowKeyboardInput {
    pub key: Key,
    pub state: ElementState,
}

#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy)]
pub enum Key {
    Named(NamedKey),
    Character(char),
}

#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy)]
pub enum NamedKey {
    // Navigation
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    // UI control
    Backspace,
    Delete,
    Enter,
    Escape,
    Tab,
    Space,
    // Modifiers
    Alt,
    Control,
    Shift,
    Super,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}
