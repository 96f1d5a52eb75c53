use super::*;
use ::winit::dpi::{PhysicalPosition, PhysicalSize};
use ::winit::event::{
    ElementState as WinitElementState, MouseButton as WinitMouseButton, WindowEvent as WinitEvent,
};
use ::winit::keyboard::{Key as WinitKey, NamedKey as WinitNamedKey};

/// Physical pixels to the logical coordinates figures work in
fn logical_point(position: PhysicalPosition<f64>, scale: f32) -> [f32; 2] {
    [position.x as f32 / scale, position.y as f32 / scale]
}

fn logical_size(size: PhysicalSize<u32>, scale: f32) -> [f32; 2] {
    [size.width as f32 / scale, size.height as f32 / scale]
}

impl WindowEvent {
    /// Convert a winit event, dividing physical positions by the window `scale` factor.
    ///
    /// Events a figure does not react to map to `None`.
    pub fn from_winit_event(event: WinitEvent, scale: f32) -> Option<Self> {
        Some(match event {
            WinitEvent::Resized(size) => Self::WindowResize(WindowResizeEvent {
                size: logical_size(size, scale),
            }),
            WinitEvent::CursorMoved { position, .. } => Self::CursorMoved(WindowCursorMoved {
                position: logical_point(position, scale),
            }),
            WinitEvent::CursorEntered { .. } => Self::CursorEntered,
            WinitEvent::CursorLeft { .. } => Self::CursorLeft,
            WinitEvent::MouseInput { state, button, .. } => {
                Self::mouse_input(state.into(), button.into())
            }
            WinitEvent::KeyboardInput { event, .. } => Self::KeyboardInput(WindowKeyboardInput {
                key: Key::from_winit(event.logical_key)?,
                state: event.state.into(),
            }),
            _ => return None,
        })
    }
}

impl Key {
    fn from_winit(key: WinitKey) -> Option<Self> {
        match key {
            WinitKey::Named(named) => NamedKey::try_from(named).ok().map(Key::Named),
            WinitKey::Character(text) => text.chars().next().map(Key::Character),
            _ => None,
        }
    }
}

impl From<WinitElementState> for ElementState {
    fn from(state: WinitElementState) -> Self {
        if state.is_pressed() {
            ElementState::Pressed
        } else {
            ElementState::Released
        }
    }
}

impl From<WinitMouseButton> for MouseButton {
    fn from(button: WinitMouseButton) -> Self {
        match button {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            WinitMouseButton::Back => MouseButton::Other(3),
            WinitMouseButton::Forward => MouseButton::Other(4),
            WinitMouseButton::Other(code) => MouseButton::Other(code),
        }
    }
}

impl TryFrom<WinitNamedKey> for NamedKey {
    type Error = ();

    /// Only the keys figures bind (selection modifiers and editing keys) are converted
    fn try_from(key: WinitNamedKey) -> Result<Self, Self::Error> {
        Ok(match key {
            WinitNamedKey::ArrowDown => NamedKey::ArrowDown,
            WinitNamedKey::ArrowLeft => NamedKey::ArrowLeft,
            WinitNamedKey::ArrowRight => NamedKey::ArrowRight,
            WinitNamedKey::ArrowUp => NamedKey::ArrowUp,
            WinitNamedKey::Backspace => NamedKey::Backspace,
            WinitNamedKey::Delete => NamedKey::Delete,
            WinitNamedKey::Enter => NamedKey::Enter,
            WinitNamedKey::Escape => NamedKey::Escape,
            WinitNamedKey::Tab => NamedKey::Tab,
            WinitNamedKey::Space => NamedKey::Space,
            WinitNamedKey::Alt => NamedKey::Alt,
            WinitNamedKey::Control => NamedKey::Control,
            WinitNamedKey::Shift => NamedKey::Shift,
            WinitNamedKey::Meta | WinitNamedKey::Super => NamedKey::Super,
            _ => return Err(()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::winit::event::DeviceId;

    fn device() -> DeviceId {
        // SAFETY: the dummy id is only compared, never passed to the platform
        unsafe { DeviceId::dummy() }
    }

    #[test]
    fn test_positions_are_logical() {
        let moved = WinitEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(130.0, 90.0),
        };
        assert_eq!(
            WindowEvent::from_winit_event(moved, 2.0),
            Some(WindowEvent::cursor_moved(65.0, 45.0))
        );

        let resized = WinitEvent::Resized(PhysicalSize::new(1280, 960));
        assert_eq!(
            WindowEvent::from_winit_event(resized, 2.0),
            Some(WindowEvent::WindowResize(WindowResizeEvent {
                size: [640.0, 480.0]
            }))
        );
    }

    #[test]
    fn test_mouse_input() {
        let pressed = WinitEvent::MouseInput {
            device_id: device(),
            state: WinitElementState::Pressed,
            button: WinitMouseButton::Back,
        };
        assert_eq!(
            WindowEvent::from_winit_event(pressed, 1.0),
            Some(WindowEvent::mouse_input(
                ElementState::Pressed,
                MouseButton::Other(3)
            ))
        );
        assert_eq!(
            WindowEvent::from_winit_event(WinitEvent::Focused(true), 1.0),
            None
        );
    }

    #[test]
    fn test_named_keys() {
        assert_eq!(NamedKey::try_from(WinitNamedKey::Meta), Ok(NamedKey::Super));
        assert_eq!(NamedKey::try_from(WinitNamedKey::F1), Err(()));
        assert_eq!(
            Key::from_winit(WinitKey::Character("q".into())),
            Some(Key::Character('q'))
        );
    }
}
