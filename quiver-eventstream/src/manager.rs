use crate::scene::{
    MarkInstance, MarkItem, ModifiersState, SceneClickEvent, SceneCursorMovedEvent,
    SceneDragEvent, SceneGraphEvent, SceneMouseDownEvent, SceneMouseEnterEvent,
    SceneMouseLeaveEvent, SceneMouseUpEvent,
};
use crate::window::{ElementState, Key, MouseButton, NamedKey, WindowEvent, WindowKeyboardInput};

/// Finds the top-most mark item under a position
pub trait MarkPicker {
    fn pick(&self, position: [f32; 2]) -> Option<MarkInstance>;
}

impl<F: Fn([f32; 2]) -> Option<MarkInstance>> MarkPicker for F {
    fn pick(&self, position: [f32; 2]) -> Option<MarkInstance> {
        self(position)
    }
}

#[derive(Debug, Clone)]
struct DragTracking {
    mark_instance: MarkInstance,
    origin: [f32; 2],
    moved: bool,
}

/// Turns raw window events into scene events.
///
/// Tracks the hovered item to synthesize enter/leave, pairs press and release on the same
/// item into clicks, and follows left-button gestures that start on an element as drags.
/// A drag that moved suppresses the click its release would otherwise produce.
#[derive(Debug, Default)]
pub struct EventStreamManager {
    current_mark: Option<MarkInstance>,
    // Track current cursor position
    current_cursor_position: Option<[f32; 2]>,
    // Track current mousedown mark, used for click determination
    mousedown_mark: Option<MarkInstance>,
    mousedown_button: Option<MouseButton>,
    drag: Option<DragTracking>,
    modifiers: ModifiersState,
}

impl EventStreamManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn update_modifiers(&mut self, input: &WindowKeyboardInput) {
        match (input.key, input.state) {
            (Key::Named(NamedKey::Shift), ElementState::Pressed) => self.modifiers.shift = true,
            (Key::Named(NamedKey::Shift), ElementState::Released) => self.modifiers.shift = false,
            (Key::Named(NamedKey::Control), ElementState::Pressed) => self.modifiers.control = true,
            (Key::Named(NamedKey::Control), ElementState::Released) => {
                self.modifiers.control = false
            }
            (Key::Named(NamedKey::Alt), ElementState::Pressed) => self.modifiers.alt = true,
            (Key::Named(NamedKey::Alt), ElementState::Released) => self.modifiers.alt = false,
            (Key::Named(NamedKey::Super), ElementState::Pressed) => self.modifiers.meta = true,
            (Key::Named(NamedKey::Super), ElementState::Released) => self.modifiers.meta = false,
            _ => {}
        }
    }

    pub fn dispatch_event(
        &mut self,
        event: &WindowEvent,
        picker: &dyn MarkPicker,
    ) -> Vec<SceneGraphEvent> {
        let mut events = Vec::new();
        match event {
            WindowEvent::KeyboardInput(input) => self.update_modifiers(input),
            WindowEvent::CursorMoved(e) => {
                self.current_cursor_position = Some(e.position);
                self.handle_cursor_moved(e.position, picker, &mut events);
            }
            WindowEvent::CursorLeft => {
                if let (Some(prev), Some(position)) =
                    (self.current_mark.take(), self.current_cursor_position)
                {
                    events.push(self.leave_event(position, prev));
                }
            }
            WindowEvent::MouseInput(input) => {
                if let Some(position) = self.current_cursor_position {
                    match input.state {
                        ElementState::Pressed => {
                            self.handle_mouse_down(position, input.button, picker, &mut events)
                        }
                        ElementState::Released => {
                            self.handle_mouse_up(position, input.button, picker, &mut events)
                        }
                    }
                }
            }
            WindowEvent::CursorEntered | WindowEvent::WindowResize(_) => {}
        }
        events
    }

    fn handle_cursor_moved(
        &mut self,
        position: [f32; 2],
        picker: &dyn MarkPicker,
        events: &mut Vec<SceneGraphEvent>,
    ) {
        // The dragged element follows the pointer, so hover tracking pauses mid-drag
        if let Some(drag) = self.drag.as_mut() {
            drag.moved = true;
            events.push(SceneGraphEvent::Drag(SceneDragEvent {
                position,
                origin: drag.origin,
                mark_instance: drag.mark_instance.clone(),
                modifiers: self.modifiers,
            }));
            return;
        }

        let mark_instance = picker.pick(position);
        self.handle_mark_mouse_events(position, mark_instance.clone(), events);
        events.push(SceneGraphEvent::CursorMoved(SceneCursorMovedEvent {
            position,
            mark_instance,
            modifiers: self.modifiers,
        }));
    }

    fn handle_mouse_down(
        &mut self,
        position: [f32; 2],
        button: MouseButton,
        picker: &dyn MarkPicker,
        events: &mut Vec<SceneGraphEvent>,
    ) {
        let mark_instance = picker.pick(position);
        self.mousedown_mark = mark_instance.clone();
        self.mousedown_button = Some(button);
        events.push(SceneGraphEvent::MouseDown(SceneMouseDownEvent {
            position,
            button,
            mark_instance: mark_instance.clone(),
            modifiers: self.modifiers,
        }));

        if let Some(instance) = mark_instance {
            if button == MouseButton::Left && matches!(instance.item, MarkItem::Element(_)) {
                events.push(SceneGraphEvent::DragStart(SceneDragEvent {
                    position,
                    origin: position,
                    mark_instance: instance.clone(),
                    modifiers: self.modifiers,
                }));
                self.drag = Some(DragTracking {
                    mark_instance: instance,
                    origin: position,
                    moved: false,
                });
            }
        }
    }

    fn handle_mouse_up(
        &mut self,
        position: [f32; 2],
        button: MouseButton,
        picker: &dyn MarkPicker,
        events: &mut Vec<SceneGraphEvent>,
    ) {
        let mut suppress_click = false;
        if button == MouseButton::Left {
            if let Some(drag) = self.drag.take() {
                suppress_click = drag.moved;
                events.push(SceneGraphEvent::DragEnd(SceneDragEvent {
                    position,
                    origin: drag.origin,
                    mark_instance: drag.mark_instance,
                    modifiers: self.modifiers,
                }));
            }
        }

        let mark_instance = picker.pick(position);
        events.push(SceneGraphEvent::MouseUp(SceneMouseUpEvent {
            position,
            button,
            mark_instance: mark_instance.clone(),
            modifiers: self.modifiers,
        }));

        // Check if both mark and button match
        if !suppress_click
            && self.mousedown_mark.as_ref() == mark_instance.as_ref()
            && self.mousedown_button == Some(button)
        {
            events.push(SceneGraphEvent::Click(SceneClickEvent {
                position,
                button,
                mark_instance: mark_instance.clone(),
                modifiers: self.modifiers,
            }));
        }
        self.mousedown_mark = None;
        self.mousedown_button = None;

        if suppress_click {
            // Re-sync hover with whatever ended up under the pointer
            self.handle_mark_mouse_events(position, mark_instance, events);
        }
    }

    fn leave_event(&self, position: [f32; 2], mark_instance: MarkInstance) -> SceneGraphEvent {
        SceneGraphEvent::MouseLeave(SceneMouseLeaveEvent {
            position,
            mark_instance,
            modifiers: self.modifiers,
        })
    }

    fn enter_event(&self, position: [f32; 2], mark_instance: MarkInstance) -> SceneGraphEvent {
        SceneGraphEvent::MouseEnter(SceneMouseEnterEvent {
            position,
            mark_instance,
            modifiers: self.modifiers,
        })
    }

    fn handle_mark_mouse_events(
        &mut self,
        position: [f32; 2],
        current_mark: Option<MarkInstance>,
        events: &mut Vec<SceneGraphEvent>,
    ) {
        match (&self.current_mark, &current_mark) {
            (Some(prev), Some(curr)) if prev != curr => {
                events.push(self.leave_event(position, prev.clone()));
                events.push(self.enter_event(position, curr.clone()));
            }
            (Some(prev), None) => {
                events.push(self.leave_event(position, prev.clone()));
            }
            (None, Some(curr)) => {
                events.push(self.enter_event(position, curr.clone()));
            }
            _ => {}
        }
        self.current_mark = current_mark;
    }

    pub fn modifiers(&self) -> ModifiersState {
        self.modifiers
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }
}
