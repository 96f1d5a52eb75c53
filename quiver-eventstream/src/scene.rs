use quiver_common::binding::ModelId;

use crate::window::MouseButton;

/// The part of a mark an event landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkItem {
    Element(usize),
    Legend,
}

/// A picked item of a specific mark
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkInstance {
    pub mark: ModelId,
    pub item: MarkItem,
    /// View that drew the item. Several views may show the same mark.
    pub view: Option<ModelId>,
}

impl MarkInstance {
    pub fn element(mark: &ModelId, index: usize) -> Self {
        Self {
            mark: mark.clone(),
            item: MarkItem::Element(index),
            view: None,
        }
    }

    pub fn legend(mark: &ModelId) -> Self {
        Self {
            mark: mark.clone(),
            item: MarkItem::Legend,
            view: None,
        }
    }

    pub fn with_view(mut self, view: &ModelId) -> Self {
        self.view = Some(view.clone());
        self
    }

    pub fn element_index(&self) -> Option<usize> {
        match self.item {
            MarkItem::Element(index) => Some(index),
            MarkItem::Legend => None,
        }
    }
}

/// Events produced by the [`EventStreamManager`](crate::EventStreamManager).
///
/// `mark_instance` is `None` when the pointer is over the figure background.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneGraphEvent {
    MouseDown(SceneMouseDownEvent),
    MouseUp(SceneMouseUpEvent),
    Click(SceneClickEvent),
    CursorMoved(SceneCursorMovedEvent),
    MouseEnter(SceneMouseEnterEvent),
    MouseLeave(SceneMouseLeaveEvent),
    DragStart(SceneDragEvent),
    Drag(SceneDragEvent),
    DragEnd(SceneDragEvent),
}

impl SceneGraphEvent {
    pub fn position(&self) -> [f32; 2] {
        match self {
            Self::MouseDown(event) => event.position,
            Self::MouseUp(event) => event.position,
            Self::Click(event) => event.position,
            Self::CursorMoved(event) => event.position,
            Self::MouseEnter(event) => event.position,
            Self::MouseLeave(event) => event.position,
            Self::DragStart(event) | Self::Drag(event) | Self::DragEnd(event) => event.position,
        }
    }

    pub fn mark_instance(&self) -> Option<&MarkInstance> {
        match self {
            Self::MouseDown(event) => event.mark_instance.as_ref(),
            Self::MouseUp(event) => event.mark_instance.as_ref(),
            Self::Click(event) => event.mark_instance.as_ref(),
            Self::CursorMoved(event) => event.mark_instance.as_ref(),
            Self::MouseEnter(event) => Some(&event.mark_instance),
            Self::MouseLeave(event) => Some(&event.mark_instance),
            Self::DragStart(event) | Self::Drag(event) | Self::DragEnd(event) => {
                Some(&event.mark_instance)
            }
        }
    }

    pub fn modifiers(&self) -> ModifiersState {
        match self {
            Self::MouseDown(event) => event.modifiers,
            Self::MouseUp(event) => event.modifiers,
            Self::Click(event) => event.modifiers,
            Self::CursorMoved(event) => event.modifiers,
            Self::MouseEnter(event) => event.modifiers,
            Self::MouseLeave(event) => event.modifiers,
            Self::DragStart(event) | Self::Drag(event) | Self::DragEnd(event) => event.modifiers,
        }
    }

    pub fn event_type(&self) -> SceneGraphEventType {
        match self {
            Self::MouseDown(..) => SceneGraphEventType::MouseDown,
            Self::MouseUp(..) => SceneGraphEventType::MouseUp,
            Self::Click(..) => SceneGraphEventType::Click,
            Self::CursorMoved(..) => SceneGraphEventType::CursorMoved,
            Self::MouseEnter(..) => SceneGraphEventType::MarkMouseEnter,
            Self::MouseLeave(..) => SceneGraphEventType::MarkMouseLeave,
            Self::DragStart(..) => SceneGraphEventType::DragStart,
            Self::Drag(..) => SceneGraphEventType::Drag,
            Self::DragEnd(..) => SceneGraphEventType::DragEnd,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneGraphEventType {
    MouseDown,
    MouseUp,
    Click,
    CursorMoved,
    MarkMouseEnter,
    MarkMouseLeave,
    DragStart,
    Drag,
    DragEnd,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneMouseDownEvent {
    pub position: [f32; 2],
    pub button: MouseButton,
    pub mark_instance: Option<MarkInstance>,
    pub modifiers: ModifiersState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneMouseUpEvent {
    pub position: [f32; 2],
    pub button: MouseButton,
    pub mark_instance: Option<MarkInstance>,
    pub modifiers: ModifiersState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneClickEvent {
    pub position: [f32; 2],
    pub button: MouseButton,
    pub mark_instance: Option<MarkInstance>,
    pub modifiers: ModifiersState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneCursorMovedEvent {
    pub position: [f32; 2],
    pub mark_instance: Option<MarkInstance>,
    pub modifiers: ModifiersState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneMouseEnterEvent {
    pub position: [f32; 2],
    pub mark_instance: MarkInstance,
    pub modifiers: ModifiersState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneMouseLeaveEvent {
    pub position: [f32; 2],
    pub mark_instance: MarkInstance,
    pub modifiers: ModifiersState,
}

/// One step of a drag gesture on a single element
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDragEvent {
    pub position: [f32; 2],
    /// Pointer position when the gesture started
    pub origin: [f32; 2],
    pub mark_instance: MarkInstance,
    pub modifiers: ModifiersState,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ModifiersState {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub meta: bool,
}

impl ModifiersState {
    /// Multi-select modifier: control, or meta on macOS keyboards
    pub fn accel(&self) -> bool {
        self.control || self.meta
    }
}
