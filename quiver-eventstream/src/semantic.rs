use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter};

use crate::scene::{MarkItem, SceneGraphEvent};

/// Mark-level meaning of a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SemanticEvent {
    MouseOver,
    MouseMove,
    MouseOut,
    ElementClicked,
    LegendClicked,
    ParentClicked,
    LegendMouseOver,
    LegendMouseOut,
}

/// How a semantic event is reported outside the mark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventMetadata {
    /// Outbound message event name, if one is sent
    pub msg_name: Option<&'static str>,
    /// The event must land on one of the mark's own items
    pub hit_test: bool,
    /// The datum is read back from the model rather than from the rendered element
    pub lookup_data: bool,
}

impl SemanticEvent {
    /// Classify a scene event. Events that carry no mark-level meaning map to `None`.
    pub fn classify(event: &SceneGraphEvent) -> Option<Self> {
        match event {
            SceneGraphEvent::MouseEnter(e) => Some(match e.mark_instance.item {
                MarkItem::Element(_) => Self::MouseOver,
                MarkItem::Legend => Self::LegendMouseOver,
            }),
            SceneGraphEvent::MouseLeave(e) => Some(match e.mark_instance.item {
                MarkItem::Element(_) => Self::MouseOut,
                MarkItem::Legend => Self::LegendMouseOut,
            }),
            SceneGraphEvent::CursorMoved(e) => match e.mark_instance.as_ref()?.item {
                MarkItem::Element(_) => Some(Self::MouseMove),
                MarkItem::Legend => None,
            },
            SceneGraphEvent::Click(e) => Some(match &e.mark_instance {
                Some(instance) => match instance.item {
                    MarkItem::Element(_) => Self::ElementClicked,
                    MarkItem::Legend => Self::LegendClicked,
                },
                None => Self::ParentClicked,
            }),
            _ => None,
        }
    }

    pub fn metadata(&self) -> EventMetadata {
        match self {
            Self::MouseOver => EventMetadata {
                msg_name: Some("hover"),
                hit_test: true,
                lookup_data: false,
            },
            Self::ElementClicked => EventMetadata {
                msg_name: Some("element_click"),
                hit_test: true,
                lookup_data: false,
            },
            Self::LegendClicked => EventMetadata {
                msg_name: Some("legend_click"),
                hit_test: true,
                lookup_data: false,
            },
            Self::ParentClicked => EventMetadata {
                msg_name: Some("background_click"),
                hit_test: false,
                lookup_data: false,
            },
            Self::MouseMove => EventMetadata {
                msg_name: None,
                hit_test: true,
                lookup_data: false,
            },
            Self::MouseOut | Self::LegendMouseOver | Self::LegendMouseOut => EventMetadata {
                msg_name: None,
                hit_test: false,
                lookup_data: false,
            },
        }
    }
}

/// What a handler asked of the event after handling it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub stop_propagation: bool,
    pub prevent_default: bool,
}

impl DispatchOutcome {
    pub fn consumed() -> Self {
        Self {
            stop_propagation: true,
            prevent_default: true,
        }
    }

    pub fn merge(self, other: DispatchOutcome) -> Self {
        Self {
            stop_propagation: self.stop_propagation || other.stop_propagation,
            prevent_default: self.prevent_default || other.prevent_default,
        }
    }
}
