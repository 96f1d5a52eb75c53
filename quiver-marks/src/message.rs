use quiver_common::binding::ModelId;
use quiver_common::channel::{MessageChannel, OutboundMessage};
use serde::Serialize;
use strum::IntoStaticStr;

use crate::datum::{DataPoint, MarkDatum};
use crate::error::QuiverMarkError;

/// Messages a mark view sends about user interaction
#[derive(Debug, Clone, PartialEq, Serialize, IntoStaticStr)]
#[serde(untagged)]
#[strum(serialize_all = "snake_case")]
pub enum MarkMessage {
    Hover {
        data: MarkDatum,
        index: usize,
    },
    ElementClick {
        data: MarkDatum,
        index: usize,
    },
    LegendClick {},
    BackgroundClick {},
    DragStart {
        point: DataPoint,
        index: usize,
    },
    Drag {
        origin: DataPoint,
        point: DataPoint,
        index: usize,
    },
    DragEnd {
        point: DataPoint,
        index: usize,
    },
}

impl MarkMessage {
    pub fn event_name(&self) -> &'static str {
        self.into()
    }

    pub fn to_outbound(&self) -> Result<OutboundMessage, QuiverMarkError> {
        Ok(OutboundMessage::new(
            self.event_name(),
            serde_json::to_value(self)?,
        ))
    }

    /// Send on behalf of `source`. Encoding failures are logged and the message dropped.
    pub fn send(&self, channel: &dyn MessageChannel, source: &ModelId) {
        match self.to_outbound() {
            Ok(message) => channel.send(source, message),
            Err(err) => log::error!("Failed to encode {} message: {err}", self.event_name()),
        }
    }
}
