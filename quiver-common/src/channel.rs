//! Outbound messages and the model commit hook.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use crate::binding::ModelId;

/// Fire-and-forget message sent on behalf of a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub event: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl OutboundMessage {
    pub fn new(event: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }
}

/// Connection between models and whatever synchronizes them
pub trait MessageChannel {
    /// Send a message. No acknowledgement is expected.
    fn send(&self, source: &ModelId, message: OutboundMessage);

    /// Mark the current state of `source` as committed
    fn touch(&self, source: &ModelId);
}

/// Channel that drops everything
#[derive(Debug, Clone, Default)]
pub struct NullChannel;

impl MessageChannel for NullChannel {
    fn send(&self, _source: &ModelId, _message: OutboundMessage) {}

    fn touch(&self, _source: &ModelId) {}
}

/// Channel that keeps every message and touch in memory
#[derive(Debug, Default)]
pub struct RecordingChannel {
    messages: RefCell<Vec<(ModelId, OutboundMessage)>>,
    touches: RefCell<Vec<ModelId>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(ModelId, OutboundMessage)> {
        self.messages.borrow().clone()
    }

    /// Event names of all recorded messages, in send order
    pub fn events(&self) -> Vec<String> {
        self.messages
            .borrow()
            .iter()
            .map(|(_, m)| m.event.clone())
            .collect()
    }

    pub fn last_message(&self) -> Option<OutboundMessage> {
        self.messages.borrow().last().map(|(_, m)| m.clone())
    }

    pub fn touch_count(&self, source: &ModelId) -> usize {
        self.touches.borrow().iter().filter(|id| *id == source).count()
    }

    pub fn clear(&self) {
        self.messages.borrow_mut().clear();
        self.touches.borrow_mut().clear();
    }
}

impl MessageChannel for RecordingChannel {
    fn send(&self, source: &ModelId, message: OutboundMessage) {
        log::trace!("{source} -> {}", message.event);
        self.messages.borrow_mut().push((source.clone(), message));
    }

    fn touch(&self, source: &ModelId) {
        self.touches.borrow_mut().push(source.clone());
    }
}
