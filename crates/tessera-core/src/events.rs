//! Structured tick events (spec §7 "Event log"). `tessera-core` only needs
//! to produce these — it never needs to store or query them — so the sink
//! is a trait object the caller supplies. `tessera-manifest`'s journal
//! implements `EventSink` without `tessera-core` depending on it back.

use crate::ids::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    Combat,
    Movement,
    Loot,
    Lifecycle,
    Social,
    Economy,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimEvent {
    pub tick: i64,
    pub category: EventCategory,
    pub message: String,
    pub entity_ids: Vec<EntityId>,
    pub metadata: HashMap<String, String>,
}

impl SimEvent {
    pub fn new(tick: i64, category: EventCategory, message: impl Into<String>) -> Self {
        Self { tick, category, message: message.into(), entity_ids: Vec::new(), metadata: HashMap::new() }
    }

    pub fn with_entities(mut self, entity_ids: impl IntoIterator<Item = EntityId>) -> Self {
        self.entity_ids.extend(entity_ids);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

pub trait EventSink {
    fn emit(&mut self, event: SimEvent);
}

/// Discards everything. Useful for tests and headless runs that don't need
/// an event log.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: SimEvent) {}
}

/// In-memory sink used by tests that want to assert on what was emitted.
#[derive(Debug, Default)]
pub struct VecSink(pub Vec<SimEvent>);

impl EventSink for VecSink {
    fn emit(&mut self, event: SimEvent) {
        self.0.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_sink_records_every_emitted_event() {
        let mut sink = VecSink::default();
        sink.emit(SimEvent::new(1, EventCategory::Combat, "hit"));
        sink.emit(SimEvent::new(2, EventCategory::Loot, "pickup"));
        assert_eq!(sink.0.len(), 2);
    }

    #[test]
    fn builder_methods_attach_entities_and_metadata() {
        let event = SimEvent::new(5, EventCategory::Combat, "attack resolved")
            .with_entities([EntityId::new(1), EntityId::new(2)])
            .with_metadata("damage", "12.5");
        assert_eq!(event.entity_ids.len(), 2);
        assert_eq!(event.metadata.get("damage"), Some(&"12.5".to_string()));
    }
}
