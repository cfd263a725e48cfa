//! Append-only event log (spec §6 "Event log": external interface read by
//! snapshot/event observers of the Engine Manager).
//!
//! [`EventLog`] implements [`tessera_core::events::EventSink`] so the loop
//! thread can append to it directly during a tick, exactly the way the
//! teacher's `ChangeJournal` was populated by command application. Unlike the
//! teacher's journal -- which recorded every raw component mutation with
//! causality metadata -- this log only ever receives the higher-level
//! [`SimEvent`]s the core crate already chooses to emit (combat resolved,
//! entity died, quest completed, ...); per-field diffing is out of scope here,
//! since `tessera-core` has no component registry to diff against.
//!
//! The log may be unbounded (the default) or capped at a fixed capacity, in
//! which case it behaves as a ring buffer and the oldest entries are evicted
//! first -- the spec's "append-only ring or unbounded buffer" wording.
//!
//! # Query API
//!
//! Entries can be filtered by:
//! - **Tick**: [`EventLog::since_tick`]
//! - **Category**: [`EventLog::by_category`]
//! - **Entity**: [`EventLog::by_entity`]
//!
//! # Example
//!
//! ```
//! use tessera_manifest::journal::EventLog;
//! use tessera_core::events::{EventCategory, EventSink, SimEvent};
//!
//! let mut log = EventLog::unbounded();
//! log.emit(SimEvent::new(1, EventCategory::Combat, "hit resolved"));
//!
//! assert_eq!(log.len(), 1);
//! assert_eq!(log.by_category(EventCategory::Combat).count(), 1);
//! ```

use std::collections::VecDeque;

use tessera_core::events::{EventCategory, EventSink, SimEvent};
use tessera_core::ids::EntityId;

/// Append-only buffer of [`SimEvent`]s, optionally capped at a fixed
/// capacity (ring-buffer eviction of the oldest entry).
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<SimEvent>,
    capacity: Option<usize>,
}

impl EventLog {
    /// An event log with no capacity limit -- entries accumulate forever.
    pub fn unbounded() -> Self {
        Self { entries: VecDeque::new(), capacity: None }
    }

    /// A ring buffer that retains at most `capacity` entries, evicting the
    /// oldest entry once full.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: VecDeque::with_capacity(capacity.min(4096)), capacity: Some(capacity) }
    }

    /// Number of entries currently retained.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every recorded entry. Not required by the tick loop (the log is
    /// append-only across ticks) but useful for long-running hosts that want
    /// to periodically reset the buffer.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All entries in append order, oldest first.
    pub fn all(&self) -> impl Iterator<Item = &SimEvent> {
        self.entries.iter()
    }

    /// Entries at or after the given tick.
    pub fn since_tick(&self, tick: i64) -> impl Iterator<Item = &SimEvent> {
        self.entries.iter().filter(move |e| e.tick >= tick)
    }

    /// Entries belonging to a given category.
    pub fn by_category(&self, category: EventCategory) -> impl Iterator<Item = &SimEvent> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    /// Entries whose `entity_ids` mention the given entity.
    pub fn by_entity(&self, entity_id: EntityId) -> impl Iterator<Item = &SimEvent> {
        self.entries.iter().filter(move |e| e.entity_ids.contains(&entity_id))
    }

    /// Serialize every retained entry to a JSON array, for hosts that expose
    /// the event log over an HTTP/IPC observer surface rather than linking
    /// against this crate directly.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.entries.iter().collect::<Vec<_>>())
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: SimEvent) {
        self.entries.push_back(event);
        if let Some(cap) = self.capacity {
            while self.entries.len() > cap {
                self.entries.pop_front();
            }
        }
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::unbounded()
    }
}
