//! tessera-manifest -- the append-only event log the Engine Manager exposes
//! to external observers (spec §6 "Event log").
//!
//! `tessera-core` never stores the `SimEvent`s it produces; it hands each one
//! to whatever `EventSink` the caller supplies (spec's layering: persistence
//! lives one layer above the simulation kernel). This crate provides that
//! sink: [`journal::EventLog`] accumulates events across ticks and lets a host
//! application query them by tick, category, or entity.
//!
//! # Modules
//!
//! - [`journal`]: the [`journal::EventLog`] event sink and its query API.

#![deny(unsafe_code)]

pub mod journal;

pub use journal::EventLog;
