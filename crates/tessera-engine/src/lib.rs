//! tessera-engine -- the Engine Manager (spec §4.12): the host-facing
//! binding that owns a [`tessera_core::world::World`], drives it on a
//! dedicated tick-paced thread, and exposes the lifecycle/observer surface
//! an external host (CLI, test harness, HTTP server) drives.
//!
//! `tessera-core` is the deterministic simulation kernel and never spawns a
//! thread or installs a logger; `tessera-manifest` is the event log it can
//! be made to write through. This crate is the layer above both: the only
//! place in the workspace that owns a background thread, installs a
//! `tracing` subscriber, or returns `anyhow::Result` instead of `SimResult`.
//!
//! # Quick Start
//!
//! ```no_run
//! use tessera_engine::prelude::*;
//! use std::sync::Arc;
//!
//! tessera_engine::logging::init_tracing();
//!
//! let config = SimulationConfig::default().with_grid_size(32, 32).with_worker_count(2);
//! let registry = Arc::new(StaticItemRegistry::empty());
//! let mut manager = EngineManager::new(config, registry, 1).unwrap();
//!
//! manager.start().unwrap();
//! manager.pause().unwrap();
//! manager.step().unwrap();
//! let snapshot = manager.read_snapshot();
//! manager.stop().unwrap();
//! ```

#![deny(unsafe_code)]

pub mod logging;
pub mod manager;

pub use manager::{EngineCounters, EngineManager};

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::logging::init_tracing;
    pub use crate::manager::{EngineCounters, EngineManager};
    pub use tessera_core::prelude::*;
    pub use tessera_manifest::EventLog;
}
