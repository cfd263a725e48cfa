//! Process-wide `tracing` setup (ambient stack "Logging" section).
//!
//! Library crates (`tessera-core`, `tessera-manifest`) only ever call
//! `tracing::{debug,info,warn,error}!` -- they never install a subscriber.
//! This crate is the manager boundary a host actually runs, so it is the
//! only place `tracing-subscriber` is wired up.

use tracing_subscriber::EnvFilter;

/// Installs a formatting subscriber driven by `RUST_LOG` (`info` if unset).
/// Safe to call more than once; later calls are no-ops rather than panics.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
