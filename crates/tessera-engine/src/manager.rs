//! The Engine Manager (spec §4.12): owns the `World`, the tick loop, the
//! worker pool (reconstructed fresh by [`WorldLoop`] each tick), the RNG
//! (via `World::rng`), and the latest published [`Snapshot`], behind a
//! small lifecycle a host application drives from any thread.
//!
//! Per spec §5, "one authoritative loop thread owns all writes to World."
//! [`EngineManager`]'s public methods never touch `World` directly -- they
//! only read or write the [`Shared`] state the loop thread polls between
//! ticks. The loop runs on a dedicated thread and paces itself to the
//! configured tick rate, "in step mode it ticks once per request while
//! paused" (spec §4.12).
//!
//! `start`/`pause`/`resume`/`step`/`stop`/`reset` are idempotent where
//! sensible: misuse before init or calling an operation in the wrong state
//! is logged and absorbed rather than returned as an `Err` (spec §7's
//! "engine-manager misuse-before-init" is explicitly not a fatal case).
//! `SimError` stays reserved for genuinely fatal invariant violations; this
//! crate's own operations return `anyhow::Result` instead, the layering the
//! ambient error-handling section calls for.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use parking_lot::{Condvar, Mutex};
use tessera_core::prelude::*;
use tessera_manifest::EventLog;
use tracing::{debug, error, info, warn};

const MIN_TICK_RATE_SECS: f64 = 0.01;
const MAX_TICK_RATE_SECS: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    /// Not yet started, or stopped; no loop thread is ticking.
    Stopped,
    Running,
    Paused,
}

/// Lifecycle and progress counters a host can poll without touching the
/// snapshot (spec §4.12's "read counters").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineCounters {
    pub tick: i64,
    pub entity_count: usize,
    pub running: bool,
    pub paused: bool,
}

struct Shared {
    state: Mutex<RunState>,
    cv: Condvar,
    pending_steps: Mutex<u64>,
    tick_rate_secs: Mutex<f64>,
    tick_count: AtomicI64,
    entity_count: AtomicI64,
    snapshot: Mutex<Option<Arc<Snapshot>>>,
    event_log: Mutex<EventLog>,
}

impl Shared {
    fn new(tick_rate_secs: f64) -> Self {
        Self {
            state: Mutex::new(RunState::Stopped),
            cv: Condvar::new(),
            pending_steps: Mutex::new(0),
            tick_rate_secs: Mutex::new(tick_rate_secs),
            tick_count: AtomicI64::new(0),
            entity_count: AtomicI64::new(0),
            snapshot: Mutex::new(None),
            event_log: Mutex::new(EventLog::unbounded()),
        }
    }
}

/// Adapts the shared, mutex-guarded event log to the [`EventSink`] the tick
/// loop writes through, so the loop thread never needs to know the log is
/// shared with readers on other threads.
struct SharedSink<'a>(&'a Mutex<EventLog>);

impl EventSink for SharedSink<'_> {
    fn emit(&mut self, event: SimEvent) {
        self.0.lock().emit(event);
    }
}

/// Owns a simulation and exposes the control surface spec §4.12 describes.
///
/// Construction validates the configuration eagerly (so a bad grid size
/// fails at `new`, not on the first background tick) but does not start
/// ticking; call [`EngineManager::start`].
pub struct EngineManager {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
    config: SimulationConfig,
    registry: Arc<dyn ItemRegistry>,
    seed: i64,
    staged_entities: Vec<Entity>,
}

impl EngineManager {
    pub fn new(config: SimulationConfig, registry: Arc<dyn ItemRegistry>, seed: i64) -> Result<Self> {
        World::new(&config, seed).map_err(anyhow::Error::from)?;
        let shared = Arc::new(Shared::new(config.tick_rate_secs));
        Ok(Self { shared, handle: None, config, registry, seed, staged_entities: Vec::new() })
    }

    /// Queues an entity to be spawned into the `World` the next time (and
    /// every time) [`EngineManager::start`] builds a fresh run. Staging
    /// persists across restarts the same way `config`/`seed` do; call
    /// [`EngineManager::reset`] first to start a run with a different cast.
    pub fn stage_entity(&mut self, entity: Entity) {
        self.staged_entities.push(entity);
    }

    /// Starts the dedicated loop thread, ticking a fresh `World` from tick
    /// 0. Idempotent while already running. If the previous run stopped on
    /// its own (`max_ticks` reached, or a fatal `SimError`), this joins the
    /// finished thread and begins a new run rather than resuming the old
    /// one -- see the reset-vs-start note in this crate's design notes.
    pub fn start(&mut self) -> Result<i64> {
        if let Some(handle) = &self.handle {
            if !handle.is_finished() {
                return Ok(self.shared.tick_count.load(Ordering::Acquire));
            }
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }

        let mut world = World::new(&self.config, self.seed).map_err(anyhow::Error::from)?;
        for entity in self.staged_entities.iter().cloned() {
            world.spawn(entity);
        }
        *self.shared.state.lock() = RunState::Running;
        *self.shared.pending_steps.lock() = 0;

        let shared = Arc::clone(&self.shared);
        let config = self.config.clone();
        let registry = Arc::clone(&self.registry);
        let seed = self.seed;

        self.handle = Some(thread::spawn(move || run_loop(shared, config, registry, world)));
        info!(seed, "engine manager started");
        Ok(self.shared.tick_count.load(Ordering::Acquire))
    }

    /// Pauses the loop between ticks. A no-op unless currently running.
    pub fn pause(&self) -> Result<i64> {
        let mut state = self.shared.state.lock();
        if *state == RunState::Running {
            *state = RunState::Paused;
            self.shared.cv.notify_all();
        }
        Ok(self.shared.tick_count.load(Ordering::Acquire))
    }

    /// Resumes a paused loop. A no-op unless currently paused.
    pub fn resume(&self) -> Result<i64> {
        let mut state = self.shared.state.lock();
        if *state == RunState::Paused {
            *state = RunState::Running;
            self.shared.cv.notify_all();
        }
        Ok(self.shared.tick_count.load(Ordering::Acquire))
    }

    /// Advances exactly one tick while paused, blocking until it commits.
    /// Logged and ignored (not an error) if the loop is not paused.
    pub fn step(&self) -> Result<i64> {
        if *self.shared.state.lock() != RunState::Paused {
            warn!("step requested while not paused; ignoring");
            return Ok(self.shared.tick_count.load(Ordering::Acquire));
        }

        let before = self.shared.tick_count.load(Ordering::Acquire);
        *self.shared.pending_steps.lock() += 1;
        self.shared.cv.notify_all();

        while self.shared.tick_count.load(Ordering::Acquire) <= before {
            thread::sleep(Duration::from_millis(1));
        }
        Ok(self.shared.tick_count.load(Ordering::Acquire))
    }

    /// Stops the loop thread, if any, and joins it. Idempotent.
    pub fn stop(&mut self) -> Result<i64> {
        *self.shared.state.lock() = RunState::Stopped;
        self.shared.cv.notify_all();
        if let Some(handle) = self.handle.take() {
            handle.join().map_err(|_| anyhow!("engine loop thread panicked"))?;
        }
        Ok(self.shared.tick_count.load(Ordering::Acquire))
    }

    /// Stops the loop (if running) and clears every counter, the published
    /// snapshot, and the event log. The manager is left stopped; call
    /// [`EngineManager::start`] again to begin a fresh run at tick 0.
    pub fn reset(&mut self) -> Result<()> {
        self.stop()?;
        self.shared.tick_count.store(0, Ordering::Release);
        self.shared.entity_count.store(0, Ordering::Release);
        *self.shared.snapshot.lock() = None;
        self.shared.event_log.lock().clear();
        *self.shared.pending_steps.lock() = 0;
        info!("engine manager reset");
        Ok(())
    }

    /// Sets the tick rate, clamped to `[0.01s, 2.0s]` (spec §4.12). Out of
    /// range values are clamped, not rejected -- configuration misuse is
    /// logged and absorbed per the ambient error-handling section.
    pub fn set_tick_rate(&self, secs: f64) {
        let clamped = secs.clamp(MIN_TICK_RATE_SECS, MAX_TICK_RATE_SECS);
        if clamped != secs {
            warn!(requested = secs, clamped, "tick rate clamped to bounds");
        }
        *self.shared.tick_rate_secs.lock() = clamped;
    }

    pub fn tick_rate_secs(&self) -> f64 {
        *self.shared.tick_rate_secs.lock()
    }

    /// The most recently published snapshot, if any tick has committed.
    /// Cloning the `Arc` is the only copy made -- "reads copy the
    /// reference, not the content" (spec §5).
    pub fn read_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.shared.snapshot.lock().clone()
    }

    /// A clone of every event accumulated so far.
    pub fn read_event_log(&self) -> EventLog {
        self.shared.event_log.lock().clone()
    }

    pub fn read_counters(&self) -> EngineCounters {
        let state = *self.shared.state.lock();
        EngineCounters {
            tick: self.shared.tick_count.load(Ordering::Acquire),
            entity_count: self.shared.entity_count.load(Ordering::Acquire).max(0) as usize,
            running: state == RunState::Running,
            paused: state == RunState::Paused,
        }
    }
}

impl Drop for EngineManager {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Body of the dedicated loop thread. Lifecycle state is checked once per
/// tick boundary, never mid-tick, so a pause or stop request only ever
/// takes effect between two fully-applied ticks.
fn run_loop(shared: Arc<Shared>, config: SimulationConfig, registry: Arc<dyn ItemRegistry>, mut world: World) {
    let world_loop = WorldLoop::new(&config, registry.as_ref());

    loop {
        {
            let mut state = shared.state.lock();
            loop {
                match *state {
                    RunState::Stopped => return,
                    RunState::Running => break,
                    RunState::Paused => {
                        let mut steps = shared.pending_steps.lock();
                        if *steps > 0 {
                            *steps -= 1;
                            break;
                        }
                        drop(steps);
                        shared.cv.wait(&mut state);
                    }
                }
            }
        }

        let tick_start = Instant::now();
        let mut sink = SharedSink(&shared.event_log);
        if let Err(err) = world_loop.tick(&mut world, &mut sink) {
            error!(%err, "fatal simulation error, stopping loop");
            *shared.state.lock() = RunState::Stopped;
            return;
        }

        let snapshot = Snapshot::capture(&world);
        shared.entity_count.store(snapshot.entities.len() as i64, Ordering::Release);
        *shared.snapshot.lock() = Some(Arc::new(snapshot));
        shared.tick_count.store(world.tick, Ordering::Release);

        if world.tick % 50 == 0 {
            info!(tick = world.tick, entities = world.entities.len(), "tick summary");
        } else {
            debug!(tick = world.tick, "tick committed");
        }

        if let Some(max_ticks) = config.max_ticks {
            if world.tick >= max_ticks {
                info!(tick = world.tick, "max_ticks reached, stopping");
                *shared.state.lock() = RunState::Stopped;
                return;
            }
        }

        let budget = Duration::from_secs_f64(*shared.tick_rate_secs.lock());
        let elapsed = tick_start.elapsed();
        if elapsed < budget {
            thread::sleep(budget - elapsed);
        }
    }
}
