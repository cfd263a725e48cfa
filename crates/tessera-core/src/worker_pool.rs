//! Worker Pool (spec §4.11): dispatches AI decisions for the ready set
//! across threads and collects proposals into the Action Queue. Ported from
//! the teacher's `ThreadPoolExecutor`-based pool — a fixed-size pool of
//! `std::thread` workers fed by a crossbeam job channel, with a
//! single-threaded fast path when `worker_count <= 1` and defensive
//! exception handling so one panicking decision never takes the tick down.

use crate::action::ActionProposal;
use crate::action_queue::ActionQueue;
use crate::ids::EntityId;
use crossbeam_channel::{bounded, Sender};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// A decision function: `(entity_id) -> Vec<ActionProposal>`, built by the
/// loop each tick to close over the current `Snapshot`, config, and RNG.
pub type DecisionFn = dyn Fn(EntityId) -> Vec<ActionProposal> + Send + Sync;

pub struct WorkerPool {
    worker_count: usize,
    timeout: Duration,
}

impl WorkerPool {
    pub fn new(worker_count: usize, timeout: Duration) -> Self {
        Self { worker_count: worker_count.max(1), timeout }
    }

    /// Runs `decide` for every entity in `ready`, pushing proposals into
    /// `queue`. Entities whose decision panics are logged and skipped —
    /// their turn is simply not proposed this tick (spec §7 worker failure).
    /// If a worker is still running once `timeout` elapses, its thread is
    /// abandoned rather than joined: the tick commits whatever proposals
    /// made it into `queue` by then and logs a warning instead of hanging.
    pub fn dispatch(&self, ready: &[EntityId], decide: Arc<DecisionFn>, queue: &ActionQueue) {
        if self.worker_count <= 1 {
            for &id in ready {
                self.run_one(id, &decide, queue);
            }
            return;
        }

        let (job_tx, job_rx) = bounded::<EntityId>(ready.len().max(1));
        let sender = queue.sender();
        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(self.worker_count);

        for _ in 0..self.worker_count {
            let job_rx = job_rx.clone();
            let decide = Arc::clone(&decide);
            let sender = sender.clone();
            handles.push(std::thread::spawn(move || {
                while let Ok(id) = job_rx.recv() {
                    dispatch_one(id, decide.as_ref(), &sender);
                }
            }));
        }
        drop(job_rx);

        for &id in ready {
            let _ = job_tx.send(id);
        }
        drop(job_tx);

        let deadline = std::time::Instant::now() + self.timeout;
        while std::time::Instant::now() < deadline && handles.iter().any(|h| !h.is_finished()) {
            std::thread::sleep(Duration::from_millis(1));
        }

        let mut timed_out = 0usize;
        for handle in handles {
            if handle.is_finished() {
                if handle.join().is_err() {
                    tracing::error!("worker thread panicked during AI dispatch");
                }
            } else {
                timed_out += 1;
            }
        }
        if timed_out > 0 {
            tracing::warn!(
                timed_out,
                "worker pool timeout elapsed; committing proposals collected so far and abandoning the still-running worker thread(s)"
            );
        }
    }

    fn run_one(&self, id: EntityId, decide: &Arc<DecisionFn>, queue: &ActionQueue) {
        dispatch_one(id, decide.as_ref(), &queue.sender());
    }
}

fn dispatch_one(id: EntityId, decide: &DecisionFn, sender: &Sender<ActionProposal>) {
    let result = catch_unwind(AssertUnwindSafe(|| decide(id)));
    match result {
        Ok(proposals) => {
            for proposal in proposals {
                let _ = sender.send(proposal);
            }
        }
        Err(_) => {
            tracing::error!(entity = ?id, "AI decision panicked; skipping this entity's turn");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionTarget;
    use crate::enums::ActionType;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn proposal(id: EntityId) -> ActionProposal {
        ActionProposal::new(id, ActionType::Rest, ActionTarget::None, "test")
    }

    #[test]
    fn single_threaded_fast_path_processes_every_entity() {
        let pool = WorkerPool::new(1, Duration::from_secs(1));
        let queue = ActionQueue::new();
        let ready: Vec<EntityId> = (0..5).map(EntityId::new).collect();
        let decide: Arc<DecisionFn> = Arc::new(|id| vec![proposal(id)]);
        pool.dispatch(&ready, decide, &queue);
        assert_eq!(queue.drain().len(), 5);
    }

    #[test]
    fn multi_threaded_pool_processes_every_entity() {
        let pool = WorkerPool::new(4, Duration::from_secs(1));
        let queue = ActionQueue::new();
        let ready: Vec<EntityId> = (0..50).map(EntityId::new).collect();
        let decide: Arc<DecisionFn> = Arc::new(|id| vec![proposal(id)]);
        pool.dispatch(&ready, decide, &queue);
        assert_eq!(queue.drain().len(), 50);
    }

    #[test]
    fn panicking_decision_is_skipped_not_fatal() {
        let pool = WorkerPool::new(1, Duration::from_secs(1));
        let queue = ActionQueue::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let decide: Arc<DecisionFn> = Arc::new(move |id| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            if id.raw() == 2 {
                panic!("boom");
            }
            vec![proposal(id)]
        });
        let ready: Vec<EntityId> = (0..5).map(EntityId::new).collect();
        pool.dispatch(&ready, decide, &queue);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(queue.drain().len(), 4);
    }
}
