//! Fatal invariant violations (spec §7). Everything else in the tick
//! pipeline is recovered in-tick (skipped proposal, skipped worker turn) and
//! never surfaces as a `Result::Err`; `SimError` is reserved for states that
//! would mean the engine itself is broken.

use crate::ids::EntityId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidGridDimensions { width: i32, height: i32 },

    #[error("entity {0} referenced but not present in world")]
    UnknownEntity(EntityId),

    #[error("next_act_at for entity {entity} regressed below tick {tick}")]
    SchedulingRegression { entity: EntityId, tick: i64 },

    #[error("worker pool produced no result for entity {0} after timeout")]
    WorkerTimeout(EntityId),

    #[error("snapshot hash mismatch: expected {expected}, got {actual}")]
    SnapshotHashMismatch { expected: String, actual: String },
}

pub type SimResult<T> = Result<T, SimError>;
