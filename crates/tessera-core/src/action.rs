//! Action proposals emitted by the AI Brain and consumed by the Conflict
//! Resolver (spec §4.6-4.8).

use crate::enums::ActionType;
use crate::grid::Vector2;
use crate::ids::EntityId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionTarget {
    Position(Vector2),
    Entity(EntityId),
    Item(String),
    Skill(String),
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionProposal {
    pub actor_id: EntityId,
    pub verb: ActionType,
    pub target: ActionTarget,
    pub reason: String,
    pub new_ai_state: Option<crate::enums::AIState>,
}

impl ActionProposal {
    pub fn new(actor_id: EntityId, verb: ActionType, target: ActionTarget, reason: impl Into<String>) -> Self {
        Self { actor_id, verb, target, reason: reason.into(), new_ai_state: None }
    }

    pub fn with_new_state(mut self, state: crate::enums::AIState) -> Self {
        self.new_ai_state = Some(state);
        self
    }
}
