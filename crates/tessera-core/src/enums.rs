//! Core enumerations shared across the simulation.

use serde::{Deserialize, Serialize};

/// Ordered so that the Conflict Resolver's sort key `(verb, next_act_at, id)`
/// produces the same total order the original system relies on: REST before
/// MOVE before ATTACK before the deferred-application verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ActionType {
    Rest = 0,
    Move = 1,
    Attack = 2,
    UseItem = 3,
    Loot = 4,
    Harvest = 5,
    UseSkill = 6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AIState {
    Idle = 0,
    Wander = 1,
    Hunt = 2,
    Combat = 3,
    Flee = 4,
    ReturnToTown = 5,
    RestingInTown = 6,
    ReturnToCamp = 7,
    GuardCamp = 8,
    Looting = 9,
    Alert = 10,
    VisitShop = 11,
    VisitBlacksmith = 12,
    VisitGuild = 13,
    Harvesting = 14,
    VisitClassHall = 15,
    VisitInn = 16,
    VisitHome = 17,
}

impl AIState {
    /// States in which the Goal Evaluator runs before handler dispatch.
    pub const DECISION_STATES: [AIState; 4] =
        [AIState::Idle, AIState::Wander, AIState::RestingInTown, AIState::GuardCamp];

    pub fn is_decision_state(self) -> bool {
        Self::DECISION_STATES.contains(&self)
    }
}

/// RNG domains isolating independent random sub-streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Domain {
    Combat = 0,
    Loot = 1,
    AiDecision = 2,
    Spawn = 3,
    Weather = 4,
    LevelUp = 5,
    Item = 6,
    Harvest = 7,
    MapGen = 8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Material {
    Floor = 0,
    Wall = 1,
    Water = 2,
    Town = 3,
    Camp = 4,
    Sanctuary = 5,
    Forest = 6,
    Desert = 7,
    Swamp = 8,
    Mountain = 9,
    Road = 10,
    Bridge = 11,
    Ruins = 12,
    DungeonEntrance = 13,
    Lava = 14,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ItemType {
    Weapon = 0,
    Armor = 1,
    Accessory = 2,
    Consumable = 3,
    Material = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Rarity {
    Common = 0,
    Uncommon = 1,
    Rare = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EnemyTier {
    Basic = 0,
    Scout = 1,
    Warrior = 2,
    Elite = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DamageType {
    Physical = 0,
    Magical = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Element {
    None = 0,
    Fire = 1,
    Ice = 2,
    Lightning = 3,
    Dark = 4,
    Holy = 5,
}

/// Discrete personality traits; each entity carries 2-4 at spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TraitType {
    Aggressive = 0,
    Cautious = 1,
    Brave = 2,
    Cowardly = 3,
    Bloodthirsty = 4,
    Greedy = 5,
    Generous = 6,
    Charismatic = 7,
    Loner = 8,
    Diligent = 9,
    Lazy = 10,
    Curious = 11,
    Berserker = 12,
    Tactical = 13,
    Resilient = 14,
    ArcaneGifted = 15,
    SpiritTouched = 16,
    Elementalist = 17,
    KeenEyed = 18,
    Oblivious = 19,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_type_ordinal_order_matches_resolver_priority() {
        assert!(ActionType::Rest < ActionType::Move);
        assert!(ActionType::Move < ActionType::Attack);
        assert!(ActionType::Attack < ActionType::UseItem);
        assert!(ActionType::UseItem < ActionType::Loot);
        assert!(ActionType::Loot < ActionType::Harvest);
        assert!(ActionType::Harvest < ActionType::UseSkill);
    }

    #[test]
    fn decision_states_match_spec_subset() {
        assert!(AIState::Idle.is_decision_state());
        assert!(AIState::Wander.is_decision_state());
        assert!(AIState::RestingInTown.is_decision_state());
        assert!(AIState::GuardCamp.is_decision_state());
        assert!(!AIState::Combat.is_decision_state());
        assert!(!AIState::Hunt.is_decision_state());
    }
}
