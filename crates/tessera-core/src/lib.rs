//! tessera-core -- the deterministic tick-driven simulation kernel.
//!
//! A `World` owns all mutable state; each tick runs the ordered phases in
//! `world_loop` (parallel AI, conflict resolution, subsystem ticker). AI
//! decisions only ever see a frozen `Snapshot`, so the
//! entire dispatch phase is safe to run across a `WorkerPool`. Everything
//! here is pure simulation: content data (items, skills, recipes) is read
//! through the `ItemRegistry` trait object rather than owned by this crate,
//! and persistence/replay live one layer up in `tessera-manifest`.
//!
//! # Quick Start
//!
//! ```
//! use tessera_core::prelude::*;
//!
//! let config = SimulationConfig::default().with_grid_size(32, 32).with_worker_count(1);
//! let mut world = World::new(&config, 1).unwrap();
//! let registry = StaticItemRegistry::empty();
//! let loop_ = WorldLoop::new(&config, &registry);
//! let mut sink = NullSink;
//! loop_.tick(&mut world, &mut sink).unwrap();
//! assert_eq!(world.tick, 1);
//! ```

pub mod action;
pub mod action_queue;
pub mod ai;
pub mod attributes;
pub mod config;
pub mod conflict_resolver;
pub mod damage;
pub mod effects;
pub mod entity;
pub mod enums;
pub mod error;
pub mod events;
pub mod faction;
pub mod grid;
pub mod ids;
pub mod registries;
pub mod rng;
pub mod skills;
pub mod snapshot;
pub mod spatial_index;
pub mod stats;
pub mod worker_pool;
pub mod world;
pub mod world_loop;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::action::{ActionProposal, ActionTarget};
    pub use crate::action_queue::ActionQueue;
    pub use crate::ai;
    pub use crate::attributes::{AttributeCaps, Attributes};
    pub use crate::config::SimulationConfig;
    pub use crate::conflict_resolver::{AppliedAction, AppliedEffect, ConflictResolver, ResolutionOutcome};
    pub use crate::effects::StatusEffect;
    pub use crate::entity::{Entity, EntityKind, ItemStack};
    pub use crate::enums::{ActionType, AIState, Domain, Material};
    pub use crate::error::{SimError, SimResult};
    pub use crate::events::{EventCategory, EventSink, NullSink, SimEvent, VecSink};
    pub use crate::faction::{Faction, FactionRegistry};
    pub use crate::grid::{Grid, Vector2};
    pub use crate::ids::{BuildingId, ChestId, EntityId, NodeId, RegionId};
    pub use crate::registries::{ItemRegistry, StaticItemRegistry};
    pub use crate::rng::DeterministicRng;
    pub use crate::skills::SkillInstance;
    pub use crate::snapshot::Snapshot;
    pub use crate::stats::Stats;
    pub use crate::worker_pool::WorkerPool;
    pub use crate::world::World;
    pub use crate::world_loop::WorldLoop;
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn a_full_tick_is_deterministic_across_two_independent_worlds() {
        let config = SimulationConfig::default().with_grid_size(24, 24).with_worker_count(1);
        let registry = StaticItemRegistry::empty();

        let mut world_a = World::new(&config, 7).unwrap();
        let mut world_b = World::new(&config, 7).unwrap();

        let hero = |pos| Entity {
            id: EntityId::new(0),
            kind: EntityKind::Hero,
            pos,
            stats: Stats::default(),
            ai_state: AIState::Idle,
            faction: Faction::HeroGuild,
            next_act_at: 0.0,
            memory: std::collections::HashMap::new(),
            home_pos: Some(pos),
            tier: crate::enums::EnemyTier::Basic,
            inventory: Vec::new(),
            equipped: std::collections::HashMap::new(),
            terrain_memory: std::collections::HashMap::new(),
            entity_memory: Vec::new(),
            goals: Vec::new(),
            effects: Vec::new(),
            loot_progress: 0.0,
            known_recipes: Vec::new(),
            craft_target: None,
            attributes: Some(Attributes::default()),
            attribute_caps: Some(AttributeCaps::default()),
            hero_class: None,
            skills: Vec::new(),
            class_mastery: std::collections::HashMap::new(),
            quests: Vec::new(),
            traits: Vec::new(),
            threat_table: std::collections::HashMap::new(),
            engaged_ticks: 0,
            chase_ticks: 0,
            current_region_id: None,
            combat_target_id: None,
            last_reason: String::new(),
            leash_radius: 10,
        };

        world_a.spawn(hero(Vector2::new(5, 5)));
        world_b.spawn(hero(Vector2::new(5, 5)));

        let loop_ = WorldLoop::new(&config, &registry);
        let mut sink_a = VecSink::default();
        let mut sink_b = VecSink::default();
        for _ in 0..5 {
            loop_.tick(&mut world_a, &mut sink_a).unwrap();
            loop_.tick(&mut world_b, &mut sink_b).unwrap();
        }

        let hash_a = Snapshot::capture(&world_a).content_hash();
        let hash_b = Snapshot::capture(&world_b).content_hash();
        assert_eq!(hash_a, hash_b);
    }
}
