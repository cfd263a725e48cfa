//! Top-level AI decision entry point (spec §4.6). `decide` is the one
//! function the world loop's parallel worker phase calls per ready entity;
//! it receives a fresh `AIContext` each call and returns zero or more
//! `ActionProposal`s. No state survives between calls — everything the Brain
//! needs travels in on `ctx`, and anything it concludes is written back only
//! through the returned proposals' `new_ai_state`.

use crate::action::ActionProposal;
use crate::ai::context::AIContext;
use crate::ai::goals::{scorers, GoalEvaluator, GoalScorer};
use crate::ai::states;
use crate::enums::Domain;

/// Goal-selection draw uses a `+50` tick salt so it never collides with the
/// handler-level draws (frontier search uses `+1`, combat rolls use
/// `tick+1`/`tick+2` relative to their own domains) — each draw's `(domain,
/// entity_id, tick)` tuple stays unique per spec §4.5's RNG-purity rule.
const GOAL_SELECT_SALT: i64 = 50;
const GOAL_TOP_N: usize = 3;

pub fn decide(ctx: &AIContext) -> Vec<ActionProposal> {
    let scorer_boxes = scorers::registry();
    let scorer_refs: Vec<&dyn GoalScorer> = scorer_boxes.iter().map(|b| b.as_ref()).collect();
    let evaluator = GoalEvaluator::new(&scorer_refs);

    let state = if ctx.entity.ai_state.is_decision_state() {
        let candidates = evaluator.evaluate(ctx);
        let rng_value = ctx.rng.next_float(Domain::AiDecision, ctx.entity.id.raw() as i64, ctx.snapshot.tick + GOAL_SELECT_SALT);
        match GoalEvaluator::select(&candidates, rng_value, GOAL_TOP_N) {
            Some(choice) => choice.target_state,
            None => ctx.entity.ai_state,
        }
    } else {
        ctx.entity.ai_state
    };

    vec![states::handle(state, ctx)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::entity::{Entity, EntityKind, ItemStack};
    use crate::enums::{AIState, EnemyTier};
    use crate::faction::{Faction, FactionRegistry};
    use crate::grid::Vector2;
    use crate::ids::EntityId;
    use crate::rng::DeterministicRng;
    use crate::snapshot::Snapshot;
    use crate::stats::Stats;
    use crate::world::World;
    use std::collections::HashMap;

    fn idle_entity(pos: Vector2) -> Entity {
        Entity {
            id: EntityId::new(0),
            kind: EntityKind::Hero,
            pos,
            stats: Stats::default(),
            ai_state: AIState::Idle,
            faction: Faction::HeroGuild,
            next_act_at: 0.0,
            memory: HashMap::new(),
            home_pos: Some(pos),
            tier: EnemyTier::Basic,
            inventory: Vec::<ItemStack>::new(),
            equipped: HashMap::new(),
            terrain_memory: HashMap::new(),
            entity_memory: Vec::new(),
            goals: Vec::new(),
            effects: Vec::new(),
            loot_progress: 0.0,
            known_recipes: Vec::new(),
            craft_target: None,
            attributes: None,
            attribute_caps: None,
            hero_class: None,
            skills: Vec::new(),
            class_mastery: HashMap::new(),
            quests: Vec::new(),
            traits: Vec::new(),
            threat_table: HashMap::new(),
            engaged_ticks: 0,
            chase_ticks: 0,
            current_region_id: None,
            combat_target_id: None,
            last_reason: String::new(),
            leash_radius: 10,
        }
    }

    #[test]
    fn decide_always_returns_exactly_one_proposal() {
        let cfg = SimulationConfig::default().with_grid_size(16, 16);
        let mut world = World::new(&cfg, 1).unwrap();
        let id = world.spawn(idle_entity(Vector2::new(3, 3)));
        let snap = Snapshot::capture(&world);
        let factions = FactionRegistry::default_table();
        let entity = snap.entity(id).unwrap();
        let ctx = AIContext::new(entity, &snap, &cfg, DeterministicRng::new(1), &factions);
        let proposals = decide(&ctx);
        assert_eq!(proposals.len(), 1);
    }

    #[test]
    fn decide_is_deterministic_for_identical_inputs() {
        let cfg = SimulationConfig::default().with_grid_size(16, 16);
        let mut world = World::new(&cfg, 7).unwrap();
        let id = world.spawn(idle_entity(Vector2::new(5, 5)));
        let snap = Snapshot::capture(&world);
        let factions = FactionRegistry::default_table();
        let entity = snap.entity(id).unwrap();
        let ctx_a = AIContext::new(entity, &snap, &cfg, DeterministicRng::new(7), &factions);
        let ctx_b = AIContext::new(entity, &snap, &cfg, DeterministicRng::new(7), &factions);
        assert_eq!(decide(&ctx_a), decide(&ctx_b));
    }

    #[test]
    fn non_decision_state_skips_goal_evaluation() {
        let cfg = SimulationConfig::default().with_grid_size(16, 16);
        let mut world = World::new(&cfg, 1).unwrap();
        let mut entity = idle_entity(Vector2::new(3, 3));
        entity.ai_state = AIState::RestingInTown;
        let id = world.spawn(entity);
        // Overwrite the decision state back to a non-decision one post-spawn
        // since `spawn` assigns a fresh id but keeps the rest of the struct.
        world.entity_mut(id).unwrap().ai_state = AIState::Harvesting;
        let snap = Snapshot::capture(&world);
        let factions = FactionRegistry::default_table();
        let entity_ref = snap.entity(id).unwrap();
        let ctx = AIContext::new(entity_ref, &snap, &cfg, DeterministicRng::new(1), &factions);
        let proposals = decide(&ctx);
        assert_eq!(proposals.len(), 1);
    }
}
