//! AI state-machine handlers (spec §4.6, ported from `ai/states.py`'s
//! transition diagram). Each handler reads the current `AIContext` and
//! returns a single `ActionProposal`, optionally carrying a new
//! `new_ai_state`; the Conflict Resolver applies the state transition
//! alongside the action itself. Decision states (`AIState::DECISION_STATES`)
//! are scored by the Goal Evaluator first — `brain.rs` only falls through to
//! these handlers for the non-decision states, plus as the default behavior
//! once a decision state has been re-entered with nothing better to do.

use crate::action::{ActionProposal, ActionTarget};
use crate::ai::context::AIContext;
use crate::ai::perception;
use crate::enums::{ActionType, AIState, Domain};
use crate::grid::Vector2;

fn rng_float(ctx: &AIContext, salt: i64) -> f64 {
    ctx.rng.next_float(Domain::AiDecision, ctx.entity.id.raw() as i64, ctx.snapshot.tick + salt)
}

fn rest(ctx: &AIContext, reason: &str) -> ActionProposal {
    ActionProposal::new(ctx.entity.id, ActionType::Rest, ActionTarget::None, reason)
}

fn move_toward(ctx: &AIContext, target: Vector2, reason: &str) -> ActionProposal {
    let step = perception::direction_toward(ctx.entity.pos, target);
    let dest = ctx.entity.pos + step;
    ActionProposal::new(ctx.entity.id, ActionType::Move, ActionTarget::Position(dest), reason)
}

fn move_away(ctx: &AIContext, threat: Vector2, reason: &str) -> ActionProposal {
    let step = perception::direction_away_from(ctx.entity.pos, threat);
    let dest = ctx.entity.pos + step;
    ActionProposal::new(ctx.entity.id, ActionType::Move, ActionTarget::Position(dest), reason)
}

/// IDLE is a decision state; reached here only if the Goal Evaluator found
/// nothing worth doing. Rest in place rather than thrash.
pub fn handle_idle(ctx: &AIContext) -> ActionProposal {
    rest(ctx, "idle, nothing to do")
}

/// WANDER -> HUNT (hostile spotted) | RETURN_TO_TOWN/CAMP (too far from
/// home) | LOOTING (loot spotted) | stays WANDER otherwise.
pub fn handle_wander(ctx: &AIContext) -> ActionProposal {
    if let Some(enemy) = perception::nearest_enemy(ctx.snapshot, ctx.entity, ctx.faction_registry) {
        return move_toward(ctx, enemy.pos, "hostile spotted while wandering").with_new_state(AIState::Hunt);
    }
    if !perception::ground_loot_nearby(ctx.snapshot, ctx.entity.pos, ctx.entity.stats.vision_range).is_empty() {
        return handle_looting(ctx).with_new_state(AIState::Looting);
    }
    if let Some(home) = ctx.entity.home_pos {
        if ctx.entity.pos.manhattan(home) > ctx.entity.leash_radius {
            let state = if ctx.entity.kind == crate::entity::EntityKind::Hero { AIState::ReturnToTown } else { AIState::ReturnToCamp };
            return move_toward(ctx, home, "wandered past the leash radius").with_new_state(state);
        }
    }
    match perception::find_frontier_target(ctx.snapshot, ctx.entity, rng_float(ctx, 1), ctx.entity.stats.vision_range.max(4)) {
        Some(target) => move_toward(ctx, target, "exploring toward unmapped terrain"),
        None => rest(ctx, "nowhere new to explore"),
    }
}

/// HUNT -> COMBAT (in melee range) | FLEE (hp critical) | WANDER (target
/// lost or died).
pub fn handle_hunt(ctx: &AIContext) -> ActionProposal {
    if ctx.entity.stats.hp_ratio() < ctx.config.flee_hp_threshold {
        return handle_flee(ctx).with_new_state(AIState::Flee);
    }
    let target_id = ctx.entity.combat_target_id.and_then(|id| ctx.snapshot.entity(id)).filter(|e| e.stats.alive());
    let target = target_id.or_else(|| perception::nearest_enemy(ctx.snapshot, ctx.entity, ctx.faction_registry));
    match target {
        Some(enemy) if ctx.entity.pos.manhattan(enemy.pos) <= 1 => {
            ActionProposal::new(ctx.entity.id, ActionType::Attack, ActionTarget::Entity(enemy.id), "closed to melee range")
                .with_new_state(AIState::Combat)
        }
        Some(enemy) => move_toward(ctx, enemy.pos, "chasing hostile target"),
        None => handle_wander(ctx).with_new_state(AIState::Wander),
    }
}

/// COMBAT -> FLEE (hp critical) | HUNT (target fled out of range) | WANDER
/// (target died) | stays COMBAT (keep attacking).
pub fn handle_combat(ctx: &AIContext) -> ActionProposal {
    if ctx.entity.stats.hp_ratio() < ctx.config.flee_hp_threshold {
        return handle_flee(ctx).with_new_state(AIState::Flee);
    }
    let target = ctx.entity.combat_target_id.and_then(|id| ctx.snapshot.entity(id)).filter(|e| e.stats.alive());
    match target {
        Some(enemy) if ctx.entity.pos.manhattan(enemy.pos) <= 1 => {
            ActionProposal::new(ctx.entity.id, ActionType::Attack, ActionTarget::Entity(enemy.id), "pressing the attack")
        }
        Some(enemy) => move_toward(ctx, enemy.pos, "target stepped out of melee range").with_new_state(AIState::Hunt),
        None => handle_wander(ctx).with_new_state(AIState::Wander),
    }
}

/// FLEE -> RETURN_TO_TOWN/CAMP (clear of threats) | HUNT (cornered, no
/// choice but to fight) | stays FLEE otherwise.
pub fn handle_flee(ctx: &AIContext) -> ActionProposal {
    let threat = perception::nearest_enemy(ctx.snapshot, ctx.entity, ctx.faction_registry);
    match threat {
        Some(enemy) => {
            let proposal = move_away(ctx, enemy.pos, "fleeing a hostile threat");
            if ctx.entity.pos.manhattan(enemy.pos) <= 1 && proposal.target == ActionTarget::Position(ctx.entity.pos) {
                // Nowhere to retreat to: cornered, forced back into a fight.
                return ActionProposal::new(ctx.entity.id, ActionType::Attack, ActionTarget::Entity(enemy.id), "cornered while fleeing")
                    .with_new_state(AIState::Combat);
            }
            proposal
        }
        None => {
            let state = if ctx.entity.kind == crate::entity::EntityKind::Hero { AIState::ReturnToTown } else { AIState::ReturnToCamp };
            let home = ctx.entity.home_pos.unwrap_or(ctx.entity.pos);
            move_toward(ctx, home, "no longer threatened, heading home").with_new_state(state)
        }
    }
}

/// RETURN_TO_TOWN -> RESTING_IN_TOWN (arrived) | stays RETURN_TO_TOWN.
pub fn handle_return_to_town(ctx: &AIContext) -> ActionProposal {
    let town = Vector2::new(ctx.config.town_center.0, ctx.config.town_center.1);
    if ctx.entity.pos.manhattan(town) <= ctx.config.town_radius {
        return rest(ctx, "arrived in town").with_new_state(AIState::RestingInTown);
    }
    move_toward(ctx, town, "heading back to town")
}

/// RESTING_IN_TOWN is a decision state; fallback behavior is to keep
/// resting until the Goal Evaluator picks something else.
pub fn handle_resting_in_town(ctx: &AIContext) -> ActionProposal {
    rest(ctx, "resting in town")
}

/// RETURN_TO_CAMP -> GUARD_CAMP (arrived) | stays RETURN_TO_CAMP.
pub fn handle_return_to_camp(ctx: &AIContext) -> ActionProposal {
    let home = ctx.entity.home_pos.unwrap_or(ctx.entity.pos);
    if ctx.entity.pos == home {
        return rest(ctx, "back at camp").with_new_state(AIState::GuardCamp);
    }
    move_toward(ctx, home, "returning to camp")
}

/// GUARD_CAMP is a decision state; fallback is to hold position unless a
/// hostile wanders into range, in which case it is effectively HUNT.
pub fn handle_guard_camp(ctx: &AIContext) -> ActionProposal {
    if let Some(enemy) = perception::nearest_enemy(ctx.snapshot, ctx.entity, ctx.faction_registry) {
        return move_toward(ctx, enemy.pos, "intruder near the camp").with_new_state(AIState::Hunt);
    }
    rest(ctx, "guarding camp")
}

/// LOOTING -> WANDER (nothing left nearby, or inventory already full) |
/// stays LOOTING (moving to or collecting the nearest stack).
pub fn handle_looting(ctx: &AIContext) -> ActionProposal {
    if ctx.entity.inventory.len() >= ctx.config.inventory_cap {
        return rest(ctx, "Bag full, abandoning loot").with_new_state(AIState::Wander);
    }
    let nearby = perception::ground_loot_nearby(ctx.snapshot, ctx.entity.pos, ctx.entity.stats.vision_range);
    match nearby.first() {
        Some(&pos) if pos == ctx.entity.pos => {
            ActionProposal::new(ctx.entity.id, ActionType::Loot, ActionTarget::Position(pos), "collecting ground loot")
        }
        Some(&pos) => move_toward(ctx, pos, "moving to ground loot"),
        None => handle_wander(ctx).with_new_state(AIState::Wander),
    }
}

/// ALERT -> HUNT (threat confirmed) | RETURN_TO_CAMP/RETURN_TO_TOWN (false
/// alarm, nothing found).
pub fn handle_alert(ctx: &AIContext) -> ActionProposal {
    if let Some(enemy) = perception::nearest_enemy(ctx.snapshot, ctx.entity, ctx.faction_registry) {
        return move_toward(ctx, enemy.pos, "responding to alert").with_new_state(AIState::Hunt);
    }
    let state = if ctx.entity.kind == crate::entity::EntityKind::Hero { AIState::ReturnToTown } else { AIState::ReturnToCamp };
    let home = ctx.entity.home_pos.unwrap_or(ctx.entity.pos);
    move_toward(ctx, home, "alert stood down, nothing found").with_new_state(state)
}

/// Shared shape for the town-building visit states: walk to the building if
/// known, browse for a tick, then drop back to WANDER. Distinct states exist
/// so downstream event logging can tell which venue an entity is patronizing.
fn handle_visit(ctx: &AIContext, reason: &str) -> ActionProposal {
    let town = Vector2::new(ctx.config.town_center.0, ctx.config.town_center.1);
    if ctx.entity.pos.manhattan(town) <= ctx.config.town_radius {
        return rest(ctx, reason).with_new_state(AIState::Wander);
    }
    move_toward(ctx, town, reason)
}

pub fn handle_visit_shop(ctx: &AIContext) -> ActionProposal {
    handle_visit(ctx, "visiting the shop")
}

pub fn handle_visit_blacksmith(ctx: &AIContext) -> ActionProposal {
    handle_visit(ctx, "visiting the blacksmith")
}

pub fn handle_visit_guild(ctx: &AIContext) -> ActionProposal {
    handle_visit(ctx, "visiting the guild hall")
}

pub fn handle_visit_class_hall(ctx: &AIContext) -> ActionProposal {
    handle_visit(ctx, "visiting the class hall")
}

pub fn handle_visit_inn(ctx: &AIContext) -> ActionProposal {
    handle_visit(ctx, "visiting the inn")
}

pub fn handle_visit_home(ctx: &AIContext) -> ActionProposal {
    let home = ctx.entity.home_pos.unwrap_or(ctx.entity.pos);
    if ctx.entity.pos == home {
        return rest(ctx, "at home").with_new_state(AIState::Wander);
    }
    move_toward(ctx, home, "heading home")
}

/// HARVESTING -> WANDER (node depleted or out of range) | stays HARVESTING.
pub fn handle_harvesting(ctx: &AIContext) -> ActionProposal {
    let node = ctx
        .snapshot
        .resource_nodes
        .values()
        .filter(|n| n.charges > 0 && ctx.entity.pos.manhattan(n.pos) <= 1)
        .min_by_key(|n| ctx.entity.pos.manhattan(n.pos));
    match node {
        Some(node) => ActionProposal::new(ctx.entity.id, ActionType::Harvest, ActionTarget::Position(node.pos), "harvesting resource node"),
        None => handle_wander(ctx).with_new_state(AIState::Wander),
    }
}

/// Dispatches a non-decision state to its handler. Decision states
/// (`AIState::DECISION_STATES`) are routed through the Goal Evaluator by
/// `brain.rs` instead, but still have a handler here as a fallback once
/// re-entered with nothing to transition into.
pub fn handle(state: AIState, ctx: &AIContext) -> ActionProposal {
    match state {
        AIState::Idle => handle_idle(ctx),
        AIState::Wander => handle_wander(ctx),
        AIState::Hunt => handle_hunt(ctx),
        AIState::Combat => handle_combat(ctx),
        AIState::Flee => handle_flee(ctx),
        AIState::ReturnToTown => handle_return_to_town(ctx),
        AIState::RestingInTown => handle_resting_in_town(ctx),
        AIState::ReturnToCamp => handle_return_to_camp(ctx),
        AIState::GuardCamp => handle_guard_camp(ctx),
        AIState::Looting => handle_looting(ctx),
        AIState::Alert => handle_alert(ctx),
        AIState::VisitShop => handle_visit_shop(ctx),
        AIState::VisitBlacksmith => handle_visit_blacksmith(ctx),
        AIState::VisitGuild => handle_visit_guild(ctx),
        AIState::Harvesting => handle_harvesting(ctx),
        AIState::VisitClassHall => handle_visit_class_hall(ctx),
        AIState::VisitInn => handle_visit_inn(ctx),
        AIState::VisitHome => handle_visit_home(ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::entity::{Entity, EntityKind, ItemStack};
    use crate::enums::EnemyTier;
    use crate::faction::{Faction, FactionRegistry};
    use crate::ids::EntityId;
    use crate::rng::DeterministicRng;
    use crate::snapshot::Snapshot;
    use crate::stats::Stats;
    use crate::world::World;
    use std::collections::HashMap;

    fn entity_at(id: u64, pos: Vector2, kind: EntityKind, faction: Faction) -> Entity {
        Entity {
            id: EntityId::new(id),
            kind,
            pos,
            stats: Stats::default(),
            ai_state: AIState::Idle,
            faction,
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
    fn hunt_attacks_when_already_adjacent_to_hostile() {
        let cfg = SimulationConfig::default().with_grid_size(16, 16);
        let mut world = World::new(&cfg, 1).unwrap();
        let hero = world.spawn(entity_at(0, Vector2::new(5, 5), EntityKind::Hero, Faction::HeroGuild));
        let mob = world.spawn(entity_at(0, Vector2::new(6, 5), EntityKind::Monster, Faction::GoblinHorde));
        let snap = Snapshot::capture(&world);
        let factions = FactionRegistry::default_table();
        let hero_entity = snap.entity(hero).unwrap();
        let ctx = AIContext::new(hero_entity, &snap, &cfg, DeterministicRng::new(1), &factions);
        let proposal = handle_hunt(&ctx);
        assert_eq!(proposal.verb, ActionType::Attack);
        assert_eq!(proposal.target, ActionTarget::Entity(mob));
    }

    #[test]
    fn hunt_moves_toward_distant_hostile() {
        let cfg = SimulationConfig::default().with_grid_size(16, 16);
        let mut world = World::new(&cfg, 1).unwrap();
        let hero = world.spawn(entity_at(0, Vector2::new(0, 0), EntityKind::Hero, Faction::HeroGuild));
        world.spawn(entity_at(0, Vector2::new(5, 0), EntityKind::Monster, Faction::GoblinHorde));
        let snap = Snapshot::capture(&world);
        let factions = FactionRegistry::default_table();
        let hero_entity = snap.entity(hero).unwrap();
        let ctx = AIContext::new(hero_entity, &snap, &cfg, DeterministicRng::new(1), &factions);
        let proposal = handle_hunt(&ctx);
        assert_eq!(proposal.verb, ActionType::Move);
        assert_eq!(proposal.new_ai_state, None);
    }

    #[test]
    fn flee_moves_away_from_threat() {
        let cfg = SimulationConfig::default().with_grid_size(16, 16);
        let mut world = World::new(&cfg, 1).unwrap();
        let hero = world.spawn(entity_at(0, Vector2::new(5, 5), EntityKind::Hero, Faction::HeroGuild));
        world.spawn(entity_at(0, Vector2::new(8, 5), EntityKind::Monster, Faction::GoblinHorde));
        let snap = Snapshot::capture(&world);
        let factions = FactionRegistry::default_table();
        let hero_entity = snap.entity(hero).unwrap();
        let ctx = AIContext::new(hero_entity, &snap, &cfg, DeterministicRng::new(1), &factions);
        let proposal = handle_flee(&ctx);
        assert_eq!(proposal.verb, ActionType::Move);
        if let ActionTarget::Position(dest) = proposal.target {
            assert!(dest.x < hero_entity.pos.x);
        } else {
            panic!("expected a position target");
        }
    }

    #[test]
    fn return_to_town_transitions_on_arrival() {
        let cfg = SimulationConfig::default().with_grid_size(64, 64);
        let town = Vector2::new(cfg.town_center.0, cfg.town_center.1);
        let mut world = World::new(&cfg, 1).unwrap();
        let hero = world.spawn(entity_at(0, town, EntityKind::Hero, Faction::HeroGuild));
        let snap = Snapshot::capture(&world);
        let factions = FactionRegistry::default_table();
        let hero_entity = snap.entity(hero).unwrap();
        let ctx = AIContext::new(hero_entity, &snap, &cfg, DeterministicRng::new(1), &factions);
        let proposal = handle_return_to_town(&ctx);
        assert_eq!(proposal.new_ai_state, Some(AIState::RestingInTown));
    }

    #[test]
    fn looting_transitions_to_wander_when_nothing_nearby() {
        let cfg = SimulationConfig::default().with_grid_size(16, 16);
        let mut world = World::new(&cfg, 1).unwrap();
        let hero = world.spawn(entity_at(0, Vector2::new(0, 0), EntityKind::Hero, Faction::HeroGuild));
        let snap = Snapshot::capture(&world);
        let factions = FactionRegistry::default_table();
        let hero_entity = snap.entity(hero).unwrap();
        let ctx = AIContext::new(hero_entity, &snap, &cfg, DeterministicRng::new(1), &factions);
        let proposal = handle_looting(&ctx);
        assert_eq!(proposal.new_ai_state, Some(AIState::Wander));
    }
}
