//! The world loop: three ordered phases run once per tick (spec §4, ported
//! from `engine/loop.py`'s `WorldLoop.tick`).
//!
//! 1. Snapshot & parallel AI (phase 2, numbering kept from the original):
//!    freeze a `Snapshot`, dispatch `ai::decide` across the `WorkerPool`,
//!    drain the `ActionQueue`, and compute the ready set.
//! 2. Conflict resolution & application: `ConflictResolver::resolve`, then
//!    state-transition application, opportunity attacks, and chase-closing.
//! 3. Subsystem ticker, gated by the configured per-subsystem tick
//!    divisors: Core (effect expiry, threat decay, quest staleness,
//!    cooldowns, engagement tracking, stamina regen), Environment
//!    (territory debuffs/alerting, memory refresh, region tracking),
//!    Economy (resource/chest respawn, hero regen/town aura, level-up,
//!    EXPLORE quest advancement).

use crate::action::{ActionTarget, ActionProposal};
use crate::action_queue::ActionQueue;
use crate::ai::context::AIContext;
use crate::config::SimulationConfig;
use crate::conflict_resolver::{AppliedEffect, ConflictResolver};
use crate::enums::{ActionType, AIState, Domain};
use crate::error::SimResult;
use crate::events::{EventCategory, EventSink, SimEvent};
use crate::ids::EntityId;
use crate::registries::ItemRegistry;
use crate::rng::DeterministicRng;
use crate::snapshot::Snapshot;
use crate::world::World;
use crate::worker_pool::{DecisionFn, WorkerPool};
use std::sync::Arc;
use std::time::Duration;

pub struct WorldLoop<'a> {
    pub config: &'a SimulationConfig,
    pub item_registry: &'a dyn ItemRegistry,
}

impl<'a> WorldLoop<'a> {
    pub fn new(config: &'a SimulationConfig, item_registry: &'a dyn ItemRegistry) -> Self {
        Self { config, item_registry }
    }

    pub fn tick(&self, world: &mut World, sink: &mut dyn EventSink) -> SimResult<()> {
        let ready = world.ready_entities();
        let proposals = self.phase2_decide(world, &ready);
        self.phase3_resolve(world, proposals, sink);
        self.phase4_subsystems(world, sink);
        world.tick += 1;
        Ok(())
    }

    // --- Phase 2 -----------------------------------------------------

    fn phase2_decide(&self, world: &World, ready: &[EntityId]) -> Vec<ActionProposal> {
        let snapshot = Arc::new(Snapshot::capture(world));
        let factions = Arc::new(world.faction_registry.clone());
        let config = Arc::new(self.config.clone());
        let seed = world.seed;

        let decide: Arc<DecisionFn> = {
            let snapshot = Arc::clone(&snapshot);
            let factions = Arc::clone(&factions);
            let config = Arc::clone(&config);
            Arc::new(move |id: EntityId| {
                let Some(entity) = snapshot.entity(id) else { return Vec::new() };
                let rng = DeterministicRng::new(seed);
                let ctx = AIContext::new(entity, &snapshot, &config, rng, &factions);
                crate::ai::decide(&ctx)
            })
        };

        let queue = ActionQueue::new();
        let pool = WorkerPool::new(self.config.worker_count, Duration::from_secs_f64(self.config.worker_timeout_secs));
        pool.dispatch(ready, decide, &queue);
        queue.drain()
    }

    // --- Phase 3 -----------------------------------------------------

    fn phase3_resolve(&self, world: &mut World, proposals: Vec<ActionProposal>, sink: &mut dyn EventSink) {
        let state_transitions: std::collections::HashMap<EntityId, AIState> =
            proposals.iter().filter_map(|p| p.new_ai_state.map(|s| (p.actor_id, s))).collect();
        let pre_resolve_positions: std::collections::HashMap<EntityId, crate::grid::Vector2> =
            world.entities.values().map(|e| (e.id, e.pos)).collect();

        let resolver = ConflictResolver {
            item_registry: self.item_registry,
            damage_variance: self.config.damage_variance,
            crit_rate_cap: self.config.crit_rate_cap,
            opportunity_threat_mult: self.config.opportunity_mult,
            xp_per_kill_base: self.config.xp_per_kill_base,
        };
        let outcome = resolver.resolve(proposals, world, sink);

        for applied in &outcome.applied {
            if let Some(&state) = state_transitions.get(&applied.actor) {
                if let Some(entity) = world.entity_mut(applied.actor) {
                    entity.ai_state = state;
                }
            }
            match &applied.effect {
                AppliedEffect::Attacked { defender, damage, defender_died, evaded } => {
                    let mut event = SimEvent::new(world.tick, EventCategory::Combat, "attack resolved")
                        .with_entities([applied.actor, *defender])
                        .with_metadata("damage", damage.to_string())
                        .with_metadata("evaded", evaded.to_string());
                    if *defender_died {
                        event = event.with_metadata("defender_died", "true");
                    }
                    sink.emit(event);
                }
                AppliedEffect::DeferredForSubsystem => {
                    self.apply_deferred(world, applied.actor, applied.verb, &applied.target, sink);
                }
                _ => {}
            }
        }

        self.process_opportunity_attacks(world, &outcome.applied, &pre_resolve_positions, sink);
        self.process_chase_closing(world, &outcome.applied);
    }

    /// Finishes USE_ITEM/LOOT/HARVEST/USE_SKILL, validated-but-not-applied by
    /// the Conflict Resolver (spec §4.8 closing note).
    fn apply_deferred(&self, world: &mut World, actor: EntityId, verb: ActionType, target: &ActionTarget, sink: &mut dyn EventSink) {
        let tick = world.tick;
        match verb {
            ActionType::Loot => {
                let ActionTarget::Position(pos) = target else { return };
                let Some(stacks) = world.ground_loot.remove(pos) else { return };
                if let Some(entity) = world.entity_mut(actor) {
                    let room = self.config.inventory_cap.saturating_sub(entity.inventory.len());
                    let picked_up: Vec<crate::entity::ItemStack> = stacks.into_iter().take(room).collect();
                    self.advance_gather_quests(entity, &picked_up, tick);
                    entity.inventory.extend(picked_up);
                    sink.emit(SimEvent::new(tick, EventCategory::Loot, "picked up ground loot").with_entities([actor]));
                }
            }
            ActionType::Harvest => {
                let ActionTarget::Position(pos) = target else { return };
                let Some(node) = world.resource_nodes.values_mut().find(|n| n.pos == *pos && n.charges > 0) else { return };
                node.charges -= 1;
                if node.charges == 0 {
                    node.respawn_at = Some(tick + self.config.resource_respawn_ticks);
                }
                let item_id = node.item_id.clone();
                if let Some(entity) = world.entity_mut(actor) {
                    if entity.inventory.len() < self.config.inventory_cap {
                        let stack = crate::entity::ItemStack { item_id, quantity: 1 };
                        self.advance_gather_quests(entity, std::slice::from_ref(&stack), tick);
                        entity.inventory.push(stack);
                    }
                    if let (Some(attrs), Some(caps)) = (entity.attributes.as_mut(), entity.attribute_caps) {
                        crate::attributes::train_attributes(attrs, &caps, "harvest");
                    }
                }
                sink.emit(SimEvent::new(tick, EventCategory::Loot, "harvested a resource node").with_entities([actor]));
            }
            ActionType::UseItem => {
                let ActionTarget::Item(item_id) = target else { return };
                let heal = self.item_registry.heal_amount(item_id);
                if let Some(entity) = world.entity_mut(actor) {
                    if let Some(pos) = entity.inventory.iter().position(|s| &s.item_id == item_id) {
                        entity.stats.hp = (entity.stats.hp + heal).min(entity.stats.max_hp);
                        entity.inventory[pos].quantity = entity.inventory[pos].quantity.saturating_sub(1);
                        if entity.inventory[pos].quantity == 0 {
                            entity.inventory.remove(pos);
                        }
                    }
                }
                sink.emit(SimEvent::new(tick, EventCategory::Combat, "consumed an item").with_entities([actor]));
            }
            ActionType::UseSkill => {
                let ActionTarget::Skill(skill_id) = target else { return };
                if let Some(entity) = world.entity_mut(actor) {
                    if let Some(skill) = entity.skills.iter_mut().find(|s| &s.skill_id == skill_id) {
                        let cooldown = skill.effective_cooldown(5);
                        skill.apply_cooldown(cooldown);
                        skill.record_use(1.0, 100.0);
                    }
                }
                if self.item_registry.skill_is_aoe(skill_id) {
                    self.apply_aoe_skill(world, actor, skill_id, sink);
                }
                sink.emit(SimEvent::new(tick, EventCategory::Combat, "used a skill").with_entities([actor]));
            }
            _ => {}
        }
    }

    /// Advances every incomplete GATHER quest whose `target_kind` matches an
    /// item just picked up, by one step per matching stack (spec §4.8/§4.10
    /// quest-progress requirement; grounded on `original_source/`'s
    /// `core/quests.py` `advance()` call sites for loot/harvest pickups).
    fn advance_gather_quests(&self, entity: &mut crate::entity::Entity, picked_up: &[crate::entity::ItemStack], tick: i64) {
        use crate::entity::QuestType;
        for stack in picked_up {
            for quest in entity.quests.iter_mut() {
                if quest.quest_type != QuestType::Gather || quest.completed || quest.target_kind != stack.item_id {
                    continue;
                }
                quest.progress = (quest.progress + 1).min(quest.goal);
                if quest.progress >= quest.goal {
                    quest.completed = true;
                    quest.completed_at_tick = Some(tick);
                }
            }
        }
    }

    /// AoE skill impact (spec §9 AoE impact-center fallback): centers on the
    /// nearest hostile within cast range, or on the caster's own position if
    /// none is found, matching `_process_item_actions`'s `impact_pos =
    /// entity.pos` initializer. Every living hostile inside the blast radius
    /// of the impact point takes magical damage.
    fn apply_aoe_skill(&self, world: &mut World, caster_id: EntityId, skill_id: &str, sink: &mut dyn EventSink) {
        let Some(caster) = world.entity(caster_id) else { return };
        let caster_pos = caster.pos;
        let caster_faction = caster.faction;
        let atk_power = caster.effective_matk(self.item_registry);
        let cast_range = self.item_registry.skill_cast_range(skill_id);
        let radius = self.item_registry.skill_aoe_radius(skill_id);
        let tick = world.tick;

        let impact_pos = world
            .entities
            .values()
            .filter(|e| e.id != caster_id && e.stats.alive() && e.pos.manhattan(caster_pos) <= cast_range)
            .filter(|e| world.faction_registry.is_hostile(caster_faction, e.faction))
            .min_by_key(|e| e.pos.manhattan(caster_pos))
            .map(|e| e.pos)
            .unwrap_or(caster_pos);

        let targets: Vec<EntityId> = world
            .entities
            .values()
            .filter(|e| e.id != caster_id && e.stats.alive() && e.pos.manhattan(impact_pos) <= radius)
            .filter(|e| world.faction_registry.is_hostile(caster_faction, e.faction))
            .map(|e| e.id)
            .collect();

        let mut hits = Vec::new();
        for target_id in &targets {
            let rng = world.rng();
            let roll = rng.next_float(Domain::Combat, target_id.raw() as i64, tick + 4);
            let Some(target) = world.entity(*target_id) else { continue };
            let def_power = target.effective_mdef(self.item_registry);
            let damage = world.base_damage_roll(atk_power, def_power, self.config.damage_variance, roll);
            if let Some(target) = world.entity_mut(*target_id) {
                target.stats.hp = (target.stats.hp - damage).max(0.0);
            }
            hits.push((*target_id, damage));
            if world.entity(*target_id).map(|e| !e.stats.alive()).unwrap_or(false) {
                world.kill_or_respawn(*target_id, sink);
            }
        }

        if !hits.is_empty() {
            let hit_ids: Vec<EntityId> = hits.iter().map(|(id, _)| *id).collect();
            sink.emit(
                SimEvent::new(tick, EventCategory::Combat, "area skill impact")
                    .with_entities(std::iter::once(caster_id).chain(hit_ids))
                    .with_metadata("targets_hit", hits.len().to_string()),
            );
        }
    }

    /// An entity that steps away from an adjacent, still-hostile, non-moving
    /// opponent grants that opponent one free strike (spec §4.9).
    fn process_opportunity_attacks(
        &self,
        world: &mut World,
        applied: &[crate::conflict_resolver::AppliedAction],
        pre_positions: &std::collections::HashMap<EntityId, crate::grid::Vector2>,
        sink: &mut dyn EventSink,
    ) {
        let movers: Vec<EntityId> = applied
            .iter()
            .filter(|a| matches!(a.effect, AppliedEffect::Moved { .. }))
            .map(|a| a.actor)
            .collect();
        let mut events = Vec::new();
        for mover_id in movers {
            let Some(pre_pos) = pre_positions.get(&mover_id).copied() else { continue };
            let Some(mover) = world.entity(mover_id) else { continue };
            let mover_faction = mover.faction;
            let candidates: Vec<EntityId> = world
                .entities
                .values()
                .filter(|other| {
                    other.id != mover_id
                        && other.stats.alive()
                        && other.pos.manhattan(pre_pos) <= 1
                        && world.faction_registry.is_hostile(mover_faction, other.faction)
                })
                .map(|e| e.id)
                .collect();
            for attacker_id in candidates {
                let tick = world.tick;
                let rng = world.rng();
                let Some(attacker) = world.entity(attacker_id) else { continue };
                let atk_power = attacker.effective_atk(self.item_registry) * self.config.opportunity_mult;
                let Some(defender) = world.entity(mover_id) else { continue };
                let def_power = defender.effective_def(self.item_registry);
                let roll = rng.next_float(Domain::Combat, attacker_id.raw() as i64, tick + 3);
                let damage = world.base_damage_roll(atk_power, def_power, self.config.damage_variance, roll);
                if let Some(defender) = world.entity_mut(mover_id) {
                    defender.stats.hp = (defender.stats.hp - damage).max(0.0);
                }
                events.push((tick, attacker_id, mover_id, damage));
                if world.entity(mover_id).map(|e| !e.stats.alive()).unwrap_or(false) {
                    world.kill_or_respawn(mover_id, sink);
                }
            }
        }
        for (tick, attacker_id, mover_id, damage) in events {
            sink.emit(
                SimEvent::new(tick, EventCategory::Combat, "opportunity attack")
                    .with_entities([attacker_id, mover_id])
                    .with_metadata("verb", "OPPORTUNITY_ATTACK")
                    .with_metadata("damage", damage.to_string()),
            );
        }
    }

    /// Entities stuck chasing a faster target for `chase_closing_base` ticks
    /// get nudged one extra tile closer so Hunt never stalls forever (spec
    /// §4.9 chase-closing).
    fn process_chase_closing(&self, world: &mut World, applied: &[crate::conflict_resolver::AppliedAction]) {
        let hunting: Vec<EntityId> = applied
            .iter()
            .filter(|a| matches!(a.effect, AppliedEffect::Moved { .. }))
            .map(|a| a.actor)
            .collect();
        for id in hunting {
            let Some(entity) = world.entity(id) else { continue };
            if entity.ai_state != AIState::Hunt {
                continue;
            }
            let Some(target_id) = entity.combat_target_id else { continue };
            let Some(target) = world.entity(target_id) else { continue };
            if entity.pos.manhattan(target.pos) <= 1 {
                continue;
            }
            let target_pos = target.pos;
            let mut new_pos = None;
            {
                let entity = world.entity_mut(id).unwrap();
                entity.chase_ticks += 1;
                if entity.chase_ticks as f64 >= self.config.chase_closing_base {
                    let step = crate::ai::perception::direction_toward(entity.pos, target_pos);
                    entity.pos = entity.pos + step;
                    entity.chase_ticks = 0;
                    new_pos = Some(entity.pos);
                }
            }
            if let Some(pos) = new_pos {
                world.spatial_index.move_entity(id, pos);
            }
        }
    }

    // --- Phase 4 -----------------------------------------------------

    fn phase4_subsystems(&self, world: &mut World, sink: &mut dyn EventSink) {
        let tick = world.tick;
        if tick % self.config.core_subsystem_divisor == 0 {
            self.tick_core_subsystem(world, sink);
        }
        if tick % self.config.environment_subsystem_divisor == 0 {
            self.tick_environment_subsystem(world, sink);
        }
        if tick % self.config.economy_subsystem_divisor == 0 {
            self.tick_economy_subsystem(world, sink);
        }
    }

    /// Status effect expiry, threat decay, cooldown ticking, quest
    /// staleness cleanup, engagement tracking, stamina regen.
    fn tick_core_subsystem(&self, world: &mut World, sink: &mut dyn EventSink) {
        let tick = world.tick;
        for entity in world.entities.values_mut() {
            for effect in entity.effects.iter_mut() {
                effect.tick();
            }
            entity.effects.retain(|e| !e.expired());

            for skill in entity.skills.iter_mut() {
                skill.tick_cooldown();
            }

            for (_, threat) in entity.threat_table.iter_mut() {
                *threat *= 1.0 - self.config.threat_decay_rate;
            }
            entity.threat_table.retain(|_, threat| *threat > 0.01);

            entity.quests.retain(|q| !q.is_stale(tick));
        }

        self.tick_engagement(world);
        self.tick_stamina_regen(world);
        let _ = sink;
    }

    /// `engaged_ticks` climbs (capped at 10) while an entity stands adjacent
    /// to a hostile, resets to 0 the moment no hostile is adjacent --
    /// drives the engagement-lock doubling in `apply_move`.
    fn tick_engagement(&self, world: &mut World) {
        let positions: Vec<(EntityId, crate::grid::Vector2, crate::faction::Faction)> =
            world.entities.values().map(|e| (e.id, e.pos, e.faction)).collect();
        for (id, pos, faction) in &positions {
            let adjacent_hostile = positions
                .iter()
                .any(|(oid, opos, ofac)| oid != id && opos.manhattan(*pos) <= 1 && world.faction_registry.is_hostile(*faction, *ofac));
            if let Some(entity) = world.entity_mut(*id) {
                entity.engaged_ticks = if adjacent_hostile { (entity.engaged_ticks + 1).min(10) } else { 0 };
            }
        }
    }

    /// Stamina regen rate depends on what the entity is doing: resting in
    /// town regens fastest, visiting a town building regens moderately,
    /// everything else (wandering, hunting, fighting) trickles back in.
    fn tick_stamina_regen(&self, world: &mut World) {
        for entity in world.entities.values_mut() {
            let regen = match entity.ai_state {
                AIState::RestingInTown => self.config.stamina_regen_resting,
                AIState::VisitShop
                | AIState::VisitBlacksmith
                | AIState::VisitGuild
                | AIState::VisitClassHall
                | AIState::VisitInn
                | AIState::VisitHome => self.config.stamina_regen_visiting,
                _ => self.config.stamina_regen_idle,
            };
            entity.stats.stamina = (entity.stats.stamina + regen).min(entity.stats.max_stamina);
        }
    }

    /// Territory debuff/alert application, terrain & entity memory
    /// refresh, region-transition tracking.
    fn tick_environment_subsystem(&self, world: &mut World, sink: &mut dyn EventSink) {
        self.process_territory_effects(world);
        self.refresh_memory(world);
        self.track_regions(world, sink);
    }

    /// Standing on a faction's territory tile applies that faction's buff
    /// to its own members and a debuff to hostiles; a hostile intruder
    /// inside a faction's `alert_radius` flips that faction's own members
    /// into ALERT unless they're already COMBAT/HUNT/ALERT/FLEE.
    fn process_territory_effects(&self, world: &mut World) {
        let positions: Vec<(EntityId, crate::grid::Vector2, crate::faction::Faction)> =
            world.entities.values().map(|e| (e.id, e.pos, e.faction)).collect();

        for (id, pos, faction) in &positions {
            let owner = world.grid.get(*pos).and_then(|m| world.faction_registry.tile_owner(m));
            let Some(entity) = world.entity_mut(*id) else { continue };
            entity.effects.retain(|e| e.effect_kind != "territory_debuff" && e.effect_kind != "territory_buff");
            match owner {
                Some(owner_faction) if owner_faction == *faction => {
                    entity.effects.push(crate::effects::territory_buff(owner_faction.slug()));
                }
                Some(owner_faction) if world.faction_registry.is_hostile(owner_faction, *faction) => {
                    entity.effects.push(crate::effects::territory_debuff(owner_faction.slug()));
                }
                _ => {}
            }
        }

        let intruders: Vec<(crate::grid::Vector2, crate::faction::Faction)> = positions
            .iter()
            .filter(|(_, pos, faction)| {
                world
                    .grid
                    .get(*pos)
                    .and_then(|m| world.faction_registry.tile_owner(m))
                    .is_some_and(|owner| owner != *faction && world.faction_registry.is_hostile(owner, *faction))
            })
            .map(|(_, pos, faction)| (*pos, *faction))
            .collect();
        if intruders.is_empty() {
            return;
        }

        for (id, pos, faction) in &positions {
            let Some(territory) = world.faction_registry.territory_for(*faction).copied() else { continue };
            let alerted = intruders.iter().any(|(ipos, ifac)| ifac != faction && ipos.manhattan(*pos) <= territory.alert_radius);
            if !alerted {
                continue;
            }
            if let Some(entity) = world.entity_mut(*id) {
                if !matches!(entity.ai_state, AIState::Combat | AIState::Hunt | AIState::Alert | AIState::Flee) {
                    entity.ai_state = AIState::Alert;
                }
            }
        }
    }

    /// Each entity records terrain it can currently see into `terrain_memory`
    /// and refreshes an `EntityMemoryRecord` for every other entity within
    /// `vision_range` (spec §4.6 memory model, simplified to last-seen
    /// position/tick rather than a full per-tile belief grid).
    fn refresh_memory(&self, world: &mut World) {
        use crate::entity::EntityMemoryRecord;
        use crate::grid::Vector2;

        let tick = world.tick;
        let vision = self.config.vision_range;
        let snapshot: Vec<(EntityId, Vector2)> = world.entities.values().map(|e| (e.id, e.pos)).collect();

        for (id, pos) in &snapshot {
            let mut terrain_updates = Vec::new();
            for dx in -vision..=vision {
                for dy in -vision..=vision {
                    let p = Vector2::new(pos.x + dx, pos.y + dy);
                    if pos.manhattan(p) > vision {
                        continue;
                    }
                    if let Some(material) = world.grid.get(p) {
                        terrain_updates.push((p, material));
                    }
                }
            }
            let visible: Vec<EntityMemoryRecord> = snapshot
                .iter()
                .filter(|(oid, opos)| oid != id && pos.manhattan(*opos) <= vision)
                .map(|(oid, opos)| EntityMemoryRecord { entity_id: *oid, last_seen_pos: *opos, last_seen_tick: tick })
                .collect();

            let Some(entity) = world.entity_mut(*id) else { continue };
            for (p, material) in terrain_updates {
                entity.terrain_memory.insert(p, material);
            }
            for record in visible {
                match entity.entity_memory.iter_mut().find(|r| r.entity_id == record.entity_id) {
                    Some(existing) => *existing = record,
                    None => entity.entity_memory.push(record),
                }
            }
        }
    }

    /// Heroes crossing into a new region's Voronoi cell (nearest `Region`
    /// center by Manhattan distance) get `current_region_id` updated and
    /// region-enter/region-leave events emitted.
    fn track_regions(&self, world: &mut World, sink: &mut dyn EventSink) {
        if world.regions.is_empty() {
            return;
        }
        let tick = world.tick;
        let heroes: Vec<(EntityId, crate::grid::Vector2, Option<crate::ids::RegionId>)> = world
            .entities
            .values()
            .filter(|e| e.kind == crate::entity::EntityKind::Hero)
            .map(|e| (e.id, e.pos, e.current_region_id))
            .collect();

        for (id, pos, prev_region) in heroes {
            let nearest = world.regions.iter().min_by_key(|r| r.center.manhattan(pos)).map(|r| r.id);
            if nearest == prev_region {
                continue;
            }
            if let Some(entity) = world.entity_mut(id) {
                entity.current_region_id = nearest;
            }
            if let Some(prev) = prev_region {
                sink.emit(SimEvent::new(tick, EventCategory::System, "region left").with_entities([id]).with_metadata("region_id", prev.raw().to_string()));
            }
            if let Some(next) = nearest {
                sink.emit(SimEvent::new(tick, EventCategory::System, "region entered").with_entities([id]).with_metadata("region_id", next.raw().to_string()));
            }
        }
    }

    /// Resource/chest respawn scheduling, hero regen/town aura, level-up,
    /// EXPLORE quest advancement, and stale ground-loot cleanup -- the
    /// slowest-cadence subsystems (spec economy grouping).
    fn tick_economy_subsystem(&self, world: &mut World, sink: &mut dyn EventSink) {
        self.tick_resource_respawn(world, sink);
        self.tick_hero_regen_and_town_aura(world, sink);
        self.tick_level_up(world, sink);
        self.advance_explore_quests(world);

        let stale_positions: Vec<crate::grid::Vector2> =
            world.ground_loot.iter().filter(|(_, stacks)| stacks.is_empty()).map(|(pos, _)| *pos).collect();
        for pos in stale_positions {
            world.ground_loot.remove(&pos);
        }
    }

    fn tick_resource_respawn(&self, world: &mut World, sink: &mut dyn EventSink) {
        let tick = world.tick;
        for node in world.resource_nodes.values_mut() {
            if node.charges == 0 {
                if let Some(respawn_at) = node.respawn_at {
                    if tick >= respawn_at {
                        node.charges = node.max_charges;
                        node.respawn_at = None;
                        sink.emit(SimEvent::new(tick, EventCategory::System, "resource node respawned"));
                    }
                }
            }
        }
        for chest in world.chests.values_mut() {
            if chest.looted {
                if let Some(respawn_at) = chest.respawn_at {
                    if tick >= respawn_at {
                        chest.looted = false;
                        chest.respawn_at = None;
                        sink.emit(SimEvent::new(tick, EventCategory::System, "treasure chest respawned"));
                    }
                }
            }
        }
    }

    /// Hero regen in town, town-aura damage to trespassing hostiles.
    fn tick_hero_regen_and_town_aura(&self, world: &mut World, sink: &mut dyn EventSink) {
        let town = crate::grid::Vector2::new(self.config.town_center.0, self.config.town_center.1);
        for entity in world.entities.values_mut() {
            let in_town = entity.pos.manhattan(town) <= self.config.town_radius;
            if in_town && entity.kind == crate::entity::EntityKind::Hero {
                entity.stats.hp = (entity.stats.hp + self.config.hero_heal_per_tick).min(entity.stats.max_hp);
                entity.stats.stamina = (entity.stats.stamina + self.config.hero_heal_per_tick).min(entity.stats.max_stamina);
            } else if in_town && entity.kind == crate::entity::EntityKind::Monster {
                entity.stats.hp = (entity.stats.hp - self.config.town_aura_damage).max(0.0);
            }
        }
        let dead: Vec<EntityId> = world.entities.values().filter(|e| !e.stats.alive()).map(|e| e.id).collect();
        for id in dead {
            world.kill_or_respawn(id, sink);
        }
    }

    fn tick_level_up(&self, world: &mut World, sink: &mut dyn EventSink) {
        let tick = world.tick;
        let mut leveled_up = Vec::new();
        for entity in world.entities.values_mut() {
            if entity.stats.xp >= entity.stats.xp_to_next && entity.stats.level < self.config.max_level {
                entity.stats.xp -= entity.stats.xp_to_next;
                entity.stats.level += 1;
                entity.stats.xp_to_next *= self.config.level_scale;
                entity.stats.max_hp += self.config.hp_growth_per_level;
                entity.stats.atk += self.config.atk_growth_per_level;
                entity.stats.matk += self.config.matk_growth_per_level;
                entity.stats.def_ += self.config.def_growth_per_level;
                entity.stats.spd += self.config.spd_growth_per_level;
                if let (Some(attrs), Some(caps)) = (entity.attributes.as_mut(), entity.attribute_caps.as_mut()) {
                    crate::attributes::level_up_attributes(attrs, caps);
                }
                leveled_up.push(entity.id);
            }
        }
        for id in leveled_up {
            sink.emit(SimEvent::new(tick, EventCategory::Lifecycle, "entity leveled up").with_entities([id]));
        }
    }

    /// A hero standing in a region whose name matches an incomplete EXPLORE
    /// quest's `target_kind` advances that quest by one step per economy
    /// tick spent there.
    fn advance_explore_quests(&self, world: &mut World) {
        use crate::entity::QuestType;

        let tick = world.tick;
        let hero_regions: Vec<(EntityId, Option<String>)> = world
            .entities
            .values()
            .filter(|e| e.kind == crate::entity::EntityKind::Hero)
            .map(|e| (e.id, e.current_region_id.and_then(|rid| world.regions.iter().find(|r| r.id == rid).map(|r| r.name.clone()))))
            .collect();

        for (id, region_name) in hero_regions {
            let Some(region_name) = region_name else { continue };
            let Some(entity) = world.entity_mut(id) else { continue };
            for quest in entity.quests.iter_mut() {
                if quest.quest_type != QuestType::Explore || quest.completed || quest.target_kind != region_name {
                    continue;
                }
                quest.progress = (quest.progress + 1).min(quest.goal);
                if quest.progress >= quest.goal {
                    quest.completed = true;
                    quest.completed_at_tick = Some(tick);
                }
            }
        }
    }
}
