//! Conflict Resolver (spec §4.8). Sorts proposals into a total, scheduling
//! and id-tie-broken order and applies them serially against `World` — the
//! only place besides the subsystem ticker that mutates entity state.

use crate::action::{ActionProposal, ActionTarget};
use crate::entity::QuestType;
use crate::enums::{ActionType, Domain};
use crate::ids::EntityId;
use crate::registries::ItemRegistry;
use crate::world::World;

/// Speed-delay weight for REST — a tenth of MOVE's, since resting is the
/// cheapest action an entity can take.
const REST_SPEED_WEIGHT: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub enum AppliedEffect {
    Moved { pre_pos: crate::grid::Vector2 },
    Attacked { defender: EntityId, damage: f64, defender_died: bool, evaded: bool },
    Rested,
    /// Validated only; fully applied downstream by the subsystem ticker /
    /// loop phase 4 (spec §4.8 closing note).
    DeferredForSubsystem,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppliedAction {
    pub actor: EntityId,
    pub verb: ActionType,
    pub target: ActionTarget,
    pub effect: AppliedEffect,
}

#[derive(Debug, Clone, Default)]
pub struct ResolutionOutcome {
    pub applied: Vec<AppliedAction>,
    pub rejected: Vec<EntityId>,
}

pub struct ConflictResolver<'a> {
    pub item_registry: &'a dyn ItemRegistry,
    pub damage_variance: f64,
    pub crit_rate_cap: f64,
    pub opportunity_threat_mult: f64,
    pub xp_per_kill_base: f64,
}

impl<'a> ConflictResolver<'a> {
    /// Ascending `(verb, next_act_at, actor_id)` — total order independent
    /// of proposal arrival order (spec §8 "conflict resolver total
    /// ordering").
    fn sort_key(world: &World, proposal: &ActionProposal) -> (u8, i64, u64) {
        let next_act_at = world.entity(proposal.actor_id).map(|e| e.next_act_at).unwrap_or(f64::INFINITY);
        (proposal.verb as u8, (next_act_at * 1000.0) as i64, proposal.actor_id.raw())
    }

    pub fn resolve(&self, mut proposals: Vec<ActionProposal>, world: &mut World, sink: &mut dyn crate::events::EventSink) -> ResolutionOutcome {
        proposals.sort_by_key(|p| Self::sort_key(world, p));

        let mut outcome = ResolutionOutcome::default();
        let mut occupied_this_pass: std::collections::HashSet<crate::grid::Vector2> = Default::default();

        for proposal in proposals {
            if !world.is_alive(proposal.actor_id) {
                outcome.rejected.push(proposal.actor_id);
                continue;
            }
            let applied = match proposal.verb {
                ActionType::Rest => self.apply_rest(&proposal, world),
                ActionType::Move => self.apply_move(&proposal, world, &mut occupied_this_pass),
                ActionType::Attack => self.apply_attack(&proposal, world, sink),
                ActionType::UseItem | ActionType::Loot | ActionType::Harvest | ActionType::UseSkill => {
                    Some(AppliedEffect::DeferredForSubsystem)
                }
            };
            match applied {
                Some(effect) => outcome.applied.push(AppliedAction {
                    actor: proposal.actor_id,
                    verb: proposal.verb,
                    target: proposal.target,
                    effect,
                }),
                None => outcome.rejected.push(proposal.actor_id),
            }
        }
        outcome
    }

    fn apply_rest(&self, proposal: &ActionProposal, world: &mut World) -> Option<AppliedEffect> {
        let tick = world.tick;
        let spd = world.entity(proposal.actor_id)?.stats.spd;
        let delay = world.speed_delay(spd, REST_SPEED_WEIGHT, false);
        let entity = world.entity_mut(proposal.actor_id)?;
        if entity.stats.hp < entity.stats.max_hp {
            entity.stats.hp = (entity.stats.hp + 1.0).min(entity.stats.max_hp);
        }
        entity.next_act_at = tick as f64 + delay;
        Some(AppliedEffect::Rested)
    }

    fn apply_move(
        &self,
        proposal: &ActionProposal,
        world: &mut World,
        occupied_this_pass: &mut std::collections::HashSet<crate::grid::Vector2>,
    ) -> Option<AppliedEffect> {
        let ActionTarget::Position(target) = proposal.target else { return None };
        if !world.grid.is_walkable(target) {
            return None;
        }
        if occupied_this_pass.contains(&target) || world.occupant_at(target).is_some() {
            return None;
        }

        let pre_pos = world.entity(proposal.actor_id)?.pos;
        let tick = world.tick;
        let (spd, engaged) = {
            let entity = world.entity(proposal.actor_id)?;
            (entity.stats.spd, entity.engaged_ticks >= 2)
        };
        let on_fast_tile = world.grid.is_road(target) || world.grid.is_bridge(target);
        let mut delay = world.move_speed_delay(spd, on_fast_tile);
        if engaged {
            delay *= 2.0;
        }

        let entity = world.entity_mut(proposal.actor_id)?;
        entity.pos = target;
        entity.next_act_at = tick as f64 + delay;
        entity.stats.stamina = (entity.stats.stamina - 1.0).max(0.0);
        if engaged {
            entity.engaged_ticks = 0;
        }
        if let Some(attrs) = entity.attributes.as_mut() {
            if let Some(caps) = entity.attribute_caps {
                crate::attributes::train_attributes(attrs, &caps, "move");
            }
        }

        world.spatial_index.move_entity(proposal.actor_id, target);
        occupied_this_pass.insert(target);
        Some(AppliedEffect::Moved { pre_pos })
    }

    fn apply_attack(&self, proposal: &ActionProposal, world: &mut World, sink: &mut dyn crate::events::EventSink) -> Option<AppliedEffect> {
        let ActionTarget::Entity(defender_id) = proposal.target else { return None };
        if !world.is_alive(defender_id) {
            return None;
        }
        let attacker_pos = world.entity(proposal.actor_id)?.pos;
        let defender_pos = world.entity(defender_id)?.pos;
        let attacker_range = world.entity(proposal.actor_id)?.effective_weapon_range(self.item_registry);
        if attacker_pos.manhattan(defender_pos) > attacker_range {
            return None;
        }

        let tick = world.tick;
        let rng = world.rng();
        let attacker_id = proposal.actor_id;

        let attacker_evasion_luck = world.entity(attacker_id)?.stats.luck;
        let mut defender_evasion = world.entity(defender_id)?.effective_evasion(self.item_registry) - attacker_evasion_luck / 500.0;
        // Cover: a defender backed against a wall gets a flat evasion bump
        // against anyone shooting from range (spec §9 cover evasion bonus).
        if attacker_range > 1 && world.grid.has_adjacent_wall(defender_pos) {
            defender_evasion += 0.07;
        }
        let evasion_roll = rng.next_float(Domain::Combat, defender_id.raw() as i64, tick);
        if evasion_roll < defender_evasion.max(0.0) {
            return Some(AppliedEffect::Attacked { defender: defender_id, damage: 0.0, defender_died: false, evaded: true });
        }

        let attacker = world.entity(attacker_id)?;
        let atk_power = attacker.effective_atk(self.item_registry);
        let attacker_luck = attacker.stats.luck;
        let attacker_crit = attacker.effective_crit_rate(self.item_registry);
        let crit_dmg = attacker.stats.crit_dmg;
        let def_power = world.entity(defender_id)?.effective_def(self.item_registry);

        let variance_roll = rng.next_float(Domain::Combat, attacker_id.raw() as i64, tick + 1);
        let mut damage = world.base_damage_roll(atk_power, def_power, self.damage_variance, variance_roll);

        let crit_roll = rng.next_float(Domain::Combat, attacker_id.raw() as i64, tick + 2);
        let crit_chance = (attacker_crit + attacker_luck / 333.0).min(self.crit_rate_cap);
        if crit_roll < crit_chance {
            damage *= crit_dmg;
        }

        let defender = world.entity_mut(defender_id)?;
        defender.stats.hp = (defender.stats.hp - damage).max(0.0);
        let defender_died = !defender.stats.alive();
        *defender.threat_table.entry(attacker_id).or_insert(0.0) += damage * self.opportunity_threat_mult;

        if let Some(attrs) = world.entity_mut(attacker_id).and_then(|e| e.attributes.as_mut()) {
            if let Some(caps) = world.entity(attacker_id).and_then(|e| e.attribute_caps) {
                crate::attributes::train_attributes(attrs, &caps, "attack");
            }
        }
        let attacker = world.entity_mut(attacker_id)?;
        attacker.stats.stamina = (attacker.stats.stamina - 3.0).max(0.0);

        if defender_died {
            self.award_kill(attacker_id, defender_id, tick, world);
            world.kill_or_respawn(defender_id, sink);
        }

        Some(AppliedEffect::Attacked { defender: defender_id, damage, defender_died, evaded: false })
    }

    /// XP, gold, and HUNT quest progress for a kill (spec §4.8 defender-died
    /// branch). Reads the defender's level/tier/gold before `kill_or_respawn`
    /// removes it.
    fn award_kill(&self, attacker_id: EntityId, defender_id: EntityId, tick: i64, world: &mut World) {
        let Some(defender) = world.entity(defender_id) else { return };
        let defender_level = defender.stats.level.max(1) as f64;
        let defender_tier = defender.tier as u8 as f64;
        let defender_gold = defender.stats.gold;
        let defender_faction = defender.faction;

        let xp_gain = self.xp_per_kill_base * defender_level * (1.0 + 0.5 * defender_tier);
        let Some(attacker) = world.entity_mut(attacker_id) else { return };
        attacker.stats.xp += xp_gain;
        attacker.stats.gold += defender_gold;
        let target_kind = defender_faction.slug();
        for quest in attacker.quests.iter_mut() {
            if quest.quest_type != QuestType::Hunt || quest.completed || quest.target_kind != target_kind {
                continue;
            }
            quest.progress = (quest.progress + 1).min(quest.goal);
            if quest.progress >= quest.goal {
                quest.completed = true;
                quest.completed_at_tick = Some(tick);
            }
        }

        if let Some(defender) = world.entity_mut(defender_id) {
            defender.stats.gold = 0;
        }
    }
}
