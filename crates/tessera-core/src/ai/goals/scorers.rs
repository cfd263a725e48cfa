//! Concrete goal scorers, one per candidate behavior (spec §4.6). Ported
//! from the utility-AI scorer set in `ai/goals/scorers.py`: each scorer is a
//! pure function of the current snapshot that returns a single scalar;
//! anything at or below zero is filtered out by the `GoalEvaluator` before
//! the weighted-random pick runs.

use crate::ai::context::AIContext;
use crate::ai::goals::base::GoalScorer;
use crate::ai::perception;
use crate::enums::{AIState, TraitType};
use crate::ids::EntityId;

fn is_hero(ctx: &AIContext) -> bool {
    ctx.entity.kind == crate::entity::EntityKind::Hero
}

fn trait_utility(ctx: &AIContext, trait_type: TraitType, amount: f64) -> f64 {
    if ctx.entity.has_trait(trait_type) {
        amount
    } else {
        0.0
    }
}

/// Net trait-driven adjustment the original calls `_trait_stats`: bravery
/// and bloodlust push toward engagement, caution and cowardice pull away.
fn trait_stats(ctx: &AIContext) -> f64 {
    let mut delta = 0.0;
    delta += trait_utility(ctx, TraitType::Brave, 0.15);
    delta += trait_utility(ctx, TraitType::Bloodthirsty, 0.2);
    delta += trait_utility(ctx, TraitType::Berserker, 0.15);
    delta -= trait_utility(ctx, TraitType::Cautious, 0.15);
    delta -= trait_utility(ctx, TraitType::Cowardly, 0.25);
    delta
}

fn current_region_difficulty(ctx: &AIContext) -> f64 {
    ctx.entity
        .current_region_id
        .and_then(|id| ctx.snapshot.regions.iter().find(|r| r.id == id))
        .map(|r| r.difficulty)
        .unwrap_or(1.0)
}

/// Higher danger regions make fleeing and camp-guarding more attractive for
/// low-tier entities, and hunting less attractive for heroes under-leveled
/// for the zone.
fn region_danger_penalty(ctx: &AIContext) -> f64 {
    let difficulty = current_region_difficulty(ctx);
    if is_hero(ctx) {
        (difficulty - ctx.entity.stats.level as f64 / 10.0).max(0.0)
    } else {
        0.0
    }
}

pub struct CombatScorer;
impl GoalScorer for CombatScorer {
    fn name(&self) -> &'static str {
        "combat"
    }
    fn target_state(&self) -> AIState {
        AIState::Hunt
    }
    fn score(&self, ctx: &AIContext) -> f64 {
        if ctx.entity.stats.hp_ratio() < ctx.config.flee_hp_threshold {
            return 0.0;
        }
        let Some(enemy) = perception::nearest_enemy(ctx.snapshot, ctx.entity, ctx.faction_registry) else {
            return 0.0;
        };
        let distance = ctx.entity.pos.manhattan(enemy.pos) as f64;
        let base = 1.0 / (1.0 + distance * 0.2);
        (base + trait_stats(ctx) - region_danger_penalty(ctx)).max(0.0)
    }
}

pub struct FleeScorer;
impl GoalScorer for FleeScorer {
    fn name(&self) -> &'static str {
        "flee"
    }
    fn target_state(&self) -> AIState {
        AIState::Flee
    }
    fn score(&self, ctx: &AIContext) -> f64 {
        if ctx.entity.stats.hp_ratio() >= ctx.config.flee_hp_threshold {
            return 0.0;
        }
        let urgency = (ctx.config.flee_hp_threshold - ctx.entity.stats.hp_ratio()) / ctx.config.flee_hp_threshold;
        let mut score = urgency * 2.0;
        score -= trait_utility(ctx, TraitType::Brave, 0.2);
        score -= trait_utility(ctx, TraitType::Berserker, 0.3);
        score += trait_utility(ctx, TraitType::Cowardly, 0.3);
        score.max(0.0)
    }
}

pub struct ExploreScorer;
impl GoalScorer for ExploreScorer {
    fn name(&self) -> &'static str {
        "explore"
    }
    fn target_state(&self) -> AIState {
        AIState::Wander
    }
    fn score(&self, ctx: &AIContext) -> f64 {
        let mut score = 0.4;
        score += trait_utility(ctx, TraitType::Curious, 0.3);
        score -= trait_utility(ctx, TraitType::Lazy, 0.2);
        score.max(0.05)
    }
}

pub struct LootScorer;
impl GoalScorer for LootScorer {
    fn name(&self) -> &'static str {
        "loot"
    }
    fn target_state(&self) -> AIState {
        AIState::Looting
    }
    fn score(&self, ctx: &AIContext) -> f64 {
        let nearby = perception::ground_loot_nearby(ctx.snapshot, ctx.entity.pos, ctx.entity.stats.vision_range);
        if nearby.is_empty() {
            return 0.0;
        }
        let closest = nearby[0];
        let distance = ctx.entity.pos.manhattan(closest) as f64;
        let mut score = 0.6 / (1.0 + distance * 0.15);
        score += trait_utility(ctx, TraitType::Greedy, 0.3);
        score.max(0.0)
    }
}

pub struct TradeScorer;
impl GoalScorer for TradeScorer {
    fn name(&self) -> &'static str {
        "trade"
    }
    fn target_state(&self) -> AIState {
        AIState::VisitShop
    }
    fn score(&self, ctx: &AIContext) -> f64 {
        if !is_hero(ctx) || !perception::is_in_town(ctx.snapshot, ctx.entity.pos) {
            return 0.0;
        }
        let mut score = if ctx.entity.inventory.len() as f64 >= ctx.config.inventory_cap as f64 * 0.75 { 0.5 } else { 0.1 };
        score += trait_utility(ctx, TraitType::Charismatic, 0.2);
        score.max(0.0)
    }
}

pub struct RestScorer;
impl GoalScorer for RestScorer {
    fn name(&self) -> &'static str {
        "rest"
    }
    fn target_state(&self) -> AIState {
        AIState::RestingInTown
    }
    fn score(&self, ctx: &AIContext) -> f64 {
        let fatigue = 1.0 - ctx.entity.stats.stamina_ratio();
        let mut score = fatigue * 0.8;
        if perception::is_in_town(ctx.snapshot, ctx.entity.pos) {
            score += 0.2;
        }
        score -= trait_utility(ctx, TraitType::Diligent, 0.2);
        score += trait_utility(ctx, TraitType::Lazy, 0.25);
        score.max(0.0)
    }
}

pub struct CraftScorer;
impl GoalScorer for CraftScorer {
    fn name(&self) -> &'static str {
        "craft"
    }
    fn target_state(&self) -> AIState {
        AIState::VisitBlacksmith
    }
    fn score(&self, ctx: &AIContext) -> f64 {
        if !is_hero(ctx) || ctx.entity.craft_target.is_none() || !perception::is_in_town(ctx.snapshot, ctx.entity.pos) {
            return 0.0;
        }
        (0.5 + trait_utility(ctx, TraitType::Diligent, 0.2)).max(0.0)
    }
}

pub struct SocialScorer;
impl GoalScorer for SocialScorer {
    fn name(&self) -> &'static str {
        "social"
    }
    fn target_state(&self) -> AIState {
        AIState::VisitInn
    }
    fn score(&self, ctx: &AIContext) -> f64 {
        if !perception::is_in_town(ctx.snapshot, ctx.entity.pos) {
            return 0.0;
        }
        let mut score = 0.15;
        score += trait_utility(ctx, TraitType::Charismatic, 0.3);
        score -= trait_utility(ctx, TraitType::Loner, 0.3);
        score.max(0.0)
    }
}

pub struct GuardScorer;
impl GoalScorer for GuardScorer {
    fn name(&self) -> &'static str {
        "guard"
    }
    fn target_state(&self) -> AIState {
        AIState::GuardCamp
    }
    fn score(&self, ctx: &AIContext) -> f64 {
        if is_hero(ctx) || !perception::is_camp(ctx.snapshot, ctx.entity.pos) {
            return 0.0;
        }
        let allies = perception::count_nearby_allies(ctx.snapshot, ctx.entity, ctx.faction_registry, 6) as f64;
        let mut score = 0.3 + allies * 0.05;
        score += trait_utility(ctx, TraitType::Resilient, 0.2);
        score.max(0.0)
    }
}

pub fn registry() -> Vec<Box<dyn GoalScorer>> {
    vec![
        Box::new(CombatScorer),
        Box::new(FleeScorer),
        Box::new(ExploreScorer),
        Box::new(LootScorer),
        Box::new(TradeScorer),
        Box::new(RestScorer),
        Box::new(CraftScorer),
        Box::new(SocialScorer),
        Box::new(GuardScorer),
    ]
}

/// Used by `_is_hero`-equivalent call sites outside this module that only
/// have an `EntityId`, not a full `Entity` (e.g. threat-table lookups).
pub fn is_hero_id(ctx: &AIContext, id: EntityId) -> bool {
    ctx.snapshot.entity(id).map(|e| e.kind == crate::entity::EntityKind::Hero).unwrap_or(false)
}
