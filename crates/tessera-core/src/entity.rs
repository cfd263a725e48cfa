//! The `Entity` data model (spec data model, §3) and its derived-stat
//! aggregation (`effective_*`), ported from `core/models.py`'s `Entity`
//! dataclass. IDs are the typed newtypes in `ids.rs` rather than the
//! teacher's generational-index scheme, since entities here are destroyed
//! or hero-respawned in place rather than recycled by slot.

use crate::attributes::{Attributes, AttributeCaps};
use crate::effects::StatusEffect;
use crate::enums::{AIState, Element, EnemyTier, TraitType};
use crate::faction::Faction;
use crate::grid::Vector2;
use crate::ids::{EntityId, RegionId};
use crate::registries::{EquipSlot, EquipmentBonus, ItemRegistry};
use crate::stats::Stats;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Hero,
    Monster,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMemoryRecord {
    pub entity_id: EntityId,
    pub last_seen_pos: Vector2,
    pub last_seen_tick: i64,
    pub last_known_hp_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestType {
    Hunt,
    Gather,
    Explore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    pub quest_id: String,
    pub quest_type: QuestType,
    pub target_kind: String,
    pub target_pos: Option<Vector2>,
    pub progress: u32,
    pub goal: u32,
    pub completed: bool,
    pub completed_at_tick: Option<i64>,
}

impl Quest {
    pub fn is_stale(&self, tick: i64) -> bool {
        match self.completed_at_tick {
            Some(done_at) => tick - done_at > 50,
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Vector2,
    pub stats: Stats,
    pub ai_state: AIState,
    pub faction: Faction,
    pub next_act_at: f64,
    pub memory: HashMap<EntityId, Vector2>,
    pub home_pos: Option<Vector2>,
    pub tier: EnemyTier,
    pub inventory: Vec<ItemStack>,
    pub equipped: HashMap<EquipSlot, String>,
    pub terrain_memory: HashMap<Vector2, crate::enums::Material>,
    pub entity_memory: Vec<EntityMemoryRecord>,
    pub goals: Vec<String>,
    pub effects: Vec<StatusEffect>,
    pub loot_progress: f64,
    pub known_recipes: Vec<String>,
    pub craft_target: Option<String>,
    pub attributes: Option<Attributes>,
    pub attribute_caps: Option<AttributeCaps>,
    pub hero_class: Option<String>,
    pub skills: Vec<crate::skills::SkillInstance>,
    pub class_mastery: HashMap<String, f64>,
    pub quests: Vec<Quest>,
    pub traits: Vec<TraitType>,
    pub threat_table: HashMap<EntityId, f64>,
    pub engaged_ticks: i32,
    pub chase_ticks: i32,
    pub current_region_id: Option<RegionId>,
    pub combat_target_id: Option<EntityId>,
    pub last_reason: String,
    pub leash_radius: i32,
}

impl Entity {
    pub fn has_trait(&self, trait_type: TraitType) -> bool {
        self.traits.contains(&trait_type)
    }

    pub fn has_effect(&self, kind: &str) -> bool {
        self.effects.iter().any(|e| e.effect_kind == kind)
    }

    pub fn remove_effects_by_type(&mut self, kind: &str) {
        self.effects.retain(|e| e.effect_kind != kind);
    }

    fn effect_mult(&self, pick: impl Fn(&StatusEffect) -> f64) -> f64 {
        self.effects.iter().map(pick).product()
    }

    fn equipment_bonus(&self, registry: &dyn ItemRegistry) -> EquipmentBonus {
        self.equipped
            .values()
            .map(|item_id| registry.equipment_bonus(item_id))
            .fold(EquipmentBonus::default(), |acc, b| acc.combine(&b))
    }

    pub fn effective_atk(&self, registry: &dyn ItemRegistry) -> f64 {
        (self.stats.atk + self.equipment_bonus(registry).atk) * self.effect_mult(|e| e.atk_mult)
    }

    pub fn effective_def(&self, registry: &dyn ItemRegistry) -> f64 {
        (self.stats.def_ + self.equipment_bonus(registry).def) * self.effect_mult(|e| e.def_mult)
    }

    pub fn effective_matk(&self, registry: &dyn ItemRegistry) -> f64 {
        (self.stats.matk + self.equipment_bonus(registry).matk) * self.effect_mult(|e| e.atk_mult)
    }

    pub fn effective_mdef(&self, registry: &dyn ItemRegistry) -> f64 {
        (self.stats.mdef + self.equipment_bonus(registry).mdef) * self.effect_mult(|e| e.def_mult)
    }

    pub fn effective_spd(&self, registry: &dyn ItemRegistry) -> f64 {
        (self.stats.spd + self.equipment_bonus(registry).spd) * self.effect_mult(|e| e.spd_mult)
    }

    pub fn effective_crit_rate(&self, registry: &dyn ItemRegistry) -> f64 {
        (self.stats.crit_rate + self.equipment_bonus(registry).crit_rate) * self.effect_mult(|e| e.crit_mult)
    }

    pub fn effective_evasion(&self, registry: &dyn ItemRegistry) -> f64 {
        (self.stats.evasion + self.equipment_bonus(registry).evasion) * self.effect_mult(|e| e.evasion_mult)
    }

    pub fn effective_max_hp(&self, registry: &dyn ItemRegistry) -> f64 {
        self.stats.max_hp + self.equipment_bonus(registry).max_hp
    }

    /// Reach of the equipped weapon, or 1 (bare-handed melee) if none.
    pub fn effective_weapon_range(&self, registry: &dyn ItemRegistry) -> i32 {
        self.equipped
            .get(&EquipSlot::Weapon)
            .map(|item_id| registry.weapon_range(item_id))
            .unwrap_or(1)
            .max(1)
    }

    pub fn elemental_vulnerability(&self, element: Element) -> f64 {
        self.stats.elemental_vulnerability(element)
    }

    pub fn copy(&self) -> Entity {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registries::StaticItemRegistry;

    fn sample_entity() -> Entity {
        Entity {
            id: EntityId::new(1),
            kind: EntityKind::Hero,
            pos: Vector2::new(0, 0),
            stats: Stats::default(),
            ai_state: AIState::Idle,
            faction: Faction::HeroGuild,
            next_act_at: 0.0,
            memory: HashMap::new(),
            home_pos: None,
            tier: EnemyTier::Basic,
            inventory: Vec::new(),
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
    fn effective_atk_with_no_equipment_or_effects_equals_base() {
        let entity = sample_entity();
        let registry = StaticItemRegistry::empty();
        assert_eq!(entity.effective_atk(&registry), entity.stats.atk);
    }

    #[test]
    fn status_effect_multipliers_stack_multiplicatively() {
        let mut entity = sample_entity();
        entity.effects.push(crate::effects::territory_debuff("x"));
        entity.effects.push(crate::effects::territory_debuff("y"));
        let registry = StaticItemRegistry::empty();
        assert_eq!(entity.effective_atk(&registry), entity.stats.atk * 0.7 * 0.7);
    }

    #[test]
    fn has_trait_and_has_effect() {
        let mut entity = sample_entity();
        entity.traits.push(TraitType::Aggressive);
        entity.effects.push(crate::effects::territory_debuff("goblin_horde"));
        assert!(entity.has_trait(TraitType::Aggressive));
        assert!(!entity.has_trait(TraitType::Cautious));
        assert!(entity.has_effect("territory_debuff"));
    }

    #[test]
    fn remove_effects_by_type_only_removes_matching_kind() {
        let mut entity = sample_entity();
        entity.effects.push(crate::effects::territory_debuff("a"));
        entity.effects.push(crate::effects::territory_buff("b"));
        entity.remove_effects_by_type("territory_debuff");
        assert_eq!(entity.effects.len(), 1);
        assert_eq!(entity.effects[0].effect_kind, "territory_buff");
    }

    #[test]
    fn quest_becomes_stale_after_fifty_ticks() {
        let mut quest = Quest {
            quest_id: "q1".into(),
            quest_type: QuestType::Hunt,
            target_kind: "goblin".into(),
            target_pos: None,
            progress: 1,
            goal: 1,
            completed: true,
            completed_at_tick: Some(10),
        };
        assert!(!quest.is_stale(40));
        assert!(quest.is_stale(61));
        quest.completed_at_tick = None;
        assert!(!quest.is_stale(10_000));
    }
}
