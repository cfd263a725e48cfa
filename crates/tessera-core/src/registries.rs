//! Opaque read-only content registries (spec §4.12).
//!
//! Item/skill/class/trait/recipe/loot tables are content data, explicitly a
//! Non-goal of this engine: the engine reads fields from them but never
//! constructs or mutates entries. They are modeled as trait objects so a
//! host application can back them with whatever static data it owns; the
//! `Static*` implementations here are minimal in-memory maps useful for
//! tests and as a reference default.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipSlot {
    Weapon,
    Armor,
    Accessory,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquipmentBonus {
    pub atk: f64,
    pub def: f64,
    pub matk: f64,
    pub mdef: f64,
    pub spd: f64,
    pub crit_rate: f64,
    pub evasion: f64,
    pub max_hp: f64,
}

impl Default for EquipmentBonus {
    fn default() -> Self {
        Self { atk: 0.0, def: 0.0, matk: 0.0, mdef: 0.0, spd: 0.0, crit_rate: 0.0, evasion: 0.0, max_hp: 0.0 }
    }
}

impl EquipmentBonus {
    pub fn combine(&self, other: &EquipmentBonus) -> EquipmentBonus {
        EquipmentBonus {
            atk: self.atk + other.atk,
            def: self.def + other.def,
            matk: self.matk + other.matk,
            mdef: self.mdef + other.mdef,
            spd: self.spd + other.spd,
            crit_rate: self.crit_rate + other.crit_rate,
            evasion: self.evasion + other.evasion,
            max_hp: self.max_hp + other.max_hp,
        }
    }

    /// Strictly greater in every dimension that matters for auto-equip
    /// comparisons (spec §4.9's "strictly better" LOOT rule).
    pub fn strictly_better_than(&self, other: &EquipmentBonus) -> bool {
        let fields = [
            (self.atk, other.atk),
            (self.def, other.def),
            (self.matk, other.matk),
            (self.mdef, other.mdef),
            (self.max_hp, other.max_hp),
        ];
        fields.iter().all(|(a, b)| a >= b) && fields.iter().any(|(a, b)| a > b)
    }
}

pub trait ItemRegistry: Send + Sync {
    fn equipment_bonus(&self, item_id: &str) -> EquipmentBonus;
    fn heal_amount(&self, item_id: &str) -> f64;
    fn weapon_range(&self, item_id: &str) -> i32;
    fn weight(&self, item_id: &str) -> f64;

    /// Whether a skill is area-of-effect rather than single-target. Content
    /// data the host owns; an empty registry treats every skill as
    /// single-target.
    fn skill_is_aoe(&self, _skill_id: &str) -> bool {
        false
    }

    /// How far from the caster the blast may be centered.
    fn skill_cast_range(&self, _skill_id: &str) -> i32 {
        1
    }

    /// Radius of the blast around its impact point.
    fn skill_aoe_radius(&self, _skill_id: &str) -> i32 {
        0
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct AoeProfile {
    cast_range: i32,
    radius: i32,
}

#[derive(Debug, Clone, Default)]
pub struct StaticItemRegistry {
    equipment: HashMap<String, EquipmentBonus>,
    heal: HashMap<String, f64>,
    range: HashMap<String, i32>,
    weight: HashMap<String, f64>,
    aoe: HashMap<String, AoeProfile>,
}

impl StaticItemRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_equipment(mut self, item_id: impl Into<String>, bonus: EquipmentBonus) -> Self {
        self.equipment.insert(item_id.into(), bonus);
        self
    }

    pub fn with_heal(mut self, item_id: impl Into<String>, amount: f64) -> Self {
        self.heal.insert(item_id.into(), amount);
        self
    }

    pub fn with_range(mut self, item_id: impl Into<String>, range: i32) -> Self {
        self.range.insert(item_id.into(), range);
        self
    }

    pub fn with_weight(mut self, item_id: impl Into<String>, weight: f64) -> Self {
        self.weight.insert(item_id.into(), weight);
        self
    }

    pub fn with_aoe_skill(mut self, skill_id: impl Into<String>, cast_range: i32, radius: i32) -> Self {
        self.aoe.insert(skill_id.into(), AoeProfile { cast_range, radius });
        self
    }
}

impl ItemRegistry for StaticItemRegistry {
    fn equipment_bonus(&self, item_id: &str) -> EquipmentBonus {
        self.equipment.get(item_id).copied().unwrap_or_default()
    }

    fn heal_amount(&self, item_id: &str) -> f64 {
        self.heal.get(item_id).copied().unwrap_or(0.0)
    }

    fn weapon_range(&self, item_id: &str) -> i32 {
        self.range.get(item_id).copied().unwrap_or(1)
    }

    fn weight(&self, item_id: &str) -> f64 {
        self.weight.get(item_id).copied().unwrap_or(1.0)
    }

    fn skill_is_aoe(&self, skill_id: &str) -> bool {
        self.aoe.contains_key(skill_id)
    }

    fn skill_cast_range(&self, skill_id: &str) -> i32 {
        self.aoe.get(skill_id).map(|p| p.cast_range).unwrap_or(1)
    }

    fn skill_aoe_radius(&self, skill_id: &str) -> i32 {
        self.aoe.get(skill_id).map(|p| p.radius).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_registry_returns_zeroed_defaults() {
        let reg = StaticItemRegistry::empty();
        assert_eq!(reg.equipment_bonus("sword").atk, 0.0);
        assert_eq!(reg.heal_amount("potion"), 0.0);
        assert_eq!(reg.weapon_range("bow"), 1);
        assert!(!reg.skill_is_aoe("fireball"));
    }

    #[test]
    fn strictly_better_requires_no_regression() {
        let a = EquipmentBonus { atk: 5.0, ..Default::default() };
        let b = EquipmentBonus { atk: 3.0, def: 1.0, ..Default::default() };
        assert!(!a.strictly_better_than(&b));
        let c = EquipmentBonus { atk: 5.0, def: 1.0, ..Default::default() };
        assert!(c.strictly_better_than(&a));
    }

    #[test]
    fn combine_sums_fields() {
        let a = EquipmentBonus { atk: 2.0, ..Default::default() };
        let b = EquipmentBonus { atk: 3.0, def: 1.0, ..Default::default() };
        let combined = a.combine(&b);
        assert_eq!(combined.atk, 5.0);
        assert_eq!(combined.def, 1.0);
    }
}
