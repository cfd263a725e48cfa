//! Combat and progression stats (spec data model, §3).

use crate::enums::Element;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub hp: f64,
    pub max_hp: f64,
    pub atk: f64,
    pub def_: f64,
    pub matk: f64,
    pub mdef: f64,
    pub spd: f64,
    pub luck: f64,
    pub crit_rate: f64,
    pub crit_dmg: f64,
    pub evasion: f64,
    pub level: i32,
    pub xp: f64,
    pub xp_to_next: f64,
    pub gold: i64,
    pub stamina: f64,
    pub max_stamina: f64,
    pub vision_range: i32,
    pub loot_bonus: f64,
    pub trade_bonus: f64,
    pub interaction_speed: f64,
    pub rest_efficiency: f64,
    pub hp_regen: f64,
    pub cooldown_reduction: f64,
    pub elem_vuln: HashMap<Element, f64>,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            hp: 100.0,
            max_hp: 100.0,
            atk: 10.0,
            def_: 5.0,
            matk: 10.0,
            mdef: 5.0,
            spd: 10.0,
            luck: 5.0,
            crit_rate: 0.05,
            crit_dmg: 1.5,
            evasion: 0.05,
            level: 1,
            xp: 0.0,
            xp_to_next: 100.0,
            gold: 0,
            stamina: 100.0,
            max_stamina: 100.0,
            vision_range: 8,
            loot_bonus: 0.0,
            trade_bonus: 0.0,
            interaction_speed: 1.0,
            rest_efficiency: 1.0,
            hp_regen: 0.0,
            cooldown_reduction: 0.0,
            elem_vuln: HashMap::new(),
        }
    }
}

impl Stats {
    pub fn alive(&self) -> bool {
        self.hp > 0.0
    }

    pub fn hp_ratio(&self) -> f64 {
        if self.max_hp <= 0.0 {
            0.0
        } else {
            (self.hp / self.max_hp).clamp(0.0, 1.0)
        }
    }

    pub fn stamina_ratio(&self) -> f64 {
        if self.max_stamina <= 0.0 {
            0.0
        } else {
            (self.stamina / self.max_stamina).clamp(0.0, 1.0)
        }
    }

    pub fn elemental_vulnerability(&self, element: Element) -> f64 {
        *self.elem_vuln.get(&element).unwrap_or(&1.0)
    }

    pub fn copy(&self) -> Stats {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hp_ratio_is_clamped() {
        let mut stats = Stats::default();
        stats.hp = 150.0;
        assert_eq!(stats.hp_ratio(), 1.0);
        stats.hp = -10.0;
        assert_eq!(stats.hp_ratio(), 0.0);
    }

    #[test]
    fn alive_requires_positive_hp() {
        let mut stats = Stats::default();
        assert!(stats.alive());
        stats.hp = 0.0;
        assert!(!stats.alive());
    }

    #[test]
    fn unset_elemental_vulnerability_defaults_to_neutral() {
        let stats = Stats::default();
        assert_eq!(stats.elemental_vulnerability(Element::Fire), 1.0);
    }

    #[test]
    fn elemental_vulnerability_lookup_returns_configured_value() {
        let mut stats = Stats::default();
        stats.elem_vuln.insert(Element::Fire, 1.5);
        assert_eq!(stats.elemental_vulnerability(Element::Fire), 1.5);
        assert_eq!(stats.elemental_vulnerability(Element::Ice), 1.0);
    }
}
