//! Status effects and the factory functions that build common instances
//! (spec data model, §3; subsystem ticker, §4.10).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub effect_kind: String,
    pub remaining_ticks: i32,
    pub source: String,
    pub atk_mult: f64,
    pub def_mult: f64,
    pub spd_mult: f64,
    pub crit_mult: f64,
    pub evasion_mult: f64,
    pub hp_per_tick: f64,
}

impl StatusEffect {
    /// `remaining_ticks == -1` marks permanent-until-removed.
    pub fn is_permanent(&self) -> bool {
        self.remaining_ticks == -1
    }

    pub fn expired(&self) -> bool {
        self.remaining_ticks == 0
    }

    /// One Core-subsystem tick: decrement unless permanent.
    pub fn tick(&mut self) {
        if !self.is_permanent() {
            self.remaining_ticks -= 1;
        }
    }
}

pub fn territory_debuff(source: impl Into<String>) -> StatusEffect {
    StatusEffect {
        effect_kind: "territory_debuff".to_string(),
        remaining_ticks: 3,
        source: source.into(),
        atk_mult: 0.7,
        def_mult: 0.7,
        spd_mult: 0.85,
        crit_mult: 1.0,
        evasion_mult: 1.0,
        hp_per_tick: 0.0,
    }
}

pub fn territory_buff(source: impl Into<String>) -> StatusEffect {
    StatusEffect {
        effect_kind: "territory_buff".to_string(),
        remaining_ticks: 3,
        source: source.into(),
        atk_mult: 1.1,
        def_mult: 1.1,
        spd_mult: 1.0,
        crit_mult: 1.0,
        evasion_mult: 1.0,
        hp_per_tick: 0.0,
    }
}

/// Builds a skill-driven effect. Inputs are additive percentage modifiers
/// (e.g. `atk_mod = -0.2` means "-20% ATK"); they are converted to the
/// multiplicative form `StatusEffect` stores internally.
#[allow(clippy::too_many_arguments)]
pub fn skill_effect(
    kind: impl Into<String>,
    atk_mod: f64,
    def_mod: f64,
    spd_mod: f64,
    crit_mod: f64,
    evasion_mod: f64,
    hp_per_tick: f64,
    duration: i32,
    source: impl Into<String>,
) -> StatusEffect {
    StatusEffect {
        effect_kind: kind.into(),
        remaining_ticks: duration,
        source: source.into(),
        atk_mult: 1.0 + atk_mod,
        def_mult: 1.0 + def_mod,
        spd_mult: 1.0 + spd_mod,
        crit_mult: 1.0 + crit_mod,
        evasion_mult: 1.0 + evasion_mod,
        hp_per_tick,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn territory_debuff_applies_weakening_multipliers() {
        let effect = territory_debuff("goblin_horde");
        assert_eq!(effect.atk_mult, 0.7);
        assert_eq!(effect.remaining_ticks, 3);
    }

    #[test]
    fn tick_decrements_and_expires() {
        let mut effect = territory_debuff("x");
        effect.remaining_ticks = 1;
        assert!(!effect.expired());
        effect.tick();
        assert!(effect.expired());
    }

    #[test]
    fn permanent_effect_never_decrements() {
        let mut effect = territory_debuff("x");
        effect.remaining_ticks = -1;
        effect.tick();
        assert_eq!(effect.remaining_ticks, -1);
        assert!(!effect.expired());
    }

    #[test]
    fn skill_effect_converts_additive_mods_to_multipliers() {
        let effect = skill_effect("weaken", -0.2, 0.0, 0.0, 0.0, 0.0, 0.0, 3, "caster");
        assert_eq!(effect.atk_mult, 0.8);
        assert_eq!(effect.def_mult, 1.0);
    }
}
