//! Damage Calculator registry (spec §4.12). Looks up a resolver by
//! `DamageType`; unknown types fall back to physical.

use crate::enums::DamageType;
use crate::entity::Entity;
use crate::registries::ItemRegistry;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageContext {
    pub atk_power: f64,
    pub def_power: f64,
    pub atk_mult: f64,
    pub def_mult: f64,
}

pub trait DamageCalculator: Send + Sync {
    fn train_action(&self) -> &'static str;
    fn resolve(&self, attacker: &Entity, defender: &Entity, registry: &dyn ItemRegistry) -> DamageContext;
}

/// ATK/STR vs DEF/VIT. `STR`'s contribution is already folded into
/// `effective_atk`/`effective_def` via attribute derivation upstream; this
/// calculator only selects which stat pair governs the exchange.
#[derive(Debug, Clone, Copy)]
pub struct PhysicalDamageCalculator;

impl DamageCalculator for PhysicalDamageCalculator {
    fn train_action(&self) -> &'static str {
        "attack"
    }

    fn resolve(&self, attacker: &Entity, defender: &Entity, registry: &dyn ItemRegistry) -> DamageContext {
        DamageContext {
            atk_power: attacker.effective_atk(registry),
            def_power: defender.effective_def(registry),
            atk_mult: 1.0,
            def_mult: 1.0,
        }
    }
}

/// MATK/SPI vs MDEF/WIS.
#[derive(Debug, Clone, Copy)]
pub struct MagicalDamageCalculator;

impl DamageCalculator for MagicalDamageCalculator {
    fn train_action(&self) -> &'static str {
        "magic_attack"
    }

    fn resolve(&self, attacker: &Entity, defender: &Entity, registry: &dyn ItemRegistry) -> DamageContext {
        DamageContext {
            atk_power: attacker.effective_matk(registry),
            def_power: defender.effective_mdef(registry),
            atk_mult: 1.0,
            def_mult: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DamageCalculatorRegistry {
    physical: PhysicalDamageCalculator,
    magical: MagicalDamageCalculator,
}

impl DamageCalculatorRegistry {
    pub fn new() -> Self {
        Self { physical: PhysicalDamageCalculator, magical: MagicalDamageCalculator }
    }

    pub fn get(&self, damage_type: DamageType) -> &dyn DamageCalculator {
        match damage_type {
            DamageType::Magical => &self.magical,
            DamageType::Physical => &self.physical,
        }
    }
}

impl Default for DamageCalculatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// `max(atk_power*atk_mult - def_power*def_mult/2, 1) * (1 +/- variance*(rng-0.5))`.
pub fn base_damage(ctx: DamageContext, variance: f64, variance_roll: f64) -> f64 {
    let raw = (ctx.atk_power * ctx.atk_mult - ctx.def_power * ctx.def_mult / 2.0).max(1.0);
    raw * (1.0 + variance * (variance_roll - 0.5))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_falls_back_to_physical_for_unmapped_types() {
        let registry = DamageCalculatorRegistry::new();
        assert_eq!(registry.get(DamageType::Physical).train_action(), "attack");
        assert_eq!(registry.get(DamageType::Magical).train_action(), "magic_attack");
    }

    #[test]
    fn base_damage_floors_at_one() {
        let ctx = DamageContext { atk_power: 1.0, def_power: 100.0, atk_mult: 1.0, def_mult: 1.0 };
        assert_eq!(base_damage(ctx, 0.0, 0.5), 1.0);
    }

    #[test]
    fn base_damage_applies_variance_symmetrically_around_midpoint() {
        let ctx = DamageContext { atk_power: 20.0, def_power: 0.0, atk_mult: 1.0, def_mult: 1.0 };
        let mid = base_damage(ctx, 0.2, 0.5);
        assert_eq!(mid, 20.0);
        let high = base_damage(ctx, 0.2, 1.0);
        let low = base_damage(ctx, 0.2, 0.0);
        assert!(high > mid && low < mid);
    }
}
