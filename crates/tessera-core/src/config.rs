//! Immutable simulation configuration (spec §6, ambient "Configuration"
//! section of SPEC_FULL.md). Built once via the builder-style setters below,
//! each of which clamps to a sane range; the engine reads it read-only from
//! then on.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub grid_width: i32,
    pub grid_height: i32,
    pub max_ticks: Option<i64>,
    pub worker_timeout_secs: f64,
    pub worker_count: usize,
    pub spatial_cell_size: i32,
    pub vision_range: i32,
    pub flee_hp_threshold: f64,
    pub town_center: (i32, i32),
    pub town_radius: i32,
    pub damage_variance: f64,
    pub crit_dmg_cap: f64,
    pub crit_rate_cap: f64,
    pub xp_growth: f64,
    pub hp_growth_per_level: f64,
    pub atk_growth_per_level: f64,
    pub matk_growth_per_level: f64,
    pub def_growth_per_level: f64,
    pub spd_growth_per_level: f64,
    pub level_scale: f64,
    pub max_level: i32,
    pub inventory_cap: usize,
    pub chase_closing_base: f64,
    pub threat_decay_rate: f64,
    pub threat_damage_mult: f64,
    pub opportunity_mult: f64,
    pub mob_leash_radius: i32,
    pub camp_count: i32,
    pub region_count: i32,
    pub resource_respawn_ticks: i64,
    pub territory_debuff_duration: i32,
    pub loot_channel_duration: i32,
    pub core_subsystem_divisor: i64,
    pub environment_subsystem_divisor: i64,
    pub economy_subsystem_divisor: i64,
    pub hero_heal_per_tick: f64,
    pub town_aura_damage: f64,
    pub xp_per_kill_base: f64,
    pub stamina_regen_resting: f64,
    pub stamina_regen_visiting: f64,
    pub stamina_regen_idle: f64,
    pub aoe_falloff: f64,
    pub tick_rate_secs: f64,
    pub log_level: String,
    pub replay_path: Option<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_width: 64,
            grid_height: 64,
            max_ticks: None,
            worker_timeout_secs: 1.0,
            worker_count: 4,
            spatial_cell_size: 8,
            vision_range: 8,
            flee_hp_threshold: 0.25,
            town_center: (32, 32),
            town_radius: 6,
            damage_variance: 0.15,
            crit_dmg_cap: 3.0,
            crit_rate_cap: 0.8,
            xp_growth: 1.0,
            hp_growth_per_level: 10.0,
            atk_growth_per_level: 2.0,
            matk_growth_per_level: 2.0,
            def_growth_per_level: 1.0,
            spd_growth_per_level: 0.5,
            level_scale: 1.35,
            max_level: 50,
            inventory_cap: 20,
            chase_closing_base: 4.0,
            threat_decay_rate: 0.05,
            threat_damage_mult: 1.0,
            opportunity_mult: 0.5,
            mob_leash_radius: 12,
            camp_count: 6,
            region_count: 8,
            resource_respawn_ticks: 200,
            territory_debuff_duration: 3,
            loot_channel_duration: 2,
            core_subsystem_divisor: 1,
            environment_subsystem_divisor: 2,
            economy_subsystem_divisor: 5,
            hero_heal_per_tick: 5.0,
            town_aura_damage: 2.0,
            xp_per_kill_base: 30.0,
            stamina_regen_resting: 5.0,
            stamina_regen_visiting: 4.0,
            stamina_regen_idle: 1.0,
            aoe_falloff: 0.2,
            tick_rate_secs: 0.1,
            log_level: "info".to_string(),
            replay_path: None,
        }
    }
}

impl SimulationConfig {
    pub fn with_tick_rate_secs(mut self, secs: f64) -> Self {
        self.tick_rate_secs = secs.clamp(0.01, 2.0);
        self
    }

    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.worker_count = count.max(1);
        self
    }

    pub fn with_grid_size(mut self, width: i32, height: i32) -> Self {
        self.grid_width = width.max(1);
        self.grid_height = height.max(1);
        self
    }

    pub fn with_max_ticks(mut self, max_ticks: Option<i64>) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_replay_path(mut self, path: Option<String>) -> Self {
        self.replay_path = path;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_rate_is_clamped_to_bounds() {
        let cfg = SimulationConfig::default().with_tick_rate_secs(10.0);
        assert_eq!(cfg.tick_rate_secs, 2.0);
        let cfg = SimulationConfig::default().with_tick_rate_secs(0.0001);
        assert_eq!(cfg.tick_rate_secs, 0.01);
    }

    #[test]
    fn worker_count_is_never_zero() {
        let cfg = SimulationConfig::default().with_worker_count(0);
        assert_eq!(cfg.worker_count, 1);
    }

    #[test]
    fn grid_size_cannot_be_non_positive() {
        let cfg = SimulationConfig::default().with_grid_size(0, -5);
        assert_eq!(cfg.grid_width, 1);
        assert_eq!(cfg.grid_height, 1);
    }
}
