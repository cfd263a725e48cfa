//! `SkillInstance`: per-entity learned skill state (spec data model, §3).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MasteryTier {
    Novice,
    Adept,
    Expert,
    Master,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillInstance {
    pub skill_id: String,
    pub cooldown_remaining: i32,
    pub mastery: f64,
    pub times_used: u64,
}

impl SkillInstance {
    pub fn new(skill_id: impl Into<String>) -> Self {
        Self {
            skill_id: skill_id.into(),
            cooldown_remaining: 0,
            mastery: 0.0,
            times_used: 0,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown_remaining <= 0
    }

    /// Mastery tier boundaries at 25/50/75.
    pub fn mastery_tier(&self) -> MasteryTier {
        if self.mastery >= 75.0 {
            MasteryTier::Master
        } else if self.mastery >= 50.0 {
            MasteryTier::Expert
        } else if self.mastery >= 25.0 {
            MasteryTier::Adept
        } else {
            MasteryTier::Novice
        }
    }

    /// Scales a base power figure by a per-tier multiplier.
    pub fn effective_power(&self, base_power: f64) -> f64 {
        base_power * self.power_multiplier()
    }

    pub fn effective_stamina_cost(&self, base_cost: f64) -> f64 {
        base_cost * self.stamina_multiplier()
    }

    pub fn effective_cooldown(&self, base_cooldown: i32) -> i32 {
        ((base_cooldown as f64) * self.cooldown_multiplier()).round() as i32
    }

    fn power_multiplier(&self) -> f64 {
        match self.mastery_tier() {
            MasteryTier::Novice => 1.0,
            MasteryTier::Adept => 1.1,
            MasteryTier::Expert => 1.25,
            MasteryTier::Master => 1.5,
        }
    }

    fn stamina_multiplier(&self) -> f64 {
        match self.mastery_tier() {
            MasteryTier::Novice => 1.0,
            MasteryTier::Adept => 0.9,
            MasteryTier::Expert => 0.8,
            MasteryTier::Master => 0.65,
        }
    }

    fn cooldown_multiplier(&self) -> f64 {
        match self.mastery_tier() {
            MasteryTier::Novice => 1.0,
            MasteryTier::Adept => 0.9,
            MasteryTier::Expert => 0.75,
            MasteryTier::Master => 0.6,
        }
    }

    pub fn record_use(&mut self, mastery_gain: f64, cap: f64) {
        self.times_used += 1;
        self.mastery = (self.mastery + mastery_gain).min(cap);
    }

    pub fn tick_cooldown(&mut self) {
        if self.cooldown_remaining > 0 {
            self.cooldown_remaining -= 1;
        }
    }

    pub fn apply_cooldown(&mut self, ticks: i32) {
        self.cooldown_remaining = ticks;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mastery_tier_boundaries() {
        let mut skill = SkillInstance::new("fireball");
        assert_eq!(skill.mastery_tier(), MasteryTier::Novice);
        skill.mastery = 25.0;
        assert_eq!(skill.mastery_tier(), MasteryTier::Adept);
        skill.mastery = 50.0;
        assert_eq!(skill.mastery_tier(), MasteryTier::Expert);
        skill.mastery = 75.0;
        assert_eq!(skill.mastery_tier(), MasteryTier::Master);
        skill.mastery = 100.0;
        assert_eq!(skill.mastery_tier(), MasteryTier::Master);
    }

    #[test]
    fn cooldown_gates_readiness() {
        let mut skill = SkillInstance::new("fireball");
        assert!(skill.is_ready());
        skill.apply_cooldown(3);
        assert!(!skill.is_ready());
        skill.tick_cooldown();
        skill.tick_cooldown();
        skill.tick_cooldown();
        assert!(skill.is_ready());
    }

    #[test]
    fn higher_mastery_increases_power_and_lowers_cost() {
        let mut skill = SkillInstance::new("fireball");
        let base_power = skill.effective_power(100.0);
        skill.mastery = 100.0;
        let master_power = skill.effective_power(100.0);
        assert!(master_power > base_power);
        assert!(skill.effective_stamina_cost(10.0) < 10.0);
    }
}
