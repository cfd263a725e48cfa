//! Primary attributes and the formulas deriving combat stats from them
//! (spec data model, §3: nine primaries `STR, AGI, VIT, INT, SPI, WIS, END,
//! PER, CHA`). Ported from the six-attribute original and extended with
//! `SPI` (magical power), `PER` (perception) and `CHA` (charisma) to match
//! the wider primary set the spec calls for; each base value is an integer,
//! each carries its own fractional training accumulator in `[0.0, 1.0)`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    pub str_: i32,
    pub agi: i32,
    pub vit: i32,
    pub int_: i32,
    pub spi: i32,
    pub wis: i32,
    pub end: i32,
    pub per: i32,
    pub cha: i32,

    str_frac: f64,
    agi_frac: f64,
    vit_frac: f64,
    int_frac: f64,
    spi_frac: f64,
    wis_frac: f64,
    end_frac: f64,
    per_frac: f64,
    cha_frac: f64,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            str_: 5,
            agi: 5,
            vit: 5,
            int_: 5,
            spi: 5,
            wis: 5,
            end: 5,
            per: 5,
            cha: 5,
            str_frac: 0.0,
            agi_frac: 0.0,
            vit_frac: 0.0,
            int_frac: 0.0,
            spi_frac: 0.0,
            wis_frac: 0.0,
            end_frac: 0.0,
            per_frac: 0.0,
            cha_frac: 0.0,
        }
    }
}

impl Attributes {
    pub fn total(&self) -> i32 {
        self.str_ + self.agi + self.vit + self.int_ + self.spi + self.wis + self.end + self.per + self.cha
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeCaps {
    pub str_cap: i32,
    pub agi_cap: i32,
    pub vit_cap: i32,
    pub int_cap: i32,
    pub spi_cap: i32,
    pub wis_cap: i32,
    pub end_cap: i32,
    pub per_cap: i32,
    pub cha_cap: i32,
}

impl Default for AttributeCaps {
    fn default() -> Self {
        Self {
            str_cap: 15,
            agi_cap: 15,
            vit_cap: 15,
            int_cap: 15,
            spi_cap: 15,
            wis_cap: 15,
            end_cap: 15,
            per_cap: 15,
            cha_cap: 15,
        }
    }
}

impl AttributeCaps {
    pub fn increase_all(&mut self, amount: i32) {
        self.str_cap += amount;
        self.agi_cap += amount;
        self.vit_cap += amount;
        self.int_cap += amount;
        self.spi_cap += amount;
        self.wis_cap += amount;
        self.end_cap += amount;
        self.per_cap += amount;
        self.cha_cap += amount;
    }
}

// ---------------------------------------------------------------------
// Attribute -> derived stat formulas.
// ---------------------------------------------------------------------

pub fn derive_max_hp(base_max_hp: i32, vit: i32, end: i32) -> i32 {
    base_max_hp + vit * 2 + (end as f64 * 0.5) as i32
}

pub fn derive_atk(base_atk: i32, str_: i32) -> i32 {
    base_atk + (str_ as f64 * 0.5) as i32
}

pub fn derive_def(base_def: i32, vit: i32) -> i32 {
    base_def + (vit as f64 * 0.3) as i32
}

pub fn derive_spd(base_spd: i32, agi: i32) -> i32 {
    base_spd + (agi as f64 * 0.4) as i32
}

pub fn derive_crit_rate(base_crit: f64, agi: i32) -> f64 {
    base_crit + agi as f64 * 0.004
}

pub fn derive_evasion(base_evasion: f64, agi: i32) -> f64 {
    base_evasion + agi as f64 * 0.003
}

pub fn derive_luck(base_luck: i32, wis: i32) -> i32 {
    base_luck + (wis as f64 * 0.3) as i32
}

pub fn derive_stamina(base_stamina: i32, end: i32) -> i32 {
    base_stamina + end * 2
}

pub fn derive_xp_multiplier(int_: i32, wis: i32) -> f64 {
    1.0 + int_ as f64 * 0.01 + wis as f64 * 0.005
}

/// `SPI` drives magical power the way `STR` drives physical ATK.
pub fn derive_matk(base_matk: i32, spi: i32) -> i32 {
    base_matk + (spi as f64 * 0.5) as i32
}

/// Magical defense is grounded on `WIS`, mirroring how physical DEF is
/// grounded on `VIT` — paired with `MagicalDamageCalculator` in damage.rs.
pub fn derive_mdef(base_mdef: i32, wis: i32) -> i32 {
    base_mdef + (wis as f64 * 0.3) as i32
}

/// `PER` widens vision range and improves loot discovery.
pub fn derive_vision_range(base_vision: i32, per: i32) -> i32 {
    base_vision + (per as f64 * 0.2) as i32
}

pub fn derive_loot_bonus(base_loot_bonus: f64, per: i32) -> f64 {
    base_loot_bonus + per as f64 * 0.01
}

/// `CHA` sweetens trade prices and speeds up town interactions.
pub fn derive_trade_bonus(base_trade_bonus: f64, cha: i32) -> f64 {
    base_trade_bonus + cha as f64 * 0.01
}

pub fn derive_interaction_speed(base_interaction_speed: f64, cha: i32) -> f64 {
    base_interaction_speed + cha as f64 * 0.005
}

// ---------------------------------------------------------------------
// Training: attribute gain from actions.
// ---------------------------------------------------------------------

/// Per-action training rates. Deliberately slow — see `train_attributes`.
pub fn train_rates(action: &str) -> &'static [(AttrKey, f64)] {
    use AttrKey::*;
    match action {
        "move" => &[(Agi, 0.008), (End, 0.005)],
        "attack" => &[(Str, 0.015), (Agi, 0.008)],
        "defend" => &[(Vit, 0.010), (End, 0.008)],
        "rest" => &[(Wis, 0.006), (End, 0.003)],
        "harvest" => &[(End, 0.010), (Wis, 0.005)],
        "loot" => &[(Wis, 0.005), (Per, 0.005)],
        "skill" => &[(Int, 0.010), (Wis, 0.005)],
        "magic_attack" => &[(Spi, 0.015), (Int, 0.008)],
        "trade" => &[(Cha, 0.010)],
        "social" => &[(Cha, 0.008), (Per, 0.004)],
        _ => &[],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKey {
    Str,
    Agi,
    Vit,
    Int,
    Spi,
    Wis,
    End,
    Per,
    Cha,
}

fn field_mut(attrs: &mut Attributes, key: AttrKey) -> (&mut i32, &mut f64) {
    match key {
        AttrKey::Str => (&mut attrs.str_, &mut attrs.str_frac),
        AttrKey::Agi => (&mut attrs.agi, &mut attrs.agi_frac),
        AttrKey::Vit => (&mut attrs.vit, &mut attrs.vit_frac),
        AttrKey::Int => (&mut attrs.int_, &mut attrs.int_frac),
        AttrKey::Spi => (&mut attrs.spi, &mut attrs.spi_frac),
        AttrKey::Wis => (&mut attrs.wis, &mut attrs.wis_frac),
        AttrKey::End => (&mut attrs.end, &mut attrs.end_frac),
        AttrKey::Per => (&mut attrs.per, &mut attrs.per_frac),
        AttrKey::Cha => (&mut attrs.cha, &mut attrs.cha_frac),
    }
}

fn cap_for(caps: &AttributeCaps, key: AttrKey) -> i32 {
    match key {
        AttrKey::Str => caps.str_cap,
        AttrKey::Agi => caps.agi_cap,
        AttrKey::Vit => caps.vit_cap,
        AttrKey::Int => caps.int_cap,
        AttrKey::Spi => caps.spi_cap,
        AttrKey::Wis => caps.wis_cap,
        AttrKey::End => caps.end_cap,
        AttrKey::Per => caps.per_cap,
        AttrKey::Cha => caps.cha_cap,
    }
}

/// Apply fractional training gains from an action. When an accumulator
/// crosses 1.0 the integer base increases by the integer part (capped) and
/// the accumulator is reduced by that same integer part.
pub fn train_attributes(attrs: &mut Attributes, caps: &AttributeCaps, action: &str) {
    for &(key, rate) in train_rates(action) {
        let cap = cap_for(caps, key);
        let (base, frac) = field_mut(attrs, key);
        let mut next_frac = *frac + rate;
        if next_frac >= 1.0 && *base < cap {
            let gain = next_frac as i32;
            *base = (*base + gain).min(cap);
            next_frac -= gain as f64;
        }
        *frac = next_frac;
    }
}

/// +2 to every base (capped), +5 to every cap — run once per level gained.
pub fn level_up_attributes(attrs: &mut Attributes, caps: &mut AttributeCaps) {
    caps.increase_all(5);
    attrs.str_ = (attrs.str_ + 2).min(caps.str_cap);
    attrs.agi = (attrs.agi + 2).min(caps.agi_cap);
    attrs.vit = (attrs.vit + 2).min(caps.vit_cap);
    attrs.int_ = (attrs.int_ + 2).min(caps.int_cap);
    attrs.spi = (attrs.spi + 2).min(caps.spi_cap);
    attrs.wis = (attrs.wis + 2).min(caps.wis_cap);
    attrs.end = (attrs.end + 2).min(caps.end_cap);
    attrs.per = (attrs.per + 2).min(caps.per_cap);
    attrs.cha = (attrs.cha + 2).min(caps.cha_cap);
}
