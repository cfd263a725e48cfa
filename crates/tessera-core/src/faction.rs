//! Faction relations and territory table (spec data model, §4.12).
//!
//! The original registry covers ten factions, four of whose territory tiles
//! (grassland, snow, jungle, volcanic) have no counterpart in this engine's
//! fifteen-variant `Material` enum (floor/wall/water/town/camp/sanctuary/
//! forest/desert/swamp/mountain/road/bridge/ruins/dungeon-entrance/lava).
//! Only the six factions whose territory tile exists in that set are ported;
//! the rest are out of scope until the Grid gains more biome materials. See
//! DESIGN.md for the full accounting.

use crate::enums::Material;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    HeroGuild,
    GoblinHorde,
    WolfPack,
    BanditClan,
    Undead,
    OrcTribe,
}

impl Faction {
    /// Lowercase identifier used to match a HUNT quest's `target_kind`.
    pub fn slug(self) -> &'static str {
        match self {
            Faction::HeroGuild => "hero_guild",
            Faction::GoblinHorde => "goblin_horde",
            Faction::WolfPack => "wolf_pack",
            Faction::BanditClan => "bandit_clan",
            Faction::Undead => "undead",
            Faction::OrcTribe => "orc_tribe",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactionRelation {
    Allied,
    Neutral,
    Hostile,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerritoryInfo {
    pub tile: Material,
    pub atk_debuff: f64,
    pub def_debuff: f64,
    pub spd_debuff: f64,
    pub alert_radius: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactionRegistry {
    relations: HashMap<(Faction, Faction), FactionRelation>,
    territories: HashMap<Faction, TerritoryInfo>,
    tile_owners: HashMap<Material, Faction>,
}

const ALL_FACTIONS: [Faction; 6] = [
    Faction::HeroGuild,
    Faction::GoblinHorde,
    Faction::WolfPack,
    Faction::BanditClan,
    Faction::Undead,
    Faction::OrcTribe,
];

impl FactionRegistry {
    pub fn default_table() -> Self {
        let mut relations = HashMap::new();
        for &a in &ALL_FACTIONS {
            for &b in &ALL_FACTIONS {
                let rel = if a == b {
                    FactionRelation::Allied
                } else if a == Faction::HeroGuild || b == Faction::HeroGuild {
                    FactionRelation::Hostile
                } else {
                    // Non-hero factions default to hostile toward each other
                    // except the pairings the original marks as loosely
                    // allied monster camps.
                    match (a, b) {
                        (Faction::GoblinHorde, Faction::OrcTribe)
                        | (Faction::OrcTribe, Faction::GoblinHorde) => FactionRelation::Neutral,
                        _ => FactionRelation::Hostile,
                    }
                };
                relations.insert((a, b), rel);
            }
        }

        let mut territories = HashMap::new();
        territories.insert(
            Faction::HeroGuild,
            TerritoryInfo { tile: Material::Town, atk_debuff: 1.1, def_debuff: 1.1, spd_debuff: 1.0, alert_radius: 6 },
        );
        territories.insert(
            Faction::GoblinHorde,
            TerritoryInfo { tile: Material::Camp, atk_debuff: 0.7, def_debuff: 0.7, spd_debuff: 0.85, alert_radius: 5 },
        );
        territories.insert(
            Faction::WolfPack,
            TerritoryInfo { tile: Material::Forest, atk_debuff: 0.7, def_debuff: 0.7, spd_debuff: 0.85, alert_radius: 4 },
        );
        territories.insert(
            Faction::BanditClan,
            TerritoryInfo { tile: Material::Desert, atk_debuff: 0.7, def_debuff: 0.7, spd_debuff: 0.85, alert_radius: 5 },
        );
        territories.insert(
            Faction::Undead,
            TerritoryInfo { tile: Material::Swamp, atk_debuff: 0.7, def_debuff: 0.7, spd_debuff: 0.85, alert_radius: 5 },
        );
        territories.insert(
            Faction::OrcTribe,
            TerritoryInfo { tile: Material::Mountain, atk_debuff: 0.7, def_debuff: 0.7, spd_debuff: 0.85, alert_radius: 6 },
        );

        let mut tile_owners = HashMap::new();
        for (&faction, info) in &territories {
            tile_owners.insert(info.tile, faction);
        }

        Self { relations, territories, tile_owners }
    }

    pub fn relation(&self, a: Faction, b: Faction) -> FactionRelation {
        *self.relations.get(&(a, b)).unwrap_or(&FactionRelation::Neutral)
    }

    pub fn is_hostile(&self, a: Faction, b: Faction) -> bool {
        self.relation(a, b) == FactionRelation::Hostile
    }

    pub fn is_allied(&self, a: Faction, b: Faction) -> bool {
        self.relation(a, b) == FactionRelation::Allied
    }

    pub fn tile_owner(&self, material: Material) -> Option<Faction> {
        self.tile_owners.get(&material).copied()
    }

    pub fn territory_for(&self, faction: Faction) -> Option<&TerritoryInfo> {
        self.territories.get(&faction)
    }
}

impl Default for FactionRegistry {
    fn default() -> Self {
        Self::default_table()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_faction_is_always_allied() {
        let reg = FactionRegistry::default_table();
        assert!(reg.is_allied(Faction::HeroGuild, Faction::HeroGuild));
    }

    #[test]
    fn hero_guild_is_hostile_to_every_monster_faction() {
        let reg = FactionRegistry::default_table();
        for &f in &ALL_FACTIONS {
            if f != Faction::HeroGuild {
                assert!(reg.is_hostile(Faction::HeroGuild, f));
            }
        }
    }

    #[test]
    fn tile_owner_resolves_territory_back_to_faction() {
        let reg = FactionRegistry::default_table();
        assert_eq!(reg.tile_owner(Material::Camp), Some(Faction::GoblinHorde));
        assert_eq!(reg.tile_owner(Material::Floor), None);
    }

    #[test]
    fn territory_lookup_returns_alert_radius() {
        let reg = FactionRegistry::default_table();
        let territory = reg.territory_for(Faction::OrcTribe).unwrap();
        assert_eq!(territory.alert_radius, 6);
    }
}
