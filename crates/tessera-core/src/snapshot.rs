//! Snapshot producer (spec §4.4). A `Snapshot` is a deep, immutable copy of
//! every field an AI decision might read — entities, grid, faction
//! registry — content-hashed with BLAKE3 so determinism runs can compare
//! two engines' published snapshots byte-for-byte.

use crate::entity::{Entity, ItemStack};
use crate::faction::FactionRegistry;
use crate::grid::{Grid, Vector2};
use crate::ids::EntityId;
use crate::world::{Region, ResourceNode, TreasureChest, World};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: i64,
    pub seed: i64,
    pub grid: Grid,
    pub entities: HashMap<EntityId, Entity>,
    pub ground_loot: HashMap<Vector2, Vec<ItemStack>>,
    pub resource_nodes: HashMap<crate::ids::NodeId, ResourceNode>,
    pub chests: HashMap<crate::ids::ChestId, TreasureChest>,
    pub regions: Vec<Region>,
    pub faction_registry: FactionRegistry,
}

impl Snapshot {
    /// Deep-copies every mutable field the AI Brain or perception helpers
    /// might read (spec §4.4: "deep-copying all mutable entity fields...
    /// and freezing collection references").
    pub fn capture(world: &World) -> Self {
        Self {
            tick: world.tick,
            seed: world.seed,
            grid: world.grid.copy(),
            entities: world.entities.clone(),
            ground_loot: world.ground_loot.clone(),
            resource_nodes: world.resource_nodes.clone(),
            chests: world.chests.clone(),
            regions: world.regions.clone(),
            faction_registry: world.faction_registry.clone(),
        }
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn content_hash(&self) -> String {
        let bytes = serde_json::to_vec(self).expect("snapshot is always serializable");
        blake3::hash(&bytes).to_hex().to_string()
    }
}
