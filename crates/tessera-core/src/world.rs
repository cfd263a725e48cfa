//! `World`: the single mutable owner of simulation state (spec §5 — only
//! the loop thread ever calls methods that take `&mut World`; workers read
//! from an immutable `Snapshot` instead). Direct-struct model: entities live
//! in a flat map rather than an archetype store, matching the data model
//! the spec calls for.

use crate::config::SimulationConfig;
use crate::damage::{base_damage, DamageCalculatorRegistry};
use crate::entity::{Entity, ItemStack};
use crate::enums::{AIState, Material};
use crate::error::{SimError, SimResult};
use crate::events::{EventCategory, EventSink, SimEvent};
use crate::faction::FactionRegistry;
use crate::grid::{Grid, Vector2};
use crate::ids::{BuildingId, ChestId, EntityId, IdAllocator, NodeId, RegionId};
use crate::rng::DeterministicRng;
use crate::spatial_index::SpatialIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceNode {
    pub id: NodeId,
    pub pos: Vector2,
    pub item_id: String,
    pub charges: u32,
    pub max_charges: u32,
    pub respawn_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreasureChest {
    pub id: ChestId,
    pub pos: Vector2,
    pub tier: crate::enums::EnemyTier,
    pub guard_id: Option<EntityId>,
    pub looted: bool,
    pub respawn_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    pub center: Vector2,
    pub difficulty: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub kind: String,
    pub pos: Vector2,
}

#[derive(Debug, Clone)]
pub struct World {
    pub tick: i64,
    pub seed: i64,
    pub grid: Grid,
    pub entities: HashMap<EntityId, Entity>,
    pub spatial_index: SpatialIndex,
    pub ground_loot: HashMap<Vector2, Vec<ItemStack>>,
    pub resource_nodes: HashMap<NodeId, ResourceNode>,
    pub chests: HashMap<ChestId, TreasureChest>,
    pub regions: Vec<Region>,
    pub buildings: Vec<Building>,
    pub faction_registry: FactionRegistry,
    pub damage_calculators: DamageCalculatorRegistry,

    entity_ids: IdAllocator,
    node_ids: IdAllocator,
    chest_ids: IdAllocator,
    region_ids: IdAllocator,
    building_ids: IdAllocator,
}

impl World {
    pub fn new(config: &SimulationConfig, seed: i64) -> SimResult<Self> {
        if config.grid_width <= 0 || config.grid_height <= 0 {
            return Err(SimError::InvalidGridDimensions { width: config.grid_width, height: config.grid_height });
        }
        Ok(Self {
            tick: 0,
            seed,
            grid: Grid::new(config.grid_width, config.grid_height, Material::Floor),
            entities: HashMap::new(),
            spatial_index: SpatialIndex::new(config.spatial_cell_size),
            ground_loot: HashMap::new(),
            resource_nodes: HashMap::new(),
            chests: HashMap::new(),
            regions: Vec::new(),
            buildings: Vec::new(),
            faction_registry: FactionRegistry::default_table(),
            damage_calculators: DamageCalculatorRegistry::new(),
            entity_ids: IdAllocator::default(),
            node_ids: IdAllocator::default(),
            chest_ids: IdAllocator::default(),
            region_ids: IdAllocator::default(),
            building_ids: IdAllocator::default(),
        })
    }

    pub fn rng(&self) -> DeterministicRng {
        DeterministicRng::new(self.seed)
    }

    pub fn next_entity_id(&mut self) -> EntityId {
        EntityId::new(self.entity_ids.allocate())
    }

    pub fn next_node_id(&mut self) -> NodeId {
        NodeId::new(self.node_ids.allocate())
    }

    pub fn next_chest_id(&mut self) -> ChestId {
        ChestId::new(self.chest_ids.allocate())
    }

    pub fn next_region_id(&mut self) -> RegionId {
        RegionId::new(self.region_ids.allocate())
    }

    pub fn next_building_id(&mut self) -> BuildingId {
        BuildingId::new(self.building_ids.allocate())
    }

    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        let id = self.next_entity_id();
        entity.id = id;
        self.spatial_index.insert(id, entity.pos);
        self.entities.insert(id, entity);
        id
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.get(&id).map(|e| e.stats.alive()).unwrap_or(false)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Destroys an entity, unless it is a hero — heroes respawn at
    /// `home_pos` with HP/effects reset, inventory cleared, equipment
    /// retained (spec §3 entity lifecycle edge case). Everyone else drops
    /// their carried inventory as ground loot at the death tile.
    pub fn kill_or_respawn(&mut self, id: EntityId, sink: &mut dyn EventSink) {
        let Some(entity) = self.entities.get_mut(&id) else { return };
        let tick = self.tick;
        if entity.kind == crate::entity::EntityKind::Hero {
            let respawn_pos = entity.home_pos.unwrap_or(entity.pos);
            entity.pos = respawn_pos;
            entity.stats.hp = entity.stats.max_hp;
            entity.effects.clear();
            entity.inventory.clear();
            entity.threat_table.clear();
            entity.engaged_ticks = 0;
            entity.chase_ticks = 0;
            entity.ai_state = AIState::Idle;
            self.spatial_index.move_entity(id, respawn_pos);
        } else {
            let death_pos = entity.pos;
            let level = entity.stats.level;
            let dropped = std::mem::take(&mut entity.inventory);
            if !dropped.is_empty() {
                self.ground_loot.entry(death_pos).or_default().extend(dropped);
            }
            self.spatial_index.remove(id);
            self.entities.remove(&id);
            sink.emit(
                SimEvent::new(tick, EventCategory::Lifecycle, "entity died")
                    .with_entities([id])
                    .with_metadata("level", level.to_string())
                    .with_metadata("x", death_pos.x.to_string())
                    .with_metadata("y", death_pos.y.to_string()),
            );
        }
    }

    pub fn occupant_at(&self, pos: Vector2) -> Option<EntityId> {
        self.entities.values().find(|e| e.stats.alive() && e.pos == pos).map(|e| e.id)
    }

    /// Ready entities are alive and due to act this tick (`next_act_at <=
    /// tick`), sorted by id for deterministic dispatch ordering.
    pub fn ready_entities(&self) -> Vec<EntityId> {
        let mut ready: Vec<EntityId> = self
            .entities
            .values()
            .filter(|e| e.stats.alive() && e.next_act_at <= self.tick as f64)
            .map(|e| e.id)
            .collect();
        ready.sort();
        ready
    }

    /// Shared speed-delay formula: `weight / max(spd, 1)`, further reduced by
    /// road/bridge travel. Each action type supplies its own weight (MOVE's
    /// is heavier than REST's), matching how the original system scales a
    /// single formula per action instead of hand-rolling one per verb.
    pub fn speed_delay(&self, spd: f64, weight: f64, on_fast_tile: bool) -> f64 {
        let base = weight / spd.max(1.0);
        if on_fast_tile {
            base / 1.3
        } else {
            base
        }
    }

    /// Speed-delay for a move: baseline inversely proportional to effective
    /// SPD, halved further by road/bridge travel.
    pub fn move_speed_delay(&self, spd: f64, on_fast_tile: bool) -> f64 {
        self.speed_delay(spd, 10.0, on_fast_tile)
    }

    pub fn base_damage_roll(&self, atk_power: f64, def_power: f64, variance: f64, roll: f64) -> f64 {
        base_damage(
            crate::damage::DamageContext { atk_power, def_power, atk_mult: 1.0, def_mult: 1.0 },
            variance,
            roll,
        )
    }

    pub fn copy(&self) -> World {
        self.clone()
    }
}
