//! The bundle of read-only inputs every AI decision receives (spec §4.6):
//! `(entity_from_snapshot, snapshot, config, rng, faction_registry)`. The
//! Brain must not retain state across calls — everything it needs arrives
//! through this one borrow each tick.

use crate::config::SimulationConfig;
use crate::entity::Entity;
use crate::faction::FactionRegistry;
use crate::rng::DeterministicRng;
use crate::snapshot::Snapshot;

pub struct AIContext<'a> {
    pub entity: &'a Entity,
    pub snapshot: &'a Snapshot,
    pub config: &'a SimulationConfig,
    pub rng: DeterministicRng,
    pub faction_registry: &'a FactionRegistry,
}

impl<'a> AIContext<'a> {
    pub fn new(
        entity: &'a Entity,
        snapshot: &'a Snapshot,
        config: &'a SimulationConfig,
        rng: DeterministicRng,
        faction_registry: &'a FactionRegistry,
    ) -> Self {
        Self { entity, snapshot, config, rng, faction_registry }
    }
}
