//! Stateless perception helpers operating only on a `Snapshot` (spec §4.6,
//! ported from `ai/perception.py`). Handlers and scorers call these instead
//! of touching `World` directly.

use crate::entity::Entity;
use crate::enums::Material;
use crate::faction::FactionRegistry;
use crate::grid::{Vector2, DIRECTION_OFFSETS};
use crate::ids::EntityId;
use crate::snapshot::Snapshot;

pub fn visible_entities<'a>(snapshot: &'a Snapshot, viewer: &Entity) -> Vec<&'a Entity> {
    snapshot
        .entities
        .values()
        .filter(|other| {
            other.id != viewer.id
                && other.stats.alive()
                && viewer.pos.manhattan(other.pos) <= viewer.stats.vision_range
                && snapshot.grid.has_line_of_sight(viewer.pos, other.pos)
        })
        .collect()
}

fn nearest_by<'a>(
    candidates: impl Iterator<Item = &'a Entity>,
    from: Vector2,
) -> Option<&'a Entity> {
    candidates.min_by(|a, b| {
        let da = from.manhattan(a.pos);
        let db = from.manhattan(b.pos);
        da.cmp(&db).then(a.id.cmp(&b.id))
    })
}

pub fn nearest_enemy<'a>(snapshot: &'a Snapshot, viewer: &Entity, factions: &FactionRegistry) -> Option<&'a Entity> {
    nearest_by(
        visible_entities(snapshot, viewer)
            .into_iter()
            .filter(|other| factions.is_hostile(viewer.faction, other.faction)),
        viewer.pos,
    )
}

pub fn nearest_ally<'a>(snapshot: &'a Snapshot, viewer: &Entity, factions: &FactionRegistry) -> Option<&'a Entity> {
    nearest_by(
        visible_entities(snapshot, viewer)
            .into_iter()
            .filter(|other| factions.is_allied(viewer.faction, other.faction)),
        viewer.pos,
    )
}

pub fn count_nearby_allies(snapshot: &Snapshot, viewer: &Entity, factions: &FactionRegistry, radius: i32) -> usize {
    snapshot
        .entities
        .values()
        .filter(|other| {
            other.id != viewer.id
                && other.stats.alive()
                && factions.is_allied(viewer.faction, other.faction)
                && viewer.pos.manhattan(other.pos) <= radius
        })
        .count()
}

/// Axis-dominant unit step away from `threat`, picking the larger-magnitude
/// axis first so diagonal threats still produce a cardinal move.
pub fn direction_away_from(from: Vector2, threat: Vector2) -> Vector2 {
    let dx = from.x - threat.x;
    let dy = from.y - threat.y;
    step_toward_delta(dx, dy)
}

pub fn direction_toward(from: Vector2, target: Vector2) -> Vector2 {
    let dx = target.x - from.x;
    let dy = target.y - from.y;
    step_toward_delta(dx, dy)
}

fn step_toward_delta(dx: i32, dy: i32) -> Vector2 {
    if dx == 0 && dy == 0 {
        return Vector2::new(0, 0);
    }
    if dx.abs() >= dy.abs() {
        Vector2::new(dx.signum(), 0)
    } else {
        Vector2::new(0, dy.signum())
    }
}

pub fn is_in_town(snapshot: &Snapshot, pos: Vector2) -> bool {
    snapshot.grid.is_town(pos)
}

pub fn is_sanctuary(snapshot: &Snapshot, pos: Vector2) -> bool {
    snapshot.grid.is_sanctuary(pos)
}

pub fn is_camp(snapshot: &Snapshot, pos: Vector2) -> bool {
    snapshot.grid.is_camp(pos)
}

pub fn is_on_home_territory(snapshot: &Snapshot, entity: &Entity, factions: &FactionRegistry) -> bool {
    snapshot
        .grid
        .get(entity.pos)
        .and_then(|material| factions.tile_owner(material))
        .map(|owner| owner == entity.faction)
        .unwrap_or(false)
}

pub fn is_on_enemy_territory(snapshot: &Snapshot, entity: &Entity, factions: &FactionRegistry) -> bool {
    snapshot
        .grid
        .get(entity.pos)
        .and_then(|material| factions.tile_owner(material))
        .map(|owner| factions.is_hostile(owner, entity.faction))
        .unwrap_or(false)
}

pub fn ground_loot_nearby(snapshot: &Snapshot, pos: Vector2, radius: i32) -> Vec<Vector2> {
    let mut positions: Vec<Vector2> = snapshot
        .ground_loot
        .iter()
        .filter(|(loot_pos, stacks)| !stacks.is_empty() && pos.manhattan(**loot_pos) <= radius)
        .map(|(loot_pos, _)| *loot_pos)
        .collect();
    positions.sort_by_key(|p| (pos.manhattan(*p), p.x, p.y));
    positions
}

/// Biased frontier search: walks outward ring by ring from `from`, looking
/// for a tile the entity has no `terrain_memory` entry for. `rng_val`
/// breaks ties between equally-unexplored candidates at the same ring.
pub fn find_frontier_target(snapshot: &Snapshot, entity: &Entity, rng_val: f64, max_radius: i32) -> Option<Vector2> {
    for radius in 1..=max_radius {
        let mut candidates = Vec::new();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx.abs() != radius && dy.abs() != radius {
                    continue;
                }
                let pos = Vector2::new(entity.pos.x + dx, entity.pos.y + dy);
                if snapshot.grid.is_walkable(pos) && !entity.terrain_memory.contains_key(&pos) {
                    candidates.push(pos);
                }
            }
        }
        if !candidates.is_empty() {
            candidates.sort_by_key(|p| (p.x, p.y));
            let idx = ((rng_val * candidates.len() as f64) as usize).min(candidates.len() - 1);
            return Some(candidates[idx]);
        }
    }
    None
}

pub fn remembered_enemy_strength(entity: &Entity, enemy_id: EntityId) -> Option<f64> {
    entity
        .entity_memory
        .iter()
        .find(|record| record.entity_id == enemy_id)
        .map(|record| record.last_known_hp_ratio)
}

pub fn strongest_remembered_enemy(entity: &Entity) -> Option<EntityId> {
    entity
        .entity_memory
        .iter()
        .max_by(|a, b| a.last_known_hp_ratio.partial_cmp(&b.last_known_hp_ratio).unwrap())
        .map(|record| record.entity_id)
}

pub fn nearest_camp(snapshot: &Snapshot, from: Vector2) -> Option<Vector2> {
    let mut best: Option<(i32, Vector2)> = None;
    for y in 0..snapshot.grid.height {
        for x in 0..snapshot.grid.width {
            let pos = Vector2::new(x, y);
            if snapshot.grid.get(pos) == Some(Material::Camp) {
                let dist = from.manhattan(pos);
                if best.map(|(d, _)| dist < d).unwrap_or(true) {
                    best = Some((dist, pos));
                }
            }
        }
    }
    best.map(|(_, pos)| pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_loot_nearby_filters_by_radius_and_sorts_by_distance() {
        use crate::config::SimulationConfig;
        use crate::world::World;

        let cfg = SimulationConfig::default().with_grid_size(16, 16);
        let mut world = World::new(&cfg, 1).unwrap();
        world.ground_loot.insert(Vector2::new(1, 0), vec![crate::entity::ItemStack { item_id: "gold".into(), quantity: 1 }]);
        world.ground_loot.insert(Vector2::new(10, 10), vec![crate::entity::ItemStack { item_id: "gem".into(), quantity: 1 }]);
        let snap = Snapshot::capture(&world);
        let nearby = ground_loot_nearby(&snap, Vector2::new(0, 0), 5);
        assert_eq!(nearby, vec![Vector2::new(1, 0)]);
    }

    #[test]
    fn direction_toward_prefers_dominant_axis() {
        assert_eq!(direction_toward(Vector2::new(0, 0), Vector2::new(5, 1)), Vector2::new(1, 0));
        assert_eq!(direction_toward(Vector2::new(0, 0), Vector2::new(1, 5)), Vector2::new(0, 1));
    }

    #[test]
    fn direction_away_from_is_the_negation_of_toward() {
        let from = Vector2::new(0, 0);
        let threat = Vector2::new(3, 0);
        assert_eq!(direction_away_from(from, threat), Vector2::new(-1, 0));
    }

    #[test]
    fn direction_toward_same_position_is_zero_vector() {
        let p = Vector2::new(2, 2);
        assert_eq!(direction_toward(p, p), Vector2::new(0, 0));
    }

    #[test]
    fn direction_offsets_cover_all_cardinals_exactly_once() {
        let mut seen: Vec<Vector2> = DIRECTION_OFFSETS.to_vec();
        seen.sort_by_key(|v| (v.x, v.y));
        let mut expected = vec![
            Vector2::new(0, -1),
            Vector2::new(1, 0),
            Vector2::new(0, 1),
            Vector2::new(-1, 0),
        ];
        expected.sort_by_key(|v| (v.x, v.y));
        assert_eq!(seen, expected);
    }
}
