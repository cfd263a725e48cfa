//! Uniform-cell spatial hash (spec §4.3). Maps `(cell_x, cell_y)` to the set
//! of entity ids in that cell; callers verify exact distance themselves
//! after a radius query returns its unordered candidate set.

use crate::grid::Vector2;
use crate::ids::EntityId;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: i32,
    cells: HashMap<(i32, i32), HashSet<EntityId>>,
    positions: HashMap<EntityId, Vector2>,
}

impl SpatialIndex {
    pub fn new(cell_size: i32) -> Self {
        Self {
            cell_size: cell_size.max(1),
            cells: HashMap::new(),
            positions: HashMap::new(),
        }
    }

    fn cell_of(&self, pos: Vector2) -> (i32, i32) {
        (pos.x.div_euclid(self.cell_size), pos.y.div_euclid(self.cell_size))
    }

    pub fn insert(&mut self, id: EntityId, pos: Vector2) {
        let cell = self.cell_of(pos);
        self.cells.entry(cell).or_default().insert(id);
        self.positions.insert(id, pos);
    }

    pub fn remove(&mut self, id: EntityId) {
        if let Some(pos) = self.positions.remove(&id) {
            let cell = self.cell_of(pos);
            if let Some(set) = self.cells.get_mut(&cell) {
                set.remove(&id);
                if set.is_empty() {
                    self.cells.remove(&cell);
                }
            }
        }
    }

    pub fn move_entity(&mut self, id: EntityId, new_pos: Vector2) {
        if let Some(&old_pos) = self.positions.get(&id) {
            if self.cell_of(old_pos) == self.cell_of(new_pos) {
                self.positions.insert(id, new_pos);
                return;
            }
        }
        self.remove(id);
        self.insert(id, new_pos);
    }

    /// Unordered candidate ids whose cell lies within `radius` cells of
    /// `center`'s cell. Callers verify exact Manhattan/Euclidean distance.
    pub fn query_radius(&self, center: Vector2, radius: i32) -> Vec<EntityId> {
        let (cx, cy) = self.cell_of(center);
        let cell_radius = (radius / self.cell_size) + 1;
        let mut out = Vec::new();
        for dy in -cell_radius..=cell_radius {
            for dx in -cell_radius..=cell_radius {
                if let Some(set) = self.cells.get(&(cx + dx, cy + dy)) {
                    out.extend(set.iter().copied());
                }
            }
        }
        out
    }

    pub fn position_of(&self, id: EntityId) -> Option<Vector2> {
        self.positions.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_query_radius_finds_nearby_entity() {
        let mut idx = SpatialIndex::new(8);
        idx.insert(EntityId::new(1), Vector2::new(0, 0));
        let found = idx.query_radius(Vector2::new(1, 1), 4);
        assert!(found.contains(&EntityId::new(1)));
    }

    #[test]
    fn remove_drops_entity_from_future_queries() {
        let mut idx = SpatialIndex::new(8);
        idx.insert(EntityId::new(1), Vector2::new(0, 0));
        idx.remove(EntityId::new(1));
        assert!(idx.query_radius(Vector2::new(0, 0), 20).is_empty());
    }

    #[test]
    fn move_entity_updates_position_across_cells() {
        let mut idx = SpatialIndex::new(4);
        idx.insert(EntityId::new(1), Vector2::new(0, 0));
        idx.move_entity(EntityId::new(1), Vector2::new(100, 100));
        assert_eq!(idx.position_of(EntityId::new(1)), Some(Vector2::new(100, 100)));
        assert!(idx.query_radius(Vector2::new(0, 0), 2).is_empty());
        assert!(idx.query_radius(Vector2::new(100, 100), 2).contains(&EntityId::new(1)));
    }

    #[test]
    fn query_radius_excludes_distant_cells() {
        let mut idx = SpatialIndex::new(8);
        idx.insert(EntityId::new(1), Vector2::new(0, 0));
        idx.insert(EntityId::new(2), Vector2::new(500, 500));
        let found = idx.query_radius(Vector2::new(0, 0), 4);
        assert!(found.contains(&EntityId::new(1)));
        assert!(!found.contains(&EntityId::new(2)));
    }
}
