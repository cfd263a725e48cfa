//! Immutable 2D vector and the tile grid (spec data model, §3/§4.2).

use crate::enums::Material;
use serde::{Deserialize, Serialize};

/// A frozen integer offset/position. Grid-aligned, no fractional component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: i32,
    pub y: i32,
}

impl Vector2 {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: Vector2) -> Vector2 {
        Vector2::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Vector2) -> Vector2 {
        Vector2::new(self.x - other.x, self.y - other.y)
    }

    pub fn manhattan(self, other: Vector2) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl std::ops::Add for Vector2 {
    type Output = Vector2;
    fn add(self, rhs: Vector2) -> Vector2 {
        self.add(rhs)
    }
}

impl std::ops::Sub for Vector2 {
    type Output = Vector2;
    fn sub(self, rhs: Vector2) -> Vector2 {
        self.sub(rhs)
    }
}

/// North, East, South, West unit offsets, indexed 0..3.
pub const DIRECTION_OFFSETS: [Vector2; 4] = [
    Vector2::new(0, -1),
    Vector2::new(1, 0),
    Vector2::new(0, 1),
    Vector2::new(-1, 0),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    tiles: Vec<Material>,
}

impl Grid {
    pub fn new(width: i32, height: i32, fill: Material) -> Self {
        Self {
            width,
            height,
            tiles: vec![fill; (width * height).max(0) as usize],
        }
    }

    pub fn in_bounds(&self, pos: Vector2) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Vector2) -> usize {
        (pos.y * self.width + pos.x) as usize
    }

    pub fn get(&self, pos: Vector2) -> Option<Material> {
        if self.in_bounds(pos) {
            Some(self.tiles[self.index(pos)])
        } else {
            None
        }
    }

    pub fn set(&mut self, pos: Vector2, material: Material) {
        if self.in_bounds(pos) {
            let idx = self.index(pos);
            self.tiles[idx] = material;
        }
    }

    pub fn is_walkable(&self, pos: Vector2) -> bool {
        !matches!(self.get(pos), None | Some(Material::Wall | Material::Water | Material::Lava))
    }

    pub fn is_wall(&self, pos: Vector2) -> bool {
        matches!(self.get(pos), Some(Material::Wall))
    }

    pub fn is_water(&self, pos: Vector2) -> bool {
        matches!(self.get(pos), Some(Material::Water))
    }

    pub fn is_lava(&self, pos: Vector2) -> bool {
        matches!(self.get(pos), Some(Material::Lava))
    }

    pub fn is_town(&self, pos: Vector2) -> bool {
        matches!(self.get(pos), Some(Material::Town))
    }

    pub fn is_sanctuary(&self, pos: Vector2) -> bool {
        matches!(self.get(pos), Some(Material::Sanctuary))
    }

    pub fn is_camp(&self, pos: Vector2) -> bool {
        matches!(self.get(pos), Some(Material::Camp))
    }

    pub fn is_road(&self, pos: Vector2) -> bool {
        matches!(self.get(pos), Some(Material::Road))
    }

    pub fn is_bridge(&self, pos: Vector2) -> bool {
        matches!(self.get(pos), Some(Material::Bridge))
    }

    pub fn is_dungeon_entrance(&self, pos: Vector2) -> bool {
        matches!(self.get(pos), Some(Material::DungeonEntrance))
    }

    /// Bresenham line of sight. Endpoints are not tested for wall-ness, only
    /// the intermediate cells — matching how the original lets an observer
    /// see a target standing in a doorway.
    pub fn has_line_of_sight(&self, from: Vector2, to: Vector2) -> bool {
        let (mut x0, mut y0) = (from.x, from.y);
        let (x1, y1) = (to.x, to.y);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            if (x0, y0) != (from.x, from.y) && (x0, y0) != (x1, y1) {
                if self.is_wall(Vector2::new(x0, y0)) {
                    return false;
                }
            }
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
        true
    }

    /// Grounds the cover evasion bonus (§9 Open Question): true if any of the
    /// four cardinal neighbors is a wall.
    pub fn has_adjacent_wall(&self, pos: Vector2) -> bool {
        DIRECTION_OFFSETS.iter().any(|&d| self.is_wall(pos.add(d)))
    }

    pub fn copy(&self) -> Grid {
        self.clone()
    }
}
