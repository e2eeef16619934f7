//! Uniform-grid spatial hash over enemies and projectiles
//!
//! Replaces O(n²) pairwise collision checks with O(1)-amortized neighbor
//! queries. Membership is rebuilt every simulation tick: `reset()` once,
//! then re-insert every live entity at its current position.

use glam::Vec2;
use rustc_hash::FxHashMap;

/// One grid cell. Cells are never removed once created, only cleared, so the
/// per-tick rebuild reuses their allocations.
#[derive(Debug, Default)]
struct Cell {
    enemies: Vec<usize>,
    projectiles: Vec<usize>,
}

/// Spatial index keyed by `floor(position / cell_size)` grid coordinates.
///
/// Queries are broad-phase: candidates outside the circular query radius may
/// still be returned, callers must do a precise distance check afterward.
#[derive(Debug)]
pub struct SpatialHash {
    cell_size: f32,
    cells: FxHashMap<(i32, i32), Cell>,
    /// Query-generation stamps, one slot per entity id. Owned by the hash;
    /// the values are meaningless outside its own deduplication bookkeeping.
    enemy_stamps: Vec<u64>,
    projectile_stamps: Vec<u64>,
    query_generation: u64,
}

impl SpatialHash {
    /// Create a hash with a fixed cell size. A malformed `cell_size <= 0`
    /// (or NaN) is clamped to 1.0 silently.
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size.max(1.0)
        } else {
            1.0
        };
        Self {
            cell_size,
            cells: FxHashMap::default(),
            enemy_stamps: Vec::new(),
            projectile_stamps: Vec::new(),
            query_generation: 0,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Clear all cell contents in place. Must be called exactly once per
    /// simulation tick before re-insertion; skipping it leaves stale
    /// positions in the grid and grows cells without bound.
    pub fn reset(&mut self) {
        for cell in self.cells.values_mut() {
            cell.enemies.clear();
            cell.projectiles.clear();
        }
    }

    /// Inclusive cell range covering the AABB `pos ± radius`
    fn cell_range(&self, pos: Vec2, radius: f32) -> (i32, i32, i32, i32) {
        let min_x = ((pos.x - radius) / self.cell_size).floor() as i32;
        let max_x = ((pos.x + radius) / self.cell_size).floor() as i32;
        let min_y = ((pos.y - radius) / self.cell_size).floor() as i32;
        let max_y = ((pos.y + radius) / self.cell_size).floor() as i32;
        (min_x, max_x, min_y, max_y)
    }

    /// Insert an enemy into every cell its AABB overlaps. An entity with
    /// radius larger than the cell size lands in proportionally more cells;
    /// no upper bound is enforced.
    pub fn insert_enemy(&mut self, id: usize, pos: Vec2, radius: f32) {
        grow_stamps(&mut self.enemy_stamps, id);
        let (min_x, max_x, min_y, max_y) = self.cell_range(pos, radius);
        for cx in min_x..=max_x {
            for cy in min_y..=max_y {
                self.cells.entry((cx, cy)).or_default().enemies.push(id);
            }
        }
    }

    /// Insert a projectile into every cell its AABB overlaps.
    pub fn insert_projectile(&mut self, id: usize, pos: Vec2, radius: f32) {
        grow_stamps(&mut self.projectile_stamps, id);
        let (min_x, max_x, min_y, max_y) = self.cell_range(pos, radius);
        for cx in min_x..=max_x {
            for cy in min_y..=max_y {
                self.cells
                    .entry((cx, cy))
                    .or_default()
                    .projectiles
                    .push(id);
            }
        }
    }

    /// Append enemy candidates near `pos` to `out` (appended, not replaced;
    /// the caller owns clearing it between queries). Each id appears at most
    /// once per query even when the entity spans multiple cells.
    pub fn query_enemies(&mut self, pos: Vec2, radius: f32, out: &mut Vec<usize>) {
        self.query_generation += 1;
        let generation = self.query_generation;
        let (min_x, max_x, min_y, max_y) = self.cell_range(pos, radius);
        for cx in min_x..=max_x {
            for cy in min_y..=max_y {
                let Some(cell) = self.cells.get(&(cx, cy)) else {
                    continue;
                };
                for &id in &cell.enemies {
                    if self.enemy_stamps[id] != generation {
                        self.enemy_stamps[id] = generation;
                        out.push(id);
                    }
                }
            }
        }
    }

    /// Append projectile candidates near `pos` to `out`, deduplicated the
    /// same way as [`query_enemies`](Self::query_enemies).
    pub fn query_projectiles(&mut self, pos: Vec2, radius: f32, out: &mut Vec<usize>) {
        self.query_generation += 1;
        let generation = self.query_generation;
        let (min_x, max_x, min_y, max_y) = self.cell_range(pos, radius);
        for cx in min_x..=max_x {
            for cy in min_y..=max_y {
                let Some(cell) = self.cells.get(&(cx, cy)) else {
                    continue;
                };
                for &id in &cell.projectiles {
                    if self.projectile_stamps[id] != generation {
                        self.projectile_stamps[id] = generation;
                        out.push(id);
                    }
                }
            }
        }
    }
}

fn grow_stamps(stamps: &mut Vec<u64>, id: usize) {
    if id >= stamps.len() {
        stamps.resize(id + 1, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_bad_cell_size() {
        assert_eq!(SpatialHash::new(-5.0).cell_size(), 1.0);
        assert_eq!(SpatialHash::new(0.0).cell_size(), 1.0);
        assert_eq!(SpatialHash::new(f32::NAN).cell_size(), 1.0);
        assert_eq!(SpatialHash::new(0.25).cell_size(), 1.0);
        assert_eq!(SpatialHash::new(48.0).cell_size(), 48.0);
    }

    #[test]
    fn test_no_duplicates_for_multi_cell_entity() {
        let mut hash = SpatialHash::new(10.0);
        // Radius larger than cell size: covers a 5x5 = 25 cell footprint
        hash.insert_enemy(7, Vec2::new(25.0, 25.0), 22.0);

        let mut out = Vec::new();
        hash.query_enemies(Vec2::new(25.0, 25.0), 30.0, &mut out);
        assert_eq!(out, vec![7]);
    }

    #[test]
    fn test_query_appends_without_clearing() {
        let mut hash = SpatialHash::new(10.0);
        hash.insert_enemy(1, Vec2::new(5.0, 5.0), 2.0);
        hash.insert_enemy(2, Vec2::new(105.0, 5.0), 2.0);

        let mut out = Vec::new();
        hash.query_enemies(Vec2::new(5.0, 5.0), 4.0, &mut out);
        hash.query_enemies(Vec2::new(105.0, 5.0), 4.0, &mut out);
        assert_eq!(out, vec![1, 2]);
    }

    #[test]
    fn test_reset_empties_queries() {
        let mut hash = SpatialHash::new(10.0);
        hash.insert_enemy(0, Vec2::new(3.0, 3.0), 1.0);
        hash.insert_projectile(0, Vec2::new(3.0, 3.0), 1.0);
        hash.reset();

        let mut out = Vec::new();
        hash.query_enemies(Vec2::new(3.0, 3.0), 50.0, &mut out);
        hash.query_projectiles(Vec2::new(3.0, 3.0), 50.0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_enemies_and_projectiles_are_separate() {
        let mut hash = SpatialHash::new(10.0);
        hash.insert_enemy(1, Vec2::ZERO, 2.0);
        hash.insert_projectile(9, Vec2::ZERO, 2.0);

        let mut enemies = Vec::new();
        let mut projectiles = Vec::new();
        hash.query_enemies(Vec2::ZERO, 5.0, &mut enemies);
        hash.query_projectiles(Vec2::ZERO, 5.0, &mut projectiles);
        assert_eq!(enemies, vec![1]);
        assert_eq!(projectiles, vec![9]);
    }

    #[test]
    fn test_broad_phase_may_include_out_of_circle() {
        let mut hash = SpatialHash::new(10.0);
        // Corner of the covered cell range but outside the query circle
        hash.insert_enemy(3, Vec2::new(9.0, 9.0), 0.5);

        let mut out = Vec::new();
        hash.query_enemies(Vec2::new(0.0, 0.0), 10.0, &mut out);
        // Broad phase returns it; the precise check is the caller's job
        assert_eq!(out, vec![3]);
    }

    #[test]
    fn test_rebuild_after_reset_sees_new_positions() {
        let mut hash = SpatialHash::new(10.0);
        hash.insert_enemy(4, Vec2::new(5.0, 5.0), 2.0);

        hash.reset();
        hash.insert_enemy(4, Vec2::new(95.0, 95.0), 2.0);

        let mut out = Vec::new();
        hash.query_enemies(Vec2::new(5.0, 5.0), 4.0, &mut out);
        assert!(out.is_empty(), "stale position leaked through reset");

        hash.query_enemies(Vec2::new(95.0, 95.0), 4.0, &mut out);
        assert_eq!(out, vec![4]);
    }
}
