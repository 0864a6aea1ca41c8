//! Uniform-grid spatial index
//!
//! Entities are bucketed by `floor(pos / cell_size)`. Queries only scan the
//! cells overlapping the query window, so per-tick pickup and visibility
//! lookups cost roughly O(entities in window) instead of O(all entities).

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Rect;

/// Anything the index tracks: id, position and radius
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub pos: Vec2,
    pub radius: f32,
}

impl Entity {
    pub fn new(id: impl Into<String>, pos: Vec2, radius: f32) -> Self {
        Self {
            id: id.into(),
            pos,
            radius,
        }
    }
}

/// Result of a query, with the number of cells visited for diagnostics
#[derive(Debug, Clone)]
pub struct QueryResult<'a> {
    pub entities: Vec<&'a Entity>,
    pub cells_scanned: usize,
}

impl QueryResult<'_> {
    pub fn ids(&self) -> Vec<&str> {
        self.entities.iter().map(|e| e.id.as_str()).collect()
    }
}

/// Uniform grid over `[0, width) x [0, height)`
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f32,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<Entity>>,
    /// id -> cell index; keeps every entity in exactly one cell
    locations: HashMap<String, usize>,
}

impl SpatialIndex {
    pub fn new(width: f32, height: f32, cell_size: f32) -> Self {
        let cell_size = cell_size.max(1.0);
        let cols = (width.max(0.0) / cell_size).ceil().max(1.0) as usize;
        let rows = (height.max(0.0) / cell_size).ceil().max(1.0) as usize;
        Self {
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
            locations: HashMap::new(),
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.locations.contains_key(id)
    }

    /// Cell index for a position, or `None` when outside the grid
    fn cell_of(&self, pos: Vec2) -> Option<usize> {
        if !pos.x.is_finite() || !pos.y.is_finite() {
            return None;
        }
        let col = (pos.x / self.cell_size).floor();
        let row = (pos.y / self.cell_size).floor();
        if col < 0.0 || row < 0.0 || col >= self.cols as f32 || row >= self.rows as f32 {
            return None;
        }
        Some(row as usize * self.cols + col as usize)
    }

    /// Insert an entity. Out-of-grid positions are silently dropped.
    ///
    /// Re-inserting an id already present relocates it. Returns `true` if the
    /// entity is now indexed.
    pub fn insert(&mut self, entity: Entity) -> bool {
        let Some(cell) = self.cell_of(entity.pos) else {
            log::debug!(
                "spatial insert dropped '{}' at ({:.1}, {:.1}): outside grid",
                entity.id,
                entity.pos.x,
                entity.pos.y
            );
            return false;
        };
        self.remove(&entity.id);
        self.locations.insert(entity.id.clone(), cell);
        self.cells[cell].push(entity);
        true
    }

    /// Remove an entity by id. No-op (returns `None`) if absent.
    pub fn remove(&mut self, id: &str) -> Option<Entity> {
        let cell = self.locations.remove(id)?;
        let bucket = &mut self.cells[cell];
        let idx = bucket.iter().position(|e| e.id == id)?;
        Some(bucket.remove(idx))
    }

    /// Move an entity: remove then reinsert so cell crossings relocate it.
    ///
    /// Returns `false` if the id was not indexed, or if the new position is
    /// outside the grid (the entity is then dropped).
    pub fn update(&mut self, id: &str, new_pos: Vec2) -> bool {
        match self.remove(id) {
            Some(mut entity) => {
                entity.pos = new_pos;
                self.insert(entity)
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        let cell = *self.locations.get(id)?;
        self.cells[cell].iter().find(|e| e.id == id)
    }

    /// Inclusive (col, row) window covering `[min, max]`, clamped to the grid
    fn cell_window(&self, min: Vec2, max: Vec2) -> (usize, usize, usize, usize) {
        let clamp_col = |v: f32| ((v / self.cell_size).floor().max(0.0) as usize).min(self.cols - 1);
        let clamp_row = |v: f32| ((v / self.cell_size).floor().max(0.0) as usize).min(self.rows - 1);
        (clamp_col(min.x), clamp_row(min.y), clamp_col(max.x), clamp_row(max.y))
    }

    /// Entities whose position lies within `radius` of `center` (Euclidean)
    pub fn query_radius(&self, center: Vec2, radius: f32) -> QueryResult<'_> {
        if radius.is_nan() || radius < 0.0 || !center.is_finite() {
            return QueryResult {
                entities: Vec::new(),
                cells_scanned: 0,
            };
        }
        let r = Vec2::splat(radius);
        let (c0, r0, c1, r1) = self.cell_window(center - r, center + r);
        let r2 = radius * radius;

        let mut entities = Vec::new();
        let mut cells_scanned = 0;
        for row in r0..=r1 {
            for col in c0..=c1 {
                cells_scanned += 1;
                entities.extend(
                    self.cells[row * self.cols + col]
                        .iter()
                        .filter(|e| e.pos.distance_squared(center) <= r2),
                );
            }
        }
        QueryResult {
            entities,
            cells_scanned,
        }
    }

    /// Entities whose *position* lies inside `rect` (radius is ignored)
    pub fn query_rect(&self, rect: Rect) -> QueryResult<'_> {
        if rect.w.is_nan() || rect.h.is_nan() || rect.w < 0.0 || rect.h < 0.0 {
            return QueryResult {
                entities: Vec::new(),
                cells_scanned: 0,
            };
        }
        let min = Vec2::new(rect.x, rect.y);
        let max = Vec2::new(rect.x + rect.w, rect.y + rect.h);
        let (c0, r0, c1, r1) = self.cell_window(min, max);

        let mut entities = Vec::new();
        let mut cells_scanned = 0;
        for row in r0..=r1 {
            for col in c0..=c1 {
                cells_scanned += 1;
                entities.extend(
                    self.cells[row * self.cols + col]
                        .iter()
                        .filter(|e| rect.contains(e.pos)),
                );
            }
        }
        QueryResult {
            entities,
            cells_scanned,
        }
    }

    /// Drop every entity, keeping the grid dimensions
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.locations.clear();
    }

    /// Iterate all entities in cell order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.cells.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn grid_dimensions_round_up() {
        let index = SpatialIndex::new(850.0, 600.0, 100.0);
        assert_eq!(index.cols(), 9);
        assert_eq!(index.rows(), 6);
    }

    #[test]
    fn out_of_bounds_insert_is_dropped() {
        let mut index = SpatialIndex::new(100.0, 100.0, 50.0);
        assert!(!index.insert(Entity::new("neg", Vec2::new(-1.0, 10.0), 1.0)));
        assert!(!index.insert(Entity::new("far", Vec2::new(10.0, 100.0), 1.0)));
        assert!(index.is_empty());
    }

    #[test]
    fn update_relocates_across_cells() {
        let mut index = SpatialIndex::new(400.0, 400.0, 100.0);
        index.insert(Entity::new("a", Vec2::new(10.0, 10.0), 5.0));
        assert!(index.update("a", Vec2::new(350.0, 350.0)));

        assert!(index.query_radius(Vec2::new(10.0, 10.0), 20.0).entities.is_empty());
        let found = index.query_radius(Vec2::new(350.0, 350.0), 1.0);
        assert_eq!(found.ids(), vec!["a"]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn missing_ids_are_noops() {
        let mut index = SpatialIndex::new(100.0, 100.0, 10.0);
        assert!(index.remove("ghost").is_none());
        assert!(!index.update("ghost", Vec2::ZERO));
    }

    #[test]
    fn reinsert_keeps_single_copy() {
        let mut index = SpatialIndex::new(200.0, 200.0, 50.0);
        index.insert(Entity::new("a", Vec2::new(10.0, 10.0), 1.0));
        index.insert(Entity::new("a", Vec2::new(150.0, 150.0), 1.0));
        assert_eq!(index.iter().count(), 1);
        assert_eq!(index.get("a").map(|e| e.pos), Some(Vec2::new(150.0, 150.0)));
    }

    #[test]
    fn radius_query_scans_only_window() {
        let mut index = SpatialIndex::new(1000.0, 1000.0, 100.0);
        index.insert(Entity::new("a", Vec2::new(500.0, 500.0), 1.0));
        let result = index.query_radius(Vec2::new(550.0, 550.0), 40.0);
        // window 510..590 stays in a single cell
        assert_eq!(result.cells_scanned, 1);
        assert!(result.entities.is_empty());
    }

    #[test]
    fn rect_query_uses_position_only() {
        let mut index = SpatialIndex::new(200.0, 200.0, 50.0);
        // Big radius overlaps the rect but its center does not
        index.insert(Entity::new("big", Vec2::new(120.0, 20.0), 50.0));
        index.insert(Entity::new("in", Vec2::new(50.0, 20.0), 1.0));
        let result = index.query_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(result.ids(), vec!["in"]);
    }

    proptest! {
        #[test]
        fn radius_query_matches_brute_force(
            points in prop::collection::vec((0.0f32..800.0, 0.0f32..600.0), 0..120),
            cx in -100.0f32..900.0,
            cy in -100.0f32..700.0,
            r in 0.0f32..300.0,
        ) {
            let mut index = SpatialIndex::new(800.0, 600.0, 64.0);
            for (i, &(x, y)) in points.iter().enumerate() {
                index.insert(Entity::new(format!("e{i}"), Vec2::new(x, y), 4.0));
            }
            let center = Vec2::new(cx, cy);

            let mut got: Vec<String> = index
                .query_radius(center, r)
                .entities
                .iter()
                .map(|e| e.id.clone())
                .collect();
            got.sort();

            let mut expected: Vec<String> = points
                .iter()
                .enumerate()
                .filter(|(_, (x, y))| Vec2::new(*x, *y).distance_squared(center) <= r * r)
                .map(|(i, _)| format!("e{i}"))
                .collect();
            expected.sort();

            prop_assert_eq!(got, expected);
        }
    }
}
