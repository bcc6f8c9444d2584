//! Uniform grid spatial partition
//!
//! Space is cut into square cells of a fixed size. Every registered box is
//! filed under each cell its bounds overlap, and queries gather the boxes
//! filed under the cells a query rectangle overlaps.
//!
//! Cell coverage is half-open: a rectangle spanning `[min, max)` on an axis
//! covers cells `floor(min / size) ..= ceil(max / size) - 1`, so a box whose
//! edge lies exactly on a cell boundary is not filed in the neighbouring
//! cell. Every rectangle covers at least one cell per axis.
//!
//! Cell coordinates saturate at the `i32` range, so boxes far outside it
//! share the outermost cells. A single box may cover at most
//! [`MAX_CELLS_PER_BOX`] cells.

use std::collections::{HashMap, HashSet};

use log::{debug, error, warn};
use slotmap::SecondaryMap;

use crate::foundation::aabb::Aabb2;
use crate::foundation::math::Vec2;
use crate::physics::collision_box::BoxKey;
use crate::physics::collision_layers::LayerMask;
use crate::physics::error::CollisionError;

/// Largest number of cells one registered box may be filed under
pub const MAX_CELLS_PER_BOX: usize = 1 << 20;

/// Integer grid coordinate of a cell
pub type CellCoord = (i32, i32);

/// Inclusive rectangle of cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    /// First column
    pub min_x: i32,
    /// First row
    pub min_y: i32,
    /// Last column (inclusive)
    pub max_x: i32,
    /// Last row (inclusive)
    pub max_y: i32,
}

impl CellRange {
    /// True when `cell` lies inside this range
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.0 >= self.min_x && cell.0 <= self.max_x && cell.1 >= self.min_y && cell.1 <= self.max_y
    }

    /// Number of cells covered
    pub fn cell_count(&self) -> usize {
        let columns = i64::from(self.max_x) - i64::from(self.min_x) + 1;
        let rows = i64::from(self.max_y) - i64::from(self.min_y) + 1;
        usize::try_from(columns * rows).unwrap_or(usize::MAX)
    }

    /// Iterate the covered cells row by row
    pub fn cells(self) -> impl Iterator<Item = CellCoord> {
        (self.min_y..=self.max_y).flat_map(move |y| (self.min_x..=self.max_x).map(move |x| (x, y)))
    }
}

/// What the partition remembers about a registered box
#[derive(Debug, Clone, Copy)]
struct Registration {
    cells: CellRange,
    layer: LayerMask,
    /// Monotonic registration order, kept across updates
    sequence: u64,
}

/// Mutable grid index of boxes
///
/// The partition does not own boxes; it files `BoxKey`s by the bounds the
/// caller hands in. The owner must call [`SpatialPartition::update`] every
/// time a box moves, otherwise later queries silently miss it.
#[derive(Debug, Clone)]
pub struct SpatialPartition {
    cell_size: f32,
    cells: HashMap<CellCoord, Vec<BoxKey>>,
    registrations: SecondaryMap<BoxKey, Registration>,
    next_sequence: u64,
}

impl SpatialPartition {
    /// Create an empty partition with square cells of `cell_size`
    pub fn new(cell_size: f32) -> Result<Self, CollisionError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(CollisionError::InvalidCellSize(cell_size));
        }
        Ok(Self {
            cell_size,
            cells: HashMap::new(),
            registrations: SecondaryMap::new(),
            next_sequence: 0,
        })
    }

    /// Edge length of one cell
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of registered boxes
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// True when no box is registered
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// True when `key` is registered
    pub fn contains(&self, key: BoxKey) -> bool {
        self.registrations.contains_key(key)
    }

    /// Number of cells holding at least one box
    pub fn occupied_cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Cells `key` is currently filed under
    pub fn cells_of(&self, key: BoxKey) -> Option<CellRange> {
        self.registrations.get(key).map(|r| r.cells)
    }

    /// Boxes filed under a single cell, in no particular order
    pub fn boxes_in_cell(&self, cell: CellCoord) -> &[BoxKey] {
        self.cells.get(&cell).map_or(&[], Vec::as_slice)
    }

    /// World-space rectangle of a cell
    pub fn cell_bounds(&self, cell: CellCoord) -> Aabb2 {
        let size = Vec2::new(self.cell_size, self.cell_size);
        let min = Vec2::new(cell.0 as f32 * self.cell_size, cell.1 as f32 * self.cell_size);
        Aabb2::from_min_size(min, size)
    }

    /// Cells a rectangle overlaps
    pub fn cell_range(&self, rect: &Aabb2) -> CellRange {
        let first = |value: f32| clamp_cell((value / self.cell_size).floor() as i64);
        let last = |value: f32| clamp_cell(((value / self.cell_size).ceil() as i64).saturating_sub(1));

        let min_x = first(rect.min.x);
        let min_y = first(rect.min.y);
        let max_x = last(rect.max.x).max(min_x);
        let max_y = last(rect.max.y).max(min_y);
        CellRange { min_x, min_y, max_x, max_y }
    }

    fn check_cell_count(key: BoxKey, cells: &CellRange) -> Result<(), CollisionError> {
        let count = cells.cell_count();
        if count > MAX_CELLS_PER_BOX {
            error!("SpatialPartition: {key:?} would cover {count} cells, limit is {MAX_CELLS_PER_BOX}");
            return Err(CollisionError::BoundsTooLarge { key, cells: count });
        }
        Ok(())
    }

    /// Register `key` in every cell `bounds` overlaps
    pub fn add(&mut self, key: BoxKey, bounds: &Aabb2, layer: LayerMask) -> Result<(), CollisionError> {
        if self.registrations.contains_key(key) {
            error!("SpatialPartition: rejected duplicate registration of {key:?}");
            return Err(CollisionError::DuplicateRegistration(key));
        }

        let cells = self.cell_range(bounds);
        Self::check_cell_count(key, &cells)?;
        for cell in cells.cells() {
            self.cells.entry(cell).or_default().push(key);
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.registrations.insert(key, Registration { cells, layer, sequence });

        debug!("SpatialPartition: added {key:?} to {} cell(s)", cells.cell_count());
        Ok(())
    }

    /// Remove `key` from every cell it is filed under
    ///
    /// Removing an absent key reports `NotRegistered` and leaves the
    /// partition untouched.
    pub fn remove(&mut self, key: BoxKey) -> Result<(), CollisionError> {
        let Some(registration) = self.registrations.remove(key) else {
            warn!("SpatialPartition: remove of unregistered {key:?}");
            return Err(CollisionError::NotRegistered(key));
        };

        for cell in registration.cells.cells() {
            self.unfile(cell, key);
        }

        debug!("SpatialPartition: removed {key:?}");
        Ok(())
    }

    /// Refile `key` after its bounds changed from `previous` to `bounds`
    ///
    /// Only the cells that differ between the two ranges are touched. When
    /// `previous` disagrees with what was registered the recorded cells are
    /// used instead, so a stale caller can never leave the box filed in a
    /// cell it no longer overlaps.
    pub fn update(&mut self, key: BoxKey, previous: &Aabb2, bounds: &Aabb2) -> Result<(), CollisionError> {
        let Some(recorded) = self.registrations.get(key).map(|r| r.cells) else {
            error!("SpatialPartition: update of unregistered {key:?}");
            return Err(CollisionError::NotRegistered(key));
        };

        let mut stale = self.cell_range(previous);
        if stale != recorded {
            warn!(
                "SpatialPartition: previous bounds of {key:?} do not match its registration, \
                 refiling from recorded cells"
            );
            stale = recorded;
        }

        let fresh = self.cell_range(bounds);
        Self::check_cell_count(key, &fresh)?;
        if stale == fresh {
            return Ok(());
        }

        for cell in stale.cells().filter(|c| !fresh.contains(*c)) {
            self.unfile(cell, key);
        }
        for cell in fresh.cells().filter(|c| !stale.contains(*c)) {
            self.cells.entry(cell).or_default().push(key);
        }

        if let Some(registration) = self.registrations.get_mut(key) {
            registration.cells = fresh;
        }
        Ok(())
    }

    /// All distinct boxes filed under any cell `rect` overlaps
    ///
    /// With a `filter`, only boxes whose layer shares a bit with it are
    /// returned. Results come back in registration order.
    pub fn query_bounds(&self, rect: &Aabb2, filter: Option<LayerMask>) -> Vec<BoxKey> {
        self.collect(rect, filter, None)
    }

    /// Like [`Self::query_bounds`], minus the boxes in `exclude`
    pub fn query_bounds_excluding(&self, rect: &Aabb2, exclude: &HashSet<BoxKey>) -> Vec<BoxKey> {
        self.collect(rect, None, Some(exclude))
    }

    /// Layer-filtered query that also skips the boxes in `exclude`
    pub fn query_bounds_filtered_excluding(
        &self,
        rect: &Aabb2,
        filter: LayerMask,
        exclude: &HashSet<BoxKey>,
    ) -> Vec<BoxKey> {
        self.collect(rect, Some(filter), Some(exclude))
    }

    /// Drop every registration
    pub fn clear(&mut self) {
        self.cells.clear();
        self.registrations.clear();
    }

    fn unfile(&mut self, cell: CellCoord, key: BoxKey) {
        if let Some(bucket) = self.cells.get_mut(&cell) {
            if let Some(index) = bucket.iter().position(|k| *k == key) {
                bucket.swap_remove(index);
            }
            if bucket.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }

    fn collect(
        &self,
        rect: &Aabb2,
        filter: Option<LayerMask>,
        exclude: Option<&HashSet<BoxKey>>,
    ) -> Vec<BoxKey> {
        let range = self.cell_range(rect);
        let mut seen = HashSet::new();
        let mut found: Vec<(u64, BoxKey)> = Vec::new();

        let mut visit = |bucket: &Vec<BoxKey>| {
            for &key in bucket {
                if !seen.insert(key) {
                    continue;
                }
                if exclude.is_some_and(|skip| skip.contains(&key)) {
                    continue;
                }
                let Some(registration) = self.registrations.get(key) else {
                    continue;
                };
                if filter.is_some_and(|f| !registration.layer.intersects(f)) {
                    continue;
                }
                found.push((registration.sequence, key));
            }
        };

        // Sparse grids: walking occupied cells beats walking a huge range
        if range.cell_count() > self.cells.len() {
            for (cell, bucket) in &self.cells {
                if range.contains(*cell) {
                    visit(bucket);
                }
            }
        } else {
            for cell in range.cells() {
                if let Some(bucket) = self.cells.get(&cell) {
                    visit(bucket);
                }
            }
        }

        found.sort_unstable_by_key(|(sequence, _)| *sequence);
        found.into_iter().map(|(_, key)| key).collect()
    }
}

fn clamp_cell(index: i64) -> i32 {
    index.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn keys(n: usize) -> Vec<BoxKey> {
        let mut map: SlotMap<BoxKey, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Aabb2 {
        Aabb2::from_min_size(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[test]
    fn test_rejects_bad_cell_size() {
        assert_eq!(SpatialPartition::new(0.0).unwrap_err(), CollisionError::InvalidCellSize(0.0));
        assert!(SpatialPartition::new(-4.0).is_err());
        assert!(SpatialPartition::new(f32::INFINITY).is_err());
    }

    #[test]
    fn test_cell_range_is_half_open() {
        let grid = SpatialPartition::new(10.0).unwrap();
        assert_eq!(
            grid.cell_range(&rect(0.0, 0.0, 10.0, 10.0)),
            CellRange { min_x: 0, min_y: 0, max_x: 0, max_y: 0 }
        );
        assert_eq!(
            grid.cell_range(&rect(5.0, -5.0, 10.0, 10.0)),
            CellRange { min_x: 0, min_y: -1, max_x: 1, max_y: 0 }
        );
        // Zero-size rectangles still cover one cell
        assert_eq!(grid.cell_range(&rect(20.0, 20.0, 0.0, 0.0)).cell_count(), 1);
    }

    #[test]
    fn test_add_files_box_in_every_overlapped_cell() {
        let k = keys(1);
        let mut grid = SpatialPartition::new(10.0).unwrap();
        grid.add(k[0], &rect(5.0, 5.0, 10.0, 10.0), LayerMask::SOLID).unwrap();

        for cell in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(grid.boxes_in_cell(cell), &[k[0]]);
        }
        assert!(grid.boxes_in_cell((2, 0)).is_empty());
        assert_eq!(grid.occupied_cell_count(), 4);
    }

    #[test]
    fn test_duplicate_registration() {
        let k = keys(1);
        let mut grid = SpatialPartition::new(10.0).unwrap();
        grid.add(k[0], &rect(0.0, 0.0, 5.0, 5.0), LayerMask::SOLID).unwrap();

        let err = grid.add(k[0], &rect(50.0, 0.0, 5.0, 5.0), LayerMask::SOLID).unwrap_err();
        assert_eq!(err, CollisionError::DuplicateRegistration(k[0]));
        // State untouched by the rejected call
        assert_eq!(grid.cells_of(k[0]).unwrap().min_x, 0);
        assert!(grid.boxes_in_cell((5, 0)).is_empty());
    }

    #[test]
    fn test_remove_absent_key_is_harmless() {
        let k = keys(2);
        let mut grid = SpatialPartition::new(10.0).unwrap();
        grid.add(k[0], &rect(0.0, 0.0, 5.0, 5.0), LayerMask::SOLID).unwrap();

        assert_eq!(grid.remove(k[1]), Err(CollisionError::NotRegistered(k[1])));
        assert_eq!(grid.len(), 1);

        grid.remove(k[0]).unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid.occupied_cell_count(), 0);
        assert_eq!(grid.remove(k[0]), Err(CollisionError::NotRegistered(k[0])));
    }

    #[test]
    fn test_update_moves_between_cells() {
        let k = keys(1);
        let mut grid = SpatialPartition::new(10.0).unwrap();
        let before = rect(1.0, 1.0, 5.0, 5.0);
        let after = rect(31.0, 1.0, 5.0, 5.0);
        grid.add(k[0], &before, LayerMask::SOLID).unwrap();
        grid.update(k[0], &before, &after).unwrap();

        assert!(grid.query_bounds(&before, None).is_empty());
        assert_eq!(grid.query_bounds(&after, None), vec![k[0]]);
        assert_eq!(grid.occupied_cell_count(), 1);
    }

    #[test]
    fn test_update_with_stale_previous_uses_recorded_cells() {
        let k = keys(1);
        let mut grid = SpatialPartition::new(10.0).unwrap();
        let actual = rect(1.0, 1.0, 5.0, 5.0);
        let wrong = rect(101.0, 101.0, 5.0, 5.0);
        let after = rect(41.0, 1.0, 5.0, 5.0);
        grid.add(k[0], &actual, LayerMask::SOLID).unwrap();
        grid.update(k[0], &wrong, &after).unwrap();

        assert!(grid.boxes_in_cell((0, 0)).is_empty());
        assert_eq!(grid.boxes_in_cell((4, 0)), &[k[0]]);
        assert_eq!(grid.occupied_cell_count(), 1);
    }

    #[test]
    fn test_update_unregistered() {
        let k = keys(1);
        let mut grid = SpatialPartition::new(10.0).unwrap();
        let r = rect(0.0, 0.0, 1.0, 1.0);
        assert_eq!(grid.update(k[0], &r, &r), Err(CollisionError::NotRegistered(k[0])));
        assert!(grid.is_empty());
    }

    #[test]
    fn test_query_deduplicates_and_orders_by_registration() {
        let k = keys(3);
        let mut grid = SpatialPartition::new(10.0).unwrap();
        // Registered out of spatial order, each spanning several cells
        grid.add(k[2], &rect(25.0, 0.0, 20.0, 20.0), LayerMask::SOLID).unwrap();
        grid.add(k[0], &rect(0.0, 0.0, 30.0, 30.0), LayerMask::SOLID).unwrap();
        grid.add(k[1], &rect(5.0, 5.0, 2.0, 2.0), LayerMask::TRIGGER).unwrap();

        let found = grid.query_bounds(&rect(0.0, 0.0, 50.0, 50.0), None);
        assert_eq!(found, vec![k[2], k[0], k[1]]);

        let solids = grid.query_bounds(&rect(0.0, 0.0, 50.0, 50.0), Some(LayerMask::SOLID));
        assert_eq!(solids, vec![k[2], k[0]]);
    }

    #[test]
    fn test_update_keeps_registration_order() {
        let k = keys(2);
        let mut grid = SpatialPartition::new(10.0).unwrap();
        let first = rect(0.0, 0.0, 5.0, 5.0);
        grid.add(k[0], &first, LayerMask::SOLID).unwrap();
        grid.add(k[1], &rect(2.0, 2.0, 5.0, 5.0), LayerMask::SOLID).unwrap();

        let moved = rect(1.0, 1.0, 5.0, 5.0);
        grid.update(k[0], &first, &moved).unwrap();
        assert_eq!(grid.query_bounds(&moved, None), vec![k[0], k[1]]);
    }

    #[test]
    fn test_query_excluding() {
        let k = keys(3);
        let mut grid = SpatialPartition::new(10.0).unwrap();
        for (i, key) in k.iter().enumerate() {
            grid.add(*key, &rect(i as f32 * 3.0, 0.0, 2.0, 2.0), LayerMask::SOLID).unwrap();
        }

        let exclude: HashSet<BoxKey> = [k[1]].into_iter().collect();
        let found = grid.query_bounds_excluding(&rect(0.0, 0.0, 10.0, 10.0), &exclude);
        assert_eq!(found, vec![k[0], k[2]]);

        let found = grid.query_bounds_filtered_excluding(&rect(0.0, 0.0, 10.0, 10.0), LayerMask::TRIGGER, &exclude);
        assert!(found.is_empty());
    }

    #[test]
    fn test_large_query_over_sparse_grid() {
        let k = keys(2);
        let mut grid = SpatialPartition::new(1.0).unwrap();
        grid.add(k[0], &rect(-5000.0, 0.0, 1.0, 1.0), LayerMask::SOLID).unwrap();
        grid.add(k[1], &rect(5000.0, 0.0, 1.0, 1.0), LayerMask::SOLID).unwrap();

        let everything = rect(-10_000.0, -10_000.0, 20_000.0, 20_000.0);
        assert_eq!(grid.query_bounds(&everything, None), vec![k[0], k[1]]);
    }

    #[test]
    fn test_cell_range_saturates_far_from_origin() {
        let grid = SpatialPartition::new(1.0).unwrap();

        let far_left = grid.cell_range(&rect(-3.0e9, 0.0, 10.0, 10.0));
        assert_eq!((far_left.min_x, far_left.max_x), (i32::MIN, i32::MIN));
        assert_eq!((far_left.min_y, far_left.max_y), (0, 9));

        let far_right = grid.cell_range(&rect(3.0e9, -3.0e9, 10.0, 10.0));
        assert_eq!((far_right.min_x, far_right.max_x), (i32::MAX, i32::MAX));
        assert_eq!(far_right.min_y, i32::MIN);

        let extreme = grid.cell_range(&Aabb2::new(Vec2::new(f32::MIN, f32::MIN), Vec2::new(f32::MIN, f32::MIN)));
        assert_eq!(extreme.cell_count(), 1);
    }

    #[test]
    fn test_far_away_box_is_filed_and_found() {
        let k = keys(1);
        let mut grid = SpatialPartition::new(1.0).unwrap();
        let far = rect(-3.0e9, 0.0, 10.0, 10.0);

        grid.add(k[0], &far, LayerMask::SOLID).unwrap();
        assert_eq!(grid.query_bounds(&far, None), vec![k[0]]);

        let back = rect(2.0, 2.0, 10.0, 10.0);
        grid.update(k[0], &far, &back).unwrap();
        assert!(grid.query_bounds(&far, None).is_empty());
        assert_eq!(grid.query_bounds(&back, None), vec![k[0]]);
    }

    #[test]
    fn test_oversized_bounds_rejected() {
        let k = keys(2);
        let mut grid = SpatialPartition::new(1.0).unwrap();

        let huge = rect(0.0, 0.0, 2000.0, 2000.0);
        assert_eq!(
            grid.add(k[0], &huge, LayerMask::SOLID).unwrap_err(),
            CollisionError::BoundsTooLarge { key: k[0], cells: 4_000_000 }
        );
        assert!(!grid.contains(k[0]));
        assert_eq!(grid.occupied_cell_count(), 0);

        // Growing an existing box past the limit leaves it where it was
        let small = rect(0.0, 0.0, 4.0, 4.0);
        grid.add(k[1], &small, LayerMask::SOLID).unwrap();
        assert!(matches!(
            grid.update(k[1], &small, &huge),
            Err(CollisionError::BoundsTooLarge { .. })
        ));
        assert_eq!(grid.cells_of(k[1]), Some(grid.cell_range(&small)));
        assert_eq!(grid.occupied_cell_count(), 16);
    }
}
