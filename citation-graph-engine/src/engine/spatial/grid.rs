use bevy::prelude::*;
use std::ops::Range;

/// Bits per axis in a cell key. Caps the resolution at 1024 cells per axis.
const AXIS_BITS: u32 = 10;
pub const MAX_RESOLUTION: u32 = 1 << AXIS_BITS;

/// Spread the low 10 bits of `v` so there are two zero bits between each.
fn part_1_by_2(v: u32) -> u32 {
    let mut x = v & 0x3ff;
    x = (x | (x << 16)) & 0x0300_00ff;
    x = (x | (x << 8)) & 0x0300_f00f;
    x = (x | (x << 4)) & 0x030c_30c3;
    x = (x | (x << 2)) & 0x0924_9249;
    x
}

/// Interleave three 10-bit cell coordinates into a 30-bit Z-order key.
pub fn morton_encode_3d(x: u32, y: u32, z: u32) -> u32 {
    part_1_by_2(x) | (part_1_by_2(y) << 1) | (part_1_by_2(z) << 2)
}

#[derive(Debug, Clone)]
struct Cell {
    key: u32,
    coord: UVec3,
    nodes: Range<usize>,
}

/// Node indices bucketed into a uniform grid spanning the node bounds.
/// Non-finite positions are left out of the index.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    min: Vec3,
    cell_size: Vec3,
    resolution: u32,
    cells: Vec<Cell>,
    /// Node indices grouped by cell, cells in key order.
    entries: Vec<u32>,
}

impl SpatialGrid {
    pub fn build(positions: &[Vec3], resolution: u32) -> Self {
        let resolution = resolution.clamp(1, MAX_RESOLUTION);

        let (min, max) = positions
            .iter()
            .filter(|p| p.is_finite())
            .fold((Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)), |(lo, hi), p| {
                (lo.min(*p), hi.max(*p))
            });
        let (min, max) = if min.x > max.x { (Vec3::ZERO, Vec3::ZERO) } else { (min, max) };
        let cell_size = ((max - min) / resolution as f32).max(Vec3::splat(f32::EPSILON));

        let mut keyed: Vec<(u32, u32, UVec3)> = positions
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_finite())
            .map(|(i, p)| {
                let coord = Self::cell_coord(*p, min, cell_size, resolution);
                (morton_encode_3d(coord.x, coord.y, coord.z), i as u32, coord)
            })
            .collect();
        keyed.sort_unstable_by_key(|(key, index, _)| (*key, *index));

        let mut cells: Vec<Cell> = Vec::new();
        let mut entries = Vec::with_capacity(keyed.len());
        for (slot, (key, index, coord)) in keyed.into_iter().enumerate() {
            match cells.last_mut() {
                Some(cell) if cell.key == key => cell.nodes.end = slot + 1,
                _ => cells.push(Cell {
                    key,
                    coord,
                    nodes: slot..slot + 1,
                }),
            }
            entries.push(index);
        }

        debug!(
            "Spatial grid: {} nodes in {} occupied cells at resolution {}",
            entries.len(),
            cells.len(),
            resolution
        );

        Self {
            min,
            cell_size,
            resolution,
            cells,
            entries,
        }
    }

    fn cell_coord(p: Vec3, min: Vec3, cell_size: Vec3, resolution: u32) -> UVec3 {
        let max_cell = (resolution - 1) as f32;
        let c = ((p - min) / cell_size).floor().clamp(Vec3::ZERO, Vec3::splat(max_cell));
        c.as_uvec3()
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Node indices whose position lies in the inclusive box `[min, max]`.
    /// Results follow cell order, then node index within a cell.
    pub fn query_box(&self, positions: &[Vec3], min: Vec3, max: Vec3) -> Vec<u32> {
        if self.is_empty() || min.cmpgt(max).any() {
            return Vec::new();
        }
        let lo = Self::cell_coord(min, self.min, self.cell_size, self.resolution);
        let hi = Self::cell_coord(max, self.min, self.cell_size, self.resolution);

        self.cells
            .iter()
            .filter(|cell| cell.coord.cmpge(lo).all() && cell.coord.cmple(hi).all())
            .flat_map(|cell| self.entries[cell.nodes.clone()].iter().copied())
            .filter(|&i| {
                positions
                    .get(i as usize)
                    .is_some_and(|p| p.cmpge(min).all() && p.cmple(max).all())
            })
            .collect()
    }

    /// Up to `max` node indices spread across occupied cells: one node from
    /// every cell in Z-order, then a second from each, and so on. Sparse
    /// regions are represented even when a dense cluster dominates the count.
    pub fn stratified_sample(&self, max: usize) -> Vec<u32> {
        let mut sample = Vec::with_capacity(max.min(self.entries.len()));
        let mut round = 0;
        while sample.len() < max && sample.len() < self.entries.len() {
            let before = sample.len();
            for cell in &self.cells {
                if sample.len() == max {
                    break;
                }
                let slot = cell.nodes.start + round;
                if slot < cell.nodes.end {
                    sample.push(self.entries[slot]);
                }
            }
            if sample.len() == before {
                break;
            }
            round += 1;
        }
        sample
    }
}
