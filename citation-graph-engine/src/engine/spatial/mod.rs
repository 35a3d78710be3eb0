//! Uniform grid index over node positions.
//!
//! Cells are stored in Z-order so neighbouring cells stay close in memory and
//! a walk over the cell list sweeps the graph region by region.

/// Morton-ordered uniform grid with box queries and stratified sampling.
pub mod grid;

pub use grid::{SpatialGrid, morton_encode_3d};
