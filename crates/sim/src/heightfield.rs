//! Terrain heightfield reconstruction from raw depth scans.
//!
//! The sensor reports per-cell distances; sand piled higher sits closer
//! to the sensor and therefore reads as a smaller distance. The builder
//! inverts that, calibrates it against the operator-set ground level
//! and vertical gain, and suppresses sensor noise two ways:
//!
//! - temporally, by averaging each rebuild 50/50 with the previously
//!   published heights, and
//! - spatially, by replacing each interior cell with the mean of itself
//!   and its four axis neighbors.
//!
//! Each rebuild publishes a fresh [`TerrainSnapshot`] so the water tick
//! never sees a half-updated grid.

use rayon::prelude::*;

use crate::constants::{HEIGHT_MAP_MULTIPLIER, MAX_DEPTH};
use crate::grid::Grid;
use crate::sensor::DepthFrame;

/// Operator calibration for mapping scans onto the table.
#[derive(Clone, Copy, Debug)]
pub struct Calibration {
    /// Vertical offset subtracted from every normalized height; sets
    /// where "sea level" sits in the physical scan.
    pub minimum_height: f32,
    /// Gain applied after the offset; stretches the scanned range so
    /// the tallest sand reaches normalized 1.0.
    pub height_scale_factor: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            minimum_height: 0.5,
            height_scale_factor: 20.0,
        }
    }
}

/// One cell of the height-ordered list.
#[derive(Clone, Copy, Debug)]
pub struct OrderedCell {
    pub x: usize,
    pub y: usize,
    pub height: f32,
}

/// An immutable terrain publication: the smoothed height grid plus all
/// cells sorted highest-first. The water tick consumes a snapshot as a
/// unit; rebuilds replace it as a unit.
#[derive(Clone, Debug)]
pub struct TerrainSnapshot {
    pub heights: Grid,
    pub ordered: Vec<OrderedCell>,
}

impl TerrainSnapshot {
    /// Build a snapshot directly from a height grid (synthetic terrains
    /// and tests; sensor-driven snapshots come from the builder).
    pub fn from_heights(heights: Grid) -> Self {
        let mut ordered = Vec::with_capacity(heights.width() * heights.height());
        for y in 0..heights.height() {
            for x in 0..heights.width() {
                ordered.push(OrderedCell {
                    x,
                    y,
                    height: heights.get(x, y),
                });
            }
        }
        sort_descending(&mut ordered);
        Self { heights, ordered }
    }
}

/// Converts raw depth frames into terrain snapshots, carrying the
/// previously published grid for temporal smoothing.
pub struct HeightfieldBuilder {
    width: usize,
    height: usize,
    last: Grid,
}

impl HeightfieldBuilder {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            last: Grid::new(width, height),
        }
    }

    /// Rebuild the terrain from one depth frame.
    ///
    /// Returns `None` when no frame arrived this cycle (or the frame
    /// does not match the grid dimensions); the previous terrain stays
    /// valid and the caller simply skips the swap.
    pub fn rebuild(&mut self, frame: Option<&DepthFrame>, cal: &Calibration) -> Option<TerrainSnapshot> {
        let frame = frame?;
        if frame.width() != self.width || frame.height() != self.height {
            log::warn!(
                "depth frame is {}x{}, grid is {}x{}; skipping rebuild",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            );
            return None;
        }

        let blended = self.convert_and_blend(frame, cal);
        let snapshot = self.smooth_and_order(&blended);
        self.last = snapshot.heights.clone();
        Some(snapshot)
    }

    /// Last published terrain grid.
    pub fn last(&self) -> &Grid {
        &self.last
    }

    /// Depth-to-height conversion plus the 50/50 temporal blend against
    /// the previously published grid. Rows are independent, so this
    /// runs in parallel.
    fn convert_and_blend(&self, frame: &DepthFrame, cal: &Calibration) -> Grid {
        let width = self.width;
        let minimum_height = cal.minimum_height;
        let scale = cal.height_scale_factor * HEIGHT_MAP_MULTIPLIER;

        let mut blended = Grid::new(width, self.height);
        blended
            .cells_mut()
            .par_chunks_mut(width)
            .zip(self.last.cells().par_chunks(width))
            .zip(frame.samples().par_chunks(width))
            .for_each(|((out_row, last_row), sample_row)| {
                for x in 0..width {
                    // Far reads are low ground, near reads are high sand.
                    let normalized_depth = sample_row[x] as f32 / MAX_DEPTH;
                    let height = ((1.0 - normalized_depth) - minimum_height) * scale;
                    out_row[x] = 0.5 * (last_row[x] + height);
                }
            });
        blended
    }

    /// 5-point spatial smoothing; the ordered list falls out of the
    /// same sweep so no second full scan is needed. Border cells keep
    /// their blended value (no wraparound) and join the list so the
    /// distributor's edge-drain branch gets to process them.
    fn smooth_and_order(&self, blended: &Grid) -> TerrainSnapshot {
        let mut smoothed = Grid::new(self.width, self.height);
        let mut ordered = Vec::with_capacity(self.width * self.height);

        for y in 0..self.height {
            for x in 0..self.width {
                let value = if smoothed.is_border(x, y) {
                    blended.get(x, y)
                } else {
                    (blended.get(x, y)
                        + blended.get(x + 1, y)
                        + blended.get(x - 1, y)
                        + blended.get(x, y + 1)
                        + blended.get(x, y - 1))
                        / 5.0
                };
                smoothed.set(x, y, value);
                ordered.push(OrderedCell { x, y, height: value });
            }
        }

        sort_descending(&mut ordered);
        TerrainSnapshot {
            heights: smoothed,
            ordered,
        }
    }
}

/// Highest ground first; ties land in arbitrary order.
fn sort_descending(cells: &mut [OrderedCell]) {
    cells.par_sort_unstable_by(|a, b| b.height.total_cmp(&a.height));
}
