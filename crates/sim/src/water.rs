//! Water layer: flow capacity, distribution, and trickle decay.
//!
//! The distribution pass walks the height-ordered cell list once per
//! tick, highest ground first, and lets every wet cell push water to
//! whichever axis neighbors sit lower on the absolute surface
//! (terrain + water). The pass mutates the water grid in place, so
//! cells processed later in the same tick already see the water that
//! arrived from above them. Outflow is ratio-limited: a cell never
//! sends more than it holds, and eligible neighbors are filled in
//! proportion to their individual capacity rather than first-come.

use crate::config::WaterSource;
use crate::constants::{FRESH_WATER_INFLOW, WATER_HEIGHT_EPSILON};
use crate::grid::Grid;
use crate::heightfield::TerrainSnapshot;

/// Requested flow toward one neighbor, alive for a single cell step.
#[derive(Clone, Copy, Debug)]
struct FlowCapacity {
    x: usize,
    y: usize,
    amount: f32,
}

/// How much water could move from `(x, y)` to the adjacent
/// `(dest_x, dest_y)` this step. Pure; reads the two grids only.
///
/// Water never flows uphill: if the destination's absolute surface is
/// at or above the source's, the capacity is zero. When the destination
/// sits low enough that it cannot absorb the local water while staying
/// under the source's bare terrain, all local water is eligible;
/// otherwise only the absolute-height differential moves, which levels
/// surfaces gradually instead of instantly.
pub fn flow_capacity(
    terrain: &Grid,
    water: &Grid,
    x: usize,
    y: usize,
    dest_x: usize,
    dest_y: usize,
) -> f32 {
    let here_water = water.get(x, y);
    let here_terrain = terrain.get(x, y);
    let here_abs = here_terrain + here_water;
    let there_abs = terrain.get(dest_x, dest_y) + water.get(dest_x, dest_y);

    if here_abs <= there_abs {
        0.0
    } else if there_abs + here_water > here_terrain {
        here_water
    } else {
        here_abs - there_abs
    }
}

/// Owns the water-height grid and advances it one tick at a time.
/// Invariant: every cell is >= 0 at tick boundaries (a negative inflow
/// scale may dip a source cell below zero mid-tick; trickle floors it).
pub struct WaterDistributor {
    water: Grid,
}

impl WaterDistributor {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            water: Grid::new(width, height),
        }
    }

    pub fn water(&self) -> &Grid {
        &self.water
    }

    pub fn water_mut(&mut self) -> &mut Grid {
        &mut self.water
    }

    /// Reset every source cell to its inflow level. A hard set, not an
    /// accumulation: a source never climbs above its configured level
    /// no matter how much drained away since last tick.
    pub fn inject(&mut self, sources: &[WaterSource], inflow_scale: f32) {
        for source in sources {
            self.water
                .set(source.x, source.y, inflow_scale * FRESH_WATER_INFLOW);
        }
    }

    /// One distribution pass over the height-ordered list.
    pub fn distribute(&mut self, snapshot: &TerrainSnapshot) {
        let terrain = &snapshot.heights;

        for cell in &snapshot.ordered {
            let (x, y) = (cell.x, cell.y);

            if self.water.get(x, y) <= WATER_HEIGHT_EPSILON {
                continue;
            }

            if self.water.is_border(x, y) {
                // Edge of the table: the water falls off the world.
                self.water.set(x, y, 0.0);
                continue;
            }

            let capacities = self.capacity_list(terrain, x, y);
            if capacities.is_empty() {
                continue;
            }

            let available = self.water.get(x, y);
            let total_requested: f32 = capacities.iter().map(|c| c.amount).sum();
            // Capacities typically request far more than the cell
            // holds; the ratio scales every transfer so the sum never
            // exceeds the available water.
            let ratio = (available / total_requested).min(1.0);

            for cap in &capacities {
                let moved = cap.amount * ratio;
                self.water.set(cap.x, cap.y, self.water.get(cap.x, cap.y) + moved);
                self.water.set(x, y, self.water.get(x, y) - moved);
            }
        }
    }

    /// Capacities toward the four axis neighbors, keeping only those
    /// above the dry threshold, sorted ascending so the smallest
    /// request is honored first when ratio-limited.
    fn capacity_list(&self, terrain: &Grid, x: usize, y: usize) -> Vec<FlowCapacity> {
        let neighbors = [(x, y - 1), (x, y + 1), (x + 1, y), (x - 1, y)];

        let mut capacities: Vec<FlowCapacity> = neighbors
            .into_iter()
            .map(|(nx, ny)| FlowCapacity {
                x: nx,
                y: ny,
                amount: flow_capacity(terrain, &self.water, x, y, nx, ny),
            })
            .filter(|c| c.amount > WATER_HEIGHT_EPSILON)
            .collect();

        capacities.sort_by(|a, b| a.amount.total_cmp(&b.amount));
        capacities
    }

    /// Trickle decay: cells below sea level are force-drained so water
    /// can permanently leave through low ground; everything else loses
    /// one epsilon, floored at zero. This is what eventually empties
    /// pools that are fully enclosed by higher terrain and therefore
    /// never gain outflow capacity.
    pub fn trickle(&mut self, terrain: &Grid, sea_level: f32) {
        for y in 0..self.water.height() {
            for x in 0..self.water.width() {
                if terrain.get(x, y) < sea_level {
                    self.water.set(x, y, 0.0);
                } else {
                    let drained = (self.water.get(x, y) - WATER_HEIGHT_EPSILON).max(0.0);
                    self.water.set(x, y, drained);
                }
            }
        }
    }
}
