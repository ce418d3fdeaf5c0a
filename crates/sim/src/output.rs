//! Output buffers for an external rasterizer.
//!
//! The simulation's outward contract is numeric only: a water
//! intensity channel and a normalized terrain channel, both W×H
//! row-major. Whatever maps these to pixels or projector textures
//! lives outside this crate.

use crate::constants::{HEIGHT_MAP_MULTIPLIER, WATER_HEIGHT_EPSILON};
use crate::grid::Grid;

/// One tick's worth of externally consumable surface data.
#[derive(Clone, Debug)]
pub struct SurfaceFrame {
    pub width: usize,
    pub height: usize,
    /// 1.0 where a cell holds water; dry interior cells are feathered
    /// with the mean of their neighbors' water so a wet region reads
    /// as a continuum instead of speckle.
    pub water: Vec<f32>,
    /// Terrain height normalized to [0, 1].
    pub terrain: Vec<f32>,
    /// Cells below sea level, present when the indicator is toggled on.
    pub sea_floor: Option<Vec<bool>>,
}

/// Map the two height grids to output channels.
pub fn rasterize(terrain: &Grid, water: &Grid, sea_level: f32, show_sea_level: bool) -> SurfaceFrame {
    let width = terrain.width();
    let height = terrain.height();
    let mut water_channel = vec![0.0; width * height];
    let mut terrain_channel = vec![0.0; width * height];

    for y in 0..height {
        for x in 0..width {
            let idx = terrain.idx(x, y);
            terrain_channel[idx] = (terrain.get(x, y) / HEIGHT_MAP_MULTIPLIER).clamp(0.0, 1.0);

            if water.get(x, y) > WATER_HEIGHT_EPSILON {
                water_channel[idx] = 1.0;
            } else if !water.is_border(x, y) {
                // Dry cell surrounded by water still renders wet-ish.
                let surrounding = (water.get(x + 1, y)
                    + water.get(x - 1, y)
                    + water.get(x, y + 1)
                    + water.get(x, y - 1))
                    / 4.0;
                water_channel[idx] = surrounding.clamp(0.0, 1.0);
            }
        }
    }

    let sea_floor = show_sea_level.then(|| {
        terrain
            .cells()
            .iter()
            .map(|&h| h < sea_level)
            .collect()
    });

    SurfaceFrame {
        width,
        height,
        water: water_channel,
        terrain: terrain_channel,
        sea_floor,
    }
}
