//! Runtime simulation configuration.
//!
//! Everything an external controller (UI sliders, a calibration tool)
//! may adjust while the simulation runs lives here, as one explicit
//! struct rather than scattered globals. Values are taken at face
//! value: out-of-range settings degrade gracefully (a negative inflow
//! scale simply drains its source cell) instead of erroring.

use serde::{Deserialize, Serialize};

use crate::constants::SEA_LEVEL_HEIGHT_EPSILON;
use crate::heightfield::Calibration;

/// A cell that is reset to the inflow level every tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterSource {
    pub x: usize,
    pub y: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimConfig {
    /// Scale on the per-tick source inflow (1.0 = full
    /// `FRESH_WATER_INFLOW`).
    pub inflow_scale: f32,
    /// Calibration offset: where the physical ground plane sits in the
    /// normalized scan.
    pub minimum_height: f32,
    /// Calibration gain on the scanned height range.
    pub height_scale_factor: f32,
    /// Terrain height below which water is force-drained every tick.
    pub sea_level: f32,
    /// Whether the output should carry the sea-floor indicator mask.
    pub show_sea_level: bool,
    /// Where fresh water enters the table.
    pub sources: Vec<WaterSource>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            inflow_scale: 0.5,
            minimum_height: 0.5,
            height_scale_factor: 20.0,
            sea_level: SEA_LEVEL_HEIGHT_EPSILON,
            show_sea_level: true,
            sources: vec![WaterSource { x: 130, y: 100 }],
        }
    }
}

impl SimConfig {
    /// The calibration slice of the config, read by the rebuild cycle.
    pub fn calibration(&self) -> Calibration {
        Calibration {
            minimum_height: self.minimum_height,
            height_scale_factor: self.height_scale_factor,
        }
    }
}
