//! Fixed scalars for the sandbox simulation.
//!
//! ## Height units
//!
//! Terrain and water heights share one unit: a cell holding 1.0 water
//! sits exactly as high as 1.0 of terrain. [`HEIGHT_MAP_MULTIPLIER`]
//! maps the normalized [0, 1] scan height into that shared unit, so
//! the full vertical range of the table equals 500 units of water.

/// Largest distance value the depth sensor reports (sensor native units).
pub const MAX_DEPTH: f32 = 8000.0;

/// Depth-image width of the sensor (cells).
pub const DEPTH_WIDTH: usize = 512;

/// Depth-image height of the sensor (cells).
pub const DEPTH_HEIGHT: usize = 424;

/// Water heights at or below this are treated as dry. Also the amount
/// trickled off every cell per tick, so dead pools eventually empty.
pub const WATER_HEIGHT_EPSILON: f32 = 0.001;

/// Default sea level: cells with terrain below this are force-drained
/// every tick, letting water leave through low ground.
pub const SEA_LEVEL_HEIGHT_EPSILON: f32 = 0.01;

/// Water level a source cell is reset to each tick, before scaling by
/// the configured inflow scale.
pub const FRESH_WATER_INFLOW: f32 = 1000.0;

/// Amplification from normalized scan height [0, 1] to water units.
pub const HEIGHT_MAP_MULTIPLIER: f32 = 500.0;
