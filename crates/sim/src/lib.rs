//! AR sandbox terrain and water simulation.
//!
//! A depth sensor scans a physical sand table; this library turns the
//! raw scan into a smoothed terrain heightfield and runs a
//! capacity-limited water-distribution pass over it every tick. Water
//! flows strictly downhill along the absolute surface
//! (terrain + water), drains off the table edges, and slowly trickles
//! away so stale puddles disappear when the operator reshapes the sand.
//!
//! This crate is sensor- and framework-agnostic: it consumes depth
//! frames through the [`DepthSource`] trait and exposes plain numeric
//! grids for an external rasterizer. No rendering, no device I/O.
//!
//! # Example
//!
//! ```
//! use sim::{Simulation, SimConfig, SyntheticSource, DepthSource, WaterSource};
//!
//! let mut config = SimConfig::default();
//! config.sources = vec![WaterSource { x: 16, y: 16 }];
//!
//! let mut sim = Simulation::new(64, 48, config);
//! let mut sensor = SyntheticSource::new(64, 48, 7);
//!
//! // Rebuild terrain from one scan, then run a few water ticks.
//! sim.rebuild_now(sensor.latest_frame().as_ref());
//! for _ in 0..10 {
//!     sim.tick();
//! }
//! ```

pub mod config;
pub mod constants;
pub mod grid;
pub mod heightfield;
pub mod output;
pub mod sensor;
pub mod simulation;
pub mod synthetic;
pub mod water;

pub use config::{SimConfig, WaterSource};
pub use grid::Grid;
pub use heightfield::{Calibration, HeightfieldBuilder, OrderedCell, TerrainSnapshot};
pub use output::SurfaceFrame;
pub use sensor::{DepthFrame, DepthSource, FrameError};
pub use simulation::Simulation;
pub use synthetic::SyntheticSource;
pub use water::{flow_capacity, WaterDistributor};
