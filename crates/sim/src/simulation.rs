//! Tick orchestration and the background terrain-rebuild worker.
//!
//! Two cadences run side by side. The water tick is the fast path,
//! driven by the caller every frame. The terrain rebuild is the slow
//! path: it may run inline ([`Simulation::rebuild_now`]) or on its own
//! thread polling a [`DepthSource`] every interval. Hand-off between
//! the two is whole-snapshot only. The worker publishes each finished
//! [`TerrainSnapshot`] over a channel and the tick adopts the newest
//! one before distributing, so the water pass never reads a grid that
//! a rebuild is still writing. No per-cell locking anywhere.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::SimConfig;
use crate::grid::Grid;
use crate::heightfield::{HeightfieldBuilder, TerrainSnapshot};
use crate::output::{self, SurfaceFrame};
use crate::sensor::{DepthFrame, DepthSource};
use crate::water::WaterDistributor;

/// The running simulation: owns the water layer, the current terrain
/// snapshot, and (optionally) the background rebuild worker.
pub struct Simulation {
    width: usize,
    height: usize,
    config: Arc<Mutex<SimConfig>>,
    distributor: WaterDistributor,
    terrain: Arc<TerrainSnapshot>,
    /// Present until a worker is started; the worker takes it with him.
    builder: Option<HeightfieldBuilder>,
    pending: Option<Receiver<Arc<TerrainSnapshot>>>,
    worker: Option<RebuildWorker>,
    frame: u64,
}

struct RebuildWorker {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Simulation {
    /// Create a simulation over a flat zero terrain. Grids are
    /// allocated here, once, and never resized.
    pub fn new(width: usize, height: usize, config: SimConfig) -> Self {
        Self {
            width,
            height,
            config: Arc::new(Mutex::new(config)),
            distributor: WaterDistributor::new(width, height),
            terrain: Arc::new(TerrainSnapshot::from_heights(Grid::new(width, height))),
            builder: Some(HeightfieldBuilder::new(width, height)),
            pending: None,
            worker: None,
            frame: 0,
        }
    }

    /// Advance the water layer one tick:
    /// terrain swap, injection, distribution, trickle.
    pub fn tick(&mut self) {
        self.adopt_pending_terrain();

        let (sources, inflow_scale, sea_level) = {
            let config = self.config();
            (config.sources.clone(), config.inflow_scale, config.sea_level)
        };

        self.distributor.inject(&sources, inflow_scale);
        self.distributor.distribute(&self.terrain);
        self.distributor.trickle(&self.terrain.heights, sea_level);
        self.frame += 1;
    }

    /// Rebuild the terrain inline from one frame. Returns whether a new
    /// snapshot was adopted. A no-op once the background worker owns
    /// the rebuild.
    pub fn rebuild_now(&mut self, frame: Option<&DepthFrame>) -> bool {
        let cal = self.config().calibration();
        let Some(builder) = self.builder.as_mut() else {
            log::warn!("rebuild_now called while the rebuild worker is running");
            return false;
        };
        match builder.rebuild(frame, &cal) {
            Some(snapshot) => {
                self.terrain = Arc::new(snapshot);
                true
            }
            None => false,
        }
    }

    /// Move terrain rebuilding onto a background thread that polls
    /// `source` every `interval`. Snapshots flow back over a channel
    /// and are adopted at the top of the next tick.
    pub fn start_rebuild_worker<S>(&mut self, mut source: S, interval: Duration) -> io::Result<()>
    where
        S: DepthSource + 'static,
    {
        let Some(mut builder) = self.builder.take() else {
            log::warn!("rebuild worker already running");
            return Ok(());
        };

        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let config = Arc::clone(&self.config);

        let handle = thread::Builder::new()
            .name("terrain-rebuild".into())
            .spawn(move || {
                log::info!("terrain rebuild worker started");
                while !stop_flag.load(Ordering::Relaxed) {
                    let frame = source.latest_frame();
                    let cal = config
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .calibration();
                    if let Some(snapshot) = builder.rebuild(frame.as_ref(), &cal) {
                        if tx.send(Arc::new(snapshot)).is_err() {
                            // Simulation dropped; nobody left to serve.
                            break;
                        }
                    }
                    thread::sleep(interval);
                }
                log::info!("terrain rebuild worker stopped");
            })?;

        self.pending = Some(rx);
        self.worker = Some(RebuildWorker { stop, handle });
        Ok(())
    }

    /// Stop scheduling rebuilds and wait for the worker to finish its
    /// current cycle. Cooperative: nothing is interrupted mid-grid.
    pub fn shutdown(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.stop.store(true, Ordering::Relaxed);
            if worker.handle.join().is_err() {
                log::warn!("terrain rebuild worker panicked");
            }
        }
        self.pending = None;
    }

    /// Replace the terrain with the newest pending snapshot, if the
    /// worker published any since the last tick.
    fn adopt_pending_terrain(&mut self) {
        if let Some(rx) = &self.pending {
            let mut newest = None;
            while let Ok(snapshot) = rx.try_recv() {
                newest = Some(snapshot);
            }
            if let Some(snapshot) = newest {
                self.terrain = snapshot;
            }
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Ticks completed so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Current terrain heights.
    pub fn terrain(&self) -> &Grid {
        &self.terrain.heights
    }

    /// Current terrain snapshot (heights + ordered list).
    pub fn snapshot(&self) -> &TerrainSnapshot {
        &self.terrain
    }

    /// Current water heights.
    pub fn water(&self) -> &Grid {
        self.distributor.water()
    }

    /// Rasterize the current state into externally consumable buffers.
    pub fn surface(&self) -> SurfaceFrame {
        let (sea_level, show_sea_level) = {
            let config = self.config();
            (config.sea_level, config.show_sea_level)
        };
        output::rasterize(&self.terrain.heights, self.distributor.water(), sea_level, show_sea_level)
    }

    // ---- runtime adjustment surface (UI controller) ----

    pub fn set_inflow_scale(&self, amount: f32) {
        log::debug!("adjusting inflow scale to {amount}");
        self.config().inflow_scale = amount;
    }

    /// Move the calibrated ground plane; takes effect on the next
    /// rebuild cycle.
    pub fn set_ground_height(&self, amount: f32) {
        log::debug!("adjusting minimum height to {amount}");
        self.config().minimum_height = amount;
    }

    /// Change the vertical gain; takes effect on the next rebuild
    /// cycle.
    pub fn set_height_scale(&self, amount: f32) {
        log::debug!("adjusting height scale to {amount}");
        self.config().height_scale_factor = amount;
    }

    pub fn set_sea_level(&self, amount: f32) {
        log::debug!("adjusting sea level to {amount}");
        self.config().sea_level = amount;
    }

    pub fn set_show_sea_level(&self, enabled: bool) {
        self.config().show_sea_level = enabled;
    }

    pub fn add_source(&self, x: usize, y: usize) {
        log::debug!("adding water source at ({x}, {y})");
        self.config().sources.push(crate::config::WaterSource { x, y });
    }

    pub fn clear_sources(&self) {
        self.config().sources.clear();
    }

    fn config(&self) -> MutexGuard<'_, SimConfig> {
        self.config.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.shutdown();
    }
}
