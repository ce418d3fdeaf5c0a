//! Headless sandbox demo.
//!
//! Drives the simulation with the synthetic depth source instead of a
//! physical sensor: the terrain rebuild runs on its background worker
//! while the main loop ticks the water layer at a fixed rate, logging
//! table stats and finally printing an ASCII snapshot of the water
//! mask.
//!
//! Run with: cargo run -p sandbox --release

use std::time::{Duration, Instant};

use clap::Parser;
use sim::{SimConfig, Simulation, SyntheticSource, WaterSource};

#[derive(Parser, Debug)]
#[command(about = "AR sandbox water simulation, headless")]
struct Args {
    /// Grid width in cells
    #[arg(long, default_value_t = 160)]
    width: usize,

    /// Grid height in cells
    #[arg(long, default_value_t = 120)]
    height: usize,

    /// Number of water ticks to run
    #[arg(long, default_value_t = 300)]
    ticks: u64,

    /// Water tick rate (Hz)
    #[arg(long, default_value_t = 30)]
    rate: u32,

    /// Terrain rebuild interval (ms)
    #[arg(long, default_value_t = 100)]
    rebuild_ms: u64,

    /// Seed for the synthetic terrain
    #[arg(long, default_value_t = 42)]
    seed: u32,

    /// Water inflow scale at the source
    #[arg(long, default_value_t = 0.5)]
    inflow: f32,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = SimConfig {
        inflow_scale: args.inflow,
        sources: vec![WaterSource {
            x: args.width / 4,
            y: args.height / 4,
        }],
        ..SimConfig::default()
    };

    let mut sim = Simulation::new(args.width, args.height, config);
    let source = SyntheticSource::new(args.width, args.height, args.seed);
    if let Err(err) = sim.start_rebuild_worker(source, Duration::from_millis(args.rebuild_ms)) {
        log::error!("could not start rebuild worker: {err}");
        return;
    }

    let tick_interval = Duration::from_secs(1) / args.rate.max(1);
    log::info!(
        "running {} ticks at {} Hz on a {}x{} table",
        args.ticks,
        args.rate,
        args.width,
        args.height
    );

    println!(
        "{:>6} {:>10} {:>12} {:>10}",
        "Tick", "WetCells", "TotalWater", "MaxDepth"
    );

    let started = Instant::now();
    for _ in 0..args.ticks {
        let tick_started = Instant::now();
        sim.tick();

        if sim.frame() % args.rate.max(1) as u64 == 0 {
            let cells = sim.water().cells();
            let wet = cells.iter().filter(|&&w| w > 0.0).count();
            let total: f32 = cells.iter().sum();
            let max = cells.iter().cloned().fold(0.0f32, f32::max);
            println!("{:>6} {:>10} {:>12.2} {:>10.3}", sim.frame(), wet, total, max);
        }

        if let Some(remaining) = tick_interval.checked_sub(tick_started.elapsed()) {
            std::thread::sleep(remaining);
        }
    }
    sim.shutdown();

    let elapsed = started.elapsed();
    log::info!(
        "{} ticks in {:.2}s ({:.1} Hz effective)",
        sim.frame(),
        elapsed.as_secs_f32(),
        sim.frame() as f32 / elapsed.as_secs_f32().max(1e-6)
    );

    print_water_mask(&sim);
}

/// Downsampled ASCII view of the final water mask.
fn print_water_mask(sim: &Simulation) {
    const COLS: usize = 72;
    const ROWS: usize = 28;
    let frame = sim.surface();

    println!("\nFinal water mask ({}x{}):", frame.width, frame.height);
    for row in 0..ROWS {
        let mut line = String::with_capacity(COLS);
        for col in 0..COLS {
            let x = col * frame.width / COLS;
            let y = row * frame.height / ROWS;
            let intensity = frame.water[y * frame.width + x];
            line.push(match intensity {
                i if i >= 0.99 => '#',
                i if i > 0.25 => '+',
                i if i > 0.0 => '.',
                _ => ' ',
            });
        }
        println!("{line}");
    }
}
