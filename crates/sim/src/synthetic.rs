//! Procedural depth source for demos and tests.
//!
//! Stands in for the physical sensor: fBm noise shapes a static sand
//! bed, a circular "hand press" orbits the table and pushes the scanned
//! surface down locally, and a little uniform jitter emulates the
//! per-frame noise a real depth camera produces. Heights go out through
//! the exact inverse of the builder's depth mapping, so default
//! calibration reproduces the generated bed.

use glam::Vec2;
use noise::{Fbm, NoiseFn, Perlin};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::MAX_DEPTH;
use crate::sensor::{DepthFrame, DepthSource};

/// Normalized height of the press dent.
const PRESS_DEPTH: f32 = 0.25;

/// Press radius as a fraction of the grid width.
const PRESS_RADIUS_FRACTION: f32 = 0.12;

/// Fraction of a full orbit the press advances per frame.
const PRESS_SPEED: f32 = 0.002;

/// Sensor jitter amplitude in raw depth units.
const JITTER: u16 = 12;

pub struct SyntheticSource {
    width: usize,
    height: usize,
    /// Normalized [0, 1] height of the undisturbed bed.
    bed: Vec<f32>,
    press_phase: f32,
    rng: StdRng,
}

impl SyntheticSource {
    pub fn new(width: usize, height: usize, seed: u32) -> Self {
        let fbm: Fbm<Perlin> = Fbm::new(seed);
        let mut bed = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let nx = x as f64 / width as f64;
                let ny = y as f64 / height as f64;
                // fBm is roughly [-1, 1]; fold it into a gentle bed
                // around normalized 0.5, the default calibration plane.
                let n = fbm.get([nx * 3.0, ny * 3.0]) as f32;
                bed.push((0.5 + n * 0.2).clamp(0.0, 1.0));
            }
        }
        Self {
            width,
            height,
            bed,
            press_phase: 0.0,
            rng: StdRng::seed_from_u64(seed as u64),
        }
    }

    /// Center of the orbiting press for the current frame.
    fn press_center(&self) -> Vec2 {
        let center = Vec2::new(self.width as f32 * 0.5, self.height as f32 * 0.5);
        let orbit = Vec2::new(self.width as f32 * 0.3, self.height as f32 * 0.3);
        let angle = self.press_phase * std::f32::consts::TAU;
        center + Vec2::new(angle.cos(), angle.sin()) * orbit
    }
}

impl DepthSource for SyntheticSource {
    fn latest_frame(&mut self) -> Option<DepthFrame> {
        let press = self.press_center();
        let radius = self.width as f32 * PRESS_RADIUS_FRACTION;

        let mut samples = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let mut h = self.bed[y * self.width + x];

                // The press dents the surface with a smooth falloff.
                let d = Vec2::new(x as f32, y as f32).distance(press);
                if d < radius {
                    h -= PRESS_DEPTH * (1.0 - d / radius);
                }

                // Inverse of the builder's mapping: height h reads as
                // depth (1 - h) * MAX_DEPTH.
                let depth = (1.0 - h.clamp(0.0, 1.0)) * MAX_DEPTH;
                let jitter = self.rng.gen_range(0..=2 * JITTER) as f32 - JITTER as f32;
                samples.push((depth + jitter).clamp(0.0, MAX_DEPTH) as u16);
            }
        }

        self.press_phase = (self.press_phase + PRESS_SPEED).fract();
        // A validated self-produced frame; length is correct by
        // construction.
        DepthFrame::new(self.width, self.height, samples).ok()
    }
}
