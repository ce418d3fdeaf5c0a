//! Physics tests for the water-distribution pass.
//!
//! These lock the core behavioral guarantees:
//! 1. Water height never goes negative
//! 2. Water never flows uphill along the absolute surface
//! 3. A cell's outflow in one step is bounded by what it holds
//! 4. Border cells drain the moment they are processed
//! 5. Trickle decay is idempotent at zero and is the only exit for
//!    enclosed pools

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sim::{flow_capacity, Grid, TerrainSnapshot, WaterDistributor};

/// Snapshot over an explicitly shaped terrain.
fn snapshot(width: usize, height: usize, shape: impl Fn(usize, usize) -> f32) -> TerrainSnapshot {
    let mut grid = Grid::new(width, height);
    for y in 0..height {
        for x in 0..width {
            grid.set(x, y, shape(x, y));
        }
    }
    TerrainSnapshot::from_heights(grid)
}

fn total_water(dist: &WaterDistributor) -> f32 {
    dist.water().cells().iter().sum()
}

fn randomized_state(seed: u64, width: usize, height: usize) -> (TerrainSnapshot, WaterDistributor) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut terrain = Grid::new(width, height);
    for y in 0..height {
        for x in 0..width {
            terrain.set(x, y, rng.gen_range(0.0..10.0));
        }
    }
    let snapshot = TerrainSnapshot::from_heights(terrain);

    let mut dist = WaterDistributor::new(width, height);
    for y in 0..height {
        for x in 0..width {
            if rng.gen_bool(0.3) {
                dist.water_mut().set(x, y, rng.gen_range(0.0..5.0));
            }
        }
    }
    (snapshot, dist)
}

// =============================================================================
// NON-NEGATIVITY & MASS: randomized terrains, repeated passes
// =============================================================================

#[test]
fn water_never_goes_negative() {
    for seed in 0..5 {
        let (snapshot, mut dist) = randomized_state(seed, 24, 20);
        for _ in 0..20 {
            dist.distribute(&snapshot);
            for &w in dist.water().cells() {
                assert!(w >= 0.0, "negative water {w} with seed {seed}");
            }
            dist.trickle(&snapshot.heights, 0.01);
            for &w in dist.water().cells() {
                assert!(w >= 0.0, "negative water {w} after trickle, seed {seed}");
            }
        }
    }
}

#[test]
fn distribution_never_creates_mass() {
    // Water only moves between cells or vanishes at borders, so a
    // distribution pass can never increase the total.
    for seed in 5..10 {
        let (snapshot, mut dist) = randomized_state(seed, 24, 20);
        let before = total_water(&dist);
        dist.distribute(&snapshot);
        let after = total_water(&dist);
        assert!(
            after <= before + 1e-3,
            "mass grew {before} -> {after} with seed {seed}"
        );
    }
}

// =============================================================================
// NO UPHILL FLOW: capacity is zero whenever the destination sits higher
// =============================================================================

#[test]
fn capacity_is_zero_uphill() {
    let (snapshot, dist) = randomized_state(99, 16, 16);
    let terrain = &snapshot.heights;
    let water = dist.water();

    for y in 1..15 {
        for x in 1..15 {
            for (nx, ny) in [(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)] {
                let cap = flow_capacity(terrain, water, x, y, nx, ny);
                if cap > 0.0 {
                    let here = terrain.get(x, y) + water.get(x, y);
                    let there = terrain.get(nx, ny) + water.get(nx, ny);
                    assert!(
                        here > there,
                        "capacity {cap} from ({x},{y}) at {here} to ({nx},{ny}) at {there}"
                    );
                }
            }
        }
    }
}

// =============================================================================
// OUTFLOW BOUND: ratio limiting caps a cell's outflow at its content
// =============================================================================

#[test]
fn outflow_is_bounded_by_available_water() {
    // A puddle on a peak above four pockets walled in by higher
    // ground: each pocket's capacity (the differential branch, 10.5)
    // dwarfs the 0.5 of water present. The ratio scales every
    // transfer, the cell sends exactly what it holds, and the pockets
    // have no onward outlet, so nothing cascades.
    let snapshot = snapshot(5, 5, |x, y| {
        if (x, y) == (2, 2) {
            50.0
        } else if [(1, 2), (3, 2), (2, 1), (2, 3)].contains(&(x, y)) {
            40.0
        } else {
            41.0
        }
    });
    let mut dist = WaterDistributor::new(5, 5);
    dist.water_mut().set(2, 2, 0.5);

    dist.distribute(&snapshot);

    assert!(dist.water().get(2, 2).abs() < 1e-6);
    for &(x, y) in &[(1, 2), (3, 2), (2, 1), (2, 3)] {
        assert!((dist.water().get(x, y) - 0.125).abs() < 1e-5);
    }
}

#[test]
fn every_eligible_neighbor_requests_at_least_the_local_water() {
    // Structural consequence of the capacity rule: the all-water
    // branch requests exactly the local water, and the differential
    // branch (there_abs <= here_terrain - here_water) requests
    // here_abs - there_abs >= 2x the local water. So a wet cell with
    // any eligible neighbor always empties in its step; partial
    // retention only ever comes from enclosure, never from small
    // capacities.
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let mut terrain = Grid::new(3, 3);
        let mut water = Grid::new(3, 3);
        for y in 0..3 {
            for x in 0..3 {
                terrain.set(x, y, rng.gen_range(0.0..10.0));
                water.set(x, y, rng.gen_range(0.0..4.0));
            }
        }
        let here_water = water.get(1, 1);
        for (nx, ny) in [(0, 1), (2, 1), (1, 0), (1, 2)] {
            let cap = flow_capacity(&terrain, &water, 1, 1, nx, ny);
            if cap > 0.0 {
                assert!(
                    cap >= here_water - 1e-5,
                    "capacity {cap} below local water {here_water}"
                );
            }
        }
    }
}

// =============================================================================
// BORDER DRAINAGE: the edge of the table is a sink
// =============================================================================

#[test]
fn border_cells_drain_on_processing() {
    let snapshot = snapshot(6, 6, |_, _| 1.0);
    let mut dist = WaterDistributor::new(6, 6);
    dist.water_mut().set(0, 3, 2.0);
    dist.water_mut().set(5, 0, 1.0);
    dist.water_mut().set(2, 5, 4.0);

    dist.distribute(&snapshot);

    assert_eq!(dist.water().get(0, 3), 0.0);
    assert_eq!(dist.water().get(5, 0), 0.0);
    assert_eq!(dist.water().get(2, 5), 0.0);
}

// =============================================================================
// DECAY: idempotent at zero; sole exit for enclosed pools
// =============================================================================

#[test]
fn trickle_on_dry_grid_stays_dry() {
    let terrain_grid = {
        let mut g = Grid::new(8, 8);
        g.fill(1.0);
        g
    };
    let mut dist = WaterDistributor::new(8, 8);
    for _ in 0..10 {
        dist.trickle(&terrain_grid, 0.01);
        assert!(dist.water().cells().iter().all(|&w| w == 0.0));
    }
}

#[test]
fn enclosed_pool_drains_only_through_decay() {
    // Scenario: a basin cell at 0.5 walled in by terrain at 5.0. The
    // water surface (0.5 + 2.0) never reaches the walls, so no
    // distribution capacity ever appears; only trickle empties it.
    let snapshot = snapshot(5, 5, |x, y| if (x, y) == (2, 2) { 0.5 } else { 5.0 });
    let mut dist = WaterDistributor::new(5, 5);
    dist.water_mut().set(2, 2, 2.0);

    for _ in 0..50 {
        dist.distribute(&snapshot);
    }
    assert!((dist.water().get(2, 2) - 2.0).abs() < 1e-6, "distribution must not touch the pool");
    for &(x, y) in &[(1, 2), (3, 2), (2, 1), (2, 3)] {
        assert_eq!(dist.water().get(x, y), 0.0);
    }

    // 2.0 units at one epsilon per tick: empty within 2001 calls.
    let mut ticks = 0;
    while dist.water().get(2, 2) > 0.0 {
        dist.trickle(&snapshot.heights, 0.01);
        ticks += 1;
        assert!(ticks <= 2001, "pool failed to decay");
    }
    assert_eq!(dist.water().get(2, 2), 0.0);
}

// =============================================================================
// SCENARIO: 3x3 grid, seeded center (single-pass ordering effect)
// =============================================================================

#[test]
fn three_by_three_drains_in_a_single_tick() {
    // Center marginally above the border ring so it is processed
    // first. Its 10.0 of water splits evenly, 2.5 to each edge
    // neighbor (all four capacities equal), and those neighbors are
    // border cells processed later in the same pass, where the edge
    // rule zeroes them. Net effect: the whole tick's water leaves the
    // table in one pass, not the next.
    let snapshot = snapshot(3, 3, |x, y| if (x, y) == (1, 1) { 0.1 } else { 0.0 });
    let mut dist = WaterDistributor::new(3, 3);
    dist.water_mut().set(1, 1, 10.0);

    dist.distribute(&snapshot);

    for y in 0..3 {
        for x in 0..3 {
            assert_eq!(dist.water().get(x, y), 0.0, "cell ({x},{y}) still wet");
        }
    }
}

// =============================================================================
// SCENARIO: high/low pair - the all-water branch governs steep drops
// =============================================================================

#[test]
fn steep_drop_moves_all_local_water() {
    // Terrain 1.0 holding 5.0 water beside terrain 0.0: the
    // destination cannot absorb the local water below the source's
    // bare terrain (0 + 5 > 1), so the whole 5.0 is eligible, and
    // with a single neighbor the ratio clamps at 1.
    let mut terrain = Grid::new(4, 3);
    terrain.fill(20.0);
    terrain.set(1, 1, 1.0);
    terrain.set(2, 1, 0.0);
    let mut water = Grid::new(4, 3);
    water.set(1, 1, 5.0);

    assert_eq!(flow_capacity(&terrain, &water, 1, 1, 2, 1), 5.0);
}

#[test]
fn steep_drop_into_border_sink_empties_the_source() {
    // Same shape, with the low cell on the border: the high cell sends
    // everything, the border swallows it later in the same pass.
    let snapshot = snapshot(4, 3, |x, y| match (x, y) {
        (2, 1) => 1.0,
        (3, 1) => 0.0,
        _ => 20.0,
    });
    let mut dist = WaterDistributor::new(4, 3);
    dist.water_mut().set(2, 1, 5.0);

    dist.distribute(&snapshot);

    assert_eq!(dist.water().get(2, 1), 0.0);
    assert_eq!(dist.water().get(3, 1), 0.0);
}
