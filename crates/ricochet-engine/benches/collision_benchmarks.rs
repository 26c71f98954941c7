//! Collision pass benchmarks: uniform grid vs full pairwise broad phase.
//!
//! Each iteration runs one complete collision pass (broad phase, narrow
//! phase, resolution and pair-state bookkeeping) over a field of moving
//! circles.
//!
//! Run with: `cargo bench --bench collision_benchmarks`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use ricochet_engine::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const WIDTH: f64 = 1600.0;
const HEIGHT: f64 = 1200.0;

/// Scatter `count` small moving circles over the play field.
fn populate(world: &mut World, count: usize) {
    let mut rng = Pcg32::seed_from_u64(0xC011_1DE5);
    for _ in 0..count {
        world.spawn(
            EntityTemplate::new()
                .with(Transform::new(rng.gen_range(0.0..WIDTH), rng.gen_range(0.0..HEIGHT)))
                .with(Physics::new().with_velocity(rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0)))
                .with(Collider::circle(rng.gen_range(2.0..8.0)))
                .with_tag("body"),
        );
    }
}

fn setup_world(count: usize) -> World {
    let mut world = World::new();
    populate(&mut world, count);
    world
}

fn settings(broad_phase: BroadPhase) -> CollisionSettings {
    CollisionSettings {
        broad_phase,
        width: WIDTH,
        height: HEIGHT,
        cell_size: 32.0,
        ..CollisionSettings::default()
    }
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_broad_phase_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("collision_pass");
    for &count in &[100usize, 500, 2_000] {
        for (label, phase) in [("grid", BroadPhase::Grid), ("pairwise", BroadPhase::Pairwise)] {
            if phase == BroadPhase::Pairwise && count > 500 {
                continue;
            }
            let mut world = setup_world(count);
            let settings = settings(phase);
            group.bench_with_input(BenchmarkId::new(label, count), &count, |b, _| {
                b.iter(|| black_box(collision_pass(&mut world, &settings)));
            });
        }
    }
    group.finish();
}

fn bench_grid_rebuild(c: &mut Criterion) {
    let world = setup_world(2_000);
    let mut grid = SpatialGrid::new(WIDTH, HEIGHT, 32.0);
    c.bench_function("spatial_grid_rebuild_2k", |b| {
        b.iter(|| {
            grid.rebuild(&world);
            black_box(grid.candidate_pairs().len());
        });
    });
}

fn bench_engine_frame(c: &mut Criterion) {
    let mut engine = Engine::new(EngineConfig {
        width: WIDTH,
        height: HEIGHT,
        cell_size: 32.0,
        ..EngineConfig::default()
    });
    populate(engine.world_mut(), 1_000);
    c.bench_function("engine_frame_1k", |b| {
        b.iter(|| black_box(engine.update(1.0 / 60.0).entity_count));
    });
}

// ---------------------------------------------------------------------------
// Criterion groups and main
// ---------------------------------------------------------------------------

criterion_group!(
    benches,
    bench_broad_phase_scaling,
    bench_grid_rebuild,
    bench_engine_frame,
);
criterion_main!(benches);
