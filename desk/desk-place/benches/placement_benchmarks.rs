//! Benchmarks for the placement solvers.
//!
//! Run with: cargo bench -p desk-place

#![allow(missing_docs, clippy::unwrap_used, clippy::cast_precision_loss)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::{Point2, Point3, Vector2, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use desk_place::{
    BoxSolver, ContainerFrame, DrawerSolver, Occupant, PlacementRequest, TableSolver,
};
use desk_types::{ContainerKind, Footprint, ObjectKind, PlacementConfig, Pose, TableConfig};

fn bench_box_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("box_fill");
    let frame = ContainerFrame::new(
        Pose::from_yaw(Point3::new(0.0, 3.0, 0.0), 0.3),
        ContainerKind::OpenBox.geometry(&Vector3::new(16.0, 6.0, 16.0)),
    );
    let solver = BoxSolver::new(PlacementConfig::default());
    let mug = PlacementRequest::of_kind(ObjectKind::Mug);

    for occupied in [0_usize, 3, 6] {
        let mut rng = StdRng::seed_from_u64(1);
        let mut occupants = Vec::new();
        for _ in 0..occupied {
            let p = solver.find_placement(&mug, &frame, &occupants, &mut rng).unwrap();
            occupants.push(Occupant::new(p.planar(), mug.radius()));
        }
        group.bench_with_input(BenchmarkId::from_parameter(occupied), &occupants, |b, occ| {
            let mut rng = StdRng::seed_from_u64(2);
            b.iter(|| solver.find_placement(black_box(&mug), &frame, occ, &mut rng));
        });
    }
    group.finish();
}

fn bench_drawer(c: &mut Criterion) {
    let frame = ContainerFrame::new(
        Pose::from_position(Point3::new(30.0, 8.0, 0.0)),
        ContainerKind::Drawer.geometry(&Vector3::new(22.0, 6.0, 16.0)),
    );
    let solver = DrawerSolver::new(PlacementConfig::default());
    let bottle = PlacementRequest::new(ObjectKind::Asset, Vector3::new(3.0, 9.0, 3.0));
    let mut rng = StdRng::seed_from_u64(3);
    c.bench_function("drawer_reoriented", |b| {
        b.iter(|| solver.find_placement(black_box(&bottle), &frame, &[], &mut rng));
    });
}

fn bench_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_grid");
    let solver = TableSolver::new(PlacementConfig::default(), TableConfig::default());
    let cube = PlacementRequest::of_kind(ObjectKind::Cube);

    for count in [0_usize, 10, 40] {
        let mut rng = StdRng::seed_from_u64(4);
        let obstacles: Vec<Footprint> = (0..count)
            .map(|_| {
                Footprint::new(
                    Point2::new(rng.gen_range(-50.0..50.0), rng.gen_range(-30.0..30.0)),
                    Vector2::new(rng.gen_range(1.0..8.0), rng.gen_range(1.0..8.0)),
                    rng.gen_range(0.0..std::f64::consts::PI),
                )
            })
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(count), &obstacles, |b, obs| {
            b.iter(|| solver.find_placement(black_box(&cube), obs));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_box_fill, bench_drawer, bench_table);
criterion_main!(benches);
