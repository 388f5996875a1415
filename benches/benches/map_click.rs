// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt::Write as _;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Point;
use metro_map::{EnabledStations, MapConfig, MetroMap};
use metro_scene::Scene;

const CELL: f64 = 40.0;

// An n×n grid of stations; every 2×2 block is an interchange group.
fn gen_grid_map(n: usize) -> String {
    let side = n as f64 * CELL;
    let mut svg = format!(r#"<svg width="{side}" height="{side}">"#);
    for by in (0..n).step_by(2) {
        for bx in (0..n).step_by(2) {
            svg.push_str(r#"<g metro-station-group="">"#);
            for y in by..(by + 2).min(n) {
                for x in bx..(bx + 2).min(n) {
                    let (cx, cy) = (x as f64 * CELL + 10.0, y as f64 * CELL + 10.0);
                    let _ = write!(
                        svg,
                        r#"<g metro-station-name="S{x}-{y}"><circle class="metro-point" cx="{cx}" cy="{cy}" r="6"/><text x="{}" y="{}">S{x}-{y}</text></g>"#,
                        cx + 8.0,
                        cy + 16.0
                    );
                }
            }
            svg.push_str("</g>");
        }
    }
    svg.push_str("</svg>");
    svg
}

fn every_other(n: usize) -> EnabledStations {
    EnabledStations::names(
        (0..n * n)
            .filter(|i| i % 2 == 0)
            .map(|i| format!("S{}-{}", i % n, i / n)),
    )
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for &n in &[16usize, 32, 64] {
        let svg = gen_grid_map(n);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("parse_n{n}"), |b| {
            b.iter(|| black_box(Scene::parse_svg(&svg).map(|s| s.len())));
        });
        let scene = Scene::parse_svg(&svg).unwrap();
        group.bench_function(format!("wire_n{n}"), |b| {
            b.iter_batched(
                || scene.clone(),
                |scene| black_box(MetroMap::new(scene, MapConfig::default(), every_other(n))),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_reconfigure(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconfigure");
    for &n in &[16usize, 64] {
        let svg = gen_grid_map(n);
        let mut map = MetroMap::from_svg(&svg, MapConfig::default(), every_other(n)).unwrap();
        let configs = [every_other(n), EnabledStations::all_except(["S0-0"])];
        let mut i = 0;
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("set_enabled_n{n}"), |b| {
            b.iter(|| {
                i += 1;
                let changed = map.set_enabled(configs[i % 2].clone());
                let _ = map.scene_mut().take_class_changes();
                black_box(changed)
            });
        });
    }
    group.finish();
}

fn bench_click(c: &mut Criterion) {
    let mut group = c.benchmark_group("click");
    for &n in &[16usize, 64] {
        let svg = gen_grid_map(n);
        let mut map = MetroMap::from_svg(&svg, MapConfig::default(), every_other(n)).unwrap();
        map.set_on_select(|e| {
            black_box(e.names.len());
        });
        let station = Point::new(CELL * (n / 2) as f64 + 10.0, CELL * (n / 2) as f64 + 10.0);
        let empty = Point::new(CELL * (n / 2) as f64 + 30.0, CELL * (n / 2) as f64 + 3.0);
        group.bench_function(format!("station_n{n}"), |b| {
            b.iter(|| black_box(map.click(station)));
        });
        group.bench_function(format!("background_n{n}"), |b| {
            b.iter(|| black_box(map.click(empty)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_reconfigure, bench_click);
criterion_main!(benches);
