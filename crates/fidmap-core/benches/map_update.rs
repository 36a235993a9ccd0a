use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use fidmap_core::{Map, MapConfig, TagId};
use std::f64::consts::PI;
use std::hint::black_box;
use std::time::Duration;

/// Untwisted tags on a `side × side` grid, linked to their right, upper and diagonal
/// neighbours with slightly noisy goodness.
fn build_grid(side: u32) -> Map {
    let mut map = Map::new(MapConfig::default()).unwrap();
    let id = |col: u32, row: u32| -> TagId { row * side + col };
    for row in 0..side {
        for col in 0..side {
            let goodness = ((row * 7 + col * 13) % 5) as f64 * 0.1;
            if col + 1 < side {
                map.arc_announce(id(col, row), 0.0, 1.0, id(col + 1, row), PI, goodness)
                    .unwrap();
            }
            if row + 1 < side {
                map.arc_announce(id(col, row), -PI / 2.0, 1.0, id(col, row + 1), PI / 2.0, goodness)
                    .unwrap();
            }
            if col + 1 < side && row + 1 < side {
                map.arc_announce(
                    id(col, row),
                    -PI / 4.0,
                    2f64.sqrt(),
                    id(col + 1, row + 1),
                    3.0 * PI / 4.0,
                    goodness + 0.5,
                )
                .unwrap();
            }
        }
    }
    map
}

fn bench_map_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_update");
    group.measurement_time(Duration::from_secs(10));

    for side in [10u32, 30, 60] {
        let map = build_grid(side);
        group.bench_with_input(
            BenchmarkId::new("update", format!("grid_{side}x{side}")),
            &map,
            |b, map| {
                b.iter_batched(
                    || map.clone(),
                    |mut map| {
                        let summary = map.update();
                        black_box(summary.reached);
                    },
                    BatchSize::LargeInput,
                )
            },
        );
        group.bench_with_input(
            BenchmarkId::new("to_xml_string", format!("grid_{side}x{side}")),
            &map,
            |b, map| {
                let mut map = map.clone();
                map.update();
                b.iter(|| black_box(map.to_xml_string().unwrap().len()))
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_map_update);
criterion_main!(benches);
