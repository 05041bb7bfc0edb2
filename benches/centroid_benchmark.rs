use criterion::{black_box, criterion_group, criterion_main, Criterion};
use zone_admin::models::{Coordinate, Ring, Status, Zone};
use zone_admin::services::compute_centroid;
use zone_admin::services::geometry::{decode_description, encode_description};

/// A wobbly city-sized ring with `n` vertices.
fn ring(n: usize, lat: f64, lng: f64) -> Ring {
    let coords = (0..n)
        .map(|i| {
            let angle = i as f64 / n as f64 * std::f64::consts::TAU;
            let radius = 0.05 + 0.01 * (angle * 7.0).sin();
            Coordinate::new(lat + radius * angle.sin(), lng + radius * angle.cos())
        })
        .collect();
    Ring::new(coords).expect("valid ring")
}

fn benchmark_zone_geometry(c: &mut Criterion) {
    let large = ring(10_000, 37.77, -122.42);
    let description = encode_description(&large);

    let mut group = c.benchmark_group("zone_geometry");

    group.bench_function("centroid_10k_vertices", |b| {
        b.iter(|| compute_centroid(black_box(large.coords())))
    });

    group.bench_function("decode_description_10k_vertices", |b| {
        b.iter(|| decode_description(black_box(&description)))
    });

    // Containment test across a city's worth of zones
    let zones: Vec<Zone> = (0..200)
        .map(|i| {
            let geometry = ring(64, 37.0 + (i / 20) as f64 * 0.1, -122.9 + (i % 20) as f64 * 0.1);
            Zone {
                id: i.to_string(),
                name: format!("Zone {}", i),
                centroid: compute_centroid(geometry.coords()).expect("centroid"),
                geometry,
                status: Status::Enabled,
            }
        })
        .collect();
    let point = geo::Point::new(-122.42, 37.77);

    group.bench_function("locate_200_zones", |b| {
        use geo::Contains;
        b.iter(|| {
            zones
                .iter()
                .filter(|z| z.geometry.to_polygon().contains(black_box(&point)))
                .count()
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_zone_geometry);
criterion_main!(benches);
