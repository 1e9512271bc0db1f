use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use geo::{MultiPolygon, Point, polygon};
use maktab::{BoundaryIndex, District, point_in_boundary};

fn grid_districts(side: u64) -> Vec<District> {
    let mut districts = Vec::with_capacity((side * side) as usize);
    for row in 0..side {
        for col in 0..side {
            let min_x = col as f64 * 0.5;
            let min_y = row as f64 * 0.5;
            let boundary = MultiPolygon::new(vec![polygon![
                (x: min_x, y: min_y),
                (x: min_x + 0.5, y: min_y),
                (x: min_x + 0.5, y: min_y + 0.5),
                (x: min_x, y: min_y + 0.5),
            ]]);
            districts.push(District::new(
                row * side + col + 1,
                format!("cell-{}-{}", row, col),
                boundary,
            ));
        }
    }
    districts
}

fn benchmark_containment_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("containment_lookup");

    for side in [8u64, 16, 32] {
        let districts = grid_districts(side);
        let index = BoundaryIndex::new(districts.clone()).unwrap();
        let probe = Point::new(side as f64 * 0.25, side as f64 * 0.25);

        group.bench_with_input(BenchmarkId::new("rtree", side * side), &probe, |b, probe| {
            b.iter(|| index.locate(black_box(probe)))
        });

        group.bench_with_input(
            BenchmarkId::new("full_scan", side * side),
            &probe,
            |b, probe| {
                b.iter(|| {
                    districts
                        .iter()
                        .find(|district| point_in_boundary(&district.boundary, black_box(probe)))
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_containment_lookup);
criterion_main!(benches);
