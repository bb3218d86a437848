use criterion::{black_box, criterion_group, criterion_main, Criterion};
use netatmo_export::{flatten, Dataset, MeasureChunk, MeasurementType, StationSeries};

fn chunks() -> Vec<MeasureChunk> {
    (0..48)
        .map(|hour| MeasureChunk {
            beg_time: 1_642_204_800 + hour * 3600,
            step_time: Some(300),
            value: (0..12).map(|i| vec![Some(1000.0 + i as f64 / 10.0)]).collect(),
        })
        .collect()
}

fn dataset(stations: usize) -> Dataset {
    let readings = flatten(&chunks());
    let mut dataset = Dataset::new(MeasurementType::Pressure);
    for i in 0..stations {
        dataset.insert(
            format!("70:ee:50:{:02x}:{:02x}:00", i / 256, i % 256),
            StationSeries {
                readings: readings.clone(),
                ..Default::default()
            },
        );
    }
    dataset
}

fn bench_export(c: &mut Criterion) {
    let chunks = chunks();
    c.bench_function("flatten_two_days", |b| b.iter(|| flatten(black_box(&chunks))));

    let dataset = dataset(500);
    c.bench_function("serialize_json_500_stations", |b| {
        b.iter(|| serde_json::to_vec(black_box(&dataset)))
    });
}

criterion_group!(benches, bench_export);
criterion_main!(benches);
