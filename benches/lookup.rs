use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::NamedTempFile;

use dephem::jplephem::synthetic::SyntheticEphemeris;
use dephem::jplephem::Slot;
use dephem::{Body, EphemerisSession, LookupRequest, ReadStrategy, SessionOptions};

const START: f64 = 2451536.5;
const STEP: f64 = 32.0;
const RECORDS: usize = 64;

/// A file with DE-like block sizes for the bodies a geocentric lookup needs
fn write_fixture() -> NamedTempFile {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let mut series = || {
        let mut components = [[0.0; 13]; 3];
        for component in components.iter_mut() {
            for (i, c) in component.iter_mut().enumerate() {
                *c = rng.gen_range(-1.0..1.0) / (1 + i * i) as f64;
            }
        }
        components
    };

    let synthetic = SyntheticEphemeris::new(START, START + RECORDS as f64 * STEP, STEP)
        .with_slot(Slot::Mars, 2, 13, 1)
        .with_slot(Slot::EarthMoonBarycenter, 41, 13, 2)
        .with_slot(Slot::Moon, 119, 13, 8)
        .with_slot(Slot::Sun, 431, 13, 2)
        .with_repeated_series(Slot::Mars, series())
        .with_repeated_series(Slot::EarthMoonBarycenter, series())
        .with_repeated_series(Slot::Moon, series())
        .with_repeated_series(Slot::Sun, series());

    let mut file = NamedTempFile::new().expect("temp file");
    synthetic
        .write_to(file.as_file_mut())
        .expect("write fixture");
    file
}

fn bench_lookup(c: &mut Criterion) {
    let file = write_fixture();
    let request = LookupRequest::new();

    // Consecutive times within a few records, as a tracking loop would ask for
    let times: Vec<f64> = (0..1_000).map(|i| START + 10.0 + i as f64 * 0.05).collect();

    let mut group = c.benchmark_group("lookup");
    for (name, read_strategy, cache_records) in [
        ("seek", ReadStrategy::Seek, false),
        ("seek+cache", ReadStrategy::Seek, true),
        ("mmap", ReadStrategy::MemoryMap, false),
        ("mmap+cache", ReadStrategy::MemoryMap, true),
    ] {
        let options = SessionOptions {
            read_strategy,
            cache_records,
            ..Default::default()
        };
        let session = EphemerisSession::open_with(file.path(), &options).expect("open fixture");

        group.bench_with_input(BenchmarkId::new("moon_geocentric", name), &times, |b, times| {
            b.iter(|| {
                for &t in times {
                    black_box(
                        session
                            .lookup(black_box(t), Body::Moon, Body::Earth, &request)
                            .expect("lookup"),
                    );
                }
            })
        });
    }
    group.finish();
}

fn bench_random_times(c: &mut Criterion) {
    let file = write_fixture();
    let session = EphemerisSession::open(file.path()).expect("open fixture");
    let request = LookupRequest::cartesian();

    let mut rng = StdRng::seed_from_u64(42);
    let times: Vec<f64> = (0..1_000)
        .map(|_| rng.gen_range(START..START + RECORDS as f64 * STEP))
        .collect();

    c.bench_function("lookup/mars_heliocentric_random", |b| {
        b.iter(|| {
            for &t in &times {
                black_box(session.lookup(t, Body::Mars, Body::Sun, &request).expect("lookup"));
            }
        })
    });
}

criterion_group!(benches, bench_lookup, bench_random_times);
criterion_main!(benches);
