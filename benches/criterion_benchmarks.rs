use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use jimdecomp::engine::decode;
use jimdecomp::scan::{OffsetScanner, ScanConfig, ScoreWeights, score};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random but well-formed payload that decodes to roughly `size` bytes.
fn gen_payload(size: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(size / 2);
    let mut produced = 0usize;
    while produced < size {
        match rng.random_range(0..4u8) {
            0 => {
                let n = rng.random_range(1..=16usize);
                out.push((n - 1) as u8);
                out.extend((0..n).map(|_| rng.random::<u8>()));
                produced += n;
            }
            1 => {
                let low = rng.random_range(0..16u8);
                out.extend_from_slice(&[0x30 | low, rng.random()]);
                produced += low as usize + 3;
            }
            2 => {
                let low = rng.random_range(0..16u8);
                out.extend_from_slice(&[0x50 | low, rng.random_range(1..=255u8)]);
                produced += low as usize + 1;
            }
            _ => {
                let extra = rng.random::<u8>();
                out.extend_from_slice(&[0x81, extra, rng.random()]);
                produced += 256 + extra as usize;
            }
        }
    }
    out.push(0xFF);
    out
}

fn gen_container(header: usize, size: usize, seed: u64) -> Vec<u8> {
    let mut file = vec![0xFF; header];
    file.extend(gen_payload(size, seed));
    file
}

fn bench_decoding_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("decoding_speed_mb_s");
    for size in [64 * 1024usize, 1024 * 1024, 8 * 1024 * 1024] {
        let payload = gen_payload(size, 1);
        let out_len = decode(&payload, 0).output.len();
        g.throughput(Throughput::Bytes(out_len as u64));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let result = decode(black_box(&payload), 0);
                black_box(result);
            });
        });
    }
    g.finish();
}

fn bench_scan_cost(c: &mut Criterion) {
    let mut g = c.benchmark_group("scan_cost_vs_range");
    let file = gen_container(32, 256 * 1024, 2);
    for max_offset in [16usize, 64, 256] {
        let scanner = OffsetScanner::new(ScanConfig::up_to(max_offset));
        g.bench_with_input(
            BenchmarkId::from_parameter(max_offset),
            &max_offset,
            |b, _| {
                b.iter(|| {
                    let best = scanner.best(black_box(&file));
                    black_box(best);
                });
            },
        );
    }

    let curated = OffsetScanner::new(ScanConfig::curated());
    g.bench_function("curated", |b| {
        b.iter(|| {
            let best = curated.best(black_box(&file));
            black_box(best);
        });
    });
    g.finish();
}

fn bench_scoring(c: &mut Criterion) {
    let mut g = c.benchmark_group("scoring_speed");
    let weights = ScoreWeights::default();
    for size in [4 * 1024usize, 64 * 1024, 1024 * 1024] {
        let output = decode(&gen_payload(size, 3), 0).output;
        g.throughput(Throughput::Bytes(output.len() as u64));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(score(black_box(&output), &weights)));
        });
    }
    g.finish();
}

criterion_group!(benches, bench_decoding_speed, bench_scan_cost, bench_scoring);
criterion_main!(benches);
