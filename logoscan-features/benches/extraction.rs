use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use logoscan_core::Frame;
use logoscan_core::config::{DescriptorKind, DetectorConfig};
use logoscan_features::FeatureExtractor;

/// RGB frame with a grid of bright squares, enough corners to exercise the
/// full pipeline
fn create_benchmark_frame(size: u32) -> Frame {
    let mut data = vec![45u8; (size * size * 3) as usize];
    for square_y in (8..size.saturating_sub(16)).step_by(20) {
        for square_x in (8..size.saturating_sub(16)).step_by(20) {
            for y in square_y..square_y + 10 {
                for x in square_x..square_x + 10 {
                    let idx = ((y * size + x) * 3) as usize;
                    data[idx] = 225;
                    data[idx + 1] = 225;
                    data[idx + 2] = 225;
                }
            }
        }
    }
    Frame::new(size, size, data)
}

fn bench_extraction_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction_sizes");
    let extractor = FeatureExtractor::new(DetectorConfig::default()).unwrap();

    for size in [128u32, 256, 512] {
        let frame = create_benchmark_frame(size);
        group.bench_with_input(BenchmarkId::new("binary", size), &frame, |b, frame| {
            b.iter(|| extractor.extract(black_box(frame)).unwrap());
        });
    }
    group.finish();
}

fn bench_descriptor_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("descriptor_backends");
    let frame = create_benchmark_frame(256);

    for (name, kind) in [
        ("binary", DescriptorKind::Binary),
        ("gradient", DescriptorKind::Gradient),
    ] {
        let cfg = DetectorConfig {
            descriptor: kind,
            ..DetectorConfig::default()
        };
        let extractor = FeatureExtractor::new(cfg).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| extractor.extract(black_box(&frame)).unwrap());
        });
    }
    group.finish();
}

fn bench_single_level_vs_pyramid(c: &mut Criterion) {
    let mut group = c.benchmark_group("pyramid_depth");
    let frame = create_benchmark_frame(512);

    for levels in [1usize, 4] {
        let cfg = DetectorConfig {
            levels,
            ..DetectorConfig::default()
        };
        let extractor = FeatureExtractor::new(cfg).unwrap();
        group.bench_with_input(BenchmarkId::new("levels", levels), &frame, |b, frame| {
            b.iter(|| extractor.extract(black_box(frame)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_extraction_sizes,
    bench_descriptor_backends,
    bench_single_level_vs_pyramid
);
criterion_main!(benches);
