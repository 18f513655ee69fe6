//! Benchmarks for non-local means denoising
//!
//! Compares grayscale, RGB and CIELab variants, parallel vs sequential rows

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array3;
use nlm_denoise::{nl_means_colored_u8, nl_means_u8, NlMeansParams};
use std::time::Duration;

/// Gradient with a hashed noise term, stable across runs
fn create_noisy_image(size: usize, channels: usize) -> Array3<u8> {
    Array3::from_shape_fn((size, size, channels), |(y, x, c)| {
        let hash = (x * 73_856_093) ^ (y * 19_349_663) ^ (c * 83_492_791);
        let noise = (hash % 41) as i32 - 20;
        ((x * 255 / size) as i32 + noise).clamp(0, 255) as u8
    })
}

fn benchmark_nl_means(c: &mut Criterion) {
    let mut group = c.benchmark_group("nl_means");
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(20);

    for size in [64usize, 128] {
        for channels in [1usize, 3] {
            let image = create_noisy_image(size, channels);

            for parallel in [true, false] {
                let params = NlMeansParams::default().with_parallel(parallel);
                let mode = if parallel { "parallel" } else { "sequential" };

                group.bench_with_input(
                    BenchmarkId::new(format!("{}ch_{}", channels, mode), format!("{}x{}", size, size)),
                    &image,
                    |b, img| {
                        b.iter(|| nl_means_u8(black_box(img.view()), &params));
                    },
                );
            }
        }
    }

    group.finish();
}

fn benchmark_nl_means_colored(c: &mut Criterion) {
    let mut group = c.benchmark_group("nl_means_colored");
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(20);

    let image = create_noisy_image(128, 3);
    let params = NlMeansParams::default();
    group.bench_function("128x128", |b| {
        b.iter(|| nl_means_colored_u8(black_box(image.view()), &params));
    });

    group.finish();
}

criterion_group!(benches, benchmark_nl_means, benchmark_nl_means_colored);
criterion_main!(benches);
