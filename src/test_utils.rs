//! Fixtures shared by the unit tests.

use ndarray::Array3;

/// SplitMix64; deterministic so fixtures are identical on every run.
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    fn new(seed: u64) -> Self {
        SplitMix64 { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform integer in `-amplitude..=amplitude`.
    fn next_offset(&mut self, amplitude: u8) -> i32 {
        let span = 2 * amplitude as u64 + 1;
        (self.next_u64() % span) as i32 - amplitude as i32
    }
}

/// Constant `base` image with independent uniform noise on every sample.
pub fn noisy_image(
    height: usize,
    width: usize,
    channels: usize,
    base: u8,
    amplitude: u8,
    seed: u64,
) -> Array3<u8> {
    let mut rng = SplitMix64::new(seed);
    Array3::from_shape_simple_fn((height, width, channels), || {
        (base as i32 + rng.next_offset(amplitude)).clamp(0, 255) as u8
    })
}

/// Image whose samples are multiples of 40, so any two template patches
/// are either identical or differ by at least 40 in some sample.
pub fn distinct_patch_image(height: usize, width: usize, channels: usize) -> Array3<u8> {
    Array3::from_shape_fn((height, width, channels), |(y, x, c)| {
        (((x * 7 + y * 13 + c * 5) % 6) * 40) as u8
    })
}

/// Mean of the 3x3 neighbourhood variance over interior pixels of one channel.
pub fn local_variance(image: &Array3<u8>, channel: usize) -> f64 {
    let (height, width, _) = image.dim();
    let mut total = 0.0;
    let mut count = 0usize;

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            let mut sum = 0.0;
            let mut sum_sq = 0.0;
            for dy in 0..3 {
                for dx in 0..3 {
                    let v = image[[y + dy - 1, x + dx - 1, channel]] as f64;
                    sum += v;
                    sum_sq += v * v;
                }
            }
            let mean = sum / 9.0;
            total += sum_sq / 9.0 - mean * mean;
            count += 1;
        }
    }

    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
