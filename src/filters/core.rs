//! Core utilities shared by the denoising filters.
//!
//! This module provides:
//! - Border padding with selectable edge policy
//! - The precomputed Gaussian weight table for patch distances

use ndarray::{Array3, ArrayView3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Border Padding
// ============================================================================

/// Edge policy used when padding an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BorderMode {
    /// Mirror without repeating the edge sample: `dcb|abcd|cba`.
    #[default]
    Reflect101,
    /// Repeat the edge sample: `aaa|abcd|ddd`.
    Replicate,
}

/// Map a possibly out-of-range coordinate onto `0..len`.
///
/// Reflection repeats until the coordinate lands inside, so borders wider
/// than the image are still well defined. `len` must be non-zero.
#[inline]
pub fn border_index(pos: isize, len: usize, mode: BorderMode) -> usize {
    let n = len as isize;
    if (0..n).contains(&pos) {
        return pos as usize;
    }

    match mode {
        BorderMode::Replicate => pos.clamp(0, n - 1) as usize,
        BorderMode::Reflect101 => {
            if n == 1 {
                return 0;
            }
            let mut p = pos;
            while p < 0 || p >= n {
                p = if p < 0 { -p } else { 2 * n - p - 2 };
            }
            p as usize
        }
    }
}

/// Pad an image by `pad` pixels on every side.
///
/// # Arguments
/// * `input` - Image with any channel count (height, width, channels), non-empty
/// * `pad` - Border width in pixels
/// * `mode` - Edge policy for the border samples
///
/// # Returns
/// Image of shape (height + 2*pad, width + 2*pad, channels)
pub fn pad_u8(input: ArrayView3<u8>, pad: usize, mode: BorderMode) -> Array3<u8> {
    let (height, width, channels) = input.dim();
    let offset = pad as isize;

    Array3::from_shape_fn(
        (height + 2 * pad, width + 2 * pad, channels),
        |(y, x, c)| {
            let sy = border_index(y as isize - offset, height, mode);
            let sx = border_index(x as isize - offset, width, mode);
            input[[sy, sx, c]]
        },
    )
}

// ============================================================================
// Weight Table
// ============================================================================

/// Precomputed Gaussian weights indexed by mean squared patch distance.
///
/// Logical size is `256 * 256 * channels`. Entries at or past the first
/// index whose weight drops below [`WeightTable::CUTOFF`] are zero; only the
/// non-zero prefix is stored.
#[derive(Debug, Clone)]
pub struct WeightTable {
    weights: Vec<f64>,
    len: usize,
}

impl WeightTable {
    /// Weights below this value are truncated to zero.
    pub const CUTOFF: f64 = 0.001;

    /// Build the table for filter strength `h` and Gaussian offset `sigma`.
    ///
    /// Distances up to `2 * sigma^2` map to full weight; beyond that the
    /// weight decays as `exp(-(d - 2 sigma^2) / (channels * h^2))`.
    pub fn new(h: f32, sigma: f32, channels: usize) -> Self {
        let len = 256 * 256 * channels;
        let h = h as f64;
        let sigma = sigma as f64;
        let offset = 2.0 * sigma * sigma;
        let coeff = -1.0 / (channels as f64 * h * h);

        let mut weights = Vec::new();
        for i in 0..len {
            let v = ((i as f64 - offset).max(0.0) * coeff).exp();
            if v < Self::CUTOFF {
                break;
            }
            weights.push(v);
        }

        WeightTable { weights, len }
    }

    /// Weight for a quantized distance; zero past the cutoff.
    #[inline]
    pub fn weight(&self, index: usize) -> f64 {
        self.weights.get(index).copied().unwrap_or(0.0)
    }

    /// First index whose weight is zero.
    pub fn cutoff(&self) -> usize {
        self.weights.len()
    }

    /// Logical table size (`256 * 256 * channels`).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_border_index_reflect101() {
        assert_eq!(border_index(-1, 5, BorderMode::Reflect101), 1);
        assert_eq!(border_index(-2, 5, BorderMode::Reflect101), 2);
        assert_eq!(border_index(5, 5, BorderMode::Reflect101), 3);
        assert_eq!(border_index(6, 5, BorderMode::Reflect101), 2);
        assert_eq!(border_index(3, 5, BorderMode::Reflect101), 3);
    }

    #[test]
    fn test_border_index_reflect101_wider_than_image() {
        // len 2: pattern ...0 1 0 1 0 1...
        assert_eq!(border_index(-3, 2, BorderMode::Reflect101), 1);
        assert_eq!(border_index(4, 2, BorderMode::Reflect101), 0);
        assert_eq!(border_index(-7, 1, BorderMode::Reflect101), 0);
    }

    #[test]
    fn test_border_index_replicate() {
        assert_eq!(border_index(-3, 5, BorderMode::Replicate), 0);
        assert_eq!(border_index(7, 5, BorderMode::Replicate), 4);
    }

    #[test]
    fn test_pad_u8_shape_and_edges() {
        let mut img = Array3::<u8>::zeros((2, 3, 1));
        for x in 0..3 {
            img[[0, x, 0]] = 10 * (x as u8 + 1);
            img[[1, x, 0]] = 100 + x as u8;
        }

        let padded = pad_u8(img.view(), 1, BorderMode::Replicate);
        assert_eq!(padded.dim(), (4, 5, 1));
        assert_eq!(padded[[0, 0, 0]], 10);
        assert_eq!(padded[[3, 4, 0]], 102);

        let padded = pad_u8(img.view(), 1, BorderMode::Reflect101);
        // Row -1 mirrors row 1, column -1 mirrors column 1
        assert_eq!(padded[[0, 0, 0]], 101);
        assert_eq!(padded[[1, 1, 0]], 10);
    }

    #[test]
    fn test_weight_table_flat_region() {
        let table = WeightTable::new(10.0, 10.0, 1);
        assert_eq!(table.len(), 256 * 256);
        assert_eq!(table.weight(0), 1.0);
        // Everything below 2 * sigma^2 = 200 keeps full weight
        assert_eq!(table.weight(199), 1.0);
        assert!(table.weight(300) < 1.0);
    }

    #[test]
    fn test_weight_table_truncates() {
        let table = WeightTable::new(10.0, 10.0, 1);
        let cutoff = table.cutoff();
        assert!(cutoff < table.len());
        assert!(table.weight(cutoff - 1) >= WeightTable::CUTOFF);
        assert_eq!(table.weight(cutoff), 0.0);
        assert_eq!(table.weight(table.len() - 1), 0.0);
    }

    #[test]
    fn test_weight_table_support_grows_with_h() {
        let narrow = WeightTable::new(3.0, 3.0, 3);
        let wide = WeightTable::new(20.0, 20.0, 3);
        assert!(wide.cutoff() > narrow.cutoff());
    }
}
