//! WebAssembly exports for the denoising filters.
//!
//! These functions are exposed to JavaScript via wasm-bindgen and work on
//! flat, interleaved u8 buffers (length = width * height * channels).
//! Errors are thrown as JavaScript exceptions carrying the error message.

use ndarray::{Array3, ArrayView3};
use wasm_bindgen::prelude::*;

use crate::error::{FilterError, FilterResult};
use crate::filters::nlmeans::{nl_means_colored_u8, nl_means_u8, NlMeansParams};

fn view_flat(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
) -> FilterResult<ArrayView3<'_, u8>> {
    let expected = width * height * channels;
    if data.len() != expected {
        return Err(FilterError::InvalidBuffer {
            expected,
            actual: data.len(),
        });
    }
    ArrayView3::from_shape((height, width, channels), data).map_err(|_| {
        FilterError::InvalidBuffer {
            expected,
            actual: data.len(),
        }
    })
}

fn to_js(err: FilterError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn into_flat(image: Array3<u8>) -> Vec<u8> {
    image.into_raw_vec_and_offset().0
}

// ============================================================================
// Non-Local Means
// ============================================================================

/// Denoise a flat u8 image with non-local means.
///
/// # Arguments
/// * `data` - Flat interleaved samples (length = width * height * channels)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `channels` - 1, 2, 3, or 4 (alpha preserved)
/// * `template_window_size` - Patch side, odd
/// * `search_window_size` - Search side, odd and larger than the patch
/// * `h` - Filter strength
/// * `sigma` - Weight curve offset, 0.0 uses `h`
///
/// # Returns
/// Flat array of denoised samples in the same layout
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn nl_means_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    template_window_size: usize,
    search_window_size: usize,
    h: f32,
    sigma: f32,
) -> Result<Vec<u8>, JsValue> {
    let input = view_flat(data, width, height, channels).map_err(to_js)?;
    let params = NlMeansParams::new(template_window_size, search_window_size, h)
        .with_sigma(sigma);
    nl_means_u8(input, &params).map(into_flat).map_err(to_js)
}

/// Denoise a flat RGB/RGBA u8 image in CIELab space.
///
/// Luminance uses `h`, chroma uses `h_color`.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn nl_means_colored_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    template_window_size: usize,
    search_window_size: usize,
    h: f32,
    h_color: f32,
) -> Result<Vec<u8>, JsValue> {
    let input = view_flat(data, width, height, channels).map_err(to_js)?;
    let params = NlMeansParams::new(template_window_size, search_window_size, h)
        .with_h_color(h_color);
    nl_means_colored_u8(input, &params)
        .map(into_flat)
        .map_err(to_js)
}
