//! Non-local means denoising.
//!
//! Every output pixel is a weighted average of the candidates inside a
//! search window around it. A candidate's weight is a Gaussian of the mean
//! squared difference between the template patch around the candidate and
//! the template patch around the target, looked up in a precomputed
//! [`WeightTable`].
//!
//! Reference: A. Buades, B. Coll, J.M. Morel, "A non-local algorithm for
//! image denoising", CVPR 2005.
//!
//! ## Supported Formats
//!
//! - **Grayscale**: (height, width, 1) - processes the single channel
//! - **Two channel**: (height, width, 2) - both channels compared jointly
//! - **RGB**: (height, width, 3) - all 3 channels compared jointly
//! - **RGBA**: (height, width, 4) - processes RGB, preserves alpha
//!
//! Rows are independent and are spread over the rayon pool unless
//! [`NlMeansParams::parallel`] is off. Results are identical either way.

use std::time::Instant;

use ndarray::{s, Array3, ArrayView3, ArrayViewMut2, ArrayViewMut3, Axis};
use rayon::prelude::*;
use tracing::{debug, debug_span, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::color_science::{lab_to_rgb_u8, rgb_to_lab_u8};
use super::core::{pad_u8, BorderMode, WeightTable};
use crate::error::{FilterError, FilterResult};

// ============================================================================
// Parameters
// ============================================================================

/// Parameters for the non-local means filters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NlMeansParams {
    /// Side of the patch compared between target and candidate (odd)
    pub template_window_size: usize,
    /// Side of the neighbourhood candidates are drawn from (odd, > template)
    pub search_window_size: usize,
    /// Filter strength; larger values average over less similar patches
    pub h: f32,
    /// Distance offset of the weight curve; 0 means "use `h`"
    pub sigma: f32,
    /// Chroma strength, only used by [`nl_means_colored_u8`]
    pub h_color: f32,
    /// Edge policy for the padded working image
    pub border: BorderMode,
    /// Process rows on the rayon pool
    pub parallel: bool,
}

impl Default for NlMeansParams {
    fn default() -> Self {
        Self {
            template_window_size: 3,
            search_window_size: 7,
            h: 3.0,
            sigma: 0.0,
            h_color: 10.0,
            border: BorderMode::Reflect101,
            parallel: true,
        }
    }
}

impl NlMeansParams {
    pub fn new(template_window_size: usize, search_window_size: usize, h: f32) -> Self {
        Self {
            template_window_size,
            search_window_size,
            h,
            ..Self::default()
        }
    }

    /// Small windows for interactive use.
    pub fn fast() -> Self {
        Self::new(3, 5, 3.0)
    }

    /// Large windows; much slower, noticeably cleaner on heavy noise.
    pub fn high_quality() -> Self {
        Self::new(7, 21, 3.0)
    }

    pub fn with_sigma(mut self, sigma: f32) -> Self {
        self.sigma = sigma;
        self
    }

    pub fn with_h_color(mut self, h_color: f32) -> Self {
        self.h_color = h_color;
        self
    }

    pub fn with_border(mut self, border: BorderMode) -> Self {
        self.border = border;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sigma actually used for the weight table.
    pub fn effective_sigma(&self) -> f32 {
        if self.sigma == 0.0 {
            self.h
        } else {
            self.sigma
        }
    }

    /// Widen the search window to `template + 2` if it does not exceed the
    /// template window. Logs a warning when it changes anything.
    pub fn with_widened_search(mut self) -> Self {
        if self.search_window_size <= self.template_window_size {
            let widened = self.template_window_size + 2;
            warn!(
                template_window_size = self.template_window_size,
                requested = self.search_window_size,
                widened,
                "search window must exceed template window, widening"
            );
            self.search_window_size = widened;
        }
        self
    }

    /// Check window sizes and strengths.
    pub fn validate(&self) -> FilterResult<()> {
        for (name, size) in [
            ("template_window_size", self.template_window_size),
            ("search_window_size", self.search_window_size),
        ] {
            if size == 0 || size % 2 == 0 {
                return Err(FilterError::InvalidParameter(format!(
                    "{name} must be odd and non-zero, got {size}"
                )));
            }
        }

        if self.search_window_size <= self.template_window_size {
            return Err(FilterError::InvalidParameter(format!(
                "search_window_size ({}) must be larger than template_window_size ({})",
                self.search_window_size, self.template_window_size
            )));
        }

        if !(self.h.is_finite() && self.h > 0.0) {
            return Err(FilterError::InvalidParameter(format!(
                "h must be finite and positive, got {}",
                self.h
            )));
        }

        if !(self.sigma.is_finite() && self.sigma >= 0.0) {
            return Err(FilterError::InvalidParameter(format!(
                "sigma must be finite and non-negative, got {}",
                self.sigma
            )));
        }

        Ok(())
    }
}

/// Number of channels that take part in patch comparison.
fn color_channels(channels: usize) -> FilterResult<usize> {
    match channels {
        1..=3 => Ok(channels),
        4 => Ok(3),
        _ => Err(FilterError::UnsupportedChannels { channels }),
    }
}

// ============================================================================
// Kernel
// ============================================================================

#[inline]
fn saturate_u8(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Normalize candidate weights in place.
///
/// A zero total means every candidate fell past the table cutoff; the
/// centre candidate then takes all the weight.
fn normalize_weights(weights: &mut [f64], total: f64, center: usize) {
    if total == 0.0 {
        weights.fill(0.0);
        weights[center] = 1.0;
    } else {
        let inv = 1.0 / total;
        for w in weights.iter_mut() {
            *w *= inv;
        }
    }
}

/// Read-only state shared by all row tasks.
struct Kernel<'a> {
    padded: ArrayView3<'a, u8>,
    table: &'a WeightTable,
    template: usize,
    search: usize,
    channels: usize,
}

impl Kernel<'_> {
    /// Sum of squared differences between the patches whose top-left
    /// corners (in padded coordinates) are `target` and `candidate`.
    #[inline]
    fn patch_distance(&self, target: (usize, usize), candidate: (usize, usize)) -> usize {
        let mut e = 0usize;
        for n in 0..self.template {
            for m in 0..self.template {
                for c in 0..self.channels {
                    let d = self.padded[[candidate.0 + n, candidate.1 + m, c]] as i32
                        - self.padded[[target.0 + n, target.1 + m, c]] as i32;
                    e += (d * d) as usize;
                }
            }
        }
        e
    }

    fn denoise_row(&self, y: usize, mut row: ArrayViewMut2<u8>) {
        let search = self.search;
        let tr = self.template / 2;
        let sr = search / 2;
        let area = self.template * self.template;
        let center = search * search / 2;

        let mut weights = vec![0.0f64; search * search];
        let mut sums = vec![0.0f64; self.channels];

        for x in 0..row.len_of(Axis(0)) {
            let mut total = 0.0f64;
            for l in 0..search {
                for k in 0..search {
                    let e = self.patch_distance((y + sr, x + sr), (y + l, x + k));
                    let w = self.table.weight(e / area);
                    weights[l * search + k] = w;
                    total += w;
                }
            }
            normalize_weights(&mut weights, total, center);

            sums.fill(0.0);
            for l in 0..search {
                for k in 0..search {
                    let w = weights[l * search + k];
                    if w == 0.0 {
                        continue;
                    }
                    for (c, sum) in sums.iter_mut().enumerate() {
                        *sum += self.padded[[y + tr + l, x + tr + k, c]] as f64 * w;
                    }
                }
            }

            for (c, &sum) in sums.iter().enumerate() {
                row[[x, c]] = saturate_u8(sum);
            }
        }
    }
}

/// Denoise the first `channels` channels of `input` into `output`.
///
/// Parameters must already be validated and the image non-empty.
fn denoise(
    input: ArrayView3<u8>,
    mut output: ArrayViewMut3<u8>,
    channels: usize,
    h: f32,
    sigma: f32,
    params: &NlMeansParams,
) {
    let template = params.template_window_size;
    let search = params.search_window_size;
    let pad = template / 2 + search / 2;

    let padded = pad_u8(input.slice(s![.., .., ..channels]), pad, params.border);
    let table = WeightTable::new(h, sigma, channels);

    let kernel = Kernel {
        padded: padded.view(),
        table: &table,
        template,
        search,
        channels,
    };

    let process = |(y, row): (usize, ArrayViewMut2<u8>)| kernel.denoise_row(y, row);
    if params.parallel {
        output
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(process);
    } else {
        output.axis_iter_mut(Axis(0)).enumerate().for_each(process);
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Apply non-local means denoising - u8 version.
///
/// # Arguments
/// * `input` - Image with 1, 2, 3, or 4 channels (height, width, channels)
/// * `params` - Window sizes and strengths
///
/// # Returns
/// Denoised image with same shape
///
/// # Errors
/// * `InvalidParameter` - windows not odd, search not larger than template,
///   `h` not positive or `sigma` negative
/// * `UnsupportedChannels` - zero or more than 4 channels
pub fn nl_means_u8(input: ArrayView3<u8>, params: &NlMeansParams) -> FilterResult<Array3<u8>> {
    let mut output = Array3::<u8>::zeros(input.dim());
    nl_means_into_u8(input, output.view_mut(), params)?;
    Ok(output)
}

/// Apply non-local means denoising into a caller-supplied buffer.
///
/// The output is only written after all checks pass; on error it is left
/// exactly as it was.
///
/// # Errors
/// As [`nl_means_u8`], plus `ShapeMismatch` when `output` differs in shape.
pub fn nl_means_into_u8(
    input: ArrayView3<u8>,
    mut output: ArrayViewMut3<u8>,
    params: &NlMeansParams,
) -> FilterResult<()> {
    params.validate()?;
    let (height, width, channels) = input.dim();
    let color_channels = color_channels(channels)?;
    if output.dim() != input.dim() {
        return Err(FilterError::ShapeMismatch {
            expected: input.dim(),
            actual: output.dim(),
        });
    }
    if height == 0 || width == 0 {
        return Ok(());
    }

    let _span = debug_span!("nl_means", height, width, channels).entered();
    let started = Instant::now();

    denoise(
        input,
        output.view_mut(),
        color_channels,
        params.h,
        params.effective_sigma(),
        params,
    );
    if channels == 4 {
        output
            .slice_mut(s![.., .., 3])
            .assign(&input.slice(s![.., .., 3]));
    }

    debug!(
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "non-local means finished"
    );
    Ok(())
}

/// Apply non-local means denoising in CIELab space - u8 version.
///
/// Luminance is filtered with `params.h`, the a/b chroma planes jointly
/// with `params.h_color`. Grayscale input is filtered as plain luminance.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `params` - Window sizes and strengths
///
/// # Returns
/// Denoised image with same shape; alpha copied unchanged
///
/// # Errors
/// As [`nl_means_u8`], plus `InvalidParameter` for a non-positive `h_color`
/// and `UnsupportedChannels` for 2-channel input.
pub fn nl_means_colored_u8(
    input: ArrayView3<u8>,
    params: &NlMeansParams,
) -> FilterResult<Array3<u8>> {
    params.validate()?;
    if !(params.h_color.is_finite() && params.h_color > 0.0) {
        return Err(FilterError::InvalidParameter(format!(
            "h_color must be finite and positive, got {}",
            params.h_color
        )));
    }

    let (height, width, channels) = input.dim();
    match channels {
        1 => {
            debug!("single channel input, denoising luminance only");
            return nl_means_u8(input, params);
        }
        3 | 4 => {}
        _ => return Err(FilterError::UnsupportedChannels { channels }),
    }

    let mut output = Array3::<u8>::zeros(input.dim());
    if height == 0 || width == 0 {
        return Ok(output);
    }

    let _span = debug_span!("nl_means_colored", height, width, channels).entered();
    let started = Instant::now();

    let lab = rgb_to_lab_u8(input)?;
    let mut denoised = Array3::<u8>::zeros((height, width, 3));
    {
        let (luminance, chroma) = denoised.view_mut().split_at(Axis(2), 1);
        denoise(
            lab.slice(s![.., .., 0..1]),
            luminance,
            1,
            params.h,
            params.effective_sigma(),
            params,
        );
        denoise(
            lab.slice(s![.., .., 1..3]),
            chroma,
            2,
            params.h_color,
            params.h_color,
            params,
        );
    }

    let rgb = lab_to_rgb_u8(denoised.view())?;
    output.slice_mut(s![.., .., 0..3]).assign(&rgb);
    if channels == 4 {
        output
            .slice_mut(s![.., .., 3])
            .assign(&input.slice(s![.., .., 3]));
    }

    debug!(
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "coloured non-local means finished"
    );
    Ok(output)
}
