//! Color science: RGB <-> CIELab conversion.
//!
//! Lab is stored in 8 bits per channel using the common encoding
//! `L * 255 / 100`, `a + 128`, `b + 128`, so Lab images can go straight
//! through the u8 filters.
//!
//! ## Supported Formats
//!
//! - **RGB**: (height, width, 3) - converts all 3 channels
//! - **RGBA**: (height, width, 4) - converts RGB, preserves alpha
//!
//! Grayscale input is rejected: there is no chroma to convert.

use ndarray::{Array3, ArrayView3};

use crate::error::{FilterError, FilterResult};

// D65 reference white
const WHITE_X: f32 = 0.95047;
const WHITE_Z: f32 = 1.08883;

const EPSILON: f32 = 0.008856;
const KAPPA_SLOPE: f32 = 7.787;
const F_OFFSET: f32 = 16.0 / 116.0;
// f(EPSILON), the point where the inverse switches branches
const F_EPSILON: f32 = 0.206893;

#[inline]
fn srgb_to_linear(v: f32) -> f32 {
    if v > 0.04045 {
        ((v + 0.055) / 1.055).powf(2.4)
    } else {
        v / 12.92
    }
}

#[inline]
fn linear_to_srgb(v: f32) -> f32 {
    if v > 0.0031308 {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    } else {
        v * 12.92
    }
}

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > EPSILON {
        t.cbrt()
    } else {
        KAPPA_SLOPE * t + F_OFFSET
    }
}

#[inline]
fn lab_f_inv(t: f32) -> f32 {
    if t > F_EPSILON {
        t * t * t
    } else {
        (t - F_OFFSET) / KAPPA_SLOPE
    }
}

/// Convert one sRGB pixel to CIELab (L in 0-100, a/b roughly -128..127).
pub fn rgb_to_lab(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let r = srgb_to_linear(r as f32 / 255.0);
    let g = srgb_to_linear(g as f32 / 255.0);
    let b = srgb_to_linear(b as f32 / 255.0);

    let x = (r * 0.4124564 + g * 0.3575761 + b * 0.1804375) / WHITE_X;
    let y = r * 0.2126729 + g * 0.7151522 + b * 0.0721750;
    let z = (r * 0.0193339 + g * 0.1191920 + b * 0.9503041) / WHITE_Z;

    let fx = lab_f(x);
    let fy = lab_f(y);
    let fz = lab_f(z);

    (116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
}

/// Convert one CIELab pixel back to sRGB, saturating out-of-gamut values.
pub fn lab_to_rgb(l: f32, a: f32, b: f32) -> (u8, u8, u8) {
    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;

    let x = lab_f_inv(fx) * WHITE_X;
    let y = lab_f_inv(fy);
    let z = lab_f_inv(fz) * WHITE_Z;

    let r = 3.2404542 * x - 1.5371385 * y - 0.4985314 * z;
    let g = -0.9692660 * x + 1.8760108 * y + 0.0415560 * z;
    let bl = 0.0556434 * x - 0.2040259 * y + 1.0572252 * z;

    let to_u8 = |v: f32| (linear_to_srgb(v.max(0.0)) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_u8(r), to_u8(g), to_u8(bl))
}

fn check_color_channels(channels: usize) -> FilterResult<()> {
    if channels == 3 || channels == 4 {
        Ok(())
    } else {
        Err(FilterError::UnsupportedChannels { channels })
    }
}

/// Convert an RGB/RGBA u8 image to 8-bit Lab.
///
/// # Arguments
/// * `input` - Image with 3 or 4 channels (height, width, channels)
///
/// # Returns
/// Lab image with same channel count; alpha copied unchanged
pub fn rgb_to_lab_u8(input: ArrayView3<u8>) -> FilterResult<Array3<u8>> {
    let (height, width, channels) = input.dim();
    check_color_channels(channels)?;
    let mut output = Array3::<u8>::zeros((height, width, channels));

    for y in 0..height {
        for x in 0..width {
            let (l, a, b) = rgb_to_lab(input[[y, x, 0]], input[[y, x, 1]], input[[y, x, 2]]);
            output[[y, x, 0]] = (l * 255.0 / 100.0).round().clamp(0.0, 255.0) as u8;
            output[[y, x, 1]] = (a + 128.0).round().clamp(0.0, 255.0) as u8;
            output[[y, x, 2]] = (b + 128.0).round().clamp(0.0, 255.0) as u8;
            if channels == 4 {
                output[[y, x, 3]] = input[[y, x, 3]];
            }
        }
    }

    Ok(output)
}

/// Convert an 8-bit Lab image back to RGB/RGBA u8.
///
/// # Arguments
/// * `input` - 8-bit Lab image with 3 or 4 channels (height, width, channels)
///
/// # Returns
/// RGB image with same channel count; alpha copied unchanged
pub fn lab_to_rgb_u8(input: ArrayView3<u8>) -> FilterResult<Array3<u8>> {
    let (height, width, channels) = input.dim();
    check_color_channels(channels)?;
    let mut output = Array3::<u8>::zeros((height, width, channels));

    for y in 0..height {
        for x in 0..width {
            let l = input[[y, x, 0]] as f32 * 100.0 / 255.0;
            let a = input[[y, x, 1]] as f32 - 128.0;
            let b = input[[y, x, 2]] as f32 - 128.0;
            let (r, g, bl) = lab_to_rgb(l, a, b);
            output[[y, x, 0]] = r;
            output[[y, x, 1]] = g;
            output[[y, x, 2]] = bl;
            if channels == 4 {
                output[[y, x, 3]] = input[[y, x, 3]];
            }
        }
    }

    Ok(output)
}
