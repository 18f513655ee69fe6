//! NLM Denoise
//!
//! Non-local means image denoising implemented in Rust
//! with Python bindings via PyO3 and WASM bindings for JavaScript.
//!
//! ## Image Format
//! Filters work on `ndarray` u8 images shaped `(height, width, channels)`:
//! - **Grayscale**: (height, width, 1) - single channel
//! - **RGB**: (height, width, 3) - 3 color channels
//! - **RGBA**: (height, width, 4) - 3 color channels + alpha (passed through)
//!
//! ## Example
//!
//! ```
//! use ndarray::Array3;
//! use nlm_denoise::{nl_means_u8, NlMeansParams};
//!
//! let image = Array3::<u8>::from_elem((16, 16, 3), 90);
//! let denoised = nl_means_u8(image.view(), &NlMeansParams::default()).unwrap();
//! assert_eq!(denoised, image);
//! ```
//!
//! ## Features
//! - `python`: PyO3 extension module `nlm_denoise`
//! - `wasm`: wasm-bindgen exports over flat buffers
//! - `serde`: `Serialize`/`Deserialize` for [`NlMeansParams`] and [`BorderMode`]

pub mod error;
pub mod filters;

#[cfg(feature = "wasm")]
pub mod wasm;

#[cfg(test)]
mod test_utils;

pub use error::{FilterError, FilterResult};
pub use filters::color_science::{lab_to_rgb_u8, rgb_to_lab_u8};
pub use filters::core::{BorderMode, WeightTable};
pub use filters::nlmeans::{nl_means_colored_u8, nl_means_into_u8, nl_means_u8, NlMeansParams};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::prelude::*;

    use crate::filters::nlmeans::{self, NlMeansParams};

    // ========================================================================
    // Non-Local Means
    // ========================================================================

    /// Denoise a u8 image with non-local means.
    ///
    /// # Arguments
    /// * `image` - Image with 1, 2, 3, or 4 channels (height, width, channels)
    /// * `template_window_size` - Patch side, odd (default: 3)
    /// * `search_window_size` - Search side, odd and larger than the patch (default: 7)
    /// * `h` - Filter strength (default: 3.0)
    /// * `sigma` - Weight curve offset, 0.0 uses `h` (default: 0.0)
    ///
    /// Raises `ValueError` for invalid parameters or channel counts.
    #[pyfunction]
    #[pyo3(signature = (image, template_window_size=3, search_window_size=7, h=3.0, sigma=0.0))]
    pub fn nl_means<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        template_window_size: usize,
        search_window_size: usize,
        h: f32,
        sigma: f32,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let params = NlMeansParams::new(template_window_size, search_window_size, h)
            .with_sigma(sigma);
        let result = nlmeans::nl_means_u8(image.as_array(), &params)?;
        Ok(result.into_pyarray(py))
    }

    /// Denoise an RGB/RGBA u8 image in CIELab space.
    ///
    /// Luminance uses `h`, chroma uses `h_color`. Grayscale input is
    /// filtered as luminance only.
    #[pyfunction]
    #[pyo3(signature = (image, h=3.0, h_color=10.0, template_window_size=3, search_window_size=7))]
    pub fn nl_means_colored<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        h: f32,
        h_color: f32,
        template_window_size: usize,
        search_window_size: usize,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let params = NlMeansParams::new(template_window_size, search_window_size, h)
            .with_h_color(h_color);
        let result = nlmeans::nl_means_colored_u8(image.as_array(), &params)?;
        Ok(result.into_pyarray(py))
    }

    /// NLM Denoise extension module
    #[pymodule]
    pub fn nlm_denoise(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(nl_means, m)?)?;
        m.add_function(wrap_pyfunction!(nl_means_colored, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::nlm_denoise;
