//! Filter modules for image denoising.
//!
//! ## Supported Formats
//!
//! All filters accept u8 images shaped `(height, width, channels)`:
//!
//! | Format | Shape | Description |
//! |--------|-------|-------------|
//! | Grayscale8 | (H, W, 1) | Single luminance channel, 0-255 |
//! | RGB8 | (H, W, 3) | Red, green, blue, 0-255 |
//! | RGBA8 | (H, W, 4) | RGB + alpha, alpha passed through |
//!
//! ## Architecture
//!
//! - **Validated up front** - Parameters are checked before any output is written
//! - **Per-call state** - Padded image and weight table live for one call only
//! - **Thread-safe** - Rows are processed in parallel with rayon
//!
//! ## Modules
//!
//! - **core**: border padding, Gaussian weight table
//! - **nlmeans**: non-local means, plain and CIELab variants
//! - **color_science**: RGB <-> 8-bit Lab conversion

pub mod color_science;
pub mod core;
pub mod nlmeans;
