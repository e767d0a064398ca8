//! # raster-trace
//!
//! Turns a decoded RGBA pixel buffer into an SVG document of filled,
//! palette-colored regions.
//!
//! ## Pipeline
//!
//! - **Preprocess**: optional blur, grayscale or monochrome
//! - **Quantize**: median-cut palette of bounded size
//! - **Index / layer**: nearest palette entry per pixel, one mask per color
//! - **Trace**: boundary-following contours (or merged rectangles)
//! - **Simplify**: Ramer-Douglas-Peucker with a distance tolerance
//! - **Emit**: SVG with scale, precision, viewBox and title options
//!
//! ## Example
//!
//! ```rust,ignore
//! use raster_trace::{VectorizeOptions, vectorize_rgba};
//!
//! let rgba: Vec<u8> = decode_somehow();
//! let result = vectorize_rgba(&rgba, 64, 48, &VectorizeOptions::default()).unwrap();
//! std::fs::write("output.svg", result.svg).unwrap();
//! ```

pub mod embed;
pub mod error;
pub mod vectorize;

// Re-export commonly used items
pub use embed::svg_data_uri;
pub use error::TraceError;
pub use vectorize::{
    PaletteEntry, TraceMode, TraceStrategy, TracedLayer, VectorizeOptions, VectorizeResult,
    vectorize_image, vectorize_rgba,
};
