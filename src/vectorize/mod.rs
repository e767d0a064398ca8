//! Image vectorization module
//!
//! Converts a decoded RGBA pixel buffer into an SVG document of filled,
//! palette-colored regions.
//!
//! The conversion process:
//! 1. Preprocess pixels (optional blur, grayscale or monochrome)
//! 2. Build a palette with median-cut quantization
//! 3. Map every pixel to its nearest palette entry
//! 4. Split the indexed image into one mask per palette entry
//! 5. Trace each mask into closed contours (or merged rectangles)
//! 6. Simplify contours with Ramer-Douglas-Peucker
//! 7. Assemble the SVG document

mod mask;
mod preprocess;
mod quantize;
mod rects;
mod simplify;
mod svg;
mod trace;

use std::fmt;
use std::str::FromStr;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::TraceError;

pub use mask::{ColorMask, IndexedImage, Layer, TRANSPARENT, index_pixels, separate_layers};
pub use preprocess::{blur, gaussian_kernel, grayscale, luma, monochrome};
pub use quantize::{ALPHA_CUTOFF, FALLBACK_GRAY, MAX_COLORS, PaletteEntry, median_cut};
pub use rects::{PixelRect, merge_rects, trace_layer_rects};
pub use simplify::{perpendicular_distance, simplify_path};
pub use svg::{DocumentOptions, assemble_svg, format_number, scaled_dimension};
pub use trace::{GridPoint, Path, is_boundary_pixel, trace_layer};

/// Palette cap applied in posterize mode
pub const POSTERIZE_MAX_COLORS: usize = 8;

/// Smallest accepted output scale
pub const MIN_SCALE: f64 = 0.001;

/// Largest accepted number of decimals in emitted coordinates
pub const MAX_PRECISION: u32 = 8;

/// How pixel colors are treated before quantization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceMode {
    #[default]
    Color,
    Grayscale,
    /// Black and white split at `threshold`; always two colors
    Monochrome,
    /// Color mode with a small palette
    Posterize,
}

impl FromStr for TraceMode {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "color" => Ok(TraceMode::Color),
            "grayscale" | "greyscale" => Ok(TraceMode::Grayscale),
            "monochrome" | "mono" => Ok(TraceMode::Monochrome),
            "posterize" => Ok(TraceMode::Posterize),
            _ => Err(TraceError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for TraceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TraceMode::Color => "color",
            TraceMode::Grayscale => "grayscale",
            TraceMode::Monochrome => "monochrome",
            TraceMode::Posterize => "posterize",
        };
        f.write_str(name)
    }
}

/// How a layer mask becomes geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceStrategy {
    /// Boundary-following contours, simplified with RDP
    #[default]
    Contour,
    /// Greedy axis-aligned rectangles; blocky but cheap
    Rects,
}

impl FromStr for TraceStrategy {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "contour" | "contours" => Ok(TraceStrategy::Contour),
            "rects" | "rect" | "rectangles" => Ok(TraceStrategy::Rects),
            _ => Err(TraceError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Options for image vectorization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VectorizeOptions {
    /// Target palette size (default: 16)
    pub color_count: usize,
    pub trace_mode: TraceMode,
    /// Luma cutoff for monochrome mode (default: 128)
    pub threshold: u8,
    /// Blur radius in pixels, 0 disables (default: 0)
    pub blur_radius: u32,
    /// Contours with fewer points are dropped (default: 0)
    pub path_omit_length: usize,
    /// RDP distance tolerance in pixels (default: 0.5)
    pub simplify_tolerance: f64,
    /// Output coordinate multiplier (default: 1.0)
    pub scale: f64,
    /// Decimal places for emitted coordinates (default: 2)
    pub round_precision: u32,
    /// Emit a viewBox attribute (default: true)
    pub view_box: bool,
    /// Emit title and desc elements (default: false)
    pub description: bool,
    /// Text of the title element
    pub title: String,
    pub strategy: TraceStrategy,
}

impl Default for VectorizeOptions {
    fn default() -> Self {
        Self {
            color_count: 16,
            trace_mode: TraceMode::Color,
            threshold: 128,
            blur_radius: 0,
            path_omit_length: 0,
            simplify_tolerance: 0.5,
            scale: 1.0,
            round_precision: 2,
            view_box: true,
            description: false,
            title: "Traced image".to_string(),
            strategy: TraceStrategy::Contour,
        }
    }
}

impl VectorizeOptions {
    /// Copy of the options with out-of-range values clamped
    pub fn normalized(&self) -> Self {
        let mut opts = self.clone();

        if !(1..=MAX_COLORS).contains(&opts.color_count) {
            let clamped = opts.color_count.clamp(1, MAX_COLORS);
            log::warn!("colorCount {} clamped to {}", opts.color_count, clamped);
            opts.color_count = clamped;
        }
        if !(opts.simplify_tolerance >= 0.0 && opts.simplify_tolerance.is_finite()) {
            log::warn!("simplifyTolerance {} clamped to 0", opts.simplify_tolerance);
            opts.simplify_tolerance = 0.0;
        }
        if !opts.scale.is_finite() {
            log::warn!("scale {} replaced with 1", opts.scale);
            opts.scale = 1.0;
        } else if opts.scale < MIN_SCALE {
            log::warn!("scale {} clamped to {}", opts.scale, MIN_SCALE);
            opts.scale = MIN_SCALE;
        }
        if opts.round_precision > MAX_PRECISION {
            log::warn!(
                "roundPrecision {} clamped to {}",
                opts.round_precision,
                MAX_PRECISION
            );
            opts.round_precision = MAX_PRECISION;
        }

        opts
    }

    /// Palette size the quantizer is asked for, after mode caps
    pub fn effective_color_count(&self) -> usize {
        let requested = self.color_count.clamp(1, MAX_COLORS);
        match self.trace_mode {
            TraceMode::Monochrome => 2,
            TraceMode::Posterize => requested.min(POSTERIZE_MAX_COLORS),
            TraceMode::Color | TraceMode::Grayscale => requested,
        }
    }
}

/// Simplified contours of one palette color
#[derive(Debug, Clone, PartialEq)]
pub struct TracedLayer {
    pub palette_index: usize,
    pub color: PaletteEntry,
    pub paths: Vec<Path>,
}

/// Result of vectorization
#[derive(Debug, Clone)]
pub struct VectorizeResult {
    pub svg: String,
    /// Declared document width, `round(image width * scale)`
    pub width: u32,
    /// Declared document height, `round(image height * scale)`
    pub height: u32,
    pub palette: Vec<PaletteEntry>,
    pub layers: Vec<TracedLayer>,
}

impl VectorizeResult {
    pub fn path_count(&self) -> usize {
        self.layers.iter().map(|l| l.paths.len()).sum()
    }
}

/// Vectorize a raw RGBA buffer (row-major, top to bottom)
pub fn vectorize_rgba(
    data: &[u8],
    width: u32,
    height: u32,
    options: &VectorizeOptions,
) -> Result<VectorizeResult, TraceError> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .unwrap_or(usize::MAX);

    let mismatch = TraceError::DimensionMismatch {
        width,
        height,
        expected,
        actual: data.len(),
    };
    if data.len() != expected {
        return Err(mismatch);
    }

    let img = RgbaImage::from_raw(width, height, data.to_vec()).ok_or(mismatch)?;
    Ok(run_pipeline(img, options))
}

/// Vectorize an already decoded image
pub fn vectorize_image(img: &RgbaImage, options: &VectorizeOptions) -> VectorizeResult {
    run_pipeline(img.clone(), options)
}

fn run_pipeline(mut img: RgbaImage, options: &VectorizeOptions) -> VectorizeResult {
    let options = options.normalized();
    let (width, height) = img.dimensions();

    if options.blur_radius > 0 {
        img = blur(&img, options.blur_radius);
    }
    match options.trace_mode {
        TraceMode::Grayscale => grayscale(&mut img),
        TraceMode::Monochrome => monochrome(&mut img, options.threshold),
        TraceMode::Color | TraceMode::Posterize => {}
    }

    let palette = median_cut(&img, options.effective_color_count());
    log::debug!("palette: {} entries", palette.len());

    let indexed = index_pixels(&img, &palette);
    let layers = separate_layers(&indexed, &palette);
    log::debug!("layers: {} non-empty", layers.len());

    let traced: Vec<TracedLayer> = layers.iter().map(|l| trace(l, &options)).collect();

    let description = options.description.then(|| {
        let paths: usize = traced.iter().map(|l| l.paths.len()).sum();
        (
            options.title.as_str(),
            format!(
                "{} colors, {} paths, {} mode",
                palette.len(),
                paths,
                options.trace_mode
            ),
        )
    });
    let doc = DocumentOptions {
        scale: options.scale,
        precision: options.round_precision,
        view_box: options.view_box,
        description,
    };
    let svg = assemble_svg(width, height, &traced, &doc);

    let result = VectorizeResult {
        svg,
        width: scaled_dimension(width, options.scale),
        height: scaled_dimension(height, options.scale),
        palette,
        layers: traced,
    };
    log::info!(
        "traced {}x{} image: {} colors, {} layers, {} paths",
        width,
        height,
        result.palette.len(),
        result.layers.len(),
        result.path_count()
    );
    result
}

fn trace(layer: &Layer, options: &VectorizeOptions) -> TracedLayer {
    let paths: Vec<Path> = match options.strategy {
        TraceStrategy::Contour => trace_layer(layer, options.path_omit_length)
            .iter()
            .map(|p| simplify_path(p, options.simplify_tolerance))
            .collect(),
        TraceStrategy::Rects => trace_layer_rects(layer),
    };
    log::debug!(
        "layer {} ({}): {} paths",
        layer.palette_index,
        layer.color.hex(),
        paths.len()
    );

    TracedLayer {
        palette_index: layer.palette_index,
        color: layer.color,
        paths,
    }
}
