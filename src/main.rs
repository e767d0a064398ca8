use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use raster_trace::embed::svg_data_uri;
use raster_trace::{TraceMode, TraceStrategy, VectorizeOptions, vectorize_image};

/// Trace a PNG or JPEG image into an SVG document.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input image path
    input: PathBuf,

    /// Output path; the document goes to stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file with options (colorCount, traceMode, ...); flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Target palette size
    #[arg(short = 'k', long)]
    colors: Option<usize>,

    /// color, grayscale, monochrome or posterize
    #[arg(short, long)]
    mode: Option<TraceMode>,

    /// Luma cutoff for monochrome mode
    #[arg(long)]
    threshold: Option<u8>,

    /// Blur radius applied before quantization
    #[arg(long)]
    blur: Option<u32>,

    /// Drop contours with fewer points than this
    #[arg(long)]
    omit: Option<usize>,

    /// Simplification tolerance in pixels
    #[arg(short, long)]
    tolerance: Option<f64>,

    /// Output coordinate multiplier
    #[arg(short, long)]
    scale: Option<f64>,

    /// Decimal places for coordinates
    #[arg(short, long)]
    precision: Option<u32>,

    /// contour or rects
    #[arg(long)]
    strategy: Option<TraceStrategy>,

    /// Omit the viewBox attribute
    #[arg(long)]
    no_view_box: bool,

    /// Emit title and desc elements
    #[arg(long)]
    description: bool,

    /// Title text (implies --description)
    #[arg(long)]
    title: Option<String>,

    /// Write a base64 data URI instead of the raw document
    #[arg(long)]
    data_uri: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn options(&self) -> Result<VectorizeOptions> {
        let mut opts = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading config '{}'", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing config '{}'", path.display()))?
            }
            None => VectorizeOptions::default(),
        };

        if let Some(v) = self.colors {
            opts.color_count = v;
        }
        if let Some(v) = self.mode {
            opts.trace_mode = v;
        }
        if let Some(v) = self.threshold {
            opts.threshold = v;
        }
        if let Some(v) = self.blur {
            opts.blur_radius = v;
        }
        if let Some(v) = self.omit {
            opts.path_omit_length = v;
        }
        if let Some(v) = self.tolerance {
            opts.simplify_tolerance = v;
        }
        if let Some(v) = self.scale {
            opts.scale = v;
        }
        if let Some(v) = self.precision {
            opts.round_precision = v;
        }
        if let Some(v) = self.strategy {
            opts.strategy = v;
        }
        if self.no_view_box {
            opts.view_box = false;
        }
        if self.description {
            opts.description = true;
        }
        if let Some(title) = &self.title {
            opts.title = title.clone();
            opts.description = true;
        }

        Ok(opts)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let options = args.options()?;

    let img = image::open(&args.input)
        .with_context(|| format!("decoding image '{}'", args.input.display()))?
        .to_rgba8();

    let result = vectorize_image(&img, &options);
    let output = if args.data_uri {
        svg_data_uri(&result.svg)
    } else {
        result.svg
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &output)
                .with_context(|| format!("writing output '{}'", path.display()))?;
            log::info!(
                "wrote {} ({}x{}, {} colors)",
                path.display(),
                result.width,
                result.height,
                result.palette.len()
            );
        }
        None => print!("{}", output),
    }

    Ok(())
}
