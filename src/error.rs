use thiserror::Error;

/// Errors returned by the tracing pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    /// Pixel buffer length does not match `width * height * 4`
    #[error("dimension mismatch: {width}x{height} RGBA needs {expected} bytes, got {actual}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("unknown trace mode '{0}' (expected color, grayscale, monochrome or posterize)")]
    UnknownMode(String),

    #[error("unknown trace strategy '{0}' (expected contour or rects)")]
    UnknownStrategy(String),
}
