//! Rectangle-merge layer tracing
//!
//! A cheaper alternative to contour following: each layer is covered by
//! greedy maximal rectangles (grow a row run, then extend it downwards while
//! the rows below are fully set). Output is blocky but exact.

use super::mask::Layer;
use super::trace::{GridPoint, Path};

/// Axis-aligned block of pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Closed clockwise outline on the pixel-corner lattice
    pub fn to_path(&self) -> Path {
        let (x0, y0) = (self.x as i32, self.y as i32);
        let (x1, y1) = (x0 + self.width as i32, y0 + self.height as i32);
        vec![
            GridPoint::new(x0, y0),
            GridPoint::new(x1, y0),
            GridPoint::new(x1, y1),
            GridPoint::new(x0, y1),
            GridPoint::new(x0, y0),
        ]
    }
}

/// Cover the layer with non-overlapping rectangles in row-major order
pub fn merge_rects(layer: &Layer) -> Vec<PixelRect> {
    let w = layer.width as usize;
    let h = layer.height as usize;
    let mut taken = vec![false; w * h];
    let mut rects = Vec::new();

    let free = |taken: &[bool], x: usize, y: usize| layer.mask[y * w + x] && !taken[y * w + x];

    for y in 0..h {
        let mut x = 0;
        while x < w {
            if !free(&taken, x, y) {
                x += 1;
                continue;
            }

            let mut run_end = x + 1;
            while run_end < w && free(&taken, run_end, y) {
                run_end += 1;
            }

            let mut bottom = y + 1;
            while bottom < h && (x..run_end).all(|cx| free(&taken, cx, bottom)) {
                bottom += 1;
            }

            for ry in y..bottom {
                taken[ry * w + x..ry * w + run_end].fill(true);
            }

            rects.push(PixelRect {
                x: x as u32,
                y: y as u32,
                width: (run_end - x) as u32,
                height: (bottom - y) as u32,
            });
            x = run_end;
        }
    }

    rects
}

/// Rectangle outlines for a layer
pub fn trace_layer_rects(layer: &Layer) -> Vec<Path> {
    merge_rects(layer).iter().map(PixelRect::to_path).collect()
}
