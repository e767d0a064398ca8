//! Boundary-following contour extraction
//!
//! Walks run on the pixel-corner lattice, so a contour around a pixel region
//! encloses exactly those pixels. Each step follows one pixel edge that has
//! a set pixel on its right and an unset pixel on its left; at every corner
//! the walker prefers a right turn, then straight, then left, then back.

use super::mask::Layer;

/// A point on the pixel-corner lattice (`0..=width`, `0..=height`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn step(self, heading: Heading) -> Self {
        let (dx, dy) = heading.delta();
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Ordered closed contour: the last point repeats the first
pub type Path = Vec<GridPoint>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Heading {
    East,
    South,
    West,
    North,
}

impl Heading {
    fn delta(self) -> (i32, i32) {
        match self {
            Heading::East => (1, 0),
            Heading::South => (0, 1),
            Heading::West => (-1, 0),
            Heading::North => (0, -1),
        }
    }

    // y grows downwards, so a right turn goes clockwise on screen
    fn turn_right(self) -> Self {
        match self {
            Heading::East => Heading::South,
            Heading::South => Heading::West,
            Heading::West => Heading::North,
            Heading::North => Heading::East,
        }
    }

    fn turn_left(self) -> Self {
        self.turn_right().turn_right().turn_right()
    }

    fn reverse(self) -> Self {
        self.turn_right().turn_right()
    }

    fn candidates(self) -> [Heading; 4] {
        [self.turn_right(), self, self.turn_left(), self.reverse()]
    }

    /// Which side of its right-hand pixel an edge taken with this heading is
    fn side(self) -> usize {
        match self {
            Heading::East => 0,  // top
            Heading::South => 1, // right
            Heading::West => 2,  // bottom
            Heading::North => 3, // left
        }
    }

    const SIDES: [Heading; 4] = [Heading::East, Heading::South, Heading::West, Heading::North];
}

/// Pixels to the right and left of the edge leaving `from` with `heading`
fn edge_pixels(from: GridPoint, heading: Heading) -> ((i64, i64), (i64, i64)) {
    let (x, y) = (from.x as i64, from.y as i64);
    match heading {
        Heading::East => ((x, y), (x, y - 1)),
        Heading::South => ((x - 1, y), (x, y)),
        Heading::West => ((x - 1, y - 1), (x - 1, y)),
        Heading::North => ((x, y - 1), (x - 1, y - 1)),
    }
}

/// Lattice corner where the given side of pixel (px, py) starts
fn side_start(px: i64, py: i64, heading: Heading) -> GridPoint {
    let (x, y) = match heading {
        Heading::East => (px, py),
        Heading::South => (px + 1, py),
        Heading::West => (px + 1, py + 1),
        Heading::North => (px, py + 1),
    };
    GridPoint::new(x as i32, y as i32)
}

/// True when a set pixel has at least one unset 4-neighbor
pub fn is_boundary_pixel(layer: &Layer, x: i64, y: i64) -> bool {
    layer.is_set(x, y)
        && (!layer.is_set(x - 1, y)
            || !layer.is_set(x + 1, y)
            || !layer.is_set(x, y - 1)
            || !layer.is_set(x, y + 1))
}

/// Boundary walker over one layer mask
///
/// State is the current corner, the current heading and the per-edge
/// visited set shared by every walk on the layer.
struct ContourTracer<'a> {
    layer: &'a Layer,
    visited: Vec<bool>,
    max_steps: usize,
}

impl<'a> ContourTracer<'a> {
    fn new(layer: &'a Layer) -> Self {
        let pixels = layer.width as usize * layer.height as usize;
        Self {
            layer,
            visited: vec![false; pixels * 4],
            max_steps: pixels.saturating_mul(4),
        }
    }

    fn is_boundary_edge(&self, from: GridPoint, heading: Heading) -> bool {
        let ((rx, ry), (lx, ly)) = edge_pixels(from, heading);
        self.layer.is_set(rx, ry) && !self.layer.is_set(lx, ly)
    }

    fn edge_slot(&self, from: GridPoint, heading: Heading) -> usize {
        let ((rx, ry), _) = edge_pixels(from, heading);
        (ry as usize * self.layer.width as usize + rx as usize) * 4 + heading.side()
    }

    fn is_visited(&self, from: GridPoint, heading: Heading) -> bool {
        self.visited[self.edge_slot(from, heading)]
    }

    fn mark(&mut self, from: GridPoint, heading: Heading) {
        let slot = self.edge_slot(from, heading);
        self.visited[slot] = true;
    }

    fn trace_all(mut self) -> Vec<Path> {
        let mut paths = Vec::new();
        let (w, h) = (self.layer.width as i64, self.layer.height as i64);

        for y in 0..h {
            for x in 0..w {
                if !is_boundary_pixel(self.layer, x, y) {
                    continue;
                }
                for heading in Heading::SIDES {
                    let start = side_start(x, y, heading);
                    if self.is_boundary_edge(start, heading) && !self.is_visited(start, heading) {
                        paths.push(self.walk(start, heading));
                    }
                }
            }
        }

        paths
    }

    fn walk(&mut self, start: GridPoint, start_heading: Heading) -> Path {
        let mut points = vec![start];
        let mut pos = start;
        let mut heading = start_heading;
        let mut steps = 0usize;

        loop {
            self.mark(pos, heading);
            pos = pos.step(heading);
            points.push(pos);
            steps += 1;

            let next = heading
                .candidates()
                .into_iter()
                .find(|&h| self.is_boundary_edge(pos, h));

            let Some(next) = next else {
                break;
            };
            if pos == start && next == start_heading {
                break;
            }
            if self.is_visited(pos, next) {
                break;
            }
            if steps >= self.max_steps {
                log::warn!(
                    "contour walk from ({}, {}) hit the {} step ceiling",
                    start.x,
                    start.y,
                    self.max_steps
                );
                break;
            }
            heading = next;
        }

        points
    }
}

/// Extract every closed contour of a layer, dropping those with fewer than
/// `min_points` points
pub fn trace_layer(layer: &Layer, min_points: usize) -> Vec<Path> {
    if layer.width == 0 || layer.height == 0 {
        return Vec::new();
    }

    let paths = ContourTracer::new(layer).trace_all();
    let total = paths.len();
    let kept: Vec<Path> = paths
        .into_iter()
        .filter(|p| p.len() >= min_points)
        .collect();

    if kept.len() < total {
        log::debug!(
            "layer {}: dropped {} contours shorter than {} points",
            layer.palette_index,
            total - kept.len(),
            min_points
        );
    }

    kept
}
