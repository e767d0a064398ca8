//! Ramer-Douglas-Peucker path simplification
//!
//! Runs over an explicit stack of index ranges instead of recursing, which
//! gives the same result without depth limits on long contours.

use super::trace::{GridPoint, Path};

/// Reduce a path to the points needed to stay within `tolerance` of it.
///
/// The first and last point are always kept; paths of two or fewer points
/// come back unchanged. A negative tolerance behaves like zero.
pub fn simplify_path(path: &[GridPoint], tolerance: f64) -> Path {
    if path.len() <= 2 {
        return path.to_vec();
    }

    let tolerance = tolerance.max(0.0);
    let last = path.len() - 1;
    let mut keep = vec![false; path.len()];
    keep[0] = true;
    keep[last] = true;

    let mut stack = vec![(0usize, last)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }

        let a = path[start];
        let b = path[end];
        let mut max_dist = 0.0f64;
        let mut max_idx = start;

        for (i, &p) in path.iter().enumerate().take(end).skip(start + 1) {
            let dist = perpendicular_distance(p, a, b);
            if dist > max_dist {
                max_dist = dist;
                max_idx = i;
            }
        }

        if max_dist > tolerance {
            keep[max_idx] = true;
            stack.push((max_idx, end));
            stack.push((start, max_idx));
        }
    }

    path.iter()
        .zip(keep)
        .filter_map(|(&p, k)| k.then_some(p))
        .collect()
}

/// Distance from `p` to the line through `a` and `b`; plain point distance
/// when `a == b` (closed paths)
pub fn perpendicular_distance(p: GridPoint, a: GridPoint, b: GridPoint) -> f64 {
    let (px, py) = (p.x as f64, p.y as f64);
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (dx, dy) = (b.x as f64 - ax, b.y as f64 - ay);

    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }

    (dx * (py - ay) - dy * (px - ax)).abs() / len_sq.sqrt()
}
