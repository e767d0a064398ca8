//! Median-cut color quantization
//!
//! Buckets are split iteratively over an explicit list. The split always
//! takes the bucket/channel pair with the widest range found by a fixed
//! scan order, so the palette is fully deterministic.

use image::{Rgba, RgbaImage};

/// Pixels with alpha below this value are transparent
pub const ALPHA_CUTOFF: u8 = 128;

/// Largest palette the tracer will build
pub const MAX_COLORS: usize = 256;

/// Palette used when an image has no opaque pixels at all
pub const FALLBACK_GRAY: [u8; 3] = [128, 128, 128];

/// Whether a pixel takes part in quantization and tracing
#[inline]
pub fn is_opaque(alpha: u8) -> bool {
    alpha >= ALPHA_CUTOFF
}

/// One representative color of the image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub rgb: [u8; 3],
    /// Rounded mean alpha of the pixels that formed this entry
    pub alpha: u8,
    /// Number of pixels that formed this entry
    pub count: usize,
}

impl PaletteEntry {
    pub fn new(rgb: [u8; 3], alpha: u8, count: usize) -> Self {
        Self { rgb, alpha, count }
    }

    /// `#rrggbb` form used as a fill color
    pub fn hex(&self) -> String {
        let [r, g, b] = self.rgb;
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    fn fallback() -> Self {
        Self::new(FALLBACK_GRAY, 255, 0)
    }
}

/// Build a palette of at most `max_colors` entries from the opaque pixels
pub fn median_cut(img: &RgbaImage, max_colors: usize) -> Vec<PaletteEntry> {
    let pixels: Vec<[u8; 4]> = img
        .pixels()
        .filter(|p| is_opaque(p[3]))
        .map(|&Rgba(px)| px)
        .collect();

    median_cut_pixels(pixels, max_colors)
}

/// Median cut over an explicit pixel list
pub fn median_cut_pixels(pixels: Vec<[u8; 4]>, max_colors: usize) -> Vec<PaletteEntry> {
    let target = max_colors.clamp(1, MAX_COLORS);

    if pixels.is_empty() {
        return vec![PaletteEntry::fallback()];
    }

    let mut buckets: Vec<Vec<[u8; 4]>> = vec![pixels];

    while buckets.len() < target {
        let Some((index, channel)) = widest_bucket(&buckets) else {
            // every bucket is a single color
            break;
        };

        let mut bucket = std::mem::take(&mut buckets[index]);
        bucket.sort_by_key(|px| px[channel]);
        let at = split_point(&bucket, channel);
        let upper = bucket.split_off(at);

        buckets[index] = bucket;
        buckets.insert(index + 1, upper);
    }

    buckets
        .iter()
        .filter(|b| !b.is_empty())
        .map(|b| average(b))
        .collect()
}

/// Bucket and channel with the largest positive range, first found on ties
fn widest_bucket(buckets: &[Vec<[u8; 4]>]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    let mut best_range = 0u8;

    for (index, bucket) in buckets.iter().enumerate() {
        if bucket.len() < 2 {
            continue;
        }
        for channel in 0..3 {
            let (min, max) = bucket
                .iter()
                .fold((u8::MAX, u8::MIN), |(lo, hi), px| {
                    (lo.min(px[channel]), hi.max(px[channel]))
                });
            let range = max - min;
            if range > best_range {
                best_range = range;
                best = Some((index, channel));
            }
        }
    }

    best
}

/// Midpoint of a bucket sorted on `channel`, moved to the nearest value
/// change so equal colors never end up in both halves.
///
/// The bucket must have a positive range on `channel`.
fn split_point(sorted: &[[u8; 4]], channel: usize) -> usize {
    let mid = sorted.len() / 2;
    let value = sorted[mid][channel];

    let lower = sorted[..mid].partition_point(|px| px[channel] < value);
    let upper = mid + sorted[mid..].partition_point(|px| px[channel] <= value);

    match (lower > 0, upper < sorted.len()) {
        (true, true) => {
            if mid - lower <= upper - mid {
                lower
            } else {
                upper
            }
        }
        (true, false) => lower,
        _ => upper,
    }
}

fn average(bucket: &[[u8; 4]]) -> PaletteEntry {
    let n = bucket.len() as u64;
    let mut sums = [0u64; 4];
    for px in bucket {
        for (sum, &v) in sums.iter_mut().zip(px.iter()) {
            *sum += v as u64;
        }
    }
    // round half up in integer arithmetic
    let mean = |sum: u64| ((2 * sum + n) / (2 * n)) as u8;

    PaletteEntry::new(
        [mean(sums[0]), mean(sums[1]), mean(sums[2])],
        mean(sums[3]),
        bucket.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    #[test]
    fn test_empty_input_falls_back_to_gray() {
        let palette = median_cut_pixels(Vec::new(), 8);
        assert_eq!(palette, vec![PaletteEntry::new(FALLBACK_GRAY, 255, 0)]);
    }

    #[test]
    fn test_fully_transparent_image_falls_back() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([10, 200, 30, 20]));
        let palette = median_cut(&img, 5);
        assert_eq!(palette.len(), 1);
        assert_eq!(palette[0].rgb, FALLBACK_GRAY);
    }

    #[test]
    fn test_zero_colors_clamps_to_one() {
        let palette = median_cut_pixels(vec![RED, BLUE, RED], 0);
        assert_eq!(palette.len(), 1);
        assert_eq!(palette[0].count, 3);
        // (255 + 0 + 255) / 3 = 170
        assert_eq!(palette[0].rgb, [170, 0, 85]);
    }

    #[test]
    fn test_splits_red_and_blue() {
        let palette = median_cut_pixels(vec![RED, BLUE, RED, BLUE], 2);
        // sorted ascending on the red channel, so blue lands in the lower half
        assert_eq!(
            palette,
            vec![
                PaletteEntry::new([0, 0, 255], 255, 2),
                PaletteEntry::new([255, 0, 0], 255, 2),
            ]
        );
    }

    #[test]
    fn test_stops_at_distinct_color_count() {
        let pixels = vec![RED, BLUE, RED, BLUE, RED, RED];
        let palette = median_cut_pixels(pixels, 64);
        assert_eq!(palette.len(), 2);
        let total: usize = palette.iter().map(|p| p.count).sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn test_split_moves_to_value_change() {
        let px = |v: u8| [v, 0, 0, 255];
        // midpoint 3 sits inside the run of 10s
        let sorted = [px(1), px(10), px(10), px(10), px(10), px(20)];
        assert_eq!(split_point(&sorted, 0), 1);
        let sorted = [px(1), px(1), px(1), px(10), px(20), px(30)];
        assert_eq!(split_point(&sorted, 0), 3);
        let sorted = [px(5), px(5), px(5), px(5), px(9)];
        assert_eq!(split_point(&sorted, 0), 4);
    }

    #[test]
    fn test_no_duplicate_entries_for_skewed_counts() {
        let mut pixels = vec![[255, 255, 255, 255]; 90];
        pixels.extend(vec![RED; 7]);
        pixels.extend(vec![BLUE; 3]);
        let palette = median_cut_pixels(pixels, 50);
        assert_eq!(palette.len(), 3);
        let mut rgbs: Vec<[u8; 3]> = palette.iter().map(|p| p.rgb).collect();
        rgbs.sort();
        assert_eq!(rgbs, vec![[0, 0, 255], [255, 0, 0], [255, 255, 255]]);
    }

    #[test]
    fn test_uniform_image_gives_single_entry() {
        let palette = median_cut_pixels(vec![[7, 8, 9, 255]; 50], 16);
        assert_eq!(palette, vec![PaletteEntry::new([7, 8, 9], 255, 50)]);
    }

    #[test]
    fn test_palette_size_bounded() {
        let pixels: Vec<[u8; 4]> = (0..=255u8).map(|v| [v, 255 - v, v / 2, 255]).collect();
        for n in [1, 2, 3, 7, 16, 300] {
            let palette = median_cut_pixels(pixels.clone(), n);
            assert!(!palette.is_empty());
            assert!(palette.len() <= n.min(MAX_COLORS));
            assert_eq!(palette.iter().map(|p| p.count).sum::<usize>(), 256);
        }
    }

    #[test]
    fn test_alpha_is_averaged() {
        let palette = median_cut_pixels(vec![[10, 10, 10, 200], [10, 10, 10, 255]], 4);
        assert_eq!(palette, vec![PaletteEntry::new([10, 10, 10], 228, 2)]);
    }

    #[test]
    fn test_hex() {
        assert_eq!(PaletteEntry::new([255, 8, 171], 255, 1).hex(), "#ff08ab");
    }
}
