//! Palette indexing and per-color layer masks
//!
//! Every opaque pixel is mapped to exactly one palette entry; the layers
//! built from that index partition the opaque pixels.

use image::{Rgba, RgbaImage};

use super::quantize::{PaletteEntry, is_opaque};

/// A binary mask, one flag per pixel in row-major order
pub type ColorMask = Vec<bool>;

/// Index value for pixels excluded from every layer
pub const TRANSPARENT: i32 = -1;

/// Per-pixel palette indices; `TRANSPARENT` marks excluded pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    pub width: u32,
    pub height: u32,
    pub indices: Vec<i32>,
}

impl IndexedImage {
    /// Palette index at (x, y), `None` for transparent pixels
    pub fn get(&self, x: u32, y: u32) -> Option<usize> {
        let value = self.indices[(y * self.width + x) as usize];
        usize::try_from(value).ok()
    }
}

/// Pixels of one palette color
#[derive(Debug, Clone)]
pub struct Layer {
    /// Position of the color in the palette
    pub palette_index: usize,
    pub color: PaletteEntry,
    pub width: u32,
    pub height: u32,
    pub mask: ColorMask,
}

impl Layer {
    /// Mask lookup that treats everything outside the image as unset
    #[inline]
    pub fn is_set(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.mask[y as usize * self.width as usize + x as usize]
    }

    pub fn pixel_count(&self) -> usize {
        self.mask.iter().filter(|&&set| set).count()
    }
}

/// Map every pixel to its nearest palette entry
pub fn index_pixels(img: &RgbaImage, palette: &[PaletteEntry]) -> IndexedImage {
    let indices = img
        .pixels()
        .map(|&Rgba([r, g, b, a])| {
            if !is_opaque(a) {
                return TRANSPARENT;
            }
            nearest_palette_index([r, g, b], palette).map_or(TRANSPARENT, |i| i as i32)
        })
        .collect();

    IndexedImage {
        width: img.width(),
        height: img.height(),
        indices,
    }
}

/// Nearest entry by squared RGB distance; the first entry wins exact ties
pub fn nearest_palette_index(rgb: [u8; 3], palette: &[PaletteEntry]) -> Option<usize> {
    let mut best = None;
    let mut best_dist = u32::MAX;

    for (i, entry) in palette.iter().enumerate() {
        let dist = color_distance(rgb, entry.rgb);
        if best.is_none() || dist < best_dist {
            best = Some(i);
            best_dist = dist;
        }
    }

    best
}

fn color_distance(a: [u8; 3], b: [u8; 3]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x as i32 - y as i32;
            (d * d) as u32
        })
        .sum()
}

/// One layer per palette entry that owns at least one pixel, in palette order
pub fn separate_layers(indexed: &IndexedImage, palette: &[PaletteEntry]) -> Vec<Layer> {
    palette
        .iter()
        .enumerate()
        .filter_map(|(i, color)| {
            let target = i as i32;
            let mask: ColorMask = indexed.indices.iter().map(|&v| v == target).collect();
            if !mask.contains(&true) {
                return None;
            }
            Some(Layer {
                palette_index: i,
                color: *color,
                width: indexed.width,
                height: indexed.height,
                mask,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(rgb: [u8; 3]) -> PaletteEntry {
        PaletteEntry::new(rgb, 255, 0)
    }

    #[test]
    fn test_transparent_pixels_get_no_index() {
        let mut img = RgbaImage::new(3, 1);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 0, 0, 127]));
        img.put_pixel(2, 0, Rgba([0, 0, 0, 128]));

        let indexed = index_pixels(&img, &[entry([0, 0, 0])]);
        assert_eq!(indexed.indices, vec![0, TRANSPARENT, 0]);
        assert_eq!(indexed.get(1, 0), None);
        assert_eq!(indexed.get(2, 0), Some(0));
    }

    #[test]
    fn test_nearest_color() {
        let palette = [entry([0, 0, 0]), entry([255, 255, 255]), entry([200, 0, 0])];
        assert_eq!(nearest_palette_index([20, 20, 20], &palette), Some(0));
        assert_eq!(nearest_palette_index([240, 230, 250], &palette), Some(1));
        assert_eq!(nearest_palette_index([180, 30, 10], &palette), Some(2));
    }

    #[test]
    fn test_nearest_color_tie_takes_first() {
        let palette = [entry([0, 0, 0]), entry([2, 0, 0])];
        assert_eq!(nearest_palette_index([1, 0, 0], &palette), Some(0));
    }

    #[test]
    fn test_empty_palette() {
        assert_eq!(nearest_palette_index([1, 2, 3], &[]), None);
    }

    #[test]
    fn test_layers_skip_unused_entries() {
        let indexed = IndexedImage {
            width: 2,
            height: 2,
            indices: vec![0, 2, TRANSPARENT, 2],
        };
        let palette = [entry([1, 1, 1]), entry([2, 2, 2]), entry([3, 3, 3])];

        let layers = separate_layers(&indexed, &palette);
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].palette_index, 0);
        assert_eq!(layers[0].mask, vec![true, false, false, false]);
        assert_eq!(layers[1].palette_index, 2);
        assert_eq!(layers[1].color.rgb, [3, 3, 3]);
        assert_eq!(layers[1].mask, vec![false, true, false, true]);
    }

    #[test]
    fn test_layers_partition_opaque_pixels() {
        let img = RgbaImage::from_fn(6, 5, |x, y| {
            let a = if (x + y) % 4 == 0 { 0 } else { 255 };
            Rgba([(x * 40) as u8, (y * 50) as u8, 90, a])
        });
        let palette = [entry([0, 0, 90]), entry([200, 0, 90]), entry([0, 200, 90])];
        let indexed = index_pixels(&img, &palette);
        let layers = separate_layers(&indexed, &palette);

        for i in 0..indexed.indices.len() {
            let owners = layers.iter().filter(|l| l.mask[i]).count();
            let expected = if indexed.indices[i] == TRANSPARENT { 0 } else { 1 };
            assert_eq!(owners, expected, "pixel {} owned {} times", i, owners);
        }
    }

    #[test]
    fn test_is_set_outside_image() {
        let layer = Layer {
            palette_index: 0,
            color: entry([0, 0, 0]),
            width: 1,
            height: 1,
            mask: vec![true],
        };
        assert!(layer.is_set(0, 0));
        assert!(!layer.is_set(-1, 0));
        assert!(!layer.is_set(0, 1));
        assert_eq!(layer.pixel_count(), 1);
    }
}
