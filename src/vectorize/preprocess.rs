//! Pixel preprocessing applied before quantization
//!
//! Blur produces a new buffer; grayscale and monochrome rewrite pixels in
//! place since they only look at one pixel at a time.

use image::{Rgba, RgbaImage};

/// Normalized 1D Gaussian kernel of length `2 * radius + 1`
pub fn gaussian_kernel(radius: u32) -> Vec<f32> {
    let radius = radius as i64;
    let sigma = (radius as f32 / 2.0).max(0.5);
    let sigma2 = sigma * sigma;

    let mut kernel: Vec<f32> = (-radius..=radius)
        .map(|x| {
            let xf = x as f32;
            (-(xf * xf) / (2.0 * sigma2)).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// Separable Gaussian blur, horizontal pass then vertical pass.
///
/// Samples outside the image clamp to the nearest edge pixel. All four
/// channels are blurred. A radius of 0 returns an unchanged copy.
pub fn blur(img: &RgbaImage, radius: u32) -> RgbaImage {
    let (width, height) = img.dimensions();
    if radius == 0 || width == 0 || height == 0 {
        return img.clone();
    }

    let kernel = gaussian_kernel(radius);
    let r = radius as i64;
    let w = width as usize;
    let h = height as usize;

    // Horizontal pass into a float buffer to avoid rounding twice
    let mut horizontal = vec![[0.0f32; 4]; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 4];
            for (k, &kw) in kernel.iter().enumerate() {
                let sx = clamp_index(x as i64 + k as i64 - r, w);
                let Rgba(px) = *img.get_pixel(sx as u32, y as u32);
                for c in 0..4 {
                    acc[c] += px[c] as f32 * kw;
                }
            }
            horizontal[y * w + x] = acc;
        }
    }

    let mut out = RgbaImage::new(width, height);
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 4];
            for (k, &kw) in kernel.iter().enumerate() {
                let sy = clamp_index(y as i64 + k as i64 - r, h);
                let src = horizontal[sy * w + x];
                for c in 0..4 {
                    acc[c] += src[c] * kw;
                }
            }
            out.put_pixel(x as u32, y as u32, Rgba(acc.map(to_channel)));
        }
    }

    out
}

/// Rec. 601 luma, rounded to the nearest integer
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    to_channel(y)
}

/// Replace RGB with luma, keeping alpha
pub fn grayscale(img: &mut RgbaImage) {
    for pixel in img.pixels_mut() {
        let Rgba([r, g, b, a]) = *pixel;
        let y = luma(r, g, b);
        *pixel = Rgba([y, y, y, a]);
    }
}

/// Pure white where luma >= threshold, pure black elsewhere; alpha kept
pub fn monochrome(img: &mut RgbaImage, threshold: u8) {
    for pixel in img.pixels_mut() {
        let Rgba([r, g, b, a]) = *pixel;
        let v = if luma(r, g, b) >= threshold { 255 } else { 0 };
        *pixel = Rgba([v, v, v, a]);
    }
}

fn clamp_index(i: i64, len: usize) -> usize {
    i.clamp(0, len as i64 - 1) as usize
}

fn to_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_is_normalized_and_symmetric() {
        for radius in 1..6 {
            let k = gaussian_kernel(radius);
            assert_eq!(k.len(), 2 * radius as usize + 1);
            let sum: f32 = k.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
            for i in 0..k.len() / 2 {
                assert!((k[i] - k[k.len() - 1 - i]).abs() < 1e-6);
            }
            // peak at the center
            let center = k[radius as usize];
            assert!(k.iter().all(|&w| w <= center));
        }
    }

    #[test]
    fn test_blur_radius_zero_is_noop() {
        let mut img = RgbaImage::new(3, 2);
        img.put_pixel(1, 1, Rgba([200, 10, 30, 255]));
        assert_eq!(blur(&img, 0), img);
    }

    #[test]
    fn test_blur_uniform_image_unchanged() {
        let img = RgbaImage::from_pixel(5, 4, Rgba([90, 120, 240, 255]));
        // edge clamping means no darkening at the borders
        assert_eq!(blur(&img, 2), img);
    }

    #[test]
    fn test_blur_spreads_single_pixel() {
        let mut img = RgbaImage::from_pixel(5, 5, Rgba([0, 0, 0, 255]));
        img.put_pixel(2, 2, Rgba([255, 255, 255, 255]));

        let out = blur(&img, 1);
        let center = out.get_pixel(2, 2)[0];
        let neighbor = out.get_pixel(1, 2)[0];
        let corner = out.get_pixel(0, 0)[0];

        assert!(center < 255);
        assert!(neighbor > 0);
        assert!(center > neighbor);
        assert_eq!(corner, 0);
    }

    #[test]
    fn test_luma_rounding() {
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(0, 0, 0), 0);
        // 0.299 * 255 = 76.245
        assert_eq!(luma(255, 0, 0), 76);
        // 0.587 * 255 = 149.685
        assert_eq!(luma(0, 255, 0), 150);
        // 0.114 * 255 = 29.07
        assert_eq!(luma(0, 0, 255), 29);
    }

    #[test]
    fn test_grayscale_keeps_alpha() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 40]));
        img.put_pixel(1, 0, Rgba([0, 255, 0, 255]));
        grayscale(&mut img);
        assert_eq!(*img.get_pixel(0, 0), Rgba([76, 76, 76, 40]));
        assert_eq!(*img.get_pixel(1, 0), Rgba([150, 150, 150, 255]));
    }

    #[test]
    fn test_monochrome_threshold_is_inclusive() {
        let mut img = RgbaImage::new(3, 1);
        img.put_pixel(0, 0, Rgba([100, 100, 100, 255]));
        img.put_pixel(1, 0, Rgba([99, 99, 99, 255]));
        img.put_pixel(2, 0, Rgba([250, 250, 250, 0]));
        monochrome(&mut img, 100);
        assert_eq!(*img.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(*img.get_pixel(1, 0), Rgba([0, 0, 0, 255]));
        assert_eq!(*img.get_pixel(2, 0), Rgba([255, 255, 255, 0]));
    }
}
