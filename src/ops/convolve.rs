//! Neighbourhood helpers shared by the filters
//!
//! Borders are handled by reflect-101 (`gfedcb|abcdefgh|gfedcba`).

use image::GrayImage;

use crate::engine::buffer::{saturate, Image, CHANNELS};

// ============================================================================
// Border Handling
// ============================================================================

/// Reflect-101 index into `0..len`
#[inline]
pub fn reflect101(index: i64, len: usize) -> usize {
    let n = len as i64;
    if n <= 1 {
        return 0;
    }
    let mut i = index;
    while i < 0 || i >= n {
        if i < 0 {
            i = -i;
        }
        if i >= n {
            i = 2 * n - 2 - i;
        }
    }
    i as usize
}

// ============================================================================
// Linear Filters
// ============================================================================

/// Correlate every channel with a 3x3 kernel, saturating the result
pub fn filter3x3(image: &Image, kernel: &[[f32; 3]; 3]) -> Image {
    let (w, h) = image.dimensions();
    let src = image.as_raw();
    let mut out = vec![0u8; src.len()];
    let stride = w as usize * CHANNELS;

    for y in 0..h as i64 {
        for x in 0..w as i64 {
            let mut acc = [0.0f32; CHANNELS];
            for (ky, row) in kernel.iter().enumerate() {
                let sy = reflect101(y + ky as i64 - 1, h as usize);
                for (kx, &k) in row.iter().enumerate() {
                    let sx = reflect101(x + kx as i64 - 1, w as usize);
                    let base = sy * stride + sx * CHANNELS;
                    for c in 0..CHANNELS {
                        acc[c] += k * src[base + c] as f32;
                    }
                }
            }
            let base = y as usize * stride + x as usize * CHANNELS;
            for c in 0..CHANNELS {
                out[base + c] = saturate(acc[c]);
            }
        }
    }

    Image::from_raw(w, h, out).unwrap_or_else(|_| image.clone())
}

/// Raw 3x3 correlation response of a single-channel image
pub fn response3x3(gray: &GrayImage, kernel: &[[f32; 3]; 3]) -> Vec<f32> {
    let (w, h) = gray.dimensions();
    let mut out = Vec::with_capacity(w as usize * h as usize);
    for y in 0..h as i64 {
        for x in 0..w as i64 {
            let mut acc = 0.0f32;
            for (ky, row) in kernel.iter().enumerate() {
                let sy = reflect101(y + ky as i64 - 1, h as usize) as u32;
                for (kx, &k) in row.iter().enumerate() {
                    let sx = reflect101(x + kx as i64 - 1, w as usize) as u32;
                    acc += k * gray.get_pixel(sx, sy).0[0] as f32;
                }
            }
            out.push(acc);
        }
    }
    out
}

/// Gaussian sigma implied by a kernel size when none is given
pub fn sigma_for_ksize(ksize: usize) -> f32 {
    0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Kernel size implied by a sigma when none is given (8-bit images)
pub fn ksize_for_sigma(sigma: f32) -> usize {
    ((sigma * 6.0 + 1.0).round() as usize) | 1
}

/// Normalised 1-D Gaussian weights
pub fn gaussian_weights(ksize: usize, sigma: f32) -> Vec<f32> {
    let half = (ksize / 2) as f32;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let raw: Vec<f32> = (0..ksize)
        .map(|i| {
            let d = i as f32 - half;
            (-(d * d) / two_sigma_sq).exp()
        })
        .collect();
    let sum: f32 = raw.iter().sum();
    raw.into_iter().map(|v| v / sum).collect()
}

/// Separable Gaussian blur returning unrounded samples
pub fn gaussian_blur_f32(image: &Image, ksize: usize, sigma: f32) -> Vec<f32> {
    let (w, h) = image.dimensions();
    let (wu, hu) = (w as usize, h as usize);
    let weights = gaussian_weights(ksize, sigma);
    let half = (ksize / 2) as i64;
    let src = image.as_raw();

    // Horizontal pass
    let mut tmp = vec![0.0f32; src.len()];
    for y in 0..hu {
        for x in 0..wu {
            for c in 0..CHANNELS {
                let mut acc = 0.0f32;
                for (i, wgt) in weights.iter().enumerate() {
                    let sx = reflect101(x as i64 + i as i64 - half, wu);
                    acc += wgt * src[(y * wu + sx) * CHANNELS + c] as f32;
                }
                tmp[(y * wu + x) * CHANNELS + c] = acc;
            }
        }
    }

    // Vertical pass
    let mut out = vec![0.0f32; src.len()];
    for y in 0..hu {
        for x in 0..wu {
            for c in 0..CHANNELS {
                let mut acc = 0.0f32;
                for (i, wgt) in weights.iter().enumerate() {
                    let sy = reflect101(y as i64 + i as i64 - half, hu);
                    acc += wgt * tmp[(sy * wu + x) * CHANNELS + c];
                }
                out[(y * wu + x) * CHANNELS + c] = acc;
            }
        }
    }
    out
}

/// Separable Gaussian blur, saturated back to 8 bits
pub fn gaussian_blur(image: &Image, ksize: usize, sigma: f32) -> Image {
    let (w, h) = image.dimensions();
    let data = gaussian_blur_f32(image, ksize, sigma)
        .into_iter()
        .map(saturate)
        .collect();
    Image::from_raw(w, h, data).unwrap_or_else(|_| image.clone())
}
