//! Fixed-parameter filters
//!
//! Every filter has its parameters baked in; adding one to the stack is a
//! single button press. Single-channel results (edges, threshold) are
//! replicated back to RGB so every layer sees the same buffer shape.

use image::GrayImage;
use imageproc::edges::canny;
use imageproc::filter::median_filter;
use imageproc::morphology::{grayscale_dilate, grayscale_erode, Mask};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::convolve::{
    filter3x3, gaussian_blur, gaussian_blur_f32, ksize_for_sigma, response3x3, sigma_for_ksize,
};
use super::Kernel;
use crate::engine::buffer::{luma, saturate, Image};
use crate::error::Result;

// ============================================================================
// Constants
// ============================================================================

const GAUSSIAN_KSIZE: usize = 15;
const CANNY_LOW: f32 = 100.0;
const CANNY_HIGH: f32 = 200.0;
const MORPH_RADIUS: u8 = 2; // 5x5 square
const THRESHOLD: u8 = 127;
const MEDIAN_KSIZE: u32 = 9;
const UNSHARP_SIGMA: f32 = 2.0;
const UNSHARP_STRENGTH: f32 = 1.5;

const SHARPEN: [[f32; 3]; 3] = [[-1.0, -1.0, -1.0], [-1.0, 9.0, -1.0], [-1.0, -1.0, -1.0]];
const EMBOSS: [[f32; 3]; 3] = [[-2.0, -1.0, 0.0], [-1.0, 1.0, 1.0], [0.0, 1.0, 2.0]];
const SOBEL_X: [[f32; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_Y: [[f32; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];
const LAPLACIAN: [[f32; 3]; 3] = [[0.0, 1.0, 0.0], [1.0, -4.0, 1.0], [0.0, 1.0, 0.0]];

// ============================================================================
// Filter
// ============================================================================

/// Catalog of zero-parameter filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    Grayscale,
    GaussianBlur,
    Sharpen,
    Canny,
    Sobel,
    Laplacian,
    Erode,
    Dilate,
    Threshold,
    HistogramStretch,
    HistogramEqualize,
    Sepia,
    Emboss,
    MedianBlur,
    UnsharpMask,
    Opening,
    Closing,
}

impl Filter {
    /// Every filter, in menu order
    pub const ALL: [Filter; 17] = [
        Filter::Grayscale,
        Filter::GaussianBlur,
        Filter::Sharpen,
        Filter::Canny,
        Filter::Sobel,
        Filter::Laplacian,
        Filter::Erode,
        Filter::Dilate,
        Filter::Threshold,
        Filter::HistogramStretch,
        Filter::HistogramEqualize,
        Filter::Sepia,
        Filter::Emboss,
        Filter::MedianBlur,
        Filter::UnsharpMask,
        Filter::Opening,
        Filter::Closing,
    ];

    /// Machine identifier
    pub fn name(self) -> &'static str {
        match self {
            Filter::Grayscale => "grayscale",
            Filter::GaussianBlur => "gaussian_blur",
            Filter::Sharpen => "sharpen",
            Filter::Canny => "canny",
            Filter::Sobel => "sobel",
            Filter::Laplacian => "laplacian",
            Filter::Erode => "erode",
            Filter::Dilate => "dilate",
            Filter::Threshold => "threshold",
            Filter::HistogramStretch => "histogram_stretch",
            Filter::HistogramEqualize => "histogram_equalize",
            Filter::Sepia => "sepia",
            Filter::Emboss => "emboss",
            Filter::MedianBlur => "median_blur",
            Filter::UnsharpMask => "unsharp_mask",
            Filter::Opening => "opening",
            Filter::Closing => "closing",
        }
    }

    /// Label shown in the layer list
    pub fn label(self) -> &'static str {
        match self {
            Filter::Grayscale => "Grayscale",
            Filter::GaussianBlur => "Gaussian Blur",
            Filter::Sharpen => "Sharpen",
            Filter::Canny => "Canny",
            Filter::Sobel => "Sobel",
            Filter::Laplacian => "Laplacian",
            Filter::Erode => "Erode",
            Filter::Dilate => "Dilate",
            Filter::Threshold => "Threshold",
            Filter::HistogramStretch => "Histogram Stretch",
            Filter::HistogramEqualize => "Histogram Equalize",
            Filter::Sepia => "Sepia",
            Filter::Emboss => "Emboss",
            Filter::MedianBlur => "Median Blur",
            Filter::UnsharpMask => "Unsharp Mask",
            Filter::Opening => "Opening",
            Filter::Closing => "Closing",
        }
    }

    /// Look up a filter by identifier (case-insensitive, `-` or `_`)
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|f| f.name() == wanted)
    }
}

impl Kernel for Filter {
    fn apply(&self, image: &Image) -> Result<Image> {
        let out = match self {
            Filter::Grayscale => grayscale(image),
            Filter::GaussianBlur => {
                gaussian_blur(image, GAUSSIAN_KSIZE, sigma_for_ksize(GAUSSIAN_KSIZE))
            }
            Filter::Sharpen => filter3x3(image, &SHARPEN),
            Filter::Canny => Image::from_luma(&canny(&image.to_luma(), CANNY_LOW, CANNY_HIGH)),
            Filter::Sobel => sobel(image),
            Filter::Laplacian => laplacian(image),
            Filter::Erode => morph(image, &[Morph::Erode])?,
            Filter::Dilate => morph(image, &[Morph::Dilate])?,
            Filter::Threshold => threshold(image),
            Filter::HistogramStretch => histogram_stretch(image),
            Filter::HistogramEqualize => histogram_equalize(image),
            Filter::Sepia => sepia(image),
            Filter::Emboss => filter3x3(image, &EMBOSS),
            Filter::MedianBlur => {
                let radius = MEDIAN_KSIZE / 2;
                Image::from_rgb(median_filter(image.as_rgb(), radius, radius))
            }
            Filter::UnsharpMask => unsharp_mask(image),
            Filter::Opening => morph(image, &[Morph::Erode, Morph::Dilate])?,
            Filter::Closing => morph(image, &[Morph::Dilate, Morph::Erode])?,
        };
        Ok(out)
    }

    fn kind(&self) -> &'static str {
        self.name()
    }

    fn display_name(&self) -> String {
        self.label().to_string()
    }

    fn params(&self) -> Value {
        match self {
            Filter::GaussianBlur => json!({ "ksize": GAUSSIAN_KSIZE }),
            Filter::Canny => json!({ "low": CANNY_LOW, "high": CANNY_HIGH }),
            Filter::Erode | Filter::Dilate | Filter::Opening | Filter::Closing => {
                json!({ "ksize": MORPH_RADIUS * 2 + 1 })
            }
            Filter::Threshold => json!({ "threshold": THRESHOLD }),
            Filter::MedianBlur => json!({ "ksize": MEDIAN_KSIZE }),
            Filter::UnsharpMask => json!({ "sigma": UNSHARP_SIGMA, "strength": UNSHARP_STRENGTH }),
            _ => json!({}),
        }
    }

    fn box_clone(&self) -> Box<dyn Kernel> {
        Box::new(*self)
    }
}

// ============================================================================
// Implementations
// ============================================================================

fn grayscale(image: &Image) -> Image {
    image.map_pixels(|px| {
        let y = luma(px);
        [y, y, y]
    })
}

fn sobel(image: &Image) -> Image {
    let gray = image.to_luma();
    let gx = response3x3(&gray, &SOBEL_X);
    let gy = response3x3(&gray, &SOBEL_Y);
    magnitude_plane(&gray, gx.iter().zip(&gy).map(|(x, y)| (x * x + y * y).sqrt()))
}

fn laplacian(image: &Image) -> Image {
    let gray = image.to_luma();
    let response = response3x3(&gray, &LAPLACIAN);
    magnitude_plane(&gray, response.iter().map(|v| v.abs()))
}

/// Truncate non-negative responses into a grey plane
fn magnitude_plane(gray: &GrayImage, values: impl Iterator<Item = f32>) -> Image {
    let (w, h) = gray.dimensions();
    let data: Vec<u8> = values.map(|v| v.min(255.0) as u8).collect();
    match GrayImage::from_raw(w, h, data) {
        Some(plane) => Image::from_luma(&plane),
        None => Image::from_luma(gray),
    }
}

#[derive(Clone, Copy)]
enum Morph {
    Erode,
    Dilate,
}

/// Per-channel grey morphology with a square element; samples outside the
/// image do not take part.
fn morph(image: &Image, passes: &[Morph]) -> Result<Image> {
    let mask = Mask::square(MORPH_RADIUS);
    let planes = image.split_channels().map(|plane| {
        passes.iter().fold(plane, |acc, pass| match pass {
            Morph::Erode => grayscale_erode(&acc, &mask),
            Morph::Dilate => grayscale_dilate(&acc, &mask),
        })
    });
    Image::merge_channels(&planes)
}

fn threshold(image: &Image) -> Image {
    image.map_pixels(|px| {
        let v = if luma(px) > THRESHOLD { 255 } else { 0 };
        [v, v, v]
    })
}

fn histogram_stretch(image: &Image) -> Image {
    let mut lo = [u8::MAX; 3];
    let mut hi = [u8::MIN; 3];
    for px in image.as_rgb().pixels() {
        for c in 0..3 {
            lo[c] = lo[c].min(px.0[c]);
            hi[c] = hi[c].max(px.0[c]);
        }
    }

    image.map_pixels(|px| {
        let mut out = px;
        for c in 0..3 {
            if hi[c] > lo[c] {
                let span = (hi[c] - lo[c]) as f32;
                out[c] = ((px[c] - lo[c]) as f32 / span * 255.0) as u8;
            }
        }
        out
    })
}

/// Equalise the Y channel of YUV, leaving chroma alone
fn histogram_equalize(image: &Image) -> Image {
    let to_yuv = |[r, g, b]: [u8; 3]| {
        let y = luma([r, g, b]);
        let u = saturate((b as f32 - y as f32) * 0.492 + 128.0);
        let v = saturate((r as f32 - y as f32) * 0.877 + 128.0);
        (y, u, v)
    };

    let mut hist = [0u64; 256];
    for px in image.as_rgb().pixels() {
        hist[to_yuv(px.0).0 as usize] += 1;
    }
    let lut = equalize_lut(&hist);

    image.map_pixels(|px| {
        let (y, u, v) = to_yuv(px);
        let y = lut[y as usize] as f32;
        let (u, v) = (u as f32 - 128.0, v as f32 - 128.0);
        [
            saturate(y + 1.140 * v),
            saturate(y - 0.395 * u - 0.581 * v),
            saturate(y + 2.032 * u),
        ]
    })
}

/// Cumulative-histogram lookup table
fn equalize_lut(hist: &[u64; 256]) -> [u8; 256] {
    let total: u64 = hist.iter().sum();
    let first = hist.iter().position(|&n| n > 0).unwrap_or(0);
    let mut lut = [0u8; 256];

    // A single populated bin maps to itself
    if hist[first] == total {
        for (i, slot) in lut.iter_mut().enumerate() {
            *slot = i as u8;
        }
        return lut;
    }

    let scale = 255.0 / (total - hist[first]) as f32;
    let mut cdf = 0u64;
    for i in (first + 1)..256 {
        cdf += hist[i];
        lut[i] = saturate(cdf as f32 * scale);
    }
    lut
}

/// Classic sepia matrix, rows producing red, green and blue in that order
fn sepia(image: &Image) -> Image {
    image.map_pixels(|[r, g, b]| {
        let (r, g, b) = (r as f32, g as f32, b as f32);
        [
            saturate(0.393 * r + 0.769 * g + 0.189 * b),
            saturate(0.349 * r + 0.686 * g + 0.168 * b),
            saturate(0.272 * r + 0.534 * g + 0.131 * b),
        ]
    })
}

fn unsharp_mask(image: &Image) -> Image {
    let blurred = gaussian_blur_f32(image, ksize_for_sigma(UNSHARP_SIGMA), UNSHARP_SIGMA);
    let data: Vec<u8> = image
        .as_raw()
        .iter()
        .zip(&blurred)
        .map(|(&src, &blur)| {
            saturate(UNSHARP_STRENGTH * src as f32 - (UNSHARP_STRENGTH - 1.0) * blur)
        })
        .collect();
    let (w, h) = image.dimensions();
    Image::from_raw(w, h, data).unwrap_or_else(|_| image.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> Image {
        let data = (0..w * h)
            .flat_map(|i| {
                let x = i % w;
                let y = i / w;
                [(x * 255 / w) as u8, (y * 255 / h) as u8, ((x + y) % 256) as u8]
            })
            .collect();
        Image::from_raw(w, h, data).unwrap()
    }

    #[test]
    fn test_names_round_trip() {
        for filter in Filter::ALL {
            assert_eq!(Filter::from_name(filter.name()), Some(filter));
        }
        assert_eq!(Filter::from_name("Gaussian-Blur"), Some(Filter::GaussianBlur));
        assert_eq!(Filter::from_name("posterize"), None);
    }

    #[test]
    fn test_grayscale_red() {
        let out = Filter::Grayscale
            .apply(&Image::solid(4, 4, [255, 0, 0]))
            .unwrap();
        assert_eq!(out.pixel(2, 2), [76, 76, 76]);
    }

    #[test]
    fn test_every_filter_preserves_dimensions() {
        let img = gradient(24, 16);
        for filter in Filter::ALL {
            let out = filter.apply(&img).unwrap();
            assert_eq!(out.dimensions(), (24, 16), "{}", filter.name());
        }
    }

    #[test]
    fn test_edges_of_flat_image_are_black() {
        let flat = Image::solid(10, 10, [40, 80, 120]);
        for filter in [Filter::Sobel, Filter::Laplacian, Filter::Canny] {
            let out = filter.apply(&flat).unwrap();
            assert!(out.as_raw().iter().all(|&v| v == 0), "{}", filter.name());
        }
    }

    #[test]
    fn test_threshold_is_binary() {
        let out = Filter::Threshold.apply(&gradient(16, 16)).unwrap();
        assert!(out.as_raw().iter().all(|&v| v == 0 || v == 255));
    }

    #[test]
    fn test_histogram_stretch_expands_range() {
        let img = Image::from_raw(2, 1, vec![50, 100, 7, 150, 100, 9]).unwrap();
        let out = Filter::HistogramStretch.apply(&img).unwrap();
        // red and blue stretch, flat green channel is left alone
        assert_eq!(out.pixel(0, 0), [0, 100, 0]);
        assert_eq!(out.pixel(1, 0), [255, 100, 255]);
    }

    #[test]
    fn test_sepia_clamps_white() {
        let out = Filter::Sepia.apply(&Image::solid(1, 1, [255, 255, 255])).unwrap();
        assert_eq!(out.pixel(0, 0), [255, 255, 239]);
    }

    #[test]
    fn test_erode_then_dilate_removes_speck() {
        let mut data = vec![0u8; 9 * 9 * 3];
        let centre = (4 * 9 + 4) * 3;
        data[centre..centre + 3].copy_from_slice(&[255, 255, 255]);
        let img = Image::from_raw(9, 9, data).unwrap();

        let opened = Filter::Opening.apply(&img).unwrap();
        assert!(opened.as_raw().iter().all(|&v| v == 0));

        let dilated = Filter::Dilate.apply(&img).unwrap();
        assert_eq!(dilated.pixel(2, 2), [255, 255, 255]);
        assert_eq!(dilated.pixel(1, 1), [0, 0, 0]);
    }

    #[test]
    fn test_morphology_keeps_grey_levels() {
        let mut data = vec![100u8; 7 * 7 * 3];
        let centre = (3 * 7 + 3) * 3;
        data[centre..centre + 3].copy_from_slice(&[255, 255, 255]);
        let img = Image::from_raw(7, 7, data).unwrap();

        let dilated = Filter::Dilate.apply(&img).unwrap();
        assert_eq!(dilated.pixel(1, 1), [255, 255, 255]);
        assert_eq!(dilated.pixel(0, 0), [100, 100, 100]);

        let eroded = Filter::Erode.apply(&img).unwrap();
        assert_eq!(eroded.pixel(3, 3), [100, 100, 100]);
        assert_eq!(eroded.pixel(6, 6), [100, 100, 100]);
    }

    #[test]
    fn test_equalize_single_level_is_stable() {
        let flat = Image::solid(5, 5, [128, 128, 128]);
        let out = Filter::HistogramEqualize.apply(&flat).unwrap();
        assert_eq!(out.pixel(0, 0), [128, 128, 128]);
    }

    #[test]
    fn test_kernels_are_deterministic() {
        let img = gradient(20, 12);
        for filter in Filter::ALL {
            assert_eq!(filter.apply(&img).unwrap(), filter.apply(&img).unwrap());
        }
    }
}
