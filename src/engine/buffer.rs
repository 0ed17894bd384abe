//! Image Buffer
//!
//! The pixel buffer every stage reads and produces. Buffers are 8-bit RGB
//! and are never mutated once handed downstream: kernels read one `Image`
//! and return a new one.

use image::{imageops, GrayImage, Luma, Rgb, RgbImage};

use crate::error::{Result, StrataError};

// ============================================================================
// Constants
// ============================================================================

/// Channels per pixel
pub const CHANNELS: usize = 3;

// Fixed-point luma weights (0.299, 0.587, 0.114 scaled by 2^14)
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;

// ============================================================================
// Helper Functions
// ============================================================================

/// Luma of one RGB pixel, `0.299 R + 0.587 G + 0.114 B` rounded
#[inline]
pub fn luma(rgb: [u8; 3]) -> u8 {
    let sum = rgb[0] as u32 * LUMA_R + rgb[1] as u32 * LUMA_G + rgb[2] as u32 * LUMA_B;
    ((sum + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8
}

/// Round and saturate a float sample into 0..=255
#[inline]
pub fn saturate(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

// ============================================================================
// Image
// ============================================================================

/// Owned 8-bit RGB image
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    pixels: RgbImage,
}

impl Image {
    /// Create a black image
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbImage::new(width, height),
        }
    }

    /// Create an image filled with one colour
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self {
            pixels: RgbImage::from_pixel(width, height, Rgb(rgb)),
        }
    }

    /// Create from raw interleaved RGB bytes
    ///
    /// # Errors
    /// Returns `InvalidImage` if `data.len() != width * height * 3`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(StrataError::InvalidImage {
                reason: format!(
                    "expected {} bytes for {}x{} RGB, got {}",
                    expected,
                    width,
                    height,
                    data.len()
                ),
            });
        }
        RgbImage::from_raw(width, height, data)
            .map(Self::from_rgb)
            .ok_or_else(|| StrataError::InvalidImage {
                reason: "buffer does not match dimensions".to_string(),
            })
    }

    /// Wrap an existing RGB buffer
    pub fn from_rgb(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    /// Build an RGB image by replicating a single-channel buffer
    pub fn from_luma(gray: &GrayImage) -> Self {
        let pixels = RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
            let v = gray.get_pixel(x, y).0[0];
            Rgb([v, v, v])
        });
        Self { pixels }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Channel count (always 3)
    pub fn channels(&self) -> usize {
        CHANNELS
    }

    /// (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Whether the image has no pixels
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Get one pixel
    ///
    /// Panics if out of bounds, like `RgbImage::get_pixel`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels.get_pixel(x, y).0
    }

    /// Borrow the underlying RGB buffer
    pub fn as_rgb(&self) -> &RgbImage {
        &self.pixels
    }

    /// Take the underlying RGB buffer
    pub fn into_rgb(self) -> RgbImage {
        self.pixels
    }

    /// Raw interleaved bytes
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Single-channel luma copy
    pub fn to_luma(&self) -> GrayImage {
        GrayImage::from_fn(self.width(), self.height(), |x, y| {
            Luma([luma(self.pixel(x, y))])
        })
    }

    /// Apply a per-pixel function, producing a new image
    pub fn map_pixels<F>(&self, f: F) -> Image
    where
        F: Fn([u8; 3]) -> [u8; 3],
    {
        let mut out = self.pixels.clone();
        for px in out.pixels_mut() {
            px.0 = f(px.0);
        }
        Image::from_rgb(out)
    }

    /// Split into one `GrayImage` per channel
    pub fn split_channels(&self) -> [GrayImage; 3] {
        let (w, h) = self.dimensions();
        [0, 1, 2].map(|c| GrayImage::from_fn(w, h, |x, y| Luma([self.pixel(x, y)[c]])))
    }

    /// Inverse of `split_channels`
    ///
    /// # Errors
    /// Returns `InvalidImage` if the planes differ in size.
    pub fn merge_channels(planes: &[GrayImage; 3]) -> Result<Image> {
        let dims = planes[0].dimensions();
        if planes.iter().any(|p| p.dimensions() != dims) {
            return Err(StrataError::InvalidImage {
                reason: "channel planes differ in size".to_string(),
            });
        }
        let pixels = RgbImage::from_fn(dims.0, dims.1, |x, y| {
            Rgb([
                planes[0].get_pixel(x, y).0[0],
                planes[1].get_pixel(x, y).0[0],
                planes[2].get_pixel(x, y).0[0],
            ])
        });
        Ok(Image::from_rgb(pixels))
    }

    /// Size this image takes when fitted inside `max_width` x `max_height`
    ///
    /// Aspect ratio is preserved and the image is never enlarged.
    pub fn display_size(&self, max_width: u32, max_height: u32) -> (u32, u32) {
        let (w, h) = self.dimensions();
        if w == 0 || h == 0 {
            return (w, h);
        }
        let scale = (max_width as f64 / w as f64)
            .min(max_height as f64 / h as f64)
            .min(1.0);
        (
            ((w as f64 * scale) as u32).max(1),
            ((h as f64 * scale) as u32).max(1),
        )
    }

    /// Downscaled copy for on-screen display
    pub fn to_display(&self, max_width: u32, max_height: u32) -> Image {
        let (dw, dh) = self.display_size(max_width, max_height);
        if (dw, dh) == self.dimensions() {
            return self.clone();
        }
        Image::from_rgb(imageops::resize(
            &self.pixels,
            dw,
            dh,
            imageops::FilterType::Triangle,
        ))
    }
}
