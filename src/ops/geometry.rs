//! Geometric transforms
//!
//! Scale changes the canvas size; translate and rotate keep it and fill
//! uncovered pixels with black.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Kernel;
use crate::engine::Image;
use crate::error::{Result, StrataError};
use crate::impl_kernel_common;

const FILL: Rgb<u8> = Rgb([0, 0, 0]);

/// Slack for source coordinates landing a rounding error past the edge
const EDGE_EPSILON: f64 = 1e-6;

/// Resize by a percentage with bilinear sampling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    percent: u32,
}

impl Scale {
    pub fn new(percent: u32) -> Self {
        Self { percent }
    }

    pub fn percent(&self) -> u32 {
        self.percent
    }

    /// Output size for an input of `width` x `height`
    pub fn target_size(&self, width: u32, height: u32) -> (u32, u32) {
        let factor = self.percent as f64 / 100.0;
        (
            (width as f64 * factor) as u32,
            (height as f64 * factor) as u32,
        )
    }
}

impl Kernel for Scale {
    impl_kernel_common!("scale");

    fn apply(&self, image: &Image) -> Result<Image> {
        let (w, h) = self.target_size(image.width(), image.height());
        if w == 0 || h == 0 {
            return Err(StrataError::kernel(
                "scale",
                format!(
                    "{}% of {}x{} is an empty image",
                    self.percent,
                    image.width(),
                    image.height()
                ),
            ));
        }
        if (w, h) == image.dimensions() {
            return Ok(image.clone());
        }
        Ok(Image::from_rgb(imageops::resize(
            image.as_rgb(),
            w,
            h,
            FilterType::Triangle,
        )))
    }

    fn display_name(&self) -> String {
        format!("Scale {}%", self.percent)
    }

    fn params(&self) -> Value {
        json!({ "percent": self.percent })
    }
}

/// Integer shift on a fixed canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translate {
    dx: i32,
    dy: i32,
}

impl Translate {
    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    pub fn offset(&self) -> (i32, i32) {
        (self.dx, self.dy)
    }
}

impl Kernel for Translate {
    impl_kernel_common!("translate");

    fn apply(&self, image: &Image) -> Result<Image> {
        let (w, h) = image.dimensions();
        let src = image.as_rgb();
        let out = RgbImage::from_fn(w, h, |x, y| {
            let sx = x as i64 - self.dx as i64;
            let sy = y as i64 - self.dy as i64;
            if sx < 0 || sy < 0 || sx >= w as i64 || sy >= h as i64 {
                FILL
            } else {
                *src.get_pixel(sx as u32, sy as u32)
            }
        });
        Ok(Image::from_rgb(out))
    }

    fn display_name(&self) -> String {
        format!("Translate X={} Y={}", self.dx, self.dy)
    }

    fn params(&self) -> Value {
        json!({ "dx": self.dx, "dy": self.dy })
    }
}

/// Counter-clockwise rotation about the integer image centre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rotate {
    degrees: i32,
}

impl Rotate {
    pub fn new(degrees: i32) -> Self {
        Self { degrees }
    }

    pub fn degrees(&self) -> i32 {
        self.degrees
    }
}

impl Kernel for Rotate {
    impl_kernel_common!("rotate");

    fn apply(&self, image: &Image) -> Result<Image> {
        if self.degrees % 360 == 0 {
            return Ok(image.clone());
        }
        let (w, h) = image.dimensions();
        let (cx, cy) = ((w / 2) as f64, (h / 2) as f64);
        let (sin, cos) = (self.degrees as f64).to_radians().sin_cos();
        let src = image.as_rgb();

        // Inverse map: output pixel -> source position
        let out = RgbImage::from_fn(w, h, |x, y| {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            let sx = cx + cos * dx - sin * dy;
            let sy = cy + sin * dx + cos * dy;
            sample_bilinear(src, sx, sy).unwrap_or(FILL)
        });
        Ok(Image::from_rgb(out))
    }

    fn display_name(&self) -> String {
        format!("Rotate {}°", self.degrees)
    }

    fn params(&self) -> Value {
        json!({ "degrees": self.degrees })
    }
}

/// Bilinear sample; `None` when `(x, y)` lies outside the pixel grid
///
/// Positions on the last row or column interpolate against themselves.
fn sample_bilinear(src: &RgbImage, x: f64, y: f64) -> Option<Rgb<u8>> {
    let (w, h) = src.dimensions();
    let max_x = (w - 1) as f64;
    let max_y = (h - 1) as f64;
    let outside = |v: f64, max: f64| v < -EDGE_EPSILON || v > max + EDGE_EPSILON;
    if outside(x, max_x) || outside(y, max_y) {
        return None;
    }
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = src.get_pixel(x0, y0).0;
    let p10 = src.get_pixel(x1, y0).0;
    let p01 = src.get_pixel(x0, y1).0;
    let p11 = src.get_pixel(x1, y1).0;

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = p00[c] as f64 * (1.0 - fx) + p10[c] as f64 * fx;
        let bottom = p01[c] as f64 * (1.0 - fx) + p11[c] as f64 * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Some(Rgb(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked(w: u32, h: u32, at: (u32, u32)) -> Image {
        let mut rgb = RgbImage::new(w, h);
        rgb.put_pixel(at.0, at.1, Rgb([255, 255, 255]));
        Image::from_rgb(rgb)
    }

    #[test]
    fn test_scale_target_size_truncates() {
        assert_eq!(Scale::new(150).target_size(101, 33), (151, 49));
        assert_eq!(Scale::new(50).target_size(3, 3), (1, 1));
    }

    #[test]
    fn test_scale_changes_dimensions() {
        let out = Scale::new(200).apply(&Image::solid(10, 6, [9, 9, 9])).unwrap();
        assert_eq!(out.dimensions(), (20, 12));
        assert_eq!(out.pixel(19, 11), [9, 9, 9]);
    }

    #[test]
    fn test_scale_to_nothing_fails() {
        let err = Scale::new(50).apply(&Image::new(1, 1)).unwrap_err();
        assert_eq!(err.error_code(), "KERNEL_FAILED");
    }

    #[test]
    fn test_translate_moves_and_fills_black() {
        let img = marked(5, 5, (1, 1));
        let out = Translate::new(2, 3).apply(&img).unwrap();
        assert_eq!(out.pixel(3, 4), [255, 255, 255]);
        assert_eq!(out.pixel(1, 1), [0, 0, 0]);

        let gone = Translate::new(-10, 0).apply(&img).unwrap();
        assert!(gone.as_raw().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_rotate_is_counter_clockwise() {
        let img = marked(5, 5, (4, 2));
        let out = Rotate::new(90).apply(&img).unwrap();
        assert_eq!(out.dimensions(), (5, 5));
        assert_eq!(out.pixel(2, 0), [255, 255, 255]);
        assert_eq!(out.pixel(4, 2), [0, 0, 0]);
    }

    #[test]
    fn test_quarter_turn_keeps_square_covered() {
        let img = Image::solid(5, 5, [255, 255, 255]);
        for degrees in [90, -90, 180] {
            let out = Rotate::new(degrees).apply(&img).unwrap();
            assert!(out.as_raw().iter().all(|&v| v == 255), "{}°", degrees);
        }
    }

    #[test]
    fn test_interior_marker_quarter_turn() {
        let img = marked(9, 7, (5, 3));
        let out = Rotate::new(90).apply(&img).unwrap();
        assert_eq!(out.pixel(4, 2), [255, 255, 255]);
        assert_eq!(out.as_raw().iter().filter(|&&v| v == 255).count(), 3);
    }

    #[test]
    fn test_rotate_fills_uncovered_corners() {
        let img = Image::solid(9, 9, [200, 200, 200]);
        let out = Rotate::new(45).apply(&img).unwrap();
        assert_eq!(out.pixel(0, 0), [0, 0, 0]);
        assert_eq!(out.pixel(4, 4), [200, 200, 200]);
    }

    #[test]
    fn test_full_turn_is_identity() {
        let img = marked(4, 3, (0, 0));
        assert_eq!(Rotate::new(360).apply(&img).unwrap(), img);
    }
}
