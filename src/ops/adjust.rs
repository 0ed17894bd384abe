//! Tonal adjustments
//!
//! Brightness and contrast with their values captured at commit time.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Kernel;
use crate::engine::buffer::saturate;
use crate::engine::Image;
use crate::error::Result;
use crate::impl_kernel_common;

/// Additive brightness offset
///
/// Negative sums fold back to their magnitude (`|v + offset|`) before
/// saturating at 255, so darkening a near-black pixel brightens it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brightness {
    offset: i32,
}

impl Brightness {
    pub fn new(offset: i32) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }
}

impl Kernel for Brightness {
    impl_kernel_common!("brightness");

    fn apply(&self, image: &Image) -> Result<Image> {
        let offset = self.offset;
        let lut: Vec<u8> = (0..=255i32).map(|v| (v + offset).abs().min(255) as u8).collect();
        Ok(image.map_pixels(|[r, g, b]| [lut[r as usize], lut[g as usize], lut[b as usize]]))
    }

    fn display_name(&self) -> String {
        format!("Brightness {:+}", self.offset)
    }

    fn params(&self) -> Value {
        json!({ "offset": self.offset })
    }
}

/// Multiplicative contrast gain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contrast {
    gain: f32,
}

impl Contrast {
    pub fn new(gain: f32) -> Self {
        Self { gain }
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }
}

impl Kernel for Contrast {
    impl_kernel_common!("contrast");

    fn apply(&self, image: &Image) -> Result<Image> {
        let gain = self.gain;
        let lut: Vec<u8> = (0..=255u32)
            .map(|v| saturate((v as f32 * gain).abs()))
            .collect();
        Ok(image.map_pixels(|[r, g, b]| [lut[r as usize], lut[g as usize], lut[b as usize]]))
    }

    fn display_name(&self) -> String {
        format!("Contrast {:.2}", self.gain)
    }

    fn params(&self) -> Value {
        json!({ "gain": self.gain })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brightness_saturates_and_folds() {
        let img = Image::from_raw(2, 1, vec![10, 200, 250, 0, 128, 255]).unwrap();
        let up = Brightness::new(50).apply(&img).unwrap();
        assert_eq!(up.as_raw(), &[60, 250, 255, 50, 178, 255]);

        let down = Brightness::new(-50).apply(&img).unwrap();
        assert_eq!(down.as_raw(), &[40, 150, 200, 50, 78, 205]);
    }

    #[test]
    fn test_contrast_scales_and_rounds() {
        let img = Image::from_raw(1, 1, vec![10, 100, 200]).unwrap();
        let out = Contrast::new(1.5).apply(&img).unwrap();
        assert_eq!(out.as_raw(), &[15, 150, 255]);

        let half = Contrast::new(0.25).apply(&img).unwrap();
        assert_eq!(half.as_raw(), &[3, 25, 50]);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Brightness::new(50).display_name(), "Brightness +50");
        assert_eq!(Brightness::new(-7).display_name(), "Brightness -7");
        assert_eq!(Contrast::new(1.5).display_name(), "Contrast 1.50");
    }
}
