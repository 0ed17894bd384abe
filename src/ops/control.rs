//! Continuous controls
//!
//! A control is a slider-driven transform. Its value is transient until
//! committed, at which point it is captured by value into a kernel.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::adjust::{Brightness, Contrast};
use super::geometry::{Rotate, Scale, Translate};
use super::Kernel;

/// Slider-driven transforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    Brightness,
    Contrast,
    Scale,
    Translation,
    Rotation,
}

impl Control {
    /// Every control, in panel order
    pub const ALL: [Control; 5] = [
        Control::Brightness,
        Control::Contrast,
        Control::Scale,
        Control::Translation,
        Control::Rotation,
    ];

    /// The value for which this control changes nothing
    pub fn identity(self) -> ControlValue {
        match self {
            Control::Brightness => ControlValue::Brightness(0),
            Control::Contrast => ControlValue::Contrast(1.0),
            Control::Scale => ControlValue::Scale(100),
            Control::Translation => ControlValue::Translation(0, 0),
            Control::Rotation => ControlValue::Rotation(0),
        }
    }

    /// Machine identifier
    pub fn name(self) -> &'static str {
        match self {
            Control::Brightness => "brightness",
            Control::Contrast => "contrast",
            Control::Scale => "scale",
            Control::Translation => "translate",
            Control::Rotation => "rotate",
        }
    }

    /// Slider range, for listings
    pub fn range(self) -> &'static str {
        match self {
            Control::Brightness => "-100..100",
            Control::Contrast => "0.0..3.0",
            Control::Scale => "50..200 (%)",
            Control::Translation => "-200..200, -200..200",
            Control::Rotation => "-180..180 (degrees)",
        }
    }

    /// Look up a control by identifier
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "brightness" => Some(Control::Brightness),
            "contrast" => Some(Control::Contrast),
            "scale" => Some(Control::Scale),
            "translate" | "translation" => Some(Control::Translation),
            "rotate" | "rotation" => Some(Control::Rotation),
            _ => None,
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A pending parameter for one control
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlValue {
    Brightness(i32),
    Contrast(f32),
    Scale(u32),
    Translation(i32, i32),
    Rotation(i32),
}

impl ControlValue {
    /// Which control this value belongs to
    pub fn control(&self) -> Control {
        match self {
            ControlValue::Brightness(_) => Control::Brightness,
            ControlValue::Contrast(_) => Control::Contrast,
            ControlValue::Scale(_) => Control::Scale,
            ControlValue::Translation(..) => Control::Translation,
            ControlValue::Rotation(_) => Control::Rotation,
        }
    }

    /// Whether committing this value would change nothing
    pub fn is_identity(&self) -> bool {
        *self == self.control().identity()
    }

    /// Clamp into the slider range
    pub fn clamped(self) -> Self {
        match self {
            ControlValue::Brightness(v) => ControlValue::Brightness(v.clamp(-100, 100)),
            ControlValue::Contrast(v) => {
                let v = if v.is_finite() { v } else { 1.0 };
                ControlValue::Contrast(v.clamp(0.0, 3.0))
            }
            ControlValue::Scale(v) => ControlValue::Scale(v.clamp(50, 200)),
            ControlValue::Translation(x, y) => {
                ControlValue::Translation(x.clamp(-200, 200), y.clamp(-200, 200))
            }
            ControlValue::Rotation(v) => ControlValue::Rotation(v.clamp(-180, 180)),
        }
    }

    /// Bind the value into a kernel
    pub fn kernel(&self) -> Box<dyn Kernel> {
        match *self {
            ControlValue::Brightness(v) => Box::new(Brightness::new(v)),
            ControlValue::Contrast(v) => Box::new(Contrast::new(v)),
            ControlValue::Scale(v) => Box::new(Scale::new(v)),
            ControlValue::Translation(x, y) => Box::new(Translate::new(x, y)),
            ControlValue::Rotation(v) => Box::new(Rotate::new(v)),
        }
    }

    /// Name the layer gets when this value is committed
    pub fn layer_name(&self) -> String {
        self.kernel().display_name()
    }
}

impl fmt::Display for ControlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlValue::Brightness(v) => write!(f, "{:+}", v),
            ControlValue::Contrast(v) => write!(f, "{:.2}", v),
            ControlValue::Scale(v) => write!(f, "{}%", v),
            ControlValue::Translation(x, y) => write!(f, "X={}, Y={}", x, y),
            ControlValue::Rotation(v) => write!(f, "{}°", v),
        }
    }
}
