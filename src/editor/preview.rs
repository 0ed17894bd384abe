//! Live preview session
//!
//! Tracks which continuous control is live and where every slider sits.
//! At most one control is active; switching controls resets all sliders
//! to their identity values.

use std::collections::HashMap;

use crate::ops::{Control, ControlValue};

/// Slider state for the continuous controls
#[derive(Debug, Clone, Default)]
pub struct PreviewSession {
    active: Option<Control>,
    values: HashMap<Control, ControlValue>,
    showing: bool,
}

impl PreviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The live control, if any
    pub fn active(&self) -> Option<Control> {
        self.active
    }

    /// Current slider position of `control` (identity when untouched)
    pub fn value(&self, control: Control) -> ControlValue {
        self.values
            .get(&control)
            .copied()
            .unwrap_or_else(|| control.identity())
    }

    /// Whether the displayed image is an uncommitted preview
    pub fn is_showing(&self) -> bool {
        self.showing
    }

    /// Make `control` the live one, resetting every slider
    ///
    /// # Returns
    /// `true` if a different control was live before
    pub fn activate(&mut self, control: Control) -> bool {
        let switched = self.active.is_some_and(|c| c != control);
        self.reset_all();
        self.active = Some(control);
        switched
    }

    /// Close the live control without resetting sliders
    pub fn deactivate(&mut self) {
        self.active = None;
        self.showing = false;
    }

    /// Move a slider; the value is clamped into range
    pub fn set(&mut self, value: ControlValue) -> ControlValue {
        let value = value.clamped();
        self.values.insert(value.control(), value);
        value
    }

    /// Move one slider back to identity
    pub fn reset(&mut self, control: Control) {
        self.values.remove(&control);
    }

    /// Move every slider back to identity
    pub fn reset_all(&mut self) {
        self.values.clear();
        self.showing = false;
    }

    pub(crate) fn set_showing(&mut self, showing: bool) {
        self.showing = showing;
    }
}
