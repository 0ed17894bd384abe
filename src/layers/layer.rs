//! A single layer: one named, toggleable kernel

use serde_json::{json, Value};
use uuid::Uuid;

use crate::engine::Image;
use crate::error::Result;
use crate::ops::Kernel;

/// One step of the stack
///
/// Name and kernel are fixed at creation; only `enabled` changes.
#[derive(Debug, Clone)]
pub struct Layer {
    id: Uuid,
    name: String,
    enabled: bool,
    kernel: Box<dyn Kernel>,
}

impl Layer {
    /// Create a new, enabled layer
    pub fn new(name: impl Into<String>, kernel: Box<dyn Kernel>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            enabled: true,
            kernel,
        }
    }

    /// Create a layer named after its kernel
    pub fn from_kernel(kernel: Box<dyn Kernel>) -> Self {
        let name = kernel.display_name();
        Self::new(name, kernel)
    }

    /// Unique instance ID; two layers with equal names still differ here
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Flip `enabled`, returning the new state
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    pub fn kernel(&self) -> &dyn Kernel {
        self.kernel.as_ref()
    }

    /// Run this layer's kernel
    pub fn apply(&self, image: &Image) -> Result<Image> {
        self.kernel.apply(image)
    }

    /// Listing form
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id.to_string(),
            "name": self.name,
            "enabled": self.enabled,
            "kind": self.kernel.kind(),
            "params": self.kernel.params(),
        })
    }
}
