//! Layer Stack
//!
//! Ordered list of layers, folded left to right over a fresh copy of the
//! original image on every evaluation. The previous composite is never an
//! input.
//!
//! Two fold policies exist:
//! - `compose` (commit): the first failing layer aborts the whole fold.
//! - `compose_lenient` (preview): a failing layer is skipped and the fold
//!   continues with the image as it was before that layer.

use log::{debug, warn};
use serde_json::Value;

use super::layer::Layer;
use crate::engine::Image;
use crate::error::{Result, StrataError};

/// A layer the lenient fold stepped over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLayer {
    pub index: usize,
    pub name: String,
    pub reason: String,
}

/// Result of folding the stack
#[derive(Debug, Clone)]
pub struct Composite {
    /// The fully folded image
    pub image: Image,
    /// Enabled layers at fold time
    pub enabled_count: usize,
    /// Layers skipped because they failed (always empty for `compose`)
    pub skipped: Vec<SkippedLayer>,
}

/// Ordered sequence of layers
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    /// Create a new empty stack
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Append a layer to the end of the stack
    ///
    /// # Returns
    /// The index of the new layer
    pub fn push(&mut self, layer: Layer) -> usize {
        self.layers.push(layer);
        self.layers.len() - 1
    }

    /// Remove the layer at `index`; `None` if out of bounds
    pub fn remove(&mut self, index: usize) -> Option<Layer> {
        if index < self.layers.len() {
            Some(self.layers.remove(index))
        } else {
            None
        }
    }

    /// Flip `enabled` at `index`, returning the new state
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        self.layers.get_mut(index).map(Layer::toggle)
    }

    /// Set `enabled` at `index`; returns `false` if out of bounds
    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> bool {
        match self.layers.get_mut(index) {
            Some(layer) => {
                layer.set_enabled(enabled);
                true
            }
            None => false,
        }
    }

    /// Remove every layer
    pub fn clear(&mut self) {
        self.layers.clear();
    }

    pub fn get(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    /// Number of layers that currently contribute
    pub fn enabled_count(&self) -> usize {
        self.layers.iter().filter(|l| l.is_enabled()).count()
    }

    /// Strict fold used when committing
    ///
    /// # Errors
    /// `LayerFailed` naming the first enabled layer whose kernel fails. No
    /// partial result is returned.
    pub fn compose(&self, original: &Image) -> Result<Composite> {
        let mut result = original.clone();
        for (index, layer) in self.enabled() {
            result = layer.apply(&result).map_err(|e| {
                warn!("Layer {} ('{}') failed: {}", index, layer.name(), e);
                StrataError::LayerFailed {
                    index,
                    name: layer.name().to_string(),
                    source: Box::new(e),
                }
            })?;
        }

        debug!("Composed {} enabled layer(s)", self.enabled_count());
        Ok(Composite {
            image: result,
            enabled_count: self.enabled_count(),
            skipped: Vec::new(),
        })
    }

    /// Lenient fold used for live preview
    ///
    /// Never fails: a failing layer contributes nothing and is reported in
    /// `Composite::skipped`.
    pub fn compose_lenient(&self, original: &Image) -> Composite {
        let mut result = original.clone();
        let mut skipped = Vec::new();
        for (index, layer) in self.enabled() {
            match layer.apply(&result) {
                Ok(next) => result = next,
                Err(e) => {
                    debug!("Preview skipped layer {} ('{}'): {}", index, layer.name(), e);
                    skipped.push(SkippedLayer {
                        index,
                        name: layer.name().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Composite {
            image: result,
            enabled_count: self.enabled_count(),
            skipped,
        }
    }

    /// Serialize the layer list to JSON
    pub fn to_json(&self) -> Value {
        Value::Array(self.layers.iter().map(Layer::to_json).collect())
    }

    fn enabled(&self) -> impl Iterator<Item = (usize, &Layer)> {
        self.layers
            .iter()
            .enumerate()
            .filter(|(_, layer)| layer.is_enabled())
    }
}
