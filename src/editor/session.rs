//! Editor state
//!
//! Owns the original image, the layer stack, the derived current image and
//! the status line. Every user action goes through one of the methods
//! here; rendering subscribes via `subscribe` and redraws on change.
//!
//! Failure policy:
//! - No image loaded: layer actions are ignored (`EditOutcome::NoImage`).
//! - Commit-time layer failure: the current image is left untouched and
//!   the status names the failing layer.
//! - Preview-time layer failure: that layer is skipped.
//! - I/O failure: returned as an error, in-memory state untouched.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::preview::PreviewSession;
use crate::config::StrataConfig;
use crate::engine::{load_image, save_image, Image};
use crate::error::{Result, StrataError};
use crate::layers::{Layer, LayerStack, SkippedLayer};
use crate::ops::{Control, ControlValue, Filter, Kernel};

type Observer = Box<dyn FnMut(&Image)>;

/// What a layer or preview action did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// No original image; nothing happened
    NoImage,
    /// Nothing to do (stale index, identity commit, no live control)
    Unchanged,
    /// The stack was recomposed successfully
    Applied { enabled: usize },
    /// Recomposition aborted at this layer; current image kept
    Failed { index: usize, name: String },
    /// A preview is on screen
    Previewed { skipped: Vec<SkippedLayer> },
    /// The pending preview operation itself failed; current image kept
    PreviewFailed { reason: String },
}

impl EditOutcome {
    /// Whether the action left a freshly computed image on screen
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            EditOutcome::Applied { .. } | EditOutcome::Previewed { .. }
        )
    }
}

/// Layered image editor
pub struct Editor {
    config: StrataConfig,
    source_path: Option<PathBuf>,
    original: Option<Image>,
    current: Option<Image>,
    committed: Option<Image>,
    layers: LayerStack,
    preview: PreviewSession,
    status: String,
    observers: Vec<Observer>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(StrataConfig::default())
    }
}

impl Editor {
    /// Create an editor with no image
    pub fn new(config: StrataConfig) -> Self {
        Self {
            config,
            source_path: None,
            original: None,
            current: None,
            committed: None,
            layers: LayerStack::new(),
            preview: PreviewSession::new(),
            status: "Ready".to_string(),
            observers: Vec::new(),
        }
    }

    // ========================================================================
    // Observers
    // ========================================================================

    pub fn config(&self) -> &StrataConfig {
        &self.config
    }

    pub fn original(&self) -> Option<&Image> {
        self.original.as_ref()
    }

    /// The image on screen (committed composite or live preview)
    pub fn current(&self) -> Option<&Image> {
        self.current.as_ref()
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    /// The status line
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn enabled_count(&self) -> usize {
        self.layers.enabled_count()
    }

    pub fn active_control(&self) -> Option<Control> {
        self.preview.active()
    }

    pub fn control_value(&self, control: Control) -> ControlValue {
        self.preview.value(control)
    }

    /// Whether an uncommitted preview is on screen
    pub fn is_previewing(&self) -> bool {
        self.preview.is_showing()
    }

    /// Current image fitted into the configured display box
    pub fn display_image(&self) -> Option<Image> {
        let (w, h) = self.config.max_display;
        self.current.as_ref().map(|img| img.to_display(w, h))
    }

    /// Register a redraw hook, called after every change of the current image
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&Image) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    // ========================================================================
    // Image Lifecycle
    // ========================================================================

    /// Load an image from disk and make it the original
    ///
    /// # Errors
    /// Decode or file errors; editor state is untouched on failure.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let image = load_image(path)?;
        self.set_original(image);
        self.source_path = Some(path.to_path_buf());

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.status = format!("Loaded {}", file_name);
        Ok(())
    }

    /// Replace the original image, clearing layers and sliders
    pub fn set_original(&mut self, image: Image) {
        info!("New original image {}x{}", image.width(), image.height());
        self.source_path = None;
        self.layers.clear();
        self.preview.reset_all();
        self.committed = Some(image.clone());
        self.original = Some(image);
        self.status = "Image loaded".to_string();
        self.show_committed();
    }

    /// Save the current image
    ///
    /// # Errors
    /// `NoImage` if nothing is loaded, otherwise encode errors.
    pub fn save(&mut self, path: &Path) -> Result<PathBuf> {
        let current = self.current.as_ref().ok_or(StrataError::NoImage)?;
        let written = save_image(current, path, &self.config)?;
        self.status = format!("Saved {}", written.display());
        Ok(written)
    }

    /// Drop every layer and show the original again
    ///
    /// # Errors
    /// `NoImage` if nothing is loaded.
    pub fn reset(&mut self) -> Result<()> {
        let original = self.original.clone().ok_or(StrataError::NoImage)?;
        self.layers.clear();
        self.preview.reset_all();
        self.committed = Some(original);
        self.status = "Restored original image".to_string();
        self.show_committed();
        Ok(())
    }

    // ========================================================================
    // Layer Stack
    // ========================================================================

    /// Append a new enabled layer and recompose
    pub fn add_layer(&mut self, name: impl Into<String>, kernel: Box<dyn Kernel>) -> EditOutcome {
        if self.original.is_none() {
            return EditOutcome::NoImage;
        }
        let layer = Layer::new(name, kernel);
        info!("Adding layer '{}'", layer.name());
        self.layers.push(layer);
        self.recompose()
    }

    /// Add a fixed filter, closing any live control first
    pub fn add_filter(&mut self, filter: Filter) -> EditOutcome {
        if self.original.is_none() {
            return EditOutcome::NoImage;
        }
        self.preview.deactivate();
        self.add_layer(filter.label(), Box::new(filter))
    }

    /// Remove the layer at `index`; stale indices are ignored
    pub fn remove_layer(&mut self, index: usize) -> EditOutcome {
        match self.layers.remove(index) {
            Some(layer) => {
                info!("Removed layer {} ('{}')", index, layer.name());
                self.recompose()
            }
            None => EditOutcome::Unchanged,
        }
    }

    /// Flip a layer's enabled flag and recompose
    pub fn toggle_layer(&mut self, index: usize) -> EditOutcome {
        match self.layers.toggle(index) {
            Some(enabled) => {
                debug!("Layer {} enabled={}", index, enabled);
                self.recompose()
            }
            None => EditOutcome::Unchanged,
        }
    }

    /// Set a layer's enabled flag and recompose
    pub fn set_layer_enabled(&mut self, index: usize, enabled: bool) -> EditOutcome {
        if self.layers.set_enabled(index, enabled) {
            self.recompose()
        } else {
            EditOutcome::Unchanged
        }
    }

    /// Remove every layer; the current image becomes a copy of the original
    pub fn clear_layers(&mut self) -> EditOutcome {
        self.layers.clear();
        let Some(original) = self.original.clone() else {
            return EditOutcome::NoImage;
        };
        self.committed = Some(original);
        self.status = "All layers removed".to_string();
        self.show_committed();
        EditOutcome::Applied { enabled: 0 }
    }

    /// Refold every enabled layer over the original
    ///
    /// On failure the current image is left as it was and the status names
    /// the failing layer.
    pub fn recompose(&mut self) -> EditOutcome {
        let Some(original) = self.original.as_ref() else {
            return EditOutcome::NoImage;
        };

        match self.layers.compose(original) {
            Ok(composite) => {
                let enabled = composite.enabled_count;
                self.committed = Some(composite.image);
                self.status = format!("{} layer(s) applied", enabled);
                self.show_committed();
                EditOutcome::Applied { enabled }
            }
            Err(StrataError::LayerFailed { index, name, .. }) => {
                self.status = format!("Layer failed: {}", name);
                EditOutcome::Failed { index, name }
            }
            Err(e) => {
                warn!("Recomposition failed: {}", e);
                self.status = format!("Recomposition failed: {}", e);
                EditOutcome::Failed {
                    index: self.layers.len(),
                    name: String::new(),
                }
            }
        }
    }

    // ========================================================================
    // Live Preview
    // ========================================================================

    /// Open a continuous control
    ///
    /// Discards any uncommitted preview and resets every slider.
    pub fn activate_control(&mut self, control: Control) -> EditOutcome {
        if self.original.is_none() {
            return EditOutcome::NoImage;
        }
        if self.preview.activate(control) {
            debug!("Switched live control to {}", control);
        }
        self.show_committed();
        EditOutcome::Unchanged
    }

    /// Close the live control, reverting to the committed composite
    pub fn cancel_preview(&mut self) -> EditOutcome {
        if self.original.is_none() {
            return EditOutcome::NoImage;
        }
        self.preview.deactivate();
        self.show_committed();
        EditOutcome::Unchanged
    }

    /// Show the stack plus one pending operation, without committing
    ///
    /// If `value` belongs to a control other than the live one, that
    /// control is activated first.
    pub fn preview(&mut self, value: ControlValue) -> EditOutcome {
        if self.original.is_none() {
            return EditOutcome::NoImage;
        }

        let control = value.control();
        if self.preview.active() != Some(control) {
            self.activate_control(control);
        }
        let value = self.preview.set(value);

        let Some(original) = self.original.as_ref() else {
            return EditOutcome::NoImage;
        };
        let base = self.layers.compose_lenient(original);
        match value.kernel().apply(&base.image) {
            Ok(image) => {
                self.status = format!("{} preview: {}", label(control), value);
                self.preview.set_showing(true);
                self.current = Some(image);
                self.notify();
                EditOutcome::Previewed {
                    skipped: base.skipped,
                }
            }
            Err(e) => {
                warn!("Preview of {} failed: {}", value.layer_name(), e);
                self.status = format!("Preview failed: {}", e);
                EditOutcome::PreviewFailed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Turn the live control's value into a layer
    ///
    /// Identity values add nothing.
    pub fn commit_preview(&mut self) -> EditOutcome {
        if self.original.is_none() {
            return EditOutcome::NoImage;
        }
        let Some(control) = self.preview.active() else {
            return EditOutcome::Unchanged;
        };

        let value = self.preview.value(control);
        if value.is_identity() {
            debug!("Identity {} commit ignored", control);
            return EditOutcome::Unchanged;
        }

        let outcome = self.add_layer(value.layer_name(), value.kernel());
        if let EditOutcome::Applied { .. } = outcome {
            self.status = format!("Added layer: {}", value.layer_name());
        }
        outcome
    }

    /// Set a control's value and commit it in one step
    pub fn commit_value(&mut self, value: ControlValue) -> EditOutcome {
        if self.original.is_none() {
            return EditOutcome::NoImage;
        }
        let control = value.control();
        if self.preview.active() != Some(control) {
            self.activate_control(control);
        }
        self.preview.set(value);
        self.commit_preview()
    }

    /// Move the live control back to identity and show the committed state
    pub fn reset_control(&mut self) -> EditOutcome {
        if self.original.is_none() {
            return EditOutcome::NoImage;
        }
        let Some(control) = self.preview.active() else {
            return EditOutcome::Unchanged;
        };
        self.preview.reset(control);
        self.preview.set_showing(false);
        self.status = format!("{} reset", label(control));
        self.show_committed();
        EditOutcome::Unchanged
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn show_committed(&mut self) {
        self.preview.set_showing(false);
        if self.current != self.committed {
            self.current = self.committed.clone();
            self.notify();
        }
    }

    fn notify(&mut self) {
        if let Some(current) = self.current.as_ref() {
            for observer in &mut self.observers {
                observer(current);
            }
        }
    }
}

fn label(control: Control) -> &'static str {
    match control {
        Control::Brightness => "Brightness",
        Control::Contrast => "Contrast",
        Control::Scale => "Scale",
        Control::Translation => "Translation",
        Control::Rotation => "Rotation",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn loaded() -> Editor {
        let mut editor = Editor::default();
        editor.set_original(Image::solid(4, 4, [200, 50, 10]));
        editor
    }

    #[test]
    fn test_actions_without_image_are_ignored() {
        let mut editor = Editor::default();
        assert_eq!(editor.add_filter(Filter::Sepia), EditOutcome::NoImage);
        assert_eq!(editor.preview(ControlValue::Brightness(5)), EditOutcome::NoImage);
        assert_eq!(editor.recompose(), EditOutcome::NoImage);
        assert!(editor.layers().is_empty());
        assert_eq!(editor.status(), "Ready");
        assert!(matches!(editor.reset(), Err(StrataError::NoImage)));
    }

    #[test]
    fn test_add_updates_status() {
        let mut editor = loaded();
        assert_eq!(
            editor.add_filter(Filter::Grayscale),
            EditOutcome::Applied { enabled: 1 }
        );
        assert_eq!(editor.status(), "1 layer(s) applied");
    }

    #[test]
    fn test_stale_index_is_ignored() {
        let mut editor = loaded();
        editor.add_filter(Filter::Sepia);
        assert_eq!(editor.remove_layer(3), EditOutcome::Unchanged);
        assert_eq!(editor.toggle_layer(1), EditOutcome::Unchanged);
        assert_eq!(editor.layers().len(), 1);
    }

    #[test]
    fn test_clear_restores_original() {
        let mut editor = loaded();
        editor.add_filter(Filter::Threshold);
        editor.clear_layers();
        assert_eq!(editor.current(), editor.original());
        assert_eq!(editor.status(), "All layers removed");
    }

    #[test]
    fn test_observer_sees_every_change() {
        let mut editor = loaded();
        let redraws = Rc::new(Cell::new(0));
        let counter = Rc::clone(&redraws);
        editor.subscribe(move |_| counter.set(counter.get() + 1));

        editor.add_filter(Filter::Grayscale);
        editor.preview(ControlValue::Brightness(30));
        editor.cancel_preview();
        assert_eq!(redraws.get(), 3);
    }

    #[test]
    fn test_reset_control_reverts_preview() {
        let mut editor = loaded();
        let before = editor.current().cloned();
        editor.preview(ControlValue::Contrast(2.0));
        assert!(editor.is_previewing());

        editor.reset_control();
        assert_eq!(editor.current().cloned(), before);
        assert_eq!(
            editor.control_value(Control::Contrast),
            ControlValue::Contrast(1.0)
        );
        assert_eq!(editor.status(), "Contrast reset");
    }

    #[test]
    fn test_preview_failure_keeps_current() {
        let mut editor = Editor::default();
        editor.set_original(Image::solid(1, 1, [9, 9, 9]));
        let before = editor.current().cloned();

        let outcome = editor.preview(ControlValue::Scale(50));
        assert!(matches!(outcome, EditOutcome::PreviewFailed { .. }));
        assert_eq!(editor.current().cloned(), before);
    }
}
