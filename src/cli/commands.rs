//! CLI Command Implementations
//!
//! Each command drives an `Editor` the same way an interactive front end
//! would: load, push layers, preview or commit, save.

use std::path::Path;

use log::{debug, info, warn};

use crate::config::StrataConfig;
use crate::editor::{EditOutcome, Editor};
use crate::engine::load_image;
use crate::error::{Result, StrataError};
use crate::ops::{catalog, parse_control_value, parse_operation, Control, OperationSpec};

/// Load `input`, stack `ops`, disable the given indices and save to `output`.
pub fn apply(
    config: StrataConfig,
    input: &Path,
    output: &Path,
    ops: &[String],
    disable: &[usize],
) -> Result<()> {
    info!("Applying {} operation(s) to {}", ops.len(), input.display());

    let mut editor = open(config, input)?;
    push_layers(&mut editor, ops)?;

    for &index in disable {
        let outcome = editor.set_layer_enabled(index, false);
        if outcome == EditOutcome::Unchanged {
            return Err(StrataError::InvalidParameter {
                name: "disable".to_string(),
                reason: format!("no layer at index {}", index),
            });
        }
        check(&editor, &outcome)?;
    }

    let written = editor.save(output)?;
    print_layers(&editor);
    println!("{}", editor.status());
    debug!("Wrote {}", written.display());
    Ok(())
}

/// Write an uncommitted preview of one control over the layers in `ops`.
pub fn preview(
    config: StrataConfig,
    input: &Path,
    output: &Path,
    control: &str,
    value: &str,
    ops: &[String],
) -> Result<()> {
    let control = Control::from_name(control).ok_or_else(|| StrataError::UnknownOperation {
        name: control.to_string(),
    })?;
    let value = parse_control_value(control, value)?;

    let mut editor = open(config, input)?;
    push_layers(&mut editor, ops)?;

    match editor.preview(value) {
        EditOutcome::Previewed { skipped } => {
            for layer in skipped {
                println!("Skipped layer {} ({}): {}", layer.index, layer.name, layer.reason);
            }
        }
        EditOutcome::PreviewFailed { reason } => {
            return Err(StrataError::kernel(control.name(), reason));
        }
        _ => {}
    }
    println!("{}", editor.status());

    editor.save(output)?;
    Ok(())
}

/// Print the operation catalog.
pub fn list_operations() -> Result<()> {
    println!("Operations:");
    println!("{:-<60}", "");
    for entry in catalog() {
        match entry.range {
            Some(range) => println!("  {:<20} {:<22} {}", entry.name, entry.label, range),
            None => println!("  {:<20} {}", entry.name, entry.label),
        }
    }
    Ok(())
}

/// Print basic facts about an image.
pub fn info(config: &StrataConfig, input: &Path) -> Result<()> {
    note_unlisted_extension(config, input);
    let image = load_image(input)?;
    let (dw, dh) = image.display_size(config.max_display.0, config.max_display.1);

    println!("File:       {}", input.display());
    println!("Dimensions: {}x{}", image.width(), image.height());
    println!("Channels:   {}", image.channels());
    println!("Display:    {}x{}", dw, dh);
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn open(config: StrataConfig, input: &Path) -> Result<Editor> {
    note_unlisted_extension(&config, input);
    let mut editor = Editor::new(config);
    editor.load(input)?;
    println!("{}", editor.status());
    Ok(editor)
}

fn push_layers(editor: &mut Editor, ops: &[String]) -> Result<()> {
    for op in ops {
        let outcome = match parse_operation(op)? {
            OperationSpec::Filter(filter) => editor.add_filter(filter),
            OperationSpec::Control(value) => editor.commit_value(value),
        };
        check(editor, &outcome)?;
    }
    Ok(())
}

/// Turn a failed recomposition into the error that caused it
fn check(editor: &Editor, outcome: &EditOutcome) -> Result<()> {
    if let EditOutcome::Failed { .. } = outcome {
        if let Some(original) = editor.original() {
            editor.layers().compose(original)?;
        }
        return Err(StrataError::InvalidImage {
            reason: editor.status().to_string(),
        });
    }
    Ok(())
}

fn print_layers(editor: &Editor) {
    println!("Layers:");
    for (i, layer) in editor.layers().iter().enumerate() {
        let marker = if layer.is_enabled() { "x" } else { " " };
        println!("  [{}] {:>2}: {}", marker, i, layer.name());
    }
}

/// The extension list only filters file pickers; the decoder decides
fn note_unlisted_extension(config: &StrataConfig, input: &Path) {
    if !config.accepts(input) {
        warn!(
            "{} is not in the configured open extensions, trying to decode anyway",
            input.display()
        );
    }
}
