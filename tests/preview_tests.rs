//! Preview Tests
//!
//! Live control previews must never mutate the committed layer stack.

use pretty_assertions::assert_eq;
use test_case::test_case;

use strata::engine::Image;
use strata::ops::{Control, ControlValue, Filter, FnKernel};
use strata::{EditOutcome, Editor, StrataError};

fn editor() -> Editor {
    let mut data = Vec::new();
    for i in 0..(30 * 20) {
        data.extend_from_slice(&[(i % 251) as u8, (i * 3 % 256) as u8, 90]);
    }
    let mut editor = Editor::default();
    editor.set_original(Image::from_raw(30, 20, data).unwrap());
    editor
}

fn layer_names(editor: &Editor) -> Vec<String> {
    editor.layers().iter().map(|l| l.name().to_string()).collect()
}

#[test]
fn test_abandoned_rotation_preview_leaves_stack_unchanged() {
    let mut editor = editor();
    editor.add_filter(Filter::Grayscale);
    editor.commit_value(ControlValue::Brightness(15));
    let names = layer_names(&editor);
    let committed = editor.current().cloned();

    editor.activate_control(Control::Rotation);
    let outcome = editor.preview(ControlValue::Rotation(45));
    assert!(outcome.is_success());
    assert_ne!(editor.current().cloned(), committed);
    assert_eq!(editor.status(), "Rotation preview: 45°");

    // Switching control discards the rotation preview
    editor.preview(ControlValue::Contrast(1.0));
    assert_eq!(editor.active_control(), Some(Control::Contrast));
    assert_eq!(editor.control_value(Control::Rotation), ControlValue::Rotation(0));
    assert_eq!(layer_names(&editor), names);

    editor.cancel_preview();
    assert_eq!(editor.current().cloned(), committed);
    assert_eq!(layer_names(&editor), names);
}

#[test]
fn test_activate_reverts_to_committed_composite() {
    let mut editor = editor();
    editor.add_filter(Filter::Sepia);
    let committed = editor.current().cloned();

    editor.preview(ControlValue::Scale(150));
    assert_eq!(editor.current().unwrap().dimensions(), (45, 30));

    editor.activate_control(Control::Translation);
    assert_eq!(editor.current().cloned(), committed);
    assert!(!editor.is_previewing());
}

#[test]
fn test_commit_preview_adds_one_layer() {
    let mut editor = editor();
    editor.activate_control(Control::Brightness);
    editor.preview(ControlValue::Brightness(10));
    editor.preview(ControlValue::Brightness(25));
    let previewed = editor.current().cloned();

    assert_eq!(editor.commit_preview(), EditOutcome::Applied { enabled: 1 });
    assert_eq!(layer_names(&editor), vec!["Brightness +25".to_string()]);
    assert_eq!(editor.current().cloned(), previewed);
    assert!(!editor.is_previewing());
}

#[test]
fn test_preview_values_are_clamped() {
    let mut editor = editor();
    editor.preview(ControlValue::Brightness(400));
    assert_eq!(
        editor.control_value(Control::Brightness),
        ControlValue::Brightness(100)
    );
}

#[test]
fn test_fixed_filter_closes_live_control() {
    let mut editor = editor();
    editor.preview(ControlValue::Rotation(90));
    editor.add_filter(Filter::Sharpen);

    assert_eq!(editor.active_control(), None);
    assert_eq!(layer_names(&editor), vec!["Sharpen".to_string()]);
    assert!(!editor.is_previewing());
}

#[test]
fn test_preview_skips_failing_committed_layer() {
    let mut editor = editor();
    editor.commit_value(ControlValue::Brightness(10));
    let broken = FnKernel::new("broken", "Broken", |_| {
        Err(StrataError::kernel("broken", "always fails"))
    });
    editor.add_layer("Broken", Box::new(broken));
    assert_eq!(editor.status(), "Layer failed: Broken");

    match editor.preview(ControlValue::Brightness(5)) {
        EditOutcome::Previewed { skipped } => {
            assert_eq!(skipped.len(), 1);
            assert_eq!(skipped[0].index, 1);
            assert_eq!(skipped[0].name, "Broken");
        }
        other => panic!("expected Previewed, got {:?}", other),
    }
    let expected = editor.original().unwrap().pixel(0, 0).map(|c| c.saturating_add(15));
    assert_eq!(editor.current().unwrap().pixel(0, 0), expected);
    assert_eq!(editor.layers().len(), 2);
}

#[test]
fn test_failing_pending_operation_keeps_current() {
    let mut editor = Editor::default();
    editor.set_original(Image::solid(1, 1, [40, 40, 40]));
    let before = editor.current().cloned();

    match editor.preview(ControlValue::Scale(50)) {
        EditOutcome::PreviewFailed { .. } => {}
        other => panic!("expected PreviewFailed, got {:?}", other),
    }
    assert_eq!(editor.current().cloned(), before);
    assert!(editor.layers().is_empty());
}

#[test_case(ControlValue::Brightness(0) ; "brightness zero")]
#[test_case(ControlValue::Contrast(1.0) ; "contrast one")]
#[test_case(ControlValue::Scale(100) ; "scale hundred")]
#[test_case(ControlValue::Translation(0, 0) ; "no translation")]
#[test_case(ControlValue::Rotation(0) ; "no rotation")]
fn test_identity_commit_adds_no_layer(value: ControlValue) {
    let mut editor = editor();
    editor.add_filter(Filter::Grayscale);
    let status = editor.status().to_string();

    assert_eq!(editor.commit_value(value), EditOutcome::Unchanged);
    assert_eq!(editor.layers().len(), 1);
    assert_eq!(editor.status(), status);
}

#[test]
fn test_failed_preview_after_switch_shows_committed_image() {
    let mut editor = Editor::default();
    editor.set_original(Image::solid(1, 1, [40, 40, 40]));

    editor.preview(ControlValue::Brightness(50));
    assert_eq!(editor.current().unwrap().pixel(0, 0), [90, 90, 90]);

    // 50% of a single pixel is empty, so this preview cannot render
    let outcome = editor.preview(ControlValue::Scale(50));
    assert!(matches!(outcome, EditOutcome::PreviewFailed { .. }));
    assert_eq!(editor.active_control(), Some(Control::Scale));
    assert_eq!(
        editor.control_value(Control::Brightness),
        ControlValue::Brightness(0)
    );
    assert!(!editor.is_previewing());
    assert_eq!(editor.current().unwrap().pixel(0, 0), [40, 40, 40]);
}

#[test]
fn test_commit_value_for_other_control_drops_live_preview() {
    let mut editor = Editor::default();
    editor.set_original(Image::solid(1, 1, [40, 40, 40]));

    editor.preview(ControlValue::Contrast(2.0));
    assert_eq!(editor.current().unwrap().pixel(0, 0), [80, 80, 80]);

    let outcome = editor.commit_value(ControlValue::Scale(50));
    assert!(matches!(outcome, EditOutcome::Failed { .. }));
    assert_eq!(editor.current().unwrap().pixel(0, 0), [40, 40, 40]);
    assert!(!editor.is_previewing());
}

#[test]
fn test_failed_commit_keeps_preview_flag() {
    let mut editor = editor();
    let broken = FnKernel::new("broken", "Broken", |_| {
        Err(StrataError::kernel("broken", "always fails"))
    });
    editor.add_layer("Broken", Box::new(broken));

    editor.preview(ControlValue::Brightness(20));
    let previewed = editor.current().cloned();
    assert!(editor.is_previewing());

    let outcome = editor.commit_preview();
    assert!(matches!(outcome, EditOutcome::Failed { .. }));
    assert_eq!(editor.current().cloned(), previewed);
    assert!(editor.is_previewing());
    assert_eq!(editor.layers().len(), 2);
}
