use super::*;
use shared::domain::{FontOrigin, FontResource, FontVariants};

fn file(name: &str) -> PendingFontFile {
    PendingFontFile {
        file_name: name.to_string(),
        bytes: vec![0u8; 8],
    }
}

fn resource(name: &str, origin: FontOrigin, files: &[&str]) -> FontResource {
    FontResource {
        name: name.to_string(),
        origin,
        files: files.iter().map(|f| f.to_string()).collect(),
        variants: FontVariants::default(),
    }
}

#[test]
fn accepts_font_suffixes_case_insensitively() {
    let mut pending = PendingChangeSet::new();
    pending.add_files([file("A.TTF"), file("b.otf"), file("c.TtC"), file("d.otc")]);
    assert_eq!(pending.addition_count(), 4);
}

#[test]
fn drops_unaccepted_suffixes_silently() {
    let mut pending = PendingChangeSet::new();
    pending.add_files([file("readme.txt"), file("font.woff"), file("noext")]);
    assert!(pending.is_empty());
}

#[test]
fn readding_same_name_does_not_duplicate() {
    let mut pending = PendingChangeSet::new();
    pending.add_files([file("a.ttf")]);
    pending.add_files([file("a.ttf")]);
    assert_eq!(pending.addition_count(), 1);
}

#[test]
fn remove_addition_by_name() {
    let mut pending = PendingChangeSet::new();
    pending.add_files([file("a.ttf"), file("b.otf")]);
    pending.remove_addition("a.ttf");
    assert_eq!(pending.addition_count(), 1);
    assert_eq!(pending.additions()[0].file_name, "b.otf");
}

#[test]
fn mark_and_unmark_single_deletion() {
    let mut pending = PendingChangeSet::new();
    pending.mark_for_deletion("Custom A");
    assert!(pending.is_marked_for_deletion("Custom A"));
    pending.unmark_for_deletion("Custom A");
    assert!(pending.is_empty());
}

#[test]
fn marking_is_independent_of_deletability() {
    // The orchestrator is the final authority; the set accepts any
    // name, even a builtin one.
    let mut pending = PendingChangeSet::new();
    pending.mark_for_deletion("Builtin Serif");
    assert!(pending.is_marked_for_deletion("Builtin Serif"));
}

#[test]
fn mark_all_custom_marks_only_custom_resources() {
    let catalog = FontCatalog::new(vec![
        resource("Builtin Serif", FontOrigin::Builtin, &["serif.ttf"]),
        resource("Custom A", FontOrigin::Custom, &["a.ttf"]),
        resource("Custom B", FontOrigin::Custom, &["b.ttf"]),
    ]);
    let mut pending = PendingChangeSet::new();
    pending.mark_all_custom(&catalog);
    assert_eq!(pending.deletion_count(), 2);
    assert!(pending.is_marked_for_deletion("Custom A"));
    assert!(pending.is_marked_for_deletion("Custom B"));
    assert!(!pending.is_marked_for_deletion("Builtin Serif"));
}

#[test]
fn unmark_all_clears_the_entire_deletion_set() {
    let catalog = FontCatalog::new(vec![
        resource("Custom A", FontOrigin::Custom, &["a.ttf"]),
        resource("Custom B", FontOrigin::Custom, &["b.ttf"]),
    ]);
    let mut pending = PendingChangeSet::new();
    pending.mark_all_custom(&catalog);
    pending.mark_for_deletion("Custom C");
    pending.unmark_all();
    assert_eq!(pending.deletion_count(), 0);
}

#[test]
fn is_empty_requires_no_additions_and_no_deletions() {
    let mut pending = PendingChangeSet::new();
    assert!(pending.is_empty());
    pending.add_files([file("a.ttf")]);
    assert!(!pending.is_empty());
    pending.clear_additions();
    pending.mark_for_deletion("Custom A");
    assert!(!pending.is_empty());
    pending.clear();
    assert!(pending.is_empty());
}
