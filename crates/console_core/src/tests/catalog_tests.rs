use super::*;
use shared::domain::FontVariants;

fn resource(name: &str, origin: FontOrigin, files: &[&str]) -> FontResource {
    FontResource {
        name: name.to_string(),
        origin,
        files: files.iter().map(|f| f.to_string()).collect(),
        variants: FontVariants::default(),
    }
}

#[test]
fn backing_files_union_is_deduplicated() {
    let catalog = FontCatalog::new(vec![
        resource("Custom A", FontOrigin::Custom, &["shared.ttc", "a.ttf"]),
        resource("Custom B", FontOrigin::Custom, &["shared.ttc", "b.ttf"]),
    ]);
    let files = catalog.backing_files_for(["Custom A", "Custom B"]);
    assert_eq!(
        files.into_iter().collect::<Vec<_>>(),
        vec!["a.ttf", "b.ttf", "shared.ttc"]
    );
}

#[test]
fn unknown_names_contribute_nothing() {
    let catalog = FontCatalog::new(vec![resource(
        "Custom A",
        FontOrigin::Custom,
        &["a.ttf"],
    )]);
    let files = catalog.backing_files_for(["Custom A", "No Such Font"]);
    assert_eq!(files.len(), 1);
}

#[test]
fn only_the_given_names_are_consulted() {
    // "Other Font" also points at shared.ttc but is not in the query,
    // and that does not block the file from being resolved.
    let catalog = FontCatalog::new(vec![
        resource("Custom Font", FontOrigin::Custom, &["shared.ttc"]),
        resource("Other Font", FontOrigin::Custom, &["shared.ttc"]),
    ]);
    let files = catalog.backing_files_for(["Custom Font"]);
    assert!(files.contains("shared.ttc"));
    assert_eq!(files.len(), 1);
}

#[test]
fn custom_names_excludes_builtins() {
    let catalog = FontCatalog::new(vec![
        resource("Builtin Serif", FontOrigin::Builtin, &["serif.ttf"]),
        resource("Custom A", FontOrigin::Custom, &["a.ttf"]),
    ]);
    assert_eq!(catalog.custom_names(), vec!["Custom A".to_string()]);
}

#[test]
fn get_finds_resources_by_name() {
    let catalog = FontCatalog::new(vec![resource(
        "Custom A",
        FontOrigin::Custom,
        &["a.ttf"],
    )]);
    assert!(catalog.get("Custom A").is_some());
    assert!(catalog.get("custom a").is_none());
    assert_eq!(catalog.len(), 1);
}
