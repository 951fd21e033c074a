use cellshot_settings::{Preferences, PreferencesStore};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn load_missing_file_returns_defaults() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("preferences.json");

    let store = PreferencesStore::load(&path).expect("load defaults");
    let export = &store.preferences().export;
    assert_eq!(export.font_path, None);
    assert_eq!(export.font_size_px, 14);
    assert_eq!(export.title_font_size_px, 15);
    assert!(!export.include_window_controls);
    assert!(!export.draft_glyphs);
    assert!(!path.exists(), "loading defaults must not write a file");
}

#[test]
fn save_and_reload_roundtrip() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join(".cellshot").join("preferences.json");

    let mut prefs = Preferences::default();
    prefs.export.font_path = Some(PathBuf::from("/fonts/Mono.ttf"));
    prefs.export.include_window_controls = true;
    prefs.export.font_size_px = 20;
    PreferencesStore::new(path.clone(), prefs)
        .save()
        .expect("save");

    let reloaded = PreferencesStore::load(&path).expect("reload");
    let export = &reloaded.preferences().export;
    assert_eq!(export.font_path, Some(PathBuf::from("/fonts/Mono.ttf")));
    assert!(export.include_window_controls);
    assert_eq!(export.font_size_px, 20);
}

#[test]
fn set_persists_immediately() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("preferences.json");

    let mut store = PreferencesStore::load(&path).expect("defaults");
    store.set("export.draft_glyphs", "true").expect("set flag");

    let reloaded = PreferencesStore::load(&path).expect("reload");
    assert!(reloaded.preferences().export.draft_glyphs);
}

#[test]
fn legacy_values_are_sanitized_on_load() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("preferences.json");
    fs::write(
        &path,
        r#"{
            "version": 0,
            "export": {
                "font_path": "",
                "font_size_px": 2,
                "syntax": ["not", "an", "object"]
            }
        }"#,
    )
    .expect("write legacy prefs");

    let store = PreferencesStore::load(&path).expect("load legacy file");
    let prefs = store.preferences();
    assert_eq!(prefs.version, 1, "version 0 should be upgraded");
    assert_eq!(prefs.export.font_path, None, "empty font path means none");
    assert_eq!(prefs.export.font_size_px, 6, "font size should be clamped");
    assert_eq!(prefs.export.title_font_size_px, 15);
    assert_eq!(prefs.export.syntax, None, "non-object palette is dropped");
}

#[test]
fn malformed_file_is_an_error() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("preferences.json");
    fs::write(&path, "{").expect("write");
    assert!(PreferencesStore::load(&path).is_err());
}
