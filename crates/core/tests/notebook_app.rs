use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use cellshot_core::{
    AppError, Clipboard, ExportSettings, FolderOpener, GlyphSource, NotebookApp, PlatformError,
};
use cellshot_project::{Cell, CellUpdate, LoadStatus, NotebookError};
use cellshot_render::ExportError;
use tempfile::tempdir;

#[derive(Default)]
struct RecordingClipboard {
    text: Option<String>,
}

impl Clipboard for RecordingClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), PlatformError> {
        self.text = Some(text.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct RecordingOpener {
    opened: RefCell<Vec<PathBuf>>,
}

impl FolderOpener for RecordingOpener {
    fn open(&self, path: &Path) -> Result<(), PlatformError> {
        self.opened.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

fn draft_app() -> NotebookApp {
    NotebookApp::new(ExportSettings::draft())
}

#[test]
fn actions_without_project_only_set_status() {
    let mut app = draft_app();
    assert!(matches!(app.save(), Err(AppError::NoProject)));
    assert!(app.status().starts_with("No project opened"));

    app.update_cell(0, CellUpdate {
        code: Some("print(1)".into()),
        ..CellUpdate::default()
    })
    .unwrap();
    assert!(matches!(app.export_cell(0), Err(AppError::NoProject)));
    assert_eq!(
        app.status(),
        "No project opened. Please open or create a project first."
    );
    assert!(matches!(app.export_all(), Err(AppError::NoProject)));
    assert!(matches!(
        app.open_images_folder(&RecordingOpener::default()),
        Err(AppError::NoProject)
    ));
}

#[test]
fn create_then_reopen_keeps_saved_cells() {
    let dir = tempdir().unwrap();
    let mut app = draft_app();
    assert_eq!(app.create_project(dir.path()).unwrap(), LoadStatus::Created);
    assert!(app.status().starts_with("Created new project"));

    app.add_cell(Cell::new("second", "Rust", "fn main() {}")).unwrap();
    app.save().unwrap();

    let mut reopened = draft_app();
    assert_eq!(reopened.open_project(dir.path()).unwrap(), LoadStatus::Loaded);
    let cells = reopened.notebook().cells();
    assert_eq!(cells.len(), 2);
    assert_eq!(cells[1], Cell::new("second", "rust", "fn main() {}"));

    let mut again = draft_app();
    assert_eq!(again.create_project(dir.path()).unwrap(), LoadStatus::Loaded);
    assert_eq!(again.notebook().len(), 2);
}

#[test]
fn add_focuses_newest_and_remove_guards_last_cell() {
    let mut app = draft_app();
    assert_eq!(app.add_cell(Cell::default()).unwrap(), 1);
    assert_eq!(app.focused(), 1);

    app.remove_cell(1).unwrap();
    assert_eq!(app.focused(), 0);
    assert_eq!(app.status(), "Cell removed");

    let err = app.remove_cell(0).unwrap_err();
    assert!(matches!(err, AppError::Notebook(NotebookError::LastCell)));
    assert_eq!(app.status(), "Cannot remove the last cell");
    assert_eq!(app.notebook().len(), 1);
}

#[test]
fn unknown_languages_are_refused_on_edit() {
    let mut app = draft_app();
    let err = app
        .add_cell(Cell::new("t", "cobol", "DISPLAY 'X'."))
        .unwrap_err();
    assert!(matches!(err, AppError::UnsupportedLanguage(tag) if tag == "cobol"));
    assert_eq!(app.notebook().len(), 1);
}

#[test]
fn copy_uses_trimmed_code_and_refuses_empty_cells() {
    let mut app = draft_app();
    let mut clipboard = RecordingClipboard::default();
    assert!(matches!(
        app.copy_cell(0, &mut clipboard),
        Err(AppError::NothingToCopy(0))
    ));
    assert!(clipboard.text.is_none());

    app.add_cell(Cell::new("", "python", "\n  x = 1\n\n")).unwrap();
    app.copy_cell(1, &mut clipboard).unwrap();
    assert_eq!(clipboard.text.as_deref(), Some("x = 1"));
    assert_eq!(app.status(), "Code copied to clipboard");
}

#[test]
fn export_all_continues_past_failures_and_saves() {
    let dir = tempdir().unwrap();
    let mut app = draft_app();
    app.create_project(dir.path()).unwrap();
    app.update_cell(0, CellUpdate {
        title: Some("Hello/World:1".into()),
        code: Some("print('hi')".into()),
        ..CellUpdate::default()
    })
    .unwrap();
    app.add_cell(Cell::new("empty", "python", "   ")).unwrap();
    app.add_cell(Cell::new("query", "sql", "SELECT 1;")).unwrap();

    let summary = app.export_all().unwrap();
    assert_eq!(summary.success_count(), 2);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].index, 1);
    assert!(matches!(summary.failures[0].error, ExportError::EmptyCode));

    let images = dir.path().join("images");
    assert!(images.join("Hello_World_1.png").is_file());
    assert!(images.join("query.png").is_file());
    assert!(!images.join("empty.png").exists());

    let manifest = fs::read_to_string(dir.path().join("file.imgnb")).unwrap();
    assert!(manifest.contains("SELECT 1;"));
    assert!(app.status().starts_with("Exported 2 images"));
}

#[test]
fn export_all_without_font_fails_each_cell_and_still_saves() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing-font.ttf");
    let mut settings = ExportSettings::draft();
    settings.glyphs = GlyphSource::Font {
        path: Some(missing),
    };
    let mut app = NotebookApp::new(settings);
    app.create_project(dir.path()).unwrap();
    app.update_cell(0, CellUpdate {
        code: Some("print('hi')".into()),
        ..CellUpdate::default()
    })
    .unwrap();
    app.add_cell(Cell::new("query", "sql", "SELECT 1;")).unwrap();

    let summary = app.export_all().unwrap();
    assert_eq!(summary.success_count(), 0);
    assert_eq!(summary.failures.len(), 2);
    assert!(summary
        .failures
        .iter()
        .all(|failure| matches!(failure.error, ExportError::FontLoad(_))));
    assert!(app.status().starts_with("Exported 0 images"));

    let manifest = fs::read_to_string(dir.path().join("file.imgnb")).unwrap();
    assert!(manifest.contains("SELECT 1;"));
}

#[test]
fn corrupt_project_warns_and_starts_fresh() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("file.imgnb"), "not json at all").unwrap();

    let mut app = draft_app();
    let status = app.open_project(dir.path()).unwrap();
    assert!(matches!(status, LoadStatus::Recovered { .. }));
    assert!(app.status().starts_with("Warning"));
    assert_eq!(app.notebook().cells(), &[Cell::default()]);

    app.save().unwrap();
    let saved = fs::read_to_string(dir.path().join("file.imgnb")).unwrap();
    assert!(saved.trim_start().starts_with('{'));
}

#[test]
fn open_folder_creates_images_dir() {
    let dir = tempdir().unwrap();
    let mut app = draft_app();
    app.create_project(dir.path()).unwrap();
    let opener = RecordingOpener::default();

    let images = app.open_images_folder(&opener).unwrap();
    assert!(images.is_dir());
    assert_eq!(opener.opened.borrow().as_slice(), &[images]);
}
