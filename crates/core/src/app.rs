use std::path::{Path, PathBuf};

use cellshot_highlight::LanguageTag;
use cellshot_project::{
    Cell, CellUpdate, LoadStatus, Notebook, NotebookError, ProjectStore, ProjectStoreError,
};
use cellshot_render::{export_cell, CardRequest, ExportError};
use cellshot_settings::PreferencesError;
use log::{info, warn};
use thiserror::Error;

use crate::export::ExportSettings;
use crate::platform::{Clipboard, FolderOpener, PlatformError};

/// 筆記本操作的錯誤。 / Errors surfaced by notebook actions.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("no project opened; open or create a project first")]
    NoProject,
    #[error("unsupported language '{0}'")]
    UnsupportedLanguage(String),
    #[error("nothing to copy: cell {0} is empty")]
    NothingToCopy(usize),
    #[error(transparent)]
    Notebook(#[from] NotebookError),
    #[error(transparent)]
    Store(#[from] ProjectStoreError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Preferences(#[from] PreferencesError),
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// 一次批次匯出中失敗的儲存格。 / A cell that failed during a batch export.
#[derive(Debug)]
pub struct CellFailure {
    pub index: usize,
    pub title: String,
    pub error: ExportError,
}

/// 批次匯出的結果。 / Outcome of [`NotebookApp::export_all`].
#[derive(Debug, Default)]
pub struct ExportSummary {
    pub exported: Vec<PathBuf>,
    pub failures: Vec<CellFailure>,
    pub images_dir: PathBuf,
}

impl ExportSummary {
    pub fn success_count(&self) -> usize {
        self.exported.len()
    }
}

/// 應用程式狀態：已開啟的專案、儲存格與狀態列訊息。
/// Application state: the open project, its cells and the status line.
#[derive(Debug)]
pub struct NotebookApp {
    notebook: Notebook,
    store: Option<ProjectStore>,
    focused: usize,
    status: String,
    settings: ExportSettings,
}

impl Default for NotebookApp {
    fn default() -> Self {
        Self::new(ExportSettings::default())
    }
}

impl NotebookApp {
    pub fn new(settings: ExportSettings) -> Self {
        Self {
            notebook: Notebook::new(),
            store: None,
            focused: 0,
            status: "Ready".to_string(),
            settings,
        }
    }

    pub fn notebook(&self) -> &Notebook {
        &self.notebook
    }

    pub fn project_dir(&self) -> Option<&Path> {
        self.store.as_ref().map(ProjectStore::directory)
    }

    /// 目前聚焦（捲動至）的儲存格。 / Index of the cell the view is focused on.
    pub fn focused(&self) -> usize {
        self.focused
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: ExportSettings) {
        self.settings = settings;
    }

    /// 開啟專案目錄；損毀的清單會被重設並在狀態列警告。
    /// Opens a project directory. A corrupt manifest is reset and flagged on the status line.
    pub fn open_project(&mut self, directory: &Path) -> Result<LoadStatus, AppError> {
        let store = ProjectStore::new(directory);
        let outcome = match store.load() {
            Ok(outcome) => outcome,
            Err(err) => return self.fail(err.into()),
        };
        self.status = match &outcome.status {
            LoadStatus::Recovered { .. } => format!(
                "Warning: project file in {} was corrupted; started a new one",
                directory.display()
            ),
            _ => format!("Opened project from {}", directory.display()),
        };
        self.notebook = outcome.notebook;
        self.store = Some(store);
        self.focused = 0;
        Ok(outcome.status)
    }

    /// 建立（或沿用）專案目錄並開啟。 / Creates the project if needed, then opens it.
    pub fn create_project(&mut self, directory: &Path) -> Result<LoadStatus, AppError> {
        let created = match ProjectStore::new(directory).create() {
            Ok(created) => created,
            Err(err) => return self.fail(err.into()),
        };
        let status = self.open_project(directory)?;
        self.status = format!("Created new project in {}", directory.display());
        Ok(match status {
            LoadStatus::Loaded if created => LoadStatus::Created,
            other => other,
        })
    }

    /// 新增儲存格並聚焦於它。 / Appends a cell and focuses it.
    pub fn add_cell(&mut self, mut cell: Cell) -> Result<usize, AppError> {
        match canonical_language(&cell.language) {
            Ok(language) => cell.language = language,
            Err(err) => return self.fail(err),
        }
        let index = self.notebook.push(cell);
        self.focused = index;
        self.status = format!("Added cell {}", index + 1);
        Ok(index)
    }

    pub fn remove_cell(&mut self, index: usize) -> Result<Cell, AppError> {
        match self.notebook.remove(index) {
            Ok(cell) => {
                if self.focused >= self.notebook.len() || self.focused > index {
                    self.focused = self.focused.saturating_sub(1);
                }
                self.status = "Cell removed".to_string();
                Ok(cell)
            }
            Err(NotebookError::LastCell) => {
                self.status = "Cannot remove the last cell".to_string();
                Err(NotebookError::LastCell.into())
            }
            Err(err) => self.fail(err.into()),
        }
    }

    pub fn update_cell(&mut self, index: usize, mut update: CellUpdate) -> Result<(), AppError> {
        if let Some(language) = update.language.take() {
            match canonical_language(&language) {
                Ok(language) => update.language = Some(language),
                Err(err) => return self.fail(err),
            }
        }
        if let Err(err) = self.notebook.update(index, update) {
            return self.fail(err.into());
        }
        self.focused = index;
        self.status = format!("Updated cell {}", index + 1);
        Ok(())
    }

    /// 將儲存格程式碼（去除前後空白）複製到剪貼簿。
    /// Copies the cell's trimmed code to the clipboard; empty code is refused.
    pub fn copy_cell(
        &mut self,
        index: usize,
        clipboard: &mut dyn Clipboard,
    ) -> Result<(), AppError> {
        let code = match self.cell(index) {
            Ok(cell) => cell.trimmed_code().to_string(),
            Err(err) => return self.fail(err),
        };
        if code.is_empty() {
            self.status = "Nothing to copy - code cell is empty".to_string();
            return Err(AppError::NothingToCopy(index));
        }
        if let Err(err) = clipboard.set_text(&code) {
            return self.fail(err.into());
        }
        self.status = "Code copied to clipboard".to_string();
        Ok(())
    }

    pub fn save(&mut self) -> Result<(), AppError> {
        let store = match self.require_store() {
            Ok(store) => store.clone(),
            Err(err) => return self.fail(err),
        };
        if let Err(err) = store.save(&self.notebook) {
            return self.fail(err.into());
        }
        self.status = "Project saved successfully".to_string();
        Ok(())
    }

    /// 匯出單一儲存格至 `images/`。 / Exports one cell into the project's `images/` folder.
    pub fn export_cell(&mut self, index: usize) -> Result<PathBuf, AppError> {
        if let Err(err) = self.require_store() {
            return self.fail(err);
        }
        match self.export_one(index) {
            Ok(path) => {
                self.status = format!("Saved: {}", path.display());
                Ok(path)
            }
            Err(err) => {
                self.status = format!("Error exporting image: {err}");
                Err(err)
            }
        }
    }

    fn export_one(&self, index: usize) -> Result<PathBuf, AppError> {
        let cell = self.cell(index)?;
        if cell.code.trim().is_empty() {
            return Err(ExportError::EmptyCode.into());
        }
        let store = self.require_store()?;
        let images = store.ensure_images_dir()?;
        let fonts = self.settings.load_fonts()?;
        let request = CardRequest::new(&cell.title, &cell.language, &cell.code);
        Ok(export_cell(&images, &request, &fonts, &self.settings.options)?)
    }

    /// 匯出所有儲存格後儲存專案；單一儲存格失敗不會中斷其餘項目。
    /// Exports every cell, then saves the project. A failing cell never stops the rest;
    /// when no font loads, every cell is recorded as failed and the project is still saved.
    pub fn export_all(&mut self) -> Result<ExportSummary, AppError> {
        let images_dir = match self
            .require_store()
            .and_then(|store| store.ensure_images_dir().map_err(AppError::from))
        {
            Ok(dir) => dir,
            Err(err) => return self.fail(err),
        };
        let fonts = self.settings.load_fonts();

        let mut summary = ExportSummary {
            images_dir,
            ..ExportSummary::default()
        };
        for (index, cell) in self.notebook.iter().enumerate() {
            let request = CardRequest::new(&cell.title, &cell.language, &cell.code);
            let result = match &fonts {
                Ok(fonts) => {
                    export_cell(&summary.images_dir, &request, fonts, &self.settings.options)
                }
                // every cell fails the same way without glyphs
                Err(ExportError::FontLoad(reason)) => Err(ExportError::FontLoad(reason.clone())),
                Err(err) => Err(ExportError::FontLoad(err.to_string())),
            };
            match result {
                Ok(path) => summary.exported.push(path),
                Err(error) => {
                    warn!("cell {} ({:?}) not exported: {error}", index + 1, cell.title);
                    summary.failures.push(CellFailure {
                        index,
                        title: cell.title.clone(),
                        error,
                    });
                }
            }
        }

        self.save()?;
        info!(
            "exported {} of {} cells",
            summary.success_count(),
            self.notebook.len()
        );
        self.status = format!(
            "Exported {} images to {}",
            summary.success_count(),
            summary.images_dir.display()
        );
        Ok(summary)
    }

    /// 以檔案管理員開啟 `images/`（必要時建立）。 / Opens `images/` in the file manager, creating it first.
    pub fn open_images_folder(&mut self, opener: &dyn FolderOpener) -> Result<PathBuf, AppError> {
        let images = match self
            .require_store()
            .and_then(|store| store.ensure_images_dir().map_err(AppError::from))
        {
            Ok(dir) => dir,
            Err(err) => return self.fail(err),
        };
        if let Err(err) = opener.open(&images) {
            return self.fail(err.into());
        }
        self.status = format!("Opened {}", images.display());
        Ok(images)
    }

    fn cell(&self, index: usize) -> Result<&Cell, AppError> {
        self.notebook.get(index).ok_or_else(|| {
            NotebookError::IndexOutOfRange {
                index,
                len: self.notebook.len(),
            }
            .into()
        })
    }

    fn require_store(&self) -> Result<&ProjectStore, AppError> {
        self.store.as_ref().ok_or(AppError::NoProject)
    }

    fn fail<T>(&mut self, err: AppError) -> Result<T, AppError> {
        self.status = match &err {
            AppError::NoProject => {
                "No project opened. Please open or create a project first.".to_string()
            }
            other => format!("Error: {other}"),
        };
        Err(err)
    }
}

fn canonical_language(language: &str) -> Result<String, AppError> {
    language
        .parse::<LanguageTag>()
        .map(|tag| tag.as_str().to_string())
        .map_err(|_| AppError::UnsupportedLanguage(language.to_string()))
}
