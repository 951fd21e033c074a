use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::notebook::{Cell, Notebook};
use crate::util::write_atomic;

/// Name of the manifest stored in every project directory.
pub const MANIFEST_FILE_NAME: &str = "file.imgnb";
/// Sub-directory receiving exported images.
pub const IMAGES_DIR_NAME: &str = "images";

#[derive(Debug, Deserialize)]
struct Manifest {
    cells: Vec<Cell>,
}

#[derive(Debug, Serialize)]
struct ManifestRef<'a> {
    cells: &'a [Cell],
}

/// How [`ProjectStore::load`] obtained its notebook.
/// 載入結果的來源。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// The manifest was read as-is.
    Loaded,
    /// No manifest existed; an empty one was written.
    Created,
    /// The manifest could not be parsed and was replaced by an empty one.
    Recovered { reason: String },
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub notebook: Notebook,
    pub status: LoadStatus,
}

/// Reads and writes the `file.imgnb` manifest of one project directory.
/// 讀寫專案目錄中的 `file.imgnb` 清單檔。
#[derive(Debug, Clone)]
pub struct ProjectStore {
    directory: PathBuf,
}

impl ProjectStore {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.directory.join(MANIFEST_FILE_NAME)
    }

    pub fn images_dir(&self) -> PathBuf {
        self.directory.join(IMAGES_DIR_NAME)
    }

    /// Returns the images folder, creating it when missing.
    pub fn ensure_images_dir(&self) -> Result<PathBuf, ProjectStoreError> {
        let dir = self.images_dir();
        fs::create_dir_all(&dir).map_err(|source| ProjectStoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(dir)
    }

    pub fn exists(&self) -> bool {
        self.manifest_path().is_file()
    }

    /// Creates the directory and an empty manifest. An existing manifest is left untouched.
    /// Returns whether a new manifest was written.
    /// （建立專案目錄與空白清單檔；既有清單不會被覆寫。）
    pub fn create(&self) -> Result<bool, ProjectStoreError> {
        if self.exists() {
            debug!("project already exists at {}", self.directory.display());
            return Ok(false);
        }
        self.write_cells(&[])?;
        info!("created project at {}", self.directory.display());
        Ok(true)
    }

    /// Loads the manifest. A missing file is created empty; an unreadable one is
    /// reset to empty and reported as [`LoadStatus::Recovered`].
    /// （載入清單；檔案不存在時建立空白清單，格式錯誤時重設並回報。）
    pub fn load(&self) -> Result<LoadOutcome, ProjectStoreError> {
        let path = self.manifest_path();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                self.write_cells(&[])?;
                return Ok(LoadOutcome {
                    notebook: Notebook::new(),
                    status: LoadStatus::Created,
                });
            }
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                return self.recover(err.to_string());
            }
            Err(source) => return Err(ProjectStoreError::Io { path, source }),
        };

        match serde_json::from_str::<Manifest>(&contents) {
            Ok(manifest) => {
                debug!("loaded {} cells from {}", manifest.cells.len(), path.display());
                Ok(LoadOutcome {
                    notebook: Notebook::from_cells(manifest.cells),
                    status: LoadStatus::Loaded,
                })
            }
            Err(err) => self.recover(err.to_string()),
        }
    }

    /// Writes every cell of `notebook`, in order, as pretty-printed JSON.
    pub fn save(&self, notebook: &Notebook) -> Result<(), ProjectStoreError> {
        self.write_cells(notebook.cells())?;
        info!(
            "saved {} cells to {}",
            notebook.len(),
            self.manifest_path().display()
        );
        Ok(())
    }

    fn recover(&self, reason: String) -> Result<LoadOutcome, ProjectStoreError> {
        warn!(
            "{} is corrupt ({reason}); starting with an empty project",
            self.manifest_path().display()
        );
        self.write_cells(&[])?;
        Ok(LoadOutcome {
            notebook: Notebook::new(),
            status: LoadStatus::Recovered { reason },
        })
    }

    fn write_cells(&self, cells: &[Cell]) -> Result<(), ProjectStoreError> {
        let path = self.manifest_path();
        let payload = serde_json::to_vec_pretty(&ManifestRef { cells })?;
        write_atomic(&path, &payload).map_err(|source| ProjectStoreError::Io { path, source })
    }
}

/// Errors emitted by [`ProjectStore`].
/// [`ProjectStore`] 可能拋出的錯誤。
#[derive(Debug, Error)]
pub enum ProjectStoreError {
    #[error("project I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize project: {0}")]
    Serialize(#[from] serde_json::Error),
}
