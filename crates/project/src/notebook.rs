use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Language tag given to cells that do not name one.
pub const DEFAULT_LANGUAGE: &str = "python";

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// One code cell: a title, a language tag and the code text.
/// 單一程式碼儲存格：標題、語言標記與程式碼。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub code: String,
}

impl Cell {
    pub fn new(
        title: impl Into<String>,
        language: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            language: language.into(),
            code: code.into(),
        }
    }

    /// Code with surrounding whitespace removed, as copied to the clipboard.
    pub fn trimmed_code(&self) -> &str {
        self.code.trim()
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new("", DEFAULT_LANGUAGE, "")
    }
}

/// Partial replacement of a cell's fields; `None` keeps the current value.
/// 部分更新儲存格欄位；`None` 表示保留原值。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellUpdate {
    pub title: Option<String>,
    pub language: Option<String>,
    pub code: Option<String>,
}

impl CellUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.language.is_none() && self.code.is_none()
    }
}

/// Ordered cells of an open project. Never holds fewer than one cell.
/// 專案中依序排列的儲存格；至少保有一個儲存格。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notebook {
    cells: Vec<Cell>,
}

impl Notebook {
    /// A notebook with one default cell.
    pub fn new() -> Self {
        Self {
            cells: vec![Cell::default()],
        }
    }

    /// Wraps loaded cells, adding a default cell when `cells` is empty.
    /// 包裝載入的儲存格；若為空則補上一個預設儲存格。
    pub fn from_cells(cells: Vec<Cell>) -> Self {
        if cells.is_empty() {
            Self::new()
        } else {
            Self { cells }
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; kept for the `len`/`is_empty` pairing.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Appends a cell and returns its index.
    pub fn push(&mut self, cell: Cell) -> usize {
        self.cells.push(cell);
        self.cells.len() - 1
    }

    /// Removes the cell at `index`. The last remaining cell cannot be removed.
    /// 移除指定儲存格；最後一個儲存格不可移除。
    pub fn remove(&mut self, index: usize) -> Result<Cell, NotebookError> {
        self.check_index(index)?;
        if self.cells.len() == 1 {
            return Err(NotebookError::LastCell);
        }
        Ok(self.cells.remove(index))
    }

    /// Applies `update` to the cell at `index` and returns the new value.
    pub fn update(&mut self, index: usize, update: CellUpdate) -> Result<&Cell, NotebookError> {
        self.check_index(index)?;
        let cell = &mut self.cells[index];
        if let Some(title) = update.title {
            cell.title = title;
        }
        if let Some(language) = update.language {
            cell.language = language;
        }
        if let Some(code) = update.code {
            cell.code = code;
        }
        Ok(cell)
    }

    fn check_index(&self, index: usize) -> Result<(), NotebookError> {
        if index < self.cells.len() {
            Ok(())
        } else {
            Err(NotebookError::IndexOutOfRange {
                index,
                len: self.cells.len(),
            })
        }
    }
}

impl Default for Notebook {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors emitted by [`Notebook`] edits.
/// [`Notebook`] 編輯操作可能發生的錯誤。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotebookError {
    #[error("cannot remove the last cell")]
    LastCell,
    #[error("cell {index} does not exist (project has {len} cells)")]
    IndexOutOfRange { index: usize, len: usize },
}
