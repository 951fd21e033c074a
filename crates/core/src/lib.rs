//! Notebook controller tying together cells, the project store, export and platform hooks.
//! 筆記本控制器：整合儲存格、專案儲存、圖片匯出與平台功能。

pub mod app;
pub mod export;
pub mod platform;

pub use app::{AppError, CellFailure, ExportSummary, NotebookApp};
pub use export::{ExportSettings, GlyphSource};
pub use platform::{Clipboard, FolderOpener, PlatformError, SystemClipboard, SystemFolderOpener};
