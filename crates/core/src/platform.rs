use std::io;
use std::path::Path;
use std::process::Command;

use log::debug;
use thiserror::Error;

/// 平台整合（剪貼簿、檔案管理員）的錯誤。 / Errors from clipboard and file-manager integration.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {status}")]
    LaunchStatus {
        program: &'static str,
        status: std::process::ExitStatus,
    },
}

/// 可寫入文字的剪貼簿。 / Destination for copied cell text.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), PlatformError>;
}

/// 以 `arboard` 存取系統剪貼簿。 / System clipboard backed by `arboard`.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), PlatformError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|err| PlatformError::Clipboard(err.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|err| PlatformError::Clipboard(err.to_string()))
    }
}

/// 以檔案管理員開啟資料夾。 / Reveals a folder in the platform file manager.
pub trait FolderOpener {
    fn open(&self, path: &Path) -> Result<(), PlatformError>;
}

#[derive(Debug, Default)]
pub struct SystemFolderOpener;

impl SystemFolderOpener {
    /// 目前平台使用的開啟程式。 / Program used on the current platform.
    pub const fn program() -> &'static str {
        if cfg!(target_os = "windows") {
            "explorer"
        } else if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        }
    }
}

impl FolderOpener for SystemFolderOpener {
    fn open(&self, path: &Path) -> Result<(), PlatformError> {
        let program = Self::program();
        debug!("opening {} with {program}", path.display());
        let status = Command::new(program)
            .arg(path)
            .status()
            .map_err(|source| PlatformError::Launch { program, source })?;
        // explorer reports 1 even on success
        if status.success() || cfg!(target_os = "windows") {
            Ok(())
        } else {
            Err(PlatformError::LaunchStatus { program, status })
        }
    }
}
