use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cellshot_highlight::{parse_highlight_palette, HighlightPalette, ThemeParseError};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const PREFERENCES_VERSION: u32 = 1;
const MIN_FONT_SIZE_PX: u32 = 6;
const MAX_FONT_SIZE_PX: u32 = 72;

/// Directory, relative to a project, holding the preferences file.
pub const PREFERENCES_DIR_NAME: &str = ".cellshot";
pub const PREFERENCES_FILE_NAME: &str = "preferences.json";

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("failed to read preferences {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse preferences {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize preferences {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write preferences {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to prepare directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unknown preference key '{0}'")]
    UnknownKey(String),
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
    #[error("invalid syntax palette: {0}")]
    Palette(#[from] ThemeParseError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub export: ExportPreferences,
}

fn default_version() -> u32 {
    PREFERENCES_VERSION
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            version: PREFERENCES_VERSION,
            export: ExportPreferences::default(),
        }
    }
}

impl Preferences {
    /// Keys accepted by [`Preferences::set`].
    pub const KEYS: [&'static str; 6] = [
        "export.font_path",
        "export.font_size_px",
        "export.title_font_size_px",
        "export.include_window_controls",
        "export.draft_glyphs",
        "export.syntax",
    ];

    /// Location of the preferences file for a project directory.
    /// 取得專案目錄對應的偏好設定檔路徑。
    pub fn path_for_project(project_dir: &Path) -> PathBuf {
        project_dir
            .join(PREFERENCES_DIR_NAME)
            .join(PREFERENCES_FILE_NAME)
    }

    pub fn sanitize(&mut self) {
        if self.version == 0 {
            self.version = PREFERENCES_VERSION;
        }
        self.export.sanitize();
    }

    /// Sets one dotted key from its textual form. An empty value resets optional keys.
    /// 以字串值設定單一偏好項目；可選項目給空字串即清除。
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), PreferencesError> {
        let invalid = |reason: String| PreferencesError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason,
        };
        let export = &mut self.export;
        match key {
            "export.font_path" => {
                let trimmed = value.trim();
                export.font_path = (!trimmed.is_empty()).then(|| PathBuf::from(trimmed));
            }
            "export.font_size_px" => {
                export.font_size_px =
                    value.trim().parse().map_err(|err| invalid(format!("{err}")))?;
            }
            "export.title_font_size_px" => {
                export.title_font_size_px =
                    value.trim().parse().map_err(|err| invalid(format!("{err}")))?;
            }
            "export.include_window_controls" => {
                export.include_window_controls =
                    parse_flag(value).ok_or_else(|| invalid("expected true or false".to_string()))?;
            }
            "export.draft_glyphs" => {
                export.draft_glyphs =
                    parse_flag(value).ok_or_else(|| invalid("expected true or false".to_string()))?;
            }
            "export.syntax" => {
                if value.trim().is_empty() {
                    export.syntax = None;
                } else {
                    let parsed: serde_json::Value =
                        serde_json::from_str(value).map_err(|err| invalid(err.to_string()))?;
                    parse_highlight_palette(&parsed)?;
                    export.syntax = Some(parsed);
                }
            }
            other => return Err(PreferencesError::UnknownKey(other.to_string())),
        }
        self.sanitize();
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Settings that shape exported cards.
/// 影響匯出卡片外觀的設定。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPreferences {
    /// Explicit code font; when absent a platform monospace font is searched for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,
    #[serde(default = "default_font_size")]
    pub font_size_px: u32,
    #[serde(default = "default_title_font_size")]
    pub title_font_size_px: u32,
    #[serde(default)]
    pub include_window_controls: bool,
    /// Render glyphs as solid boxes instead of loading a font.
    #[serde(default)]
    pub draft_glyphs: bool,
    /// Palette override in the `{ "keyword": { "foreground": "#RRGGBB" } }` form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syntax: Option<serde_json::Value>,
}

fn default_font_size() -> u32 {
    14
}

fn default_title_font_size() -> u32 {
    15
}

impl Default for ExportPreferences {
    fn default() -> Self {
        Self {
            font_path: None,
            font_size_px: default_font_size(),
            title_font_size_px: default_title_font_size(),
            include_window_controls: false,
            draft_glyphs: false,
            syntax: None,
        }
    }
}

impl ExportPreferences {
    fn sanitize(&mut self) {
        if self
            .font_path
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            self.font_path = None;
        }
        self.font_size_px = self.font_size_px.clamp(MIN_FONT_SIZE_PX, MAX_FONT_SIZE_PX);
        self.title_font_size_px = self
            .title_font_size_px
            .clamp(MIN_FONT_SIZE_PX, MAX_FONT_SIZE_PX);
        if self.syntax.as_ref().is_some_and(|value| !value.is_object()) {
            warn!("ignoring export.syntax: expected an object");
            self.syntax = None;
        }
    }

    /// The classic palette with any `syntax` override applied on top.
    /// 以預設配色為基礎，套用 `syntax` 覆寫後的結果。
    pub fn palette(&self) -> Result<HighlightPalette, PreferencesError> {
        let mut palette = HighlightPalette::classic();
        if let Some(syntax) = &self.syntax {
            palette.merge(&parse_highlight_palette(syntax)?);
        }
        Ok(palette)
    }
}

#[derive(Debug)]
pub struct PreferencesStore {
    path: PathBuf,
    data: Preferences,
}

impl PreferencesStore {
    pub fn new(path: impl Into<PathBuf>, preferences: Preferences) -> Self {
        Self {
            path: path.into(),
            data: preferences,
        }
    }

    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PreferencesError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            debug!("no preferences at {}, using defaults", path.display());
            let mut data = Preferences::default();
            data.sanitize();
            return Ok(Self { path, data });
        }

        let contents = fs::read_to_string(&path).map_err(|source| PreferencesError::Read {
            path: path.clone(),
            source,
        })?;
        let mut data: Preferences =
            serde_json::from_str(&contents).map_err(|source| PreferencesError::Parse {
                path: path.clone(),
                source,
            })?;
        data.sanitize();
        Ok(Self { path, data })
    }

    pub fn preferences(&self) -> &Preferences {
        &self.data
    }

    /// Applies [`Preferences::set`] and persists the result.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), PreferencesError> {
        self.data.set(key, value)?;
        self.save()
    }

    pub fn save(&self) -> Result<(), PreferencesError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| PreferencesError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let payload = serde_json::to_string_pretty(&self.data).map_err(|source| {
            PreferencesError::Serialize {
                path: self.path.clone(),
                source,
            }
        })?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, payload.as_bytes()).map_err(|source| PreferencesError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| PreferencesError::Write {
            path: self.path.clone(),
            source,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
