use std::path::PathBuf;

use cellshot_render::{ExportError, ExportOptions, FontSet};
use cellshot_settings::{ExportPreferences, PreferencesError};

/// 字形來源。 / Where exported glyphs come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlyphSource {
    /// Solid boxes, no font needed.
    Draft,
    /// An outline font; `None` searches the platform font folders.
    Font { path: Option<PathBuf> },
}

/// 匯出所需的完整設定。 / Everything an export needs besides the cell itself.
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub options: ExportOptions,
    pub glyphs: GlyphSource,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            options: ExportOptions::default(),
            glyphs: GlyphSource::Font { path: None },
        }
    }
}

impl ExportSettings {
    pub fn draft() -> Self {
        Self {
            glyphs: GlyphSource::Draft,
            ..Self::default()
        }
    }

    /// 由偏好設定建立匯出設定。 / Builds settings from the `export` preferences section.
    pub fn from_preferences(prefs: &ExportPreferences) -> Result<Self, PreferencesError> {
        let mut options = ExportOptions {
            palette: prefs.palette()?,
            ..ExportOptions::default()
        };
        options.layout.font_size_px = prefs.font_size_px as f32;
        options.card.title_font_size_px = prefs.title_font_size_px as f32;
        options.card.include_window_controls = prefs.include_window_controls;

        let glyphs = if prefs.draft_glyphs {
            GlyphSource::Draft
        } else {
            GlyphSource::Font {
                path: prefs.font_path.clone(),
            }
        };
        Ok(Self { options, glyphs })
    }

    pub fn load_fonts(&self) -> Result<FontSet, ExportError> {
        match &self.glyphs {
            GlyphSource::Draft => Ok(FontSet::draft()),
            GlyphSource::Font { path } => FontSet::discover(path.as_deref()),
        }
    }
}
