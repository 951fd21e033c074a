use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cellshot_highlight::{HighlightPalette, LanguageRegistry, LanguageTag};
use image::{codecs::png::PngEncoder, ColorType, ImageEncoder, RgbaImage};
use log::{debug, info};
use thiserror::Error;

use crate::card::{compose_card, drop_shadow, CardStyle};
use crate::glyphs::FontSet;
use crate::layout::{layout_code, HighlightedSource, LayoutOptions};
use crate::raster::rasterize;

/// File stem used when a cell has no title.
pub const UNTITLED_STEM: &str = "untitled";

const TAB_WIDTH: usize = 4;

/// Errors surfaced while turning a cell into a PNG.
/// 將儲存格轉為 PNG 時可能發生的錯誤。
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot export a cell with no code")]
    EmptyCode,
    #[error("unsupported language '{0}'")]
    UnsupportedLanguage(String),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to load font: {0}")]
    FontLoad(String),
    #[error("failed to encode PNG: {0}")]
    Encode(String),
}

/// The three fields of a cell that an export reads.
/// 匯出時所需的儲存格欄位。
#[derive(Debug, Clone, Copy)]
pub struct CardRequest<'a> {
    pub title: &'a str,
    pub language: &'a str,
    pub code: &'a str,
}

impl<'a> CardRequest<'a> {
    pub fn new(title: &'a str, language: &'a str, code: &'a str) -> Self {
        Self {
            title,
            language,
            code,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub layout: LayoutOptions,
    pub card: CardStyle,
    pub palette: HighlightPalette,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            layout: LayoutOptions::default(),
            card: CardStyle::default(),
            palette: HighlightPalette::classic(),
        }
    }
}

/// Renders the full card, shadow included, as an RGBA image.
/// 產生含陰影的完整卡片影像。
pub fn render_card(
    request: &CardRequest<'_>,
    fonts: &FontSet,
    options: &ExportOptions,
) -> Result<RgbaImage, ExportError> {
    let code = normalize_code(request.code);
    if code.trim().is_empty() {
        return Err(ExportError::EmptyCode);
    }
    let tag: LanguageTag = request
        .language
        .parse()
        .map_err(|_| ExportError::UnsupportedLanguage(request.language.to_string()))?;
    let tokens = LanguageRegistry::shared()
        .highlight(tag, &code)
        .map_err(|_| ExportError::UnsupportedLanguage(tag.to_string()))?;
    debug!("highlighted {} tokens as {tag}", tokens.len());

    let metrics = fonts.code.metrics(options.layout.font_size_px);
    let source = HighlightedSource::new(
        &code,
        &tokens,
        &options.palette,
        options.layout.default_foreground,
    );
    let layout = layout_code(&source, &metrics, &options.layout);
    let bitmap = rasterize(&layout, fonts.code.as_ref());

    let title = request.title.trim();
    let title = (!title.is_empty()).then_some(title);
    let card = compose_card(&bitmap, title, fonts, &options.card);
    Ok(drop_shadow(&card, &options.card))
}

/// Renders the card and encodes it as PNG bytes.
pub fn render_card_png(
    request: &CardRequest<'_>,
    fonts: &FontSet,
    options: &ExportOptions,
) -> Result<Vec<u8>, ExportError> {
    let image = render_card(request, fonts, options)?;
    encode_png(&image)
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut data = Vec::new();
    PngEncoder::new(&mut data)
        .write_image(image.as_raw(), image.width(), image.height(), ColorType::Rgba8)
        .map_err(|err| ExportError::Encode(err.to_string()))?;
    Ok(data)
}

/// Writes `<folder>/<sanitized title>.png`, replacing any previous export of the same title.
/// The folder is created when missing.
/// （輸出 `<資料夾>/<清理後標題>.png`，同名檔案會被覆寫。）
pub fn export_cell(
    folder: &Path,
    request: &CardRequest<'_>,
    fonts: &FontSet,
    options: &ExportOptions,
) -> Result<PathBuf, ExportError> {
    let data = render_card_png(request, fonts, options)?;
    fs::create_dir_all(folder).map_err(|source| ExportError::Io {
        path: folder.to_path_buf(),
        source,
    })?;
    let path = folder.join(card_file_name(request.title));
    fs::write(&path, data).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    info!("exported {}", path.display());
    Ok(path)
}

/// `<stem>.png` for a cell title.
pub fn card_file_name(title: &str) -> String {
    format!("{}.png", sanitize_file_stem(title))
}

/// Keeps alphanumerics, spaces, `-` and `_`; every other character becomes `_`.
/// A blank title maps to [`UNTITLED_STEM`].
/// （保留英數字、空白、`-` 與 `_`，其餘字元以 `_` 取代。）
pub fn sanitize_file_stem(title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        return UNTITLED_STEM.to_string();
    }
    title
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() || matches!(ch, ' ' | '-' | '_') {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

/// Expands tabs, drops carriage returns and leading blank lines, trims trailing whitespace.
pub fn normalize_code(code: &str) -> String {
    let expanded = code
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\t', &" ".repeat(TAB_WIDTH));
    let mut lines: Vec<&str> = expanded.lines().map(str::trim_end).collect();
    let first = lines
        .iter()
        .position(|line| !line.is_empty())
        .unwrap_or(lines.len());
    lines.drain(..first);
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_reserved_characters() {
        assert_eq!(card_file_name("Hello/World:1"), "Hello_World_1.png");
        assert_eq!(sanitize_file_stem("  a-b_c d  "), "a-b_c d");
        assert_eq!(sanitize_file_stem("café*"), "café_");
        assert_eq!(sanitize_file_stem("   "), UNTITLED_STEM);
    }

    #[test]
    fn normalizes_code_edges() {
        assert_eq!(normalize_code("\n\n  x = 1  \n\ty\n\n"), "  x = 1\n    y");
        assert_eq!(normalize_code("a\r\nb"), "a\nb");
        assert_eq!(normalize_code(" \n \n"), "");
    }

    #[test]
    fn empty_code_fails_before_language_check() {
        let request = CardRequest::new("t", "cobol", "   \n ");
        let err = render_card(&request, &FontSet::draft(), &ExportOptions::default()).unwrap_err();
        assert!(matches!(err, ExportError::EmptyCode));
    }

    #[test]
    fn unknown_language_is_rejected() {
        let request = CardRequest::new("t", "cobol", "DISPLAY 'HI'.");
        let err = render_card(&request, &FontSet::draft(), &ExportOptions::default()).unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedLanguage(tag) if tag == "cobol"));
    }

    #[test]
    fn png_bytes_carry_the_signature() {
        let request = CardRequest::new("demo", "python", "print('hi')");
        let data =
            render_card_png(&request, &FontSet::draft(), &ExportOptions::default()).unwrap();
        assert_eq!(&data[..8], b"\x89PNG\r\n\x1a\n");
    }
}
