use std::ops::Range;

use cellshot_highlight::{HighlightPalette, HighlightToken};

use crate::display::{CodeDisplayList, Color, DisplayCommand, GlyphRun, Point, Rectangle, Size};
use crate::glyphs::GlyphMetrics;

/// Options controlling the code bitmap: font size, padding and gutter colours.
/// 程式碼圖層的版面選項：字型大小、留白與行號欄配色。
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    pub font_size_px: f32,
    pub image_padding_px: u32,
    pub line_padding_px: u32,
    /// Minimum width of the line-number column, in characters.
    pub line_number_chars: usize,
    pub line_number_padding_px: u32,
    pub background: Color,
    pub line_number_background: Color,
    pub line_number_foreground: Color,
    pub default_foreground: Color,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        let page = Color::from_rgb8(0xDF, 0xE0, 0xE1);
        Self {
            font_size_px: 14.0,
            image_padding_px: 30,
            line_padding_px: 6,
            line_number_chars: 2,
            line_number_padding_px: 6,
            background: page,
            line_number_background: page,
            line_number_foreground: Color::from_rgb8(0x60, 0x6F, 0x85),
            default_foreground: Color::from_rgb8(0, 0, 0),
        }
    }
}

/// Source lines fed to the layout stage.
/// 版面配置階段所需的原始碼行介面。
pub trait LayoutInput {
    fn line_count(&self) -> usize;
    fn line_text(&self, index: usize) -> Option<&str>;
    fn highlight_spans(&self, index: usize) -> Vec<HighlightSpan> {
        let _ = index;
        Vec::new()
    }
}

/// Colour information for a character range of one line.
/// 單行中某段字元範圍的著色資訊。
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightSpan {
    /// Character (not byte) range within the line.
    pub range: Range<usize>,
    pub foreground: Color,
    pub background: Option<Color>,
    pub bold: bool,
}

impl HighlightSpan {
    pub fn new(start: usize, end: usize, foreground: Color, background: Option<Color>) -> Self {
        Self {
            range: start..end,
            foreground,
            background,
            bold: false,
        }
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }
}

/// Code lines paired with the spans a highlighter produced for them.
/// 程式碼行與對應的高亮區段。
#[derive(Debug, Clone, Default)]
pub struct HighlightedSource {
    lines: Vec<String>,
    spans: Vec<Vec<HighlightSpan>>,
}

impl HighlightedSource {
    /// Splits `code` into lines and maps byte-ranged tokens onto per-line character spans.
    /// Gaps between tokens, and tokens without a palette entry, use `default_foreground`.
    pub fn new(
        code: &str,
        tokens: &[HighlightToken],
        palette: &HighlightPalette,
        default_foreground: Color,
    ) -> Self {
        let mut ordered: Vec<&HighlightToken> = tokens.iter().collect();
        ordered.sort_by_key(|token| token.range.start);

        let mut lines = Vec::new();
        let mut spans = Vec::new();
        let mut line_start = 0usize;
        for line in code.split('\n') {
            let line_end = line_start + line.len();
            spans.push(line_spans(
                line,
                line_start..line_end,
                &ordered,
                palette,
                default_foreground,
            ));
            lines.push(line.to_string());
            line_start = line_end + 1;
        }

        Self { lines, spans }
    }
}

impl LayoutInput for HighlightedSource {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_text(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    fn highlight_spans(&self, index: usize) -> Vec<HighlightSpan> {
        self.spans.get(index).cloned().unwrap_or_default()
    }
}

fn line_spans(
    line: &str,
    bounds: Range<usize>,
    tokens: &[&HighlightToken],
    palette: &HighlightPalette,
    default_foreground: Color,
) -> Vec<HighlightSpan> {
    let mut spans = Vec::new();
    let mut cursor = 0usize;
    let plain = |start: usize, end: usize| HighlightSpan::new(start, end, default_foreground, None);

    for token in tokens {
        if token.range.end <= bounds.start || token.range.start >= bounds.end {
            continue;
        }
        let start = token.range.start.max(bounds.start) - bounds.start;
        let end = token.range.end.min(bounds.end) - bounds.start;
        let start = start.max(cursor);
        if start >= end || !line.is_char_boundary(start) || !line.is_char_boundary(end) {
            continue;
        }

        let char_start = line[..start].chars().count();
        let char_end = char_start + line[start..end].chars().count();
        let char_cursor = line[..cursor].chars().count();
        if char_cursor < char_start {
            spans.push(plain(char_cursor, char_start));
        }

        let span = match palette.style_for(&token.kind) {
            Some(style) => HighlightSpan::new(
                char_start,
                char_end,
                style.foreground.into(),
                style.background.map(Color::from),
            )
            .with_bold(style.bold),
            None => plain(char_start, char_end),
        };
        spans.push(span);
        cursor = end;
    }

    let char_cursor = line[..cursor].chars().count();
    let char_len = line.chars().count();
    if char_cursor < char_len {
        spans.push(plain(char_cursor, char_len));
    }
    spans
}

/// Fixed-grid layout of a code listing, sized in whole pixels.
/// 以固定字元格排版後的程式碼圖層。
#[derive(Debug, Clone)]
pub struct CodeLayout {
    pub width_px: u32,
    pub height_px: u32,
    pub line_count: usize,
    pub display_list: CodeDisplayList,
}

/// Lays out every line on a monospace grid with a right-aligned line-number gutter.
/// 以等寬字元格配置每一行，並在左側加上靠右對齊的行號欄。
pub fn layout_code(
    input: &dyn LayoutInput,
    metrics: &GlyphMetrics,
    options: &LayoutOptions,
) -> CodeLayout {
    let char_width = metrics.advance.max(1.0);
    let line_height = metrics.line_height.max(1.0).ceil() + options.line_padding_px as f32;
    let padding = options.image_padding_px as f32;
    let line_count = input.line_count().max(1);

    let digits = options.line_number_chars.max(line_count.to_string().len());
    let gutter_width =
        (digits as f32 * char_width).ceil() + (options.line_number_padding_px * 2) as f32;
    let text_origin_x = padding + gutter_width;

    let longest = (0..input.line_count())
        .filter_map(|index| input.line_text(index))
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);

    let width_px = (text_origin_x + longest as f32 * char_width + padding).ceil() as u32;
    let height_px = (padding * 2.0 + line_count as f32 * line_height).ceil() as u32;

    let mut display = CodeDisplayList::default();
    display.push(DisplayCommand::BackgroundRect(Rectangle {
        origin: Point { x: 0.0, y: 0.0 },
        size: Size {
            width: width_px as f32,
            height: height_px as f32,
        },
        color: options.background,
    }));
    display.push(DisplayCommand::BackgroundRect(Rectangle {
        origin: Point { x: 0.0, y: 0.0 },
        size: Size {
            width: padding + gutter_width - options.line_number_padding_px as f32,
            height: height_px as f32,
        },
        color: options.line_number_background,
    }));

    for line_idx in 0..input.line_count() {
        let y = padding + line_idx as f32 * line_height;
        let number = (line_idx + 1).to_string();
        let number_x = padding + (digits - number.len()) as f32 * char_width;
        display.push(DisplayCommand::GlyphRun(GlyphRun {
            text: number,
            font_size_px: options.font_size_px,
            position: Point { x: number_x, y },
            color: options.line_number_foreground,
            background: None,
            bold: false,
        }));

        let text = input.line_text(line_idx).unwrap_or_default();
        let char_len = text.chars().count();
        let mut spans = input.highlight_spans(line_idx);
        if spans.is_empty() {
            spans.push(HighlightSpan::new(
                0,
                char_len,
                options.default_foreground,
                None,
            ));
        }

        for span in spans {
            let start = span.range.start.min(char_len);
            let end = span.range.end.min(char_len);
            if start >= end {
                continue;
            }
            let bytes = char_range_to_byte_range(text, start, end);
            let slice = &text[bytes];
            if slice.trim().is_empty() && span.background.is_none() {
                continue;
            }

            let x = text_origin_x + start as f32 * char_width;
            if let Some(bg) = span.background {
                display.push(DisplayCommand::BackgroundRect(Rectangle {
                    origin: Point { x, y },
                    size: Size {
                        width: (end - start) as f32 * char_width,
                        height: line_height,
                    },
                    color: bg,
                }));
            }
            display.push(DisplayCommand::GlyphRun(GlyphRun {
                text: slice.to_string(),
                font_size_px: options.font_size_px,
                position: Point { x, y },
                color: span.foreground,
                background: span.background,
                bold: span.bold,
            }));
        }
    }

    CodeLayout {
        width_px,
        height_px,
        line_count,
        display_list: display,
    }
}

fn char_range_to_byte_range(text: &str, start: usize, end: usize) -> Range<usize> {
    char_pos_to_byte_index(text, start)..char_pos_to_byte_index(text, end)
}

fn char_pos_to_byte_index(text: &str, target: usize) -> usize {
    text.char_indices()
        .nth(target)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellshot_highlight::{HighlightKind, HighlightStyle};

    fn metrics() -> GlyphMetrics {
        GlyphMetrics {
            advance: 8.0,
            ascent: 11.0,
            line_height: 14.0,
        }
    }

    fn source(code: &str) -> HighlightedSource {
        HighlightedSource::new(
            code,
            &[],
            &HighlightPalette::default(),
            Color::from_rgb8(0, 0, 0),
        )
    }

    #[test]
    fn size_follows_longest_line_and_line_count() {
        let options = LayoutOptions::default();
        let layout = layout_code(&source("ab\nabcd\n"), &metrics(), &options);
        // three lines: "ab", "abcd", ""
        assert_eq!(layout.line_count, 3);
        // padding 30 + gutter (2 * 8 + 12) + 4 chars * 8 + padding 30
        assert_eq!(layout.width_px, 30 + 28 + 32 + 30);
        assert_eq!(layout.height_px, 60 + 3 * 20);
    }

    #[test]
    fn gutter_widens_for_three_digit_line_counts() {
        let code = vec!["x"; 120].join("\n");
        let layout = layout_code(&source(&code), &metrics(), &LayoutOptions::default());
        let first_number = layout
            .display_list
            .glyph_runs()
            .find(|run| run.text == "1")
            .unwrap();
        // right-aligned in a three-character column
        assert_eq!(first_number.position.x, 30.0 + 2.0 * 8.0);
    }

    #[test]
    fn tokens_map_to_character_spans_with_plain_gaps() {
        let mut palette = HighlightPalette::default();
        let red = cellshot_highlight::Color::rgb(200, 0, 0);
        palette.insert_standard("keyword", HighlightStyle::bold(red));
        let code = "é fn x";
        let tokens = vec![HighlightToken {
            range: 3..5,
            kind: HighlightKind::Keyword,
        }];
        let source = HighlightedSource::new(code, &tokens, &palette, Color::from_rgb8(0, 0, 0));
        let spans = source.highlight_spans(0);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].range, 0..2);
        assert_eq!(spans[1].range, 2..4);
        assert!(spans[1].bold);
        assert_eq!(spans[1].foreground, Color::from(red));
        assert_eq!(spans[2].range, 4..6);
    }

    #[test]
    fn bold_styles_reach_glyph_runs() {
        let mut palette = HighlightPalette::default();
        palette.insert_standard(
            "keyword",
            HighlightStyle::bold(cellshot_highlight::Color::rgb(0, 0, 200)),
        );
        let tokens = vec![HighlightToken {
            range: 0..2,
            kind: HighlightKind::Keyword,
        }];
        let source = HighlightedSource::new("if x", &tokens, &palette, Color::from_rgb8(0, 0, 0));
        let layout = layout_code(&source, &metrics(), &LayoutOptions::default());
        let runs: Vec<_> = layout
            .display_list
            .glyph_runs()
            .map(|run| (run.text.as_str(), run.bold))
            .collect();
        assert_eq!(runs, vec![("1", false), ("if", true), (" x", false)]);
    }

    #[test]
    fn multi_line_tokens_are_split_per_line() {
        let mut palette = HighlightPalette::default();
        palette.insert_standard(
            "comment",
            HighlightStyle::italic(cellshot_highlight::Color::rgb(0, 128, 0)),
        );
        let code = "/* a\nb */ c";
        let tokens = vec![HighlightToken {
            range: 0..9,
            kind: HighlightKind::Comment,
        }];
        let source = HighlightedSource::new(code, &tokens, &palette, Color::from_rgb8(0, 0, 0));
        assert_eq!(source.highlight_spans(0)[0].range, 0..4);
        let second = source.highlight_spans(1);
        assert_eq!(second[0].range, 0..4);
        assert_eq!(second[1].range, 4..6);
    }

    #[test]
    fn whitespace_only_runs_are_skipped() {
        let layout = layout_code(&source("a    b"), &metrics(), &LayoutOptions::default());
        let texts: Vec<_> = layout
            .display_list
            .glyph_runs()
            .map(|run| run.text.as_str())
            .collect();
        assert_eq!(texts, vec!["1", "a    b"]);
    }

    #[test]
    fn byte_conversion_handles_multibyte_text() {
        assert_eq!(char_range_to_byte_range("aé漢b", 1, 3), 1..6);
        assert_eq!(char_range_to_byte_range("ab", 1, 9), 1..2);
    }
}
