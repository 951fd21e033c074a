use std::collections::HashMap;

use crate::language::HighlightKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA`.
    pub fn from_hex(input: &str) -> Result<Self, ColorParseError> {
        parse_color(input)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightStyle {
    pub foreground: Color,
    pub background: Option<Color>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl HighlightStyle {
    pub const fn plain(foreground: Color) -> Self {
        Self {
            foreground,
            background: None,
            bold: false,
            italic: false,
            underline: false,
        }
    }

    pub const fn bold(foreground: Color) -> Self {
        Self {
            foreground,
            background: None,
            bold: true,
            italic: false,
            underline: false,
        }
    }

    pub const fn italic(foreground: Color) -> Self {
        Self {
            foreground,
            background: None,
            bold: false,
            italic: true,
            underline: false,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct HighlightPalette {
    keyword: Option<HighlightStyle>,
    string: Option<HighlightStyle>,
    comment: Option<HighlightStyle>,
    number: Option<HighlightStyle>,
    operator: Option<HighlightStyle>,
    identifier: Option<HighlightStyle>,
    custom: HashMap<String, HighlightStyle>,
}

impl HighlightPalette {
    /// Light palette used for exported cards: green keywords, teal italic
    /// comments, red strings, grey numbers and operators.
    /// （匯出圖片採用的淺色配色。）
    pub fn classic() -> Self {
        let mut palette = Self::default();
        palette.keyword = Some(HighlightStyle::bold(Color::rgb(0x00, 0x80, 0x00)));
        palette.comment = Some(HighlightStyle::italic(Color::rgb(0x3D, 0x7B, 0x7B)));
        palette.string = Some(HighlightStyle::plain(Color::rgb(0xBA, 0x21, 0x21)));
        palette.number = Some(HighlightStyle::plain(Color::rgb(0x66, 0x66, 0x66)));
        palette.operator = Some(HighlightStyle::plain(Color::rgb(0x66, 0x66, 0x66)));
        palette.insert_custom("builtin", HighlightStyle::plain(Color::rgb(0x00, 0x80, 0x00)));
        palette.insert_custom("tag", HighlightStyle::bold(Color::rgb(0x00, 0x80, 0x00)));
        palette.insert_custom("attribute", HighlightStyle::plain(Color::rgb(0x68, 0x78, 0x22)));
        palette.insert_custom("variable", HighlightStyle::plain(Color::rgb(0x19, 0x17, 0x7C)));
        palette.insert_custom("decorator", HighlightStyle::plain(Color::rgb(0xAA, 0x22, 0xFF)));
        palette.insert_custom("preprocessor", HighlightStyle::plain(Color::rgb(0x9C, 0x65, 0x00)));
        palette.insert_custom("symbol", HighlightStyle::plain(Color::rgb(0x19, 0x17, 0x7C)));
        palette.insert_custom("lifetime", HighlightStyle::plain(Color::rgb(0xA4, 0x5A, 0x77)));
        palette.insert_custom("entity", HighlightStyle::bold(Color::rgb(0x71, 0x71, 0x71)));
        palette
    }

    /// Overlays every style set in `other` on top of `self`.
    pub fn merge(&mut self, other: &HighlightPalette) {
        let pairs = [
            (&mut self.keyword, &other.keyword),
            (&mut self.string, &other.string),
            (&mut self.comment, &other.comment),
            (&mut self.number, &other.number),
            (&mut self.operator, &other.operator),
            (&mut self.identifier, &other.identifier),
        ];
        for (target, source) in pairs {
            if let Some(style) = source {
                *target = Some(style.clone());
            }
        }
        for (name, style) in &other.custom {
            self.custom.insert(name.clone(), style.clone());
        }
    }

    pub fn style_for(&self, kind: &HighlightKind) -> Option<&HighlightStyle> {
        match kind {
            HighlightKind::Keyword => self.keyword.as_ref(),
            HighlightKind::String => self.string.as_ref(),
            HighlightKind::Comment => self.comment.as_ref(),
            HighlightKind::Number => self.number.as_ref(),
            HighlightKind::Operator => self.operator.as_ref(),
            HighlightKind::Identifier => self.identifier.as_ref(),
            HighlightKind::Custom(name) => self.custom.get(name),
        }
    }

    pub fn insert_standard(&mut self, key: &str, style: HighlightStyle) {
        match key {
            "keyword" => self.keyword = Some(style),
            "string" => self.string = Some(style),
            "comment" => self.comment = Some(style),
            "number" => self.number = Some(style),
            "operator" => self.operator = Some(style),
            "identifier" => self.identifier = Some(style),
            _ => {
                self.custom.insert(key.to_string(), style);
            }
        }
    }

    pub fn insert_custom(&mut self, name: impl Into<String>, style: HighlightStyle) {
        self.custom.insert(name.into(), style);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ThemeParseError {
    #[error("syntax entries must be objects")]
    InvalidSyntax,
    #[error("invalid color '{value}': {reason}")]
    InvalidColor {
        value: String,
        reason: ColorParseError,
    },
    #[error("entries must contain foreground color")]
    MissingForeground,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorParseError {
    MissingHash,
    InvalidLength,
    InvalidHex,
}

impl std::fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorParseError::MissingHash => write!(f, "missing leading '#'"),
            ColorParseError::InvalidLength => write!(f, "expected 6 or 8 hex digits"),
            ColorParseError::InvalidHex => write!(f, "contains non-hex digits"),
        }
    }
}

pub fn parse_highlight_palette(
    syntax_value: &serde_json::Value,
) -> Result<HighlightPalette, ThemeParseError> {
    let map = syntax_value
        .as_object()
        .ok_or(ThemeParseError::InvalidSyntax)?;
    let mut palette = HighlightPalette::default();
    for (name, entry) in map {
        let style = parse_style(entry)?;
        palette.insert_standard(name, style);
    }
    Ok(palette)
}

fn parse_style(value: &serde_json::Value) -> Result<HighlightStyle, ThemeParseError> {
    let map = value.as_object().ok_or(ThemeParseError::InvalidSyntax)?;

    let foreground = map
        .get("foreground")
        .and_then(|value| value.as_str())
        .ok_or(ThemeParseError::MissingForeground)?;
    let foreground = parse_color(foreground).map_err(|reason| ThemeParseError::InvalidColor {
        value: foreground.to_string(),
        reason,
    })?;

    let background = map
        .get("background")
        .and_then(|value| value.as_str())
        .map(|value| {
            parse_color(value).map_err(|reason| ThemeParseError::InvalidColor {
                value: value.to_string(),
                reason,
            })
        })
        .transpose()?;

    let bold = map
        .get("bold")
        .and_then(|value| value.as_bool())
        .unwrap_or(false);
    let italic = map
        .get("italic")
        .and_then(|value| value.as_bool())
        .unwrap_or(false);
    let underline = map
        .get("underline")
        .and_then(|value| value.as_bool())
        .unwrap_or(false);

    Ok(HighlightStyle {
        foreground,
        background,
        bold,
        italic,
        underline,
    })
}

fn parse_color(input: &str) -> Result<Color, ColorParseError> {
    let trimmed = input.trim();
    let hex = trimmed
        .strip_prefix('#')
        .ok_or(ColorParseError::MissingHash)?;
    if !hex.is_ascii() {
        return Err(ColorParseError::InvalidHex);
    }
    if hex.len() != 6 && hex.len() != 8 {
        return Err(ColorParseError::InvalidLength);
    }
    let mut components = [0u8; 4];
    for index in 0..(hex.len() / 2) {
        let slice = &hex[index * 2..index * 2 + 2];
        components[index] =
            u8::from_str_radix(slice, 16).map_err(|_| ColorParseError::InvalidHex)?;
    }
    if hex.len() == 6 {
        components[3] = 255;
    }
    Ok(Color {
        r: components[0],
        g: components[1],
        b: components[2],
        a: components[3],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_palette() {
        let value = json!({
            "keyword": {
                "foreground": "#FFAA00",
                "bold": true
            },
            "string": {
                "foreground": "#11AAFF",
                "italic": true
            },
            "custom.debug": {
                "foreground": "#CCCCCC"
            }
        });

        let palette = parse_highlight_palette(&value).unwrap();
        assert!(palette.style_for(&HighlightKind::Keyword).is_some());
        assert!(palette.style_for(&HighlightKind::String).is_some());
        let custom = HighlightKind::Custom("custom.debug".into());
        assert!(palette.style_for(&custom).is_some());
    }

    #[test]
    fn merge_overrides_only_present_entries() {
        let mut palette = HighlightPalette::classic();
        let overrides = parse_highlight_palette(&json!({
            "string": { "foreground": "#112233" }
        }))
        .unwrap();
        palette.merge(&overrides);

        let string = palette.style_for(&HighlightKind::String).unwrap();
        assert_eq!(string.foreground, Color::rgb(0x11, 0x22, 0x33));
        let keyword = palette.style_for(&HighlightKind::Keyword).unwrap();
        assert_eq!(keyword.foreground, Color::rgb(0x00, 0x80, 0x00));
        assert!(keyword.bold);
    }

    #[test]
    fn rejects_malformed_colors() {
        assert_eq!(Color::from_hex("123456"), Err(ColorParseError::MissingHash));
        assert_eq!(Color::from_hex("#12345"), Err(ColorParseError::InvalidLength));
        assert_eq!(Color::from_hex("#12345G"), Err(ColorParseError::InvalidHex));
        assert_eq!(
            Color::from_hex("#80808040").unwrap(),
            Color {
                r: 0x80,
                g: 0x80,
                b: 0x80,
                a: 0x40
            }
        );
    }
}
