//! Language table and regex-based syntax highlighter for cell code.
//! （儲存格程式碼的語言表與正規表示式高亮器。）

mod builtin;
mod language;
mod rules;
mod tag;
mod theme;

pub use builtin::rules_for;
pub use language::{
    HighlightError, HighlightKind, HighlightToken, LanguageDefinition, LanguageRegistry,
};
pub use rules::{Delimiter, LanguageRules, PatternSource};
pub use tag::LanguageTag;
pub use theme::{
    parse_highlight_palette, Color, ColorParseError, HighlightPalette, HighlightStyle,
    ThemeParseError,
};
