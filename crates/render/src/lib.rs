//! Turns a code cell into a styled PNG card: highlighted code bitmap with a
//! line-number gutter, gradient title bar, rounded corners and drop shadow.
//! （將程式碼儲存格輸出為帶有標題列、圓角與陰影的 PNG 卡片。）

pub mod card;
pub mod display;
pub mod export;
pub mod glyphs;
pub mod layout;
pub mod raster;

pub use card::{compose_card, drop_shadow, paint_gradient, round_corners, CardStyle};
pub use display::{CodeDisplayList, Color, DisplayCommand, GlyphRun, Point, Rectangle, Size};
pub use export::{
    card_file_name, encode_png, export_cell, normalize_code, render_card, render_card_png,
    sanitize_file_stem, CardRequest, ExportError, ExportOptions, UNTITLED_STEM,
};
pub use glyphs::{BlockPainter, FontPainter, FontSet, GlyphMetrics, GlyphPainter};
pub use layout::{layout_code, CodeLayout, HighlightSpan, HighlightedSource, LayoutInput, LayoutOptions};
pub use raster::rasterize;
