use std::fmt;

/// Display list produced by the code layout stage and consumed by the rasterizer.
#[derive(Debug, Clone, Default)]
pub struct CodeDisplayList {
    pub commands: Vec<DisplayCommand>,
}

impl CodeDisplayList {
    /// Append a command to the display list.
    pub fn push(&mut self, command: DisplayCommand) {
        self.commands.push(command);
    }

    /// Returns true if the display list is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Iterates the glyph runs only, in paint order.
    pub fn glyph_runs(&self) -> impl Iterator<Item = &GlyphRun> {
        self.commands.iter().filter_map(|command| match command {
            DisplayCommand::GlyphRun(run) => Some(run),
            DisplayCommand::BackgroundRect(_) => None,
        })
    }
}

/// Low-level drawing commands emitted by the layout stage.
#[derive(Debug, Clone)]
pub enum DisplayCommand {
    GlyphRun(GlyphRun),
    BackgroundRect(Rectangle),
}

/// A run of text painted in a single colour.
#[derive(Debug, Clone)]
pub struct GlyphRun {
    pub text: String,
    pub font_size_px: f32,
    /// Top-left corner of the run's line box.
    pub position: Point,
    pub color: Color,
    pub background: Option<Color>,
    /// Painted with a one-pixel overstrike.
    pub bold: bool,
}

/// Represents a rectangular region (e.g. the gutter or a span background).
#[derive(Debug, Clone, Copy)]
pub struct Rectangle {
    pub origin: Point,
    pub size: Size,
    pub color: Color,
}

/// 2D size representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// 2D coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// RGBA color stored in normalized floating-point form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    /// Converts to 8-bit channels, clamping out-of-range components.
    pub fn to_rgba8(self) -> [u8; 4] {
        [
            clamp_to_u8(self.r),
            clamp_to_u8(self.g),
            clamp_to_u8(self.b),
            clamp_to_u8(self.a),
        ]
    }
}

impl From<cellshot_highlight::Color> for Color {
    fn from(color: cellshot_highlight::Color) -> Self {
        Self::new(
            color.r as f32 / 255.0,
            color.g as f32 / 255.0,
            color.b as f32 / 255.0,
            color.a as f32 / 255.0,
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({:.3}, {:.3}, {:.3}, {:.3})",
            self.r, self.g, self.b, self.a
        )
    }
}

fn clamp_to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_highlight_colors_losslessly() {
        let source = cellshot_highlight::Color::rgb(0xDF, 0xE0, 0xE1);
        let color = Color::from(source);
        assert_eq!(color.to_rgba8(), [0xDF, 0xE0, 0xE1, 0xFF]);
    }

    #[test]
    fn clamps_out_of_range_components() {
        let color = Color::new(1.5, -0.2, 0.5, 1.0);
        assert_eq!(color.to_rgba8(), [255, 0, 128, 255]);
    }
}
