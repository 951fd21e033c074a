use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, ScaleFont};
use image::{Pixel, Rgba, RgbaImage};
use log::{debug, warn};

use crate::display::Point;
use crate::export::ExportError;

/// Per-size measurements the layout stage needs from a painter.
/// 版面配置所需的字型度量。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphMetrics {
    /// Horizontal advance of one monospace cell.
    pub advance: f32,
    pub ascent: f32,
    /// Ascent plus descent, without extra line padding.
    pub line_height: f32,
}

/// Draws text onto an RGBA canvas.
/// 將文字繪製到 RGBA 畫布上的介面。
pub trait GlyphPainter {
    fn metrics(&self, size_px: f32) -> GlyphMetrics;

    /// Width of `text` when drawn at `size_px`.
    fn measure(&self, text: &str, size_px: f32) -> f32;

    /// Paints `text` with the top of its line box at `origin`.
    fn draw(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        origin: Point,
        size_px: f32,
        color: Rgba<u8>,
    );
}

/// Outline-font painter backed by `ab_glyph`.
/// 以 `ab_glyph` 載入字型並繪製字形。
pub struct FontPainter {
    font: FontVec,
    source: PathBuf,
}

impl FontPainter {
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let data = fs::read(path)
            .map_err(|err| ExportError::FontLoad(format!("{}: {err}", path.display())))?;
        let font = FontVec::try_from_vec(data)
            .map_err(|err| ExportError::FontLoad(format!("{}: {err}", path.display())))?;
        debug!("loaded font {}", path.display());
        Ok(Self {
            font,
            source: path.to_path_buf(),
        })
    }
}

impl fmt::Debug for FontPainter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontPainter")
            .field("source", &self.source)
            .finish()
    }
}

impl GlyphPainter for FontPainter {
    fn metrics(&self, size_px: f32) -> GlyphMetrics {
        let scaled = self.font.as_scaled(PxScale::from(size_px));
        GlyphMetrics {
            advance: scaled.h_advance(scaled.glyph_id('M')),
            ascent: scaled.ascent(),
            line_height: scaled.ascent() - scaled.descent(),
        }
    }

    fn measure(&self, text: &str, size_px: f32) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(size_px));
        let mut width = 0.0;
        let mut last: Option<GlyphId> = None;
        for ch in text.chars().filter(|ch| !ch.is_control()) {
            let id = scaled.glyph_id(ch);
            if let Some(previous) = last {
                width += scaled.kern(previous, id);
            }
            width += scaled.h_advance(id);
            last = Some(id);
        }
        width
    }

    fn draw(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        origin: Point,
        size_px: f32,
        color: Rgba<u8>,
    ) {
        let scale = PxScale::from(size_px);
        let scaled = self.font.as_scaled(scale);
        let baseline = origin.y + scaled.ascent();
        let mut caret = origin.x;
        let mut last: Option<GlyphId> = None;

        for ch in text.chars().filter(|ch| !ch.is_control()) {
            let id = scaled.glyph_id(ch);
            if let Some(previous) = last {
                caret += scaled.kern(previous, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, baseline));
            caret += scaled.h_advance(id);
            last = Some(id);

            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let x = bounds.min.x as i32 + gx as i32;
                    let y = bounds.min.y as i32 + gy as i32;
                    blend_pixel(canvas, x, y, color, coverage);
                });
            }
        }
    }
}

/// Draft painter that draws each visible character as a solid box.
/// Needs no font file, so exports stay deterministic on any machine.
/// （草稿模式：以方塊代替字形，不需要字型檔。）
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockPainter;

impl BlockPainter {
    fn advance(size_px: f32) -> f32 {
        (size_px * 0.6).round().max(1.0)
    }
}

impl GlyphPainter for BlockPainter {
    fn metrics(&self, size_px: f32) -> GlyphMetrics {
        GlyphMetrics {
            advance: Self::advance(size_px),
            ascent: size_px * 0.8,
            line_height: (size_px * 1.2).ceil(),
        }
    }

    fn measure(&self, text: &str, size_px: f32) -> f32 {
        text.chars().filter(|ch| !ch.is_control()).count() as f32 * Self::advance(size_px)
    }

    fn draw(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        origin: Point,
        size_px: f32,
        color: Rgba<u8>,
    ) {
        let advance = Self::advance(size_px);
        let top = (origin.y + size_px * 0.25).round() as i32;
        let bottom = (origin.y + size_px * 0.95).round() as i32;
        let visible = text.chars().filter(|ch| !ch.is_control());
        for (index, ch) in visible.enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let left = (origin.x + index as f32 * advance + 1.0).round() as i32;
            let right = (origin.x + (index + 1) as f32 * advance - 1.0).round() as i32;
            for y in top..bottom {
                for x in left..right {
                    blend_pixel(canvas, x, y, color, 1.0);
                }
            }
        }
    }
}

/// The painters used for code text and for the title bar.
/// 程式碼與標題列分別使用的繪字器。
pub struct FontSet {
    pub code: Box<dyn GlyphPainter>,
    pub title: Box<dyn GlyphPainter>,
}

impl FontSet {
    pub fn new(code: Box<dyn GlyphPainter>, title: Box<dyn GlyphPainter>) -> Self {
        Self { code, title }
    }

    /// Block glyphs for both roles.
    pub fn draft() -> Self {
        Self::new(Box::new(BlockPainter), Box::new(BlockPainter))
    }

    /// Loads the code font from `explicit` or the first installed monospace candidate.
    /// The title font falls back to the code font when no sans-serif face is found.
    /// （依序尋找等寬字型；找不到標題字型時沿用程式碼字型。）
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ExportError> {
        let code_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => first_existing(code_font_candidates()).ok_or_else(|| {
                ExportError::FontLoad(
                    "no monospace font found; set export.font_path or use draft glyphs".into(),
                )
            })?,
        };
        let code = FontPainter::from_path(&code_path)?;

        let title: Box<dyn GlyphPainter> = match first_existing(title_font_candidates())
            .map(|path| FontPainter::from_path(&path))
        {
            Some(Ok(painter)) => Box::new(painter),
            Some(Err(err)) => {
                warn!("title font unavailable, using code font: {err}");
                Box::new(FontPainter::from_path(&code_path)?)
            }
            None => Box::new(FontPainter::from_path(&code_path)?),
        };

        Ok(Self::new(Box::new(code), title))
    }
}

impl fmt::Debug for FontSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontSet").finish_non_exhaustive()
    }
}

fn first_existing(candidates: Vec<PathBuf>) -> Option<PathBuf> {
    candidates.into_iter().find(|path| path.is_file())
}

fn code_font_candidates() -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();

    #[cfg(target_os = "windows")]
    {
        candidates.push(PathBuf::from(r"C:\Windows\Fonts\consola.ttf"));
        candidates.push(PathBuf::from(r"C:\Windows\Fonts\cour.ttf"));
    }

    #[cfg(target_os = "macos")]
    {
        candidates.push(PathBuf::from("/Library/Fonts/Consolas.ttf"));
        candidates.push(PathBuf::from("/System/Library/Fonts/Monaco.ttf"));
        candidates.push(PathBuf::from("/System/Library/Fonts/Supplemental/Courier New.ttf"));
    }

    #[cfg(target_os = "linux")]
    {
        candidates.push(PathBuf::from(
            "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
        ));
        candidates.push(PathBuf::from("/usr/share/fonts/dejavu/DejaVuSansMono.ttf"));
        candidates.push(PathBuf::from("/usr/share/fonts/TTF/DejaVuSansMono.ttf"));
        candidates.push(PathBuf::from(
            "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
        ));
        candidates.push(PathBuf::from(
            "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
        ));
        candidates.push(PathBuf::from(
            "/usr/share/fonts/truetype/ubuntu/UbuntuMono-R.ttf",
        ));
    }

    candidates
}

fn title_font_candidates() -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();

    #[cfg(target_os = "windows")]
    {
        candidates.push(PathBuf::from(r"C:\Windows\Fonts\arial.ttf"));
    }

    #[cfg(target_os = "macos")]
    {
        candidates.push(PathBuf::from("/Library/Fonts/Arial.ttf"));
        candidates.push(PathBuf::from("/System/Library/Fonts/Supplemental/Arial.ttf"));
    }

    #[cfg(target_os = "linux")]
    {
        candidates.push(PathBuf::from(
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        ));
        candidates.push(PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"));
        candidates.push(PathBuf::from("/usr/share/fonts/dejavu/DejaVuSans.ttf"));
        candidates.push(PathBuf::from("/usr/share/fonts/TTF/DejaVuSans.ttf"));
    }

    candidates
}

/// Alpha-composites `color`, scaled by `coverage`, onto one pixel. Out-of-bounds writes are ignored.
pub(crate) fn blend_pixel(canvas: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i32 || y >= canvas.height() as i32 {
        return;
    }
    let alpha = (color[3] as f32 * coverage.clamp(0.0, 1.0)).round() as u8;
    let source = Rgba([color[0], color[1], color[2], alpha]);
    match alpha {
        0 => {}
        255 => canvas.put_pixel(x as u32, y as u32, source),
        _ => canvas.get_pixel_mut(x as u32, y as u32).blend(&source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_painter_skips_whitespace() {
        let mut canvas = RgbaImage::from_pixel(40, 20, Rgba([255, 255, 255, 255]));
        let ink = Rgba([0, 0, 0, 255]);
        BlockPainter.draw(&mut canvas, "a b", Point { x: 0.0, y: 0.0 }, 10.0, ink);
        // advance is 6px: "a" covers 1..5, the space cell 7..11 stays clear, "b" covers 13..17
        assert_eq!(*canvas.get_pixel(3, 6), ink);
        assert_eq!(*canvas.get_pixel(9, 6), Rgba([255, 255, 255, 255]));
        assert_eq!(*canvas.get_pixel(15, 6), ink);
    }

    #[test]
    fn block_painter_measures_by_character() {
        assert_eq!(BlockPainter.measure("héllo", 10.0), 30.0);
        assert_eq!(BlockPainter.metrics(14.0).advance, 8.0);
    }

    #[test]
    fn drawing_outside_the_canvas_is_ignored() {
        let mut canvas = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0]));
        BlockPainter.draw(
            &mut canvas,
            "xyz",
            Point { x: -50.0, y: -50.0 },
            14.0,
            Rgba([255, 0, 0, 255]),
        );
        assert!(canvas.pixels().all(|px| px[3] == 0));
    }

    #[test]
    fn missing_font_file_reports_font_load() {
        let err = FontPainter::from_path(Path::new("/nonexistent/cellshot.ttf")).unwrap_err();
        assert!(matches!(err, ExportError::FontLoad(_)));
    }

    #[test]
    fn invalid_font_data_reports_font_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        fs::write(&path, b"not a font").unwrap();
        let err = FontSet::discover(Some(&path)).unwrap_err();
        assert!(matches!(err, ExportError::FontLoad(_)));
    }
}
