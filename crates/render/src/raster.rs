use image::{Rgba, RgbaImage};

use crate::display::{Color, DisplayCommand, Point};
use crate::glyphs::GlyphPainter;
use crate::layout::CodeLayout;

/// Paints a code layout's display list into a new bitmap.
/// 將程式碼版面的繪圖指令轉為點陣圖。
pub fn rasterize(layout: &CodeLayout, painter: &dyn GlyphPainter) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(layout.width_px, layout.height_px, Rgba([0, 0, 0, 0]));

    for command in &layout.display_list.commands {
        match command {
            DisplayCommand::BackgroundRect(rect) => {
                let x = rect.origin.x.round() as i32;
                let y = rect.origin.y.round() as i32;
                let w = rect.size.width.ceil() as i32;
                let h = rect.size.height.ceil() as i32;
                fill_rect(&mut image, x, y, w, h, rect.color);
            }
            DisplayCommand::GlyphRun(run) => {
                let rgba = color_to_rgba(run.color);
                painter.draw(&mut image, &run.text, run.position, run.font_size_px, rgba);
                if run.bold {
                    // overstrike one pixel to the right
                    let shifted = Point {
                        x: run.position.x + 1.0,
                        y: run.position.y,
                    };
                    painter.draw(&mut image, &run.text, shifted, run.font_size_px, rgba);
                }
            }
        }
    }

    image
}

pub(crate) fn fill_rect(
    buffer: &mut RgbaImage,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    color: Color,
) {
    if width <= 0 || height <= 0 {
        return;
    }
    let width_px = buffer.width() as i32;
    let height_px = buffer.height() as i32;
    let x0 = x.clamp(0, width_px);
    let y0 = y.clamp(0, height_px);
    let x1 = (x + width).clamp(0, width_px);
    let y1 = (y + height).clamp(0, height_px);
    let rgba = color_to_rgba(color);
    for yy in y0..y1 {
        for xx in x0..x1 {
            buffer.put_pixel(xx as u32, yy as u32, rgba);
        }
    }
}

pub(crate) fn color_to_rgba(color: Color) -> Rgba<u8> {
    Rgba(color.to_rgba8())
}
