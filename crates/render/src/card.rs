use image::{imageops, Rgba, RgbaImage};
use log::debug;

use crate::display::Point;
use crate::glyphs::{blend_pixel, FontSet};

/// Fixed styling of the exported card around the code bitmap.
/// 匯出卡片外框（標題列、漸層、圓角、陰影）的樣式。
#[derive(Debug, Clone)]
pub struct CardStyle {
    pub title_bar_height_px: u32,
    pub title_font_size_px: f32,
    pub title_offset_y_px: f32,
    pub title_color: Rgba<u8>,
    /// Gradient colour of the first row.
    pub gradient_top: [u8; 3],
    /// Per-channel increase from the first row to the last.
    pub gradient_delta: [u8; 3],
    pub corner_radius_px: u32,
    pub include_window_controls: bool,
    pub window_control_colors: [Rgba<u8>; 3],
    pub window_control_diameter_px: f32,
    pub window_control_x_px: [f32; 3],
    pub shadow_margin_px: u32,
    pub shadow_alpha: u8,
    pub shadow_blur_sigma: f32,
}

impl Default for CardStyle {
    fn default() -> Self {
        Self {
            title_bar_height_px: 25,
            title_font_size_px: 15.0,
            title_offset_y_px: 5.0,
            title_color: Rgba([255, 255, 255, 255]),
            gradient_top: [31, 36, 48],
            gradient_delta: [7, 9, 13],
            corner_radius_px: 12,
            include_window_controls: false,
            window_control_colors: [
                Rgba([0xFF, 0x5F, 0x56, 255]),
                Rgba([0xFF, 0xBD, 0x2E, 255]),
                Rgba([0x27, 0xC9, 0x3F, 255]),
            ],
            window_control_diameter_px: 12.0,
            window_control_x_px: [15.0, 35.0, 55.0],
            shadow_margin_px: 10,
            shadow_alpha: 20,
            shadow_blur_sigma: 10.0,
        }
    }
}

/// Builds the rounded card: gradient, code bitmap, optional title bar.
/// The result has no shadow; see [`drop_shadow`].
/// （組合圓角卡片：漸層背景、程式碼圖層與標題列，不含陰影。）
pub fn compose_card(
    code: &RgbaImage,
    title: Option<&str>,
    fonts: &FontSet,
    style: &CardStyle,
) -> RgbaImage {
    let bar = if title.is_some() {
        style.title_bar_height_px
    } else {
        0
    };
    let width = code.width();
    let height = code.height() + bar;
    debug!("composing {width}x{height} card (title bar {bar}px)");

    let mut card = paint_gradient(width, height, style);
    round_corners(&mut card, style.corner_radius_px);
    imageops::replace(&mut card, code, 0, bar as i64);

    if let Some(title) = title {
        let text_width = fonts.title.measure(title, style.title_font_size_px);
        let x = ((width as f32 - text_width) / 2.0).floor().max(0.0);
        fonts.title.draw(
            &mut card,
            title,
            Point {
                x,
                y: style.title_offset_y_px,
            },
            style.title_font_size_px,
            style.title_color,
        );
        if style.include_window_controls {
            draw_window_controls(&mut card, bar as f32 / 2.0, style);
        }
    }

    // the opaque code bitmap covers the bottom corners, so clip once more
    round_corners(&mut card, style.corner_radius_px);
    card
}

/// Vertical gradient where each channel grows by `trunc(y / height * delta)`.
pub fn paint_gradient(width: u32, height: u32, style: &CardStyle) -> RgbaImage {
    let mut image = RgbaImage::new(width, height);
    for y in 0..height {
        let t = y as f32 / height as f32;
        let channel = |i: usize| {
            style.gradient_top[i].saturating_add((t * style.gradient_delta[i] as f32) as u8)
        };
        let row = Rgba([channel(0), channel(1), channel(2), 255]);
        for x in 0..width {
            image.put_pixel(x, y, row);
        }
    }
    image
}

/// Clears everything outside a quarter circle of `radius` in each corner.
/// Edge pixels keep partial alpha proportional to their coverage.
/// （以四分之一圓遮罩裁切四個角落。）
pub fn round_corners(image: &mut RgbaImage, radius: u32) {
    let (width, height) = image.dimensions();
    let radius = radius.min(width / 2).min(height / 2);
    if radius == 0 {
        return;
    }
    let r = radius as f32;
    let corners = [
        (0..radius, 0..radius, r, r),
        (width - radius..width, 0..radius, width as f32 - r, r),
        (0..radius, height - radius..height, r, height as f32 - r),
        (
            width - radius..width,
            height - radius..height,
            width as f32 - r,
            height as f32 - r,
        ),
    ];

    for (xs, ys, cx, cy) in corners {
        for y in ys.clone() {
            for x in xs.clone() {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let coverage = (r - (dx * dx + dy * dy).sqrt() + 0.5).clamp(0.0, 1.0);
                if coverage < 1.0 {
                    let pixel = image.get_pixel_mut(x, y);
                    pixel[3] = (pixel[3] as f32 * coverage).round() as u8;
                }
            }
        }
    }
}

fn draw_window_controls(card: &mut RgbaImage, center_y: f32, style: &CardStyle) {
    let radius = style.window_control_diameter_px / 2.0;
    for (x, color) in style
        .window_control_x_px
        .iter()
        .zip(style.window_control_colors.iter())
    {
        fill_circle(card, x + radius, center_y, radius, *color);
    }
}

fn fill_circle(image: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
    let x0 = (cx - radius).floor() as i32;
    let x1 = (cx + radius).ceil() as i32;
    let y0 = (cy - radius).floor() as i32;
    let y1 = (cy + radius).ceil() as i32;
    for y in y0..y1 {
        for x in x0..x1 {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let coverage = (radius - (dx * dx + dy * dy).sqrt() + 0.5).clamp(0.0, 1.0);
            blend_pixel(image, x, y, color, coverage);
        }
    }
}

/// Places `card` over a blurred translucent rectangle, adding
/// `shadow_margin_px` on every side.
/// （在卡片後方加上模糊陰影，四周各留出邊距。）
pub fn drop_shadow(card: &RgbaImage, style: &CardStyle) -> RgbaImage {
    let margin = style.shadow_margin_px;
    let (width, height) = card.dimensions();
    let mut canvas = RgbaImage::new(width + margin * 2, height + margin * 2);
    let shade = Rgba([0, 0, 0, style.shadow_alpha]);
    for y in margin..margin + height {
        for x in margin..margin + width {
            canvas.put_pixel(x, y, shade);
        }
    }
    if style.shadow_blur_sigma > 0.0 {
        canvas = imageops::blur(&canvas, style.shadow_blur_sigma);
    }
    composite_over(&mut canvas, card, margin, margin);
    canvas
}

fn composite_over(bottom: &mut RgbaImage, top: &RgbaImage, left: u32, top_y: u32) {
    for (x, y, pixel) in top.enumerate_pixels() {
        blend_pixel(bottom, (left + x) as i32, (top_y + y) as i32, *pixel, 1.0);
    }
}
