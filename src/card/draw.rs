use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::{
    drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_text_mut, text_size},
    rect::Rect,
};
use qrcode::{Color as Module, QrCode, types::QrError};

use super::palette::{BLACK, Palette};

/// Fills the whole image with the palette gradient, running from the top-left
/// corner to the bottom-right.
pub fn fill_gradient(img: &mut RgbaImage, palette: &Palette) {
    let (w, h) = (img.width() as f32, img.height() as f32);
    let norm = w * w + h * h;
    for (x, y, px) in img.enumerate_pixels_mut() {
        let t = (x as f32 * w + y as f32 * h) / norm;
        *px = palette.sample(t);
    }
}

/// Alpha-blends `color` over the pixel at `(x, y)`; out-of-bounds is a no-op.
pub fn blend(img: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>, alpha: f32) {
    if x < 0 || y < 0 || x >= i64::from(img.width()) || y >= i64::from(img.height()) {
        return;
    }
    let px = img.get_pixel_mut(x as u32, y as u32);
    let a = alpha.clamp(0.0, 1.0);
    for c in 0..3 {
        let under = f32::from(px[c]);
        px[c] = (under + (f32::from(color[c]) - under) * a).round() as u8;
    }
}

/// Evenly spaced full-width hairlines.
pub fn circuit_lines(img: &mut RgbaImage, count: u32, color: Rgba<u8>, alpha: f32) {
    let step = img.height() as f32 / count as f32;
    for i in 0..count {
        let y = (step * i as f32) as i64;
        for x in 0..i64::from(img.width()) {
            blend(img, x, y, color, alpha);
        }
    }
}

/// Stroked rectangle centered on the edge `(x, y, w, h)`.
pub fn stroke_rect(img: &mut RgbaImage, x: i32, y: i32, w: u32, h: u32, width: u32, color: Rgba<u8>) {
    let half = (width / 2) as i32;
    for o in -half..(width as i32 - half) {
        let (rw, rh) = (w as i32 - 2 * o, h as i32 - 2 * o);
        if rw <= 0 || rh <= 0 {
            continue;
        }
        draw_hollow_rect_mut(
            img,
            Rect::at(x + o, y + o).of_size(rw as u32, rh as u32),
            color,
        );
    }
}

/// Soft falloff on both sides of a stroked rectangle.
pub fn glow_rect(img: &mut RgbaImage, x: i64, y: i64, w: i64, h: i64, stroke: i64, blur: i64, color: Rgba<u8>) {
    let half = stroke / 2;
    for x_px in (x - half - blur)..=(x + w + half + blur) {
        for y_px in (y - half - blur)..=(y + h + half + blur) {
            let dx = (x_px - x).abs().min((x_px - (x + w)).abs());
            let dy = (y_px - y).abs().min((y_px - (y + h)).abs());
            let inside_x = x_px >= x && x_px <= x + w;
            let inside_y = y_px >= y && y_px <= y + h;
            let edge_dist = match (inside_x, inside_y) {
                (true, true) => dx.min(dy),
                (true, false) => dy,
                (false, true) => dx,
                (false, false) => dx.max(dy),
            } - half;
            if edge_dist > 0 && edge_dist <= blur {
                blend(img, x_px, y_px, color, falloff(edge_dist as f32, blur as f32));
            }
        }
    }
}

/// Solid disc with a radial glow ring outside it.
pub fn glowing_disc(img: &mut RgbaImage, cx: i32, cy: i32, radius: i32, blur: i32, color: Rgba<u8>) {
    let outer = radius + blur;
    for y in (cy - outer)..=(cy + outer) {
        for x in (cx - outer)..=(cx + outer) {
            let d = (((x - cx).pow(2) + (y - cy).pow(2)) as f32).sqrt() - radius as f32;
            if d > 0.0 && d <= blur as f32 {
                blend(img, i64::from(x), i64::from(y), color, falloff(d, blur as f32));
            }
        }
    }
    draw_filled_circle_mut(img, (cx, cy), radius, color);
}

fn falloff(d: f32, blur: f32) -> f32 {
    let f = 1.0 - d / blur;
    0.6 * f * f
}

/// Draws `text` with its baseline at `baseline`.
pub fn text(img: &mut RgbaImage, font: &FontArc, size: f32, x: i32, baseline: i32, color: Rgba<u8>, s: &str) {
    let scale = PxScale::from(size);
    let ascent = font.as_scaled(scale).ascent().round() as i32;
    draw_text_mut(img, color, x, baseline - ascent, scale, font, s);
}

/// Like [`text`] but horizontally centered on `cx`.
pub fn text_centered(img: &mut RgbaImage, font: &FontArc, size: f32, cx: i32, baseline: i32, color: Rgba<u8>, s: &str) {
    let (w, _) = text_size(PxScale::from(size), font, s);
    text(img, font, size, cx - (w / 2) as i32, baseline, color, s);
}

/// Renders `data` as a square QR image with a one-module margin.
pub fn qr_image(data: &str, side: u32, dark: Rgba<u8>) -> Result<RgbaImage, QrError> {
    let code = QrCode::new(data.as_bytes())?;
    let modules = code.width();
    let total = modules + 2;
    let mut img = RgbaImage::from_pixel(side, side, BLACK);
    for (x, y, px) in img.enumerate_pixels_mut() {
        let mx = (x as usize * total) / side as usize;
        let my = (y as usize * total) / side as usize;
        if (1..=modules).contains(&mx)
            && (1..=modules).contains(&my)
            && code[(mx - 1, my - 1)] == Module::Dark
        {
            *px = dark;
        }
    }
    Ok(img)
}

/// Copies `src` onto `dst` with its top-left at `(x, y)`, clipping at the
/// edges.
pub fn paste(dst: &mut RgbaImage, src: &RgbaImage, x: u32, y: u32) {
    for (sx, sy, px) in src.enumerate_pixels() {
        let (dx, dy) = (x + sx, y + sy);
        if dx < dst.width() && dy < dst.height() {
            dst.put_pixel(dx, dy, *px);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::palette::CYAN;

    #[test]
    fn qr_has_both_colors_and_black_margin() {
        let img = qr_image("https://whitehatdesert.com", 150, CYAN).expect("qr");
        assert_eq!(img.dimensions(), (150, 150));
        assert_eq!(*img.get_pixel(0, 0), BLACK);
        assert!(img.pixels().any(|p| *p == CYAN));
    }

    #[test]
    fn blend_is_bounds_checked() {
        let mut img = RgbaImage::from_pixel(2, 2, BLACK);
        blend(&mut img, -1, 5, CYAN, 1.0);
        blend(&mut img, 1, 1, CYAN, 1.0);
        assert_eq!(*img.get_pixel(1, 1), CYAN);
        assert_eq!(*img.get_pixel(0, 0), BLACK);
    }
}
