//! Raster primitives over an RGBA image. Everything drawn off-canvas is clipped.

use image::RgbaImage;

use crate::glyphs;
use crate::palette::Color;

/// A point in canvas coordinates.
pub type Point = (f64, f64);

#[allow(clippy::cast_possible_truncation)]
fn px(value: f64) -> i64 {
    value.round() as i64
}

#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    #[must_use]
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, background),
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Set one pixel.
    pub fn put(&mut self, x: i64, y: i64, color: Color) {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return;
        };
        if let Some(pixel) = self.image.get_pixel_mut_checked(x, y) {
            *pixel = color;
        }
    }

    pub fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Color) {
        for dy in 0..i64::from(height) {
            for dx in 0..i64::from(width) {
                self.put(x + dx, y + dy, color);
            }
        }
    }

    pub fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        self.ring(center, radius, radius, color);
    }

    /// Pixels whose centre lies between `radius - thickness` and `radius` from `center`.
    pub fn ring(&mut self, center: Point, radius: f64, thickness: f64, color: Color) {
        let inner = (radius - thickness).max(0.0);
        let reach = px(radius.ceil());
        let (cx, cy) = (px(center.0), px(center.1));
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                #[allow(clippy::cast_precision_loss)]
                let x = (cx + dx) as f64 - center.0;
                #[allow(clippy::cast_precision_loss)]
                let y = (cy + dy) as f64 - center.1;
                let distance = x.hypot(y);
                if distance <= radius && (inner <= 0.0 || distance >= inner) {
                    self.put(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Straight line with round caps.
    pub fn line(&mut self, from: Point, to: Point, thickness: f64, color: Color) {
        let length = (to.0 - from.0).hypot(to.1 - from.1);
        let steps = px(length.ceil()).max(1);
        let half = thickness / 2.0;
        for step in 0..=steps {
            #[allow(clippy::cast_precision_loss)]
            let t = step as f64 / steps as f64;
            let point = (
                (to.0 - from.0).mul_add(t, from.0),
                (to.1 - from.1).mul_add(t, from.1),
            );
            if half <= 0.5 {
                self.put(px(point.0), px(point.1), color);
            } else {
                self.fill_circle(point, half, color);
            }
        }
    }

    pub fn fill_triangle(&mut self, a: Point, b: Point, c: Point, color: Color) {
        let edge = |p: Point, q: Point, r: Point| (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0);
        let area = edge(a, b, c);
        if area.abs() < f64::EPSILON {
            return;
        }

        let min_x = px(a.0.min(b.0).min(c.0).floor());
        let max_x = px(a.0.max(b.0).max(c.0).ceil());
        let min_y = px(a.1.min(b.1).min(c.1).floor());
        let max_y = px(a.1.max(b.1).max(c.1).ceil());

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                #[allow(clippy::cast_precision_loss)]
                let p = (x as f64, y as f64);
                let w0 = edge(b, c, p) * area.signum();
                let w1 = edge(c, a, p) * area.signum();
                let w2 = edge(a, b, p) * area.signum();
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    self.put(x, y, color);
                }
            }
        }
    }

    /// Line from `from` to `to` with a filled head whose tip touches `to`.
    pub fn arrow(&mut self, from: Point, to: Point, thickness: f64, head: f64, color: Color) {
        let length = (to.0 - from.0).hypot(to.1 - from.1);
        if length < f64::EPSILON {
            return;
        }
        let (ux, uy) = ((to.0 - from.0) / length, (to.1 - from.1) / length);
        let head = head.min(length);
        let base = (to.0 - ux * head, to.1 - uy * head);
        let half = head / 2.0;

        self.line(from, base, thickness, color);
        self.fill_triangle(
            to,
            (base.0 - uy * half, base.1 + ux * half),
            (base.0 + uy * half, base.1 - ux * half),
            color,
        );
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    pub fn text(&mut self, x: i64, y: i64, text: &str, scale: u32, color: Color) {
        let scale = scale.max(1);
        let step = i64::from(glyphs::ADVANCE * scale);
        let mut origin = x;
        for c in text.chars() {
            for (col, row) in glyphs::pixels(c) {
                self.fill_rect(
                    origin + i64::from(col * scale),
                    y + i64::from(row * scale),
                    scale,
                    scale,
                    color,
                );
            }
            origin += step;
        }
    }

    /// Draw `text` centred on `center`.
    pub fn text_centered(&mut self, center: Point, text: &str, scale: u32, color: Color) {
        let width = i64::from(glyphs::text_width(text, scale));
        let height = i64::from(glyphs::text_height(scale));
        self.text(
            px(center.0) - width / 2,
            px(center.1) - height / 2,
            text,
            scale,
            color,
        );
    }

    /// Centred text on a padded box.
    pub fn label(&mut self, center: Point, text: &str, scale: u32, fg: Color, bg: Color) {
        let pad = scale.max(1) * 2;
        let width = glyphs::text_width(text, scale) + 2 * pad;
        let height = glyphs::text_height(scale) + 2 * pad;
        self.fill_rect(
            px(center.0) - i64::from(width / 2),
            px(center.1) - i64::from(height / 2),
            width,
            height,
            bg,
        );
        self.text_centered(center, text, scale, fg);
    }

    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}
