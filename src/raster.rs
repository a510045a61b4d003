// ============================================================================
// SOFTWARE RASTERIZER
// ============================================================================
// Reference canvas backend consuming the primitive list. The layout stages
// never depend on anything in this module.

use rusttype::{point, Font, PositionedGlyph, Scale};

use crate::config::Color;
use crate::scene::{rotate_deg, DrawPrimitive, FontSlot, Scene, Stroke, Viewport};

/// RGBA framebuffer target, row-major, 4 bytes per pixel.
pub struct Canvas<'a> {
    pub frame: &'a mut [u8],
    pub width: usize,
    pub height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Color) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }
}

/// Fonts for the two configurable text slots. Text primitives whose slot
/// has no loaded font are skipped.
#[derive(Default)]
pub struct FontBook {
    pub primary: Option<Font<'static>>,
    pub tape: Option<Font<'static>>,
}

impl FontBook {
    pub fn slot(&self, slot: FontSlot) -> Option<&Font<'static>> {
        match slot {
            FontSlot::Primary => self.primary.as_ref(),
            FontSlot::Tape => self.tape.as_ref(),
        }
    }
}

impl Scene {
    /// Rasterize every primitive through the viewport mapping.
    pub fn rasterize(&self, canvas: &mut Canvas<'_>, fonts: &FontBook) {
        if self.viewport.is_degenerate() || canvas.width == 0 || canvas.height == 0 {
            return;
        }
        for primitive in &self.primitives {
            draw_primitive(canvas, &self.viewport, fonts, primitive);
        }
    }
}

fn draw_primitive(canvas: &mut Canvas, vp: &Viewport, fonts: &FontBook, primitive: &DrawPrimitive) {
    let s = vp.scale();
    match primitive {
        DrawPrimitive::Clear(color) => canvas.clear(*color),
        DrawPrimitive::Line {
            x0,
            y0,
            x1,
            y1,
            stroke,
        } => {
            stroke_segment(canvas, vp.map(*x0, *y0), vp.map(*x1, *y1), stroke, s);
        }
        DrawPrimitive::Path {
            points,
            closed,
            fill,
            stroke,
        } => {
            let phys: Vec<(f32, f32)> = points.iter().map(|&(x, y)| vp.map(x, y)).collect();
            if let Some(color) = fill {
                fill_convex(canvas, &phys, *color);
            }
            for pair in phys.windows(2) {
                stroke_segment(canvas, pair[0], pair[1], stroke, s);
            }
            if *closed && phys.len() > 2 {
                stroke_segment(canvas, phys[phys.len() - 1], phys[0], stroke, s);
            }
        }
        DrawPrimitive::Arc {
            cx,
            cy,
            radius,
            start_deg,
            sweep_deg,
            stroke,
        } => {
            stroke_arc(
                canvas,
                vp.map(*cx, *cy),
                radius * s,
                *start_deg,
                *sweep_deg,
                stroke,
                s,
            );
        }
        DrawPrimitive::Rect {
            x,
            y,
            w,
            h,
            fill,
            stroke,
        } => {
            let (px, py) = vp.map(*x, *y);
            let (pw, ph) = (w * s, h * s);
            if let Some(color) = fill {
                fill_rect(canvas, px, py, pw, ph, *color);
            }
            let corners = [(px, py), (px + pw, py), (px + pw, py + ph), (px, py + ph)];
            for i in 0..4 {
                stroke_segment(canvas, corners[i], corners[(i + 1) % 4], stroke, s);
            }
        }
        DrawPrimitive::Text {
            x,
            y,
            angle_deg,
            text,
            font,
            size,
            color,
        } => {
            if let Some(font) = fonts.slot(*font) {
                draw_text(canvas, font, vp.map(*x, *y), *angle_deg, text, size * s, *color);
            }
        }
    }
}

fn stroke_segment(canvas: &mut Canvas, a: (f32, f32), b: (f32, f32), stroke: &Stroke, s: f32) {
    let width = (stroke.width * s).max(1.0);
    match stroke.dash {
        None => stroke_line(canvas, a, b, width, stroke.color),
        Some((on, off)) => stroke_dashed(canvas, a, b, width, (on * s, off * s), stroke.color),
    }
}

/// Anti-aliased thick line: per-pixel distance to the segment, coverage
/// falling off over one pixel past the half-width.
fn stroke_line(canvas: &mut Canvas, (x0, y0): (f32, f32), (x1, y1): (f32, f32), width: f32, color: Color) {
    let pad = width.ceil() as i32 + 1;
    let min_x = x0.min(x1).floor() as i32 - pad;
    let max_x = x0.max(x1).ceil() as i32 + pad;
    let min_y = y0.min(y1).floor() as i32 - pad;
    let max_y = y0.max(y1).ceil() as i32 + pad;
    let dx = x1 - x0;
    let dy = y1 - y0;
    let len_sq = dx * dx + dy * dy;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let (fx, fy) = (x as f32, y as f32);
            let t = if len_sq > 0.0 {
                (((fx - x0) * dx + (fy - y0) * dy) / len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let lx = x0 + t * dx;
            let ly = y0 + t * dy;
            let dist = ((lx - fx).powi(2) + (ly - fy).powi(2)).sqrt();
            let aa = (1.0 - (dist - width / 2.0).clamp(0.0, 1.0)).clamp(0.0, 1.0);
            if aa > 0.01 {
                set_pixel(canvas, x, y, color, aa);
            }
        }
    }
}

fn stroke_dashed(
    canvas: &mut Canvas,
    (x0, y0): (f32, f32),
    (x1, y1): (f32, f32),
    width: f32,
    (on, off): (f32, f32),
    color: Color,
) {
    let dx = x1 - x0;
    let dy = y1 - y0;
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f32::EPSILON || on <= 0.0 {
        stroke_line(canvas, (x0, y0), (x1, y1), width, color);
        return;
    }
    let (ux, uy) = (dx / len, dy / len);
    let period = on + off;
    let mut d = 0.0;
    while d < len {
        let e = (d + on).min(len);
        stroke_line(
            canvas,
            (x0 + ux * d, y0 + uy * d),
            (x0 + ux * e, y0 + uy * e),
            width,
            color,
        );
        d += period;
    }
}

fn fill_rect(canvas: &mut Canvas, px: f32, py: f32, pw: f32, ph: f32, color: Color) {
    let x0 = px.round() as i32;
    let y0 = py.round() as i32;
    let x1 = (px + pw).round() as i32;
    let y1 = (py + ph).round() as i32;
    for y in y0..y1 {
        for x in x0..x1 {
            set_pixel(canvas, x, y, color, 1.0);
        }
    }
}

/// Fill a convex polygon: a pixel center is inside when every edge cross
/// product carries the same sign.
fn fill_convex(canvas: &mut Canvas, pts: &[(f32, f32)], color: Color) {
    if pts.len() < 3 {
        return;
    }
    let min_x = pts.iter().map(|p| p.0).fold(f32::INFINITY, f32::min).floor() as i32;
    let max_x = pts.iter().map(|p| p.0).fold(f32::NEG_INFINITY, f32::max).ceil() as i32;
    let min_y = pts.iter().map(|p| p.1).fold(f32::INFINITY, f32::min).floor() as i32;
    let max_y = pts.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max).ceil() as i32;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let (cx, cy) = (x as f32 + 0.5, y as f32 + 0.5);
            let mut pos = false;
            let mut neg = false;
            for i in 0..pts.len() {
                let (ax, ay) = pts[i];
                let (bx, by) = pts[(i + 1) % pts.len()];
                let cross = (bx - ax) * (cy - ay) - (by - ay) * (cx - ax);
                if cross > 0.0 {
                    pos = true;
                } else if cross < 0.0 {
                    neg = true;
                }
            }
            if !(pos && neg) {
                set_pixel(canvas, x, y, color, 1.0);
            }
        }
    }
}

/// Stroke an arc by sampling it into short chords. Zero degrees at three
/// o'clock, positive sweep counter-clockwise on screen.
fn stroke_arc(
    canvas: &mut Canvas,
    (cx, cy): (f32, f32),
    radius: f32,
    start_deg: f32,
    sweep_deg: f32,
    stroke: &Stroke,
    s: f32,
) {
    let width = (stroke.width * s).max(1.0);
    let steps = ((radius * sweep_deg.abs().to_radians() / 2.0).ceil() as usize).max(8);
    let mut prev = arc_point(cx, cy, radius, start_deg);
    for i in 1..=steps {
        let a = start_deg + sweep_deg * i as f32 / steps as f32;
        let next = arc_point(cx, cy, radius, a);
        stroke_line(canvas, prev, next, width, stroke.color);
        prev = next;
    }
}

fn arc_point(cx: f32, cy: f32, r: f32, deg: f32) -> (f32, f32) {
    let rad = deg.to_radians();
    (cx + r * rad.cos(), cy - r * rad.sin())
}

/// Draw text with the left end of its baseline at the anchor, optionally
/// rotated about the anchor.
fn draw_text(
    canvas: &mut Canvas,
    font: &Font<'static>,
    (ax, ay): (f32, f32),
    angle_deg: f32,
    text: &str,
    px_size: f32,
    color: Color,
) {
    let scale = Scale::uniform(px_size);
    let glyphs: Vec<PositionedGlyph> = font.layout(text, scale, point(ax, ay)).collect();
    for glyph in &glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            if angle_deg == 0.0 {
                glyph.draw(|gx, gy, v| {
                    set_pixel(canvas, bb.min.x + gx as i32, bb.min.y + gy as i32, color, v);
                });
            } else {
                glyph.draw(|gx, gy, v| {
                    if v < 0.001 {
                        return;
                    }
                    let px = (bb.min.x + gx as i32) as f32 - ax;
                    let py = (bb.min.y + gy as i32) as f32 - ay;
                    let (rx, ry) = rotate_deg(px, py, angle_deg);
                    splat(canvas, ax + rx, ay + ry, color, v);
                });
            }
        }
    }
}

/// Bilinear distribution of one source pixel over its four neighbours,
/// keeping rotated glyph edges smooth.
fn splat(canvas: &mut Canvas, fx: f32, fy: f32, color: Color, alpha: f32) {
    let x0 = fx.floor();
    let y0 = fy.floor();
    let (tx, ty) = (fx - x0, fy - y0);
    let samples = [
        (x0 as i32, y0 as i32, (1.0 - tx) * (1.0 - ty)),
        (x0 as i32 + 1, y0 as i32, tx * (1.0 - ty)),
        (x0 as i32, y0 as i32 + 1, (1.0 - tx) * ty),
        (x0 as i32 + 1, y0 as i32 + 1, tx * ty),
    ];
    for (x, y, w) in samples {
        let a = alpha * w;
        if a > 0.001 {
            set_pixel(canvas, x, y, color, a);
        }
    }
}

fn set_pixel(canvas: &mut Canvas, x: i32, y: i32, color: Color, alpha: f32) {
    if x < 0 || y < 0 || x as usize >= canvas.width || y as usize >= canvas.height {
        return;
    }
    let idx = (y as usize * canvas.width + x as usize) * 4;
    let a = alpha.clamp(0.0, 1.0);
    let dst = &mut canvas.frame[idx..idx + 4];
    dst[0] = (color.r as f32 * a + dst[0] as f32 * (1.0 - a)).round() as u8;
    dst[1] = (color.g as f32 * a + dst[1] as f32 * (1.0 - a)).round() as u8;
    dst[2] = (color.b as f32 * a + dst[2] as f32 * (1.0 - a)).round() as u8;
    dst[3] = 0xff;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(w: usize, h: usize) -> Vec<u8> {
        vec![0; w * h * 4]
    }

    fn pixel(frame: &[u8], width: usize, x: usize, y: usize) -> (u8, u8, u8) {
        let idx = (y * width + x) * 4;
        (frame[idx], frame[idx + 1], frame[idx + 2])
    }

    #[test]
    fn clear_floods_the_frame() {
        let mut frame = buffer(8, 8);
        let mut canvas = Canvas::new(&mut frame, 8, 8);
        canvas.clear(Color::new(10, 20, 30));
        assert_eq!(pixel(&frame, 8, 0, 0), (10, 20, 30));
        assert_eq!(pixel(&frame, 8, 7, 7), (10, 20, 30));
    }

    #[test]
    fn line_covers_its_midpoint_fully() {
        let mut frame = buffer(32, 32);
        let mut canvas = Canvas::new(&mut frame, 32, 32);
        stroke_line(
            &mut canvas,
            (4.0, 16.0),
            (28.0, 16.0),
            2.0,
            Color::new(0xff, 0xff, 0xff),
        );
        assert_eq!(pixel(&frame, 32, 16, 16), (0xff, 0xff, 0xff));
        assert_eq!(pixel(&frame, 32, 16, 2), (0, 0, 0));
    }

    #[test]
    fn convex_fill_covers_the_centroid() {
        let mut frame = buffer(32, 32);
        let mut canvas = Canvas::new(&mut frame, 32, 32);
        fill_convex(
            &mut canvas,
            &[(4.0, 4.0), (28.0, 4.0), (16.0, 28.0)],
            Color::new(0, 0xff, 0),
        );
        assert_eq!(pixel(&frame, 32, 16, 10), (0, 0xff, 0));
        assert_eq!(pixel(&frame, 32, 1, 30), (0, 0, 0));
    }

    #[test]
    fn degenerate_scene_leaves_the_frame_untouched() {
        let mut frame = buffer(8, 8);
        let scene = Scene {
            viewport: Viewport::new(0, 64),
            primitives: vec![DrawPrimitive::Clear(Color::new(0xff, 0, 0))],
        };
        let mut canvas = Canvas::new(&mut frame, 8, 8);
        scene.rasterize(&mut canvas, &FontBook::default());
        assert!(frame.iter().all(|&b| b == 0));
    }

    #[test]
    fn text_without_a_font_is_skipped() {
        let mut frame = buffer(16, 16);
        let scene = Scene {
            viewport: Viewport::new(16, 16),
            primitives: vec![DrawPrimitive::Text {
                x: 0.0,
                y: 0.0,
                angle_deg: 0.0,
                text: "123".to_string(),
                font: FontSlot::Tape,
                size: 3.0,
                color: Color::new(0xff, 0xff, 0xff),
            }],
        };
        let mut canvas = Canvas::new(&mut frame, 16, 16);
        scene.rasterize(&mut canvas, &FontBook::default());
        assert!(frame.iter().all(|&b| b == 0));
    }

    #[test]
    fn pixel_writes_outside_the_frame_are_dropped() {
        let mut frame = buffer(4, 4);
        let mut canvas = Canvas::new(&mut frame, 4, 4);
        set_pixel(&mut canvas, -1, 2, Color::new(0xff, 0, 0), 1.0);
        set_pixel(&mut canvas, 2, 9, Color::new(0xff, 0, 0), 1.0);
        assert!(frame.iter().all(|&b| b == 0));
    }
}
