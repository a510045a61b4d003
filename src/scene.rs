use crate::config::Color;

/// Logical space spans [-LOGICAL_HALF, LOGICAL_HALF] on both axes.
pub const LOGICAL_HALF: f32 = 100.0;

/// Which configured font family a text primitive uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSlot {
    /// Labels, annunciators, gauges.
    Primary,
    /// Tape numbers and readouts (monospace).
    Tape,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    /// Width in logical units.
    pub width: f32,
    /// Dash and gap lengths in logical units; None draws solid.
    pub dash: Option<(f32, f32)>,
}

impl Stroke {
    pub fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub fn dashed(color: Color, width: f32, on: f32, off: f32) -> Self {
        Self {
            color,
            width,
            dash: Some((on, off)),
        }
    }
}

/// One output unit of the layout stages, authored in logical space.
/// Primitives are produced fresh every frame and consumed once.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawPrimitive {
    /// Fill the whole physical canvas, including the area outside the
    /// inscribed logical square.
    Clear(Color),
    Line {
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        stroke: Stroke,
    },
    Path {
        points: Vec<(f32, f32)>,
        closed: bool,
        fill: Option<Color>,
        stroke: Stroke,
    },
    /// Zero degrees at three o'clock, positive sweep counter-clockwise.
    Arc {
        cx: f32,
        cy: f32,
        radius: f32,
        start_deg: f32,
        sweep_deg: f32,
        stroke: Stroke,
    },
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        fill: Option<Color>,
        stroke: Stroke,
    },
    /// Anchored at the left end of the baseline, rotated by `angle_deg`
    /// around the anchor.
    Text {
        x: f32,
        y: f32,
        angle_deg: f32,
        text: String,
        font: FontSlot,
        size: f32,
        color: Color,
    },
}

/// Rotate a point about the logical origin. Positive angles turn
/// clockwise on screen because y grows downward.
pub fn rotate_deg(x: f32, y: f32, deg: f32) -> (f32, f32) {
    let (s, c) = deg.to_radians().sin_cos();
    (x * c - y * s, x * s + y * c)
}

/// Largest inscribed square of the physical canvas, centered, carrying
/// logical coordinates [-100, 100] on both axes with y down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub side: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            side: width.min(height),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.side == 0
    }

    /// Physical pixels per logical unit.
    pub fn scale(&self) -> f32 {
        self.side as f32 / (2.0 * LOGICAL_HALF)
    }

    /// Map a logical point to physical canvas coordinates.
    pub fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.width as f32 / 2.0 + x * self.scale(),
            self.height as f32 / 2.0 + y * self.scale(),
        )
    }
}

/// A finished frame: the viewport plus primitives in layering order.
#[derive(Debug, Clone)]
pub struct Scene {
    pub viewport: Viewport,
    pub primitives: Vec<DrawPrimitive>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inscribed_square_is_min_side_and_centered() {
        for (w, h) in [(1000, 1000), (1024, 768), (300, 700), (1, 999)] {
            let vp = Viewport::new(w, h);
            assert_eq!(vp.side, w.min(h));
            assert!((vp.scale() * 2.0 * LOGICAL_HALF - vp.side as f32).abs() < 1e-3);

            let margin_x = (w as f32 - vp.side as f32) / 2.0;
            let margin_y = (h as f32 - vp.side as f32) / 2.0;
            let (left, top) = vp.map(-LOGICAL_HALF, -LOGICAL_HALF);
            let (right, bottom) = vp.map(LOGICAL_HALF, LOGICAL_HALF);
            assert!((left - margin_x).abs() < 1e-3);
            assert!((w as f32 - right - margin_x).abs() < 1e-3);
            assert!((top - margin_y).abs() < 1e-3);
            assert!((h as f32 - bottom - margin_y).abs() < 1e-3);
        }
    }

    #[test]
    fn origin_maps_to_canvas_center() {
        let vp = Viewport::new(640, 480);
        assert_eq!(vp.map(0.0, 0.0), (320.0, 240.0));
    }

    #[test]
    fn zero_sized_canvas_is_degenerate() {
        assert!(Viewport::new(0, 500).is_degenerate());
        assert!(Viewport::new(500, 0).is_degenerate());
        assert!(!Viewport::new(1, 1).is_degenerate());
    }

    #[test]
    fn rotation_is_clockwise_on_screen() {
        let (x, y) = rotate_deg(0.0, 10.0, 90.0);
        assert!((x - -10.0).abs() < 1e-4);
        assert!(y.abs() < 1e-4);
    }
}
