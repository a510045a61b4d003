//! Primary flight display for a small UAV.
//!
//! One [`FlightState`] snapshot per frame goes in; an ordered list of
//! [`DrawPrimitive`]s comes out, authored in a fixed logical coordinate
//! space (a ±100 unit square centered on the aircraft reference symbol).
//! Rasterization is left to a canvas backend; a software reference
//! backend lives in [`raster`].

// ============================================================================
// MODULES & IMPORTS
// ============================================================================

pub mod config;
pub mod raster;
pub mod scene;
pub mod tape;

pub use config::{Color, LabelStyle, Palette, PfdConfig, TapeScale, TapeSpec};
pub use raster::{Canvas, FontBook};
pub use scene::{DrawPrimitive, FontSlot, Scene, Stroke, Viewport};
pub use tape::{heading_diff, TapeTick};

use bon::Builder;
use rusttype::Font;

use std::fmt;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use pixels::{Pixels, SurfaceTexture};
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use scene::rotate_deg;

// ============================================================================
// FLIGHT STATE
// ============================================================================

/// Immutable per-frame snapshot of vehicle state.
///
/// The RPM array always has four slots; only the first `prop_count`
/// entries are drawn. `prop_count` above four is a caller contract
/// violation and is bounded only for memory safety.
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct FlightState {
    /// Degrees, positive nose up.
    #[builder(default = 0.0)]
    pub pitch: f32,
    /// Degrees, positive right wing down.
    #[builder(default = 0.0)]
    pub roll: f32,
    /// Feet above ground level.
    #[builder(default = 0.0)]
    pub altitude: f32,
    /// Knots.
    #[builder(default = 0.0)]
    pub speed: f32,
    /// Degrees, 0-360.
    #[builder(default = 0.0)]
    pub heading: f32,
    /// Altimeter setting in the telemetry source's convention.
    #[builder(default = 29.92)]
    pub qnh: f32,
    /// Outside air temperature, degrees Celsius.
    #[builder(default = 15.0)]
    pub oat: f32,
    #[builder(default = String::new())]
    pub flight_mode: String,
    /// Preformatted "HH:MM:SS".
    #[builder(default = String::new())]
    pub clock: String,
    #[builder(default = [0; 4])]
    pub rpm: [i32; 4],
    /// Volts.
    #[builder(default = 0.0)]
    pub battery: f32,
    /// 0-4.
    #[builder(default = 0)]
    pub prop_count: u8,
}

impl FlightState {
    /// Reject non-finite samples before they can reach the layout stages.
    pub fn validate(&self) -> Result<(), PfdError> {
        let fields = [
            ("pitch", self.pitch),
            ("roll", self.roll),
            ("altitude", self.altitude),
            ("speed", self.speed),
            ("heading", self.heading),
            ("qnh", self.qnh),
            ("oat", self.oat),
            ("battery", self.battery),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(PfdError::NonFinite(name));
            }
        }
        Ok(())
    }
}

impl Default for FlightState {
    fn default() -> Self {
        Self::builder().build()
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PfdError {
    /// A flight-state field was NaN or infinite.
    NonFinite(&'static str),
    /// Font data could not be parsed.
    InvalidFont,
}

impl fmt::Display for PfdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PfdError::NonFinite(field) => write!(f, "non-finite {field} in flight state"),
            PfdError::InvalidFont => write!(f, "font data could not be parsed"),
        }
    }
}

impl std::error::Error for PfdError {}

// ============================================================================
// PUBLIC API
// ============================================================================

/// The instrument: configuration, fonts, and the last received snapshot.
///
/// Stateless between frames apart from that snapshot, which is retained
/// only so a repaint can run without a new sample.
pub struct Pfd {
    config: PfdConfig,
    state: FlightState,
    fonts: FontBook,
}

impl Pfd {
    pub fn new(config: PfdConfig) -> Self {
        Self {
            config,
            state: FlightState::default(),
            fonts: FontBook::default(),
        }
    }

    /// Store a new snapshot. Always succeeds for finite samples; a NaN or
    /// infinite field is a caller contract violation and leaves the
    /// previous snapshot in place.
    pub fn update_state(&mut self, state: FlightState) -> Result<(), PfdError> {
        state.validate()?;
        self.state = state;
        Ok(())
    }

    pub fn state(&self) -> &FlightState {
        &self.state
    }

    pub fn config(&self) -> &PfdConfig {
        &self.config
    }

    /// Font for labels, annunciators, and gauges.
    pub fn set_primary_font(&mut self, data: Vec<u8>) -> Result<(), PfdError> {
        self.fonts.primary = Some(Font::try_from_vec(data).ok_or(PfdError::InvalidFont)?);
        Ok(())
    }

    /// Font for tape numbers and readouts.
    pub fn set_tape_font(&mut self, data: Vec<u8>) -> Result<(), PfdError> {
        self.fonts.tape = Some(Font::try_from_vec(data).ok_or(PfdError::InvalidFont)?);
        Ok(())
    }

    /// Produce one frame for a canvas of the given physical size.
    pub fn render(&self, width: u32, height: u32) -> Scene {
        let viewport = Viewport::new(width, height);
        if viewport.is_degenerate() {
            log::debug!("degenerate canvas {width}x{height}, skipping frame");
            return Scene {
                viewport,
                primitives: Vec::new(),
            };
        }
        Scene {
            viewport,
            primitives: compose(&self.state, &self.config),
        }
    }

    /// Open a window showing the current snapshot.
    pub fn show(self) -> Result<(), Box<dyn std::error::Error>> {
        self.run_window(None)
    }

    /// Open a window and repaint from the newest snapshot on the channel.
    /// The channel hands over whole snapshots, so a frame never observes a
    /// partially updated state.
    pub fn show_with_updates(
        self,
        receiver: Receiver<FlightState>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.run_window(Some(receiver))
    }

    fn run_window(
        mut self,
        receiver: Option<Receiver<FlightState>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title("Primary Flight Display")
            .with_inner_size(LogicalSize::new(768.0, 768.0))
            .build(&event_loop)?;
        let window = std::sync::Arc::new(window);
        let window_clone = window.clone();

        let size = window.inner_size();
        let mut fb_width = size.width;
        let mut fb_height = size.height;
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;

        let frame_duration = Duration::from_secs_f64(1.0 / 50.0);
        let mut last_frame = Instant::now();

        event_loop.run(move |event, window_target| {
            window_target.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        fb_width = new_size.width;
                        fb_height = new_size.height;
                        let _ = pixels.resize_buffer(new_size.width, new_size.height);
                        let _ = pixels.resize_surface(new_size.width, new_size.height);
                    }
                    WindowEvent::RedrawRequested => {
                        if let Some(ref receiver) = receiver {
                            let mut latest = None;
                            while let Ok(state) = receiver.try_recv() {
                                latest = Some(state);
                            }
                            if let Some(state) = latest {
                                if let Err(err) = self.update_state(state) {
                                    log::warn!("rejected telemetry sample: {err}");
                                }
                            }
                        }
                        let scene = self.render(fb_width, fb_height);
                        let mut canvas = Canvas::new(
                            pixels.frame_mut(),
                            fb_width as usize,
                            fb_height as usize,
                        );
                        scene.rasterize(&mut canvas, &self.fonts);
                        let _ = pixels.render();
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    if last_frame.elapsed() >= frame_duration {
                        window_clone.request_redraw();
                        last_frame = Instant::now();
                    }
                }
                _ => {}
            }
        })?;

        Ok(())
    }
}

// ============================================================================
// COMPOSER
// ============================================================================

/// Assemble the full primitive list for one frame. Layering order is
/// fixed; every stage depends only on the snapshot and the config.
pub fn compose(state: &FlightState, config: &PfdConfig) -> Vec<DrawPrimitive> {
    let mut out = Vec::with_capacity(256);
    out.push(DrawPrimitive::Clear(config.palette.background));

    // Display convention: the ladder scrolls down as the nose rises.
    let pitch = -state.pitch;

    horizon(&mut out, pitch, state.roll, config);
    pitch_ladder(&mut out, pitch, state.roll, config);
    roll_indicator(&mut out, state.roll, config);
    aircraft_symbol(&mut out, config);
    altitude_tape(&mut out, state, config);
    speed_tape(&mut out, state.speed, config);
    heading_tape(&mut out, state.heading, config);
    flight_mode_text(&mut out, &state.flight_mode, config);
    clock_text(&mut out, &state.clock, config);
    prop_gauges(&mut out, state, config);
    qnh_readout(&mut out, state.qnh, config);
    out
}

// ============================================================================
// DERIVED VALUES
// ============================================================================

/// Barometric and ISA-deviation correction applied to the raw altitude
/// before it reaches the altitude tape. Pure f32 arithmetic, truncated.
pub fn baro_altitude(alt_ft: f32, qnh: f32, oat_c: f32) -> i32 {
    let hpa_qnh = qnh * 33.865;
    let baro_alt = alt_ft + (hpa_qnh - 1013.25) * 30.0;
    let isa_temp = 15.0 - 2.0 * (baro_alt / 1000.0);
    let isa_dev = oat_c - isa_temp;
    (4.0 * (baro_alt / 1000.0) * isa_dev + baro_alt) as i32
}

/// Pointer deflection in degrees, saturating at the scale limit while the
/// roll value itself stays untouched for other consumers.
pub fn roll_pointer_angle(roll: f32, limit: f32) -> f32 {
    -roll.clamp(-limit, limit)
}

/// Vertical position of a ladder rung at `angle` degrees, logical units.
fn rung_y(angle: i32, pitch: f32, zoom: f32) -> f32 {
    -(angle as f32 * zoom + pitch * zoom)
}

// ============================================================================
// ATTITUDE LAYOUT
// ============================================================================

fn rotated_line(
    out: &mut Vec<DrawPrimitive>,
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    rot: f32,
    stroke: Stroke,
) {
    let (ax, ay) = rotate_deg(x0, y0, rot);
    let (bx, by) = rotate_deg(x1, y1, rot);
    out.push(DrawPrimitive::Line {
        x0: ax,
        y0: ay,
        x1: bx,
        y1: by,
        stroke,
    });
}

fn rotated_text(
    out: &mut Vec<DrawPrimitive>,
    x: f32,
    y: f32,
    rot: f32,
    text: String,
    config: &PfdConfig,
) {
    let (ax, ay) = rotate_deg(x, y, rot);
    out.push(DrawPrimitive::Text {
        x: ax,
        y: ay,
        angle_deg: rot,
        text,
        font: FontSlot::Primary,
        size: config.font_size,
        color: config.palette.primary,
    });
}

/// Horizon line, banked opposite to aircraft roll and shifted for pitch.
/// The gap around center keeps the aircraft symbol clear.
fn horizon(out: &mut Vec<DrawPrimitive>, pitch: f32, roll: f32, config: &PfdConfig) {
    let y = -(pitch * config.zoom);
    let stroke = Stroke::solid(config.palette.primary, 1.0);
    let rot = -roll;
    rotated_line(out, -config.horizon_extent, y, -config.horizon_gap, y, rot, stroke);
    rotated_line(out, config.horizon_gap, y, config.horizon_extent, y, rot, stroke);
}

/// Graduated rungs above and below the horizon. Rungs above use solid
/// ticks closing downward; rungs below use dashed ticks closing upward,
/// with labels nudged so they clear the dashes.
fn pitch_ladder(out: &mut Vec<DrawPrimitive>, pitch: f32, roll: f32, config: &PfdConfig) {
    let pen = Stroke::solid(config.palette.primary, 0.5);
    let dashes = Stroke::dashed(config.palette.primary, 0.5, 1.0, 2.0);
    let rot = -roll;
    let (top, bottom) = config.ladder_band;

    let mut angle = -config.ladder_range;
    while angle <= config.ladder_range {
        // 0 is the horizon line itself.
        if angle == 0 {
            angle += config.ladder_step;
            continue;
        }
        let y = rung_y(angle, pitch, config.zoom);
        if y < top || y > bottom {
            angle += config.ladder_step;
            continue;
        }
        let label = angle.to_string();
        if angle > 0 {
            rotated_line(out, -15.0, y, -30.0, y, rot, pen);
            rotated_line(out, 15.0, y, 30.0, y, rot, pen);
            rotated_line(out, -30.0, y, -30.0, y + 3.0, rot, pen);
            rotated_line(out, 30.0, y, 30.0, y + 3.0, rot, pen);
            rotated_text(out, -27.0, y + 3.05, rot, label.clone(), config);
            rotated_text(out, 25.0, y + 3.05, rot, label, config);
        } else {
            rotated_line(out, -15.0, y, -30.0, y + 2.0, rot, dashes);
            rotated_line(out, 15.0, y, 30.0, y + 2.0, rot, dashes);
            rotated_line(out, -15.0, y, -15.0, y - 3.0, rot, pen);
            rotated_line(out, 15.0, y, 15.0, y - 3.0, rot, pen);
            rotated_text(out, -21.0, y - 0.5, rot, label.clone(), config);
            rotated_text(out, 16.0, y - 0.5, rot, label, config);
        }
        angle += config.ladder_step;
    }
}

fn roll_scale_tick(out: &mut Vec<DrawPrimitive>, radius: f32, deg: f32, len: f32, pen: Stroke) {
    let (ax, ay) = rotate_deg(0.0, radius - len, deg);
    let (bx, by) = rotate_deg(0.0, radius, deg);
    out.push(DrawPrimitive::Line {
        x0: ax,
        y0: ay,
        x1: bx,
        y1: by,
        stroke: pen,
    });
}

/// Fixed roll scale plus the rotating pointer. Only the pointer moves;
/// its deflection saturates at the scale limit.
fn roll_indicator(out: &mut Vec<DrawPrimitive>, roll: f32, config: &PfdConfig) {
    let pen = Stroke::solid(config.palette.primary, 0.5);
    let r = config.roll_radius;

    for deg in [-20.0, -10.0, 0.0, 10.0, 20.0] {
        roll_scale_tick(out, r, deg, 1.0, pen);
    }
    for deg in [-30.0, 30.0] {
        roll_scale_tick(out, r, deg, 2.0, pen);
    }
    for deg in [-45.0, 45.0] {
        roll_scale_tick(out, r, deg, 4.0, pen);
    }

    let pointer = roll_pointer_angle(roll, config.roll_limit);
    let inner: Vec<(f32, f32)> = [(0.0, r), (-2.5, r + 3.0), (2.5, r + 3.0)]
        .iter()
        .map(|&(x, y)| rotate_deg(x, y, pointer))
        .collect();
    out.push(DrawPrimitive::Path {
        points: inner,
        closed: true,
        fill: Some(config.palette.primary),
        stroke: pen,
    });
    let outer: Vec<(f32, f32)> = [(0.0, r), (-4.5, r + 5.0), (4.5, r + 5.0)]
        .iter()
        .map(|&(x, y)| rotate_deg(x, y, pointer))
        .collect();
    out.push(DrawPrimitive::Path {
        points: outer,
        closed: true,
        fill: None,
        stroke: pen,
    });

    // Static center reference mark.
    out.push(DrawPrimitive::Path {
        points: vec![(0.0, r - 1.0), (-1.0, r - 4.0), (1.0, r - 4.0)],
        closed: true,
        fill: None,
        stroke: pen,
    });
}

/// Fixed wings and W-shaped center reference at the optical center.
fn aircraft_symbol(out: &mut Vec<DrawPrimitive>, config: &PfdConfig) {
    let pen = Stroke::solid(config.palette.primary, 0.5);
    let segments = [
        (-12.0, 0.0, -6.0, 0.0),
        (6.0, 0.0, 12.0, 0.0),
        (-6.0, 0.0, -3.0, 3.0),
        (6.0, 0.0, 3.0, 3.0),
        (-3.0, 3.0, 0.0, 0.0),
        (3.0, 3.0, 0.0, 0.0),
    ];
    for (x0, y0, x1, y1) in segments {
        out.push(DrawPrimitive::Line {
            x0,
            y0,
            x1,
            y1,
            stroke: pen,
        });
    }
}

// ============================================================================
// TAPE STATIONS
// ============================================================================

/// Altitude tape on the right, fed by the baro-corrected value. Negative
/// readouts widen the box and spell "NEG" instead of a minus sign.
fn altitude_tape(out: &mut Vec<DrawPrimitive>, state: &FlightState, config: &PfdConfig) {
    let spec = &config.altitude_tape;
    let pen = Stroke::solid(config.palette.primary, 0.5);
    let x = config.altitude_tape_x;
    let half = spec.band;

    out.push(DrawPrimitive::Line {
        x0: x - 5.0,
        y0: half,
        x1: x - 5.0,
        y1: -half,
        stroke: pen,
    });
    out.push(DrawPrimitive::Line {
        x0: x - 5.0,
        y0: half,
        x1: x + config.tape_width,
        y1: half,
        stroke: pen,
    });
    out.push(DrawPrimitive::Line {
        x0: x - 5.0,
        y0: -half,
        x1: x + config.tape_width,
        y1: -half,
        stroke: pen,
    });

    let baro = baro_altitude(state.altitude, state.qnh, state.oat);
    for tick in tape::layout(spec, baro as f32) {
        out.push(DrawPrimitive::Line {
            x0: x - 4.5,
            y0: tick.offset,
            x1: x,
            y1: tick.offset,
            stroke: pen,
        });
        if let Some(label) = tick.label {
            out.push(DrawPrimitive::Text {
                x: x + 2.0,
                y: tick.offset + 1.0,
                angle_deg: 0.0,
                text: label,
                font: FontSlot::Tape,
                size: config.font_size,
                color: config.palette.primary,
            });
        }
    }

    let (box_width, readout) = if baro >= 0 {
        (15.0, baro.to_string())
    } else {
        (20.0, format!("NEG {}", -baro))
    };
    out.push(DrawPrimitive::Rect {
        x: x + 2.0,
        y: -3.0,
        w: box_width,
        h: 6.0,
        fill: Some(config.palette.background),
        stroke: Stroke::solid(config.palette.warning, 0.5),
    });
    out.push(DrawPrimitive::Text {
        x: x + 4.0,
        y: 1.0,
        angle_deg: 0.0,
        text: readout,
        font: FontSlot::Tape,
        size: config.font_size,
        color: config.palette.primary,
    });

    out.push(DrawPrimitive::Text {
        x: x - 3.0,
        y: -(half + 2.0),
        angle_deg: 0.0,
        text: "BARO ALT (FEET)".to_string(),
        font: FontSlot::Tape,
        size: config.font_size,
        color: config.palette.primary,
    });
    out.push(DrawPrimitive::Text {
        x: x - 5.0,
        y: half + 5.0,
        angle_deg: 0.0,
        text: format!("ALT AGL: {}FT", state.altitude as i32),
        font: FontSlot::Tape,
        size: config.font_size,
        color: config.palette.primary,
    });
}

/// Airspeed tape on the left, mirror of the altitude station.
fn speed_tape(out: &mut Vec<DrawPrimitive>, speed: f32, config: &PfdConfig) {
    let spec = &config.speed_tape;
    let pen = Stroke::solid(config.palette.primary, 0.5);
    let x = config.speed_tape_x;
    let half = spec.band;
    let inner = x + 5.0;
    let outer = x - config.tape_width;

    out.push(DrawPrimitive::Line {
        x0: inner,
        y0: half,
        x1: inner,
        y1: -half,
        stroke: pen,
    });
    out.push(DrawPrimitive::Line {
        x0: inner,
        y0: half,
        x1: outer,
        y1: half,
        stroke: pen,
    });
    out.push(DrawPrimitive::Line {
        x0: inner,
        y0: -half,
        x1: outer,
        y1: -half,
        stroke: pen,
    });

    for tick in tape::layout(spec, speed) {
        out.push(DrawPrimitive::Line {
            x0: x + 4.5,
            y0: tick.offset,
            x1: x,
            y1: tick.offset,
            stroke: pen,
        });
        if let Some(label) = tick.label {
            out.push(DrawPrimitive::Text {
                x: x - 7.0,
                y: tick.offset + 1.0,
                angle_deg: 0.0,
                text: label,
                font: FontSlot::Tape,
                size: config.font_size,
                color: config.palette.primary,
            });
        }
    }

    // Datum tick at the current value.
    out.push(DrawPrimitive::Line {
        x0: x + 4.5,
        y0: 0.0,
        x1: x,
        y1: 0.0,
        stroke: pen,
    });

    let shown = if speed < 0.0 { 0.0 } else { speed };
    out.push(DrawPrimitive::Rect {
        x: x - 16.0,
        y: -3.0,
        w: 15.0,
        h: 6.0,
        fill: Some(config.palette.background),
        stroke: Stroke::solid(config.palette.warning, 0.5),
    });
    out.push(DrawPrimitive::Text {
        x: x - 7.0,
        y: 1.0,
        angle_deg: 0.0,
        text: (shown as i32).to_string(),
        font: FontSlot::Tape,
        size: config.font_size,
        color: config.palette.primary,
    });
    out.push(DrawPrimitive::Text {
        x: x - 10.0,
        y: -(half + 2.0),
        angle_deg: 0.0,
        text: "SPEED KTS".to_string(),
        font: FontSlot::Tape,
        size: config.font_size,
        color: config.palette.primary,
    });
}

/// Circular heading tape along the top rail.
fn heading_tape(out: &mut Vec<DrawPrimitive>, heading: f32, config: &PfdConfig) {
    let spec = &config.heading_tape;
    let pen = Stroke::solid(config.palette.primary, 0.5);
    let y = config.heading_tape_y;

    out.push(DrawPrimitive::Line {
        x0: -spec.band,
        y0: y,
        x1: spec.band,
        y1: y,
        stroke: pen,
    });

    for tick in tape::layout(spec, heading) {
        let x = tick.offset;
        out.push(DrawPrimitive::Line {
            x0: x,
            y0: y,
            x1: x,
            y1: y - 5.0,
            stroke: pen,
        });
        if let Some(label) = tick.label {
            out.push(DrawPrimitive::Text {
                x: x - 2.0,
                y: y - 7.0,
                angle_deg: 0.0,
                text: label,
                font: FontSlot::Tape,
                size: config.font_size,
                color: config.palette.primary,
            });
        }
    }

    out.push(DrawPrimitive::Rect {
        x: -5.0,
        y: y - 12.0,
        w: 9.5,
        h: 6.0,
        fill: Some(config.palette.background),
        stroke: Stroke::solid(config.palette.warning, 0.5),
    });
    let shown = (heading as i32).rem_euclid(360);
    out.push(DrawPrimitive::Text {
        x: -3.0,
        y: y - 8.0,
        angle_deg: 0.0,
        text: format!("{shown:03}"),
        font: FontSlot::Tape,
        size: config.font_size,
        color: config.palette.primary,
    });
}

// ============================================================================
// ANNUNCIATORS & GAUGES
// ============================================================================

fn flight_mode_text(out: &mut Vec<DrawPrimitive>, mode: &str, config: &PfdConfig) {
    out.push(DrawPrimitive::Text {
        x: -(mode.len() as f32),
        y: -85.0,
        angle_deg: 0.0,
        text: mode.to_string(),
        font: FontSlot::Primary,
        size: config.font_size,
        color: config.palette.accent,
    });
}

fn clock_text(out: &mut Vec<DrawPrimitive>, clock: &str, config: &PfdConfig) {
    out.push(DrawPrimitive::Text {
        x: -70.0,
        y: 82.0,
        angle_deg: 0.0,
        text: "CLK (GMT)".to_string(),
        font: FontSlot::Primary,
        size: config.font_size,
        color: config.palette.text,
    });
    out.push(DrawPrimitive::Text {
        x: -69.75,
        y: 87.0,
        angle_deg: 0.0,
        text: clock.to_string(),
        font: FontSlot::Primary,
        size: config.font_size,
        color: config.palette.accent,
    });
}

/// One partial-arc gauge per propeller, stacked down the left edge, plus
/// the battery readout in the top right corner.
fn prop_gauges(out: &mut Vec<DrawPrimitive>, state: &FlightState, config: &PfdConfig) {
    let r = config.gauge_radius;
    let count = usize::from(state.prop_count).min(state.rpm.len());
    let mut y = -47.5;
    for i in 0..count {
        out.push(DrawPrimitive::Arc {
            cx: -95.0 + r,
            cy: y + r,
            radius: r,
            start_deg: 180.0,
            sweep_deg: 270.0,
            stroke: Stroke::solid(config.palette.warning, 0.5),
        });
        out.push(DrawPrimitive::Text {
            x: -92.5,
            y: y + 20.0,
            angle_deg: 0.0,
            text: format!("RPM #{}", i + 1),
            font: FontSlot::Primary,
            size: config.font_size,
            color: config.palette.accent,
        });
        out.push(DrawPrimitive::Text {
            x: -90.0,
            y: y + 10.0,
            angle_deg: 0.0,
            text: state.rpm[i].to_string(),
            font: FontSlot::Primary,
            size: config.font_size,
            color: config.palette.text,
        });
        y += config.gauge_pitch;
    }

    out.push(DrawPrimitive::Text {
        x: 60.0,
        y: -70.0,
        angle_deg: 0.0,
        text: "BATTERY:".to_string(),
        font: FontSlot::Primary,
        size: config.font_size,
        color: config.palette.text,
    });
    out.push(DrawPrimitive::Text {
        x: 75.0,
        y: -70.0,
        angle_deg: 0.0,
        text: format!("{:.1}V", state.battery),
        font: FontSlot::Primary,
        size: config.font_size,
        color: config.palette.text,
    });
}

/// Barometric setting in both units. The 33.865 factor follows the
/// telemetry source's convention for the raw setting.
fn qnh_readout(out: &mut Vec<DrawPrimitive>, qnh: f32, config: &PfdConfig) {
    let rows = [
        ("INHG", format!("{:.2}", qnh * 33.865), 70.0),
        ("HPA", format!("{qnh:.2}"), 75.0),
    ];
    for (caption, value, y) in rows {
        out.push(DrawPrimitive::Text {
            x: 55.0,
            y,
            angle_deg: 0.0,
            text: caption.to_string(),
            font: FontSlot::Primary,
            size: config.font_size,
            color: config.palette.text,
        });
        out.push(DrawPrimitive::Text {
            x: 65.0,
            y,
            angle_deg: 0.0,
            text: value,
            font: FontSlot::Primary,
            size: config.font_size,
            color: config.palette.accent,
        });
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> FlightState {
        FlightState::builder()
            .pitch(0.0)
            .roll(0.0)
            .altitude(8500.0)
            .speed(100.0)
            .heading(90.0)
            .qnh(29.92)
            .oat(15.0)
            .build()
    }

    fn texts(scene: &[DrawPrimitive]) -> Vec<(&str, f32, f32)> {
        scene
            .iter()
            .filter_map(|p| match p {
                DrawPrimitive::Text { x, y, text, .. } => Some((text.as_str(), *x, *y)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn baro_altitude_is_deterministic() {
        let a = baro_altitude(8500.0, 29.92, 8.0);
        let b = baro_altitude(8500.0, 29.92, 8.0);
        assert_eq!(a, b);
        assert_eq!(a, 8839);
    }

    #[test]
    fn roll_pointer_saturates_at_the_scale_limit() {
        assert_eq!(roll_pointer_angle(200.0, 45.0), roll_pointer_angle(45.0, 45.0));
        assert_eq!(roll_pointer_angle(-200.0, 45.0), roll_pointer_angle(-45.0, 45.0));
        assert_eq!(roll_pointer_angle(10.0, 45.0), -10.0);
    }

    #[test]
    fn ladder_rungs_mirror_about_the_horizon() {
        let up = rung_y(30, 0.0, 6.0);
        let down = rung_y(-30, 0.0, 6.0);
        assert_eq!(up, -down);
        assert_eq!(up, -180.0);
    }

    #[test]
    fn non_finite_samples_are_rejected() {
        let mut pfd = Pfd::new(PfdConfig::default());
        pfd.update_state(sample_state()).unwrap();

        let mut bad = sample_state();
        bad.pitch = f32::NAN;
        assert_eq!(pfd.update_state(bad), Err(PfdError::NonFinite("pitch")));
        // Previous snapshot survives.
        assert_eq!(pfd.state().altitude, 8500.0);

        let mut bad = sample_state();
        bad.qnh = f32::INFINITY;
        assert_eq!(pfd.update_state(bad), Err(PfdError::NonFinite("qnh")));
    }

    #[test]
    fn degenerate_canvas_renders_nothing() {
        let mut pfd = Pfd::new(PfdConfig::default());
        pfd.update_state(sample_state()).unwrap();
        assert!(pfd.render(0, 500).primitives.is_empty());
        assert!(pfd.render(500, 0).primitives.is_empty());
        assert!(!pfd.render(500, 500).primitives.is_empty());
    }

    #[test]
    fn frame_starts_with_a_background_clear() {
        let config = PfdConfig::default();
        let scene = compose(&sample_state(), &config);
        assert_eq!(scene[0], DrawPrimitive::Clear(config.palette.background));
    }

    #[test]
    fn level_flight_end_to_end() {
        let config = PfdConfig::default();
        let scene = compose(&sample_state(), &config);

        // Horizon at zero offset and zero rotation (the only width-1 lines).
        let horizon: Vec<_> = scene
            .iter()
            .filter_map(|p| match p {
                DrawPrimitive::Line { x0, y0, x1, y1, stroke } if stroke.width == 1.0 => {
                    Some((*x0, *y0, *x1, *y1))
                }
                _ => None,
            })
            .collect();
        assert_eq!(horizon.len(), 2);
        for (x0, y0, x1, y1) in horizon {
            assert_eq!(y0, 0.0);
            assert_eq!(y1, 0.0);
            assert!(x0.abs() == 200.0 || x0.abs() == 13.0);
            assert!(x1.abs() == 200.0 || x1.abs() == 13.0);
        }

        let texts = texts(&scene);
        // Heading tape center label is east.
        assert!(texts.contains(&("E", -2.0, -77.0)));
        // Heading readout, zero padded.
        assert!(texts.contains(&("090", -3.0, -78.0)));
        // Speed box shows the current value at the datum.
        assert!(texts.contains(&("100", -67.0, 1.0)));
    }

    #[test]
    fn negative_baro_readout_spells_neg() {
        // Deep below the standard datum: raw altitude well negative.
        let state = FlightState::builder()
            .altitude(-2000.0)
            .qnh(29.92)
            .oat(15.0)
            .build();
        let config = PfdConfig::default();
        let scene = compose(&state, &config);
        let baro = baro_altitude(-2000.0, 29.92, 15.0);
        assert!(baro < 0);
        let expected = format!("NEG {}", -baro);
        assert!(texts(&scene).iter().any(|(t, _, _)| *t == expected));
    }

    #[test]
    fn negative_speed_renders_like_zero() {
        let config = PfdConfig::default();
        let mut minus = FlightState::default();
        minus.speed = -5.0;
        let zero = FlightState::default();
        assert_eq!(compose(&minus, &config), compose(&zero, &config));
    }

    #[test]
    fn prop_gauges_follow_the_propeller_count() {
        let config = PfdConfig::default();
        let arcs = |scene: &[DrawPrimitive]| {
            scene
                .iter()
                .filter(|p| matches!(p, DrawPrimitive::Arc { .. }))
                .count()
        };

        let mut state = FlightState::default();
        assert_eq!(arcs(&compose(&state, &config)), 0);

        state.prop_count = 4;
        state.rpm = [2500, 2480, 2520, 2390];
        let scene = compose(&state, &config);
        assert_eq!(arcs(&scene), 4);
        let labels = texts(&scene);
        assert!(labels.iter().any(|(t, _, _)| *t == "RPM #1"));
        assert!(labels.iter().any(|(t, _, _)| *t == "RPM #4"));
        assert!(labels.iter().any(|(t, _, _)| *t == "2390"));
    }

    #[test]
    fn banked_ladder_rotates_with_the_horizon() {
        let config = PfdConfig::default();
        let mut state = sample_state();
        state.roll = 30.0;
        let scene = compose(&state, &config);
        // Every rotated ladder label carries the bank angle.
        let banked = scene.iter().any(|p| {
            matches!(p, DrawPrimitive::Text { angle_deg, .. } if *angle_deg == -30.0)
        });
        assert!(banked);
    }

    #[test]
    fn heading_readout_normalizes_and_pads() {
        let config = PfdConfig::default();
        let mut state = FlightState::default();
        state.heading = 365.0;
        let scene = compose(&state, &config);
        assert!(texts(&scene).contains(&("005", -3.0, -78.0)));
    }
}
