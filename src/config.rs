use bon::Builder;

/// Color representation for display elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Display palette. The default mirrors a monochrome-green cockpit CRT:
/// green scales, red warning outlines, yellow dynamic values, white
/// captions on black.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    /// Scale lines, ticks, and tape numbers.
    pub primary: Color,
    /// Readout box borders and gauge arcs.
    pub warning: Color,
    /// Mode, clock, and other live-value text.
    pub accent: Color,
    /// Static captions.
    pub text: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::new(0x00, 0x00, 0x00),
            primary: Color::new(0x00, 0xff, 0x00),
            warning: Color::new(0xff, 0x00, 0x00),
            accent: Color::new(0xff, 0xff, 0x00),
            text: Color::new(0xff, 0xff, 0xff),
        }
    }
}

/// Sweep behavior of a tape scale.
///
/// Linear tapes walk a fixed candidate range. The circular tape wraps
/// candidates into [0, 360) and extends `margin` degrees past each end so
/// ticks slide in seamlessly across the north crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapeScale {
    Linear { min: i32, max: i32 },
    Circular { margin: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    /// Tick value printed as-is.
    Plain,
    /// Tens of degrees, zero-padded, with N/E/S/W at the cardinals.
    HeadingTens,
}

/// Layout parameters for one sliding tape.
#[derive(Debug, Clone, PartialEq)]
pub struct TapeSpec {
    /// Value difference between adjacent ticks.
    pub step: i32,
    /// Ticks at multiples of this value carry a label.
    pub label_step: i32,
    /// Logical units between adjacent ticks.
    pub tick_spacing: f32,
    /// Ticks whose offset from the datum exceeds this are culled.
    pub band: f32,
    /// Labels within this window around the datum are suppressed so the
    /// current-value box stays readable. Zero disables the window.
    pub label_exclusion: f32,
    /// Values below zero are clamped before tick generation.
    pub clamp_negative: bool,
    pub scale: TapeScale,
    pub labels: LabelStyle,
}

impl TapeSpec {
    /// Altitude tape: 100 ft ticks, labels every 500 ft.
    pub fn altitude() -> Self {
        Self {
            step: 100,
            label_step: 500,
            tick_spacing: 10.0,
            band: 60.0,
            label_exclusion: 3.0,
            clamp_negative: false,
            scale: TapeScale::Linear {
                min: -90_000,
                max: 90_000,
            },
            labels: LabelStyle::Plain,
        }
    }

    /// Airspeed tape: 10 kt ticks, every tick labelled.
    pub fn speed() -> Self {
        Self {
            step: 10,
            label_step: 10,
            tick_spacing: 10.0,
            band: 60.0,
            label_exclusion: 3.0,
            clamp_negative: true,
            scale: TapeScale::Linear { min: 0, max: 350 },
            labels: LabelStyle::Plain,
        }
    }

    /// Heading tape: 5 degree ticks, labels every 10 degrees.
    pub fn heading() -> Self {
        Self {
            step: 5,
            label_step: 10,
            tick_spacing: 10.0,
            band: 40.0,
            label_exclusion: 0.0,
            clamp_negative: false,
            scale: TapeScale::Circular { margin: 50 },
            labels: LabelStyle::HeadingTens,
        }
    }

    /// Logical units per value unit.
    pub fn unit_scale(&self) -> f32 {
        self.tick_spacing / self.step as f32
    }
}

/// Every scale factor the layout stages consume, as one explicit struct.
#[derive(Debug, Clone, Builder)]
pub struct PfdConfig {
    /// Logical units per degree of pitch.
    #[builder(default = 6.0)]
    pub zoom: f32,
    /// Degrees between adjacent ladder rungs.
    #[builder(default = 5)]
    pub ladder_step: i32,
    /// Rungs are generated from -range to +range.
    #[builder(default = 90)]
    pub ladder_range: i32,
    /// Visible band for rungs, top then bottom (y grows downward).
    #[builder(default = (-75.0, 100.0))]
    pub ladder_band: (f32, f32),
    /// Horizon line stops this far short of center on each side.
    #[builder(default = 13.0)]
    pub horizon_gap: f32,
    #[builder(default = 200.0)]
    pub horizon_extent: f32,
    /// Radius of the roll scale and pointer track.
    #[builder(default = 42.0)]
    pub roll_radius: f32,
    /// Pointer deflection saturates here; the roll value is untouched.
    #[builder(default = 45.0)]
    pub roll_limit: f32,
    #[builder(default = 60.0)]
    pub altitude_tape_x: f32,
    #[builder(default = -60.0)]
    pub speed_tape_x: f32,
    #[builder(default = -70.0)]
    pub heading_tape_y: f32,
    #[builder(default = 12.0)]
    pub tape_width: f32,
    #[builder(default = 8.0)]
    pub gauge_radius: f32,
    /// Vertical distance between stacked propeller gauges.
    #[builder(default = 25.0)]
    pub gauge_pitch: f32,
    /// Text size in logical units.
    #[builder(default = 3.0)]
    pub font_size: f32,
    #[builder(default = TapeSpec::altitude())]
    pub altitude_tape: TapeSpec,
    #[builder(default = TapeSpec::speed())]
    pub speed_tape: TapeSpec,
    #[builder(default = TapeSpec::heading())]
    pub heading_tape: TapeSpec,
    #[builder(default)]
    pub palette: Palette,
}

impl Default for PfdConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tape_unit_scales() {
        assert_eq!(TapeSpec::altitude().unit_scale(), 0.1);
        assert_eq!(TapeSpec::speed().unit_scale(), 1.0);
        assert_eq!(TapeSpec::heading().unit_scale(), 2.0);
    }

    #[test]
    fn builder_defaults_match_display_constants() {
        let config = PfdConfig::default();
        assert_eq!(config.zoom, 6.0);
        assert_eq!(config.roll_limit, 45.0);
        assert_eq!(config.altitude_tape_x, -config.speed_tape_x);
        assert_eq!(config.palette, Palette::default());
    }

    #[test]
    fn speed_is_the_only_clamped_tape() {
        assert!(TapeSpec::speed().clamp_negative);
        assert!(!TapeSpec::altitude().clamp_negative);
        assert!(!TapeSpec::heading().clamp_negative);
    }
}
