use crate::config::{LabelStyle, TapeScale, TapeSpec};

/// One visible tick of a tape.
#[derive(Debug, Clone, PartialEq)]
pub struct TapeTick {
    /// Offset from the tape datum along the scroll axis, logical units.
    /// Positive is down for vertical tapes, right for horizontal ones.
    pub offset: f32,
    pub value: i32,
    pub label: Option<String>,
}

/// Shortest-path angular difference `target - current`, wrapped into
/// (-180, 180].
pub fn heading_diff(target: f32, current: f32) -> f32 {
    let mut diff = target - current;
    if diff > 180.0 {
        diff -= 360.0;
    }
    if diff < -180.0 {
        diff += 360.0;
    }
    diff
}

fn label_for(style: LabelStyle, value: i32) -> String {
    match style {
        LabelStyle::Plain => value.to_string(),
        LabelStyle::HeadingTens => match value {
            0 => "N".to_string(),
            90 => "E".to_string(),
            180 => "S".to_string(),
            270 => "W".to_string(),
            _ => format!("{:02}", value / 10),
        },
    }
}

/// Lay out the visible ticks of one tape around `value`.
///
/// Candidates sweep in ascending order, so ticks that land on the same
/// slot resolve deterministically in draw order.
pub fn layout(spec: &TapeSpec, value: f32) -> Vec<TapeTick> {
    let value = if spec.clamp_negative && value < 0.0 {
        log::debug!("negative tape value {value} clamped to 0");
        0.0
    } else {
        value
    };
    let k = spec.unit_scale();
    let mut ticks = Vec::new();
    match spec.scale {
        TapeScale::Linear { min, max } => {
            let mut t = min;
            while t <= max {
                let offset = (value - t as f32) * k;
                if offset.abs() <= spec.band {
                    let labelled = t % spec.label_step == 0
                        && (spec.label_exclusion == 0.0 || offset.abs() > spec.label_exclusion);
                    ticks.push(TapeTick {
                        offset,
                        value: t,
                        label: labelled.then(|| label_for(spec.labels, t)),
                    });
                }
                t += spec.step;
            }
        }
        TapeScale::Circular { margin } => {
            let mut t = -margin;
            while t <= 360 + margin {
                let norm = t.rem_euclid(360);
                let offset = heading_diff(norm as f32, value) * k;
                if offset.abs() <= spec.band {
                    let labelled = norm % spec.label_step == 0;
                    ticks.push(TapeTick {
                        offset,
                        value: norm,
                        label: labelled.then(|| label_for(spec.labels, norm)),
                    });
                }
                t += spec.step;
            }
        }
    }
    ticks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_diff_takes_the_short_way_round() {
        assert_eq!(heading_diff(2.0, 359.0), 3.0);
        assert_eq!(heading_diff(359.0, 1.0), -2.0);
        assert_eq!(heading_diff(180.0, 0.0), 180.0);
        assert_eq!(heading_diff(90.0, 90.0), 0.0);
    }

    #[test]
    fn negative_speed_lays_out_like_zero() {
        let spec = TapeSpec::speed();
        assert_eq!(layout(&spec, -5.0), layout(&spec, 0.0));
    }

    #[test]
    fn altitude_label_suppressed_at_the_datum() {
        let spec = TapeSpec::altitude();
        let ticks = layout(&spec, 8500.0);
        let datum = ticks.iter().find(|t| t.value == 8500).unwrap();
        assert_eq!(datum.offset, 0.0);
        assert!(datum.label.is_none());
        let above = ticks.iter().find(|t| t.value == 9000).unwrap();
        assert_eq!(above.label.as_deref(), Some("9000"));
    }

    #[test]
    fn only_label_step_multiples_are_labelled() {
        let ticks = layout(&TapeSpec::altitude(), 1000.0);
        for tick in &ticks {
            if tick.value % 500 != 0 {
                assert!(tick.label.is_none(), "unexpected label at {}", tick.value);
            }
        }
    }

    #[test]
    fn ticks_sweep_in_ascending_value_order() {
        let ticks = layout(&TapeSpec::speed(), 100.0);
        assert!(!ticks.is_empty());
        assert!(ticks.windows(2).all(|w| w[0].value < w[1].value));
    }

    #[test]
    fn vertical_band_culls_to_sixty_units() {
        let ticks = layout(&TapeSpec::altitude(), 8500.0);
        assert!(ticks.iter().all(|t| t.offset.abs() <= 60.0));
        assert!(ticks.iter().any(|t| t.value == 7900));
        assert!(!ticks.iter().any(|t| t.value == 7800));
    }

    #[test]
    fn heading_tape_wraps_across_north() {
        let spec = TapeSpec::heading();
        let ticks = layout(&spec, 359.0);
        let east_of_north = ticks.iter().find(|t| t.value == 5).unwrap();
        assert_eq!(east_of_north.offset, 12.0);
        let west_of_north = ticks.iter().find(|t| t.value == 355).unwrap();
        assert_eq!(west_of_north.offset, -8.0);
        assert!(ticks.iter().all(|t| (0..360).contains(&t.value)));
    }

    #[test]
    fn cardinal_points_label_as_letters() {
        let spec = TapeSpec::heading();
        let ticks = layout(&spec, 90.0);
        let center = ticks.iter().find(|t| t.offset == 0.0).unwrap();
        assert_eq!(center.label.as_deref(), Some("E"));
        let plain = ticks.iter().find(|t| t.value == 100).unwrap();
        assert_eq!(plain.label.as_deref(), Some("10"));
        let padded = ticks.iter().find(|t| t.value == 80).unwrap();
        assert_eq!(padded.label.as_deref(), Some("08"));
    }
}
