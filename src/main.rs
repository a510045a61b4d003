//! Demo shell: opens a window and feeds the display from a simulated
//! telemetry thread, standing in for a real downlink.
//!
//! Optional flags: `--font <path>` for the label font and
//! `--tape-font <path>` for the tape font (falls back to the label font).

use pfd::{FlightState, Pfd, PfdConfig};
use rand::Rng;
use std::env;
use std::fs;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut font_path = None;
    let mut tape_font_path = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--font" => font_path = args.next(),
            "--tape-font" => tape_font_path = args.next(),
            _ => {}
        }
    }

    let mut pfd = Pfd::new(PfdConfig::default());
    if let Some(path) = &font_path {
        pfd.set_primary_font(fs::read(path)?)?;
    }
    if let Some(path) = tape_font_path.as_ref().or(font_path.as_ref()) {
        pfd.set_tape_font(fs::read(path)?)?;
    } else {
        log::warn!("no font given, text layers will be blank (use --font <path>)");
    }

    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let mut rng = rand::rng();
        let mut sim_time = 0.0_f32;
        loop {
            sim_time += 0.02;
            let state = FlightState::builder()
                .pitch(90.0 * (sim_time * 0.2).sin())
                .roll(180.0 * (sim_time * 0.5).sin())
                .altitude(8500.0 + (sim_time * 0.2).sin())
                .speed(70.0 + 230.0 * (sim_time * 0.4).sin())
                .heading((sim_time * 10.0) % 360.0)
                .qnh(29.92)
                .oat(8.0)
                .flight_mode("ATLC Takeoff Active".to_string())
                .clock(clock_text())
                .rpm([
                    2500 + (1560.0 * (sim_time * 0.20).sin()) as i32 + rng.random_range(-20..20),
                    2500 + (1210.0 * (sim_time * 0.25).sin()) as i32 + rng.random_range(-20..20),
                    2500 + (1543.0 * (sim_time * 0.27).sin()) as i32 + rng.random_range(-20..20),
                    2500 + (1673.0 * (sim_time * 0.29).sin()) as i32 + rng.random_range(-20..20),
                ])
                .battery(4.2 + (sim_time * 5.0).sin())
                .prop_count(4)
                .build();
            if sender.send(state).is_err() {
                break;
            }
            thread::sleep(Duration::from_millis(20));
        }
    });

    pfd.show_with_updates(receiver)
}

fn clock_text() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{:02}:{:02}:{:02}", (secs / 3600) % 24, (secs / 60) % 60, secs % 60)
}
