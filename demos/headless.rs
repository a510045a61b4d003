//! Composes one frame without opening a window and prints a summary of
//! the primitive list, layer by layer.

use pfd::{DrawPrimitive, FlightState, Pfd, PfdConfig};

fn main() {
    let mut pfd = Pfd::new(PfdConfig::default());
    pfd.update_state(
        FlightState::builder()
            .pitch(5.0)
            .roll(-12.0)
            .altitude(8500.0)
            .speed(100.0)
            .heading(90.0)
            .qnh(29.92)
            .oat(8.0)
            .flight_mode("CRUISE".to_string())
            .clock("12:00:00".to_string())
            .rpm([2500, 2480, 2520, 2390])
            .battery(4.8)
            .prop_count(4)
            .build(),
    )
    .expect("finite sample");

    let scene = pfd.render(1024, 768);
    println!(
        "canvas 1024x768 -> inscribed square {}px, {} primitives",
        scene.viewport.side,
        scene.primitives.len()
    );

    let mut lines = 0;
    let mut paths = 0;
    let mut arcs = 0;
    let mut rects = 0;
    let mut texts = 0;
    for primitive in &scene.primitives {
        match primitive {
            DrawPrimitive::Clear(_) => {}
            DrawPrimitive::Line { .. } => lines += 1,
            DrawPrimitive::Path { .. } => paths += 1,
            DrawPrimitive::Arc { .. } => arcs += 1,
            DrawPrimitive::Rect { .. } => rects += 1,
            DrawPrimitive::Text { .. } => texts += 1,
        }
    }
    println!("lines: {lines}");
    println!("paths: {paths}");
    println!("arcs:  {arcs}");
    println!("rects: {rects}");
    println!("texts: {texts}");
}
