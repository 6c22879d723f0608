//! Interactive field stepper: switch shapes, run frames with or without a
//! simulated hand, and watch the cloud converge.

use particle_field::{expansion_factor, GestureSignal, ParticleField, DEFAULT_COUNT};
use shape_sampler::ShapeKind;
use std::io::{self, Write};

const FRAME_SECS: f32 = 1.0 / 60.0;

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║              Particle Field Frame Stepper                ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    let shape = pick_shape("Initial");
    let count: usize = read_line(&format!("  Point count (default {}): ", DEFAULT_COUNT))
        .trim().parse().unwrap_or(DEFAULT_COUNT);
    let mut field = ParticleField::new(shape, count.min(200_000));
    let mut gesture = GestureSignal::NONE;
    let mut frame: u64 = 0;

    println!("\n  ✓  {}\n", status(&field, &gesture, frame));

    loop {
        print_ops_menu();
        let choice = read_line("Command: ").trim().to_ascii_lowercase();

        match choice.as_str() {
            "1" => {
                let n: u64 = read_line("  Frames to run (default 60): ").trim().parse().unwrap_or(60);
                for _ in 0..n {
                    frame += 1;
                    field.advance(frame as f32 * FRAME_SECS, &gesture);
                }
                println!("  {}", status(&field, &gesture, frame));
            }
            "2" => {
                let next = pick_shape("New");
                if field.set_shape(next) {
                    println!("  Target is now {} — run frames to watch it morph.", next);
                } else {
                    println!("  Already showing {}.", next);
                }
            }
            "3" => {
                let pinch: f32 = read_line("  Pinch 0–1 (default 0.5): ").trim().parse().unwrap_or(0.5);
                let x: f32 = read_line("  Hand x −1…1 (default 0): ").trim().parse().unwrap_or(0.0);
                let y: f32 = read_line("  Hand y −1…1 (default 0): ").trim().parse().unwrap_or(0.0);
                gesture = GestureSignal::tracked(pinch, x, y);
                println!("  Hand placed: pinch {:.2}  at ({:.2}, {:.2})", gesture.pinch, gesture.x, gesture.y);
            }
            "4" => {
                gesture = GestureSignal::NONE;
                println!("  Hand removed — ambient breathing.");
            }
            "5" => {
                println!("  {}", status(&field, &gesture, frame));
            }
            "q" | "quit" => {
                println!("\nGoodbye!\n");
                break;
            }
            _ => println!("  ⚠  Unknown command."),
        }
        println!();
    }
}

fn status(field: &ParticleField, gesture: &GestureSignal, frame: u64) -> String {
    let rot = field.rotation();
    let shape = field.shape().map(|s| s.name()).unwrap_or("custom");
    let t = frame as f32 * FRAME_SECS;
    format!(
        "{}  frame {}  expansion {:+.3}  mean gap {:.4}  rot (x {:+.3}, y {:+.3}, z {:+.3})",
        shape, frame, expansion_factor(t, gesture), mean_gap(field), rot.x, rot.y, rot.z,
    )
}

/// Mean per-point distance from current to target.
fn mean_gap(field: &ParticleField) -> f32 {
    if field.is_empty() { return 0.0; }
    let total: f32 = field.current().iter()
        .zip(field.target().iter())
        .map(|(c, t)| {
            let (dx, dy, dz) = (c[0] - t[0], c[1] - t[1], c[2] - t[2]);
            (dx * dx + dy * dy + dz * dz).sqrt()
        })
        .sum();
    total / field.len() as f32
}

fn print_ops_menu() {
    println!("  ┌─────────────────────────────────────────────────────────┐");
    println!("  │  1. Run N frames              4. Remove hand (ambient)  │");
    println!("  │  2. Switch shape              5. Status                 │");
    println!("  │  3. Place simulated hand      q. Quit                   │");
    println!("  └─────────────────────────────────────────────────────────┘");
}

fn pick_shape(label: &str) -> ShapeKind {
    loop {
        println!("  {} shape:", label);
        for (i, s) in ShapeKind::all().iter().enumerate() {
            println!("    {}. {}", i + 1, s.name());
        }
        match read_line("  Choice (1–6): ").trim().parse::<usize>() {
            Ok(n @ 1..=6) => return ShapeKind::all()[n - 1],
            _ => println!("  ⚠  Please enter 1–6.\n"),
        }
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
