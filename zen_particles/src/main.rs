//! zen_particles — interactive entry point.

use env_logger::Env;
use particle_field::{Color, DEFAULT_COUNT};
use shape_sampler::ShapeKind;
use std::io::{self, Write};
use zen_particles::app::{run, AppConfig, MAX_COUNT};
use zen_particles::palette::PALETTE;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Zen Particles — Gesture-Driven Particle Field         ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Mouse simulation  (use --features leap for hardware)");
    println!();

    let cfg = match AppConfig::from_args(std::env::args().skip(1)) {
        Ok(Some(cfg)) => {
            println!("  Starting: {} in {}, {} points\n", cfg.shape, cfg.color, cfg.count);
            cfg
        }
        Ok(None) => configure_interactively(),
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Usage: zen_particles [--quick] [--shape NAME] [--color #RRGGBB] [--count N] [--seed N]");
            std::process::exit(1);
        }
    };

    println!();
    println!("  Opening preview window…");
    println!();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn configure_interactively() -> AppConfig {
    let shape = pick_shape();
    let color = pick_color();
    let count: usize = read_line(&format!("  Point count 1–{} (default {}): ", MAX_COUNT, DEFAULT_COUNT))
        .trim().parse().unwrap_or(DEFAULT_COUNT).clamp(1, MAX_COUNT);

    AppConfig { shape, color, count, seed: None }
}

fn pick_shape() -> ShapeKind {
    let all = ShapeKind::all();
    print!("   ");
    for (i, s) in all.iter().enumerate() {
        print!(" {}.{}", i + 1, s);
    }
    println!();
    read_line("  Shape (1–6, default 1): ")
        .trim().parse::<usize>().ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| all.get(i).copied())
        .unwrap_or(ShapeKind::Heart)
}

fn pick_color() -> Color {
    print!("   ");
    for (i, c) in PALETTE.iter().enumerate() {
        print!(" {}.{}", i + 1, c);
    }
    println!();
    read_line("  Colour (1–6, default 1): ")
        .trim().parse::<usize>().ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| PALETTE.get(i))
        .map(|c| Color::new(*c))
        .unwrap_or_default()
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
