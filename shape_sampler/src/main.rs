//! Interactive menu for exploring the six procedural point shapes.

use shape_sampler::{sample, PointBuffer, ShapeKind};
use std::io::{self, Write};

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║           Procedural Shape Sampler Explorer          ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    loop {
        print_menu();
        let choice = read_line("Select a shape (1–6, or q to quit): ");

        if choice.trim().eq_ignore_ascii_case("q") {
            println!("\nGoodbye!\n");
            break;
        }

        let shape = match choice.trim().parse::<usize>() {
            Ok(n @ 1..=6) => ShapeKind::all()[n - 1],
            _ => { println!("  ⚠  Please enter 1–6 or q.\n"); continue; }
        };

        let n: usize = read_line("  How many points? (default 5000): ")
            .trim().parse().unwrap_or(5000);
        let n = n.min(1_000_000);

        let buf = sample(shape, n);

        println!();
        println!("  ┌─ {} ({} points) ─", shape.name(), buf.len());
        if buf.is_empty() {
            println!("  └─ (nothing sampled)");
            println!();
            continue;
        }

        let (r_min, r_mean, r_max) = radius_stats(&buf);
        let (lo, hi) = bounding_box(&buf);
        println!("  │  radius  min {:>7.3}  mean {:>7.3}  max {:>7.3}", r_min, r_mean, r_max);
        println!("  │  bbox    x [{:>6.2}, {:>6.2}]", lo[0], hi[0]);
        println!("  │          y [{:>6.2}, {:>6.2}]", lo[1], hi[1]);
        println!("  │          z [{:>6.2}, {:>6.2}]", lo[2], hi[2]);
        println!("  │");
        println!("  │  first points:");
        for (i, p) in buf.iter().take(8).enumerate() {
            println!("  │    [{:>2}]  ({:>7.3}, {:>7.3}, {:>7.3})", i, p[0], p[1], p[2]);
        }
        println!("  └─");
        println!();
    }
}

fn radius_stats(buf: &PointBuffer) -> (f32, f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = 0.0_f32;
    let mut sum = 0.0_f64;
    for [x, y, z] in buf.iter() {
        let r = (x * x + y * y + z * z).sqrt();
        min = min.min(r);
        max = max.max(r);
        sum += r as f64;
    }
    (min, (sum / buf.len() as f64) as f32, max)
}

fn bounding_box(buf: &PointBuffer) -> ([f32; 3], [f32; 3]) {
    let mut lo = [f32::INFINITY; 3];
    let mut hi = [f32::NEG_INFINITY; 3];
    for p in buf.iter() {
        for k in 0..3 {
            lo[k] = lo[k].min(p[k]);
            hi[k] = hi[k].max(p[k]);
        }
    }
    (lo, hi)
}

fn print_menu() {
    println!("  ┌──────────────────────────────────────────────────────┐");
    for (i, s) in ShapeKind::all().iter().enumerate() {
        println!("  │  {}. {:48} │", i + 1, s.name());
    }
    println!("  └──────────────────────────────────────────────────────┘");
    println!();
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
