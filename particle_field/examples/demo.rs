//! Morphs a seeded field Heart → Saturn, then opens a simulated hand.

use particle_field::{GestureSignal, ParticleField};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shape_sampler::ShapeKind;

fn mean_radius(field: &ParticleField) -> f32 {
    let sum: f32 = field.current().iter()
        .map(|[x, y, z]| (x * x + y * y + z * z).sqrt())
        .sum();
    sum / field.len().max(1) as f32
}

fn main() {
    println!("\n=== ParticleField Morph Demo ===\n");

    let mut rng = StdRng::seed_from_u64(11);
    let mut field = ParticleField::with_rng(ShapeKind::Heart, 2000, &mut rng);
    let mut t = 0.0_f32;

    // ── 1. Ambient breathing ─────────────────────────────────────────────
    println!("1. Ambient breathing (no hand)");
    for second in 1..=3 {
        for _ in 0..60 {
            t += 1.0 / 60.0;
            field.advance_with_rng(t, &GestureSignal::NONE, &mut rng);
        }
        println!("   t = {}s  mean r = {:.3}  yaw = {:.3}", second, mean_radius(&field), field.rotation().y);
    }
    println!();

    // ── 2. Shape switch morphs in place ──────────────────────────────────
    println!("2. Heart → Saturn");
    field.set_shape_with_rng(ShapeKind::Saturn, &mut rng);
    for step in 1..=4 {
        for _ in 0..30 {
            t += 1.0 / 60.0;
            field.advance_with_rng(t, &GestureSignal::NONE, &mut rng);
        }
        println!("   +{:>3} frames  mean r = {:.3}", step * 30, mean_radius(&field));
    }
    println!();

    // ── 3. Open hand, tilted up-right ────────────────────────────────────
    println!("3. Open hand at (0.6, 0.4)");
    let hand = GestureSignal::tracked(1.0, 0.6, 0.4);
    for _ in 0..120 {
        t += 1.0 / 60.0;
        field.advance_with_rng(t, &hand, &mut rng);
    }
    let rot = field.rotation();
    println!("   mean r = {:.3}  pitch = {:+.3}  roll = {:+.3}\n", mean_radius(&field), rot.x, rot.z);
}
