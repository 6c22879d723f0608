//! Samples every shape with a fixed seed and prints a short profile of each.

use rand::rngs::StdRng;
use rand::SeedableRng;
use shape_sampler::{sample_named, sample_with_rng, ShapeKind};

fn main() {
    println!("\n=== Procedural Shape Demo ===\n");

    let mut rng = StdRng::seed_from_u64(2024);

    for (i, shape) in ShapeKind::all().into_iter().enumerate() {
        let buf = sample_with_rng(shape, 2000, &mut rng);
        let radii: Vec<f32> = buf.iter()
            .map(|[x, y, z]| (x * x + y * y + z * z).sqrt())
            .collect();
        let max = radii.iter().cloned().fold(0.0_f32, f32::max);
        let mean = radii.iter().sum::<f32>() / radii.len() as f32;

        println!("{}. {:<10} mean r = {:>5.2}   max r = {:>5.2}", i + 1, shape.name(), mean, max);
        let p = buf.point(0);
        println!("   first point ({:.3}, {:.3}, {:.3})", p[0], p[1], p[2]);
    }
    println!();

    // Unknown identifiers collapse to the origin.
    let degenerate = sample_named("Buddha", 4);
    println!("\"Buddha\" → {:?}\n", degenerate.as_slice());
}
