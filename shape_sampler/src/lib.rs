//! # shape_sampler
//!
//! Stochastic point sampling over six procedural 3-D shapes.  Every point is
//! drawn independently, so a call is pure apart from the random source and
//! can be re-run synchronously on every shape switch.
//!
//! | Shape | Method | Extent |
//! |---|---|---|
//! | [`ShapeKind::Sphere`]    | inverse-cosine latitude + uniform longitude | shell, r = 2 |
//! | [`ShapeKind::Heart`]     | parametric heart curve, cube-root radial fill, depth noise | scale 0.15, depth ±0.75 |
//! | [`ShapeKind::Flower`]    | `r = 1.5 + 0.5·sin(3θ)·sinφ` over full spherical angles | r ∈ [1, 2] |
//! | [`ShapeKind::Saturn`]    | 60 % tilted flat ring, 40 % planet shell | ring r ∈ [3, 4.5], planet r = 1.8 |
//! | [`ShapeKind::Spiral`]    | 8-turn spiral, radius = 0.2·angle, in-plane fuzz | fuzz ±0.5, height ±1 |
//! | [`ShapeKind::Fireworks`] | burst with `r = 4·√u` shell bias | r ≤ 4 |
//!
//! ## Quick start
//!
//! ```rust
//! use shape_sampler::{sample, ShapeKind};
//!
//! let buf = sample(ShapeKind::Sphere, 100);
//! assert_eq!(buf.len(), 100);
//! assert_eq!(buf.as_slice().len(), 300);
//! ```

use std::f32::consts::{PI, TAU};

use rand::Rng;

// ════════════════════════════════════════════════════════════════════════════
// ShapeKind
// ════════════════════════════════════════════════════════════════════════════

/// The six procedural shapes a field can morph between.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Heart,
    Flower,
    Saturn,
    Spiral,
    Fireworks,
    Sphere,
}

impl ShapeKind {
    /// All shapes, in control-panel order.
    pub fn all() -> [ShapeKind; 6] {
        [
            ShapeKind::Heart,
            ShapeKind::Flower,
            ShapeKind::Saturn,
            ShapeKind::Spiral,
            ShapeKind::Fireworks,
            ShapeKind::Sphere,
        ]
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Heart     => "Heart",
            ShapeKind::Flower    => "Flower",
            ShapeKind::Saturn    => "Saturn",
            ShapeKind::Spiral    => "Spiral",
            ShapeKind::Fireworks => "Fireworks",
            ShapeKind::Sphere    => "Sphere",
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<ShapeKind> {
        let name = name.trim();
        ShapeKind::all()
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name))
    }

    /// The next shape in control-panel order, wrapping around.
    pub fn next(self) -> ShapeKind {
        let all = ShapeKind::all();
        let i = all.iter().position(|&s| s == self).unwrap_or(0);
        all[(i + 1) % all.len()]
    }
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PointBuffer
// ════════════════════════════════════════════════════════════════════════════

/// Fixed-length, flat `[x0, y0, z0, x1, y1, z1, …]` coordinate buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointBuffer {
    coords: Vec<f32>,
}

impl PointBuffer {
    /// `count` points, all at the origin.
    pub fn zeros(count: usize) -> Self {
        PointBuffer { coords: vec![0.0; count * 3] }
    }

    /// Wrap an existing flat buffer.  Trailing coordinates that do not make
    /// up a whole point are dropped.
    pub fn from_flat(mut coords: Vec<f32>) -> Self {
        let whole = coords.len() / 3 * 3;
        coords.truncate(whole);
        PointBuffer { coords }
    }

    /// Number of points (not floats).
    pub fn len(&self) -> usize { self.coords.len() / 3 }

    pub fn is_empty(&self) -> bool { self.coords.is_empty() }

    /// The flat coordinate slice, length `3 × len()`.
    pub fn as_slice(&self) -> &[f32] { &self.coords }

    /// Mutable flat access for the owner of a live buffer.
    pub fn as_mut_slice(&mut self) -> &mut [f32] { &mut self.coords }

    /// Point `i` as `[x, y, z]`.  Panics if `i >= len()`.
    pub fn point(&self, i: usize) -> [f32; 3] {
        let i3 = i * 3;
        [self.coords[i3], self.coords[i3 + 1], self.coords[i3 + 2]]
    }

    /// Iterate points as `[x, y, z]`.
    pub fn iter(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.coords.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    fn push(&mut self, p: [f32; 3]) {
        self.coords.extend_from_slice(&p);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Sampling entry points
// ════════════════════════════════════════════════════════════════════════════

/// Sample `count` points of `shape` using the thread-local generator.
pub fn sample(shape: ShapeKind, count: usize) -> PointBuffer {
    let mut rng = rand::thread_rng();
    sample_with_rng(shape, count, &mut rng)
}

/// Sample `count` points of `shape` with a caller-supplied generator.
pub fn sample_with_rng<R: Rng + ?Sized>(shape: ShapeKind, count: usize, rng: &mut R) -> PointBuffer {
    let point: fn(&mut R) -> [f32; 3] = match shape {
        ShapeKind::Sphere    => sphere_point,
        ShapeKind::Heart     => heart_point,
        ShapeKind::Flower    => flower_point,
        ShapeKind::Saturn    => saturn_point,
        ShapeKind::Spiral    => spiral_point,
        ShapeKind::Fireworks => fireworks_point,
    };

    let mut buf = PointBuffer { coords: Vec::with_capacity(count * 3) };
    for _ in 0..count {
        buf.push(point(rng));
    }
    buf
}

/// Sample by display name.  Unrecognized names yield `count` points at the
/// origin rather than an error.
pub fn sample_named(name: &str, count: usize) -> PointBuffer {
    sample_named_with_rng(name, count, &mut rand::thread_rng())
}

pub fn sample_named_with_rng<R: Rng + ?Sized>(name: &str, count: usize, rng: &mut R) -> PointBuffer {
    match ShapeKind::from_name(name) {
        Some(shape) => sample_with_rng(shape, count, rng),
        None => {
            log::warn!("unknown shape {:?}; using {} origin points", name, count);
            PointBuffer::zeros(count)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Per-shape samplers
// ════════════════════════════════════════════════════════════════════════════

const SPHERE_RADIUS:    f32 = 2.0;
const HEART_SCALE:      f32 = 0.15;
const HEART_THICKNESS:  f32 = 1.5;
const FLOWER_BASE:      f32 = 1.5;
const FLOWER_AMPLITUDE: f32 = 0.5;
const FLOWER_PETALS:    f32 = 3.0;
const RING_PROBABILITY: f32 = 0.6;
const RING_INNER:       f32 = 3.0;
const RING_WIDTH:       f32 = 1.5;
const RING_HEIGHT:      f32 = 0.1;
const RING_TILT:        f32 = PI / 6.0;
const PLANET_RADIUS:    f32 = 1.8;
const SPIRAL_TURNS:     f32 = 8.0; // × 2π = 16π of sweep
const SPIRAL_GROWTH:    f32 = 0.2;
const SPIRAL_FUZZ:      f32 = 1.0;
const SPIRAL_HEIGHT:    f32 = 2.0;
const FIREWORKS_RADIUS: f32 = 4.0;

/// Uniform point on a sphere shell of radius `r`.
fn shell_point<R: Rng + ?Sized>(rng: &mut R, r: f32) -> [f32; 3] {
    let theta = rng.gen::<f32>() * TAU;
    // 2u − 1 ∈ [−1, 1) keeps acos in-domain
    let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();
    [
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin(),
        r * phi.cos(),
    ]
}

fn sphere_point<R: Rng + ?Sized>(rng: &mut R) -> [f32; 3] {
    shell_point(rng, SPHERE_RADIUS)
}

fn heart_point<R: Rng + ?Sized>(rng: &mut R) -> [f32; 3] {
    let t = rng.gen::<f32>() * TAU;
    // cube root spreads points through the volume instead of the outline
    let fill = rng.gen::<f32>().cbrt();

    let x_base = 16.0 * t.sin().powi(3);
    let y_base = 13.0 * t.cos()
        - 5.0 * (2.0 * t).cos()
        - 2.0 * (3.0 * t).cos()
        - (4.0 * t).cos();

    [
        x_base * HEART_SCALE * fill,
        y_base * HEART_SCALE * fill,
        (rng.gen::<f32>() - 0.5) * HEART_THICKNESS * fill,
    ]
}

fn flower_point<R: Rng + ?Sized>(rng: &mut R) -> [f32; 3] {
    let u = rng.gen::<f32>() * TAU;
    let v = rng.gen::<f32>() * PI;
    let r = FLOWER_BASE + FLOWER_AMPLITUDE * (FLOWER_PETALS * u).sin() * v.sin();
    [
        r * v.sin() * u.cos(),
        r * v.sin() * u.sin(),
        r * v.cos(),
    ]
}

fn saturn_point<R: Rng + ?Sized>(rng: &mut R) -> [f32; 3] {
    if rng.gen::<f32>() >= RING_PROBABILITY {
        return shell_point(rng, PLANET_RADIUS);
    }

    let theta = rng.gen::<f32>() * TAU;
    let r = RING_INNER + rng.gen::<f32>() * RING_WIDTH;
    let x = r * theta.cos();
    let z = r * theta.sin();
    let y = (rng.gen::<f32>() - 0.5) * RING_HEIGHT;

    // Tilt about X.
    let (s, c) = RING_TILT.sin_cos();
    [x, y * c - z * s, y * s + z * c]
}

fn spiral_point<R: Rng + ?Sized>(rng: &mut R) -> [f32; 3] {
    let angle = rng.gen::<f32>() * TAU * SPIRAL_TURNS;
    let distance = SPIRAL_GROWTH * angle;
    let fuzz = (rng.gen::<f32>() - 0.5) * SPIRAL_FUZZ;
    let y = (rng.gen::<f32>() - 0.5) * SPIRAL_HEIGHT;
    [
        (distance + fuzz) * angle.cos(),
        y,
        (distance + fuzz) * angle.sin(),
    ]
}

fn fireworks_point<R: Rng + ?Sized>(rng: &mut R) -> [f32; 3] {
    let theta = rng.gen::<f32>() * TAU;
    let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();
    let r = rng.gen::<f32>().sqrt() * FIREWORKS_RADIUS;
    [
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin(),
        r * phi.cos(),
    ]
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded() -> StdRng { StdRng::seed_from_u64(0x5eed) }

    fn radius(p: [f32; 3]) -> f64 {
        let [x, y, z] = p.map(f64::from);
        (x * x + y * y + z * z).sqrt()
    }

    // ── counts and finiteness ────────────────────────────────────────────
    #[test]
    fn every_shape_returns_exact_count() {
        let mut rng = seeded();
        for shape in ShapeKind::all() {
            for count in [0, 1, 7, 1000] {
                let buf = sample_with_rng(shape, count, &mut rng);
                assert_eq!(buf.len(), count, "{} × {}", shape, count);
                assert_eq!(buf.as_slice().len(), count * 3);
            }
        }
    }

    #[test]
    fn every_coordinate_is_finite() {
        let mut rng = seeded();
        for shape in ShapeKind::all() {
            let buf = sample_with_rng(shape, 5000, &mut rng);
            assert!(buf.as_slice().iter().all(|c| c.is_finite()), "{}", shape);
        }
    }

    #[test]
    fn zero_count_is_empty() {
        assert!(sample(ShapeKind::Heart, 0).is_empty());
    }

    // ── per-shape geometry ───────────────────────────────────────────────
    #[test]
    fn sphere_points_lie_on_radius_two() {
        let buf = sample_with_rng(ShapeKind::Sphere, 5000, &mut seeded());
        for p in buf.iter() {
            assert!((radius(p) - 2.0).abs() < 1e-5, "radius {}", radius(p));
        }
    }

    #[test]
    fn fireworks_within_radius_four() {
        let buf = sample_with_rng(ShapeKind::Fireworks, 5000, &mut seeded());
        assert!(buf.iter().all(|p| radius(p) <= 4.0 + 1e-5));
    }

    #[test]
    fn fireworks_biased_toward_shell() {
        // r = 4√u puts 75 % of points beyond r = 2
        let buf = sample_with_rng(ShapeKind::Fireworks, 4000, &mut seeded());
        let outer = buf.iter().filter(|&p| radius(p) > 2.0).count();
        assert!(outer > 2700 && outer < 3300, "outer = {}", outer);
    }

    #[test]
    fn saturn_has_ring_and_planet() {
        let buf = sample_with_rng(ShapeKind::Saturn, 1000, &mut seeded());
        let ring = buf.iter()
            .filter(|&p| (3.0 - 1e-4..=4.5 + 1e-3).contains(&radius(p)))
            .count();
        let planet = buf.iter()
            .filter(|&p| (radius(p) - 1.8).abs() < 1e-4)
            .count();
        assert_eq!(ring + planet, 1000);
        // 60 / 40 split, loosely
        assert!(ring > 520 && ring < 680, "ring = {}", ring);
        assert!(planet > 320, "planet = {}", planet);
    }

    #[test]
    fn saturn_ring_is_tilted_thirty_degrees() {
        // Un-tilting a ring point about X should leave it within the flat band.
        let (s, c) = RING_TILT.sin_cos();
        let buf = sample_with_rng(ShapeKind::Saturn, 2000, &mut seeded());
        for p in buf.iter().filter(|&p| radius(p) > 2.5) {
            let flat_y = p[1] * c + p[2] * s;
            assert!(flat_y.abs() <= 0.05 + 1e-4, "flat y = {}", flat_y);
        }
    }

    #[test]
    fn flower_radius_between_one_and_two() {
        let buf = sample_with_rng(ShapeKind::Flower, 5000, &mut seeded());
        for p in buf.iter() {
            let r = radius(p);
            assert!((1.0 - 1e-4..=2.0 + 1e-4).contains(&r), "r = {}", r);
        }
    }

    #[test]
    fn heart_depth_within_thickness() {
        let buf = sample_with_rng(ShapeKind::Heart, 5000, &mut seeded());
        for p in buf.iter() {
            assert!(p[2].abs() <= 0.75 + 1e-6);
            // |16 sin³t| ≤ 16 → |x| ≤ 2.4
            assert!(p[0].abs() <= 2.4 + 1e-4);
        }
    }

    #[test]
    fn spiral_height_and_extent() {
        let buf = sample_with_rng(ShapeKind::Spiral, 5000, &mut seeded());
        let max_planar = 0.2 * 16.0 * PI + 0.5;
        for p in buf.iter() {
            assert!(p[1].abs() <= 1.0 + 1e-6);
            let planar = (p[0] * p[0] + p[2] * p[2]).sqrt();
            assert!(planar <= max_planar + 1e-3, "planar = {}", planar);
        }
    }

    #[test]
    fn spiral_sweeps_eight_full_turns() {
        // radius 0.2·angle reaches ≈ 10.05 at 16π
        let buf = sample_with_rng(ShapeKind::Spiral, 20_000, &mut seeded());
        let reach = buf.iter()
            .map(|p| (p[0] * p[0] + p[2] * p[2]).sqrt())
            .fold(0.0, f32::max);
        assert!(reach > 9.0, "reach = {}", reach);
    }

    // ── determinism ──────────────────────────────────────────────────────
    #[test]
    fn same_seed_same_points() {
        let a = sample_with_rng(ShapeKind::Spiral, 64, &mut StdRng::seed_from_u64(9));
        let b = sample_with_rng(ShapeKind::Spiral, 64, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    // ── names ────────────────────────────────────────────────────────────
    #[test]
    fn names_parse_case_insensitively() {
        for shape in ShapeKind::all() {
            assert_eq!(ShapeKind::from_name(&shape.name().to_uppercase()), Some(shape));
        }
        assert_eq!(ShapeKind::from_name("buddha"), None);
    }

    #[test]
    fn unknown_name_samples_origin() {
        let buf = sample_named("Buddha", 50);
        assert_eq!(buf.len(), 50);
        assert!(buf.as_slice().iter().all(|&c| c == 0.0));
    }

    #[test]
    fn known_name_samples_shape() {
        let buf = sample_named("sphere", 20);
        assert!(buf.iter().all(|p| (radius(p) - 2.0).abs() < 1e-5));
    }

    #[test]
    fn named_sampling_is_seedable() {
        let by_name = sample_named_with_rng("FLOWER", 128, &mut StdRng::seed_from_u64(21));
        let by_kind = sample_with_rng(ShapeKind::Flower, 128, &mut StdRng::seed_from_u64(21));
        assert_eq!(by_name, by_kind);

        let unknown = sample_named_with_rng("Buddha", 8, &mut StdRng::seed_from_u64(21));
        assert_eq!(unknown, PointBuffer::zeros(8));
    }

    #[test]
    fn next_cycles_through_all() {
        let mut s = ShapeKind::Heart;
        for _ in 0..6 { s = s.next(); }
        assert_eq!(s, ShapeKind::Heart);
        assert_eq!(ShapeKind::Sphere.next(), ShapeKind::Heart);
    }

    #[test]
    fn from_flat_drops_partial_point() {
        let buf = PointBuffer::from_flat(vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.point(0), [1.0, 2.0, 3.0]);
    }
}
