//! # particle_field
//!
//! The live simulation state behind the point cloud: a read-only **target**
//! buffer sampled from the selected shape, a **current** buffer that is
//! pulled toward it every frame, and an accumulated whole-field rotation.
//!
//! Morphing and gesture response share one mechanism.  Each frame every
//! point aims at its target scaled by a jittered expansion factor and moves
//! [`DAMPING`] of the remaining distance.  Switching shape only swaps the
//! target, so the cloud flows into the new shape at the same rate.
//!
//! ## Quick start
//!
//! ```rust
//! use particle_field::{GestureSignal, ParticleField};
//! use shape_sampler::ShapeKind;
//!
//! let mut field = ParticleField::new(ShapeKind::Heart, 500);
//! field.advance(0.016, &GestureSignal::NONE);
//! field.set_shape(ShapeKind::Saturn);           // morphs from here on
//! field.advance(0.032, &GestureSignal::tracked(0.8, 0.2, -0.1));
//! assert_eq!(field.current().len(), 500);
//! ```

use std::fmt;

use rand::Rng;
use shape_sampler::{sample_with_rng, PointBuffer, ShapeKind};
use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// Tuning constants
// ════════════════════════════════════════════════════════════════════════════

/// Default point count for a field.
pub const DEFAULT_COUNT: usize = 5000;

/// Fraction of the remaining distance covered per frame, for both positions
/// and pitch/roll.
pub const DAMPING: f32 = 0.05;

/// Expansion per unit of pinch while a hand is tracked.
pub const PINCH_EXPANSION: f32 = 3.0;

/// Amplitude of the idle `sin(t)` breathing.
pub const BREATH_AMPLITUDE: f32 = 0.2;

/// Rotation speed with no hand present.
pub const AMBIENT_SPIN: f32 = 0.1;

/// Rotation speed floor while a hand is tracked (pinch adds on top).
pub const ACTIVE_SPIN: f32 = 0.2;

/// Yaw advanced per frame per unit of rotation speed.
pub const YAW_STEP: f32 = 0.01;

/// Hand position → pitch/roll target gain.
pub const TILT_GAIN: f32 = 0.5;

// ════════════════════════════════════════════════════════════════════════════
// GestureSignal
// ════════════════════════════════════════════════════════════════════════════

/// One snapshot of the external hand detector.
///
/// When `detected` is false the other fields carry no meaning and the field
/// runs in ambient mode.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct GestureSignal {
    pub detected: bool,
    /// 0 = fingers closed, 1 = fully open.
    pub pinch:    f32,
    /// Horizontal hand position, −1 (left) … 1 (right).
    pub x:        f32,
    /// Vertical hand position, −1 (down) … 1 (up).
    pub y:        f32,
}

impl GestureSignal {
    /// No hand.
    pub const NONE: GestureSignal = GestureSignal { detected: false, pinch: 0.0, x: 0.0, y: 0.0 };

    /// A tracked hand, with every value clamped into its contract range.
    /// Non-finite inputs become 0.
    pub fn tracked(pinch: f32, x: f32, y: f32) -> Self {
        GestureSignal {
            detected: true,
            pinch:    clamp_finite(pinch, 0.0, 1.0),
            x:        clamp_finite(x, -1.0, 1.0),
            y:        clamp_finite(y, -1.0, 1.0),
        }
    }
}

fn clamp_finite(v: f32, lo: f32, hi: f32) -> f32 {
    if v.is_finite() { v.clamp(lo, hi) } else { 0.0 }
}

// ════════════════════════════════════════════════════════════════════════════
// FieldRotation
// ════════════════════════════════════════════════════════════════════════════

/// Whole-field Euler angles in radians.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FieldRotation {
    /// Pitch: follows the hand's vertical position.
    pub x: f32,
    /// Yaw: spins continuously.
    pub y: f32,
    /// Roll: follows the hand's horizontal position.
    pub z: f32,
}

// ════════════════════════════════════════════════════════════════════════════
// Render parameters
// ════════════════════════════════════════════════════════════════════════════

/// Opaque colour value handed straight to the renderer (e.g. `"#00ffff"`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Color(String);

impl Color {
    pub fn new(value: impl Into<String>) -> Self { Color(value.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl Default for Color {
    fn default() -> Self { Color::new("#00ffff") }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Colour and point count; fixed for the lifetime of a field.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderParams {
    pub color: Color,
    pub count: usize,
}

impl Default for RenderParams {
    fn default() -> Self {
        RenderParams { color: Color::default(), count: DEFAULT_COUNT }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    /// A replacement target must have as many points as the field.
    #[error("target has {got} points, field has {expected}")]
    LengthMismatch { expected: usize, got: usize },
}

// ════════════════════════════════════════════════════════════════════════════
// Per-frame response curves
// ════════════════════════════════════════════════════════════════════════════

/// How far points are pushed outward this frame.
///
/// Tracked: `pinch × 3` ∈ [0, 3].  Ambient: `sin(t) × 0.2` ∈ [−0.2, 0.2].
pub fn expansion_factor(elapsed: f32, gesture: &GestureSignal) -> f32 {
    if gesture.detected {
        gesture.pinch * PINCH_EXPANSION
    } else {
        elapsed.sin() * BREATH_AMPLITUDE
    }
}

/// Yaw speed scalar for this frame.
pub fn rotation_speed(gesture: &GestureSignal) -> f32 {
    if gesture.detected { ACTIVE_SPIN + gesture.pinch } else { AMBIENT_SPIN }
}

/// Per-point scale given the expansion factor and a uniform sample
/// `u ∈ [0, 1]`.  The jitter covers the upper half of the expansion range:
/// `1 + e × (0.5 + 0.5u)`.
pub fn scale_multiplier(expansion: f32, u: f32) -> f32 {
    1.0 + expansion * (u * 0.5 + 0.5)
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleField
// ════════════════════════════════════════════════════════════════════════════

/// Target + current buffers and rotation for one point cloud.
///
/// `current` is allocated once and only ever mutated in place; its length
/// never changes.  Rotation survives shape switches.
#[derive(Clone, Debug)]
pub struct ParticleField {
    /// `None` once the target was supplied directly via [`set_target`](Self::set_target).
    shape:    Option<ShapeKind>,
    target:   PointBuffer,
    current:  PointBuffer,
    rotation: FieldRotation,
}

impl ParticleField {
    /// Sample `shape` with `count` points; `current` starts on the target.
    pub fn new(shape: ShapeKind, count: usize) -> Self {
        Self::with_rng(shape, count, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(shape: ShapeKind, count: usize, rng: &mut R) -> Self {
        let target = sample_with_rng(shape, count, rng);
        let current = target.clone();
        ParticleField {
            shape: Some(shape),
            target,
            current,
            rotation: FieldRotation::default(),
        }
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn shape(&self)    -> Option<ShapeKind> { self.shape }
    pub fn target(&self)   -> &PointBuffer      { &self.target }
    pub fn current(&self)  -> &PointBuffer      { &self.current }
    pub fn rotation(&self) -> FieldRotation     { self.rotation }
    /// Number of points.
    pub fn len(&self)      -> usize             { self.current.len() }
    pub fn is_empty(&self) -> bool              { self.current.is_empty() }

    // ── target replacement ───────────────────────────────────────────────

    /// Resample the target for `shape`.  Returns false (and leaves the
    /// target alone) if the field already shows that shape.
    pub fn set_shape(&mut self, shape: ShapeKind) -> bool {
        self.set_shape_with_rng(shape, &mut rand::thread_rng())
    }

    pub fn set_shape_with_rng<R: Rng + ?Sized>(&mut self, shape: ShapeKind, rng: &mut R) -> bool {
        if self.shape == Some(shape) {
            return false;
        }
        self.target = sample_with_rng(shape, self.current.len(), rng);
        self.shape = Some(shape);
        log::debug!("field target resampled as {} ({} points)", shape, self.target.len());
        true
    }

    /// Install an externally built target of the same length.
    pub fn set_target(&mut self, target: PointBuffer) -> Result<(), FieldError> {
        if target.len() != self.current.len() {
            return Err(FieldError::LengthMismatch {
                expected: self.current.len(),
                got:      target.len(),
            });
        }
        self.target = target;
        self.shape = None;
        Ok(())
    }

    // ── per-frame update ─────────────────────────────────────────────────

    /// Advance one frame using the thread-local generator for jitter.
    pub fn advance(&mut self, elapsed: f32, gesture: &GestureSignal) {
        self.advance_with_rng(elapsed, gesture, &mut rand::thread_rng());
    }

    /// Advance one frame: pull every point toward its jittered, expanded
    /// target and update the rotation.  `elapsed` is seconds since start.
    pub fn advance_with_rng<R: Rng + ?Sized>(
        &mut self,
        elapsed: f32,
        gesture: &GestureSignal,
        rng:     &mut R,
    ) {
        let expansion = expansion_factor(elapsed, gesture);

        let targets = self.target.as_slice().chunks_exact(3);
        let points  = self.current.as_mut_slice().chunks_exact_mut(3);
        for (p, t) in points.zip(targets) {
            let s = scale_multiplier(expansion, rng.gen::<f32>());
            for k in 0..3 {
                p[k] += (t[k] * s - p[k]) * DAMPING;
            }
        }

        self.rotation.y += rotation_speed(gesture) * YAW_STEP;
        if gesture.detected {
            let pitch = gesture.y * TILT_GAIN;
            let roll  = -gesture.x * TILT_GAIN;
            self.rotation.x += (pitch - self.rotation.x) * DAMPING;
            self.rotation.z += (roll  - self.rotation.z) * DAMPING;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f32::consts::FRAC_PI_2;

    fn rng() -> StdRng { StdRng::seed_from_u64(42) }

    fn max_gap(field: &ParticleField) -> f32 {
        field.current().as_slice().iter()
            .zip(field.target().as_slice())
            .map(|(c, t)| (c - t).abs())
            .fold(0.0, f32::max)
    }

    /// Tracked hand with the fingers closed: expansion is exactly 0.
    fn closed_hand() -> GestureSignal { GestureSignal::tracked(0.0, 0.0, 0.0) }

    // ── response curves ──────────────────────────────────────────────────
    #[test]
    fn ambient_expansion_at_half_pi() {
        let e = expansion_factor(FRAC_PI_2, &GestureSignal::NONE);
        assert!((e - 0.2).abs() < 1e-6);
    }

    #[test]
    fn tracked_full_pinch_expands_by_three() {
        let g = GestureSignal::tracked(1.0, 0.0, 0.0);
        assert_eq!(expansion_factor(123.0, &g), 3.0);
        assert!((rotation_speed(&g) - 1.2).abs() < 1e-6);
    }

    #[test]
    fn ambient_rotation_speed_is_constant() {
        assert_eq!(rotation_speed(&GestureSignal::NONE), 0.1);
    }

    #[test]
    fn scale_multiplier_range_at_full_pinch() {
        for i in 0..=100 {
            let s = scale_multiplier(3.0, i as f32 / 100.0);
            assert!((2.5..=4.0).contains(&s), "s = {}", s);
        }
        assert_eq!(scale_multiplier(3.0, 0.0), 2.5);
        assert_eq!(scale_multiplier(3.0, 1.0), 4.0);
        assert_eq!(scale_multiplier(0.0, 0.7), 1.0);
    }

    #[test]
    fn tracked_clamps_out_of_range_input() {
        let g = GestureSignal::tracked(1.7, -3.0, f32::NAN);
        assert_eq!(g, GestureSignal { detected: true, pinch: 1.0, x: -1.0, y: 0.0 });
    }

    // ── advance: buffers ─────────────────────────────────────────────────
    #[test]
    fn new_field_starts_on_target() {
        let f = ParticleField::with_rng(ShapeKind::Flower, 300, &mut rng());
        assert_eq!(f.current(), f.target());
        assert_eq!(f.rotation(), FieldRotation::default());
    }

    #[test]
    fn advance_mutates_in_place() {
        let mut r = rng();
        let mut f = ParticleField::with_rng(ShapeKind::Heart, 200, &mut r);
        let ptr = f.current().as_slice().as_ptr();
        for frame in 0..10 {
            f.advance_with_rng(frame as f32 / 60.0, &GestureSignal::tracked(0.5, 0.1, 0.1), &mut r);
        }
        f.set_shape_with_rng(ShapeKind::Spiral, &mut r);
        f.advance_with_rng(0.2, &GestureSignal::NONE, &mut r);
        assert_eq!(f.current().as_slice().as_ptr(), ptr);
        assert_eq!(f.current().len(), 200);
        assert_eq!(f.target().len(), 200);
    }

    #[test]
    fn converges_when_expansion_is_zero() {
        let mut r = rng();
        let mut f = ParticleField::with_rng(ShapeKind::Sphere, 500, &mut r);
        // Nudge the target 0.05 away from where the points sit.
        let shifted: Vec<f32> = f.target().as_slice().iter().map(|c| c + 0.05).collect();
        f.set_target(PointBuffer::from_flat(shifted)).unwrap();
        assert!(max_gap(&f) > 0.049);

        for _ in 0..90 {
            f.advance_with_rng(0.0, &closed_hand(), &mut r);
        }
        assert!(max_gap(&f) < 1e-3, "gap = {}", max_gap(&f));
    }

    #[test]
    fn morph_gap_decays_geometrically() {
        let mut r = rng();
        let mut f = ParticleField::with_rng(ShapeKind::Sphere, 500, &mut r);
        f.set_shape_with_rng(ShapeKind::Fireworks, &mut r);
        let start = max_gap(&f);
        for _ in 0..90 {
            f.advance_with_rng(0.0, &closed_hand(), &mut r);
        }
        // (1 − 0.05)^90 ≈ 0.0099
        assert!(max_gap(&f) <= start * 0.011, "{} vs {}", max_gap(&f), start);
    }

    #[test]
    fn nonzero_expansion_never_settles_on_target() {
        let mut r = rng();
        let mut f = ParticleField::with_rng(ShapeKind::Sphere, 100, &mut r);
        for _ in 0..300 {
            f.advance_with_rng(0.0, &GestureSignal::tracked(0.5, 0.0, 0.0), &mut r);
        }
        // Points hover around 1.75–2.5× the sphere, never back on it.
        assert!(max_gap(&f) > 0.5);
    }

    #[test]
    fn full_pinch_step_uses_multiplier_in_range() {
        let mut r = rng();
        let mut f = ParticleField::with_rng(ShapeKind::Sphere, 400, &mut r);
        let before = f.current().clone();
        f.advance_with_rng(0.0, &GestureSignal::tracked(1.0, 0.0, 0.0), &mut r);

        // current starts on target t, so after one step c' = t (1 + (s − 1) × 0.05).
        for (c, t) in f.current().as_slice().iter().zip(before.as_slice()) {
            if t.abs() < 0.1 { continue; }
            let s = (c / t - 1.0) / DAMPING + 1.0;
            assert!((2.5 - 1e-3..=4.0 + 1e-3).contains(&s), "s = {}", s);
        }
    }

    #[test]
    fn set_shape_same_kind_is_noop() {
        let mut r = rng();
        let mut f = ParticleField::with_rng(ShapeKind::Saturn, 50, &mut r);
        let target = f.target().clone();
        assert!(!f.set_shape_with_rng(ShapeKind::Saturn, &mut r));
        assert_eq!(f.target(), &target);
        assert!(f.set_shape_with_rng(ShapeKind::Heart, &mut r));
        assert_eq!(f.shape(), Some(ShapeKind::Heart));
    }

    #[test]
    fn set_shape_keeps_current() {
        let mut r = rng();
        let mut f = ParticleField::with_rng(ShapeKind::Saturn, 50, &mut r);
        let current = f.current().clone();
        f.set_shape_with_rng(ShapeKind::Spiral, &mut r);
        assert_eq!(f.current(), &current);
        assert_ne!(f.target(), &current);
    }

    #[test]
    fn set_target_rejects_wrong_length() {
        let mut f = ParticleField::with_rng(ShapeKind::Heart, 10, &mut rng());
        let err = f.set_target(PointBuffer::zeros(9)).unwrap_err();
        assert_eq!(err, FieldError::LengthMismatch { expected: 10, got: 9 });
        assert_eq!(f.shape(), Some(ShapeKind::Heart));
    }

    #[test]
    fn empty_field_still_rotates() {
        let mut f = ParticleField::with_rng(ShapeKind::Heart, 0, &mut rng());
        f.advance(0.0, &GestureSignal::NONE);
        assert!(f.is_empty());
        assert!((f.rotation().y - 0.001).abs() < 1e-7);
    }

    // ── advance: rotation ────────────────────────────────────────────────
    #[test]
    fn ambient_spin_accumulates_yaw_only() {
        let mut r = rng();
        let mut f = ParticleField::with_rng(ShapeKind::Heart, 10, &mut r);
        for i in 0..100 {
            f.advance_with_rng(i as f32 * 0.016, &GestureSignal::NONE, &mut r);
        }
        let rot = f.rotation();
        assert!((rot.y - 0.1).abs() < 1e-4, "yaw = {}", rot.y);
        assert_eq!(rot.x, 0.0);
        assert_eq!(rot.z, 0.0);
    }

    #[test]
    fn hand_position_pulls_pitch_and_roll() {
        let mut r = rng();
        let mut f = ParticleField::with_rng(ShapeKind::Heart, 10, &mut r);
        let g = GestureSignal::tracked(0.0, 1.0, 1.0);
        f.advance_with_rng(0.0, &g, &mut r);
        let rot = f.rotation();
        assert!((rot.x - 0.025).abs() < 1e-6);
        assert!((rot.z + 0.025).abs() < 1e-6);
        assert!((rot.y - 0.002).abs() < 1e-7);

        for _ in 0..400 { f.advance_with_rng(0.0, &g, &mut r); }
        assert!((f.rotation().x - 0.5).abs() < 1e-3);
        assert!((f.rotation().z + 0.5).abs() < 1e-3);
    }

    #[test]
    fn losing_the_hand_holds_pitch_and_roll() {
        let mut r = rng();
        let mut f = ParticleField::with_rng(ShapeKind::Heart, 10, &mut r);
        for _ in 0..30 {
            f.advance_with_rng(0.0, &GestureSignal::tracked(0.3, -0.6, 0.4), &mut r);
        }
        let held = f.rotation();
        for i in 0..30 {
            f.advance_with_rng(i as f32, &GestureSignal::NONE, &mut r);
        }
        assert_eq!(f.rotation().x, held.x);
        assert_eq!(f.rotation().z, held.z);
        assert!(f.rotation().y > held.y);
    }

    #[test]
    fn shape_switch_preserves_rotation() {
        let mut r = rng();
        let mut f = ParticleField::with_rng(ShapeKind::Heart, 10, &mut r);
        for _ in 0..20 {
            f.advance_with_rng(0.0, &GestureSignal::tracked(0.9, 0.5, 0.5), &mut r);
        }
        let rot = f.rotation();
        f.set_shape_with_rng(ShapeKind::Fireworks, &mut r);
        assert_eq!(f.rotation(), rot);
        f.set_target(PointBuffer::zeros(10)).unwrap();
        assert_eq!(f.rotation(), rot);
    }

    #[test]
    fn same_seed_same_frames() {
        let run = || {
            let mut r = StdRng::seed_from_u64(7);
            let mut f = ParticleField::with_rng(ShapeKind::Spiral, 64, &mut r);
            for i in 0..20 {
                f.advance_with_rng(i as f32 * 0.1, &GestureSignal::NONE, &mut r);
            }
            f.current().clone()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn render_params_defaults() {
        let p = RenderParams::default();
        assert_eq!(p.count, 5000);
        assert_eq!(p.color.as_str(), "#00ffff");
    }
}
