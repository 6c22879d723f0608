//! Per-tick driver between the render loop and the particle field.
//!
//! The render loop calls [`AnimationController::tick`] once per displayed
//! frame with seconds since start.  The controller reads the newest gesture
//! snapshot from the slot, applies any shape or colour change queued since
//! the last tick, advances the field, and then exposes the buffers through
//! [`AnimationController::frame`].  It never draws anything itself.

use rand::rngs::ThreadRng;
use rand::Rng;

use particle_field::{Color, FieldRotation, GestureSignal, ParticleField, RenderParams};
use shape_sampler::{sample_named_with_rng, ShapeKind};

use crate::gesture::GestureSlot;

/// What the renderer consumes after a tick.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    /// Flat `[x, y, z, …]` positions, 3 × count floats.
    pub positions: &'a [f32],
    pub rotation:  FieldRotation,
    pub color:     &'a Color,
    /// The gesture snapshot this frame was computed from.
    pub gesture:   GestureSignal,
}

#[derive(Clone, Debug, PartialEq)]
enum ShapeRequest {
    Kind(ShapeKind),
    /// An identifier that did not parse; becomes an all-origin target.
    Unknown(String),
}

pub struct AnimationController<R = ThreadRng> {
    field:         ParticleField,
    color:         Color,
    slot:          GestureSlot,
    rng:           R,
    pending_shape: Option<ShapeRequest>,
    pending_color: Option<Color>,
    last_elapsed:  f32,
    last_gesture:  GestureSignal,
    frames:        u64,
}

impl AnimationController<ThreadRng> {
    pub fn new(params: RenderParams, shape: ShapeKind, slot: GestureSlot) -> Self {
        Self::with_rng(params, shape, slot, rand::thread_rng())
    }
}

impl<R: Rng> AnimationController<R> {
    pub fn with_rng(params: RenderParams, shape: ShapeKind, slot: GestureSlot, mut rng: R) -> Self {
        let field = ParticleField::with_rng(shape, params.count, &mut rng);
        log::info!("particle field: {} × {} points, colour {}", shape, params.count, params.color);
        AnimationController {
            field,
            color:         params.color,
            slot,
            rng,
            pending_shape: None,
            pending_color: None,
            last_elapsed:  0.0,
            last_gesture:  GestureSignal::NONE,
            frames:        0,
        }
    }

    // ── control surface ──────────────────────────────────────────────────

    /// Queue a shape switch for the next tick.
    pub fn select_shape(&mut self, shape: ShapeKind) {
        self.pending_shape = Some(ShapeRequest::Kind(shape));
    }

    /// Queue a shape switch by name; unknown names collapse to the origin.
    pub fn select_shape_named(&mut self, name: &str) {
        self.pending_shape = Some(match ShapeKind::from_name(name) {
            Some(shape) => ShapeRequest::Kind(shape),
            None        => ShapeRequest::Unknown(name.to_string()),
        });
    }

    /// Queue a colour change for the next tick.
    pub fn set_color(&mut self, color: Color) {
        self.pending_color = Some(color);
    }

    // ── per-frame ────────────────────────────────────────────────────────

    /// Advance one frame.  `elapsed` is clamped so it never runs backwards.
    pub fn tick(&mut self, elapsed: f32) {
        let elapsed = if elapsed.is_finite() && elapsed >= self.last_elapsed {
            elapsed
        } else {
            log::debug!("clock went from {} to {}; holding", self.last_elapsed, elapsed);
            self.last_elapsed
        };
        self.last_elapsed = elapsed;

        self.apply_pending();

        let gesture = self.slot.latest();
        self.field.advance_with_rng(elapsed, &gesture, &mut self.rng);
        self.last_gesture = gesture;
        self.frames += 1;
    }

    fn apply_pending(&mut self) {
        match self.pending_shape.take() {
            Some(ShapeRequest::Kind(shape)) => {
                if self.field.set_shape_with_rng(shape, &mut self.rng) {
                    log::info!("shape → {}", shape);
                }
            }
            Some(ShapeRequest::Unknown(name)) => {
                let target = sample_named_with_rng(&name, self.field.len(), &mut self.rng);
                if let Err(e) = self.field.set_target(target) {
                    log::warn!("shape {:?} not applied: {}", name, e);
                }
            }
            None => {}
        }

        if let Some(color) = self.pending_color.take() {
            log::info!("colour → {}", color);
            self.color = color;
        }
    }

    // ── outputs ──────────────────────────────────────────────────────────

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            positions: self.field.current().as_slice(),
            rotation:  self.field.rotation(),
            color:     &self.color,
            gesture:   self.last_gesture,
        }
    }

    pub fn positions(&self)    -> &[f32]           { self.field.current().as_slice() }
    pub fn rotation(&self)     -> FieldRotation    { self.field.rotation() }
    pub fn color(&self)        -> &Color           { &self.color }
    /// Shape on screen; `None` after an unknown identifier.
    pub fn shape(&self)        -> Option<ShapeKind> { self.field.shape() }
    pub fn last_gesture(&self) -> GestureSignal    { self.last_gesture }
    pub fn frame_count(&self)  -> u64              { self.frames }
    pub fn field(&self)        -> &ParticleField   { &self.field }

    /// The shape that will be showing after the next tick.
    pub fn selected_shape(&self) -> Option<ShapeKind> {
        match &self.pending_shape {
            Some(ShapeRequest::Kind(shape)) => Some(*shape),
            Some(ShapeRequest::Unknown(_))  => None,
            None                            => self.field.shape(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::DetectorStatus;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn make(shape: ShapeKind) -> (AnimationController<StdRng>, GestureSlot) {
        let slot = GestureSlot::new();
        let params = RenderParams { color: Color::new("#ff00ff"), count: 300 };
        let ctl = AnimationController::with_rng(params, shape, slot.clone(), StdRng::seed_from_u64(3));
        (ctl, slot)
    }

    #[test]
    fn frame_exposes_buffers_and_color() {
        let (mut ctl, _slot) = make(ShapeKind::Heart);
        ctl.tick(0.016);
        let f = ctl.frame();
        assert_eq!(f.positions.len(), 900);
        assert_eq!(f.color.as_str(), "#ff00ff");
        assert!(f.rotation.y > 0.0);
        assert_eq!(ctl.frame_count(), 1);
    }

    #[test]
    fn shape_change_waits_for_next_tick() {
        let (mut ctl, _slot) = make(ShapeKind::Heart);
        ctl.select_shape(ShapeKind::Saturn);
        assert_eq!(ctl.shape(), Some(ShapeKind::Heart));
        assert_eq!(ctl.selected_shape(), Some(ShapeKind::Saturn));
        ctl.tick(0.016);
        assert_eq!(ctl.shape(), Some(ShapeKind::Saturn));
    }

    #[test]
    fn color_change_waits_for_next_tick() {
        let (mut ctl, _slot) = make(ShapeKind::Heart);
        ctl.set_color(Color::new("#ffff00"));
        assert_eq!(ctl.color().as_str(), "#ff00ff");
        ctl.tick(0.016);
        assert_eq!(ctl.color().as_str(), "#ffff00");
    }

    #[test]
    fn reads_latest_gesture_from_slot() {
        let (mut ctl, slot) = make(ShapeKind::Sphere);
        ctl.tick(0.0);
        assert!(!ctl.last_gesture().detected);

        slot.publish(GestureSignal::tracked(0.2, 0.0, 0.0), DetectorStatus::Ready);
        slot.publish(GestureSignal::tracked(1.0, 0.4, -0.4), DetectorStatus::Ready);
        ctl.tick(0.016);
        assert_eq!(ctl.last_gesture(), GestureSignal::tracked(1.0, 0.4, -0.4));
        assert!(ctl.rotation().x < 0.0);
        assert!(ctl.rotation().z < 0.0);
    }

    #[test]
    fn rotation_survives_shape_and_color_switches() {
        let (mut ctl, slot) = make(ShapeKind::Heart);
        slot.publish(GestureSignal::tracked(0.7, 0.5, 0.5), DetectorStatus::Ready);
        for i in 0..30 { ctl.tick(i as f32 / 60.0); }
        let before = ctl.rotation();

        slot.publish(GestureSignal::NONE, DetectorStatus::Ready);
        ctl.select_shape(ShapeKind::Fireworks);
        ctl.set_color(Color::new("#ffffff"));
        ctl.tick(0.6);
        let after = ctl.rotation();
        assert_eq!(after.x, before.x);
        assert_eq!(after.z, before.z);
        assert!(after.y > before.y);
    }

    #[test]
    fn unknown_shape_name_collapses_to_origin() {
        let (mut ctl, _slot) = make(ShapeKind::Heart);
        ctl.select_shape_named("Buddha");
        assert_eq!(ctl.selected_shape(), None);
        ctl.tick(0.0);
        assert_eq!(ctl.shape(), None);
        assert!(ctl.field().target().as_slice().iter().all(|&c| c == 0.0));
        assert_eq!(ctl.positions().len(), 900);

        // A valid name afterwards resamples a real shape.
        ctl.select_shape_named("spiral");
        ctl.tick(0.0);
        assert_eq!(ctl.shape(), Some(ShapeKind::Spiral));
    }

    #[test]
    fn clock_never_runs_backwards() {
        let (mut ctl, _slot) = make(ShapeKind::Heart);
        ctl.tick(2.0);
        ctl.tick(1.0);
        ctl.tick(f32::NAN);
        assert_eq!(ctl.last_elapsed, 2.0);
        assert!(ctl.positions().iter().all(|c| c.is_finite()));
    }
}
