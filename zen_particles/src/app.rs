//! Startup configuration and the main application loop.
//!
//! `run` wires the gesture source, the preview window and the
//! [`AnimationController`] together and drives them once per frame.

use std::sync::mpsc::{self, Receiver};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use particle_field::{Color, RenderParams, DEFAULT_COUNT};
use shape_sampler::ShapeKind;

use crate::controller::AnimationController;
use crate::error::{AppError, ConfigError};
use crate::gesture::{spawn_gesture_source, GestureSlot, SimInput};
use crate::palette::{next_color, parse_hex};
use crate::visualizer::{ControlEvent, Hud, Visualizer};

/// Upper bound on `--count`.
pub const MAX_COUNT: usize = 200_000;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub shape: ShapeKind,
    pub color: Color,
    pub count: usize,
    /// Fixed jitter seed; `None` draws one from the OS.
    pub seed:  Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            shape: ShapeKind::Heart,
            color: Color::default(),
            count: DEFAULT_COUNT,
            seed:  None,
        }
    }
}

impl AppConfig {
    /// Parse command-line flags (program name already stripped).
    ///
    /// No arguments at all means "ask interactively" and gives `Ok(None)`.
    /// `--quick` alone starts with the defaults.
    pub fn from_args<I, S>(args: I) -> Result<Option<AppConfig>, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        if args.is_empty() {
            return Ok(None);
        }

        let mut cfg = AppConfig::default();
        let mut it = args.iter();
        while let Some(flag) = it.next() {
            let mut value = || it.next().ok_or_else(|| ConfigError::MissingValue(flag.clone()));
            match flag.as_str() {
                "--quick" => {}
                "--shape" => {
                    let name = value()?;
                    cfg.shape = ShapeKind::from_name(name)
                        .ok_or_else(|| ConfigError::UnknownShape(name.clone()))?;
                }
                "--color" | "--colour" => cfg.color = Color::new(value()?.as_str()),
                "--count" => {
                    let raw = value()?;
                    cfg.count = raw.parse().map_err(|_| ConfigError::InvalidCount(raw.clone()))?;
                }
                "--seed" => {
                    let raw = value()?;
                    cfg.seed = Some(raw.parse().map_err(|_| ConfigError::InvalidSeed(raw.clone()))?);
                }
                other => return Err(ConfigError::UnknownFlag(other.to_string())),
            }
        }

        cfg.validate()?;
        Ok(Some(cfg))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_hex(self.color.as_str())?;
        if self.count == 0 || self.count > MAX_COUNT {
            return Err(ConfigError::InvalidCount(self.count.to_string()));
        }
        Ok(())
    }

    pub fn render_params(&self) -> RenderParams {
        RenderParams { color: self.color.clone(), count: self.count }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FpsCounter
// ════════════════════════════════════════════════════════════════════════════

/// Frames-per-second over one-second windows.
#[derive(Clone, Debug)]
pub struct FpsCounter {
    window_start: Instant,
    frames:       u32,
    fps:          f32,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        FpsCounter { window_start: now, frames: 0, fps: 0.0 }
    }

    /// Count one frame.  Returns the new rate when a window closes.
    pub fn frame(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let secs = now.saturating_duration_since(self.window_start).as_secs_f32();
        if secs < 1.0 {
            return None;
        }
        self.fps = self.frames as f32 / secs;
        self.frames = 0;
        self.window_start = now;
        Some(self.fps)
    }

    /// Rate over the last completed window; 0 until one completes.
    pub fn fps(&self) -> f32 { self.fps }
}

// ════════════════════════════════════════════════════════════════════════════
// Control events
// ════════════════════════════════════════════════════════════════════════════

/// Apply one control-panel action.  Returns false on quit.
pub fn apply_control<R: Rng>(ctl: &mut AnimationController<R>, event: ControlEvent) -> bool {
    match event {
        ControlEvent::SelectShape(shape) => ctl.select_shape(shape),
        ControlEvent::NextShape => {
            let next = ctl.selected_shape().map(ShapeKind::next).unwrap_or(ShapeKind::Heart);
            ctl.select_shape(next);
        }
        ControlEvent::NextColor => {
            let next = next_color(ctl.color());
            ctl.set_color(next);
        }
        ControlEvent::Quit => return false,
    }
    true
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "leap")]
fn start_gesture_source(_sim_rx: Receiver<SimInput>) -> GestureSlot {
    log::info!("gesture source: LeapMotion");
    spawn_gesture_source(crate::gesture::LeapGestureSource)
}

#[cfg(not(feature = "leap"))]
fn start_gesture_source(sim_rx: Receiver<SimInput>) -> GestureSlot {
    log::info!("gesture source: mouse simulation");
    spawn_gesture_source(crate::gesture::SimGestureSource { rx: sim_rx })
}

/// Run the full application.
///
/// This is the entry point called from `main.rs`.  It creates the gesture
/// source (simulation by default, hardware with `--features leap`), the
/// preview window, and drives the tick/render loop at ~60 fps.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    cfg.validate()?;

    let rng = match cfg.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None       => StdRng::from_entropy(),
    };

    // ── Gesture source ────────────────────────────────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    let slot = start_gesture_source(sim_rx);

    // ── Visualizer (owns the window and the sim input sender) ─────────────
    let mut vis = Visualizer::new(sim_tx)?;

    // ── Controller ────────────────────────────────────────────────────────
    let mut ctl = AnimationController::with_rng(cfg.render_params(), cfg.shape, slot.clone(), rng);

    // ── Main loop ─────────────────────────────────────────────────────────
    let start = Instant::now();
    let mut fps = FpsCounter::new(start);
    'frames: while vis.is_open() {
        // 1. Controls
        for event in vis.poll_input() {
            if !apply_control(&mut ctl, event) {
                break 'frames;
            }
        }

        // 2. Simulation
        ctl.tick(start.elapsed().as_secs_f32());

        // 3. Render
        let hud = Hud { shape: ctl.shape(), status: slot.snapshot().status, fps: fps.fps() };
        vis.render(&ctl.frame(), &hud)?;

        if let Some(rate) = fps.frame(Instant::now()) {
            log::debug!("{:.1} fps, frame {}", rate, ctl.frame_count());
        }
    }

    log::info!("closed after {} frames", ctl.frame_count());
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn parse(args: &[&str]) -> Result<Option<AppConfig>, ConfigError> {
        AppConfig::from_args(args.iter().copied())
    }

    #[test]
    fn no_args_means_interactive() {
        assert_eq!(parse(&[]), Ok(None));
    }

    #[test]
    fn quick_uses_defaults() {
        assert_eq!(parse(&["--quick"]), Ok(Some(AppConfig::default())));
    }

    #[test]
    fn parses_every_flag() {
        let cfg = parse(&["--shape", "saturn", "--color", "#ff4444", "--count", "1200", "--seed", "9"])
            .unwrap()
            .unwrap();
        assert_eq!(cfg.shape, ShapeKind::Saturn);
        assert_eq!(cfg.color.as_str(), "#ff4444");
        assert_eq!(cfg.count, 1200);
        assert_eq!(cfg.seed, Some(9));
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(parse(&["--shape", "Buddha"]), Err(ConfigError::UnknownShape("Buddha".into())));
        assert_eq!(parse(&["--color", "teal"]), Err(ConfigError::InvalidColor("teal".into())));
        assert_eq!(parse(&["--count", "lots"]), Err(ConfigError::InvalidCount("lots".into())));
        assert_eq!(parse(&["--count", "0"]), Err(ConfigError::InvalidCount("0".into())));
        assert_eq!(parse(&["--count", "200001"]), Err(ConfigError::InvalidCount("200001".into())));
        assert_eq!(parse(&["--seed", "-1"]), Err(ConfigError::InvalidSeed("-1".into())));
        assert_eq!(parse(&["--count"]), Err(ConfigError::MissingValue("--count".into())));
        assert_eq!(parse(&["--fullscreen"]), Err(ConfigError::UnknownFlag("--fullscreen".into())));
    }

    #[test]
    fn count_bounds_are_inclusive() {
        assert_eq!(parse(&["--count", "1"]).unwrap().unwrap().count, 1);
        assert_eq!(parse(&["--count", "200000"]).unwrap().unwrap().count, MAX_COUNT);
    }

    #[test]
    fn fps_counter_reports_once_per_second() {
        let t0 = Instant::now();
        let mut fps = FpsCounter::new(t0);
        for i in 1..60 {
            assert_eq!(fps.frame(t0 + Duration::from_millis(i * 16)), None);
        }
        let rate = fps.frame(t0 + Duration::from_secs(1)).unwrap();
        assert!((rate - 60.0).abs() < 1e-3);
        assert_eq!(fps.fps(), rate);
    }

    fn controller() -> AnimationController<StdRng> {
        let params = RenderParams { color: Color::new("#00ffff"), count: 64 };
        AnimationController::with_rng(params, ShapeKind::Sphere, GestureSlot::new(), StdRng::seed_from_u64(1))
    }

    #[test]
    fn next_shape_follows_pending_selection() {
        let mut ctl = controller();
        assert!(apply_control(&mut ctl, ControlEvent::NextShape));
        assert_eq!(ctl.selected_shape(), Some(ShapeKind::Heart));
        // A second press before the tick keeps walking forward.
        apply_control(&mut ctl, ControlEvent::NextShape);
        assert_eq!(ctl.selected_shape(), Some(ShapeKind::Flower));
        ctl.tick(0.0);
        assert_eq!(ctl.shape(), Some(ShapeKind::Flower));
    }

    #[test]
    fn color_cycles_and_quit_stops() {
        let mut ctl = controller();
        apply_control(&mut ctl, ControlEvent::NextColor);
        ctl.tick(0.0);
        assert_eq!(ctl.color().as_str(), "#ff00ff");
        assert!(apply_control(&mut ctl, ControlEvent::SelectShape(ShapeKind::Spiral)));
        assert!(!apply_control(&mut ctl, ControlEvent::Quit));
    }
}
