//! Software-rendered point-cloud preview using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ ZEN PARTICLES                                                │
//! │ SHAPE: HEART                                                 │
//! │ HAND TRACKING ACTIVE  PINCH 0.42                             │
//! │                                                              │
//! │                      · ·· ·  ·· · ·                          │
//! │                    ·· point cloud ···                        │
//! │                      ·· ····· ···                            │
//! │                                                              │
//! │ 1-6=shape  TAB=next  C=colour  drag=hand  wheel=pinch  Q=quit│
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Points go through the field's Euler rotation (XYZ order), a perspective
//! camera at z = 6 with a 60° vertical field of view, linear fog between
//! depth 5 and 12, and additive blending at 0.8 opacity.

use std::sync::mpsc::Sender;
use std::time::Duration;

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use particle_field::{FieldRotation, GestureSignal};
use shape_sampler::ShapeKind;

use crate::controller::Frame;
use crate::error::AppError;
use crate::gesture::{DetectorStatus, SimInput};
use crate::palette::{add_scaled, parse_hex, PALETTE};

// ════════════════════════════════════════════════════════════════════════════
// Camera and layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:      usize = 960;
pub const WIN_H:      usize = 640;
const BG_COLOR:       u32   = 0x050505;
const HUD_COLOR:      u32   = 0xEEEEEE;
const HUD_DIM:        u32   = 0x777777;
const CAMERA_Z:       f32   = 6.0;
const FOV_Y_DEG:      f32   = 60.0;
const NEAR:           f32   = 0.1;
const FOG_NEAR:       f32   = 5.0;
const FOG_FAR:        f32   = 12.0;
const OPACITY:        f32   = 0.8;
/// World-space point size; drawn with distance attenuation.
const POINT_SIZE:     f32   = 0.06;
const GLYPH_SCALE:    usize = 2;
/// Fingertip gap change per wheel notch or held arrow key.
const SPREAD_STEP:    f32   = 0.005;

// ════════════════════════════════════════════════════════════════════════════
// Projection
// ════════════════════════════════════════════════════════════════════════════

/// Apply an XYZ Euler rotation: the point is turned about Z, then Y, then X.
pub fn rotate(p: [f32; 3], rot: FieldRotation) -> [f32; 3] {
    let [x, y, z] = p;

    let (sz, cz) = rot.z.sin_cos();
    let (x, y) = (x * cz - y * sz, x * sz + y * cz);

    let (sy, cy) = rot.y.sin_cos();
    let (x, z) = (x * cy + z * sy, -x * sy + z * cy);

    let (sx, cx) = rot.x.sin_cos();
    let (y, z) = (y * cx - z * sx, y * sx + z * cx);

    [x, y, z]
}

/// Focal length in pixels for the vertical field of view.
fn focal_px() -> f32 {
    (WIN_H as f32 / 2.0) / (FOV_Y_DEG.to_radians() / 2.0).tan()
}

/// Project a world point to `(screen_x, screen_y, depth)`.  Points behind
/// the near plane give `None`.
pub fn project(p: [f32; 3]) -> Option<(f32, f32, f32)> {
    let depth = CAMERA_Z - p[2];
    if depth < NEAR || !depth.is_finite() {
        return None;
    }
    let f = focal_px();
    let sx = WIN_W as f32 / 2.0 + p[0] * f / depth;
    let sy = WIN_H as f32 / 2.0 - p[1] * f / depth;
    Some((sx, sy, depth))
}

/// 0 at or before the fog start, 1 at or past the fog end.
pub fn fog_factor(depth: f32) -> f32 {
    ((depth - FOG_NEAR) / (FOG_FAR - FOG_NEAR)).clamp(0.0, 1.0)
}

/// On-screen point side length in pixels, never below one.
fn point_px(depth: f32) -> usize {
    let scale = WIN_H as f32 / 2.0;
    (POINT_SIZE * scale / depth).round().max(1.0) as usize
}

// ════════════════════════════════════════════════════════════════════════════
// Input and HUD types
// ════════════════════════════════════════════════════════════════════════════

/// Control-panel actions read from the window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlEvent {
    SelectShape(ShapeKind),
    NextShape,
    NextColor,
    Quit,
}

/// Overlay state for one frame.
#[derive(Clone, Copy, Debug)]
pub struct Hud {
    pub shape:  Option<ShapeKind>,
    pub status: DetectorStatus,
    pub fps:    f32,
}

/// Status line as shown in the overlay.
pub fn tracking_label(status: DetectorStatus, gesture: &GestureSignal) -> &'static str {
    match status {
        DetectorStatus::Initializing => "INITIALIZING VISION",
        DetectorStatus::Failed       => "DETECTOR OFFLINE",
        DetectorStatus::Ready if gesture.detected => "HAND TRACKING ACTIVE",
        DetectorStatus::Ready        => "WAITING FOR HAND",
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:    Window,
    buf:       Vec<u32>,
    sim_tx:    Sender<SimInput>,
    hand_down: bool,
    last_pos:  Option<(f32, f32)>,
    /// Most recently parsed colour string and its pixel value.
    color:     (String, u32),
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>) -> Result<Self, AppError> {
        let mut window = Window::new(
            "Zen Particles",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| AppError::Window(e.to_string()))?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
            hand_down: false,
            last_pos:  None,
            color:     (PALETTE[0].to_string(), 0x00FFFF),
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Read keys and the mouse.  Mouse input goes to the gesture simulator;
    /// key presses come back as control events.
    pub fn poll_input(&mut self) -> Vec<ControlEvent> {
        let mut events = Vec::new();
        if !self.window.is_open() {
            events.push(ControlEvent::Quit);
            return events;
        }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        let held     = |k: Key| self.window.is_key_pressed(k, KeyRepeat::Yes);

        if one_shot(Key::Q) || one_shot(Key::Escape) {
            events.push(ControlEvent::Quit);
        }
        let number_keys = [Key::Key1, Key::Key2, Key::Key3, Key::Key4, Key::Key5, Key::Key6];
        for (key, shape) in number_keys.into_iter().zip(ShapeKind::all()) {
            if one_shot(key) {
                events.push(ControlEvent::SelectShape(shape));
            }
        }
        if one_shot(Key::Tab) {
            events.push(ControlEvent::NextShape);
        }
        if one_shot(Key::C) {
            events.push(ControlEvent::NextColor);
        }

        let mut spread = 0.0;
        if held(Key::Up)   { spread += SPREAD_STEP; }
        if held(Key::Down) { spread -= SPREAD_STEP; }
        if let Some((_, dy)) = self.window.get_scroll_wheel() {
            if dy != 0.0 {
                spread += dy.signum() * SPREAD_STEP;
            }
        }

        self.poll_hand();
        if spread != 0.0 {
            let _ = self.sim_tx.send(SimInput::Spread(spread));
        }

        events
    }

    /// Left button held inside the window places the simulated hand.
    fn poll_hand(&mut self) {
        let down = self.window.get_mouse_down(MouseButton::Left);
        let pos = if down { self.window.get_mouse_pos(MouseMode::Discard) } else { None };

        match pos {
            Some((mx, my)) => {
                let normalized = (mx / WIN_W as f32, my / WIN_H as f32);
                if !self.hand_down || self.last_pos != Some(normalized) {
                    let _ = self.sim_tx.send(SimInput::HandMoved { x: normalized.0, y: normalized.1 });
                    self.last_pos = Some(normalized);
                }
                self.hand_down = true;
            }
            None if self.hand_down => {
                let _ = self.sim_tx.send(SimInput::HandLifted);
                self.hand_down = false;
                self.last_pos = None;
            }
            None => {}
        }
    }

    /// Render one frame.
    pub fn render(&mut self, frame: &Frame<'_>, hud: &Hud) -> Result<(), AppError> {
        // Clear
        self.buf.fill(BG_COLOR);

        // ── Points ────────────────────────────────────────────────────────
        let color = self.point_color(frame.color.as_str());
        for p in frame.positions.chunks_exact(3) {
            let world = rotate([p[0], p[1], p[2]], frame.rotation);
            if let Some((sx, sy, depth)) = project(world) {
                let k = OPACITY * (1.0 - fog_factor(depth));
                if k > 0.0 {
                    self.splat(sx, sy, point_px(depth), color, k);
                }
            }
        }

        // ── HUD ───────────────────────────────────────────────────────────
        let shape = hud.shape.map(|s| s.name()).unwrap_or("none");
        let tracking = tracking_label(hud.status, &frame.gesture);
        self.draw_label("ZEN PARTICLES", 16, 16, HUD_COLOR);
        self.draw_label(&format!("SHAPE: {}", shape), 16, 34, HUD_COLOR);
        let line = if frame.gesture.detected {
            format!("{}  PINCH {:.2}", tracking, frame.gesture.pinch)
        } else {
            tracking.to_string()
        };
        self.draw_label(&line, 16, 52, color);
        self.draw_label(&format!("{:.0} FPS", hud.fps), WIN_W - 80, 16, HUD_DIM);

        // ── Key legend ────────────────────────────────────────────────────
        self.draw_label(
            "1-6=shape  TAB=next  C=colour  drag=hand  wheel/up/down=pinch  Q=quit",
            16, WIN_H - 24, HUD_DIM,
        );

        self.window
            .update_with_buffer(&self.buf, WIN_W, WIN_H)
            .map_err(|e| AppError::Window(e.to_string()))
    }

    /// Pixel value for the colour string, reparsed only when it changes.
    fn point_color(&mut self, color: &str) -> u32 {
        if self.color.0 != color {
            let px = parse_hex(color).unwrap_or_else(|e| {
                log::warn!("{}; drawing in {}", e, PALETTE[0]);
                0x00FFFF
            });
            self.color = (color.to_string(), px);
        }
        self.color.1
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    /// Additively blend a `size × size` square centred on `(sx, sy)`.
    fn splat(&mut self, sx: f32, sy: f32, size: usize, color: u32, k: f32) {
        let half = size as f32 / 2.0;
        let x0 = (sx - half).round();
        let y0 = (sy - half).round();
        if x0 + size as f32 <= 0.0 || y0 + size as f32 <= 0.0 { return; }
        if x0 >= WIN_W as f32 || y0 >= WIN_H as f32 { return; }

        let x0 = x0.max(0.0) as usize;
        let y0 = y0.max(0.0) as usize;
        for row in y0..(y0 + size).min(WIN_H) {
            for col in x0..(x0 + size).min(WIN_W) {
                let i = row * WIN_W + col;
                self.buf[i] = add_scaled(self.buf[i], color, k);
            }
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(WIN_H) {
            for col in x..(x + w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    /// Minimal bitmap font: 3×5 glyphs drawn at [`GLYPH_SCALE`].
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let advance = 4 * GLYPH_SCALE;
        let mut cx = x;
        for ch in text.chars() {
            let bits = glyph(ch);
            for row in 0..5usize {
                for col in 0..3usize {
                    if glyph_lit(bits, row, col) {
                        self.fill_rect(
                            cx + col * GLYPH_SCALE, y + row * GLYPH_SCALE,
                            GLYPH_SCALE, GLYPH_SCALE, color,
                        );
                    }
                }
            }
            cx += advance; // 3 wide + 1 gap
            if cx + advance > WIN_W { break; }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HUD font: 3×5 glyphs packed row-major into 15 bits, top-left bit first
// ────────────────────────────────────────────────────────────────────────────

const GLYPHS: [(char, u16); 38] = [
    ('-', 0b000_000_111_000_000),
    ('.', 0b000_000_000_000_010),
    ('/', 0b001_001_010_100_100),
    ('0', 0b111_101_101_101_111),
    ('1', 0b010_110_010_010_111),
    ('2', 0b111_001_111_100_111),
    ('3', 0b111_001_111_001_111),
    ('4', 0b101_101_111_001_001),
    ('5', 0b111_100_111_001_111),
    ('6', 0b111_100_111_101_111),
    ('7', 0b111_001_001_001_001),
    ('8', 0b111_101_111_101_111),
    ('9', 0b111_101_111_001_111),
    (':', 0b000_010_000_010_000),
    ('=', 0b000_111_000_111_000),
    ('A', 0b111_101_111_101_101),
    ('B', 0b110_101_110_101_110),
    ('C', 0b111_100_100_100_111),
    ('D', 0b110_101_101_101_110),
    ('E', 0b111_100_111_100_111),
    ('F', 0b111_100_111_100_100),
    ('G', 0b111_100_101_101_111),
    ('H', 0b101_101_111_101_101),
    ('I', 0b111_010_010_010_111),
    ('K', 0b101_101_110_101_101),
    ('L', 0b100_100_100_100_111),
    ('N', 0b111_101_101_101_101),
    ('O', 0b111_101_101_101_111),
    ('P', 0b111_101_111_100_100),
    ('Q', 0b111_101_101_111_001),
    ('R', 0b110_101_110_101_101),
    ('S', 0b111_100_111_001_111),
    ('T', 0b111_010_010_010_010),
    ('U', 0b101_101_101_101_111),
    ('V', 0b101_101_101_010_010),
    ('W', 0b101_101_101_111_101),
    ('X', 0b101_101_010_101_101),
    ('Z', 0b111_001_010_100_111),
];

/// Shown for anything the HUD font lacks.
const MISSING_GLYPH: u16 = 0b000_000_010_000_000;

/// Packed glyph for `c`; letters match case-insensitively, space is blank.
fn glyph(c: char) -> u16 {
    if c == ' ' {
        return 0;
    }
    let c = c.to_ascii_uppercase();
    GLYPHS.iter()
        .find(|(g, _)| *g == c)
        .map(|&(_, bits)| bits)
        .unwrap_or(MISSING_GLYPH)
}

/// Whether the pixel at `row` (0–4), `col` (0–2) is lit.
fn glyph_lit(bits: u16, row: usize, col: usize) -> bool {
    bits & (1 << (14 - (row * 3 + col))) != 0
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
