//! # zen_particles
//!
//! A gesture-driven particle cloud.  Thousands of points morph between six
//! procedural shapes, breathe while no hand is visible, and expand and tilt
//! with a tracked hand.
//!
//! ## Hand → field mapping
//!
//! | Hand | Effect |
//! |---|---|
//! | Thumb–index gap | Pinch 0…1: the cloud expands up to 4× and spins faster |
//! | Horizontal position | Roll (left/right tilt) |
//! | Vertical position | Pitch (forward/back tilt) |
//! | No hand | Ambient breathing and a slow steady spin |
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: the mouse stands in for the hand.
//! * `leap` — **Hardware mode**: polls a real LeapMotion controller via LeapC.
//!
//! ### Preview window controls
//!
//! | Input | Action |
//! |---|---|
//! | `1`–`6` | Heart, Flower, Saturn, Spiral, Fireworks, Sphere |
//! | `Tab` | Next shape |
//! | `C` | Next palette colour |
//! | Left-drag | Place the simulated hand |
//! | Wheel / `Up` / `Down` | Open or close the simulated fingers |
//! | `Q` / `Esc` | Quit |

pub mod error;
pub mod gesture;
pub mod palette;
pub mod controller;
pub mod visualizer;
pub mod app;
