//! Hand tracking → [`GestureSignal`], from LeapMotion hardware or a mouse
//! simulation.
//!
//! Sources run on their own thread and publish into a [`GestureSlot`], a
//! single-slot latest-value cell.  The render loop reads whatever snapshot is
//! newest without blocking; a slightly stale read is smoothed out by the
//! field's damping.  Consumers don't need to know whether the signal came
//! from real hardware or the simulator.

use std::sync::mpsc::Receiver;
use std::sync::{Arc, RwLock};
use std::thread;

use particle_field::GestureSignal;

use crate::error::DetectorError;

// ════════════════════════════════════════════════════════════════════════════
// Landmarks and the pinch adapter
// ════════════════════════════════════════════════════════════════════════════

/// Fingertip distance at or below which the hand counts as fully closed.
pub const PINCH_CLOSED: f32 = 0.02;

/// Pinch per unit of distance above [`PINCH_CLOSED`]; 0.22 reads as fully open.
pub const PINCH_GAIN: f32 = 5.0;

/// A landmark in normalized image space: x, y ∈ [0, 1] with y pointing down,
/// z roughly on the same scale.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self { Landmark { x, y, z } }

    pub fn distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// The two fingertips the gesture is read from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandLandmarks {
    pub thumb_tip: Landmark,
    pub index_tip: Landmark,
}

/// Map thumb–index distance to pinch ∈ [0, 1], linear between 0.02 and 0.22.
pub fn pinch_from_distance(distance: f32) -> f32 {
    if !distance.is_finite() {
        return 0.0;
    }
    ((distance - PINCH_CLOSED) * PINCH_GAIN).clamp(0.0, 1.0)
}

/// Translate one detection result into the signal contract.
///
/// The fingertip midpoint is remapped from `[0,1]×[0,1]` to `[-1,1]×[1,-1]`
/// so that up on screen is positive y.  No hand gives [`GestureSignal::NONE`].
pub fn signal_from_landmarks(hand: Option<&HandLandmarks>) -> GestureSignal {
    let Some(hand) = hand else {
        return GestureSignal::NONE;
    };

    let pinch = pinch_from_distance(hand.thumb_tip.distance(&hand.index_tip));
    let mx = (hand.thumb_tip.x + hand.index_tip.x) / 2.0;
    let my = (hand.thumb_tip.y + hand.index_tip.y) / 2.0;

    GestureSignal::tracked(pinch, (mx - 0.5) * 2.0, -(my - 0.5) * 2.0)
}

// ════════════════════════════════════════════════════════════════════════════
// Detector handle — lazily initialised, permanently disabled on failure
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can report the current hand, if one is visible.
pub trait LandmarkDetector {
    fn detect(&mut self) -> Option<HandLandmarks>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DetectorStatus {
    /// Not brought up yet.
    #[default]
    Initializing,
    Ready,
    /// Init failed; the stream is `detected = false` for good.
    Failed,
}

/// Consecutive failed or non-tracking reads after which a held hand is
/// dropped.  At a 25 ms poll timeout this is about one detection cycle.
pub const MAX_MISSED_READS: u32 = 2;

/// The last hand a polling detector saw.
///
/// A tracking frame replaces it.  A read that fails or carries no tracking
/// data keeps it for up to [`MAX_MISSED_READS`] reads, after which the hand
/// counts as gone, so an unplugged device decays to "no hand".
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeldHand {
    last:   Option<HandLandmarks>,
    missed: u32,
}

impl HeldHand {
    /// A tracking frame arrived; `hand` is `None` if it showed no hand.
    pub fn seen(&mut self, hand: Option<HandLandmarks>) -> Option<HandLandmarks> {
        self.last = hand;
        self.missed = 0;
        self.last
    }

    /// A read produced no tracking data.
    pub fn missed(&mut self) -> Option<HandLandmarks> {
        self.missed = self.missed.saturating_add(1);
        if self.missed >= MAX_MISSED_READS {
            self.last = None;
        }
        self.last
    }
}

type DetectorInit<D> = Box<dyn FnOnce() -> Result<D, DetectorError>>;

enum HandleState<D> {
    Pending(DetectorInit<D>),
    Ready(D),
    Failed,
}

/// Owns a detector that is opened on first use.
///
/// If opening fails the handle logs once and from then on every
/// [`poll`](Self::poll) returns [`GestureSignal::NONE`].
pub struct DetectorHandle<D> {
    state: HandleState<D>,
}

impl<D: LandmarkDetector> DetectorHandle<D> {
    pub fn lazy<F>(init: F) -> Self
    where
        F: FnOnce() -> Result<D, DetectorError> + 'static,
    {
        DetectorHandle { state: HandleState::Pending(Box::new(init)) }
    }

    pub fn status(&self) -> DetectorStatus {
        match self.state {
            HandleState::Pending(_) => DetectorStatus::Initializing,
            HandleState::Ready(_)   => DetectorStatus::Ready,
            HandleState::Failed     => DetectorStatus::Failed,
        }
    }

    /// Run one detection, initialising first if needed.
    pub fn poll(&mut self) -> GestureSignal {
        if matches!(self.state, HandleState::Pending(_)) {
            if let HandleState::Pending(init) = std::mem::replace(&mut self.state, HandleState::Failed) {
                match init() {
                    Ok(detector) => {
                        log::info!("hand detector ready");
                        self.state = HandleState::Ready(detector);
                    }
                    Err(e) => {
                        log::warn!("{}; continuing without hand tracking", e);
                    }
                }
            }
        }

        match &mut self.state {
            HandleState::Ready(detector) => signal_from_landmarks(detector.detect().as_ref()),
            _ => GestureSignal::NONE,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureSlot — single-writer / single-reader latest-value cell
// ════════════════════════════════════════════════════════════════════════════

/// Everything a reader sees in one atomic read.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct GestureSnapshot {
    pub signal: GestureSignal,
    pub status: DetectorStatus,
}

/// Shared cell holding the newest [`GestureSnapshot`].  Writes replace the
/// whole value; reads copy it out.  No queueing and no backpressure.
#[derive(Clone, Debug, Default)]
pub struct GestureSlot {
    inner: Arc<RwLock<GestureSnapshot>>,
}

impl GestureSlot {
    pub fn new() -> Self { Self::default() }

    pub fn publish(&self, signal: GestureSignal, status: DetectorStatus) {
        write_copy(&self.inner, GestureSnapshot { signal, status });
    }

    pub fn snapshot(&self) -> GestureSnapshot { read_copy(&self.inner) }

    /// The newest signal.
    pub fn latest(&self) -> GestureSignal { self.snapshot().signal }
}

fn read_copy<T: Copy>(lock: &RwLock<T>) -> T {
    match lock.read() {
        Ok(guard) => *guard,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

fn write_copy<T: Copy>(lock: &RwLock<T>, value: T) {
    match lock.write() {
        Ok(mut guard) => *guard = value,
        Err(poisoned) => *poisoned.into_inner() = value,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can keep a [`GestureSlot`] up to date.
pub trait GestureSource: Send + 'static {
    fn run(self: Box<Self>, slot: GestureSlot);
}

/// Spawn a gesture source on its own thread and return the slot it feeds.
pub fn spawn_gesture_source<G: GestureSource>(source: G) -> GestureSlot {
    let slot = GestureSlot::new();
    let writer = slot.clone();
    thread::spawn(move || Box::new(source).run(writer));
    slot
}

// ════════════════════════════════════════════════════════════════════════════
// LeapGestureSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Millimetres of LeapMotion space per unit of normalized landmark space.
#[cfg(any(feature = "leap", test))]
const LEAP_SPAN_MM: f32 = 400.0;

/// Palm height (mm above the device) mapped to the bottom of the frame.
#[cfg(any(feature = "leap", test))]
const LEAP_FLOOR_MM: f32 = 80.0;

/// Convert a LeapMotion position (mm, y up, origin at the device) into the
/// normalized image space the pinch adapter expects.  With a 400 mm span a
/// fingertip gap of 8 mm reads as closed and 88 mm as fully open.
#[cfg(any(feature = "leap", test))]
fn leap_to_normalized(x: f32, y: f32, z: f32) -> Landmark {
    Landmark {
        x: x / LEAP_SPAN_MM + 0.5,
        y: 1.0 - (y - LEAP_FLOOR_MM) / LEAP_SPAN_MM,
        z: z / LEAP_SPAN_MM,
    }
}

/// Detector backed by a LeapC connection.
#[cfg(feature = "leap")]
pub struct LeapDetector {
    connection: leaprs::Connection,
    held:       HeldHand,
}

#[cfg(feature = "leap")]
impl LeapDetector {
    pub fn open() -> Result<Self, DetectorError> {
        use leaprs::*;

        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| DetectorError::Init(format!("LeapC connection: {:?}", e)))?;
        connection.open()
            .map_err(|e| DetectorError::Init(format!("LeapMotion device: {:?}", e)))?;
        Ok(LeapDetector { connection, held: HeldHand::default() })
    }
}

#[cfg(feature = "leap")]
impl LandmarkDetector for LeapDetector {
    fn detect(&mut self) -> Option<HandLandmarks> {
        use leaprs::*;

        // Device events and timeouts only briefly hold the last hand.
        let msg = match self.connection.poll(25) {
            Ok(m)  => m,
            Err(_) => return self.held.missed(),
        };
        match msg.event() {
            Event::Tracking(frame) => {
                let hands: Vec<_> = frame.hands().collect();
                self.held.seen(hands.first().and_then(|h| leap_fingertips(h)))
            }
            _ => self.held.missed(),
        }
    }
}

#[cfg(feature = "leap")]
fn leap_fingertips(hand: &leaprs::Hand) -> Option<HandLandmarks> {
    let fingers: Vec<_> = hand.digits().collect();
    if fingers.len() < 2 { return None; }

    let thumb = fingers[0].distal().next_joint();
    let index = fingers[1].distal().next_joint();
    Some(HandLandmarks {
        thumb_tip: leap_to_normalized(thumb.x, thumb.y, thumb.z),
        index_tip: leap_to_normalized(index.x, index.y, index.z),
    })
}

/// Gesture source polling a LeapMotion controller at about camera rate.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
#[cfg(feature = "leap")]
pub struct LeapGestureSource;

#[cfg(feature = "leap")]
impl GestureSource for LeapGestureSource {
    fn run(self: Box<Self>, slot: GestureSlot) {
        use std::time::{Duration, Instant};

        const CADENCE: Duration = Duration::from_millis(33);

        let mut handle = DetectorHandle::lazy(LeapDetector::open);
        loop {
            let started = Instant::now();
            let signal = handle.poll();
            slot.publish(signal, handle.status());
            if handle.status() == DetectorStatus::Failed {
                return;
            }
            if let Some(rest) = CADENCE.checked_sub(started.elapsed()) {
                thread::sleep(rest);
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimGestureSource — mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input from the preview window.
#[derive(Clone, Debug, PartialEq)]
pub enum SimInput {
    /// Hand present at a window position, both axes in [0, 1], y down.
    HandMoved { x: f32, y: f32 },
    /// Hand left the frame.
    HandLifted,
    /// Widen (positive) or narrow (negative) the simulated fingertip gap.
    Spread(f32),
}

/// Fingertip gap at startup: pinch 0.5.
pub const SIM_START_GAP: f32 = 0.12;

/// Largest simulated gap; anything past 0.22 is already fully open.
pub const SIM_MAX_GAP: f32 = 0.3;

/// Gesture source driven by [`SimInput`] events from the visualizer.
///
/// It synthesises thumb and index tips either side of the cursor and runs
/// them through the same adapter as hardware, so the pinch curve is shared.
pub struct SimGestureSource {
    pub rx: Receiver<SimInput>,
}

/// Cursor-driven hand state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimHand {
    pub present: bool,
    pub x:       f32,
    pub y:       f32,
    pub gap:     f32,
}

impl Default for SimHand {
    fn default() -> Self {
        SimHand { present: false, x: 0.5, y: 0.5, gap: SIM_START_GAP }
    }
}

impl SimHand {
    pub fn apply(&mut self, input: &SimInput) {
        match *input {
            SimInput::HandMoved { x, y } => {
                self.present = true;
                self.x = x.clamp(0.0, 1.0);
                self.y = y.clamp(0.0, 1.0);
            }
            SimInput::HandLifted => self.present = false,
            SimInput::Spread(delta) => {
                self.gap = (self.gap + delta).clamp(0.0, SIM_MAX_GAP);
            }
        }
    }

    pub fn landmarks(&self) -> Option<HandLandmarks> {
        if !self.present { return None; }
        let half = self.gap / 2.0;
        Some(HandLandmarks {
            thumb_tip: Landmark::new(self.x - half, self.y, 0.0),
            index_tip: Landmark::new(self.x + half, self.y, 0.0),
        })
    }

    pub fn signal(&self) -> GestureSignal {
        signal_from_landmarks(self.landmarks().as_ref())
    }
}

impl GestureSource for SimGestureSource {
    fn run(self: Box<Self>, slot: GestureSlot) {
        let mut hand = SimHand::default();
        slot.publish(hand.signal(), DetectorStatus::Ready);
        for input in self.rx {
            hand.apply(&input);
            slot.publish(hand.signal(), DetectorStatus::Ready);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
