//! Raw input mapping
//!
//! Pure functions over plain values so they test natively; the wasm
//! front-end only forwards `KeyboardEvent::code`, touch coordinates and
//! `DeviceOrientationEvent::gamma` here.

use crate::sim::{GamePhase, InputEvent};

/// Minimum swipe travel in CSS pixels
pub const SWIPE_MIN_DISTANCE: f32 = 10.0;
/// Minimum swipe speed in pixels per millisecond
pub const SWIPE_MIN_VELOCITY: f32 = 0.3;
/// Tilt (degrees from baseline) that counts as a lane change
pub const TILT_THRESHOLD: f64 = 18.0;
/// Lockout after a tilt lane change
pub const TILT_COOLDOWN_MS: f64 = 350.0;

/// Map a `KeyboardEvent::code` to an input for the current phase
pub fn key_to_input(code: &str, phase: GamePhase) -> Option<InputEvent> {
    match (code, phase) {
        ("Enter" | "Space", GamePhase::Idle) => Some(InputEvent::Start),
        ("Enter" | "Space", GamePhase::GameOver) => Some(InputEvent::Restart),
        ("Escape" | "KeyP", GamePhase::Playing) => Some(InputEvent::Pause),
        ("Escape" | "KeyP", GamePhase::Paused) => Some(InputEvent::Resume),
        (_, GamePhase::Playing) => match code {
            "ArrowLeft" | "KeyA" => Some(InputEvent::LaneLeft),
            "ArrowRight" | "KeyD" => Some(InputEvent::LaneRight),
            "ArrowUp" | "KeyW" => Some(InputEvent::Jump),
            "ArrowDown" | "KeyS" => Some(InputEvent::Duck),
            _ => None,
        },
        _ => None,
    }
}

/// A completed touch gesture in CSS pixels (y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swipe {
    pub dx: f32,
    pub dy: f32,
    pub duration_ms: f32,
}

impl Swipe {
    pub fn distance(&self) -> f32 {
        self.dx.hypot(self.dy)
    }

    /// Pixels per millisecond
    pub fn velocity(&self) -> f32 {
        self.distance() / self.duration_ms.max(1.0)
    }
}

/// Map a swipe to a lane change, jump or duck along its dominant axis
///
/// Short or slow gestures return `None`; the caller treats them as taps.
pub fn swipe_to_input(swipe: Swipe) -> Option<InputEvent> {
    if swipe.distance() < SWIPE_MIN_DISTANCE || swipe.velocity() < SWIPE_MIN_VELOCITY {
        return None;
    }
    let event = if swipe.dx.abs() >= swipe.dy.abs() {
        if swipe.dx < 0.0 {
            InputEvent::LaneLeft
        } else {
            InputEvent::LaneRight
        }
    } else if swipe.dy < 0.0 {
        InputEvent::Jump
    } else {
        InputEvent::Duck
    };
    Some(event)
}

/// Device-tilt lane steering
///
/// The first reading becomes the baseline. Leaning past the threshold shifts
/// one lane and locks steering for a cooldown. Readings during the cooldown
/// are dropped; when it ends, the reading that caused the shift becomes the
/// new baseline.
#[derive(Debug, Clone, Default)]
pub struct TiltSteering {
    baseline: Option<f64>,
    /// Reading that started the cooldown, and when the cooldown ends
    cooldown: Option<(f64, f64)>,
}

impl TiltSteering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the baseline (new run, or steering re-enabled)
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }

    /// Feed one `gamma` reading (degrees) at host time `now_ms`
    pub fn update(&mut self, gamma: f64, now_ms: f64) -> Option<InputEvent> {
        if let Some((trigger, until)) = self.cooldown {
            if now_ms < until {
                return None;
            }
            self.cooldown = None;
            self.baseline = Some(trigger);
        }

        let Some(baseline) = self.baseline else {
            self.baseline = Some(gamma);
            return None;
        };

        let tilt = gamma - baseline;
        let event = if tilt > TILT_THRESHOLD {
            InputEvent::LaneRight
        } else if tilt < -TILT_THRESHOLD {
            InputEvent::LaneLeft
        } else {
            return None;
        };
        self.cooldown = Some((gamma, now_ms + TILT_COOLDOWN_MS));
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_by_phase() {
        assert_eq!(key_to_input("Enter", GamePhase::Idle), Some(InputEvent::Start));
        assert_eq!(key_to_input("Space", GamePhase::GameOver), Some(InputEvent::Restart));
        assert_eq!(key_to_input("ArrowLeft", GamePhase::Playing), Some(InputEvent::LaneLeft));
        assert_eq!(key_to_input("ArrowUp", GamePhase::Playing), Some(InputEvent::Jump));
        assert_eq!(key_to_input("ArrowDown", GamePhase::Playing), Some(InputEvent::Duck));
        assert_eq!(key_to_input("Escape", GamePhase::Playing), Some(InputEvent::Pause));
        assert_eq!(key_to_input("KeyP", GamePhase::Paused), Some(InputEvent::Resume));
    }

    #[test]
    fn test_steering_keys_ignored_outside_play() {
        assert_eq!(key_to_input("ArrowLeft", GamePhase::Paused), None);
        assert_eq!(key_to_input("ArrowRight", GamePhase::Shootout), None);
        assert_eq!(key_to_input("Escape", GamePhase::Shootout), None);
        assert_eq!(key_to_input("Enter", GamePhase::Playing), None);
        assert_eq!(key_to_input("KeyQ", GamePhase::Playing), None);
    }

    #[test]
    fn test_swipe_directions() {
        let swipe = |dx, dy| swipe_to_input(Swipe { dx, dy, duration_ms: 50.0 });
        assert_eq!(swipe(-60.0, 5.0), Some(InputEvent::LaneLeft));
        assert_eq!(swipe(60.0, -10.0), Some(InputEvent::LaneRight));
        assert_eq!(swipe(3.0, -60.0), Some(InputEvent::Jump));
        assert_eq!(swipe(-3.0, 60.0), Some(InputEvent::Duck));
    }

    #[test]
    fn test_short_or_slow_swipe_is_not_a_swipe() {
        assert_eq!(swipe_to_input(Swipe { dx: 6.0, dy: 0.0, duration_ms: 5.0 }), None);
        // 60px over 1s is 0.06 px/ms
        assert_eq!(swipe_to_input(Swipe { dx: 60.0, dy: 0.0, duration_ms: 1000.0 }), None);
    }

    #[test]
    fn test_tilt_baseline_and_cooldown() {
        let mut tilt = TiltSteering::new();
        assert_eq!(tilt.update(5.0, 0.0), None);
        assert_eq!(tilt.baseline(), Some(5.0));

        assert_eq!(tilt.update(20.0, 16.0), None);
        assert_eq!(tilt.update(24.0, 32.0), Some(InputEvent::LaneRight));

        // Locked out, even leaning further
        assert_eq!(tilt.update(40.0, 100.0), None);
        assert_eq!(tilt.update(26.0, 300.0), None);
        assert_eq!(tilt.baseline(), Some(5.0));

        // Cooldown over: the reading that shifted lanes is the new baseline
        assert_eq!(tilt.update(25.0, 400.0), None);
        assert_eq!(tilt.baseline(), Some(24.0));
        assert_eq!(tilt.update(7.0, 420.0), None);
        assert_eq!(tilt.update(5.0, 436.0), Some(InputEvent::LaneLeft));
    }

    #[test]
    fn test_tilt_reset_forgets_baseline() {
        let mut tilt = TiltSteering::new();
        tilt.update(10.0, 0.0);
        tilt.reset();
        assert_eq!(tilt.baseline(), None);
        assert_eq!(tilt.update(-30.0, 10.0), None);
        assert_eq!(tilt.baseline(), Some(-30.0));
    }
}
