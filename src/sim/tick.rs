//! Per-frame simulation step
//!
//! The host calls `frame` once per animation frame with its timestamp. The
//! step size is clamped so a hitch never produces a giant simulation step.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::player::LaneShift;
use super::state::{GameEvent, GamePhase, GameSession};
use crate::characters::CharacterId;
use crate::consts::*;

/// Normalised discrete input, already mapped from keys/touch/tilt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    Start,
    Pause,
    Resume,
    Restart,
    /// Choose the driver on the start screen
    SelectCharacter(CharacterId),
    LaneLeft,
    LaneRight,
    Jump,
    Duck,
    /// Tap at a normalised viewport point (0..1, y down)
    Tap(Vec2),
}

/// Input queued for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub events: Vec<InputEvent>,
}

impl TickInput {
    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl From<Vec<InputEvent>> for TickInput {
    fn from(events: Vec<InputEvent>) -> Self {
        Self { events }
    }
}

/// Converts host timestamps (ms) into clamped simulation steps
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the last timestamp; the next frame is a zero-length step
    pub fn rebase(&mut self) {
        self.last_ms = None;
    }

    /// Seconds since the previous frame, clamped to `MAX_FRAME_DT`
    pub fn delta(&mut self, now_ms: f64) -> f32 {
        let last = self.last_ms.unwrap_or(now_ms);
        self.last_ms = Some(now_ms);
        (((now_ms - last) / 1000.0) as f32).clamp(0.0, MAX_FRAME_DT)
    }
}

/// Run one animation frame at host time `now_ms`
///
/// Input is applied before the step is measured, so a frame that pauses or
/// resumes never simulates the wall time spent paused.
pub fn frame(state: &mut GameSession, input: &TickInput, now_ms: f64) -> Vec<GameEvent> {
    let step = apply_inputs(state, input);
    if state.phase == GamePhase::Paused {
        state.clock.rebase();
    }
    let dt = state.clock.delta(now_ms);
    if step {
        advance(state, dt);
    }
    state.drain_events()
}

/// Apply queued input, then advance the session by `dt` seconds (clamped)
///
/// A tap that wins the shootout ends the step: the run picks up again on
/// the next call, so the meter leaves the shootout at exactly its reset value.
pub fn tick(state: &mut GameSession, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    if apply_inputs(state, input) {
        advance(state, dt);
    }
    state.drain_events()
}

fn advance(state: &mut GameSession, dt: f32) {
    let dt = dt.clamp(0.0, MAX_FRAME_DT);
    match state.phase {
        GamePhase::Playing => {
            state.time_ticks += 1;
            state.advance_run(dt);
        }
        GamePhase::Shootout => {
            state.time_ticks += 1;
            let events = state.shootout.update(dt, &mut state.rng);
            state.apply_shootout_events(events);
        }
        GamePhase::Idle | GamePhase::Paused | GamePhase::GameOver => {}
    }
}

/// Returns false when the input ended a shootout; that step does not advance
fn apply_inputs(state: &mut GameSession, input: &TickInput) -> bool {
    let before = state.phase;
    for &event in &input.events {
        apply_input(state, event);
    }
    !(before == GamePhase::Shootout && state.phase != GamePhase::Shootout)
}

fn apply_input(state: &mut GameSession, event: InputEvent) {
    match event {
        InputEvent::Start => {
            state.start_run();
        }
        InputEvent::Pause => {
            state.pause();
        }
        InputEvent::Resume => {
            state.resume();
        }
        InputEvent::Restart => {
            state.restart();
        }
        InputEvent::SelectCharacter(character) => {
            state.select_character(character);
        }
        InputEvent::LaneLeft => {
            state.shift_lane(LaneShift::Left);
        }
        InputEvent::LaneRight => {
            state.shift_lane(LaneShift::Right);
        }
        InputEvent::Jump => {
            state.jump();
        }
        InputEvent::Duck => {
            state.duck();
        }
        InputEvent::Tap(point) => {
            state.tap(point);
        }
    }
}
