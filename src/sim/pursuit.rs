//! Pursuit meter and the chase formation behind the player
//!
//! Coordinates: the player sits at z = 0 and the road scrolls toward +z, so
//! "behind the player" is positive z. Chasers close in as the meter fills.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::approach;
use crate::consts::*;

/// A chasing car holding one formation slot (and one lane)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chaser {
    pub slot: usize,
    pub pos: Vec3,
    /// Which half of the lightbar is lit (red when true, blue otherwise)
    pub red_light_on: bool,
    flash_timer: f32,
}

impl Chaser {
    fn new(slot: usize) -> Self {
        Self {
            slot,
            pos: Vec3::new(LANES[slot % LANES.len()], PLAYER_BASE_Y, park_z(slot)),
            red_light_on: false,
            flash_timer: 0.0,
        }
    }

    fn lane_x(&self) -> f32 {
        LANES[self.slot % LANES.len()]
    }
}

fn park_z(slot: usize) -> f32 {
    FORMATION_FAR + slot as f32 * FORMATION_PARK_STAGGER
}

/// Formation z for `slot` at meter fraction `pct` (0..1)
pub fn formation_z(slot: usize, pct: f32) -> f32 {
    FORMATION_NEAR + (1.0 - pct) * (FORMATION_FAR - FORMATION_NEAR)
        + slot as f32 * FORMATION_STAGGER
}

/// Escalation state: the heat meter, its one-shot trigger latch, and the chasers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pursuit {
    meter: f32,
    triggered: bool,
    pub chasers: Vec<Chaser>,
}

impl Default for Pursuit {
    fn default() -> Self {
        Self::new()
    }
}

impl Pursuit {
    pub fn new() -> Self {
        Self {
            meter: 0.0,
            triggered: false,
            chasers: (0..CHASER_COUNT).map(Chaser::new).collect(),
        }
    }

    /// Meter value in 0..=100
    pub fn meter(&self) -> f32 {
        self.meter
    }

    /// Whether the shootout trigger has fired and not yet been re-armed
    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    pub fn siren_active(&self) -> bool {
        self.meter > SIREN_THRESHOLD
    }

    pub fn increase(&mut self, amount: f32) {
        self.meter = (self.meter + amount).clamp(0.0, PURSUIT_MAX);
    }

    pub fn decrease(&mut self, amount: f32) {
        self.meter = (self.meter - amount).clamp(0.0, PURSUIT_MAX);
    }

    /// Set the meter, re-arm the trigger and park the chasers
    pub fn reset(&mut self, meter: f32) {
        self.meter = meter.clamp(0.0, PURSUIT_MAX);
        self.triggered = false;
        for chaser in &mut self.chasers {
            chaser.pos.z = park_z(chaser.slot);
        }
    }

    /// Advance one tick. Returns true on the tick the meter trips the trigger.
    ///
    /// The full-meter check runs before the passive drain; draining first
    /// would pull a fresh 100 back under the threshold and the trigger
    /// would never fire.
    pub fn update(&mut self, dt: f32) -> bool {
        let fired = self.meter >= PURSUIT_MAX && !self.triggered;
        if fired {
            self.triggered = true;
        }

        if !self.triggered {
            self.decrease(PURSUIT_DECAY * dt);
        }

        self.update_formation(dt);
        fired
    }

    fn update_formation(&mut self, dt: f32) {
        let pct = self.meter / PURSUIT_MAX;
        // Closer and faster as the chase heats up
        let rate = (0.02 + pct * 0.06) * 60.0 * dt;
        let z_fraction = rate.min(1.0);

        for chaser in &mut self.chasers {
            let target_z = formation_z(chaser.slot, pct);
            chaser.pos.z = approach(chaser.pos.z, target_z, z_fraction);
            chaser.pos.x = approach(chaser.pos.x, chaser.lane_x(), CHASER_LANE_LERP);

            chaser.flash_timer += dt;
            if chaser.flash_timer > LIGHT_FLASH_INTERVAL {
                chaser.flash_timer = 0.0;
                chaser.red_light_on = !chaser.red_light_on;
            }
        }
    }
}
