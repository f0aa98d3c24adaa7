//! Street Pursuit - A three-lane pursuit runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player, obstacles, pursuit, shootout, session)
//! - `platform`: Browser input normalisation
//! - `progress`: Career counters and character unlocks
//! - `settings`: Player preferences
//! - `audio`: Sound cues (Web Audio on wasm32)

pub mod audio;
pub mod characters;
pub mod platform;
pub mod progress;
pub mod settings;
pub mod sim;

pub use characters::{CharacterId, ROSTER};
pub use progress::Progress;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// World x of each lane, left to right
    pub const LANES: [f32; 3] = [-3.5, 0.0, 3.5];
    /// Lane the player starts each run in
    pub const START_LANE: usize = 1;
    /// Fraction of the remaining lane offset closed per update call
    pub const LANE_LERP: f32 = 0.15;

    /// Player car resting height
    pub const PLAYER_BASE_Y: f32 = 0.6;
    /// Player car height while ducking
    pub const PLAYER_DUCK_Y: f32 = 0.3;
    pub const PLAYER_WIDTH: f32 = 1.8;
    pub const PLAYER_HEIGHT: f32 = 1.2;
    pub const PLAYER_DUCK_HEIGHT: f32 = 0.6;
    pub const PLAYER_DEPTH: f32 = 3.5;
    /// Jump arc duration (seconds)
    pub const JUMP_DURATION: f32 = 1.2;
    /// Peak jump height above the resting height
    pub const JUMP_HEIGHT: f32 = 3.0;
    /// Duck hold duration (seconds)
    pub const DUCK_DURATION: f32 = 0.8;

    /// Obstacle pool
    pub const OBSTACLE_POOL_SIZE: usize = 20;
    pub const OBSTACLE_SPAWN_Z: f32 = -280.0;
    /// Obstacles past this z are behind the player and get recycled
    pub const OBSTACLE_RECYCLE_Z: f32 = 20.0;
    /// Where inactive obstacles are parked, out of collision range
    pub const OBSTACLE_PARK_Z: f32 = OBSTACLE_SPAWN_Z - 100.0;
    /// Minimum distance between spawns
    pub const SPAWN_MIN_GAP: f32 = 65.0;
    /// Random extra distance added to each spawn gap
    pub const SPAWN_GAP_JITTER: f32 = 60.0;
    /// Inward shrink of the overlap test (forgives near misses)
    pub const COLLISION_SHRINK: f32 = 0.85;

    /// Pursuit meter
    pub const PURSUIT_MAX: f32 = 100.0;
    /// Passive meter drain per second
    pub const PURSUIT_DECAY: f32 = 0.5;
    /// Meter gained per obstacle hit
    pub const PURSUIT_PER_HIT: f32 = 15.0;
    /// Meter after a won shootout
    pub const PURSUIT_AFTER_SHOOTOUT: f32 = 20.0;
    /// Siren plays above this meter value
    pub const SIREN_THRESHOLD: f32 = 60.0;
    pub const CHASER_COUNT: usize = 3;
    /// Chaser z behind the player at 0% pursuit
    pub const FORMATION_FAR: f32 = 7.0;
    /// Chaser z behind the player at 100% pursuit
    pub const FORMATION_NEAR: f32 = 1.5;
    /// Extra z per formation slot while chasing
    pub const FORMATION_STAGGER: f32 = 1.5;
    /// Extra z per formation slot when parked on reset
    pub const FORMATION_PARK_STAGGER: f32 = 1.8;
    /// Chaser lane approach fraction per update call
    pub const CHASER_LANE_LERP: f32 = 0.05;
    /// Lightbar toggles red/blue at this interval (seconds)
    pub const LIGHT_FLASH_INTERVAL: f32 = 0.3;

    /// Shootout
    pub const SHOOTOUT_MIN_TARGETS: u32 = 3;
    pub const SHOOTOUT_MAX_TARGETS: u32 = 5;
    pub const TARGET_SPAWN_INTERVAL: f32 = 0.4;
    pub const TARGET_LIFETIME: f32 = 2.5;
    /// Fade-out after a hit (visual only)
    pub const TARGET_HIT_FADE: f32 = 0.2;
    /// Target radius in normalised viewport units
    pub const TARGET_RADIUS: f32 = 0.06;
    /// Misses at or above this count lose the shootout
    pub const SHOOTOUT_MISS_LIMIT: u32 = 3;

    /// Session
    pub const START_SPEED: f32 = 40.0;
    pub const MAX_SPEED: f32 = 160.0;
    /// Speed gained per second while playing
    pub const SPEED_ACCEL: f32 = 4.0;
    /// Longest simulated step per frame (seconds)
    pub const MAX_FRAME_DT: f32 = 0.05;
    /// Score gained per unit of distance
    pub const SCORE_PER_DISTANCE: f32 = 0.1;
    /// Camera shake magnitude on an obstacle hit
    pub const HIT_SHAKE: f32 = 0.4;
}

/// Approach `target` by `fraction` of the remaining distance
#[inline]
pub fn approach(current: f32, target: f32, fraction: f32) -> f32 {
    current + (target - current) * fraction
}

/// Normalise `speed` into 0..1 across the playable speed range
#[inline]
pub fn speed_fraction(speed: f32) -> f32 {
    use consts::{MAX_SPEED, START_SPEED};
    ((speed - START_SPEED) / (MAX_SPEED - START_SPEED)).clamp(0.0, 1.0)
}
