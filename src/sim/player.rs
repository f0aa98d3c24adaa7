//! Player car motion: lanes, jump arc and duck
//!
//! Lane and vertical state are independent. A lane change is allowed mid-jump,
//! but a jump cannot start while ducking (and vice versa).

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::approach;
use crate::consts::*;

/// Lane change direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneShift {
    Left,
    Right,
}

impl LaneShift {
    /// -1 for left, +1 for right
    pub fn signum(self) -> i8 {
        match self {
            LaneShift::Left => -1,
            LaneShift::Right => 1,
        }
    }
}

/// Vertical state of the car (at most one of jump/duck at a time)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VerticalState {
    Grounded,
    /// Jump arc progress in 0..1
    Jumping { progress: f32 },
    /// Seconds spent ducking so far
    Ducking { elapsed: f32 },
}

/// Things the player model reports back from `update`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    /// A jump arc completed and the car is back on the road
    Landed,
}

/// The player's car
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Discrete lane index (0..LANES.len())
    pub lane: usize,
    /// World x the car is steering toward
    pub target_x: f32,
    /// Smoothed world x
    pub x: f32,
    /// World y (tracks the jump arc and duck)
    pub y: f32,
    pub vertical: VerticalState,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            lane: START_LANE,
            target_x: LANES[START_LANE],
            x: LANES[START_LANE],
            y: PLAYER_BASE_Y,
            vertical: VerticalState::Grounded,
        }
    }
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to the starting lane, on the ground
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_jumping(&self) -> bool {
        matches!(self.vertical, VerticalState::Jumping { .. })
    }

    pub fn is_ducking(&self) -> bool {
        matches!(self.vertical, VerticalState::Ducking { .. })
    }

    /// Move one lane left or right. Returns false at the road edge.
    pub fn shift_lane(&mut self, shift: LaneShift) -> bool {
        let new_lane = match shift {
            LaneShift::Left => self.lane.checked_sub(1),
            LaneShift::Right => Some(self.lane + 1).filter(|&l| l < LANES.len()),
        };
        let Some(lane) = new_lane else {
            return false;
        };
        self.lane = lane;
        self.target_x = LANES[lane];
        true
    }

    /// Start a jump. Returns false while already jumping or ducking.
    pub fn jump(&mut self) -> bool {
        if self.vertical != VerticalState::Grounded {
            return false;
        }
        self.vertical = VerticalState::Jumping { progress: 0.0 };
        true
    }

    /// Start a duck. Returns false while already jumping or ducking.
    pub fn duck(&mut self) -> bool {
        if self.vertical != VerticalState::Grounded {
            return false;
        }
        self.vertical = VerticalState::Ducking { elapsed: 0.0 };
        self.y = PLAYER_DUCK_Y;
        true
    }

    /// Advance lane smoothing and the jump/duck timers
    ///
    /// Lane smoothing closes a fixed fraction of the gap per call, so it is
    /// tied to the call rate rather than to `dt`. The timers use `dt`.
    pub fn update(&mut self, dt: f32) -> Option<PlayerEvent> {
        self.x = approach(self.x, self.target_x, LANE_LERP);

        match self.vertical {
            VerticalState::Grounded => None,
            VerticalState::Jumping { progress } => {
                let progress = progress + dt / JUMP_DURATION;
                if progress >= 1.0 {
                    self.vertical = VerticalState::Grounded;
                    self.y = PLAYER_BASE_Y;
                    Some(PlayerEvent::Landed)
                } else {
                    self.vertical = VerticalState::Jumping { progress };
                    self.y = PLAYER_BASE_Y + jump_height(progress);
                    None
                }
            }
            VerticalState::Ducking { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed >= DUCK_DURATION {
                    self.vertical = VerticalState::Grounded;
                    self.y = PLAYER_BASE_Y;
                } else {
                    self.vertical = VerticalState::Ducking { elapsed };
                }
                None
            }
        }
    }

    /// World position of the car (the car sits at z = 0)
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, 0.0)
    }

    /// Vertical render scale (the car squashes while ducking)
    pub fn render_scale_y(&self) -> f32 {
        if self.is_ducking() { 0.5 } else { 1.0 }
    }

    /// Collision box at the current position
    pub fn hitbox(&self) -> Aabb {
        let height = if self.is_ducking() {
            PLAYER_DUCK_HEIGHT
        } else {
            PLAYER_HEIGHT
        };
        Aabb::new(
            self.position(),
            Vec3::new(PLAYER_WIDTH, height, PLAYER_DEPTH),
        )
    }
}

/// Height above the resting position at jump progress `p` (zero at both ends)
pub fn jump_height(p: f32) -> f32 {
    JUMP_HEIGHT * (std::f32::consts::PI * p.clamp(0.0, 1.0)).sin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_lane_shift_bounds() {
        let mut player = Player::new();
        assert!(player.shift_lane(LaneShift::Left));
        assert_eq!(player.lane, 0);
        assert!(!player.shift_lane(LaneShift::Left));
        assert_eq!(player.lane, 0);

        assert!(player.shift_lane(LaneShift::Right));
        assert!(player.shift_lane(LaneShift::Right));
        assert_eq!(player.lane, 2);
        assert!(!player.shift_lane(LaneShift::Right));
        assert_eq!(player.lane, 2);
        assert_eq!(player.target_x, LANES[2]);
    }

    #[test]
    fn test_lane_smoothing_is_per_call() {
        let mut player = Player::new();
        player.shift_lane(LaneShift::Right);
        // Same number of calls converge the same way regardless of dt
        let mut other = player.clone();
        player.update(0.001);
        other.update(0.05);
        assert!((player.x - other.x).abs() < 1e-6);
        assert!((player.x - 3.5 * LANE_LERP).abs() < 1e-5);

        for _ in 0..200 {
            player.update(0.016);
            assert!(player.x <= LANES[2] + 1e-4, "smoothing overshot");
        }
        assert!((player.x - LANES[2]).abs() < 1e-3);
    }

    #[test]
    fn test_jump_arc_and_landing() {
        let mut player = Player::new();
        assert!(player.jump());
        assert!(!player.jump());

        // Half way through the arc is the peak
        assert_eq!(player.update(JUMP_DURATION / 2.0), None);
        assert!((player.y - (PLAYER_BASE_Y + JUMP_HEIGHT)).abs() < 1e-3);

        assert_eq!(player.update(JUMP_DURATION / 2.0), Some(PlayerEvent::Landed));
        assert_eq!(player.vertical, VerticalState::Grounded);
        assert_eq!(player.y, PLAYER_BASE_Y);
    }

    #[test]
    fn test_jump_and_duck_are_exclusive() {
        let mut player = Player::new();
        assert!(player.duck());
        assert!(!player.jump());
        assert!(player.is_ducking());

        let mut player = Player::new();
        assert!(player.jump());
        assert!(!player.duck());
        assert!(player.is_jumping());
    }

    #[test]
    fn test_lane_shift_allowed_mid_jump() {
        let mut player = Player::new();
        player.jump();
        player.update(0.1);
        assert!(player.shift_lane(LaneShift::Left));
        assert!(player.is_jumping());
    }

    #[test]
    fn test_duck_shrinks_hitbox_then_restores() {
        let mut player = Player::new();
        assert_eq!(player.hitbox().size.y, PLAYER_HEIGHT);
        player.duck();
        assert_eq!(player.hitbox().size.y, PLAYER_DUCK_HEIGHT);
        assert_eq!(player.render_scale_y(), 0.5);

        player.update(DUCK_DURATION * 0.5);
        assert!(player.is_ducking());
        player.update(DUCK_DURATION * 0.5);
        assert!(!player.is_ducking());
        assert_eq!(player.hitbox().size.y, PLAYER_HEIGHT);
        assert_eq!(player.y, PLAYER_BASE_Y);
    }

    #[test]
    fn test_hitbox_follows_jump_height() {
        let mut player = Player::new();
        player.jump();
        player.update(0.3);
        let hitbox = player.hitbox();
        assert!(hitbox.center.y > PLAYER_BASE_Y);
        assert_eq!(hitbox.size.y, PLAYER_HEIGHT);
    }

    #[test]
    fn test_jump_height_profile() {
        assert!(jump_height(0.0).abs() < 1e-6);
        assert!(jump_height(1.0).abs() < 1e-5);
        assert!((jump_height(0.5) - JUMP_HEIGHT).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_lane_stays_in_range(shifts in prop::collection::vec(any::<bool>(), 0..64)) {
            let mut player = Player::new();
            for right in shifts {
                let shift = if right { LaneShift::Right } else { LaneShift::Left };
                player.shift_lane(shift);
                prop_assert!(player.lane < LANES.len());
                prop_assert_eq!(player.target_x, LANES[player.lane]);
            }
        }
    }
}
