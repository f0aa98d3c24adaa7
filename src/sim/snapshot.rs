//! Read-only views of the session for the renderer and HUD
//!
//! The renderer lives outside this crate; it gets one serialisable
//! `FrameSnapshot` per frame and never queries the session directly.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::obstacles::ObstacleKind;
use crate::characters::CharacterId;
use super::shootout::TargetState;
use super::state::{GamePhase, GameSession};

/// Numbers shown on the HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub phase: GamePhase,
    pub score: u64,
    pub distance_km: f32,
    /// Pursuit meter, 0..=100
    pub pursuit_percent: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub pos: Vec3,
    pub lane: usize,
    pub scale_y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    pub id: u32,
    pub kind: ObstacleKind,
    pub pos: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChaserView {
    pub slot: usize,
    pub pos: Vec3,
    pub red_light_on: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetView {
    pub id: u32,
    pub pos: Vec2,
    /// 1.0 while live, fading to 0.0 after a hit
    pub opacity: f32,
}

/// Everything the renderer draws in one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub hud: Hud,
    /// Selected driver; the renderer looks up its colours in the roster
    pub character: CharacterId,
    /// World scroll speed (0 while the shootout runs)
    pub world_speed: f32,
    pub player: PlayerView,
    /// Active obstacles only
    pub obstacles: Vec<ObstacleView>,
    pub chasers: Vec<ChaserView>,
    pub targets: Vec<TargetView>,
}

impl GameSession {
    pub fn hud(&self) -> Hud {
        Hud {
            phase: self.phase(),
            score: self.score().floor() as u64,
            distance_km: self.distance_km(),
            pursuit_percent: self.pursuit.meter(),
        }
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        use crate::consts::TARGET_HIT_FADE;

        FrameSnapshot {
            hud: self.hud(),
            character: self.character,
            world_speed: self.world_speed(),
            player: PlayerView {
                pos: self.player.position(),
                lane: self.player.lane,
                scale_y: self.player.render_scale_y(),
            },
            obstacles: self
                .obstacles
                .active()
                .map(|o| ObstacleView {
                    id: o.id,
                    kind: o.kind,
                    pos: o.pos,
                })
                .collect(),
            chasers: self
                .pursuit
                .chasers
                .iter()
                .map(|c| ChaserView {
                    slot: c.slot,
                    pos: c.pos,
                    red_light_on: c.red_light_on,
                })
                .collect(),
            targets: self
                .shootout
                .targets()
                .iter()
                .map(|t| TargetView {
                    id: t.id,
                    pos: t.pos,
                    opacity: match t.state {
                        TargetState::Live => 1.0,
                        TargetState::Hit { fade } => (fade / TARGET_HIT_FADE).clamp(0.0, 1.0),
                    },
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{InputEvent, TickInput, tick};

    #[test]
    fn test_snapshot_lists_active_only() {
        let mut state = GameSession::new(3);
        state.start_run();
        for _ in 0..200 {
            tick(&mut state, &TickInput::default(), 0.05);
        }
        let snapshot = state.snapshot();
        assert_eq!(snapshot.obstacles.len(), state.obstacles.active_count());
        assert_eq!(snapshot.chasers.len(), crate::consts::CHASER_COUNT);
    }

    #[test]
    fn test_hud_reports_run_numbers() {
        let mut state = GameSession::new(4);
        tick(&mut state, &vec![InputEvent::Start].into(), 0.05);
        for _ in 0..100 {
            tick(&mut state, &TickInput::default(), 0.05);
        }
        let hud = state.hud();
        assert_eq!(hud.phase, GamePhase::Playing);
        assert_eq!(hud.score, state.score().floor() as u64);
        assert!((hud.distance_km - state.distance() / 1000.0).abs() < 1e-6);
        assert_eq!(hud.pursuit_percent, state.pursuit.meter());
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = GameSession::new(5);
        let json = serde_json::to_string(&state.snapshot()).expect("serialize");
        let back: FrameSnapshot = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.hud.phase, GamePhase::Idle);
        assert_eq!(back.player.lane, 1);
        assert_eq!(back.character, state.character());
        assert!(json.contains("\"character\":\"byron\""));
    }
}
