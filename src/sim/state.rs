//! Game session state and core simulation types
//!
//! One `GameSession` owns every sub-system and the run's RNG. Nothing here is
//! global, so independent sessions can run side by side.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::obstacles::{ObstacleKind, ObstaclePool};
use super::player::{LaneShift, Player};
use super::pursuit::Pursuit;
use super::shootout::{Shootout, ShootoutEvent};
use super::tick::FrameClock;
use crate::characters::CharacterId;
use crate::consts::*;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the player to start (character select, title)
    Idle,
    /// Driving
    Playing,
    /// Frozen mid-run
    Paused,
    /// Pursuit maxed out; tap-the-targets mini-game running
    Shootout,
    /// Run ended
    GameOver,
}

/// Everything the session tells the outside world (audio, camera, HUD, saves)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    /// Driver picked on the start screen (themes the car and pursuers)
    CharacterSelected { character: CharacterId },
    LaneChanged { lane: usize },
    /// Camera roll cue toward the lane change (-1 left, +1 right)
    CameraLean { direction: i8 },
    CameraShake { magnitude: f32 },
    Jumped,
    Landed,
    Ducked,
    ObstacleHit { kind: ObstacleKind },
    SirenOn,
    SirenOff,
    EngineStart,
    EngineStop,
    ShootoutStarted { total_targets: u32 },
    TargetSpawned { id: u32 },
    TargetHit { id: u32 },
    TargetMissed { id: u32 },
    /// Shootout won; the run continues
    ShootoutWon,
    RunEnded { score: u64, distance_km: f32 },
}

/// Complete state of one play session
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Seed of the current run
    pub seed: u64,
    pub(crate) rng: Pcg32,
    /// Driver for the next (or current) run
    pub(crate) character: CharacterId,
    pub(crate) phase: GamePhase,
    pub(crate) score: f32,
    /// Distance travelled this run
    pub(crate) distance: f32,
    pub(crate) speed: f32,
    pub player: Player,
    pub obstacles: ObstaclePool,
    pub pursuit: Pursuit,
    pub shootout: Shootout,
    pub(crate) clock: FrameClock,
    pub(crate) siren_on: bool,
    /// Shootouts won this run
    pub(crate) shootout_wins: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) events: Vec<GameEvent>,
}

impl GameSession {
    /// Create an idle session; the obstacle pool is allocated here, once
    pub fn new(seed: u64) -> Self {
        let rng = Pcg32::seed_from_u64(seed);
        let obstacles = ObstaclePool::new(OBSTACLE_POOL_SIZE);
        Self {
            seed,
            rng,
            character: CharacterId::default(),
            phase: GamePhase::Idle,
            score: 0.0,
            distance: 0.0,
            speed: START_SPEED,
            player: Player::new(),
            obstacles,
            pursuit: Pursuit::new(),
            shootout: Shootout::new(),
            clock: FrameClock::new(),
            siren_on: false,
            shootout_wins: 0,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    pub fn character(&self) -> CharacterId {
        self.character
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn distance_km(&self) -> f32 {
        self.distance / 1000.0
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Speed the world scrolls at (zero while the shootout plays out)
    pub fn world_speed(&self) -> f32 {
        match self.phase {
            GamePhase::Playing => self.speed,
            _ => 0.0,
        }
    }

    /// Engine drone level, 0 at start speed to 1 at max speed
    pub fn engine_level(&self) -> f32 {
        crate::speed_fraction(self.speed)
    }

    pub fn shootout_wins(&self) -> u32 {
        self.shootout_wins
    }

    /// Take the events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub(crate) fn set_phase(&mut self, to: GamePhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        log::info!("Phase {:?} -> {:?}", from, to);
        self.emit(GameEvent::PhaseChanged { from, to });
    }

    fn set_siren(&mut self, on: bool) {
        if self.siren_on == on {
            return;
        }
        self.siren_on = on;
        self.emit(if on {
            GameEvent::SirenOn
        } else {
            GameEvent::SirenOff
        });
    }

    /// Reseed for a fresh run
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
    }

    // === Session transitions ===

    /// Pick the driver (Idle only; unlock rules belong to `Progress`)
    pub fn select_character(&mut self, character: CharacterId) -> bool {
        if self.phase != GamePhase::Idle {
            return false;
        }
        if self.character != character {
            self.character = character;
            self.emit(GameEvent::CharacterSelected { character });
        }
        true
    }

    /// Idle -> Playing: fresh score, speed and sub-systems
    pub fn start_run(&mut self) -> bool {
        if self.phase != GamePhase::Idle {
            return false;
        }
        self.score = 0.0;
        self.distance = 0.0;
        self.speed = START_SPEED;
        self.shootout_wins = 0;
        self.player.reset();
        self.obstacles.reset();
        self.pursuit.reset(0.0);
        self.shootout.end();
        self.clock.rebase();
        self.set_phase(GamePhase::Playing);
        self.emit(GameEvent::EngineStart);
        log::info!("Run started as {:?} (seed {})", self.character, self.seed);
        true
    }

    /// Playing -> Paused
    pub fn pause(&mut self) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        self.set_phase(GamePhase::Paused);
        self.emit(GameEvent::EngineStop);
        self.set_siren(false);
        true
    }

    /// Paused -> Playing; the frame clock restarts so paused time is not simulated
    pub fn resume(&mut self) -> bool {
        if self.phase != GamePhase::Paused {
            return false;
        }
        self.set_phase(GamePhase::Playing);
        self.emit(GameEvent::EngineStart);
        self.clock.rebase();
        true
    }

    /// GameOver or Paused -> Idle, tearing everything down
    pub fn restart(&mut self) -> bool {
        if !matches!(self.phase, GamePhase::GameOver | GamePhase::Paused) {
            return false;
        }
        self.shootout.end();
        self.set_siren(false);
        self.set_phase(GamePhase::Idle);
        true
    }

    // === Player input (Playing only) ===

    pub fn shift_lane(&mut self, shift: LaneShift) -> bool {
        if self.phase != GamePhase::Playing || !self.player.shift_lane(shift) {
            return false;
        }
        let lane = self.player.lane;
        self.emit(GameEvent::LaneChanged { lane });
        self.emit(GameEvent::CameraLean {
            direction: shift.signum(),
        });
        true
    }

    pub fn jump(&mut self) -> bool {
        if self.phase != GamePhase::Playing || !self.player.jump() {
            return false;
        }
        self.emit(GameEvent::Jumped);
        true
    }

    pub fn duck(&mut self) -> bool {
        if self.phase != GamePhase::Playing || !self.player.duck() {
            return false;
        }
        self.emit(GameEvent::Ducked);
        true
    }

    /// Tap at a normalised viewport point (Shootout only)
    pub fn tap(&mut self, point: glam::Vec2) -> bool {
        if self.phase != GamePhase::Shootout {
            return false;
        }
        let events = self.shootout.tap(point);
        let hit = !events.is_empty();
        self.apply_shootout_events(events);
        hit
    }

    /// Add heat directly (obstacle hits go through here too)
    pub fn increase_pursuit(&mut self, amount: f32) {
        self.pursuit.increase(amount);
    }

    // === Internal transitions ===

    pub(crate) fn enter_shootout(&mut self) {
        self.set_phase(GamePhase::Shootout);
        self.set_siren(false);
        self.shootout.start(&mut self.rng);
        let total_targets = self.shootout.total_targets();
        self.emit(GameEvent::ShootoutStarted { total_targets });
    }

    pub(crate) fn apply_shootout_events(&mut self, events: Vec<ShootoutEvent>) {
        use super::shootout::ShootoutOutcome;

        for event in events {
            match event {
                ShootoutEvent::TargetSpawned { id } => self.emit(GameEvent::TargetSpawned { id }),
                ShootoutEvent::TargetHit { id } => self.emit(GameEvent::TargetHit { id }),
                ShootoutEvent::TargetMissed { id } => self.emit(GameEvent::TargetMissed { id }),
                ShootoutEvent::Resolved(ShootoutOutcome::Success) => self.win_shootout(),
                ShootoutEvent::Resolved(ShootoutOutcome::Failure) => self.game_over(),
            }
        }
    }

    /// Shootout -> Playing with the meter still warm
    fn win_shootout(&mut self) {
        self.pursuit.reset(PURSUIT_AFTER_SHOOTOUT);
        self.shootout_wins += 1;
        self.emit(GameEvent::ShootoutWon);
        self.set_phase(GamePhase::Playing);
        self.clock.rebase();
    }

    /// Shootout -> GameOver
    fn game_over(&mut self) {
        self.shootout.end();
        self.set_phase(GamePhase::GameOver);
        self.emit(GameEvent::EngineStop);
        self.set_siren(false);
        let score = self.score.floor() as u64;
        let distance_km = self.distance_km();
        log::info!("Run ended: score {}, {:.2} km", score, distance_km);
        self.emit(GameEvent::RunEnded { score, distance_km });
    }

    /// One Playing tick, in the fixed sub-system order
    pub(crate) fn advance_run(&mut self, dt: f32) {
        self.speed = (self.speed + SPEED_ACCEL * dt).min(MAX_SPEED);
        self.distance += self.speed * dt;
        self.score += self.speed * dt * SCORE_PER_DISTANCE;

        if self.player.update(dt).is_some() {
            self.emit(GameEvent::Landed);
        }

        self.obstacles
            .update(dt, self.speed, self.distance, &mut self.rng);

        if let Some(kind) = self.obstacles.check_collision(&self.player.hitbox()) {
            self.pursuit.increase(PURSUIT_PER_HIT);
            self.emit(GameEvent::ObstacleHit { kind });
            self.emit(GameEvent::CameraShake {
                magnitude: HIT_SHAKE,
            });
        }

        if self.pursuit.update(dt) {
            self.enter_shootout();
            return;
        }

        let siren = self.pursuit.siren_active();
        self.set_siren(siren);
    }
}
