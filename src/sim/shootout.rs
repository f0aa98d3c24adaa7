//! Shootout mini-game: tap the targets before they expire
//!
//! Spawns and expiries are timers owned by the shootout and advanced by
//! `update`. Every timer carries the generation it was scheduled in, and only
//! fires while that generation is current and the shootout is active. Ending
//! the shootout clears the timer list, so nothing can fire afterwards.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// How a shootout ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShootoutOutcome {
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShootoutPhase {
    Idle,
    Active,
    Resolved(ShootoutOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TargetState {
    /// Waiting to be tapped
    Live,
    /// Tapped; fading out (seconds left). Purely visual.
    Hit { fade: f32 },
}

/// A tappable target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    /// Center in normalised viewport coordinates (0..1, y down)
    pub pos: Vec2,
    /// Shootout clock time the target appeared
    pub spawned_at: f32,
    pub state: TargetState,
}

impl Target {
    pub fn is_live(&self) -> bool {
        self.state == TargetState::Live
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.pos.distance(point) <= TARGET_RADIUS
    }
}

/// What the shootout reports back from `update`, `tap` and `hit_target`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShootoutEvent {
    TargetSpawned { id: u32 },
    TargetHit { id: u32 },
    TargetMissed { id: u32 },
    Resolved(ShootoutOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum TimerKind {
    Spawn,
    Miss { target_id: u32 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Timer {
    fire_at: f32,
    kind: TimerKind,
    generation: u32,
}

/// One shootout sub-session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shootout {
    phase: ShootoutPhase,
    total_targets: u32,
    hit_count: u32,
    miss_count: u32,
    targets: Vec<Target>,
    timers: Vec<Timer>,
    /// Seconds since `start`
    clock: f32,
    generation: u32,
    next_target_id: u32,
}

impl Default for Shootout {
    fn default() -> Self {
        Self::new()
    }
}

impl Shootout {
    pub fn new() -> Self {
        Self {
            phase: ShootoutPhase::Idle,
            total_targets: 0,
            hit_count: 0,
            miss_count: 0,
            targets: Vec::new(),
            timers: Vec::new(),
            clock: 0.0,
            generation: 0,
            next_target_id: 1,
        }
    }

    pub fn phase(&self) -> ShootoutPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == ShootoutPhase::Active
    }

    pub fn total_targets(&self) -> u32 {
        self.total_targets
    }

    pub fn hit_count(&self) -> u32 {
        self.hit_count
    }

    pub fn miss_count(&self) -> u32 {
        self.miss_count
    }

    /// Targets on screen, including ones fading out after a hit
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Begin a new shootout with 3 to 5 targets, spawned 0.4s apart
    pub fn start(&mut self, rng: &mut impl Rng) {
        self.end();
        self.generation = self.generation.wrapping_add(1);
        self.phase = ShootoutPhase::Active;
        self.total_targets = rng.random_range(SHOOTOUT_MIN_TARGETS..=SHOOTOUT_MAX_TARGETS);
        self.hit_count = 0;
        self.miss_count = 0;
        self.clock = 0.0;

        for i in 0..self.total_targets {
            self.schedule(i as f32 * TARGET_SPAWN_INTERVAL, TimerKind::Spawn);
        }
        log::debug!("Shootout started with {} targets", self.total_targets);
    }

    /// Clear all timers and targets. Safe to call in any phase, any number of times.
    pub fn end(&mut self) {
        self.timers.clear();
        self.targets.clear();
        if self.phase == ShootoutPhase::Active {
            self.phase = ShootoutPhase::Idle;
        }
    }

    fn schedule(&mut self, fire_at: f32, kind: TimerKind) {
        self.timers.push(Timer {
            fire_at,
            kind,
            generation: self.generation,
        });
    }

    /// Advance the shootout clock, firing every timer that comes due
    pub fn update(&mut self, dt: f32, rng: &mut impl Rng) -> Vec<ShootoutEvent> {
        let mut events = Vec::new();

        // Hit targets fade regardless of phase
        for target in &mut self.targets {
            if let TargetState::Hit { fade } = &mut target.state {
                *fade -= dt;
            }
        }
        self.targets
            .retain(|t| !matches!(t.state, TargetState::Hit { fade } if fade <= 0.0));

        if !self.is_active() {
            return events;
        }
        self.clock += dt;

        // Fire in schedule order. A spawn can schedule a miss that is
        // already due when dt is large, so re-scan after each firing.
        while let Some(idx) = self.next_due_timer() {
            let timer = self.timers.remove(idx);
            if timer.generation != self.generation || !self.is_active() {
                continue;
            }
            match timer.kind {
                TimerKind::Spawn => {
                    let id = self.spawn_target(timer.fire_at, rng);
                    events.push(ShootoutEvent::TargetSpawned { id });
                }
                TimerKind::Miss { target_id } => {
                    let Some(pos) = self
                        .targets
                        .iter()
                        .position(|t| t.id == target_id && t.is_live())
                    else {
                        continue;
                    };
                    self.targets.remove(pos);
                    self.miss_count += 1;
                    events.push(ShootoutEvent::TargetMissed { id: target_id });
                    if let Some(outcome) = self.check_result() {
                        events.push(ShootoutEvent::Resolved(outcome));
                    }
                }
            }
        }

        events
    }

    fn next_due_timer(&self) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.fire_at <= self.clock)
            .min_by(|(_, a), (_, b)| a.fire_at.total_cmp(&b.fire_at))
            .map(|(idx, _)| idx)
    }

    fn spawn_target(&mut self, spawned_at: f32, rng: &mut impl Rng) -> u32 {
        let id = self.next_target_id;
        self.next_target_id += 1;

        // Keep targets off the edges and in the upper part of the screen
        let pos = Vec2::new(rng.random_range(0.1..0.9), rng.random_range(0.1..0.65));
        self.targets.push(Target {
            id,
            pos,
            spawned_at,
            state: TargetState::Live,
        });
        self.schedule(spawned_at + TARGET_LIFETIME, TimerKind::Miss { target_id: id });
        id
    }

    /// Tap at a normalised viewport point; hits the first live target under it
    pub fn tap(&mut self, point: Vec2) -> Vec<ShootoutEvent> {
        let id = self
            .targets
            .iter()
            .find(|t| t.is_live() && t.contains(point))
            .map(|t| t.id);
        match id {
            Some(id) => self.hit_target(id),
            None => Vec::new(),
        }
    }

    /// Register a hit on a live target by id
    pub fn hit_target(&mut self, id: u32) -> Vec<ShootoutEvent> {
        if !self.is_active() {
            return Vec::new();
        }
        let Some(target) = self.targets.iter_mut().find(|t| t.id == id && t.is_live()) else {
            return Vec::new();
        };
        target.state = TargetState::Hit {
            fade: TARGET_HIT_FADE,
        };
        self.timers.retain(|t| t.kind != TimerKind::Miss { target_id: id });
        self.hit_count += 1;

        let mut events = vec![ShootoutEvent::TargetHit { id }];
        if let Some(outcome) = self.check_result() {
            events.push(ShootoutEvent::Resolved(outcome));
        }
        events
    }

    /// Resolve once every target is accounted for
    ///
    /// The miss limit is a flat count, not scaled to the number of targets.
    pub fn check_result(&mut self) -> Option<ShootoutOutcome> {
        if !self.is_active() || self.hit_count + self.miss_count < self.total_targets {
            return None;
        }
        let outcome = if self.miss_count >= SHOOTOUT_MISS_LIMIT {
            ShootoutOutcome::Failure
        } else {
            ShootoutOutcome::Success
        };
        // Fading hit targets are dropped along with everything else
        self.end();
        self.phase = ShootoutPhase::Resolved(outcome);
        log::debug!(
            "Shootout resolved: {:?} ({} hits, {} misses)",
            outcome,
            self.hit_count,
            self.miss_count
        );
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn started(seed: u64) -> (Shootout, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut shootout = Shootout::new();
        shootout.start(&mut rng);
        (shootout, rng)
    }

    fn forced(total: u32, hits: u32, misses: u32) -> Shootout {
        let mut shootout = Shootout::new();
        shootout.phase = ShootoutPhase::Active;
        shootout.total_targets = total;
        shootout.hit_count = hits;
        shootout.miss_count = misses;
        shootout
    }

    #[test]
    fn test_start_picks_three_to_five() {
        for seed in 0..50 {
            let (shootout, _) = started(seed);
            assert!((3..=5).contains(&shootout.total_targets()));
            assert_eq!(shootout.pending_timers(), shootout.total_targets() as usize);
            assert!(shootout.is_active());
        }
    }

    #[test]
    fn test_targets_spawn_staggered() {
        let (mut shootout, mut rng) = started(1);
        let events = shootout.update(0.0, &mut rng);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ShootoutEvent::TargetSpawned { .. }));

        let events = shootout.update(0.2, &mut rng);
        assert!(events.is_empty());
        let events = shootout.update(0.2, &mut rng);
        assert_eq!(events.len(), 1);
        assert_eq!(shootout.targets().len(), 2);
    }

    #[test]
    fn test_unhit_target_expires_as_miss() {
        let (mut shootout, mut rng) = started(2);
        shootout.update(0.0, &mut rng);
        let first = shootout.targets()[0].id;

        let events = shootout.update(TARGET_LIFETIME, &mut rng);
        assert!(events.contains(&ShootoutEvent::TargetMissed { id: first }));
        assert!(shootout.miss_count() >= 1);
        assert!(shootout.targets().iter().all(|t| t.id != first));
    }

    #[test]
    fn test_hit_cancels_miss_timer() {
        let (mut shootout, mut rng) = started(3);
        shootout.update(0.0, &mut rng);
        let target = shootout.targets()[0].clone();

        let events = shootout.tap(target.pos);
        assert_eq!(events[0], ShootoutEvent::TargetHit { id: target.id });
        assert_eq!(shootout.hit_count(), 1);
        // Tapping the fading target again does nothing
        assert!(shootout.tap(target.pos).is_empty());

        let events = shootout.update(TARGET_LIFETIME, &mut rng);
        assert!(!events.contains(&ShootoutEvent::TargetMissed { id: target.id }));
        assert!(shootout.targets().iter().all(|t| t.id != target.id));
    }

    #[test]
    fn test_tap_on_empty_space_misses_nothing() {
        let (mut shootout, mut rng) = started(4);
        shootout.update(0.0, &mut rng);
        assert!(shootout.tap(Vec2::new(-1.0, -1.0)).is_empty());
        assert_eq!(shootout.hit_count(), 0);
        assert_eq!(shootout.miss_count(), 0);
    }

    #[test]
    fn test_all_hit_resolves_success() {
        let (mut shootout, mut rng) = started(5);
        let total = shootout.total_targets();
        let mut outcome = None;
        for _ in 0..total {
            shootout.update(TARGET_SPAWN_INTERVAL, &mut rng);
            let id = shootout.targets().iter().find(|t| t.is_live()).map(|t| t.id);
            for event in shootout.hit_target(id.expect("live target")) {
                if let ShootoutEvent::Resolved(o) = event {
                    outcome = Some(o);
                }
            }
        }
        assert_eq!(outcome, Some(ShootoutOutcome::Success));
        assert_eq!(shootout.phase(), ShootoutPhase::Resolved(ShootoutOutcome::Success));
        assert_eq!(shootout.pending_timers(), 0);
        assert!(shootout.targets().is_empty());
    }

    #[test]
    fn test_all_missed_resolves_failure() {
        let (mut shootout, mut rng) = started(6);
        let events = shootout.update(10.0, &mut rng);
        assert_eq!(
            events.last(),
            Some(&ShootoutEvent::Resolved(ShootoutOutcome::Failure))
        );
        assert_eq!(shootout.miss_count(), shootout.total_targets());
    }

    #[test]
    fn test_resolves_once_every_target_is_accounted_for() {
        // 1 hit + 2 misses covers all three targets, under the miss limit
        let mut shootout = forced(3, 1, 2);
        assert_eq!(shootout.check_result(), Some(ShootoutOutcome::Success));
        assert!(!shootout.is_active());

        // One target still out: unresolved
        let mut shootout = forced(4, 1, 2);
        assert_eq!(shootout.check_result(), None);
        assert!(shootout.is_active());

        // Then it is missed: the third miss fails the shootout
        shootout.miss_count += 1;
        assert_eq!(shootout.check_result(), Some(ShootoutOutcome::Failure));

        let mut shootout = forced(3, 0, 3);
        assert_eq!(shootout.check_result(), Some(ShootoutOutcome::Failure));
    }

    #[test]
    fn test_five_targets_two_misses_succeeds() {
        let mut shootout = forced(5, 3, 2);
        assert_eq!(shootout.check_result(), Some(ShootoutOutcome::Success));
        // Resolves exactly once
        assert_eq!(shootout.check_result(), None);
        assert_eq!(shootout.phase(), ShootoutPhase::Resolved(ShootoutOutcome::Success));
    }

    #[test]
    fn test_end_is_idempotent() {
        let (mut shootout, mut rng) = started(7);
        shootout.update(0.5, &mut rng);

        shootout.end();
        let once = (shootout.phase(), shootout.pending_timers(), shootout.targets().len());
        shootout.end();
        shootout.end();
        let thrice = (shootout.phase(), shootout.pending_timers(), shootout.targets().len());
        assert_eq!(once, thrice);
        assert_eq!(once, (ShootoutPhase::Idle, 0, 0));

        // Nothing fires after end
        assert!(shootout.update(10.0, &mut rng).is_empty());
        assert_eq!(shootout.miss_count(), 0);
    }

    #[test]
    fn test_stale_generation_timer_is_noop() {
        let (mut shootout, mut rng) = started(8);
        let stale = Timer {
            fire_at: 0.0,
            kind: TimerKind::Spawn,
            generation: shootout.generation.wrapping_sub(1),
        };
        shootout.timers.push(stale);
        let spawned = shootout
            .update(0.0, &mut rng)
            .iter()
            .filter(|e| matches!(e, ShootoutEvent::TargetSpawned { .. }))
            .count();
        assert_eq!(spawned, 1);
    }

    #[test]
    fn test_hit_fade_is_visual_only() {
        let (mut shootout, mut rng) = started(9);
        shootout.update(0.0, &mut rng);
        let id = shootout.targets()[0].id;
        shootout.hit_target(id);
        assert_eq!(shootout.targets().len(), 1);
        shootout.update(TARGET_HIT_FADE, &mut rng);
        assert!(shootout.targets().iter().all(|t| t.id != id));
    }
}
