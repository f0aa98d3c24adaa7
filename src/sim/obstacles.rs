//! Obstacle pool and distance-gated spawner
//!
//! The pool is allocated once and never shrinks or grows. Slots are
//! activated on spawn and parked again when they pass the player or get hit.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::*;

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Pothole,
    Trash,
    Car,
    Cone,
    Barrier,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 5] = [
        ObstacleKind::Pothole,
        ObstacleKind::Trash,
        ObstacleKind::Car,
        ObstacleKind::Cone,
        ObstacleKind::Barrier,
    ];

    /// Width, height, depth
    pub fn size(self) -> Vec3 {
        match self {
            ObstacleKind::Pothole => Vec3::new(2.5, 0.08, 2.5),
            ObstacleKind::Trash => Vec3::new(0.9, 0.9, 0.9),
            ObstacleKind::Car => Vec3::new(1.6, 1.2, 3.2),
            ObstacleKind::Cone => Vec3::new(0.4, 0.8, 0.4),
            ObstacleKind::Barrier => Vec3::new(3.2, 1.0, 0.6),
        }
    }

    /// Obstacles sit on the road
    pub fn rest_y(self) -> f32 {
        self.size().y / 2.0
    }
}

/// One pool slot. Its kind is fixed when the pool is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    /// Slot index in the pool
    pub id: u32,
    pub kind: ObstacleKind,
    pub active: bool,
    pub lane: usize,
    pub pos: Vec3,
}

impl Obstacle {
    fn new(id: u32, kind: ObstacleKind) -> Self {
        Self {
            id,
            kind,
            active: false,
            lane: 0,
            pos: Vec3::new(0.0, kind.rest_y(), OBSTACLE_PARK_Z),
        }
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::new(self.pos, self.kind.size())
    }

    fn activate(&mut self, lane: usize) {
        self.active = true;
        self.lane = lane;
        self.pos = Vec3::new(LANES[lane], self.kind.rest_y(), OBSTACLE_SPAWN_Z);
    }

    /// Park out of sight and out of collision range
    fn deactivate(&mut self) {
        self.active = false;
        self.pos.z = OBSTACLE_PARK_Z;
    }
}

/// Fixed-size recyclable obstacle pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstaclePool {
    slots: Vec<Obstacle>,
    /// Travelled distance at the last spawn attempt
    last_spawn_distance: f32,
}

impl ObstaclePool {
    /// Build a pool of `size` slots, kinds assigned round-robin
    pub fn new(size: usize) -> Self {
        let slots = (0..size)
            .map(|i| Obstacle::new(i as u32, ObstacleKind::ALL[i % ObstacleKind::ALL.len()]))
            .collect();
        Self {
            slots,
            last_spawn_distance: 0.0,
        }
    }

    /// Number of slots (constant for the life of the pool)
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Obstacle] {
        &self.slots
    }

    pub fn active(&self) -> impl Iterator<Item = &Obstacle> {
        self.slots.iter().filter(|o| o.active)
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// Park every slot and restart the spawn gate
    pub fn reset(&mut self) {
        for obstacle in &mut self.slots {
            obstacle.deactivate();
        }
        self.last_spawn_distance = 0.0;
    }

    /// Activate a random kind in a random lane
    ///
    /// Prefers a free slot already of the chosen kind, then any free slot.
    /// Returns the slot id, or None when the pool is exhausted.
    pub fn spawn(&mut self, rng: &mut impl Rng) -> Option<u32> {
        let kind = ObstacleKind::ALL[rng.random_range(0..ObstacleKind::ALL.len())];
        let lane = rng.random_range(0..LANES.len());

        let idx = self
            .slots
            .iter()
            .position(|o| !o.active && o.kind == kind)
            .or_else(|| self.slots.iter().position(|o| !o.active));

        let Some(idx) = idx else {
            log::debug!("Obstacle pool exhausted, spawn dropped");
            return None;
        };

        let obstacle = &mut self.slots[idx];
        obstacle.activate(lane);
        Some(obstacle.id)
    }

    /// Spawn when enough distance has passed, then scroll and recycle
    ///
    /// The gap threshold is re-rolled on every call, so the chance of a
    /// spawn grows with each update past the minimum gap.
    pub fn update(&mut self, dt: f32, speed: f32, distance: f32, rng: &mut impl Rng) {
        if distance - self.last_spawn_distance > roll_gap(rng) {
            self.spawn(rng);
            self.last_spawn_distance = distance;
        }

        let move_z = speed * dt;
        for obstacle in self.slots.iter_mut().filter(|o| o.active) {
            obstacle.pos.z += move_z;
            if obstacle.pos.z > OBSTACLE_RECYCLE_Z {
                obstacle.deactivate();
            }
        }
    }

    /// Consume the first active obstacle overlapping `hitbox`, in pool order
    ///
    /// At most one obstacle is consumed per call.
    pub fn check_collision(&mut self, hitbox: &Aabb) -> Option<ObstacleKind> {
        let obstacle = self
            .slots
            .iter_mut()
            .filter(|o| o.active)
            .find(|o| hitbox.overlaps_shrunk(&o.hitbox(), COLLISION_SHRINK))?;
        obstacle.deactivate();
        Some(obstacle.kind)
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, idx: usize, lane: usize, z: f32) {
        let obstacle = &mut self.slots[idx];
        obstacle.activate(lane);
        obstacle.pos.z = z;
    }
}

fn roll_gap(rng: &mut impl Rng) -> f32 {
    SPAWN_MIN_GAP + rng.random::<f32>() * SPAWN_GAP_JITTER
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Player;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn pool() -> (ObstaclePool, Pcg32) {
        (ObstaclePool::new(OBSTACLE_POOL_SIZE), Pcg32::seed_from_u64(7))
    }

    #[test]
    fn test_pool_is_round_robin_and_parked() {
        let (pool, _) = pool();
        assert_eq!(pool.len(), 20);
        for kind in ObstacleKind::ALL {
            assert_eq!(pool.slots().iter().filter(|o| o.kind == kind).count(), 4);
        }
        assert!(pool.slots().iter().all(|o| !o.active && o.pos.z == OBSTACLE_PARK_Z));
    }

    #[test]
    fn test_spawn_activates_at_spawn_line() {
        let (mut pool, mut rng) = pool();
        let id = pool.spawn(&mut rng).expect("free slot");
        let obstacle = &pool.slots()[id as usize];
        assert!(obstacle.active);
        assert_eq!(obstacle.pos.z, OBSTACLE_SPAWN_Z);
        assert_eq!(obstacle.pos.x, LANES[obstacle.lane]);
        assert_eq!(obstacle.pos.y, obstacle.kind.rest_y());
    }

    #[test]
    fn test_spawn_on_full_pool_is_dropped() {
        let (mut pool, mut rng) = pool();
        for _ in 0..OBSTACLE_POOL_SIZE {
            assert!(pool.spawn(&mut rng).is_some());
        }
        assert_eq!(pool.active_count(), 20);
        assert_eq!(pool.spawn(&mut rng), None);
        assert_eq!(pool.len(), 20);
        assert_eq!(pool.active_count(), 20);
    }

    #[test]
    fn test_spawn_falls_back_to_other_kind() {
        let (mut pool, mut rng) = pool();
        // Leave a single free slot: whatever kind is rolled, it gets used
        for i in 1..pool.len() {
            pool.place(i, 0, -100.0);
        }
        assert_eq!(pool.spawn(&mut rng), Some(0));
    }

    #[test]
    fn test_spawn_is_distance_gated() {
        let (mut pool, mut rng) = pool();
        // Never more than the minimum gap: no spawn
        pool.update(0.0, 0.0, SPAWN_MIN_GAP, &mut rng);
        assert_eq!(pool.active_count(), 0);

        // Past the largest possible gap: exactly one spawn
        pool.update(0.0, 0.0, SPAWN_MIN_GAP + SPAWN_GAP_JITTER + 1.0, &mut rng);
        assert_eq!(pool.active_count(), 1);

        // Gate restarts from the spawn distance
        pool.update(0.0, 0.0, SPAWN_MIN_GAP + SPAWN_GAP_JITTER + 2.0, &mut rng);
        assert_eq!(pool.active_count(), 1);
    }

    #[test]
    fn test_update_scrolls_and_recycles() {
        let (mut pool, mut rng) = pool();
        pool.place(0, 1, -10.0);
        pool.place(1, 1, 19.0);

        pool.update(0.05, 40.0, 0.0, &mut rng);
        assert!(pool.slots()[0].active);
        assert!((pool.slots()[0].pos.z - -8.0).abs() < 1e-5);
        // 19 + 2 crosses the recycle line
        assert!(!pool.slots()[1].active);
        assert_eq!(pool.slots()[1].pos.z, OBSTACLE_PARK_Z);
    }

    #[test]
    fn test_collision_consumes_first_overlap_only() {
        let (mut pool, _) = pool();
        let player = Player::new();
        // Slot 2 (car) and slot 3 (cone) both sit on the player
        pool.place(2, 1, 0.0);
        pool.place(3, 1, 0.0);

        assert_eq!(pool.check_collision(&player.hitbox()), Some(ObstacleKind::Car));
        assert!(!pool.slots()[2].active);
        assert!(pool.slots()[3].active);

        assert_eq!(pool.check_collision(&player.hitbox()), Some(ObstacleKind::Cone));
        assert_eq!(pool.check_collision(&player.hitbox()), None);
    }

    #[test]
    fn test_collision_ignores_other_lanes_and_inactive() {
        let (mut pool, _) = pool();
        let player = Player::new();
        pool.place(2, 0, 0.0);
        assert_eq!(pool.check_collision(&player.hitbox()), None);
        assert!(pool.slots()[2].active);
    }

    #[test]
    fn test_jump_clears_low_obstacle() {
        let (mut pool, _) = pool();
        let mut player = Player::new();
        pool.place(1, 1, 0.0); // trash
        player.jump();
        player.update(0.6);
        assert_eq!(pool.check_collision(&player.hitbox()), None);
    }

    #[test]
    fn test_reset_parks_everything() {
        let (mut pool, mut rng) = pool();
        for _ in 0..5 {
            pool.spawn(&mut rng);
        }
        pool.reset();
        assert_eq!(pool.active_count(), 0);
        assert!(pool.slots().iter().all(|o| o.pos.z == OBSTACLE_PARK_Z));
    }

    #[test]
    fn test_gap_rerolled_each_update_keeps_spawns_dense() {
        let (mut pool, mut rng) = pool();
        let (dt, speed) = (1.0 / 60.0, 40.0);
        let mut distance = 0.0f32;
        let mut spawns = 0u32;
        while distance < 40_000.0 {
            distance += speed * dt;
            let before = pool.last_spawn_distance;
            pool.update(dt, speed, distance, &mut rng);
            if pool.last_spawn_distance != before {
                spawns += 1;
            }
        }
        let mean_gap = pool.last_spawn_distance / spawns as f32;
        // One roll per spawn would average the middle of the jitter band (~95)
        assert!(
            mean_gap > SPAWN_MIN_GAP && mean_gap < 85.0,
            "mean gap {mean_gap}"
        );
    }
}
