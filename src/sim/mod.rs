//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only, owned by the session
//! - Stable iteration order (pool slot order, formation slot order)
//! - Results reported as return values and events, never callbacks
//! - No rendering or platform dependencies

pub mod collision;
pub mod obstacles;
pub mod player;
pub mod pursuit;
pub mod shootout;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use collision::Aabb;
pub use obstacles::{Obstacle, ObstacleKind, ObstaclePool};
pub use player::{LaneShift, Player, PlayerEvent, VerticalState};
pub use pursuit::{Chaser, Pursuit};
pub use shootout::{Shootout, ShootoutEvent, ShootoutOutcome, ShootoutPhase, Target, TargetState};
pub use snapshot::{FrameSnapshot, Hud};
pub use state::{GameEvent, GamePhase, GameSession};
pub use tick::{FrameClock, InputEvent, TickInput, frame, tick};
