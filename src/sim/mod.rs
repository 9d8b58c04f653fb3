//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Tick-driven only, no background work
//! - Seeded RNG only
//! - Stable iteration order (segments keyed by index)
//! - No rendering or platform dependencies

pub mod aabb;
pub mod collision;
pub mod difficulty;
pub mod entity;
pub mod motion;
pub mod pool;
pub mod spawn;
pub mod track;
pub mod world;

pub use aabb::Aabb;
pub use collision::CollisionEvent;
pub use difficulty::{is_high_speed, obstacle_count, section_at, section_of_segment, speed_multiplier};
pub use entity::{Lane, Obstacle, ObstacleKind, Pedestrian, Segment};
pub use motion::{InvalidLaneError, LaneShift, Tram};
pub use pool::{EntityPool, PoolEntry, Poolable};
pub use spawn::Spawner;
pub use track::TrackGenerator;
pub use world::{World, WorldEvent};
