//! Track content entities
//!
//! Obstacles end the run on contact; pedestrians affect scoring only. Both
//! are pooled and carry a fresh entity id each time they spawn. Segments own
//! their lanes and content and recycle through a pool as well.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::pool::{PoolEntry, Poolable};

/// Obstacle variants; the footprint differs per variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Wide, low barrier spanning most of a lane
    #[default]
    Gate,
    /// Narrow, tall post in the lane center
    Post,
}

impl ObstacleKind {
    /// Bounding half extents (x, y, z) for this variant
    pub fn half_extents(&self) -> Vec3 {
        match self {
            ObstacleKind::Gate => Vec3::new(1.8, 0.6, 0.25),
            ObstacleKind::Post => Vec3::new(0.4, 2.2, 0.4),
        }
    }
}

/// A run-ending barrier placed in a lane
#[derive(Debug, Clone, Default)]
pub struct Obstacle {
    pub id: u64,
    pub kind: ObstacleKind,
    pub lane: usize,
    pub position: Vec3,
    disposed: bool,
}

impl Obstacle {
    /// World-space bounding volume
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_half_extents(self.position, self.kind.half_extents())
    }
}

impl Poolable for Obstacle {
    fn reset(&mut self) {
        self.id = 0;
        self.kind = ObstacleKind::default();
        self.lane = 0;
        self.position = Vec3::ZERO;
        self.disposed = false;
    }
    fn dispose(&mut self) {
        self.disposed = true;
    }
    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// Pedestrian bounding half extents
const PEDESTRIAN_HALF_EXTENTS: Vec3 = Vec3::new(0.35, 0.9, 0.35);

/// A scoring target standing on a lane
///
/// The `struck` flag is one-way: once set the pedestrian is excluded from
/// every further collision query, though it stays in its segment for
/// bookkeeping until the segment is culled.
#[derive(Debug, Clone, Default)]
pub struct Pedestrian {
    pub id: u64,
    pub lane: usize,
    pub position: Vec3,
    struck: bool,
    disposed: bool,
}

impl Pedestrian {
    /// World-space bounding volume
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_half_extents(self.position, PEDESTRIAN_HALF_EXTENTS)
    }

    /// Whether this pedestrian has been struck
    pub fn is_struck(&self) -> bool {
        self.struck
    }

    /// Mark struck; never unset outside of pool reset
    pub fn mark_struck(&mut self) {
        self.struck = true;
    }
}

impl Poolable for Pedestrian {
    fn reset(&mut self) {
        self.id = 0;
        self.lane = 0;
        self.position = Vec3::ZERO;
        self.struck = false;
        self.disposed = false;
    }
    fn dispose(&mut self) {
        self.disposed = true;
    }
    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// One lateral position a segment offers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub index: usize,
    pub offset_x: f32,
}

/// A fixed-length longitudinal unit of track
///
/// Owns its lanes, content, and the section-boundary markers falling within
/// its span. Lane count never changes after generation.
#[derive(Debug, Default)]
pub struct Segment {
    pub index: u64,
    pub start_z: f32,
    pub end_z: f32,
    pub lanes: Vec<Lane>,
    pub visible: bool,
    pub generated: bool,
    /// Section-boundary coordinates inside `[start_z, end_z)`
    pub markers: Vec<f32>,
    pub obstacles: Vec<PoolEntry<Obstacle>>,
    pub pedestrians: Vec<PoolEntry<Pedestrian>>,
    disposed: bool,
}

impl Segment {
    /// Lane record by index, if the segment has it
    pub fn lane(&self, index: usize) -> Option<&Lane> {
        self.lanes.get(index)
    }

    /// Whether `z` falls within this segment's span
    pub fn contains_z(&self, z: f32) -> bool {
        z >= self.start_z && z < self.end_z
    }
}

impl Poolable for Segment {
    fn reset(&mut self) {
        debug_assert!(
            self.obstacles.is_empty() && self.pedestrians.is_empty(),
            "segment content must be recycled before the segment itself"
        );
        self.index = 0;
        self.start_z = 0.0;
        self.end_z = 0.0;
        self.lanes.clear();
        self.visible = false;
        self.generated = false;
        self.markers.clear();
        self.disposed = false;
    }
    fn dispose(&mut self) {
        self.lanes.clear();
        self.markers.clear();
        self.obstacles.clear();
        self.pedestrians.clear();
        self.disposed = true;
    }
    fn is_disposed(&self) -> bool {
        self.disposed
    }
}
