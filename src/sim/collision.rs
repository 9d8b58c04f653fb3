//! Collision queries
//!
//! Plain axis-aligned overlap between the tram and live track content. No
//! distance pre-filter: gates are long and thin, and a center-distance
//! heuristic would miss them while their boxes overlap.

use glam::Vec3;

use super::aabb::Aabb;
use super::entity::Segment;

/// Collision reported toward the caller, tagged with the struck entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionEvent {
    /// Run-ending obstacle hit
    Obstacle { id: u64 },
    /// Pedestrian newly struck
    Pedestrian { id: u64 },
}

/// First obstacle whose bounding volume overlaps `tram`, if any.
///
/// Segments iterate in index order and obstacles in placement order, so the
/// report is deterministic. The caller treats a hit as terminal.
pub fn first_obstacle_hit<'a>(
    tram: &Aabb,
    segments: impl Iterator<Item = &'a Segment>,
) -> Option<u64> {
    for segment in segments {
        for obstacle in &segment.obstacles {
            if obstacle.aabb().intersects(tram) {
                return Some(obstacle.id);
            }
        }
    }
    None
}

/// Mark every intersecting, not-yet-struck pedestrian as struck and return
/// their ids. Already-struck pedestrians are skipped entirely.
pub fn strike_pedestrians<'a>(
    tram: &Aabb,
    segments: impl Iterator<Item = &'a mut Segment>,
) -> Vec<u64> {
    let mut struck = Vec::new();
    for segment in segments {
        for pedestrian in segment.pedestrians.iter_mut() {
            if pedestrian.is_struck() {
                continue;
            }
            if pedestrian.aabb().intersects(tram) {
                pedestrian.mark_struck();
                struck.push(pedestrian.id);
            }
        }
    }
    struck
}

/// Advisory early-warning query: whether any obstacle or unstruck
/// pedestrian center lies within `radius` of `center`.
pub fn proximity_alert<'a>(
    center: Vec3,
    radius: f32,
    segments: impl Iterator<Item = &'a Segment>,
) -> bool {
    let radius_sq = radius * radius;
    for segment in segments {
        for obstacle in &segment.obstacles {
            if obstacle.position.distance_squared(center) <= radius_sq {
                return true;
            }
        }
        for pedestrian in &segment.pedestrians {
            if pedestrian.is_struck() {
                continue;
            }
            if pedestrian.position.distance_squared(center) <= radius_sq {
                return true;
            }
        }
    }
    false
}
