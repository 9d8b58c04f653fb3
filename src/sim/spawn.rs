//! Content placement
//!
//! Populates freshly generated full-width segments with obstacles and
//! pedestrians. Placement coordinates are drawn from the section's band
//! (sections span 2.5 segments), lane picks never repeat within one call,
//! and the obstacle type follows a section-keyed alternation: parity of the
//! section index during the warm-up, strict alternation afterwards.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::difficulty::{obstacle_count, section_of_segment};
use super::entity::{Obstacle, ObstacleKind, Pedestrian, Segment};
use super::pool::EntityPool;
use super::world::WorldEvent;
use crate::consts::{PLACEMENT_BAND_MAX, PLACEMENT_BAND_MIN, TYPE_WARMUP_SECTIONS};
use crate::GameConfig;

/// Places hazards and targets on generated segments and recycles them when
/// segments are culled.
pub struct Spawner {
    rng: Pcg32,
    obstacles: EntityPool<Obstacle>,
    pedestrians: EntityPool<Pedestrian>,
    next_entity_id: u64,
    /// Last section a populate call saw; drives the alternation counter
    last_section: Option<u64>,
    /// Bumped once per newly entered section
    type_flips: u64,
}

impl Spawner {
    pub fn new(seed: u64, config: &GameConfig) -> Self {
        let mut obstacles = EntityPool::new(config.obstacle_pool_size, Obstacle::default);
        let mut pedestrians = EntityPool::new(config.pedestrian_pool_size, Pedestrian::default);
        obstacles.prewarm(config.obstacle_pool_size / 2);
        pedestrians.prewarm(config.pedestrian_pool_size / 2);
        Self {
            rng: Pcg32::seed_from_u64(seed),
            obstacles,
            pedestrians,
            next_entity_id: 1,
            last_section: None,
            type_flips: 0,
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    /// Obstacle kind for a segment's section. All obstacles spawned in one
    /// populate call share the kind.
    fn obstacle_kind_for(&mut self, section: u64) -> ObstacleKind {
        if self.last_section != Some(section) {
            self.last_section = Some(section);
            self.type_flips += 1;
        }
        let parity = if section < TYPE_WARMUP_SECTIONS {
            // Warm-up: keyed directly to the section index
            section % 2
        } else {
            // Strict alternation on the persistent counter
            self.type_flips % 2
        };
        if parity == 0 {
            ObstacleKind::Gate
        } else {
            ObstacleKind::Post
        }
    }

    /// Draw `count` distinct lane indices (remove-and-shrink sampling),
    /// sorted ascending for deterministic downstream ordering.
    fn pick_lanes(&mut self, lane_count: usize, count: usize) -> Vec<usize> {
        let mut candidates: Vec<usize> = (0..lane_count).collect();
        let count = count.min(lane_count);
        let mut picked = Vec::with_capacity(count);
        for _ in 0..count {
            let at = self.rng.random_range(0..candidates.len());
            picked.push(candidates.swap_remove(at));
        }
        picked.sort_unstable();
        picked
    }

    /// Longitudinal coordinate inside the section's placement band.
    /// The band is a sub-range of the *section*, which spans 2.5 segments,
    /// so the result may land outside the segment being populated.
    fn band_coordinate(&mut self, section: u64, config: &GameConfig) -> f32 {
        let section_length = config.section_length();
        let start = section as f32 * section_length;
        let fraction = self
            .rng
            .random_range(PLACEMENT_BAND_MIN..=PLACEMENT_BAND_MAX);
        start + fraction * section_length
    }

    /// Populate a freshly generated segment. Segments without the full lane
    /// complement (the starter stretch) receive no content.
    pub fn populate(
        &mut self,
        segment: &mut Segment,
        config: &GameConfig,
        events: &mut Vec<WorldEvent>,
    ) {
        if segment.lanes.len() < config.lane_count {
            return;
        }

        let section = section_of_segment(segment.index);
        self.place_obstacles(segment, section, config, events);
        self.place_pedestrians(segment, section, config, events);
    }

    fn place_obstacles(
        &mut self,
        segment: &mut Segment,
        section: u64,
        config: &GameConfig,
        events: &mut Vec<WorldEvent>,
    ) {
        let kind = self.obstacle_kind_for(section);
        let count = obstacle_count(config, segment.index, &mut self.rng) as usize;
        let lanes = self.pick_lanes(segment.lanes.len(), count);

        for lane in lanes {
            let offset_x = segment.lanes[lane].offset_x;
            let z = self.band_coordinate(section, config);
            let id = self.next_id();

            let mut obstacle = self.obstacles.acquire();
            obstacle.id = id;
            obstacle.kind = kind;
            obstacle.lane = lane;
            obstacle.position = Vec3::new(offset_x, kind.half_extents().y, z);

            events.push(WorldEvent::ObstacleSpawned {
                id,
                kind,
                lane,
                position: obstacle.position,
            });
            segment.obstacles.push(obstacle);
        }
    }

    fn place_pedestrians(
        &mut self,
        segment: &mut Segment,
        section: u64,
        config: &GameConfig,
        events: &mut Vec<WorldEvent>,
    ) {
        let lane_total = segment.lanes.len();
        // One lane may be guaranteed to carry exactly one pedestrian
        let guaranteed = if config.guarantee_single_pedestrian {
            Some(self.rng.random_range(0..lane_total))
        } else {
            None
        };

        for lane in 0..lane_total {
            let count = if guaranteed == Some(lane) {
                1
            } else {
                self.rng
                    .random_range(config.min_people_per_lane..=config.max_people_per_lane)
            };

            let offset_x = segment.lanes[lane].offset_x;
            for _ in 0..count {
                let z = self.band_coordinate(section, config);
                let id = self.next_id();

                let mut pedestrian = self.pedestrians.acquire();
                pedestrian.id = id;
                pedestrian.lane = lane;
                pedestrian.position = Vec3::new(offset_x, 0.9, z);

                events.push(WorldEvent::PedestrianSpawned {
                    id,
                    lane,
                    position: pedestrian.position,
                });
                segment.pedestrians.push(pedestrian);
            }
        }
    }

    /// Release a culled segment's content back to the pools. Returns the
    /// number of pedestrians that were never struck.
    pub fn recycle_content(
        &mut self,
        segment: &mut Segment,
        events: &mut Vec<WorldEvent>,
    ) -> u64 {
        for obstacle in segment.obstacles.drain(..) {
            events.push(WorldEvent::ObstacleRemoved { id: obstacle.id });
            self.obstacles.release(obstacle);
        }

        let mut avoided = 0;
        for pedestrian in segment.pedestrians.drain(..) {
            if !pedestrian.is_struck() {
                avoided += 1;
            }
            events.push(WorldEvent::PedestrianRemoved { id: pedestrian.id });
            self.pedestrians.release(pedestrian);
        }
        avoided
    }

    /// Tear down the pools; called on world disposal.
    pub fn dispose(&mut self) {
        self.obstacles.clear();
        self.pedestrians.clear();
    }

    /// Pool statistics (created, reused) for the obstacle pool
    pub fn obstacle_pool_stats(&self) -> (usize, usize) {
        (self.obstacles.created(), self.obstacles.reused())
    }
}
