//! World orchestration
//!
//! One `World` per running game. Each tick advances the tram, extends and
//! culls the track, then runs the collision queries. Nothing on this path
//! returns an error: faults are logged and the tick continues, because the
//! caller is a real-time presentation loop that must never stall.
//!
//! The renderer is an external collaborator: it drains [`WorldEvent`]s to
//! mirror the world and never mutates simulation state.

use glam::Vec3;

use super::collision::{self, CollisionEvent};
use super::difficulty::section_at;
use super::motion::{InvalidLaneError, LaneShift, Tram};
use super::spawn::Spawner;
use super::track::TrackGenerator;
use crate::consts::PEDESTRIAN_SCORE;
use crate::{ConfigError, GameConfig, Progress};

/// Lower clamp for runtime growth/threshold tuning
const TUNING_FLOOR: f32 = 1.001;

/// Notification toward the rendering collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldEvent {
    SegmentCreated {
        index: u64,
        start_z: f32,
        end_z: f32,
        lane_count: usize,
    },
    SegmentRemoved {
        index: u64,
    },
    ObstacleSpawned {
        id: u64,
        kind: super::entity::ObstacleKind,
        lane: usize,
        position: Vec3,
    },
    ObstacleRemoved {
        id: u64,
    },
    PedestrianSpawned {
        id: u64,
        lane: usize,
        position: Vec3,
    },
    PedestrianRemoved {
        id: u64,
    },
    Collision(CollisionEvent),
}

/// The complete simulation core
pub struct World {
    config: GameConfig,
    tram: Tram,
    track: TrackGenerator,
    spawner: Spawner,
    progress: Progress,
    events: Vec<WorldEvent>,
    disposed: bool,
}

impl World {
    /// Build a world from a validated configuration and eagerly generate
    /// the initial track stretch.
    pub fn new(seed: u64, config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut spawner = Spawner::new(seed, &config);
        let mut track = TrackGenerator::new(&config);
        let mut events = Vec::new();
        track.bootstrap(&config, &mut spawner, &mut events);

        let tram = Tram::new(&config);
        let mut progress = Progress::default();
        progress.lane = tram.current_lane;

        log::info!("world created (seed {seed})");
        Ok(Self {
            config,
            tram,
            track,
            spawner,
            progress,
            events,
            disposed: false,
        })
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// No-op while paused, after the terminal collision, or once disposed.
    pub fn advance(&mut self, dt: f32) {
        if self.disposed || self.progress.paused || self.progress.game_over {
            return;
        }
        if !(dt > 0.0) || !dt.is_finite() {
            log::warn!("ignoring non-positive tick delta {dt}");
            return;
        }

        // Motion first: speed and section counters feed generation below.
        let _crossed = self.tram.advance(dt, &self.config);

        let avoided =
            self.track
                .update(self.tram.forward, &self.config, &mut self.spawner, &mut self.events);
        self.progress.avoided += avoided;

        self.run_collisions();

        self.progress.section = section_at(self.tram.forward, self.config.segment_length);
        self.progress.segment =
            (self.tram.forward.max(0.0) / self.config.segment_length) as u64;
        self.progress.lane = self.tram.current_lane;
    }

    fn run_collisions(&mut self) {
        let tram_aabb = self.tram.aabb();

        for id in collision::strike_pedestrians(&tram_aabb, self.track.segments_mut()) {
            self.progress.struck += 1;
            self.progress.score += PEDESTRIAN_SCORE;
            self.events
                .push(WorldEvent::Collision(CollisionEvent::Pedestrian { id }));
        }

        if let Some(id) = collision::first_obstacle_hit(&tram_aabb, self.track.segments()) {
            // Terminal, exactly once: later ticks early-out on game_over.
            self.progress.game_over = true;
            self.events
                .push(WorldEvent::Collision(CollisionEvent::Obstacle { id }));
            log::info!(
                "run ended on obstacle {id} at z {:.1} (score {})",
                self.tram.forward,
                self.progress.score
            );
        }
    }

    /// Request a lane change. `lane` is 1-based per the public interface.
    ///
    /// Out-of-range lanes error synchronously (and log); a request for the
    /// current lane with no shift in progress warns and is a no-op.
    pub fn request_lane_change(&mut self, lane: usize) -> Result<(), InvalidLaneError> {
        if lane < 1 || lane > self.config.lane_count {
            let err = InvalidLaneError {
                requested: lane,
                lanes: self.config.lane_count,
            };
            log::warn!("{err}");
            return Err(err);
        }

        let target = lane - 1;
        if target == self.tram.current_lane
            && matches!(self.tram.shift(), LaneShift::Idle)
        {
            log::warn!("lane change to current lane {lane} ignored");
            return Ok(());
        }

        self.tram.begin_shift(target, &self.config);
        Ok(())
    }

    /// Advisory early-warning query: anything collidable within `radius`
    /// of the tram's bounding-volume center. Struck pedestrians excluded.
    pub fn proximity_alert(&self, radius: f32) -> bool {
        collision::proximity_alert(self.tram.aabb().center(), radius, self.track.segments())
    }

    /// Drain accumulated renderer notifications.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, WorldEvent> {
        self.events.drain(..)
    }

    /// Pause or resume ticking.
    pub fn set_paused(&mut self, paused: bool) {
        self.progress.paused = paused;
    }

    /// Snapshot the scoring and progression counters.
    pub fn snapshot(&self) -> Progress {
        self.progress.clone()
    }

    /// Restore previously saved counters over the live ones.
    pub fn restore(&mut self, progress: Progress) {
        if progress.lane < self.config.lane_count {
            self.tram.current_lane = progress.lane;
            self.tram.target_lane = progress.lane;
            self.tram.lateral =
                crate::lane_offset(progress.lane, self.config.lane_count, self.config.track_width);
        }
        self.progress = progress;
    }

    /// Runtime difficulty adjustment. Unlike configuration-time validation,
    /// values are clamped into the valid domain: this runs on a live world
    /// and must not fail.
    pub fn tune_difficulty(
        &mut self,
        growth_factor: f32,
        max_multiplier: f32,
        high_speed_threshold: f32,
    ) {
        self.config.growth_factor = growth_factor.max(TUNING_FLOOR);
        self.config.max_multiplier = max_multiplier.max(1.0);
        self.config.high_speed_threshold = high_speed_threshold.max(TUNING_FLOOR);
    }

    /// Rebuild the run from the existing configuration and a fresh seed.
    /// The only path on which the tram's speed decreases.
    pub fn restart(&mut self, seed: u64) {
        let config = self.config.clone();
        self.track.dispose(&mut self.spawner, &mut self.events);
        self.spawner.dispose();

        self.spawner = Spawner::new(seed, &config);
        self.track = TrackGenerator::new(&config);
        self.track
            .bootstrap(&config, &mut self.spawner, &mut self.events);
        self.tram.reset(&config);
        self.progress = Progress::default();
        self.progress.lane = self.tram.current_lane;
        self.disposed = false;
        log::info!("world restarted (seed {seed})");
    }

    /// Deterministic, total teardown. Every segment and pooled entity is
    /// released and disposed; afterwards the world only answers queries.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.track.dispose(&mut self.spawner, &mut self.events);
        self.spawner.dispose();
        self.disposed = true;
        log::info!("world disposed");
    }

    /// Current configuration
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The avatar
    pub fn tram(&self) -> &Tram {
        &self.tram
    }

    /// Live segments, ordered by index
    pub fn segments(&self) -> impl Iterator<Item = &super::entity::Segment> {
        self.track.segments()
    }

    /// Current counters
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Test hook: jump the tram to a longitudinal position.
    pub fn force_position(&mut self, z: f32) {
        self.tram.force_position(z);
    }

    /// Test hook: override the tram's speed.
    pub fn force_speed(&mut self, speed: f32) {
        self.tram.force_speed(speed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn world(seed: u64) -> World {
        World::new(seed, GameConfig::default()).unwrap()
    }

    /// Tick until the terminal collision; the default config guarantees an
    /// obstacle in the tram's lane eventually.
    fn run_to_game_over(world: &mut World) -> u64 {
        let mut ticks = 0u64;
        while !world.progress().game_over {
            world.advance(SIM_DT);
            ticks += 1;
            assert!(ticks < 2_000_000, "run never terminated");
        }
        ticks
    }

    #[test]
    fn test_new_world_emits_creation_events() {
        let mut world = world(1);
        let events: Vec<WorldEvent> = world.drain_events().collect();
        let created = events
            .iter()
            .filter(|e| matches!(e, WorldEvent::SegmentCreated { .. }))
            .count();
        assert_eq!(created, 8);
        assert!(events
            .iter()
            .any(|e| matches!(e, WorldEvent::ObstacleSpawned { .. })));
    }

    #[test]
    fn test_invalid_configuration_rejected_before_placement() {
        let config = GameConfig {
            min_people_per_lane: 5,
            max_people_per_lane: 3,
            ..GameConfig::default()
        };
        assert!(matches!(
            World::new(1, config),
            Err(ConfigError::InvertedRange { .. })
        ));
    }

    #[test]
    fn test_lane_change_validation() {
        let mut world = world(2);

        assert!(world.request_lane_change(0).is_err());
        assert!(world.request_lane_change(6).is_err());

        // Same lane, no shift in progress: warned no-op
        let current = world.tram().current_lane + 1;
        assert!(world.request_lane_change(current).is_ok());
        assert!(matches!(world.tram().shift(), LaneShift::Idle));

        // A valid request starts a shift
        assert!(world.request_lane_change(1).is_ok());
        assert!(matches!(world.tram().shift(), LaneShift::Active { .. }));
    }

    #[test]
    fn test_rejected_lane_change_leaves_state_unchanged() {
        let mut world = world(2);
        let lane_before = world.tram().current_lane;
        let lateral_before = world.tram().lateral;
        let _ = world.request_lane_change(99);
        assert_eq!(world.tram().current_lane, lane_before);
        assert_eq!(world.tram().lateral, lateral_before);
        assert!(matches!(world.tram().shift(), LaneShift::Idle));
    }

    #[test]
    fn test_pause_stops_motion() {
        let mut world = world(3);
        world.set_paused(true);
        let z = world.tram().forward;
        for _ in 0..100 {
            world.advance(SIM_DT);
        }
        assert_eq!(world.tram().forward, z);

        world.set_paused(false);
        world.advance(SIM_DT);
        assert!(world.tram().forward > z);
    }

    #[test]
    fn test_terminal_collision_is_idempotent() {
        let mut world = world(4);
        run_to_game_over(&mut world);

        let events: Vec<WorldEvent> = world.drain_events().collect();
        let terminal = events
            .iter()
            .filter(|e| matches!(e, WorldEvent::Collision(CollisionEvent::Obstacle { .. })))
            .count();
        assert_eq!(terminal, 1);

        // Repeated ticks after termination change nothing
        let snapshot = world.snapshot();
        let z = world.tram().forward;
        for _ in 0..500 {
            world.advance(SIM_DT);
        }
        assert_eq!(world.snapshot(), snapshot);
        assert_eq!(world.tram().forward, z);
        assert_eq!(world.drain_events().count(), 0);
    }

    #[test]
    fn test_struck_pedestrians_score_once() {
        // Run several seeds; every struck event must pair with one score
        // increment and the struck counter never exceeds spawned pedestrians.
        for seed in 10..14 {
            let mut world = world(seed);
            run_to_game_over(&mut world);
            let progress = world.snapshot();
            assert_eq!(progress.score, progress.struck * PEDESTRIAN_SCORE);
        }
    }

    #[test]
    fn test_progress_counters_track_position() {
        let mut world = world(5);
        for _ in 0..1_000 {
            world.advance(SIM_DT);
            if world.progress().game_over {
                return;
            }
            let progress = world.progress();
            let expected_segment =
                (world.tram().forward / world.config().segment_length) as u64;
            assert_eq!(progress.segment, expected_segment);
            assert_eq!(
                progress.section,
                section_at(world.tram().forward, world.config().segment_length)
            );
        }
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let mut world = world(6);
        for _ in 0..2_000 {
            world.advance(SIM_DT);
        }
        let saved = world.snapshot();
        let json = saved.to_json();

        let mut fresh = self::world(7);
        fresh.restore(Progress::from_json(&json));
        assert_eq!(fresh.snapshot(), saved);
        assert_eq!(fresh.tram().current_lane, saved.lane);
    }

    #[test]
    fn test_tune_difficulty_clamps() {
        let mut world = world(8);
        world.tune_difficulty(0.5, -3.0, 0.2);
        let config = world.config();
        assert!(config.growth_factor > 1.0);
        assert!(config.max_multiplier >= 1.0);
        assert!(config.high_speed_threshold > 1.0);
    }

    #[test]
    fn test_restart_resets_speed_and_counters() {
        let mut world = world(9);
        run_to_game_over(&mut world);
        assert!(world.progress().game_over);

        world.restart(99);
        assert!(!world.progress().game_over);
        assert_eq!(world.tram().forward, 0.0);
        assert_eq!(world.tram().speed, world.config().base_speed);
        assert_eq!(world.snapshot().score, 0);

        // The restarted run ticks normally
        world.advance(SIM_DT);
        assert!(world.tram().forward > 0.0);
    }

    #[test]
    fn test_dispose_is_total_and_final() {
        let mut world = world(11);
        for _ in 0..200 {
            world.advance(SIM_DT);
        }
        world.drain_events().count();

        world.dispose();
        assert_eq!(world.segments().count(), 0);
        let removals = world
            .drain_events()
            .filter(|e| matches!(e, WorldEvent::SegmentRemoved { .. }))
            .count();
        assert!(removals > 0);

        // Ticking a disposed world is a no-op
        let z = world.tram().forward;
        world.advance(SIM_DT);
        assert_eq!(world.tram().forward, z);
    }

    #[test]
    fn test_non_positive_dt_ignored() {
        let mut world = world(12);
        let z = world.tram().forward;
        world.advance(0.0);
        world.advance(-1.0);
        world.advance(f32::NAN);
        assert_eq!(world.tram().forward, z);
    }

    #[test]
    fn test_proximity_alert_eventually_fires() {
        let mut world = world(13);
        let mut fired = false;
        for _ in 0..50_000 {
            world.advance(SIM_DT);
            if world.proximity_alert(10.0) {
                fired = true;
                break;
            }
            if world.progress().game_over {
                break;
            }
        }
        assert!(fired, "no content ever came near the tram");
    }
}
