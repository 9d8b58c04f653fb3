//! Tram motion
//!
//! Forward position always increases; speed is recomputed exactly once per
//! newly crossed section boundary, looping over every boundary a large `dt`
//! may span. Lane changes follow a fixed-length S-curve whose forward span
//! is `base_speed * transition_duration`, so a speed change mid-maneuver
//! never stretches or compresses it.

use glam::Vec3;
use thiserror::Error;

use super::aabb::Aabb;
use super::difficulty::{section_at, speed_multiplier};
use crate::consts::{TRAM_HALF_HEIGHT, TRAM_HALF_LENGTH, TRAM_HALF_WIDTH};
use crate::{lane_offset, smoothstep, GameConfig};

/// Lane index outside the valid `1..=N` range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("lane {requested} is outside 1..={lanes}")]
pub struct InvalidLaneError {
    pub requested: usize,
    pub lanes: usize,
}

/// Lateral state of the tram
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LaneShift {
    /// Tracking the current lane's offset
    Idle,
    /// Riding the S-curve between two lateral offsets
    Active {
        from_x: f32,
        to_x: f32,
        start_z: f32,
        end_z: f32,
        target_lane: usize,
    },
}

/// The player-controlled rail vehicle
#[derive(Debug, Clone)]
pub struct Tram {
    /// Longitudinal position
    pub forward: f32,
    /// Lateral position
    pub lateral: f32,
    /// Committed lane (0-based)
    pub current_lane: usize,
    /// Lane the tram is heading to (equals `current_lane` when idle)
    pub target_lane: usize,
    /// Forward speed; non-decreasing except on explicit reset
    pub speed: f32,
    /// Sections fully entered so far; drives the speed multiplier
    pub sections_passed: u32,
    shift: LaneShift,
}

impl Tram {
    /// Spawn at the origin on the center lane at base speed.
    pub fn new(config: &GameConfig) -> Self {
        let lane = config.lane_count / 2;
        Self {
            forward: 0.0,
            lateral: lane_offset(lane, config.lane_count, config.track_width),
            current_lane: lane,
            target_lane: lane,
            speed: config.base_speed,
            sections_passed: 0,
            shift: LaneShift::Idle,
        }
    }

    /// Active lane shift, if any
    pub fn shift(&self) -> &LaneShift {
        &self.shift
    }

    /// Advance one tick. Returns how many section boundaries were crossed.
    pub fn advance(&mut self, dt: f32, config: &GameConfig) -> u32 {
        let previous = self.forward;
        self.forward += self.speed * dt;

        // One speed increment per newly entered section, in order. A single
        // tick can span several boundaries under a large dt.
        let from = section_at(previous, config.segment_length);
        let to = section_at(self.forward, config.segment_length);
        let crossed = (to - from).min(u32::MAX as u64) as u32;
        for _ in 0..crossed {
            self.sections_passed += 1;
            self.speed = config.base_speed * speed_multiplier(config, self.sections_passed);
        }

        self.step_shift();
        crossed
    }

    /// Sample the lane-shift curve at the current forward position and
    /// commit the lane once the curve ends. Completion is driven by
    /// distance, not wall-clock time.
    fn step_shift(&mut self) {
        if let LaneShift::Active {
            from_x,
            to_x,
            start_z,
            end_z,
            target_lane,
        } = self.shift
        {
            let span = end_z - start_z;
            let t = if span > 0.0 {
                (self.forward - start_z) / span
            } else {
                1.0
            };
            self.lateral = from_x + (to_x - from_x) * smoothstep(t);

            if self.forward >= end_z {
                self.lateral = to_x;
                self.current_lane = target_lane;
                self.target_lane = target_lane;
                self.shift = LaneShift::Idle;
            }
        }
    }

    /// Begin a lane change toward `lane` (0-based, already validated).
    /// Discards any shift in progress, restarting the curve from the
    /// current lateral position.
    pub fn begin_shift(&mut self, lane: usize, config: &GameConfig) {
        let to_x = lane_offset(lane, config.lane_count, config.track_width);
        let span = config.base_speed * config.transition_duration;
        self.shift = LaneShift::Active {
            from_x: self.lateral,
            to_x,
            start_z: self.forward,
            end_z: self.forward + span,
            target_lane: lane,
        };
        self.target_lane = lane;
    }

    /// World-space bounding volume of the tram body
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_half_extents(
            Vec3::new(self.lateral, TRAM_HALF_HEIGHT, self.forward),
            Vec3::new(TRAM_HALF_WIDTH, TRAM_HALF_HEIGHT, TRAM_HALF_LENGTH),
        )
    }

    /// Test hook: jump to a longitudinal position without side effects.
    pub fn force_position(&mut self, z: f32) {
        self.forward = z;
    }

    /// Test hook: override the current speed.
    pub fn force_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Reset to the starting state; the only path on which speed decreases.
    pub fn reset(&mut self, config: &GameConfig) {
        *self = Self::new(config);
    }
}
