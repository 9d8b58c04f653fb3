//! Game configuration
//!
//! Every numeric field is validated when a configuration is constructed or
//! merged; invalid values surface a [`ConfigError`] immediately instead of
//! being clamped. Runtime difficulty tweaks go through
//! [`crate::sim::World::tune_difficulty`], which clamps instead; nothing on
//! the live tick path is allowed to fail.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration rejected at set/merge time
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A length, speed, duration or count that must be positive was not
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f64 },

    /// A `[min, max]` pair with min above max
    #[error("{field} range is inverted (min {min} > max {max})")]
    InvertedRange {
        field: &'static str,
        min: u32,
        max: u32,
    },

    /// High-speed threshold must exceed 1 so the run starts outside
    /// high-speed mode
    #[error("high_speed_threshold must exceed 1 (got {value})")]
    ThresholdTooLow { value: f32 },

    /// Growth factor must exceed 1 for the speed curve to ramp
    #[error("growth_factor must exceed 1 (got {value})")]
    GrowthTooSmall { value: f32 },
}

/// Full simulation configuration
///
/// `Default` gives a playable baseline; callers typically start from it and
/// override a few fields, then construct the world (which re-validates).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Track layout ===
    /// Number of lanes on full-width segments
    pub lane_count: usize,
    /// Half the lane spacing; lanes sit `2 * track_width` apart
    pub track_width: f32,
    /// Longitudinal length of one segment
    pub segment_length: f32,

    // === Speed progression ===
    /// Forward speed before any difficulty scaling
    pub base_speed: f32,
    /// Per-section geometric growth of the speed multiplier
    pub growth_factor: f32,
    /// Saturation cap for the speed multiplier
    pub max_multiplier: f32,
    /// Multiplier at or above which high-speed mode begins
    pub high_speed_threshold: f32,

    // === Content density ===
    /// Obstacles per placement in high-speed mode, inclusive range
    pub min_high_obstacles: u32,
    pub max_high_obstacles: u32,
    /// Pedestrians per lane, inclusive range
    pub min_people_per_lane: u32,
    pub max_people_per_lane: u32,
    /// Force one randomly chosen lane to carry exactly one pedestrian
    pub guarantee_single_pedestrian: bool,

    // === Generation pacing ===
    /// Segments kept visible ahead of the tram
    pub max_visible_segments: u32,
    /// Extra segments generated beyond the visible set
    pub generation_buffer: u32,
    /// Additional lookahead once segment progress passes 60%
    pub lookahead_bonus: u32,
    /// Distance behind the tram past which segments are culled
    pub cleanup_distance: f32,

    // === Lane changes ===
    /// Duration of a lane change at base speed; the forward span of the
    /// S-curve is `base_speed * transition_duration` regardless of current
    /// speed
    pub transition_duration: f32,

    // === Pooling ===
    /// Idle-capacity caps for the entity pools
    pub obstacle_pool_size: usize,
    pub pedestrian_pool_size: usize,
    pub segment_pool_size: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            lane_count: 5,
            track_width: 2.0,
            segment_length: 24.0,

            base_speed: 7.0,
            growth_factor: 1.25,
            max_multiplier: 7.0,
            high_speed_threshold: 3.0,

            min_high_obstacles: 2,
            max_high_obstacles: 3,
            min_people_per_lane: 0,
            max_people_per_lane: 2,
            guarantee_single_pedestrian: true,

            max_visible_segments: 6,
            generation_buffer: 2,
            lookahead_bonus: 2,
            cleanup_distance: 60.0,

            transition_duration: 0.5,

            obstacle_pool_size: 32,
            pedestrian_pool_size: 64,
            segment_pool_size: 16,
        }
    }
}

impl GameConfig {
    /// Validate every numeric field, returning the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::NonPositive {
                    field,
                    value: value as f64,
                })
            }
        }

        if self.lane_count == 0 {
            return Err(ConfigError::NonPositive {
                field: "lane_count",
                value: 0.0,
            });
        }
        positive("track_width", self.track_width)?;
        positive("segment_length", self.segment_length)?;
        positive("base_speed", self.base_speed)?;
        positive("max_multiplier", self.max_multiplier)?;
        positive("cleanup_distance", self.cleanup_distance)?;
        positive("transition_duration", self.transition_duration)?;
        if self.max_visible_segments == 0 {
            return Err(ConfigError::NonPositive {
                field: "max_visible_segments",
                value: 0.0,
            });
        }

        if self.growth_factor <= 1.0 {
            return Err(ConfigError::GrowthTooSmall {
                value: self.growth_factor,
            });
        }
        if self.high_speed_threshold <= 1.0 {
            return Err(ConfigError::ThresholdTooLow {
                value: self.high_speed_threshold,
            });
        }

        if self.min_high_obstacles > self.max_high_obstacles {
            return Err(ConfigError::InvertedRange {
                field: "high_obstacles",
                min: self.min_high_obstacles,
                max: self.max_high_obstacles,
            });
        }
        if self.min_people_per_lane > self.max_people_per_lane {
            return Err(ConfigError::InvertedRange {
                field: "people_per_lane",
                min: self.min_people_per_lane,
                max: self.max_people_per_lane,
            });
        }

        Ok(())
    }

    /// Build a validated configuration from a closure of overrides applied
    /// to the defaults.
    pub fn customized(apply: impl FnOnce(&mut Self)) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Merge fields from a JSON payload over this configuration, validating
    /// the result before committing. The existing configuration is untouched
    /// when the merged result is invalid.
    pub fn merge_json(&mut self, json: &str) -> Result<(), ConfigError> {
        let overlay = match serde_json::from_str::<serde_json::Value>(json) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("ignoring malformed config payload: {err}");
                return Ok(());
            }
        };

        let Ok(mut base) = serde_json::to_value(&*self) else {
            return Ok(());
        };
        if let (Some(base_map), Some(overlay_map)) = (base.as_object_mut(), overlay.as_object()) {
            for (key, value) in overlay_map {
                base_map.insert(key.clone(), value.clone());
            }
        }
        let merged = match serde_json::from_value::<Self>(base) {
            Ok(merged) => merged,
            Err(err) => {
                log::warn!("ignoring ill-typed config payload: {err}");
                return Ok(());
            }
        };

        merged.validate()?;
        *self = merged;
        Ok(())
    }

    /// Lane spacing on full-width segments
    #[inline]
    pub fn lane_spacing(&self) -> f32 {
        self.track_width * 2.0
    }

    /// Longitudinal length of one section (2.5 segments)
    #[inline]
    pub fn section_length(&self) -> f32 {
        self.segment_length * crate::consts::SECTION_SEGMENTS
    }
}
