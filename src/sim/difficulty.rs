//! Difficulty progression
//!
//! Pure functions over counters owned elsewhere (the tram owns
//! `sections_passed`, the spawner owns its placement counters). Speed grows
//! geometrically per section and saturates at a configured cap; once the
//! multiplier crosses the high-speed threshold, obstacle density rises.

use rand::Rng;

use crate::GameConfig;
use crate::consts::SECTION_SEGMENTS;

/// Section index containing a segment: `floor(segment / 2.5)`.
///
/// Written in integer arithmetic so it agrees exactly with the
/// position-based derivation at every segment boundary.
#[inline]
pub fn section_of_segment(segment: u64) -> u64 {
    segment * 2 / 5
}

/// Section index containing a longitudinal position.
#[inline]
pub fn section_at(z: f32, segment_length: f32) -> u64 {
    let section_length = segment_length * SECTION_SEGMENTS;
    if z <= 0.0 {
        0
    } else {
        (z / section_length) as u64
    }
}

/// Speed multiplier after `sections_passed` sections:
/// `min(max_multiplier, growth_factor ^ sections_passed)`.
pub fn speed_multiplier(config: &GameConfig, sections_passed: u32) -> f32 {
    config
        .growth_factor
        .powi(sections_passed.min(i32::MAX as u32) as i32)
        .min(config.max_multiplier)
}

/// Whether the run is in high-speed mode after `sections_passed` sections.
pub fn is_high_speed(config: &GameConfig, sections_passed: u32) -> bool {
    speed_multiplier(config, sections_passed) >= config.high_speed_threshold
}

/// Obstacles to place on a segment: one below high-speed mode, otherwise a
/// uniform draw from the configured range.
pub fn obstacle_count(config: &GameConfig, segment: u64, rng: &mut impl Rng) -> u32 {
    let section = section_of_segment(segment);
    let sections_passed = section.min(u32::MAX as u64) as u32;
    if !is_high_speed(config, sections_passed) {
        1
    } else {
        rng.random_range(config.min_high_obstacles..=config.max_high_obstacles)
    }
}
