//! Run progress for save/resume
//!
//! A flat snapshot of the scoring and progression counters. Round-tripping
//! through serialize → deserialize reproduces identical values
//! field-for-field. Decoding is tolerant: a syntactically invalid payload
//! resets to defaults, a valid-but-partial payload merges the present
//! fields over defaults.

use serde::{Deserialize, Serialize};

/// Scoring and progression counters persisted between sessions
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    /// Accumulated score
    pub score: u64,
    /// Pedestrians struck so far
    pub struck: u64,
    /// Pedestrians that left the world unstruck
    pub avoided: u64,
    /// Section the tram is currently in
    pub section: u64,
    /// Segment the tram is currently in
    pub segment: u64,
    /// Current lane (0-based)
    pub lane: usize,
    /// Whether the run is paused
    pub paused: bool,
    /// Whether the run has ended on an obstacle hit
    pub game_over: bool,
}

impl Progress {
    /// Serialize to a JSON payload.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| {
            log::warn!("progress serialization failed: {err}");
            String::from("{}")
        })
    }

    /// Decode a JSON payload.
    ///
    /// Invalid syntax resets to defaults; missing fields take their default
    /// values, so a partial payload never mixes stale state with new.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(progress) => progress,
            Err(err) => {
                log::warn!("progress payload rejected, resetting to defaults: {err}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Progress {
        Progress {
            score: 1250,
            struck: 50,
            avoided: 31,
            section: 14,
            segment: 36,
            lane: 3,
            paused: false,
            game_over: true,
        }
    }

    #[test]
    fn test_round_trip_is_field_for_field() {
        let progress = sample();
        let decoded = Progress::from_json(&progress.to_json());
        assert_eq!(decoded, progress);
    }

    #[test]
    fn test_invalid_payload_resets_to_defaults() {
        assert_eq!(Progress::from_json("definitely not json"), Progress::default());
        assert_eq!(Progress::from_json(""), Progress::default());
    }

    #[test]
    fn test_partial_payload_merges_over_defaults() {
        let decoded = Progress::from_json(r#"{"score": 400, "lane": 2}"#);
        assert_eq!(decoded.score, 400);
        assert_eq!(decoded.lane, 2);
        // Every absent field holds its default
        assert_eq!(decoded.struck, 0);
        assert_eq!(decoded.avoided, 0);
        assert_eq!(decoded.section, 0);
        assert!(!decoded.paused);
        assert!(!decoded.game_over);
    }
}
