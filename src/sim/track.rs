//! Track generation
//!
//! Produces segments just-in-time ahead of the tram and culls them once they
//! fall behind the cleanup distance. Per-tick work is bounded: at most
//! [`MAX_SEGMENTS_PER_TICK`](crate::consts::MAX_SEGMENTS_PER_TICK) segments
//! are generated each update, the lookahead stretches near segment
//! boundaries to avoid stalls, and cleanup runs only in the quiet first
//! tenth of a segment.
//!
//! Per-index lifecycle: not generated → generated & visible → invisible →
//! disposed. Creation is idempotent; disposal is irreversible.

use std::collections::BTreeMap;

use super::entity::{Lane, Segment};
use super::pool::{EntityPool, PoolEntry};
use super::spawn::Spawner;
use super::world::WorldEvent;
use crate::consts::{
    CLEANUP_PROGRESS, LOOKAHEAD_EXTEND_PROGRESS, MAX_SEGMENTS_PER_TICK, STARTER_SEGMENTS,
};
use crate::{lane_offset, GameConfig};

/// Lazily generates and culls track segments around the tram.
pub struct TrackGenerator {
    /// Live segments, ordered by index for stable iteration and range scans
    segments: BTreeMap<u64, PoolEntry<Segment>>,
    pool: EntityPool<Segment>,
    /// Next index the generation front will produce
    next_index: u64,
}

impl TrackGenerator {
    pub fn new(config: &GameConfig) -> Self {
        let mut pool = EntityPool::new(config.segment_pool_size, Segment::default);
        pool.prewarm(config.segment_pool_size / 2);
        Self {
            segments: BTreeMap::new(),
            pool,
            next_index: 0,
        }
    }

    /// Eagerly generate the initial stretch. Startup is exempt from the
    /// per-tick generation cap.
    pub fn bootstrap(
        &mut self,
        config: &GameConfig,
        spawner: &mut Spawner,
        events: &mut Vec<WorldEvent>,
    ) {
        let initial = (config.max_visible_segments + config.generation_buffer) as u64;
        for _ in 0..initial {
            let index = self.next_index;
            self.next_index += 1;
            self.generate(index, config, spawner, events);
        }
        self.refresh_visibility(0.0, config);
        log::info!("track bootstrapped with {initial} segments");
    }

    /// Create the segment for `index` unless it already exists. A repeated
    /// request returns without touching the existing segment.
    fn generate(
        &mut self,
        index: u64,
        config: &GameConfig,
        spawner: &mut Spawner,
        events: &mut Vec<WorldEvent>,
    ) {
        if self.segments.contains_key(&index) {
            return;
        }

        let mut segment = self.pool.acquire();
        segment.index = index;
        segment.start_z = index as f32 * config.segment_length;
        segment.end_z = (index + 1) as f32 * config.segment_length;
        segment.generated = true;
        segment.visible = true;

        // The starter stretch keeps a single lane, centered so it lines up
        // with the middle of the full layout.
        if index < STARTER_SEGMENTS {
            segment.lanes.push(Lane {
                index: 0,
                offset_x: 0.0,
            });
        } else {
            for lane in 0..config.lane_count {
                segment.lanes.push(Lane {
                    index: lane,
                    offset_x: lane_offset(lane, config.lane_count, config.track_width),
                });
            }
        }

        // One marker per section boundary inside the span. Boundary k sits
        // at k * 2.5 segment lengths; it falls inside segment `index` when
        // 5k >= 2*index and 5k < 2*(index + 1). The origin boundary is
        // suppressed for segment 0.
        let section_length = config.section_length();
        let mut k = (index * 2).div_ceil(5);
        while k * 5 < (index + 1) * 2 {
            if !(k == 0 && index == 0) {
                segment.markers.push(k as f32 * section_length);
            }
            k += 1;
        }

        events.push(WorldEvent::SegmentCreated {
            index,
            start_z: segment.start_z,
            end_z: segment.end_z,
            lane_count: segment.lanes.len(),
        });

        spawner.populate(&mut segment, config, events);
        let _ = self.segments.insert(index, segment);
    }

    /// Per-tick update: extend the track ahead of the tram and cull behind
    /// it. Returns the number of pedestrians culled unstruck.
    pub fn update(
        &mut self,
        tram_z: f32,
        config: &GameConfig,
        spawner: &mut Spawner,
        events: &mut Vec<WorldEvent>,
    ) -> u64 {
        let segment_length = config.segment_length;
        let current = (tram_z.max(0.0) / segment_length) as u64;
        let progress = (tram_z.max(0.0) / segment_length).fract();

        // Near the end of a segment the lookahead stretches so the front
        // never stalls right at a boundary.
        let mut lookahead = (config.max_visible_segments + config.generation_buffer) as u64;
        if progress > LOOKAHEAD_EXTEND_PROGRESS {
            lookahead += config.lookahead_bonus as u64;
        }

        let target = current + lookahead;
        let mut generated = 0;
        while self.next_index <= target && generated < MAX_SEGMENTS_PER_TICK {
            let index = self.next_index;
            self.next_index += 1;
            self.generate(index, config, spawner, events);
            generated += 1;
        }

        self.refresh_visibility(tram_z, config);

        // Cleanup is throttled to the quiet start of each segment.
        if progress < CLEANUP_PROGRESS {
            self.cull_behind(tram_z, config, spawner, events)
        } else {
            0
        }
    }

    /// Visibility is a pure function of distance from the tram.
    fn refresh_visibility(&mut self, tram_z: f32, config: &GameConfig) {
        let ahead_limit = config.max_visible_segments as f32 * config.segment_length;
        let behind_limit = config.segment_length;
        for segment in self.segments.values_mut() {
            segment.visible =
                segment.start_z - tram_z < ahead_limit && tram_z - segment.end_z < behind_limit;
        }
    }

    fn cull_behind(
        &mut self,
        tram_z: f32,
        config: &GameConfig,
        spawner: &mut Spawner,
        events: &mut Vec<WorldEvent>,
    ) -> u64 {
        let horizon = tram_z - config.cleanup_distance;
        let doomed: Vec<u64> = self
            .segments
            .values()
            .take_while(|segment| segment.end_z < horizon)
            .map(|segment| segment.index)
            .collect();

        let mut avoided = 0;
        for index in doomed {
            if let Some(mut segment) = self.segments.remove(&index) {
                avoided += spawner.recycle_content(&mut segment, events);
                events.push(WorldEvent::SegmentRemoved { index });
                self.pool.release(segment);
            }
        }
        avoided
    }

    /// Ordered iteration over live segments
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.values().map(|entry| &**entry)
    }

    /// Mutable ordered iteration over live segments
    pub fn segments_mut(&mut self) -> impl Iterator<Item = &mut Segment> {
        self.segments.values_mut().map(|entry| &mut **entry)
    }

    /// Segment record by index
    pub fn segment(&self, index: u64) -> Option<&Segment> {
        self.segments.get(&index).map(|entry| &**entry)
    }

    /// Number of live segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether no segments are live
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Tear down every segment and the pool. Total and deterministic.
    pub fn dispose(
        &mut self,
        spawner: &mut Spawner,
        events: &mut Vec<WorldEvent>,
    ) {
        let indices: Vec<u64> = self.segments.keys().copied().collect();
        for index in indices {
            if let Some(mut segment) = self.segments.remove(&index) {
                let _ = spawner.recycle_content(&mut segment, events);
                events.push(WorldEvent::SegmentRemoved { index });
                self.pool.release(segment);
            }
        }
        self.pool.clear();
    }
}
