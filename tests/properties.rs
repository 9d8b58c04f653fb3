//! Randomized property tests over the simulation core.

use proptest::prelude::*;

use tram_rush::consts::{
    PLACEMENT_BAND_MAX, PLACEMENT_BAND_MIN, SIM_DT, STARTER_SEGMENTS,
};
use tram_rush::sim::{
    section_at, section_of_segment, EntityPool, Lane, Poolable, Segment, Spawner, World,
};
use tram_rush::{lane_offset, GameConfig};

fn full_segment(index: u64, config: &GameConfig) -> Segment {
    let mut segment = Segment::default();
    segment.index = index;
    segment.start_z = index as f32 * config.segment_length;
    segment.end_z = (index + 1) as f32 * config.segment_length;
    segment.lanes = (0..config.lane_count)
        .map(|i| Lane {
            index: i,
            offset_x: lane_offset(i, config.lane_count, config.track_width),
        })
        .collect();
    segment.generated = true;
    segment.visible = true;
    segment
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every placement lands inside its section's band, for any seed.
    #[test]
    fn placement_band_holds(seed in any::<u64>()) {
        let config = GameConfig::default();
        let mut spawner = Spawner::new(seed, &config);
        let section_length = config.section_length();

        for index in STARTER_SEGMENTS..STARTER_SEGMENTS + 40 {
            let mut segment = full_segment(index, &config);
            let mut events = Vec::new();
            spawner.populate(&mut segment, &config, &mut events);

            let start = section_of_segment(index) as f32 * section_length;
            let lo = start + PLACEMENT_BAND_MIN * section_length;
            let hi = start + PLACEMENT_BAND_MAX * section_length;
            for obstacle in &segment.obstacles {
                prop_assert!(obstacle.position.z >= lo && obstacle.position.z <= hi);
            }
            for pedestrian in &segment.pedestrians {
                prop_assert!(pedestrian.position.z >= lo && pedestrian.position.z <= hi);
            }
            let _ = spawner.recycle_content(&mut segment, &mut events);
        }
    }

    /// Lane picks within one placement call are distinct and ascending, for
    /// any seed and lane count.
    #[test]
    fn lane_picks_are_distinct(seed in any::<u64>(), lane_count in 1usize..8) {
        let config = GameConfig::customized(|c| {
            c.lane_count = lane_count;
            c.min_high_obstacles = 2;
            c.max_high_obstacles = 6;
        }).unwrap();
        let mut spawner = Spawner::new(seed, &config);

        for index in 40..80u64 {
            let mut segment = full_segment(index, &config);
            let mut events = Vec::new();
            spawner.populate(&mut segment, &config, &mut events);

            let lanes: Vec<usize> = segment.obstacles.iter().map(|o| o.lane).collect();
            prop_assert!(lanes.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(lanes.len() <= lane_count);
            let _ = spawner.recycle_content(&mut segment, &mut events);
        }
    }

    /// The two section derivations agree at every segment boundary for
    /// segment lengths whose section length is exactly representable.
    #[test]
    fn section_derivations_agree(
        length_index in 0usize..8,
        segment in 0u64..2_000,
    ) {
        let lengths = [8.0f32, 12.0, 16.0, 24.0, 32.0, 40.0, 48.0, 60.0];
        let length = lengths[length_index];
        let z = segment as f32 * length;
        prop_assert_eq!(section_at(z, length), section_of_segment(segment));
    }

    /// Identical seeds and inputs replay to identical worlds.
    #[test]
    fn same_seed_same_run(seed in any::<u64>()) {
        let mut a = World::new(seed, GameConfig::default()).unwrap();
        let mut b = World::new(seed, GameConfig::default()).unwrap();

        for tick in 0..600u32 {
            if tick % 97 == 0 {
                let lane = (tick as usize / 97) % a.config().lane_count + 1;
                let _ = a.request_lane_change(lane);
                let _ = b.request_lane_change(lane);
            }
            a.advance(SIM_DT);
            b.advance(SIM_DT);
        }

        prop_assert_eq!(a.tram().forward, b.tram().forward);
        prop_assert_eq!(a.tram().lateral, b.tram().lateral);
        prop_assert_eq!(a.tram().speed, b.tram().speed);
        prop_assert_eq!(a.snapshot(), b.snapshot());
        prop_assert_eq!(a.segments().count(), b.segments().count());
    }

    /// Pool round trips: N acquires then N releases leaves
    /// available == min(N, capacity) with exactly N creations.
    #[test]
    fn pool_round_trip(n in 1usize..64, capacity in 1usize..32) {
        #[derive(Default)]
        struct Token {
            disposed: bool,
        }
        impl Poolable for Token {
            fn reset(&mut self) {}
            fn dispose(&mut self) {
                self.disposed = true;
            }
            fn is_disposed(&self) -> bool {
                self.disposed
            }
        }

        let mut pool = EntityPool::new(capacity, Token::default);
        let held: Vec<_> = (0..n).map(|_| pool.acquire()).collect();
        prop_assert_eq!(pool.created(), n);
        for entry in held {
            pool.release(entry);
        }
        prop_assert_eq!(pool.available(), n.min(capacity));
        prop_assert_eq!(pool.in_use(), 0);
    }
}
