use std::collections::HashSet;

use approx::assert_relative_eq;
use proptest::prelude::*;
use vialtrack::tracker::{KalmanFilter, LinearParams};
use vialtrack::{Detection, Point, TrackState, Tracker, TrackerConfig};

fn tracker(dist_thresh: f64, max_frames_to_skip: u32) -> Tracker {
    Tracker::new(TrackerConfig {
        dist_thresh,
        max_frames_to_skip,
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn test_single_detection_keeps_one_id() {
    // Frames [(10,10,5)], [(11,10,5)], [(12,10,5)]
    let mut tracker = tracker(5.0, 1);

    let mut last = Vec::new();
    for x in [10.0, 11.0, 12.0] {
        last = tracker.update(&[Detection::new(x, 10.0, 5.0)]);
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].track_id, 0);
        assert_eq!(last[0].last_point, Some(Point::new(x, 10.0)));
    }
    assert_eq!(last[0].trace.len(), 3);
}

#[test]
fn test_unmatched_track_is_retired() {
    let mut tracker = tracker(5.0, 1);

    // Frame 0: two detections, two tracks
    let tracks = tracker.update(&[
        Detection::new(10.0, 10.0, 5.0),
        Detection::new(100.0, 100.0, 5.0),
    ]);
    let ids: Vec<u64> = tracks.iter().map(|t| t.track_id).collect();
    assert_eq!(ids, vec![0, 1]);

    // Frame 1: only the first object; track 1 coasts
    let tracks = tracker.update(&[Detection::new(11.0, 10.0, 5.0)]);
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].track_id, 0);
    assert_eq!(tracks[0].skipped_frames, 0);
    assert_eq!(tracks[1].track_id, 1);
    assert_eq!(tracks[1].skipped_frames, 1);
    assert_eq!(tracks[1].state, TrackState::Coasting);
    assert!(tracks[1].last_point.is_none());

    // Frame 2: track 1 exceeds max_frames_to_skip and is removed
    let tracks = tracker.update(&[Detection::new(12.0, 10.0, 5.0)]);
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].track_id, 0);

    // It never comes back under the same id
    let tracks = tracker.update(&[
        Detection::new(13.0, 10.0, 5.0),
        Detection::new(100.0, 100.0, 5.0),
    ]);
    let ids: Vec<u64> = tracks.iter().map(|t| t.track_id).collect();
    assert_eq!(ids, vec![0, 2]);
}

#[test]
fn test_coasting_track_recovers() {
    let mut tracker = tracker(5.0, 2);
    tracker.update(&[Detection::new(20.0, 20.0, 5.0)]);
    let tracks = tracker.update(&[]);
    assert_eq!(tracks[0].state, TrackState::Coasting);

    let tracks = tracker.update(&[Detection::new(20.5, 20.0, 5.0)]);
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].track_id, 0);
    assert_eq!(tracks[0].state, TrackState::Active);
    assert_eq!(tracks[0].skipped_frames, 0);
}

#[test]
fn test_two_objects_keep_their_ids() {
    let mut tracker = tracker(10.0, 1);
    for step in 0..20 {
        let s = step as f64;
        let tracks = tracker.update(&[
            Detection::new(10.0 + s, 10.0, 5.0),
            Detection::new(200.0 - s, 80.0, 9.0),
        ]);
        assert_eq!(tracks.len(), 2);
        for t in &tracks {
            let p = t.last_point.unwrap();
            match t.track_id {
                0 => assert_relative_eq!(p.y, 10.0),
                1 => assert_relative_eq!(p.y, 80.0),
                id => panic!("unexpected track {id}"),
            }
        }
    }
}

#[test]
fn test_trace_length_is_bounded() {
    let mut tracker = Tracker::new(TrackerConfig {
        dist_thresh: 5.0,
        max_trace_length: 4,
        ..Default::default()
    })
    .unwrap();
    for i in 0..12 {
        let tracks = tracker.update(&[Detection::new(i as f64 * 0.5, 0.0, 5.0)]);
        assert_eq!(tracks[0].trace.len(), (i + 1).min(4));
    }
}

#[test]
fn test_noiseless_linear_update_returns_measurement() {
    let params = LinearParams {
        process_noise: 0.0,
        measurement_noise: 0.0,
        ..Default::default()
    };
    let kf = KalmanFilter::new(&params, 0.005);
    let (mean, cov) = kf.initiate(Point::new(0.0, 0.0));
    let (mean, cov) = kf.predict(&mean, &cov);
    let (mean, _) = kf.update(&mean, &cov, Some(Point::new(-3.0, 8.0)));
    let p = kf.position(&mean);
    assert_relative_eq!(p.x, -3.0, epsilon = 1e-9);
    assert_relative_eq!(p.y, 8.0, epsilon = 1e-9);
}

#[test]
fn test_track_serializes() {
    let mut tracker = tracker(5.0, 1);
    let tracks = tracker.update(&[Detection::new(1.0, 2.0, 3.0)]);
    let json = serde_json::to_value(&tracks[0]).unwrap();
    assert_eq!(json["track_id"], 0);
    assert_eq!(json["state"], "Active");
    assert_eq!(json["trace"].as_array().unwrap().len(), 1);
    assert_eq!(json["last_point"]["x"], 1.0);
}

fn frames_strategy() -> impl Strategy<Value = Vec<Vec<(f64, f64, f64)>>> {
    prop::collection::vec(
        prop::collection::vec((0.0..200.0f64, 0.0..200.0f64, 1.0..50.0f64), 0..6),
        1..30,
    )
}

proptest! {
    #[test]
    fn prop_ids_are_never_reused(frames in frames_strategy(), max_skip in 0u32..4) {
        let mut tracker = Tracker::new(TrackerConfig {
            dist_thresh: 20.0,
            max_frames_to_skip: max_skip,
            max_trace_length: 5,
            starting_track_id: 7,
            ..Default::default()
        })
        .unwrap();

        let mut retired: HashSet<u64> = HashSet::new();
        let mut previous: HashSet<u64> = HashSet::new();
        let mut highest_seen: Option<u64> = None;

        for frame in frames {
            let dets: Vec<Detection> = frame
                .iter()
                .map(|&(x, y, a)| Detection::new(x, y, a))
                .collect();
            let tracks = tracker.update(&dets);

            let current: HashSet<u64> = tracks.iter().map(|t| t.track_id).collect();
            prop_assert_eq!(current.len(), tracks.len());

            for t in &tracks {
                prop_assert!(t.track_id >= 7);
                prop_assert!(t.track_id < tracker.next_track_id());
                prop_assert!(!retired.contains(&t.track_id));
                prop_assert!(t.trace.len() <= 5);
                prop_assert!(t.skipped_frames <= max_skip);
                if !previous.contains(&t.track_id) {
                    // Newly born ids exceed every id handed out before.
                    if let Some(h) = highest_seen {
                        prop_assert!(t.track_id > h);
                    }
                }
            }

            for id in previous.difference(&current) {
                retired.insert(*id);
            }
            if let Some(max) = current.iter().max() {
                highest_seen = Some(highest_seen.map_or(*max, |h| h.max(*max)));
            }
            previous = current;
        }
    }
}
