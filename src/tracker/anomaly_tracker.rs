//! Frame-to-frame anomaly tracker.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Result, TrackerError, ensure_finite, ensure_non_negative, ensure_positive};
use crate::tracker::estimator::{MotionModel, StateEstimator};
use crate::tracker::matching::{self, Detection};
use crate::tracker::track::Track;

/// Configuration for the [`Tracker`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Highest association cost still accepted as a match
    pub dist_thresh: f64,
    /// Consecutive misses a track survives
    pub max_frames_to_skip: u32,
    /// Number of past positions kept per track
    pub max_trace_length: usize,
    /// First id handed out
    pub starting_track_id: u64,
    /// Weight of the centroid distance in the cost
    pub distance_weight: f64,
    /// Weight of the area difference in the cost
    pub size_weight: f64,
    /// Seconds between frames
    pub frame_interval: f64,
    /// Estimator used for every track
    pub motion_model: MotionModel,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            dist_thresh: 50.0,
            max_frames_to_skip: 5,
            max_trace_length: 10,
            starting_track_id: 0,
            distance_weight: 1.0,
            size_weight: 0.2,
            frame_interval: 0.005,
            motion_model: MotionModel::default(),
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("dist_thresh", self.dist_thresh)?;
        if self.max_trace_length == 0 {
            return Err(TrackerError::config("max_trace_length", "must be positive"));
        }
        ensure_finite("distance_weight", self.distance_weight)?;
        ensure_finite("size_weight", self.size_weight)?;
        ensure_positive("frame_interval", self.frame_interval)?;
        self.motion_model.validate()
    }
}

/// Associates detections with tracks frame by frame.
///
/// Frames must be fed in arrival order; every step depends on the track states
/// left by the previous one.
pub struct Tracker {
    tracks: Vec<Track>,
    frame_id: u32,
    next_id: u64,
    config: TrackerConfig,
    estimator: StateEstimator,
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        let estimator = StateEstimator::new(&config.motion_model, config.frame_interval);
        Ok(Self {
            tracks: Vec::new(),
            frame_id: 0,
            next_id: config.starting_track_id,
            config,
            estimator,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Live tracks after the last processed frame.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Number of frames processed so far.
    pub fn frame_id(&self) -> u32 {
        self.frame_id
    }

    /// Id the next spawned track will receive.
    pub fn next_track_id(&self) -> u64 {
        self.next_id
    }

    /// Drop every live track. Ids keep counting from where they were.
    pub fn reset(&mut self) {
        self.tracks.clear();
        self.frame_id = 0;
    }

    /// Process one frame of (already stationary-filtered) detections and
    /// return the live tracks.
    pub fn update(&mut self, detections: &[Detection]) -> Vec<Track> {
        self.frame_id += 1;
        trace!(
            frame = self.frame_id,
            detections = detections.len(),
            tracks = self.tracks.len(),
            "tracker update"
        );

        // Per-track associated detection index, kept in lock-step with tracks.
        let mut assignment: Vec<Option<usize>>;

        if self.tracks.is_empty() {
            // Step 1: nothing to associate with, every detection starts a track.
            assignment = Vec::with_capacity(detections.len());
            for (idx, det) in detections.iter().enumerate() {
                self.spawn(det);
                assignment.push(Some(idx));
            }
        } else {
            // Step 2-4: cost, optimal assignment, distance gate
            let dists = matching::cost_matrix(
                &self.tracks,
                detections,
                self.config.distance_weight,
                self.config.size_weight,
            );
            let result = matching::linear_assignment(&dists, self.config.dist_thresh);
            trace!(
                matched = result.matches.len(),
                unmatched_tracks = result.unmatched_tracks.len(),
                unmatched_detections = result.unmatched_detections.len(),
                "association"
            );

            // Step 5: count misses
            for &row in &result.unmatched_tracks {
                self.tracks[row].mark_missed();
            }

            // Step 6: retire tracks missing for too long
            let max_skip = self.config.max_frames_to_skip;
            let frame_id = self.frame_id;
            let (tracks, kept_assignment): (Vec<Track>, Vec<Option<usize>>) = self
                .tracks
                .drain(..)
                .zip(result.assignment)
                .filter_map(|(mut track, slot)| {
                    if track.skipped_frames > max_skip {
                        track.mark_retired();
                        debug!(
                            track_id = track.track_id,
                            skipped_frames = track.skipped_frames,
                            age = track.age(frame_id),
                            "retiring track"
                        );
                        None
                    } else {
                        Some((track, slot))
                    }
                })
                .unzip();
            self.tracks = tracks;
            assignment = kept_assignment;

            // Step 7: unclaimed detections start new tracks. Retired tracks
            // were all unmatched, so retirement frees no detection.
            for idx in result.unmatched_detections {
                self.spawn(&detections[idx]);
                assignment.push(Some(idx));
            }
        }

        // Step 8-9: predict, correct or coast, extend traces
        for (track, slot) in self.tracks.iter_mut().zip(&assignment) {
            track.predict(&self.estimator);
            match slot {
                Some(idx) => track.update(&detections[*idx], &self.estimator, self.frame_id),
                None => track.coast(&self.estimator),
            }
            track.push_trace(self.config.max_trace_length);
        }

        self.tracks.clone()
    }

    fn spawn(&mut self, detection: &Detection) {
        let track_id = self.next_id;
        self.next_id += 1;
        debug!(
            track_id,
            x = detection.centroid.x,
            y = detection.centroid.y,
            area = detection.area,
            "new track"
        );
        let track = Track::new(track_id, detection, &self.estimator, self.frame_id);
        self.tracks.push(track);
    }
}
