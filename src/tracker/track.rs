//! Single anomaly track.

use std::collections::VecDeque;

use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::tracker::estimator::StateEstimator;
use crate::tracker::matching::Detection;
use crate::tracker::point::Point;
use crate::tracker::track_state::TrackState;

/// Single anomaly track.
#[derive(Debug, Clone, Serialize)]
pub struct Track {
    /// Unique track identifier
    pub track_id: u64,
    /// Current lifecycle state
    pub state: TrackState,
    /// Estimator state vector
    pub mean: Array1<f64>,
    /// Estimator state covariance
    pub covariance: Array2<f64>,
    /// Current position estimate
    pub prediction: Point,
    /// Area of the last associated detection
    pub previous_area: f64,
    /// Consecutive frames without an association
    pub skipped_frames: u32,
    /// Past position estimates, oldest first
    pub trace: VecDeque<Point>,
    /// Centroid associated this frame, `None` while coasting
    pub last_point: Option<Point>,
    /// Frame ID when the track was started
    pub start_frame: u32,
    /// Frame ID of the last update
    pub frame_id: u32,
}

impl Track {
    /// Create a new track on a detection's centroid and area.
    pub fn new(
        track_id: u64,
        detection: &Detection,
        estimator: &StateEstimator,
        frame_id: u32,
    ) -> Self {
        let (mean, covariance) = estimator.initiate(detection.centroid);
        Self {
            track_id,
            state: TrackState::Active,
            mean,
            covariance,
            prediction: detection.centroid,
            previous_area: detection.area,
            skipped_frames: 0,
            trace: VecDeque::new(),
            last_point: None,
            start_frame: frame_id,
            frame_id,
        }
    }

    pub fn predict(&mut self, estimator: &StateEstimator) {
        let (mean, covariance) = estimator.predict(&self.mean, &self.covariance);
        self.mean = mean;
        self.covariance = covariance;
        self.prediction = estimator.position(&self.mean);
    }

    /// Correct the track with its associated detection.
    pub fn update(&mut self, detection: &Detection, estimator: &StateEstimator, frame_id: u32) {
        let (mean, covariance) =
            estimator.update(&self.mean, &self.covariance, Some(detection.centroid));
        self.mean = mean;
        self.covariance = covariance;
        self.prediction = estimator.position(&self.mean);

        self.state = TrackState::Active;
        self.skipped_frames = 0;
        self.previous_area = detection.area;
        self.last_point = Some(detection.centroid);
        self.frame_id = frame_id;
    }

    /// Carry the prediction forward without a measurement.
    pub fn coast(&mut self, estimator: &StateEstimator) {
        let (mean, covariance) = estimator.update(&self.mean, &self.covariance, None);
        self.mean = mean;
        self.covariance = covariance;
        self.prediction = estimator.position(&self.mean);
        self.last_point = None;
    }

    /// Record a frame without an association.
    pub fn mark_missed(&mut self) {
        self.skipped_frames += 1;
        self.state = TrackState::Coasting;
    }

    pub fn mark_retired(&mut self) {
        self.state = TrackState::Retired;
    }

    /// Append the current estimate, keeping at most `max_len` entries.
    pub fn push_trace(&mut self, max_len: usize) {
        self.trace.push_back(self.prediction);
        while self.trace.len() > max_len {
            self.trace.pop_front();
        }
    }

    /// Number of frames since the track was started.
    pub fn age(&self, frame_id: u32) -> u32 {
        frame_id.saturating_sub(self.start_frame)
    }
}
