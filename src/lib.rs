//! Frame-to-frame tracking of visual anomalies on a spinning sample vial.
//!
//! Detections (contours reduced to a centroid and an area) flow through a
//! [`StationaryFilter`] that suppresses background artifacts, then into a
//! [`Tracker`] that associates them with existing tracks by optimal
//! assignment and refines each track with a Kalman-family estimator.

pub mod error;
pub mod integration;
pub mod tracker;

pub use error::{Result, TrackerError};
pub use integration::{DetectionBuilder, DetectionSource, IntoDetections, TrackerPipeline};
pub use tracker::{
    Detection, HarmonicParams, LinearParams, MotionModel, Point, StationaryConfig,
    StationaryFilter, Track, TrackState, Tracker, TrackerConfig,
};
