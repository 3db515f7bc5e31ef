//! TrackerPipeline for combining contour extraction, stationary suppression
//! and tracking.

use crate::error::Result;
use crate::tracker::{Detection, StationaryConfig, StationaryFilter, Track, Tracker, TrackerConfig};

use super::{DetectionSource, IntoDetections};

/// End-to-end per-frame pipeline.
///
/// Runs the detection source, drops stationary detections and feeds the rest
/// to the tracker. One pipeline owns one filter and one tracker; frames must
/// be processed in arrival order.
pub struct TrackerPipeline<D: DetectionSource> {
    detector: D,
    filter: StationaryFilter,
    tracker: Tracker,
}

impl<D: DetectionSource> TrackerPipeline<D> {
    /// Create a new pipeline, validating both configurations.
    pub fn new(
        detector: D,
        tracker_config: TrackerConfig,
        stationary_config: StationaryConfig,
    ) -> Result<Self> {
        Ok(Self {
            detector,
            filter: StationaryFilter::new(stationary_config)?,
            tracker: Tracker::new(tracker_config)?,
        })
    }

    /// Create a new pipeline with default configurations.
    pub fn with_default_config(detector: D) -> Result<Self> {
        Self::new(detector, TrackerConfig::default(), StationaryConfig::default())
    }

    /// Process a single frame and return the live tracks.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    pub fn process_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> std::result::Result<Vec<Track>, D::Error> {
        let detections = self.detector.detect(input, width, height)?;
        Ok(self.process_detections(detections))
    }

    /// Run already extracted detections through the filter and tracker.
    pub fn process_detections<I: IntoDetections>(&mut self, detections: I) -> Vec<Track> {
        let moving: Vec<Detection> = self.filter.update(detections.into_detections());
        self.tracker.update(&moving)
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get a reference to the stationary filter.
    pub fn filter(&self) -> &StationaryFilter {
        &self.filter
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// Get a mutable reference to the underlying tracker.
    pub fn tracker_mut(&mut self) -> &mut Tracker {
        &mut self.tracker
    }
}
