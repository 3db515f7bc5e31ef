//! Suppression of detections that do not move.
//!
//! Scratches, dust on the optics and printing on the vial show up as contours
//! in the same image position every frame. The filter remembers such positions
//! as reference points and drops detections that keep landing on one.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Result, TrackerError, ensure_non_negative};
use crate::tracker::matching::Detection;
use crate::tracker::point::Point;

/// Configuration for the [`StationaryFilter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationaryConfig {
    /// Maximum distance between a centroid and a reference point to match
    pub thresh: f64,
    /// Matches a reference point needs before its detections are dropped
    pub interval: u32,
    /// Misses after which a reference point is forgotten
    pub max_skipped_frames: u32,
    /// Upper bound on remembered reference points
    pub max_reference_points: usize,
}

impl Default for StationaryConfig {
    fn default() -> Self {
        Self {
            thresh: 0.5,
            interval: 10,
            max_skipped_frames: 5,
            max_reference_points: 100,
        }
    }
}

impl StationaryConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("stationary.thresh", self.thresh)?;
        if self.interval == 0 {
            return Err(TrackerError::config("stationary.interval", "must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct ReferencePoint {
    position: Point,
    life: u32,
    skipped_frames: u32,
    found: bool,
}

impl ReferencePoint {
    fn new(position: Point) -> Self {
        Self {
            position,
            life: 0,
            skipped_frames: 0,
            found: false,
        }
    }
}

/// Removes detections that stayed at a fixed position across frames.
#[derive(Debug, Clone)]
pub struct StationaryFilter {
    config: StationaryConfig,
    points: Vec<ReferencePoint>,
}

impl StationaryFilter {
    pub fn new(config: StationaryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            points: Vec::new(),
        })
    }

    pub fn config(&self) -> &StationaryConfig {
        &self.config
    }

    /// Number of reference points currently remembered.
    pub fn reference_points(&self) -> usize {
        self.points.len()
    }

    /// Forget every reference point.
    pub fn reset(&mut self) {
        self.points.clear();
    }

    /// Filter one frame of detections, returning those not found stationary.
    pub fn update(&mut self, detections: Vec<Detection>) -> Vec<Detection> {
        let centroids: Vec<Point> = detections.iter().map(|d| d.centroid).collect();

        // Cold start: the first populated frame only seeds reference points.
        if self.points.is_empty() {
            for &c in centroids.iter().take(self.config.max_reference_points) {
                self.points.push(ReferencePoint::new(c));
            }
            if !self.points.is_empty() {
                debug!("seeded {} reference points", self.points.len());
            }
            return detections;
        }

        for point in self.points.iter_mut() {
            point.found = false;
        }

        let mut stationary = vec![false; detections.len()];
        let mut unassigned = Vec::new();
        for (idx, centroid) in centroids.iter().enumerate() {
            let mut assigned = false;
            for point in self.points.iter_mut() {
                if centroid.distance(&point.position) <= self.config.thresh {
                    assigned = true;
                    point.life += 1;
                    point.found = true;
                    point.skipped_frames = 0;
                    if point.life >= self.config.interval {
                        stationary[idx] = true;
                    }
                }
            }
            if !assigned {
                unassigned.push(*centroid);
            }
        }

        // Points created this frame were seen this frame and do not age yet.
        for centroid in unassigned {
            if self.points.len() >= self.config.max_reference_points {
                break;
            }
            self.points.push(ReferencePoint {
                found: true,
                ..ReferencePoint::new(centroid)
            });
        }

        let max_skipped = self.config.max_skipped_frames;
        self.points.retain_mut(|point| {
            if point.found {
                return true;
            }
            point.skipped_frames += 1;
            if point.skipped_frames > max_skipped {
                debug!(
                    x = point.position.x,
                    y = point.position.y,
                    life = point.life,
                    "discarding reference point"
                );
                return false;
            }
            true
        });

        let before = detections.len();
        let kept: Vec<Detection> = detections
            .into_iter()
            .zip(stationary)
            .filter_map(|(det, is_stationary)| if is_stationary { None } else { Some(det) })
            .collect();
        trace!(
            suppressed = before - kept.len(),
            reference_points = self.points.len(),
            "stationary filter"
        );
        kept
    }
}
