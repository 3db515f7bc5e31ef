//! Builder for creating Detection objects at the ingestion boundary.

use crate::error::{Result, TrackerError};
use crate::tracker::{Detection, Point, contour_area, contour_centroid};

/// Builder for creating validated `Detection` objects.
///
/// A detection needs either a contour or both a centroid and an area.
/// Explicit values take precedence over those derived from the contour.
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    points: Vec<Point>,
    centroid: Option<Point>,
    area: Option<f64>,
}

impl DetectionBuilder {
    /// Create a new detection builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the boundary points of the contour.
    pub fn contour<I, P>(mut self, points: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Point>,
    {
        self.points = points.into_iter().map(Into::into).collect();
        self
    }

    /// Set a precomputed centroid.
    pub fn centroid(mut self, x: f64, y: f64) -> Self {
        self.centroid = Some(Point::new(x, y));
        self
    }

    /// Set a precomputed area.
    pub fn area(mut self, area: f64) -> Self {
        self.area = Some(area);
        self
    }

    /// Build the final `Detection`.
    pub fn build(self) -> Result<Detection> {
        let has_contour = !self.points.is_empty();

        let area = match (self.area, has_contour) {
            (Some(area), _) => area,
            (None, true) => contour_area(&self.points),
            (None, false) => return Err(TrackerError::detection("missing area and contour")),
        };
        let centroid = match (self.centroid, has_contour) {
            (Some(c), _) => c,
            (None, true) => contour_centroid(&self.points),
            (None, false) => return Err(TrackerError::detection("missing centroid and contour")),
        };

        if !area.is_finite() || area < 0.0 {
            return Err(TrackerError::detection(format!(
                "area must be finite and non-negative, got {area}"
            )));
        }
        if !centroid.is_finite() {
            return Err(TrackerError::detection(format!(
                "centroid must be finite, got ({}, {})",
                centroid.x, centroid.y
            )));
        }
        if let Some(p) = self.points.iter().find(|p| !p.is_finite()) {
            return Err(TrackerError::detection(format!(
                "contour point must be finite, got ({}, {})",
                p.x, p.y
            )));
        }

        Ok(Detection {
            points: self.points,
            area,
            centroid,
        })
    }
}
