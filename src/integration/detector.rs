//! Trait for the upstream contour extractor.

use crate::tracker::{Detection, Point};

/// Source of per-frame detections.
///
/// Implement this trait to connect an image preprocessing stage (thresholding,
/// morphology, contour extraction) to the tracker. `detect` may block until
/// the frame is available; timeouts and cancellation are the implementor's
/// concern.
///
/// # Example
///
/// ```
/// use vialtrack::{Detection, DetectionSource};
///
/// struct Replay {
///     frames: std::vec::IntoIter<Vec<Detection>>,
/// }
///
/// impl DetectionSource for Replay {
///     type Error = std::convert::Infallible;
///
///     fn detect(
///         &mut self,
///         _input: &[u8],
///         _width: u32,
///         _height: u32,
///     ) -> Result<Vec<Detection>, Self::Error> {
///         Ok(self.frames.next().unwrap_or_default())
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error;

    /// Extract detections from one frame of raw image data.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes (format depends on implementation)
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, Self::Error>;
}

/// Helper trait for converting extractor outputs to `Detection`.
pub trait IntoDetections {
    /// Convert the output into a vector of detections.
    fn into_detections(self) -> Vec<Detection>;
}

impl IntoDetections for Vec<Detection> {
    fn into_detections(self) -> Vec<Detection> {
        self
    }
}

/// Closed contours, one per detected shape.
impl IntoDetections for Vec<Vec<Point>> {
    fn into_detections(self) -> Vec<Detection> {
        self.into_iter().map(Detection::from_contour).collect()
    }
}
