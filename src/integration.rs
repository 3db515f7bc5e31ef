//! Integration module for connecting an upstream contour extractor with the
//! tracker.
//!
//! Image acquisition and preprocessing live outside this crate; they plug in
//! through [`DetectionSource`], and [`DetectionBuilder`] validates what they
//! hand over.

mod builder;
mod detector;
mod pipeline;

pub use builder::DetectionBuilder;
pub use detector::{DetectionSource, IntoDetections};
pub use pipeline::TrackerPipeline;
