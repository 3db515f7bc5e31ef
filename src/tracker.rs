mod anomaly_tracker;
mod estimator;
mod harmonic_filter;
mod kalman_filter;
mod lap;
mod matching;
mod point;
mod stationary;
mod track;
mod track_state;

pub use anomaly_tracker::{Tracker, TrackerConfig};
pub use estimator::{MotionModel, StateEstimator};
pub use harmonic_filter::{HarmonicFilter, HarmonicParams};
pub use kalman_filter::{KalmanFilter, LinearParams};
pub use lap::solve as solve_assignment;
pub use matching::{AssignmentResult, Detection, cost_matrix, linear_assignment};
pub use point::{Point, contour_area, contour_centroid};
pub use stationary::{StationaryConfig, StationaryFilter};
pub use track::Track;
pub use track_state::TrackState;
