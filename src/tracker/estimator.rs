//! Motion model selection and the estimator dispatch over it.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError, ensure_non_negative};
use crate::tracker::harmonic_filter::{HarmonicFilter, HarmonicParams};
use crate::tracker::kalman_filter::{KalmanFilter, LinearParams};
use crate::tracker::point::Point;

/// Motion model configuration, chosen once per tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MotionModel {
    /// Constant velocity in image space
    Linear(LinearParams),
    /// Periodic motion of a point on a spinning vial
    Harmonic(HarmonicParams),
}

impl Default for MotionModel {
    fn default() -> Self {
        Self::Linear(LinearParams::default())
    }
}

impl MotionModel {
    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Self::Linear(p) => {
                ensure_non_negative("motion_model.process_noise", p.process_noise)?;
                ensure_non_negative("motion_model.measurement_noise", p.measurement_noise)?;
                ensure_non_negative("motion_model.initial_variance", p.initial_variance)?;
            }
            Self::Harmonic(p) => {
                ensure_non_negative("motion_model.phase_noise", p.phase_noise)?;
                ensure_non_negative("motion_model.amplitude_noise", p.amplitude_noise)?;
                ensure_non_negative("motion_model.offset_noise", p.offset_noise)?;
                ensure_non_negative("motion_model.phase_lag_noise", p.phase_lag_noise)?;
                ensure_non_negative("motion_model.measurement_noise", p.measurement_noise)?;
                ensure_non_negative(
                    "motion_model.initial_phase_variance",
                    p.initial_phase_variance,
                )?;
                ensure_non_negative(
                    "motion_model.initial_velocity_variance",
                    p.initial_velocity_variance,
                )?;
                ensure_non_negative(
                    "motion_model.initial_amplitude_variance",
                    p.initial_amplitude_variance,
                )?;
                ensure_non_negative(
                    "motion_model.initial_offset_variance",
                    p.initial_offset_variance,
                )?;
                if !p.angular_velocity.is_finite() {
                    return Err(TrackerError::config(
                        "motion_model.angular_velocity",
                        "must be finite",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// State estimator shared by all tracks of one tracker.
#[derive(Debug, Clone)]
pub enum StateEstimator {
    Linear(KalmanFilter),
    Harmonic(HarmonicFilter),
}

impl StateEstimator {
    pub fn new(model: &MotionModel, dt: f64) -> Self {
        match model {
            MotionModel::Linear(p) => Self::Linear(KalmanFilter::new(p, dt)),
            MotionModel::Harmonic(p) => Self::Harmonic(HarmonicFilter::new(p, dt)),
        }
    }

    pub fn initiate(&self, measurement: Point) -> (Array1<f64>, Array2<f64>) {
        match self {
            Self::Linear(kf) => kf.initiate(measurement),
            Self::Harmonic(hf) => hf.initiate(measurement),
        }
    }

    pub fn predict(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        match self {
            Self::Linear(kf) => kf.predict(mean, covariance),
            Self::Harmonic(hf) => hf.predict(mean, covariance),
        }
    }

    pub fn update(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
        measurement: Option<Point>,
    ) -> (Array1<f64>, Array2<f64>) {
        match self {
            Self::Linear(kf) => kf.update(mean, covariance, measurement),
            Self::Harmonic(hf) => hf.update(mean, covariance, measurement),
        }
    }

    pub fn position(&self, mean: &Array1<f64>) -> Point {
        match self {
            Self::Linear(kf) => kf.position(mean),
            Self::Harmonic(hf) => hf.position(mean),
        }
    }
}
