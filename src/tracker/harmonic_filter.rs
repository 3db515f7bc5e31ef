//! Extended Kalman filter for anomalies riding on a spinning vial.
//!
//! A particle on the surface of a rotating vial traces a periodic path in the
//! image. The state models that path as two phase-locked oscillations:
//!
//! ```text
//! x = ox + ax * cos(theta)
//! y = oy + ay * sin(theta + phi)
//! ```
//!
//! State layout: `[theta, omega, ax, ay, ox, oy, phi]`. The transition is
//! linear (`theta += omega * dt`), the measurement function is not, so the
//! update linearizes it around the predicted state.

use ndarray::{Array1, Array2, array};
use serde::{Deserialize, Serialize};

use crate::tracker::kalman_filter::correct;
use crate::tracker::point::Point;

const THETA: usize = 0;
const OMEGA: usize = 1;
const AMP_X: usize = 2;
const AMP_Y: usize = 3;
const OFFSET_X: usize = 4;
const OFFSET_Y: usize = 5;
const PHI: usize = 6;
const STATE_DIM: usize = 7;

/// Parameters of the harmonic-motion model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarmonicParams {
    /// Initial angular velocity guess in rad/s (vial spin rate)
    pub angular_velocity: f64,
    /// Spectral density of the phase/angular-velocity white noise
    pub phase_noise: f64,
    /// Random-walk density of the amplitudes
    pub amplitude_noise: f64,
    /// Random-walk density of the offsets, lets the path center drift
    pub offset_noise: f64,
    /// Random-walk density of the y-axis phase lag
    pub phase_lag_noise: f64,
    /// Diagonal of the measurement noise `R`
    pub measurement_noise: f64,
    /// Initial variance of the phase and phase lag
    pub initial_phase_variance: f64,
    /// Initial variance of the angular velocity
    pub initial_velocity_variance: f64,
    /// Initial variance of the amplitudes
    pub initial_amplitude_variance: f64,
    /// Initial variance of the offsets
    pub initial_offset_variance: f64,
}

impl Default for HarmonicParams {
    fn default() -> Self {
        Self {
            angular_velocity: 2.0 * std::f64::consts::PI,
            phase_noise: 1.0,
            amplitude_noise: 1.0,
            offset_noise: 200.0,
            phase_lag_noise: 0.01,
            measurement_noise: 1.0,
            initial_phase_variance: 1.0,
            initial_velocity_variance: 1.0,
            initial_amplitude_variance: 100.0,
            initial_offset_variance: 100.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HarmonicFilter {
    params: HarmonicParams,
    motion_mat: Array2<f64>,
    process_cov: Array2<f64>,
    measurement_cov: Array2<f64>,
}

impl HarmonicFilter {
    pub fn new(params: &HarmonicParams, dt: f64) -> Self {
        let mut motion_mat = Array2::eye(STATE_DIM);
        motion_mat[[THETA, OMEGA]] = dt;

        Self {
            params: *params,
            motion_mat,
            process_cov: process_noise(params, dt),
            measurement_cov: Array2::eye(2) * params.measurement_noise,
        }
    }

    /// Start a state centered on the measured centroid with no known swing.
    ///
    /// With zero amplitude the phase is unobservable at first; the offsets
    /// carry the track until the amplitudes pick up the swing.
    pub fn initiate(&self, measurement: Point) -> (Array1<f64>, Array2<f64>) {
        let p = &self.params;
        let mut mean = Array1::zeros(STATE_DIM);
        mean[OMEGA] = p.angular_velocity;
        mean[OFFSET_X] = measurement.x;
        mean[OFFSET_Y] = measurement.y;

        let variances = [
            p.initial_phase_variance,
            p.initial_velocity_variance,
            p.initial_amplitude_variance,
            p.initial_amplitude_variance,
            p.initial_offset_variance,
            p.initial_offset_variance,
            p.initial_phase_variance,
        ];
        (mean, Array2::from_diag(&Array1::from_vec(variances.to_vec())))
    }

    pub fn predict(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let new_mean = self.motion_mat.dot(mean);
        let new_covariance =
            self.motion_mat.dot(covariance).dot(&self.motion_mat.t()) + &self.process_cov;
        (new_mean, new_covariance)
    }

    /// EKF correction, or a coast when `measurement` is `None`.
    pub fn update(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
        measurement: Option<Point>,
    ) -> (Array1<f64>, Array2<f64>) {
        let Some(z) = measurement else {
            return (mean.clone(), covariance.clone());
        };

        let expected = self.position(mean);
        correct(
            mean,
            covariance,
            &jacobian(mean),
            &self.measurement_cov,
            array![z.x - expected.x, z.y - expected.y],
        )
    }

    /// The measurement function `h(x)`.
    pub fn position(&self, mean: &Array1<f64>) -> Point {
        let theta = mean[THETA];
        Point::new(
            mean[OFFSET_X] + mean[AMP_X] * theta.cos(),
            mean[OFFSET_Y] + mean[AMP_Y] * (theta + mean[PHI]).sin(),
        )
    }
}

/// Jacobian of `h(x)` evaluated at `mean` (2 x 7).
fn jacobian(mean: &Array1<f64>) -> Array2<f64> {
    let theta = mean[THETA];
    let lagged = theta + mean[PHI];

    let mut h = Array2::zeros((2, STATE_DIM));
    h[[0, THETA]] = -mean[AMP_X] * theta.sin();
    h[[0, AMP_X]] = theta.cos();
    h[[0, OFFSET_X]] = 1.0;

    h[[1, THETA]] = mean[AMP_Y] * lagged.cos();
    h[[1, AMP_Y]] = lagged.sin();
    h[[1, OFFSET_Y]] = 1.0;
    h[[1, PHI]] = mean[AMP_Y] * lagged.cos();
    h
}

/// Block-diagonal process noise.
///
/// `(theta, omega)` gets the discretized continuous white-noise block of a
/// second-order system; amplitudes, offsets and phase lag are random walks
/// with their own densities.
fn process_noise(params: &HarmonicParams, dt: f64) -> Array2<f64> {
    let mut q = Array2::zeros((STATE_DIM, STATE_DIM));
    let qp = params.phase_noise;
    q[[THETA, THETA]] = qp * dt.powi(4) / 4.0;
    q[[THETA, OMEGA]] = qp * dt.powi(3) / 2.0;
    q[[OMEGA, THETA]] = qp * dt.powi(3) / 2.0;
    q[[OMEGA, OMEGA]] = qp * dt.powi(2);

    for (i, density) in [
        (AMP_X, params.amplitude_noise),
        (AMP_Y, params.amplitude_noise),
        (OFFSET_X, params.offset_noise),
        (OFFSET_Y, params.offset_noise),
        (PHI, params.phase_lag_noise),
    ] {
        q[[i, i]] = density * dt;
    }
    q
}
