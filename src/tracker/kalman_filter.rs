//! Constant-velocity Kalman filter for centroid tracking using ndarray and a
//! nalgebra-based inverse.

use ndarray::{Array1, Array2, array};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::tracker::point::Point;

/// Noise parameters of the constant-velocity model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearParams {
    /// Diagonal of the process noise `Q`
    pub process_noise: f64,
    /// Diagonal of the measurement noise `R`
    pub measurement_noise: f64,
    /// Diagonal of the initial covariance `P₀`
    pub initial_variance: f64,
}

impl Default for LinearParams {
    fn default() -> Self {
        Self {
            process_noise: 1.0,
            measurement_noise: 1.0,
            initial_variance: 3.0,
        }
    }
}

/// Linear Kalman filter over the state `[x, y, vx, vy]`.
///
/// The filter is stateless: each track owns its mean and covariance and hands
/// them in for every step.
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    motion_mat: Array2<f64>,
    update_mat: Array2<f64>,
    process_cov: Array2<f64>,
    measurement_cov: Array2<f64>,
    initial_variance: f64,
}

impl KalmanFilter {
    pub fn new(params: &LinearParams, dt: f64) -> Self {
        let ndim = 2;
        let mut motion_mat = Array2::eye(2 * ndim);
        for i in 0..ndim {
            motion_mat[[i, ndim + i]] = dt;
        }

        let mut update_mat = Array2::zeros((ndim, 2 * ndim));
        for i in 0..ndim {
            update_mat[[i, i]] = 1.0;
        }

        Self {
            motion_mat,
            update_mat,
            process_cov: Array2::eye(2 * ndim) * params.process_noise,
            measurement_cov: Array2::eye(ndim) * params.measurement_noise,
            initial_variance: params.initial_variance,
        }
    }

    /// Start a state at rest on the measured centroid.
    pub fn initiate(&self, measurement: Point) -> (Array1<f64>, Array2<f64>) {
        let mean = array![measurement.x, measurement.y, 0.0, 0.0];
        let cov = Array2::eye(4) * self.initial_variance;
        (mean, cov)
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

    /// Correct a predicted state with a measurement, or coast when `None`.
    pub fn update(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
        measurement: Option<Point>,
    ) -> (Array1<f64>, Array2<f64>) {
        let Some(z) = measurement else {
            return (mean.clone(), covariance.clone());
        };

        correct(
            mean,
            covariance,
            &self.update_mat,
            &self.measurement_cov,
            array![z.x - mean[0], z.y - mean[1]],
        )
    }

    pub fn position(&self, mean: &Array1<f64>) -> Point {
        Point::new(mean[0], mean[1])
    }
}

/// Shared Kalman correction for a 2D measurement.
///
/// `jacobian` is the (linearized) measurement matrix `H` and `innovation` the
/// residual `z - h(x⁻)`. When the innovation covariance cannot be inverted the
/// correction is skipped and the predicted state is returned unchanged.
pub(crate) fn correct(
    mean: &Array1<f64>,
    covariance: &Array2<f64>,
    jacobian: &Array2<f64>,
    measurement_cov: &Array2<f64>,
    innovation: Array1<f64>,
) -> (Array1<f64>, Array2<f64>) {
    // S = H P H^T + R
    let pht = covariance.dot(&jacobian.t());
    let projected_cov = jacobian.dot(&pht) + measurement_cov;

    let Some(s_inv) = invert_2x2(&projected_cov) else {
        warn!("singular innovation covariance, skipping correction");
        return (mean.clone(), covariance.clone());
    };

    // K = P H^T S^-1
    let kalman_gain = pht.dot(&s_inv);

    let new_mean = mean + &kalman_gain.dot(&innovation);
    let identity = Array2::<f64>::eye(mean.len());
    let new_covariance = (identity - kalman_gain.dot(jacobian)).dot(covariance);

    (new_mean, new_covariance)
}

/// Invert a 2x2 matrix using nalgebra (pure Rust).
fn invert_2x2(m: &Array2<f64>) -> Option<Array2<f64>> {
    let nm = nalgebra::Matrix2::new(m[[0, 0]], m[[0, 1]], m[[1, 0]], m[[1, 1]]);
    let inv = nm.try_inverse()?;
    if inv.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let mut res = Array2::zeros((2, 2));
    for i in 0..2 {
        for j in 0..2 {
            res[[i, j]] = inv[(i, j)];
        }
    }
    Some(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn noiseless() -> LinearParams {
        LinearParams {
            process_noise: 0.0,
            measurement_noise: 0.0,
            initial_variance: 3.0,
        }
    }

    #[test]
    fn test_initiate() {
        let kf = KalmanFilter::new(&LinearParams::default(), 0.005);
        let (mean, cov) = kf.initiate(Point::new(100.0, 200.0));
        assert_eq!(mean[0], 100.0);
        assert_eq!(mean[1], 200.0);
        assert_eq!(mean[2], 0.0);
        assert_eq!(cov[[0, 0]], 3.0);
        assert_eq!(cov[[0, 1]], 0.0);
    }

    #[test]
    fn test_predict_constant_velocity() {
        let kf = KalmanFilter::new(&LinearParams::default(), 0.5);
        let mean = array![1.0, 2.0, 4.0, -2.0];
        let (pred, cov) = kf.predict(&mean, &Array2::eye(4));
        assert_relative_eq!(pred[0], 3.0);
        assert_relative_eq!(pred[1], 1.0);
        assert_relative_eq!(pred[2], 4.0);
        // F P F^T + Q with P = I, Q = I: position variance 1 + dt^2 + 1
        assert_relative_eq!(cov[[0, 0]], 2.25);
        assert_relative_eq!(cov[[0, 2]], 0.5);
    }

    #[test]
    fn test_noiseless_update_returns_measurement() {
        let kf = KalmanFilter::new(&noiseless(), 0.005);
        let (mean, cov) = kf.initiate(Point::new(10.0, 10.0));
        let (mean, cov) = kf.predict(&mean, &cov);
        let (mean, _) = kf.update(&mean, &cov, Some(Point::new(13.5, 7.25)));
        let pos = kf.position(&mean);
        assert_relative_eq!(pos.x, 13.5, epsilon = 1e-9);
        assert_relative_eq!(pos.y, 7.25, epsilon = 1e-9);
    }

    #[test]
    fn test_update_moves_towards_measurement() {
        let kf = KalmanFilter::new(&LinearParams::default(), 0.005);
        let (mean, cov) = kf.initiate(Point::new(0.0, 0.0));
        let (mean, cov) = kf.predict(&mean, &cov);
        let (new_mean, new_cov) = kf.update(&mean, &cov, Some(Point::new(10.0, 0.0)));
        assert!(new_mean[0] > 0.0 && new_mean[0] < 10.0);
        assert!(new_cov[[0, 0]] < cov[[0, 0]]);
    }

    #[test]
    fn test_coast_keeps_prediction() {
        let kf = KalmanFilter::new(&LinearParams::default(), 0.005);
        let (mean, cov) = kf.initiate(Point::new(4.0, 5.0));
        let (pred_mean, pred_cov) = kf.predict(&mean, &cov);
        let (coast_mean, coast_cov) = kf.update(&pred_mean, &pred_cov, None);
        assert_eq!(coast_mean, pred_mean);
        assert_eq!(coast_cov, pred_cov);
        assert!(coast_cov[[0, 0]] > cov[[0, 0]]);
    }

    #[test]
    fn test_singular_innovation_skips_correction() {
        let kf = KalmanFilter::new(&noiseless(), 0.005);
        let mean = array![1.0, 1.0, 0.0, 0.0];
        let cov = Array2::zeros((4, 4));
        let (new_mean, new_cov) = kf.update(&mean, &cov, Some(Point::new(5.0, 5.0)));
        assert_eq!(new_mean, mean);
        assert_eq!(new_cov, cov);
    }
}
