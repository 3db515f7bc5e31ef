//! Matching utilities: detections, the association cost model and the
//! thresholded assignment.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::tracker::lap;
use crate::tracker::point::{Point, contour_area, contour_centroid};
use crate::tracker::track::Track;

/// One observed shape in a single frame, reduced to a centroid and an area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Boundary points, empty when the centroid/area pair was precomputed
    pub points: Vec<Point>,
    /// Enclosed area
    pub area: f64,
    /// Centroid from the contour moments
    pub centroid: Point,
}

impl Detection {
    pub fn new(x: f64, y: f64, area: f64) -> Self {
        Self {
            points: Vec::new(),
            area,
            centroid: Point::new(x, y),
        }
    }

    /// Build a detection from a closed contour.
    ///
    /// Contours without enclosed area get their centroid at the origin.
    pub fn from_contour(points: Vec<Point>) -> Self {
        let area = contour_area(&points);
        let centroid = contour_centroid(&points);
        Self {
            points,
            area,
            centroid,
        }
    }
}

/// Association cost between every track (rows) and detection (columns).
///
/// `cost = distance_weight * 0.5 * distance - size_weight * |area difference|`.
/// The size term is subtracted, so entries can go negative; they are left as
/// is since the solver only minimizes the total.
pub fn cost_matrix(
    tracks: &[Track],
    detections: &[Detection],
    distance_weight: f64,
    size_weight: f64,
) -> Array2<f64> {
    let mut cost = Array2::zeros((tracks.len(), detections.len()));
    for (i, t) in tracks.iter().enumerate() {
        for (j, d) in detections.iter().enumerate() {
            let distance = t.prediction.distance(&d.centroid);
            let size_diff = (t.previous_area - d.area).abs();
            cost[[i, j]] = distance_weight * 0.5 * distance - size_weight * size_diff;
        }
    }
    cost
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentResult {
    /// Per-row assigned column after thresholding
    pub assignment: Vec<Option<usize>>,
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// Optimal assignment with every pair costing more than `thresh` dropped.
pub fn linear_assignment(cost_matrix: &Array2<f64>, thresh: f64) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();

    let mut assignment = lap::solve(cost_matrix);
    for (row, slot) in assignment.iter_mut().enumerate() {
        if let Some(col) = *slot {
            if cost_matrix[[row, col]] > thresh {
                *slot = None;
            }
        }
    }

    let mut matches = vec![];
    let mut unmatched_tracks = vec![];
    let mut unmatched_detections_mask: Vec<bool> = vec![true; num_cols];
    for (row, slot) in assignment.iter().enumerate().take(num_rows) {
        match slot {
            Some(col) => {
                matches.push((row, *col));
                unmatched_detections_mask[*col] = false;
            }
            None => unmatched_tracks.push(row),
        }
    }

    let unmatched_detections: Vec<usize> = unmatched_detections_mask
        .iter()
        .enumerate()
        .filter_map(|(i, &u)| if u { Some(i) } else { None })
        .collect();

    AssignmentResult {
        assignment,
        matches,
        unmatched_tracks,
        unmatched_detections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::estimator::{MotionModel, StateEstimator};
    use ndarray::array;

    fn track_at(x: f64, y: f64, area: f64) -> Track {
        let estimator = StateEstimator::new(&MotionModel::default(), 0.005);
        Track::new(0, &Detection::new(x, y, area), &estimator, 0)
    }

    #[test]
    fn test_detection_from_contour() {
        let det = Detection::from_contour(vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 2.0),
            Point::new(0.0, 2.0),
        ]);
        assert_eq!(det.area, 8.0);
        assert_eq!(det.centroid, Point::new(2.0, 1.0));
        assert_eq!(det.points.len(), 4);
    }

    #[test]
    fn test_cost_formula() {
        let tracks = vec![track_at(0.0, 0.0, 10.0)];
        let dets = vec![Detection::new(3.0, 4.0, 10.0), Detection::new(3.0, 4.0, 30.0)];
        let cost = cost_matrix(&tracks, &dets, 1.0, 0.2);
        assert_eq!(cost.dim(), (1, 2));
        assert!((cost[[0, 0]] - 2.5).abs() < 1e-12);
        // Larger area difference lowers the cost, and may drive it negative.
        assert!((cost[[0, 1]] - (2.5 - 4.0)).abs() < 1e-12);
    }

    #[test]
    fn test_cost_weights() {
        let tracks = vec![track_at(0.0, 0.0, 5.0)];
        let dets = vec![Detection::new(0.0, 8.0, 7.0)];
        let cost = cost_matrix(&tracks, &dets, 2.0, 0.0);
        assert!((cost[[0, 0]] - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_cost_degenerate_shapes() {
        let tracks = vec![track_at(0.0, 0.0, 5.0)];
        assert_eq!(cost_matrix(&tracks, &[], 1.0, 0.2).dim(), (1, 0));
        assert_eq!(cost_matrix(&[], &[Detection::new(1.0, 1.0, 1.0)], 1.0, 0.2).dim(), (0, 1));
    }

    #[test]
    fn test_linear_assignment_threshold() {
        let cost = array![[1.0, 9.0], [9.0, 7.0]];
        let result = linear_assignment(&cost, 5.0);
        assert_eq!(result.matches, vec![(0, 0)]);
        assert_eq!(result.unmatched_tracks, vec![1]);
        assert_eq!(result.unmatched_detections, vec![1]);
        assert_eq!(result.assignment, vec![Some(0), None]);
    }

    #[test]
    fn test_linear_assignment_empty() {
        let result = linear_assignment(&Array2::zeros((0, 2)), 5.0);
        assert!(result.matches.is_empty());
        assert_eq!(result.unmatched_detections, vec![0, 1]);

        let result = linear_assignment(&Array2::zeros((3, 0)), 5.0);
        assert_eq!(result.unmatched_tracks, vec![0, 1, 2]);
        assert!(result.unmatched_detections.is_empty());
    }
}
