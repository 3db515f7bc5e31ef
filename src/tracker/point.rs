use serde::{Deserialize, Serialize};

/// A 2D image-space point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The image origin, used as the centroid of degenerate contours.
    #[inline]
    pub fn origin() -> Self {
        Self::default()
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Areas at or below this are rounding noise from collinear contours.
const DEGENERATE_AREA: f64 = f32::EPSILON as f64;

/// Raw polygon moments `(m00, m10, m01)` via Green's theorem.
///
/// `m00` is the signed area; its sign follows the winding order.
fn polygon_moments(points: &[Point]) -> (f64, f64, f64) {
    if points.len() < 3 {
        return (0.0, 0.0, 0.0);
    }

    let mut m00 = 0.0;
    let mut m10 = 0.0;
    let mut m01 = 0.0;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        let cross = p.x * q.y - q.x * p.y;
        m00 += cross;
        m10 += (p.x + q.x) * cross;
        m01 += (p.y + q.y) * cross;
    }
    (m00 / 2.0, m10 / 6.0, m01 / 6.0)
}

/// Enclosed area of a closed contour, independent of winding order.
pub fn contour_area(points: &[Point]) -> f64 {
    let area = polygon_moments(points).0.abs();
    if area <= DEGENERATE_AREA { 0.0 } else { area }
}

/// Centroid of a closed contour from its first-order moments.
///
/// A contour with zero enclosed area has no defined centroid and maps to the
/// origin.
pub fn contour_centroid(points: &[Point]) -> Point {
    let (m00, m10, m01) = polygon_moments(points);
    if m00.abs() <= DEGENERATE_AREA {
        return Point::origin();
    }
    Point::new(m10 / m00, m01 / m00)
}
