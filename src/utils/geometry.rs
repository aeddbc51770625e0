/// Perspective transform between a module square and image coordinates
use crate::models::{Point, PointI};

/// Perspective transformation matrix (3x3, a33 fixed to 1)
#[derive(Debug, Clone, Copy)]
pub struct PerspectiveTransform {
    a11: f32,
    a12: f32,
    a13: f32,
    a21: f32,
    a22: f32,
    a23: f32,
    a31: f32,
    a32: f32,
}

impl PerspectiveTransform {
    /// Map the `size x size` square with corners (0,0), (size,0), (size,size),
    /// (0,size) onto `corners`, taken in that order.
    ///
    /// Closed-form solution for a square source; `None` when the corners are
    /// degenerate (collinear or coincident).
    pub fn from_square(size: f32, corners: &[PointI; 4]) -> Option<Self> {
        let [(x0, y0), (x1, y1), (x2, y2), (x3, y3)] = corners.map(|p| (p.x as f64, p.y as f64));
        let size = size as f64;

        let wden = size * (x2 * y3 - x3 * y2 + (x3 - x2) * y1 + x1 * (y2 - y3));
        let hden = size * (x2 * y3 + x1 * (y2 - y3) - x3 * y2 + (x3 - x2) * y1);
        if wden.abs() < 1e-9 || hden.abs() < 1e-9 {
            return None;
        }

        let a11 = (x1 * (x2 * y3 - x3 * y2)
            + x0 * (-x2 * y3 + x3 * y2 + (x2 - x3) * y1)
            + x1 * (x3 - x2) * y0)
            / wden;
        let a12 = -(x0 * (x2 * y3 + x1 * (y2 - y3) - x2 * y1) - x1 * x3 * y2
            + x2 * x3 * y1
            + (x1 * x3 - x2 * x3) * y0)
            / hden;
        let a21 = (y0 * (x1 * (y3 - y2) - x2 * y3 + x3 * y2)
            + y1 * (x2 * y3 - x3 * y2)
            + x0 * y1 * (y2 - y3))
            / wden;
        let a22 = (x0 * (y1 * y3 - y2 * y3)
            + x1 * y2 * y3
            - x2 * y1 * y3
            + y0 * (x3 * y2 - x1 * y2 + (x2 - x3) * y1))
            / hden;
        let a31 = (x1 * (y3 - y2) + x0 * (y2 - y3) + (x2 - x3) * y1 + (x3 - x2) * y0) / wden;
        let a32 = (-x2 * y3 + x1 * y3 + x3 * y2 + x0 * (y1 - y2) - x3 * y1 + (x2 - x1) * y0) / hden;

        Some(Self {
            a11: a11 as f32,
            a12: a12 as f32,
            a13: x0 as f32,
            a21: a21 as f32,
            a22: a22 as f32,
            a23: y0 as f32,
            a31: a31 as f32,
            a32: a32 as f32,
        })
    }

    /// Transform a point using this perspective matrix
    pub fn transform(&self, p: &Point) -> Option<Point> {
        let denominator = self.a31 * p.x + self.a32 * p.y + 1.0;
        if denominator.abs() < 1e-10 {
            return None;
        }

        let x = (self.a11 * p.x + self.a12 * p.y + self.a13) / denominator;
        let y = (self.a21 * p.x + self.a22 * p.y + self.a23) / denominator;
        Some(Point::new(x, y))
    }
}

/// Average of four corner points
pub fn centroid(corners: &[PointI; 4]) -> Point {
    let (sx, sy) = corners
        .iter()
        .fold((0i64, 0i64), |(sx, sy), p| (sx + p.x as i64, sy + p.y as i64));
    Point::new(sx as f32 / 4.0, sy as f32 / 4.0)
}
