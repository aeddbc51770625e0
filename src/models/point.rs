/// 2D point with floating point coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Integer point for pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointI {
    /// X coordinate
    pub x: i32,
    /// Y coordinate
    pub y: i32,
}

impl PointI {
    /// Create a new integer point
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Convert to a floating point position
    pub fn to_point(self) -> Point {
        Point::new(self.x as f32, self.y as f32)
    }

    /// Vector from `origin` to this point
    pub fn offset_from(self, origin: PointI) -> PointI {
        PointI::new(self.x - origin.x, self.y - origin.y)
    }

    /// Dot product in `i64`
    pub fn dot(self, other: PointI) -> i64 {
        self.x as i64 * other.x as i64 + self.y as i64 * other.y as i64
    }

    /// Rotated a quarter turn: `(-y, x)`
    pub fn perp(self) -> PointI {
        PointI::new(-self.y, self.x)
    }

    /// Squared euclidean distance
    pub fn distance_squared(self, other: PointI) -> i64 {
        let d = self.offset_from(other);
        d.dot(d)
    }
}

impl From<PointI> for Point {
    fn from(p: PointI) -> Self {
        p.to_point()
    }
}
