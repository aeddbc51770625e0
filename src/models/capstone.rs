use super::{Point, PointI, RegionId};

/// Maximum number of capstones recorded per image
pub const MAX_CAPSTONES: usize = 32;

/// A detected finder pattern: a ring region enclosing a stone region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capstone {
    /// Region id of the outer ring
    pub ring: RegionId,
    /// Region id of the inner stone
    pub stone: RegionId,
    /// Outer corners of the ring, in the order found by the corner search
    pub corners: [PointI; 4],
    /// Center of the pattern in image coordinates
    pub center: Point,
}
