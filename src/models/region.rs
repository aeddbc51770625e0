use super::PointI;

/// Region ids are pixel values, so the id space ends below this value
pub const MAX_REGIONS: usize = 254;

/// Identifier of a labeled region, stored directly in the pixel grid
pub type RegionId = u8;

/// One connected component of black pixels discovered while scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    /// First pixel of the component that was resolved
    pub seed: PointI,
    /// Number of pixels labeled with this region's id
    pub count: usize,
    /// Index of the capstone this region belongs to, if any
    pub capstone: Option<usize>,
}

impl Region {
    /// Create an empty region anchored at `seed`
    pub fn new(seed: PointI) -> Self {
        Self {
            seed,
            count: 0,
            capstone: None,
        }
    }
}
