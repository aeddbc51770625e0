/// Detected capstone record
pub mod capstone;
/// Labeled pixel grid
pub mod pixel_grid;
/// Float and integer points
pub mod point;
/// Region record and id type
pub mod region;

pub use capstone::{Capstone, MAX_CAPSTONES};
pub use pixel_grid::{PIXEL_BLACK, PIXEL_REGION, PIXEL_WHITE, PixelGrid};
pub use point::{Point, PointI};
pub use region::{MAX_REGIONS, Region, RegionId};
