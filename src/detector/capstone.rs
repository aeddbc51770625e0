/// Capstone verification and recording
use crate::detector::finder::FinderCandidate;
use crate::detector::regions::{RegionTable, flood_fill};
use crate::models::{
    Capstone, MAX_CAPSTONES, PIXEL_BLACK, PixelGrid, Point, PointI, RegionId,
};
use crate::utils::geometry::{PerspectiveTransform, centroid};

/// Capstone side length in modules
const CAPSTONE_MODULES: f32 = 7.0;
/// Accepted range for `stone.count * 100 / ring.count`; 9/24 = 37.5 is ideal
const STONE_RING_RATIO: std::ops::RangeInclusive<usize> = 10..=70;

/// What happened to a finder candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapstoneVerdict {
    /// A new capstone was stored at this index
    Recorded(usize),
    /// One of the probe pixels has no region
    Unresolved,
    /// Left and right ring probes belong to different regions
    RingBroken,
    /// The stone is connected to the ring
    StoneTouchesRing,
    /// The ring or stone already belongs to a capstone
    AlreadyDetected,
    /// Stone area is not in proportion to the ring
    BadAreaRatio(usize),
    /// The capstone table is full
    TableFull,
}

/// Capstones found in one image, capped at `MAX_CAPSTONES`
#[derive(Debug, Clone, Default)]
pub struct CapstoneTable {
    capstones: Vec<Capstone>,
    saturated: bool,
}

impl CapstoneTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            capstones: Vec::with_capacity(MAX_CAPSTONES),
            saturated: false,
        }
    }

    /// Forget every capstone
    pub fn clear(&mut self) {
        self.capstones.clear();
        self.saturated = false;
    }

    /// Recorded capstones in detection order
    pub fn as_slice(&self) -> &[Capstone] {
        &self.capstones
    }

    /// Number of recorded capstones
    pub fn len(&self) -> usize {
        self.capstones.len()
    }

    /// True if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.capstones.is_empty()
    }

    /// True once a capstone was dropped because the table was full
    pub fn is_saturated(&self) -> bool {
        self.saturated
    }
}

/// Verify a finder candidate against region connectivity and record it.
///
/// Probes the left ring, stone and right ring runs on the candidate's row.
/// Probing labels the regions it touches, even when the candidate is rejected.
pub fn test_capstone(
    grid: &mut PixelGrid,
    regions: &mut RegionTable,
    capstones: &mut CapstoneTable,
    candidate: &FinderCandidate,
) -> CapstoneVerdict {
    let y = candidate.y as i32;
    let ring_right = regions.resolve(grid, candidate.ring_right_x() as i32, y);
    let stone = regions.resolve(grid, candidate.stone_x() as i32, y);
    let ring_left = regions.resolve(grid, candidate.ring_left_x() as i32, y);

    let (Some(ring_left), Some(ring_right), Some(stone)) = (ring_left, ring_right, stone) else {
        return CapstoneVerdict::Unresolved;
    };

    if ring_left != ring_right {
        return CapstoneVerdict::RingBroken;
    }
    if ring_left == stone {
        return CapstoneVerdict::StoneTouchesRing;
    }

    let (Some(stone_reg), Some(ring_reg)) = (regions.get(stone), regions.get(ring_left)) else {
        return CapstoneVerdict::Unresolved;
    };
    if stone_reg.capstone.is_some() || ring_reg.capstone.is_some() {
        return CapstoneVerdict::AlreadyDetected;
    }

    let ratio = stone_reg.count * 100 / ring_reg.count.max(1);
    if !STONE_RING_RATIO.contains(&ratio) {
        return CapstoneVerdict::BadAreaRatio(ratio);
    }

    record_capstone(grid, regions, capstones, ring_left, stone)
}

/// Store a capstone for `ring`/`stone` and locate its corners and center
pub fn record_capstone(
    grid: &mut PixelGrid,
    regions: &mut RegionTable,
    capstones: &mut CapstoneTable,
    ring: RegionId,
    stone: RegionId,
) -> CapstoneVerdict {
    if capstones.capstones.len() >= MAX_CAPSTONES {
        if !capstones.saturated {
            tracing::warn!(max = MAX_CAPSTONES, "capstone table full, ignoring further capstones");
        }
        capstones.saturated = true;
        return CapstoneVerdict::TableFull;
    }

    let index = capstones.capstones.len();
    let Some(stone_seed) = regions.get(stone).map(|r| r.seed) else {
        return CapstoneVerdict::Unresolved;
    };
    if let Some(r) = regions.get_mut(stone) {
        r.capstone = Some(index);
    }
    if let Some(r) = regions.get_mut(ring) {
        r.capstone = Some(index);
    }

    let corners = find_region_corners(grid, regions, ring, stone_seed);
    let center = PerspectiveTransform::from_square(CAPSTONE_MODULES, &corners)
        .and_then(|t| t.transform(&Point::new(CAPSTONE_MODULES / 2.0, CAPSTONE_MODULES / 2.0)))
        .unwrap_or_else(|| centroid(&corners));

    capstones.capstones.push(Capstone {
        ring,
        stone,
        corners,
        center,
    });

    CapstoneVerdict::Recorded(index)
}

/// Four outer corners of region `id`, found relative to the point `reference`.
///
/// The first pass takes the span endpoint farthest from `reference`. The
/// direction from `reference` to that point becomes the axis for the second
/// pass, which keeps the extreme endpoints along the axis, its perpendicular,
/// and their opposites. Both passes refill the region, leaving labels as
/// they were.
pub fn find_region_corners(
    grid: &mut PixelGrid,
    regions: &RegionTable,
    id: RegionId,
    reference: PointI,
) -> [PointI; 4] {
    let Some(seed) = regions.get(id).map(|r| r.seed) else {
        return [reference; 4];
    };
    let (sx, sy) = (seed.x as usize, seed.y as usize);
    let limit = regions.stack_limit();

    let mut farthest = seed;
    let mut best = -1i64;
    flood_fill(grid, sx, sy, id, PIXEL_BLACK, limit, |y, left, right| {
        for x in [left, right] {
            let p = PointI::new(x as i32, y as i32);
            let d = p.distance_squared(reference);
            if d > best {
                best = d;
                farthest = p;
            }
        }
    });

    let axis = farthest.offset_from(reference);
    let perp = axis.perp();
    let project = |p: PointI| {
        let along = p.dot(axis);
        let across = p.dot(perp);
        [along, across, -along, -across]
    };

    let mut corners = [seed; 4];
    let mut scores = project(seed);
    flood_fill(grid, sx, sy, PIXEL_BLACK, id, limit, |y, left, right| {
        for x in [left, right] {
            let p = PointI::new(x as i32, y as i32);
            let candidate = project(p);
            for j in 0..4 {
                if candidate[j] > scores[j] {
                    scores[j] = candidate[j];
                    corners[j] = p;
                }
            }
        }
    });

    corners
}
