/// Lazy region labeling: black components get an id the first time they are probed
use crate::models::{MAX_REGIONS, PIXEL_REGION, PIXEL_WHITE, PixelGrid, PointI, Region, RegionId};

/// Outcome of a flood fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStatus {
    /// Every reachable pixel was relabeled
    Complete,
    /// The fill needed more than `stack_limit` nested rows and stopped early
    Overflow,
}

/// One row of an in-progress fill: the span just filled on row `y` and the
/// next columns to examine on the rows above and below it
#[derive(Debug, Clone, Copy)]
struct FillFrame {
    y: usize,
    right: usize,
    left_up: usize,
    left_down: usize,
}

impl FillFrame {
    fn new(y: usize, left: usize, right: usize) -> Self {
        Self {
            y,
            right,
            left_up: left,
            left_down: left,
        }
    }

    /// Next `from` pixel under or over this frame's span, advancing the cursors
    fn next_seed(&mut self, grid: &PixelGrid, from: u8) -> Option<(usize, usize)> {
        if self.y > 0 {
            let above = grid.row(self.y - 1);
            while self.left_up <= self.right {
                if above[self.left_up] == from {
                    return Some((self.left_up, self.y - 1));
                }
                self.left_up += 1;
            }
        }
        if self.y + 1 < grid.height() {
            let below = grid.row(self.y + 1);
            while self.left_down <= self.right {
                if below[self.left_down] == from {
                    return Some((self.left_down, self.y + 1));
                }
                self.left_down += 1;
            }
        }
        None
    }
}

/// Relabel the horizontal run of `from` pixels through (x, y) and return its extent
fn fill_line<F>(grid: &mut PixelGrid, x: usize, y: usize, from: u8, to: u8, on_span: &mut F) -> (usize, usize)
where
    F: FnMut(usize, usize, usize),
{
    let width = grid.width();
    let row = grid.row_mut(y);
    let mut left = x;
    while left > 0 && row[left - 1] == from {
        left -= 1;
    }
    let mut right = x;
    while right + 1 < width && row[right + 1] == from {
        right += 1;
    }
    row[left..=right].fill(to);
    on_span(y, left, right);
    (left, right)
}

/// Relabel the 4-connected run of `from` pixels containing (x0, y0) to `to`.
///
/// Works one horizontal span at a time; `on_span(y, left, right)` is called
/// for every span filled. Each span opens a frame that is resumed once the
/// spans seeded from it are done, so the number of live frames is the
/// nesting depth of the fill, not its width. When more than `stack_limit`
/// frames would be live the fill stops and reports `Overflow`.
pub fn flood_fill<F>(
    grid: &mut PixelGrid,
    x0: usize,
    y0: usize,
    from: u8,
    to: u8,
    stack_limit: usize,
    mut on_span: F,
) -> FillStatus
where
    F: FnMut(usize, usize, usize),
{
    if from == to || grid.get(x0, y0) != from {
        return FillStatus::Complete;
    }

    let (left, right) = fill_line(grid, x0, y0, from, to, &mut on_span);
    let mut stack = vec![FillFrame::new(y0, left, right)];

    while let Some(frame) = stack.last_mut() {
        let Some((x, y)) = frame.next_seed(grid, from) else {
            stack.pop();
            continue;
        };
        if stack.len() >= stack_limit {
            return FillStatus::Overflow;
        }
        let (left, right) = fill_line(grid, x, y, from, to, &mut on_span);
        stack.push(FillFrame::new(y, left, right));
    }

    FillStatus::Complete
}

/// Fixed-capacity table of regions, indexed by region id.
///
/// Ids start at `PIXEL_REGION` and stay below `MAX_REGIONS`, so every id fits
/// in a grid cell next to the white and black labels.
#[derive(Debug, Clone)]
pub struct RegionTable {
    regions: Vec<Region>,
    stack_limit: usize,
    saturated: bool,
    fill_overflows: usize,
}

impl RegionTable {
    /// Create an empty table whose flood fills nest at most `stack_limit` rows deep
    pub fn new(stack_limit: usize) -> Self {
        Self {
            regions: Vec::with_capacity(MAX_REGIONS - PIXEL_REGION as usize),
            stack_limit: stack_limit.max(1),
            saturated: false,
            fill_overflows: 0,
        }
    }

    /// Forget every region
    pub fn clear(&mut self) {
        self.regions.clear();
        self.saturated = false;
        self.fill_overflows = 0;
    }

    /// Change the flood-fill stack limit
    pub fn set_stack_limit(&mut self, stack_limit: usize) {
        self.stack_limit = stack_limit.max(1);
    }

    /// Number of regions allocated
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// True if no region has been allocated
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// True once an allocation was refused because the id space is exhausted
    pub fn is_saturated(&self) -> bool {
        self.saturated
    }

    /// Number of flood fills cut short by the stack limit
    pub fn fill_overflows(&self) -> usize {
        self.fill_overflows
    }

    /// Look up a region by id
    pub fn get(&self, id: RegionId) -> Option<&Region> {
        let index = (id as usize).checked_sub(PIXEL_REGION as usize)?;
        self.regions.get(index)
    }

    /// Mutable lookup by id
    pub fn get_mut(&mut self, id: RegionId) -> Option<&mut Region> {
        let index = (id as usize).checked_sub(PIXEL_REGION as usize)?;
        self.regions.get_mut(index)
    }

    /// Stack limit used by this table's flood fills
    pub fn stack_limit(&self) -> usize {
        self.stack_limit
    }

    /// Region id of the pixel at (x, y), allocating one for unlabeled black pixels.
    ///
    /// Returns `None` outside the grid, on white pixels, and once the table is
    /// full. A new region is flood-filled with its id immediately, so its
    /// `count` holds the component area.
    pub fn resolve(&mut self, grid: &mut PixelGrid, x: i32, y: i32) -> Option<RegionId> {
        if x < 0 || y < 0 {
            return None;
        }
        let (ux, uy) = (x as usize, y as usize);
        if ux >= grid.width() || uy >= grid.height() {
            return None;
        }

        let pixel = grid.get(ux, uy);
        if pixel >= PIXEL_REGION {
            return Some(pixel);
        }
        if pixel == PIXEL_WHITE {
            return None;
        }

        let next = self.regions.len() + PIXEL_REGION as usize;
        if next >= MAX_REGIONS {
            if !self.saturated {
                tracing::warn!(max = MAX_REGIONS, "region table full, ignoring further regions");
            }
            self.saturated = true;
            return None;
        }

        let id = next as RegionId;
        let mut region = Region::new(PointI::new(x, y));
        let status = flood_fill(grid, ux, uy, pixel, id, self.stack_limit, |_, left, right| {
            region.count += right - left + 1;
        });
        if status == FillStatus::Overflow {
            self.fill_overflows += 1;
            tracing::trace!(region = id, x, y, "flood fill stack exhausted");
        }
        self.regions.push(region);

        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PIXEL_BLACK;

    fn grid_from_rows(rows: &[&str]) -> PixelGrid {
        let width = rows[0].len();
        let mask: Vec<bool> = rows.iter().flat_map(|r| r.chars().map(|c| c == '#')).collect();
        PixelGrid::from_black_mask(width, rows.len(), &mask)
    }

    #[test]
    fn test_resolve_labels_whole_component() {
        let mut grid = grid_from_rows(&[
            "##..#", //
            ".#..#",
            ".###.",
        ]);
        let mut table = RegionTable::new(16);

        let id = table.resolve(&mut grid, 0, 0).unwrap();
        assert_eq!(id, PIXEL_REGION);
        assert_eq!(table.get(id).unwrap().count, 6);
        assert_eq!(table.get(id).unwrap().seed, PointI::new(0, 0));
        assert_eq!(table.get(id).unwrap().capstone, None);
        assert_eq!(grid.get(3, 2), id);
        // Diagonal neighbours are separate components
        assert_eq!(grid.get(4, 0), PIXEL_BLACK);

        let other = table.resolve(&mut grid, 4, 1).unwrap();
        assert_eq!(other, PIXEL_REGION + 1);
        assert_eq!(table.get(other).unwrap().count, 2);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut grid = grid_from_rows(&[".##.", ".##."]);
        let mut table = RegionTable::new(16);

        let first = table.resolve(&mut grid, 1, 0);
        let second = table.resolve(&mut grid, 1, 0);
        let elsewhere = table.resolve(&mut grid, 2, 1);
        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(first, elsewhere);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_resolve_white_and_out_of_bounds() {
        let mut grid = grid_from_rows(&["#.", ".."]);
        let mut table = RegionTable::new(16);

        assert_eq!(table.resolve(&mut grid, 1, 0), None);
        assert_eq!(table.resolve(&mut grid, -1, 0), None);
        assert_eq!(table.resolve(&mut grid, 0, 2), None);
        assert_eq!(table.resolve(&mut grid, 5, 5), None);
        assert!(table.is_empty());
    }

    #[test]
    fn test_region_capacity_exhaustion() {
        // Isolated black pixels on even columns of even rows
        let (width, height) = (60, 20);
        let mask: Vec<bool> = (0..width * height)
            .map(|i| (i % width) % 2 == 0 && (i / width) % 2 == 0)
            .collect();
        let mut grid = PixelGrid::from_black_mask(width, height, &mask);
        let mut table = RegionTable::new(16);

        let mut ids = Vec::new();
        for y in (0..height).step_by(2) {
            for x in (0..width).step_by(2) {
                if let Some(id) = table.resolve(&mut grid, x as i32, y as i32) {
                    ids.push(id);
                }
            }
        }

        assert_eq!(ids.len(), MAX_REGIONS - PIXEL_REGION as usize);
        assert_eq!(*ids.last().unwrap() as usize, MAX_REGIONS - 1);
        assert!(table.is_saturated());

        // Already-labeled pixels still resolve after saturation
        assert_eq!(table.resolve(&mut grid, 0, 0), Some(PIXEL_REGION));
    }

    #[test]
    fn test_flood_fill_spans_and_overflow() {
        let mut grid = grid_from_rows(&[
            "#.#.#", //
            "#####",
            "#.#.#",
        ]);
        let mut spans = Vec::new();
        let status = flood_fill(&mut grid, 0, 1, PIXEL_BLACK, 5, 16, |y, l, r| {
            spans.push((y, l, r))
        });
        assert_eq!(status, FillStatus::Complete);
        assert_eq!(spans.iter().map(|&(_, l, r)| r - l + 1).sum::<usize>(), 11);
        assert!(grid.as_bytes().iter().all(|&p| p == 5 || p == PIXEL_WHITE));

        let mut grid = grid_from_rows(&[
            "#.#.#", //
            "#####",
            "#.#.#",
        ]);
        let status = flood_fill(&mut grid, 0, 1, PIXEL_BLACK, 5, 1, |_, _, _| {});
        assert_eq!(status, FillStatus::Overflow);
    }

    /// Full-width bar on row 0 with one-pixel teeth on every even column
    fn comb_grid(width: usize, height: usize, tooth_len: usize) -> PixelGrid {
        let mut grid = PixelGrid::new(width, height);
        for x in 0..width {
            grid.set(x, 0, PIXEL_BLACK);
        }
        for x in (0..width).step_by(2) {
            for y in 1..=tooth_len {
                grid.set(x, y, PIXEL_BLACK);
            }
        }
        grid
    }

    #[test]
    fn test_wide_comb_is_one_region() {
        let (width, height) = (601, 30);
        let mut grid = comb_grid(width, height, 10);
        let mut table = RegionTable::new(height * 2 / 3);

        let id = table.resolve(&mut grid, 0, 0).unwrap();
        assert_eq!(table.get(id).unwrap().count, 601 + 301 * 10);
        assert_eq!(table.fill_overflows(), 0);

        for x in (0..width).step_by(2) {
            assert_eq!(table.resolve(&mut grid, x as i32, 10), Some(id));
        }
        assert_eq!(table.len(), 1);
        assert!(!table.is_saturated());
    }

    #[test]
    fn test_fill_depth_is_bounded_by_rows_not_width() {
        // Teeth are 10 rows long: depth 11 with the bar
        let mut grid = comb_grid(41, 20, 10);
        let mut spans = 0;
        let status = flood_fill(&mut grid, 0, 0, PIXEL_BLACK, 7, 11, |_, _, _| spans += 1);
        assert_eq!(status, FillStatus::Complete);
        assert_eq!(spans, 1 + 21 * 10);

        let mut grid = comb_grid(41, 20, 10);
        let status = flood_fill(&mut grid, 0, 0, PIXEL_BLACK, 7, 10, |_, _, _| {});
        assert_eq!(status, FillStatus::Overflow);
    }

    #[test]
    fn test_resolve_counts_deep_fill_overflow() {
        // Vertical bar 12 rows tall, filled from the top with room for 4 rows
        let mut grid = PixelGrid::new(3, 12);
        for y in 0..12 {
            grid.set(1, y, PIXEL_BLACK);
        }
        let mut table = RegionTable::new(4);

        let id = table.resolve(&mut grid, 1, 0).unwrap();
        assert_eq!(table.fill_overflows(), 1);
        assert_eq!(table.get(id).unwrap().count, 4);
        assert_eq!(grid.get(1, 4), PIXEL_BLACK);

        table.clear();
        assert_eq!(table.fill_overflows(), 0);
    }
}
