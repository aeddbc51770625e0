use crate::config::{ScanConfig, ThresholdMode};
use crate::detector::capstone::{CapstoneTable, CapstoneVerdict, test_capstone};
use crate::detector::finder::{FinderCandidate, RowScanner, scan_rows};
use crate::detector::regions::RegionTable;
use crate::error::ScanError;
use crate::models::{Capstone, PixelGrid};
use crate::utils::binarization::binarize_into;
use crate::utils::threshold::otsu_threshold;

/// Stage-level counters for one detection pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanTelemetry {
    /// Threshold used for binarization
    pub threshold: u8,
    /// Rows scanned since the last binarization
    pub rows_scanned: usize,
    /// 1:1:3:1:1 windows handed to capstone testing
    pub candidates: usize,
    /// Candidates rejected because a probe had no region
    pub unresolved: usize,
    /// Candidates rejected by ring connectivity or area checks
    pub rejected: usize,
    /// Candidates whose regions already form a capstone
    pub duplicates: usize,
    /// Capstones stored
    pub capstones_recorded: usize,
    /// Regions allocated
    pub regions_allocated: usize,
    /// Region allocation was refused at least once
    pub regions_saturated: bool,
    /// A capstone was dropped because the table was full
    pub capstones_saturated: bool,
    /// Flood fills stopped by the stack limit
    pub fill_overflows: usize,
}

/// State for detecting capstones in images of one size.
///
/// Owns the pixel grid, region table and capstone table and threads them
/// through thresholding, binarization, row scanning and region resolution.
#[derive(Debug, Clone)]
pub struct ScanContext {
    config: ScanConfig,
    grid: PixelGrid,
    regions: RegionTable,
    capstones: CapstoneTable,
    telemetry: ScanTelemetry,
}

impl ScanContext {
    /// Allocate a context for `width x height` images
    pub fn new(width: usize, height: usize, config: ScanConfig) -> Result<Self, ScanError> {
        if width == 0 || height == 0 {
            return Err(ScanError::EmptyImage { width, height });
        }

        Ok(Self {
            config,
            grid: PixelGrid::new(width, height),
            regions: RegionTable::new(config.fill_stack_limit_for(height)),
            capstones: CapstoneTable::new(),
            telemetry: ScanTelemetry::default(),
        })
    }

    /// Image width
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// Image height
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Active configuration
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Replace the configuration; takes effect on the next binarization
    pub fn set_config(&mut self, config: ScanConfig) {
        self.config = config;
        self.regions
            .set_stack_limit(config.fill_stack_limit_for(self.grid.height()));
    }

    /// Current pixel labels
    pub fn grid(&self) -> &PixelGrid {
        &self.grid
    }

    /// Regions allocated so far
    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    /// Capstones recorded so far
    pub fn capstones(&self) -> &[Capstone] {
        self.capstones.as_slice()
    }

    /// Counters for the current pass
    pub fn telemetry(&self) -> ScanTelemetry {
        let mut telemetry = self.telemetry;
        telemetry.regions_allocated = self.regions.len();
        telemetry.regions_saturated = self.regions.is_saturated();
        telemetry.capstones_saturated = self.capstones.is_saturated();
        telemetry.fill_overflows = self.regions.fill_overflows();
        telemetry
    }

    /// Threshold `gray` and write the labels into the grid.
    ///
    /// Clears regions, capstones and telemetry from any previous pass and
    /// returns the threshold used.
    pub fn binarize(&mut self, gray: &[u8]) -> Result<u8, ScanError> {
        let expected = self.grid.width() * self.grid.height();
        if gray.len() != expected {
            return Err(ScanError::BufferSize {
                expected,
                actual: gray.len(),
            });
        }

        let threshold = match self.config.threshold {
            ThresholdMode::Otsu => otsu_threshold(gray),
            ThresholdMode::Fixed(t) => t,
        };

        self.regions.clear();
        self.capstones.clear();
        self.telemetry = ScanTelemetry {
            threshold,
            ..ScanTelemetry::default()
        };
        binarize_into(gray, threshold, &mut self.grid);

        Ok(threshold)
    }

    /// Scan row `y` and test each candidate on it, in column order
    pub fn scan_row(&mut self, y: usize) {
        if y >= self.grid.height() {
            return;
        }
        let candidates: Vec<FinderCandidate> = RowScanner::new(self.grid.row(y), y).collect();
        self.telemetry.rows_scanned += 1;
        for candidate in &candidates {
            self.test_candidate(candidate);
        }
    }

    /// Run a full pass over `gray` and return the capstones found.
    ///
    /// Candidate gathering may run in parallel; regions are always resolved
    /// on this thread in row-major candidate order, so region ids do not
    /// depend on `parallel_rows`.
    pub fn identify(&mut self, gray: &[u8]) -> Result<&[Capstone], ScanError> {
        let threshold = self.binarize(gray)?;

        let candidates = scan_rows(&self.grid, self.config.parallel_rows);
        self.telemetry.rows_scanned = self.grid.height();
        for candidate in &candidates {
            self.test_candidate(candidate);
        }

        let telemetry = self.telemetry();
        tracing::debug!(
            width = self.grid.width(),
            height = self.grid.height(),
            threshold,
            candidates = telemetry.candidates,
            regions = telemetry.regions_allocated,
            capstones = telemetry.capstones_recorded,
            "capstone scan complete"
        );

        Ok(self.capstones.as_slice())
    }

    fn test_candidate(&mut self, candidate: &FinderCandidate) {
        self.telemetry.candidates += 1;
        let verdict = test_capstone(
            &mut self.grid,
            &mut self.regions,
            &mut self.capstones,
            candidate,
        );
        match verdict {
            CapstoneVerdict::Recorded(index) => {
                self.telemetry.capstones_recorded += 1;
                tracing::trace!(index, x = candidate.x, y = candidate.y, "capstone recorded");
            }
            CapstoneVerdict::Unresolved => self.telemetry.unresolved += 1,
            CapstoneVerdict::AlreadyDetected => self.telemetry.duplicates += 1,
            CapstoneVerdict::TableFull => {}
            rejected => {
                self.telemetry.rejected += 1;
                tracing::trace!(x = candidate.x, y = candidate.y, verdict = ?rejected, "candidate rejected");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PIXEL_BLACK, PIXEL_WHITE};

    #[test]
    fn test_rejects_empty_image() {
        let err = ScanContext::new(0, 10, ScanConfig::default()).unwrap_err();
        assert!(matches!(err, ScanError::EmptyImage { width: 0, height: 10 }));
    }

    #[test]
    fn test_rejects_wrong_buffer_size() {
        let mut ctx = ScanContext::new(4, 4, ScanConfig::default()).unwrap();
        let err = ctx.binarize(&[0u8; 15]).unwrap_err();
        assert!(matches!(err, ScanError::BufferSize { expected: 16, actual: 15 }));
    }

    #[test]
    fn test_fixed_threshold() {
        let config = ScanConfig::default().with_threshold(100);
        let mut ctx = ScanContext::new(2, 1, config).unwrap();
        assert_eq!(ctx.binarize(&[99, 100]).unwrap(), 100);
        assert_eq!(ctx.grid().get(0, 0), PIXEL_BLACK);
        assert_eq!(ctx.grid().get(1, 0), PIXEL_WHITE);
        assert_eq!(ctx.telemetry().threshold, 100);
    }

    /// Light image with one capstone drawn at 2px per module from (8, 8)
    fn capstone_image(width: usize, height: usize) -> Vec<u8> {
        let mut gray = vec![255u8; width * height];
        for my in 0..7 {
            for mx in 0..7 {
                let ring = mx == 0 || mx == 6 || my == 0 || my == 6;
                let stone = (2..=4).contains(&mx) && (2..=4).contains(&my);
                if ring || stone {
                    for d in 0..4 {
                        let x = 8 + mx * 2 + d % 2;
                        let y = 8 + my * 2 + d / 2;
                        gray[y * width + x] = 0;
                    }
                }
            }
        }
        gray
    }

    #[test]
    fn test_scan_row_matches_identify() {
        let (width, height) = (40, 40);
        let gray = capstone_image(width, height);

        let mut by_row = ScanContext::new(width, height, ScanConfig::default()).unwrap();
        by_row.binarize(&gray).unwrap();
        for y in 0..height {
            by_row.scan_row(y);
        }

        let mut whole = ScanContext::new(width, height, ScanConfig::default()).unwrap();
        let capstones = whole.identify(&gray).unwrap().to_vec();

        assert_eq!(capstones.len(), 1);
        assert_eq!(by_row.capstones(), &capstones[..]);
        assert_eq!(by_row.grid(), whole.grid());
        assert_eq!(by_row.telemetry(), whole.telemetry());
        assert_eq!(whole.telemetry().fill_overflows, 0);
    }

    #[test]
    fn test_shallow_fill_limit_is_reported() {
        let (width, height) = (40, 40);
        let gray = capstone_image(width, height);
        let config = ScanConfig::default().with_fill_stack_limit(4);
        let mut ctx = ScanContext::new(width, height, config).unwrap();

        ctx.identify(&gray).unwrap();
        assert!(ctx.telemetry().fill_overflows > 0);
        assert_eq!(ctx.regions().stack_limit(), 4);

        // Raising the limit takes effect on the next pass
        ctx.set_config(ScanConfig::default());
        assert_eq!(ctx.identify(&gray).unwrap().len(), 1);
        assert_eq!(ctx.telemetry().fill_overflows, 0);
    }

    #[test]
    fn test_binarize_resets_previous_pass() {
        let mut ctx = ScanContext::new(21, 1, ScanConfig::default().with_threshold(128)).unwrap();
        let mut row = vec![255u8; 21];
        for x in [3, 5, 6, 7, 9] {
            row[x] = 0;
        }
        ctx.identify(&row).unwrap();
        assert!(ctx.telemetry().candidates > 0);

        ctx.binarize(&[255u8; 21]).unwrap();
        assert!(ctx.regions().is_empty());
        assert!(ctx.capstones().is_empty());
        assert_eq!(ctx.telemetry().candidates, 0);
    }
}
