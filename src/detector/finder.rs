/// Capstone candidate scanning using 1:1:3:1:1 run-length windows
use crate::models::{PIXEL_WHITE, PixelGrid};
use rayon::prelude::*;

/// Fixed-point scale applied to run lengths before the ratio test
const RATIO_SCALE: usize = 16;
/// Expected black:white:black:white:black proportions across a capstone
const CAPSTONE_RATIO: [usize; 5] = [1, 1, 3, 1, 1];

/// The five most recent run lengths of a row, oldest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunLengthWindow {
    runs: [usize; 5],
}

impl RunLengthWindow {
    /// Create an empty window
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the oldest run and append `run_length` as the newest
    pub fn push(&mut self, run_length: usize) {
        self.runs.rotate_left(1);
        self.runs[4] = run_length;
    }

    /// Current run lengths, oldest first
    pub fn runs(&self) -> [usize; 5] {
        self.runs
    }

    /// True if the window matches 1:1:3:1:1 within 75% of the average module.
    ///
    /// The average is taken over the four outer runs only; the stone is
    /// tested against three times that average.
    pub fn matches_capstone_ratio(&self) -> bool {
        let runs = &self.runs;
        let avg = (runs[0] + runs[1] + runs[3] + runs[4]) * RATIO_SCALE / 4;
        let err = avg * 3 / 4;

        runs.iter().zip(CAPSTONE_RATIO).all(|(&run, check)| {
            let scaled = run * RATIO_SCALE;
            scaled >= check * avg - err && scaled <= check * avg + err
        })
    }
}

/// A row position whose last five runs look like a capstone cross-section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinderCandidate {
    /// Column of the first white pixel after the pattern
    pub x: usize,
    /// Row the pattern was found on
    pub y: usize,
    /// Run lengths black, white, black, white, black
    pub runs: [usize; 5],
}

impl FinderCandidate {
    /// Column where the right ring run starts
    pub fn ring_right_x(&self) -> usize {
        self.x - self.runs[4]
    }

    /// Column where the stone run starts
    pub fn stone_x(&self) -> usize {
        self.x - self.runs[4] - self.runs[3] - self.runs[2]
    }

    /// Column where the left ring run starts
    pub fn ring_left_x(&self) -> usize {
        self.x - self.runs.iter().sum::<usize>()
    }
}

/// Lazy left-to-right scan of one row of labels
pub struct RowScanner<'a> {
    row: &'a [u8],
    y: usize,
    x: usize,
    last_black: bool,
    run_length: usize,
    run_count: usize,
    window: RunLengthWindow,
}

impl<'a> RowScanner<'a> {
    /// Scan `row`, reporting candidates as lying on row `y`
    pub fn new(row: &'a [u8], y: usize) -> Self {
        Self {
            row,
            y,
            x: 0,
            last_black: false,
            run_length: 0,
            run_count: 0,
            window: RunLengthWindow::new(),
        }
    }
}

impl Iterator for RowScanner<'_> {
    type Item = FinderCandidate;

    fn next(&mut self) -> Option<FinderCandidate> {
        while self.x < self.row.len() {
            let x = self.x;
            let black = self.row[x] != PIXEL_WHITE;
            let mut candidate = None;

            if x > 0 && black != self.last_black {
                self.window.push(self.run_length);
                self.run_length = 0;
                self.run_count += 1;

                if !black && self.run_count >= 5 && self.window.matches_capstone_ratio() {
                    candidate = Some(FinderCandidate {
                        x,
                        y: self.y,
                        runs: self.window.runs(),
                    });
                }
            }

            self.run_length += 1;
            self.last_black = black;
            self.x += 1;

            if candidate.is_some() {
                return candidate;
            }
        }

        None
    }
}

/// Candidates from every row of `grid`, in row-major order.
///
/// Scanning only reads the grid, so rows may be processed in parallel; the
/// result order is the same either way.
pub fn scan_rows(grid: &PixelGrid, parallel: bool) -> Vec<FinderCandidate> {
    let height = grid.height();
    if grid.width() == 0 {
        return Vec::new();
    }

    if parallel {
        (0..height)
            .into_par_iter()
            .flat_map_iter(|y| RowScanner::new(grid.row(y), y).collect::<Vec<_>>())
            .collect()
    } else {
        (0..height)
            .flat_map(|y| RowScanner::new(grid.row(y), y))
            .collect()
    }
}
