use crate::models::{PIXEL_BLACK, PIXEL_WHITE, PixelGrid};
use crate::utils::threshold::otsu_threshold;
use rayon::prelude::*;

/// Label every pixel of `gray` into `grid`: black if below `threshold`, else white.
///
/// `gray` must hold `grid.width() * grid.height()` samples. Rows are written
/// in parallel; the output depends only on the inputs.
pub fn binarize_into(gray: &[u8], threshold: u8, grid: &mut PixelGrid) {
    let width = grid.width();
    if width == 0 {
        return;
    }

    grid.as_bytes_mut()
        .par_chunks_mut(width)
        .zip(gray.par_chunks(width))
        .for_each(|(row, src)| {
            for (label, &pixel) in row.iter_mut().zip(src) {
                *label = if pixel < threshold {
                    PIXEL_BLACK
                } else {
                    PIXEL_WHITE
                };
            }
        });
}

/// Convert a grayscale image to a pixel grid with a fixed threshold
pub fn threshold_binarize(gray: &[u8], width: usize, height: usize, threshold: u8) -> PixelGrid {
    let mut grid = PixelGrid::new(width, height);
    binarize_into(gray, threshold, &mut grid);
    grid
}

/// Convert a grayscale image to a pixel grid using Otsu's threshold.
/// Returns the grid together with the threshold that produced it.
pub fn otsu_binarize(gray: &[u8], width: usize, height: usize) -> (PixelGrid, u8) {
    let threshold = otsu_threshold(gray);
    (threshold_binarize(gray, width, height, threshold), threshold)
}
