use crate::error::ScanError;
use crate::models::{PIXEL_BLACK, PIXEL_REGION, PIXEL_WHITE, PixelGrid};
use image::{GrayImage, Luma};
use std::env;
use std::path::Path;

fn max_dim_from_env() -> Option<u32> {
    match env::var("QR_MAX_DIM") {
        Ok(value) => match value.trim().parse::<u32>() {
            Ok(0) => None,
            Ok(v) => Some(v),
            Err(_) => None,
        },
        Err(_) => None,
    }
}

/// Load an image file as 8-bit grayscale bytes along with its dimensions.
///
/// Images larger than `QR_MAX_DIM` on their longest side are downscaled first.
pub fn load_grayscale<P: AsRef<Path>>(path: P) -> Result<(Vec<u8>, usize, usize), ScanError> {
    let img = image::open(path)?;
    let gray = match max_dim_from_env() {
        Some(max_dim) if img.width().max(img.height()) > max_dim => img
            .resize(max_dim, max_dim, image::imageops::FilterType::Triangle)
            .to_luma8(),
        _ => img.to_luma8(),
    };
    let (width, height) = gray.dimensions();
    Ok((gray.into_raw(), width as usize, height as usize))
}

/// Summary statistics for grayscale data.
#[derive(Debug, Clone, Copy)]
pub struct GrayStats {
    /// Minimum grayscale value.
    pub min: u8,
    /// Maximum grayscale value.
    pub max: u8,
    /// Average grayscale value.
    pub avg: u8,
}

/// Summary statistics for a pixel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridStats {
    /// Pixels labeled white.
    pub white_pixels: usize,
    /// Black pixels not assigned to any region.
    pub black_pixels: usize,
    /// Pixels carrying a region id.
    pub region_pixels: usize,
}

impl GridStats {
    /// Fraction of non-white pixels.
    pub fn black_ratio(&self) -> f64 {
        let total = self.white_pixels + self.black_pixels + self.region_pixels;
        if total == 0 {
            0.0
        } else {
            (self.black_pixels + self.region_pixels) as f64 / total as f64
        }
    }
}

/// Compute min/max/avg for grayscale values.
pub fn grayscale_stats(gray: &[u8]) -> GrayStats {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum: u64 = 0;
    for &v in gray {
        min = min.min(v);
        max = max.max(v);
        sum += v as u64;
    }
    let avg = if gray.is_empty() {
        0
    } else {
        (sum / gray.len() as u64) as u8
    };
    GrayStats { min, max, avg }
}

/// Count white, black and region-labeled cells.
pub fn grid_stats(grid: &PixelGrid) -> GridStats {
    let mut stats = GridStats {
        white_pixels: 0,
        black_pixels: 0,
        region_pixels: 0,
    };
    for &label in grid.as_bytes() {
        match label {
            PIXEL_WHITE => stats.white_pixels += 1,
            PIXEL_BLACK => stats.black_pixels += 1,
            _ => stats.region_pixels += 1,
        }
    }
    stats
}

/// Render labels as an image: white stays white, black is black, and each
/// region id gets a mid-gray level so neighbouring regions are distinguishable.
pub fn render_grid(grid: &PixelGrid) -> GrayImage {
    GrayImage::from_fn(grid.width() as u32, grid.height() as u32, |x, y| {
        let label = grid.get(x as usize, y as usize);
        let level = match label {
            PIXEL_WHITE => 255,
            PIXEL_BLACK => 0,
            id => 40 + ((id - PIXEL_REGION) as u32 * 37 % 160) as u8,
        };
        Luma([level])
    })
}

/// Write the rendered labels of `grid` to `path`; the format follows the extension.
pub fn save_grid_png<P: AsRef<Path>>(grid: &PixelGrid, path: P) -> Result<(), ScanError> {
    render_grid(grid).save(path)?;
    Ok(())
}
