//! qr_capstone - QR code finder pattern detection
//!
//! Finds the square "capstone" markers at the corners of QR codes in 8-bit
//! grayscale images: Otsu thresholding, binarization into a labeled pixel
//! grid, 1:1:3:1:1 run-length scanning, and region labeling that checks each
//! candidate is a ring enclosing a separate stone.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Scan settings and environment overrides
pub mod config;
/// Capstone detection modules (row scanning, region labeling, recording)
pub mod detector;
/// Error type for rejected inputs
pub mod error;
/// Core data structures (PixelGrid, Region, Capstone, Point)
pub mod models;
/// Per-image detection state
pub mod pipeline;
/// Developer helpers for loading and dumping images
pub mod tools;
/// Utility functions (thresholding, binarization, geometry)
pub mod utils;

pub use config::{ScanConfig, ThresholdMode};
pub use error::ScanError;
pub use models::{Capstone, PixelGrid, Point, PointI, Region, RegionId};
pub use pipeline::{ScanContext, ScanTelemetry};

/// Detect capstones in a grayscale image
///
/// # Arguments
/// * `gray` - Grayscale bytes (1 byte per pixel, row-major)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
///
/// # Returns
/// Capstones in detection order, or an error if the buffer does not describe
/// a non-empty `width x height` image
pub fn detect_capstones(gray: &[u8], width: usize, height: usize) -> Result<Vec<Capstone>, ScanError> {
    let mut ctx = ScanContext::new(width, height, ScanConfig::from_env())?;
    Ok(ctx.identify(gray)?.to_vec())
}

/// Detector that keeps its scan buffers between images
///
/// # Example
/// ```
/// use qr_capstone::Detector;
///
/// let mut detector = Detector::new();
/// let image = vec![255u8; 64 * 48];
/// let capstones = detector.detect(&image, 64, 48).unwrap();
/// assert!(capstones.is_empty());
/// ```
pub struct Detector {
    config: ScanConfig,
    context: Option<ScanContext>,
}

impl Detector {
    /// Create a detector configured from the environment
    pub fn new() -> Self {
        Self::with_config(ScanConfig::from_env())
    }

    /// Create a detector with explicit settings
    pub fn with_config(config: ScanConfig) -> Self {
        Self {
            config,
            context: None,
        }
    }

    /// Detect capstones, reusing the previous context when the size matches
    pub fn detect(&mut self, gray: &[u8], width: usize, height: usize) -> Result<&[Capstone], ScanError> {
        let reusable = self
            .context
            .as_ref()
            .is_some_and(|ctx| ctx.width() == width && ctx.height() == height);
        if !reusable {
            self.context = Some(ScanContext::new(width, height, self.config)?);
        }

        match self.context.as_mut() {
            Some(ctx) => ctx.identify(gray),
            None => Err(ScanError::EmptyImage { width, height }),
        }
    }

    /// Change settings without dropping the cached context
    pub fn set_config(&mut self, config: ScanConfig) {
        self.config = config;
        if let Some(ctx) = self.context.as_mut() {
            ctx.set_config(config);
        }
    }

    /// Counters from the most recent detection
    pub fn telemetry(&self) -> Option<ScanTelemetry> {
        self.context.as_ref().map(ScanContext::telemetry)
    }

    /// Context of the most recent detection, for inspecting labels and regions
    pub fn context(&self) -> Option<&ScanContext> {
        self.context.as_ref()
    }

    /// Drop the cached context
    pub fn clear(&mut self) {
        self.context = None;
    }
}

impl Default for Detector {
    fn default() -> Self {
        Self::new()
    }
}
