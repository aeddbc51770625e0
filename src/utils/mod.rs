//! Utility functions for image processing
//!
//! - Thresholding (Otsu's method over a grayscale histogram)
//! - Binarization (grayscale to labeled pixel grid)
//! - Geometry (perspective transform used to locate capstone centers)

/// Grayscale to label grid
pub mod binarization;
/// Perspective transform and centroid
pub mod geometry;
/// Histogram and Otsu threshold
pub mod threshold;
