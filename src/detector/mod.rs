//! Capstone detection modules
//!
//! - Row scanning for 1:1:3:1:1 run-length windows
//! - Lazy region labeling with bounded flood fill
//! - Capstone verification, corner search and center estimation

/// Capstone verification and recording
pub mod capstone;
/// Row scanning with a five-run sliding window
pub mod finder;
/// Region id allocation and flood fill
pub mod regions;
