/// Errors raised when a scan cannot start.
///
/// Table saturation is not an error; see [`crate::ScanTelemetry`].
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The image has no pixels.
    #[error("image must be non-empty, got {width}x{height}")]
    EmptyImage {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
    },

    /// The grayscale buffer does not match the grid dimensions.
    #[error("grayscale buffer holds {actual} bytes, expected {expected}")]
    BufferSize {
        /// `width * height`
        expected: usize,
        /// Length of the buffer that was passed in
        actual: usize,
    },

    /// Failed to open or decode an image file.
    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),
}
