/// Pixel label for background pixels
pub const PIXEL_WHITE: u8 = 0;
/// Pixel label for foreground pixels not yet assigned to a region
pub const PIXEL_BLACK: u8 = 1;
/// First pixel value used as a region id
pub const PIXEL_REGION: u8 = 2;

/// Row-major grid of pixel labels produced by binarization.
///
/// Every cell is `PIXEL_WHITE`, `PIXEL_BLACK` or a region id (`>= PIXEL_REGION`).
/// Region labeling rewrites black cells in place, so any non-white value still
/// counts as black when scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelGrid {
    /// Create an all-white grid with given dimensions
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![PIXEL_WHITE; width * height],
        }
    }

    /// Build a grid from black/white flags, `true` = black
    pub fn from_black_mask(width: usize, height: usize, black: &[bool]) -> Self {
        let data = black
            .iter()
            .take(width * height)
            .map(|&b| if b { PIXEL_BLACK } else { PIXEL_WHITE })
            .collect::<Vec<_>>();
        let mut grid = Self::new(width, height);
        grid.data[..data.len()].copy_from_slice(&data);
        grid
    }

    /// Get grid width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get grid height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get the label at (x, y), white when out of bounds
    pub fn get(&self, x: usize, y: usize) -> u8 {
        if x >= self.width || y >= self.height {
            return PIXEL_WHITE;
        }
        self.data[y * self.width + x]
    }

    /// Set the label at (x, y)
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.data[y * self.width + x] = value;
    }

    /// Borrow one row of labels
    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// Mutably borrow one row of labels
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        &mut self.data[y * self.width..(y + 1) * self.width]
    }

    /// Reset every cell to white
    pub fn clear(&mut self) {
        self.data.fill(PIXEL_WHITE);
    }

    /// Get raw labels as bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get raw labels as mutable bytes
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl Default for PixelGrid {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
