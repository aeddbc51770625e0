use std::sync::OnceLock;

fn parse_env_u8(name: &str) -> Option<u8> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u8>().ok())
}

fn parse_env_usize(name: &str) -> Option<usize> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
}

fn parse_env_bool_u8(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u8>().ok())
        .map(|v| v != 0)
        .unwrap_or(default)
}

static FIXED_THRESHOLD: OnceLock<Option<u8>> = OnceLock::new();

fn fixed_threshold() -> Option<u8> {
    *FIXED_THRESHOLD.get_or_init(|| parse_env_u8("QR_CAPSTONE_THRESHOLD"))
}

static PARALLEL_ROWS: OnceLock<bool> = OnceLock::new();

fn parallel_rows() -> bool {
    *PARALLEL_ROWS.get_or_init(|| parse_env_bool_u8("QR_CAPSTONE_PARALLEL", true))
}

static FILL_STACK_LIMIT: OnceLock<Option<usize>> = OnceLock::new();

fn fill_stack_limit() -> Option<usize> {
    *FILL_STACK_LIMIT.get_or_init(|| parse_env_usize("QR_CAPSTONE_FILL_STACK").map(|v| v.max(1)))
}

/// How the binarization threshold is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdMode {
    /// Otsu's method over the image histogram
    #[default]
    Otsu,
    /// A caller-provided threshold
    Fixed(u8),
}

/// Settings for one [`crate::ScanContext`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Threshold selection
    pub threshold: ThresholdMode,
    /// Gather row candidates on the rayon pool
    pub parallel_rows: bool,
    /// Maximum flood-fill depth in nested rows; `None` uses two thirds of the image height
    pub fill_stack_limit: Option<usize>,
}

impl ScanConfig {
    /// Defaults overridden by `QR_CAPSTONE_THRESHOLD`, `QR_CAPSTONE_PARALLEL`
    /// and `QR_CAPSTONE_FILL_STACK`
    pub fn from_env() -> Self {
        Self {
            threshold: fixed_threshold().map_or(ThresholdMode::Otsu, ThresholdMode::Fixed),
            parallel_rows: parallel_rows(),
            fill_stack_limit: fill_stack_limit(),
        }
    }

    /// Use a fixed threshold instead of Otsu
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = ThresholdMode::Fixed(threshold);
        self
    }

    /// Enable or disable parallel candidate gathering
    pub fn with_parallel_rows(mut self, parallel: bool) -> Self {
        self.parallel_rows = parallel;
        self
    }

    /// Cap flood-fill depth at `depth` nested rows
    pub fn with_fill_stack_limit(mut self, depth: usize) -> Self {
        self.fill_stack_limit = Some(depth.max(1));
        self
    }

    /// Resolve the flood-fill stack limit for an image of `height` rows
    pub fn fill_stack_limit_for(&self, height: usize) -> usize {
        self.fill_stack_limit.unwrap_or(height * 2 / 3).max(1)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            threshold: ThresholdMode::Otsu,
            parallel_rows: true,
            fill_stack_limit: None,
        }
    }
}
