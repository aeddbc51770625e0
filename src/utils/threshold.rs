/// Otsu threshold selection over a 256-bin histogram
use rayon::prelude::*;

/// Images at least this large build their histogram on the rayon pool
const PARALLEL_HISTOGRAM_MIN_PIXELS: usize = 1 << 18;
const HISTOGRAM_CHUNK: usize = 1 << 16;

/// Count how many pixels take each grayscale level
pub fn histogram(gray: &[u8]) -> [u32; 256] {
    if gray.len() < PARALLEL_HISTOGRAM_MIN_PIXELS {
        return histogram_serial(gray);
    }

    gray.par_chunks(HISTOGRAM_CHUNK)
        .map(histogram_serial)
        .reduce(
            || [0u32; 256],
            |mut acc, part| {
                for (a, p) in acc.iter_mut().zip(part.iter()) {
                    *a += p;
                }
                acc
            },
        )
}

fn histogram_serial(gray: &[u8]) -> [u32; 256] {
    let mut histogram = [0u32; 256];
    for &pixel in gray {
        histogram[pixel as usize] += 1;
    }
    histogram
}

/// Calculate Otsu's threshold for a grayscale image.
///
/// Pixels below the returned value are black. The class-sum accumulator is a
/// three-slot shift register whose slots always add up to the cumulative
/// weighted sum; arithmetic is `f32` throughout and ties on the variance
/// resolve to the later level. A uniform or empty image yields 0.
pub fn otsu_threshold(gray: &[u8]) -> u8 {
    otsu_threshold_from_histogram(&histogram(gray), gray.len() as u32)
}

/// Otsu's threshold from a precomputed histogram of `num_pixels` samples
pub fn otsu_threshold_from_histogram(histogram: &[u32; 256], num_pixels: u32) -> u8 {
    let sum: f32 = histogram
        .iter()
        .enumerate()
        .map(|(level, &count)| weighted(level, count))
        .sum();

    let mut sum_b = [0.0f32; 3];
    let mut q1 = 0u32;
    let mut max = 0.0f32;
    let mut threshold = 0u8;

    for (level, &count) in histogram.iter().enumerate() {
        q1 += count;
        if q1 == 0 {
            continue;
        }

        let q2 = num_pixels - q1;
        if q2 == 0 {
            break;
        }

        let tmp = sum_b[0] + weighted(level, count);
        sum_b.rotate_left(1);
        sum_b[2] = tmp;

        let running_sum = sum_b[0] + sum_b[1] + sum_b[2];
        let m1 = running_sum / q1 as f32;
        let m2 = (sum - running_sum) / q2 as f32;
        let m1m2 = m1 - m2;
        let variance = m1m2 * m1m2 * q1 as f32 * q2 as f32;
        if variance >= max {
            threshold = level as u8;
            max = variance;
        }
    }

    threshold
}

fn weighted(level: usize, count: u32) -> f32 {
    (level as u64 * count as u64) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts() {
        let gray = [0u8, 0, 7, 255, 7, 7];
        let h = histogram(&gray);
        assert_eq!(h[0], 2);
        assert_eq!(h[7], 3);
        assert_eq!(h[255], 1);
        assert_eq!(h.iter().sum::<u32>(), 6);
    }

    #[test]
    fn test_parallel_histogram_matches_serial() {
        let gray: Vec<u8> = (0..PARALLEL_HISTOGRAM_MIN_PIXELS * 2)
            .map(|i| (i * 31 % 251) as u8)
            .collect();
        assert_eq!(histogram(&gray), histogram_serial(&gray));
    }

    #[test]
    fn test_uniform_image_is_deterministic() {
        let gray = vec![93u8; 64 * 64];
        let first = otsu_threshold(&gray);
        assert_eq!(first, otsu_threshold(&gray));
        // No level splits a uniform image, so nothing is classed black.
        assert!(gray.iter().all(|&p| p >= first));
    }

    #[test]
    fn test_empty_image() {
        assert_eq!(otsu_threshold(&[]), 0);
    }

    #[test]
    fn test_bimodal_threshold_separates_peaks() {
        let mut gray = vec![50u8; 500];
        gray.extend(vec![200u8; 500]);

        let threshold = otsu_threshold(&gray);
        assert!(threshold > 50 && threshold < 200, "threshold = {}", threshold);
    }

    #[test]
    fn test_equal_variance_ties_take_later_level() {
        // Every level in 50..200 gives the same split; the last one wins.
        let mut gray = vec![50u8; 10];
        gray.extend(vec![200u8; 10]);
        assert_eq!(otsu_threshold(&gray), 199);
    }

    #[test]
    fn test_skewed_bimodal() {
        let mut gray = vec![20u8; 900];
        gray.extend(vec![240u8; 100]);
        gray.extend(vec![130u8; 5]);

        let threshold = otsu_threshold(&gray);
        assert!(threshold > 20 && threshold <= 240, "threshold = {}", threshold);
    }
}
