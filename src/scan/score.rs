// Plausibility score for decoded output.
//
// Tile and palette data from these containers tends to use a few dozen byte
// values, has moderate entropy, and changes gradually between neighbouring
// bytes. The score rewards those traits plus a capped amount of length.

use std::ops::RangeInclusive;

use super::config::ScoreWeights;

/// Output length past which the length term stops growing.
pub const LENGTH_SATURATION: usize = 10_000;

/// Entropy (bits per byte) past which the entropy term stops growing.
pub const ENTROPY_CAP: f64 = 6.0;

/// Distinct byte-value counts typical of tile data.
pub const DISTINCT_RANGE: RangeInclusive<usize> = 5..=63;

/// Number of leading bytes inspected for smoothness.
pub const SMOOTH_PREFIX: usize = 100;

/// Largest neighbour difference counted as smooth.
pub const SMOOTH_DELTA: u8 = 2;

// ---------------------------------------------------------------------------
// Byte statistics
// ---------------------------------------------------------------------------

/// Histogram-derived statistics of a byte sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ByteStats {
    pub len: usize,
    pub histogram: [usize; 256],
    pub distinct: usize,
    /// Shannon entropy in bits per byte.
    pub entropy: f64,
    /// Fraction of neighbour pairs in the first `SMOOTH_PREFIX` bytes that
    /// differ by at most `SMOOTH_DELTA`.
    pub smooth_fraction: f64,
}

impl ByteStats {
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut histogram = [0usize; 256];
        for &b in data {
            histogram[b as usize] += 1;
        }

        let distinct = histogram.iter().filter(|&&n| n > 0).count();
        let entropy = shannon_entropy(&histogram, data.len());

        let prefix = &data[..data.len().min(SMOOTH_PREFIX)];
        let smooth_fraction = if prefix.len() < 2 {
            0.0
        } else {
            let smooth = prefix
                .windows(2)
                .filter(|w| w[0].abs_diff(w[1]) <= SMOOTH_DELTA)
                .count();
            smooth as f64 / (prefix.len() - 1) as f64
        };

        Self {
            len: data.len(),
            histogram,
            distinct,
            entropy,
            smooth_fraction,
        }
    }

    /// The `n` most frequent byte values, most frequent first; ties go to
    /// the lower value.
    pub fn top(&self, n: usize) -> Vec<(u8, usize)> {
        let mut freq: Vec<(u8, usize)> = self
            .histogram
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(value, &count)| (value as u8, count))
            .collect();
        freq.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        freq.truncate(n);
        freq
    }
}

fn shannon_entropy(histogram: &[usize; 256], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    histogram
        .iter()
        .filter(|&&n| n > 0)
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum()
}

// ---------------------------------------------------------------------------
// Score
// ---------------------------------------------------------------------------

/// Per-term contributions to a score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub length: f64,
    pub entropy: f64,
    pub distinct: f64,
    pub smoothness: f64,
}

impl ScoreBreakdown {
    pub fn from_stats(stats: &ByteStats, weights: &ScoreWeights) -> Self {
        let length = stats.len.min(LENGTH_SATURATION) as f64 / LENGTH_SATURATION as f64;
        let distinct = if DISTINCT_RANGE.contains(&stats.distinct) {
            weights.distinct_bonus
        } else {
            0.0
        };
        Self {
            length: length * weights.length,
            entropy: stats.entropy.min(ENTROPY_CAP) * weights.entropy_per_bit,
            distinct,
            smoothness: stats.smooth_fraction * weights.smoothness,
        }
    }

    pub fn total(&self) -> f64 {
        self.length + self.entropy + self.distinct + self.smoothness
    }
}

/// Score `output` with `weights`. Higher is more plausible.
pub fn score(output: &[u8], weights: &ScoreWeights) -> f64 {
    ScoreBreakdown::from_stats(&ByteStats::from_bytes(output), weights).total()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_input_scores_zero() {
        let stats = ByteStats::from_bytes(&[]);
        assert_eq!(stats.distinct, 0);
        assert!(approx(stats.entropy, 0.0));
        assert!(approx(score(&[], &ScoreWeights::default()), 0.0));
    }

    #[test]
    fn uniform_bytes_have_full_entropy() {
        let data: Vec<u8> = (0..=255u8).collect();
        let stats = ByteStats::from_bytes(&data);
        assert!(approx(stats.entropy, 8.0));
        assert_eq!(stats.distinct, 256);
        // all neighbours differ by 1
        assert!(approx(stats.smooth_fraction, 1.0));
    }

    #[test]
    fn entropy_term_is_capped() {
        let data: Vec<u8> = (0..=255u8).collect();
        let b = ScoreBreakdown::from_stats(&ByteStats::from_bytes(&data), &ScoreWeights::default());
        assert!(approx(b.entropy, ENTROPY_CAP * 2.0));
        assert!(approx(b.distinct, 0.0));
    }

    #[test]
    fn length_term_saturates() {
        let w = ScoreWeights::default();
        let short = ScoreBreakdown::from_stats(&ByteStats::from_bytes(&[0u8; 5_000]), &w);
        let long = ScoreBreakdown::from_stats(&ByteStats::from_bytes(&[0u8; 10_000]), &w);
        let longer = ScoreBreakdown::from_stats(&ByteStats::from_bytes(&[0u8; 50_000]), &w);
        assert!(approx(short.length, 5.0));
        assert!(approx(long.length, 10.0));
        assert!(approx(longer.length, 10.0));
    }

    #[test]
    fn distinct_bonus_window() {
        let w = ScoreWeights::default();
        let four: Vec<u8> = (0..4u8).cycle().take(40).collect();
        let five: Vec<u8> = (0..5u8).cycle().take(40).collect();
        let sixty_four: Vec<u8> = (0..64u8).collect();
        let bonus = |d: &[u8]| ScoreBreakdown::from_stats(&ByteStats::from_bytes(d), &w).distinct;
        assert!(approx(bonus(&four), 0.0));
        assert!(approx(bonus(&five), 5.0));
        assert!(approx(bonus(&sixty_four), 0.0));
    }

    #[test]
    fn smoothness_uses_prefix_only() {
        // 100 smooth bytes followed by jumps that must be ignored.
        let mut data = vec![10u8; SMOOTH_PREFIX];
        data.extend((0..50).map(|i| if i % 2 == 0 { 0 } else { 200 }));
        assert!(approx(ByteStats::from_bytes(&data).smooth_fraction, 1.0));

        let jumpy = [0u8, 100, 0, 100, 0];
        assert!(approx(ByteStats::from_bytes(&jumpy).smooth_fraction, 0.0));

        let half = [0u8, 1, 50];
        assert!(approx(ByteStats::from_bytes(&half).smooth_fraction, 0.5));
    }

    #[test]
    fn graphics_like_beats_constant_and_noise() {
        let w = ScoreWeights::default();
        let constant = vec![0u8; 4096];
        let gradient: Vec<u8> = (0..4096).map(|i| ((i / 8) % 32) as u8).collect();
        let mut state = 0x1234_5678u64;
        let noise: Vec<u8> = (0..4096)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                (state >> 33) as u8
            })
            .collect();
        let g = score(&gradient, &w);
        assert!(g > score(&constant, &w));
        assert!(g > score(&noise, &w));
    }

    #[test]
    fn top_orders_by_count_then_value() {
        let stats = ByteStats::from_bytes(&[3, 1, 1, 2, 2, 9]);
        assert_eq!(stats.top(3), vec![(1, 2), (2, 2), (3, 1)]);
        assert_eq!(stats.top(10).len(), 4);
    }
}
