// Offset-scan profiles.
//
// A profile fixes which start offsets are tried and how decoded output is
// weighted when picking between them.

/// Highest offset tried by the default profile.
pub const DEFAULT_MAX_OFFSET: usize = 64;

/// Offsets at which payloads have been seen in known containers.
pub const CURATED_OFFSETS: [usize; 7] = [0, 10, 12, 16, 20, 24, 32];

/// Start offsets to try, always visited in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidates {
    /// Every offset in `0..=max`.
    UpTo(usize),
    /// An explicit set of offsets.
    List(Vec<usize>),
}

impl Candidates {
    /// Offsets that fall inside a buffer of `len` bytes, ascending and
    /// without duplicates.
    pub fn offsets(&self, len: usize) -> Vec<usize> {
        match self {
            Self::UpTo(max) => (0..=*max).take_while(|&o| o < len).collect(),
            Self::List(list) => {
                let mut offsets: Vec<usize> = list.iter().copied().filter(|&o| o < len).collect();
                offsets.sort_unstable();
                offsets.dedup();
                offsets
            }
        }
    }
}

/// Weights of the four scoring terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    /// Points at or above `LENGTH_SATURATION` output bytes, scaled linearly below.
    pub length: f64,
    /// Points per bit of entropy, up to `ENTROPY_CAP` bits.
    pub entropy_per_bit: f64,
    /// Flat bonus when the distinct-value count looks like tile data.
    pub distinct_bonus: f64,
    /// Points for a fully smooth prefix, scaled by the smooth fraction.
    pub smoothness: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            length: 10.0,
            entropy_per_bit: 2.0,
            distinct_bonus: 5.0,
            smoothness: 3.0,
        }
    }
}

/// Scanner configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Name for display purposes.
    pub name: &'static str,
    pub candidates: Candidates,
    pub weights: ScoreWeights,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::up_to(DEFAULT_MAX_OFFSET)
    }
}

impl ScanConfig {
    /// Try every offset from 0 to `max_offset` inclusive.
    pub fn up_to(max_offset: usize) -> Self {
        Self {
            name: "range",
            candidates: Candidates::UpTo(max_offset),
            weights: ScoreWeights::default(),
        }
    }

    /// Try only `CURATED_OFFSETS`.
    pub fn curated() -> Self {
        Self {
            name: "curated",
            candidates: Candidates::List(CURATED_OFFSETS.to_vec()),
            weights: ScoreWeights::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn up_to_is_inclusive_and_clipped() {
        assert_eq!(Candidates::UpTo(3).offsets(100), vec![0, 1, 2, 3]);
        assert_eq!(Candidates::UpTo(64).offsets(3), vec![0, 1, 2]);
        assert_eq!(Candidates::UpTo(0).offsets(1), vec![0]);
        assert!(Candidates::UpTo(5).offsets(0).is_empty());
    }

    #[test]
    fn list_is_sorted_and_deduplicated() {
        let c = Candidates::List(vec![16, 0, 12, 16, 200]);
        assert_eq!(c.offsets(100), vec![0, 12, 16]);
    }

    #[test]
    fn profiles() {
        assert_eq!(
            ScanConfig::default().candidates,
            Candidates::UpTo(DEFAULT_MAX_OFFSET)
        );
        assert_eq!(ScanConfig::curated().candidates.offsets(33), CURATED_OFFSETS.to_vec());
    }
}
