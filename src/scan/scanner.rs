// Offset scanner: scored search for the payload start.
//
// Some containers do not record where their compressed payload begins. The
// scanner decodes from each candidate offset, scores every non-empty output
// and keeps the highest. Equal scores resolve to the smallest offset, so the
// winner is the same whether trials ran sequentially or on the rayon pool.

use log::debug;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::config::ScanConfig;
use super::score::score;
use crate::engine::{DecodeResult, decode};

/// One decode trial that produced output.
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetCandidate {
    pub offset: usize,
    pub result: DecodeResult,
    pub score: f64,
}

impl OffsetCandidate {
    #[inline]
    pub fn output(&self) -> &[u8] {
        &self.result.output
    }
}

/// Runs decode trials over a container according to a `ScanConfig`.
#[derive(Debug, Clone, Default)]
pub struct OffsetScanner {
    config: ScanConfig,
}

impl OffsetScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Every candidate that produced output, in ascending offset order.
    pub fn scan(&self, data: &[u8]) -> Vec<OffsetCandidate> {
        let offsets = self.config.candidates.offsets(data.len());

        #[cfg(feature = "parallel")]
        let mut candidates: Vec<OffsetCandidate> = offsets
            .par_iter()
            .filter_map(|&offset| self.trial(data, offset))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let mut candidates: Vec<OffsetCandidate> = offsets
            .iter()
            .filter_map(|&offset| self.trial(data, offset))
            .collect();

        candidates.sort_by_key(|c| c.offset);
        debug!(
            "{} scan: {} of {} offset(s) produced output",
            self.config.name,
            candidates.len(),
            offsets.len()
        );
        candidates
    }

    /// The most plausible candidate, or `None` if no offset produced output.
    pub fn best(&self, data: &[u8]) -> Option<OffsetCandidate> {
        select_best(self.scan(data))
    }

    fn trial(&self, data: &[u8], offset: usize) -> Option<OffsetCandidate> {
        let result = decode(data, offset);
        if result.is_empty() {
            debug!("offset {offset}: no output ({})", result.status.as_str());
            return None;
        }
        let score = score(&result.output, &self.config.weights);
        debug!(
            "offset {offset}: {} byte(s), {}, score {score:.3}",
            result.output.len(),
            result.status.as_str()
        );
        Some(OffsetCandidate {
            offset,
            result,
            score,
        })
    }
}

/// Highest-scoring candidate. Candidates are visited in ascending offset
/// order and only a strictly higher score replaces the current best.
pub fn select_best(mut candidates: Vec<OffsetCandidate>) -> Option<OffsetCandidate> {
    candidates.sort_by_key(|c| c.offset);
    let mut best: Option<OffsetCandidate> = None;
    for candidate in candidates {
        match &best {
            Some(current) if candidate.score <= current.score => {}
            _ => best = Some(candidate),
        }
    }
    best
}

/// Try every offset in `0..=max_offset` and return the most plausible decode.
pub fn find_best_offset(data: &[u8], max_offset: usize) -> Option<OffsetCandidate> {
    OffsetScanner::new(ScanConfig::up_to(max_offset)).best(data)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
