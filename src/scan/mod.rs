// Payload-offset search for containers that do not record it.
//
// This module provides:
// - Scan profiles: candidate offsets and score weights (`config`)
// - Byte statistics and the plausibility score (`score`)
// - The scanner and its tie-break rule (`scanner`)

pub mod config;
pub mod score;
pub mod scanner;

pub use config::{CURATED_OFFSETS, Candidates, DEFAULT_MAX_OFFSET, ScanConfig, ScoreWeights};
pub use score::{ByteStats, ScoreBreakdown, score};
pub use scanner::{OffsetCandidate, OffsetScanner, find_best_offset, select_best};
