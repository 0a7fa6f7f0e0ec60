// Container adapter: locate the compressed payload inside an asset file.
//
// Some container variants put the payload at a fixed byte offset and run it
// to end of file. Others do not record the start, and the offset scanner
// picks it. Either way this layer only slices; decoding happens in `engine`.

use thiserror::Error;

use crate::engine::{DecodeResult, decode};
use crate::scan::{OffsetScanner, ScanConfig};

/// Payload start in fixed-layout map.jim containers.
pub const MAP_JIM_PAYLOAD_OFFSET: usize = 0x208;

/// Container rejected before or instead of a decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    /// The file ends at or before the declared payload offset.
    #[error("container is {len} byte(s), too small for payload offset {offset:#x}")]
    TooSmall { len: usize, offset: usize },
    /// No candidate offset decoded to any output.
    #[error("no valid decoding found ({tried} candidate offset(s) tried)")]
    NoValidOffset { tried: usize },
}

/// Where a container keeps its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerLayout {
    /// Payload starts at `offset` and runs to end of file.
    Fixed { offset: usize },
    /// Payload start is unknown; search for it.
    Scan(ScanConfig),
}

impl Default for ContainerLayout {
    fn default() -> Self {
        Self::Scan(ScanConfig::default())
    }
}

/// Payload decoded out of a container.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerDecode {
    /// Absolute offset the decode started at.
    pub offset: usize,
    pub result: DecodeResult,
    /// Plausibility score, for scanned layouts.
    pub score: Option<f64>,
}

impl ContainerLayout {
    /// Fixed layout of map.jim files.
    pub fn map_jim() -> Self {
        Self::Fixed {
            offset: MAP_JIM_PAYLOAD_OFFSET,
        }
    }

    /// Bare payload with no container around it.
    pub fn raw() -> Self {
        Self::Fixed { offset: 0 }
    }

    /// Byte range handed to the decoder: the payload for fixed layouts, the
    /// whole file for scanned ones.
    pub fn payload<'a>(&self, data: &'a [u8]) -> Result<&'a [u8], ContainerError> {
        match self {
            Self::Fixed { offset } => {
                if data.len() <= *offset {
                    return Err(ContainerError::TooSmall {
                        len: data.len(),
                        offset: *offset,
                    });
                }
                Ok(&data[*offset..])
            }
            Self::Scan(_) => Ok(data),
        }
    }

    /// Locate and decode the payload.
    ///
    /// A truncated decode is still `Ok`; check `result.status`.
    pub fn decode(&self, data: &[u8]) -> Result<ContainerDecode, ContainerError> {
        match self {
            Self::Fixed { offset } => {
                let payload = self.payload(data)?;
                let mut result = decode(payload, 0);
                result.end_offset += offset;
                Ok(ContainerDecode {
                    offset: *offset,
                    result,
                    score: None,
                })
            }
            Self::Scan(config) => {
                let scanner = OffsetScanner::new(config.clone());
                match scanner.best(data) {
                    Some(best) => Ok(ContainerDecode {
                        offset: best.offset,
                        result: best.result,
                        score: Some(best.score),
                    }),
                    None => Err(ContainerError::NoValidOffset {
                        tried: config.candidates.offsets(data.len()).len(),
                    }),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
