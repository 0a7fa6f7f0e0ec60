// File-level helpers around the container adapter.
//
// Provides `read_container()`, `write_output()` and `decode_file()`. A
// missing input file is reported separately from other I/O failures, and a
// truncated decode still writes its partial output. With the `file-io`
// feature a SHA-256 digest of the written output is computed while writing.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "file-io")]
use sha2::Digest;
use thiserror::Error;

use crate::codec::{DecodeError, ProvisionalOps};
use crate::container::{ContainerError, ContainerLayout};
use crate::engine::DecodeStatus;

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `decode_file()`.
#[derive(Debug, Clone)]
pub struct DecodeStats {
    /// Container file size in bytes.
    pub input_size: u64,
    /// Offset the payload was decoded from.
    pub payload_offset: usize,
    /// Compressed bytes read from the payload.
    pub bytes_consumed: usize,
    /// Decoded bytes written.
    pub output_size: u64,
    pub status: DecodeStatus,
    /// Commands executed, including the end marker.
    pub instructions: usize,
    /// The failed read behind a `Truncated` status.
    pub error: Option<DecodeError>,
    /// Scanner score, when the offset was searched for.
    pub score: Option<f64>,
    pub provisional: ProvisionalOps,
    /// SHA-256 of the written output (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file-level operations.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Container(#[from] ContainerError),
    /// The payload was cut short before it produced a single byte.
    #[error("no bytes decoded from offset {offset:#x}: {source}")]
    NothingDecoded { offset: usize, source: DecodeError },
}

// ---------------------------------------------------------------------------
// Read / write
// ---------------------------------------------------------------------------

/// Read a whole container file.
pub fn read_container(path: &Path) -> Result<Vec<u8>, IoError> {
    std::fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => IoError::NotFound(path.to_path_buf()),
        _ => IoError::Io(e),
    })
}

/// Write decoded bytes to `path`, returning the SHA-256 of what was written
/// when the `file-io` feature is enabled.
pub fn write_output(path: &Path, data: &[u8]) -> Result<Option<[u8; 32]>, IoError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::with_capacity(BUF_SIZE, file);

    #[cfg(feature = "file-io")]
    let digest = {
        let mut hasher = sha2::Sha256::new();
        let mut hashing_writer = HashingWriter {
            inner: &mut writer,
            hasher: &mut hasher,
        };
        hashing_writer.write_all(data)?;
        Some(hasher.finalize().into())
    };

    #[cfg(not(feature = "file-io"))]
    let digest = {
        writer.write_all(data)?;
        None
    };

    writer.flush()?;
    Ok(digest)
}

// ---------------------------------------------------------------------------
// decode_file
// ---------------------------------------------------------------------------

/// Decode the container at `input_path` and write the payload's decoded
/// bytes to `output_path`.
///
/// Container problems (too small, nothing decodable) are returned before
/// anything is written, as is a truncated decode with no output. A truncated
/// decode that produced bytes writes its partial output and reports
/// `DecodeStatus::Truncated` in the stats. A completed decode always writes,
/// even when its output is empty.
pub fn decode_file(
    input_path: &Path,
    output_path: &Path,
    layout: &ContainerLayout,
) -> Result<DecodeStats, IoError> {
    let data = read_container(input_path)?;
    let decoded = layout.decode(&data)?;
    if decoded.result.is_empty()
        && let Some(source) = decoded.result.error.clone()
    {
        return Err(IoError::NothingDecoded {
            offset: decoded.offset,
            source,
        });
    }
    let output_sha256 = write_output(output_path, &decoded.result.output)?;

    Ok(DecodeStats {
        input_size: data.len() as u64,
        payload_offset: decoded.offset,
        bytes_consumed: decoded.result.bytes_consumed,
        output_size: decoded.result.output.len() as u64,
        status: decoded.result.status,
        instructions: decoded.result.instructions,
        error: decoded.result.error,
        score: decoded.score,
        provisional: decoded.result.provisional,
        output_sha256,
    })
}

// ---------------------------------------------------------------------------
// Hashing writer (used with file-io feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "file-io")]
struct HashingWriter<'a, W: Write> {
    inner: &'a mut W,
    hasher: &'a mut sha2::Sha256,
}

#[cfg(feature = "file-io")]
impl<W: Write> Write for HashingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
