// Output window: the decoded bytes so far, doubling as the back-reference
// dictionary.
//
// The window itself has no out-of-range policy. Copy instructions pick one
// via `OutOfRange`: family 0x2 skips unreadable positions, families
// 0x5/0x6/0x8 zero-fill them. The two must stay distinct because they
// produce different output lengths for the same input.

/// What a copy does when a source index is not (yet) in the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutOfRange {
    /// Emit nothing for that position.
    Skip,
    /// Emit a 0x00 byte for that position.
    ZeroFill,
}

/// Append-only decoded output with indexed reads into its own history.
#[derive(Debug, Default, Clone)]
pub struct OutputWindow {
    buf: Vec<u8>,
}

impl OutputWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The only mutator.
    #[inline]
    pub fn append(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Byte at `index`, or `None` when `index` is negative or not yet written.
    #[inline]
    pub fn read_at(&self, index: i64) -> Option<u8> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.buf.get(i).copied())
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    // -- Bulk effects used by the instruction decoder ----------------------

    pub(crate) fn extend_literal(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub(crate) fn fill(&mut self, value: u8, count: usize) {
        self.buf.resize(self.buf.len() + count, value);
    }

    /// Copy `count` bytes starting `distance` bytes behind the current end.
    ///
    /// The base is fixed at instruction start, so a short distance replays
    /// bytes appended by this same copy. Returns the number of bytes emitted.
    pub(crate) fn copy_back(&mut self, distance: usize, count: usize, policy: OutOfRange) -> usize {
        let before = self.buf.len();
        let base = before as i64 - distance as i64;
        for i in 0..count as i64 {
            match (self.read_at(base + i), policy) {
                (Some(byte), _) => self.buf.push(byte),
                (None, OutOfRange::ZeroFill) => self.buf.push(0),
                (None, OutOfRange::Skip) => {}
            }
        }
        self.buf.len() - before
    }

    /// Copy `count` bytes from the `period`-byte window ending at the current
    /// end, wrapping the read index modulo `period`. Positions that are still
    /// unreadable are zero-filled.
    pub(crate) fn copy_cyclic(&mut self, period: usize, count: usize) {
        debug_assert!(period > 0);
        let base = self.buf.len() as i64 - period as i64;
        for i in 0..count {
            let index = base + (i % period) as i64;
            let byte = self.read_at(index).unwrap_or(0);
            self.buf.push(byte);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
