// Decode engine: the driver loop around the instruction decoder.
//
// Owns the stream cursor and the output window for one decode run. The
// engine is `Running` until it reads the end marker or a read fails, then
// `Stopped`. Stopping is never an error for the caller: the result always
// carries the bytes produced so far plus a status saying why it stopped.

use log::{debug, trace};

use crate::codec::decoder::{execute, read_instruction};
use crate::codec::{
    CompressedStream, DecodeError, Instruction, ObservedSemantics, OutputWindow,
    ProvisionalOpcodes, ProvisionalOps,
};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Why a decode run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// The end marker was read.
    Completed,
    /// The input ran out, either between commands or inside one.
    Truncated,
}

impl DecodeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Truncated => "truncated",
        }
    }
}

/// Output of one decode run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeResult {
    /// Decoded bytes, complete or partial.
    pub output: Vec<u8>,
    pub status: DecodeStatus,
    /// Input bytes read, counted from the start offset.
    pub bytes_consumed: usize,
    /// Absolute input position where decoding stopped.
    pub end_offset: usize,
    /// Commands executed, including the end marker.
    pub instructions: usize,
    /// Provisional opcodes that contributed to `output`.
    pub provisional: ProvisionalOps,
    /// The failed read behind a `Truncated` status.
    pub error: Option<DecodeError>,
}

impl DecodeResult {
    #[inline]
    pub fn is_completed(&self) -> bool {
        self.status == DecodeStatus::Completed
    }

    /// True when the run produced nothing usable.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }
}

/// One executed command, as reported by `DecodeEngine::step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step<'a> {
    /// Absolute position of the command byte.
    pub offset: usize,
    pub command: u8,
    pub instruction: Instruction<'a>,
    /// Bytes appended to the output.
    pub emitted: usize,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Running,
    Stopped(DecodeStatus),
}

/// Single decode run over `data`, starting at a given offset.
pub struct DecodeEngine<'a, P = ObservedSemantics> {
    stream: CompressedStream<'a>,
    window: OutputWindow,
    semantics: P,
    start: usize,
    state: State,
    instructions: usize,
    provisional: ProvisionalOps,
    error: Option<DecodeError>,
}

impl<'a> DecodeEngine<'a, ObservedSemantics> {
    pub fn new(data: &'a [u8], start: usize) -> Self {
        Self::with_semantics(data, start, ObservedSemantics)
    }
}

impl<'a, P: ProvisionalOpcodes> DecodeEngine<'a, P> {
    /// Engine that parses provisional opcodes with `semantics`.
    pub fn with_semantics(data: &'a [u8], start: usize, semantics: P) -> Self {
        let stream = CompressedStream::new(data, start);
        let window = OutputWindow::with_capacity(stream.remaining().saturating_mul(2));
        Self {
            stream,
            window,
            semantics,
            start,
            state: State::Running,
            instructions: 0,
            provisional: ProvisionalOps::empty(),
            error: None,
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    /// Status once stopped.
    pub fn status(&self) -> Option<DecodeStatus> {
        match self.state {
            State::Running => None,
            State::Stopped(status) => Some(status),
        }
    }

    /// Bytes decoded so far.
    pub fn output(&self) -> &[u8] {
        self.window.as_slice()
    }

    /// The read failure that stopped the engine, if any.
    pub fn error(&self) -> Option<&DecodeError> {
        self.error.as_ref()
    }

    /// Execute one command.
    ///
    /// Returns `None` once stopped. The end marker is reported as a step
    /// and stops the engine; a failed read stops it without a step.
    pub fn step(&mut self) -> Option<Step<'a>> {
        if !self.is_running() {
            return None;
        }

        let offset = self.stream.position();
        let parsed = self.stream.read_u8().and_then(|command| {
            read_instruction(command, &mut self.stream, &self.semantics)
                .map(|inst| (command, inst))
        });

        let (command, instruction) = match parsed {
            Ok(pair) => pair,
            Err(e) => {
                trace!("stop at {offset:#x}: {e}");
                self.error = Some(e);
                self.state = State::Stopped(DecodeStatus::Truncated);
                return None;
            }
        };

        self.instructions += 1;
        if instruction == Instruction::End {
            self.state = State::Stopped(DecodeStatus::Completed);
            return Some(Step {
                offset,
                command,
                instruction,
                emitted: 0,
            });
        }

        self.provisional |= ProvisionalOps::for_command(command);
        let emitted = execute(&instruction, &mut self.window);
        trace!("{offset:#06x}: {command:02X} {instruction:?} -> {emitted} byte(s)");

        Some(Step {
            offset,
            command,
            instruction,
            emitted,
        })
    }

    /// Step until stopped and return the result.
    pub fn run(mut self) -> DecodeResult {
        while self.step().is_some() {}
        self.finish()
    }

    /// Stop where the engine is and return what it has.
    ///
    /// An engine still running is reported as `Truncated`.
    pub fn finish(self) -> DecodeResult {
        let status = self.status().unwrap_or(DecodeStatus::Truncated);
        let end_offset = self.stream.position();
        let bytes_consumed = end_offset.saturating_sub(self.start);

        debug!(
            "decode from {:#x}: {} after {} instruction(s), consumed {}, produced {}",
            self.start,
            status.as_str(),
            self.instructions,
            bytes_consumed,
            self.window.len()
        );
        if !self.provisional.is_empty() {
            debug!("provisional opcodes used: {:?}", self.provisional);
        }

        DecodeResult {
            output: self.window.into_vec(),
            status,
            bytes_consumed,
            end_offset,
            instructions: self.instructions,
            provisional: self.provisional,
            error: self.error,
        }
    }
}

// ---------------------------------------------------------------------------
// High-level decode
// ---------------------------------------------------------------------------

/// Decode the payload in `data` starting at `start`.
///
/// Deterministic: identical inputs always yield identical results.
pub fn decode(data: &[u8], start: usize) -> DecodeResult {
    DecodeEngine::new(data, start).run()
}

/// Decode with an alternative reading of the provisional opcodes.
pub fn decode_with<P: ProvisionalOpcodes>(
    data: &[u8],
    start: usize,
    semantics: P,
) -> DecodeResult {
    DecodeEngine::with_semantics(data, start, semantics).run()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
