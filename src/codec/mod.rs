// map.jim payload codec.
//
// # Modules
//
// - `stream`: Forward-only cursor over the compressed bytes
// - `window`: Append-only output with back-reference reads
// - `opcode`: Opcode families, decoded instructions, provisional opcodes
// - `decoder`: Instruction parsing and execution

pub mod decoder;
pub mod opcode;
pub mod stream;
pub mod window;

use thiserror::Error;

// Re-export key types for convenience.
pub use decoder::{execute, read_instruction};
pub use opcode::{
    END_MARKER, Family, Instruction, LONG_FORM_COUNT_CAP, ObservedSemantics, ProvisionalOpcodes,
    ProvisionalOps,
};
pub use stream::CompressedStream;
pub use window::{OutOfRange, OutputWindow};

/// Failure while reading a command or its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A read needed more bytes than the stream has left.
    #[error(
        "compressed stream exhausted at offset {offset}: needed {needed} byte(s), {available} available"
    )]
    StreamExhausted {
        offset: usize,
        needed: usize,
        available: usize,
    },
}
