// Opcode families and decoded instructions.
//
// A command byte's high nibble selects one of sixteen families; the low
// nibble and any following parameter bytes parameterize it. Families
// 0xA..=0xE share one behaviour and are folded into a single variant.
//
// Three opcodes have no confirmed meaning: family 0x4, family 0x8 with
// low nibble 2, and the extra byte of base offset in family 0x6. Their
// parsing goes through `ProvisionalOpcodes` so another reading can be
// plugged in without touching the dispatcher.

use bitflags::bitflags;

use super::DecodeError;
use super::stream::CompressedStream;
use super::window::OutOfRange;

/// Command byte that stops decoding wherever it appears.
pub const END_MARKER: u8 = 0xFF;

/// Upper bound on the two-byte repeat count of family 0x8.
pub const LONG_FORM_COUNT_CAP: usize = 4096;

// ---------------------------------------------------------------------------
// Families
// ---------------------------------------------------------------------------

/// Opcode family, keyed by the high nibble of the command byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// 0x0: `low + 1` literal bytes.
    Literal,
    /// 0x1: value byte repeated `low + 2` times.
    ShortRepeat,
    /// 0x2: back-reference, unreadable positions skipped.
    SkipCopy,
    /// 0x3: value byte repeated `low + 3` times.
    Repeat,
    /// 0x4: value byte repeated `low + 1` times (provisional).
    ExtendedRepeat,
    /// 0x5: back-reference, or literal run when the distance byte is 0.
    CopyOrLiteral,
    /// 0x6: back-reference one byte further back than 0x5 (provisional base).
    AlternateCopy,
    /// 0x7: pattern byte repeated `low + 1` times.
    PatternFill,
    /// 0x8: long-form repeats, passthrough and cyclic copies.
    LongForm,
    /// 0x9: counted repeat (low 0) or short literal run.
    CountedOrLiteral,
    /// 0xA..=0xE: `low + 1` literal bytes.
    FallbackLiteral,
    /// 0xF: end marker (0xFF) or no-op.
    Control,
}

impl Family {
    #[inline]
    pub fn of(command: u8) -> Self {
        match command >> 4 {
            0x0 => Self::Literal,
            0x1 => Self::ShortRepeat,
            0x2 => Self::SkipCopy,
            0x3 => Self::Repeat,
            0x4 => Self::ExtendedRepeat,
            0x5 => Self::CopyOrLiteral,
            0x6 => Self::AlternateCopy,
            0x7 => Self::PatternFill,
            0x8 => Self::LongForm,
            0x9 => Self::CountedOrLiteral,
            0xA..=0xE => Self::FallbackLiteral,
            _ => Self::Control,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Literal => "LIT",
            Self::ShortRepeat => "REP2",
            Self::SkipCopy => "CPYS",
            Self::Repeat => "REP3",
            Self::ExtendedRepeat => "REPX",
            Self::CopyOrLiteral => "CPYZ",
            Self::AlternateCopy => "CPYA",
            Self::PatternFill => "FILL",
            Self::LongForm => "LONG",
            Self::CountedOrLiteral => "CNT",
            Self::FallbackLiteral => "LITF",
            Self::Control => "CTRL",
        }
    }
}

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

/// One decoded command with its parameters, borrowed from the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction<'a> {
    /// Bytes copied verbatim from the compressed stream.
    Literal(&'a [u8]),
    /// `value` appended `count` times.
    Fill { value: u8, count: usize },
    /// `count` bytes read from `distance` bytes behind the output end.
    Copy {
        distance: usize,
        count: usize,
        policy: OutOfRange,
    },
    /// `count` bytes replayed from the last `period` output bytes.
    CyclicCopy { period: usize, count: usize },
    /// Command with no effect.
    Nop,
    /// End marker.
    End,
}

impl Instruction<'_> {
    /// Bytes this instruction asks for. Skip-policy copies may emit fewer.
    pub fn requested_len(&self) -> usize {
        match *self {
            Self::Literal(bytes) => bytes.len(),
            Self::Fill { count, .. }
            | Self::Copy { count, .. }
            | Self::CyclicCopy { count, .. } => count,
            Self::Nop | Self::End => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Provisional opcodes
// ---------------------------------------------------------------------------

bitflags! {
    /// Provisional opcodes executed during a decode. Output produced while
    /// any of these is set depends on an unconfirmed reading of the format.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct ProvisionalOps: u8 {
        /// Family 0x4.
        const EXTENDED_REPEAT = 1 << 0;
        /// Family 0x8, low nibble 2.
        const LONG_FORM_PASSTHROUGH = 1 << 1;
        /// Family 0x6.
        const ALTERNATE_BASE_COPY = 1 << 2;
    }
}

impl ProvisionalOps {
    /// Flag raised by `command`, if it is provisional.
    pub fn for_command(command: u8) -> Self {
        match Family::of(command) {
            Family::ExtendedRepeat => Self::EXTENDED_REPEAT,
            Family::AlternateCopy => Self::ALTERNATE_BASE_COPY,
            Family::LongForm if command & 0x0F == 2 => Self::LONG_FORM_PASSTHROUGH,
            _ => Self::empty(),
        }
    }
}

/// Parsing of the opcodes whose meaning is not confirmed.
///
/// Each method receives the stream positioned just after the command byte
/// and returns the instruction to execute. The provided methods implement
/// the observed behaviour; override one to test another hypothesis.
pub trait ProvisionalOpcodes {
    /// Family 0x4: value byte repeated `low + 1` times.
    fn extended_repeat<'a>(
        &self,
        low: u8,
        stream: &mut CompressedStream<'a>,
    ) -> Result<Instruction<'a>, DecodeError> {
        let value = stream.read_u8()?;
        Ok(Instruction::Fill {
            value,
            count: low as usize + 1,
        })
    }

    /// Family 0x8, low nibble 2: one byte passed through verbatim.
    fn long_form_passthrough<'a>(
        &self,
        stream: &mut CompressedStream<'a>,
    ) -> Result<Instruction<'a>, DecodeError> {
        Ok(Instruction::Literal(stream.read_slice(1)?))
    }

    /// Family 0x6: `low + 1` bytes from `offset + 1` behind the end,
    /// zero-filling unreadable positions.
    fn alternate_base_copy<'a>(
        &self,
        low: u8,
        stream: &mut CompressedStream<'a>,
    ) -> Result<Instruction<'a>, DecodeError> {
        let offset = stream.read_u8()?;
        Ok(Instruction::Copy {
            distance: offset as usize + 1,
            count: low as usize + 1,
            policy: OutOfRange::ZeroFill,
        })
    }
}

/// The behaviour observed in known-good sample files.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObservedSemantics;

impl ProvisionalOpcodes for ObservedSemantics {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_high_nibble_maps_to_a_family() {
        let expected = [
            Family::Literal,
            Family::ShortRepeat,
            Family::SkipCopy,
            Family::Repeat,
            Family::ExtendedRepeat,
            Family::CopyOrLiteral,
            Family::AlternateCopy,
            Family::PatternFill,
            Family::LongForm,
            Family::CountedOrLiteral,
            Family::FallbackLiteral,
            Family::FallbackLiteral,
            Family::FallbackLiteral,
            Family::FallbackLiteral,
            Family::FallbackLiteral,
            Family::Control,
        ];
        for (nibble, family) in expected.iter().enumerate() {
            for low in 0..16u8 {
                assert_eq!(Family::of(((nibble as u8) << 4) | low), *family);
            }
        }
    }

    #[test]
    fn provisional_flags_by_command() {
        assert_eq!(
            ProvisionalOps::for_command(0x4A),
            ProvisionalOps::EXTENDED_REPEAT
        );
        assert_eq!(
            ProvisionalOps::for_command(0x60),
            ProvisionalOps::ALTERNATE_BASE_COPY
        );
        assert_eq!(
            ProvisionalOps::for_command(0x82),
            ProvisionalOps::LONG_FORM_PASSTHROUGH
        );
        assert!(ProvisionalOps::for_command(0x83).is_empty());
        assert!(ProvisionalOps::for_command(0x00).is_empty());
    }

    #[test]
    fn observed_alternate_copy_reaches_one_byte_further() {
        let data = [3u8];
        let mut s = CompressedStream::new(&data, 0);
        let inst = ObservedSemantics.alternate_base_copy(1, &mut s).unwrap();
        assert_eq!(
            inst,
            Instruction::Copy {
                distance: 4,
                count: 2,
                policy: OutOfRange::ZeroFill
            }
        );
    }

    #[test]
    fn requested_len_per_variant() {
        assert_eq!(Instruction::Literal(&[1, 2, 3]).requested_len(), 3);
        assert_eq!(Instruction::Fill { value: 0, count: 7 }.requested_len(), 7);
        assert_eq!(Instruction::End.requested_len(), 0);
    }
}
