// Instruction decoder: command byte -> `Instruction` -> output window.
//
// Parsing and execution are split. `read_instruction` consumes the command's
// parameter bytes and never touches the window; `execute` applies the effect
// and never touches the stream. An instruction whose parameters run past the
// end of the stream therefore has no effect at all.

use super::DecodeError;
use super::opcode::{
    END_MARKER, Family, Instruction, LONG_FORM_COUNT_CAP, ProvisionalOpcodes,
};
use super::stream::CompressedStream;
use super::window::{OutOfRange, OutputWindow};

/// Parse the parameters of `command` from `stream`.
///
/// The end marker is recognised before family dispatch.
pub fn read_instruction<'a, P: ProvisionalOpcodes + ?Sized>(
    command: u8,
    stream: &mut CompressedStream<'a>,
    semantics: &P,
) -> Result<Instruction<'a>, DecodeError> {
    if command == END_MARKER {
        return Ok(Instruction::End);
    }

    let low = command & 0x0F;
    let count = low as usize;

    let inst = match Family::of(command) {
        Family::Literal | Family::FallbackLiteral => {
            Instruction::Literal(stream.read_slice(count + 1)?)
        }

        Family::ShortRepeat => Instruction::Fill {
            value: stream.read_u8()?,
            count: count + 2,
        },

        Family::SkipCopy => Instruction::Copy {
            distance: stream.read_u8()? as usize,
            count: count + 1,
            policy: OutOfRange::Skip,
        },

        Family::Repeat => Instruction::Fill {
            value: stream.read_u8()?,
            count: count + 3,
        },

        Family::ExtendedRepeat => semantics.extended_repeat(low, stream)?,

        Family::CopyOrLiteral => match stream.read_u8()? {
            0 => Instruction::Literal(stream.read_slice(count + 1)?),
            offset => Instruction::Copy {
                distance: offset as usize,
                count: count + 1,
                policy: OutOfRange::ZeroFill,
            },
        },

        Family::AlternateCopy => semantics.alternate_base_copy(low, stream)?,

        Family::PatternFill => Instruction::Fill {
            value: stream.read_u8()?,
            count: count + 1,
        },

        Family::LongForm => read_long_form(low, stream, semantics)?,

        Family::CountedOrLiteral => {
            if low == 0 {
                let count = stream.read_u8()? as usize;
                Instruction::Fill {
                    value: stream.read_u8()?,
                    count,
                }
            } else {
                Instruction::Literal(stream.read_slice(count)?)
            }
        }

        Family::Control => Instruction::Nop,
    };

    Ok(inst)
}

/// Family 0x8, keyed by the low nibble.
fn read_long_form<'a, P: ProvisionalOpcodes + ?Sized>(
    low: u8,
    stream: &mut CompressedStream<'a>,
    semantics: &P,
) -> Result<Instruction<'a>, DecodeError> {
    match low {
        0 => {
            let count = stream.read_u8()? as usize;
            Ok(Instruction::Fill {
                value: stream.read_u8()?,
                count,
            })
        }
        2 => semantics.long_form_passthrough(stream),
        1..=7 => {
            let extra = stream.read_u8()? as usize;
            // At most 0x7FF here; the cap holds for any wider count encoding.
            let count = (((low as usize) << 8) | extra).min(LONG_FORM_COUNT_CAP);
            Ok(Instruction::Fill {
                value: stream.read_u8()?,
                count,
            })
        }
        _ => {
            let extra = (low - 8) as usize;
            let count = stream.read_u8()? as usize + extra;
            match stream.read_u8()? {
                0 => Ok(Instruction::Fill { value: 0, count }),
                offset => Ok(Instruction::CyclicCopy {
                    period: offset as usize,
                    count,
                }),
            }
        }
    }
}

/// Apply `inst` to `window`. Returns the number of bytes emitted.
pub fn execute(inst: &Instruction<'_>, window: &mut OutputWindow) -> usize {
    match *inst {
        Instruction::Literal(bytes) => {
            window.extend_literal(bytes);
            bytes.len()
        }
        Instruction::Fill { value, count } => {
            window.fill(value, count);
            count
        }
        Instruction::Copy {
            distance,
            count,
            policy,
        } => window.copy_back(distance, count, policy),
        Instruction::CyclicCopy { period, count } => {
            window.copy_cyclic(period, count);
            count
        }
        Instruction::Nop | Instruction::End => 0,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
