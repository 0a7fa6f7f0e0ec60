//! jimdecomp: decoder for the compressed graphics payloads in map.jim
//! containers.
//!
//! The crate provides:
//! - The instruction set and its parser (`codec`)
//! - The decode loop (`engine`)
//! - Scored payload-offset search (`scan`)
//! - Container layouts (`container`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use jimdecomp::engine::{DecodeStatus, decode};
//!
//! // Repeat 0x66 four times, one literal byte, then the end marker.
//! let payload = [0x31, 0x66, 0x00, 0x65, 0xFF];
//! let result = decode(&payload, 0);
//! assert_eq!(result.output, [0x66, 0x66, 0x66, 0x66, 0x65]);
//! assert_eq!(result.status, DecodeStatus::Completed);
//! ```
//!
//! Containers that do not record where their payload starts are searched:
//!
//! ```
//! use jimdecomp::container::ContainerLayout;
//!
//! let file = [0xFF, 0xFF, 0x31, 0x05, 0xFF];
//! let decoded = ContainerLayout::default().decode(&file).unwrap();
//! assert_eq!(decoded.offset, 2);
//! assert_eq!(decoded.result.output, [5, 5, 5, 5]);
//! ```

pub mod codec;
pub mod container;
pub mod engine;
pub mod io;
pub mod scan;

#[cfg(feature = "cli")]
pub mod cli;

pub use codec::DecodeError;
pub use container::{ContainerDecode, ContainerError, ContainerLayout};
pub use engine::{DecodeEngine, DecodeResult, DecodeStatus, decode};
