//! Fixed-width integers and their codecs.
//!
//! This is the bottom layer of the ledger: everything above it (block
//! model, store, state machine) is built on the 128/256/512-bit types
//! defined here.

pub mod uint;

pub use uint::{U128, U256, U512};

/// Malformed input during serialize/deserialize/encode/decode.
///
/// Per the error-handling design, codec failures are first-class values
/// with no side effects -- decoding never partially mutates its input and
/// never panics on attacker-controlled bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("unexpected end of input while decoding")]
    ShortRead,
    #[error("invalid digit for this encoding")]
    InvalidDigit,
    #[error("base58-check checksum mismatch")]
    InvalidChecksum,
    #[error("expected length {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("unknown block type tag")]
    UnknownBlockType,
}
