//! Core domain types shared across the ledger.
//!
//! Everything here is a thin, semantically-named alias or struct over the
//! fixed-width integers in [`crate::primitives`]. A `U256` means different
//! things depending on context -- a hash, an address, a balance -- and
//! these aliases let call sites and signatures say which.

pub mod block;
pub mod frontier;
pub mod pending;

use crate::primitives::{U256, U512};

/// A 256-bit account address, which doubles as that account's public key.
pub type Account = U256;
/// A block's identity: the SHA3-256 hash of its hashable fields.
pub type BlockHash = U256;
/// A chain balance or a send/receive amount.
pub type Balance = U256;
pub type Amount = U256;
/// A generic 256-bit identifier (used for the checksum table's region key).
pub type Identifier = U256;
/// A 256-bit tamper-evident XOR accumulator over a range of addresses.
pub type Checksum = U256;
/// An Ed25519 private key.
pub type PrivateKey = U256;
/// A detached Ed25519 signature, produced over a 256-bit block hash.
pub type Signature = U512;

pub use block::{Block, ChangeBlock, ChangeHashables, OpenBlock, OpenHashables, ReceiveBlock, ReceiveHashables, SendBlock, SendHashables};
pub use frontier::{FRONTIER_LEN, Frontier};
pub use pending::{PENDING_LEN, PendingEntry};
