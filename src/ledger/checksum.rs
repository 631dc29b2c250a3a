//! Checksum region bookkeeping (§4.3, §9).
//!
//! Every account maps to one checksum region: the top 56 bits of its
//! address, read as a big-endian `u64` (depth is always 0 -- regions
//! are not subdivided further, since cross-implementation interop over
//! the exact scheme is out of scope). Toggling a block into or out of
//! an account's chain XORs its hash into the region's running
//! checksum; XOR is its own inverse, so `process` and `rollback` share
//! this one helper.

use crate::storage::{LedgerStore, StoreError, StoreOp};
use crate::types::{Account, BlockHash, Checksum};

/// Maps `account` to its checksum region: the top 56 bits, right-aligned
/// into a `u64`.
pub fn region_of(account: &Account) -> u64 {
    let bytes = account.to_be_bytes();
    let mut buf = [0u8; 8];
    buf[1..8].copy_from_slice(&bytes[0..7]);
    u64::from_be_bytes(buf)
}

/// Builds the store op that XORs `hash` into `account`'s region checksum.
pub fn toggle<S: LedgerStore>(store: &S, account: &Account, hash: &BlockHash) -> Result<StoreOp, StoreError> {
    let region = region_of(account);
    let current = store.get_checksum(region, 0)?.unwrap_or(Checksum::ZERO);
    Ok(StoreOp::PutChecksum(region, 0, current.bitxor(hash)))
}
