//! Pending send entries awaiting a matching receive.
//!
//! Created by the ledger when a send is applied; consumed (deleted) when
//! the matching receive or open is applied. Keyed by the send block's hash.

use crate::primitives::CodecError;
use crate::types::{Account, Amount};

pub const PENDING_LEN: usize = 32 + 32 + 32;

/// `{source address, amount, destination address}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingEntry {
    pub source: Account,
    pub amount: Amount,
    pub destination: Account,
}

impl PendingEntry {
    pub fn serialize(&self) -> [u8; PENDING_LEN] {
        let mut out = [0u8; PENDING_LEN];
        out[0..32].copy_from_slice(&self.source.to_be_bytes());
        out[32..64].copy_from_slice(&self.amount.to_be_bytes());
        out[64..96].copy_from_slice(&self.destination.to_be_bytes());
        out
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() != PENDING_LEN {
            return Err(CodecError::InvalidLength {
                expected: PENDING_LEN,
                actual: bytes.len(),
            });
        }
        let mut source = [0u8; 32];
        source.copy_from_slice(&bytes[0..32]);
        let mut amount = [0u8; 32];
        amount.copy_from_slice(&bytes[32..64]);
        let mut destination = [0u8; 32];
        destination.copy_from_slice(&bytes[64..96]);
        Ok(PendingEntry {
            source: crate::primitives::U256(source),
            amount: crate::primitives::U256(amount),
            destination: crate::primitives::U256(destination),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::U256;

    #[test]
    fn roundtrip() {
        let p = PendingEntry {
            source: U256([1u8; 32]),
            amount: U256([2u8; 32]),
            destination: U256([3u8; 32]),
        };
        let bytes = p.serialize();
        assert_eq!(PendingEntry::deserialize(&bytes).unwrap(), p);
    }
}
