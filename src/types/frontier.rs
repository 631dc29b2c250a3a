//! Per-account head record.
//!
//! Exactly one [`Frontier`] exists per active account, keyed by address
//! in the `addresses` table; accounts that have not yet been opened have
//! none.

use crate::primitives::CodecError;
use crate::types::{Account, Balance, BlockHash};

pub const FRONTIER_LEN: usize = 32 + 32 + 32 + 8;

/// `{head block hash, current representative, current balance, timestamp}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frontier {
    pub head: BlockHash,
    pub representative: Account,
    pub balance: Balance,
    pub time: u64,
}

impl Frontier {
    /// `32B head ‖ 32B rep ‖ 32B balance ‖ 8B time`, as stored in the
    /// `addresses` table.
    pub fn serialize(&self) -> [u8; FRONTIER_LEN] {
        let mut out = [0u8; FRONTIER_LEN];
        out[0..32].copy_from_slice(&self.head.to_be_bytes());
        out[32..64].copy_from_slice(&self.representative.to_be_bytes());
        out[64..96].copy_from_slice(&self.balance.to_be_bytes());
        out[96..104].copy_from_slice(&self.time.to_be_bytes());
        out
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() != FRONTIER_LEN {
            return Err(CodecError::InvalidLength {
                expected: FRONTIER_LEN,
                actual: bytes.len(),
            });
        }
        let mut head = [0u8; 32];
        head.copy_from_slice(&bytes[0..32]);
        let mut representative = [0u8; 32];
        representative.copy_from_slice(&bytes[32..64]);
        let mut balance = [0u8; 32];
        balance.copy_from_slice(&bytes[64..96]);
        let mut time = [0u8; 8];
        time.copy_from_slice(&bytes[96..104]);
        Ok(Frontier {
            head: crate::primitives::U256(head),
            representative: crate::primitives::U256(representative),
            balance: crate::primitives::U256(balance),
            time: u64::from_be_bytes(time),
        })
    }
}
