//! SHA3-256 hashing over raw byte buffers.
//!
//! Every canonical hash in the ledger -- block hashes, password digests,
//! base58-check checksums -- goes through this single helper so the
//! padding and output length stay consistent everywhere.

use sha3::{Digest, Sha3_256};

use crate::primitives::U256;

/// `SHA3-256(data)`, truncated to nothing -- the full 32-byte digest.
pub fn sha3_256(data: &[u8]) -> U256 {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    U256(out)
}

/// `SHA3-256` over the concatenation of several byte slices, without an
/// intermediate allocation for the joined buffer.
pub fn sha3_256_concat(parts: &[&[u8]]) -> U256 {
    let mut hasher = Sha3_256::new();
    for part in parts {
        hasher.update(part);
    }
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    U256(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_matches_manual_concatenation() {
        let a = b"abc";
        let b = b"def";
        let mut joined = Vec::new();
        joined.extend_from_slice(a);
        joined.extend_from_slice(b);
        assert_eq!(sha3_256_concat(&[a, b]), sha3_256(&joined));
    }

    #[test]
    fn deterministic() {
        let h1 = sha3_256(b"hello");
        let h2 = sha3_256(b"hello");
        assert_eq!(h1, h2);
    }
}
