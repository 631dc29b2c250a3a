//! Fixed-width unsigned integers used throughout the ledger.
//!
//! A [`U256`] doubles as a block hash, an account address, a balance or
//! amount, a generic identifier, and a checksum. A [`U512`] doubles as a
//! signature. Both store their bytes big-endian, which means byte-wise
//! lexicographic ordering of the backing array already matches numeric
//! ordering -- useful for store iteration and for `Ord`/`PartialOrd`.
//!
//! Big-number arithmetic (`checked_add`/`checked_sub`) is delegated to
//! [`primitive_types`], which already ships constant-size 256/512-bit
//! integers with the exact semantics we need; this module only adds the
//! big-endian byte view and the domain-specific encodings (hex, decimal,
//! base58-check) spelled out in §4.1.

use std::fmt;

use primitive_types::U256 as PU256;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

use crate::primitives::CodecError;

const BASE58_ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// 128-bit unsigned integer with big-endian byte layout.
///
/// Used for the wallet-secret IV in §4.1; no arithmetic is required on
/// this width so it stays a thin byte-array wrapper.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct U128(pub [u8; 16]);

impl U128 {
    pub const ZERO: U128 = U128([0u8; 16]);

    pub fn from_be_bytes(bytes: [u8; 16]) -> Self {
        U128(bytes)
    }

    pub fn to_be_bytes(&self) -> [u8; 16] {
        self.0
    }
}

impl fmt::Debug for U128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U128({})", hex::encode(self.0))
    }
}

/// 256-bit unsigned integer with big-endian byte layout.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct U256(pub [u8; 32]);

impl U256 {
    pub const ZERO: U256 = U256([0u8; 32]);
    pub const MAX: U256 = U256([0xffu8; 32]);
    pub const ONE: U256 = U256({
        let mut b = [0u8; 32];
        b[31] = 1;
        b
    });

    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        U256(bytes)
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    fn as_big(&self) -> PU256 {
        PU256::from_big_endian(&self.0)
    }

    fn from_big(v: PU256) -> Self {
        U256(v.to_big_endian())
    }

    /// Checked addition; `None` on overflow.
    pub fn checked_add(&self, rhs: &U256) -> Option<U256> {
        self.as_big().checked_add(rhs.as_big()).map(Self::from_big)
    }

    /// Checked subtraction; `None` if `rhs > self`.
    pub fn checked_sub(&self, rhs: &U256) -> Option<U256> {
        self.as_big().checked_sub(rhs.as_big()).map(Self::from_big)
    }

    /// Saturating addition, clamped to [`U256::MAX`] on overflow. Used for
    /// vote-weight tallies, where overflow would only happen if aggregate
    /// weight exceeded the total possible supply.
    pub fn saturating_add(&self, rhs: &U256) -> U256 {
        self.checked_add(rhs).unwrap_or(U256::MAX)
    }

    /// Saturating subtraction, clamped to zero on underflow.
    pub fn saturating_sub(&self, rhs: &U256) -> U256 {
        self.checked_sub(rhs).unwrap_or(U256::ZERO)
    }

    /// Halves the value, discarding any remainder. Used by vote tallying
    /// to compute a supermajority threshold without needing division in
    /// general.
    pub fn checked_div_by_two(&self) -> U256 {
        let mut out = [0u8; 32];
        let mut carry = 0u8;
        for (i, byte) in self.0.iter().enumerate() {
            let cur = (u16::from(carry) << 8) | u16::from(*byte);
            out[i] = (cur >> 1) as u8;
            carry = (cur & 1) as u8;
        }
        U256(out)
    }

    pub fn bitxor(&self, rhs: &U256) -> U256 {
        let mut out = [0u8; 32];
        for i in 0..32 {
            out[i] = self.0[i] ^ rhs.0[i];
        }
        U256(out)
    }

    /// Fixed-length, big-endian, lower-case hex: always 64 characters.
    pub fn encode_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Decodes a fixed-length 64-character hex string.
    pub fn decode_hex(s: &str) -> Result<Self, CodecError> {
        if s.len() != 64 {
            return Err(CodecError::InvalidLength {
                expected: 64,
                actual: s.len(),
            });
        }
        let bytes = hex::decode(s).map_err(|_| CodecError::InvalidDigit)?;
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(U256(out))
    }

    /// Canonical decimal encoding: no leading zeros, except the value zero
    /// itself which encodes as `"0"`.
    pub fn encode_dec(&self) -> String {
        self.as_big().to_string()
    }

    /// Decodes a canonical decimal string back into a `U256`.
    pub fn decode_dec(s: &str) -> Result<Self, CodecError> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodecError::InvalidDigit);
        }
        if s.len() > 1 && s.starts_with('0') {
            return Err(CodecError::InvalidDigit);
        }
        let v = PU256::from_dec_str(s).map_err(|_| CodecError::InvalidLength {
            expected: 0,
            actual: s.len(),
        })?;
        Ok(Self::from_big(v))
    }

    /// Base58-check encoding: the 32 raw bytes followed by the first 4
    /// bytes of `SHA3-256(payload)`, both run through the 58-character
    /// alphabet used by the reference implementation.
    pub fn encode_base58check(&self) -> String {
        let mut payload = Vec::with_capacity(36);
        payload.extend_from_slice(&self.0);
        payload.extend_from_slice(&checksum4(&self.0));
        bs58::encode(payload).with_alphabet(bs58::Alphabet::BITCOIN).into_string()
    }

    /// Decodes and verifies a base58-check address string.
    pub fn decode_base58check(s: &str) -> Result<Self, CodecError> {
        if !s.bytes().all(|b| BASE58_ALPHABET.contains(&b)) {
            return Err(CodecError::InvalidDigit);
        }
        let payload = bs58::decode(s)
            .with_alphabet(bs58::Alphabet::BITCOIN)
            .into_vec()
            .map_err(|_| CodecError::InvalidDigit)?;
        if payload.len() != 36 {
            return Err(CodecError::InvalidLength {
                expected: 36,
                actual: payload.len(),
            });
        }
        let (body, check) = payload.split_at(32);
        if checksum4(body) != check {
            return Err(CodecError::InvalidChecksum);
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(body);
        Ok(U256(out))
    }
}

/// First 4 bytes of `SHA3-256(payload)`, used as the base58-check trailer.
fn checksum4(payload: &[u8]) -> [u8; 4] {
    let mut hasher = Sha3_256::new();
    hasher.update(payload);
    let digest = hasher.finalize();
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

impl fmt::Debug for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U256({})", self.encode_hex())
    }
}

impl fmt::Display for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode_hex())
    }
}

/// 512-bit unsigned integer with big-endian byte layout; backs signatures
/// and the salsa20/8 keystream intermediate value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct U512(pub [u8; 64]);

impl U512 {
    pub const ZERO: U512 = U512([0u8; 64]);

    pub fn from_be_bytes(bytes: [u8; 64]) -> Self {
        U512(bytes)
    }

    pub fn to_be_bytes(&self) -> [u8; 64] {
        self.0
    }

    pub fn bitxor(&self, rhs: &U512) -> U512 {
        let mut out = [0u8; 64];
        for i in 0..64 {
            out[i] = self.0[i] ^ rhs.0[i];
        }
        U512(out)
    }

    /// Fixed-length, big-endian, lower-case hex: always 128 characters.
    pub fn encode_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn decode_hex(s: &str) -> Result<Self, CodecError> {
        if s.len() != 128 {
            return Err(CodecError::InvalidLength {
                expected: 128,
                actual: s.len(),
            });
        }
        let bytes = hex::decode(s).map_err(|_| CodecError::InvalidDigit)?;
        let mut out = [0u8; 64];
        out.copy_from_slice(&bytes);
        Ok(U512(out))
    }
}

impl Default for U512 {
    fn default() -> Self {
        U512::ZERO
    }
}

impl fmt::Debug for U512 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U512({})", self.encode_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let v = U256([7u8; 32]);
        let s = v.encode_hex();
        assert_eq!(s.len(), 64);
        assert_eq!(U256::decode_hex(&s).unwrap(), v);
    }

    #[test]
    fn hex_rejects_wrong_length() {
        assert!(matches!(
            U256::decode_hex("ab"),
            Err(CodecError::InvalidLength { .. })
        ));
    }

    #[test]
    fn dec_roundtrip_and_canonical_zero() {
        let zero = U256::ZERO;
        assert_eq!(zero.encode_dec(), "0");
        assert_eq!(U256::decode_dec("0").unwrap(), zero);

        let v = U256::from_be_bytes({
            let mut b = [0u8; 32];
            b[31] = 42;
            b
        });
        assert_eq!(v.encode_dec(), "42");
        assert_eq!(U256::decode_dec("42").unwrap(), v);
    }

    #[test]
    fn dec_rejects_leading_zero() {
        assert!(U256::decode_dec("042").is_err());
    }

    #[test]
    fn base58check_roundtrip() {
        let v = U256([200u8; 32]);
        let s = v.encode_base58check();
        assert_eq!(U256::decode_base58check(&s).unwrap(), v);
    }

    #[test]
    fn base58check_rejects_bad_checksum() {
        let v = U256([1u8; 32]);
        let mut s = v.encode_base58check();
        // Flip the last character to corrupt the checksum.
        let last = s.pop().unwrap();
        let replacement = if last == '1' { '2' } else { '1' };
        s.push(replacement);
        assert!(U256::decode_base58check(&s).is_err());
    }

    #[test]
    fn checked_arith() {
        let a = U256::from_be_bytes({
            let mut b = [0u8; 32];
            b[31] = 10;
            b
        });
        let b = U256::from_be_bytes({
            let mut b = [0u8; 32];
            b[31] = 3;
            b
        });
        assert_eq!(a.checked_sub(&b).unwrap().encode_dec(), "7");
        assert_eq!(a.checked_add(&b).unwrap().encode_dec(), "13");
        assert!(b.checked_sub(&a).is_none());
    }

    #[test]
    fn ordering_matches_byte_order() {
        let small = U256::from_be_bytes([0u8; 32]);
        let mut big_bytes = [0u8; 32];
        big_bytes[0] = 1;
        let big = U256::from_be_bytes(big_bytes);
        assert!(small < big);
    }
}
