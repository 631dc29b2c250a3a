//! Password-derived digests and the wallet-secret keystream.
//!
//! Two derivations live here, both described in §4.1:
//!
//! - [`digest_password`] turns an arbitrary password into a 256-bit
//!   digest by absorbing (repetitions of) the password into SHA3-256
//!   until 1024 input bytes have been fed in.
//! - [`prv`] XORs a private key with a keystream derived from that
//!   digest and a per-wallet IV, so the same function both encrypts and
//!   decrypts a wallet secret (XOR is its own inverse).
//!
//! No crate in the dependency stack implements the salsa20/8 *core
//! permutation* (as opposed to the full stream cipher), so
//! [`salsa20_8`] is a direct, from-scratch implementation of the
//! double-round mixing function salsa20 and scrypt are built from.

use crate::crypto::hash::sha3_256;
use crate::primitives::{U256, U512};

const PASSWORD_ABSORB_BYTES: usize = 1024;

/// Feeds `pw` into SHA3-256 repeatedly until 1024 input bytes have been
/// absorbed, then finalizes to a 256-bit digest.
pub fn digest_password(pw: &[u8]) -> U256 {
    if pw.is_empty() {
        return sha3_256(&[0u8; PASSWORD_ABSORB_BYTES]);
    }
    let mut buf = Vec::with_capacity(PASSWORD_ABSORB_BYTES);
    while buf.len() < PASSWORD_ABSORB_BYTES {
        buf.extend_from_slice(pw);
    }
    buf.truncate(PASSWORD_ABSORB_BYTES);
    sha3_256(&buf)
}

/// Encrypts (or, symmetrically, decrypts) a private key for wallet
/// storage: `private_key XOR keystream(password_digest, iv)`.
pub fn prv(private_key: &U256, password_digest: &U256, iv: &U256) -> U256 {
    let keystream = wallet_keystream(password_digest, iv);
    private_key.bitxor(&keystream)
}

/// Derives the 256-bit keystream used by [`prv`]: the salsa20/8
/// permutation of the 512-bit concatenation of `digest` and `iv`,
/// truncated to its first 256 bits.
fn wallet_keystream(digest: &U256, iv: &U256) -> U256 {
    let mut input = [0u8; 64];
    input[..32].copy_from_slice(&digest.0);
    input[32..].copy_from_slice(&iv.0);
    let permuted = salsa20_8(U512(input));
    let mut out = [0u8; 32];
    out.copy_from_slice(&permuted.0[..32]);
    U256(out)
}

/// The salsa20/8 core permutation: 8 rounds (4 double-rounds) of the
/// salsa20 quarter-round mixing function over 16 little-endian 32-bit
/// words, with the pre-round state added back in at the end. This is the
/// same core used inside scrypt's `BlockMix`, not the full salsa20
/// stream cipher (there is no key schedule or counter here).
fn salsa20_8(input: U512) -> U512 {
    let bytes = input.to_be_bytes();
    let mut b = [0u32; 16];
    for i in 0..16 {
        b[i] = u32::from_le_bytes(bytes[4 * i..4 * i + 4].try_into().unwrap());
    }
    let orig = b;

    for _ in 0..4 {
        // Column round.
        b[4] ^= rotl(b[0].wrapping_add(b[12]), 7);
        b[8] ^= rotl(b[4].wrapping_add(b[0]), 9);
        b[12] ^= rotl(b[8].wrapping_add(b[4]), 13);
        b[0] ^= rotl(b[12].wrapping_add(b[8]), 18);

        b[9] ^= rotl(b[5].wrapping_add(b[1]), 7);
        b[13] ^= rotl(b[9].wrapping_add(b[5]), 9);
        b[1] ^= rotl(b[13].wrapping_add(b[9]), 13);
        b[5] ^= rotl(b[1].wrapping_add(b[13]), 18);

        b[14] ^= rotl(b[10].wrapping_add(b[6]), 7);
        b[2] ^= rotl(b[14].wrapping_add(b[10]), 9);
        b[6] ^= rotl(b[2].wrapping_add(b[14]), 13);
        b[10] ^= rotl(b[6].wrapping_add(b[2]), 18);

        b[3] ^= rotl(b[15].wrapping_add(b[11]), 7);
        b[7] ^= rotl(b[3].wrapping_add(b[15]), 9);
        b[11] ^= rotl(b[7].wrapping_add(b[3]), 13);
        b[15] ^= rotl(b[11].wrapping_add(b[7]), 18);

        // Row round.
        b[1] ^= rotl(b[0].wrapping_add(b[3]), 7);
        b[2] ^= rotl(b[1].wrapping_add(b[0]), 9);
        b[3] ^= rotl(b[2].wrapping_add(b[1]), 13);
        b[0] ^= rotl(b[3].wrapping_add(b[2]), 18);

        b[6] ^= rotl(b[5].wrapping_add(b[4]), 7);
        b[7] ^= rotl(b[6].wrapping_add(b[5]), 9);
        b[4] ^= rotl(b[7].wrapping_add(b[6]), 13);
        b[5] ^= rotl(b[4].wrapping_add(b[7]), 18);

        b[11] ^= rotl(b[10].wrapping_add(b[9]), 7);
        b[8] ^= rotl(b[11].wrapping_add(b[10]), 9);
        b[9] ^= rotl(b[8].wrapping_add(b[11]), 13);
        b[10] ^= rotl(b[9].wrapping_add(b[8]), 18);

        b[12] ^= rotl(b[15].wrapping_add(b[14]), 7);
        b[13] ^= rotl(b[12].wrapping_add(b[15]), 9);
        b[14] ^= rotl(b[13].wrapping_add(b[12]), 13);
        b[15] ^= rotl(b[14].wrapping_add(b[13]), 18);
    }

    let mut out = [0u8; 64];
    for i in 0..16 {
        let v = b[i].wrapping_add(orig[i]);
        out[4 * i..4 * i + 4].copy_from_slice(&v.to_le_bytes());
    }
    U512(out)
}

#[inline]
fn rotl(x: u32, n: u32) -> u32 {
    (x << n) | (x >> (32 - n))
}
