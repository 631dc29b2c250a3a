//! Ed25519 signing and verification over 256-bit message digests.
//!
//! Signatures in this ledger are always taken over a 256-bit SHA3 hash,
//! never over raw block bytes -- see [`crate::crypto::hash`]. This module
//! wraps `ed25519-dalek`'s donna-style clamped keys so the rest of the
//! crate only ever deals in [`U256`]/[`U512`].

use ed25519_dalek::{Keypair as DalekKeypair, PublicKey as DalekPublicKey, SecretKey, Signature as DalekSignature, Signer, Verifier};
use rand::rngs::OsRng;

use crate::primitives::{U256, U512};

/// An Ed25519 keypair over the ledger's 256-bit account/private-key space.
///
/// Construction always goes through [`Keypair::from_private`] or
/// [`Keypair::generate`] so the public key is never out of sync with the
/// private key it was derived from.
#[derive(Clone)]
pub struct Keypair {
    inner: DalekKeypair,
}

impl Keypair {
    /// Derives a keypair from a 256-bit private key.
    ///
    /// Returns `None` if the bytes do not form a valid Ed25519 secret key
    /// (this should not happen for private keys produced by this crate,
    /// but callers may also load foreign key material).
    pub fn from_private(private: &U256) -> Option<Self> {
        let secret = SecretKey::from_bytes(&private.0).ok()?;
        let public = DalekPublicKey::from(&secret);
        Some(Keypair {
            inner: DalekKeypair { secret, public },
        })
    }

    /// Generates a fresh random keypair using the OS RNG. Used by tests
    /// and by wallet-creation flows external to this crate.
    pub fn generate() -> Self {
        let mut csprng = OsRng {};
        Keypair {
            inner: DalekKeypair::generate(&mut csprng),
        }
    }

    pub fn public(&self) -> U256 {
        U256(self.inner.public.to_bytes())
    }

    pub fn private(&self) -> U256 {
        U256(self.inner.secret.to_bytes())
    }

    /// Signs a 256-bit block/message hash, producing a 512-bit signature.
    pub fn sign(&self, hash: &U256) -> U512 {
        let sig: DalekSignature = self.inner.sign(&hash.0);
        U512(sig.to_bytes())
    }
}

/// Verifies a detached signature over a 256-bit hash against a public key.
///
/// Returns `false` for any malformed key or signature rather than
/// propagating an error -- per §4.3, signature failure folds into the
/// single `bad_signature` ledger outcome.
pub fn verify(public: &U256, hash: &U256, signature: &U512) -> bool {
    let Ok(public) = DalekPublicKey::from_bytes(&public.0) else {
        return false;
    };
    let Ok(signature) = DalekSignature::from_bytes(&signature.0) else {
        return false;
    };
    public.verify(&hash.0, &signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::sha3_256;

    #[test]
    fn sign_and_verify_roundtrip() {
        let kp = Keypair::generate();
        let hash = sha3_256(b"a block's hashable bytes");
        let sig = kp.sign(&hash);
        assert!(verify(&kp.public(), &hash, &sig));
    }

    #[test]
    fn verify_rejects_wrong_key() {
        let kp = Keypair::generate();
        let other = Keypair::generate();
        let hash = sha3_256(b"payload");
        let sig = kp.sign(&hash);
        assert!(!verify(&other.public(), &hash, &sig));
    }

    #[test]
    fn verify_rejects_tampered_hash() {
        let kp = Keypair::generate();
        let hash = sha3_256(b"payload");
        let sig = kp.sign(&hash);
        let other_hash = sha3_256(b"different payload");
        assert!(!verify(&kp.public(), &other_hash, &sig));
    }

    #[test]
    fn all_zero_hash_signs_and_verifies() {
        let kp = Keypair::generate();
        let zero = U256::ZERO;
        let sig = kp.sign(&zero);
        assert!(verify(&kp.public(), &zero, &sig));
    }

    #[test]
    fn from_private_matches_generated_public() {
        let kp = Keypair::generate();
        let derived = Keypair::from_private(&kp.private()).expect("valid secret key");
        assert_eq!(derived.public(), kp.public());
    }
}
