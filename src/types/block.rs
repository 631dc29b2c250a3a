//! The four block variants, their hashable payloads, and the wire codec.
//!
//! Each variant pairs a small "hashables" struct -- the fields that feed
//! the canonical hash -- with a detached signature over that hash. This
//! mirrors the reference layout exactly (see the hash-order table in
//! §3) rather than hashing the whole serialized block, so the signature
//! never has to be stripped out before re-hashing.

use crate::crypto::hash::sha3_256;
use crate::primitives::CodecError;
use crate::types::{Account, Balance, BlockHash, Signature};

/// Hashable fields of a send block: destination, previous, resulting balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SendHashables {
    pub destination: Account,
    pub previous: BlockHash,
    pub balance: Balance,
}

impl SendHashables {
    fn hash(&self) -> BlockHash {
        sha3_256(&self.hash_bytes())
    }

    fn hash_bytes(&self) -> [u8; 96] {
        let mut out = [0u8; 96];
        out[0..32].copy_from_slice(&self.destination.to_be_bytes());
        out[32..64].copy_from_slice(&self.previous.to_be_bytes());
        out[64..96].copy_from_slice(&self.balance.to_be_bytes());
        out
    }
}

/// Hashable fields of a receive block: previous, source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReceiveHashables {
    pub previous: BlockHash,
    pub source: BlockHash,
}

impl ReceiveHashables {
    fn hash(&self) -> BlockHash {
        sha3_256(&self.hash_bytes())
    }

    fn hash_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[0..32].copy_from_slice(&self.previous.to_be_bytes());
        out[32..64].copy_from_slice(&self.source.to_be_bytes());
        out
    }
}

/// Hashable fields of an open block: representative, source. There is no
/// `previous` -- this block creates the account chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpenHashables {
    pub representative: Account,
    pub source: BlockHash,
}

impl OpenHashables {
    fn hash(&self) -> BlockHash {
        sha3_256(&self.hash_bytes())
    }

    fn hash_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[0..32].copy_from_slice(&self.representative.to_be_bytes());
        out[32..64].copy_from_slice(&self.source.to_be_bytes());
        out
    }
}

/// Hashable fields of a change block: representative, previous.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChangeHashables {
    pub representative: Account,
    pub previous: BlockHash,
}

impl ChangeHashables {
    fn hash(&self) -> BlockHash {
        sha3_256(&self.hash_bytes())
    }

    fn hash_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[0..32].copy_from_slice(&self.representative.to_be_bytes());
        out[32..64].copy_from_slice(&self.previous.to_be_bytes());
        out
    }
}

macro_rules! block_variant {
    ($name:ident, $hashables:ty) => {
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name {
            pub hashables: $hashables,
            pub signature: Signature,
        }

        impl $name {
            pub fn hash(&self) -> BlockHash {
                self.hashables.hash()
            }
        }
    };
}

block_variant!(SendBlock, SendHashables);
block_variant!(ReceiveBlock, ReceiveHashables);
block_variant!(OpenBlock, OpenHashables);
block_variant!(ChangeBlock, ChangeHashables);

/// Wire type tags, in the order tabulated in §4.4.
const TYPE_SEND: u8 = 0;
const TYPE_RECEIVE: u8 = 1;
const TYPE_OPEN: u8 = 2;
const TYPE_CHANGE: u8 = 3;

/// A signed block: one of the four variants.
///
/// Implementations should avoid virtual-dispatch machinery -- this is an
/// explicit tagged enum, matched on directly rather than visited through
/// a trait object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    Send(SendBlock),
    Receive(ReceiveBlock),
    Open(OpenBlock),
    Change(ChangeBlock),
}

impl Block {
    pub fn new_send(destination: Account, previous: BlockHash, balance: Balance, signature: Signature) -> Self {
        Block::Send(SendBlock {
            hashables: SendHashables {
                destination,
                previous,
                balance,
            },
            signature,
        })
    }

    pub fn new_receive(previous: BlockHash, source: BlockHash, signature: Signature) -> Self {
        Block::Receive(ReceiveBlock {
            hashables: ReceiveHashables { previous, source },
            signature,
        })
    }

    pub fn new_open(representative: Account, source: BlockHash, signature: Signature) -> Self {
        Block::Open(OpenBlock {
            hashables: OpenHashables {
                representative,
                source,
            },
            signature,
        })
    }

    pub fn new_change(representative: Account, previous: BlockHash, signature: Signature) -> Self {
        Block::Change(ChangeBlock {
            hashables: ChangeHashables {
                representative,
                previous,
            },
            signature,
        })
    }

    /// The block's identity: the 256-bit SHA3 hash of its hashable fields.
    pub fn hash(&self) -> BlockHash {
        match self {
            Block::Send(b) => b.hash(),
            Block::Receive(b) => b.hash(),
            Block::Open(b) => b.hash(),
            Block::Change(b) => b.hash(),
        }
    }

    /// `previous`, for every variant but open (which has none).
    pub fn previous(&self) -> Option<BlockHash> {
        match self {
            Block::Send(b) => Some(b.hashables.previous),
            Block::Receive(b) => Some(b.hashables.previous),
            Block::Open(_) => None,
            Block::Change(b) => Some(b.hashables.previous),
        }
    }

    /// `source`, for receive and open only.
    pub fn source(&self) -> Option<BlockHash> {
        match self {
            Block::Receive(b) => Some(b.hashables.source),
            Block::Open(b) => Some(b.hashables.source),
            Block::Send(_) | Block::Change(_) => None,
        }
    }

    /// The representative a block explicitly sets, for open and change only.
    pub fn representative(&self) -> Option<Account> {
        match self {
            Block::Open(b) => Some(b.hashables.representative),
            Block::Change(b) => Some(b.hashables.representative),
            Block::Send(_) | Block::Receive(_) => None,
        }
    }

    pub fn signature(&self) -> Signature {
        match self {
            Block::Send(b) => b.signature,
            Block::Receive(b) => b.signature,
            Block::Open(b) => b.signature,
            Block::Change(b) => b.signature,
        }
    }

    fn type_tag(&self) -> u8 {
        match self {
            Block::Send(_) => TYPE_SEND,
            Block::Receive(_) => TYPE_RECEIVE,
            Block::Open(_) => TYPE_OPEN,
            Block::Change(_) => TYPE_CHANGE,
        }
    }

    /// Serializes the block to its wire form: `type:1B ‖ body`.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(161);
        out.push(self.type_tag());
        match self {
            Block::Send(b) => {
                out.extend_from_slice(&b.hashables.destination.to_be_bytes());
                out.extend_from_slice(&b.hashables.previous.to_be_bytes());
                out.extend_from_slice(&b.hashables.balance.to_be_bytes());
                out.extend_from_slice(&b.signature.to_be_bytes());
            }
            Block::Receive(b) => {
                out.extend_from_slice(&b.hashables.previous.to_be_bytes());
                out.extend_from_slice(&b.hashables.source.to_be_bytes());
                out.extend_from_slice(&b.signature.to_be_bytes());
            }
            Block::Open(b) => {
                out.extend_from_slice(&b.hashables.representative.to_be_bytes());
                out.extend_from_slice(&b.hashables.source.to_be_bytes());
                out.extend_from_slice(&b.signature.to_be_bytes());
            }
            Block::Change(b) => {
                out.extend_from_slice(&b.hashables.representative.to_be_bytes());
                out.extend_from_slice(&b.hashables.previous.to_be_bytes());
                out.extend_from_slice(&b.signature.to_be_bytes());
            }
        }
        out
    }

    /// Deserializes one type byte followed by the variant body. Fails on
    /// an unknown type tag or on a short read; never panics on untrusted
    /// input.
    pub fn deserialize(bytes: &[u8]) -> Result<Block, CodecError> {
        let (&tag, rest) = bytes.split_first().ok_or(CodecError::ShortRead)?;
        match tag {
            TYPE_SEND => {
                let (destination, rest) = take_32(rest)?;
                let (previous, rest) = take_32(rest)?;
                let (balance, rest) = take_32(rest)?;
                let (signature, _) = take_64(rest)?;
                Ok(Block::new_send(destination, previous, balance, signature))
            }
            TYPE_RECEIVE => {
                let (previous, rest) = take_32(rest)?;
                let (source, rest) = take_32(rest)?;
                let (signature, _) = take_64(rest)?;
                Ok(Block::new_receive(previous, source, signature))
            }
            TYPE_OPEN => {
                let (representative, rest) = take_32(rest)?;
                let (source, rest) = take_32(rest)?;
                let (signature, _) = take_64(rest)?;
                Ok(Block::new_open(representative, source, signature))
            }
            TYPE_CHANGE => {
                let (representative, rest) = take_32(rest)?;
                let (previous, rest) = take_32(rest)?;
                let (signature, _) = take_64(rest)?;
                Ok(Block::new_change(representative, previous, signature))
            }
            _ => Err(CodecError::UnknownBlockType),
        }
    }
}

fn take_32(bytes: &[u8]) -> Result<(crate::primitives::U256, &[u8]), CodecError> {
    if bytes.len() < 32 {
        return Err(CodecError::ShortRead);
    }
    let (head, tail) = bytes.split_at(32);
    let mut arr = [0u8; 32];
    arr.copy_from_slice(head);
    Ok((crate::primitives::U256(arr), tail))
}

fn take_64(bytes: &[u8]) -> Result<(crate::primitives::U512, &[u8]), CodecError> {
    if bytes.len() < 64 {
        return Err(CodecError::ShortRead);
    }
    let (head, tail) = bytes.split_at(64);
    let mut arr = [0u8; 64];
    arr.copy_from_slice(head);
    Ok((crate::primitives::U512(arr), tail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use crate::primitives::U256;

    fn sign_hash(keypair: &Keypair, hash: &BlockHash) -> Signature {
        keypair.sign(hash)
    }

    #[test]
    fn send_wire_size_is_161_bytes() {
        let kp = Keypair::generate();
        let hashables = SendHashables {
            destination: U256([1u8; 32]),
            previous: U256([2u8; 32]),
            balance: U256([3u8; 32]),
        };
        let sig = sign_hash(&kp, &hashables.hash());
        let block = Block::Send(SendBlock { hashables, signature: sig });
        assert_eq!(block.serialize().len(), 161);
    }

    #[test]
    fn receive_open_change_wire_size_is_129_bytes() {
        let kp = Keypair::generate();
        let r = Block::new_receive(U256([1u8; 32]), U256([2u8; 32]), kp.sign(&U256::ZERO));
        let o = Block::new_open(U256([1u8; 32]), U256([2u8; 32]), kp.sign(&U256::ZERO));
        let c = Block::new_change(U256([1u8; 32]), U256([2u8; 32]), kp.sign(&U256::ZERO));
        assert_eq!(r.serialize().len(), 129);
        assert_eq!(o.serialize().len(), 129);
        assert_eq!(c.serialize().len(), 129);
    }

    #[test]
    fn hash_stable_across_serialize_deserialize() {
        let kp = Keypair::generate();
        let hashables = SendHashables {
            destination: U256([9u8; 32]),
            previous: U256([8u8; 32]),
            balance: U256([7u8; 32]),
        };
        let sig = sign_hash(&kp, &hashables.hash());
        let block = Block::Send(SendBlock { hashables, signature: sig });

        let bytes = block.serialize();
        let decoded = Block::deserialize(&bytes).expect("valid block bytes");
        assert_eq!(decoded.hash(), block.hash());
        assert_eq!(decoded, block);
    }

    #[test]
    fn deserialize_rejects_unknown_type() {
        let bytes = vec![0xffu8; 161];
        assert_eq!(Block::deserialize(&bytes), Err(CodecError::UnknownBlockType));
    }

    #[test]
    fn deserialize_rejects_short_read() {
        let bytes = vec![TYPE_SEND, 1, 2, 3];
        assert_eq!(Block::deserialize(&bytes), Err(CodecError::ShortRead));
    }

    #[test]
    fn open_has_no_previous_send_change_have_no_source() {
        let kp = Keypair::generate();
        let open = Block::new_open(U256([1u8; 32]), U256([2u8; 32]), kp.sign(&U256::ZERO));
        assert_eq!(open.previous(), None);
        assert!(open.source().is_some());

        let change = Block::new_change(U256([1u8; 32]), U256([2u8; 32]), kp.sign(&U256::ZERO));
        assert!(change.source().is_none());
        assert!(change.previous().is_some());
    }
}
