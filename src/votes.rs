//! Vote tallying (§4.4): aggregating representative votes for a
//! contested root into a weighted winner, for the external consensus
//! layer this crate does not itself implement.
//!
//! A [`Votes`] tracks, per root, the most recent vote seen from each
//! representative (by sequence number) and can tally the weight behind
//! each candidate block on demand. This crate does no networking or
//! quorum logic -- it only answers "given what I've been told, who is
//! winning, and by how much."

use std::collections::HashMap;

use crate::ledger::Ledger;
use crate::storage::{LedgerStore, StoreError};
use crate::types::{Account, Amount, Block, BlockHash, Signature};

/// A single representative's vote for a block at some root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vote {
    pub account: Account,
    pub signature: Signature,
    /// Strictly increasing per representative; a new vote only replaces
    /// an old one for the same root if its sequence number is greater.
    pub sequence: u64,
    pub block: Block,
}

impl Vote {
    /// The hash a vote's signature covers: `SHA3-256(sequence ‖ block
    /// hash)`, so replaying an old vote's signature against a new
    /// sequence number fails to verify.
    pub fn hash(&self) -> BlockHash {
        crate::crypto::sha3_256_concat(&[&self.sequence.to_be_bytes(), &self.block.hash().to_be_bytes()])
    }

    fn verify(&self) -> bool {
        crate::crypto::sign::verify(&self.account, &self.hash(), &self.signature)
    }
}

/// Tracks competing votes for the blocks rooted at a single contested
/// hash, and tallies representative weight behind each candidate.
pub struct Votes<'a, S> {
    ledger: &'a Ledger<S>,
    root: BlockHash,
    /// The most recent winner by weight, cached from the last tally.
    last_winner: Option<Block>,
    sequence: u64,
    /// account -> (sequence, block) of the most recent vote accepted
    /// from that representative.
    rep_votes: HashMap<Account, (u64, Block)>,
}

impl<'a, S: LedgerStore> Votes<'a, S> {
    /// Opens a vote tally for `root`, seeded with `first` as both the
    /// initial winner and the first vote (as if `first.account` had
    /// voted for its own starting block at sequence 0).
    pub fn new(ledger: &'a Ledger<S>, root: BlockHash, first: Block) -> Self {
        let mut rep_votes = HashMap::new();
        if let Ok(Some(account)) = ledger.account(&root) {
            rep_votes.insert(account, (0, first.clone()));
        }
        Votes {
            ledger,
            root,
            last_winner: Some(first),
            sequence: 0,
            rep_votes,
        }
    }

    pub fn root(&self) -> BlockHash {
        self.root
    }

    /// Records `vote` if its signature verifies and it is newer than
    /// any vote already seen from that representative. Returns whether
    /// the vote was accepted.
    pub fn vote(&mut self, vote: &Vote) -> Result<bool, StoreError> {
        if !vote.verify() {
            return Ok(false);
        }
        if self.ledger.root(&vote.block)? != self.root {
            return Ok(false);
        }
        let replace = match self.rep_votes.get(&vote.account) {
            Some((existing_seq, _)) => vote.sequence > *existing_seq,
            None => true,
        };
        if replace {
            self.rep_votes.insert(vote.account, (vote.sequence, vote.block.clone()));
            self.sequence = self.sequence.max(vote.sequence);
        }
        Ok(replace)
    }

    /// Tallies weight per candidate block hash and returns the current
    /// winner along with its total delegated weight, breaking ties in
    /// favor of whichever candidate was the winner last time this was
    /// called.
    pub fn winner(&mut self) -> Result<(Block, Amount), StoreError> {
        let mut tally: HashMap<BlockHash, (Amount, Block)> = HashMap::new();
        for (account, (_, block)) in &self.rep_votes {
            let weight = self.ledger.weight(account)?;
            let hash = block.hash();
            let entry = tally.entry(hash).or_insert((Amount::ZERO, block.clone()));
            entry.0 = entry.0.saturating_add(&weight);
        }

        let last_winner_hash = self.last_winner.as_ref().map(Block::hash);
        let mut best: Option<(Amount, Block)> = None;
        for (hash, candidate) in tally {
            let is_better = match &best {
                None => true,
                Some((best_weight, best_block)) => match candidate.0.cmp(best_weight) {
                    std::cmp::Ordering::Greater => true,
                    std::cmp::Ordering::Less => false,
                    std::cmp::Ordering::Equal => Some(hash) == last_winner_hash && Some(best_block.hash()) != last_winner_hash,
                },
            };
            if is_better {
                best = Some(candidate);
            }
        }

        let (weight, block) = best
            .or_else(|| self.last_winner.clone().map(|b| (Amount::ZERO, b)))
            .ok_or(StoreError::MissingBlock)?;
        self.last_winner = Some(block.clone());
        Ok((block, weight))
    }

    /// How much additional weight a new candidate would need to flip
    /// the current winner: half the total weight cast, minus the
    /// current winner's tally (zero if the winner already clears that
    /// bar). Mirrors the reference implementation's supermajority
    /// check for accepting a late vote as decisive.
    pub fn flip_threshold(&mut self) -> Result<Amount, StoreError> {
        let mut total = Amount::ZERO;
        for account in self.rep_votes.keys() {
            total = total.saturating_add(&self.ledger.weight(account)?);
        }
        let (_, winner_weight) = self.winner()?;
        let half = total.checked_div_by_two();
        Ok(half.saturating_sub(&winner_weight))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::sign::Keypair;
    use crate::ledger::GenesisConfig;
    use crate::storage::{LedgerStore, MemLedgerStore, StoreOp};

    fn genesis_ledger() -> (Ledger<MemLedgerStore>, Keypair) {
        let genesis_key = Keypair::generate();
        let placeholder_source = crate::primitives::U256([9u8; 32]);
        let unsigned = Block::new_open(genesis_key.public(), placeholder_source, crate::primitives::U512::ZERO);
        let signature = genesis_key.sign(&unsigned.hash());
        let genesis_block = Block::new_open(genesis_key.public(), placeholder_source, signature);
        let genesis = GenesisConfig {
            account: genesis_key.public(),
            genesis_block,
            balance: crate::primitives::U256([0xffu8; 32]),
        };
        let ledger = Ledger::open(MemLedgerStore::new(), genesis).unwrap();
        (ledger, genesis_key)
    }

    fn signed_vote(voter: &Keypair, sequence: u64, block: Block) -> Vote {
        let mut vote = Vote {
            account: voter.public(),
            signature: crate::primitives::U512::ZERO,
            sequence,
            block,
        };
        vote.signature = voter.sign(&vote.hash());
        vote
    }

    #[test]
    fn a_single_voting_reps_weight_becomes_the_tally() {
        let (mut ledger, genesis_key) = genesis_ledger();
        let root = ledger.latest(&genesis_key.public()).unwrap().unwrap();
        let candidate = Block::new_change(genesis_key.public(), root, crate::primitives::U512::ZERO);

        ledger
            .store_mut()
            .apply(vec![StoreOp::PutWeight(genesis_key.public(), crate::primitives::U256([5u8; 32]))])
            .unwrap();

        let mut votes = Votes::new(&ledger, root, candidate.clone());
        let (winner, weight) = votes.winner().unwrap();
        assert_eq!(winner.hash(), candidate.hash());
        assert_eq!(weight, crate::primitives::U256([5u8; 32]));
    }

    #[test]
    fn a_newer_sequence_replaces_an_older_vote_from_the_same_rep() {
        let (ledger, genesis_key) = genesis_ledger();
        let root = ledger.latest(&genesis_key.public()).unwrap().unwrap();
        let first = Block::new_change(genesis_key.public(), root, crate::primitives::U512::ZERO);
        let second = Block::new_change(Keypair::generate().public(), root, crate::primitives::U512::ZERO);

        let mut votes = Votes::new(&ledger, root, first.clone());
        let old_vote = signed_vote(&genesis_key, 1, second.clone());
        assert!(votes.vote(&old_vote).unwrap());

        let stale_vote = signed_vote(&genesis_key, 0, first.clone());
        assert!(!votes.vote(&stale_vote).unwrap());
    }

    #[test]
    fn a_tie_is_broken_in_favor_of_the_tracked_last_winner() {
        let (mut ledger, genesis_key) = genesis_ledger();
        let root = ledger.latest(&genesis_key.public()).unwrap().unwrap();
        let seeded_winner = Block::new_change(genesis_key.public(), root, crate::primitives::U512::ZERO);
        let challenger_key = Keypair::generate();
        let challenger_block = Block::new_change(challenger_key.public(), root, crate::primitives::U512::ZERO);

        let tied_weight = crate::primitives::U256([3u8; 32]);
        ledger
            .store_mut()
            .apply(vec![
                StoreOp::PutWeight(genesis_key.public(), tied_weight),
                StoreOp::PutWeight(challenger_key.public(), tied_weight),
            ])
            .unwrap();

        let mut votes = Votes::new(&ledger, root, seeded_winner.clone());
        let challenger_vote = signed_vote(&challenger_key, 1, challenger_block.clone());
        assert!(votes.vote(&challenger_vote).unwrap());

        let (winner, weight) = votes.winner().unwrap();
        assert_eq!(winner.hash(), seeded_winner.hash());
        assert_eq!(weight, tied_weight);
    }

    #[test]
    fn a_vote_for_a_different_root_is_rejected() {
        let (ledger, genesis_key) = genesis_ledger();
        let root = ledger.latest(&genesis_key.public()).unwrap().unwrap();
        let first = Block::new_change(genesis_key.public(), root, crate::primitives::U512::ZERO);
        let mut votes = Votes::new(&ledger, root, first);

        let other_root = crate::primitives::U256([0x42u8; 32]);
        let off_topic = Block::new_change(genesis_key.public(), other_root, crate::primitives::U512::ZERO);
        let vote = signed_vote(&genesis_key, 1, off_topic);
        assert!(!votes.vote(&vote).unwrap());
    }
}
