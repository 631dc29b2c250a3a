//! In-memory implementation of [`LedgerStore`], used by unit tests and
//! anywhere a durable backend isn't required.
//!
//! `addresses` and `blocks` use `BTreeMap` rather than `HashMap` so
//! iteration order matches the lexicographic byte ordering the store
//! contract requires (§4.2) for free, mirroring the teacher's
//! `HashMap`-backed `InMemoryBlockStore` generalized to a sorted map.

use std::collections::{BTreeMap, HashMap};

use crate::storage::{LedgerStore, StoreError, StoreOp};
use crate::types::{Account, Amount, Block, BlockHash, Checksum, Frontier, PendingEntry};

/// In-memory implementation of [`LedgerStore`].
#[derive(Default)]
pub struct MemLedgerStore {
    addresses: BTreeMap<Account, Frontier>,
    blocks: BTreeMap<BlockHash, Block>,
    pending: HashMap<BlockHash, PendingEntry>,
    representation: HashMap<Account, Amount>,
    forks: HashMap<BlockHash, Block>,
    bootstrap: HashMap<BlockHash, Block>,
    checksum: HashMap<(u64, u8), Checksum>,
    block_account: HashMap<BlockHash, Account>,
}

impl MemLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemLedgerStore {
    fn get_frontier(&self, account: &Account) -> Result<Option<Frontier>, StoreError> {
        Ok(self.addresses.get(account).copied())
    }

    fn frontier_iter(&self, start: Option<&Account>) -> Vec<(Account, Frontier)> {
        match start {
            Some(key) => self.addresses.range(key..).map(|(k, v)| (*k, *v)).collect(),
            None => self.addresses.iter().map(|(k, v)| (*k, *v)).collect(),
        }
    }

    fn get_block(&self, hash: &BlockHash) -> Result<Option<Block>, StoreError> {
        Ok(self.blocks.get(hash).cloned())
    }

    fn block_iter(&self, start: Option<&BlockHash>) -> Vec<(BlockHash, Block)> {
        match start {
            Some(key) => self.blocks.range(key..).map(|(k, v)| (*k, v.clone())).collect(),
            None => self.blocks.iter().map(|(k, v)| (*k, v.clone())).collect(),
        }
    }

    fn get_pending(&self, hash: &BlockHash) -> Result<Option<PendingEntry>, StoreError> {
        Ok(self.pending.get(hash).copied())
    }

    fn get_weight_raw(&self, account: &Account) -> Result<Option<Amount>, StoreError> {
        Ok(self.representation.get(account).copied())
    }

    fn get_fork(&self, root: &BlockHash) -> Result<Option<Block>, StoreError> {
        Ok(self.forks.get(root).cloned())
    }

    fn bootstrap_get(&self, hash: &BlockHash) -> Result<Option<Block>, StoreError> {
        Ok(self.bootstrap.get(hash).cloned())
    }

    fn bootstrap_put(&mut self, hash: &BlockHash, block: &Block) -> Result<(), StoreError> {
        self.bootstrap.insert(*hash, block.clone());
        Ok(())
    }

    fn bootstrap_del(&mut self, hash: &BlockHash) -> Result<(), StoreError> {
        self.bootstrap.remove(hash);
        Ok(())
    }

    fn get_checksum(&self, region: u64, depth: u8) -> Result<Option<Checksum>, StoreError> {
        Ok(self.checksum.get(&(region, depth)).copied())
    }

    fn get_block_account(&self, hash: &BlockHash) -> Result<Option<Account>, StoreError> {
        Ok(self.block_account.get(hash).copied())
    }

    fn apply(&mut self, ops: Vec<StoreOp>) -> Result<(), StoreError> {
        for op in ops {
            match op {
                StoreOp::PutFrontier(account, frontier) => {
                    self.addresses.insert(account, frontier);
                }
                StoreOp::DelFrontier(account) => {
                    self.addresses.remove(&account);
                }
                StoreOp::PutBlock(hash, block) => {
                    self.blocks.insert(hash, block);
                }
                StoreOp::DelBlock(hash) => {
                    self.blocks.remove(&hash);
                }
                StoreOp::PutPending(hash, entry) => {
                    self.pending.insert(hash, entry);
                }
                StoreOp::DelPending(hash) => {
                    self.pending.remove(&hash);
                }
                StoreOp::PutWeight(account, weight) => {
                    self.representation.insert(account, weight);
                }
                StoreOp::PutFork(root, block) => {
                    self.forks.insert(root, block);
                }
                StoreOp::PutChecksum(region, depth, sum) => {
                    self.checksum.insert((region, depth), sum);
                }
                StoreOp::PutBlockAccount(hash, account) => {
                    self.block_account.insert(hash, account);
                }
                StoreOp::DelBlockAccount(hash) => {
                    self.block_account.remove(&hash);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::U256;

    #[test]
    fn apply_is_all_or_nothing_within_one_call() {
        let mut store = MemLedgerStore::new();
        let account = U256([1u8; 32]);
        let frontier = Frontier {
            head: U256([2u8; 32]),
            representative: account,
            balance: U256([3u8; 32]),
            time: 42,
        };
        store
            .apply(vec![
                StoreOp::PutFrontier(account, frontier),
                StoreOp::PutWeight(account, frontier.balance),
            ])
            .unwrap();
        assert_eq!(store.get_frontier(&account).unwrap(), Some(frontier));
        assert_eq!(store.get_weight(&account).unwrap(), frontier.balance);
    }

    #[test]
    fn frontier_iter_is_lexicographically_ordered() {
        let mut store = MemLedgerStore::new();
        let a = U256([1u8; 32]);
        let b = U256([2u8; 32]);
        let f = Frontier {
            head: U256::ZERO,
            representative: a,
            balance: U256::ZERO,
            time: 0,
        };
        store
            .apply(vec![StoreOp::PutFrontier(b, f), StoreOp::PutFrontier(a, f)])
            .unwrap();
        let order: Vec<Account> = store.frontier_iter(None).into_iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec![a, b]);
    }
}
