//! The seven-table persistent store that backs the ledger (§4.2).
//!
//! [`LedgerStore`] is the full schema: per-account frontiers, blocks,
//! pending sends, representative weights, fork evidence, unchecked
//! bootstrap blocks, and checksum regions. Two implementations are
//! provided: [`mem::MemLedgerStore`] for tests, and
//! [`rocksdb::RocksDbLedgerStore`] for durable, on-disk ledgers.
//!
//! A single `block_hash -> account` index rides alongside the seven
//! tables. It is not part of the external schema in §4.2 -- the
//! original reference implementation carried an equivalent internal
//! `successors` table for the same reason: reconstructing "which
//! account does this block belong to" from a bare hash is otherwise an
//! O(chain length) walk. See `DESIGN.md` for the full rationale.

pub mod mem;
pub mod rocksdb;

use crate::types::{Account, Amount, Block, BlockHash, Checksum, Frontier, PendingEntry};

pub use mem::MemLedgerStore;
pub use rocksdb::{RocksDbConfig, RocksDbLedgerStore};

/// Storage-level error type.
///
/// Per §7, persistent-store I/O errors are fatal at the ledger layer: a
/// `process()` or `rollback()` call that hits one aborts with no
/// mutations applied and bubbles the error to the caller.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("rocksdb error: {0}")]
    RocksDb(#[from] ::rocksdb::Error),
    #[error("missing column family: {0}")]
    MissingColumnFamily(&'static str),
    #[error("corrupted value in table {table}: {reason}")]
    CorruptedValue {
        table: &'static str,
        reason: &'static str,
    },
    #[error("no frontier for account")]
    MissingFrontier,
    #[error("no block for hash")]
    MissingBlock,
}

/// One mutation against one of the store's tables.
///
/// [`crate::ledger::Ledger::process`] and [`crate::ledger::Ledger::rollback`]
/// build up a list of these while they validate a block (a read-only
/// phase that can fail early without touching the store), then hand the
/// whole batch to [`LedgerStore::apply`] in one call so a backend can
/// commit it atomically (a RocksDB `WriteBatch`, for
/// [`RocksDbLedgerStore`]).
#[derive(Clone, Debug)]
pub enum StoreOp {
    PutFrontier(Account, Frontier),
    DelFrontier(Account),
    PutBlock(BlockHash, Block),
    DelBlock(BlockHash),
    PutPending(BlockHash, PendingEntry),
    DelPending(BlockHash),
    PutWeight(Account, Amount),
    PutFork(BlockHash, Block),
    PutChecksum(u64, u8, Checksum),
    PutBlockAccount(BlockHash, Account),
    DelBlockAccount(BlockHash),
}

/// The seven logical tables of §4.2, plus the internal block-account index.
pub trait LedgerStore {
    // -- addresses: account -> frontier --
    fn get_frontier(&self, account: &Account) -> Result<Option<Frontier>, StoreError>;
    fn frontier_exists(&self, account: &Account) -> Result<bool, StoreError> {
        Ok(self.get_frontier(account)?.is_some())
    }
    /// Ordered iteration over the `addresses` table, starting at `start`
    /// (inclusive) or at the beginning of the keyspace if `None`.
    fn frontier_iter(&self, start: Option<&Account>) -> Vec<(Account, Frontier)>;

    // -- blocks: hash -> block --
    fn get_block(&self, hash: &BlockHash) -> Result<Option<Block>, StoreError>;
    fn block_exists(&self, hash: &BlockHash) -> Result<bool, StoreError> {
        Ok(self.get_block(hash)?.is_some())
    }
    /// Ordered iteration over the `blocks` table, starting at `start`.
    fn block_iter(&self, start: Option<&BlockHash>) -> Vec<(BlockHash, Block)>;

    // -- pending: send hash -> pending entry --
    fn get_pending(&self, hash: &BlockHash) -> Result<Option<PendingEntry>, StoreError>;
    fn pending_exists(&self, hash: &BlockHash) -> Result<bool, StoreError> {
        Ok(self.get_pending(hash)?.is_some())
    }

    // -- representation: account -> aggregate weight --
    fn get_weight(&self, account: &Account) -> Result<Amount, StoreError> {
        Ok(self.get_weight_raw(account)?.unwrap_or(Amount::ZERO))
    }
    fn get_weight_raw(&self, account: &Account) -> Result<Option<Amount>, StoreError>;

    // -- forks: previous/root hash -> competing block --
    fn get_fork(&self, root: &BlockHash) -> Result<Option<Block>, StoreError>;
    fn fork_exists(&self, root: &BlockHash) -> Result<bool, StoreError> {
        Ok(self.get_fork(root)?.is_some())
    }

    // -- bootstrap: hash -> unchecked block, staged by the network layer --
    fn bootstrap_get(&self, hash: &BlockHash) -> Result<Option<Block>, StoreError>;
    fn bootstrap_put(&mut self, hash: &BlockHash, block: &Block) -> Result<(), StoreError>;
    fn bootstrap_del(&mut self, hash: &BlockHash) -> Result<(), StoreError>;
    fn bootstrap_exists(&self, hash: &BlockHash) -> Result<bool, StoreError> {
        Ok(self.bootstrap_get(hash)?.is_some())
    }

    // -- checksum: (region, depth) -> XOR accumulator --
    fn get_checksum(&self, region: u64, depth: u8) -> Result<Option<Checksum>, StoreError>;

    // -- internal: hash -> owning account, not part of the external schema --
    fn get_block_account(&self, hash: &BlockHash) -> Result<Option<Account>, StoreError>;

    /// Commits every op in `ops` as a single unit. Implementations must
    /// not leave a partially-applied batch visible to readers.
    fn apply(&mut self, ops: Vec<StoreOp>) -> Result<(), StoreError>;

    /// Wall-clock time in seconds since the epoch. Only used to stamp
    /// frontier timestamps; plays no role in validation (§4.2).
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
