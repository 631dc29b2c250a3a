//! RocksDB-backed [`LedgerStore`].
//!
//! One column family per logical table in §4.2, plus the internal
//! `block_account` index (see the module doc on [`crate::storage`]).
//! Keys and values follow the byte-exact layouts in §4.2/§4.4 so an
//! on-disk ledger written by this store is readable by any conformant
//! implementation. Every [`LedgerStore::apply`] call commits through a
//! single `rocksdb::WriteBatch`, giving the atomicity §4.2 requires for
//! `Ledger::process`.

use std::{path::Path, sync::Arc};

use rocksdb::{BoundColumnFamily, ColumnFamilyDescriptor, DB, Options, WriteBatch};

use crate::primitives::U256;
use crate::storage::{LedgerStore, StoreError, StoreOp};
use crate::types::{Account, Amount, Block, BlockHash, Checksum, Frontier, PendingEntry};

const CF_ADDRESSES: &str = "addresses";
const CF_BLOCKS: &str = "blocks";
const CF_PENDING: &str = "pending";
const CF_REPRESENTATION: &str = "representation";
const CF_FORKS: &str = "forks";
const CF_BOOTSTRAP: &str = "bootstrap";
const CF_CHECKSUM: &str = "checksum";
const CF_BLOCK_ACCOUNT: &str = "block_account";

/// Configuration for [`RocksDbLedgerStore`].
#[derive(Clone, Debug)]
pub struct RocksDbConfig {
    /// Filesystem path to the RocksDB database directory.
    pub path: String,
    /// Whether to create the database and missing column families if they
    /// do not yet exist.
    pub create_if_missing: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "data/ledger-db".to_string(),
            create_if_missing: true,
        }
    }
}

/// RocksDB-backed implementation of [`LedgerStore`].
pub struct RocksDbLedgerStore {
    db: DB,
}

impl RocksDbLedgerStore {
    /// Opens (or creates) a RocksDB-backed ledger store at the given path.
    pub fn open(cfg: &RocksDbConfig) -> Result<Self, StoreError> {
        let path = Path::new(&cfg.path);

        let mut opts = Options::default();
        opts.create_if_missing(cfg.create_if_missing);
        opts.create_missing_column_families(cfg.create_if_missing);

        let cfs = vec![
            ColumnFamilyDescriptor::new("default", Options::default()),
            ColumnFamilyDescriptor::new(CF_ADDRESSES, Options::default()),
            ColumnFamilyDescriptor::new(CF_BLOCKS, Options::default()),
            ColumnFamilyDescriptor::new(CF_PENDING, Options::default()),
            ColumnFamilyDescriptor::new(CF_REPRESENTATION, Options::default()),
            ColumnFamilyDescriptor::new(CF_FORKS, Options::default()),
            ColumnFamilyDescriptor::new(CF_BOOTSTRAP, Options::default()),
            ColumnFamilyDescriptor::new(CF_CHECKSUM, Options::default()),
            ColumnFamilyDescriptor::new(CF_BLOCK_ACCOUNT, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cfs)?;
        Ok(Self { db })
    }

    fn cf(&self, name: &'static str) -> Result<Arc<BoundColumnFamily<'_>>, StoreError> {
        self.db.cf_handle(name).ok_or(StoreError::MissingColumnFamily(name))
    }

    fn decode_frontier(table: &'static str, bytes: &[u8]) -> Result<Frontier, StoreError> {
        Frontier::deserialize(bytes).map_err(|_| StoreError::CorruptedValue {
            table,
            reason: "malformed frontier bytes",
        })
    }

    fn decode_block(table: &'static str, bytes: &[u8]) -> Result<Block, StoreError> {
        Block::deserialize(bytes).map_err(|_| StoreError::CorruptedValue {
            table,
            reason: "malformed block bytes",
        })
    }

    fn decode_pending(table: &'static str, bytes: &[u8]) -> Result<PendingEntry, StoreError> {
        PendingEntry::deserialize(bytes).map_err(|_| StoreError::CorruptedValue {
            table,
            reason: "malformed pending entry bytes",
        })
    }

    fn decode_u256(table: &'static str, bytes: &[u8]) -> Result<U256, StoreError> {
        if bytes.len() != 32 {
            return Err(StoreError::CorruptedValue {
                table,
                reason: "expected 32 raw bytes",
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(bytes);
        Ok(U256(arr))
    }

    fn checksum_key(region: u64, depth: u8) -> [u8; 9] {
        let mut key = [0u8; 9];
        key[0..8].copy_from_slice(&region.to_be_bytes());
        key[8] = depth;
        key
    }
}

impl LedgerStore for RocksDbLedgerStore {
    fn get_frontier(&self, account: &Account) -> Result<Option<Frontier>, StoreError> {
        let cf = self.cf(CF_ADDRESSES)?;
        match self.db.get_cf(&cf, account.to_be_bytes())? {
            Some(bytes) => Ok(Some(Self::decode_frontier(CF_ADDRESSES, &bytes)?)),
            None => Ok(None),
        }
    }

    fn frontier_iter(&self, start: Option<&Account>) -> Vec<(Account, Frontier)> {
        let Ok(cf) = self.cf(CF_ADDRESSES) else {
            return Vec::new();
        };
        let mode = match start {
            Some(key) => rocksdb::IteratorMode::From(&key.0, rocksdb::Direction::Forward),
            None => rocksdb::IteratorMode::Start,
        };
        self.db
            .iterator_cf(&cf, mode)
            .filter_map(|item| item.ok())
            .filter_map(|(k, v)| {
                let account = Self::decode_u256(CF_ADDRESSES, &k).ok()?;
                let frontier = Self::decode_frontier(CF_ADDRESSES, &v).ok()?;
                Some((account, frontier))
            })
            .collect()
    }

    fn get_block(&self, hash: &BlockHash) -> Result<Option<Block>, StoreError> {
        let cf = self.cf(CF_BLOCKS)?;
        match self.db.get_cf(&cf, hash.to_be_bytes())? {
            Some(bytes) => Ok(Some(Self::decode_block(CF_BLOCKS, &bytes)?)),
            None => Ok(None),
        }
    }

    fn block_iter(&self, start: Option<&BlockHash>) -> Vec<(BlockHash, Block)> {
        let Ok(cf) = self.cf(CF_BLOCKS) else {
            return Vec::new();
        };
        let mode = match start {
            Some(key) => rocksdb::IteratorMode::From(&key.0, rocksdb::Direction::Forward),
            None => rocksdb::IteratorMode::Start,
        };
        self.db
            .iterator_cf(&cf, mode)
            .filter_map(|item| item.ok())
            .filter_map(|(k, v)| {
                let hash = Self::decode_u256(CF_BLOCKS, &k).ok()?;
                let block = Self::decode_block(CF_BLOCKS, &v).ok()?;
                Some((hash, block))
            })
            .collect()
    }

    fn get_pending(&self, hash: &BlockHash) -> Result<Option<PendingEntry>, StoreError> {
        let cf = self.cf(CF_PENDING)?;
        match self.db.get_cf(&cf, hash.to_be_bytes())? {
            Some(bytes) => Ok(Some(Self::decode_pending(CF_PENDING, &bytes)?)),
            None => Ok(None),
        }
    }

    fn get_weight_raw(&self, account: &Account) -> Result<Option<Amount>, StoreError> {
        let cf = self.cf(CF_REPRESENTATION)?;
        match self.db.get_cf(&cf, account.to_be_bytes())? {
            Some(bytes) => Ok(Some(Self::decode_u256(CF_REPRESENTATION, &bytes)?)),
            None => Ok(None),
        }
    }

    fn get_fork(&self, root: &BlockHash) -> Result<Option<Block>, StoreError> {
        let cf = self.cf(CF_FORKS)?;
        match self.db.get_cf(&cf, root.to_be_bytes())? {
            Some(bytes) => Ok(Some(Self::decode_block(CF_FORKS, &bytes)?)),
            None => Ok(None),
        }
    }

    fn bootstrap_get(&self, hash: &BlockHash) -> Result<Option<Block>, StoreError> {
        let cf = self.cf(CF_BOOTSTRAP)?;
        match self.db.get_cf(&cf, hash.to_be_bytes())? {
            Some(bytes) => Ok(Some(Self::decode_block(CF_BOOTSTRAP, &bytes)?)),
            None => Ok(None),
        }
    }

    fn bootstrap_put(&mut self, hash: &BlockHash, block: &Block) -> Result<(), StoreError> {
        let cf = self.cf(CF_BOOTSTRAP)?;
        self.db.put_cf(&cf, hash.to_be_bytes(), block.serialize())?;
        Ok(())
    }

    fn bootstrap_del(&mut self, hash: &BlockHash) -> Result<(), StoreError> {
        let cf = self.cf(CF_BOOTSTRAP)?;
        self.db.delete_cf(&cf, hash.to_be_bytes())?;
        Ok(())
    }

    fn get_checksum(&self, region: u64, depth: u8) -> Result<Option<Checksum>, StoreError> {
        let cf = self.cf(CF_CHECKSUM)?;
        match self.db.get_cf(&cf, Self::checksum_key(region, depth))? {
            Some(bytes) => Ok(Some(Self::decode_u256(CF_CHECKSUM, &bytes)?)),
            None => Ok(None),
        }
    }

    fn get_block_account(&self, hash: &BlockHash) -> Result<Option<Account>, StoreError> {
        let cf = self.cf(CF_BLOCK_ACCOUNT)?;
        match self.db.get_cf(&cf, hash.to_be_bytes())? {
            Some(bytes) => Ok(Some(Self::decode_u256(CF_BLOCK_ACCOUNT, &bytes)?)),
            None => Ok(None),
        }
    }

    fn apply(&mut self, ops: Vec<StoreOp>) -> Result<(), StoreError> {
        let mut batch = WriteBatch::default();
        for op in ops {
            match op {
                StoreOp::PutFrontier(account, frontier) => {
                    let cf = self.cf(CF_ADDRESSES)?;
                    batch.put_cf(&cf, account.to_be_bytes(), frontier.serialize());
                }
                StoreOp::DelFrontier(account) => {
                    let cf = self.cf(CF_ADDRESSES)?;
                    batch.delete_cf(&cf, account.to_be_bytes());
                }
                StoreOp::PutBlock(hash, block) => {
                    let cf = self.cf(CF_BLOCKS)?;
                    batch.put_cf(&cf, hash.to_be_bytes(), block.serialize());
                }
                StoreOp::DelBlock(hash) => {
                    let cf = self.cf(CF_BLOCKS)?;
                    batch.delete_cf(&cf, hash.to_be_bytes());
                }
                StoreOp::PutPending(hash, entry) => {
                    let cf = self.cf(CF_PENDING)?;
                    batch.put_cf(&cf, hash.to_be_bytes(), entry.serialize());
                }
                StoreOp::DelPending(hash) => {
                    let cf = self.cf(CF_PENDING)?;
                    batch.delete_cf(&cf, hash.to_be_bytes());
                }
                StoreOp::PutWeight(account, weight) => {
                    let cf = self.cf(CF_REPRESENTATION)?;
                    batch.put_cf(&cf, account.to_be_bytes(), weight.to_be_bytes());
                }
                StoreOp::PutFork(root, block) => {
                    let cf = self.cf(CF_FORKS)?;
                    batch.put_cf(&cf, root.to_be_bytes(), block.serialize());
                }
                StoreOp::PutChecksum(region, depth, sum) => {
                    let cf = self.cf(CF_CHECKSUM)?;
                    batch.put_cf(&cf, Self::checksum_key(region, depth), sum.to_be_bytes());
                }
                StoreOp::PutBlockAccount(hash, account) => {
                    let cf = self.cf(CF_BLOCK_ACCOUNT)?;
                    batch.put_cf(&cf, hash.to_be_bytes(), account.to_be_bytes());
                }
                StoreOp::DelBlockAccount(hash) => {
                    let cf = self.cf(CF_BLOCK_ACCOUNT)?;
                    batch.delete_cf(&cf, hash.to_be_bytes());
                }
            }
        }
        self.db.write(batch)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use tempfile::TempDir;

    fn open_tmp() -> (TempDir, RocksDbLedgerStore) {
        let tmp = TempDir::new().expect("create temp dir");
        let cfg = RocksDbConfig {
            path: tmp.path().to_string_lossy().to_string(),
            create_if_missing: true,
        };
        let store = RocksDbLedgerStore::open(&cfg).expect("open rocksdb");
        (tmp, store)
    }

    #[test]
    fn frontier_roundtrip() {
        let (_tmp, mut store) = open_tmp();
        let account = U256([7u8; 32]);
        let frontier = Frontier {
            head: U256([1u8; 32]),
            representative: account,
            balance: U256([9u8; 32]),
            time: 1_700_000_000,
        };
        store
            .apply(vec![StoreOp::PutFrontier(account, frontier)])
            .unwrap();
        assert_eq!(store.get_frontier(&account).unwrap(), Some(frontier));
    }

    #[test]
    fn block_roundtrip_and_del() {
        let (_tmp, mut store) = open_tmp();
        let kp = Keypair::generate();
        let block = Block::new_change(U256([1u8; 32]), U256([2u8; 32]), kp.sign(&U256::ZERO));
        let hash = block.hash();
        store.apply(vec![StoreOp::PutBlock(hash, block.clone())]).unwrap();
        assert_eq!(store.get_block(&hash).unwrap(), Some(block));

        store.apply(vec![StoreOp::DelBlock(hash)]).unwrap();
        assert_eq!(store.get_block(&hash).unwrap(), None);
    }

    #[test]
    fn apply_batches_multiple_tables_atomically() {
        let (_tmp, mut store) = open_tmp();
        let account = U256([3u8; 32]);
        let weight = U256([4u8; 32]);
        store
            .apply(vec![
                StoreOp::PutWeight(account, weight),
                StoreOp::PutChecksum(42, 0, U256([5u8; 32])),
            ])
            .unwrap();
        assert_eq!(store.get_weight(&account).unwrap(), weight);
        assert_eq!(store.get_checksum(42, 0).unwrap(), Some(U256([5u8; 32])));
    }

    #[test]
    fn frontier_iter_seeks_from_start_key() {
        let (_tmp, mut store) = open_tmp();
        let a = U256([1u8; 32]);
        let b = U256([2u8; 32]);
        let f = Frontier {
            head: U256::ZERO,
            representative: a,
            balance: U256::ZERO,
            time: 0,
        };
        store
            .apply(vec![StoreOp::PutFrontier(a, f), StoreOp::PutFrontier(b, f)])
            .unwrap();
        let from_b: Vec<Account> = store.frontier_iter(Some(&b)).into_iter().map(|(k, _)| k).collect();
        assert_eq!(from_b, vec![b]);
    }
}
