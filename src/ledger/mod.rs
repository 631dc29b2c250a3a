//! The ledger state machine (§4.3): validates and applies blocks,
//! derives balances/weights/representatives, and supports rollback.
//!
//! [`Ledger<S>`] owns its [`LedgerStore`] behind a private field, the
//! same shape as the teacher's `ConsensusEngine<S, V, F>` -- a single
//! writer serializes calls to [`Ledger::process`] (§5), and readers go
//! through the plain accessor methods below.

mod checksum;
mod process;
mod result;
mod rollback;

pub use result::ProcessResult;

use crate::crypto;
use crate::storage::{LedgerStore, StoreError, StoreOp};
use crate::types::{Account, Amount, Block, BlockHash, Frontier};

/// The genesis state every ledger is constructed with (§9: "no hidden
/// singletons" -- callers must supply this explicitly, the same way a
/// real network's genesis block is a fixed constant chosen once at
/// network creation rather than derived at runtime).
///
/// `genesis_block` has no real predecessor -- it funds itself, the way
/// the original reference ledger seeds its genesis account directly
/// rather than by processing a send nobody sent. It must be an
/// [`Block::Open`] signed by `account`'s key; `Ledger::open` inserts it
/// verbatim rather than running it through [`Ledger::process`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenesisConfig {
    pub account: Account,
    pub genesis_block: Block,
    /// Total outstanding supply, fixed at genesis.
    pub balance: Amount,
}

/// The ledger state machine, generic over a [`LedgerStore`] backend.
pub struct Ledger<S> {
    store: S,
    genesis: GenesisConfig,
}

impl<S: LedgerStore> Ledger<S> {
    /// Opens a ledger over `store`, inserting the genesis block and its
    /// frontier directly if this is a fresh store that has never seen
    /// it before.
    pub fn open(mut store: S, genesis: GenesisConfig) -> Result<Self, StoreError> {
        if !store.frontier_exists(&genesis.account)? {
            let hash = genesis.genesis_block.hash();
            let representative = genesis.genesis_block.representative().unwrap_or(genesis.account);
            let frontier = Frontier {
                head: hash,
                representative,
                balance: genesis.balance,
                time: store.now(),
            };
            let checksum_op = checksum::toggle(&store, &genesis.account, &hash)?;
            let existing_weight = store.get_weight(&representative)?;
            let new_weight = existing_weight.checked_add(&genesis.balance).unwrap_or(Amount::MAX);
            store.apply(vec![
                StoreOp::PutBlock(hash, genesis.genesis_block.clone()),
                StoreOp::PutBlockAccount(hash, genesis.account),
                StoreOp::PutFrontier(genesis.account, frontier),
                StoreOp::PutWeight(representative, new_weight),
                checksum_op,
            ])?;
        }
        Ok(Self { store, genesis })
    }

    pub fn genesis(&self) -> &GenesisConfig {
        &self.genesis
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The account that owns the block at `hash`, via the internal
    /// block-account index populated by `process`.
    pub fn account(&self, hash: &BlockHash) -> Result<Option<Account>, StoreError> {
        self.store.get_block_account(hash)
    }

    /// `amount(hash)`: for a send, `prev_balance - send.balance`; for a
    /// receive/open, the amount of the referenced send (§4.3).
    pub fn amount(&self, hash: &BlockHash) -> Result<Amount, StoreError> {
        let block = self.store.get_block(hash)?.ok_or(StoreError::MissingBlock)?;
        match &block {
            Block::Send(send) => {
                let prev_balance = self.balance(&send.hashables.previous)?;
                Ok(prev_balance.checked_sub(&send.hashables.balance).unwrap_or(Amount::ZERO))
            }
            Block::Receive(r) => self.amount(&r.hashables.source),
            Block::Open(o) => self.amount(&o.hashables.source),
            Block::Change(_) => Ok(Amount::ZERO),
        }
    }

    /// `balance(hash)`: the chain balance at `hash` (§4.3). Pure
    /// function of the `blocks` table -- independent of whether `hash`
    /// is any account's current frontier head.
    pub fn balance(&self, hash: &BlockHash) -> Result<Amount, StoreError> {
        let block = self.store.get_block(hash)?.ok_or(StoreError::MissingBlock)?;
        match &block {
            Block::Send(send) => Ok(send.hashables.balance),
            Block::Receive(r) => {
                let prev_balance = self.balance(&r.hashables.previous)?;
                let source_amount = self.amount(&r.hashables.source)?;
                Ok(prev_balance.checked_add(&source_amount).unwrap_or(Amount::MAX))
            }
            Block::Open(o) => self.amount(&o.hashables.source),
            Block::Change(c) => self.balance(&c.hashables.previous),
        }
    }

    /// The frontier balance of `account` (zero if never opened).
    pub fn account_balance(&self, account: &Account) -> Result<Amount, StoreError> {
        Ok(self.store.get_frontier(account)?.map(|f| f.balance).unwrap_or(Amount::ZERO))
    }

    /// The aggregate voting weight delegated to `account`.
    pub fn weight(&self, account: &Account) -> Result<Amount, StoreError> {
        self.store.get_weight(account)
    }

    /// The current head block hash of `account`'s chain, if opened.
    pub fn latest(&self, account: &Account) -> Result<Option<BlockHash>, StoreError> {
        Ok(self.store.get_frontier(account)?.map(|f| f.head))
    }

    /// The representative delegated to by the chain containing `hash`,
    /// using the frontier's cached value when `hash` is a chain head.
    pub fn representative(&self, hash: &BlockHash) -> Result<Account, StoreError> {
        if let Some(account) = self.store.get_block_account(hash)?
            && let Some(frontier) = self.store.get_frontier(&account)?
            && frontier.head == *hash
        {
            return Ok(frontier.representative);
        }
        self.representative_calculated(hash)
    }

    /// Walks backward from `hash` until it finds a block that explicitly
    /// sets a representative (open or change), per §4.3.
    pub fn representative_calculated(&self, hash: &BlockHash) -> Result<Account, StoreError> {
        let mut current = *hash;
        loop {
            let block = self.store.get_block(&current)?.ok_or(StoreError::MissingBlock)?;
            if let Some(rep) = block.representative() {
                return Ok(rep);
            }
            current = block.previous().ok_or(StoreError::CorruptedValue {
                table: "blocks",
                reason: "chain ended without a representative-setting block",
            })?;
        }
    }

    /// Total outstanding supply: the sum of all live frontier balances.
    pub fn supply(&self) -> Result<Amount, StoreError> {
        let mut total = Amount::ZERO;
        for (_, frontier) in self.store.frontier_iter(None) {
            total = total.checked_add(&frontier.balance).unwrap_or(Amount::MAX);
        }
        Ok(total)
    }

    /// `root(block)`: `block.previous()` for send/receive/change; for
    /// open, the account being opened (derived from the referenced
    /// send's `destination`, per §4.2/§4.3).
    pub fn root(&self, block: &Block) -> Result<BlockHash, StoreError> {
        match block {
            Block::Send(b) => Ok(b.hashables.previous),
            Block::Receive(b) => Ok(b.hashables.previous),
            Block::Change(b) => Ok(b.hashables.previous),
            Block::Open(o) => {
                let source = self.store.get_block(&o.hashables.source)?.ok_or(StoreError::MissingBlock)?;
                match source {
                    Block::Send(s) => Ok(s.hashables.destination),
                    _ => Err(StoreError::CorruptedValue {
                        table: "blocks",
                        reason: "open's source is not a send",
                    }),
                }
            }
        }
    }

    /// Process a single block, per the rules of §4.3. On any outcome
    /// other than `Progress` (and `Fork`, which writes the losing block
    /// to `forks`), the store is left completely unchanged.
    pub fn process(&mut self, block: Block) -> Result<ProcessResult, StoreError> {
        process::process(self, block)
    }

    /// Rolls back the account chain down through and including `target`,
    /// undoing each block's effects in reverse order (§4.3).
    pub fn rollback(&mut self, target: BlockHash) -> Result<(), StoreError> {
        rollback::rollback(self, target)
    }

    fn verify(&self, account: &Account, hash: &BlockHash, signature: &crate::types::Signature) -> bool {
        crypto::sign::verify(account, hash, signature)
    }
}
