//! `rollback()` (§4.3, §8 scenario 6): the left inverse of `process`.
//!
//! Walks an account's chain backward from its current head down through
//! and including `target`, undoing one block per step. Each step's new
//! frontier is recomputed from the block's `previous` via
//! [`Ledger::balance`]/[`Ledger::representative_calculated`] rather than
//! cached, so there is nothing to keep in sync across variants.
//!
//! This does not cascade into other accounts: rolling back a send whose
//! matching receive has already been applied elsewhere leaves that
//! receive in place. `balance`/`amount` stay correct either way since
//! they are pure functions of the `blocks` table, and nothing in §4.3
//! asks for cross-chain cascading.

use crate::ledger::{Ledger, checksum};
use crate::storage::{LedgerStore, StoreError, StoreOp};
use crate::types::{Account, Block, BlockHash, Frontier, PendingEntry};

pub fn rollback<S: LedgerStore>(ledger: &mut Ledger<S>, target: BlockHash) -> Result<(), StoreError> {
    let account = ledger
        .store
        .get_block_account(&target)?
        .ok_or(StoreError::MissingBlock)?;
    loop {
        let frontier = ledger.store.get_frontier(&account)?.ok_or(StoreError::MissingFrontier)?;
        let head = frontier.head;
        undo_one(ledger, &account, head)?;
        if head == target {
            return Ok(());
        }
    }
}

fn undo_one<S: LedgerStore>(ledger: &mut Ledger<S>, account: &Account, hash: BlockHash) -> Result<(), StoreError> {
    let block = ledger.store.get_block(&hash)?.ok_or(StoreError::MissingBlock)?;
    let checksum_op = checksum::toggle(&ledger.store, account, &hash)?;

    let ops = match &block {
        Block::Send(send) => {
            let previous = block.previous().expect("send always has a previous");
            let new_frontier = restored_frontier(ledger, &previous)?;
            let amount = new_frontier
                .balance
                .checked_sub(&send.hashables.balance)
                .unwrap_or(crate::types::Amount::ZERO);
            let restored_weight = ledger.store.get_weight(&new_frontier.representative)?.saturating_add(&amount);
            vec![
                StoreOp::PutFrontier(*account, new_frontier.clone()),
                StoreOp::PutWeight(new_frontier.representative, restored_weight),
                StoreOp::DelPending(hash),
                StoreOp::DelBlock(hash),
                StoreOp::DelBlockAccount(hash),
                checksum_op,
            ]
        }
        Block::Receive(recv) => {
            let previous = recv.hashables.previous;
            let source = recv.hashables.source;
            let pending = restored_pending(ledger, &source, account)?;
            let new_frontier = restored_frontier(ledger, &previous)?;
            let restored_weight = ledger
                .store
                .get_weight(&new_frontier.representative)?
                .saturating_sub(&pending.amount);
            vec![
                StoreOp::PutFrontier(*account, new_frontier.clone()),
                StoreOp::PutWeight(new_frontier.representative, restored_weight),
                StoreOp::PutPending(source, pending),
                StoreOp::DelBlock(hash),
                StoreOp::DelBlockAccount(hash),
                checksum_op,
            ]
        }
        Block::Open(open) => {
            let source = open.hashables.source;
            let pending = restored_pending(ledger, &source, account)?;
            let restored_weight = ledger
                .store
                .get_weight(&open.hashables.representative)?
                .saturating_sub(&pending.amount);
            vec![
                StoreOp::DelFrontier(*account),
                StoreOp::PutWeight(open.hashables.representative, restored_weight),
                StoreOp::PutPending(source, pending),
                StoreOp::DelBlock(hash),
                StoreOp::DelBlockAccount(hash),
                checksum_op,
            ]
        }
        Block::Change(change) => {
            let previous = change.hashables.previous;
            let new_frontier = restored_frontier(ledger, &previous)?;
            let mut ops = vec![StoreOp::PutFrontier(*account, new_frontier.clone())];
            if change.hashables.representative != new_frontier.representative {
                let balance = new_frontier.balance;
                let old_weight = ledger
                    .store
                    .get_weight(&change.hashables.representative)?
                    .saturating_sub(&balance);
                let restored_weight = ledger.store.get_weight(&new_frontier.representative)?.saturating_add(&balance);
                ops.push(StoreOp::PutWeight(change.hashables.representative, old_weight));
                ops.push(StoreOp::PutWeight(new_frontier.representative, restored_weight));
            }
            ops.push(StoreOp::DelBlock(hash));
            ops.push(StoreOp::DelBlockAccount(hash));
            ops.push(checksum_op);
            ops
        }
    };
    ledger.store.apply(ops)
}

/// Recomputes the frontier an account had right before `hash` (its new
/// head) was applied.
fn restored_frontier<S: LedgerStore>(ledger: &Ledger<S>, previous: &BlockHash) -> Result<Frontier, StoreError> {
    Ok(Frontier {
        head: *previous,
        representative: ledger.representative_calculated(previous)?,
        balance: ledger.balance(previous)?,
        time: ledger.store().now(),
    })
}

/// Rebuilds the pending entry a receive/open consumed, so it can be
/// reinstated.
fn restored_pending<S: LedgerStore>(
    ledger: &Ledger<S>,
    source: &BlockHash,
    destination: &Account,
) -> Result<PendingEntry, StoreError> {
    let sending_account = ledger.account(source)?.ok_or(StoreError::MissingBlock)?;
    let amount = ledger.amount(source)?;
    Ok(PendingEntry {
        source: sending_account,
        amount,
        destination: *destination,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::sign::Keypair;
    use crate::ledger::{GenesisConfig, Ledger, ProcessResult};
    use crate::storage::MemLedgerStore;
    use crate::types::Block;

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

    #[test]
    fn rollback_of_a_send_restores_the_previous_frontier_and_pending() {
        let (mut ledger, genesis_key) = genesis_ledger();
        let genesis_head = ledger.latest(&genesis_key.public()).unwrap().unwrap();
        let genesis_balance = ledger.account_balance(&genesis_key.public()).unwrap();

        let destination = Keypair::generate().public();
        let sent_amount = crate::primitives::U256([1u8; 32]);
        let new_balance = genesis_balance.checked_sub(&sent_amount).unwrap();
        let unsigned = Block::new_send(destination, genesis_head, new_balance, crate::primitives::U512::ZERO);
        let signature = genesis_key.sign(&unsigned.hash());
        let send = Block::new_send(destination, genesis_head, new_balance, signature);
        let send_hash = send.hash();
        assert_eq!(ledger.process(send).unwrap(), ProcessResult::Progress);

        ledger.rollback(send_hash).unwrap();
        assert_eq!(ledger.latest(&genesis_key.public()).unwrap(), Some(genesis_head));
        assert_eq!(ledger.account_balance(&genesis_key.public()).unwrap(), genesis_balance);
        assert!(!ledger.store().pending_exists(&send_hash).unwrap());
        assert!(!ledger.store().block_exists(&send_hash).unwrap());
    }
}
