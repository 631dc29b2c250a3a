//! The `process()` state machine (§4.3, §5, §8): validates one block
//! against the current store state and, on success, applies it and
//! every side effect (frontier, pending, weight, checksum, fork
//! evidence) as a single atomic [`crate::storage::LedgerStore::apply`]
//! batch.
//!
//! Checks run in a fixed order so a block with multiple problems
//! always reports the same [`ProcessResult`]: already-seen, then the
//! gaps (`previous`/`source` missing), then signature, then fork, then
//! whatever is specific to the variant (overspend, overreceive,
//! wrong-source-type).

use crate::ledger::{Ledger, ProcessResult, checksum};
use crate::storage::{LedgerStore, StoreError, StoreOp};
use crate::types::{Account, Amount, Block, BlockHash, Frontier, PendingEntry};

pub fn process<S: LedgerStore>(ledger: &mut Ledger<S>, block: Block) -> Result<ProcessResult, StoreError> {
    let hash = block.hash();
    if ledger.store.block_exists(&hash)? {
        return Ok(ProcessResult::Old);
    }

    match &block {
        Block::Send(_) => process_send(ledger, block, hash),
        Block::Receive(_) => process_receive(ledger, block, hash),
        Block::Open(_) => process_open(ledger, block, hash),
        Block::Change(_) => process_change(ledger, block, hash),
    }
}

/// Records `block` as a losing competitor for `root` and reports `Fork`.
/// The store's main chain is left untouched.
fn fork<S: LedgerStore>(ledger: &mut Ledger<S>, root: BlockHash, block: Block) -> Result<ProcessResult, StoreError> {
    ledger.store.apply(vec![StoreOp::PutFork(root, block)])?;
    Ok(ProcessResult::Fork)
}

fn process_send<S: LedgerStore>(ledger: &mut Ledger<S>, block: Block, hash: BlockHash) -> Result<ProcessResult, StoreError> {
    let send = match &block {
        Block::Send(s) => s,
        _ => unreachable!(),
    };
    let previous = send.hashables.previous;
    if !ledger.store.block_exists(&previous)? {
        return Ok(ProcessResult::GapPrevious);
    }
    let account = ledger.store.get_block_account(&previous)?.ok_or(StoreError::CorruptedValue {
        table: "block_account",
        reason: "previous block has no recorded owner",
    })?;
    if !ledger.verify(&account, &hash, &send.signature) {
        return Ok(ProcessResult::BadSignature);
    }
    let frontier = ledger.store.get_frontier(&account)?.ok_or(StoreError::MissingFrontier)?;
    if frontier.head != previous {
        return fork(ledger, previous, block);
    }
    if send.hashables.balance > frontier.balance {
        return Ok(ProcessResult::Overspend);
    }

    let amount = frontier
        .balance
        .checked_sub(&send.hashables.balance)
        .unwrap_or(Amount::ZERO);
    let new_frontier = Frontier {
        head: hash,
        representative: frontier.representative,
        balance: send.hashables.balance,
        time: ledger.store.now(),
    };
    let pending = PendingEntry {
        source: account,
        amount,
        destination: send.hashables.destination,
    };
    let checksum_op = checksum::toggle(&ledger.store, &account, &hash)?;
    let new_weight = ledger.store.get_weight(&frontier.representative)?.saturating_sub(&amount);
    ledger.store.apply(vec![
        StoreOp::PutBlock(hash, block),
        StoreOp::PutBlockAccount(hash, account),
        StoreOp::PutFrontier(account, new_frontier),
        StoreOp::PutPending(hash, pending),
        StoreOp::PutWeight(frontier.representative, new_weight),
        checksum_op,
    ])?;
    Ok(ProcessResult::Progress)
}

fn process_receive<S: LedgerStore>(ledger: &mut Ledger<S>, block: Block, hash: BlockHash) -> Result<ProcessResult, StoreError> {
    let recv = match &block {
        Block::Receive(r) => r,
        _ => unreachable!(),
    };
    let previous = recv.hashables.previous;
    let source = recv.hashables.source;
    if !ledger.store.block_exists(&previous)? {
        return Ok(ProcessResult::GapPrevious);
    }
    if !ledger.store.block_exists(&source)? {
        return Ok(ProcessResult::GapSource);
    }
    let account = ledger.store.get_block_account(&previous)?.ok_or(StoreError::CorruptedValue {
        table: "block_account",
        reason: "previous block has no recorded owner",
    })?;
    if !ledger.verify(&account, &hash, &recv.signature) {
        return Ok(ProcessResult::BadSignature);
    }
    let frontier = ledger.store.get_frontier(&account)?.ok_or(StoreError::MissingFrontier)?;
    if frontier.head != previous {
        return fork(ledger, previous, block);
    }
    let source_block = ledger.store.get_block(&source)?.ok_or(StoreError::MissingBlock)?;
    if !matches!(source_block, Block::Send(_)) {
        return Ok(ProcessResult::NotReceiveFromSend);
    }
    let pending = match ledger.store.get_pending(&source)? {
        Some(p) if p.destination == account => p,
        _ => return Ok(ProcessResult::Overreceive),
    };
    let new_balance = match frontier.balance.checked_add(&pending.amount) {
        Some(b) => b,
        None => return Ok(ProcessResult::Overspend),
    };

    let new_frontier = Frontier {
        head: hash,
        representative: frontier.representative,
        balance: new_balance,
        time: ledger.store.now(),
    };
    let checksum_op = checksum::toggle(&ledger.store, &account, &hash)?;
    let new_weight = ledger.store.get_weight(&frontier.representative)?.saturating_add(&pending.amount);
    ledger.store.apply(vec![
        StoreOp::PutBlock(hash, block),
        StoreOp::PutBlockAccount(hash, account),
        StoreOp::PutFrontier(account, new_frontier),
        StoreOp::DelPending(source),
        StoreOp::PutWeight(frontier.representative, new_weight),
        checksum_op,
    ])?;
    Ok(ProcessResult::Progress)
}

fn process_open<S: LedgerStore>(ledger: &mut Ledger<S>, block: Block, hash: BlockHash) -> Result<ProcessResult, StoreError> {
    let open = match &block {
        Block::Open(o) => o,
        _ => unreachable!(),
    };
    let source = open.hashables.source;
    if !ledger.store.block_exists(&source)? {
        return Ok(ProcessResult::GapSource);
    }
    let source_block = ledger.store.get_block(&source)?.ok_or(StoreError::MissingBlock)?;
    let send = match &source_block {
        Block::Send(s) => s,
        _ => return Ok(ProcessResult::NotReceiveFromSend),
    };
    let account: Account = send.hashables.destination;
    if !ledger.verify(&account, &hash, &open.signature) {
        return Ok(ProcessResult::BadSignature);
    }
    if ledger.store.frontier_exists(&account)? {
        return fork(ledger, account, block);
    }
    let pending = match ledger.store.get_pending(&source)? {
        Some(p) if p.destination == account => p,
        _ => return Ok(ProcessResult::Overreceive),
    };

    let new_frontier = Frontier {
        head: hash,
        representative: open.hashables.representative,
        balance: pending.amount,
        time: ledger.store.now(),
    };
    let checksum_op = checksum::toggle(&ledger.store, &account, &hash)?;
    let new_weight = ledger
        .store
        .get_weight(&open.hashables.representative)?
        .saturating_add(&pending.amount);
    ledger.store.apply(vec![
        StoreOp::PutBlock(hash, block),
        StoreOp::PutBlockAccount(hash, account),
        StoreOp::PutFrontier(account, new_frontier),
        StoreOp::DelPending(source),
        StoreOp::PutWeight(open.hashables.representative, new_weight),
        checksum_op,
    ])?;
    Ok(ProcessResult::Progress)
}

fn process_change<S: LedgerStore>(ledger: &mut Ledger<S>, block: Block, hash: BlockHash) -> Result<ProcessResult, StoreError> {
    let change = match &block {
        Block::Change(c) => c,
        _ => unreachable!(),
    };
    let previous = change.hashables.previous;
    if !ledger.store.block_exists(&previous)? {
        return Ok(ProcessResult::GapPrevious);
    }
    let account = ledger.store.get_block_account(&previous)?.ok_or(StoreError::CorruptedValue {
        table: "block_account",
        reason: "previous block has no recorded owner",
    })?;
    if !ledger.verify(&account, &hash, &change.signature) {
        return Ok(ProcessResult::BadSignature);
    }
    let frontier = ledger.store.get_frontier(&account)?.ok_or(StoreError::MissingFrontier)?;
    if frontier.head != previous {
        return fork(ledger, previous, block);
    }

    let new_frontier = Frontier {
        head: hash,
        representative: change.hashables.representative,
        balance: frontier.balance,
        time: ledger.store.now(),
    };
    let checksum_op = checksum::toggle(&ledger.store, &account, &hash)?;
    let mut ops = vec![
        StoreOp::PutBlock(hash, block),
        StoreOp::PutBlockAccount(hash, account),
        StoreOp::PutFrontier(account, new_frontier),
    ];
    if change.hashables.representative != frontier.representative {
        let old_weight = ledger.store.get_weight(&frontier.representative)?.saturating_sub(&frontier.balance);
        let new_weight = ledger
            .store
            .get_weight(&change.hashables.representative)?
            .saturating_add(&frontier.balance);
        ops.push(StoreOp::PutWeight(frontier.representative, old_weight));
        ops.push(StoreOp::PutWeight(change.hashables.representative, new_weight));
    }
    ops.push(checksum_op);
    ledger.store.apply(ops)?;
    Ok(ProcessResult::Progress)
}
