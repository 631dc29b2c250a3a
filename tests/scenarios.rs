//! End-to-end scenarios over the public API, one per concrete case in
//! the ledger state machine's testable-properties list: open genesis,
//! send half, receive into a new account, reject a double receive,
//! record a fork, and roll a send back out.

use ledger_core::crypto::Keypair;
use ledger_core::primitives::{U256, U512};
use ledger_core::{Block, GenesisConfig, Ledger, MemLedgerStore, ProcessResult};

/// Builds a fresh ledger whose genesis account owns the entire supply,
/// and hands back the genesis keypair alongside it.
fn open_genesis() -> (Ledger<MemLedgerStore>, Keypair) {
    let genesis_key = Keypair::generate();
    let placeholder_source = U256([7u8; 32]);
    let unsigned = Block::new_open(genesis_key.public(), placeholder_source, U512::ZERO);
    let signature = genesis_key.sign(&unsigned.hash());
    let genesis_block = Block::new_open(genesis_key.public(), placeholder_source, signature);

    let genesis = GenesisConfig {
        account: genesis_key.public(),
        genesis_block,
        balance: U256::MAX,
    };
    let ledger = Ledger::open(MemLedgerStore::new(), genesis).expect("open genesis ledger");
    (ledger, genesis_key)
}

#[test]
fn open_genesis_sets_latest_and_full_weight() {
    let (ledger, genesis_key) = open_genesis();

    let head = ledger.latest(&genesis_key.public()).unwrap().expect("genesis account is open");
    assert_eq!(head, ledger.genesis().genesis_block.hash());
    assert_eq!(ledger.weight(&genesis_key.public()).unwrap(), U256::MAX);
    assert_eq!(ledger.account_balance(&genesis_key.public()).unwrap(), U256::MAX);
}

#[test]
fn send_half_leaves_the_remainder_and_a_pending_entry() {
    let (mut ledger, genesis_key) = open_genesis();
    let genesis_head = ledger.latest(&genesis_key.public()).unwrap().unwrap();

    let destination = Keypair::generate().public();
    let half = U256::MAX.checked_div_by_two();
    let remainder = U256::MAX.checked_sub(&half).unwrap();

    let unsigned = Block::new_send(destination, genesis_head, remainder, U512::ZERO);
    let signature = genesis_key.sign(&unsigned.hash());
    let send = Block::new_send(destination, genesis_head, remainder, signature);
    let send_hash = send.hash();

    assert_eq!(ledger.process(send).unwrap(), ProcessResult::Progress);

    assert_eq!(ledger.account_balance(&genesis_key.public()).unwrap(), remainder);
    assert_eq!(ledger.weight(&genesis_key.public()).unwrap(), remainder);

    let pending = ledger.store().get_pending(&send_hash).unwrap().expect("pending entry recorded");
    assert_eq!(pending.source, genesis_key.public());
    assert_eq!(pending.destination, destination);
    assert_eq!(pending.amount, half);
}

/// Sends half the genesis supply to `destination` and returns the
/// send's hash and the amount sent, leaving `ledger` with the
/// resulting pending entry in place.
fn send_half<S: ledger_core::LedgerStore>(
    ledger: &mut Ledger<S>,
    genesis_key: &Keypair,
    destination: U256,
) -> (U256, U256) {
    let genesis_head = ledger.latest(&genesis_key.public()).unwrap().unwrap();
    let half = U256::MAX.checked_div_by_two();
    let remainder = U256::MAX.checked_sub(&half).unwrap();

    let unsigned = Block::new_send(destination, genesis_head, remainder, U512::ZERO);
    let signature = genesis_key.sign(&unsigned.hash());
    let send = Block::new_send(destination, genesis_head, remainder, signature);
    let send_hash = send.hash();
    assert_eq!(ledger.process(send).unwrap(), ProcessResult::Progress);
    (send_hash, half)
}

#[test]
fn receive_in_a_new_account_opens_it_with_the_sent_amount() {
    let (mut ledger, genesis_key) = open_genesis();
    let recipient_key = Keypair::generate();
    let (send_hash, half) = send_half(&mut ledger, &genesis_key, recipient_key.public());

    let unsigned = Block::new_open(recipient_key.public(), send_hash, U512::ZERO);
    let signature = recipient_key.sign(&unsigned.hash());
    let open = Block::new_open(recipient_key.public(), send_hash, signature);
    assert_eq!(ledger.process(open).unwrap(), ProcessResult::Progress);

    assert_eq!(ledger.account_balance(&recipient_key.public()).unwrap(), half);
    assert_eq!(ledger.weight(&recipient_key.public()).unwrap(), half);
    assert!(!ledger.store().pending_exists(&send_hash).unwrap());
}

#[test]
fn a_second_receive_of_the_same_send_is_rejected_as_an_overreceive() {
    let (mut ledger, genesis_key) = open_genesis();
    let recipient_key = Keypair::generate();
    let (first_send_hash, _half) = send_half(&mut ledger, &genesis_key, recipient_key.public());

    let unsigned = Block::new_open(recipient_key.public(), first_send_hash, U512::ZERO);
    let signature = recipient_key.sign(&unsigned.hash());
    let open = Block::new_open(recipient_key.public(), first_send_hash, signature);
    let open_hash = open.hash();
    assert_eq!(ledger.process(open).unwrap(), ProcessResult::Progress);

    // A small second send so the recipient has a legitimate block to
    // receive into, which makes the chain long enough to retry against.
    let genesis_head = ledger.latest(&genesis_key.public()).unwrap().unwrap();
    let genesis_balance = ledger.account_balance(&genesis_key.public()).unwrap();
    let tiny_remainder = genesis_balance.checked_sub(&U256([1u8; 32])).unwrap();
    let unsigned_send = Block::new_send(recipient_key.public(), genesis_head, tiny_remainder, U512::ZERO);
    let send_signature = genesis_key.sign(&unsigned_send.hash());
    let second_send = Block::new_send(recipient_key.public(), genesis_head, tiny_remainder, send_signature);
    let second_send_hash = second_send.hash();
    assert_eq!(ledger.process(second_send).unwrap(), ProcessResult::Progress);

    let unsigned_recv = Block::new_receive(open_hash, second_send_hash, U512::ZERO);
    let recv_signature = recipient_key.sign(&unsigned_recv.hash());
    let receive = Block::new_receive(open_hash, second_send_hash, recv_signature);
    let receive_hash = receive.hash();
    assert_eq!(ledger.process(receive).unwrap(), ProcessResult::Progress);

    // Attempting to receive the first send a second time finds its
    // pending entry already gone: the block exists, but nothing is
    // left to claim.
    let unsigned_retry = Block::new_receive(receive_hash, first_send_hash, U512::ZERO);
    let retry_signature = recipient_key.sign(&unsigned_retry.hash());
    let retry = Block::new_receive(receive_hash, first_send_hash, retry_signature);
    assert_eq!(ledger.process(retry).unwrap(), ProcessResult::Overreceive);
}

#[test]
fn a_second_send_with_the_same_previous_is_recorded_as_a_fork() {
    let (mut ledger, genesis_key) = open_genesis();
    let genesis_head = ledger.latest(&genesis_key.public()).unwrap().unwrap();

    let first_destination = Keypair::generate().public();
    let (send_hash, _half) = send_half(&mut ledger, &genesis_key, first_destination);

    let second_destination = Keypair::generate().public();
    let half = U256::MAX.checked_div_by_two();
    let remainder = U256::MAX.checked_sub(&half).unwrap();
    let unsigned = Block::new_send(second_destination, genesis_head, remainder, U512::ZERO);
    let signature = genesis_key.sign(&unsigned.hash());
    let competing_send = Block::new_send(second_destination, genesis_head, remainder, signature);
    let competing_hash = competing_send.hash();

    assert_eq!(ledger.process(competing_send).unwrap(), ProcessResult::Fork);

    assert!(ledger.store().fork_exists(&genesis_head).unwrap());
    let recorded = ledger.store().get_fork(&genesis_head).unwrap().expect("fork recorded");
    assert_eq!(recorded.hash(), competing_hash);

    // Main chain is unchanged: the genesis account's head is still the
    // first send, not the losing fork.
    assert_eq!(ledger.latest(&genesis_key.public()).unwrap(), Some(send_hash));
}

#[test]
fn rolling_back_a_send_restores_the_prior_frontier_weight_and_pending() {
    let (mut ledger, genesis_key) = open_genesis();
    let genesis_balance_before = ledger.account_balance(&genesis_key.public()).unwrap();
    let genesis_head = ledger.latest(&genesis_key.public()).unwrap().unwrap();

    let destination = Keypair::generate().public();
    let (send_hash, _half) = send_half(&mut ledger, &genesis_key, destination);

    ledger.rollback(send_hash).unwrap();

    assert_eq!(ledger.latest(&genesis_key.public()).unwrap(), Some(genesis_head));
    assert_eq!(ledger.account_balance(&genesis_key.public()).unwrap(), genesis_balance_before);
    assert_eq!(ledger.weight(&genesis_key.public()).unwrap(), genesis_balance_before);
    assert!(!ledger.store().pending_exists(&send_hash).unwrap());
    assert!(!ledger.store().block_exists(&send_hash).unwrap());
}
