//! Scenario-level tests: whole nodes mining, gossiping, and reorging against
//! each other, rather than single-module behavior.

use ledger_node::config::NodeConfig;
use ledger_node::node::NodeHandle;
use proptest::prelude::*;

#[test]
fn a_freshly_mined_genesis_block_credits_the_miner_with_one_coin() {
    let alice = NodeHandle::new(NodeConfig::default());
    assert_eq!(alice.get_balance(), 0);

    alice.mine_block();

    assert_eq!(alice.get_balance(), 1);
    let utxo = alice.get_utxo();
    assert_eq!(utxo.len(), 1);
    assert!(utxo[0].is_coinbase());
    assert_eq!(utxo[0].output(), &alice.get_address());
}

#[test]
fn gossip_admits_a_transfer_to_both_connected_peers() {
    let alice = NodeHandle::new(NodeConfig::default());
    let bob = NodeHandle::new(NodeConfig::default());
    alice.connect(&bob).unwrap();

    alice.mine_block();
    assert_eq!(bob.get_blockchain().len(), 1, "bob adopts alice's first block");

    let tx = alice
        .create_transaction(bob.get_address())
        .expect("alice's coinbase is spendable");

    assert!(alice.get_mempool().iter().any(|t| t.txid() == tx.txid()));
    assert!(bob.get_mempool().iter().any(|t| t.txid() == tx.txid()));
}

#[test]
fn a_second_spend_attempt_on_an_already_pending_coin_finds_nothing_left_to_spend() {
    let alice = NodeHandle::new(NodeConfig::default());
    let target_one = NodeHandle::new(NodeConfig::default());
    let target_two = NodeHandle::new(NodeConfig::default());

    alice.mine_block();
    alice
        .create_transaction(target_one.get_address())
        .expect("coinbase is spendable");
    assert_eq!(alice.get_mempool().len(), 1);

    // The coin is already committed to a pending transfer, so there is
    // nothing left for a second attempt to pick up.
    assert!(alice.create_transaction(target_two.get_address()).is_none());
    assert_eq!(alice.get_mempool().len(), 1);
}

#[test]
fn a_node_that_falls_behind_catches_up_through_gossiped_mining() {
    let alice = NodeHandle::new(NodeConfig::default());
    let bob = NodeHandle::new(NodeConfig::default());
    alice.connect(&bob).unwrap();

    for _ in 0..3 {
        alice.mine_block();
    }

    assert_eq!(alice.get_blockchain().len(), 3);
    assert_eq!(bob.get_blockchain().len(), 3);
    assert_eq!(alice.get_latest_hash(), bob.get_latest_hash());
}

proptest! {
    #[test]
    fn utxo_and_chain_length_track_the_number_of_mined_blocks(n in 1usize..15) {
        let node = NodeHandle::new(NodeConfig::default());
        for _ in 0..n {
            node.mine_block();
        }
        prop_assert_eq!(node.get_blockchain().len(), n);
        prop_assert_eq!(node.get_utxo().len(), n);
    }
}
