//! # Ledger Node Demo

use ledger_node::config::NodeConfig;
use ledger_node::node::NodeHandle;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Ledger Node Demo ===");

    let alice = NodeHandle::new(NodeConfig::default());
    let bob = NodeHandle::new(NodeConfig::default());
    alice.connect(&bob).expect("distinct nodes connect");

    let hash = alice.mine_block();
    println!("alice mined block={:?} height={}", hash, alice.get_blockchain().len());
    println!("bob adopted height={}", bob.get_blockchain().len());

    let bob_address = bob.get_address();
    match alice.create_transaction(bob_address) {
        Some(tx) => println!("alice -> bob transfer txid={:?}", tx.txid()),
        None => println!("alice has no spendable coin yet"),
    }

    println!("alice mempool size={}", alice.get_mempool().len());
    println!("bob mempool size={} (gossiped)", bob.get_mempool().len());

    let hash = alice.mine_block();
    println!("alice mined block={:?} height={}", hash, alice.get_blockchain().len());

    println!("alice balance={}", alice.get_balance());
    println!("bob balance={}", bob.get_balance());
}
