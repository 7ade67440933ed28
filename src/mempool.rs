//! The pending-transaction pool. Admission policy (UTXO membership, conflict
//! detection, signature checks) lives on `Node`, which is the component that
//! has both the UTXO snapshot and the peer set to gossip to; this module is
//! just the ordered container, keyed by `input` since (M2) forbids two
//! entries sharing one.

use indexmap::IndexMap;

use crate::ids::TxId;
use crate::transaction::Transaction;

#[derive(Default)]
pub struct Mempool {
    entries: IndexMap<TxId, Transaction>,
}

impl Mempool {
    pub fn new() -> Self {
        Mempool::default()
    }

    pub fn contains_input(&self, input: &TxId) -> bool {
        self.entries.contains_key(input)
    }

    /// Insert a transfer. Panics if handed a coinbase — callers are
    /// expected to have already rejected those (M2/M3 admission happens
    /// before this is called).
    pub fn insert(&mut self, tx: Transaction) {
        let input = *tx
            .input()
            .expect("only transfers (non-coinbase) belong in the mempool");
        self.entries.insert(input, tx);
    }

    pub fn remove(&mut self, input: &TxId) -> Option<Transaction> {
        self.entries.shift_remove(input)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in admission order.
    pub fn entries(&self) -> Vec<Transaction> {
        self.entries.values().cloned().collect()
    }
}
