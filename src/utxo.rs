//! The UTXO state machine: which coins are currently spendable, and the
//! append-only transaction index used to resurrect them during a reorg
//! rollback.

use indexmap::IndexMap;
use std::collections::HashMap;

use crate::block::Block;
use crate::crypto;
use crate::ids::TxId;
use crate::transaction::Transaction;

/// Unspent outputs plus the transaction index, cloned wholesale to build a
/// working copy while a reorg is validated.
#[derive(Clone, Default)]
pub struct UtxoEngine {
    utxo: IndexMap<TxId, Transaction>,
    tx_index: HashMap<TxId, Transaction>,
}

impl UtxoEngine {
    pub fn new() -> Self {
        UtxoEngine::default()
    }

    pub fn contains(&self, txid: &TxId) -> bool {
        self.utxo.contains_key(txid)
    }

    pub fn get(&self, txid: &TxId) -> Option<&Transaction> {
        self.utxo.get(txid)
    }

    pub fn len(&self) -> usize {
        self.utxo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxo.is_empty()
    }

    /// Entries in insertion order — the order `create_transaction` relies on
    /// to pick the node's "first" spendable coin.
    pub fn entries(&self) -> Vec<Transaction> {
        self.utxo.values().cloned().collect()
    }

    /// Consume `tx.input` (if present) and add `tx` itself as a new entry.
    /// Records `tx` in the transaction index regardless, so a later reorg
    /// can resurrect it.
    pub fn apply(&mut self, tx: Transaction) {
        if let Some(input) = tx.input() {
            self.utxo.shift_remove(input);
        }
        let txid = tx.txid();
        self.tx_index.insert(txid, tx.clone());
        self.utxo.insert(txid, tx);
    }

    /// Undo a committed block: remove each of its transactions from the
    /// UTXO set and resurrect whatever they spent, in reverse order.
    pub fn revert_block(&mut self, block: &Block) {
        for tx in block.txs().iter().rev() {
            let txid = tx.txid();
            self.utxo.shift_remove(&txid);
            if let Some(input) = tx.input() {
                if let Some(source) = self.tx_index.get(input) {
                    self.utxo.insert(*input, source.clone());
                }
            }
        }
    }

    /// A block is valid against this snapshot iff: no two transactions
    /// share an `input` key (coinbases, whose input is absent, are treated
    /// as a single shared key — see the design notes on this edge case);
    /// every transfer references a UTXO entry that exists here and carries
    /// a signature that verifies against that entry's owner; coinbases
    /// always pass.
    pub fn verify_block(&self, block: &Block, block_size: usize) -> bool {
        if !block.is_well_formed(block_size) {
            return false;
        }

        let mut seen_inputs: Vec<Option<TxId>> = Vec::with_capacity(block.txs().len());
        for tx in block.txs() {
            let key = tx.input().copied();
            if seen_inputs.contains(&key) {
                return false;
            }
            seen_inputs.push(key);

            let Some(input) = tx.input() else {
                continue; // coinbase: always passes
            };
            let Some(source) = self.utxo.get(input) else {
                return false;
            };
            let message = Transaction::signing_message(Some(input), tx.output());
            if !crypto::verify(&message, tx.signature(), source.output()) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::gen_keys;
    use crate::ids::BlockHash;

    #[test]
    fn apply_coinbase_adds_entry_without_consuming() {
        let (_sk, pk) = gen_keys();
        let mut utxo = UtxoEngine::new();
        let tx = Transaction::coinbase(pk, 64);
        let txid = tx.txid();
        utxo.apply(tx);
        assert!(utxo.contains(&txid));
        assert_eq!(utxo.len(), 1);
    }

    #[test]
    fn apply_transfer_consumes_source_and_adds_itself() {
        let (sk, pk) = gen_keys();
        let (_other_sk, target) = gen_keys();
        let mut utxo = UtxoEngine::new();
        let coinbase = Transaction::coinbase(pk, 64);
        let source_id = coinbase.txid();
        utxo.apply(coinbase);

        let message = Transaction::signing_message(Some(&source_id), &target);
        let sig = crypto::sign(&message, &sk);
        let transfer = Transaction::new(target, Some(source_id), sig);
        let transfer_id = transfer.txid();
        utxo.apply(transfer);

        assert!(!utxo.contains(&source_id));
        assert!(utxo.contains(&transfer_id));
        assert_eq!(utxo.len(), 1);
    }

    #[test]
    fn revert_block_resurrects_spent_input() {
        let (sk, pk) = gen_keys();
        let (_other_sk, target) = gen_keys();
        let mut utxo = UtxoEngine::new();
        let coinbase = Transaction::coinbase(pk, 64);
        let source_id = coinbase.txid();
        utxo.apply(coinbase.clone());

        let message = Transaction::signing_message(Some(&source_id), &target);
        let sig = crypto::sign(&message, &sk);
        let transfer = Transaction::new(target, Some(source_id), sig);
        utxo.apply(transfer.clone());

        let block = Block::new(BlockHash::genesis(), vec![transfer.clone()]);
        utxo.revert_block(&block);

        assert!(utxo.contains(&source_id));
        assert!(!utxo.contains(&transfer.txid()));
    }

    #[test]
    fn verify_block_rejects_duplicate_coinbases() {
        let (_sk, pk) = gen_keys();
        let utxo = UtxoEngine::new();
        let block = Block::new(
            BlockHash::genesis(),
            vec![Transaction::coinbase(pk, 64), Transaction::coinbase(pk, 64)],
        );
        assert!(!utxo.verify_block(&block, 10));
    }

    #[test]
    fn verify_block_rejects_unknown_input() {
        let (sk, pk) = gen_keys();
        let utxo = UtxoEngine::new();
        let ghost_id = TxId::from_digest([9u8; 32]);
        let message = Transaction::signing_message(Some(&ghost_id), &pk);
        let sig = crypto::sign(&message, &sk);
        let tx = Transaction::new(pk, Some(ghost_id), sig);
        let block = Block::new(BlockHash::genesis(), vec![tx]);
        assert!(!utxo.verify_block(&block, 10));
    }

    #[test]
    fn verify_block_rejects_bad_signature() {
        let (_sk, pk) = gen_keys();
        let (other_sk, _other_pk) = gen_keys();
        let mut utxo = UtxoEngine::new();
        let coinbase = Transaction::coinbase(pk, 64);
        let source_id = coinbase.txid();
        utxo.apply(coinbase);

        // Signed with the wrong key.
        let message = Transaction::signing_message(Some(&source_id), &pk);
        let bad_sig = crypto::sign(&message, &other_sk);
        let tx = Transaction::new(pk, Some(source_id), bad_sig);
        let block = Block::new(BlockHash::genesis(), vec![tx]);
        assert!(!utxo.verify_block(&block, 10));
    }

    #[test]
    fn verify_block_rejects_oversized_block() {
        let (_sk, pk) = gen_keys();
        let utxo = UtxoEngine::new();
        let txs: Vec<Transaction> = (0..11).map(|_| Transaction::coinbase(pk, 64)).collect();
        let block = Block::new(BlockHash::genesis(), txs);
        assert!(!utxo.verify_block(&block, 10));
    }
}
