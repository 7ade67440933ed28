//! A block bundles transactions behind a parent hash. Hashes are never
//! cached on the struct — `block_hash` and the merkle root are recomputed
//! from the current data on every call, so tampering with `txs` in a test is
//! visible immediately.

use crate::crypto;
use crate::ids::{BlockHash, TxId};
use crate::transaction::Transaction;

#[derive(Clone, Debug)]
pub struct Block {
    prev_hash: BlockHash,
    txs: Vec<Transaction>,
}

impl Block {
    pub fn new(prev_hash: BlockHash, txs: Vec<Transaction>) -> Self {
        Block { prev_hash, txs }
    }

    pub fn prev_hash(&self) -> &BlockHash {
        &self.prev_hash
    }

    pub fn txs(&self) -> &[Transaction] {
        &self.txs
    }

    /// Structural well-formedness: the size bound only. Enforced by
    /// validation (`UtxoEngine::verify_block`), not by the constructor,
    /// since a peer may hand us an oversized block on purpose.
    pub fn is_well_formed(&self, block_size: usize) -> bool {
        self.txs.len() <= block_size
    }

    pub fn merkle_root(&self) -> Vec<u8> {
        let txids: Vec<TxId> = self.txs.iter().map(Transaction::txid).collect();
        merkle_root(&txids)
    }

    pub fn block_hash(&self) -> BlockHash {
        let root = self.merkle_root();
        let digest = crypto::sha256(&[self.prev_hash.as_bytes(), &root]);
        BlockHash::from_digest(digest)
    }
}

/// Pair-hash transaction ids bottom-up until a single root remains. Any
/// level with odd arity is padded with one empty-byte leaf before pairing,
/// so that the reduction always terminates regardless of how many levels it
/// takes (a block of `BLOCK_SIZE` = 10 leaves passes through an odd level of
/// 5, then 3, then 2, then 1).
pub fn merkle_root(txids: &[TxId]) -> Vec<u8> {
    if txids.is_empty() {
        return Vec::new();
    }

    let mut level: Vec<Vec<u8>> = txids.iter().map(|id| id.as_bytes().to_vec()).collect();
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(Vec::new());
        }
        level = level
            .chunks(2)
            .map(|pair| crypto::sha256(&[&pair[0], &pair[1]]).to_vec())
            .collect();
    }
    level.into_iter().next().expect("non-empty level")
}
