//! The node: chain, UTXO, mempool, and peer set, tied together by the
//! reorg protocol. Peers are modeled as `NodeHandle`, a cloneable
//! `Rc<RefCell<Node>>` newtype — the single-threaded, synchronous contract
//! (SPEC_FULL.md §5) lets every mutating operation simply scope its borrow
//! to end before it recurses into a peer, so a cycle in the peer graph
//! never causes a double borrow.

use std::cell::RefCell;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use ed25519_dalek::SigningKey;
use tracing::{debug, info, warn};

use crate::config::NodeConfig;
use crate::crypto::{self, PublicKey};
use crate::errors::{BlockLookupError, ConnectError};
use crate::ids::{BlockHash, TxId};
use crate::mempool::Mempool;
use crate::transaction::Transaction;
use crate::utxo::UtxoEngine;
use crate::block::Block;

struct Node {
    signing_key: SigningKey,
    public_key: PublicKey,
    config: NodeConfig,
    mempool: Mempool,
    chain: Vec<Block>,
    utxo: UtxoEngine,
    connections: HashSet<NodeHandle>,
}

impl Node {
    fn latest_hash(&self) -> BlockHash {
        self.chain
            .last()
            .map(Block::block_hash)
            .unwrap_or_else(BlockHash::genesis)
    }
}

/// A cloneable handle to a node, compared and hashed by pointer identity so
/// it can live in a `HashSet` as a peer-set member.
#[derive(Clone)]
pub struct NodeHandle(Rc<RefCell<Node>>);

impl PartialEq for NodeHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for NodeHandle {}

impl Hash for NodeHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Rc::as_ptr(&self.0), state)
    }
}

/// What `notify_of_block` needs from whoever is announcing a block: enough
/// to walk the announced branch back to a common ancestor. A trait rather
/// than the concrete `NodeHandle` so tests can hand it a forged sender that
/// serves up an invalid or inconsistent branch — the real `original_source`
/// suite did this by subclassing `Node` and overriding `get_block`.
pub trait Peer {
    fn get_block(&self, hash: &BlockHash) -> Result<Block, BlockLookupError>;
}

impl Peer for NodeHandle {
    fn get_block(&self, hash: &BlockHash) -> Result<Block, BlockLookupError> {
        self.0
            .borrow()
            .chain
            .iter()
            .find(|b| &b.block_hash() == hash)
            .cloned()
            .ok_or_else(|| BlockLookupError::Unknown(hash.clone()))
    }
}

impl NodeHandle {
    pub fn new(config: NodeConfig) -> Self {
        let (signing_key, public_key) = crypto::gen_keys();
        NodeHandle(Rc::new(RefCell::new(Node {
            signing_key,
            public_key,
            config,
            mempool: Mempool::new(),
            chain: Vec::new(),
            utxo: UtxoEngine::new(),
            connections: HashSet::new(),
        })))
    }

    pub fn get_address(&self) -> PublicKey {
        self.0.borrow().public_key
    }

    // ---- connection management (SPEC_FULL.md §4.6) ----

    pub fn connect(&self, other: &NodeHandle) -> Result<(), ConnectError> {
        if self == other {
            return Err(ConnectError::SelfConnection);
        }
        self.0.borrow_mut().connections.insert(other.clone());
        other.0.borrow_mut().connections.insert(self.clone());

        let other_tip = other.get_latest_hash();
        self.notify_of_block(other_tip, other.clone());
        let self_tip = self.get_latest_hash();
        other.notify_of_block(self_tip, self.clone());
        Ok(())
    }

    pub fn disconnect(&self, other: &NodeHandle) {
        self.0.borrow_mut().connections.remove(other);
        other.0.borrow_mut().connections.remove(self);
    }

    pub fn connections(&self) -> Vec<NodeHandle> {
        self.0.borrow().connections.iter().cloned().collect()
    }

    fn is_known_block(&self, hash: &BlockHash) -> bool {
        // Splits are more likely near the tip, so scan from there.
        self.0.borrow().chain.iter().rev().any(|b| &b.block_hash() == hash)
    }

    // ---- mempool (SPEC_FULL.md §4.4) ----

    pub fn add_transaction_to_mempool(&self, tx: Transaction) -> bool {
        let Some(input) = tx.input().copied() else {
            warn!("rejected transaction: coinbases are never admitted to the mempool");
            return false;
        };

        let peers: Vec<NodeHandle>;
        {
            let mut node = self.0.borrow_mut();
            if !node.utxo.contains(&input) {
                warn!(?input, "rejected transaction: input is not an unspent output");
                return false;
            }
            if node.mempool.contains_input(&input) {
                warn!(?input, "rejected transaction: conflicts with a pending entry");
                return false;
            }
            let source = node.utxo.get(&input).expect("checked above").clone();
            let message = Transaction::signing_message(Some(&input), tx.output());
            if !crypto::verify(&message, tx.signature(), source.output()) {
                warn!(?input, "rejected transaction: signature does not verify");
                return false;
            }
            node.mempool.insert(tx.clone());
            debug!(?input, "admitted transaction to mempool");
            peers = node.connections.iter().cloned().collect();
        }

        for peer in peers {
            peer.add_transaction_to_mempool(tx.clone());
        }
        true
    }

    pub fn clear_mempool(&self) {
        self.0.borrow_mut().mempool.clear();
    }

    pub fn get_mempool(&self) -> Vec<Transaction> {
        self.0.borrow().mempool.entries()
    }

    // ---- chain / utxo reads ----

    pub fn get_latest_hash(&self) -> BlockHash {
        self.0.borrow().latest_hash()
    }

    pub fn get_utxo(&self) -> Vec<Transaction> {
        self.0.borrow().utxo.entries()
    }

    pub fn get_blockchain(&self) -> Vec<Block> {
        self.0.borrow().chain.clone()
    }

    // ---- mining (SPEC_FULL.md §4.5) ----

    pub fn mine_block(&self) -> BlockHash {
        let block_hash: BlockHash;
        let peers: Vec<NodeHandle>;
        {
            let mut node = self.0.borrow_mut();
            let coinbase = Transaction::coinbase(node.public_key, node.config.coinbase_signature_len);

            // The coinbase is appended to a snapshot of the mempool and the
            // whole thing is sliced to block_size — if the mempool already
            // held block_size or more entries, the coinbase is silently
            // dropped from the block. Preserved from the reference model.
            let mut candidates = node.mempool.entries();
            candidates.push(coinbase);
            let take = candidates.len().min(node.config.block_size);
            let block_txs: Vec<Transaction> = candidates.into_iter().take(take).collect();

            for tx in &block_txs {
                if let Some(input) = tx.input() {
                    node.mempool.remove(input);
                }
            }

            let prev_hash = node.latest_hash();
            let block = Block::new(prev_hash, block_txs.clone());
            let hash = block.block_hash();

            for tx in block_txs {
                node.utxo.apply(tx);
            }
            node.chain.push(block);
            info!(?hash, height = node.chain.len(), "mined block");

            block_hash = hash;
            peers = node.connections.iter().cloned().collect();
        }

        for peer in peers {
            peer.notify_of_block(block_hash.clone(), self.clone());
        }
        block_hash
    }

    // ---- reorg protocol (SPEC_FULL.md §4.5) ----

    pub fn notify_of_block<P: Peer>(&self, hash: BlockHash, sender: P) {
        if hash == BlockHash::genesis() || self.is_known_block(&hash) {
            return;
        }

        let first_block = match sender.get_block(&hash) {
            Ok(block) => block,
            Err(_) => {
                warn!("aborting notify_of_block: sender could not supply the announced block");
                return;
            }
        };
        if first_block.block_hash() != hash {
            warn!("aborting notify_of_block: announced hash does not match the fetched block");
            return;
        }

        // Step 1: walk the candidate branch back to a known hash or genesis.
        let mut new_branch = vec![first_block.clone()];
        let mut cursor = first_block.prev_hash().clone();
        while cursor != BlockHash::genesis() && !self.is_known_block(&cursor) {
            let block = match sender.get_block(&cursor) {
                Ok(block) => block,
                Err(_) => {
                    warn!("aborting notify_of_block: sender could not supply an ancestor block");
                    return;
                }
            };
            cursor = block.prev_hash().clone();
            new_branch.push(block);
        }
        let split_point = cursor;

        // Step 2: walk our own chain back to the same split point.
        let mut old_branch = Vec::new();
        let mut walk = self.get_latest_hash();
        while walk != split_point {
            let block = self
                .get_block(&walk)
                .expect("every hash on our own chain resolves to a block we hold");
            walk = block.prev_hash().clone();
            old_branch.push(block);
        }

        // Step 3: length gate — ties and shorter candidates are not adopted.
        if new_branch.len() <= old_branch.len() {
            debug!("ignoring notify_of_block: candidate branch is not longer than ours");
            return;
        }

        // Steps 4-5: roll a working UTXO copy back, then validate forward.
        let block_size = self.0.borrow().config.block_size;
        let mut working_utxo = self.0.borrow().utxo.clone();
        for block in &old_branch {
            working_utxo.revert_block(block);
        }

        let mut accepted = 0usize;
        for block in new_branch.iter().rev() {
            if !working_utxo.verify_block(block, block_size) {
                break;
            }
            for tx in block.txs() {
                working_utxo.apply(tx.clone());
            }
            accepted += 1;
        }

        // Step 6: the accepted prefix must strictly beat the old branch.
        if accepted == 0 || accepted <= old_branch.len() {
            warn!(
                accepted,
                old_len = old_branch.len(),
                "aborting reorg: candidate's valid prefix does not beat our chain"
            );
            return;
        }

        // Step 7: commit.
        let new_tip: BlockHash;
        let peers: Vec<NodeHandle>;
        let stale_mempool: Vec<Transaction>;
        {
            let mut node = self.0.borrow_mut();
            let keep_len = node.chain.len() - old_branch.len();
            node.chain.truncate(keep_len);
            let accepted_blocks: Vec<Block> = new_branch.into_iter().rev().take(accepted).collect();
            node.chain.extend(accepted_blocks);
            node.utxo = working_utxo;

            stale_mempool = node.mempool.entries();
            node.mempool.clear();

            new_tip = node.latest_hash();
            peers = node.connections.iter().cloned().collect();
            info!(accepted, dropped = old_branch.len(), ?new_tip, "accepted reorg");
        }

        for tx in stale_mempool {
            self.add_transaction_to_mempool(tx);
        }

        // Step 8: propagate with ourselves as sender (the source's bug here
        // renotified itself instead of each neighbor; corrected).
        for peer in peers {
            peer.notify_of_block(new_tip.clone(), self.clone());
        }
    }

    // ---- wallet surface (SPEC_FULL.md §4.7) ----

    pub fn create_transaction(&self, target: PublicKey) -> Option<Transaction> {
        let chosen = {
            let node = self.0.borrow();
            node.utxo.entries().into_iter().find(|utxo_tx| {
                utxo_tx.output() == &node.public_key && !node.mempool.contains_input(&utxo_tx.txid())
            })?
        };

        let input_id = chosen.txid();
        let message = Transaction::signing_message(Some(&input_id), &target);
        let signature = {
            let node = self.0.borrow();
            crypto::sign(&message, &node.signing_key)
        };
        let tx = Transaction::new(target, Some(input_id), signature);
        self.add_transaction_to_mempool(tx.clone());
        Some(tx)
    }

    pub fn get_balance(&self) -> usize {
        let node = self.0.borrow();
        let my_key = node.public_key;
        let mut owned: Vec<TxId> = Vec::new();
        for block in node.chain.iter().rev() {
            for tx in block.txs() {
                if tx.output() == &my_key {
                    owned.push(tx.txid());
                }
            }
            for tx in block.txs() {
                if let Some(input) = tx.input() {
                    if let Some(pos) = owned.iter().position(|id| id == input) {
                        owned.remove(pos);
                    }
                }
            }
        }
        owned.len()
    }
}
