//! Identifier newtypes. `TxId` is always a real SHA-256 digest. `BlockHash`
//! additionally has to represent the genesis sentinel, whose literal byte
//! value (`b"Genesis"`) isn't 32 bytes long, so it can't be the fixed-size
//! array `TxId` is.

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxId(pub [u8; 32]);

impl TxId {
    pub fn from_digest(bytes: [u8; 32]) -> Self {
        TxId(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({})", hex::encode(self.0))
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BlockHash(Vec<u8>);

impl BlockHash {
    /// The sentinel previous-hash of the first block on a chain.
    pub fn genesis() -> Self {
        BlockHash(b"Genesis".to_vec())
    }

    pub fn from_digest(bytes: [u8; 32]) -> Self {
        BlockHash(bytes.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self == &BlockHash::genesis() {
            write!(f, "BlockHash(Genesis)")
        } else {
            write!(f, "BlockHash({})", hex::encode(&self.0))
        }
    }
}
