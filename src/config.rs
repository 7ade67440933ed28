//! Tunables the reference model hard-codes as module-level constants. Kept
//! as a small value object instead, the way `Blockchain` elsewhere takes
//! `difficulty` and `genesis_timestamp` as constructor arguments rather
//! than baking them into the type.

/// Maximum number of transactions in a well-formed block.
pub const BLOCK_SIZE: usize = 10;

/// Length, in bytes, of a coinbase's random filler "signature".
pub const COINBASE_SIGNATURE_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeConfig {
    pub block_size: usize,
    pub coinbase_signature_len: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            block_size: BLOCK_SIZE,
            coinbase_signature_len: COINBASE_SIGNATURE_LEN,
        }
    }
}
