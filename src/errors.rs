//! The two structural-misuse error types. Everything else the node can
//! reject (bad transactions, rejected reorgs) is an expected outcome of a
//! contested network and stays a `bool`/`Option`, not an `Err` — see
//! SPEC_FULL.md §7.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("a node cannot connect to itself")]
    SelfConnection,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BlockLookupError {
    #[error("unknown block {0:?}")]
    Unknown(crate::ids::BlockHash),
}
