//! Chain data access: explorer ABI lookup and node reachability

pub mod abi;
pub mod client;
pub mod node;

pub use abi::{AbiEntry, AbiSummary};
pub use client::{AbiSource, EtherscanClient};
pub use node::RpcProbe;
