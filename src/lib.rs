//! VoltBridge: a client-side bridging workflow between Base and Solana.
//!
//! The crate is organized around one controller ([`workflow::BridgeWorkflow`])
//! driving two chain adapters ([`chain::evm`], [`chain::solana`]) plus a
//! soft-failing assistant client ([`assistant`]). All catalog data lives in
//! [`tokens`].

pub mod assistant;
pub mod chain;
pub mod core;
pub mod tokens;
pub mod workflow;
