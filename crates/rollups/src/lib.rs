//! Rollup classification of blob submitters.
//!
//! Rollups post their batches from a small set of well known submitter addresses. A
//! [`RollupClassifier`] maps such an address on a given chain to the [`Rollup`] it belongs to.
use std::collections::HashMap;

use alloy_primitives::{Address, address};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ethereum mainnet chain id.
pub const MAINNET_CHAIN_ID: u64 = 1;

/// Known rollups posting blobs to Ethereum.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rollup {
    /// Arbitrum One
    #[display("arbitrum")]
    Arbitrum,
    /// Base
    #[display("base")]
    Base,
    /// Blast
    #[display("blast")]
    Blast,
    /// Kroma
    #[display("kroma")]
    Kroma,
    /// Mode
    #[display("mode")]
    Mode,
    /// OP Mainnet
    #[display("optimism")]
    Optimism,
    /// Scroll
    #[display("scroll")]
    Scroll,
    /// Starknet
    #[display("starknet")]
    Starknet,
    /// Taiko
    #[display("taiko")]
    Taiko,
    /// zkSync Era
    #[display("zksync")]
    Zksync,
    /// Zora
    #[display("zora")]
    Zora,
}

/// Batch submitters on Ethereum mainnet.
const MAINNET_SUBMITTERS: &[(Address, Rollup)] = &[
    (address!("c1b634853cb333d3ad8663715b08f41a3aec47cc"), Rollup::Arbitrum),
    (address!("5050f69a9786f081509234f1a7f4684b5e5b76c9"), Rollup::Base),
    (address!("415c8893d514f9bc5211d36eeda4183226b84aa7"), Rollup::Blast),
    (address!("41b8cd6791de4d8f9e0eaf7861ac506822adce12"), Rollup::Kroma),
    (address!("99199a22125034c808ff20f377d91187e8050f2e"), Rollup::Mode),
    (address!("6887246668a3b87f54deb3b94ba47a6f63f32985"), Rollup::Optimism),
    (address!("cf2898225ed05be911d3709d9417e86e0b4cfc8f"), Rollup::Scroll),
    (address!("2c169dfe5fbba12957bdd0ba47d9cedbfe260ca4"), Rollup::Starknet),
    (address!("000000633b68f5d8d3a86593ebb815b4663bcbe0"), Rollup::Taiko),
    (address!("0d3250c3d5facb74ac15834096397a3ef790ec99"), Rollup::Zksync),
    (address!("625726c858dbf78c0125436c943bf4b4be9d9033"), Rollup::Zora),
];

/// Errors raised while classifying an address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierError {
    /// The lookup could not be completed.
    #[error("rollup lookup for {address} on chain {chain_id} failed: {reason}")]
    Lookup {
        /// Address being classified
        address: Address,
        /// Chain the lookup was performed for
        chain_id: u64,
        /// Failure reason reported by the lookup backend
        reason: String,
    },
}

/// Maps a sender address to the rollup it submits batches for.
pub trait RollupClassifier: Send + Sync {
    /// Returns the rollup `address` belongs to on `chain_id`, or `None` for other senders.
    fn classify(&self, address: Address, chain_id: u64) -> Result<Option<Rollup>, ClassifierError>;
}

/// In-memory registry of rollup batch submitters keyed by chain id.
#[derive(Debug, Clone, Default)]
pub struct RollupRegistry {
    submitters: HashMap<(u64, Address), Rollup>,
}

impl RollupRegistry {
    /// Registry with no known submitters.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry preloaded with the known mainnet batch submitters.
    pub fn with_known_submitters() -> Self {
        let mut registry = Self::empty();
        for (address, rollup) in MAINNET_SUBMITTERS {
            registry.insert(MAINNET_CHAIN_ID, *address, *rollup);
        }
        registry
    }

    /// Registers `address` as a batch submitter of `rollup` on `chain_id`.
    ///
    /// Returns the rollup previously registered for the address, if any.
    pub fn insert(&mut self, chain_id: u64, address: Address, rollup: Rollup) -> Option<Rollup> {
        self.submitters.insert((chain_id, address), rollup)
    }

    /// Number of registered submitters across all chains.
    pub fn len(&self) -> usize {
        self.submitters.len()
    }

    /// Whether the registry knows no submitter at all.
    pub fn is_empty(&self) -> bool {
        self.submitters.is_empty()
    }
}

impl RollupClassifier for RollupRegistry {
    fn classify(&self, address: Address, chain_id: u64) -> Result<Option<Rollup>, ClassifierError> {
        Ok(self.submitters.get(&(chain_id, address)).copied())
    }
}
