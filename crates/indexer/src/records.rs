//! Normalized records produced for one indexed block.
use alloy_primitives::{Address, B256, BlockHash, BlockNumber, Bytes, TxHash, U256};
use chrono::{DateTime, Utc};
use derive_more::Display;
use rollups::Rollup;
use serde::{Deserialize, Serialize};

/// Transaction category used for aggregate statistics.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Sent by a known rollup batch submitter
    #[display("ROLLUP")]
    Rollup,
    /// Any other sender
    #[display("OTHER")]
    Other,
}

impl Category {
    /// Category of a transaction whose sender classified as `rollup`.
    pub const fn from_rollup(rollup: Option<Rollup>) -> Self {
        match rollup {
            Some(_) => Self::Rollup,
            None => Self::Other,
        }
    }
}

/// Block record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRecord {
    /// Block number
    pub number: BlockNumber,
    /// Block hash
    pub hash: BlockHash,
    /// Block time
    pub timestamp: DateTime<Utc>,
    /// Beacon chain slot
    pub slot: u64,
    /// Blob gas used by the block
    pub blob_gas_used: U256,
    /// Base fee per blob gas derived from `excess_blob_gas`
    pub blob_gas_price: U256,
    /// Excess blob gas
    pub excess_blob_gas: U256,
    /// Sum of `blob_as_calldata_gas_used` over the block's transactions
    pub blob_as_calldata_gas_used: U256,
}

/// Transaction record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// Hash of the including block
    pub block_hash: BlockHash,
    /// Number of the including block
    pub block_number: BlockNumber,
    /// Time of the including block
    pub block_timestamp: DateTime<Utc>,
    /// Transaction hash
    pub hash: TxHash,
    /// Sender
    pub from_id: Address,
    /// Receiver
    pub to_id: Address,
    /// Position within the block
    pub index: u32,
    /// Gas price
    pub gas_price: U256,
    /// Blob gas consumed by the transaction's blobs
    pub blob_gas_used: U256,
    /// Base fee per blob gas of the including block
    pub blob_gas_price: U256,
    /// Maximum fee per blob gas
    pub max_fee_per_blob_gas: U256,
    /// EIP-2028 cost of the transaction's blobs posted as calldata
    pub blob_as_calldata_gas_used: U256,
    /// Rollup the sender submits for, if any
    pub rollup: Option<Rollup>,
    /// Category derived from `rollup`
    pub category: Category,
}

/// Distinct blob observed in a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobRecord {
    /// Versioned hash
    pub versioned_hash: B256,
    /// KZG commitment
    pub commitment: Bytes,
    /// KZG proof
    pub proof: Bytes,
    /// Payload size in bytes
    pub size: u64,
    /// Block the blob was first seen in
    pub first_block_number: BlockNumber,
}

/// Occurrence of a blob in a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobOnTransactionRecord {
    /// Versioned hash of the blob
    pub blob_hash: B256,
    /// Hash of the including block
    pub block_hash: BlockHash,
    /// Number of the including block
    pub block_number: BlockNumber,
    /// Time of the including block
    pub block_timestamp: DateTime<Utc>,
    /// Owning transaction
    pub tx_hash: TxHash,
    /// Position within the transaction's blob list
    pub index: u32,
}

/// Address seen as sender or receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Address
    pub address: Address,
}

/// First blocks in which an address acted as sender and as receiver within one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressHistory {
    /// Address
    pub address: Address,
    /// Category of the transactions considered
    pub category: Category,
    /// Lowest block number the address sent a transaction in
    pub first_block_number_as_sender: Option<BlockNumber>,
    /// Lowest block number the address received a transaction in
    pub first_block_number_as_receiver: Option<BlockNumber>,
}

impl AddressHistory {
    /// Empty history for `address` in `category`.
    pub const fn new(address: Address, category: Category) -> Self {
        Self {
            address,
            category,
            first_block_number_as_sender: None,
            first_block_number_as_receiver: None,
        }
    }

    /// Records that the address sent a transaction in `block_number`.
    pub fn observe_sender(&mut self, block_number: BlockNumber) {
        self.first_block_number_as_sender =
            min_block(self.first_block_number_as_sender, Some(block_number));
    }

    /// Records that the address received a transaction in `block_number`.
    pub fn observe_receiver(&mut self, block_number: BlockNumber) {
        self.first_block_number_as_receiver =
            min_block(self.first_block_number_as_receiver, Some(block_number));
    }

    /// Folds `other` into `self`, keeping the lowest known block for each role.
    ///
    /// Both entries must share the same address and category.
    pub fn merge(&mut self, other: &Self) {
        debug_assert_eq!((self.address, self.category), (other.address, other.category));
        self.first_block_number_as_sender =
            min_block(self.first_block_number_as_sender, other.first_block_number_as_sender);
        self.first_block_number_as_receiver =
            min_block(self.first_block_number_as_receiver, other.first_block_number_as_receiver);
    }
}

/// Minimum of two optional block numbers where `None` means "never seen".
fn min_block(a: Option<BlockNumber>, b: Option<BlockNumber>) -> Option<BlockNumber> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}
