//! Raw blob-carrying block data as handed over by the fetch layer.
use alloy_primitives::{Address, B256, BlockHash, BlockNumber, Bytes, TxHash, U256};
use serde::{Deserialize, Serialize};

/// Header fields of a blob-carrying block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    /// Block hash
    pub hash: BlockHash,
    /// Block number
    pub number: BlockNumber,
    /// Block timestamp in Unix seconds
    pub timestamp: u64,
    /// Beacon chain slot
    pub slot: u64,
    /// Excess blob gas carried by the header
    pub excess_blob_gas: U256,
    /// Blob gas used by the block
    pub blob_gas_used: U256,
}

/// Blob-carrying transaction included in a [`RawBlock`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    /// Transaction hash
    pub hash: TxHash,
    /// Sender
    pub from: Address,
    /// Receiver
    pub to: Address,
    /// Position within the block
    pub index: u32,
    /// Gas price
    pub gas_price: U256,
    /// Maximum fee per blob gas the sender is willing to pay
    pub max_fee_per_blob_gas: U256,
}

/// Blob attached to a [`RawTransaction`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlob {
    /// Versioned hash of the blob's KZG commitment
    pub versioned_hash: B256,
    /// KZG commitment
    pub commitment: Bytes,
    /// KZG proof
    pub proof: Bytes,
    /// Hex-encoded blob payload
    pub data: String,
    /// Hash of the owning transaction
    pub tx_hash: TxHash,
    /// Position within the owning transaction's blob list
    pub index: u32,
}

/// Everything required to index one block.
///
/// Every blob must belong to one of `transactions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInput {
    /// Block header fields
    pub block: RawBlock,
    /// Blob-carrying transactions, ordered by index
    pub transactions: Vec<RawTransaction>,
    /// Blobs of all transactions in the block
    pub blobs: Vec<RawBlob>,
}
