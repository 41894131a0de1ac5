use clickhouse::Row;
use serde::{Deserialize, Serialize};

use crate::types::{AddressBytes, HashBytes, U256Bytes};

/// Block row
#[derive(Debug, Row, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockRow {
    /// Block number
    pub block_number: u64,
    /// Block hash
    pub block_hash: HashBytes,
    /// Block timestamp in seconds
    pub block_ts: u64,
    /// Beacon slot
    pub slot: u64,
    /// Blob gas used by the block
    pub blob_gas_used: U256Bytes,
    /// Blob base fee
    pub blob_gas_price: U256Bytes,
    /// Excess blob gas
    pub excess_blob_gas: U256Bytes,
    /// Calldata gas the block's blobs would have cost
    pub blob_as_calldata_gas_used: U256Bytes,
}

/// Blob-carrying transaction row
#[derive(Debug, Row, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionRow {
    /// Transaction hash
    pub tx_hash: HashBytes,
    /// Block number
    pub block_number: u64,
    /// Block hash
    pub block_hash: HashBytes,
    /// Block timestamp in seconds
    pub block_ts: u64,
    /// Position in the block
    pub tx_index: u32,
    /// Sender
    pub from_addr: AddressBytes,
    /// Receiver
    pub to_addr: AddressBytes,
    /// Gas price
    pub gas_price: U256Bytes,
    /// Blob gas used
    pub blob_gas_used: U256Bytes,
    /// Blob base fee of the block
    pub blob_gas_price: U256Bytes,
    /// Max fee per blob gas the sender was willing to pay
    pub max_fee_per_blob_gas: U256Bytes,
    /// Calldata gas the transaction's blobs would have cost
    pub blob_as_calldata_gas_used: U256Bytes,
    /// Rollup name, if the sender is a known submitter
    pub rollup: Option<String>,
    /// `ROLLUP` or `OTHER`
    pub category: String,
}

/// Blob row
#[derive(Debug, Row, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlobRow {
    /// Versioned hash
    pub versioned_hash: HashBytes,
    /// KZG commitment, hex encoded
    pub commitment: String,
    /// KZG proof, hex encoded
    pub proof: String,
    /// Payload size in bytes
    pub size: u32,
    /// Earliest block the blob was seen in
    pub first_block_number: u64,
}

/// Blob occurrence row
#[derive(Debug, Row, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlobOnTransactionRow {
    /// Blob versioned hash
    pub versioned_hash: HashBytes,
    /// Transaction hash
    pub tx_hash: HashBytes,
    /// Block number
    pub block_number: u64,
    /// Block hash
    pub block_hash: HashBytes,
    /// Block timestamp in seconds
    pub block_ts: u64,
    /// Position of the blob within the transaction
    pub blob_index: u32,
}

/// Address row
#[derive(Debug, Row, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressRow {
    /// Address
    pub address: AddressBytes,
}

/// Address history row
#[derive(Debug, Row, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressHistoryRow {
    /// Address
    pub address: AddressBytes,
    /// `ROLLUP` or `OTHER`
    pub category: String,
    /// Earliest block the address sent a blob transaction in
    pub first_block_number_as_sender: Option<u64>,
    /// Earliest block the address received a blob transaction in
    pub first_block_number_as_receiver: Option<u64>,
}
