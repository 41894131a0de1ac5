//! Blobscope indexer: turns raw blob-carrying blocks into storage records.
//!
//! [`BlockIndexer::index`] is pure and deterministic. Indexing the same input twice yields
//! identical output, and a failure yields no output at all.

/// Distinct address extraction
pub mod addresses;
/// Block, transaction and blob record construction
pub mod builder;
mod error;
/// Address history aggregation
pub mod history;
/// Output record types
pub mod records;

pub use error::{ErrorKind, IndexError};

use primitives::block::BlockInput;
use rollups::RollupClassifier;
use serde::Serialize;
use tracing::debug;

use crate::{
    addresses::extract_addresses,
    builder::{BlockRecords, RecordBuilder},
    history::aggregate_address_history,
    records::{
        AddressHistory, AddressRecord, BlobOnTransactionRecord, BlobRecord, BlockRecord,
        TransactionRecord,
    },
};

/// Every record derived from one block, handed to storage as a single unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedBlock {
    /// Block record
    pub block: BlockRecord,
    /// Transaction records
    pub transactions: Vec<TransactionRecord>,
    /// Distinct blobs
    pub blobs: Vec<BlobRecord>,
    /// Blob occurrences
    pub blobs_on_transactions: Vec<BlobOnTransactionRecord>,
    /// Distinct senders and receivers
    pub addresses: Vec<AddressRecord>,
    /// Address history delta of this block
    pub address_history: Vec<AddressHistory>,
}

/// Runs the full indexing pipeline for single blocks.
#[derive(Debug, Clone)]
pub struct BlockIndexer<C> {
    builder: RecordBuilder<C>,
}

impl<C: RollupClassifier> BlockIndexer<C> {
    /// Create an indexer classifying senders on `chain_id` with `classifier`.
    pub const fn new(chain_id: u64, classifier: C) -> Self {
        Self { builder: RecordBuilder::new(chain_id, classifier) }
    }

    /// Chain id senders are classified against.
    pub const fn chain_id(&self) -> u64 {
        self.builder.chain_id()
    }

    /// Index one block.
    pub fn index(&self, input: &BlockInput) -> Result<IndexedBlock, IndexError> {
        let BlockRecords { block, transactions, blobs, blobs_on_transactions } =
            self.builder.build(input)?;

        let addresses = extract_addresses(&transactions);
        let address_history = aggregate_address_history(&transactions);

        debug!(
            block_number = block.number,
            addresses = addresses.len(),
            history_entries = address_history.len(),
            "Indexed block"
        );

        Ok(IndexedBlock {
            block,
            transactions,
            blobs,
            blobs_on_transactions,
            addresses,
            address_history,
        })
    }
}
