//! Builds block, transaction, blob and blob-occurrence records from raw block data.
use alloy_primitives::{B256, TxHash, U256};
use chrono::{DateTime, TimeZone, Utc};
use indexmap::{IndexMap, map::Entry};
use primitives::{
    blob_gas::{blob_byte_size, blob_gas_price, blob_gas_used, calldata_gas_cost},
    block::{BlockInput, RawBlob, RawTransaction},
};
use rollups::RollupClassifier;
use tracing::{debug, warn};

use crate::{
    error::IndexError,
    records::{BlobOnTransactionRecord, BlobRecord, BlockRecord, Category, TransactionRecord},
};

/// Records derived from a single block, before address extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRecords {
    /// Block record
    pub block: BlockRecord,
    /// One record per transaction, in input order
    pub transactions: Vec<TransactionRecord>,
    /// One record per distinct versioned hash, in order of first occurrence
    pub blobs: Vec<BlobRecord>,
    /// One record per blob occurrence, in input order
    pub blobs_on_transactions: Vec<BlobOnTransactionRecord>,
}

/// Turns a [`BlockInput`] into [`BlockRecords`].
#[derive(Debug, Clone)]
pub struct RecordBuilder<C> {
    chain_id: u64,
    classifier: C,
}

impl<C: RollupClassifier> RecordBuilder<C> {
    /// Create a builder classifying senders on `chain_id` with `classifier`.
    pub const fn new(chain_id: u64, classifier: C) -> Self {
        Self { chain_id, classifier }
    }

    /// Chain id senders are classified against.
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Build all records for `input`. Nothing is returned unless every record could be built.
    pub fn build(&self, input: &BlockInput) -> Result<BlockRecords, IndexError> {
        let block = &input.block;
        let timestamp = block_time(block.timestamp)?;
        let blob_gas_price = blob_gas_price(block.excess_blob_gas).map_err(IndexError::Arithmetic)?;

        let blobs_by_tx = group_blobs(input)?;

        let transactions = input
            .transactions
            .iter()
            .map(|tx| {
                let blobs = blobs_by_tx.get(&tx.hash).map(Vec::as_slice).unwrap_or_default();
                self.build_transaction(input, tx, blobs, timestamp, blob_gas_price)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let blob_as_calldata_gas_used =
            checked_gas_sum(transactions.iter().map(|tx| tx.blob_as_calldata_gas_used))
                .ok_or(IndexError::CalldataGasOverflow(block.hash))?;

        let blobs = unique_blobs(input)?;

        let blobs_on_transactions = input
            .blobs
            .iter()
            .map(|blob| BlobOnTransactionRecord {
                blob_hash: blob.versioned_hash,
                block_hash: block.hash,
                block_number: block.number,
                block_timestamp: timestamp,
                tx_hash: blob.tx_hash,
                index: blob.index,
            })
            .collect();

        debug!(
            block_number = block.number,
            transactions = transactions.len(),
            blobs = blobs.len(),
            %blob_gas_price,
            "Built block records"
        );

        Ok(BlockRecords {
            block: BlockRecord {
                number: block.number,
                hash: block.hash,
                timestamp,
                slot: block.slot,
                blob_gas_used: block.blob_gas_used,
                blob_gas_price,
                excess_blob_gas: block.excess_blob_gas,
                blob_as_calldata_gas_used,
            },
            transactions,
            blobs,
            blobs_on_transactions,
        })
    }

    fn build_transaction(
        &self,
        input: &BlockInput,
        tx: &RawTransaction,
        blobs: &[&RawBlob],
        block_timestamp: DateTime<Utc>,
        blob_gas_price: U256,
    ) -> Result<TransactionRecord, IndexError> {
        if blobs.is_empty() {
            warn!(block_number = input.block.number, tx_hash = %tx.hash, "Transaction has no blobs");
            return Err(IndexError::MissingBlobs(tx.hash));
        }

        let costs = blobs
            .iter()
            .map(|blob| {
                calldata_gas_cost(&blob.data).map_err(|source| IndexError::InvalidBlobData {
                    versioned_hash: blob.versioned_hash,
                    tx_hash: tx.hash,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let blob_as_calldata_gas_used =
            checked_gas_sum(costs).ok_or(IndexError::CalldataGasOverflow(tx.hash))?;

        let rollup = self.classifier.classify(tx.from, self.chain_id).map_err(|source| {
            IndexError::Classification { tx_hash: tx.hash, address: tx.from, source }
        })?;

        Ok(TransactionRecord {
            block_hash: input.block.hash,
            block_number: input.block.number,
            block_timestamp,
            hash: tx.hash,
            from_id: tx.from,
            to_id: tx.to,
            index: tx.index,
            gas_price: tx.gas_price,
            blob_gas_used: blob_gas_used(blobs.len()),
            blob_gas_price,
            max_fee_per_blob_gas: tx.max_fee_per_blob_gas,
            blob_as_calldata_gas_used,
            rollup,
            category: Category::from_rollup(rollup),
        })
    }
}

/// Sums gas amounts, returning `None` if the total exceeds 256 bits.
fn checked_gas_sum(values: impl IntoIterator<Item = U256>) -> Option<U256> {
    values.into_iter().try_fold(U256::ZERO, |sum, value| sum.checked_add(value))
}

/// Converts a Unix timestamp in seconds into a UTC date.
fn block_time(timestamp: u64) -> Result<DateTime<Utc>, IndexError> {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .ok_or(IndexError::InvalidTimestamp(timestamp))
}

/// Groups blobs by owning transaction, keyed in transaction order.
fn group_blobs(input: &BlockInput) -> Result<IndexMap<TxHash, Vec<&RawBlob>>, IndexError> {
    let mut blobs_by_tx: IndexMap<TxHash, Vec<&RawBlob>> =
        IndexMap::with_capacity(input.transactions.len());
    for tx in &input.transactions {
        if blobs_by_tx.insert(tx.hash, Vec::new()).is_some() {
            return Err(IndexError::DuplicateTransaction(tx.hash));
        }
    }

    for blob in &input.blobs {
        match blobs_by_tx.get_mut(&blob.tx_hash) {
            Some(blobs) => blobs.push(blob),
            None => {
                return Err(IndexError::OrphanBlob {
                    versioned_hash: blob.versioned_hash,
                    tx_hash: blob.tx_hash,
                });
            }
        }
    }

    Ok(blobs_by_tx)
}

/// One record per distinct versioned hash, built from its first occurrence.
///
/// Later occurrences must carry the same commitment and proof.
fn unique_blobs(input: &BlockInput) -> Result<Vec<BlobRecord>, IndexError> {
    let mut unique: IndexMap<B256, BlobRecord> = IndexMap::with_capacity(input.blobs.len());

    for blob in &input.blobs {
        match unique.entry(blob.versioned_hash) {
            Entry::Occupied(first) => {
                let first = first.get();
                if first.commitment != blob.commitment || first.proof != blob.proof {
                    warn!(versioned_hash = %blob.versioned_hash, "Conflicting duplicate blob");
                    return Err(IndexError::ConflictingBlob(blob.versioned_hash));
                }
            }
            Entry::Vacant(slot) => {
                let size = blob_byte_size(&blob.data).map_err(|source| {
                    IndexError::InvalidBlobData {
                        versioned_hash: blob.versioned_hash,
                        tx_hash: blob.tx_hash,
                        source,
                    }
                })?;
                slot.insert(BlobRecord {
                    versioned_hash: blob.versioned_hash,
                    commitment: blob.commitment.clone(),
                    proof: blob.proof.clone(),
                    size: size as u64,
                    first_block_number: input.block.number,
                });
            }
        }
    }

    Ok(unique.into_values().collect())
}
