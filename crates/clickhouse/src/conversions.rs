use crate::models::{
    AddressHistoryRow, AddressRow, BlobOnTransactionRow, BlobRow, BlockRow, TransactionRow,
};

use chrono::{DateTime, Utc};
use eyre::{Error, Result, WrapErr};
use indexer::{
    IndexedBlock,
    records::{
        AddressHistory, AddressRecord, BlobOnTransactionRecord, BlobRecord, BlockRecord,
        TransactionRecord,
    },
};
use std::convert::TryFrom;

fn unix_seconds(timestamp: &DateTime<Utc>) -> Result<u64> {
    u64::try_from(timestamp.timestamp())
        .wrap_err_with(|| format!("timestamp {timestamp} is before the unix epoch"))
}

impl TryFrom<&BlockRecord> for BlockRow {
    type Error = Error;

    fn try_from(block: &BlockRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            block_number: block.number,
            block_hash: block.hash.into(),
            block_ts: unix_seconds(&block.timestamp)?,
            slot: block.slot,
            blob_gas_used: block.blob_gas_used.into(),
            blob_gas_price: block.blob_gas_price.into(),
            excess_blob_gas: block.excess_blob_gas.into(),
            blob_as_calldata_gas_used: block.blob_as_calldata_gas_used.into(),
        })
    }
}

impl TryFrom<&TransactionRecord> for TransactionRow {
    type Error = Error;

    fn try_from(tx: &TransactionRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            tx_hash: tx.hash.into(),
            block_number: tx.block_number,
            block_hash: tx.block_hash.into(),
            block_ts: unix_seconds(&tx.block_timestamp)?,
            tx_index: tx.index,
            from_addr: tx.from_id.into(),
            to_addr: tx.to_id.into(),
            gas_price: tx.gas_price.into(),
            blob_gas_used: tx.blob_gas_used.into(),
            blob_gas_price: tx.blob_gas_price.into(),
            max_fee_per_blob_gas: tx.max_fee_per_blob_gas.into(),
            blob_as_calldata_gas_used: tx.blob_as_calldata_gas_used.into(),
            rollup: tx.rollup.map(|rollup| rollup.to_string()),
            category: tx.category.to_string(),
        })
    }
}

impl TryFrom<&BlobRecord> for BlobRow {
    type Error = Error;

    fn try_from(blob: &BlobRecord) -> Result<Self, Self::Error> {
        let size = u32::try_from(blob.size)
            .wrap_err_with(|| format!("blob {} is too large", blob.versioned_hash))?;

        Ok(Self {
            versioned_hash: blob.versioned_hash.into(),
            commitment: blob.commitment.to_string(),
            proof: blob.proof.to_string(),
            size,
            first_block_number: blob.first_block_number,
        })
    }
}

impl TryFrom<&BlobOnTransactionRecord> for BlobOnTransactionRow {
    type Error = Error;

    fn try_from(link: &BlobOnTransactionRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            versioned_hash: link.blob_hash.into(),
            tx_hash: link.tx_hash.into(),
            block_number: link.block_number,
            block_hash: link.block_hash.into(),
            block_ts: unix_seconds(&link.block_timestamp)?,
            blob_index: link.index,
        })
    }
}

impl From<&AddressRecord> for AddressRow {
    fn from(record: &AddressRecord) -> Self {
        Self { address: record.address.into() }
    }
}

impl From<&AddressHistory> for AddressHistoryRow {
    fn from(history: &AddressHistory) -> Self {
        Self {
            address: history.address.into(),
            category: history.category.to_string(),
            first_block_number_as_sender: history.first_block_number_as_sender,
            first_block_number_as_receiver: history.first_block_number_as_receiver,
        }
    }
}

/// Rows of every table for one indexed block.
#[derive(Debug, PartialEq, Eq)]
pub struct IndexedBlockRows {
    /// `blocks` row
    pub block: BlockRow,
    /// `transactions` rows
    pub transactions: Vec<TransactionRow>,
    /// `blobs` rows
    pub blobs: Vec<BlobRow>,
    /// `blobs_on_transactions` rows
    pub blobs_on_transactions: Vec<BlobOnTransactionRow>,
    /// `addresses` rows
    pub addresses: Vec<AddressRow>,
    /// `address_history` rows
    pub address_history: Vec<AddressHistoryRow>,
}

impl TryFrom<&IndexedBlock> for IndexedBlockRows {
    type Error = Error;

    fn try_from(indexed: &IndexedBlock) -> Result<Self, Self::Error> {
        Ok(Self {
            block: BlockRow::try_from(&indexed.block)?,
            transactions: indexed
                .transactions
                .iter()
                .map(TransactionRow::try_from)
                .collect::<Result<_>>()?,
            blobs: indexed.blobs.iter().map(BlobRow::try_from).collect::<Result<_>>()?,
            blobs_on_transactions: indexed
                .blobs_on_transactions
                .iter()
                .map(BlobOnTransactionRow::try_from)
                .collect::<Result<_>>()?,
            addresses: indexed.addresses.iter().map(AddressRow::from).collect(),
            address_history: indexed.address_history.iter().map(AddressHistoryRow::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256, Bytes, U256};
    use indexer::records::Category;
    use rollups::Rollup;

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(secs, 0).unwrap()
    }

    fn transaction(rollup: Option<Rollup>) -> TransactionRecord {
        TransactionRecord {
            block_hash: B256::repeat_byte(1),
            block_number: 7,
            block_timestamp: ts(1_700_000_000),
            hash: B256::repeat_byte(2),
            from_id: Address::repeat_byte(3),
            to_id: Address::repeat_byte(4),
            index: 0,
            gas_price: U256::from(10),
            blob_gas_used: U256::from(131_072),
            blob_gas_price: U256::from(1),
            max_fee_per_blob_gas: U256::from(5),
            blob_as_calldata_gas_used: U256::from(400),
            rollup,
            category: Category::from_rollup(rollup),
        }
    }

    #[test]
    fn block_row_stores_seconds_and_little_endian_gas() {
        let block = BlockRecord {
            number: 7,
            hash: B256::repeat_byte(1),
            timestamp: ts(1_700_000_000),
            slot: 9,
            blob_gas_used: U256::from(131_072),
            blob_gas_price: U256::from(1),
            excess_blob_gas: U256::ZERO,
            blob_as_calldata_gas_used: U256::from(400),
        };

        let row = BlockRow::try_from(&block).unwrap();
        assert_eq!(row.block_ts, 1_700_000_000);
        assert_eq!(row.block_hash.0, [1u8; 32]);
        assert_eq!(row.blob_gas_used.to_u256(), U256::from(131_072));
        assert_eq!(row.blob_gas_used.0[2], 0x02);
    }

    #[test]
    fn transaction_row_renders_rollup_and_category() {
        let row = TransactionRow::try_from(&transaction(Some(Rollup::Base))).unwrap();
        assert_eq!(row.rollup.as_deref(), Some("base"));
        assert_eq!(row.category, "ROLLUP");

        let row = TransactionRow::try_from(&transaction(None)).unwrap();
        assert_eq!(row.rollup, None);
        assert_eq!(row.category, "OTHER");
    }

    #[test]
    fn blob_row_hex_encodes_kzg_fields() {
        let blob = BlobRecord {
            versioned_hash: B256::repeat_byte(0x01),
            commitment: Bytes::from(vec![0xab, 0xcd]),
            proof: Bytes::from(vec![0x00]),
            size: 131_072,
            first_block_number: 7,
        };

        let row = BlobRow::try_from(&blob).unwrap();
        assert_eq!(row.commitment, "0xabcd");
        assert_eq!(row.proof, "0x00");
        assert_eq!(row.size, 131_072);
    }

    #[test]
    fn pre_epoch_timestamp_is_rejected() {
        let mut tx = transaction(None);
        tx.block_timestamp = ts(-1);
        assert!(TransactionRow::try_from(&tx).is_err());
    }

    #[test]
    fn address_history_keeps_missing_roles_null() {
        let mut history = AddressHistory::new(Address::repeat_byte(5), Category::Other);
        history.observe_receiver(12);

        let row = AddressHistoryRow::from(&history);
        assert_eq!(row.first_block_number_as_sender, None);
        assert_eq!(row.first_block_number_as_receiver, Some(12));
        assert_eq!(row.category, "OTHER");
    }
}
