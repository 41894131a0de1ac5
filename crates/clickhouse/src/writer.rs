//! `ClickHouse` writer functionality for blobscope
//! Handles database initialization and data insertion

use clickhouse::{Client, Row};
use derive_more::Debug;
use eyre::{Context, Result};
use indexer::{IndexedBlock, records::AddressHistory};
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use crate::{
    conversions::IndexedBlockRows,
    models::AddressHistoryRow,
    schema::{TABLE_SCHEMAS, TABLES, TableSchema},
};

/// `ClickHouse` writer client for blobscope (schema management and data insertion)
#[derive(Clone, Debug)]
pub struct ClickhouseWriter {
    /// Base client
    #[debug(skip)]
    base: Client,
    /// Database name
    db_name: String,
}

impl ClickhouseWriter {
    /// Create a new `ClickHouse` writer client
    pub fn new(url: Url, db_name: String, username: String, password: String) -> Result<Self> {
        let client = Client::default()
            .with_url(url)
            .with_database(db_name.clone())
            .with_user(username)
            .with_password(password);

        Ok(Self { base: client, db_name })
    }

    /// Create a table with the given schema
    async fn create_table(&self, schema: &TableSchema) -> Result<()> {
        let query = format!(
            "CREATE TABLE IF NOT EXISTS {}.{} (
                {}
            ) ENGINE = {}
            ORDER BY ({})",
            self.db_name, schema.name, schema.columns, schema.engine, schema.order_by
        );

        self.base
            .query(&query)
            .execute()
            .await
            .wrap_err_with(|| format!("Failed to create {} table", schema.name))
    }

    /// Drop a table if it exists
    async fn drop_table(&self, table_name: &str) -> Result<()> {
        self.base
            .query(&format!("DROP TABLE IF EXISTS {}.{}", self.db_name, table_name))
            .execute()
            .await
            .wrap_err_with(|| format!("Failed to drop {} table", table_name))
    }

    /// Initialize database and optionally reset
    pub async fn init_db(&self, reset: bool) -> Result<()> {
        self.base
            .query(&format!("CREATE DATABASE IF NOT EXISTS {}", self.db_name))
            .execute()
            .await
            .wrap_err_with(|| format!("Failed to create database {}", self.db_name))?;

        if reset {
            for table in TABLES {
                self.drop_table(table).await?;
            }
            info!(db_name = %self.db_name, "Database reset complete");
        }

        self.init_schema().await
    }

    /// Initialize schema
    pub async fn init_schema(&self) -> Result<()> {
        for schema in TABLE_SCHEMAS {
            self.create_table(schema).await?;
        }
        info!(db_name = %self.db_name, tables = TABLE_SCHEMAS.len(), "Schema initialized");
        Ok(())
    }

    /// Insert rows into `table` in a single request. Empty slices are skipped.
    async fn insert_rows<T>(&self, table: &str, rows: &[T]) -> Result<()>
    where
        T: Row + Serialize,
    {
        if rows.is_empty() {
            return Ok(());
        }

        let client = self.base.clone().with_database(&self.db_name);
        let mut insert = client.insert(table)?;
        for row in rows {
            insert.write(row).await?;
        }
        insert.end().await.wrap_err_with(|| format!("Failed to insert into {table}"))?;

        debug!(table, rows = rows.len(), "Inserted rows");
        Ok(())
    }

    /// Insert every record of an indexed block.
    ///
    /// All rows are converted before anything is written. Child tables are written first and the
    /// `blocks` row last, so a block row is only visible once its transactions, blobs and
    /// addresses are stored. Replaying a block is idempotent: the replacing and aggregating table
    /// engines collapse duplicate rows on merge.
    pub async fn insert_indexed_block(&self, indexed: &IndexedBlock) -> Result<()> {
        let rows = IndexedBlockRows::try_from(indexed).wrap_err_with(|| {
            format!("Failed to convert block {} into rows", indexed.block.number)
        })?;

        self.insert_rows("addresses", &rows.addresses).await?;
        self.insert_rows("address_history", &rows.address_history).await?;
        self.insert_rows("blobs", &rows.blobs).await?;
        self.insert_rows("transactions", &rows.transactions).await?;
        self.insert_rows("blobs_on_transactions", &rows.blobs_on_transactions).await?;
        self.insert_rows("blocks", std::slice::from_ref(&rows.block)).await?;

        info!(
            block_number = indexed.block.number,
            transactions = rows.transactions.len(),
            blobs = rows.blobs.len(),
            "Stored block"
        );
        Ok(())
    }

    /// Insert an address history delta, such as one aggregated over several blocks.
    pub async fn insert_address_history(&self, history: &[AddressHistory]) -> Result<()> {
        let rows: Vec<AddressHistoryRow> = history.iter().map(AddressHistoryRow::from).collect();
        self.insert_rows("address_history", &rows).await?;
        info!(entries = rows.len(), "Stored address history");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::models::{AddressRow, BlobOnTransactionRow, BlobRow, BlockRow, TransactionRow};
    use alloy_primitives::{Address, B256, U256};
    use clickhouse::test::{Mock, handlers};
    use indexer::{BlockIndexer, records::Category};
    use primitives::block::BlockInput;
    use rollups::RollupRegistry;

    fn writer(mock: &Mock) -> ClickhouseWriter {
        let url = Url::parse(mock.url()).unwrap();
        ClickhouseWriter::new(url, "db".to_owned(), "user".into(), "pass".into()).unwrap()
    }

    fn indexed_block(with_transaction: bool) -> IndexedBlock {
        let transactions = if with_transaction {
            serde_json::json!([{
                "hash": B256::repeat_byte(0x22),
                "from": Address::repeat_byte(0x33),
                "to": Address::repeat_byte(0x44),
                "index": 0,
                "gasPrice": "0x1",
                "maxFeePerBlobGas": "0x5"
            }])
        } else {
            serde_json::json!([])
        };
        let blobs = if with_transaction {
            serde_json::json!([{
                "versionedHash": B256::repeat_byte(0x55),
                "commitment": "0xabcd",
                "proof": "0x00",
                "data": "0x0001",
                "txHash": B256::repeat_byte(0x22),
                "index": 0
            }])
        } else {
            serde_json::json!([])
        };
        let input: BlockInput = serde_json::from_value(serde_json::json!({
            "block": {
                "hash": B256::repeat_byte(0x11),
                "number": 100,
                "timestamp": 1_700_000_000u64,
                "slot": 200,
                "excessBlobGas": "0x0",
                "blobGasUsed": "0x20000"
            },
            "transactions": transactions,
            "blobs": blobs
        }))
        .unwrap();

        BlockIndexer::new(1, RollupRegistry::empty()).index(&input).unwrap()
    }

    #[tokio::test]
    async fn create_table_generates_correct_query() {
        let mock = Mock::new();
        let ctl = mock.add(handlers::record_ddl());

        writer(&mock).create_table(&TABLE_SCHEMAS[1]).await.unwrap();
        let query = ctl.query().await;
        assert!(query.contains("CREATE TABLE IF NOT EXISTS db.address_history"));
        assert!(query.contains("ENGINE = AggregatingMergeTree()"));
        assert!(query.contains("ORDER BY (address, category)"));
    }

    #[tokio::test]
    async fn insert_indexed_block_writes_children_before_block() {
        let mock = Mock::new();
        let addresses = mock.add(handlers::record::<AddressRow>());
        let history = mock.add(handlers::record::<AddressHistoryRow>());
        let blobs = mock.add(handlers::record::<BlobRow>());
        let transactions = mock.add(handlers::record::<TransactionRow>());
        let links = mock.add(handlers::record::<BlobOnTransactionRow>());
        let blocks = mock.add(handlers::record::<BlockRow>());

        writer(&mock).insert_indexed_block(&indexed_block(true)).await.unwrap();

        let addresses: Vec<AddressRow> = addresses.collect().await;
        assert_eq!(
            addresses,
            vec![
                AddressRow { address: Address::repeat_byte(0x33).into() },
                AddressRow { address: Address::repeat_byte(0x44).into() },
            ]
        );

        let history: Vec<AddressHistoryRow> = history.collect().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].first_block_number_as_sender, Some(100));
        assert_eq!(history[1].first_block_number_as_receiver, Some(100));

        let blobs: Vec<BlobRow> = blobs.collect().await;
        assert_eq!(
            blobs,
            vec![BlobRow {
                versioned_hash: B256::repeat_byte(0x55).into(),
                commitment: "0xabcd".to_owned(),
                proof: "0x00".to_owned(),
                size: 2,
                first_block_number: 100,
            }]
        );

        let transactions: Vec<TransactionRow> = transactions.collect().await;
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].blob_as_calldata_gas_used.to_u256(), U256::from(20));
        assert_eq!(transactions[0].category, "OTHER");

        let links: Vec<BlobOnTransactionRow> = links.collect().await;
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].block_ts, 1_700_000_000);

        let blocks: Vec<BlockRow> = blocks.collect().await;
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].block_number, 100);
        assert_eq!(blocks[0].blob_gas_price.to_u256(), U256::from(1));
    }

    #[tokio::test]
    async fn insert_indexed_block_without_transactions_only_writes_block() {
        let mock = Mock::new();
        let blocks = mock.add(handlers::record::<BlockRow>());

        writer(&mock).insert_indexed_block(&indexed_block(false)).await.unwrap();

        let blocks: Vec<BlockRow> = blocks.collect().await;
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].blob_as_calldata_gas_used.to_u256(), U256::ZERO);
    }

    #[tokio::test]
    async fn insert_address_history_writes_aggregated_rows() {
        let mock = Mock::new();
        let ctl = mock.add(handlers::record::<AddressHistoryRow>());

        let mut sender = AddressHistory::new(Address::repeat_byte(0x33), Category::Rollup);
        sender.observe_sender(102);
        let mut receiver = AddressHistory::new(Address::repeat_byte(0x44), Category::Other);
        receiver.observe_receiver(105);

        writer(&mock).insert_address_history(&[sender, receiver]).await.unwrap();

        let rows: Vec<AddressHistoryRow> = ctl.collect().await;
        assert_eq!(
            rows,
            vec![
                AddressHistoryRow {
                    address: Address::repeat_byte(0x33).into(),
                    category: "ROLLUP".to_owned(),
                    first_block_number_as_sender: Some(102),
                    first_block_number_as_receiver: None,
                },
                AddressHistoryRow {
                    address: Address::repeat_byte(0x44).into(),
                    category: "OTHER".to_owned(),
                    first_block_number_as_sender: None,
                    first_block_number_as_receiver: Some(105),
                },
            ]
        );
    }
}
