//! Schema definitions for ClickHouse tables

/// Table schema definition
#[derive(Debug)]
pub struct TableSchema {
    /// Table name
    pub name: &'static str,
    /// Column definitions
    pub columns: &'static str,
    /// Table engine
    pub engine: &'static str,
    /// Sorting key, which is also the deduplication key of replacing and aggregating engines
    pub order_by: &'static str,
}

/// Names of all tables, in the order rows of one block are inserted.
///
/// `blocks` comes last: a block row is only written once every other record of the block is
/// stored.
pub const TABLES: &[&str] = &[
    "addresses",
    "address_history",
    "blobs",
    "transactions",
    "blobs_on_transactions",
    "blocks",
];

/// Schema definitions for tables
pub const TABLE_SCHEMAS: &[TableSchema] = &[
    TableSchema {
        name: "addresses",
        columns: "address FixedString(20),
                 inserted_at DateTime64(3) DEFAULT now64()",
        engine: "ReplacingMergeTree()",
        order_by: "address",
    },
    TableSchema {
        name: "address_history",
        columns: "address FixedString(20),
                 category LowCardinality(String),
                 first_block_number_as_sender SimpleAggregateFunction(min, Nullable(UInt64)),
                 first_block_number_as_receiver SimpleAggregateFunction(min, Nullable(UInt64))",
        engine: "AggregatingMergeTree()",
        order_by: "address, category",
    },
    TableSchema {
        name: "blobs",
        columns: "versioned_hash FixedString(32),
                 commitment SimpleAggregateFunction(any, String),
                 proof SimpleAggregateFunction(any, String),
                 size SimpleAggregateFunction(any, UInt32),
                 first_block_number SimpleAggregateFunction(min, UInt64)",
        engine: "AggregatingMergeTree()",
        order_by: "versioned_hash",
    },
    TableSchema {
        name: "transactions",
        columns: "tx_hash FixedString(32),
                 block_number UInt64,
                 block_hash FixedString(32),
                 block_ts UInt64,
                 tx_index UInt32,
                 from_addr FixedString(20),
                 to_addr FixedString(20),
                 gas_price UInt256,
                 blob_gas_used UInt256,
                 blob_gas_price UInt256,
                 max_fee_per_blob_gas UInt256,
                 blob_as_calldata_gas_used UInt256,
                 rollup Nullable(String),
                 category LowCardinality(String),
                 inserted_at DateTime64(3) DEFAULT now64()",
        engine: "ReplacingMergeTree()",
        order_by: "tx_hash, block_hash",
    },
    TableSchema {
        name: "blobs_on_transactions",
        columns: "versioned_hash FixedString(32),
                 tx_hash FixedString(32),
                 block_number UInt64,
                 block_hash FixedString(32),
                 block_ts UInt64,
                 blob_index UInt32,
                 inserted_at DateTime64(3) DEFAULT now64()",
        engine: "ReplacingMergeTree()",
        order_by: "versioned_hash, tx_hash, block_hash, blob_index",
    },
    TableSchema {
        name: "blocks",
        columns: "block_number UInt64,
                 block_hash FixedString(32),
                 block_ts UInt64,
                 slot UInt64,
                 blob_gas_used UInt256,
                 blob_gas_price UInt256,
                 excess_blob_gas UInt256,
                 blob_as_calldata_gas_used UInt256,
                 inserted_at DateTime64(3) DEFAULT now64()",
        engine: "ReplacingMergeTree()",
        order_by: "block_number, block_hash",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_has_a_schema_in_insert_order() {
        let names: Vec<_> = TABLE_SCHEMAS.iter().map(|s| s.name).collect();
        assert_eq!(names, TABLES);
    }
}
