//! Blobscope: indexes EIP-4844 blob transactions from block input files.

use std::path::Path;

use clap::Parser;
use clickhouse_lib::ClickhouseWriter;
use config::Opts;
use dotenvy::dotenv;
use eyre::{WrapErr, eyre};
use indexer::{
    BlockIndexer, IndexedBlock, history::AddressHistoryAggregator, records::AddressHistory,
};
use primitives::block::BlockInput;
use rollups::{RollupClassifier, RollupRegistry};
use tracing::{error, info};
use tracing_subscriber::filter::EnvFilter;

fn read_block_input(path: &Path) -> eyre::Result<BlockInput> {
    let raw = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).wrap_err_with(|| format!("Failed to parse {}", path.display()))
}

/// Indexes input files one by one. A file that cannot be read, parsed or indexed is logged and
/// skipped; the remaining files are still indexed.
#[derive(Debug)]
struct Batch<C> {
    indexer: BlockIndexer<C>,
    history: AddressHistoryAggregator,
    indexed: usize,
    failed: usize,
}

impl<C: RollupClassifier> Batch<C> {
    fn new(indexer: BlockIndexer<C>) -> Self {
        Self { indexer, history: AddressHistoryAggregator::new(), indexed: 0, failed: 0 }
    }

    fn index_file(&mut self, path: &Path) -> Option<IndexedBlock> {
        let result = read_block_input(path).and_then(|input| {
            self.indexer.index(&input).wrap_err_with(|| {
                format!("Failed to index block {} from {}", input.block.number, path.display())
            })
        });

        match result {
            Ok(indexed) => {
                self.history.record_all(&indexed.transactions);
                self.indexed += 1;
                Some(indexed)
            }
            Err(err) => {
                error!(path = %path.display(), error = ?err, "Skipping input");
                self.failed += 1;
                None
            }
        }
    }

    /// Address history aggregated over every indexed block.
    fn finish(self) -> Vec<AddressHistory> {
        self.history.finish()
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    if let Ok(custom_env_file) = std::env::var("ENV_FILE") {
        dotenvy::from_filename(custom_env_file)?;
    } else {
        dotenv().ok();
    }

    let opts = Opts::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(chain_id = opts.indexer.chain_id, inputs = opts.inputs.len(), "Blobscope starting...");

    let indexer = BlockIndexer::new(opts.indexer.chain_id, RollupRegistry::with_known_submitters());

    let writer = if opts.enable_db_writes {
        info!("Database writes enabled - initializing ClickHouse client");
        let writer = ClickhouseWriter::new(
            opts.clickhouse.url.clone(),
            opts.clickhouse.db.clone(),
            opts.clickhouse.username.clone(),
            opts.clickhouse.password.clone(),
        )?;
        writer.init_db(opts.reset_db).await?;
        Some(writer)
    } else {
        info!("Database writes disabled - running in log-only mode");
        None
    };

    let mut batch = Batch::new(indexer);

    for path in &opts.inputs {
        let Some(indexed) = batch.index_file(path) else { continue };

        if let Some(writer) = &writer {
            writer.insert_indexed_block(&indexed).await?;
        } else {
            info!(
                block_number = indexed.block.number,
                transactions = indexed.transactions.len(),
                blobs = indexed.blobs.len(),
                blob_gas_price = %indexed.block.blob_gas_price,
                blob_as_calldata_gas_used = %indexed.block.blob_as_calldata_gas_used,
                "Indexed block (dry run)"
            );
        }

        if opts.dump_json {
            println!("{}", serde_json::to_string_pretty(&indexed)?);
        }
    }

    let (indexed, failed) = (batch.indexed, batch.failed);
    let history = batch.finish();

    if let Some(writer) = &writer {
        writer.insert_address_history(&history).await?;
    }
    if opts.dump_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "addressHistory": history }))?
        );
    }

    info!(blocks = indexed, failed, address_history_entries = history.len(), "Blobscope finished");

    if failed > 0 {
        return Err(eyre!("{failed} of {} inputs failed to index", opts.inputs.len()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_input(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("blobscope-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn block_json(number: u64, from: &str) -> String {
        serde_json::json!({
            "block": {
                "hash": format!("0x{:064x}", number),
                "number": number,
                "timestamp": 1_700_000_000u64,
                "slot": 1,
                "excessBlobGas": "0x0",
                "blobGasUsed": "0x20000"
            },
            "transactions": [{
                "hash": format!("0x{:064x}", number + 1000),
                "from": from,
                "to": "0x4444444444444444444444444444444444444444",
                "index": 0,
                "gasPrice": "0x1",
                "maxFeePerBlobGas": "0x1"
            }],
            "blobs": [{
                "versionedHash": format!("0x{:064x}", number + 2000),
                "commitment": "0x00",
                "proof": "0x00",
                "data": "0x0001",
                "txHash": format!("0x{:064x}", number + 1000),
                "index": 0
            }]
        })
        .to_string()
    }

    #[test]
    fn unreadable_and_malformed_inputs_do_not_stop_the_batch() {
        let sender = "0x3333333333333333333333333333333333333333";
        let first = write_input("first.json", &block_json(105, sender));
        let malformed = write_input("malformed.json", &block_json(103, "0x33"));
        let missing = std::env::temp_dir().join("blobscope-does-not-exist.json");
        let last = write_input("last.json", &block_json(102, sender));

        let mut batch = Batch::new(BlockIndexer::new(1, RollupRegistry::empty()));
        let indexed: Vec<_> = [&first, &malformed, &missing, &last]
            .into_iter()
            .filter_map(|path| batch.index_file(path))
            .collect();

        assert_eq!(indexed.len(), 2);
        assert_eq!(indexed[1].block.number, 102);
        assert_eq!((batch.indexed, batch.failed), (2, 2));

        let history = batch.finish();
        let sender_history =
            history.iter().find(|h| h.address.to_string().ends_with("3333")).unwrap();
        assert_eq!(sender_history.first_block_number_as_sender, Some(102));

        for path in [first, malformed, last] {
            std::fs::remove_file(path).unwrap();
        }
    }

    #[test]
    fn index_failures_are_counted() {
        let mut value: serde_json::Value =
            serde_json::from_str(&block_json(7, "0x3333333333333333333333333333333333333333"))
                .unwrap();
        value["blobs"] = serde_json::json!([]);
        let input = write_input("no-blobs.json", &value.to_string());

        let mut batch = Batch::new(BlockIndexer::new(1, RollupRegistry::empty()));
        assert!(batch.index_file(&input).is_none());
        assert_eq!(batch.failed, 1);
        assert!(batch.finish().is_empty());

        std::fs::remove_file(input).unwrap();
    }
}
