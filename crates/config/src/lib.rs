//! Blobscope configuration
use std::path::PathBuf;

use clap::Parser;
use url::Url;

/// Clickhouse database configuration options
#[derive(Debug, Clone, Parser)]
pub struct ClickhouseOpts {
    /// Clickhouse URL
    #[clap(long = "clickhouse-url", env = "CLICKHOUSE_URL", default_value = "http://localhost:8123")]
    pub url: Url,
    /// Clickhouse database
    #[clap(long = "clickhouse-db", env = "CLICKHOUSE_DB", default_value = "blobscope")]
    pub db: String,
    /// Clickhouse username
    #[clap(long = "clickhouse-username", env = "CLICKHOUSE_USERNAME", default_value = "default")]
    pub username: String,
    /// Clickhouse password
    #[clap(long = "clickhouse-password", env = "CLICKHOUSE_PASSWORD", default_value = "")]
    pub password: String,
}

/// Indexing configuration options
#[derive(Debug, Clone, Parser)]
pub struct IndexerOpts {
    /// Chain id used to classify rollup submitters
    #[clap(long, env = "CHAIN_ID", default_value = "1")]
    pub chain_id: u64,
}

/// CLI options for blobscope
#[derive(Debug, Clone, Parser)]
#[clap(name = "blobscope", about = "Index EIP-4844 blob transactions")]
pub struct Opts {
    /// Clickhouse database configuration
    #[clap(flatten)]
    pub clickhouse: ClickhouseOpts,

    /// Indexing configuration
    #[clap(flatten)]
    pub indexer: IndexerOpts,

    /// JSON files holding one block input each, indexed in the given order
    #[clap(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Write indexed blocks to Clickhouse. Without it blocks are only logged
    #[clap(long, env = "ENABLE_DB_WRITES")]
    pub enable_db_writes: bool,

    /// If set, drop & re-create all tables (local/dev only)
    #[clap(long)]
    pub reset_db: bool,

    /// Print every indexed block as JSON to stdout
    #[clap(long)]
    pub dump_json: bool,
}

#[cfg(test)]
mod tests {
    use super::Opts;
    use clap::Parser;

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Opts::command().debug_assert()
    }

    #[test]
    fn defaults_to_mainnet_dry_run() {
        let opts = Opts::try_parse_from(["blobscope", "block.json"]).unwrap();
        assert_eq!(opts.indexer.chain_id, 1);
        assert!(!opts.enable_db_writes);
        assert_eq!(opts.inputs.len(), 1);
        assert_eq!(opts.clickhouse.db, "blobscope");
    }

    #[test]
    fn requires_an_input_file() {
        assert!(Opts::try_parse_from(["blobscope"]).is_err());
    }
}
