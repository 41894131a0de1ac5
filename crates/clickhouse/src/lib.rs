//! Blobscope `ClickHouse` storage

mod conversions;
/// Row types
pub mod models;
/// Table definitions
pub mod schema;
/// Fixed-width column wrappers
pub mod types;
/// Writer client
pub mod writer;

pub use conversions::IndexedBlockRows;
pub use models::*;
pub use types::{AddressBytes, HashBytes, U256Bytes};
pub use writer::ClickhouseWriter;
