//! Distinct addresses touched by a block.
use indexmap::IndexSet;

use crate::records::{AddressRecord, TransactionRecord};

/// Returns every distinct sender and receiver of `transactions`, in order of first appearance.
pub fn extract_addresses(transactions: &[TransactionRecord]) -> Vec<AddressRecord> {
    let mut seen = IndexSet::with_capacity(transactions.len() * 2);
    for tx in transactions {
        seen.insert(tx.from_id);
        seen.insert(tx.to_id);
    }
    seen.into_iter().map(|address| AddressRecord { address }).collect()
}
