//! Per-category address history aggregation.
use alloy_primitives::Address;
use indexmap::IndexMap;

use crate::records::{AddressHistory, Category, TransactionRecord};

/// Accumulates the first sender and receiver block of each (address, category) pair.
///
/// The result is the delta for the transactions seen by this aggregator only. Combining it with
/// previously stored history is done with [`AddressHistory::merge`].
#[derive(Debug, Default)]
pub struct AddressHistoryAggregator {
    entries: IndexMap<(Address, Category), AddressHistory>,
}

impl AddressHistoryAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts for one transaction.
    pub fn record(&mut self, tx: &TransactionRecord) {
        self.entry(tx.from_id, tx.category).observe_sender(tx.block_number);
        self.entry(tx.to_id, tx.category).observe_receiver(tx.block_number);
    }

    /// Accounts for every transaction of `txs`.
    pub fn record_all<'a>(&mut self, txs: impl IntoIterator<Item = &'a TransactionRecord>) {
        for tx in txs {
            self.record(tx);
        }
    }

    /// Number of distinct (address, category) pairs seen so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no transaction was recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the aggregator, returning one entry per pair in order of first appearance.
    pub fn finish(self) -> Vec<AddressHistory> {
        self.entries.into_values().collect()
    }

    fn entry(&mut self, address: Address, category: Category) -> &mut AddressHistory {
        self.entries
            .entry((address, category))
            .or_insert_with(|| AddressHistory::new(address, category))
    }
}

/// Address history delta for `transactions`.
pub fn aggregate_address_history(transactions: &[TransactionRecord]) -> Vec<AddressHistory> {
    let mut aggregator = AddressHistoryAggregator::new();
    aggregator.record_all(transactions);
    aggregator.finish()
}
