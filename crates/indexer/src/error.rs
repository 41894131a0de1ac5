use alloy_primitives::{Address, B256, TxHash};
use primitives::blob_gas::GasError;
use rollups::ClassifierError;
use thiserror::Error;

/// Broad class of an [`IndexError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input is malformed or internally inconsistent
    Validation,
    /// A transaction carries no blobs
    MissingBlobs,
    /// The rollup classifier failed
    Classification,
    /// Blob gas arithmetic failed to converge or overflowed
    Arithmetic,
}

/// Reasons a block could not be indexed. Every variant aborts the whole block.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A blob payload is not valid hex.
    #[error("blob {versioned_hash} of transaction {tx_hash} has a malformed payload")]
    InvalidBlobData {
        /// Versioned hash of the offending blob
        versioned_hash: B256,
        /// Owning transaction
        tx_hash: TxHash,
        /// Decoding failure
        #[source]
        source: GasError,
    },
    /// A blob references a transaction that is not part of the input.
    #[error("blob {versioned_hash} references unknown transaction {tx_hash}")]
    OrphanBlob {
        /// Versioned hash of the offending blob
        versioned_hash: B256,
        /// Referenced transaction
        tx_hash: TxHash,
    },
    /// The same transaction hash appears twice in the input.
    #[error("transaction {0} appears more than once")]
    DuplicateTransaction(TxHash),
    /// Occurrences of one versioned hash disagree on commitment or proof.
    #[error("blob {0} occurs with differing commitment or proof")]
    ConflictingBlob(B256),
    /// The block timestamp cannot be represented as a date.
    #[error("block timestamp {0} is out of range")]
    InvalidTimestamp(u64),
    /// A blob-carrying transaction has no blobs in the input.
    #[error("blobs for transaction {0} not found")]
    MissingBlobs(TxHash),
    /// The rollup classifier failed for a sender.
    #[error("failed to classify sender {address} of transaction {tx_hash}")]
    Classification {
        /// Transaction being classified
        tx_hash: TxHash,
        /// Sender address
        address: Address,
        /// Classifier failure
        #[source]
        source: ClassifierError,
    },
    /// The blob base fee could not be computed.
    #[error("failed to compute blob gas price")]
    Arithmetic(#[source] GasError),
    /// Summing calldata gas of a transaction or block exceeded 256 bits.
    #[error("calldata gas sum of {0} overflowed")]
    CalldataGasOverflow(B256),
}

impl IndexError {
    /// Returns the class of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidBlobData { .. } |
            Self::OrphanBlob { .. } |
            Self::DuplicateTransaction(_) |
            Self::ConflictingBlob(_) |
            Self::InvalidTimestamp(_) => ErrorKind::Validation,
            Self::MissingBlobs(_) => ErrorKind::MissingBlobs,
            Self::Classification { .. } => ErrorKind::Classification,
            Self::Arithmetic(_) | Self::CalldataGasOverflow(_) => ErrorKind::Arithmetic,
        }
    }
}
