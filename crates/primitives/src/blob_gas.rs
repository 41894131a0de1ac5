//! EIP-4844 blob gas accounting.
//!
//! Blob base-fee pricing follows the `fake_exponential` formula of EIP-4844 and the
//! "blob as calldata" baseline follows the EIP-2028 calldata cost schedule.
use alloy_primitives::{U256, U512};
use thiserror::Error;

/// Blob gas consumed by a single blob, independent of its payload.
pub const BLOB_GAS_PER_BLOB: u64 = 131_072;

/// Minimum base fee per blob gas.
pub const MIN_BLOB_BASE_FEE: u64 = 1;

/// Controls the maximum rate of change of the blob base fee.
pub const BLOB_BASE_FEE_UPDATE_FRACTION: u64 = 3_338_477;

/// Calldata gas charged for a zero byte (EIP-2028).
pub const CALLDATA_ZERO_BYTE_GAS: u64 = 4;

/// Calldata gas charged for a nonzero byte (EIP-2028).
pub const CALLDATA_NONZERO_BYTE_GAS: u64 = 16;

/// Upper bound on the number of series terms evaluated by [`fake_exponential`].
///
/// Every excess value whose blob price fits in 256 bits converges within this many terms.
pub const MAX_FAKE_EXPONENTIAL_ITERATIONS: u64 = 512;

/// Errors raised by blob gas accounting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GasError {
    /// The blob payload is not a valid hex string.
    #[error("invalid blob payload: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    /// The approximate exponential did not converge within the iteration bound.
    #[error("fake exponential did not converge after {iterations} iterations")]
    NonTermination {
        /// Number of terms evaluated before giving up
        iterations: u64,
    },
    /// An intermediate value exceeded 512 bits.
    #[error("fake exponential overflowed at term {term}")]
    Overflow {
        /// Index of the term whose computation overflowed
        term: u64,
    },
    /// The approximated value does not fit in 256 bits.
    #[error("fake exponential result exceeds 256 bits")]
    ResultTooLarge,
}

/// Strips the optional `0x` marker from a hex payload.
fn strip_hex_prefix(data: &str) -> &str {
    data.strip_prefix("0x").unwrap_or(data)
}

/// Returns the number of bytes encoded by the hex payload `data`.
///
/// The `0x` prefix, if present, is not counted. Odd-length payloads and non-hex characters are
/// rejected.
pub fn blob_byte_size(data: &str) -> Result<usize, GasError> {
    let digits = strip_hex_prefix(data);
    if digits.len() % 2 != 0 {
        return Err(hex::FromHexError::OddLength.into());
    }
    if let Some((index, c)) = digits.char_indices().find(|(_, c)| !c.is_ascii_hexdigit()) {
        return Err(hex::FromHexError::InvalidHexCharacter { c, index }.into());
    }
    Ok(digits.len() / 2)
}

/// Decodes a hex blob payload into raw bytes.
pub fn decode_blob_data(data: &str) -> Result<Vec<u8>, GasError> {
    Ok(hex::decode(strip_hex_prefix(data))?)
}

/// EIP-2028 calldata cost of `bytes`.
pub fn calldata_gas_cost_bytes(bytes: &[u8]) -> U256 {
    let zeros = bytes.iter().filter(|b| **b == 0).count() as u64;
    let nonzeros = bytes.len() as u64 - zeros;
    U256::from(zeros) * U256::from(CALLDATA_ZERO_BYTE_GAS) +
        U256::from(nonzeros) * U256::from(CALLDATA_NONZERO_BYTE_GAS)
}

/// Gas it would have cost to publish the hex payload `data` as calldata instead of a blob.
pub fn calldata_gas_cost(data: &str) -> Result<U256, GasError> {
    Ok(calldata_gas_cost_bytes(&decode_blob_data(data)?))
}

/// Blob gas consumed by a transaction carrying `blob_count` blobs.
pub fn blob_gas_used(blob_count: usize) -> U256 {
    U256::from(blob_count) * U256::from(BLOB_GAS_PER_BLOB)
}

/// Approximates `factor * e ** (numerator / denominator)` using integer arithmetic only.
///
/// The series is accumulated in 512 bits, so only a result that does not fit in 256 bits is
/// rejected.
pub fn fake_exponential(factor: U256, numerator: U256, denominator: U256) -> Result<U256, GasError> {
    fake_exponential_bounded(factor, numerator, denominator, MAX_FAKE_EXPONENTIAL_ITERATIONS)
}

const fn widen(value: U256) -> U512 {
    let [a, b, c, d] = *value.as_limbs();
    U512::from_limbs([a, b, c, d, 0, 0, 0, 0])
}

const fn narrow(value: U512) -> Option<U256> {
    match *value.as_limbs() {
        [a, b, c, d, 0, 0, 0, 0] => Some(U256::from_limbs([a, b, c, d])),
        _ => None,
    }
}

fn fake_exponential_bounded(
    factor: U256,
    numerator: U256,
    denominator: U256,
    max_iterations: u64,
) -> Result<U256, GasError> {
    let (numerator, denominator) = (widen(numerator), widen(denominator));
    let mut output = U512::ZERO;
    let mut accumulator =
        widen(factor).checked_mul(denominator).ok_or(GasError::Overflow { term: 0 })?;

    let mut i = 1u64;
    while !accumulator.is_zero() {
        if i > max_iterations {
            return Err(GasError::NonTermination { iterations: max_iterations });
        }
        output = output.checked_add(accumulator).ok_or(GasError::Overflow { term: i })?;
        let scaled = accumulator.checked_mul(numerator).ok_or(GasError::Overflow { term: i })?;
        let divisor =
            denominator.checked_mul(U512::from(i)).ok_or(GasError::Overflow { term: i })?;
        accumulator = scaled / divisor;
        i += 1;
    }

    narrow(output / denominator).ok_or(GasError::ResultTooLarge)
}

/// Base fee per blob gas for a block with the given excess blob gas.
pub fn blob_gas_price(excess_blob_gas: U256) -> Result<U256, GasError> {
    fake_exponential(
        U256::from(MIN_BLOB_BASE_FEE),
        excess_blob_gas,
        U256::from(BLOB_BASE_FEE_UPDATE_FRACTION),
    )
}
