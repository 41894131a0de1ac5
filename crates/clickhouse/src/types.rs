use alloy_primitives::{Address, B256, U256};
use derive_more::Deref;
use serde::{Deserialize, Serialize};

/// Wrapper around `[u8; 20]` representing an address.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default, Deref,
)]
pub struct AddressBytes(pub [u8; 20]);

impl From<Address> for AddressBytes {
    fn from(value: Address) -> Self {
        Self(value.into_array())
    }
}

impl From<AddressBytes> for Address {
    fn from(value: AddressBytes) -> Self {
        Self::from(value.0)
    }
}

/// Wrapper around `[u8; 32]` representing a hash.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default, Deref,
)]
pub struct HashBytes(pub [u8; 32]);

impl From<B256> for HashBytes {
    fn from(value: B256) -> Self {
        Self(value.0)
    }
}

impl From<HashBytes> for B256 {
    fn from(value: HashBytes) -> Self {
        Self::from(value.0)
    }
}

/// Little-endian encoding of a 256-bit unsigned integer, the wire layout of `UInt256`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct U256Bytes(pub [u8; 32]);

impl From<U256> for U256Bytes {
    fn from(value: U256) -> Self {
        Self(value.to_le_bytes::<32>())
    }
}

impl U256Bytes {
    /// Decodes the stored little-endian bytes.
    pub fn to_u256(self) -> U256 {
        U256::from_le_bytes(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u256_is_little_endian() {
        let bytes = U256Bytes::from(U256::from(0x0102u64));
        assert_eq!(bytes.0[..3], [0x02, 0x01, 0x00]);
        assert_eq!(bytes.to_u256(), U256::from(0x0102u64));
    }

    #[test]
    fn address_round_trips() {
        let address = Address::repeat_byte(0x42);
        assert_eq!(Address::from(AddressBytes::from(address)), address);
    }
}
