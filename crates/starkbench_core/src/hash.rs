//! Keccak-based hashing: selectors, storage addresses and contract addresses.
//!
//! ## Notes
//! - [`starknet_keccak`] is Keccak-256 truncated to its low 250 bits, so every result is a valid [`Felt`].
//! - Pedersen is not implemented; every place that hashes a list of felts goes through [`hash_felts`], which
//!   keeps the derivations deterministic and collision-resistant.
//! - Addresses are reduced below [`ADDR_BOUND`] so the last 256 slots of the field are never used, as on the real
//!   network.

use std::sync::LazyLock;

use num_bigint::BigUint;
use num_traits::One;
use sha3::{Digest, Keccak256};

use crate::felt::Felt;

/// Selector reserved for the fallback entry point.
pub const DEFAULT_ENTRY_POINT_NAME: &str = "__default__";

/// Selector reserved for the L1 fallback entry point.
pub const DEFAULT_L1_ENTRY_POINT_NAME: &str = "__l1_default__";

/// Prefix mixed into every contract address derivation.
pub const CONTRACT_ADDRESS_PREFIX: &str = "STARKNET_CONTRACT_ADDRESS";

static MASK_250: LazyLock<BigUint> = LazyLock::new(|| (BigUint::one() << 250u32) - BigUint::one());

/// Addresses live in `[0, 2^251 - 256)`.
pub static ADDR_BOUND: LazyLock<BigUint> = LazyLock::new(|| (BigUint::one() << 251u32) - BigUint::from(256u32));

fn keccak_250(bytes: &[u8]) -> Felt {
    let digest = Keccak256::digest(bytes);
    let value = BigUint::from_bytes_be(&digest) & &*MASK_250;
    Felt::from_biguint_reduced(value)
}

/// Keccak-256 of `bytes`, masked to 250 bits.
pub fn starknet_keccak(bytes: &[u8]) -> Felt {
    keccak_250(bytes)
}

/// Derive the dispatch selector of an entry point from its name.
///
/// Pure and deterministic: the same name always yields the same selector.
///
/// ## Examples
/// ```rust
/// use starkbench_core::hash::get_selector_from_name;
/// use starkbench_core::Felt;
///
/// assert_eq!(get_selector_from_name("__default__"), Felt::zero());
/// assert_ne!(get_selector_from_name("forever_one"), Felt::zero());
/// ```
pub fn get_selector_from_name(name: &str) -> Felt {
    if name == DEFAULT_ENTRY_POINT_NAME || name == DEFAULT_L1_ENTRY_POINT_NAME {
        return Felt::zero();
    }
    starknet_keccak(name.as_bytes())
}

/// Hash an ordered list of felts.
pub fn hash_felts(values: &[Felt]) -> Felt {
    let mut bytes = Vec::with_capacity(values.len() * 32);
    for value in values {
        bytes.extend_from_slice(&value.to_bytes_be());
    }
    keccak_250(&bytes)
}

/// Reduce a felt into the address range.
pub fn normalize_address(value: &Felt) -> Felt {
    Felt::from_biguint_reduced(value.as_biguint() % &*ADDR_BOUND)
}

/// Storage address of a storage variable for the given keys.
///
/// A variable without keys lives at `starknet_keccak(name)`; keyed entries hash the base together with the keys.
pub fn storage_address(name: &str, keys: &[Felt]) -> Felt {
    let base = starknet_keccak(name.as_bytes());
    if keys.is_empty() {
        return normalize_address(&base);
    }
    let mut preimage = Vec::with_capacity(keys.len() + 1);
    preimage.push(base);
    preimage.extend_from_slice(keys);
    normalize_address(&hash_felts(&preimage))
}

/// Address of a contract deployed from `class_hash` with the given salt and constructor calldata.
pub fn calculate_contract_address(
    salt: &Felt,
    class_hash: &Felt,
    constructor_calldata: &[Felt],
    deployer_address: &Felt,
) -> Felt {
    // The prefix is a fixed ASCII literal well under the short string limit.
    let prefix = Felt::from_short_string(CONTRACT_ADDRESS_PREFIX).unwrap_or_default();
    let raw = hash_felts(&[
        prefix,
        deployer_address.clone(),
        salt.clone(),
        class_hash.clone(),
        hash_felts(constructor_calldata),
    ]);
    normalize_address(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_of_empty_input() {
        // keccak256("") = c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470, low 250 bits kept.
        let expected =
            Felt::from_hex_str("0x01d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470").unwrap();
        assert_eq!(starknet_keccak(b""), expected);
    }

    #[test]
    fn test_selector_is_deterministic() {
        assert_eq!(get_selector_from_name("forever_one"), get_selector_from_name("forever_one"));
        assert_ne!(get_selector_from_name("forever_one"), get_selector_from_name("call_self"));
    }

    #[test]
    fn test_default_entry_points_map_to_zero() {
        assert_eq!(get_selector_from_name(DEFAULT_ENTRY_POINT_NAME), Felt::zero());
        assert_eq!(get_selector_from_name(DEFAULT_L1_ENTRY_POINT_NAME), Felt::zero());
    }

    #[test]
    fn test_selector_fits_in_250_bits() {
        for name in ["a", "transfer", "initialize", "forever_one"] {
            assert!(get_selector_from_name(name).bits() <= 250);
        }
    }

    #[test]
    fn test_storage_address_depends_on_keys() {
        let plain = storage_address("balance", &[]);
        let keyed = storage_address("balance", &[Felt::from(1u64)]);
        let other = storage_address("balance", &[Felt::from(2u64)]);
        assert_ne!(plain, keyed);
        assert_ne!(keyed, other);
        assert_eq!(keyed, storage_address("balance", &[Felt::from(1u64)]));
    }

    #[test]
    fn test_contract_address_changes_with_salt() {
        let class_hash = Felt::from(7u64);
        let a = calculate_contract_address(&Felt::zero(), &class_hash, &[], &Felt::zero());
        let b = calculate_contract_address(&Felt::one(), &class_hash, &[], &Felt::zero());
        assert_ne!(a, b);
        assert!(a.as_biguint() < &*ADDR_BOUND);
    }
}
