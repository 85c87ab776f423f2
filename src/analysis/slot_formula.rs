use crate::LintError;
use primitive_types::U256;
use sha3::{Digest, Keccak256};

/// Derives the namespaced storage slot for `id`:
/// `keccak256(abi.encode(uint256(keccak256(id)) - 1)) & ~bytes32(uint256(0xff))`
///
/// The low byte of the result is always zero
pub fn derive_slot(id: &str) -> Result<U256, LintError> {
    let id_hash = keccak(id.as_bytes());
    let predecessor = id_hash
        .checked_sub(U256::one())
        .ok_or_else(|| LintError::ZeroSlotHash(id.to_string()))?;

    let slot = keccak(&abi_encode_uint256(predecessor)) & slot_mask();
    Ok(slot)
}

/// 32 byte big endian word, the abi encoding of a single uint256
pub fn abi_encode_uint256(value: U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

/// `0x` followed by the 64 hex digits of the abi word
pub fn format_slot(value: U256) -> String {
    format!("0x{}", hex::encode(abi_encode_uint256(value)))
}

fn keccak(bytes: &[u8]) -> U256 {
    U256::from_big_endian(Keccak256::digest(bytes).as_slice())
}

fn slot_mask() -> U256 {
    !U256::from(0xffu8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn slot(hex_digits: &str) -> U256 {
        U256::from_str_radix(hex_digits, 16).unwrap()
    }

    #[test]
    fn test_known_namespaces() {
        // constants shipped with the openzeppelin upgradeable contracts
        assert_eq!(
            derive_slot("openzeppelin.storage.ERC20").unwrap(),
            slot("52c63247e1f47db19d5ce0460030c497f067ca4cebf71ba98eeadabe20bace00")
        );
        assert_eq!(
            derive_slot("openzeppelin.storage.Initializable").unwrap(),
            slot("f0c57e16840df040f15088dc2f81fe391c3923bec73e23a9662efc9c229c6a00")
        );
        assert_eq!(
            derive_slot("openzeppelin.storage.Ownable").unwrap(),
            slot("9016d09d72d40fdae2fd8ceac6b6234c7706214fd39c1cd1e609a0528c199300")
        );
    }

    #[test]
    fn test_low_byte_is_cleared() {
        for id in ["", "a", "example.storage", "kiln.storage.Vault", "some id with spaces"] {
            let derived = derive_slot(id).unwrap();
            assert_eq!(derived.low_u32() & 0xff, 0, "low byte of slot for {id:?}");
        }
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let first = derive_slot("example.storage").unwrap();
        let second = derive_slot("example.storage").unwrap();
        assert_eq!(first, second);
        assert_ne!(first, derive_slot("example.storage2").unwrap());
    }

    #[test]
    fn test_abi_encoding_pads_left() {
        let word = abi_encode_uint256(U256::from(0x0102u32));
        assert_eq!(&word[..30], &[0u8; 30][..]);
        assert_eq!(&word[30..], &[0x01u8, 0x02][..]);
    }

    #[test]
    fn test_format_slot() {
        assert_eq!(
            format_slot(U256::from(0xabu8)),
            "0x00000000000000000000000000000000000000000000000000000000000000ab"
        );
        assert_eq!(
            format_slot(slot("52c63247e1f47db19d5ce0460030c497f067ca4cebf71ba98eeadabe20bace00")),
            "0x52c63247e1f47db19d5ce0460030c497f067ca4cebf71ba98eeadabe20bace00"
        );
    }
}
