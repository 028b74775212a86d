//! ENS registry and resolver contract bindings.

use alloy_primitives::{Address, B256};
use alloy_sol_types::{SolCall, sol};

use crate::domain::ResolutionError;

sol! {
    /// ENS registry: maps a node to the resolver contract responsible for it.
    interface IEnsRegistry {
        function resolver(bytes32 node) external view returns (address);
    }

    /// Address record of an ENS public resolver.
    interface IAddrResolver {
        function addr(bytes32 node) external view returns (address);
    }
}

/// Calldata for `resolver(bytes32)` on the registry.
#[must_use]
pub fn resolver_call(node: B256) -> Vec<u8> {
    IEnsRegistry::resolverCall { node }.abi_encode()
}

/// Calldata for `addr(bytes32)` on a resolver.
#[must_use]
pub fn addr_call(node: B256) -> Vec<u8> {
    IAddrResolver::addrCall { node }.abi_encode()
}

/// Decodes the registry's answer. `None` means no resolver is set.
pub fn decode_resolver(data: &[u8]) -> Result<Option<Address>, ResolutionError> {
    non_zero(data, |data| {
        IEnsRegistry::resolverCall::abi_decode_returns(data, true).map(|ret| ret._0)
    })
}

/// Decodes a resolver's `addr` answer. `None` means no address record is set.
pub fn decode_addr(data: &[u8]) -> Result<Option<Address>, ResolutionError> {
    non_zero(data, |data| {
        IAddrResolver::addrCall::abi_decode_returns(data, true).map(|ret| ret._0)
    })
}

// Empty return data and the zero address both mean "no record".
fn non_zero<F>(data: &[u8], decode: F) -> Result<Option<Address>, ResolutionError>
where
    F: FnOnce(&[u8]) -> alloy_sol_types::Result<Address>,
{
    if data.is_empty() {
        return Ok(None);
    }
    let address = decode(data).map_err(|e| ResolutionError::InvalidResponse(e.to_string()))?;
    Ok((!address.is_zero()).then_some(address))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, hex};

    #[test]
    fn test_known_selectors() {
        assert_eq!(IEnsRegistry::resolverCall::SELECTOR, hex!("0178b8bf"));
        assert_eq!(IAddrResolver::addrCall::SELECTOR, hex!("3b3b57de"));
    }

    #[test]
    fn test_addr_call_layout() {
        let data = addr_call(B256::repeat_byte(0xab));

        assert_eq!(data.len(), 36);
        assert_eq!(&data[..4], &hex!("3b3b57de"));
        assert!(data[4..].iter().all(|b| *b == 0xab));
    }

    #[test]
    fn test_decode_address_word() {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(address!("983110309620d911731ac0932219af06091b6744").as_slice());

        assert_eq!(
            decode_addr(&word).unwrap(),
            Some(address!("983110309620d911731ac0932219af06091b6744"))
        );
        assert_eq!(
            decode_resolver(&word).unwrap(),
            Some(address!("983110309620d911731ac0932219af06091b6744"))
        );
    }

    #[test]
    fn test_decode_zero_address_is_none() {
        assert_eq!(decode_resolver(&[0u8; 32]).unwrap(), None);
        assert_eq!(decode_addr(&[0u8; 32]).unwrap(), None);
    }

    #[test]
    fn test_decode_empty_is_none() {
        assert_eq!(decode_resolver(&[]).unwrap(), None);
    }

    #[test]
    fn test_decode_short_word_is_error() {
        let err = decode_addr(&[1u8; 20]).unwrap_err();
        assert!(matches!(err, ResolutionError::InvalidResponse(_)));
    }

    #[test]
    fn test_decode_dirty_padding_is_error() {
        let err = decode_resolver(&[0xffu8; 32]).unwrap_err();
        assert!(matches!(err, ResolutionError::InvalidResponse(_)));
    }
}
