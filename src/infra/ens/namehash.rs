//! ENS name hashing (EIP-137).

use alloy_primitives::{B256, keccak256};

use crate::domain::Domain;

/// Computes the namehash of a dot-separated name.
///
/// Labels are hashed as given, rightmost first. The empty name hashes to
/// the zero node.
#[must_use]
pub fn namehash(name: &str) -> B256 {
    if name.is_empty() {
        return B256::ZERO;
    }

    let mut node = [0u8; 64];
    for label in name.rsplit('.') {
        node[32..].copy_from_slice(keccak256(label.as_bytes()).as_slice());
        let parent = keccak256(node);
        node[..32].copy_from_slice(parent.as_slice());
    }
    B256::from_slice(&node[..32])
}

/// Namehash of a validated domain.
#[must_use]
pub fn domain_node(domain: &Domain) -> B256 {
    namehash(domain.as_str())
}
