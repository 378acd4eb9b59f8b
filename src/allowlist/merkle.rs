//! Deterministic merkle trees over allowlist addresses.
//!
//! Leaf hash is `keccak256(abi.encode(address))`; leaves are sorted before
//! tree construction and pairs are hashed in sorted order, so any
//! permutation of the same address set reproduces the same root and keeps
//! previously issued proofs valid. Roots computed here are asserted against
//! values recorded on-chain by the target protocols, so the scheme must not
//! drift.

use alloy::primitives::{Address, B256, keccak256};
use itertools::Itertools;

use crate::types::AllowlistItem;

/// Leaf hash of a single allowlist address.
pub fn leaf(address: Address) -> B256 {
    // abi.encode(address): a single left-padded 32-byte word
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_slice());
    keccak256(word)
}

fn hash_pair(a: B256, b: B256) -> B256 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(lo.as_slice());
    buf[32..].copy_from_slice(hi.as_slice());
    keccak256(buf)
}

fn sorted_leaves(items: &[AllowlistItem]) -> Vec<B256> {
    items
        .iter()
        .map(|item| leaf(item.address))
        .sorted()
        .dedup()
        .collect()
}

/// Merkle root of the given entries. Zero for an empty list.
pub fn root(items: &[AllowlistItem]) -> B256 {
    let mut level = sorted_leaves(items);
    if level.is_empty() {
        return B256::ZERO;
    }
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [a, b] => hash_pair(*a, *b),
                // Odd node carries up unchanged
                [a] => *a,
                _ => unreachable!(),
            })
            .collect();
    }
    level[0]
}

/// Merkle proof for `address`, or `None` if it is not among the entries.
pub fn proof(items: &[AllowlistItem], address: Address) -> Option<Vec<B256>> {
    let mut level = sorted_leaves(items);
    let target = leaf(address);
    let mut index = level.iter().position(|l| *l == target)?;

    let mut proof = Vec::new();
    while level.len() > 1 {
        let sibling = index ^ 1;
        if sibling < level.len() {
            proof.push(level[sibling]);
        }
        index /= 2;
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [a, b] => hash_pair(*a, *b),
                [a] => *a,
                _ => unreachable!(),
            })
            .collect();
    }
    Some(proof)
}

/// Checks a proof against a root for the given address.
pub fn verify(proof: &[B256], root: B256, address: Address) -> bool {
    proof.iter().fold(leaf(address), |acc, p| hash_pair(acc, *p)) == root
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    fn items(addresses: &[Address]) -> Vec<AllowlistItem> {
        addresses
            .iter()
            .map(|a| AllowlistItem::address_only(*a))
            .collect()
    }

    fn fixture() -> Vec<Address> {
        vec![
            address!("0x0000000000000000000000000000000000000001"),
            address!("0x00000000000000000000000000000000000000A2"),
            address!("0x1111111111111111111111111111111111111111"),
            address!("0xDeaDbeefdEAdbeefdEadbEEFdeadbeEFdEaDbeeF"),
            address!("0x5555555555555555555555555555555555555555"),
        ]
    }

    #[test]
    fn root_is_permutation_invariant() {
        let addresses = fixture();
        let base = root(&items(&addresses));
        for perm in addresses.iter().copied().permutations(addresses.len()).take(24) {
            assert_eq!(root(&items(&perm)), base);
        }
    }

    #[test]
    fn every_member_proof_verifies() {
        let addresses = fixture();
        let set = items(&addresses);
        let r = root(&set);
        for addr in &addresses {
            let p = proof(&set, *addr).expect("member has a proof");
            assert!(verify(&p, r, *addr), "proof for {addr} must verify");
        }
    }

    #[test]
    fn proofs_stay_valid_across_permutations() {
        let addresses = fixture();
        let r = root(&items(&addresses));
        let mut reversed = addresses.clone();
        reversed.reverse();
        let p = proof(&items(&reversed), addresses[0]).unwrap();
        assert!(verify(&p, r, addresses[0]));
    }

    #[test]
    fn non_member_has_no_proof() {
        let set = items(&fixture());
        let outsider = address!("0x9999999999999999999999999999999999999999");
        assert_eq!(proof(&set, outsider), None);
        assert!(!verify(&[], root(&set), outsider));
    }

    #[test]
    fn singleton_root_is_the_leaf() {
        let only = address!("0x0000000000000000000000000000000000000001");
        let set = items(&[only]);
        assert_eq!(root(&set), leaf(only));
        assert_eq!(proof(&set, only), Some(vec![]));
        assert!(verify(&[], root(&set), only));
    }

    #[test]
    fn empty_list_has_zero_root() {
        assert_eq!(root(&[]), B256::ZERO);
    }

    #[test]
    fn duplicate_addresses_collapse() {
        let a = address!("0x0000000000000000000000000000000000000001");
        let b = address!("0x0000000000000000000000000000000000000002");
        let once = items(&[a, b]);
        let twice = items(&[a, b, a]);
        assert_eq!(root(&once), root(&twice));
    }
}
