//! Binary Merkle tree over a block's slot leaves.

use crate::hash::{hash_concat, Hash};
use crate::transaction::Transaction;

fn parent(left: &Hash, right: &Hash) -> Hash {
    hash_concat(&[left.as_ref(), right.as_ref()])
}

fn next_level(level: &[Hash]) -> Vec<Hash> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => parent(left, right),
            // Trailing odd node pairs with itself.
            [single] => parent(single, single),
            _ => unreachable!("chunks(2) yields one or two items"),
        })
        .collect()
}

/// Compute the Merkle root of a list of leaves.
///
/// Empty input yields [`Hash::ZERO`]; a single leaf is its own root.
pub fn merkle_root(leaves: &[Hash]) -> Hash {
    MerkleTree::new(leaves).root()
}

/// Leaves of `transactions` in block order, and their root.
pub fn block_root(transactions: &[Transaction]) -> Hash {
    let leaves: Vec<Hash> = transactions.iter().map(Transaction::leaf).collect();
    merkle_root(&leaves)
}

/// A Merkle tree kept level by level, leaves first.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    levels: Vec<Vec<Hash>>,
}

/// Inclusion proof for a single leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    /// The leaf being proven.
    pub leaf: Hash,
    /// Sibling hashes from leaf to root.
    pub siblings: Vec<Hash>,
    /// For each sibling, whether the running hash sits on the left.
    pub directions: Vec<bool>,
}

impl MerkleTree {
    /// Build a tree from leaf hashes.
    pub fn new(leaves: &[Hash]) -> Self {
        if leaves.is_empty() {
            return Self {
                levels: vec![vec![Hash::ZERO]],
            };
        }
        let mut levels = vec![leaves.to_vec()];
        while let Some(top) = levels.last().filter(|level| level.len() > 1) {
            let next = next_level(top);
            levels.push(next);
        }
        Self { levels }
    }

    /// Build the tree of a block's transactions.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let leaves: Vec<Hash> = transactions.iter().map(Transaction::leaf).collect();
        Self::new(&leaves)
    }

    pub fn root(&self) -> Hash {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or(Hash::ZERO)
    }

    pub fn leaf_count(&self) -> usize {
        self.levels.first().map(|l| l.len()).unwrap_or(0)
    }

    /// Generate a proof for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Option<MerkleProof> {
        if index >= self.leaf_count() {
            return None;
        }

        let leaf = self.levels[0][index];
        let mut siblings = Vec::new();
        let mut directions = Vec::new();
        let mut idx = index;

        for level in &self.levels[..self.levels.len() - 1] {
            let is_left = idx % 2 == 0;
            let sibling_idx = if is_left { idx + 1 } else { idx - 1 };
            siblings.push(*level.get(sibling_idx).unwrap_or(&level[idx]));
            directions.push(is_left);
            idx /= 2;
        }

        Some(MerkleProof {
            leaf,
            siblings,
            directions,
        })
    }
}

/// Verify a proof against a given root.
pub fn verify_proof(root: &Hash, proof: &MerkleProof) -> bool {
    let computed = proof
        .siblings
        .iter()
        .zip(&proof.directions)
        .fold(proof.leaf, |current, (sibling, is_left)| {
            if *is_left {
                parent(&current, sibling)
            } else {
                parent(sibling, &current)
            }
        });
    computed == *root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Address;
    use crate::hash::{hash, slot_leaf};
    use crate::number::Uint;

    fn leaves(n: usize) -> Vec<Hash> {
        (0..n).map(|i| hash(&[i as u8])).collect()
    }

    #[test]
    fn test_empty_root_is_zero() {
        assert_eq!(merkle_root(&[]), Hash::ZERO);
        assert_eq!(block_root(&[]), Hash::ZERO);
    }

    #[test]
    fn test_single_leaf_is_root() {
        let l = leaves(1);
        assert_eq!(merkle_root(&l), l[0]);
    }

    #[test]
    fn test_single_transaction_root_is_slot_hash() {
        let slot: Uint = "10000000000000000000".parse().unwrap();
        let tx = Transaction::deposit(slot.clone(), Address([3; 20]), Uint::from(7u64)).unwrap();
        assert_eq!(block_root(&[tx]), slot_leaf(&slot).unwrap());
    }

    #[test]
    fn test_two_leaves() {
        let l = leaves(2);
        assert_eq!(merkle_root(&l), hash_concat(&[l[0].as_ref(), l[1].as_ref()]));
    }

    #[test]
    fn test_odd_leaf_duplicated() {
        let l = leaves(3);
        let left = hash_concat(&[l[0].as_ref(), l[1].as_ref()]);
        let right = hash_concat(&[l[2].as_ref(), l[2].as_ref()]);
        assert_eq!(merkle_root(&l), hash_concat(&[left.as_ref(), right.as_ref()]));
    }

    #[test]
    fn test_order_matters() {
        let l = leaves(4);
        let mut reversed = l.clone();
        reversed.reverse();
        assert_ne!(merkle_root(&l), merkle_root(&reversed));
    }

    #[test]
    fn test_proofs_verify() {
        for n in [1, 2, 5, 8] {
            let tree = MerkleTree::new(&leaves(n));
            for i in 0..n {
                let proof = tree.proof(i).unwrap();
                assert!(verify_proof(&tree.root(), &proof), "n={n} i={i}");
            }
            assert!(tree.proof(n).is_none());
        }
    }

    #[test]
    fn test_proof_wrong_root() {
        let tree = MerkleTree::new(&leaves(4));
        let proof = tree.proof(0).unwrap();
        assert!(!verify_proof(&hash(b"wrong"), &proof));
    }
}
