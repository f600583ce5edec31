//! Sorted-fold membership tree.
//!
//! The tree is never materialized: the root and every proof are recomputed
//! from the ascending-sorted leaf slice the registry hands in. Adjacent
//! leaves pair left-to-right; each pair is combined order-normalized
//! (min ‖ max under the node tag), so a verifier only needs sibling values,
//! never left/right positions. An odd trailing element is carried up
//! unchanged, and a proof records that level as an explicit [`ProofStep::Carry`]
//! sentinel rather than assuming a fixed proof length.

use crate::constant_time_eq;
use crate::hashing::{primary_with_tag, NODE_TAG};
use serde::{Deserialize, Serialize};
use veilvote_types::{Commitment, Digest256, VeilvoteError, VeilvoteResult};

/// Order-normalized combination of two tree nodes.
pub fn combine_nodes(left: &Digest256, right: &Digest256) -> Digest256 {
    let (first, second) = if left <= right {
        (left, right)
    } else {
        (right, left)
    };
    primary_with_tag(
        NODE_TAG,
        &[first.as_bytes().as_slice(), second.as_bytes().as_slice()].concat(),
    )
}

/// One level of a membership proof, leaf level first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofStep {
    /// Combine the accumulator with this sibling.
    Sibling(Digest256),
    /// The target was the unpaired trailing element; pass through unchanged.
    Carry,
}

/// Compact membership proof: the sibling path from leaf level to root.
/// Stateless once generated, and stale as soon as the set changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MembershipProof {
    pub steps: Vec<ProofStep>,
}

impl MembershipProof {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

fn fold_level(level: &[Digest256]) -> Vec<Digest256> {
    let mut next = Vec::with_capacity(level.len().div_ceil(2));
    for pair in level.chunks(2) {
        match pair {
            [left, right] => next.push(combine_nodes(left, right)),
            [carry] => next.push(*carry),
            _ => unreachable!(),
        }
    }
    next
}

/// Root of the membership set. `leaves` must be ascending-sorted; the
/// registry guarantees this by iterating its ordered map.
///
/// The empty set maps to the distinguished all-zero root, and a single leaf
/// is its own root.
pub fn compute_root(leaves: &[Commitment]) -> Digest256 {
    debug_assert!(leaves.windows(2).all(|w| w[0] < w[1]), "leaves not sorted");

    if leaves.is_empty() {
        return Digest256::zero();
    }

    let mut level: Vec<Digest256> = leaves.iter().map(|c| c.digest()).collect();
    while level.len() > 1 {
        level = fold_level(&level);
    }
    level[0]
}

/// Produce the sibling path for `target` within the sorted `leaves` slice.
pub fn prove(leaves: &[Commitment], target: &Commitment) -> VeilvoteResult<MembershipProof> {
    debug_assert!(leaves.windows(2).all(|w| w[0] < w[1]), "leaves not sorted");

    let mut index = leaves
        .binary_search(target)
        .map_err(|_| VeilvoteError::NotFound(format!("Commitment {} not in set", target)))?;

    let mut level: Vec<Digest256> = leaves.iter().map(|c| c.digest()).collect();
    let mut steps = Vec::new();

    while level.len() > 1 {
        let sibling = if index % 2 == 0 { index + 1 } else { index - 1 };
        if sibling < level.len() {
            steps.push(ProofStep::Sibling(level[sibling]));
        } else {
            steps.push(ProofStep::Carry);
        }
        level = fold_level(&level);
        index /= 2;
    }

    Ok(MembershipProof { steps })
}

/// Recompute the root from `(commitment, proof)` and compare it to
/// `expected_root`. Never needs the membership set itself, and never errors:
/// a stale or forged proof simply yields `false`.
pub fn verify_membership(
    commitment: &Commitment,
    proof: &MembershipProof,
    expected_root: &Digest256,
) -> bool {
    let mut acc = commitment.digest();
    for step in &proof.steps {
        match step {
            ProofStep::Sibling(sibling) => acc = combine_nodes(&acc, sibling),
            ProofStep::Carry => {}
        }
    }
    constant_time_eq(acc.as_bytes(), expected_root.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn leaf(byte: u8) -> Commitment {
        Commitment::from_bytes([byte; 32])
    }

    fn sorted(mut leaves: Vec<Commitment>) -> Vec<Commitment> {
        leaves.sort();
        leaves.dedup();
        leaves
    }

    #[test]
    fn test_empty_set_has_zero_root() {
        assert_eq!(compute_root(&[]), Digest256::zero());
    }

    #[test]
    fn test_single_leaf_is_its_own_root() {
        let c = leaf(0x42);
        assert_eq!(compute_root(&[c]), c.digest());

        let proof = prove(&[c], &c).unwrap();
        assert!(proof.is_empty());
        assert!(verify_membership(&c, &proof, &c.digest()));
    }

    #[test]
    fn test_two_leaves_combine_order_normalized() {
        let (a, b) = (leaf(0x01), leaf(0x02));
        let root = compute_root(&[a, b]);
        assert_eq!(root, combine_nodes(&a.digest(), &b.digest()));
        assert_eq!(root, combine_nodes(&b.digest(), &a.digest()));

        let proof_a = prove(&[a, b], &a).unwrap();
        let proof_b = prove(&[a, b], &b).unwrap();
        assert_eq!(proof_a.steps, vec![ProofStep::Sibling(b.digest())]);
        assert_eq!(proof_b.steps, vec![ProofStep::Sibling(a.digest())]);
        assert!(verify_membership(&a, &proof_a, &root));
        assert!(verify_membership(&b, &proof_b, &root));
    }

    #[test]
    fn test_three_leaves_carry_path() {
        let leaves = sorted(vec![leaf(0x01), leaf(0x02), leaf(0x03)]);
        let root = compute_root(&leaves);

        // The trailing leaf is carried at the first level.
        let proof = prove(&leaves, &leaves[2]).unwrap();
        assert_eq!(proof.steps[0], ProofStep::Carry);

        for c in &leaves {
            let p = prove(&leaves, c).unwrap();
            assert!(verify_membership(c, &p, &root));
        }
    }

    #[test]
    fn test_five_leaves_all_verify() {
        let leaves = sorted((1u8..=5).map(leaf).collect());
        let root = compute_root(&leaves);
        for c in &leaves {
            let p = prove(&leaves, c).unwrap();
            assert!(verify_membership(c, &p, &root), "proof failed for {}", c);
        }
        // The fifth leaf rides two carry levels before joining the fold.
        let p = prove(&leaves, &leaves[4]).unwrap();
        assert!(p.steps.contains(&ProofStep::Carry));
    }

    #[test]
    fn test_missing_commitment_is_not_found() {
        let leaves = sorted(vec![leaf(0x01), leaf(0x02)]);
        let err = prove(&leaves, &leaf(0x09)).unwrap_err();
        assert!(matches!(err, veilvote_types::VeilvoteError::NotFound(_)));
    }

    #[test]
    fn test_stale_proof_fails_against_new_root() {
        let old = sorted(vec![leaf(0x01), leaf(0x02)]);
        let target = old[0];
        let stale = prove(&old, &target).unwrap();

        let new = sorted(vec![leaf(0x01), leaf(0x02), leaf(0x03)]);
        let new_root = compute_root(&new);
        assert!(!verify_membership(&target, &stale, &new_root));
    }

    #[test]
    fn test_wrong_leaf_fails_with_valid_proof() {
        let leaves = sorted(vec![leaf(0x01), leaf(0x02), leaf(0x03)]);
        let root = compute_root(&leaves);
        let proof = prove(&leaves, &leaves[0]).unwrap();
        assert!(!verify_membership(&leaves[1], &proof, &root));
    }

    proptest! {
        #[test]
        fn prop_every_member_proves(seed_bytes in proptest::collection::btree_set(any::<[u8; 32]>(), 1..40)) {
            let leaves: Vec<Commitment> =
                seed_bytes.iter().map(|b| Commitment::from_bytes(*b)).collect();
            let root = compute_root(&leaves);
            for c in &leaves {
                let proof = prove(&leaves, c).unwrap();
                prop_assert!(verify_membership(c, &proof, &root));
                prop_assert_eq!(proof.len(), if leaves.len() == 1 { 0 } else {
                    // ceil(log2(n)) levels, one step per level.
                    (usize::BITS - (leaves.len() - 1).leading_zeros()) as usize
                });
            }
        }

        #[test]
        fn prop_root_ignores_arrival_order(seed_bytes in proptest::collection::btree_set(any::<[u8; 32]>(), 1..40), shuffle_seed in any::<u64>()) {
            use rand::seq::SliceRandom;
            use rand::SeedableRng;

            let leaves: Vec<Commitment> =
                seed_bytes.iter().map(|b| Commitment::from_bytes(*b)).collect();
            let root = compute_root(&leaves);

            let mut rng = rand::rngs::StdRng::seed_from_u64(shuffle_seed);
            let mut shuffled = leaves.clone();
            shuffled.shuffle(&mut rng);
            shuffled.sort();
            prop_assert_eq!(compute_root(&shuffled), root);
        }
    }
}
