//! Cryptographic core of VeilVote: domain-separated hash fusion, voter
//! commitment derivation, and the sorted-fold membership tree.

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod commitment;
pub mod hashing;
pub mod merkle;

pub use commitment::{derive_credential, random_salt};
pub use hashing::{hash, primary, secondary, tertiary, HashAlgorithm};
pub use merkle::{
    combine_nodes, compute_root, prove, verify_membership, MembershipProof, ProofStep,
};

/// Constant-time byte-slice equality, used wherever a digest comparison
/// gates an accept/reject decision.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    use subtle::ConstantTimeEq;
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
