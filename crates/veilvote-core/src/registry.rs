//! Append-only membership registry with an eagerly maintained root.
//!
//! Commitments are keyed in a `BTreeMap`, whose byte-ascending iteration
//! order IS the canonical sort the root fold requires: the root is a pure
//! function of the commitment set, never of insertion order. The root is
//! recomputed inside `insert` before it returns, so callers can never
//! observe a stale root after a successful insertion.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, error};
use veilvote_crypto::{compute_root, merkle, MembershipProof};
use veilvote_types::{Commitment, Digest256, VeilvoteError, VeilvoteResult, VoterRecord};

pub struct CommitmentRegistry {
    entries: BTreeMap<Commitment, VoterRecord>,
    root: Digest256,
}

impl CommitmentRegistry {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            root: Digest256::zero(),
        }
    }

    /// Insert a new commitment and recompute the root.
    ///
    /// A key collision is astronomically unlikely but handled, not assumed
    /// away: the existing record is never overwritten, the scan is rejected
    /// with `DuplicateCommitment`, and the event is logged as critical.
    pub fn insert(&mut self, commitment: Commitment, record: VoterRecord) -> VeilvoteResult<()> {
        if self.entries.contains_key(&commitment) {
            error!(
                commitment = %commitment,
                "CRITICAL: commitment collision on insert, rejecting scan"
            );
            return Err(VeilvoteError::DuplicateCommitment(format!(
                "Commitment {} already present",
                commitment
            )));
        }

        self.entries.insert(commitment, record);
        self.root = compute_root(&self.sorted_leaves());
        debug!(
            commitment = %commitment,
            root = %self.root,
            size = self.entries.len(),
            "Commitment inserted"
        );
        Ok(())
    }

    /// Current root; the all-zero constant while the set is empty.
    pub fn root(&self) -> Digest256 {
        self.root
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, commitment: &Commitment) -> bool {
        self.entries.contains_key(commitment)
    }

    pub fn record(&self, commitment: &Commitment) -> Option<&VoterRecord> {
        self.entries.get(commitment)
    }

    pub fn records(&self) -> impl Iterator<Item = &VoterRecord> {
        self.entries.values()
    }

    /// Sibling path for a member commitment against the current root.
    pub fn prove(&self, commitment: &Commitment) -> VeilvoteResult<MembershipProof> {
        merkle::prove(&self.sorted_leaves(), commitment)
    }

    /// Flip a record's vote state, exactly once. Returns the normalized
    /// identity the record belongs to so the guard can follow the
    /// transition.
    pub fn mark_voted(
        &mut self,
        commitment: &Commitment,
        tx_reference: &str,
        voted_at: DateTime<Utc>,
    ) -> VeilvoteResult<String> {
        let record = self.entries.get_mut(commitment).ok_or_else(|| {
            VeilvoteError::NotFound(format!("Commitment {} not registered", commitment))
        })?;

        if record.has_voted {
            return Err(VeilvoteError::AlreadyVoted(format!(
                "Commitment {} already voted",
                commitment
            )));
        }

        record.has_voted = true;
        record.voted_at = Some(voted_at);
        record.vote_tx = Some(tx_reference.to_string());
        Ok(record.identity.clone())
    }

    /// Drop every record and restore the empty root. Admin-only; the set is
    /// append-only for the lifetime of an election otherwise.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.root = Digest256::zero();
    }

    fn sorted_leaves(&self) -> Vec<Commitment> {
        self.entries.keys().copied().collect()
    }
}

impl Default for CommitmentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
