//! Duplicate/eligibility guard.
//!
//! One state machine per normalized identity:
//!
//! ```text
//! Unseen --scan--> Processing --derivation ok--> Authenticated --vote--> Voted
//! ```
//!
//! `Processing` and `Authenticated` carry a deadline; once it passes, the
//! identity is treated as `Unseen` again and may re-scan (receiving a fresh
//! commitment). `Voted` is terminal and never reverts. Expiry is evaluated
//! lazily against the caller-supplied clock value, so tests never sleep; the
//! background sweeper only reclaims the memory of entries that already
//! expired.

use std::collections::HashMap;
use tracing::debug;
use veilvote_types::{Commitment, VeilvoteError, VeilvoteResult};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdentityState {
    /// Scan admitted, derivation pending; rejects re-scans until `until`.
    Processing { until: u64 },
    /// Commitment issued; the session stays active until `until` or a vote.
    Authenticated { commitment: Commitment, until: u64 },
    /// Vote confirmed on the external ledger. Terminal.
    Voted,
}

impl IdentityState {
    fn is_expired(&self, now: u64) -> bool {
        match self {
            IdentityState::Processing { until } => now >= *until,
            IdentityState::Authenticated { until, .. } => now >= *until,
            IdentityState::Voted => false,
        }
    }
}

pub struct EligibilityGuard {
    cooldown_ms: u64,
    entries: HashMap<String, IdentityState>,
}

impl EligibilityGuard {
    pub fn new(cooldown_ms: u64) -> Self {
        Self {
            cooldown_ms,
            entries: HashMap::new(),
        }
    }

    /// Current state of an identity, with expired entries reported as unseen.
    pub fn state(&self, identity: &str, now: u64) -> Option<&IdentityState> {
        self.entries
            .get(identity)
            .filter(|state| !state.is_expired(now))
    }

    /// Admit a scan: `Unseen -> Processing`. Rejects with `DuplicateScan`
    /// while a cooldown or session is live, or when the identity has voted.
    pub fn admit_scan(&mut self, identity: &str, now: u64) -> VeilvoteResult<()> {
        match self.state(identity, now) {
            Some(IdentityState::Voted) => {
                return Err(VeilvoteError::DuplicateScan(
                    "Vote already cast for this identity".into(),
                ))
            }
            Some(IdentityState::Authenticated { .. }) => {
                return Err(VeilvoteError::DuplicateScan(
                    "Active session exists for this identity".into(),
                ))
            }
            Some(IdentityState::Processing { .. }) => {
                return Err(VeilvoteError::DuplicateScan(
                    "Cooldown active for this identity".into(),
                ))
            }
            None => {}
        }

        self.entries.insert(
            identity.to_string(),
            IdentityState::Processing {
                until: now + self.cooldown_ms,
            },
        );
        Ok(())
    }

    /// `Processing -> Authenticated`. The session window restarts at the
    /// moment the commitment is issued.
    pub fn confirm_authenticated(
        &mut self,
        identity: &str,
        commitment: Commitment,
        now: u64,
    ) -> VeilvoteResult<()> {
        match self.state(identity, now) {
            Some(IdentityState::Processing { .. }) => {}
            other => {
                return Err(VeilvoteError::Internal(format!(
                    "Cannot authenticate identity in state {:?}",
                    other
                )))
            }
        }

        self.entries.insert(
            identity.to_string(),
            IdentityState::Authenticated {
                commitment,
                until: now + self.cooldown_ms,
            },
        );
        Ok(())
    }

    /// Drop a `Processing` entry after a failed derivation so the operator
    /// can retry immediately.
    pub fn abort_processing(&mut self, identity: &str) {
        if let Some(IdentityState::Processing { .. }) = self.entries.get(identity) {
            self.entries.remove(identity);
        }
    }

    /// Whether the identity has a confirmed vote. `Voted` never expires, so
    /// no clock value is needed.
    pub fn has_voted(&self, identity: &str) -> bool {
        matches!(self.entries.get(identity), Some(IdentityState::Voted))
    }

    /// `Authenticated -> Voted`. Terminal; a second call surfaces
    /// `AlreadyVoted` without mutating anything.
    pub fn mark_voted(&mut self, identity: &str) -> VeilvoteResult<()> {
        if let Some(IdentityState::Voted) = self.entries.get(identity) {
            return Err(VeilvoteError::AlreadyVoted(format!(
                "Identity {} already voted",
                identity
            )));
        }
        self.entries
            .insert(identity.to_string(), IdentityState::Voted);
        Ok(())
    }

    /// Remove expired `Processing`/`Authenticated` entries. Semantics never
    /// depend on this running; it only bounds memory.
    pub fn purge_expired(&mut self, now: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, state| !state.is_expired(now));
        let purged = before - self.entries.len();
        if purged > 0 {
            debug!("Purged {} expired guard entries", purged);
        }
        purged
    }

    /// Forget every identity. Only the admin reset path uses this.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
