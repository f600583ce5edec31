//! Async election service: the single logical owner of the guard and the
//! membership registry.
//!
//! Every mutating operation takes the write half of one `RwLock`, so
//! concurrent scans serialize in some order and no caller ever observes a
//! half-updated root. All rejections are returned to the caller and also
//! published on the event bus; no scan error can take the service down.

use crate::clock::{Clock, SystemClock};
use crate::config::GuardConfig;
use crate::events::{ElectionEvent, EventBus};
use crate::guard::EligibilityGuard;
use crate::registry::CommitmentRegistry;
use crate::roster::IdentityResolver;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};
use veilvote_crypto::{derive_credential, random_salt, MembershipProof};
use veilvote_types::{
    Commitment, Digest256, Nullifier, VeilvoteError, VeilvoteResult, VoterRecord,
};

/// Result of a successfully processed scan.
#[derive(Clone, Debug, Serialize)]
pub struct ScanOutcome {
    pub commitment: Commitment,
    pub nullifier: Nullifier,
    pub root: Digest256,
    pub proof: MembershipProof,
}

/// Answer to an eligibility query, consumed by the credential issuer.
#[derive(Clone, Debug, Serialize)]
pub struct EligibilityReport {
    pub eligible: bool,
    pub nullifier: Nullifier,
    pub root: Digest256,
    pub proof: MembershipProof,
}

/// Admin snapshot of the membership set.
#[derive(Clone, Debug, Serialize)]
pub struct ElectionStats {
    pub size: usize,
    pub root: Digest256,
    pub commitment_previews: Vec<String>,
}

struct ElectionState {
    guard: EligibilityGuard,
    registry: CommitmentRegistry,
}

pub struct ElectionService {
    state: Arc<RwLock<ElectionState>>,
    resolver: IdentityResolver,
    events: EventBus,
    clock: Arc<dyn Clock>,
    sweep_interval_ms: u64,
}

impl ElectionService {
    pub fn new(config: GuardConfig) -> VeilvoteResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build the service around an injected clock; tests pass a
    /// [`crate::ManualClock`] to drive cooldowns deterministically.
    pub fn with_clock(config: GuardConfig, clock: Arc<dyn Clock>) -> VeilvoteResult<Self> {
        config.validate()?;
        Ok(Self {
            state: Arc::new(RwLock::new(ElectionState {
                guard: EligibilityGuard::new(config.cooldown_ms),
                registry: CommitmentRegistry::new(),
            })),
            resolver: IdentityResolver::from_config(&config),
            events: EventBus::default(),
            clock,
            sweep_interval_ms: config.sweep_interval_ms,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ElectionEvent> {
        self.events.subscribe()
    }

    pub(crate) fn sweep_interval_ms(&self) -> u64 {
        self.sweep_interval_ms
    }

    /// Process one raw sensor scan end to end: resolve, admit, derive,
    /// insert, authenticate, publish.
    pub async fn process_scan(&self, raw: &str) -> VeilvoteResult<ScanOutcome> {
        let identity = match self.resolver.resolve(raw) {
            Ok(identity) => identity,
            Err(err) => return Err(self.reject(err)),
        };

        let mut state = self.state.write().await;
        let now = self.clock.now_millis();

        if let Err(err) = state.guard.admit_scan(&identity, now) {
            return Err(self.reject(err));
        }

        let salt = random_salt();
        let credential = match derive_credential(&identity, salt.as_bytes(), now) {
            Ok(credential) => credential,
            Err(err) => {
                state.guard.abort_processing(&identity);
                return Err(self.reject(err));
            }
        };

        let record = VoterRecord {
            identity: identity.clone(),
            raw_input: raw.trim().to_string(),
            salt_hex: salt.to_hex(),
            timestamp_ms: now,
            commitment: credential.commitment,
            nullifier: credential.nullifier,
            eligible: true,
            has_voted: false,
            voted_at: None,
            vote_tx: None,
            created_at: Utc::now(),
        };

        if let Err(err) = state.registry.insert(credential.commitment, record) {
            state.guard.abort_processing(&identity);
            return Err(self.reject(err));
        }

        state
            .guard
            .confirm_authenticated(&identity, credential.commitment, now)?;

        let root = state.registry.root();
        let proof = state.registry.prove(&credential.commitment)?;

        info!(
            commitment = %credential.commitment,
            root = %root,
            size = state.registry.size(),
            "Voter scan processed"
        );
        self.events.publish(ElectionEvent::VoterProcessed {
            commitment: credential.commitment,
            nullifier: credential.nullifier,
            eligible: true,
        });
        self.events.publish(ElectionEvent::RootUpdated {
            root,
            size: state.registry.size(),
        });

        Ok(ScanOutcome {
            commitment: credential.commitment,
            nullifier: credential.nullifier,
            root,
            proof,
        })
    }

    /// Eligibility check plus a fresh proof against the current root.
    pub async fn verify_eligibility(
        &self,
        commitment: &Commitment,
    ) -> VeilvoteResult<EligibilityReport> {
        let state = self.state.read().await;
        let record = state.registry.record(commitment).ok_or_else(|| {
            VeilvoteError::NotFound(format!("Commitment {} not registered", commitment))
        })?;

        Ok(EligibilityReport {
            eligible: record.eligible && !record.has_voted,
            nullifier: record.nullifier,
            root: state.registry.root(),
            proof: state.registry.prove(commitment)?,
        })
    }

    /// Confirm a vote recorded on the external ledger. Idempotence: a
    /// second call for the same commitment, or for any other commitment the
    /// same identity holds from a lapsed session, surfaces `AlreadyVoted`
    /// and mutates nothing.
    pub async fn mark_voted(
        &self,
        commitment: &Commitment,
        tx_reference: &str,
    ) -> VeilvoteResult<()> {
        let mut state = self.state.write().await;

        // Identity-level check first: a lapsed session may have left this
        // identity with more than one commitment, and only one may vote.
        // Nothing is mutated until both checks pass.
        let identity = state
            .registry
            .record(commitment)
            .map(|record| record.identity.clone())
            .ok_or_else(|| {
                VeilvoteError::NotFound(format!("Commitment {} not registered", commitment))
            })?;
        if state.guard.has_voted(&identity) {
            return Err(VeilvoteError::AlreadyVoted(format!(
                "Identity {} already voted",
                identity
            )));
        }

        state
            .registry
            .mark_voted(commitment, tx_reference, Utc::now())?;
        state.guard.mark_voted(&identity)?;

        info!(commitment = %commitment, tx = tx_reference, "Vote recorded");
        self.events.publish(ElectionEvent::VoteRecorded {
            commitment: *commitment,
            tx_reference: tx_reference.to_string(),
        });
        Ok(())
    }

    pub async fn root(&self) -> Digest256 {
        self.state.read().await.registry.root()
    }

    pub async fn size(&self) -> usize {
        self.state.read().await.registry.size()
    }

    /// Admin lookup of one voter record.
    pub async fn voter_card(&self, commitment: &Commitment) -> VeilvoteResult<VoterRecord> {
        self.state
            .read()
            .await
            .registry
            .record(commitment)
            .cloned()
            .ok_or_else(|| {
                VeilvoteError::NotFound(format!("Commitment {} not registered", commitment))
            })
    }

    /// Admin listing of every record.
    pub async fn voters(&self) -> Vec<VoterRecord> {
        self.state.read().await.registry.records().cloned().collect()
    }

    pub async fn stats(&self) -> ElectionStats {
        let state = self.state.read().await;
        ElectionStats {
            size: state.registry.size(),
            root: state.registry.root(),
            commitment_previews: state
                .registry
                .records()
                .map(VoterRecord::commitment_preview)
                .collect(),
        }
    }

    /// Admin reset: drop all records and guard state, restore the empty
    /// root. The only non-append operation in the engine.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        state.registry.reset();
        state.guard.clear();
        info!("Election state reset");
        self.events.publish(ElectionEvent::RootUpdated {
            root: Digest256::zero(),
            size: 0,
        });
    }

    /// Reclaim expired guard entries; called by the sweeper.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now_millis();
        self.state.write().await.guard.purge_expired(now)
    }

    /// Number of live guard entries, for ops visibility and tests.
    pub async fn guard_entries(&self) -> usize {
        self.state.read().await.guard.len()
    }

    fn reject(&self, err: VeilvoteError) -> VeilvoteError {
        warn!("Scan rejected: {}", err);
        self.events.publish(ElectionEvent::ScanRejected {
            reason: err.to_string(),
        });
        err
    }
}
