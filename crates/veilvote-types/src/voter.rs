use crate::digest::{Commitment, Nullifier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Output of commitment derivation for one authentication event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterCredential {
    pub commitment: Commitment,
    pub nullifier: Nullifier,
}

/// Server-side record kept alongside a commitment in the membership
/// registry. Retained for the demo's audit/lookup endpoints only; a
/// privacy-respecting deployment would not store the raw input at all.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoterRecord {
    /// Normalized logical identity the scan resolved to.
    pub identity: String,
    /// Raw sensor input exactly as received.
    pub raw_input: String,
    /// Hex encoding of the per-event salt.
    pub salt_hex: String,
    /// Derivation timestamp, milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    pub commitment: Commitment,
    pub nullifier: Nullifier,
    pub eligible: bool,
    pub has_voted: bool,
    pub voted_at: Option<DateTime<Utc>>,
    /// External ledger reference supplied by the vote-confirmation caller.
    pub vote_tx: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl VoterRecord {
    /// Shortened commitment preview for admin listings, `0123abcd...` style.
    pub fn commitment_preview(&self) -> String {
        format!("{}...", &self.commitment.to_hex()[..16])
    }
}
