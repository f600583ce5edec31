//! Voter commitment and nullifier derivation.
//!
//! A commitment binds (raw identity, per-event salt, timestamp) through
//! three domain-separated hash layers; the nullifier is derived from the
//! finished commitment plus the salt. Derivation is a pure function of its
//! inputs, which the tests rely on. Production callers must pass a fresh
//! [`random_salt`] per call, otherwise two sessions of the same voter become
//! linkable.

use crate::hashing::{self, primary, secondary, tertiary};
use veilvote_types::{
    Commitment, Nullifier, Salt, VeilvoteError, VeilvoteResult, VoterCredential, MIN_SALT_SIZE,
    SALT_SIZE,
};

/// Generate a fresh per-event salt.
pub fn random_salt() -> Salt {
    use rand::RngCore;
    let mut bytes = [0u8; SALT_SIZE];
    rand::thread_rng().fill_bytes(&mut bytes);
    Salt::from_bytes(bytes)
}

/// Derive the commitment and nullifier for one authentication event.
///
/// Fails with `InvalidInput` when the raw identity is empty or the salt is
/// shorter than [`MIN_SALT_SIZE`] bytes.
pub fn derive_credential(
    raw_identity: &str,
    salt: &[u8],
    timestamp_ms: u64,
) -> VeilvoteResult<VoterCredential> {
    if raw_identity.is_empty() {
        return Err(VeilvoteError::InvalidInput(
            "Raw identity must not be empty".into(),
        ));
    }
    if salt.len() < MIN_SALT_SIZE {
        return Err(VeilvoteError::InvalidInput(format!(
            "Salt must be at least {} bytes, got {}",
            MIN_SALT_SIZE,
            salt.len()
        )));
    }

    let raw = raw_identity.as_bytes();
    let timestamp = timestamp_ms.to_string();

    let layer1 = primary(&[raw, salt].concat());
    let layer2 = secondary(&[layer1.as_bytes().as_slice(), timestamp.as_bytes()].concat());
    let layer3 = tertiary(&[layer2.as_bytes().as_slice(), raw].concat());

    let commitment = Commitment(primary(
        &[
            layer1.as_bytes().as_slice(),
            layer2.as_bytes().as_slice(),
            layer3.as_bytes().as_slice(),
            salt,
        ]
        .concat(),
    ));

    let nullifier = Nullifier(hashing::primary_with_tag(
        hashing::NULLIFIER_TAG,
        &[commitment.as_bytes().as_slice(), salt, b"NULLIFIER".as_slice()].concat(),
    ));

    Ok(VoterCredential {
        commitment,
        nullifier,
    })
}
