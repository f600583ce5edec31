//! Shared type definitions for the VeilVote identity commitment engine.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod digest;
pub mod error;
pub mod voter;

pub use digest::{Commitment, Digest256, Nullifier, Salt};
pub use error::{VeilvoteError, VeilvoteResult};
pub use voter::{VoterCredential, VoterRecord};

/// Width of every digest produced by the hash fusion layer, in bytes.
pub const DIGEST_SIZE: usize = 32;

/// Minimum accepted salt length for commitment derivation, in bytes.
pub const MIN_SALT_SIZE: usize = 16;

/// Length of a freshly generated salt, in bytes.
pub const SALT_SIZE: usize = 16;

/// Digit width raw identities are normalized to before entering the guard.
pub const IDENTITY_DIGITS: usize = 12;

/// Default duplicate-scan cooldown window, in milliseconds.
pub const DEFAULT_COOLDOWN_MS: u64 = 30_000;
