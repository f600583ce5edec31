use crate::error::{VeilvoteError, VeilvoteResult};
use crate::{DIGEST_SIZE, SALT_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

/// Fixed-width 256-bit digest. Ordered by its byte representation, which is
/// the canonical sort order for root computation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Digest256(pub [u8; DIGEST_SIZE]);

impl Digest256 {
    pub fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> VeilvoteResult<Self> {
        let bytes = hex::decode(s.trim_start_matches("0x"))
            .map_err(|e| VeilvoteError::Crypto(e.to_string()))?;
        if bytes.len() != DIGEST_SIZE {
            return Err(VeilvoteError::Crypto("Invalid digest length".into()));
        }
        let mut arr = [0u8; DIGEST_SIZE];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// The distinguished all-zero value used as the empty membership root.
    pub fn zero() -> Self {
        Self([0u8; DIGEST_SIZE])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; DIGEST_SIZE]
    }
}

impl fmt::Debug for Digest256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest256({})", self.to_hex())
    }
}

impl fmt::Display for Digest256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Default for Digest256 {
    fn default() -> Self {
        Self::zero()
    }
}

/// Commitment binding one authentication event. Immutable once inserted into
/// the membership registry.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Commitment(pub Digest256);

impl Commitment {
    pub fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(Digest256::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        self.0.as_bytes()
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }

    pub fn from_hex(s: &str) -> VeilvoteResult<Self> {
        Ok(Self(Digest256::from_hex(s)?))
    }

    pub fn digest(&self) -> Digest256 {
        self.0
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", self.to_hex())
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Nullifier derived from a commitment, checked on-chain to prevent a single
/// authentication event from voting twice.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Nullifier(pub Digest256);

impl Nullifier {
    pub fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(Digest256::from_bytes(bytes))
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }

    pub fn from_hex(s: &str) -> VeilvoteResult<Self> {
        Ok(Self(Digest256::from_hex(s)?))
    }
}

impl fmt::Debug for Nullifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nullifier({})", self.to_hex())
    }
}

impl fmt::Display for Nullifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Per-event random salt. Doubles as the nullifier secret, so it is wiped
/// from memory on drop.
#[derive(Clone, Serialize, Deserialize)]
pub struct Salt(pub [u8; SALT_SIZE]);

impl Salt {
    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({}...)", &self.to_hex()[..8])
    }
}

impl Drop for Salt {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_hex_roundtrip() {
        let digest = Digest256::from_bytes([0xab; 32]);
        let parsed = Digest256::from_hex(&digest.to_hex()).unwrap();
        assert_eq!(digest, parsed);
    }

    #[test]
    fn test_digest_accepts_0x_prefix() {
        let digest = Digest256::from_bytes([0x01; 32]);
        let prefixed = format!("0x{}", digest.to_hex());
        assert_eq!(Digest256::from_hex(&prefixed).unwrap(), digest);
    }

    #[test]
    fn test_digest_rejects_bad_length() {
        assert!(Digest256::from_hex("abcd").is_err());
    }

    #[test]
    fn test_zero_is_default() {
        assert_eq!(Digest256::default(), Digest256::zero());
        assert!(Digest256::zero().is_zero());
    }

    #[test]
    fn test_commitment_order_follows_bytes() {
        let low = Commitment::from_bytes([0x00; 32]);
        let high = Commitment::from_bytes([0xff; 32]);
        assert!(low < high);
        assert!(low.to_hex() < high.to_hex());
    }
}
