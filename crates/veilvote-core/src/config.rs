use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use veilvote_types::{VeilvoteError, VeilvoteResult, DEFAULT_COOLDOWN_MS, IDENTITY_DIGITS};

/// Configuration for the eligibility guard and the roster pre-stage.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Duplicate-scan cooldown window, also the lifetime of an unconsumed
    /// authenticated session.
    pub cooldown_ms: u64,
    /// Digit width identities are normalized to before any lookup.
    pub identity_digits: usize,
    /// Optional allowlist of logical identities; empty means open roster.
    pub allowlist: HashSet<String>,
    /// Optional raw-sensor-ID to logical-voter-ID mapping applied before
    /// the allowlist check.
    pub aliases: HashMap<String, String>,
    /// Interval between background sweeps of expired guard entries.
    pub sweep_interval_ms: u64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            identity_digits: IDENTITY_DIGITS,
            allowlist: HashSet::new(),
            aliases: HashMap::new(),
            sweep_interval_ms: 10_000,
        }
    }
}

impl GuardConfig {
    pub fn validate(&self) -> VeilvoteResult<()> {
        if self.cooldown_ms == 0 {
            return Err(VeilvoteError::Config("cooldown_ms must be non-zero".into()));
        }
        if self.identity_digits == 0 {
            return Err(VeilvoteError::Config(
                "identity_digits must be non-zero".into(),
            ));
        }
        for entry in &self.allowlist {
            if entry.is_empty() || !entry.chars().all(|c| c.is_ascii_digit()) {
                return Err(VeilvoteError::Config(format!(
                    "allowlist entry '{}' is not a digit string",
                    entry
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(GuardConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_cooldown_rejected() {
        let mut config = GuardConfig::default();
        config.cooldown_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_numeric_allowlist_entry_rejected() {
        let mut config = GuardConfig::default();
        config.allowlist.insert("not-a-number".into());
        assert!(config.validate().is_err());
    }
}
