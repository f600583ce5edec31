//! Identity resolution pre-stage: format check, normalization, optional
//! alias mapping and allowlist enforcement. Runs before the guard so the
//! state machine only ever sees normalized logical identities.

use crate::config::GuardConfig;
use std::collections::{HashMap, HashSet};
use veilvote_types::{VeilvoteError, VeilvoteResult};

pub struct IdentityResolver {
    digits: usize,
    aliases: HashMap<String, String>,
    allowlist: HashSet<String>,
}

impl IdentityResolver {
    pub fn from_config(config: &GuardConfig) -> Self {
        let digits = config.identity_digits;
        Self {
            digits,
            aliases: config.aliases.clone(),
            allowlist: config
                .allowlist
                .iter()
                .map(|id| normalize(id, digits))
                .collect(),
        }
    }

    /// Resolve a raw sensor reading to a normalized logical identity.
    ///
    /// Rejects empty and non-digit inputs with `InvalidInput`; when an
    /// allowlist is configured, unknown identities are rejected the same way
    /// (the operator sees "not on the roster", never which IDs exist).
    pub fn resolve(&self, raw: &str) -> VeilvoteResult<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(VeilvoteError::InvalidInput(
                "Identity must not be empty".into(),
            ));
        }
        if !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(VeilvoteError::InvalidInput(format!(
                "Identity '{}' is not numeric",
                trimmed
            )));
        }

        let mapped = self.aliases.get(trimmed).map(String::as_str).unwrap_or(trimmed);
        let logical = normalize(mapped, self.digits);

        if !self.allowlist.is_empty() && !self.allowlist.contains(&logical) {
            return Err(VeilvoteError::InvalidInput(
                "Identity is not on the roster".into(),
            ));
        }

        Ok(logical)
    }
}

/// Zero-pad on the left up to `digits`; keep the leading `digits` characters
/// when the input is longer.
fn normalize(id: &str, digits: usize) -> String {
    if id.len() >= digits {
        id[..digits].to_string()
    } else {
        format!("{:0>width$}", id, width = digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(config: GuardConfig) -> IdentityResolver {
        IdentityResolver::from_config(&config)
    }

    #[test]
    fn test_short_id_is_zero_padded() {
        let r = resolver(GuardConfig::default());
        assert_eq!(r.resolve("42").unwrap(), "000000000042");
    }

    #[test]
    fn test_long_id_keeps_leading_digits() {
        let r = resolver(GuardConfig::default());
        assert_eq!(r.resolve("12345678901299").unwrap(), "123456789012");
    }

    #[test]
    fn test_exact_width_passes_through() {
        let r = resolver(GuardConfig::default());
        assert_eq!(r.resolve("123456789012").unwrap(), "123456789012");
    }

    #[test]
    fn test_empty_and_non_numeric_rejected() {
        let r = resolver(GuardConfig::default());
        assert!(matches!(
            r.resolve("").unwrap_err(),
            VeilvoteError::InvalidInput(_)
        ));
        assert!(matches!(
            r.resolve("12ab34").unwrap_err(),
            VeilvoteError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let r = resolver(GuardConfig::default());
        assert_eq!(r.resolve("  42 \n").unwrap(), "000000000042");
    }

    #[test]
    fn test_alias_maps_sensor_id_to_logical_id() {
        let mut config = GuardConfig::default();
        config.aliases.insert("7".into(), "123456789012".into());
        let r = resolver(config);
        assert_eq!(r.resolve("7").unwrap(), "123456789012");
    }

    #[test]
    fn test_allowlist_rejects_unknown_identity() {
        let mut config = GuardConfig::default();
        config.allowlist.insert("123456789012".into());
        let r = resolver(config);
        assert!(r.resolve("123456789012").is_ok());
        assert!(r.resolve("999999999999").is_err());
    }

    #[test]
    fn test_allowlist_entries_are_normalized() {
        let mut config = GuardConfig::default();
        config.allowlist.insert("42".into());
        let r = resolver(config);
        assert!(r.resolve("42").is_ok());
        assert!(r.resolve("000000000042").is_ok());
    }
}
