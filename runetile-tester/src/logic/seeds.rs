use anyhow::{Result, bail};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

const DEFAULT_SEED: u64 = 1337;

/// A resolved simulation seed and the token it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub label: Option<String>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self { seed, label: None }
    }

    /// Seed derived from the leading bytes of the label's SHA-256 digest.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let digest = Sha256::digest(label.trim().to_lowercase().as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        Self {
            seed: u64::from_le_bytes(bytes),
            label: Some(label.trim().to_string()),
        }
    }

    #[must_use]
    pub fn display(&self) -> String {
        match &self.label {
            Some(label) => format!("{} ({label})", self.seed),
            None => self.seed.to_string(),
        }
    }
}

/// Resolve CLI seed arguments.
///
/// Accepts decimal integers, `0x` hexadecimal, and `label:<text>` tokens
/// that hash free text into a seed. Duplicates collapse to the first
/// occurrence; an empty list falls back to a fixed default seed.
///
/// # Errors
///
/// Returns an error for tokens that match none of the accepted forms.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut resolved = Vec::new();
    let mut seen = HashSet::new();

    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let info = if let Some(label) = token.strip_prefix("label:") {
            if label.trim().is_empty() {
                bail!("Empty seed label");
            }
            SeedInfo::from_label(label)
        } else if let Some(hex) = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
        {
            match u64::from_str_radix(hex, 16) {
                Ok(value) => SeedInfo::from_numeric(value),
                Err(_) => bail!("Unrecognized seed token: {token}"),
            }
        } else if let Ok(value) = token.parse::<u64>() {
            SeedInfo::from_numeric(value)
        } else if let Ok(value) = token.parse::<i64>() {
            SeedInfo::from_numeric(value.unsigned_abs())
        } else {
            bail!("Unrecognized seed token: {token}");
        };
        if seen.insert(info.seed) {
            resolved.push(info);
        }
    }

    if resolved.is_empty() {
        resolved.push(SeedInfo::from_numeric(DEFAULT_SEED));
    }
    Ok(resolved)
}
