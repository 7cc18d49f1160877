use crate::error::{FairDrawError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MIN_RSA_KEY_BITS: usize = 2048;
pub const MIN_SEED_BYTES: usize = 64;
pub const MIN_TRANSACTION_ID_RANDOM_BYTES: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Modulus size for newly generated signing keys
    pub rsa_key_bits: usize,
    /// Number of random bytes in each draw seed
    pub seed_bytes: usize,
    pub transaction_id_prefix: String,
    pub transaction_id_random_bytes: usize,
    /// PBKDF2 rounds protecting the private key at rest
    pub kdf_iterations: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rsa_key_bits: MIN_RSA_KEY_BITS,
            seed_bytes: MIN_SEED_BYTES,
            transaction_id_prefix: "TXN".to_string(),
            transaction_id_random_bytes: MIN_TRANSACTION_ID_RANDOM_BYTES,
            kdf_iterations: 100_000,
        }
    }
}

impl EngineConfig {
    /// Read a JSON config file. Missing fields fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        tracing::debug!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rsa_key_bits < MIN_RSA_KEY_BITS {
            return Err(FairDrawError::config(format!(
                "RSA key size must be at least {} bits, got {}",
                MIN_RSA_KEY_BITS, self.rsa_key_bits
            )));
        }

        if self.seed_bytes < MIN_SEED_BYTES {
            return Err(FairDrawError::config(format!(
                "Seed must be at least {} bytes, got {}",
                MIN_SEED_BYTES, self.seed_bytes
            )));
        }

        if self.transaction_id_prefix.is_empty()
            || !self
                .transaction_id_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(FairDrawError::config(
                "Transaction ID prefix must be non-empty ASCII alphanumerics",
            ));
        }

        if self.transaction_id_random_bytes < MIN_TRANSACTION_ID_RANDOM_BYTES {
            return Err(FairDrawError::config(format!(
                "Transaction ID needs at least {} random bytes",
                MIN_TRANSACTION_ID_RANDOM_BYTES
            )));
        }

        if self.kdf_iterations == 0 {
            return Err(FairDrawError::config("KDF iterations must be greater than 0"));
        }

        Ok(())
    }
}
