use fairdraw_core::{EngineConfig, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const PASSPHRASE_ENV: &str = "FAIRDRAW_KEY_PASSPHRASE";
const ENGINE_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    pub data_dir: PathBuf,
    pub engine_config_path: Option<PathBuf>,
}

impl CliConfig {
    pub fn new(data_dir: Option<PathBuf>, engine_config_path: Option<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.unwrap_or_else(default_data_dir),
            engine_config_path,
        }
    }

    pub fn keys_dir(&self) -> PathBuf {
        self.data_dir.join("keys")
    }

    /// Explicit `--config` file, else `<data-dir>/config.json`, else defaults
    pub fn engine_config(&self) -> Result<EngineConfig> {
        if let Some(path) = &self.engine_config_path {
            return EngineConfig::load(path);
        }

        let fallback = self.data_dir.join(ENGINE_CONFIG_FILE);
        if fallback.exists() {
            return EngineConfig::load(&fallback);
        }

        Ok(EngineConfig::default())
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fairdraw")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_engine_config_from_data_dir() {
        let temp_dir = tempdir().unwrap();
        let config = CliConfig::new(Some(temp_dir.path().to_path_buf()), None);
        assert_eq!(config.engine_config().unwrap().seed_bytes, 64);

        std::fs::write(
            temp_dir.path().join("config.json"),
            r#"{ "transaction_id_prefix": "BET" }"#,
        )
        .unwrap();
        assert_eq!(config.engine_config().unwrap().transaction_id_prefix, "BET");
        assert_eq!(config.keys_dir(), temp_dir.path().join("keys"));
    }
}
