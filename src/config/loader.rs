/// Configuration loading from TOML file
use std::path::Path;

use crate::error::{OracleError, Result};
use crate::types::OracleConfig;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<OracleConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| OracleError::ConfigError(format!("Failed to read config file: {}", e)))?;

    let config: OracleConfig = toml::from_str(&content)
        .map_err(|e| OracleError::ConfigError(format!("Failed to parse config: {}", e)))?;

    // Validate config
    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &OracleConfig) -> Result<()> {
    if config.signing_keys.is_empty() {
        return Err(OracleError::ConfigError(
            "At least one signing key is required".to_string(),
        ));
    }

    for key in &config.signing_keys {
        if key.key_id.is_empty() {
            return Err(OracleError::ConfigError("Signing key id is empty".to_string()));
        }
        // 32-byte Ed25519 seed, hex encoded
        if key.secret_seed_hex.len() != 64 {
            return Err(OracleError::ConfigError(format!(
                "Signing key {} seed must be 64 hex chars",
                key.key_id
            )));
        }
        if let Some(until) = key.valid_until {
            if until <= key.valid_from {
                return Err(OracleError::ConfigError(format!(
                    "Signing key {} has valid_until before valid_from",
                    key.key_id
                )));
            }
        }
    }

    if config.master_api_key.is_empty() {
        return Err(OracleError::ConfigError("master_api_key is empty".to_string()));
    }

    Ok(())
}
