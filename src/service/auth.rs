/// API key validation seam
///
/// The HTTP adapter extracts the key header and calls this before touching
/// the authenticated status endpoint. Kept behind a trait so deployments can
/// plug in their own credential source.
use crate::error::{OracleError, Result};
use crate::types::OracleConfig;

pub trait ApiKeyValidator: Send + Sync {
    fn validate(&self, key: Option<&str>) -> Result<()>;
}

/// Master key plus a list of beta keys, loaded from configuration.
pub struct StaticApiKeys {
    master: String,
    beta: Vec<String>,
}

impl StaticApiKeys {
    pub fn new(master: String, beta: Vec<String>) -> Self {
        StaticApiKeys { master, beta }
    }

    pub fn from_config(config: &OracleConfig) -> Self {
        StaticApiKeys::new(config.master_api_key.clone(), config.beta_api_keys.clone())
    }
}

impl ApiKeyValidator for StaticApiKeys {
    fn validate(&self, key: Option<&str>) -> Result<()> {
        let key = key.ok_or(OracleError::ApiKeyRequired)?;
        if key == self.master || self.beta.iter().any(|b| b == key) {
            return Ok(());
        }
        Err(OracleError::InvalidApiKey)
    }
}
