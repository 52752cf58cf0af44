/// Centralized error types for the oracle
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OracleError {
    // Input Errors
    #[error("Unknown market identifier: {0}")]
    UnknownMarket(String),

    #[error("API key required")]
    ApiKeyRequired,

    #[error("Invalid API key")]
    InvalidApiKey,

    // Schedule Computation Errors
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid wall-clock time: {0}")]
    InvalidWallClock(String),

    // Signing Errors
    #[error("No signing key valid at {0}")]
    NoActiveSigningKey(String),

    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    #[error("Signature verification failed: {0}")]
    VerificationFailed(String),

    // Override Store Errors
    #[error("Override store failure: {0}")]
    OverrideStore(String),

    // Configuration Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // File I/O Errors
    #[error("File I/O error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),

    // Generic Errors
    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type Result<T> = std::result::Result<T, OracleError>;

impl OracleError {
    /// Machine-readable code for API bodies and log correlation.
    pub fn error_code(&self) -> &str {
        match self {
            OracleError::UnknownMarket(_) => "UNKNOWN_MIC",
            OracleError::ApiKeyRequired => "API_KEY_REQUIRED",
            OracleError::InvalidApiKey => "INVALID_API_KEY",
            OracleError::InvalidTimezone(_) => "SCHED_001",
            OracleError::InvalidWallClock(_) => "SCHED_002",
            OracleError::NoActiveSigningKey(_) => "SIGN_001",
            OracleError::InvalidKeyMaterial(_) => "SIGN_002",
            OracleError::VerificationFailed(_) => "SIGN_003",
            OracleError::OverrideStore(_) => "OVR_001",
            OracleError::ConfigError(_) => "CFG_001",
            OracleError::FileError(_) => "FILE_001",
            OracleError::SerializationError(_) => "DATA_001",
            OracleError::InternalError(_) => "INT_001",
        }
    }

    /// HTTP status an adapter should map this error to.
    pub fn http_status(&self) -> u16 {
        match self {
            OracleError::UnknownMarket(_) => 400,
            OracleError::ApiKeyRequired => 401,
            OracleError::InvalidApiKey => 403,
            _ => 500,
        }
    }

    /// Client-correctable input errors never enter the signing tiers.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            OracleError::UnknownMarket(_) | OracleError::ApiKeyRequired | OracleError::InvalidApiKey
        )
    }
}
