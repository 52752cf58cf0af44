pub mod api;
pub mod auth;

pub use api::{ApiError, HealthReceipt, OracleService, ScheduleResponse};
pub use auth::{ApiKeyValidator, StaticApiKeys};
