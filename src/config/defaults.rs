//! Configuration default values
//!
//! This module contains all the default values for configuration options,
//! making them easily changeable in one central location.

// Database defaults
pub const DEFAULT_DATABASE_URL: &str = "sqlite://./data/stream-endpoints.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_CONNECT_TIMEOUT: &str = "5s";

// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

// Live stream probe defaults
pub const DEFAULT_PROBE_TIMEOUT: &str = "10s";
pub const DEFAULT_PROBE_CONNECT_TIMEOUT: &str = "5s";
pub const DEFAULT_PROBE_USER_AGENT: &str = concat!("stream-endpoint-manager/", env!("CARGO_PKG_VERSION"));

// Logging defaults
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Environment overrides
pub const ENV_PREFIX: &str = "SEM_";
pub const ENV_CONFIG_FILE: &str = "SEM_CONFIG_FILE";
