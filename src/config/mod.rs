use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::session::SessionMode;

/// Origin used when `ZURA_API_URL` is not set (the local development backend).
pub const DEFAULT_ORIGIN: &str = "http://localhost:4000";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub origin: String,
    pub prefix: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub tenant_header: String,
    pub log_requests: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub mode: SessionMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub config_dir: Option<PathBuf>,
}

impl ApiConfig {
    /// Root every resource and auth path is resolved against.
    pub fn base_url(&self) -> String {
        format!("{}{}", self.origin.trim_end_matches('/'), self.prefix)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    /// Configuration pointing at an explicit origin, used by tests and embedders.
    pub fn for_origin(origin: impl Into<String>, mode: SessionMode) -> Self {
        let mut config = Self::development();
        config.api.origin = origin.into().trim().trim_end_matches('/').to_string();
        config.api.log_requests = false;
        config.session.mode = mode;
        config
    }

    fn with_env_overrides(mut self) -> Self {
        // API overrides
        if let Ok(v) = env::var("ZURA_API_URL") {
            let v = v.trim();
            if !v.is_empty() {
                self.api.origin = v.trim_end_matches('/').to_string();
            }
        }
        if let Ok(v) = env::var("ZURA_TIMEOUT_SECS") {
            self.api.timeout_secs = v.parse().unwrap_or(self.api.timeout_secs);
        }
        if let Ok(v) = env::var("ZURA_CONNECT_TIMEOUT_SECS") {
            self.api.connect_timeout_secs = v.parse().unwrap_or(self.api.connect_timeout_secs);
        }
        if let Ok(v) = env::var("ZURA_ORG_HEADER") {
            if !v.trim().is_empty() {
                self.api.tenant_header = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("ZURA_LOG_REQUESTS") {
            self.api.log_requests = v.parse().unwrap_or(self.api.log_requests);
        }

        // Session overrides
        if let Ok(v) = env::var("ZURA_USE_COOKIES") {
            self.session.mode = SessionMode::from_use_cookies(&v);
        }

        // Storage overrides
        if let Ok(v) = env::var("ZURA_CONFIG_DIR") {
            self.storage.config_dir = Some(PathBuf::from(v));
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                origin: DEFAULT_ORIGIN.to_string(),
                prefix: "/api".to_string(),
                timeout_secs: 25,
                connect_timeout_secs: 10,
                tenant_header: "X-Org-Id".to_string(),
                log_requests: true,
            },
            session: SessionConfig {
                mode: SessionMode::Cookie,
            },
            storage: StorageConfig { config_dir: None },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.api.log_requests = true;
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.api.timeout_secs = 15;
        config.api.connect_timeout_secs = 5;
        config.api.log_requests = false;
        config
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<ClientConfig> = Lazy::new(ClientConfig::from_env);

pub fn config() -> &'static ClientConfig {
    &CONFIG
}
