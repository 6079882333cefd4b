use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::applications::{ListSettings, DEFAULT_PAGE_LIMIT};

const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_API_TIMEOUT_SECS: u64 = 15;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the console service and CLI.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub backend: BackendConfig,
    pub list: ListSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let api_url =
            non_empty_var("CONSOLE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let timeout_secs = match non_empty_var("CONSOLE_API_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout)?,
            None => DEFAULT_API_TIMEOUT_SECS,
        };
        let api_token = non_empty_var("CONSOLE_API_TOKEN");

        let page_limit = match non_empty_var("CONSOLE_PAGE_LIMIT") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or(ConfigError::InvalidPageLimit)?,
            None => DEFAULT_PAGE_LIMIT,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            backend: BackendConfig {
                api_url,
                timeout_secs,
                api_token,
            },
            list: ListSettings { page_limit },
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Where the console reaches the employer applications API.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub api_url: String,
    pub timeout_secs: u64,
    pub api_token: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            api_token: None,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTimeout,
    InvalidPageLimit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "CONSOLE_API_TIMEOUT_SECS must be a positive integer")
            }
            ConfigError::InvalidPageLimit => {
                write!(f, "CONSOLE_PAGE_LIMIT must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidTimeout
            | ConfigError::InvalidPageLimit => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "CONSOLE_API_URL",
            "CONSOLE_API_TIMEOUT_SECS",
            "CONSOLE_API_TOKEN",
            "CONSOLE_PAGE_LIMIT",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.backend.api_url, DEFAULT_API_URL);
        assert_eq!(config.backend.timeout_secs, DEFAULT_API_TIMEOUT_SECS);
        assert!(config.backend.api_token.is_none());
        assert_eq!(config.list.page_limit, DEFAULT_PAGE_LIMIT);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn reads_console_settings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CONSOLE_API_URL", "https://jobs.example.test/");
        env::set_var("CONSOLE_API_TOKEN", "  secret  ");
        env::set_var("CONSOLE_PAGE_LIMIT", "50");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.backend.api_url, "https://jobs.example.test/");
        assert_eq!(config.backend.api_token.as_deref(), Some("secret"));
        assert_eq!(config.list.page_limit, 50);
        reset_env();
    }

    #[test]
    fn rejects_zero_page_limit() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CONSOLE_PAGE_LIMIT", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidPageLimit)
        ));
        reset_env();
    }
}
