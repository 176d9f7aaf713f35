// src/config.rs
use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::AppError;

pub const MANAGE_ENV_PREFIX: &str = "MANAGE_";
pub const SERVER_ENV_PREFIX: &str = "SCHEDULE_";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_TIMEZONE: &str = "UTC";

// Credentials and location of the scheduling service
#[derive(Clone, Deserialize)]
pub struct ManageConfig {
    pub base_url: String,
    pub company_id: String,
    pub public_key: String,
    pub private_key: String,
    pub client_id: String,
}

impl fmt::Debug for ManageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManageConfig")
            .field("base_url", &self.base_url)
            .field("company_id", &self.company_id)
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("client_id", &self.client_id)
            .finish()
    }
}

impl ManageConfig {
    /// Reads `MANAGE_BASE_URL`, `MANAGE_COMPANY_ID`, `MANAGE_PUBLIC_KEY`,
    /// `MANAGE_PRIVATE_KEY` and `MANAGE_CLIENT_ID`.
    pub fn from_env() -> Result<Self, AppError> {
        envy::prefixed(MANAGE_ENV_PREFIX)
            .from_env::<ManageConfig>()
            .map_err(|e| AppError::Config(format!("schedule API settings: {}", e)))
    }
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
    pub cert_path: Option<PathBuf>,
    pub key_path: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, AppError> {
        envy::prefixed(SERVER_ENV_PREFIX)
            .from_env::<ServerConfig>()
            .map_err(|e| AppError::Config(format!("server settings: {}", e)))
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        self.bind_addr
            .parse()
            .map_err(|e| AppError::Config(format!("invalid bind address '{}': {}", self.bind_addr, e)))
    }

    /// Certificate and key, when both are configured.
    pub fn tls_paths(&self) -> Option<(PathBuf, PathBuf)> {
        match (&self.cert_path, &self.key_path) {
            (Some(cert), Some(key)) => Some((cert.clone(), key.clone())),
            _ => None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            default_timezone: default_timezone(),
            cert_path: None,
            key_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config: ServerConfig = envy::prefixed(SERVER_ENV_PREFIX)
            .from_iter(Vec::<(String, String)>::new())
            .unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.default_timezone, DEFAULT_TIMEZONE);
        assert!(config.tls_paths().is_none());
        assert_eq!(config.socket_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_server_config_from_vars() {
        let vars = vec![
            ("SCHEDULE_BIND_ADDR".to_string(), "0.0.0.0:8443".to_string()),
            ("SCHEDULE_DEFAULT_TIMEZONE".to_string(), "America/Chicago".to_string()),
            ("SCHEDULE_CERT_PATH".to_string(), "cert.pem".to_string()),
            ("SCHEDULE_KEY_PATH".to_string(), "key.pem".to_string()),
        ];
        let config: ServerConfig = envy::prefixed(SERVER_ENV_PREFIX).from_iter(vars).unwrap();
        assert_eq!(config.default_timezone, "America/Chicago");
        assert_eq!(
            config.tls_paths(),
            Some((PathBuf::from("cert.pem"), PathBuf::from("key.pem")))
        );
    }

    #[test]
    fn test_manage_config_requires_keys() {
        let vars = vec![(
            "MANAGE_BASE_URL".to_string(),
            "https://api.example.com".to_string(),
        )];
        let result = envy::prefixed(MANAGE_ENV_PREFIX).from_iter::<_, ManageConfig>(vars);
        assert!(result.is_err());
    }

    #[test]
    fn test_manage_config_debug_hides_private_key() {
        let vars = vec![
            ("MANAGE_BASE_URL".to_string(), "https://api.example.com".to_string()),
            ("MANAGE_COMPANY_ID".to_string(), "acme".to_string()),
            ("MANAGE_PUBLIC_KEY".to_string(), "pub-key".to_string()),
            ("MANAGE_PRIVATE_KEY".to_string(), "s3cret-private".to_string()),
            ("MANAGE_CLIENT_ID".to_string(), "client-123".to_string()),
        ];
        let config: ManageConfig = envy::prefixed(MANAGE_ENV_PREFIX).from_iter(vars).unwrap();
        assert_eq!(config.private_key, "s3cret-private");

        let debug = format!("{:?}", config);
        assert!(!debug.contains("s3cret-private"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("pub-key"));
    }

    #[test]
    fn test_invalid_bind_addr() {
        let config = ServerConfig {
            bind_addr: "not an address".to_string(),
            ..ServerConfig::default()
        };
        assert!(matches!(config.socket_addr(), Err(AppError::Config(_))));
    }
}
