//! Process configuration, read once from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use staffdesk_observability::LogFormat;

const DEV_JWT_SECRET: &str = "dev-secret";
const DEV_EMPLOYEE_ID_KEY: &str = "dev-employee-id-key";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BIND_ADDR '{0}' is not a socket address")]
    BindAddr(String),

    #[error("{0} is set but empty")]
    Empty(&'static str),
}

/// User seeded into the in-memory directory as "Super Admin".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub employee_id_key: String,
    pub asset_root: PathBuf,
    pub bootstrap_admin: Option<BootstrapAdmin>,
    pub log_format: LogFormat,
    /// Secrets that fell back to their insecure dev value.
    pub dev_defaults: Vec<&'static str>,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source. Nothing is logged here:
    /// tracing is configured from the result.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let raw_addr = var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string());
        let bind_addr = raw_addr.parse().map_err(|_| ConfigError::BindAddr(raw_addr.clone()))?;

        let mut dev_defaults = Vec::new();
        let jwt_secret = secret(&lookup, "JWT_SECRET", DEV_JWT_SECRET, &mut dev_defaults)?;
        let employee_id_key = secret(&lookup, "EMPLOYEE_ID_KEY", DEV_EMPLOYEE_ID_KEY, &mut dev_defaults)?;

        let asset_root = var("ASSET_ROOT").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("wwwroot/images"));

        let bootstrap_admin = var("BOOTSTRAP_ADMIN_EMAIL").map(|email| BootstrapAdmin {
            username: var("BOOTSTRAP_ADMIN_USERNAME").unwrap_or_else(|| email.clone()),
            email,
        });

        let log_format = var("LOG_FORMAT").map(|v| LogFormat::parse(&v)).unwrap_or_default();

        Ok(Self {
            bind_addr,
            jwt_secret,
            employee_id_key,
            asset_root,
            bootstrap_admin,
            log_format,
            dev_defaults,
        })
    }

    /// Call once tracing is up.
    pub fn log_dev_defaults(&self) {
        for variable in &self.dev_defaults {
            tracing::warn!(variable = *variable, "not set; using insecure dev default");
        }
    }

    /// Loopback config with fixed secrets, for in-process servers.
    pub fn local(jwt_secret: impl Into<String>, asset_root: impl Into<PathBuf>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: jwt_secret.into(),
            employee_id_key: DEV_EMPLOYEE_ID_KEY.to_string(),
            asset_root: asset_root.into(),
            bootstrap_admin: None,
            log_format: LogFormat::Json,
            dev_defaults: Vec::new(),
        }
    }

    pub fn with_bootstrap_admin(mut self, username: impl Into<String>, email: impl Into<String>) -> Self {
        self.bootstrap_admin = Some(BootstrapAdmin { username: username.into(), email: email.into() });
        self
    }
}

fn secret(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    dev_default: &str,
    dev_defaults: &mut Vec<&'static str>,
) -> Result<String, ConfigError> {
    match lookup(name) {
        Some(v) if v.trim().is_empty() => Err(ConfigError::Empty(name)),
        Some(v) => Ok(v),
        None => {
            dev_defaults.push(name);
            Ok(dev_default.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ApiConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn log_format_is_read_from_the_environment() {
        assert_eq!(config_from(&[("LOG_FORMAT", "pretty")]).unwrap().log_format, LogFormat::Pretty);
        assert_eq!(config_from(&[]).unwrap().log_format, LogFormat::Json);
    }

    #[test]
    fn missing_secrets_are_recorded_not_logged() {
        let config = config_from(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.employee_id_key, DEV_EMPLOYEE_ID_KEY);
        assert_eq!(config.dev_defaults, vec!["EMPLOYEE_ID_KEY"]);
    }

    #[test]
    fn blank_secret_and_bad_address_are_rejected() {
        assert!(matches!(config_from(&[("JWT_SECRET", "  ")]), Err(ConfigError::Empty("JWT_SECRET"))));
        assert!(matches!(config_from(&[("BIND_ADDR", "nowhere")]), Err(ConfigError::BindAddr(_))));
    }

    #[test]
    fn bootstrap_admin_username_defaults_to_email() {
        let config = config_from(&[("BOOTSTRAP_ADMIN_EMAIL", "root@example.com")]).unwrap();
        assert_eq!(
            config.bootstrap_admin,
            Some(BootstrapAdmin { username: "root@example.com".into(), email: "root@example.com".into() })
        );
    }
}
