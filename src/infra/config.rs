//! Centralized configuration (environment variables + defaults).

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_FILE_PATH: &str = "file.json";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_DEPLOY_USER: &str = "ubuntu";
pub const DEFAULT_DEPLOY_KEY_FILE: &str = "~/.ssh/school";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Which backend the storage engine runs on. Chosen once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    File { path: PathBuf },
    Database { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub storage: StorageBackend,
    /// `HBNB_ENV`; `test` drops all tables when the database engine starts.
    pub env: Option<String>,
    pub bind_addr: SocketAddr,
}

impl Config {
    /// Reads the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let storage = match lookup("HBNB_TYPE_STORAGE").as_deref() {
            Some("db") => StorageBackend::Database {
                url: lookup("HBNB_DATABASE_URL")
                    .filter(|v| !v.is_empty())
                    .ok_or(ConfigError::Missing("HBNB_DATABASE_URL"))?,
            },
            _ => StorageBackend::File {
                path: lookup("HBNB_FILE_PATH")
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| DEFAULT_FILE_PATH.to_string())
                    .into(),
            },
        };

        let bind_addr: SocketAddr = lookup("HBNB_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "HBNB_BIND_ADDR",
                reason: e.to_string(),
            })?;

        Ok(Self {
            storage,
            env: lookup("HBNB_ENV"),
            bind_addr,
        })
    }

    pub fn is_test_env(&self) -> bool {
        self.env.as_deref() == Some("test")
    }
}

/// Where and as whom the deployment tooling connects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    pub hosts: Vec<String>,
    pub user: String,
    pub key_file: PathBuf,
}

impl DeployConfig {
    /// `hosts` is a comma-separated list; `key_file` may start with `~`.
    pub fn new(hosts: &str, user: &str, key_file: &str) -> Result<Self, ConfigError> {
        let hosts: Vec<String> = hosts
            .split(',')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .collect();
        if hosts.is_empty() {
            return Err(ConfigError::Missing("DEPLOY_HOSTS"));
        }
        let key_file = shellexpand::tilde(key_file).into_owned().into();
        Ok(Self {
            hosts,
            user: user.to_string(),
            key_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_to_the_file_backend() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(
            config.storage,
            StorageBackend::File {
                path: PathBuf::from(DEFAULT_FILE_PATH)
            }
        );
        assert_eq!(config.bind_addr.port(), 5000);
        assert!(!config.is_test_env());
    }

    #[test]
    fn db_backend_requires_a_url() {
        let err = Config::from_lookup(lookup(&[("HBNB_TYPE_STORAGE", "db")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("HBNB_DATABASE_URL"));

        let config = Config::from_lookup(lookup(&[
            ("HBNB_TYPE_STORAGE", "db"),
            ("HBNB_DATABASE_URL", "postgres://localhost/hbnb"),
            ("HBNB_ENV", "test"),
        ]))
        .unwrap();
        assert!(matches!(config.storage, StorageBackend::Database { .. }));
        assert!(config.is_test_env());
    }

    #[test]
    fn bad_bind_addr_is_reported() {
        let err = Config::from_lookup(lookup(&[("HBNB_BIND_ADDR", "nope")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "HBNB_BIND_ADDR", .. }));
    }

    #[test]
    fn deploy_hosts_are_split_and_trimmed() {
        let config = DeployConfig::new(" web-01 ,web-02,, ", "ubuntu", "/keys/id").unwrap();
        assert_eq!(config.hosts, vec!["web-01", "web-02"]);
        assert_eq!(config.key_file, PathBuf::from("/keys/id"));
        assert!(DeployConfig::new(" , ", "ubuntu", "/keys/id").is_err());
    }
}
