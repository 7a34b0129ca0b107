//! Server configuration from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// Which catalog implementation serves requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Backend::Postgres),
            "memory" | "mem" => Ok(Backend::Memory),
            _ => Err(ConfigError::InvalidValue {
                name: "LARDER_BACKEND".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend: Backend,
    /// Required for the Postgres backend.
    pub database_url: Option<String>,
    /// Spreadsheet loaded into the memory backend at startup.
    pub seed_file: Option<PathBuf>,
    pub bind_addr: SocketAddr,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `LARDER_BACKEND`: `postgres` (default) or `memory`
    /// - `DATABASE_URL`: required when the backend is `postgres`
    /// - `LARDER_SEED_FILE`: optional table to load into the memory backend
    /// - `LARDER_BIND_ADDR`: listen address (default: "0.0.0.0:3000")
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Config::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let backend = var("LARDER_BACKEND")
            .map(|v| v.parse::<Backend>())
            .transpose()?
            .unwrap_or_default();

        let database_url = var("DATABASE_URL");
        if backend == Backend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingEnvVar("DATABASE_URL".to_string()));
        }

        let seed_file = var("LARDER_SEED_FILE").map(PathBuf::from);

        let bind_raw = var("LARDER_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                name: "LARDER_BIND_ADDR".to_string(),
                value: bind_raw.clone(),
            })?;

        Ok(Self {
            backend,
            database_url,
            seed_file,
            bind_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_postgres_is_default_and_needs_url() {
        assert_eq!(
            config(&[]),
            Err(ConfigError::MissingEnvVar("DATABASE_URL".to_string()))
        );

        let cfg = config(&[("DATABASE_URL", "postgres://localhost/larder")]).unwrap();
        assert_eq!(cfg.backend, Backend::Postgres);
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert_eq!(cfg.seed_file, None);
    }

    #[test]
    fn test_memory_backend_with_seed() {
        let cfg = config(&[
            ("LARDER_BACKEND", "Memory"),
            ("LARDER_SEED_FILE", "data/recipes.xlsx"),
            ("LARDER_BIND_ADDR", "127.0.0.1:8080"),
        ])
        .unwrap();
        assert_eq!(cfg.backend, Backend::Memory);
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.seed_file, Some(PathBuf::from("data/recipes.xlsx")));
        assert_eq!(cfg.bind_addr.port(), 8080);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config(&[("LARDER_BACKEND", "mongo")]),
            Err(ConfigError::InvalidValue { name, .. }) if name == "LARDER_BACKEND"
        ));
        assert!(matches!(
            config(&[("LARDER_BACKEND", "memory"), ("LARDER_BIND_ADDR", "nowhere")]),
            Err(ConfigError::InvalidValue { name, .. }) if name == "LARDER_BIND_ADDR"
        ));
    }
}
