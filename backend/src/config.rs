//! Server configuration.
//!
//! Values come from, in increasing priority: built-in defaults, an optional JSON
//! file given by `--config` / `PERMIT_PORTAL_CONFIG`, and the `--host`,
//! `--port` and `--database-path` arguments (or `PERMIT_PORTAL_HOST`,
//! `PERMIT_PORTAL_PORT` and `PERMIT_PORTAL_DB`).
//!
//! ```json
//! {
//!   "port": 8080,
//!   "database_path": "permits.sqlite",
//!   "codec": { "default_province": "Kigali" }
//! }
//! ```

use clap::Parser;
use common::codec::CodecConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Water permit application portal backend
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "backend")]
#[command(about = "Stores and reopens water permit applications")]
pub struct Args {
    /// JSON configuration file
    #[arg(long, env = "PERMIT_PORTAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "PERMIT_PORTAL_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PERMIT_PORTAL_PORT")]
    pub port: Option<u16>,

    /// SQLite database file
    #[arg(long, env = "PERMIT_PORTAL_DB")]
    pub database_path: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// SQLite file holding the `applications` table. Created on first start.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    #[serde(default)]
    pub codec: CodecConfig,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database_path() -> PathBuf {
    PathBuf::from("permits.sqlite")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_path: default_database_path(),
            codec: CodecConfig::default(),
        }
    }
}

impl Config {
    /// Reads the file named in `args`, if any, and applies the overrides.
    pub fn load(args: Args) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                Some(contents)
            }
            None => None,
        };
        Self::from_sources(file.as_deref(), args)
    }

    /// Builds the configuration from file contents and parsed arguments.
    pub fn from_sources(file: Option<&str>, args: Args) -> Result<Self, ConfigError> {
        let mut config: Config = match file {
            Some(contents) => serde_json::from_str(contents)?,
            None => Config::default(),
        };

        if let Some(host) = args.host {
            config.host = host;
        }
        if let Some(port) = args.port {
            config.port = port;
        }
        if let Some(db) = args.database_path {
            config.database_path = db;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::application::Province;

    #[test]
    fn defaults_without_sources() {
        let config = Config::from_sources(None, Args::default()).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_path, PathBuf::from("permits.sqlite"));
        assert_eq!(config.codec, CodecConfig::default());
    }

    #[test]
    fn file_fills_missing_fields_with_defaults() {
        let config = Config::from_sources(
            Some(r#"{"port": 9000, "codec": {"default_province": "Eastern"}}"#),
            Args::default(),
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.codec.default_province, Province::Eastern);
        assert_eq!(
            config.codec.applicant_id,
            CodecConfig::default().applicant_id
        );
    }

    #[test]
    fn arguments_override_file() {
        let args = Args::try_parse_from([
            "backend",
            "--port",
            "9100",
            "--database-path",
            "/tmp/p.sqlite",
            "--host",
            "0.0.0.0",
        ])
        .unwrap();
        let config = Config::from_sources(Some(r#"{"port": 9000}"#), args).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.database_path, PathBuf::from("/tmp/p.sqlite"));
    }

    #[test]
    fn rejects_bad_port() {
        assert!(Args::try_parse_from(["backend", "--port", "eighty"]).is_err());
    }

    #[test]
    fn missing_config_file_is_reported() {
        let args = Args {
            config: Some(PathBuf::from("/nonexistent/permit-portal.json")),
            ..Args::default()
        };
        let err = Config::load(args).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn rejects_malformed_file() {
        let err = Config::from_sources(Some("{port"), Args::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
