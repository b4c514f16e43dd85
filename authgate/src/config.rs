//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable
//! overrides. The configuration file path defaults to `config.yaml` but
//! can be specified via `-f` flag or the `AUTHGATE_CONFIG` environment
//! variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources
//! override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `AUTHGATE_`
//!    override YAML values; nested keys use double underscores
//!    (e.g. `AUTHGATE_DATABASE__URL`)
//! 3. **DATABASE_URL** - Special case: overrides `database.url` if set
//!
//! The session signing secret lives here and is handed to the token
//! verifier at construction; nothing reads it from process-wide state.

use clap::Parser;
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "AUTHGATE_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Database connection configuration
    pub database: DatabaseConfig,
    /// Secret key for session token signing and verification.
    /// Required to serve session-authenticated routes.
    pub secret_key: Option<String>,
    /// Authentication behaviour
    pub auth: AuthConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database: DatabaseConfig {
                url: "postgres://localhost/authgate".to_string(),
            },
            secret_key: None,
            auth: AuthConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Session token lifetime (e.g. "8h", "30m")
    #[serde(with = "humantime_serde")]
    pub session_expiry: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_expiry: Duration::from_secs(8 * 60 * 60),
        }
    }
}

impl Config {
    /// Load configuration from the YAML file named by `args`, with
    /// environment overrides applied on top.
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let figment = Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("AUTHGATE_").split("__"));

        let mut config: Config = figment.extract()?;

        // DATABASE_URL beats everything else for the connection string.
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database.url = url;
        }

        Ok(config)
    }
}
