//! # authgate: Request Authentication & Authorization Layer
//!
//! `authgate` is the credential-checking front door of an API service: the
//! logic that, given an inbound request, determines identity and rights
//! before any application handler runs. Two credential schemes are
//! supported - bearer session tokens and long-lived API keys - composed
//! into a single pluggable authentication pipeline with a permission-gating
//! stage.
//!
//! ## Request Flow
//!
//! Each protected route sits behind one of two interceptors. The session
//! interceptor pulls a bearer token from `Authorization`, verifies its
//! HS256 signature and expiry against the configured secret, loads the
//! subject account (minus sensitive fields) and attaches the profile to
//! the request. The API-key interceptor prefers the `X-API-Key` header
//! (falling back to a bearer token), checks the `sk_` format, hashes the
//! key and resolves the digest against the identity store joined with the
//! owning account; on success it attaches the key record and bumps the
//! key's last-used timestamp without blocking the response. An optional
//! permission gate then checks the attached key's capability set.
//!
//! Data flows one way per request: raw request -> extracted credential ->
//! verified claim or key -> resolved identity -> attached context ->
//! optional permission check. A failure at any step short-circuits the
//! rest and is returned as a structured rejection (`{"message", "code"}`)
//! with a stable machine-readable code; identity-store faults are the only
//! failures surfaced as 500s, everything else is a 401/403.
//!
//! ## Architecture
//!
//! The HTTP layer is [Axum](https://github.com/tokio-rs/axum); persistence
//! is PostgreSQL via sqlx, consumed through the [`db::IdentityStore`]
//! trait so the pipeline never depends on the concrete store. The signing
//! secret is injected configuration, not process-wide state.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use authgate::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = authgate::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     authgate::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod db;
pub mod errors;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::Config;

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::auth::session::SessionKeys;
use crate::db::{IdentityStore, PgIdentityStore};

/// Shared per-request state: configuration, the identity store, and the
/// session signing keys built once from the configured secret.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn IdentityStore>,
    pub session_keys: Arc<SessionKeys>,
}

/// Embedded migrations for the identity schema.
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// The assembled application, ready to serve.
pub struct Application {
    state: AppState,
}

impl Application {
    /// Connect to the database, run migrations and build the shared state.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database.url)
            .await
            .context("failed to connect to database")?;

        migrator().run(&pool).await.context("failed to run migrations")?;

        let secret = config
            .secret_key
            .as_deref()
            .context("secret_key is required to serve session-authenticated routes")?;
        let session_keys = Arc::new(SessionKeys::new(secret));

        let state = AppState {
            config: Arc::new(config),
            store: Arc::new(PgIdentityStore::new(pool)),
            session_keys,
        };

        Ok(Self { state })
    }

    /// Serve the API until `shutdown` resolves.
    pub async fn serve(self, shutdown: impl Future<Output = ()> + Send + 'static) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.state.config.host, self.state.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;

        tracing::info!("listening on {addr}");

        axum::serve(listener, api::router(self.state))
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
