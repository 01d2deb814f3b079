use crate::auth::google::{GoogleVerifier, IdentityVerifier};
use crate::config::AppConfig;
use anyhow::Context;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let verifier = Arc::new(GoogleVerifier::new(&config.google)?) as Arc<dyn IdentityVerifier>;

        Ok(Self {
            db,
            config,
            verifier,
        })
    }

    pub fn from_parts(
        db: PgPool,
        config: Arc<AppConfig>,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Self {
        Self {
            db,
            config,
            verifier,
        }
    }

    /// State whose pool connects on first use; the server never starts this way.
    pub fn lazy(config: AppConfig, verifier: Arc<dyn IdentityVerifier>) -> anyhow::Result<Self> {
        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect_lazy(&config.database_url)
            .context("build lazy pool")?;
        Ok(Self::from_parts(db, Arc::new(config), verifier))
    }
}
