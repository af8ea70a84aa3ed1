use anyhow::Result;
use auth_policy::PolicyEngine;
use database_layer::{DatabasePool, PoolOptions, Repositories};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::config::ClinicConfig;
use crate::middleware::JwtKeys;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct ClinicServer {
    pub config: Arc<ClinicConfig>,
    pub repos: Repositories,
    pub policy: PolicyEngine,
    pub jwt: JwtKeys,
    /// Present when backed by PostgreSQL; used by the health check.
    pub database: Option<DatabasePool>,
    pub started_at: Instant,
}

impl ClinicServer {
    /// Connect to PostgreSQL and build the server state.
    pub async fn connect(config: ClinicConfig) -> Result<Self> {
        let options = PoolOptions {
            max_connections: config.database.max_connections,
            ..PoolOptions::default()
        };
        let pool = DatabasePool::new(&config.database.url, &options).await?;
        info!(max_connections = options.max_connections, "Connected to PostgreSQL");

        let repos = Repositories::postgres(&pool);
        Ok(Self::assemble(config, repos, Some(pool)))
    }

    /// State backed by in-memory stores. Nothing survives a restart.
    pub fn in_memory(config: ClinicConfig) -> Self {
        Self::assemble(config, Repositories::in_memory(), None)
    }

    fn assemble(config: ClinicConfig, repos: Repositories, database: Option<DatabasePool>) -> Self {
        let jwt = JwtKeys::new(&config.auth.jwt_secret, config.auth.token_lifetime_minutes);
        Self {
            config: Arc::new(config),
            repos,
            policy: PolicyEngine::new(),
            jwt,
            database,
            started_at: Instant::now(),
        }
    }

    pub fn clinic_name(&self) -> &str {
        &self.config.clinic.name
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
