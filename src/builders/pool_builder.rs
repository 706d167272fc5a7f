//! Builders to construct named worker pools from configuration.

use std::collections::HashMap;

use anyhow::{anyhow, Context};
use tracing::{info, warn};

use crate::config::PoolSetConfig;
use crate::core::{AppResult, WorkerPool};

/// Build and start every pool named in the configuration.
///
/// If any pool fails to start, the pools started before it are shut down and
/// the error names the failing pool.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or a pool fails to start.
pub fn build_pools(cfg: &PoolSetConfig) -> AppResult<HashMap<String, WorkerPool>> {
    cfg.validate().map_err(|e| anyhow!("config invalid: {e}"))?;

    let mut pools = HashMap::with_capacity(cfg.pools.len());
    for (name, pool_cfg) in &cfg.pools {
        let started = WorkerPool::start(pool_cfg.clone())
            .with_context(|| format!("failed to start pool `{name}`"));

        match started {
            Ok(pool) => {
                info!(pool = %name, pool_id = %pool.id(), "Pool started from configuration");
                pools.insert(name.clone(), pool);
            }
            Err(err) => {
                for (started_name, pool) in pools.drain() {
                    if let Err(e) = pool.shutdown() {
                        warn!(pool = %started_name, error = %e, "Failed to stop pool after startup error");
                    }
                }
                return Err(err);
            }
        }
    }

    Ok(pools)
}
