//! Samples the Postgres pool behind the document store.
//!
//! Group creation holds a connection for the whole create-only transaction,
//! so a pool running near its limit shows up as slow allocations first.

use persistence::metrics::PoolSnapshot;
use sqlx::PgPool;
use std::time::Duration;
use tracing::warn;

use super::scheduler::Job;

/// Utilization at which a sample is also logged.
const SATURATION_WARN_RATIO: f64 = 0.9;

pub struct StorePoolJob {
    pool: PgPool,
}

impl StorePoolJob {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn sample(&self) -> PoolSnapshot {
        let snapshot = PoolSnapshot::of(&self.pool);
        snapshot.record();
        snapshot
    }
}

/// Whether a sample is worth a warning.
fn is_saturated(snapshot: &PoolSnapshot) -> bool {
    snapshot.utilization() >= SATURATION_WARN_RATIO
}

#[async_trait::async_trait]
impl Job for StorePoolJob {
    fn name(&self) -> &'static str {
        "store_pool"
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(10)
    }

    async fn execute(&self) -> Result<(), String> {
        let snapshot = self.sample();
        if is_saturated(&snapshot) {
            warn!(
                active = snapshot.active(),
                idle = snapshot.idle,
                max = snapshot.max,
                "Document store pool is close to its connection limit"
            );
        }
        Ok(())
    }
}
