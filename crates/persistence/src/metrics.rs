//! Document store metrics.
//!
//! Every store call is timed and counted by operation and outcome. Commits
//! also record their batch shape, and create-only conflicts are counted per
//! top-level collection, so `groupCodes` conflicts show join-code races.

use domain::store::StoreError;
use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Store call being measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Exists,
    Get,
    Commit,
}

impl StoreOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreOp::Exists => "exists",
            StoreOp::Get => "get",
            StoreOp::Commit => "commit",
        }
    }
}

/// Outcome label for a finished store call.
pub fn outcome_label<T>(result: &Result<T, StoreError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(StoreError::Conflict { .. }) => "conflict",
        Err(StoreError::InvalidPath(_)) => "invalid_path",
        Err(_) => "error",
    }
}

/// First segment of a store path.
pub fn collection_of(path: &str) -> &str {
    path.split('/').next().unwrap_or(path)
}

/// Times one store call.
///
/// ```ignore
/// let timer = StoreTimer::start(StoreOp::Get);
/// let rows = timer.finish(fetch_subtree(&pool, path).await)?;
/// ```
pub struct StoreTimer {
    op: StoreOp,
    start: Instant,
}

impl StoreTimer {
    pub fn start(op: StoreOp) -> Self {
        Self {
            op,
            start: Instant::now(),
        }
    }

    /// Records latency and outcome, then hands the result back.
    pub fn finish<T>(self, result: Result<T, StoreError>) -> Result<T, StoreError> {
        let op = self.op.as_str();
        let outcome = outcome_label(&result);
        histogram!(
            "document_store_operation_duration_seconds",
            "op" => op,
            "outcome" => outcome
        )
        .record(self.start.elapsed().as_secs_f64());
        counter!("document_store_operations_total", "op" => op, "outcome" => outcome)
            .increment(1);

        if let Err(StoreError::Conflict { path }) = &result {
            counter!(
                "document_store_conflicts_total",
                "collection" => collection_of(path).to_string()
            )
            .increment(1);
        }
        result
    }
}

/// Records the size of a committed batch and how many paths it claims.
pub fn record_batch(writes: usize, create_only: usize) {
    histogram!("document_store_batch_writes").record(writes as f64);
    histogram!("document_store_batch_create_only").record(create_only as f64);
}

/// Point-in-time view of the connection pool behind the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub size: u32,
    pub idle: usize,
    pub max: u32,
}

impl PoolSnapshot {
    pub fn of(pool: &PgPool) -> Self {
        Self {
            size: pool.size(),
            idle: pool.num_idle(),
            max: pool.options().get_max_connections(),
        }
    }

    pub fn active(&self) -> usize {
        (self.size as usize).saturating_sub(self.idle)
    }

    /// Share of the configured maximum that is checked out.
    pub fn utilization(&self) -> f64 {
        if self.max == 0 {
            return 0.0;
        }
        self.active() as f64 / self.max as f64
    }

    pub fn record(&self) {
        gauge!("document_store_connections", "state" => "active").set(self.active() as f64);
        gauge!("document_store_connections", "state" => "idle").set(self.idle as f64);
        gauge!("document_store_connections_max").set(self.max as f64);
    }
}
