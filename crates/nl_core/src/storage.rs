use crate::types::{Run, RunStatus};
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Keyed put/get store for finished newsletter artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store a serialized artifact under `key`, expiring after `ttl`.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Fetch an artifact. `None` when the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;
}

/// Per-run ledger of completed pipeline steps. A step recorded here is never
/// re-executed when the run is resumed.
#[async_trait]
pub trait StepStore: Send + Sync {
    async fn load_step(&self, run_id: &str, step: &str) -> Result<Option<serde_json::Value>>;

    async fn save_step(&self, run_id: &str, step: &str, output: serde_json::Value) -> Result<()>;
}

/// Registry of runs and their lifecycle status.
#[async_trait]
pub trait RunRegistry: Send + Sync {
    /// Register a new run in the `Running` state.
    async fn create_run(&self) -> Result<Run>;

    async fn get_run(&self, id: &str) -> Result<Option<Run>>;

    /// Transition a run to a new status. Terminal states are absorbing.
    async fn set_status(&self, id: &str, status: RunStatus) -> Result<()>;
}
