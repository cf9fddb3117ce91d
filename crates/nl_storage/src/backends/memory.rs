use async_trait::async_trait;
use nl_core::{ArtifactStore, Error, Result, Run, RunRegistry, RunStatus, StepStore};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

struct StoredArtifact {
    value: String,
    expires_at: Instant,
}

/// In-memory backend implementing all three pipeline collaborator stores.
/// Artifacts carry a TTL and vanish on expiry; the step ledger and run table
/// live for the life of the process.
#[derive(Default)]
pub struct MemoryStorage {
    artifacts: RwLock<HashMap<String, StoredArtifact>>,
    steps: RwLock<HashMap<String, HashMap<String, serde_json::Value>>>,
    runs: RwLock<HashMap<String, Run>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtifactStore for MemoryStorage {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut artifacts = self.artifacts.write().await;
        artifacts.insert(
            key.to_string(),
            StoredArtifact {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut artifacts = self.artifacts.write().await;
        let live = match artifacts.get(key) {
            Some(stored) if stored.expires_at > Instant::now() => Some(stored.value.clone()),
            Some(_) => None,
            None => return Ok(None),
        };
        match live {
            Some(value) => Ok(Some(value)),
            None => {
                debug!("artifact {} expired, dropping", key);
                artifacts.remove(key);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl StepStore for MemoryStorage {
    async fn load_step(&self, run_id: &str, step: &str) -> Result<Option<serde_json::Value>> {
        let steps = self.steps.read().await;
        Ok(steps
            .get(run_id)
            .and_then(|ledger| ledger.get(step))
            .cloned())
    }

    async fn save_step(&self, run_id: &str, step: &str, output: serde_json::Value) -> Result<()> {
        let mut steps = self.steps.write().await;
        steps
            .entry(run_id.to_string())
            .or_default()
            .insert(step.to_string(), output);
        Ok(())
    }
}

#[async_trait]
impl RunRegistry for MemoryStorage {
    async fn create_run(&self) -> Result<Run> {
        let run = Run {
            id: Uuid::new_v4().to_string(),
            status: RunStatus::Running,
        };
        let mut runs = self.runs.write().await;
        runs.insert(run.id.clone(), run.clone());
        Ok(run)
    }

    async fn get_run(&self, id: &str) -> Result<Option<Run>> {
        let runs = self.runs.read().await;
        Ok(runs.get(id).cloned())
    }

    async fn set_status(&self, id: &str, status: RunStatus) -> Result<()> {
        let mut runs = self.runs.write().await;
        let run = runs
            .get_mut(id)
            .ok_or_else(|| Error::Storage(format!("no run with id {}", id)))?;
        if run.status.is_terminal() {
            return Err(Error::Storage(format!(
                "run {} is already {}",
                id, run.status
            )));
        }
        run.status = status;
        Ok(())
    }
}
