use crate::orchestrator::{artifact_key, Orchestrator, PipelineContext};
use nl_core::{Error, Newsletter, NewsletterParams, Result, Run, RunStatus};
use std::sync::Arc;
use tracing::info;

/// Run-lifecycle facade consumed by the gateway: create a run, check its
/// status, fetch its stored result. Creating a run spawns the orchestrator
/// onto the runtime; the caller only ever observes the registry.
pub struct WorkflowService {
    ctx: PipelineContext,
    orchestrator: Arc<Orchestrator>,
}

impl WorkflowService {
    pub fn new(ctx: PipelineContext) -> Self {
        Self {
            orchestrator: Arc::new(Orchestrator::new(ctx.clone())),
            ctx,
        }
    }

    /// Register a run and start the pipeline for it in the background.
    pub async fn create_instance(&self, params: NewsletterParams) -> Result<Run> {
        let run = self.ctx.runs.create_run().await?;
        info!("created run {}", run.id);
        let orchestrator = self.orchestrator.clone();
        let run_id = run.id.clone();
        tokio::spawn(async move {
            orchestrator.execute(&run_id, &params).await;
        });
        Ok(run)
    }

    pub async fn get_instance(&self, id: &str) -> Result<Run> {
        self.ctx
            .runs
            .get_run(id)
            .await?
            .ok_or_else(|| Error::Workflow(format!("no run with id {}", id)))
    }

    /// Fetch the stored newsletter. Fails when the run is not complete, and
    /// fails distinctly when it is complete but the artifact is gone.
    pub async fn get_result(&self, id: &str) -> Result<Newsletter> {
        let run = self.get_instance(id).await?;
        if run.status != RunStatus::Complete {
            return Err(Error::Workflow(format!(
                "run {} is not complete, status: {}",
                id, run.status
            )));
        }
        match self.ctx.artifacts.get(&artifact_key(id)).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Err(Error::Storage(
                "run completed but result not found in storage".to_string(),
            )),
        }
    }
}
