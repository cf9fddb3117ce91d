use nl_core::{Newsletter, RunStatus};
use nl_pipeline::WorkflowService;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Client-facing polling bounds: 60 attempts 2 seconds apart, 120 seconds
/// in total. Tests drive the loop with a near-zero interval.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 60,
        }
    }
}

pub enum PollOutcome {
    Complete(Newsletter),
    Failed,
    TimedOut,
}

/// Poll a run until it is terminal or the attempt budget runs out.
/// Transient errors while checking status are logged and absorbed; the
/// underlying run is never cancelled.
pub async fn poll_until_terminal(
    service: &WorkflowService,
    id: &str,
    config: &PollConfig,
) -> PollOutcome {
    for attempt in 1..=config.max_attempts {
        tokio::time::sleep(config.interval).await;

        match service.get_instance(id).await {
            Ok(run) => match run.status {
                RunStatus::Complete => {
                    info!("run {} completed after {} poll attempts", id, attempt);
                    match service.get_result(id).await {
                        Ok(newsletter) => return PollOutcome::Complete(newsletter),
                        Err(e) => error!("error fetching result for run {}: {}", id, e),
                    }
                }
                RunStatus::Failed | RunStatus::Terminated => {
                    error!("run {} ended with status {}", id, run.status);
                    return PollOutcome::Failed;
                }
                RunStatus::Running => {
                    debug!(
                        "run {} still running (attempt {}/{})",
                        id, attempt, config.max_attempts
                    );
                }
            },
            Err(e) => warn!("error checking run {} status: {}", id, e),
        }
    }
    PollOutcome::TimedOut
}

#[cfg(test)]
mod tests {
    use super::*;
    use nl_core::RunRegistry;
    use nl_inference::DummyModel;
    use nl_pipeline::PipelineContext;
    use nl_storage::MemoryStorage;
    use std::sync::Arc;

    fn service(storage: Arc<MemoryStorage>) -> WorkflowService {
        WorkflowService::new(PipelineContext {
            generator: Arc::new(DummyModel::new()),
            artifacts: storage.clone(),
            steps: storage.clone(),
            runs: storage,
        })
    }

    #[tokio::test]
    async fn test_budget_exhaustion_times_out() {
        let storage = Arc::new(MemoryStorage::new());
        let service = service(storage.clone());
        // registered but never executed, so status stays running forever
        let run = storage.create_run().await.unwrap();

        let config = PollConfig {
            interval: Duration::ZERO,
            max_attempts: 60,
        };
        match poll_until_terminal(&service, &run.id, &config).await {
            PollOutcome::TimedOut => {}
            _ => panic!("expected timeout"),
        }
    }

    #[tokio::test]
    async fn test_transient_lookup_errors_keep_polling() {
        let storage = Arc::new(MemoryStorage::new());
        let service = service(storage);
        // the run is unknown, so every status check errors; the loop must
        // absorb each one and exhaust its budget instead of aborting
        let config = PollConfig {
            interval: Duration::ZERO,
            max_attempts: 5,
        };
        match poll_until_terminal(&service, "missing", &config).await {
            PollOutcome::TimedOut => {}
            _ => panic!("expected timeout"),
        }
    }
}
