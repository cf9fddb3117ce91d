use crate::poll::PollConfig;
use nl_pipeline::WorkflowService;
use std::sync::Arc;

pub struct AppState {
    pub service: Arc<WorkflowService>,
    pub poll: PollConfig,
}
