pub mod orchestrator;
pub mod render;
pub mod retry;
pub mod score;
pub mod select;
pub mod service;

pub use orchestrator::{artifact_key, Orchestrator, PipelineContext, ARTIFACT_TTL};
pub use retry::RetryPolicy;
pub use service::WorkflowService;
