use nl_core::TextGenerator;
use std::sync::Arc;
use tracing::warn;

pub mod models;
pub mod parse;

pub use models::dummy::DummyModel;
pub use models::openai::OpenAiModel;

/// Connection settings for the text-generation backend.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Build a generator from config. Without an API key the deterministic
/// in-process model is used, which keeps local runs and tests offline.
pub fn create_generator(config: Config) -> Arc<dyn TextGenerator> {
    match config.api_key {
        Some(_) => Arc::new(OpenAiModel::new(config)),
        None => {
            warn!("no API key configured, falling back to the dummy model");
            Arc::new(DummyModel::new())
        }
    }
}
