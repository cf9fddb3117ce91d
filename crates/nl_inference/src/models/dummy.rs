use async_trait::async_trait;
use nl_core::{Result, TextGenerator};

/// Deterministic generator for offline runs and tests. Answers scoring
/// prompts with a fixed verdict and everything else with a fixed sentence.
#[derive(Debug, Default)]
pub struct DummyModel;

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextGenerator for DummyModel {
    fn name(&self) -> &str {
        "dummy"
    }

    async fn generate(&self, prompt: &str, _max_tokens: u32) -> Result<String> {
        if prompt.contains("Respond ONLY with valid JSON") {
            return Ok(r#"{"score": 7, "reasoning": "Matches your interests"}"#.to_string());
        }
        Ok("Here is a short placeholder written by the dummy model.".to_string())
    }
}
